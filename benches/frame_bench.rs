use bytes::{Bytes, BytesMut};
use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use handshake_broker::core::codec::FrameCodec;
use handshake_broker::protocol::api_versions::{ApiVersionsResponse, SUPPORTED_APIS};
use handshake_broker::protocol::header::RequestHeader;
use tokio_util::codec::{Decoder, Encoder};

#[allow(clippy::unwrap_used)]
fn bench_handshake_roundtrip(c: &mut Criterion) {
    let mut group = c.benchmark_group("handshake");
    let request = Bytes::from_static(&[
        0x00, 0x00, 0x00, 0x08, 0x00, 0x12, 0x00, 0x04, 0x00, 0x00, 0x00, 0x2A,
    ]);
    group.throughput(Throughput::Bytes(request.len() as u64));

    group.bench_function("decode_negotiate_encode", |b| {
        let mut codec = FrameCodec::default();
        b.iter(|| {
            let mut src = BytesMut::from(&request[..]);
            let mut frame = codec.decode(&mut src).unwrap().unwrap();
            let header = RequestHeader::decode(&mut frame).unwrap();
            let response = ApiVersionsResponse::negotiate(&header, SUPPORTED_APIS);

            let mut body = BytesMut::with_capacity(response.encoded_len());
            response.encode(&mut body).unwrap();
            let mut out = BytesMut::with_capacity(body.len() + 4);
            codec.encode(body.freeze(), &mut out).unwrap();
            out
        })
    });

    group.bench_function("decode_back_to_back_frames", |b| {
        let mut wire = BytesMut::new();
        for _ in 0..64 {
            wire.extend_from_slice(&request);
        }
        let wire = wire.freeze();
        let mut codec = FrameCodec::default();
        b.iter(|| {
            let mut src = BytesMut::from(&wire[..]);
            let mut count = 0;
            while let Some(_frame) = codec.decode(&mut src).unwrap() {
                count += 1;
            }
            assert_eq!(count, 64);
        })
    });

    group.finish();
}

criterion_group!(benches, bench_handshake_roundtrip);
criterion_main!(benches);
