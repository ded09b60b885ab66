use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{ProtocolError, Result};

/// Size of the fixed request header: api key, api version, correlation id.
pub const REQUEST_HEADER_SIZE: usize = 8;

/// Fixed leading fields of every request body.
///
/// Anything after the first eight bytes (client id, tagged fields, request
/// payload) is left in the frame and ignored by the broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestHeader {
    pub api_key: i16,
    pub api_version: i16,
    pub correlation_id: i32,
}

impl RequestHeader {
    pub fn new(api_key: i16, api_version: i16, correlation_id: i32) -> Self {
        Self {
            api_key,
            api_version,
            correlation_id,
        }
    }

    /// Read the header from the front of a frame body.
    pub fn decode(frame: &mut Bytes) -> Result<Self> {
        if frame.remaining() < REQUEST_HEADER_SIZE {
            return Err(ProtocolError::TruncatedHeader(frame.remaining()));
        }

        Ok(Self {
            api_key: frame.get_i16(),
            api_version: frame.get_i16(),
            correlation_id: frame.get_i32(),
        })
    }

    pub fn encode(&self, dst: &mut BytesMut) {
        dst.reserve(REQUEST_HEADER_SIZE);
        dst.put_i16(self.api_key);
        dst.put_i16(self.api_version);
        dst.put_i32(self.correlation_id);
    }
}
