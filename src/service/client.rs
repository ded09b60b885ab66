use bytes::BytesMut;
use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use tokio::net::TcpStream;
use tokio_util::codec::Framed;
use tracing::{debug, instrument};

use crate::core::codec::FrameCodec;
use crate::error::{ProtocolError, Result};
use crate::protocol::api_versions::{ApiVersionsResponse, API_VERSIONS_KEY};
use crate::protocol::header::RequestHeader;
use crate::transport::remote;

/// Client for the API versions handshake.
///
/// Requests go out one at a time; each call waits for its response before
/// returning, matching the broker's request/response ordering.
pub struct BrokerClient {
    framed: Framed<TcpStream, FrameCodec>,
    next_correlation_id: i32,
}

impl BrokerClient {
    #[instrument]
    pub async fn connect(addr: SocketAddr) -> Result<Self> {
        let framed = remote::connect(addr).await?;
        Ok(Self {
            framed,
            next_correlation_id: 0,
        })
    }

    /// Ask the broker which APIs it supports, using handshake version `api_version`.
    pub async fn api_versions(&mut self, api_version: i16) -> Result<ApiVersionsResponse> {
        let correlation_id = self.next_correlation_id;
        self.next_correlation_id = self.next_correlation_id.wrapping_add(1);

        self.request(RequestHeader::new(API_VERSIONS_KEY, api_version, correlation_id))
            .await
    }

    /// Send an arbitrary header and read back the handshake response for it.
    pub async fn request(&mut self, header: RequestHeader) -> Result<ApiVersionsResponse> {
        let mut body = BytesMut::new();
        header.encode(&mut body);
        self.framed.send(body.freeze()).await?;

        let mut frame = match self.framed.next().await {
            Some(frame) => frame?,
            None => return Err(ProtocolError::ConnectionClosed),
        };
        let response = ApiVersionsResponse::decode(&mut frame)?;
        debug!(
            correlation_id = response.correlation_id,
            error_code = response.error_code.code(),
            "Handshake response"
        );

        if response.correlation_id != header.correlation_id {
            return Err(ProtocolError::CorrelationMismatch {
                expected: header.correlation_id,
                received: response.correlation_id,
            });
        }

        Ok(response)
    }
}
