use bytes::BytesMut;
use futures::{SinkExt, Stream, StreamExt};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio::sync::mpsc;
use tokio_stream::wrappers::TcpListenerStream;
use tokio_util::codec::Framed;
use tracing::{debug, error, info, instrument, warn};

use crate::config::ServerConfig;
use crate::core::codec::FrameCodec;
use crate::error::Result;
use crate::protocol::api_versions::{
    validate_supported_apis, ApiVersionsResponse, SupportedApi, API_VERSIONS_KEY,
    SUPPORTED_APIS,
};
use crate::protocol::header::RequestHeader;
use crate::utils::metrics::Metrics;

/// Pause after a failed accept so a persistent failure (e.g. EMFILE) does not spin
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// Handshake broker: accepts connections and answers API versions requests.
///
/// The advertised API list is immutable and shared read-only by every
/// connection task.
#[derive(Debug, Clone)]
pub struct Broker {
    supported: Arc<[SupportedApi]>,
    max_frame_size: usize,
    metrics: Arc<Metrics>,
}

impl Broker {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            supported: Arc::from(SUPPORTED_APIS),
            max_frame_size: config.max_frame_size,
            metrics: Arc::new(Metrics::new()),
        }
    }

    /// Replace the advertised API list.
    ///
    /// The list must start with the handshake API and fit the single-byte
    /// count field, otherwise no response could be encoded from it.
    pub fn with_supported_apis(
        mut self,
        apis: impl Into<Arc<[SupportedApi]>>,
    ) -> Result<Self> {
        let apis = apis.into();
        validate_supported_apis(&apis)?;
        self.supported = apis;
        Ok(self)
    }

    pub fn supported_apis(&self) -> &[SupportedApi] {
        &self.supported
    }

    pub fn metrics(&self) -> Arc<Metrics> {
        self.metrics.clone()
    }

    /// Accept connections until `shutdown_rx` fires or its sender is dropped.
    ///
    /// Each connection runs in its own detached task. Accept failures are
    /// logged and the loop keeps going after a short pause. Returning does not
    /// wait for open connections: their tasks keep running only as long as the
    /// runtime does, so a process that exits after `serve` cuts them off.
    #[instrument(skip(self, listener, shutdown_rx))]
    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown_rx: mpsc::Receiver<()>,
    ) -> Result<()> {
        self.accept_loop(TcpListenerStream::new(listener), shutdown_rx)
            .await
    }

    async fn accept_loop<S>(
        &self,
        mut incoming: S,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) -> Result<()>
    where
        S: Stream<Item = io::Result<TcpStream>> + Unpin,
    {
        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    info!("Shutting down broker");
                    self.metrics.log_metrics();
                    return Ok(());
                }

                accept_result = incoming.next() => {
                    match accept_result {
                        Some(Ok(stream)) => self.spawn_connection(stream),
                        Some(Err(e)) => {
                            self.metrics.accept_error();
                            error!(error = %e, "Error accepting connection");
                            tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                        }
                        // TcpListenerStream never ends on its own
                        None => return Ok(()),
                    }
                }
            }
        }
    }

    fn spawn_connection(&self, stream: TcpStream) {
        let peer = stream.peer_addr().ok();
        info!(peer = ?peer, "New connection established");

        let broker = self.clone();
        broker.metrics.connection_established();

        tokio::spawn(async move {
            match broker.handle_connection(stream).await {
                Ok(()) => info!(peer = ?peer, "Connection closed by client"),
                Err(e) => {
                    broker.metrics.connection_error();
                    warn!(peer = ?peer, error = %e, "Connection terminated");
                }
            }
            broker.metrics.connection_closed();
        });
    }

    /// Strict request/response loop for one connection.
    ///
    /// Returns `Ok` when the peer closes between frames. The socket is dropped
    /// on every return path.
    pub async fn handle_connection(&self, stream: TcpStream) -> Result<()> {
        let mut framed = Framed::new(stream, FrameCodec::new(self.max_frame_size));

        while let Some(frame) = framed.next().await {
            let mut frame = frame?;
            self.metrics.request_received(frame.len() as u64);

            let header = RequestHeader::decode(&mut frame)?;
            if header.api_key != API_VERSIONS_KEY {
                debug!(
                    api_key = header.api_key,
                    "Answering non-handshake request with API versions"
                );
            }

            let response = ApiVersionsResponse::negotiate(&header, &self.supported);
            if !response.error_code.is_ok() {
                self.metrics.unsupported_version();
            }
            debug!(
                correlation_id = header.correlation_id,
                api_version = header.api_version,
                error_code = response.error_code.code(),
                "Handshake request"
            );

            let mut body = BytesMut::with_capacity(response.encoded_len());
            response.encode(&mut body)?;
            let sent = body.len() as u64;

            framed.send(body.freeze()).await?;
            self.metrics.response_sent(sent);
        }

        Ok(())
    }
}

/// Bind the listening socket. Failure here is fatal for the broker process.
pub async fn bind<A: ToSocketAddrs>(addr: A) -> Result<TcpListener> {
    let listener = TcpListener::bind(addr).await?;
    if let Ok(local) = listener.local_addr() {
        info!(address = %local, "Listening");
    }
    Ok(listener)
}

/// Shutdown channel that fires on CTRL+C
pub fn ctrl_c_shutdown() -> mpsc::Receiver<()> {
    let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received CTRL+C signal, shutting down");
                let _ = shutdown_tx.send(()).await;
            }
            Err(e) => {
                // Keep the sender alive so the broker runs until killed
                error!(error = %e, "Failed to listen for CTRL+C");
                futures::future::pending::<()>().await;
            }
        }
    });

    shutdown_rx
}

/// Start the broker with an external shutdown channel
#[instrument(skip(config, shutdown_rx))]
pub async fn start_server_with_shutdown(
    addr: &str,
    config: &ServerConfig,
    shutdown_rx: mpsc::Receiver<()>,
) -> Result<()> {
    let listener = bind(addr).await?;
    Broker::new(config).serve(listener, shutdown_rx).await
}

/// Connect to a broker
#[instrument]
pub async fn connect(addr: SocketAddr) -> Result<Framed<TcpStream, FrameCodec>> {
    let stream = TcpStream::connect(addr).await?;
    Ok(Framed::new(stream, FrameCodec::default()))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn failing_accepts_back_off() {
        let broker = Broker::new(&ServerConfig::default());
        let metrics = broker.metrics();
        let failing = futures::stream::repeat_with(|| -> io::Result<TcpStream> {
            Err(io::Error::new(io::ErrorKind::Other, "too many open files"))
        });

        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let server = tokio::spawn(async move { broker.accept_loop(failing, shutdown_rx).await });

        tokio::time::sleep(Duration::from_millis(350)).await;
        shutdown_tx.send(()).await.unwrap();
        tokio::time::timeout(Duration::from_secs(5), server)
            .await
            .expect("accept loop should observe shutdown")
            .unwrap()
            .unwrap();

        let errors = metrics.snapshot().accept_errors;
        assert!(errors >= 1, "accept errors should be counted");
        assert!(errors <= 6, "accept loop retried {errors} times without pausing");
    }
}
