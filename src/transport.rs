//! Raw RFC 3912 exchange: connect on port 43, write one query line, read
//! until the peer closes the connection.

use std::time::Duration;

use async_trait::async_trait;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{lookup_host, TcpStream},
    time::timeout,
};
use tracing::debug;

use crate::{config::Config, errors::WhoisError};

pub const WHOIS_PORT: u16 = 43;

/// Seam between the lookup pipeline and the network, so the pipeline is
/// testable without sockets.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a formatted query line and accumulate the response until the
    /// peer closes the connection.
    async fn exchange(&self, server: &str, query_line: &str) -> Result<String, WhoisError>;
}

/// Production transport. Each exchange is an independent socket with no
/// state shared between concurrent lookups.
pub struct TcpTransport {
    deadline: Duration,
    max_response_size: usize,
    buffer_size: usize,
    port: u16,
}

impl TcpTransport {
    pub fn new(deadline: Duration, max_response_size: usize, buffer_size: usize) -> Self {
        Self {
            deadline,
            max_response_size,
            buffer_size,
            port: WHOIS_PORT,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Duration::from_secs(config.timeout_seconds),
            config.max_response_size,
            config.buffer_size,
        )
    }

    /// Override the target port. WHOIS is always port 43 in production;
    /// this exists for tests against local listeners.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    async fn exchange_inner(&self, server: &str, query_line: &str) -> Result<String, WhoisError> {
        let addrs: Vec<_> = lookup_host((server, self.port))
            .await
            .map_err(|e| WhoisError::DnsError {
                server: server.to_string(),
                detail: e.to_string(),
            })?
            .collect();
        if addrs.is_empty() {
            return Err(WhoisError::DnsError {
                server: server.to_string(),
                detail: "no addresses returned".to_string(),
            });
        }

        let mut stream =
            TcpStream::connect(addrs.as_slice())
                .await
                .map_err(|e| WhoisError::ConnectFailed {
                    server: server.to_string(),
                    detail: e.to_string(),
                })?;

        if let Err(e) = stream.set_nodelay(true) {
            debug!("Failed to set TCP_NODELAY: {}", e);
        }

        stream.write_all(query_line.as_bytes()).await?;

        // No framing: the response is everything up to connection close.
        let mut buffer = vec![0u8; self.buffer_size];
        let mut response = Vec::new();
        loop {
            match stream.read(&mut buffer).await? {
                0 => break,
                n => {
                    response.extend_from_slice(&buffer[..n]);
                    if response.len() > self.max_response_size {
                        return Err(WhoisError::ResponseTooLarge);
                    }
                }
            }
        }

        // A zero-byte close is a transport failure; a registry's "no
        // match" line is non-empty bytes and classified higher up.
        if response.is_empty() {
            return Err(WhoisError::EmptyResponse);
        }

        debug!("Received {} bytes from {}", response.len(), server);
        // Some ccTLD registries still emit legacy encodings; degrade to
        // lossy UTF-8 rather than failing the lookup.
        Ok(String::from_utf8_lossy(&response).into_owned())
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn exchange(&self, server: &str, query_line: &str) -> Result<String, WhoisError> {
        // One deadline bounds the whole operation, connect included.
        timeout(self.deadline, self.exchange_inner(server, query_line)).await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    fn transport(deadline_ms: u64) -> TcpTransport {
        TcpTransport::new(Duration::from_millis(deadline_ms), 64 * 1024, 1024)
    }

    async fn local_listener() -> (TcpListener, u16) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        (listener, port)
    }

    #[tokio::test]
    async fn reads_until_peer_closes() {
        let (listener, port) = local_listener().await;
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 128];
            let n = socket.read(&mut buf).await.unwrap();
            assert_eq!(&buf[..n], b"example.com\r\n");
            socket.write_all(b"Domain Name: EXAMPLE.COM\r\n").await.unwrap();
            // Connection close is the end-of-response signal.
        });

        let response = transport(2_000)
            .with_port(port)
            .exchange("127.0.0.1", "example.com\r\n")
            .await
            .unwrap();
        assert_eq!(response, "Domain Name: EXAMPLE.COM\r\n");
    }

    #[tokio::test]
    async fn zero_byte_close_is_empty_response() {
        let (listener, port) = local_listener().await;
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 128];
            let _ = socket.read(&mut buf).await;
            // Drop without writing anything.
        });

        let err = transport(2_000)
            .with_port(port)
            .exchange("127.0.0.1", "example.com\r\n")
            .await
            .unwrap_err();
        assert!(matches!(err, WhoisError::EmptyResponse));
    }

    #[tokio::test]
    async fn stalled_peer_is_timeout_not_empty() {
        let (listener, port) = local_listener().await;
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 128];
            let _ = socket.read(&mut buf).await;
            // Hold the connection open past the client deadline.
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let err = transport(200)
            .with_port(port)
            .exchange("127.0.0.1", "example.com\r\n")
            .await
            .unwrap_err();
        assert!(matches!(err, WhoisError::Timeout));
    }

    #[tokio::test]
    async fn oversized_response_is_rejected() {
        let (listener, port) = local_listener().await;
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 128];
            let _ = socket.read(&mut buf).await;
            let chunk = vec![b'x'; 16 * 1024];
            for _ in 0..8 {
                if socket.write_all(&chunk).await.is_err() {
                    break;
                }
            }
        });

        let err = transport(2_000)
            .with_port(port)
            .exchange("127.0.0.1", "example.com\r\n")
            .await
            .unwrap_err();
        assert!(matches!(err, WhoisError::ResponseTooLarge));
    }

    #[tokio::test]
    async fn refused_connection_is_connect_failed() {
        // Bind then drop to find a port nothing is listening on.
        let (listener, port) = local_listener().await;
        drop(listener);

        let err = transport(2_000)
            .with_port(port)
            .exchange("127.0.0.1", "example.com\r\n")
            .await
            .unwrap_err();
        assert!(matches!(err, WhoisError::ConnectFailed { .. }));
    }
}
