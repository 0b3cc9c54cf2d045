/*!
 * TCP client for the game's REPL listener.
 *
 * Each form is written as a single UTF-8 line. Connecting and writing are
 * both bounded by the configured timeout.
 */

use async_trait::async_trait;
use log::{debug, warn};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::app_config::ReplConfig;
use crate::errors::ReplError;
use crate::repl::ReplClient;

/// REPL connection over TCP
#[derive(Debug)]
pub struct TcpReplClient {
    host: String,
    port: u16,
    timeout_secs: u64,
    stream: Option<TcpStream>,
}

impl TcpReplClient {
    pub fn new(host: impl Into<String>, port: u16, timeout_secs: u64) -> Self {
        Self {
            host: host.into(),
            port,
            timeout_secs,
            stream: None,
        }
    }

    pub fn from_config(config: &ReplConfig) -> Self {
        Self::new(config.host.clone(), config.port, config.timeout_secs)
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn limit(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[async_trait]
impl ReplClient for TcpReplClient {
    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    async fn connect(&mut self) -> Result<(), ReplError> {
        let address = self.address();
        let stream = timeout(self.limit(), TcpStream::connect(&address))
            .await
            .map_err(|_| ReplError::Timeout(self.timeout_secs))?
            .map_err(|e| ReplError::ConnectionFailed {
                address: address.clone(),
                message: e.to_string(),
            })?;
        stream.set_nodelay(true)?;
        debug!("Connected to REPL at {}", address);
        self.stream = Some(stream);
        Ok(())
    }

    async fn eval(&mut self, form: &str) -> Result<(), ReplError> {
        let limit = self.limit();
        let timeout_secs = self.timeout_secs;
        let stream = self.stream.as_mut().ok_or(ReplError::NotConnected)?;

        let mut payload = Vec::with_capacity(form.len() + 1);
        payload.extend_from_slice(form.as_bytes());
        payload.push(b'\n');

        let written = timeout(limit, async {
            stream.write_all(&payload).await?;
            stream.flush().await
        })
        .await;

        match written {
            Ok(Ok(())) => {
                debug!("REPL <- {}", form);
                Ok(())
            }
            Ok(Err(e)) => {
                // The peer went away; a later connect() starts fresh
                warn!("Lost REPL connection: {}", e);
                self.stream = None;
                Err(ReplError::Io(e))
            }
            Err(_) => {
                self.stream = None;
                Err(ReplError::Timeout(timeout_secs))
            }
        }
    }
}
