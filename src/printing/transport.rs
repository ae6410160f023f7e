//! Wire Transport (component C): a short-lived TCP session per
//! label, with bounded retry and exponential backoff, mirroring the teacher's
//! use of `tokio::time::timeout` around blocking I/O in `PlcReader::read_tag`.

use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::errors::{WmsError, WmsResult};

/// Retry/deadline knobs for [`WireTransport`]. Defaults:
/// 5s connect deadline, 10s read/write deadline, 3 retries (4 attempts total),
/// 1s base backoff doubling per attempt, capped at a shift of 30.
#[derive(Debug, Clone, Copy)]
pub struct TransportConfig {
    pub connect_timeout: Duration,
    pub io_timeout: Duration,
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            io_timeout: Duration::from_secs(10),
            max_retries: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl TransportConfig {
    /// Delay before the attempt-th retry (1-based), `base * 2^(attempt-1)`
    /// capped at a left-shift of 30 to avoid overflow on pathological inputs.
    fn retry_delay(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(30);
        self.base_delay * (1u32 << shift)
    }
}

/// Opens a TCP session to a printer endpoint and streams a rendered payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct WireTransport {
    config: TransportConfig,
}

impl WireTransport {
    pub fn new(config: TransportConfig) -> Self {
        Self { config }
    }

    /// Sends `payload` to `(ip, port)`, retrying transport failures up to
    /// `config.max_retries` times. On exhaustion, raises a [`WmsError::Print`]
    /// naming `printer_id`, the endpoint, and the last cause.
    pub async fn send(&self, printer_id: &str, ip: &str, port: u16, payload: &[u8]) -> WmsResult<()> {
        let endpoint = format!("{ip}:{port}");
        let total_attempts = self.config.max_retries + 1;
        let mut last_err: Option<String> = None;

        for attempt in 1..=total_attempts {
            match self.try_once(ip, port, payload).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    last_err = Some(e);
                    if attempt < total_attempts {
                        let delay = self.config.retry_delay(attempt);
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        Err(WmsError::print(format!(
            "failed to deliver label to printer {printer_id} at {endpoint} after {total_attempts} attempt(s): {}",
            last_err.unwrap_or_else(|| "unknown transport failure".to_string())
        )))
    }

    async fn try_once(&self, ip: &str, port: u16, payload: &[u8]) -> Result<(), String> {
        let mut stream = timeout(self.config.connect_timeout, TcpStream::connect((ip, port)))
            .await
            .map_err(|_| "connect timed out".to_string())?
            .map_err(|e| format!("connect failed: {e}"))?;

        timeout(self.config.io_timeout, stream.write_all(payload))
            .await
            .map_err(|_| "write timed out".to_string())?
            .map_err(|e| format!("write failed: {e}"))?;

        timeout(self.config.io_timeout, stream.shutdown())
            .await
            .map_err(|_| "shutdown timed out".to_string())?
            .map_err(|e| format!("shutdown failed: {e}"))?;

        Ok(())
    }

    /// Single TCP connect attempt against the connection deadline; never
    /// raises, returns `false` on any failure.
    pub async fn test_connectivity(&self, ip: &str, port: u16) -> bool {
        timeout(self.config.connect_timeout, TcpStream::connect((ip, port))).await.and_then(|r| r).is_ok()
    }
}
