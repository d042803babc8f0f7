use std::time::Duration;

use docmentor_core::error::AppError;

const HEALTH_TIMEOUT: Duration = Duration::from_millis(800);

#[derive(Debug, Clone)]
pub struct OllamaClient {
    base_url: String,
}

impl OllamaClient {
    /// Create a client for Ollama. This is strictly limited to `127.0.0.1`.
    pub fn new(base_url: &str) -> Result<Self, AppError> {
        let base_url = base_url.trim_end_matches('/').to_string();

        if !is_local_base_url(&base_url) {
            return Err(AppError::new(
                "AI_REMOTE_NOT_ALLOWED",
                "Ollama base URL must be localhost (127.0.0.1)",
            )
            .with_details(format!("base_url={base_url}")));
        }

        Ok(Self { base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn health_check(&self) -> Result<(), AppError> {
        let url = format!("{}/api/tags", self.base_url);
        let resp = ureq::get(&url).timeout(HEALTH_TIMEOUT).call();

        match resp {
            Ok(r) if r.status() == 200 => Ok(()),
            Ok(r) => Err(
                AppError::new("AI_OLLAMA_UNHEALTHY", "Ollama health check failed")
                    .with_details(format!("status={}", r.status())),
            ),
            Err(ureq::Error::Status(status, _)) => Err(AppError::new(
                "AI_OLLAMA_UNHEALTHY",
                "Ollama health check failed",
            )
            .with_details(format!("status={status}"))),
            Err(e) => Err(AppError::new(
                "AI_OLLAMA_UNREACHABLE",
                "Failed to reach Ollama on 127.0.0.1",
            )
            .with_details(e.to_string())
            .with_retryable(true)),
        }
    }
}

/// `http://127.0.0.1` with an optional port in 1..=65535 and nothing after it.
fn is_local_base_url(base_url: &str) -> bool {
    let Some(rest) = base_url.strip_prefix("http://127.0.0.1") else {
        return false;
    };
    if rest.is_empty() {
        return true;
    }
    match rest.strip_prefix(':') {
        Some(port) if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) => {
            matches!(port.parse::<u16>(), Ok(p) if p > 0)
        }
        _ => false,
    }
}

/// Map a failed ureq call onto the operation's error code.
///
/// Deadline hits become `TIMEOUT`; other transport failures keep `code` and are retryable.
pub(crate) fn request_error(e: ureq::Error, code: &str, what: &str) -> AppError {
    match e {
        ureq::Error::Status(status, _) => {
            AppError::new(code, format!("{what} request failed")).with_details(format!("status={status}"))
        }
        other => {
            if is_timeout(&other) {
                AppError::new("TIMEOUT", format!("{what} request timed out"))
                    .with_details(other.to_string())
                    .with_retryable(true)
            } else {
                AppError::new(code, format!("Failed to call {what} endpoint"))
                    .with_details(other.to_string())
                    .with_retryable(true)
            }
        }
    }
}

fn is_timeout(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut cur = Some(err);
    while let Some(e) = cur {
        if let Some(io) = e.downcast_ref::<std::io::Error>() {
            if matches!(
                io.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
            ) {
                return true;
            }
        }
        cur = e.source();
    }
    err.to_string().contains("timed out")
}
