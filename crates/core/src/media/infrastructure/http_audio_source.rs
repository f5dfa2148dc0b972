use std::io::Read;
use std::time::Duration;

use crate::media::domain::audio_source::AudioSource;
use crate::shared::error::WarpError;

/// Progress callback: `(bytes_downloaded, total_bytes)`.
/// `total_bytes` is 0 if the server didn't provide Content-Length.
pub type ProgressFn = Box<dyn Fn(u64, u64) + Send>;

const READ_CHUNK: usize = 256 * 1024;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// True if `identifier` looks like something `HttpAudioSource` can fetch.
pub fn is_remote(identifier: &str) -> bool {
    let lower = identifier.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Downloads a directly linked audio file over HTTP(S).
///
/// Only plain file URLs are supported; pages that embed media are not
/// scraped.
pub struct HttpAudioSource {
    timeout: Duration,
    progress: Option<ProgressFn>,
}

impl HttpAudioSource {
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            progress: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_progress(mut self, progress: ProgressFn) -> Self {
        self.progress = Some(progress);
        self
    }
}

impl Default for HttpAudioSource {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioSource for HttpAudioSource {
    fn fetch(&self, identifier: &str) -> Result<Vec<u8>, WarpError> {
        let unavailable = |reason: String| WarpError::SourceUnavailable {
            identifier: identifier.to_string(),
            reason,
        };
        if !is_remote(identifier) {
            return Err(unavailable("not an http(s) URL".to_string()));
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| unavailable(e.to_string()))?;
        let mut response = client
            .get(identifier)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| unavailable(e.to_string()))?;

        let total = response.content_length().unwrap_or(0);
        log::info!("Downloading {identifier} ({total} bytes advertised)");

        let mut bytes = Vec::with_capacity(total as usize);
        let mut buf = vec![0u8; READ_CHUNK];
        loop {
            let n = response
                .read(&mut buf)
                .map_err(|e| unavailable(e.to_string()))?;
            if n == 0 {
                break;
            }
            bytes.extend_from_slice(&buf[..n]);
            if let Some(ref cb) = self.progress {
                cb(bytes.len() as u64, total);
            }
        }

        if bytes.is_empty() {
            return Err(unavailable("server returned an empty body".to_string()));
        }
        Ok(bytes)
    }
}
