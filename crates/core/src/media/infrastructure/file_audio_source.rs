use std::fs;

use crate::media::domain::audio_source::AudioSource;
use crate::shared::error::WarpError;

/// Reads the input recording from the local filesystem.
pub struct FileAudioSource;

impl AudioSource for FileAudioSource {
    fn fetch(&self, identifier: &str) -> Result<Vec<u8>, WarpError> {
        fs::read(identifier).map_err(|e| WarpError::SourceUnavailable {
            identifier: identifier.to_string(),
            reason: e.to_string(),
        })
    }
}
