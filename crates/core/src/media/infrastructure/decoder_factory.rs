use std::sync::Arc;

use crate::audio::domain::audio_buffer::AudioBuffer;
use crate::media::domain::audio_decoder::AudioDecoder;
use crate::media::domain::audio_source::AudioSource;
use crate::shared::error::WarpError;

use super::file_audio_source::FileAudioSource;
use super::http_audio_source::{is_remote, HttpAudioSource, ProgressFn};
use super::wav_decoder::WavDecoder;

/// Tries `primary` first and hands the bytes to `fallback` only when the
/// primary does not recognise the format.
pub struct FallbackDecoder {
    primary: Arc<dyn AudioDecoder>,
    fallback: Arc<dyn AudioDecoder>,
}

impl FallbackDecoder {
    pub fn new(primary: Arc<dyn AudioDecoder>, fallback: Arc<dyn AudioDecoder>) -> Self {
        Self { primary, fallback }
    }
}

impl AudioDecoder for FallbackDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<AudioBuffer, WarpError> {
        match self.primary.decode(bytes) {
            Err(WarpError::UnsupportedFormat(reason)) => {
                log::debug!("Primary decoder declined ({reason}), trying fallback");
                self.fallback.decode(bytes)
            }
            other => other,
        }
    }
}

/// The most capable decoder this build supports.
///
/// WAV always goes through hound so its bit depth is preserved. With the
/// `ffmpeg` feature every other format falls through to ffmpeg.
pub fn create_decoder() -> Arc<dyn AudioDecoder> {
    #[cfg(feature = "ffmpeg")]
    {
        log::debug!("Using hound for WAV with ffmpeg fallback");
        Arc::new(FallbackDecoder::new(
            Arc::new(WavDecoder),
            Arc::new(super::ffmpeg_decoder::FfmpegDecoder),
        ))
    }
    #[cfg(not(feature = "ffmpeg"))]
    {
        log::debug!("Built without ffmpeg, only WAV input is supported");
        Arc::new(WavDecoder)
    }
}

/// Picks the source matching the shape of `identifier`. `progress` only
/// applies to downloads.
pub fn create_source(identifier: &str, progress: Option<ProgressFn>) -> Box<dyn AudioSource> {
    if is_remote(identifier) {
        log::debug!("Downloading input over HTTP");
        let source = HttpAudioSource::new();
        match progress {
            Some(progress) => Box::new(source.with_progress(progress)),
            None => Box::new(source),
        }
    } else {
        Box::new(FileAudioSource)
    }
}
