use std::io::Cursor;

use hound::{WavSpec, WavWriter};

use crate::audio::domain::audio_buffer::{saturate, AudioBuffer};
use crate::audio::domain::sample_format::SampleFormat;
use crate::media::domain::audio_encoder::AudioEncoder;
use crate::shared::error::WarpError;

/// Encodes PCM as a RIFF/WAVE file with hound.
///
/// Writes in the buffer's own sample format unless an override is set.
#[derive(Default)]
pub struct WavEncoder {
    format: Option<SampleFormat>,
}

impl WavEncoder {
    pub fn new() -> Self {
        Self { format: None }
    }

    pub fn with_format(format: SampleFormat) -> Self {
        Self {
            format: Some(format),
        }
    }
}

fn encode_err(e: hound::Error) -> WarpError {
    WarpError::Encode(e.to_string())
}

impl AudioEncoder for WavEncoder {
    fn encode(&self, audio: &AudioBuffer) -> Result<Vec<u8>, WarpError> {
        let format = self.format.unwrap_or(audio.format());
        let spec = WavSpec {
            channels: audio.channels(),
            sample_rate: audio.sample_rate(),
            bits_per_sample: format.bits_per_sample(),
            sample_format: if format.is_float() {
                hound::SampleFormat::Float
            } else {
                hound::SampleFormat::Int
            },
        };

        let mut cursor = Cursor::new(Vec::with_capacity(audio.samples().len() * 4 + 44));
        {
            let mut writer = WavWriter::new(&mut cursor, spec).map_err(encode_err)?;
            match format.int_max() {
                None => {
                    for &s in audio.samples() {
                        writer.write_sample(saturate(s)).map_err(encode_err)?;
                    }
                }
                Some(max) if format == SampleFormat::Int16 => {
                    for &s in audio.samples() {
                        let v = (saturate(s) as f64 * max as f64).round() as i16;
                        writer.write_sample(v).map_err(encode_err)?;
                    }
                }
                Some(max) => {
                    for &s in audio.samples() {
                        let v = (saturate(s) as f64 * max as f64).round() as i32;
                        writer.write_sample(v).map_err(encode_err)?;
                    }
                }
            }
            writer.finalize().map_err(encode_err)?;
        }
        Ok(cursor.into_inner())
    }
}
