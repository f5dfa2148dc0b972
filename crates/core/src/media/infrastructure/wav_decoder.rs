use std::io::Cursor;

use hound::WavReader;

use crate::audio::domain::audio_buffer::AudioBuffer;
use crate::audio::domain::sample_format::SampleFormat;
use crate::media::domain::audio_decoder::AudioDecoder;
use crate::shared::error::WarpError;

/// Decodes RIFF/WAVE bytes with hound.
///
/// Integer PCM of any width is scaled by `2^(bits-1)`; 32-bit float is taken
/// as-is. Sources narrower than 16 bits are tagged `Int16` for re-encoding.
pub struct WavDecoder;

fn format_for(spec: &hound::WavSpec) -> Result<SampleFormat, WarpError> {
    match (spec.sample_format, spec.bits_per_sample) {
        (hound::SampleFormat::Float, 32) => Ok(SampleFormat::Float32),
        (hound::SampleFormat::Int, 1..=16) => Ok(SampleFormat::Int16),
        (hound::SampleFormat::Int, 17..=24) => Ok(SampleFormat::Int24),
        (hound::SampleFormat::Int, 25..=32) => Ok(SampleFormat::Int32),
        (format, bits) => Err(WarpError::UnsupportedFormat(format!(
            "{bits}-bit {format:?} WAV"
        ))),
    }
}

impl AudioDecoder for WavDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<AudioBuffer, WarpError> {
        let reader = WavReader::new(Cursor::new(bytes))
            .map_err(|e| WarpError::UnsupportedFormat(format!("not a readable WAV file: {e}")))?;
        let spec = reader.spec();
        let format = format_for(&spec)?;

        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .into_samples::<f32>()
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| WarpError::UnsupportedFormat(format!("corrupt float samples: {e}")))?,
            hound::SampleFormat::Int => {
                let scale = (1u64 << (spec.bits_per_sample - 1)) as f64;
                reader
                    .into_samples::<i32>()
                    .map(|s| s.map(|v| (v as f64 / scale) as f32))
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| {
                        WarpError::UnsupportedFormat(format!("corrupt integer samples: {e}"))
                    })?
            }
        };

        // A truncated final frame is dropped rather than rejected.
        let channels = spec.channels.max(1) as usize;
        let mut samples = samples;
        samples.truncate(samples.len() / channels * channels);

        log::debug!(
            "Decoded WAV: {} Hz, {} ch, {} bit, {} frames",
            spec.sample_rate,
            spec.channels,
            spec.bits_per_sample,
            samples.len() / channels
        );
        AudioBuffer::new(samples, spec.sample_rate, spec.channels, format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use hound::{WavSpec, WavWriter};
    use rstest::rstest;

    fn wav_bytes(spec: WavSpec, write: impl FnOnce(&mut WavWriter<&mut Cursor<Vec<u8>>>)) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
            write(&mut writer);
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    fn int_spec(channels: u16, bits: u16) -> WavSpec {
        WavSpec {
            channels,
            sample_rate: 22050,
            bits_per_sample: bits,
            sample_format: hound::SampleFormat::Int,
        }
    }

    #[test]
    fn test_decodes_16_bit_mono() {
        let bytes = wav_bytes(int_spec(1, 16), |w| {
            for s in [0i16, 16384, -16384, i16::MIN] {
                w.write_sample(s).unwrap();
            }
        });
        let audio = WavDecoder.decode(&bytes).unwrap();
        assert_eq!(audio.sample_rate(), 22050);
        assert_eq!(audio.channels(), 1);
        assert_eq!(audio.format(), SampleFormat::Int16);
        assert_eq!(audio.samples(), &[0.0, 0.5, -0.5, -1.0]);
    }

    #[test]
    fn test_decodes_24_bit_stereo() {
        let bytes = wav_bytes(int_spec(2, 24), |w| {
            for s in [1 << 22, -(1 << 22), 0, 1 << 21] {
                w.write_sample(s).unwrap();
            }
        });
        let audio = WavDecoder.decode(&bytes).unwrap();
        assert_eq!(audio.channels(), 2);
        assert_eq!(audio.frames(), 2);
        assert_eq!(audio.format(), SampleFormat::Int24);
        assert_relative_eq!(audio.samples()[0], 0.5);
        assert_relative_eq!(audio.samples()[3], 0.25);
    }

    #[test]
    fn test_decodes_float() {
        let spec = WavSpec {
            channels: 1,
            sample_rate: 48000,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let bytes = wav_bytes(spec, |w| {
            for s in [0.25f32, -0.75] {
                w.write_sample(s).unwrap();
            }
        });
        let audio = WavDecoder.decode(&bytes).unwrap();
        assert_eq!(audio.format(), SampleFormat::Float32);
        assert_eq!(audio.samples(), &[0.25, -0.75]);
    }

    #[rstest]
    #[case::empty(b"".to_vec())]
    #[case::text(b"definitely not audio".to_vec())]
    #[case::riff_header_only(b"RIFF\x04\x00\x00\x00WAVE".to_vec())]
    fn test_garbage_is_unsupported(#[case] bytes: Vec<u8>) {
        assert!(matches!(
            WavDecoder.decode(&bytes),
            Err(WarpError::UnsupportedFormat(_))
        ));
    }
}
