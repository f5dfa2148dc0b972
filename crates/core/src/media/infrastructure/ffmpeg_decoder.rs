use std::io::Write;

use tempfile::NamedTempFile;

use crate::audio::domain::audio_buffer::AudioBuffer;
use crate::audio::domain::sample_format::SampleFormat;
use crate::media::domain::audio_decoder::AudioDecoder;
use crate::shared::error::WarpError;

/// Decodes any container/codec ffmpeg understands (mp3, flac, ogg, m4a, ...).
///
/// Output keeps the source sample rate and channel count and is tagged
/// `Int16` for re-encoding.
pub struct FfmpegDecoder;

fn unsupported(e: impl std::fmt::Display) -> WarpError {
    WarpError::UnsupportedFormat(e.to_string())
}

impl AudioDecoder for FfmpegDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<AudioBuffer, WarpError> {
        ffmpeg_next::init().map_err(unsupported)?;

        let mut file = NamedTempFile::new().map_err(|e| WarpError::Io {
            path: std::env::temp_dir(),
            source: e,
        })?;
        file.write_all(bytes)
            .and_then(|_| file.flush())
            .map_err(|e| WarpError::Io {
                path: file.path().to_path_buf(),
                source: e,
            })?;

        let mut ictx = ffmpeg_next::format::input(file.path()).map_err(unsupported)?;
        let audio_stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Audio)
            .ok_or_else(|| unsupported("no audio stream"))?;
        let audio_stream_index = audio_stream.index();

        let codec_ctx =
            ffmpeg_next::codec::context::Context::from_parameters(audio_stream.parameters())
                .map_err(unsupported)?;
        let mut decoder = codec_ctx.decoder().audio().map_err(unsupported)?;

        let channels = (decoder.channels() as u16).max(1);
        let sample_rate = decoder.rate();
        let mut layout = decoder.channel_layout();
        if layout.is_empty() {
            layout = ffmpeg_next::ChannelLayout::default(channels as i32);
        }

        let mut resampler = ffmpeg_next::software::resampling::Context::get(
            decoder.format(),
            layout,
            sample_rate,
            ffmpeg_next::format::Sample::F32(ffmpeg_next::format::sample::Type::Packed),
            layout,
            sample_rate,
        )
        .map_err(unsupported)?;

        let mut samples: Vec<f32> = Vec::new();
        let mut decoded_frame = ffmpeg_next::util::frame::audio::Audio::empty();
        let mut resampled_frame = ffmpeg_next::util::frame::audio::Audio::empty();

        for (stream, packet) in ictx.packets() {
            if stream.index() != audio_stream_index {
                continue;
            }
            decoder.send_packet(&packet).map_err(unsupported)?;
            while decoder.receive_frame(&mut decoded_frame).is_ok() {
                resampler
                    .run(&decoded_frame, &mut resampled_frame)
                    .map_err(unsupported)?;
                extract_packed_f32(&resampled_frame, channels as usize, &mut samples);
            }
        }

        decoder.send_eof().map_err(unsupported)?;
        while decoder.receive_frame(&mut decoded_frame).is_ok() {
            resampler
                .run(&decoded_frame, &mut resampled_frame)
                .map_err(unsupported)?;
            extract_packed_f32(&resampled_frame, channels as usize, &mut samples);
        }
        if let Ok(Some(delay)) = resampler.flush(&mut resampled_frame) {
            if delay.output > 0 {
                extract_packed_f32(&resampled_frame, channels as usize, &mut samples);
            }
        }

        log::debug!(
            "Decoded via ffmpeg: {} Hz, {} ch, {} frames",
            sample_rate,
            channels,
            samples.len() / channels as usize
        );
        AudioBuffer::new(samples, sample_rate, channels, SampleFormat::Int16)
    }
}

/// Append the interleaved samples of a packed f32 frame.
fn extract_packed_f32(
    frame: &ffmpeg_next::util::frame::audio::Audio,
    channels: usize,
    out: &mut Vec<f32>,
) {
    let count = frame.samples() * channels;
    if count == 0 {
        return;
    }
    let data = frame.data(0);
    let bytes = &data[..(count * 4).min(data.len())];
    out.extend(
        bytes
            .chunks_exact(4)
            .map(|b| f32::from_ne_bytes([b[0], b[1], b[2], b[3]])),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::domain::audio_encoder::AudioEncoder;
    use crate::media::infrastructure::wav_encoder::WavEncoder;

    #[test]
    fn test_garbage_is_unsupported() {
        let err = FfmpegDecoder.decode(b"this is not audio").unwrap_err();
        assert!(matches!(err, WarpError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_decodes_wav_bytes() {
        let audio = AudioBuffer::new(vec![0.25; 2000], 16000, 2, SampleFormat::Int16).unwrap();
        let bytes = WavEncoder::new().encode(&audio).unwrap();
        let decoded = FfmpegDecoder.decode(&bytes).unwrap();
        assert_eq!(decoded.sample_rate(), 16000);
        assert_eq!(decoded.channels(), 2);
        assert_eq!(decoded.frames(), 1000);
        assert!((decoded.samples()[10] - 0.25).abs() < 1e-3);
    }
}
