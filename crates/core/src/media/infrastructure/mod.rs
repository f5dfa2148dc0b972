pub mod decoder_factory;
pub mod directory_clip_pool;
#[cfg(feature = "ffmpeg")]
pub mod ffmpeg_decoder;
pub mod file_audio_sink;
pub mod file_audio_source;
pub mod http_audio_source;
pub mod wav_decoder;
pub mod wav_encoder;
