pub mod audio_decoder;
pub mod audio_encoder;
pub mod audio_sink;
pub mod audio_source;
pub mod clip_pool_loader;
