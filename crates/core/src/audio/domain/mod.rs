pub mod audio_buffer;
pub mod audio_transformer;
pub mod chunk;
pub mod chunker;
pub mod combiner;
pub mod foreign_mixer;
pub mod pitch_analyzer;
pub mod sample_format;
pub mod transform_parameters;
