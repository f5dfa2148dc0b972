pub mod chunk_executor;
pub mod chunk_transform_pipeline;
pub mod infrastructure;
pub mod pipeline_logger;
pub mod warp_audio_use_case;
