use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::audio::domain::audio_buffer::AudioBuffer;
use crate::audio::domain::chunker::Chunker;
use crate::audio::domain::combiner::Combiner;
use crate::audio::domain::pitch_analyzer::PitchAnalyzer;
use crate::media::domain::audio_decoder::AudioDecoder;
use crate::media::domain::audio_encoder::AudioEncoder;
use crate::media::domain::audio_sink::AudioSink;
use crate::media::domain::audio_source::AudioSource;
use crate::media::domain::clip_pool_loader::ClipPoolLoader;
use crate::pipeline::chunk_executor::ChunkExecutor;
use crate::pipeline::chunk_transform_pipeline::ChunkTransformPipeline;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::shared::config::WarpConfig;
use crate::shared::error::WarpError;

/// What a finished run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct WarpReport {
    pub seed: u64,
    pub chunks: usize,
    pub clips: usize,
    pub sample_rate: u32,
    pub channels: u16,
    pub input_frames: usize,
    pub output_frames: usize,
    pub output_path: PathBuf,
}

/// End-to-end driver: fetch, decode, split, transform, recombine, encode,
/// write.
pub struct WarpAudioUseCase {
    source: Box<dyn AudioSource>,
    decoder: Arc<dyn AudioDecoder>,
    encoder: Box<dyn AudioEncoder>,
    sink: Box<dyn AudioSink>,
    executor: Box<dyn ChunkExecutor>,
    clip_loader: Option<(Box<dyn ClipPoolLoader>, PathBuf)>,
    pipeline: ChunkTransformPipeline,
    config: WarpConfig,
}

impl WarpAudioUseCase {
    /// Fails with `InvalidParameter` if `config` does not validate.
    pub fn new(
        source: Box<dyn AudioSource>,
        decoder: Arc<dyn AudioDecoder>,
        encoder: Box<dyn AudioEncoder>,
        sink: Box<dyn AudioSink>,
        analyzer: Box<dyn PitchAnalyzer>,
        executor: Box<dyn ChunkExecutor>,
        config: WarpConfig,
    ) -> Result<Self, WarpError> {
        config.validate()?;
        let pipeline = ChunkTransformPipeline::new(config.parameter_ranges(), analyzer)?;
        Ok(Self {
            source,
            decoder,
            encoder,
            sink,
            executor,
            clip_loader: None,
            pipeline,
            config,
        })
    }

    /// Mix clips from `dir` into the chunks. Loaded at the start of each run.
    pub fn with_clip_pool(mut self, loader: Box<dyn ClipPoolLoader>, dir: PathBuf) -> Self {
        self.clip_loader = Some((loader, dir));
        self
    }

    pub fn run(
        &mut self,
        identifier: &str,
        output_path: &Path,
        logger: &mut dyn PipelineLogger,
    ) -> Result<WarpReport, WarpError> {
        let start = Instant::now();

        // 1. Fetch and decode the input
        let bytes = self.source.fetch(identifier)?;
        let original = self.decoder.decode(&bytes)?;
        logger.info(&format!(
            "Loaded {identifier}: {:.2}s at {} Hz, {} ch",
            original.duration(),
            original.sample_rate(),
            original.channels()
        ));

        // 2. Foreign clips; an unreadable pool only disables mixing
        let clips = self.load_clip_pool_or_empty();
        let clip_count = clips.len();
        self.pipeline.set_clip_pool(clips);

        // 3. Transform and recombine
        let seed = self.config.seed.unwrap_or_else(rand::random);
        logger.info(&format!("Using seed {seed}"));
        let (combined, chunks) = self.process(&original, seed, logger)?;

        // 4. Encode and persist
        let encoded = self.encoder.encode(&combined)?;
        self.sink.write(&encoded, output_path)?;
        logger.info(&format!(
            "Wrote {} ({:.2}s) in {:.1}s",
            output_path.display(),
            combined.duration(),
            start.elapsed().as_secs_f64()
        ));
        logger.summary();

        Ok(WarpReport {
            seed,
            chunks,
            clips: clip_count,
            sample_rate: combined.sample_rate(),
            channels: combined.channels(),
            input_frames: original.frames(),
            output_frames: combined.frames(),
            output_path: output_path.to_path_buf(),
        })
    }

    /// Split, transform and recombine an already decoded recording.
    ///
    /// Returns the combined buffer and the number of chunks.
    pub fn process(
        &self,
        original: &AudioBuffer,
        seed: u64,
        logger: &mut dyn PipelineLogger,
    ) -> Result<(AudioBuffer, usize), WarpError> {
        let chunks = Chunker::split(original, self.config.chunk_ms)?;
        logger.info(&format!(
            "Split into {} chunks of {} ms",
            chunks.len(),
            self.config.chunk_ms
        ));

        let transformed = self
            .pipeline
            .run(&chunks, seed, self.executor.as_ref(), logger)?;

        let combined = Combiner::new(self.config.fade_ms).combine(
            &transformed,
            original,
            self.config.original_gain_db,
        )?;
        Ok((combined, chunks.len()))
    }

    fn load_clip_pool_or_empty(&self) -> Vec<AudioBuffer> {
        let Some((loader, dir)) = &self.clip_loader else {
            return Vec::new();
        };
        match loader.list_clips(dir) {
            Ok(clips) => {
                if clips.is_empty() {
                    log::warn!(
                        "No usable clips in {}, foreign mixing disabled",
                        dir.display()
                    );
                }
                clips
            }
            Err(e) => {
                log::warn!("{e}; foreign mixing disabled");
                Vec::new()
            }
        }
    }
}
