use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::audio::domain::audio_buffer::AudioBuffer;
use crate::audio::domain::audio_transformer::AudioTransformer;
use crate::audio::domain::chunk::Chunk;
use crate::audio::domain::foreign_mixer::ForeignMixer;
use crate::audio::domain::pitch_analyzer::PitchAnalyzer;
use crate::audio::domain::transform_parameters::{ParameterRanges, TransformParameters};
use crate::audio::infrastructure::band_filter_transformer::BandFilterTransformer;
use crate::audio::infrastructure::gain_transformer::GainTransformer;
use crate::audio::infrastructure::pitch_shift_transformer::PitchShiftTransformer;
use crate::audio::infrastructure::tempo_scale_transformer::TempoScaleTransformer;
use crate::pipeline::chunk_executor::ChunkExecutor;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::shared::error::WarpError;

/// Stage names reported to [`PipelineLogger::timing`], in execution order.
pub const STAGES: [&str; 6] = ["mix", "analyze", "pitch", "tempo", "filter", "gain"];

/// Everything produced for one chunk.
#[derive(Debug, Clone)]
pub struct ChunkOutcome {
    pub index: usize,
    pub audio: AudioBuffer,
    pub parameters: TransformParameters,
    pub detected_pitch: Option<f64>,
    /// Milliseconds per stage, parallel to [`STAGES`].
    pub timings: [f64; 6],
    /// Output frames divided by input frames.
    pub length_ratio: f64,
}

/// One sub-seed per chunk, drawn in chunk order from a generator seeded with
/// `master_seed`.
pub fn chunk_seeds(master_seed: u64, count: usize) -> Vec<u64> {
    let mut master = StdRng::seed_from_u64(master_seed);
    (0..count).map(|_| master.gen()).collect()
}

fn timed<T>(elapsed: &mut f64, f: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let value = f();
    *elapsed = start.elapsed().as_secs_f64() * 1000.0;
    value
}

/// Applies the randomized distortion chain to chunks.
///
/// Per chunk: overlay a foreign clip, estimate pitch, draw parameters, then
/// pitch shift, tempo scale, band filter and gain in that order. Every
/// random choice for a chunk comes from a generator seeded only by that
/// chunk's sub-seed.
pub struct ChunkTransformPipeline {
    ranges: ParameterRanges,
    analyzer: Box<dyn PitchAnalyzer>,
    clip_pool: Vec<AudioBuffer>,
}

impl ChunkTransformPipeline {
    pub fn new(
        ranges: ParameterRanges,
        analyzer: Box<dyn PitchAnalyzer>,
    ) -> Result<Self, WarpError> {
        ranges.validate()?;
        Ok(Self {
            ranges,
            analyzer,
            clip_pool: Vec::new(),
        })
    }

    pub fn with_clip_pool(mut self, clip_pool: Vec<AudioBuffer>) -> Self {
        self.clip_pool = clip_pool;
        self
    }

    pub fn set_clip_pool(&mut self, clip_pool: Vec<AudioBuffer>) {
        self.clip_pool = clip_pool;
    }

    pub fn transform_chunk(&self, chunk: &Chunk, seed: u64) -> Result<ChunkOutcome, WarpError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut timings = [0.0; 6];

        let mixed = timed(&mut timings[0], || {
            ForeignMixer::overlay_foreign(chunk.audio(), &self.clip_pool, &mut rng)
        })?;
        let detected_pitch = timed(&mut timings[1], || {
            self.analyzer.estimate_fundamental(&mixed.audio)
        });

        let mut parameters = self.ranges.draw(&mut rng);
        parameters.foreign_clip = mixed.clip_index;

        let audio = timed(&mut timings[2], || {
            PitchShiftTransformer::new(parameters.pitch_semitones).transform(&mixed.audio)
        })?;
        let audio = timed(&mut timings[3], || {
            TempoScaleTransformer::new(parameters.speed_ratio)?.transform(&audio)
        })?;
        let audio = timed(&mut timings[4], || {
            BandFilterTransformer::new(parameters.reverb_level).transform(&audio)
        })?;
        let audio = timed(&mut timings[5], || {
            GainTransformer::new(parameters.gain_db).transform(&audio)
        })?;

        log::debug!(
            "chunk {}: clip={:?} pitch={:+.2}st speed={:.3} reverb={} gain={:+}dB detected={}",
            chunk.index(),
            parameters.foreign_clip,
            parameters.pitch_semitones,
            parameters.speed_ratio,
            parameters.reverb_level,
            parameters.gain_db,
            detected_pitch.map_or_else(|| "none".to_string(), |hz| format!("{hz:.1}Hz"))
        );

        let length_ratio = if chunk.frames() == 0 {
            1.0
        } else {
            audio.frames() as f64 / chunk.frames() as f64
        };
        Ok(ChunkOutcome {
            index: chunk.index(),
            audio,
            parameters,
            detected_pitch,
            timings,
            length_ratio,
        })
    }

    /// Transform every chunk and return the results in chunk order.
    pub fn run(
        &self,
        chunks: &[Chunk],
        master_seed: u64,
        executor: &dyn ChunkExecutor,
        logger: &mut dyn PipelineLogger,
    ) -> Result<Vec<AudioBuffer>, WarpError> {
        let total = chunks.len();
        let seeds = chunk_seeds(master_seed, total);
        let mut completed = 0usize;

        let outcomes = executor.execute(self, chunks, &seeds, &mut |outcome: &ChunkOutcome| {
            completed += 1;
            for (stage, ms) in STAGES.iter().zip(outcome.timings) {
                logger.timing(stage, ms);
            }
            if let Some(hz) = outcome.detected_pitch {
                logger.metric("detected_pitch_hz", hz);
            }
            logger.metric("chunk_len_ratio", outcome.length_ratio);
            logger.progress(completed, total);
        })?;

        Ok(outcomes.into_iter().map(|o| o.audio).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::domain::chunker::Chunker;
    use crate::audio::domain::pitch_analyzer::NullPitchAnalyzer;
    use crate::pipeline::chunk_executor::SequentialChunkExecutor;
    use crate::pipeline::infrastructure::threaded_chunk_executor::ThreadedChunkExecutor;
    use crate::pipeline::pipeline_logger::{NullPipelineLogger, StdoutPipelineLogger};
    use std::sync::{Arc, Mutex};

    fn ranges() -> ParameterRanges {
        ParameterRanges {
            pitch: (-2.0, 2.0),
            speed: (0.9, 1.1),
            speed_clamp: None,
            reverb: (45, 55),
            gain: (-5, 5),
        }
    }

    fn tone(seconds: f64) -> AudioBuffer {
        let rate = 8000;
        let samples = (0..(seconds * rate as f64) as usize)
            .map(|i| (2.0 * std::f64::consts::PI * 300.0 * i as f64 / rate as f64).sin() as f32 * 0.4)
            .collect();
        AudioBuffer::mono(samples, rate).unwrap()
    }

    struct RecordingAnalyzer {
        seen: Arc<Mutex<Vec<usize>>>,
    }

    impl PitchAnalyzer for RecordingAnalyzer {
        fn estimate_fundamental(&self, audio: &AudioBuffer) -> Option<f64> {
            self.seen.lock().unwrap().push(audio.frames());
            Some(300.0)
        }
    }

    #[test]
    fn test_chunk_seeds_are_reproducible() {
        assert_eq!(chunk_seeds(5, 10), chunk_seeds(5, 10));
        assert_ne!(chunk_seeds(5, 10), chunk_seeds(6, 10));
        assert_eq!(chunk_seeds(5, 3), chunk_seeds(5, 10)[..3].to_vec());
    }

    #[test]
    fn test_same_seed_same_chunk_output() {
        let pipeline =
            ChunkTransformPipeline::new(ranges(), Box::new(NullPitchAnalyzer)).unwrap();
        let chunk = Chunk::new(0, 0, tone(0.5));
        let a = pipeline.transform_chunk(&chunk, 42).unwrap();
        let b = pipeline.transform_chunk(&chunk, 42).unwrap();
        assert_eq!(a.audio, b.audio);
        assert_eq!(a.parameters, b.parameters);
    }

    #[test]
    fn test_outcome_respects_ranges_and_layout() {
        let pipeline =
            ChunkTransformPipeline::new(ranges(), Box::new(NullPitchAnalyzer)).unwrap();
        let chunk = Chunk::new(3, 12000, tone(0.5));
        let outcome = pipeline.transform_chunk(&chunk, 7).unwrap();

        assert_eq!(outcome.index, 3);
        assert_eq!(outcome.audio.sample_rate(), 8000);
        assert_eq!(outcome.audio.channels(), 1);
        let expected = (4000.0 / outcome.parameters.speed_ratio).round() as usize;
        assert_eq!(outcome.audio.frames(), expected);
        assert!(outcome.audio.samples().iter().all(|s| (-1.0..=1.0).contains(s)));
        assert!(outcome.parameters.foreign_clip.is_none());
    }

    #[test]
    fn test_short_chunk_keeps_length() {
        let pipeline =
            ChunkTransformPipeline::new(ranges(), Box::new(NullPitchAnalyzer)).unwrap();
        let chunk = Chunk::new(0, 0, tone(0.1));
        let outcome = pipeline.transform_chunk(&chunk, 1).unwrap();
        assert_eq!(outcome.audio.frames(), chunk.frames());
        assert_eq!(outcome.length_ratio, 1.0);
    }

    #[test]
    fn test_analyzer_sees_mixed_chunk() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let pipeline = ChunkTransformPipeline::new(
            ranges(),
            Box::new(RecordingAnalyzer { seen: seen.clone() }),
        )
        .unwrap()
        .with_clip_pool(vec![tone(2.0)]);
        let outcome = pipeline.transform_chunk(&Chunk::new(0, 0, tone(0.5)), 9).unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![4000]);
        assert_eq!(outcome.detected_pitch, Some(300.0));
        assert_eq!(outcome.parameters.foreign_clip, Some(0));
    }

    #[test]
    fn test_invalid_ranges_rejected_up_front() {
        let bad = ParameterRanges {
            pitch: (2.0, -2.0),
            ..ranges()
        };
        assert!(ChunkTransformPipeline::new(bad, Box::new(NullPitchAnalyzer)).is_err());
    }

    #[test]
    fn test_sequential_and_threaded_runs_match() {
        let pipeline = ChunkTransformPipeline::new(ranges(), Box::new(NullPitchAnalyzer))
            .unwrap()
            .with_clip_pool(vec![tone(0.3), tone(1.0)]);
        let chunks = Chunker::split(&tone(3.0), 500).unwrap();

        let sequential = pipeline
            .run(&chunks, 11, &SequentialChunkExecutor, &mut NullPipelineLogger)
            .unwrap();
        let threaded = pipeline
            .run(&chunks, 11, &ThreadedChunkExecutor::new(4), &mut NullPipelineLogger)
            .unwrap();
        assert_eq!(sequential, threaded);
        assert_eq!(sequential.len(), 6);
    }

    #[test]
    fn test_run_reports_every_chunk() {
        let pipeline =
            ChunkTransformPipeline::new(ranges(), Box::new(NullPitchAnalyzer)).unwrap();
        let chunks = Chunker::split(&tone(2.0), 500).unwrap();
        let mut logger = StdoutPipelineLogger::new(1);
        pipeline
            .run(&chunks, 3, &SequentialChunkExecutor, &mut logger)
            .unwrap();

        for stage in STAGES {
            assert_eq!(logger.timing_stats(stage).unwrap().count, 4);
        }
        assert_eq!(logger.metric_stats("chunk_len_ratio").unwrap().count, 4);
        assert!(logger.metric_stats("detected_pitch_hz").is_none());
    }
}
