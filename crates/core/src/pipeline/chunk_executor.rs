use crate::audio::domain::chunk::Chunk;
use crate::pipeline::chunk_transform_pipeline::{ChunkOutcome, ChunkTransformPipeline};
use crate::shared::error::WarpError;

/// Abstracts how the per-chunk transforms are scheduled.
///
/// Implementations must return outcomes in chunk order and must call
/// `on_done` once per finished chunk, from the calling thread. Because every
/// chunk carries its own seed, the schedule never changes the output.
pub trait ChunkExecutor: Send + Sync {
    fn execute(
        &self,
        pipeline: &ChunkTransformPipeline,
        chunks: &[Chunk],
        seeds: &[u64],
        on_done: &mut dyn FnMut(&ChunkOutcome),
    ) -> Result<Vec<ChunkOutcome>, WarpError>;
}

/// Runs chunks one after another on the calling thread.
pub struct SequentialChunkExecutor;

impl ChunkExecutor for SequentialChunkExecutor {
    fn execute(
        &self,
        pipeline: &ChunkTransformPipeline,
        chunks: &[Chunk],
        seeds: &[u64],
        on_done: &mut dyn FnMut(&ChunkOutcome),
    ) -> Result<Vec<ChunkOutcome>, WarpError> {
        if chunks.len() != seeds.len() {
            return Err(WarpError::invalid(format!(
                "{} chunks but {} seeds",
                chunks.len(),
                seeds.len()
            )));
        }
        let mut outcomes = Vec::with_capacity(chunks.len());
        for (chunk, &seed) in chunks.iter().zip(seeds) {
            let outcome = pipeline.transform_chunk(chunk, seed)?;
            on_done(&outcome);
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }
}
