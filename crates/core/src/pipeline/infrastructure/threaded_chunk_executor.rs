use std::sync::atomic::{AtomicBool, Ordering};

use crate::audio::domain::chunk::Chunk;
use crate::pipeline::chunk_executor::ChunkExecutor;
use crate::pipeline::chunk_transform_pipeline::{ChunkOutcome, ChunkTransformPipeline};
use crate::shared::error::WarpError;

/// Transforms chunks on a fixed pool of scoped worker threads.
///
/// Layout: `job queue → N workers → result queue → caller`
///
/// The caller thread collects results, reports them through `on_done` in
/// completion order and reassembles them by chunk index. The first error
/// stops the remaining workers.
pub struct ThreadedChunkExecutor {
    workers: usize,
}

impl ThreadedChunkExecutor {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }
}

impl ChunkExecutor for ThreadedChunkExecutor {
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
        let total = chunks.len();
        let workers = self.workers.min(total.max(1));

        let (job_tx, job_rx) = crossbeam_channel::unbounded::<usize>();
        let (result_tx, result_rx) =
            crossbeam_channel::bounded::<(usize, Result<ChunkOutcome, WarpError>)>(workers * 2);
        for i in 0..total {
            // Receiver is alive; the send cannot fail.
            let _ = job_tx.send(i);
        }
        drop(job_tx);

        let cancelled = AtomicBool::new(false);
        let mut slots: Vec<Option<ChunkOutcome>> = (0..total).map(|_| None).collect();
        let mut first_error: Option<WarpError> = None;

        std::thread::scope(|scope| {
            for _ in 0..workers {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                let cancelled = &cancelled;
                scope.spawn(move || {
                    for i in job_rx {
                        if cancelled.load(Ordering::Relaxed) {
                            break;
                        }
                        let result = pipeline.transform_chunk(&chunks[i], seeds[i]);
                        if result_tx.send((i, result)).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(result_tx);

            for (i, result) in result_rx.iter() {
                match result {
                    Ok(outcome) => {
                        on_done(&outcome);
                        slots[i] = Some(outcome);
                    }
                    Err(e) => {
                        cancelled.store(true, Ordering::Relaxed);
                        if first_error.is_none() {
                            first_error = Some(e);
                        }
                    }
                }
            }
        });

        if let Some(e) = first_error {
            return Err(e);
        }
        slots
            .into_iter()
            .enumerate()
            .map(|(i, slot)| {
                slot.ok_or_else(|| WarpError::invalid(format!("chunk {i} produced no result")))
            })
            .collect()
    }
}
