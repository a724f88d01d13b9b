//! Background prefetching of batches

use super::source::BatchSource;
use crate::train::AudioBatch;
use crate::{Error, Result};
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};

struct Worker<S> {
    rx: Receiver<Result<AudioBatch>>,
    handle: JoinHandle<S>,
}

/// Pulls batches from a source on a background thread.
///
/// At most `depth` fully materialized batches wait in the queue. The worker
/// runs until the current schedule is exhausted or the first error, which is
/// delivered in order. `reset` discards queued batches and reschedules the
/// wrapped source.
pub struct Prefetcher<S: BatchSource + Send + 'static> {
    source: Option<S>,
    worker: Option<Worker<S>>,
    depth: usize,
    batches_per_epoch: Option<usize>,
}

impl<S: BatchSource + Send + 'static> Prefetcher<S> {
    pub fn new(source: S, depth: usize) -> Self {
        let batches_per_epoch = source.batches_per_epoch();
        Self { source: Some(source), worker: None, depth: depth.max(1), batches_per_epoch }
    }

    fn spawn(&mut self) {
        let Some(mut source) = self.source.take() else {
            return;
        };
        let (tx, rx) = mpsc::sync_channel(self.depth);
        let handle = thread::spawn(move || {
            loop {
                match source.next_batch() {
                    Err(e) if e.is_end_of_data() => break,
                    result => {
                        let failed = result.is_err();
                        if tx.send(result).is_err() || failed {
                            break;
                        }
                    }
                }
            }
            source
        });
        self.worker = Some(Worker { rx, handle });
    }

    /// Stop the worker and take the source back
    fn park(&mut self) -> Result<()> {
        if let Some(Worker { rx, handle }) = self.worker.take() {
            drop(rx);
            let source = handle
                .join()
                .map_err(|_| Error::Audio("prefetch worker panicked".to_string()))?;
            self.source = Some(source);
        }
        Ok(())
    }
}

impl<S: BatchSource + Send + 'static> BatchSource for Prefetcher<S> {
    fn next_batch(&mut self) -> Result<AudioBatch> {
        if self.worker.is_none() {
            self.spawn();
        }
        match &self.worker {
            Some(worker) => worker.rx.recv().unwrap_or(Err(Error::EndOfData)),
            None => Err(Error::EndOfData),
        }
    }

    fn reset(&mut self) -> Result<()> {
        self.park()?;
        match self.source.as_mut() {
            Some(source) => source.reset(),
            None => Err(Error::Audio("prefetch source was lost".to_string())),
        }
    }

    fn batches_per_epoch(&self) -> Option<usize> {
        self.batches_per_epoch
    }
}

impl<S: BatchSource + Send + 'static> Drop for Prefetcher<S> {
    fn drop(&mut self) {
        let _ = self.park();
    }
}
