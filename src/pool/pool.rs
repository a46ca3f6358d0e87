use futures::future::join_all;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::config::Config;
use super::processor::BatchProcessor;
use super::types::{EpochId, PoolError};

/// One start/stop generation: its cancellation handle and the workers that
/// must exit before `stop` returns.
struct Epoch {
    id: EpochId,
    cancel: CancellationToken,
    workers: Vec<JoinHandle<()>>,
}

/// Batching worker pool.
///
/// Items pushed with [`send`](WorkerPool::send) are pulled by `worker_num`
/// tasks, each accumulating a private batch that is handed to the processor
/// when it holds `batch_size` items, when no item arrived for
/// `flush_timeout`, or when the pool shuts down.
///
/// Clones share the same queue, processor and lifecycle. `start` and `stop`
/// must not race each other; callers serialize them.
pub struct WorkerPool<T> {
    config: Arc<Config>,
    sender: Arc<StdMutex<Option<mpsc::Sender<T>>>>,
    receiver: Arc<Mutex<mpsc::Receiver<T>>>,
    processor: Arc<dyn BatchProcessor<T>>,
    epoch: Arc<StdMutex<Option<Epoch>>>,
    last_epoch: Arc<AtomicU64>,
}

impl<T> Clone for WorkerPool<T> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            sender: self.sender.clone(),
            receiver: self.receiver.clone(),
            processor: self.processor.clone(),
            epoch: self.epoch.clone(),
            last_epoch: self.last_epoch.clone(),
        }
    }
}

impl<T> WorkerPool<T>
where
    T: Send + Sync + 'static,
{
    /// Creates an inert pool. No task is spawned until [`start`](Self::start).
    pub fn new<P>(config: Arc<Config>, processor: P) -> Self
    where
        P: BatchProcessor<T> + 'static,
    {
        let (sender, receiver) = mpsc::channel(config.queue_capacity);

        Self {
            config,
            sender: Arc::new(StdMutex::new(Some(sender))),
            receiver: Arc::new(Mutex::new(receiver)),
            processor: Arc::new(processor),
            epoch: Arc::new(StdMutex::new(None)),
            last_epoch: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns true between an effective `start` and the next `stop`.
    pub fn is_running(&self) -> bool {
        self.epoch().is_some()
    }

    /// Id of the running epoch, if any.
    pub fn epoch(&self) -> Option<EpochId> {
        self.epoch
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|epoch| epoch.id)
    }

    /// Spawns the workers on the current tokio runtime and returns without
    /// waiting for them.
    ///
    /// While an epoch is running this is a no-op returning that epoch's id.
    /// Cancelling `parent` shuts the workers down like [`stop`](Self::stop)
    /// does, but the epoch stays registered until `stop` is called.
    pub fn start(&self, parent: &CancellationToken) -> Result<EpochId, PoolError> {
        let mut slot = self.epoch.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(epoch) = slot.as_ref() {
            return Ok(epoch.id);
        }

        let handle = Handle::try_current()?;
        let id = EpochId(self.last_epoch.fetch_add(1, Ordering::Relaxed) + 1);
        let cancel = parent.child_token();

        let workers = (0..self.config.worker_num)
            .map(|worker_id| {
                let receiver = self.receiver.clone();
                let process = self.processor.clone();
                let cancel_token = cancel.clone();
                let batch_size = self.config.batch_size;
                let flush_timeout = self.config.flush_timeout;

                handle.spawn(async move {
                    Self::worker(
                        id,
                        worker_id,
                        receiver,
                        process,
                        cancel_token,
                        batch_size,
                        flush_timeout,
                    )
                    .await
                })
            })
            .collect();

        info!(
            epoch = %id,
            workers = self.config.worker_num,
            batch_size = self.config.batch_size,
            "worker pool started"
        );

        *slot = Some(Epoch {
            id,
            cancel,
            workers,
        });
        Ok(id)
    }

    /// Enqueues an item, waiting while the queue is full.
    ///
    /// Items sent before `start` stay queued until workers run. The item is
    /// handed back only if the queue was closed with [`close`](Self::close).
    pub async fn send(&self, item: T) -> Result<(), mpsc::error::SendError<T>> {
        let sender = self
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        match sender {
            Some(sender) => sender.send(item).await,
            None => Err(mpsc::error::SendError(item)),
        }
    }

    /// Closes the inbound queue. Workers flush what is left and exit; later
    /// sends fail. A closed pool cannot be reopened.
    pub fn close(&self) {
        let sender = self
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if sender.is_some() {
            debug!("worker pool input closed");
        }
    }

    /// Cancels the running epoch and waits until each of its workers has
    /// flushed and exited. A following `start` opens a new epoch.
    pub async fn stop(&self) {
        let epoch = self
            .epoch
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(epoch) = epoch else {
            return;
        };

        epoch.cancel.cancel();

        let results = join_all(epoch.workers).await;
        for (worker_id, result) in results.into_iter().enumerate() {
            if let Err(e) = result {
                error!(epoch = %epoch.id, worker_id, error = %e, "worker task failed");
            }
        }

        info!(epoch = %epoch.id, "worker pool stopped");
    }

    async fn worker(
        epoch: EpochId,
        worker_id: usize,
        receiver: Arc<Mutex<mpsc::Receiver<T>>>,
        process: Arc<dyn BatchProcessor<T>>,
        cancel_token: CancellationToken,
        batch_size: usize,
        flush_timeout: Duration,
    ) {
        debug!(%epoch, worker_id, "worker started");

        let mut batch: Vec<T> = Vec::with_capacity(batch_size);
        let mut ticker = interval_at(Instant::now() + flush_timeout, flush_timeout);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                _ = cancel_token.cancelled() => {
                    Self::drain_and_process(&receiver, &*process, &mut batch, batch_size).await;
                    debug!(%epoch, worker_id, "worker shut down");
                    return;
                }

                _ = ticker.tick() => {
                    Self::process_queue(&cancel_token, &*process, &mut batch).await;
                }

                item = async {
                    let mut rx = receiver.lock().await;
                    rx.recv().await
                } => {
                    match item {
                        Some(item) => {
                            // idle timeout counts from the last received item
                            ticker.reset();
                            batch.push(item);

                            if batch.len() >= batch_size {
                                Self::process_queue(&cancel_token, &*process, &mut batch).await;
                            }
                        }
                        None => {
                            let shutdown = CancellationToken::new();
                            Self::process_queue(&shutdown, &*process, &mut batch).await;
                            debug!(%epoch, worker_id, "input closed, worker exiting");
                            return;
                        }
                    }
                }
            }
        }
    }

    /// Pulls whatever is still queued into the batch and flushes it with a
    /// token that is never cancelled.
    async fn drain_and_process(
        receiver: &Mutex<mpsc::Receiver<T>>,
        process: &dyn BatchProcessor<T>,
        batch: &mut Vec<T>,
        batch_size: usize,
    ) {
        let shutdown = CancellationToken::new();

        loop {
            let item = {
                let mut rx = receiver.lock().await;
                rx.try_recv().ok()
            };
            match item {
                Some(item) => {
                    batch.push(item);
                    if batch.len() >= batch_size {
                        Self::process_queue(&shutdown, process, batch).await;
                    }
                }
                None => break,
            }
        }

        Self::process_queue(&shutdown, process, batch).await;
    }

    async fn process_queue(
        ctx: &CancellationToken,
        process: &dyn BatchProcessor<T>,
        batch: &mut Vec<T>,
    ) {
        if batch.is_empty() {
            return;
        }

        debug!(items = batch.len(), "flushing batch");
        process.process(ctx, batch.as_slice()).await;
        batch.clear();
    }
}
