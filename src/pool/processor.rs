// src/pool/processor.rs

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Receives every flushed batch.
///
/// `cancel` is the epoch token for regular flushes. Flushes performed while a
/// worker shuts down get a token that is never cancelled, so the final batch
/// can always complete. Failures are the processor's own concern: the pool
/// neither retries nor inspects them.
#[async_trait]
pub trait BatchProcessor<T>: Send + Sync {
    async fn process(&self, cancel: &CancellationToken, items: &[T]);
}

#[async_trait]
impl<T, F, Fut> BatchProcessor<T> for F
where
    F: Fn(&CancellationToken, &[T]) -> Fut + Send + Sync,
    Fut: std::future::Future<Output = ()> + Send,
    T: Send + Sync,
{
    async fn process(&self, ctx: &CancellationToken, items: &[T]) {
        self(ctx, items).await
    }
}
