//! Simple worker pool demo showing size and idle-timeout flushes.
//!
//! Run with: cargo run --example simple_pool

use async_trait::async_trait;
use batchpool::pool::{BatchProcessor, ConfigBuilder, WorkerPool};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Simple processor that prints batch information
struct PrintingProcessor;

#[async_trait]
impl BatchProcessor<i32> for PrintingProcessor {
    async fn process(&self, _ctx: &CancellationToken, items: &[i32]) {
        tracing::info!(len = items.len(), ?items, "processing batch");
        // Simulate some work
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,batchpool=debug".into()),
        )
        .init();

    let config = Arc::new(
        ConfigBuilder::default()
            .queue_capacity(16usize)
            .batch_size(10usize)
            .flush_timeout(Duration::from_millis(500))
            .worker_num(2usize)
            .build()?,
    );

    let pool = WorkerPool::new(config, PrintingProcessor);
    let cancel = CancellationToken::new();
    pool.start(&cancel)?;

    // Producer: full batches first, then a trickle that only idle flushes pick up
    let producer = pool.clone();
    let handle = tokio::spawn(async move {
        for i in 0..45 {
            producer.send(i).await?;
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
        for i in 45..48 {
            producer.send(i).await?;
        }
        Ok::<_, tokio::sync::mpsc::error::SendError<i32>>(())
    });
    handle.await??;

    tokio::time::sleep(Duration::from_secs(1)).await;

    // Restart: a new epoch picks up where the previous one stopped
    pool.stop().await;
    pool.start(&cancel)?;
    for i in 48..50 {
        pool.send(i).await?;
    }
    pool.stop().await;

    tracing::info!("worker pool demo completed");
    Ok(())
}
