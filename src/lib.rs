//! # batchpool
//!
//! A batching worker pool built on Tokio.
//!
//! ## Features
//!
//! - **Concurrent batch processing** with a fixed number of workers
//! - **Idle flushes**: a partial batch is flushed once no item arrived for `flush_timeout`
//! - **Backpressure** via a bounded inbound queue
//! - **Graceful, restartable shutdown**: `stop` drains and flushes everything buffered
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use batchpool::pool::{ConfigBuilder, WorkerPool};
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//!
//! let config = Arc::new(
//!     ConfigBuilder::default()
//!         .batch_size(100usize)
//!         .flush_timeout(Duration::from_secs(1))
//!         .worker_num(4usize)
//!         .build()?,
//! );
//!
//! let pool = WorkerPool::new(config, |_ctx: &CancellationToken, items: &[i32]| {
//!     let len = items.len();
//!     async move { println!("flushed {len} items") }
//! });
//!
//! pool.start(&CancellationToken::new())?;
//! pool.send(1).await?;
//! pool.stop().await;
//! ```
//!
//! ## Modules
//!
//! - [`pool`] - Batching worker pool, its configuration and processor trait

pub mod pool;
