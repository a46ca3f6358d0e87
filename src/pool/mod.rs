pub mod config;
pub mod pool;
pub mod processor;
pub mod types;

pub use config::{Config, ConfigBuilder, ConfigBuilderError};
pub use pool::WorkerPool;
pub use processor::BatchProcessor;
pub use types::{EpochId, PoolError};
