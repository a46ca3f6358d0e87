// src/pool/config.rs

use derive_builder::Builder;
use std::time::Duration;

use super::types::PoolError;

#[derive(Debug, Clone, Builder)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct Config {
    /// Capacity of the inbound queue shared by all workers
    #[builder(default = "1024")]
    pub(crate) queue_capacity: usize,

    /// Number of concurrent worker tasks
    #[builder(default = "num_cpus::get().max(1)")]
    pub(crate) worker_num: usize,

    /// Maximum number of items in a batch before processing
    #[builder(default = "1")]
    pub(crate) batch_size: usize,

    /// Idle time since the last received item before a partial batch is flushed
    #[builder(default = "Duration::from_secs(5)")]
    pub(crate) flush_timeout: Duration,
}

impl ConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.queue_capacity == Some(0) {
            return Err("queue_capacity must be at least 1".to_string());
        }
        if self.worker_num == Some(0) {
            return Err("worker_num must be at least 1".to_string());
        }
        if self.batch_size == Some(0) {
            return Err("batch_size must be at least 1".to_string());
        }
        if self.flush_timeout == Some(Duration::ZERO) {
            return Err("flush_timeout must be greater than zero".to_string());
        }
        Ok(())
    }
}

impl Config {
    /// Builds a validated config from positional values.
    pub fn new(
        queue_capacity: usize,
        worker_num: usize,
        batch_size: usize,
        flush_timeout: Duration,
    ) -> Result<Self, PoolError> {
        let config = ConfigBuilder::default()
            .queue_capacity(queue_capacity)
            .worker_num(worker_num)
            .batch_size(batch_size)
            .flush_timeout(flush_timeout)
            .build()?;
        Ok(config)
    }

    /// Returns the inbound queue capacity
    #[inline]
    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    /// Returns the number of worker tasks
    #[inline]
    pub fn worker_num(&self) -> usize {
        self.worker_num
    }

    /// Returns the batch size for processing
    #[inline]
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Returns the idle flush timeout
    #[inline]
    pub fn flush_timeout(&self) -> Duration {
        self.flush_timeout
    }
}
