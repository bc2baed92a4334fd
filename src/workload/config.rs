use crate::error::{Error, Result};

use super::OpMix;

pub const THREADS_DEFAULT: usize = 4;
pub const OPS_PER_THREAD_DEFAULT: usize = 150_000;
pub const NODES_PER_THREAD_DEFAULT: usize = OPS_PER_THREAD_DEFAULT;
pub const PREPOPULATE_DEFAULT: usize = 50_000;
pub const VALUE_MAX_DEFAULT: u32 = 100;

/// Shape of one workload run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadConfig {
    /// Number of worker threads
    pub threads: usize,
    /// Op codes handed to each worker
    pub ops_per_thread: usize,
    /// Pre-built nodes handed to each worker; pushes beyond this are rejected
    pub nodes_per_thread: usize,
    /// Nodes pushed before any worker starts
    pub prepopulate: usize,
    /// Node payloads are drawn from `0..=value_max`
    pub value_max: u32,
    pub mix: OpMix,
    /// Seed for op codes and payloads; a random seed is used when unset
    pub seed: Option<u64>,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            threads: THREADS_DEFAULT,
            ops_per_thread: OPS_PER_THREAD_DEFAULT,
            nodes_per_thread: NODES_PER_THREAD_DEFAULT,
            prepopulate: PREPOPULATE_DEFAULT,
            value_max: VALUE_MAX_DEFAULT,
            mix: OpMix::default(),
            seed: None,
        }
    }
}

impl WorkloadConfig {
    /// A small run, for tests.
    pub fn quick() -> Self {
        Self {
            threads: 4,
            ops_per_thread: 2_000,
            nodes_per_thread: 2_000,
            prepopulate: 500,
            seed: Some(0x5eed),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.threads == 0 {
            return Err(Error::InvalidConfig(
                "at least one worker thread is required".into(),
            ));
        }
        self.mix.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = WorkloadConfig::default();
        assert_eq!(config.threads, 4);
        assert_eq!(config.ops_per_thread, 150_000);
        assert_eq!(config.prepopulate, 50_000);
        assert!(config.validate().is_ok());
        assert!(WorkloadConfig::quick().validate().is_ok());
    }

    #[test]
    fn zero_threads_rejected() {
        let config = WorkloadConfig {
            threads: 0,
            ..WorkloadConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn bad_mix_rejected() {
        let config = WorkloadConfig {
            mix: OpMix {
                read_max: 90,
                pop_max: 10,
            },
            ..WorkloadConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
