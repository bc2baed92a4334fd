//! A threaded workload that stresses a shared [`ConcurrentStack`] with a mix
//! of reads, pops and pushes.
//!
//! [`ConcurrentStack`]: crate::ConcurrentStack

mod config;
mod driver;
mod op;
mod report;

pub use config::*;
pub use driver::{WorkerPlan, WorkloadDriver};
pub use op::{OpCode, OpMix, Operation};
pub use report::{WorkerOutcome, WorkerReport, WorkloadReport};
