//! lockfree-stack: runs the mixed read/pop/push workload against one shared
//! stack and prints the before/after summaries and per-thread timings.
//!
//! ```bash
//! lockfree-stack --threads 8 --ops-per-thread 100000 --seed 42
//! ```
//!
//! Logs go to stderr and are filtered with `RUST_LOG` (default `info`).

use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use lockfree_stack::workload::{
    OpMix, WorkloadConfig, WorkloadDriver, NODES_PER_THREAD_DEFAULT, OPS_PER_THREAD_DEFAULT,
    PREPOPULATE_DEFAULT, THREADS_DEFAULT, VALUE_MAX_DEFAULT,
};
use lockfree_stack::ConcurrentStack;

#[derive(Parser, Debug)]
#[command(name = "lockfree-stack")]
#[command(about = "Stress a lock-free stack with concurrent reads, pops and pushes")]
struct Cli {
    /// Number of worker threads.
    #[arg(long, env = "LFSTACK_THREADS", default_value_t = THREADS_DEFAULT)]
    threads: usize,

    /// Operations issued by each worker.
    #[arg(long, env = "LFSTACK_OPS_PER_THREAD", default_value_t = OPS_PER_THREAD_DEFAULT)]
    ops_per_thread: usize,

    /// Pre-built nodes handed to each worker.
    #[arg(long, env = "LFSTACK_NODES_PER_THREAD", default_value_t = NODES_PER_THREAD_DEFAULT)]
    nodes_per_thread: usize,

    /// Nodes pushed before the workers start.
    #[arg(long, env = "LFSTACK_PREPOPULATE", default_value_t = PREPOPULATE_DEFAULT)]
    prepopulate: usize,

    /// Largest node payload.
    #[arg(long, env = "LFSTACK_VALUE_MAX", default_value_t = VALUE_MAX_DEFAULT)]
    value_max: u32,

    /// Op codes up to this value read the size.
    #[arg(long, env = "LFSTACK_READ_MAX", default_value_t = 50)]
    read_max: u8,

    /// Op codes above `--read-max` and up to this value pop; the rest push.
    #[arg(long, env = "LFSTACK_POP_MAX", default_value_t = 75)]
    pop_max: u8,

    /// Seed for op codes and payloads (random if not set).
    #[arg(long, env = "LFSTACK_SEED")]
    seed: Option<u64>,
}

impl Cli {
    fn into_config(self) -> WorkloadConfig {
        WorkloadConfig {
            threads: self.threads,
            ops_per_thread: self.ops_per_thread,
            nodes_per_thread: self.nodes_per_thread,
            prepopulate: self.prepopulate,
            value_max: self.value_max,
            mix: OpMix {
                read_max: self.read_max,
                pop_max: self.pop_max,
            },
            seed: self.seed,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let driver = match WorkloadDriver::new(Cli::parse().into_config()) {
        Ok(driver) => driver,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let stack = ConcurrentStack::new();
    let report = driver.run(&stack);

    println!();
    println!("{report}");
    println!();
    ExitCode::SUCCESS
}
