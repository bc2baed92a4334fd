use std::hint;
use std::sync::Barrier;
use std::thread::{self, ScopedJoinHandle};
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, error, info, info_span, warn};

use crate::error::{Error, Result};
use crate::node::Node;
use crate::stack::ConcurrentStack;

use super::{OpCode, OpMix, Operation, WorkerOutcome, WorkerReport, WorkloadConfig, WorkloadReport};

/// Everything one worker will do, generated before any worker starts.
#[derive(Debug)]
pub struct WorkerPlan {
    pub id: usize,
    pub codes: Vec<OpCode>,
    pub pool: Vec<Node<u32>>,
}

impl WorkerPlan {
    pub fn generate<R: Rng>(id: usize, config: &WorkloadConfig, rng: &mut R) -> Self {
        let codes = (0..config.ops_per_thread)
            .map(|_| OpCode::random(rng))
            .collect();
        let pool = (0..config.nodes_per_thread)
            .map(|_| Node::new(rng.gen_range(0..=config.value_max)))
            .collect();
        Self { id, codes, pool }
    }

    /// Runs the plan against `stack` once `start` releases all workers.
    ///
    /// Waiting on `start` must stay the first thing this does: a worker that
    /// unwound before reaching the barrier would leave every other worker
    /// blocked on it.
    pub fn run(self, stack: &ConcurrentStack<u32>, mix: OpMix, start: &Barrier) -> WorkerReport {
        start.wait();
        let Self { id, codes, mut pool } = self;
        let _span = info_span!("worker", id).entered();
        let mut report = WorkerReport {
            id,
            ..WorkerReport::default()
        };

        let started = Instant::now();
        for code in codes {
            match mix.classify(code) {
                Operation::Read => {
                    hint::black_box(stack.size());
                    stack.increment_ops();
                    report.reads += 1;
                }
                Operation::Pop => match stack.pop() {
                    Some(_) => report.pops += 1,
                    None => report.empty_pops += 1,
                },
                Operation::Push => match stack.try_push(pool.pop()) {
                    Ok(()) => report.pushes += 1,
                    Err(_) => report.rejected_pushes += 1,
                },
            }
        }
        report.elapsed = started.elapsed();

        if report.rejected_pushes > 0 {
            warn!(
                rejected = report.rejected_pushes,
                "node pool ran dry before the plan finished"
            );
        }
        debug!(elapsed = ?report.elapsed, pushes = report.pushes, pops = report.pops, "worker done");
        report
    }
}

/// Runs a [`WorkloadConfig`] against a shared stack.
#[derive(Debug, Clone)]
pub struct WorkloadDriver {
    config: WorkloadConfig,
}

impl WorkloadDriver {
    pub fn new(config: WorkloadConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &WorkloadConfig {
        &self.config
    }

    /// Pre-populates `stack`, runs every worker concurrently and waits for all
    /// of them before taking the final summary.
    ///
    /// A worker that panics is logged and reported as
    /// [`Error::WorkerPanicked`]; the remaining workers still run to completion.
    pub fn run(&self, stack: &ConcurrentStack<u32>) -> WorkloadReport {
        let config = &self.config;
        let seed = config.seed.unwrap_or_else(rand::random);
        let mut rng = StdRng::seed_from_u64(seed);
        info!(
            seed,
            threads = config.threads,
            ops_per_thread = config.ops_per_thread,
            prepopulate = config.prepopulate,
            "starting workload"
        );

        for _ in 0..config.prepopulate {
            stack.push(Node::new(rng.gen_range(0..=config.value_max)));
        }
        let before = stack.summary();

        let plans: Vec<WorkerPlan> = (1..=config.threads)
            .map(|id| {
                let mut worker_rng = StdRng::seed_from_u64(rng.gen());
                WorkerPlan::generate(id, config, &mut worker_rng)
            })
            .collect();

        let start = Barrier::new(plans.len());
        let mix = config.mix;
        let started = Instant::now();
        let workers = thread::scope(|scope| {
            let handles: Vec<_> = plans
                .into_iter()
                .map(|plan| {
                    let id = plan.id;
                    let start = &start;
                    (id, scope.spawn(move || plan.run(stack, mix, start)))
                })
                .collect();
            handles
                .into_iter()
                .map(|(id, handle)| join_worker(id, handle))
                .collect::<Vec<_>>()
        });
        let elapsed = started.elapsed();

        let after = stack.summary();
        info!(%before, %after, ?elapsed, "workload finished");
        WorkloadReport {
            before,
            after,
            workers,
            elapsed,
        }
    }
}

fn join_worker(id: usize, handle: ScopedJoinHandle<'_, WorkerReport>) -> WorkerOutcome {
    handle.join().map_err(|_| {
        error!(worker = id, "worker thread panicked");
        Error::WorkerPanicked { id }
    })
}
