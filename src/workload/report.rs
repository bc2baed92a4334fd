use core::fmt;
use std::time::Duration;

use crate::error::Result;
use crate::stack::StackSummary;

/// What one worker did, as counted by the worker itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerReport {
    pub id: usize,
    pub elapsed: Duration,
    pub reads: usize,
    pub pushes: usize,
    pub pops: usize,
    /// Pops that found the stack empty
    pub empty_pops: usize,
    /// Pushes issued after the worker's node pool ran dry
    pub rejected_pushes: usize,
}

impl WorkerReport {
    /// Operations that moved the stack's operation counter.
    pub fn counted_ops(&self) -> usize {
        self.reads + self.pushes + self.pops
    }
}

pub type WorkerOutcome = Result<WorkerReport>;

#[derive(Debug)]
pub struct WorkloadReport {
    pub before: StackSummary,
    pub after: StackSummary,
    pub workers: Vec<WorkerOutcome>,
    pub elapsed: Duration,
}

impl WorkloadReport {
    pub fn completed(&self) -> impl Iterator<Item = &WorkerReport> {
        self.workers.iter().filter_map(|w| w.as_ref().ok())
    }

    pub fn failed(&self) -> usize {
        self.workers.iter().filter(|w| w.is_err()).count()
    }

    pub fn counted_ops(&self) -> usize {
        self.completed().map(WorkerReport::counted_ops).sum()
    }

    pub fn pushes(&self) -> usize {
        self.completed().map(|w| w.pushes).sum()
    }

    pub fn pops(&self) -> usize {
        self.completed().map(|w| w.pops).sum()
    }
}

impl fmt::Display for WorkloadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Before running the threads --> {}", self.before)?;
        for worker in &self.workers {
            match worker {
                Ok(w) => writeln!(f, "thread {}: {} ms", w.id, w.elapsed.as_millis())?,
                Err(e) => writeln!(f, "{}", e)?,
            }
        }
        write!(f, "After running the threads --> {}", self.after)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn renders_textual_report() {
        let report = WorkloadReport {
            before: StackSummary {
                ops_count: 50,
                size: 50,
            },
            after: StackSummary {
                ops_count: 62,
                size: 52,
            },
            workers: vec![
                Ok(WorkerReport {
                    id: 1,
                    elapsed: Duration::from_millis(17),
                    reads: 6,
                    pushes: 4,
                    pops: 2,
                    ..WorkerReport::default()
                }),
                Err(Error::WorkerPanicked { id: 2 }),
            ],
            elapsed: Duration::from_millis(20),
        };

        assert_eq!(
            report.to_string(),
            "Before running the threads --> Total number of operations: 50, Current size: 50\n\
             thread 1: 17 ms\n\
             worker thread 2 panicked\n\
             After running the threads --> Total number of operations: 62, Current size: 52"
        );
        assert_eq!(report.counted_ops(), 12);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.pushes(), 4);
        assert_eq!(report.pops(), 2);
    }
}
