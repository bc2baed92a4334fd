#![cfg(not(loom))]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use lockfree_stack::{ConcurrentStack, Node};

const THREADS: usize = 8;
const PER_THREAD: usize = 2_000;

fn drain<T>(stack: &ConcurrentStack<T>) -> Vec<T> {
    std::iter::from_fn(|| stack.pop()).collect()
}

#[test]
fn no_lost_pushes() {
    let stack = ConcurrentStack::new();
    thread::scope(|s| {
        for t in 0..THREADS {
            let stack = &stack;
            s.spawn(move || {
                for i in 0..PER_THREAD {
                    stack.push(Node::new(t * PER_THREAD + i));
                }
            });
        }
    });

    assert_eq!(stack.chain_len(), THREADS * PER_THREAD);
    assert_eq!(stack.size(), (THREADS * PER_THREAD) as isize);
    assert_eq!(stack.ops_count(), THREADS * PER_THREAD);

    let mut values = drain(&stack);
    values.sort_unstable();
    assert_eq!(values, (0..THREADS * PER_THREAD).collect::<Vec<_>>());
    assert!(stack.is_empty());
}

#[test]
fn no_duplicate_pops() {
    let mut stack = ConcurrentStack::new();
    let popped: Vec<Vec<usize>> = thread::scope(|s| {
        for t in 0..THREADS / 2 {
            let stack = &stack;
            s.spawn(move || {
                for i in 0..PER_THREAD {
                    stack.push(Node::new(t * PER_THREAD + i));
                }
            });
        }
        let poppers: Vec<_> = (0..THREADS / 2)
            .map(|_| {
                let stack = &stack;
                s.spawn(move || (0..PER_THREAD).filter_map(|_| stack.pop()).collect::<Vec<_>>())
            })
            .collect();
        poppers.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let popped: Vec<usize> = popped.into_iter().flatten().collect();
    let unique: HashSet<usize> = popped.iter().copied().collect();
    assert_eq!(unique.len(), popped.len(), "a value was popped twice");

    let remaining = stack.snapshot();
    assert_eq!(remaining.len(), stack.chain_len());
    assert_eq!(stack.size(), remaining.len() as isize);
    assert_eq!(stack.ops_count(), (THREADS / 2) * PER_THREAD + popped.len());

    let mut all: Vec<usize> = popped.into_iter().chain(remaining).collect();
    all.sort_unstable();
    assert_eq!(all, (0..(THREADS / 2) * PER_THREAD).collect::<Vec<_>>());
}

#[test]
fn chain_is_well_formed_after_interleaved_ops() {
    let mut stack = ConcurrentStack::new();
    for v in 0..1_000 {
        stack.push(Node::new(v));
    }

    thread::scope(|s| {
        for t in 0..THREADS {
            let stack = &stack;
            s.spawn(move || {
                for i in 0..PER_THREAD {
                    if (i + t) % 3 == 0 {
                        stack.pop();
                    } else {
                        stack.push(Node::new(10_000 + t * PER_THREAD + i));
                    }
                    if i % 100 == 0 {
                        // Walking concurrently must terminate.
                        stack.chain_len();
                    }
                }
            });
        }
    });

    let live = stack.snapshot();
    let unique: HashSet<usize> = live.iter().copied().collect();
    assert_eq!(unique.len(), live.len());
    assert_eq!(live.len(), stack.chain_len());
    assert_eq!(stack.size(), live.len() as isize);
}

#[test]
fn ops_count_never_decreases() {
    let stack = ConcurrentStack::new();
    let done = AtomicBool::new(false);

    thread::scope(|s| {
        let observer = s.spawn(|| {
            let mut last = 0;
            let mut readings = 0usize;
            while !done.load(Ordering::Acquire) {
                let now = stack.ops_count();
                assert!(now >= last, "ops_count went from {} to {}", last, now);
                last = now;
                readings += 1;
            }
            readings
        });

        let workers: Vec<_> = (0..4)
            .map(|t| {
                let stack = &stack;
                s.spawn(move || {
                    for i in 0..PER_THREAD {
                        match i % 3 {
                            0 => {
                                stack.increment_ops();
                            }
                            1 => stack.push(Node::new(t * PER_THREAD + i)),
                            _ => {
                                stack.pop();
                            }
                        }
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }
        done.store(true, Ordering::Release);
        assert!(observer.join().unwrap() > 0);
    });
}

#[test]
fn empty_stack_stays_empty_under_concurrent_pops() {
    let stack: ConcurrentStack<u64> = ConcurrentStack::new();
    thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                for _ in 0..1_000 {
                    assert_eq!(stack.pop(), None);
                }
            });
        }
    });
    assert!(stack.is_empty());
    assert_eq!(stack.ops_count(), 0);
    assert_eq!(stack.size(), 0);
}

#[test]
fn sequential_push_then_pop_across_threads() {
    let stack = ConcurrentStack::new();
    thread::scope(|s| {
        s.spawn(|| {
            for v in [10, 20, 30] {
                stack.push(Node::new(v));
            }
        });
    });
    let popped = thread::scope(|s| {
        s.spawn(|| (0..4).map(|_| stack.pop()).collect::<Vec<_>>())
            .join()
            .unwrap()
    });
    assert_eq!(popped, vec![Some(30), Some(20), Some(10), None]);
}
