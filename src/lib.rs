//! A lock-free, linked-list-backed stack and a threaded workload that
//! stresses it.
//!
//! ```
//! use lockfree_stack::{ConcurrentStack, Node};
//!
//! let stack = ConcurrentStack::new();
//! stack.push(Node::new(1));
//! stack.push(Node::new(2));
//! assert_eq!(stack.pop(), Some(2));
//! assert_eq!(stack.to_string(), "Total number of operations: 3, Current size: 1");
//! ```

mod error;
mod node;
mod stack;
pub mod sync;
pub mod workload;

pub use error::{Error, Result};
pub use node::Node;
pub use stack::{ConcurrentStack, StackSummary};
