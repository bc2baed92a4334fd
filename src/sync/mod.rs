cfg_if::cfg_if! {
    if #[cfg(loom)] {
        pub(crate) use loom::sync::atomic::{AtomicIsize, AtomicUsize};
    } else {
        pub(crate) use std::sync::atomic::{AtomicIsize, AtomicUsize};
    }
}

pub(crate) use std::sync::atomic::Ordering;

mod atomic;
pub use atomic::*;
