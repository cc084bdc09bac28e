#![allow(non_camel_case_types, clippy::upper_case_acronyms)]

pub mod cache;
pub mod mem;

pub use cache::{Cache, PerformanceCounters};
pub use mem::AccessKind;
