#![allow(
    clippy::upper_case_acronyms,
    non_camel_case_types,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc,
    clippy::cast_possible_truncation
)]

pub mod addrdec;
pub mod cache;
pub mod config;
pub mod report;
pub mod sim;
pub mod trace;

#[cfg(test)]
pub mod testing;

pub use cache::{AccessOutcome, Cache};
pub use sim::{simulate, Simulator};

pub type address = u64;

/// Width of an address in bits.
pub const ADDRESS_BITS: u32 = address::BITS;
