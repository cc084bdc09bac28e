use serde::{Deserialize, Serialize};

/// Kind of a single data cache access.
///
/// Instruction fetches never reach the data cache and a modify is
/// counted as one `LOAD` followed by one `STORE`.
#[derive(
    Debug,
    strum::EnumIter,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
)]
pub enum AccessKind {
    LOAD,
    STORE,
}
