//! Analysis document model
//!
//! The document produced by the monthly fund-report analysis pipeline.
//! Every field is optional: missing or `null` values deserialize to
//! empty/zero so that rendering never fails on a sparse document.

pub mod error;
pub mod month;
pub mod types;

pub use error::*;
pub use month::*;
pub use types::*;
