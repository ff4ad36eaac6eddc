//! Core type definitions using newtype and enum patterns for type safety.
//!
//! These types prevent common logic errors by making invalid states
//! unrepresentable at compile time.

mod apk;
mod kind;
mod report_id;

pub use apk::{ApkFile, InputSpec, TargetError};
pub use kind::AppKind;
pub use report_id::{ReportId, ReportIdError};
