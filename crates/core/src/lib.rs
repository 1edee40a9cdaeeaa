//! Domain logic for deposit tracking.
//!
//! Everything here is pure: no database or runtime dependencies. The `db`
//! crate persists the records whose rules live in these modules.

pub mod error;
pub mod lccn;
pub mod package;
pub mod paths;
pub mod project;
pub mod receipt;
pub mod transfer_type;
pub mod types;
