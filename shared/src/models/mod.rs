//! Registry data models
//!
//! Shared between lab-server and its clients (via API).
//! Member identifiers are [`MemberId`] values serialized as strings
//! (`PHDC07MVSD`); child-row ids are `i64` (SQLite INTEGER PRIMARY KEY).

pub mod identity;
pub mod member;
pub mod notification;
pub mod profile;

// Re-exports
pub use identity::*;
pub use member::*;
pub use notification::*;
pub use profile::*;
