//! Shared access-control and mutation rules for catalog resources.
//!
//! Every catalog domain (http refs, exercises, workouts, mental activities,
//! mental workouts, nutrition items) stores two flavors of the same record:
//! default rows that are visible to everyone and immutable, and custom rows
//! that belong to exactly one user. The pieces in this module implement the
//! rules shared by all of them: which flavor a caller may see, who may
//! mutate, how a sparse update payload is diffed against stored state, and
//! how lists of referenced sub-resources are resolved.

pub mod diff;
pub mod error;
pub mod ownership;
pub mod resolver;

pub use diff::Differ;
pub use error::CatalogError;
pub use ownership::{validate_access, AccessMode, Owned, Visibility};
pub use resolver::{require_all, require_same_owner, Identified};
