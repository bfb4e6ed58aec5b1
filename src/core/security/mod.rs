//! Filesystem access control.
//!
//! Paths handed to tools are resolved through a [`PathGuard`] so file access
//! stays inside the configured root directory and follows the symlink policy.

pub mod path_guard;

pub use path_guard::{PathGuard, PathSecurityError};
