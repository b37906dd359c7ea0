//! Tessellate - policy core of a tiling window manager.
//!
//! The crate owns the model of managed windows, their grouping into
//! workspaces and lettered contexts, their stacking order and the geometry
//! each one gets under the workspace's layout. Display access goes through
//! the traits in [`wm::backend`]; an in-memory backend drives the tests and
//! the `replay` subcommand.

pub mod cli;
pub mod config;
pub mod error;
pub mod schema;
pub mod wm;
