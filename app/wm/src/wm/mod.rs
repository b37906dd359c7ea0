//! The window manager core.
//!
//! Leaf modules first: geometry, layout and the window stack are pure; the
//! registry owns the model and writes the change ledger; the consumer turns
//! ledger records into backend calls; the manager and the actor drive it all
//! from protocol events and user commands.

pub mod actor;
pub mod backend;
pub mod client;
pub mod consumer;
pub mod context;
pub mod cycle;
pub mod events;
pub mod geometry;
pub mod layout;
pub mod ledger;
pub mod manager;
pub mod registry;
pub mod rules;
pub mod snapshot;
pub mod stack;
pub mod workspace;

pub use actor::{WmActor, WmHandle, WmMessage};
pub use backend::{Backend, RecordingBackend};
pub use events::{Command, Input, ProtocolEvent};
pub use manager::WindowManager;
pub use registry::Registry;
