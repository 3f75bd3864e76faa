//! Survey Right live hub
//!
//! Tracks which dashboard viewers are watching which survey and fans out
//! newly created responses to them.

pub mod accept;
pub mod connection;
pub mod dispatcher;
pub mod error;
pub mod registry;

#[cfg(test)]
pub(crate) mod testing;

pub use accept::{run_viewer, InboundFrame};
pub use connection::{ConnectionId, Payload, ViewerConnection};
pub use dispatcher::{BroadcastReport, HubConfig, LiveHub};
pub use error::{HubError, HubResult};
pub use registry::ConnectionRegistry;
