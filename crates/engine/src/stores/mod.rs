//! In-memory state storage modules.

pub mod session;

pub use session::SessionStore;
