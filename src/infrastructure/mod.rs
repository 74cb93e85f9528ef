//! Infrastructure layer - framework implementations
//!
//! This layer contains:
//! - Media storage backends (local_store, ftp_store)
//! - Application state (state)
//! - HTTP server setup (server)

pub mod ftp_store;
pub mod local_store;
pub mod server;
pub mod state;

pub use ftp_store::FtpStore;
pub use local_store::LocalStore;
pub use state::AppState;
