//! Posesync client library
//!
//! Connects to the relay, runs the capture → estimate → send loop for the
//! local participant, and keeps one render resource per participant in
//! step with the shared state the relay broadcasts.

pub mod capture;
pub mod config;
pub mod error;
pub mod network;
pub mod render;
pub mod session;
pub mod state;

pub use config::Config;
pub use error::ClientError;
pub use session::Session;
