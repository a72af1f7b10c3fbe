//! Wire types shared by the Posesync relay and its clients.

pub mod error;
pub mod messages;
pub mod table;
pub mod types;

pub use error::ProtocolError;
pub use messages::*;
pub use table::KeyedTable;
pub use types::*;
