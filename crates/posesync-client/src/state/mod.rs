pub mod connection;
pub mod shared_view;

pub use connection::{ConnectionState, ConnectionTracker};
pub use shared_view::SharedView;
