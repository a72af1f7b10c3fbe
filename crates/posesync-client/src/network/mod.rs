mod websocket;

pub use websocket::{RelayClient, SampleSink};
