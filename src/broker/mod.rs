//! Broker connectivity: STOMP wire codec and the session client.

pub mod client;
pub mod frame;

pub use client::{BrokerClient, BrokerError, SessionState};
pub use frame::{FrameDecoder, FrameError, StompFrame};
