//! Live 3D viewer for a broker-fed particle stream
//!
//! Subscribes to a STOMP topic carrying JSON particle batches, decodes
//! them into columnar scatter frames, and draws them in an egui window.
//! A capacity-one hand-off slot couples the network side to the render
//! loop: the newest undelivered frame wins and the producer never waits.

pub mod app;
pub mod broker;
pub mod config;
pub mod feed;
pub mod render;
pub mod theme;
