//! Particle feed: schema, frame decoding, and the render hand-off

pub mod frame;
pub mod handoff;
pub mod parser;
pub mod particle;

pub use frame::ScatterFrame;
pub use handoff::{frame_slot, CloseFlag, PushResult, SlotReceiver, SlotSender};
pub use parser::{frame_from_records, parse_batch, DecodeError};
pub use particle::{ParticleRecord, SIZE_SCALE};
