#![no_std]

pub mod codec;
mod config;
mod device;
mod frame;
mod id;
pub mod payload;
pub mod pmid;

// Module heartbeat from UID 0x0042, 1000 ms after boot:
// ID 0x00CA0042 = PMID 202 << 16 | UID 0x0042, data 00 00 03 E8 00 00 00 00

/// CAN 2.0B carries at most 8 data bytes per frame
pub const CAN_PAYLOAD_BYTES: usize = 8;

pub use codec::PayloadError;
pub use config::*;
pub use device::*;
pub use frame::*;
pub use id::*;
pub use payload::{
    decode_status_and_progress, encode_heartbeat, encode_status_and_progress, Heartbeat, Payload,
    StatusAndProgress,
};

pub use embedded_can::{ExtendedId, Id};
