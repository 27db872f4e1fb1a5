//! Payload layouts of the GM7 messages.
//!
//! Every encoder zeroes the whole buffer before writing, so unused bytes are
//! always sent as 0. Multi-byte fields are big-endian at fixed offsets.

use core::str;

use heapless::String;

use crate::{
    codec::{clear, read_str, read_u16, read_u32, read_u64, write_str, write_u16, write_u32, write_u64},
    PayloadError, CAN_PAYLOAD_BYTES,
};

/// Model, vendor and short name strings (up to a full payload, no terminator
/// when all 8 bytes are used)
pub type DeviceString = String<CAN_PAYLOAD_BYTES>;

/// A fixed layout payload which knows how to write itself into, and read
/// itself back from, a frame's data bytes
pub trait Payload: Sized {
    /// Smallest buffer the payload can be encoded into
    const MIN_LENGTH: usize;

    fn encode(&self, buffer: &mut [u8]) -> Result<(), PayloadError>;
    fn decode(buffer: &[u8]) -> Result<Self, PayloadError>;
}

/// Zeroes the buffer, then makes sure `required` bytes are available
fn prepare(buffer: &mut [u8], required: usize) -> Result<(), PayloadError> {
    clear(buffer, buffer.len());

    if buffer.len() < required {
        return Err(PayloadError::InsufficientCapacity {
            required,
            capacity: buffer.len(),
        });
    }

    Ok(())
}

/* Heartbeat */

/// Sent every heartbeat interval. The previous timestamp is only carried when
/// the buffer has room for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Heartbeat {
    pub millis_current: u32,
    pub millis_last: u32,
}

impl Payload for Heartbeat {
    const MIN_LENGTH: usize = 4;

    fn encode(&self, buffer: &mut [u8]) -> Result<(), PayloadError> {
        prepare(buffer, Self::MIN_LENGTH)?;

        write_u32(buffer, self.millis_current, 0)?;
        if buffer.len() > 7 {
            write_u32(buffer, self.millis_last, 4)?;
        }

        Ok(())
    }

    fn decode(buffer: &[u8]) -> Result<Self, PayloadError> {
        let millis_current = read_u32(buffer, 0)?;
        let millis_last = if buffer.len() > 7 {
            read_u32(buffer, 4)?
        } else {
            0
        };

        Ok(Self {
            millis_current,
            millis_last,
        })
    }
}

pub fn encode_heartbeat(
    buffer: &mut [u8],
    millis_current: u32,
    millis_last: u32,
) -> Result<(), PayloadError> {
    Heartbeat {
        millis_current,
        millis_last,
    }
    .encode(buffer)
}

/* Device information */

pub fn encode_serial_number(buffer: &mut [u8], serial_number: u64) -> Result<(), PayloadError> {
    prepare(buffer, 8)?;
    write_u64(buffer, serial_number, 0)
}

pub fn decode_serial_number(buffer: &[u8]) -> Result<u64, PayloadError> {
    read_u64(buffer, 0)
}

pub fn encode_type_id(buffer: &mut [u8], type_id: u16) -> Result<(), PayloadError> {
    prepare(buffer, 2)?;
    write_u16(buffer, type_id, 0)
}

pub fn decode_type_id(buffer: &[u8]) -> Result<u16, PayloadError> {
    read_u16(buffer, 0)
}

fn encode_device_string(buffer: &mut [u8], value: &str) -> Result<usize, PayloadError> {
    clear(buffer, buffer.len());
    write_str(buffer, value.as_bytes(), 0)
}

/// Writes as many bytes of `model` as fit. Returns the number written.
pub fn encode_model(buffer: &mut [u8], model: &str) -> Result<usize, PayloadError> {
    encode_device_string(buffer, model)
}

pub fn encode_vendor(buffer: &mut [u8], vendor: &str) -> Result<usize, PayloadError> {
    encode_device_string(buffer, vendor)
}

pub fn encode_short_name(buffer: &mut [u8], short_name: &str) -> Result<usize, PayloadError> {
    encode_device_string(buffer, short_name)
}

/// Decodes a model, vendor or short name payload
pub fn decode_device_string(buffer: &[u8]) -> Result<DeviceString, PayloadError> {
    let bytes = read_str(buffer, 0)?;
    let text = str::from_utf8(bytes)?;

    let mut result = DeviceString::new();
    result
        .push_str(text)
        .map_err(|_| PayloadError::StringTooLong(bytes.len()))?;

    Ok(result)
}

/* Per-category runtime state */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusAndProgress {
    pub status: u32,
    pub progress: u16,
    pub progress_max: u16,
}

impl Payload for StatusAndProgress {
    const MIN_LENGTH: usize = 8;

    fn encode(&self, buffer: &mut [u8]) -> Result<(), PayloadError> {
        prepare(buffer, Self::MIN_LENGTH)?;

        write_u32(buffer, self.status, 0)?;
        write_u16(buffer, self.progress, 4)?;
        write_u16(buffer, self.progress_max, 6)
    }

    fn decode(buffer: &[u8]) -> Result<Self, PayloadError> {
        Ok(Self {
            status: read_u32(buffer, 0)?,
            progress: read_u16(buffer, 4)?,
            progress_max: read_u16(buffer, 6)?,
        })
    }
}

pub fn encode_status_and_progress(
    buffer: &mut [u8],
    status: u32,
    progress: u16,
    progress_max: u16,
) -> Result<(), PayloadError> {
    StatusAndProgress {
        status,
        progress,
        progress_max,
    }
    .encode(buffer)
}

pub fn decode_status_and_progress(buffer: &[u8]) -> Result<StatusAndProgress, PayloadError> {
    StatusAndProgress::decode(buffer)
}

/// Main, validation and internal timer payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerStatus {
    /// Milliseconds left on the timer
    pub remaining: u32,
    /// Milliseconds the timer was set to
    pub set: u32,
}

impl Payload for TimerStatus {
    const MIN_LENGTH: usize = 8;

    fn encode(&self, buffer: &mut [u8]) -> Result<(), PayloadError> {
        prepare(buffer, Self::MIN_LENGTH)?;

        write_u32(buffer, self.remaining, 0)?;
        write_u32(buffer, self.set, 4)
    }

    fn decode(buffer: &[u8]) -> Result<Self, PayloadError> {
        Ok(Self {
            remaining: read_u32(buffer, 0)?,
            set: read_u32(buffer, 4)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Tries {
    pub current: u16,
    pub max: u16,
    /// Counts every try, across resets of `current`
    pub total: u16,
    pub flags: u16,
}

impl Payload for Tries {
    const MIN_LENGTH: usize = 8;

    fn encode(&self, buffer: &mut [u8]) -> Result<(), PayloadError> {
        prepare(buffer, Self::MIN_LENGTH)?;

        write_u16(buffer, self.current, 0)?;
        write_u16(buffer, self.max, 2)?;
        write_u16(buffer, self.total, 4)?;
        write_u16(buffer, self.flags, 6)
    }

    fn decode(buffer: &[u8]) -> Result<Self, PayloadError> {
        Ok(Self {
            current: read_u16(buffer, 0)?,
            max: read_u16(buffer, 2)?,
            total: read_u16(buffer, 4)?,
            flags: read_u16(buffer, 6)?,
        })
    }
}

/* Requests */

/// GPIO request for a controller, all nodes or all devices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GpioMask {
    /// Pins to switch on
    pub on: u32,
    /// Pins to switch off
    pub off: u32,
}

impl Payload for GpioMask {
    const MIN_LENGTH: usize = 8;

    fn encode(&self, buffer: &mut [u8]) -> Result<(), PayloadError> {
        prepare(buffer, Self::MIN_LENGTH)?;

        write_u32(buffer, self.on, 0)?;
        write_u32(buffer, self.off, 4)
    }

    fn decode(buffer: &[u8]) -> Result<Self, PayloadError> {
        Ok(Self {
            on: read_u32(buffer, 0)?,
            off: read_u32(buffer, 4)?,
        })
    }
}

/// GPIO on/off request for one node. Which of the two it is comes from the
/// PMID ([`REQUEST_GPIO_ON`](crate::pmid::REQUEST_GPIO_ON) or
/// [`REQUEST_GPIO_OFF`](crate::pmid::REQUEST_GPIO_OFF)).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AddressedGpio {
    pub target: u16,
    pub pins: u32,
}

impl Payload for AddressedGpio {
    const MIN_LENGTH: usize = 6;

    fn encode(&self, buffer: &mut [u8]) -> Result<(), PayloadError> {
        prepare(buffer, Self::MIN_LENGTH)?;

        write_u16(buffer, self.target, 0)?;
        write_u32(buffer, self.pins, 2)
    }

    fn decode(buffer: &[u8]) -> Result<Self, PayloadError> {
        Ok(Self {
            target: addressed_target(buffer)?,
            pins: read_u32(buffer, 2)?,
        })
    }
}

/// The device id leading the payload of every addressed request, used by
/// nodes to drop requests meant for someone else
pub fn addressed_target(buffer: &[u8]) -> Result<u16, PayloadError> {
    read_u16(buffer, 0)
}
