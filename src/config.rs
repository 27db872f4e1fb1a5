use rand_core::RngCore;

use crate::CAN_PAYLOAD_BYTES;

/// Half width of the random spread added to the device update interval
pub const UPDATE_JITTER_SPREAD_MILLIS: i32 = 250;

/// Bus and timing settings shared by every GM7 device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProtocolConfig {
    pub baudrate: u32,
    pub message_length: u8,
    pub use_extended_ids: bool,
    pub heartbeat_interval_millis: u32,
    /// A remote device counts as offline when no heartbeat arrived within
    /// this many milliseconds
    pub heartbeat_timeout_millis: u32,
    pub device_update_interval_millis: u32,
}

impl ProtocolConfig {
    pub const DEFAULT: Self = Self {
        baudrate: 500_000,
        message_length: CAN_PAYLOAD_BYTES as u8,
        use_extended_ids: true,
        heartbeat_interval_millis: 1000,
        heartbeat_timeout_millis: 1250,
        device_update_interval_millis: 30_000,
    };

    /// The device update interval with one device's jitter applied
    pub fn device_update_interval(&self, jitter: &UpdateJitter) -> u32 {
        self.device_update_interval_millis
            .saturating_add_signed(jitter.spread())
    }
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A random offset in `-250..250` milliseconds for one device's update
/// interval.
///
/// Device updates are multi-frame bursts. When a whole installation powers
/// up at once, the offset keeps the nodes from bursting in lockstep. Every
/// device owns its own jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UpdateJitter {
    spread: i32,
}

impl UpdateJitter {
    pub fn new(rng: &mut impl RngCore) -> Self {
        let mut jitter = Self::default();
        jitter.randomize(rng);
        jitter
    }

    /// Draws a new offset
    pub fn randomize(&mut self, rng: &mut impl RngCore) {
        let width = (2 * UPDATE_JITTER_SPREAD_MILLIS) as u32;
        self.spread = (rng.next_u32() % width) as i32 - UPDATE_JITTER_SPREAD_MILLIS;

        #[cfg(feature = "defmt")]
        defmt::trace!("device update jitter set to {=i32} ms", self.spread);
    }

    pub fn spread(&self) -> i32 {
        self.spread
    }
}
