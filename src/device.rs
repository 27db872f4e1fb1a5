use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::pmid::{self, device_type_range_index, NO_PMID};

/// Coarse role of a device on the bus, derived from its device type id with
/// [`classify_device_type`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[num_enum(error_type(name = DeviceError, constructor = DeviceError::UnknownCategory))]
#[repr(u8)]
pub enum DeviceCategory {
    Controller = 1,
    Module = 2,
    Peripheral = 3,
    ExternalDevice = 4,
    /// Listens only. Never sends heartbeats or holds per-category state.
    ReadOnly = 5,
}

/// What a per-category PMID is used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[num_enum(error_type(name = DeviceError, constructor = DeviceError::UnknownPurpose))]
#[repr(u8)]
pub enum Purpose {
    Heartbeat = 0,
    Status = 1,
    StatusAndProgress = 2,
    MainTimer = 3,
    ValidationTimer = 4,
    InternalTimer = 5,
    Tries = 6,
}

impl Purpose {
    pub const COUNT: usize = 7;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceError {
    #[error("Tried to decode device category but it was invalid ({0:?})")]
    UnknownCategory(u8),
    #[error("Tried to decode PMID purpose but it was invalid ({0:?})")]
    UnknownPurpose(u8),
}

/// Categories with their own PMIDs, in the order of the rows of
/// [`CATEGORY_PMIDS`] and of [`pmid::DEVICE_TYPE_RANGES`]
const TRANSMITTING: [DeviceCategory; 4] = [
    DeviceCategory::Controller,
    DeviceCategory::Module,
    DeviceCategory::Peripheral,
    DeviceCategory::ExternalDevice,
];

/// Category x purpose, columns in [`Purpose`] order
const CATEGORY_PMIDS: [[u16; Purpose::COUNT]; 4] = [
    [
        pmid::HEARTBEAT_CONTROLLER,
        pmid::STATUS_CONTROLLER,
        pmid::CONTROLLER_STATUS_AND_PROGRESS,
        pmid::CONTROLLER_MAIN_TIMER_STATUS,
        pmid::CONTROLLER_VALIDATION_TIMER_STATUS,
        pmid::CONTROLLER_INTERNAL_TIMER_STATUS,
        pmid::CONTROLLER_TRIES,
    ],
    [
        pmid::HEARTBEAT_MODULE,
        pmid::STATUS_MODULE,
        pmid::MODULE_STATUS_AND_PROGRESS,
        pmid::MODULE_MAIN_TIMER_STATUS,
        pmid::MODULE_VALIDATION_TIMER_STATUS,
        pmid::MODULE_INTERNAL_TIMER_STATUS,
        pmid::MODULE_TRIES,
    ],
    [
        pmid::HEARTBEAT_PERIPHERAL,
        pmid::STATUS_PERIPHERAL,
        pmid::PERIPHERAL_STATUS_AND_PROGRESS,
        pmid::PERIPHERAL_MAIN_TIMER_STATUS,
        pmid::PERIPHERAL_VALIDATION_TIMER_STATUS,
        pmid::PERIPHERAL_INTERNAL_TIMER_STATUS,
        pmid::PERIPHERAL_TRIES,
    ],
    [
        pmid::HEARTBEAT_EXTERNAL_DEVICE,
        pmid::STATUS_EXTERNAL_DEVICE,
        pmid::EXTERNAL_DEVICE_STATUS_AND_PROGRESS,
        pmid::EXTERNAL_DEVICE_MAIN_TIMER_STATUS,
        pmid::EXTERNAL_DEVICE_VALIDATION_TIMER_STATUS,
        pmid::EXTERNAL_DEVICE_INTERNAL_TIMER_STATUS,
        pmid::EXTERNAL_DEVICE_TRIES,
    ],
];

const PURPOSES: [Purpose; Purpose::COUNT] = [
    Purpose::Heartbeat,
    Purpose::Status,
    Purpose::StatusAndProgress,
    Purpose::MainTimer,
    Purpose::ValidationTimer,
    Purpose::InternalTimer,
    Purpose::Tries,
];

impl DeviceCategory {
    const fn row(&self) -> Option<usize> {
        match self {
            Self::Controller => Some(0),
            Self::Module => Some(1),
            Self::Peripheral => Some(2),
            Self::ExternalDevice => Some(3),
            Self::ReadOnly => None,
        }
    }

    pub const fn is_read_only(&self) -> bool {
        matches!(self, Self::ReadOnly)
    }

    /// The category specific PMID for `purpose`, `None` for read-only
    /// devices
    pub const fn pmid(&self, purpose: Purpose) -> Option<u16> {
        match self.row() {
            Some(row) => Some(CATEGORY_PMIDS[row][purpose as usize]),
            None => None,
        }
    }

    /// Which category and purpose a per-category PMID belongs to. Lets a
    /// receiver tell what kind of device sent a heartbeat or state frame.
    pub fn from_pmid(pmid: u16) -> Option<(DeviceCategory, Purpose)> {
        TRANSMITTING
            .iter()
            .zip(CATEGORY_PMIDS.iter())
            .find_map(|(category, row)| {
                PURPOSES
                    .iter()
                    .zip(row.iter())
                    .find(|(_, value)| **value == pmid)
                    .map(|(purpose, _)| (*category, *purpose))
            })
    }
}

/// Derives the device category from a device type id.
///
/// The generic read-only module is always [`DeviceCategory::ReadOnly`]. Other
/// ids must lie strictly inside one of the device type sub-ranges, so the
/// sub-range endpoints and anything outside them are read-only as well.
pub const fn classify_device_type(device_type_id: u16) -> DeviceCategory {
    if device_type_id == pmid::DEVICE_TYPE_MODULE_GENERIC_RO {
        return DeviceCategory::ReadOnly;
    }

    match device_type_range_index(device_type_id) {
        Some(index) => TRANSMITTING[index],
        None => DeviceCategory::ReadOnly,
    }
}

/* Per-category PMID lookups returning NO_PMID for read-only devices */

pub fn pmid_for_heartbeat(category: DeviceCategory) -> u16 {
    category.pmid(Purpose::Heartbeat).unwrap_or(NO_PMID)
}

pub fn pmid_for_status_and_progress(category: DeviceCategory) -> u16 {
    category.pmid(Purpose::StatusAndProgress).unwrap_or(NO_PMID)
}

pub fn pmid_for_main_timer(category: DeviceCategory) -> u16 {
    category.pmid(Purpose::MainTimer).unwrap_or(NO_PMID)
}

pub fn pmid_for_validation_timer(category: DeviceCategory) -> u16 {
    category.pmid(Purpose::ValidationTimer).unwrap_or(NO_PMID)
}

pub fn pmid_for_internal_timer(category: DeviceCategory) -> u16 {
    category.pmid(Purpose::InternalTimer).unwrap_or(NO_PMID)
}
