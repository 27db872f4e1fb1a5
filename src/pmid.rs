//! The shared registry of PMIDs (priority/message IDs) and device type IDs.
//!
//! Lower values win bus arbitration, so the registry is laid out in sections
//! from most to least urgent. Every named value lives in exactly one section
//! and no two names share a value; both rules are checked at compile time.

/// Returned by per-category lookups for categories without a PMID. No
/// registered PMID is zero.
pub const NO_PMID: u16 = 0;

/* Emergency calls */

/// Orders every device to kill the power it relays, receives and uses
pub const EMERGENCY_SHUTDOWN: u16 = 2;
/// Orders every device to return to a safe state immediately
pub const EMERGENCY_FAILSAFE: u16 = 3;
/// Signals a possible fire to anything able to display it
pub const EMERGENCY_FIRE_ALARM: u16 = 4;

/* Heartbeats, one per device category */

pub const HEARTBEAT_CONTROLLER: u16 = 201;
pub const HEARTBEAT_MODULE: u16 = 202;
pub const HEARTBEAT_PERIPHERAL: u16 = 203;
pub const HEARTBEAT_EXTERNAL_DEVICE: u16 = 204;

/* Generic statuses */

pub const STATUS_CONTROLLER: u16 = 1001;
pub const STATUS_MODULE: u16 = 1002;
pub const STATUS_PERIPHERAL: u16 = 1003;
pub const STATUS_EXTERNAL_DEVICE: u16 = 1004;

/* Requests for controllers */

pub const REQUEST_CONTROLLER_STATUS_CHANGE: u16 = 2001;
/// u32 pins to turn on, u32 pins to turn off
pub const REQUEST_CONTROLLER_GPIO: u16 = 2011;

/* Requests addressed to a single node, the payload starts with its u16 device id */

pub const REQUEST_STATUS_CHANGE: u16 = 2101;
/// u16 device id, u32 pins to turn on
pub const REQUEST_GPIO_ON: u16 = 2111;
/// u16 device id, u32 pins to turn off
pub const REQUEST_GPIO_OFF: u16 = 2112;
pub const REQUEST_PROGRESS_SET: u16 = 2113;

/* Requests for every node except controllers */

pub const REQUEST_ALL_NODES_STATUS_CHANGE: u16 = 2201;
pub const REQUEST_ALL_NODES_GPIO: u16 = 2211;

/* Requests for every device, controllers included */

pub const REQUEST_ALL_STATUS_CHANGE: u16 = 2301;
pub const REQUEST_ALL_GPIO: u16 = 2311;

/* Device information */

/// u64 serial number
pub const DEVICE_SERIAL: u16 = 4001;
/// Up to 8 bytes, NUL terminated when shorter
pub const DEVICE_MODEL: u16 = 4002;
/// u16 device type id
pub const DEVICE_TYPE_ID: u16 = 4003;
pub const DEVICE_VENDOR: u16 = 4004;
pub const DEVICE_SHORT_NAME: u16 = 4005;
pub const DEVICE_VITALS_DEBUGGING: u16 = 4006;
pub const DEVICE_STATUS: u16 = 4007;
pub const DEVICE_VITALS_BATTERY: u16 = 4008;
pub const DEVICE_VITALS_CONNECTION: u16 = 4009;

/* Device registration and device type ids */

/// A device asking any controller to register it, with its device type id as
/// payload. Shares its value with the start of the device type section.
pub const DEVICE_REGISTRATION_REQUEST: u16 = 4100;

pub const DEVICE_TYPE_CONTROLLER_SBC: u16 = 4101;
pub const DEVICE_TYPE_CONTROLLER_MCU: u16 = 4102;
pub const DEVICE_TYPE_CONTROLLER_SERVER: u16 = 4103;
pub const DEVICE_TYPE_CONTROLLER_USB: u16 = 4104;
pub const DEVICE_TYPE_CONTROLLER_SERIAL: u16 = 4105;
pub const DEVICE_TYPE_CONTROLLER_WEBAPP: u16 = 4106;
pub const DEVICE_TYPE_CONTROLLER_WINPC: u16 = 4107;
pub const DEVICE_TYPE_CONTROLLER_UNIX: u16 = 4108;
pub const DEVICE_TYPE_CONTROLLER_MACOS: u16 = 4109;
pub const DEVICE_TYPE_CONTROLLER_MOBILE: u16 = 4110;
pub const DEVICE_TYPE_CONTROLLER_IOS: u16 = 4111;
pub const DEVICE_TYPE_CONTROLLER_ANDROID: u16 = 4112;
pub const DEVICE_TYPE_CONTROLLER_GENERIC: u16 = 4113;
/// Universal Time Bomb
pub const DEVICE_TYPE_CONTROLLER_GM7UTB: u16 = 4114;
/// Universal Controller System
pub const DEVICE_TYPE_CONTROLLER_GM7UCS: u16 = 4115;
/// Advanced Controller System
pub const DEVICE_TYPE_CONTROLLER_GM7ACS: u16 = 4116;
/// Ambient Effects Module
pub const DEVICE_TYPE_CONTROLLER_GM7AEM: u16 = 4117;
/// Generic Room Controller
pub const DEVICE_TYPE_CONTROLLER_GM7GRC: u16 = 4118;
pub const DEVICE_TYPE_CONTROLLER_OEM: u16 = 4119;
pub const DEVICE_TYPE_CONTROLLER_DEV: u16 = 4120;
pub const DEVICE_TYPE_CONTROLLER_TEST: u16 = 4121;
pub const DEVICE_TYPE_CONTROLLER_DEBUG: u16 = 4122;

/// Counts down
pub const DEVICE_TYPE_MODULE_TIMER: u16 = 4201;
/// Counts up
pub const DEVICE_TYPE_MODULE_CLOCK: u16 = 4202;
pub const DEVICE_TYPE_MODULE_TIMERCLOCK: u16 = 4203;
pub const DEVICE_TYPE_MODULE_DIAGNOSTICS: u16 = 4204;
pub const DEVICE_TYPE_MODULE_SENSOR: u16 = 4205;
pub const DEVICE_TYPE_MODULE_ACTUATOR: u16 = 4206;
pub const DEVICE_TYPE_MODULE_GENERIC_IO: u16 = 4207;
/// Only reads from the bus. Classified as read-only despite its module id.
pub const DEVICE_TYPE_MODULE_GENERIC_RO: u16 = 4208;
pub const DEVICE_TYPE_MODULE_GAME_MODULE: u16 = 4209;
pub const DEVICE_TYPE_MODULE_TEST: u16 = 4210;

pub const DEVICE_TYPE_PERIPHERAL_KEYBOARD: u16 = 4301;

pub const DEVICE_TYPE_EXTERNAL_GENERIC: u16 = 4401;

/* Per-category runtime state */

/// u32 status, u16 progress, u16 progress max
pub const CONTROLLER_STATUS_AND_PROGRESS: u16 = 5101;
/// u32 time left, u32 time set
pub const CONTROLLER_MAIN_TIMER_STATUS: u16 = 5102;
pub const CONTROLLER_VALIDATION_TIMER_STATUS: u16 = 5103;
pub const CONTROLLER_INTERNAL_TIMER_STATUS: u16 = 5104;
/// u16 tries, u16 max tries, u16 total tries, u16 setting flags
pub const CONTROLLER_TRIES: u16 = 5105;

pub const MODULE_STATUS_AND_PROGRESS: u16 = 5301;
pub const MODULE_MAIN_TIMER_STATUS: u16 = 5302;
pub const MODULE_VALIDATION_TIMER_STATUS: u16 = 5303;
pub const MODULE_INTERNAL_TIMER_STATUS: u16 = 5304;
pub const MODULE_TRIES: u16 = 5305;

pub const PERIPHERAL_STATUS_AND_PROGRESS: u16 = 5501;
pub const PERIPHERAL_MAIN_TIMER_STATUS: u16 = 5502;
pub const PERIPHERAL_VALIDATION_TIMER_STATUS: u16 = 5503;
pub const PERIPHERAL_INTERNAL_TIMER_STATUS: u16 = 5504;
pub const PERIPHERAL_TRIES: u16 = 5505;

pub const EXTERNAL_DEVICE_STATUS_AND_PROGRESS: u16 = 5701;
pub const EXTERNAL_DEVICE_MAIN_TIMER_STATUS: u16 = 5702;
pub const EXTERNAL_DEVICE_VALIDATION_TIMER_STATUS: u16 = 5703;
pub const EXTERNAL_DEVICE_INTERNAL_TIMER_STATUS: u16 = 5704;
pub const EXTERNAL_DEVICE_TRIES: u16 = 5705;

/* Ranges */

/// An inclusive range of identifiers. Section endpoints are reserved and
/// never used as device type ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PmidRange {
    pub start: u16,
    pub end: u16,
}

impl PmidRange {
    pub const fn new(start: u16, end: u16) -> Self {
        Self { start, end }
    }

    /// `start <= value <= end`
    pub const fn contains(&self, value: u16) -> bool {
        self.start <= value && value <= self.end
    }

    /// `start < value < end`
    pub const fn contains_strict(&self, value: u16) -> bool {
        self.start < value && value < self.end
    }

    pub const fn overlaps(&self, other: &PmidRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    pub const fn encloses(&self, other: &PmidRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

pub const DEVICE_TYPE_CONTROLLER_RANGE: PmidRange = PmidRange::new(4100, 4199);
pub const DEVICE_TYPE_MODULE_RANGE: PmidRange = PmidRange::new(4200, 4299);
pub const DEVICE_TYPE_PERIPHERAL_RANGE: PmidRange = PmidRange::new(4300, 4399);
pub const DEVICE_TYPE_EXTERNAL_RANGE: PmidRange = PmidRange::new(4400, 4499);

/// Device type sub-ranges in classification order
pub const DEVICE_TYPE_RANGES: [PmidRange; 4] = [
    DEVICE_TYPE_CONTROLLER_RANGE,
    DEVICE_TYPE_MODULE_RANGE,
    DEVICE_TYPE_PERIPHERAL_RANGE,
    DEVICE_TYPE_EXTERNAL_RANGE,
];

/// Top level sections of the identifier space, ordered by priority
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Section {
    Emergency,
    Heartbeat,
    Status,
    ControllerRequest,
    /// Requests for one node, see [`is_addressed`]
    AddressedRequest,
    AllNodesRequest,
    AllDevicesRequest,
    DeviceInfo,
    DeviceType,
    ControllerState,
    ModuleState,
    PeripheralState,
    ExternalDeviceState,
}

impl Section {
    pub const ALL: [Section; 13] = [
        Self::Emergency,
        Self::Heartbeat,
        Self::Status,
        Self::ControllerRequest,
        Self::AddressedRequest,
        Self::AllNodesRequest,
        Self::AllDevicesRequest,
        Self::DeviceInfo,
        Self::DeviceType,
        Self::ControllerState,
        Self::ModuleState,
        Self::PeripheralState,
        Self::ExternalDeviceState,
    ];

    pub const fn range(&self) -> PmidRange {
        match self {
            Self::Emergency => PmidRange::new(1, 99),
            Self::Heartbeat => PmidRange::new(200, 299),
            Self::Status => PmidRange::new(1000, 1099),
            Self::ControllerRequest => PmidRange::new(2000, 2099),
            Self::AddressedRequest => PmidRange::new(2100, 2199),
            Self::AllNodesRequest => PmidRange::new(2200, 2299),
            Self::AllDevicesRequest => PmidRange::new(2300, 2399),
            Self::DeviceInfo => PmidRange::new(4000, 4099),
            Self::DeviceType => PmidRange::new(4100, 4499),
            Self::ControllerState => PmidRange::new(5100, 5299),
            Self::ModuleState => PmidRange::new(5300, 5499),
            Self::PeripheralState => PmidRange::new(5500, 5699),
            Self::ExternalDeviceState => PmidRange::new(5700, 5899),
        }
    }

    /// The section `pmid` falls in, if any
    pub const fn of(pmid: u16) -> Option<Section> {
        let mut i = 0;

        while i < Self::ALL.len() {
            if Self::ALL[i].range().contains(pmid) {
                return Some(Self::ALL[i]);
            }
            i += 1;
        }

        None
    }
}

/// Whether `pmid` is a request addressed to a single node. The section
/// endpoints are filter bounds, not requests.
pub const fn is_addressed(pmid: u16) -> bool {
    Section::AddressedRequest.range().contains_strict(pmid)
}

/* Registry table */

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EntryKind {
    /// Used as the PMID of a frame
    Message,
    /// Carried in registration payloads to identify what a device is
    DeviceType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PmidEntry {
    pub name: &'static str,
    pub value: u16,
    pub kind: EntryKind,
}

macro_rules! entries {
    ($($kind:ident: $($name:ident),+ $(,)?);+ $(;)?) => {
        &[$($(PmidEntry {
            name: stringify!($name),
            value: $name,
            kind: EntryKind::$kind,
        }),+),+]
    };
}

/// Every named identifier of the protocol
pub const REGISTRY: &[PmidEntry] = entries![
    Message:
        EMERGENCY_SHUTDOWN, EMERGENCY_FAILSAFE, EMERGENCY_FIRE_ALARM,
        HEARTBEAT_CONTROLLER, HEARTBEAT_MODULE, HEARTBEAT_PERIPHERAL, HEARTBEAT_EXTERNAL_DEVICE,
        STATUS_CONTROLLER, STATUS_MODULE, STATUS_PERIPHERAL, STATUS_EXTERNAL_DEVICE,
        REQUEST_CONTROLLER_STATUS_CHANGE, REQUEST_CONTROLLER_GPIO,
        REQUEST_STATUS_CHANGE, REQUEST_GPIO_ON, REQUEST_GPIO_OFF, REQUEST_PROGRESS_SET,
        REQUEST_ALL_NODES_STATUS_CHANGE, REQUEST_ALL_NODES_GPIO,
        REQUEST_ALL_STATUS_CHANGE, REQUEST_ALL_GPIO,
        DEVICE_SERIAL, DEVICE_MODEL, DEVICE_TYPE_ID, DEVICE_VENDOR, DEVICE_SHORT_NAME,
        DEVICE_VITALS_DEBUGGING, DEVICE_STATUS, DEVICE_VITALS_BATTERY, DEVICE_VITALS_CONNECTION,
        DEVICE_REGISTRATION_REQUEST,
        CONTROLLER_STATUS_AND_PROGRESS, CONTROLLER_MAIN_TIMER_STATUS,
        CONTROLLER_VALIDATION_TIMER_STATUS, CONTROLLER_INTERNAL_TIMER_STATUS, CONTROLLER_TRIES,
        MODULE_STATUS_AND_PROGRESS, MODULE_MAIN_TIMER_STATUS,
        MODULE_VALIDATION_TIMER_STATUS, MODULE_INTERNAL_TIMER_STATUS, MODULE_TRIES,
        PERIPHERAL_STATUS_AND_PROGRESS, PERIPHERAL_MAIN_TIMER_STATUS,
        PERIPHERAL_VALIDATION_TIMER_STATUS, PERIPHERAL_INTERNAL_TIMER_STATUS, PERIPHERAL_TRIES,
        EXTERNAL_DEVICE_STATUS_AND_PROGRESS, EXTERNAL_DEVICE_MAIN_TIMER_STATUS,
        EXTERNAL_DEVICE_VALIDATION_TIMER_STATUS, EXTERNAL_DEVICE_INTERNAL_TIMER_STATUS,
        EXTERNAL_DEVICE_TRIES;
    DeviceType:
        DEVICE_TYPE_CONTROLLER_SBC, DEVICE_TYPE_CONTROLLER_MCU, DEVICE_TYPE_CONTROLLER_SERVER,
        DEVICE_TYPE_CONTROLLER_USB, DEVICE_TYPE_CONTROLLER_SERIAL, DEVICE_TYPE_CONTROLLER_WEBAPP,
        DEVICE_TYPE_CONTROLLER_WINPC, DEVICE_TYPE_CONTROLLER_UNIX, DEVICE_TYPE_CONTROLLER_MACOS,
        DEVICE_TYPE_CONTROLLER_MOBILE, DEVICE_TYPE_CONTROLLER_IOS, DEVICE_TYPE_CONTROLLER_ANDROID,
        DEVICE_TYPE_CONTROLLER_GENERIC, DEVICE_TYPE_CONTROLLER_GM7UTB,
        DEVICE_TYPE_CONTROLLER_GM7UCS, DEVICE_TYPE_CONTROLLER_GM7ACS,
        DEVICE_TYPE_CONTROLLER_GM7AEM, DEVICE_TYPE_CONTROLLER_GM7GRC, DEVICE_TYPE_CONTROLLER_OEM,
        DEVICE_TYPE_CONTROLLER_DEV, DEVICE_TYPE_CONTROLLER_TEST, DEVICE_TYPE_CONTROLLER_DEBUG,
        DEVICE_TYPE_MODULE_TIMER, DEVICE_TYPE_MODULE_CLOCK, DEVICE_TYPE_MODULE_TIMERCLOCK,
        DEVICE_TYPE_MODULE_DIAGNOSTICS, DEVICE_TYPE_MODULE_SENSOR, DEVICE_TYPE_MODULE_ACTUATOR,
        DEVICE_TYPE_MODULE_GENERIC_IO, DEVICE_TYPE_MODULE_GENERIC_RO,
        DEVICE_TYPE_MODULE_GAME_MODULE, DEVICE_TYPE_MODULE_TEST,
        DEVICE_TYPE_PERIPHERAL_KEYBOARD,
        DEVICE_TYPE_EXTERNAL_GENERIC;
];

// A colliding or misplaced identifier fails the build
const _: () = assert!(check(REGISTRY).is_ok(), "PMID registry is inconsistent");
const _: () = assert!(check_ranges().is_ok(), "PMID sections overlap");

/* Consistency checks */

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegistryError {
    #[error("{first} and {second} share the value {value}")]
    Collision {
        first: &'static str,
        second: &'static str,
        value: u16,
    },
    #[error("{name} ({value}) is not inside any section it may live in")]
    Unsectioned { name: &'static str, value: u16 },
    #[error("Ranges {0:?} and {1:?} overlap")]
    OverlappingRanges(PmidRange, PmidRange),
}

/// Verifies that no two entries share a value, that every message lies in a
/// [`Section`] and that every device type lies strictly inside one of the
/// [`DEVICE_TYPE_RANGES`].
pub const fn check(entries: &[PmidEntry]) -> Result<(), RegistryError> {
    let mut i = 0;

    while i < entries.len() {
        let entry = entries[i];

        let placed = match entry.kind {
            EntryKind::Message => Section::of(entry.value).is_some(),
            EntryKind::DeviceType => device_type_range_index(entry.value).is_some(),
        };

        if !placed {
            return Err(RegistryError::Unsectioned {
                name: entry.name,
                value: entry.value,
            });
        }

        let mut j = i + 1;
        while j < entries.len() {
            if entries[j].value == entry.value {
                return Err(RegistryError::Collision {
                    first: entry.name,
                    second: entries[j].name,
                    value: entry.value,
                });
            }
            j += 1;
        }

        i += 1;
    }

    Ok(())
}

/// Verifies that sections are pairwise disjoint and that the device type
/// sub-ranges are disjoint and tile the device type section.
pub const fn check_ranges() -> Result<(), RegistryError> {
    let mut i = 0;
    while i < Section::ALL.len() {
        let mut j = i + 1;
        while j < Section::ALL.len() {
            let (a, b) = (Section::ALL[i].range(), Section::ALL[j].range());
            if a.overlaps(&b) {
                return Err(RegistryError::OverlappingRanges(a, b));
            }
            j += 1;
        }
        i += 1;
    }

    let outer = Section::DeviceType.range();

    let mut i = 0;
    while i < DEVICE_TYPE_RANGES.len() {
        let range = DEVICE_TYPE_RANGES[i];
        if !outer.encloses(&range) {
            return Err(RegistryError::OverlappingRanges(outer, range));
        }

        let mut j = i + 1;
        while j < DEVICE_TYPE_RANGES.len() {
            if range.overlaps(&DEVICE_TYPE_RANGES[j]) {
                return Err(RegistryError::OverlappingRanges(range, DEVICE_TYPE_RANGES[j]));
            }
            j += 1;
        }
        i += 1;
    }

    Ok(())
}

/// Index into [`DEVICE_TYPE_RANGES`] of the sub-range strictly containing `id`
pub(crate) const fn device_type_range_index(id: u16) -> Option<usize> {
    let mut i = 0;

    while i < DEVICE_TYPE_RANGES.len() {
        if DEVICE_TYPE_RANGES[i].contains_strict(id) {
            return Some(i);
        }
        i += 1;
    }

    None
}

/// Finds the registry entry for a value
pub fn lookup(value: u16) -> Option<&'static PmidEntry> {
    REGISTRY.iter().find(|entry| entry.value == value)
}

/// Finds the registry entry for a constant name, e.g. `"DEVICE_SERIAL"`
pub fn by_name(name: &str) -> Option<&'static PmidEntry> {
    REGISTRY.iter().find(|entry| entry.name == name)
}
