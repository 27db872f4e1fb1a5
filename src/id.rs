use embedded_can::ExtendedId;

/// Number of low identifier bits holding the UID
pub const UID_BITS: u32 = 16;
pub const UID_MASK: u32 = 0xFFFF;

/// Number of high identifier bits holding the PMID
pub const PMID_BITS: u32 = 13;
pub const PMID_MAX: u16 = (1 << PMID_BITS) - 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IdError {
    #[error("Encoded message ID ({0:#x}) does not fit in a 29 bit extended ID")]
    OutOfRange(u32),
}

/// The 29 bit extended CAN identifier used by every GM7 frame.
///
/// The high 13 bits carry the PMID (priority/message ID), which names the
/// message and doubles as its arbitration priority since lower identifiers
/// win the bus. The low 16 bits carry the UID, taken from the low bits of the
/// sender's serial number, so two devices broadcasting the same message never
/// produce the same identifier.
///
/// ```text
///  28                 16 15                              0
///  p p p p p p p p p p p p p u u u u u u u u u u u u u u u u
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MessageId {
    pub pmid: u16,
    pub uid: u16,
}

impl MessageId {
    pub const fn new(pmid: u16, uid: u16) -> Self {
        Self { pmid, uid }
    }

    /// Splits a raw identifier into its PMID and UID halves
    pub const fn decode(raw: u32) -> Self {
        Self {
            pmid: (raw >> UID_BITS) as u16,
            uid: (raw & UID_MASK) as u16,
        }
    }

    /// Joins PMID and UID into a raw identifier. The PMID is not range
    /// checked, a value above [`PMID_MAX`] spills past bit 28 (see
    /// [`MessageId::fits`]).
    pub const fn encode(&self) -> u32 {
        encode_message_id(self.pmid, self.uid)
    }

    /// Whether the PMID fits in its 13 bits
    pub const fn fits(&self) -> bool {
        self.pmid <= PMID_MAX
    }
}

pub const fn encode_message_id(pmid: u16, uid: u16) -> u32 {
    ((pmid as u32) << UID_BITS) | uid as u32
}

impl From<MessageId> for u32 {
    fn from(id: MessageId) -> Self {
        id.encode()
    }
}

impl From<ExtendedId> for MessageId {
    fn from(id: ExtendedId) -> Self {
        Self::decode(id.as_raw())
    }
}

impl TryFrom<MessageId> for ExtendedId {
    type Error = IdError;

    fn try_from(id: MessageId) -> Result<Self, Self::Error> {
        let raw = id.encode();

        ExtendedId::new(raw).ok_or(IdError::OutOfRange(raw))
    }
}

#[cfg(test)]
mod tests {
    use embedded_can::ExtendedId;

    use super::*;

    #[test]
    fn decode_splits_pmid_and_uid() {
        assert_eq!(MessageId::decode(0x00C9_0001), MessageId::new(201, 1));
        assert_eq!(MessageId::decode(0x1FFF_FFFF), MessageId::new(PMID_MAX, 0xFFFF));
        assert_eq!(MessageId::decode(0), MessageId::default());
    }

    #[test]
    fn encode_joins_pmid_and_uid() {
        assert_eq!(encode_message_id(201, 1), 0x00C9_0001);
        assert_eq!(MessageId::new(PMID_MAX, 0xFFFF).encode(), 0x1FFF_FFFF);
        assert_eq!(u32::from(MessageId::new(2, 0x1234)), 0x0002_1234);
    }

    #[test]
    fn raw_ids_round_trip() {
        // Stride through the whole 29 bit space, plus both ends
        let mut raw = 0u32;
        while raw <= 0x1FFF_FFFF {
            assert_eq!(MessageId::decode(raw).encode(), raw);
            raw += 65_521;
        }

        assert_eq!(MessageId::decode(0x1FFF_FFFF).encode(), 0x1FFF_FFFF);
    }

    #[test]
    fn message_ids_round_trip() {
        for pmid in (0..=PMID_MAX).step_by(7).chain([PMID_MAX]) {
            for uid in (0..=u16::MAX).step_by(4099).chain([u16::MAX]) {
                let id = MessageId::new(pmid, uid);

                assert!(id.fits());
                assert_eq!(MessageId::decode(id.encode()), id);
            }
        }
    }

    #[test]
    fn oversized_pmid_is_not_an_extended_id() {
        let id = MessageId::new(PMID_MAX + 1, 0);

        assert!(!id.fits());
        assert_eq!(
            ExtendedId::try_from(id),
            Err(IdError::OutOfRange(0x2000_0000))
        );
    }

    #[test]
    fn extended_id_conversions() {
        let id = MessageId::new(4001, 0xBEEF);
        let extended = ExtendedId::try_from(id).unwrap();

        assert_eq!(extended.as_raw(), 0x0FA1_BEEF);
        assert_eq!(MessageId::from(extended), id);
        assert_eq!(MessageId::from(ExtendedId::MAX), MessageId::new(PMID_MAX, 0xFFFF));
    }
}
