use embedded_can::{ExtendedId, Id};

use crate::{
    id::{IdError, MessageId},
    payload::Payload,
    PayloadError, CAN_PAYLOAD_BYTES,
};

/// A single GM7 data frame, ready to be handed to a CAN driver.
///
/// GM7 only uses extended identifiers and data frames, so standard IDs and
/// remote frames are rejected by the [`embedded_can::Frame`] constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProtocolFrame {
    id: MessageId,
    dlc: usize,
    data: [u8; CAN_PAYLOAD_BYTES],
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    #[error("Message ID could not be encoded")]
    InvalidId(#[from] IdError),
    #[error("Received ({0:?}) bytes of data but a frame holds at most 8")]
    DataTooLong(usize),
    #[error("Failed to encode frame payload")]
    InvalidPayload(#[from] PayloadError),
}

impl ProtocolFrame {
    /// Creates a data frame. The PMID must fit in 13 bits and `data` can be
    /// at most 8 bytes long.
    pub fn new_data(id: MessageId, data: &[u8]) -> Result<Self, FrameError> {
        ExtendedId::try_from(id)?;

        if data.len() > CAN_PAYLOAD_BYTES {
            return Err(FrameError::DataTooLong(data.len()));
        }

        let mut copy = [0u8; CAN_PAYLOAD_BYTES];
        copy[..data.len()].copy_from_slice(data);

        Ok(Self {
            id,
            dlc: data.len(),
            data: copy,
        })
    }

    /// Creates a full length data frame carrying `payload`
    pub fn with_payload(id: MessageId, payload: &impl Payload) -> Result<Self, FrameError> {
        Self::encode(id, |buffer| payload.encode(buffer))
    }

    /// Creates a full length data frame whose bytes are written by `encoder`
    /// into a zeroed 8 byte buffer
    pub fn encode<F>(id: MessageId, encoder: F) -> Result<Self, FrameError>
    where
        F: FnOnce(&mut [u8]) -> Result<(), PayloadError>,
    {
        let mut data = [0u8; CAN_PAYLOAD_BYTES];
        encoder(&mut data)?;

        Self::new_data(id, &data)
    }

    /// Decodes the frame's data as `P`
    pub fn payload<P: Payload>(&self) -> Result<P, PayloadError> {
        P::decode(self.data())
    }

    pub fn message_id(&self) -> MessageId {
        self.id
    }

    pub fn pmid(&self) -> u16 {
        self.id.pmid
    }

    pub fn uid(&self) -> u16 {
        self.id.uid
    }

    /// Gets the data associated with the frame (length will match DLC)
    pub fn data(&self) -> &[u8] {
        &self.data[..self.dlc]
    }
}

impl embedded_can::Frame for ProtocolFrame {
    fn new(id: impl Into<Id>, data: &[u8]) -> Option<Self> {
        match id.into() {
            Id::Extended(extended) => Self::new_data(extended.into(), data).ok(),
            Id::Standard(_) => None,
        }
    }

    fn new_remote(_id: impl Into<Id>, _dlc: usize) -> Option<Self> {
        None
    }

    fn is_extended(&self) -> bool {
        true
    }

    fn is_remote_frame(&self) -> bool {
        false
    }

    fn id(&self) -> Id {
        // `new_data` only accepts ids that fit
        Id::Extended(ExtendedId::new(self.id.encode()).unwrap_or(ExtendedId::MAX))
    }

    fn dlc(&self) -> usize {
        self.dlc
    }

    fn data(&self) -> &[u8] {
        ProtocolFrame::data(self)
    }
}

#[cfg(test)]
mod tests {
    use embedded_can::{ExtendedId, Frame, Id, StandardId};

    use super::*;
    use crate::{
        device::{pmid_for_heartbeat, DeviceCategory},
        payload::{encode_type_id, Heartbeat, StatusAndProgress},
        pmid,
    };

    #[test]
    fn heartbeat_frame() {
        let id = MessageId::new(pmid_for_heartbeat(DeviceCategory::Module), 0x0042);
        let frame = ProtocolFrame::with_payload(
            id,
            &Heartbeat {
                millis_current: 1000,
                millis_last: 0,
            },
        )
        .unwrap();

        assert_eq!(Frame::id(&frame), Id::Extended(ExtendedId::new(0x00CA_0042).unwrap()));
        assert_eq!(frame.pmid(), pmid::HEARTBEAT_MODULE);
        assert_eq!(frame.uid(), 0x0042);
        assert_eq!(Frame::dlc(&frame), 8);
        assert_eq!(frame.data(), &[0, 0, 0x03, 0xE8, 0, 0, 0, 0]);
        assert!(frame.is_extended());
        assert!(frame.is_data_frame());
    }

    #[test]
    fn frames_from_encoder_functions() {
        let id = MessageId::new(pmid::DEVICE_TYPE_ID, 7);
        let frame =
            ProtocolFrame::encode(id, |buffer| encode_type_id(buffer, pmid::DEVICE_TYPE_MODULE_TIMER))
                .unwrap();

        assert_eq!(frame.data(), &[0x10, 0x69, 0, 0, 0, 0, 0, 0]);
        assert_eq!(frame.message_id(), id);
    }

    #[test]
    fn received_frames_decode() {
        let raw = ExtendedId::new(0x14B5_0001).unwrap();
        let frame = <ProtocolFrame as Frame>::new(raw, &[0xAA, 0xBB, 0xCC, 0xDD, 0x11, 0x22, 0x33, 0x44])
            .unwrap();

        assert_eq!(frame.pmid(), pmid::MODULE_STATUS_AND_PROGRESS);
        assert_eq!(
            frame.payload::<StatusAndProgress>(),
            Ok(StatusAndProgress {
                status: 0xAABBCCDD,
                progress: 0x1122,
                progress_max: 0x3344,
            })
        );
    }

    #[test]
    fn short_frames_keep_their_dlc() {
        let frame = ProtocolFrame::new_data(MessageId::new(pmid::HEARTBEAT_CONTROLLER, 1), &[0, 0, 3, 0xE8])
            .unwrap();

        assert_eq!(Frame::dlc(&frame), 4);
        assert_eq!(
            frame.payload::<Heartbeat>(),
            Ok(Heartbeat {
                millis_current: 1000,
                millis_last: 0
            })
        );
        assert!(frame.payload::<StatusAndProgress>().is_err());
    }

    #[test]
    fn invalid_frames_are_rejected() {
        assert_eq!(
            ProtocolFrame::new_data(MessageId::new(0x2000, 0), &[]),
            Err(FrameError::InvalidId(IdError::OutOfRange(0x2000_0000)))
        );
        assert_eq!(
            ProtocolFrame::new_data(MessageId::new(1, 0), &[0; 9]),
            Err(FrameError::DataTooLong(9))
        );
        assert_eq!(
            ProtocolFrame::encode(MessageId::new(1, 0), |buffer| {
                crate::codec::write_u64(buffer, 1, 1)
            }),
            Err(FrameError::InvalidPayload(PayloadError::InsufficientCapacity {
                required: 9,
                capacity: 8
            }))
        );

        assert_eq!(<ProtocolFrame as Frame>::new(StandardId::ZERO, &[]), None);
        assert_eq!(<ProtocolFrame as Frame>::new_remote(ExtendedId::ZERO, 0), None);
    }
}
