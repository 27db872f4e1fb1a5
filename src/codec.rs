use core::str::Utf8Error;

/* Errors */

/// Failures of the payload codec. Every variant is reported before a single
/// byte of the caller's buffer is touched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PayloadError {
    #[error("Buffer of {capacity} bytes is too small, {required} bytes are required")]
    InsufficientCapacity { required: usize, capacity: usize },
    #[error("Offset ({offset}) is outside of a buffer of {capacity} bytes")]
    OffsetOutOfRange { offset: usize, capacity: usize },
    #[error("Decoded string of {0} bytes does not fit the device string capacity")]
    StringTooLong(usize),
    #[error("Tried to decode a device string as UTF-8 but it was invalid ({0:?})")]
    InvalidUtf8(
        #[cfg_attr(feature = "defmt", defmt(Debug2Format))]
        #[from]
        Utf8Error,
    ),
}

/// Returns the end of the `width` byte window at `offset`, or an error if the
/// window does not fit inside `capacity`.
const fn window_end(capacity: usize, offset: usize, width: usize) -> Result<usize, PayloadError> {
    let required = offset.saturating_add(width);

    if capacity < required {
        return Err(PayloadError::InsufficientCapacity { required, capacity });
    }

    Ok(required)
}

fn put(buffer: &mut [u8], offset: usize, bytes: &[u8]) -> Result<(), PayloadError> {
    let end = window_end(buffer.len(), offset, bytes.len())?;
    buffer[offset..end].copy_from_slice(bytes);

    Ok(())
}

fn take<const N: usize>(buffer: &[u8], offset: usize) -> Result<[u8; N], PayloadError> {
    let end = window_end(buffer.len(), offset, N)?;

    let mut bytes = [0u8; N];
    bytes.copy_from_slice(&buffer[offset..end]);

    Ok(bytes)
}

/* Encoding */

/// Zeroes the first `count` bytes of `buffer` (never more than its length).
pub fn clear(buffer: &mut [u8], count: usize) {
    buffer.iter_mut().take(count).for_each(|byte| *byte = 0);
}

pub fn write_u8(buffer: &mut [u8], value: u8, offset: usize) -> Result<(), PayloadError> {
    put(buffer, offset, &[value])
}

pub fn write_u16(buffer: &mut [u8], value: u16, offset: usize) -> Result<(), PayloadError> {
    put(buffer, offset, &value.to_be_bytes())
}

pub fn write_u32(buffer: &mut [u8], value: u32, offset: usize) -> Result<(), PayloadError> {
    put(buffer, offset, &value.to_be_bytes())
}

pub fn write_u64(buffer: &mut [u8], value: u64, offset: usize) -> Result<(), PayloadError> {
    put(buffer, offset, &value.to_be_bytes())
}

/// Copies `value` into `buffer` starting at `offset`, stopping at the first
/// NUL byte of `value`, the end of `value` or the end of `buffer`.
///
/// Remaining bytes are left as they were, so clear the buffer first when the
/// string has to be zero padded. Returns the number of bytes copied.
pub fn write_str(buffer: &mut [u8], value: &[u8], offset: usize) -> Result<usize, PayloadError> {
    if offset >= buffer.len() {
        return Err(PayloadError::OffsetOutOfRange {
            offset,
            capacity: buffer.len(),
        });
    }

    let mut written = 0;

    for (dst, src) in buffer[offset..].iter_mut().zip(value) {
        if *src == 0 {
            break;
        }

        *dst = *src;
        written += 1;
    }

    Ok(written)
}

/* Decoding */

pub fn read_u8(buffer: &[u8], offset: usize) -> Result<u8, PayloadError> {
    take::<1>(buffer, offset).map(|[byte]| byte)
}

pub fn read_u16(buffer: &[u8], offset: usize) -> Result<u16, PayloadError> {
    take(buffer, offset).map(u16::from_be_bytes)
}

pub fn read_u32(buffer: &[u8], offset: usize) -> Result<u32, PayloadError> {
    take(buffer, offset).map(u32::from_be_bytes)
}

pub fn read_u64(buffer: &[u8], offset: usize) -> Result<u64, PayloadError> {
    take(buffer, offset).map(u64::from_be_bytes)
}

/// Bytes from `offset` up to (not including) the first NUL byte, or up to the
/// end of the buffer when the string fills it completely.
pub fn read_str(buffer: &[u8], offset: usize) -> Result<&[u8], PayloadError> {
    if offset >= buffer.len() {
        return Err(PayloadError::OffsetOutOfRange {
            offset,
            capacity: buffer.len(),
        });
    }

    let tail = &buffer[offset..];
    let end = tail.iter().position(|byte| *byte == 0).unwrap_or(tail.len());

    Ok(&tail[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_are_big_endian() {
        let mut buffer = [0u8; 8];

        write_u16(&mut buffer, 0x1122, 0).unwrap();
        assert_eq!(buffer[..2], [0x11, 0x22]);

        write_u32(&mut buffer, 0xAABBCCDD, 2).unwrap();
        assert_eq!(buffer[2..6], [0xAA, 0xBB, 0xCC, 0xDD]);

        write_u64(&mut buffer, 0x0102030405060708, 0).unwrap();
        assert_eq!(buffer, [1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn write_succeeds_iff_window_fits() {
        for capacity in 0..=8usize {
            for offset in 0..=9usize {
                let mut storage = [0x5Au8; 8];
                let buffer = &mut storage[..capacity];

                assert_eq!(
                    write_u16(buffer, 0xFFFF, offset).is_ok(),
                    capacity >= offset + 2
                );
                assert_eq!(
                    write_u32(buffer, 0xFFFF_FFFF, offset).is_ok(),
                    capacity >= offset + 4
                );
                assert_eq!(
                    write_u64(buffer, u64::MAX, offset).is_ok(),
                    capacity >= offset + 8
                );
            }
        }
    }

    #[test]
    fn failed_write_leaves_buffer_untouched() {
        let mut buffer = [0x5Au8; 6];

        assert_eq!(
            write_u32(&mut buffer, 0xDEADBEEF, 3),
            Err(PayloadError::InsufficientCapacity {
                required: 7,
                capacity: 6
            })
        );
        assert_eq!(buffer, [0x5A; 6]);

        assert_eq!(
            write_u64(&mut buffer, 1, 0),
            Err(PayloadError::InsufficientCapacity {
                required: 8,
                capacity: 6
            })
        );
        assert_eq!(buffer, [0x5A; 6]);
    }

    #[test]
    fn huge_offsets_do_not_overflow() {
        let mut buffer = [0u8; 8];

        assert_eq!(
            write_u16(&mut buffer, 1, usize::MAX),
            Err(PayloadError::InsufficientCapacity {
                required: usize::MAX,
                capacity: 8
            })
        );
        assert!(read_u64(&buffer, usize::MAX - 3).is_err());
    }

    #[test]
    fn written_values_read_back_at_every_offset() {
        for offset in 0..=6 {
            let mut buffer = [0u8; 8];
            write_u16(&mut buffer, 0xBEEF, offset).unwrap();
            assert_eq!(read_u16(&buffer, offset), Ok(0xBEEF));
        }

        for offset in 0..=4 {
            let mut buffer = [0u8; 8];
            write_u32(&mut buffer, 0xCAFEBABE, offset).unwrap();
            assert_eq!(read_u32(&buffer, offset), Ok(0xCAFEBABE));
        }

        for offset in 0..=7 {
            let mut buffer = [0u8; 8];
            write_u8(&mut buffer, 0xA5, offset).unwrap();
            assert_eq!(read_u8(&buffer, offset), Ok(0xA5));
        }

        let mut buffer = [0u8; 8];
        write_u64(&mut buffer, 0xFEDCBA9876543210, 0).unwrap();
        assert_eq!(read_u64(&buffer, 0), Ok(0xFEDCBA9876543210));
    }

    #[test]
    fn short_reads_fail_instead_of_returning_zero() {
        let buffer = [0xFFu8; 3];

        assert_eq!(read_u16(&buffer, 1), Ok(0xFFFF));
        assert!(read_u16(&buffer, 2).is_err());
        assert!(read_u32(&buffer, 0).is_err());

        // The legacy zero-on-failure value is still one call away.
        assert_eq!(read_u32(&buffer, 0).unwrap_or_default(), 0);
    }

    #[test]
    fn strings_stop_at_nul_or_capacity() {
        let mut buffer = [0u8; 8];
        assert_eq!(write_str(&mut buffer, b"GM7\0junk", 0), Ok(3));
        assert_eq!(buffer, *b"GM7\0\0\0\0\0");

        let mut buffer = [0u8; 4];
        assert_eq!(write_str(&mut buffer, b"LONGNAME", 1), Ok(3));
        assert_eq!(buffer, *b"\0LON");

        let mut buffer = [0xEEu8; 4];
        assert_eq!(write_str(&mut buffer, b"ab", 0), Ok(2));
        assert_eq!(buffer, [b'a', b'b', 0xEE, 0xEE]);

        assert_eq!(
            write_str(&mut buffer, b"ab", 4),
            Err(PayloadError::OffsetOutOfRange {
                offset: 4,
                capacity: 4
            })
        );
    }

    #[test]
    fn read_str_stops_at_nul() {
        assert_eq!(read_str(b"abc\0\0\0\0\0", 0), Ok(&b"abc"[..]));
        assert_eq!(read_str(b"ABCDEFGH", 2), Ok(&b"CDEFGH"[..]));
        assert_eq!(read_str(b"\0\0", 0), Ok(&b""[..]));
        assert!(read_str(b"ab", 2).is_err());
    }

    #[test]
    fn clear_zeroes_exactly_count_bytes() {
        let mut buffer = [0xFFu8; 8];
        clear(&mut buffer, 3);
        assert_eq!(buffer, [0, 0, 0, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]);

        clear(&mut buffer, 100);
        assert_eq!(buffer, [0; 8]);
    }
}
