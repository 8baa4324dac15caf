//! Primitive reads and writes over byte streams.
//!
//! Sized little/big-endian integer reads and writes plus NUL-terminated
//! string reads, shared by anything that consumes raw DWARF bytes before a
//! real decoder gets involved. The unit header scan uses these shapes; line
//! program and call frame readers need the same operations.
//!
//! Unlike the header scan, these are strict: truncation and unsupported
//! widths are reported to the caller as typed errors.

use gimli::Endianity;
use std::io::{self, BufRead, Read, Write};
use thiserror::Error;

/// Ways a primitive read or write can fail.
#[derive(Debug, Error)]
pub enum RawError {
    /// The requested width is not one this operation offers.
    #[error("pointer size {0} not supported")]
    UnsupportedWidth(usize),
    /// The stream ended before the requested number of bytes.
    #[error("input ended before {0} bytes could be read")]
    ShortRead(usize),
    /// A string read reached the end of the buffer without finding NUL.
    #[error("string not terminated before end of buffer")]
    Unterminated,
    /// The underlying stream failed for a reason other than running out.
    #[error("stream access failed")]
    Io(#[from] io::Error),
}

/// Reads an unsigned integer of `ptr_size` bytes (2, 4, or 8) from
/// `reader` in byte order `endian`, widened to 64 bits.
pub fn read_uint<R, E>(
    reader: &mut R,
    endian: E,
    ptr_size: usize,
) -> Result<u64, RawError>
where
    R: Read,
    E: Endianity,
{
    if !matches!(ptr_size, 2 | 4 | 8) {
        return Err(RawError::UnsupportedWidth(ptr_size));
    }

    let mut buf = [0; 8];
    let buf = &mut buf[..ptr_size];
    reader.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => RawError::ShortRead(ptr_size),
        _ => RawError::Io(e),
    })?;

    Ok(match ptr_size {
        2 => u64::from(endian.read_u16(buf)),
        4 => u64::from(endian.read_u32(buf)),
        _ => endian.read_u64(buf),
    })
}

/// Writes the low `ptr_size` bytes (4 or 8) of `value` to `writer` in byte
/// order `endian`.
///
/// Bits above the chosen width are discarded without diagnostic; choosing a
/// wide enough width is the caller's problem. The 2-byte width is read-only
/// and rejected here.
pub fn write_uint<W, E>(
    writer: &mut W,
    endian: E,
    ptr_size: usize,
    value: u64,
) -> Result<(), RawError>
where
    W: Write,
    E: Endianity,
{
    let mut buf = [0; 8];
    match ptr_size {
        4 => endian.write_u32(&mut buf[..4], value as u32),
        8 => endian.write_u64(&mut buf, value),
        _ => return Err(RawError::UnsupportedWidth(ptr_size)),
    }
    writer.write_all(&buf[..ptr_size])?;
    Ok(())
}

/// Reads a NUL-terminated string from `reader`, leaving the stream
/// positioned just past the terminator.
///
/// The terminator is not part of the returned string. Bytes that are not
/// valid UTF-8 are replaced rather than rejected.
pub fn read_cstring<R>(reader: &mut R) -> Result<String, RawError>
where
    R: BufRead,
{
    let mut raw = vec![];
    reader.read_until(0, &mut raw)?;
    if raw.pop() != Some(0) {
        return Err(RawError::Unterminated);
    }
    Ok(String::from_utf8_lossy(&raw).into_owned())
}

#[cfg(test)]
mod test {
    use super::*;
    use gimli::{BigEndian, LittleEndian};

    #[test]
    fn read_each_width() {
        let data = [0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88];
        assert_eq!(read_uint(&mut &data[..], LittleEndian, 2).unwrap(), 0x2211);
        assert_eq!(
            read_uint(&mut &data[..], LittleEndian, 4).unwrap(),
            0x4433_2211
        );
        assert_eq!(
            read_uint(&mut &data[..], LittleEndian, 8).unwrap(),
            0x8877_6655_4433_2211
        );
        assert_eq!(read_uint(&mut &data[..], BigEndian, 2).unwrap(), 0x1122);
        assert_eq!(read_uint(&mut &data[..], BigEndian, 4).unwrap(), 0x1122_3344);
        assert_eq!(
            read_uint(&mut &data[..], BigEndian, 8).unwrap(),
            0x1122_3344_5566_7788
        );
    }

    #[test]
    fn read_advances_the_stream() {
        let mut data: &[u8] = &[0x01, 0x00, 0x02, 0x00];
        assert_eq!(read_uint(&mut data, LittleEndian, 2).unwrap(), 1);
        assert_eq!(read_uint(&mut data, LittleEndian, 2).unwrap(), 2);
    }

    #[test]
    fn read_rejects_odd_widths() {
        for size in [0, 1, 3, 5, 16] {
            let err = read_uint(&mut &[0u8; 16][..], LittleEndian, size).unwrap_err();
            assert!(matches!(err, RawError::UnsupportedWidth(s) if s == size));
        }
    }

    #[test]
    fn read_reports_short_input() {
        let err = read_uint(&mut &[1u8, 2, 3][..], LittleEndian, 4).unwrap_err();
        assert!(matches!(err, RawError::ShortRead(4)));
    }

    #[test]
    fn write_then_read_round_trips() {
        for value in [0u64, 1, 0xABCD, 0xDEAD_BEEF, u64::from(u32::MAX)] {
            for size in [4, 8] {
                let mut buf: Vec<u8> = vec![];
                write_uint(&mut buf, LittleEndian, size, value).unwrap();
                assert_eq!(buf.len(), size);
                assert_eq!(read_uint(&mut &buf[..], LittleEndian, size).unwrap(), value);

                let mut buf: Vec<u8> = vec![];
                write_uint(&mut buf, BigEndian, size, value).unwrap();
                assert_eq!(read_uint(&mut &buf[..], BigEndian, size).unwrap(), value);
            }
        }

        let mut buf: Vec<u8> = vec![];
        write_uint(&mut buf, LittleEndian, 8, u64::MAX).unwrap();
        assert_eq!(read_uint(&mut &buf[..], LittleEndian, 8).unwrap(), u64::MAX);
    }

    #[test]
    fn write_narrows_silently() {
        let mut buf: Vec<u8> = vec![];
        write_uint(&mut buf, LittleEndian, 4, 0x1_0000_0001).unwrap();
        assert_eq!(buf, [0x01, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn write_has_no_2_byte_width() {
        let mut buf: Vec<u8> = vec![];
        let err = write_uint(&mut buf, LittleEndian, 2, 7).unwrap_err();
        assert!(matches!(err, RawError::UnsupportedWidth(2)));
        assert!(buf.is_empty());
    }

    #[test]
    fn cstring_stops_past_the_terminator() {
        let mut data: &[u8] = b"main.go\0extra";
        assert_eq!(read_cstring(&mut data).unwrap(), "main.go");
        assert_eq!(data, b"extra");
    }

    #[test]
    fn cstring_may_be_empty() {
        let mut data: &[u8] = b"\0";
        assert_eq!(read_cstring(&mut data).unwrap(), "");
    }

    #[test]
    fn cstring_requires_a_terminator() {
        let mut data: &[u8] = b"main.go";
        let err = read_cstring(&mut data).unwrap_err();
        assert!(matches!(err, RawError::Unterminated));

        let mut data: &[u8] = b"";
        let err = read_cstring(&mut data).unwrap_err();
        assert!(matches!(err, RawError::Unterminated));
    }

    #[test]
    fn cstring_round_trips() {
        let mut encoded = b"runtime.main".to_vec();
        encoded.push(0);
        assert_eq!(read_cstring(&mut &encoded[..]).unwrap(), "runtime.main");
    }
}
