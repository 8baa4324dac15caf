//! Discovery of compilation unit headers in `.debug_info`.
//!
//! Walking unit headers is far cheaper than decoding units, and it answers
//! the two questions a debugger has before it commits to a real decode:
//! where does each unit's DIE tree start, and which DWARF version was the
//! unit produced against. The version picks the decoder.
//!
//! The walk is deliberately lenient. It is a prefilter, so malformed input
//! only ever shortens the result; authoritative diagnostics belong to
//! whatever decodes the units afterwards.

use gimli::constants;
use gimli::{DebugInfoOffset, Endianity, LittleEndian, RunTimeEndian};
use std::collections::BTreeMap;

/// What the leading bytes of a compilation unit declare about it.
#[derive(Copy, Clone, Debug)]
pub struct LengthVersion {
    /// Payload length in bytes. The initial length field itself is not
    /// counted.
    pub length: u64,
    /// Whether the unit uses the 64-bit DWARF encoding, and therefore
    /// 8-byte section offsets.
    pub dwarf64: bool,
    /// DWARF version, 0 when it could not be determined.
    pub version: u8,
    /// Byte order inferred from the version field.
    pub endian: RunTimeEndian,
}

const TRUNCATED: LengthVersion = LengthVersion {
    length: 0,
    dwarf64: false,
    version: 0,
    endian: RunTimeEndian::Little,
};

/// Reads a unit's initial length field and the version field after it,
/// inferring the byte order on the way.
///
/// The version field carries no endianness marker, but real DWARF versions
/// fit in a single byte, so whichever byte of the 16-bit field is zero
/// gives the byte order away. Input too short to hold both fields yields
/// zeros and little-endian rather than an error.
pub fn read_length_version(data: &[u8]) -> LengthVersion {
    let Some(lead) = data.get(..4) else {
        return TRUNCATED;
    };

    // An all-ones 32-bit length announces 64-bit DWARF: the real length is
    // in the 8 bytes after the sentinel, and the version follows those.
    let (dwarf64, version_off) = if LittleEndian.read_u32(lead) == u32::MAX {
        (true, 12)
    } else {
        (false, 4)
    };

    if version_off + 1 >= data.len() {
        return TRUNCATED;
    }

    let (version, endian) = match (data[version_off], data[version_off + 1]) {
        (0, y) if y != 0 => (y, RunTimeEndian::Big),
        (x, 0) if x != 0 => (x, RunTimeEndian::Little),
        _ => (0, RunTimeEndian::Little),
    };

    // With the byte order settled, decode the length it governs.
    let length = if dwarf64 {
        endian.read_u64(&data[4..12])
    } else {
        u64::from(endian.read_u32(lead))
    };

    LengthVersion {
        length,
        dwarf64,
        version,
        endian,
    }
}

/// Scans a `.debug_info` section and returns, for every compilation unit,
/// the offset of its first DIE byte mapped to the unit's DWARF version.
///
/// Offsets are absolute within `data`. The scan never fails: input that
/// ends mid-header, or a unit whose declared length runs past the end of
/// the section, terminates the walk with whatever has been collected.
pub fn unit_versions(data: &[u8]) -> BTreeMap<DebugInfoOffset, u8> {
    let mut versions = BTreeMap::new();
    let mut rest = data;
    let mut off = 0;

    while !rest.is_empty() {
        // Stop once the remaining bytes cannot hold a unit's length and
        // version fields.
        let Some(lead) = rest.get(..4) else { break };
        let skip = if LittleEndian.read_u32(lead) == u32::MAX {
            12
        } else {
            4
        };
        if rest.len() < skip + 2 {
            break;
        }

        let lv = read_length_version(rest);
        let sec_off_size = if lv.dwarf64 { 8 } else { 4 };

        rest = &rest[skip..];
        off += skip;

        // Header size counted from the start of the version field. DWARF 5
        // put a unit type byte after the version, and the type decides
        // which extra fields the header carries.
        let header_size = match lv.version {
            2..=4 => 3 + sec_off_size,
            _ => {
                let Some(&unit_type) = rest.get(2) else { break };
                match constants::DwUt(unit_type) {
                    constants::DW_UT_compile | constants::DW_UT_partial => 4 + sec_off_size,
                    constants::DW_UT_skeleton | constants::DW_UT_split_compile => {
                        4 + sec_off_size + 8
                    }
                    constants::DW_UT_type | constants::DW_UT_split_type => {
                        4 + sec_off_size + 8 + sec_off_size
                    }
                    // Unit types this scanner does not know keep the
                    // compile-unit layout so the walk can continue.
                    _ => 4 + sec_off_size,
                }
            }
        };

        versions.insert(DebugInfoOffset(off + header_size), lv.version);

        // Skip the payload. A length past the end of the section ends the
        // walk there.
        let advance = usize::try_from(lv.length)
            .unwrap_or(usize::MAX)
            .min(rest.len());
        rest = &rest[advance..];
        off += advance;
    }

    versions
}
