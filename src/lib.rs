//! Finds compilation unit headers in DWARF debug info ahead of a full
//! decode.
//!
//! Decoding `.debug_info` is expensive, and the decoding machinery itself
//! varies with the DWARF version of each compilation unit. This crate walks
//! the raw section bytes once and reports, for every unit, the absolute
//! offset of its first DIE together with the unit's DWARF version, so a
//! caller can dispatch a version-appropriate decoder per unit before any of
//! them run.
//!
//! The header walk lives in [`scan`] and tolerates 32- and 64-bit DWARF,
//! both byte orders (detected from the version field, which is the only
//! self-describing thing in the section), and the DWARF 5 unit type zoo.
//! The byte-level reads underneath it live in [`raw`] and are usable on
//! their own.

pub mod raw;
pub mod scan;

pub use scan::{read_length_version, unit_versions, LengthVersion};

use object::{Object, ObjectSection};
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Extracts the raw `.debug_info` contents of an object file.
///
/// A file without a `.debug_info` section yields an empty slice, which
/// scans to an empty map.
pub fn debug_info_bytes<'data>(
    object: &object::File<'data>,
) -> Result<Cow<'data, [u8]>, object::Error> {
    let cow = object
        .section_by_name(gimli::SectionId::DebugInfo.name())
        .map(|sect| sect.uncompressed_data())
        .transpose()?
        .unwrap_or_else(Default::default);
    Ok(cow)
}

/// Scans the `.debug_info` section of an object file and returns the map
/// described by [`unit_versions`].
pub fn unit_versions_for_file(
    object: &object::File,
) -> Result<BTreeMap<gimli::DebugInfoOffset, u8>, object::Error> {
    let data = debug_info_bytes(object)?;
    Ok(unit_versions(&data))
}
