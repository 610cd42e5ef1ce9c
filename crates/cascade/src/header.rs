use zerocopy::{FromBytes, Immutable, KnownLayout};

/// The 16-byte fixed prefix of a cascade blob, reinterpreted in place.
///
/// Field order and size match spec byte-for-byte (little-endian,
/// natural alignment): `tsr: f32`, `tsc: f32`, `tdepth: i32`,
/// `ntrees: i32`. No magic number, no version field.
#[derive(FromBytes, Immutable, KnownLayout, Debug, Clone, Copy)]
#[repr(C)]
pub(crate) struct RawHeader {
    pub tsr: f32,
    pub tsc: f32,
    pub tdepth: i32,
    pub ntrees: i32,
}

pub(crate) const HEADER_BYTES: usize = std::mem::size_of::<RawHeader>();

impl RawHeader {
    pub(crate) fn parse(bytes: &[u8]) -> Option<RawHeader> {
        let (header, _rest) = RawHeader::ref_from_prefix(bytes).ok()?;
        Some(*header)
    }
}
