//! Error taxonomy for the AX.25 link layer and the APRS payload family.
//!
//! Every decoder returns one of these kinds rather than a generic parse
//! failure; callers match on the kind to decide whether a packet can be
//! retried (e.g. [`AprsError::UnknownDti`]) or is simply broken.

use alloc::string::String;

/// Failures from the AX.25 address/header/frame codecs (C1–C7).
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum Ax25Error {
    /// A required input was empty or all-zero.
    #[error("null input")]
    NullInput,

    /// A fixed-width field did not have the expected length.
    #[error("invalid length: {0}")]
    InvalidLength(String),

    /// A callsign contained a character outside `A-Z0-9`, or the SSID was
    /// not a decimal number in `0..=15`.
    #[error("invalid SSID or callsign character: {0}")]
    InvalidSsidChar(String),

    /// `*` appeared somewhere other than immediately after the SSID.
    #[error("misplaced '*' mark in callsign string")]
    MisplacedMark,

    /// The destination/source/repeater address field could not be parsed,
    /// or no address carried the `extension` (last-address) bit.
    #[error("invalid address field: {0}")]
    InvalidAddressField(String),

    /// The control octet(s) did not match any known I/S/U pattern.
    #[error("invalid control field: {0:#04x?}")]
    InvalidControl(u8),

    /// A segment chain failed to reassemble (bad header, length mismatch,
    /// too many segments, or a gap).
    #[error("malformed segment: {0}")]
    MalformedSegment(String),

    /// `Path::new` was given more than 8 repeaters or a null address.
    #[error("invalid path input: {0}")]
    InvalidInput(String),
}

/// Failures from the APRS payload decoders (C8–C10).
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum AprsError {
    /// The Data-Type Identifier byte did not match any known APRS type.
    #[error("unknown data type identifier: {0:#04x} ({0:?})")]
    UnknownDti(u8),

    /// A field violated a hard invariant (out-of-range coordinate, bad
    /// checksum shape, wrong fixed width, etc). Unlike data-extension
    /// parsing, this aborts the whole packet.
    #[error("malformed field: {0}")]
    MalformedField(String),

    /// The payload was not valid UTF-8 where text was required.
    #[error("invalid utf-8 in payload")]
    InvalidUtf8,

    /// A fixed-width text field was too short or too long.
    #[error("invalid length: {0}")]
    InvalidLength(String),

    /// A data extension (course/speed, PHG, altitude, ...) was present
    /// but malformed. Unlike [`AprsError::MalformedField`] this is
    /// recoverable: the decoder drops the extension and keeps the rest
    /// of the packet rather than failing the whole decode.
    #[error("malformed data extension: {0}")]
    MalformedExtension(String),

    #[error("null input")]
    NullInput,
}
