//! Callsign-SSID address codec (C1).
//!
//! On the wire each of the six callsign bytes is ASCII shifted left by one
//! bit (freeing bit 0, which HDLC uses as the more-data marker on every
//! byte except the last of the address field); the seventh byte packs the
//! SSID plus three flag bits. See §4.1/§4.2 of the specification.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use deku::prelude::*;

use crate::error::Ax25Error;

/// Bit layout of the seventh (flag) byte of an on-wire address field:
/// `ch(1) res1(1) res0(1) ssid(4) extension(1)`, MSB first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, DekuRead, DekuWrite)]
struct AddressFlags {
    #[deku(bits = "1")]
    ch: u8,
    #[deku(bits = "1")]
    res1: u8,
    #[deku(bits = "1")]
    res0: u8,
    #[deku(bits = "4")]
    ssid: u8,
    #[deku(bits = "1")]
    extension: u8,
}

/// Wire length, in bytes, of a single address (callsign + SSID byte).
pub const ADDRESS_LEN: usize = 7;

/// Maximum number of digipeater addresses a header may carry.
pub const MAX_REPEATERS: usize = 8;

/// A single AX.25 callsign-SSID address.
///
/// `res0`/`res1` are the two reserved bits; per §3, `res1 = false` on the
/// *source* address is the modulo-128 capability signal. `ch` is the
/// command/response (on destination/source) or has-been-repeated (on a
/// digipeater) bit. `extension` marks the last address of the header.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    pub callsign: String,
    pub ssid: u8,
    pub ch: bool,
    pub res0: bool,
    pub res1: bool,
    pub extension: bool,
}

impl Default for Address {
    fn default() -> Self {
        Address {
            callsign: "NOCALL".to_string(),
            ssid: 0,
            ch: false,
            res0: true,
            res1: true,
            extension: false,
        }
    }
}

impl Address {
    /// Build an address from its parts, validating the callsign alphabet
    /// and SSID range.
    pub fn new(callsign: &str, ssid: u8) -> Result<Self, Ax25Error> {
        validate_callsign(callsign)?;
        if ssid > 15 {
            return Err(Ax25Error::InvalidSsidChar(alloc::format!(
                "ssid {ssid} out of range 0..=15"
            )));
        }
        Ok(Address {
            callsign: callsign.to_string(),
            ssid,
            ..Address::default()
        })
    }

    /// Decode a 7-byte on-wire address field.
    pub fn decode(bytes: &[u8]) -> Result<Self, Ax25Error> {
        if bytes.iter().all(|&b| b == 0) {
            return Err(Ax25Error::NullInput);
        }
        if bytes.len() != ADDRESS_LEN {
            return Err(Ax25Error::InvalidLength(alloc::format!(
                "address field must be {ADDRESS_LEN} bytes, got {}",
                bytes.len()
            )));
        }

        let mut chars = Vec::with_capacity(6);
        for &b in &bytes[0..6] {
            chars.push(b >> 1);
        }
        while chars.last() == Some(&b' ') {
            chars.pop();
        }
        if chars.is_empty() {
            return Err(Ax25Error::InvalidLength("empty callsign".into()));
        }
        for &c in &chars {
            if !(c.is_ascii_uppercase() || c.is_ascii_digit()) {
                return Err(Ax25Error::InvalidSsidChar(alloc::format!(
                    "invalid callsign byte {c:#04x}"
                )));
            }
        }
        let callsign = String::from_utf8(chars).map_err(|_| Ax25Error::NullInput)?;

        let (_, flags) = AddressFlags::from_bytes((&bytes[6..7], 0))
            .map_err(|_| Ax25Error::InvalidAddressField("malformed address flag byte".into()))?;
        let ch = flags.ch != 0;
        let res1 = flags.res1 != 0;
        let res0 = flags.res0 != 0;
        let ssid = flags.ssid;
        let extension = flags.extension != 0;

        Ok(Address { callsign, ssid, ch, res0, res1, extension })
    }

    /// Encode into exactly [`ADDRESS_LEN`] bytes.
    pub fn encode(&self) -> [u8; ADDRESS_LEN] {
        let mut out = [0u8; ADDRESS_LEN];
        let padded = format_padded_callsign(&self.callsign);
        for (i, &c) in padded.iter().enumerate() {
            out[i] = c << 1;
        }
        let flags = AddressFlags {
            ch: u8::from(self.ch),
            res1: u8::from(self.res1),
            res0: u8::from(self.res0),
            ssid: self.ssid,
            extension: u8::from(self.extension),
        };
        out[6] = flags.to_bytes().expect("fixed-width bitfield always encodes")[0];
        out
    }

    /// Parse `"CALL[-SSID][*]"`, as used in human-readable logs.
    pub fn parse(s: &str) -> Result<Self, Ax25Error> {
        if s.is_empty() {
            return Err(Ax25Error::NullInput);
        }
        let (body, ch) = match s.strip_suffix('*') {
            Some(rest) => (rest, true),
            None => (s, false),
        };
        if body.contains('*') {
            return Err(Ax25Error::MisplacedMark);
        }
        let (callsign, ssid) = match body.split_once('-') {
            Some((call, ssid_str)) => {
                let ssid: u8 = ssid_str.parse().map_err(|_| {
                    Ax25Error::InvalidSsidChar(alloc::format!("bad ssid {ssid_str:?}"))
                })?;
                if ssid > 15 {
                    return Err(Ax25Error::InvalidSsidChar(alloc::format!(
                        "ssid {ssid} out of range 0..=15"
                    )));
                }
                (call, ssid)
            }
            None => (body, 0),
        };
        validate_callsign(callsign)?;
        Ok(Address {
            callsign: callsign.to_string(),
            ssid,
            ch,
            ..Address::default()
        })
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.callsign)?;
        if self.ssid != 0 {
            write!(f, "-{}", self.ssid)?;
        }
        if self.ch {
            write!(f, "*")?;
        }
        Ok(())
    }
}

fn validate_callsign(callsign: &str) -> Result<(), Ax25Error> {
    if callsign.is_empty() || callsign.len() > 6 {
        return Err(Ax25Error::InvalidLength(alloc::format!(
            "callsign {callsign:?} must be 1..=6 characters"
        )));
    }
    if !callsign.bytes().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()) {
        return Err(Ax25Error::InvalidSsidChar(alloc::format!(
            "callsign {callsign:?} must be A-Z0-9"
        )));
    }
    Ok(())
}

fn format_padded_callsign(callsign: &str) -> [u8; 6] {
    let mut out = [b' '; 6];
    for (i, b) in callsign.bytes().enumerate().take(6) {
        out[i] = b;
    }
    out
}

/// An ordered digipeater path of 0..=8 repeater addresses (C1).
///
/// `Path::new` validates `n <= 8` and rejects null entries; encoding
/// clears `extension` on every address but the last of the *whole*
/// header (source if the path is empty, otherwise the last repeater).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Path {
    repeaters: Vec<Address>,
}

impl Path {
    pub fn new(addrs: Vec<Address>) -> Result<Self, Ax25Error> {
        if addrs.len() > MAX_REPEATERS {
            return Err(Ax25Error::InvalidInput(alloc::format!(
                "at most {MAX_REPEATERS} repeaters allowed, got {}",
                addrs.len()
            )));
        }
        for a in &addrs {
            if a.callsign.is_empty() {
                return Err(Ax25Error::InvalidInput("null repeater address".into()));
            }
        }
        Ok(Path { repeaters: addrs })
    }

    pub fn is_empty(&self) -> bool {
        self.repeaters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.repeaters.len()
    }

    pub fn iter(&self) -> core::slice::Iter<'_, Address> {
        self.repeaters.iter()
    }

    pub fn as_slice(&self) -> &[Address] {
        &self.repeaters
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_plain() {
        let a = Address::new("WB2OSZ", 7).unwrap();
        let bytes = a.encode();
        let back = Address::decode(&bytes).unwrap();
        assert_eq!(a, back);
    }

    #[test]
    fn parse_with_ssid_and_mark() {
        let a = Address::parse("WB2OSZ-7*").unwrap();
        assert_eq!(a.callsign, "WB2OSZ");
        assert_eq!(a.ssid, 7);
        assert!(a.ch);
    }

    #[test]
    fn parse_rejects_misplaced_mark() {
        assert_eq!(Address::parse("WB2*OSZ-7"), Err(Ax25Error::MisplacedMark));
    }

    #[test]
    fn parse_rejects_bad_ssid() {
        assert!(Address::parse("WB2OSZ-16").is_err());
        assert!(Address::parse("WB2OSZ-XY").is_err());
    }

    #[test]
    fn decode_rejects_null() {
        assert_eq!(Address::decode(&[0u8; 7]), Err(Ax25Error::NullInput));
    }

    #[test]
    fn path_rejects_too_many_repeaters() {
        let addrs: Vec<_> = (0..9).map(|i| Address::new("WIDE1", i).unwrap()).collect();
        assert!(Path::new(addrs).is_err());
    }

    #[test]
    fn nocall_default_display() {
        assert_eq!(Address::default().to_string(), "NOCALL");
    }
}
