//! Frame header codec: destination, source, and optional repeater path (C2).

use alloc::vec::Vec;
use core::fmt;

use crate::address::{Address, Path, ADDRESS_LEN, MAX_REPEATERS};
use crate::error::Ax25Error;

/// `{destination, source, repeaters, cr, src_cr}` — the portion of a frame
/// common to every AX.25 variant. `cr`/`src_cr` mirror the C-bit of the
/// destination/source address respectively; per §3 a v2.2 command has
/// `cr=true, src_cr=false` and a response reverses them.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameHeader {
    pub destination: Address,
    pub source: Address,
    pub repeaters: Path,
    pub cr: bool,
    pub src_cr: bool,
}

impl FrameHeader {
    pub fn new(destination: Address, source: Address, repeaters: Path) -> Self {
        let cr = destination.ch;
        let src_cr = source.ch;
        FrameHeader { destination, source, repeaters, cr, src_cr }
    }

    /// Parse destination, source, then up to 8 repeaters, stopping at the
    /// first address with `extension = true`. Returns the header and the
    /// number of bytes consumed.
    pub fn decode(bytes: &[u8]) -> Result<(Self, usize), Ax25Error> {
        if bytes.len() < 2 * ADDRESS_LEN {
            return Err(Ax25Error::InvalidLength(alloc::format!(
                "header needs at least {} bytes, got {}",
                2 * ADDRESS_LEN,
                bytes.len()
            )));
        }
        let destination = Address::decode(&bytes[0..ADDRESS_LEN])?;
        let source = Address::decode(&bytes[ADDRESS_LEN..2 * ADDRESS_LEN])?;

        let mut consumed = 2 * ADDRESS_LEN;
        let mut repeaters = Vec::new();

        if !source.extension {
            loop {
                if repeaters.len() == MAX_REPEATERS {
                    return Err(Ax25Error::InvalidAddressField(
                        "more than 8 repeaters in path".into(),
                    ));
                }
                if bytes.len() < consumed + ADDRESS_LEN {
                    return Err(Ax25Error::InvalidAddressField(
                        "truncated repeater address".into(),
                    ));
                }
                let rpt = Address::decode(&bytes[consumed..consumed + ADDRESS_LEN])?;
                let done = rpt.extension;
                repeaters.push(rpt);
                consumed += ADDRESS_LEN;
                if done {
                    break;
                }
            }
        }

        let path = Path::new(repeaters)?;
        Ok((FrameHeader::new(destination, source, path), consumed))
    }

    /// Encode the header, forcing `extension` correctly: clear on every
    /// address but the very last one in the header.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(2 * ADDRESS_LEN + self.repeaters.len() * ADDRESS_LEN);

        let mut dest = self.destination.clone();
        dest.extension = false;
        out.extend_from_slice(&dest.encode());

        let mut src = self.source.clone();
        src.extension = self.repeaters.is_empty();
        out.extend_from_slice(&src.encode());

        let n = self.repeaters.len();
        for (i, rpt) in self.repeaters.iter().enumerate() {
            let mut rpt = rpt.clone();
            rpt.extension = i + 1 == n;
            out.extend_from_slice(&rpt.encode());
        }

        out
    }
}

impl fmt::Display for FrameHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}>{}", self.source, self.destination)?;
        for rpt in self.repeaters.iter() {
            write!(f, ",{rpt}")?;
        }
        Ok(())
    }
}
