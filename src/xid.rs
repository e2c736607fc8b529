//! XID parameter model (C6): a typed `PI(u8) PL(u8) PV(PL bytes)` list.
//!
//! Four PIs get typed decoders (Class of Procedures, HDLC Optional
//! Functions, and the big-endian numeric fields); every other PI is kept
//! as [`ParamBody::Raw`] so re-encoding is lossless even for parameters we
//! don't understand (§4.7).

use alloc::vec::Vec;

use deku::prelude::*;

use crate::error::Ax25Error;

const PI_CLASS_OF_PROCEDURES: u8 = 2;
const PI_HDLC_OPTIONAL_FUNCTIONS: u8 = 3;

/// Known big-endian numeric parameter identifiers (§4.7), each carrying
/// its own byte width.
const BIG_ENDIAN_PIS: &[(u8, usize)] = &[
    (1, 1),  // I field length, transmit
    (4, 1),  // I field length, receive
    (5, 1),  // Window size, transmit
    (6, 1),  // Window size, receive
    (7, 2),  // Ack timer
    (8, 2),  // Retries
];

/// The decoded body of one XID parameter.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamBody {
    Raw(Vec<u8>),
    ClassOfProcedures(ClassOfProcedures),
    HdlcOptionalFunctions(HdlcOptionalFunctions),
    BigEndianNumber { value: u32, byte_width: u8 },
}

/// One `PI/PL/PV` triple.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XidParameter {
    pub pi: u8,
    pub data: ParamBody,
}

/// Class-of-procedures capability flags (PI=2, PL=2).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClassOfProcedures {
    pub balanced: bool,
    pub unbalanced_primary: bool,
    pub unbalanced_secondary: bool,
    pub half_duplex: bool,
    pub full_duplex: bool,
}

/// On-wire bit layout of [`ClassOfProcedures`], MSB first across the two
/// PV bytes; the gaps between named bits round-trip through the
/// `reserved_*` fields rather than being silently dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, DekuRead, DekuWrite)]
struct ClassOfProceduresBits {
    #[deku(bits = "1")]
    reserved_15: u8,
    #[deku(bits = "1")]
    full_duplex: u8,
    #[deku(bits = "1")]
    half_duplex: u8,
    #[deku(bits = "9")]
    reserved_4_12: u16,
    #[deku(bits = "1")]
    unbalanced_secondary: u8,
    #[deku(bits = "1")]
    unbalanced_primary: u8,
    #[deku(bits = "1")]
    reserved_1: u8,
    #[deku(bits = "1")]
    balanced: u8,
}

impl ClassOfProcedures {
    fn from_bits(bits: &[u8; 2]) -> Result<Self, Ax25Error> {
        let (_, raw) = ClassOfProceduresBits::from_bytes((bits, 0))
            .map_err(|_| Ax25Error::InvalidLength("malformed class of procedures field".into()))?;
        Ok(ClassOfProcedures {
            balanced: raw.balanced != 0,
            unbalanced_primary: raw.unbalanced_primary != 0,
            unbalanced_secondary: raw.unbalanced_secondary != 0,
            half_duplex: raw.half_duplex != 0,
            full_duplex: raw.full_duplex != 0,
        })
    }

    fn to_bits(self) -> [u8; 2] {
        let raw = ClassOfProceduresBits {
            reserved_15: 0,
            full_duplex: u8::from(self.full_duplex),
            half_duplex: u8::from(self.half_duplex),
            reserved_4_12: 0,
            unbalanced_secondary: u8::from(self.unbalanced_secondary),
            unbalanced_primary: u8::from(self.unbalanced_primary),
            reserved_1: 0,
            balanced: u8::from(self.balanced),
        };
        let bytes = raw.to_bytes().expect("fixed-width bitfield always encodes");
        [bytes[0], bytes[1]]
    }
}

/// HDLC Optional Functions capability flags (PI=3, PL=3): eleven named
/// booleans packed into 24 bits. Only the bits the specification names
/// are exposed; the rest round-trip through the `reserved_*` fields.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HdlcOptionalFunctions {
    pub rej: bool,
    pub srej: bool,
    pub multi_frame_rej: bool,
    pub rnr: bool,
    pub extended_addr: bool,
    pub modulo_8: bool,
    pub modulo_128: bool,
    pub test: bool,
    pub fcs_16: bool,
    pub synchronous_tx: bool,
    pub start_stop_tx: bool,
}

/// On-wire bit layout of [`HdlcOptionalFunctions`], MSB first across the
/// three PV bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, DekuRead, DekuWrite)]
struct HdlcOptionalFunctionsBits {
    #[deku(bits = "2")]
    reserved_22_23: u8,
    #[deku(bits = "1")]
    start_stop_tx: u8,
    #[deku(bits = "1")]
    synchronous_tx: u8,
    #[deku(bits = "1")]
    reserved_19: u8,
    #[deku(bits = "1")]
    fcs_16: u8,
    #[deku(bits = "2")]
    reserved_16_17: u8,
    #[deku(bits = "1")]
    test: u8,
    #[deku(bits = "4")]
    reserved_11_14: u8,
    #[deku(bits = "1")]
    modulo_128: u8,
    #[deku(bits = "1")]
    modulo_8: u8,
    #[deku(bits = "1")]
    extended_addr: u8,
    #[deku(bits = "2")]
    reserved_6_7: u8,
    #[deku(bits = "1")]
    rnr: u8,
    #[deku(bits = "2")]
    reserved_3_4: u8,
    #[deku(bits = "1")]
    multi_frame_rej: u8,
    #[deku(bits = "1")]
    srej: u8,
    #[deku(bits = "1")]
    rej: u8,
}

impl HdlcOptionalFunctions {
    fn from_bits(bits: &[u8; 3]) -> Result<Self, Ax25Error> {
        let (_, raw) = HdlcOptionalFunctionsBits::from_bytes((bits, 0)).map_err(|_| {
            Ax25Error::InvalidLength("malformed HDLC optional functions field".into())
        })?;
        Ok(HdlcOptionalFunctions {
            rej: raw.rej != 0,
            srej: raw.srej != 0,
            multi_frame_rej: raw.multi_frame_rej != 0,
            rnr: raw.rnr != 0,
            extended_addr: raw.extended_addr != 0,
            modulo_8: raw.modulo_8 != 0,
            modulo_128: raw.modulo_128 != 0,
            test: raw.test != 0,
            fcs_16: raw.fcs_16 != 0,
            synchronous_tx: raw.synchronous_tx != 0,
            start_stop_tx: raw.start_stop_tx != 0,
        })
    }

    fn to_bits(self) -> [u8; 3] {
        let raw = HdlcOptionalFunctionsBits {
            reserved_22_23: 0,
            start_stop_tx: u8::from(self.start_stop_tx),
            synchronous_tx: u8::from(self.synchronous_tx),
            reserved_19: 0,
            fcs_16: u8::from(self.fcs_16),
            reserved_16_17: 0,
            test: u8::from(self.test),
            reserved_11_14: 0,
            modulo_128: u8::from(self.modulo_128),
            modulo_8: u8::from(self.modulo_8),
            extended_addr: u8::from(self.extended_addr),
            reserved_6_7: 0,
            rnr: u8::from(self.rnr),
            reserved_3_4: 0,
            multi_frame_rej: u8::from(self.multi_frame_rej),
            srej: u8::from(self.srej),
            rej: u8::from(self.rej),
        };
        let bytes = raw.to_bytes().expect("fixed-width bitfield always encodes");
        [bytes[0], bytes[1], bytes[2]]
    }
}

/// Decode the concatenated parameters buffer, returning every parameter
/// found and the number of bytes consumed (may be less than
/// `bytes.len()` only if the caller passed extra trailing data; malformed
/// PI/PL/PV framing is an error).
pub fn decode_parameters(bytes: &[u8]) -> Result<(Vec<XidParameter>, usize), Ax25Error> {
    let mut out = Vec::new();
    let mut pos = 0;
    while pos < bytes.len() {
        if pos + 2 > bytes.len() {
            return Err(Ax25Error::InvalidLength("truncated XID parameter header".into()));
        }
        let pi = bytes[pos];
        let pl = bytes[pos + 1] as usize;
        if pos + 2 + pl > bytes.len() {
            return Err(Ax25Error::InvalidLength("truncated XID parameter value".into()));
        }
        let pv = &bytes[pos + 2..pos + 2 + pl];
        let data = decode_param_body(pi, pl, pv);
        out.push(XidParameter { pi, data });
        pos += 2 + pl;
    }
    Ok((out, pos))
}

fn decode_param_body(pi: u8, pl: usize, pv: &[u8]) -> ParamBody {
    if pi == PI_CLASS_OF_PROCEDURES && pl == 2 {
        if let Ok(cop) = ClassOfProcedures::from_bits(&[pv[0], pv[1]]) {
            return ParamBody::ClassOfProcedures(cop);
        }
    }
    if pi == PI_HDLC_OPTIONAL_FUNCTIONS && pl == 3 {
        if let Ok(hdlc) = HdlcOptionalFunctions::from_bits(&[pv[0], pv[1], pv[2]]) {
            return ParamBody::HdlcOptionalFunctions(hdlc);
        }
    }
    if let Some(&(_, width)) = BIG_ENDIAN_PIS.iter().find(|&&(p, _)| p == pi) {
        if pl == width {
            let mut value: u32 = 0;
            for &b in pv {
                value = (value << 8) | b as u32;
            }
            return ParamBody::BigEndianNumber { value, byte_width: width as u8 };
        }
    }
    ParamBody::Raw(pv.to_vec())
}

/// Re-encode a parameter list back to the concatenated `PI PL PV...` form.
pub fn encode_parameters(params: &[XidParameter]) -> Vec<u8> {
    let mut out = Vec::new();
    for p in params {
        let pv = encode_param_body(&p.data);
        out.push(p.pi);
        out.push(pv.len() as u8);
        out.extend_from_slice(&pv);
    }
    out
}

fn encode_param_body(body: &ParamBody) -> Vec<u8> {
    match body {
        ParamBody::Raw(bytes) => bytes.clone(),
        ParamBody::ClassOfProcedures(c) => c.to_bits().to_vec(),
        ParamBody::HdlcOptionalFunctions(h) => h.to_bits().to_vec(),
        ParamBody::BigEndianNumber { value, byte_width } => {
            let full = value.to_be_bytes();
            full[4 - *byte_width as usize..].to_vec()
        }
    }
}

/// Process-wide default XID parameter set (§5), as the set of parameters
/// a caller would offer during link negotiation before any exchange has
/// happened. Lazily built once and immutable thereafter, so concurrent
/// readers need no locking; there is no explicit init/teardown in the
/// public API.
#[cfg(feature = "std")]
pub fn defaults() -> &'static [XidParameter] {
    static DEFAULTS: std::sync::OnceLock<Vec<XidParameter>> = std::sync::OnceLock::new();
    DEFAULTS.get_or_init(|| {
        alloc::vec![
            XidParameter {
                pi: PI_CLASS_OF_PROCEDURES,
                data: ParamBody::ClassOfProcedures(ClassOfProcedures {
                    balanced: true,
                    ..Default::default()
                }),
            },
            XidParameter {
                pi: PI_HDLC_OPTIONAL_FUNCTIONS,
                data: ParamBody::HdlcOptionalFunctions(HdlcOptionalFunctions {
                    rej: true,
                    modulo_8: true,
                    ..Default::default()
                }),
            },
            XidParameter { pi: 5, data: ParamBody::BigEndianNumber { value: 7, byte_width: 1 } },
            XidParameter { pi: 6, data: ParamBody::BigEndianNumber { value: 7, byte_width: 1 } },
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_mixed_parameters() {
        let params = alloc::vec![
            XidParameter {
                pi: PI_CLASS_OF_PROCEDURES,
                data: ParamBody::ClassOfProcedures(ClassOfProcedures {
                    balanced: true,
                    full_duplex: true,
                    ..Default::default()
                }),
            },
            XidParameter {
                pi: 5,
                data: ParamBody::BigEndianNumber { value: 7, byte_width: 1 },
            },
            XidParameter { pi: 200, data: ParamBody::Raw(alloc::vec![1, 2, 3]) },
        ];
        let bytes = encode_parameters(&params);
        let (decoded, consumed) = decode_parameters(&bytes).unwrap();
        assert_eq!(consumed, bytes.len());
        assert_eq!(decoded, params);
    }

    #[test]
    fn unknown_pi_round_trips_raw() {
        let bytes = [9u8, 2, 0xAA, 0xBB];
        let (decoded, _) = decode_parameters(&bytes).unwrap();
        assert_eq!(decoded[0].data, ParamBody::Raw(alloc::vec![0xAA, 0xBB]));
    }

    #[test]
    fn truncated_parameter_errors() {
        let bytes = [2u8, 5, 0, 0];
        assert!(decode_parameters(&bytes).is_err());
    }

    #[cfg(feature = "std")]
    #[test]
    fn defaults_are_stable_across_calls() {
        let a = defaults().to_vec();
        let b = defaults().to_vec();
        assert_eq!(a, b);
    }
}
