//! The smaller remaining payload codecs from §4.11's contract table:
//! station capabilities, grid square, test packets, user-defined and
//! third-party wrappers, Agrelo DF, DF reports, and raw GPS/Ultimeter.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use crate::error::AprsError;
use crate::util::parse_fixed_digits;

/// Station capabilities, DTI `<`: free text, no further structure.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capabilities {
    pub text: String,
}

impl Capabilities {
    pub fn decode(body: &[u8]) -> Result<Self, AprsError> {
        let text = core::str::from_utf8(body).map_err(|_| AprsError::InvalidUtf8)?;
        Ok(Capabilities { text: String::from(text) })
    }

    pub fn encode(&self) -> Vec<u8> {
        self.text.clone().into_bytes()
    }
}

/// Grid square, DTI `[`: `grid(4 or 6) ' ' [comment]`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridSquare {
    pub grid: String,
    pub comment: String,
}

impl GridSquare {
    pub fn decode(body: &[u8]) -> Result<Self, AprsError> {
        let len = if body.len() >= 6 && is_valid_grid(&body[0..6]) {
            6
        } else if body.len() >= 4 && is_valid_grid(&body[0..4]) {
            4
        } else {
            return Err(AprsError::MalformedField("not a valid Maidenhead grid square".into()));
        };
        let grid = String::from_utf8(body[0..len].to_vec()).map_err(|_| AprsError::InvalidUtf8)?;
        let comment = if body.len() > len + 1 {
            core::str::from_utf8(&body[len + 1..]).map_err(|_| AprsError::InvalidUtf8)?
        } else {
            ""
        };
        Ok(GridSquare { grid, comment: String::from(comment) })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = self.grid.clone().into_bytes();
        if !self.comment.is_empty() {
            out.push(b' ');
            out.extend_from_slice(self.comment.as_bytes());
        }
        out
    }
}

fn is_valid_grid(bytes: &[u8]) -> bool {
    let ab_range = |b: u8| (b'A'..=b'R').contains(&b);
    match bytes.len() {
        4 => ab_range(bytes[0]) && ab_range(bytes[1]) && bytes[2].is_ascii_digit() && bytes[3].is_ascii_digit(),
        6 => {
            ab_range(bytes[0])
                && ab_range(bytes[1])
                && bytes[2].is_ascii_digit()
                && bytes[3].is_ascii_digit()
                && (b'A'..=b'X').contains(&bytes[4])
                && (b'A'..=b'X').contains(&bytes[5])
        }
        _ => false,
    }
}

/// Test packet, DTI `,`: arbitrary bytes, possibly empty.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TestPacket {
    pub data: Vec<u8>,
}

impl TestPacket {
    pub fn decode(body: &[u8]) -> Self {
        TestPacket { data: body.to_vec() }
    }

    /// Encoding an empty payload still yields the single-byte `,` DTI —
    /// the dispatcher's job, not this codec's; this returns the body only.
    pub fn encode(&self) -> Vec<u8> {
        self.data.clone()
    }
}

/// User-defined, DTI `{`: `userID(1) packetType(1) data`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDefined {
    pub user_id: u8,
    pub packet_type: u8,
    pub data: Vec<u8>,
}

impl UserDefined {
    pub fn decode(body: &[u8]) -> Result<Self, AprsError> {
        if body.len() < 2 {
            return Err(AprsError::InvalidLength("user-defined payload needs at least 2 bytes".into()));
        }
        Ok(UserDefined { user_id: body[0], packet_type: body[1], data: body[2..].to_vec() })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = alloc::vec![self.user_id, self.packet_type];
        out.extend_from_slice(&self.data);
        out
    }
}

/// Third-party, DTI `}`: `header ':' inner_info`, exactly one colon
/// (APRS 1.2 restricts third-party relaying to a single hop of nesting).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThirdParty {
    pub header: String,
    pub inner_info: Vec<u8>,
}

impl ThirdParty {
    pub fn decode(body: &[u8]) -> Result<Self, AprsError> {
        let colon = body
            .iter()
            .position(|&b| b == b':')
            .ok_or_else(|| AprsError::MalformedField("third-party payload missing ':'".into()))?;
        if body[colon + 1..].contains(&b':') {
            return Err(AprsError::MalformedField(
                "third-party payload must contain exactly one ':'".into(),
            ));
        }
        let header =
            String::from_utf8(body[0..colon].to_vec()).map_err(|_| AprsError::InvalidUtf8)?;
        Ok(ThirdParty { header, inner_info: body[colon + 1..].to_vec() })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = self.header.clone().into_bytes();
        out.push(b':');
        out.extend_from_slice(&self.inner_info);
        out
    }
}

/// Agrelo direction-finding report, DTI `%`: `bearing(3) '/' quality(1)`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgreloDf {
    pub bearing_deg: u16,
    pub quality: u8,
}

impl AgreloDf {
    pub fn decode(body: &[u8]) -> Result<Self, AprsError> {
        if body.len() != 5 || body[3] != b'/' {
            return Err(AprsError::MalformedField("Agrelo DF must be 'DDD/Q'".into()));
        }
        let bearing_deg = parse_fixed_digits(&body[0..3], 3)? as u16;
        let quality = body[4]
            .is_ascii_digit()
            .then(|| body[4] - b'0')
            .ok_or_else(|| AprsError::MalformedField("Agrelo DF quality must be a digit".into()))?;
        Ok(AgreloDf { bearing_deg, quality })
    }

    pub fn encode(&self) -> Vec<u8> {
        format!("{:03}/{}", self.bearing_deg, self.quality).into_bytes()
    }
}

/// Direction-finding report: implementation-defined free text plus a
/// comment and a Unix timestamp, per §4.11's "implementation-defined
/// record" note.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DfReport {
    pub comment: String,
    pub unix_timestamp: i64,
}

impl DfReport {
    /// Build a `DfReport` from a decoded position carrying a `DFS...`
    /// data extension (§3), stamping it with a caller-supplied Unix
    /// timestamp since the wire form has no epoch time of its own (only
    /// the DHM/HMS forms in [`super::position::Timestamp`]). Returns
    /// `None` if the position's extension isn't a DF report.
    pub fn from_position(pos: &super::position::Position, unix_timestamp: i64) -> Option<Self> {
        match pos.extension {
            Some(super::position::DataExtension::Df { .. }) => {
                Some(DfReport { comment: pos.comment.clone(), unix_timestamp })
            }
            _ => None,
        }
    }
}

/// Raw GPS (NMEA) or Ultimeter weather-station feed, DTI `$`, dispatched
/// by the token immediately following the `$`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawGps {
    Nmea(String),
    Ultimeter(String),
}

impl RawGps {
    pub fn decode(body: &[u8]) -> Result<Self, AprsError> {
        let text = core::str::from_utf8(body).map_err(|_| AprsError::InvalidUtf8)?;
        if let Some(rest) = text.strip_prefix("ULTW") {
            Ok(RawGps::Ultimeter(String::from(rest)))
        } else if text.starts_with("GP") {
            Ok(RawGps::Nmea(String::from(text)))
        } else {
            Err(AprsError::MalformedField("unrecognized $ payload token".into()))
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        match self {
            RawGps::Nmea(s) => s.clone().into_bytes(),
            RawGps::Ultimeter(s) => format!("ULTW{s}").into_bytes(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capabilities_round_trips() {
        let c = Capabilities { text: "IGATE,MSG_CNT=1".into() };
        assert_eq!(Capabilities::decode(&c.encode()).unwrap(), c);
    }

    #[test]
    fn grid_square_round_trips_4_and_6() {
        let g4 = GridSquare { grid: "CM87".into(), comment: "hi".into() };
        assert_eq!(GridSquare::decode(&g4.encode()).unwrap(), g4);
        let g6 = GridSquare { grid: "CM87AX".into(), comment: String::new() };
        let wire = g6.encode();
        let decoded = GridSquare::decode(&wire).unwrap();
        assert_eq!(decoded.grid, "CM87AX");
    }

    #[test]
    fn test_packet_round_trips_including_empty() {
        let t = TestPacket::default();
        assert_eq!(t.encode(), Vec::<u8>::new());
        let t2 = TestPacket { data: alloc::vec![1, 2, 3] };
        assert_eq!(TestPacket::decode(&t2.encode()), t2);
    }

    #[test]
    fn user_defined_round_trips() {
        let u = UserDefined { user_id: b'X', packet_type: b'1', data: alloc::vec![0xAA, 0xBB] };
        let wire = u.encode();
        assert_eq!(UserDefined::decode(&wire).unwrap(), u);
    }

    #[test]
    fn third_party_rejects_multiple_colons() {
        let body = b"WIDE1-1:data:extra";
        assert!(ThirdParty::decode(body).is_err());
    }

    #[test]
    fn third_party_round_trips() {
        let tp = ThirdParty { header: "WIDE1-1".into(), inner_info: b"!hello".to_vec() };
        let wire = tp.encode();
        assert_eq!(ThirdParty::decode(&wire).unwrap(), tp);
    }

    #[test]
    fn agrelo_df_round_trips() {
        let df = AgreloDf { bearing_deg: 123, quality: 5 };
        let wire = df.encode();
        assert_eq!(AgreloDf::decode(&wire).unwrap(), df);
    }

    #[test]
    fn df_report_extracted_from_position_with_df_extension() {
        use super::super::position::{DataExtension, Position};

        let pos = Position {
            lat: 40.0,
            lon: -75.0,
            sym_table: '/',
            sym_code: '\\',
            ambiguity: 0,
            timestamp: None,
            extension: Some(DataExtension::Df { strength: 3, height: 5, gain: 9, directivity: 0 }),
            altitude_feet: None,
            peet_weather: None,
            comment: "146.520MHz T100".into(),
        };
        let report = DfReport::from_position(&pos, 1_700_000_000).unwrap();
        assert_eq!(report.comment, "146.520MHz T100");
        assert_eq!(report.unix_timestamp, 1_700_000_000);
    }

    #[test]
    fn df_report_is_none_without_df_extension() {
        use super::super::position::Position;

        let pos = Position {
            lat: 0.0,
            lon: 0.0,
            sym_table: '/',
            sym_code: '-',
            ambiguity: 0,
            timestamp: None,
            extension: None,
            altitude_feet: None,
            peet_weather: None,
            comment: String::new(),
        };
        assert!(DfReport::from_position(&pos, 0).is_none());
    }

    #[test]
    fn raw_gps_dispatches_by_token() {
        assert!(matches!(RawGps::decode(b"GPRMC,...").unwrap(), RawGps::Nmea(_)));
        assert!(matches!(RawGps::decode(b"ULTWfeed").unwrap(), RawGps::Ultimeter(_)));
    }
}
