//! Object (DTI `;`) and item (DTI `)`) reports, §4.11.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use super::position::{DataExtension, Timestamp};
use super::weather::WeatherReport;
use crate::error::AprsError;

/// `name(9) '*'|'_' timestamp(7) lat(8) sym_table lon(9) sym_code
/// [extension] [comment]`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    pub name: String,
    pub live: bool,
    pub timestamp: Timestamp,
    pub lat: f64,
    pub lon: f64,
    pub sym_table: char,
    pub sym_code: char,
    pub extension: Option<DataExtension>,
    /// Peet Bros weather fields parsed out of a `#W1` token in the
    /// comment, if any (§4.11).
    pub peet_weather: Option<WeatherReport>,
    pub comment: String,
}

impl Object {
    pub fn decode(body: &[u8]) -> Result<Self, AprsError> {
        if body.len() < 26 {
            return Err(AprsError::InvalidLength("object body too short".into()));
        }
        let name = String::from_utf8(body[0..9].to_vec()).map_err(|_| AprsError::InvalidUtf8)?;
        let live = match body[9] {
            b'*' => true,
            b'_' => false,
            other => {
                return Err(AprsError::MalformedField(format!(
                    "object liveness byte must be '*' or '_', got 0x{other:02x}"
                )))
            }
        };
        let timestamp = Timestamp::decode(&body[10..17])?;
        let pos = super::position::Position::decode_uncompressed(&body[17..], false)?;
        Ok(Object {
            name,
            live,
            timestamp,
            lat: pos.lat,
            lon: pos.lon,
            sym_table: pos.sym_table,
            sym_code: pos.sym_code,
            extension: pos.extension,
            peet_weather: pos.peet_weather,
            comment: pos.comment,
        })
    }

    pub fn encode(&self) -> Result<Vec<u8>, AprsError> {
        let mut out = Vec::new();
        out.extend_from_slice(format!("{:<9}", self.name).as_bytes());
        out.push(if self.live { b'*' } else { b'_' });
        out.extend_from_slice(&self.timestamp.encode());
        let pos = super::position::Position {
            lat: self.lat,
            lon: self.lon,
            sym_table: self.sym_table,
            sym_code: self.sym_code,
            ambiguity: 0,
            timestamp: None,
            extension: self.extension,
            altitude_feet: None,
            peet_weather: None,
            comment: self.comment.clone(),
        };
        out.extend_from_slice(&pos.encode_uncompressed()?);
        Ok(out)
    }
}

/// `name(3..9) '!'|'_' lat(8) sym_table lon(9) sym_code [comment]`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub name: String,
    pub live: bool,
    pub lat: f64,
    pub lon: f64,
    pub sym_table: char,
    pub sym_code: char,
    /// Peet Bros weather fields parsed out of a `#W1` token in the
    /// comment, if any (§4.11).
    pub peet_weather: Option<WeatherReport>,
    pub comment: String,
}

impl Item {
    pub fn decode(body: &[u8]) -> Result<Self, AprsError> {
        let marker_idx = body
            .iter()
            .position(|&b| b == b'!' || b == b'_')
            .ok_or_else(|| AprsError::MalformedField("item missing liveness marker".into()))?;
        if !(3..=9).contains(&marker_idx) {
            return Err(AprsError::InvalidLength("item name must be 3..9 bytes".into()));
        }
        let name =
            String::from_utf8(body[0..marker_idx].to_vec()).map_err(|_| AprsError::InvalidUtf8)?;
        let live = body[marker_idx] == b'!';
        let pos = super::position::Position::decode_uncompressed(&body[marker_idx + 1..], false)?;
        Ok(Item {
            name,
            live,
            lat: pos.lat,
            lon: pos.lon,
            sym_table: pos.sym_table,
            sym_code: pos.sym_code,
            peet_weather: pos.peet_weather,
            comment: pos.comment,
        })
    }

    pub fn encode(&self) -> Result<Vec<u8>, AprsError> {
        let mut out = Vec::new();
        out.extend_from_slice(self.name.as_bytes());
        out.push(if self.live { b'!' } else { b'_' });
        let pos = super::position::Position {
            lat: self.lat,
            lon: self.lon,
            sym_table: self.sym_table,
            sym_code: self.sym_code,
            ambiguity: 0,
            timestamp: None,
            extension: None,
            altitude_feet: None,
            peet_weather: None,
            comment: self.comment.clone(),
        };
        out.extend_from_slice(&pos.encode_uncompressed()?);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_round_trips() {
        let obj = Object {
            name: "TESTOBJ".into(),
            live: true,
            timestamp: Timestamp::DhmZulu { day: 1, hour: 2, minute: 3 },
            lat: 40.0,
            lon: -75.0,
            sym_table: '/',
            sym_code: 'O',
            extension: None,
            peet_weather: None,
            comment: "hello".into(),
        };
        let wire = obj.encode().unwrap();
        let decoded = Object::decode(&wire).unwrap();
        assert_eq!(decoded.name.trim_end(), "TESTOBJ");
        assert!(decoded.live);
        assert!((decoded.lat - 40.0).abs() < 1e-6);
    }

    #[test]
    fn item_round_trips() {
        let item = Item {
            name: "ITEM1".into(),
            live: true,
            lat: 10.0,
            lon: 20.0,
            sym_table: '/',
            sym_code: 'x',
            peet_weather: None,
            comment: String::new(),
        };
        let wire = item.encode().unwrap();
        let decoded = Item::decode(&wire).unwrap();
        assert_eq!(decoded.name, "ITEM1");
        assert!(decoded.live);
    }

    #[test]
    fn item_rejects_out_of_range_name_width() {
        let wire = b"AB!4000.00N/07500.00W-";
        assert!(Item::decode(wire).is_err());
    }
}
