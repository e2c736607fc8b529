//! General queries (DTI `?`) and the directed-query responder, §4.12.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use super::position::Timestamp;
use crate::error::AprsError;

/// `query(1..20) '?'`, a trailing `?` required.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub verb: String,
}

impl Query {
    pub fn decode(body: &[u8]) -> Result<Self, AprsError> {
        let text = core::str::from_utf8(body).map_err(|_| AprsError::InvalidUtf8)?;
        let verb = text
            .strip_suffix('?')
            .ok_or_else(|| AprsError::MalformedField("query must end with '?'".into()))?;
        if !(1..=20).contains(&verb.len()) {
            return Err(AprsError::InvalidLength("query verb must be 1..20 bytes".into()));
        }
        Ok(Query { verb: String::from(verb) })
    }

    pub fn encode(&self) -> Vec<u8> {
        format!("{}?", self.verb).into_bytes()
    }
}

/// The station state a directed-query responder needs to answer
/// `?APRS?`, `?LOC?`, `?TIME?`, and `?DST?` (§4.12).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct StationRecord {
    pub callsign: String,
    pub software_version: String,
    pub lat: f64,
    pub lon: f64,
    pub sym_table: char,
    pub sym_code: char,
    pub destination: Option<(f64, f64)>,
    pub timestamp: Option<Timestamp>,
    pub status_text: String,
}

/// Given a message whose text is `?VERB?`, produce the response body (no
/// DTI byte — the caller wraps it in whatever frame type it answers
/// with). An unrecognized verb returns an empty response per §4.12.
pub fn respond(verb: &str, station: &StationRecord) -> Result<Vec<u8>, AprsError> {
    Ok(match verb {
        "APRS" => station.software_version.clone().into_bytes(),
        "LOC" => {
            let pos = super::position::Position {
                lat: station.lat,
                lon: station.lon,
                sym_table: station.sym_table,
                sym_code: station.sym_code,
                ambiguity: 0,
                timestamp: None,
                extension: None,
                altitude_feet: None,
                peet_weather: None,
                comment: String::new(),
            };
            let mut out = alloc::vec![b'!'];
            out.extend_from_slice(&pos.encode_uncompressed()?);
            out
        }
        "TIME" => {
            let mut out = alloc::vec![b'>'];
            if let Some(ts) = station.timestamp {
                out.extend_from_slice(&ts.encode());
            }
            out
        }
        "DST" => match station.destination {
            None => b"Unknown".to_vec(),
            Some((dlat, dlon)) => {
                let km = great_circle_km(station.lat, station.lon, dlat, dlon);
                format!("{} km", km.round() as i64).into_bytes()
            }
        },
        _ => Vec::new(),
    })
}

const EARTH_RADIUS_KM: f64 = 6371.0;

fn great_circle_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let to_rad = |d: f64| d * core::f64::consts::PI / 180.0;
    let (phi1, phi2) = (to_rad(lat1), to_rad(lat2));
    let dphi = to_rad(lat2 - lat1);
    let dlambda = to_rad(lon2 - lon1);
    let sin_dphi = libm::sin(dphi / 2.0);
    let sin_dlambda = libm::sin(dlambda / 2.0);
    let a = sin_dphi * sin_dphi + libm::cos(phi1) * libm::cos(phi2) * sin_dlambda * sin_dlambda;
    let c = 2.0 * libm::atan2(libm::sqrt(a), libm::sqrt(1.0 - a));
    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn general_query_round_trips() {
        let q = Query { verb: "APRS".into() };
        let wire = q.encode();
        assert_eq!(wire, b"APRS?");
        assert_eq!(Query::decode(&wire).unwrap(), q);
    }

    #[test]
    fn directed_query_aprs_returns_version() {
        let station = StationRecord {
            callsign: "N0CALL".into(),
            software_version: "ax25aprs/0.1".into(),
            lat: 0.0,
            lon: 0.0,
            sym_table: '/',
            sym_code: '-',
            destination: None,
            timestamp: None,
            status_text: String::new(),
        };
        assert_eq!(respond("APRS", &station).unwrap(), b"ax25aprs/0.1");
    }

    #[test]
    fn directed_query_dst_unknown_without_destination() {
        let station = StationRecord {
            callsign: "N0CALL".into(),
            software_version: "v1".into(),
            lat: 0.0,
            lon: 0.0,
            sym_table: '/',
            sym_code: '-',
            destination: None,
            timestamp: None,
            status_text: String::new(),
        };
        assert_eq!(respond("DST", &station).unwrap(), b"Unknown");
    }

    #[test]
    fn directed_query_dst_computes_distance() {
        let station = StationRecord {
            callsign: "N0CALL".into(),
            software_version: "v1".into(),
            lat: 0.0,
            lon: 0.0,
            sym_table: '/',
            sym_code: '-',
            destination: Some((0.0, 1.0)),
            timestamp: None,
            status_text: String::new(),
        };
        let response = respond("DST", &station).unwrap();
        let text = core::str::from_utf8(&response).unwrap();
        assert!(text.ends_with(" km"));
        let km: f64 = text.trim_end_matches(" km").parse().unwrap();
        assert!((km - 111.0).abs() < 2.0);
    }

    #[test]
    fn directed_query_unknown_verb_is_empty() {
        let station = StationRecord {
            callsign: "N0CALL".into(),
            software_version: "v1".into(),
            lat: 0.0,
            lon: 0.0,
            sym_table: '/',
            sym_code: '-',
            destination: None,
            timestamp: None,
            status_text: String::new(),
        };
        assert!(respond("FROBNICATE", &station).unwrap().is_empty());
    }
}
