//! Standalone weather reports (DTI `_`) and the `#W1` Peet Bros comment
//! variant, §4.11.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use crate::error::AprsError;
use crate::util::parse_fixed_digits;

/// `MMDDHHMM`, the weather-only timestamp form with no trailing format
/// discriminator byte (distinct from [`super::position::Timestamp`]).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeatherTimestamp {
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
}

impl WeatherTimestamp {
    pub fn decode(bytes: &[u8]) -> Result<Self, AprsError> {
        if bytes.len() != 8 {
            return Err(AprsError::InvalidLength("weather timestamp must be 8 bytes".into()));
        }
        Ok(WeatherTimestamp {
            month: parse_fixed_digits(&bytes[0..2], 2)? as u8,
            day: parse_fixed_digits(&bytes[2..4], 2)? as u8,
            hour: parse_fixed_digits(&bytes[4..6], 2)? as u8,
            minute: parse_fixed_digits(&bytes[6..8], 2)? as u8,
        })
    }

    pub fn encode(&self) -> String {
        format!("{:02}{:02}{:02}{:02}", self.month, self.day, self.hour, self.minute)
    }
}

/// Every field is optional: real weather stations routinely omit sensors
/// they don't have, and a missing field decodes to `None` rather than a
/// sentinel numeric value.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WeatherReport {
    pub timestamp: Option<WeatherTimestamp>,
    pub wind_dir_deg: Option<u16>,
    pub wind_speed_mph: Option<u16>,
    pub wind_gust_mph: Option<u16>,
    pub temp_f: Option<i16>,
    pub rain_1h_hundredths: Option<u16>,
    pub rain_24h_hundredths: Option<u16>,
    pub rain_since_midnight_hundredths: Option<u16>,
    pub humidity_pct: Option<u8>,
    pub pressure_tenths_hpa: Option<u32>,
    pub luminosity_wpm2: Option<u16>,
    pub raw_rain_counter: Option<u16>,
}

impl WeatherReport {
    /// Decode the body after the `_` DTI: 8-byte timestamp then `code DDD`
    /// fields in any order, each 3-4 characters.
    pub fn decode(body: &[u8]) -> Result<Self, AprsError> {
        if body.len() < 8 {
            return Err(AprsError::InvalidLength("weather report too short".into()));
        }
        let timestamp = Some(WeatherTimestamp::decode(&body[0..8])?);
        let mut report = WeatherReport { timestamp, ..Default::default() };
        decode_fields(&body[8..], &mut report);
        Ok(report)
    }

    /// Decode the `#W1` comment-embedded variant: same field grammar,
    /// no leading timestamp.
    pub fn decode_peet_comment(fields: &[u8]) -> Result<Self, AprsError> {
        let mut report = WeatherReport::default();
        decode_fields(fields, &mut report);
        Ok(report)
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        if let Some(ts) = self.timestamp {
            out.extend_from_slice(ts.encode().as_bytes());
        }
        if let Some(v) = self.wind_dir_deg {
            out.extend_from_slice(format!("c{v:03}").as_bytes());
        }
        if let Some(v) = self.wind_speed_mph {
            out.extend_from_slice(format!("s{v:03}").as_bytes());
        }
        if let Some(v) = self.wind_gust_mph {
            out.extend_from_slice(format!("g{v:03}").as_bytes());
        }
        if let Some(v) = self.temp_f {
            out.extend_from_slice(format!("t{v:03}").as_bytes());
        }
        if let Some(v) = self.rain_1h_hundredths {
            out.extend_from_slice(format!("r{v:03}").as_bytes());
        }
        if let Some(v) = self.rain_24h_hundredths {
            out.extend_from_slice(format!("p{v:03}").as_bytes());
        }
        if let Some(v) = self.rain_since_midnight_hundredths {
            out.extend_from_slice(format!("P{v:03}").as_bytes());
        }
        if let Some(v) = self.humidity_pct {
            let wire = if v >= 100 { 0 } else { v };
            out.extend_from_slice(format!("h{wire:02}").as_bytes());
        }
        if let Some(v) = self.pressure_tenths_hpa {
            out.extend_from_slice(format!("b{v:05}").as_bytes());
        }
        if let Some(v) = self.luminosity_wpm2 {
            if v <= 999 {
                out.extend_from_slice(format!("L{v:03}").as_bytes());
            } else {
                out.extend_from_slice(format!("l{:03}", v - 1000).as_bytes());
            }
        }
        if let Some(v) = self.raw_rain_counter {
            out.extend_from_slice(format!("#{v:03}").as_bytes());
        }
        out
    }
}

fn decode_fields(mut rest: &[u8], report: &mut WeatherReport) {
    while !rest.is_empty() {
        let code = rest[0];
        let width = match code {
            b'h' => 2,
            b'b' => 5,
            _ => 3,
        };
        if rest.len() < 1 + width {
            return;
        }
        let digits = &rest[1..1 + width];
        rest = &rest[1 + width..];
        match code {
            b'c' => report.wind_dir_deg = parse_fixed_digits(digits, 3).ok().map(|v| v as u16),
            b's' => report.wind_speed_mph = parse_fixed_digits(digits, 3).ok().map(|v| v as u16),
            b'g' => report.wind_gust_mph = parse_fixed_digits(digits, 3).ok().map(|v| v as u16),
            b't' => {
                report.temp_f = parse_signed_3(digits);
            }
            b'r' => report.rain_1h_hundredths = parse_fixed_digits(digits, 3).ok().map(|v| v as u16),
            b'p' => report.rain_24h_hundredths = parse_fixed_digits(digits, 3).ok().map(|v| v as u16),
            b'P' => {
                report.rain_since_midnight_hundredths =
                    parse_fixed_digits(digits, 3).ok().map(|v| v as u16)
            }
            b'h' => {
                report.humidity_pct = parse_fixed_digits(digits, 2).ok().map(|v| if v == 0 { 100 } else { v as u8 })
            }
            b'b' => report.pressure_tenths_hpa = parse_fixed_digits(digits, 5).ok(),
            b'L' => report.luminosity_wpm2 = parse_fixed_digits(digits, 3).ok().map(|v| v as u16),
            b'l' => {
                report.luminosity_wpm2 = parse_fixed_digits(digits, 3).ok().map(|v| v as u16 + 1000)
            }
            b'#' => report.raw_rain_counter = parse_fixed_digits(digits, 3).ok().map(|v| v as u16),
            _ => {
                // Unknown field code: §7's liberal-parsing policy — stop
                // rather than misinterpret the remainder as field data.
                return;
            }
        }
    }
}

fn parse_signed_3(digits: &[u8]) -> Option<i16> {
    if digits.len() != 3 {
        return None;
    }
    if digits[0] == b'-' {
        parse_fixed_digits(&digits[1..3], 2).ok().map(|v| -(v as i16))
    } else {
        parse_fixed_digits(digits, 3).ok().map(|v| v as i16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// §8 scenario 4.
    #[test]
    fn weather_encode_scenario() {
        let report = WeatherReport {
            timestamp: Some(WeatherTimestamp { month: 12, day: 1, hour: 0, minute: 0 }),
            wind_dir_deg: Some(180),
            wind_speed_mph: Some(10),
            temp_f: Some(25),
            ..Default::default()
        };
        let wire = report.encode();
        assert_eq!(core::str::from_utf8(&wire).unwrap(), "12010000c180s010t025");
    }

    #[test]
    fn weather_round_trips_through_decode() {
        let wire = b"12010000c180s010t025";
        let decoded = WeatherReport::decode(wire).unwrap();
        assert_eq!(decoded.wind_dir_deg, Some(180));
        assert_eq!(decoded.wind_speed_mph, Some(10));
        assert_eq!(decoded.temp_f, Some(25));
        assert_eq!(decoded.encode(), wire);
    }

    #[test]
    fn negative_temperature_round_trips() {
        let wire = b"12010000t-05";
        let decoded = WeatherReport::decode(&wire[..]).unwrap();
        assert_eq!(decoded.temp_f, Some(-5));
    }

    #[test]
    fn missing_fields_decode_to_none() {
        let decoded = WeatherReport::decode(b"12010000").unwrap();
        assert!(decoded.wind_dir_deg.is_none());
        assert!(decoded.temp_f.is_none());
    }
}
