//! The APRS position family (C9, §4.10): uncompressed, Base-91 compressed,
//! and Mic-E encoded positions, plus the timestamp and data-extension
//! sub-codecs they share.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use super::weather::WeatherReport;
use crate::error::AprsError;
use crate::util::{base91_decode, base91_encode};

/// A decoded latitude/longitude/symbol position, with whatever timestamp,
/// data extension, and free-text comment rode along with it.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub lat: f64,
    pub lon: f64,
    pub sym_table: char,
    pub sym_code: char,
    /// Number of trailing digits blanked for position ambiguity (0..=4),
    /// the larger of the latitude and longitude ambiguity.
    pub ambiguity: u8,
    pub timestamp: Option<Timestamp>,
    pub extension: Option<DataExtension>,
    /// Altitude parsed out of a `/A=NNNNNN` token in the comment, if any.
    pub altitude_feet: Option<i32>,
    /// Peet Bros weather fields parsed out of a `#W1` token in the
    /// comment, if any (§4.11).
    pub peet_weather: Option<WeatherReport>,
    pub comment: String,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timestamp {
    DhmZulu { day: u8, hour: u8, minute: u8 },
    DhmLocal { day: u8, hour: u8, minute: u8 },
    Hms { hour: u8, minute: u8, second: u8 },
    Mdhm { month: u8, day: u8, hour: u8, minute: u8 },
}

impl Timestamp {
    /// Decode the fixed 7-byte `DDHHMMz` / `HHMMSSh` / `MMDDHHMM` form.
    pub fn decode(bytes: &[u8]) -> Result<Self, AprsError> {
        if bytes.len() != 7 {
            return Err(AprsError::InvalidLength(format!(
                "timestamp must be 7 bytes, got {}",
                bytes.len()
            )));
        }
        let digits = &bytes[0..6];
        let d = |r: core::ops::Range<usize>| -> Result<u8, AprsError> {
            crate::util::parse_fixed_digits(&digits[r], 2).map(|v| v as u8)
        };
        match bytes[6] {
            b'z' => Ok(Timestamp::DhmZulu { day: d(0..2)?, hour: d(2..4)?, minute: d(4..6)? }),
            b'/' => Ok(Timestamp::DhmLocal { day: d(0..2)?, hour: d(2..4)?, minute: d(4..6)? }),
            b'h' => Ok(Timestamp::Hms { hour: d(0..2)?, minute: d(2..4)?, second: d(4..6)? }),
            c if c.is_ascii_digit() => {
                // MDHM packs month/day/hour as 2-digit groups; the seventh
                // byte (already known to be a digit) is minute's only digit.
                let s = core::str::from_utf8(bytes).map_err(|_| AprsError::InvalidUtf8)?;
                let two = |r: core::ops::Range<usize>| -> Result<u8, AprsError> {
                    s[r].parse::<u8>()
                        .map_err(|_| AprsError::MalformedField("non-numeric MDHM timestamp".into()))
                };
                Ok(Timestamp::Mdhm {
                    month: two(0..2)?,
                    day: two(2..4)?,
                    hour: two(4..6)?,
                    minute: two(6..7)?,
                })
            }
            other => Err(AprsError::MalformedField(format!(
                "unknown timestamp format discriminator 0x{other:02x}"
            ))),
        }
    }

    pub fn encode(&self) -> [u8; 7] {
        let mut out = [0u8; 7];
        match *self {
            Timestamp::DhmZulu { day, hour, minute } => {
                out[0..6].copy_from_slice(format!("{day:02}{hour:02}{minute:02}").as_bytes());
                out[6] = b'z';
            }
            Timestamp::DhmLocal { day, hour, minute } => {
                out[0..6].copy_from_slice(format!("{day:02}{hour:02}{minute:02}").as_bytes());
                out[6] = b'/';
            }
            Timestamp::Hms { hour, minute, second } => {
                out[0..6].copy_from_slice(format!("{hour:02}{minute:02}{second:02}").as_bytes());
                out[6] = b'h';
            }
            Timestamp::Mdhm { month, day, hour, minute } => {
                // MDHM has no trailing discriminator byte distinct from its
                // own digits; the final digit of `minute` fills byte 7.
                let s = format!("{month:02}{day:02}{hour:02}{minute:02}");
                out.copy_from_slice(s.as_bytes());
            }
        }
        out
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataExtension {
    CourseSpeed { course: Option<u16>, speed_knots: u16 },
    Phg { power: u8, height: u8, gain: u8, directivity: u8 },
    /// Direction-finding report extension: same `PHG`-style digit
    /// encoding (0-9 then A-Z for the height field), prefixed `DFS`
    /// instead of `PHG` (§3, §4.11's DF report row).
    Df { strength: u8, height: u8, gain: u8, directivity: u8 },
}

impl DataExtension {
    /// Parse the 7-byte suffix immediately following `sym_code`. On any
    /// mismatch this returns `Ok(None)` rather than an error: per the
    /// specification's liberal-parsing policy a malformed extension is
    /// dropped, not fatal.
    fn try_parse(bytes: &[u8]) -> Option<DataExtension> {
        if bytes.len() < 7 {
            return None;
        }
        let field = &bytes[0..7];
        if field[3] == b'/' {
            let course_digits = &field[0..3];
            let speed_digits = &field[4..7];
            if !course_digits.iter().all(u8::is_ascii_digit)
                || !speed_digits.iter().all(u8::is_ascii_digit)
            {
                return None;
            }
            let course_raw = crate::util::parse_fixed_digits(course_digits, 3).ok()?;
            let speed = crate::util::parse_fixed_digits(speed_digits, 3).ok()?;
            if course_raw > 360 {
                return None;
            }
            let course = if course_raw == 0 { None } else { Some(course_raw as u16) };
            return Some(DataExtension::CourseSpeed { course, speed_knots: speed as u16 });
        }
        if field[0] == b'P' && field[1] == b'H' && field[2] == b'G' {
            let decode_digit = |b: u8| -> Option<u8> {
                match b {
                    b'0'..=b'9' => Some(b - b'0'),
                    b'A'..=b'Z' => Some(10 + (b - b'A')),
                    _ => None,
                }
            };
            return Some(DataExtension::Phg {
                power: decode_digit(field[3])?,
                height: decode_digit(field[4])?,
                gain: decode_digit(field[5])?,
                directivity: decode_digit(field[6])?,
            });
        }
        if field[0] == b'D' && field[1] == b'F' && field[2] == b'S' {
            let decode_digit = |b: u8| -> Option<u8> {
                match b {
                    b'0'..=b'9' => Some(b - b'0'),
                    b'A'..=b'Z' => Some(10 + (b - b'A')),
                    _ => None,
                }
            };
            return Some(DataExtension::Df {
                strength: decode_digit(field[3])?,
                height: decode_digit(field[4])?,
                gain: decode_digit(field[5])?,
                directivity: decode_digit(field[6])?,
            });
        }
        None
    }

    fn encode(&self) -> [u8; 7] {
        let mut out = [0u8; 7];
        match *self {
            DataExtension::CourseSpeed { course, speed_knots } => {
                let s = format!("{:03}/{:03}", course.unwrap_or(0), speed_knots.min(999));
                out.copy_from_slice(s.as_bytes());
            }
            DataExtension::Phg { power, height, gain, directivity } => {
                let encode_digit = |v: u8| -> u8 {
                    if v < 10 { b'0' + v } else { b'A' + (v - 10) }
                };
                out[0] = b'P';
                out[1] = b'H';
                out[2] = b'G';
                out[3] = encode_digit(power);
                out[4] = encode_digit(height);
                out[5] = encode_digit(gain);
                out[6] = encode_digit(directivity);
            }
            DataExtension::Df { strength, height, gain, directivity } => {
                let encode_digit = |v: u8| -> u8 {
                    if v < 10 { b'0' + v } else { b'A' + (v - 10) }
                };
                out[0] = b'D';
                out[1] = b'F';
                out[2] = b'S';
                out[3] = encode_digit(strength);
                out[4] = encode_digit(height);
                out[5] = encode_digit(gain);
                out[6] = encode_digit(directivity);
            }
        }
        out
    }
}

fn blank_right(s: &str, n: usize) -> String {
    let n = n.min(s.len());
    let keep = s.len() - n;
    let mut out = String::with_capacity(s.len());
    out.push_str(&s[..keep]);
    for _ in 0..n {
        out.push(' ');
    }
    out
}

fn digit_or_space(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b' ' => None,
        _ => None,
    }
}

/// Format latitude as the 8-byte `DDMM.HHN` / `DDMM.HHS` field.
fn format_lat(lat: f64, ambiguity: u8) -> String {
    let south = lat < 0.0;
    let abs = lat.abs();
    let dd = abs.trunc() as u32;
    let minutes = (abs - dd as f64) * 60.0;
    let mut mm = minutes.trunc() as u32;
    let mut hh = ((minutes - mm as f64) * 100.0).round() as u32;
    if hh >= 100 {
        hh -= 100;
        mm += 1;
    }
    let digits = blank_right(&format!("{mm:02}{hh:02}", mm = mm.min(59), hh = hh.min(99)), ambiguity as usize);
    format!("{dd:02}{}.{}{}", &digits[0..2], &digits[2..4], if south { 'S' } else { 'N' })
}

/// Format longitude as the 9-byte `DDDMM.HHE` / `DDDMM.HHW` field.
fn format_lon(lon: f64, ambiguity: u8) -> String {
    let west = lon < 0.0;
    let abs = lon.abs();
    let ddd = abs.trunc() as u32;
    let minutes = (abs - ddd as f64) * 60.0;
    let mut mm = minutes.trunc() as u32;
    let mut hh = ((minutes - mm as f64) * 100.0).round() as u32;
    if hh >= 100 {
        hh -= 100;
        mm += 1;
    }
    let digits = blank_right(&format!("{mm:02}{hh:02}", mm = mm.min(59), hh = hh.min(99)), ambiguity as usize);
    format!("{ddd:03}{}.{}{}", &digits[0..2], &digits[2..4], if west { 'W' } else { 'E' })
}

fn parse_lat(field: &[u8]) -> Result<(f64, u8), AprsError> {
    if field.len() != 8 {
        return Err(AprsError::InvalidLength("latitude field must be 8 bytes".into()));
    }
    parse_coord(field, 2)
}

fn parse_lon(field: &[u8]) -> Result<(f64, u8), AprsError> {
    if field.len() != 9 {
        return Err(AprsError::InvalidLength("longitude field must be 9 bytes".into()));
    }
    parse_coord(field, 3)
}

/// Shared latitude/longitude body parser: `deg_width` leading degree
/// digits, then `MM.HH`, then a trailing hemisphere letter.
fn parse_coord(field: &[u8], deg_width: usize) -> Result<(f64, u8), AprsError> {
    let deg_digits = &field[0..deg_width];
    if !deg_digits.iter().all(u8::is_ascii_digit) {
        return Err(AprsError::MalformedField("non-numeric degrees field".into()));
    }
    let deg: u32 = crate::util::parse_fixed_digits(deg_digits, deg_width)?;
    let mm_bytes = &field[deg_width..deg_width + 2];
    if field[deg_width + 2] != b'.' {
        return Err(AprsError::MalformedField("missing decimal point in coordinate".into()));
    }
    let hh_bytes = &field[deg_width + 3..deg_width + 5];
    let hemi = field[deg_width + 5];

    let mut mm = 0u32;
    let mut hh = 0u32;
    for &b in mm_bytes {
        mm = mm * 10 + digit_or_space(b).unwrap_or(0) as u32;
    }
    for &b in hh_bytes {
        hh = hh * 10 + digit_or_space(b).unwrap_or(0) as u32;
    }
    // Ambiguity is the count of trailing blanked digits across mm||hh,
    // decoded with no centering offset applied (§9 open question (a)).
    let combined: [&[u8]; 2] = [mm_bytes, hh_bytes];
    let trailing_blanks =
        combined.iter().flat_map(|s| s.iter()).rev().take_while(|&&b| b == b' ').count();
    let ambiguity = trailing_blanks as u8;

    let sign = match hemi {
        b'N' | b'E' => 1.0,
        b'S' | b'W' => -1.0,
        _ => return Err(AprsError::MalformedField("unknown hemisphere letter".into())),
    };
    let value = sign * (deg as f64 + (mm as f64 + hh as f64 / 100.0) / 60.0);
    Ok((value, ambiguity))
}

impl Position {
    /// Decode an uncompressed position payload, `with_timestamp` selecting
    /// whether a 7-byte timestamp precedes the coordinate pair (DTI `@`/`/`
    /// vs `!`/`=`).
    pub fn decode_uncompressed(body: &[u8], with_timestamp: bool) -> Result<Self, AprsError> {
        let mut pos = 0;
        let timestamp = if with_timestamp {
            if body.len() < 7 {
                return Err(AprsError::InvalidLength("truncated timestamp".into()));
            }
            let ts = Timestamp::decode(&body[0..7])?;
            pos += 7;
            Some(ts)
        } else {
            None
        };

        if body.len() < pos + 19 {
            return Err(AprsError::InvalidLength("truncated position body".into()));
        }
        let (lat, lat_amb) = parse_lat(&body[pos..pos + 8])?;
        pos += 8;
        let sym_table = body[pos] as char;
        pos += 1;
        let (lon, lon_amb) = parse_lon(&body[pos..pos + 9])?;
        pos += 9;
        let sym_code = body[pos] as char;
        pos += 1;

        let rest = &body[pos..];
        let extension = DataExtension::try_parse(rest);
        let comment_start = if extension.is_some() { 7 } else { 0 };
        let comment_bytes = rest.get(comment_start..).unwrap_or(&[]);
        let comment = String::from_utf8_lossy(comment_bytes).into_owned();
        let altitude_feet = extract_altitude(&comment);
        let peet_weather = extract_peet_weather(&comment);

        Ok(Position {
            lat,
            lon,
            sym_table,
            sym_code,
            ambiguity: lat_amb.max(lon_amb),
            timestamp,
            extension,
            altitude_feet,
            peet_weather,
            comment,
        })
    }

    pub fn encode_uncompressed(&self) -> Result<Vec<u8>, AprsError> {
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(AprsError::MalformedField("latitude out of range".into()));
        }
        if !(-180.0..=180.0).contains(&self.lon) {
            return Err(AprsError::MalformedField("longitude out of range".into()));
        }
        let mut out = Vec::new();
        if let Some(ts) = self.timestamp {
            out.extend_from_slice(&ts.encode());
        }
        out.extend_from_slice(format_lat(self.lat, self.ambiguity).as_bytes());
        out.push(self.sym_table as u8);
        out.extend_from_slice(format_lon(self.lon, self.ambiguity).as_bytes());
        out.push(self.sym_code as u8);
        if let Some(ext) = &self.extension {
            out.extend_from_slice(&ext.encode());
        }
        out.extend_from_slice(self.comment.as_bytes());
        Ok(out)
    }
}

/// Extract a `/A=NNNNNN` altitude token (feet) from a comment string,
/// leaving the comment itself untouched (§4.10).
fn extract_altitude(comment: &str) -> Option<i32> {
    let idx = comment.find("/A=")?;
    let digits = comment.get(idx + 3..idx + 9)?;
    digits.parse::<i32>().ok()
}

/// Extract a `#W1` Peet Bros weather token from a comment string, leaving
/// the comment itself untouched (§4.11).
fn extract_peet_weather(comment: &str) -> Option<WeatherReport> {
    let idx = comment.find("#W1")?;
    let fields = comment.get(idx + 3..)?;
    WeatherReport::decode_peet_comment(fields.as_bytes()).ok()
}

/// A Base-91 compressed position (§4.10): 13 bytes after the DTI/symbol
/// table byte, used when precision or packet size matters more than
/// human readability.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressedPosition {
    pub sym_table: char,
    pub sym_code: char,
    pub y: u32,
    pub x: u32,
    pub extra: CompressedExtra,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressedExtra {
    None,
    CourseSpeed { course_deg: u16, speed_knots: u32 },
    Altitude { feet: u32 },
}

impl CompressedPosition {
    pub fn lat(&self) -> f64 {
        90.0 - self.y as f64 / 380926.0
    }

    pub fn lon(&self) -> f64 {
        self.x as f64 / 190463.0 - 180.0
    }

    pub fn from_lat_lon(lat: f64, lon: f64, sym_table: char, sym_code: char, extra: CompressedExtra) -> Self {
        let y = (380926.0 * (90.0 - lat)).round() as u32;
        let x = (190463.0 * (180.0 + lon)).round() as u32;
        CompressedPosition { sym_table, sym_code, y, x, extra }
    }

    /// Decode 13 bytes: `sym_table y(4) x(4) sym_code cs(2) T(1)`. The
    /// compression-type byte `T` selects what `cs` carries: `'{'` means
    /// `cs` is a two-digit base-91 altitude exponent, a blank `cs` means
    /// no course/speed/altitude at all, and anything else is course/speed.
    pub fn decode(bytes: &[u8]) -> Result<Self, AprsError> {
        if bytes.len() != 13 {
            return Err(AprsError::InvalidLength("compressed position must be 13 bytes".into()));
        }
        let sym_table = bytes[0] as char;
        let y = base91_decode(&bytes[1..5])?;
        let x = base91_decode(&bytes[5..9])?;
        let sym_code = bytes[9] as char;
        let c1 = bytes[10];
        let c2 = bytes[11];
        let t = bytes[12];
        let extra = if t == b'{' {
            let n = (c1 as i32 - 33) * 91 + (c2 as i32 - 33);
            let feet = libm_pow(1.002, n.max(0) as f64).round() as u32;
            CompressedExtra::Altitude { feet }
        } else if c1 == b' ' {
            CompressedExtra::None
        } else {
            let course_deg = ((c1 as i32 - 33) * 4) as u16;
            let speed_knots = (libm_pow(1.08, (c2 as i32 - 33) as f64) - 1.0).round().max(0.0) as u32;
            CompressedExtra::CourseSpeed { course_deg, speed_knots }
        };
        Ok(CompressedPosition { sym_table, sym_code, y, x, extra })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(13);
        out.push(self.sym_table as u8);
        out.extend_from_slice(&base91_encode(self.y, 4));
        out.extend_from_slice(&base91_encode(self.x, 4));
        out.push(self.sym_code as u8);
        let t = match self.extra {
            CompressedExtra::None => {
                out.extend_from_slice(b"  ");
                b'>'
            }
            CompressedExtra::CourseSpeed { course_deg, speed_knots } => {
                let c1 = 33 + (course_deg / 4) as u8;
                let speed = libm_log_round(1.08, speed_knots as f64 + 1.0);
                out.push(c1);
                out.push(33 + speed);
                b'>'
            }
            CompressedExtra::Altitude { feet } => {
                let n = libm_log_round_u16(1.002, feet as f64).min(91 * 91 - 1);
                out.push(33 + (n / 91) as u8);
                out.push(33 + (n % 91) as u8);
                b'{'
            }
        };
        out.push(t); // compression type T: origin/source unspecified except for altitude's marker
        out
    }
}

/// `base.powf(exp)`: `std`'s floating-point transcendentals aren't
/// available under `no_std`, so this crate pulls them from `libm` instead.
fn libm_pow(base: f64, exp: f64) -> f64 {
    libm::pow(base, exp)
}

fn libm_log_round(base: f64, value: f64) -> u8 {
    (libm::log(value) / libm::log(base)).round().max(0.0) as u8
}

fn libm_log_round_u16(base: f64, value: f64) -> u16 {
    (libm::log(value) / libm::log(base)).round().max(0.0) as u16
}

/// Mic-E destination-callsign + info-field decoding (§4.10).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MicEMessage {
    pub standard: bool,
    pub number: u8,
    pub emergency: bool,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct MicE {
    pub lat: f64,
    pub lon: f64,
    pub speed_knots: u16,
    pub course_deg: u16,
    pub sym_table: char,
    pub sym_code: char,
    pub message: MicEMessage,
    pub custom: bool,
    pub rest: Vec<u8>,
}

enum ByteClass {
    Digit(u8),
    Space,
    StandardBit,
    CustomBit,
    CustomZero,
}

fn classify_dest_byte(b: u8) -> ByteClass {
    match b {
        b'0'..=b'9' => ByteClass::Digit(b - b'0'),
        b'A'..=b'J' => ByteClass::Digit(b - b'A'),
        b'K' => ByteClass::CustomBit,
        b'L' => ByteClass::CustomZero,
        b'P'..=b'Y' => ByteClass::Digit(b - b'P'),
        b'Z' => ByteClass::StandardBit,
        b' ' => ByteClass::Space,
        _ => ByteClass::Space,
    }
}

fn dest_bit(b: u8) -> bool {
    matches!(b, b'A'..=b'K' | b'P'..=b'Z')
}

fn dest_is_standard(b: u8) -> Option<bool> {
    match b {
        b'P'..=b'Z' => Some(true),
        b'A'..=b'L' => Some(false),
        _ => None,
    }
}

impl MicE {
    /// `dest` is the 6-character destination callsign field (without
    /// SSID); `info` is the UI payload after the DTI byte.
    pub fn decode(dest: &[u8], info: &[u8]) -> Result<Self, AprsError> {
        if dest.len() != 6 {
            return Err(AprsError::InvalidLength("Mic-E destination must be 6 bytes".into()));
        }
        if info.len() < 9 {
            return Err(AprsError::InvalidLength("Mic-E info field too short".into()));
        }

        let mut digits = [0u8; 6];
        for (i, &b) in dest.iter().enumerate() {
            digits[i] = match classify_dest_byte(b) {
                ByteClass::Digit(d) => d,
                ByteClass::CustomZero => 0,
                ByteClass::Space | ByteClass::CustomBit | ByteClass::StandardBit => 0,
            };
        }
        let lat_deg = (digits[0] * 10 + digits[1]) as f64;
        let lat_min = (digits[2] * 10 + digits[3]) as f64 + (digits[4] * 10 + digits[5]) as f64 / 100.0;

        let north = dest_bit(dest[3]);
        let long_offset = dest_bit(dest[4]);
        let east = dest_bit(dest[5]);

        let bits = [dest_bit(dest[0]), dest_bit(dest[1]), dest_bit(dest[2])];
        let code = (bits[0] as u8) << 2 | (bits[1] as u8) << 1 | bits[2] as u8;
        let standard = [dest_is_standard(dest[0]), dest_is_standard(dest[1]), dest_is_standard(dest[2])]
            .iter()
            .flatten()
            .next()
            .copied()
            .unwrap_or(true);
        let message = MicEMessage { standard, number: 7 - code, emergency: code == 0 };

        let lon_d_raw = info[1] as i32 - 28;
        let mut lon_d = lon_d_raw + if long_offset { 100 } else { 0 };
        if !(0..=179).contains(&lon_d) {
            lon_d = ((lon_d % 180) + 180) % 180;
        }
        let mut lon_m = info[2] as i32 - 28;
        if lon_m >= 60 {
            lon_m -= 60;
        }
        let lon_h = info[3] as i32 - 28;

        let sp = info[4] as i32 - 28;
        let dc = info[5] as i32 - 28;
        let se = info[6] as i32 - 28;
        let speed_knots = (((sp * 10 + dc / 10) % 800).max(0)) as u16;
        let course_deg = (((dc % 10) * 100 + se).max(0)) as u16;

        let sym_code = info[7] as char;
        let sym_table = info[8] as char;

        let lat = (lat_deg + lat_min / 60.0) * if north { 1.0 } else { -1.0 };
        let lon = (lon_d as f64 + (lon_m as f64 + lon_h as f64 / 100.0) / 60.0) * if east { 1.0 } else { -1.0 };

        Ok(MicE {
            lat,
            lon,
            speed_knots,
            course_deg,
            sym_table,
            sym_code,
            message,
            custom: !standard,
            rest: info[9..].to_vec(),
        })
    }

    /// Inverse of [`MicE::decode`]: the 6-byte destination callsign field
    /// (latitude digits, message bits, and N/S/long-offset/E/W sign bits)
    /// and the info field that follows it (DTI byte included, matching
    /// `decode`'s calling convention).
    pub fn encode(&self) -> ([u8; 6], Vec<u8>) {
        let lat_abs = self.lat.abs();
        let deg = lat_abs.trunc() as u32;
        let minutes = (lat_abs - deg as f64) * 60.0;
        let mut mm = minutes.trunc() as u32;
        let mut hh = ((minutes - mm as f64) * 100.0).round() as u32;
        if hh >= 100 {
            hh -= 100;
            mm += 1;
        }
        let digits = [
            (deg / 10) as u8,
            (deg % 10) as u8,
            (mm / 10) as u8,
            (mm % 10) as u8,
            (hh / 10) as u8,
            (hh % 10) as u8,
        ];

        let code = if self.message.emergency { 0u8 } else { 7u8.saturating_sub(self.message.number) };
        let north = self.lat >= 0.0;
        let east = self.lon >= 0.0;
        let lon_deg = self.lon.abs().trunc() as i32;
        let long_offset = lon_deg >= 100;

        let bits = [
            (code >> 2) & 1 != 0,
            (code >> 1) & 1 != 0,
            code & 1 != 0,
            north,
            long_offset,
            east,
        ];
        let mut dest = [0u8; 6];
        for i in 0..6 {
            dest[i] = encode_dest_digit(digits[i], bits[i], self.message.standard);
        }

        let lon_d = if long_offset { (lon_deg - 100) as u8 } else { lon_deg as u8 };
        let lon_frac = (self.lon.abs() - lon_deg as f64) * 60.0;
        let mut lon_m = lon_frac.trunc() as u32;
        let mut lon_h = ((lon_frac - lon_m as f64) * 100.0).round() as u32;
        if lon_h >= 100 {
            lon_h -= 100;
            lon_m += 1;
        }

        let sp = (self.speed_knots / 10) as u8;
        let dc_tens = (self.speed_knots % 10) as u8;
        let dc_ones = (self.course_deg / 100) as u8;
        let dc = dc_tens * 10 + dc_ones;
        let se = (self.course_deg % 100) as u8;

        let dti = if self.custom { b'\'' } else { b'`' };
        let mut info = alloc::vec![
            dti,
            lon_d + 28,
            lon_m as u8 + 28,
            lon_h as u8 + 28,
            sp + 28,
            dc + 28,
            se + 28,
            self.sym_code as u8,
            self.sym_table as u8,
        ];
        info.extend_from_slice(&self.rest);
        (dest, info)
    }
}

/// Inverse of [`classify_dest_byte`]/[`dest_bit`]/[`dest_is_standard`]:
/// pack a known digit and its message/sign bit back into a destination
/// byte. `standard` only matters when `bit` is set.
fn encode_dest_digit(digit: u8, bit: bool, standard: bool) -> u8 {
    match (bit, standard) {
        (false, _) => b'0' + digit,
        (true, false) => b'A' + digit,
        (true, true) => b'P' + digit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// §8 scenario 1.
    #[test]
    fn uncompressed_position_round_trip_scenario() {
        let pos = Position {
            lat: 49.5,
            lon: -72.75,
            sym_table: '/',
            sym_code: '-',
            ambiguity: 0,
            timestamp: None,
            extension: None,
            altitude_feet: None,
            peet_weather: None,
            comment: "Test".into(),
        };
        let wire = pos.encode_uncompressed().unwrap();
        assert_eq!(wire.len(), 23);
        assert_eq!(core::str::from_utf8(&wire).unwrap(), "4930.00N/07245.00W-Test");

        let decoded = Position::decode_uncompressed(&wire, false).unwrap();
        assert!((decoded.lat - 49.5).abs() < 1e-6);
        assert!((decoded.lon + 72.75).abs() < 1e-6);
        assert_eq!(decoded.comment, "Test");
    }

    #[test]
    fn ambiguity_round_trips() {
        let pos = Position {
            lat: 40.125,
            lon: -75.5,
            sym_table: '/',
            sym_code: '#',
            ambiguity: 2,
            timestamp: None,
            extension: None,
            altitude_feet: None,
            peet_weather: None,
            comment: String::new(),
        };
        let wire = pos.encode_uncompressed().unwrap();
        let decoded = Position::decode_uncompressed(&wire, false).unwrap();
        assert_eq!(decoded.ambiguity, 2);
    }

    #[test]
    fn course_speed_extension_round_trips() {
        let field = DataExtension::CourseSpeed { course: Some(88), speed_knots: 15 };
        let encoded = field.encode();
        let back = DataExtension::try_parse(&encoded).unwrap();
        assert_eq!(back, field);
    }

    #[test]
    fn df_extension_round_trips() {
        let field = DataExtension::Df { strength: 3, height: 5, gain: 9, directivity: 0 };
        let encoded = field.encode();
        assert_eq!(&encoded, b"DFS3590");
        let back = DataExtension::try_parse(&encoded).unwrap();
        assert_eq!(back, field);
    }

    #[test]
    fn malformed_extension_is_dropped_not_fatal() {
        let body = b"4930.00N/07245.00W-XXXXXXXTest";
        let decoded = Position::decode_uncompressed(&body[..], false).unwrap();
        assert!(decoded.extension.is_none());
        assert!(decoded.comment.starts_with("XXXXXXX"));
    }

    #[test]
    fn altitude_extracted_from_comment() {
        let body = b"4930.00N/07245.00W-/A=001234 test".to_vec();
        let decoded = Position::decode_uncompressed(&body, false).unwrap();
        assert_eq!(decoded.altitude_feet, Some(1234));
    }

    #[test]
    fn peet_weather_extracted_from_comment_and_comment_round_trips() {
        let body = b"4930.00N/07245.00W-#W1c180s010t025".to_vec();
        let decoded = Position::decode_uncompressed(&body, false).unwrap();
        let weather = decoded.peet_weather.clone().expect("peet weather token present");
        assert_eq!(weather.wind_dir_deg, Some(180));
        assert_eq!(weather.wind_speed_mph, Some(10));
        assert_eq!(weather.temp_f, Some(25));

        let wire = decoded.encode_uncompressed().unwrap();
        assert_eq!(wire, body);
    }

    #[test]
    fn compressed_position_round_trips() {
        let p = CompressedPosition::from_lat_lon(35.5, -120.25, '/', '>', CompressedExtra::None);
        let bytes = p.encode();
        assert_eq!(bytes.len(), 13);
        let back = CompressedPosition::decode(&bytes).unwrap();
        assert!((back.lat() - p.lat()).abs() < 0.01);
        assert!((back.lon() - p.lon()).abs() < 0.01);
    }

    #[test]
    fn compressed_position_altitude_round_trips() {
        let p = CompressedPosition::from_lat_lon(
            35.5,
            -120.25,
            '/',
            '>',
            CompressedExtra::Altitude { feet: 3000 },
        );
        let bytes = p.encode();
        assert_eq!(bytes[12], b'{');
        let back = CompressedPosition::decode(&bytes).unwrap();
        match back.extra {
            CompressedExtra::Altitude { feet } => {
                assert!((feet as f64 - 3000.0).abs() / 3000.0 < 0.01, "feet={feet}");
            }
            other => panic!("expected altitude, got {other:?}"),
        }
    }

    /// §8 scenario 3.
    #[test]
    fn mic_e_decode_scenario() {
        let dest = b"SUSURB";
        let info = [
            0x60, 0x43, 0x46, 0x22, 0x1C, 0x1F, 0x21, 0x5B, 0x2F, 0x3A, 0x60, 0x22, 0x33, 0x7A, 0x7D, 0x5F,
            0x20, 0x00,
        ];
        let mic_e = MicE::decode(dest, &info).unwrap();
        assert!((mic_e.lat - 35.5868).abs() < 1e-3, "lat={}", mic_e.lat);
        assert!((mic_e.lon - 139.7010).abs() < 1e-3, "lon={}", mic_e.lon);
        assert_eq!(mic_e.course_deg, 305);
        assert_eq!(mic_e.speed_knots, 0);
        assert_eq!(mic_e.sym_table, '/');
        assert_eq!(mic_e.sym_code, '[');
        assert_eq!(mic_e.message.number, 0);
        assert!(mic_e.message.standard);
    }

    #[test]
    fn mic_e_round_trips_through_encode_and_decode() {
        let dest = b"SUSURB";
        let info = [
            0x60, 0x43, 0x46, 0x22, 0x1C, 0x1F, 0x21, 0x5B, 0x2F, 0x3A, 0x60, 0x22, 0x33, 0x7A, 0x7D, 0x5F,
            0x20, 0x00,
        ];
        let original = MicE::decode(dest, &info).unwrap();

        let (dest_bytes, info_bytes) = original.encode();
        let back = MicE::decode(&dest_bytes, &info_bytes).unwrap();

        assert!((back.lat - original.lat).abs() < 1e-3);
        assert!((back.lon - original.lon).abs() < 1e-3);
        assert_eq!(back.speed_knots, original.speed_knots);
        assert_eq!(back.course_deg, original.course_deg);
        assert_eq!(back.sym_table, original.sym_table);
        assert_eq!(back.sym_code, original.sym_code);
        assert_eq!(back.message, original.message);
        assert_eq!(back.custom, original.custom);
        assert_eq!(back.rest, original.rest);
    }
}
