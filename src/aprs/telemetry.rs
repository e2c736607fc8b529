//! Telemetry reports, DTI `T`, §4.11.

use alloc::format;
use alloc::vec::Vec;

use crate::error::AprsError;
use crate::util::parse_fixed_digits;

/// `'#' seq(3) ',' a1,a2,a3,a4,a5 ',' bits(8)`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Telemetry {
    pub sequence: u16,
    pub analog: [u8; 5],
    pub digital_bits: [bool; 8],
}

impl Telemetry {
    pub fn decode(body: &[u8]) -> Result<Self, AprsError> {
        let text = core::str::from_utf8(body).map_err(|_| AprsError::InvalidUtf8)?;
        let text = text.strip_prefix('#').ok_or_else(|| {
            AprsError::MalformedField("telemetry must start with '#'".into())
        })?;
        let fields: alloc::vec::Vec<&str> = text.split(',').collect();
        if fields.len() != 7 {
            return Err(AprsError::MalformedField(format!(
                "telemetry needs 7 comma-separated fields, got {}",
                fields.len()
            )));
        }
        let sequence = parse_fixed_digits(fields[0].as_bytes(), fields[0].len())? as u16;
        let mut analog = [0u8; 5];
        for (i, slot) in analog.iter_mut().enumerate() {
            *slot = fields[1 + i]
                .parse::<u8>()
                .map_err(|_| AprsError::MalformedField("non-numeric telemetry analog value".into()))?;
        }
        let bits_str = fields[6];
        if bits_str.len() != 8 || !bits_str.bytes().all(|b| b == b'0' || b == b'1') {
            return Err(AprsError::MalformedField("telemetry digital bits must be 8 '0'/'1'".into()));
        }
        let mut digital_bits = [false; 8];
        for (i, b) in bits_str.bytes().enumerate() {
            digital_bits[i] = b == b'1';
        }
        Ok(Telemetry { sequence, analog, digital_bits })
    }

    pub fn encode(&self) -> Vec<u8> {
        let bits: alloc::string::String =
            self.digital_bits.iter().map(|&b| if b { '1' } else { '0' }).collect();
        format!(
            "#{:03},{},{},{},{},{},{}",
            self.sequence, self.analog[0], self.analog[1], self.analog[2], self.analog[3], self.analog[4], bits
        )
        .into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn telemetry_round_trips() {
        let t = Telemetry {
            sequence: 42,
            analog: [1, 2, 3, 4, 5],
            digital_bits: [true, false, true, false, true, false, true, false],
        };
        let wire = t.encode();
        let decoded = Telemetry::decode(&wire).unwrap();
        assert_eq!(decoded, t);
    }

    #[test]
    fn telemetry_rejects_bad_bit_field() {
        assert!(Telemetry::decode(b"#001,1,2,3,4,5,0002").is_err());
    }
}
