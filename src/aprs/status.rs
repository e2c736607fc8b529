//! Status reports, DTI `>`, §4.11.

use alloc::string::String;
use alloc::vec::Vec;

use super::position::Timestamp;
use crate::error::AprsError;

/// `[timestamp(7)] text`. The timestamp is present iff the first six
/// bytes are ASCII digits and the seventh is `z` — status only ever uses
/// the DHM-Zulu form, never `/`, `h`, or MDHM.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub timestamp: Option<Timestamp>,
    pub text: String,
}

impl Status {
    pub fn decode(body: &[u8]) -> Result<Self, AprsError> {
        let has_timestamp = body.len() >= 7
            && body[0..6].iter().all(u8::is_ascii_digit)
            && body[6] == b'z';
        if has_timestamp {
            let timestamp = Timestamp::decode(&body[0..7])?;
            let text = core::str::from_utf8(&body[7..]).map_err(|_| AprsError::InvalidUtf8)?;
            if text.len() > 62 {
                return Err(AprsError::InvalidLength("status text exceeds 62 bytes".into()));
            }
            Ok(Status { timestamp: Some(timestamp), text: String::from(text) })
        } else {
            let text = core::str::from_utf8(body).map_err(|_| AprsError::InvalidUtf8)?;
            if text.len() > 62 {
                return Err(AprsError::InvalidLength("status text exceeds 62 bytes".into()));
            }
            Ok(Status { timestamp: None, text: String::from(text) })
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        if let Some(ts) = self.timestamp {
            out.extend_from_slice(&ts.encode());
        }
        out.extend_from_slice(self.text.as_bytes());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_without_timestamp_round_trips() {
        let status = Status { timestamp: None, text: "On the air".into() };
        let wire = status.encode();
        let decoded = Status::decode(&wire).unwrap();
        assert_eq!(decoded, status);
    }

    #[test]
    fn status_with_timestamp_round_trips() {
        let status =
            Status { timestamp: Some(Timestamp::DhmZulu { day: 5, hour: 12, minute: 0 }), text: "QRV".into() };
        let wire = status.encode();
        let decoded = Status::decode(&wire).unwrap();
        assert_eq!(decoded, status);
    }
}
