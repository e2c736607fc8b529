//! Message (DTI `:`) and bulletin payloads, §4.11.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use crate::error::AprsError;

/// `addressee(9) ':' text[0..67] ['{' msg_no(1..5) '}']`. A message whose
/// addressee begins `BLN` is a bulletin (§4.11); [`Message::is_bulletin`]
/// reports that rather than splitting it into a separate type.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub addressee: String,
    pub text: String,
    pub msg_no: Option<String>,
}

impl Message {
    pub fn is_bulletin(&self) -> bool {
        self.addressee.trim_end().starts_with("BLN")
    }

    pub fn decode(body: &[u8]) -> Result<Self, AprsError> {
        if body.len() < 10 || body[9] != b':' {
            return Err(AprsError::MalformedField(
                "message body must be 9-byte addressee, ':', text".into(),
            ));
        }
        let addressee = String::from_utf8(body[0..9].to_vec()).map_err(|_| AprsError::InvalidUtf8)?;
        let rest = &body[10..];
        let text_bytes = core::str::from_utf8(rest).map_err(|_| AprsError::InvalidUtf8)?;

        let (text, msg_no) = match text_bytes.rfind('{') {
            Some(idx) if text_bytes.ends_with('}') => {
                let no = &text_bytes[idx + 1..text_bytes.len() - 1];
                if !no.is_empty() && no.len() <= 5 && no.chars().all(|c| c.is_ascii_alphanumeric()) {
                    (&text_bytes[..idx], Some(String::from(no)))
                } else {
                    (text_bytes, None)
                }
            }
            _ => (text_bytes, None),
        };
        if text.len() > 67 {
            return Err(AprsError::InvalidLength("message text exceeds 67 bytes".into()));
        }
        Ok(Message { addressee, text: String::from(text), msg_no })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(format!("{:<9}", self.addressee).as_bytes());
        out.push(b':');
        out.extend_from_slice(self.text.as_bytes());
        if let Some(no) = &self.msg_no {
            out.extend_from_slice(format!("{{{no}}}").as_bytes());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// §8 scenario 2.
    #[test]
    fn message_with_number_scenario() {
        let msg = Message {
            addressee: "WB2OSZ-7".into(),
            text: "Hello".into(),
            msg_no: Some("001".into()),
        };
        let wire = msg.encode();
        // Full wire (with the leading ':' DTI the dispatcher prepends) is
        // the 21-byte `:WB2OSZ-7 :Hello{001}` from the specification.
        assert_eq!(wire.len(), 20);
        assert_eq!(core::str::from_utf8(&wire).unwrap(), "WB2OSZ-7 :Hello{001}");

        let decoded = Message::decode(&wire).unwrap();
        assert_eq!(decoded, msg);
        assert!(!decoded.is_bulletin());
    }

    #[test]
    fn bulletin_is_detected() {
        let msg = Message { addressee: "BLN1    ".into(), text: "notice".into(), msg_no: None };
        assert!(msg.is_bulletin());
    }

    #[test]
    fn message_without_number_round_trips() {
        let msg = Message { addressee: "N0CALL  ".into(), text: "hi there".into(), msg_no: None };
        let wire = msg.encode();
        let decoded = Message::decode(&wire).unwrap();
        assert_eq!(decoded, msg);
    }
}
