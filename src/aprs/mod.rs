//! The APRS 1.0/1.2 payload family (C8–C10): dispatch on the Data-Type
//! Identifier byte, then delegate to a per-type sub-codec.

pub mod message;
pub mod misc;
pub mod object_item;
pub mod position;
pub mod query;
pub mod status;
pub mod telemetry;
pub mod weather;

use alloc::vec::Vec;

use crate::error::AprsError;
use message::Message;
use misc::{AgreloDf, Capabilities, GridSquare, RawGps, TestPacket, ThirdParty, UserDefined};
use object_item::{Item, Object};
use position::{MicE, Position};
use query::Query;
use status::Status;
use telemetry::Telemetry;
use weather::WeatherReport;

/// The decoded form of a UI-frame information field, tagged by DTI
/// (§6.4). [`AprsPayload::Raw`] preserves anything the dispatcher didn't
/// recognize so a caller can retry the bytes by hand.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum AprsPayload {
    PositionNoTimestamp(Position),
    PositionWithTimestamp(Position),
    Object(Object),
    Item(Item),
    Message(Message),
    Status(Status),
    Query(Query),
    Capabilities(Capabilities),
    Telemetry(Telemetry),
    Weather(WeatherReport),
    RawGps(RawGps),
    GridSquare(GridSquare),
    TestPacket(TestPacket),
    UserDefined(UserDefined),
    ThirdParty(ThirdParty),
    AgreloDf(AgreloDf),
    MicE(MicE),
    Raw(Vec<u8>),
}

/// Decode a UI payload's information field. `mic_e_destination` must be
/// supplied (the 6-byte destination callsign, without SSID) when the DTI
/// is a Mic-E marker, since Mic-E latitude lives in the frame's
/// destination address rather than the info field itself.
pub fn decode(info: &[u8], mic_e_destination: Option<&[u8]>) -> Result<AprsPayload, AprsError> {
    let (&dti, body) = info.split_first().ok_or(AprsError::NullInput)?;
    match dti {
        b'!' | b'=' => Ok(AprsPayload::PositionNoTimestamp(Position::decode_uncompressed(body, false)?)),
        b'/' | b'@' => Ok(AprsPayload::PositionWithTimestamp(Position::decode_uncompressed(body, true)?)),
        b';' => Ok(AprsPayload::Object(Object::decode(body)?)),
        b')' => Ok(AprsPayload::Item(Item::decode(body)?)),
        b':' => Ok(AprsPayload::Message(Message::decode(body)?)),
        b'>' => Ok(AprsPayload::Status(Status::decode(body)?)),
        b'?' => Ok(AprsPayload::Query(Query::decode(body)?)),
        b'<' => Ok(AprsPayload::Capabilities(Capabilities::decode(body)?)),
        b'T' => Ok(AprsPayload::Telemetry(Telemetry::decode(body)?)),
        b'_' => Ok(AprsPayload::Weather(WeatherReport::decode(body)?)),
        b'$' => Ok(AprsPayload::RawGps(RawGps::decode(body)?)),
        b'[' => Ok(AprsPayload::GridSquare(GridSquare::decode(body)?)),
        b',' => Ok(AprsPayload::TestPacket(TestPacket::decode(body))),
        b'{' => Ok(AprsPayload::UserDefined(UserDefined::decode(body)?)),
        b'}' => Ok(AprsPayload::ThirdParty(ThirdParty::decode(body)?)),
        b'%' => Ok(AprsPayload::AgreloDf(AgreloDf::decode(body)?)),
        b'`' | b'\'' => {
            let dest = mic_e_destination
                .ok_or_else(|| AprsError::MalformedField("Mic-E decode needs the destination callsign".into()))?;
            Ok(AprsPayload::MicE(MicE::decode(dest, info)?))
        }
        other => Err(AprsError::UnknownDti(other)),
    }
}

/// Encode a UI payload's information field.
///
/// Every variant except [`AprsPayload::MicE`] round-trips through this
/// function alone. Mic-E carries its latitude, message, and sign bits in
/// the frame's destination callsign rather than the info field (§4.10),
/// which this function's signature has no way to return; callers needing
/// Mic-E must encode it directly with [`position::MicE::encode`] and
/// place the resulting 6 bytes in the frame header themselves. Calling
/// this function with a `MicE` payload reports that rather than silently
/// producing an empty info field.
pub fn encode(payload: &AprsPayload) -> Result<Vec<u8>, AprsError> {
    Ok(match payload {
        AprsPayload::PositionNoTimestamp(p) => {
            let mut out = alloc::vec![b'!'];
            out.extend_from_slice(&p.encode_uncompressed()?);
            out
        }
        AprsPayload::PositionWithTimestamp(p) => {
            let mut out = alloc::vec![b'@'];
            out.extend_from_slice(&p.encode_uncompressed()?);
            out
        }
        AprsPayload::Object(o) => {
            let mut out = alloc::vec![b';'];
            out.extend_from_slice(&o.encode()?);
            out
        }
        AprsPayload::Item(i) => {
            let mut out = alloc::vec![b')'];
            out.extend_from_slice(&i.encode()?);
            out
        }
        AprsPayload::Message(m) => {
            let mut out = alloc::vec![b':'];
            out.extend_from_slice(&m.encode());
            out
        }
        AprsPayload::Status(s) => {
            let mut out = alloc::vec![b'>'];
            out.extend_from_slice(&s.encode());
            out
        }
        AprsPayload::Query(q) => {
            let mut out = alloc::vec![b'?'];
            out.extend_from_slice(&q.encode());
            out
        }
        AprsPayload::Capabilities(c) => {
            let mut out = alloc::vec![b'<'];
            out.extend_from_slice(&c.encode());
            out
        }
        AprsPayload::Telemetry(t) => {
            let mut out = alloc::vec![b'T'];
            out.extend_from_slice(&t.encode());
            out
        }
        AprsPayload::Weather(w) => {
            let mut out = alloc::vec![b'_'];
            out.extend_from_slice(&w.encode());
            out
        }
        AprsPayload::RawGps(g) => {
            let mut out = alloc::vec![b'$'];
            out.extend_from_slice(&g.encode());
            out
        }
        AprsPayload::GridSquare(g) => {
            let mut out = alloc::vec![b'['];
            out.extend_from_slice(&g.encode());
            out
        }
        AprsPayload::TestPacket(t) => {
            let mut out = alloc::vec![b','];
            out.extend_from_slice(&t.encode());
            out
        }
        AprsPayload::UserDefined(u) => {
            let mut out = alloc::vec![b'{'];
            out.extend_from_slice(&u.encode());
            out
        }
        AprsPayload::ThirdParty(tp) => {
            let mut out = alloc::vec![b'}'];
            out.extend_from_slice(&tp.encode());
            out
        }
        AprsPayload::AgreloDf(df) => {
            let mut out = alloc::vec![b'%'];
            out.extend_from_slice(&df.encode());
            out
        }
        AprsPayload::MicE(_) => {
            return Err(AprsError::MalformedField(
                "Mic-E needs the destination callsign; call position::MicE::encode directly".into(),
            ))
        }
        AprsPayload::Raw(bytes) => bytes.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_unknown_dti_is_reported() {
        let err = decode(&[0x01, 0x02], None).unwrap_err();
        assert!(matches!(err, AprsError::UnknownDti(0x01)));
    }

    #[test]
    fn dispatch_empty_payload_is_null_input() {
        assert!(matches!(decode(&[], None).unwrap_err(), AprsError::NullInput));
    }

    #[test]
    fn position_round_trips_through_dispatcher() {
        let body = b"!4930.00N/07245.00W-Test";
        let payload = decode(body, None).unwrap();
        let wire = encode(&payload).unwrap();
        assert_eq!(wire, body);
    }

    #[test]
    fn telemetry_round_trips_through_dispatcher() {
        let body = b"T#042,1,2,3,4,5,00000000";
        let payload = decode(body, None).unwrap();
        assert!(matches!(payload, AprsPayload::Telemetry(_)));
        let wire = encode(&payload).unwrap();
        assert_eq!(wire, body);
    }

    #[test]
    fn test_packet_empty_encode_is_single_byte() {
        let payload = AprsPayload::TestPacket(TestPacket::default());
        assert_eq!(encode(&payload).unwrap(), alloc::vec![b',']);
    }

    #[test]
    fn mic_e_reports_an_error_instead_of_encoding_silently() {
        let dest = b"SUSURB";
        let info = [
            0x60, 0x43, 0x46, 0x22, 0x1C, 0x1F, 0x21, 0x5B, 0x2F, 0x3A, 0x60, 0x22, 0x33, 0x7A, 0x7D, 0x5F, 0x20,
            0x00,
        ];
        let payload = AprsPayload::MicE(MicE::decode(dest, &info).unwrap());
        let err = encode(&payload).unwrap_err();
        assert!(matches!(err, AprsError::MalformedField(_)));
    }
}
