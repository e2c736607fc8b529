#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
/*!
`ax25aprs` decodes and encodes the AX.25 v2.2 packet-radio link layer and
the APRS 1.0/1.2 payload family carried inside its UI frames.

# Link layer

| Module | Covers |
| --- | --- |
| [`address`] | Callsign-SSID addresses and digipeater paths |
| [`header`] | Destination/source/repeater frame headers |
| [`frame`] | I-, S-, and U-frame discriminator and codecs |
| [`xid`] | XID parameter negotiation (Class of Procedures, HDLC Optional Functions, ...) |
| [`segment`] | Oversized-payload segmentation and reassembly |
| [`hdlc`] | Flag delimiting, bit stuffing, and the CRC-CCITT FCS |

# APRS payloads

The [`aprs`] module dispatches a UI frame's information field by its
leading Data-Type Identifier byte to the position, weather, object/item,
message, status, telemetry, query, and miscellaneous sub-codecs in
[`aprs::position`] and friends, and offers a directed-query responder
for `?APRS?`/`?LOC?`/`?TIME?`/`?DST?`.

# Example

```rust
use ax25aprs::address::{Address, Path};
use ax25aprs::frame::{Frame, ModuloSelect, UnnumberedFrame, PID_NO_LAYER3};
use ax25aprs::header::FrameHeader;

let header = FrameHeader::new(
    Address::new("APRS", 0).unwrap(),
    Address::new("N0CALL", 0).unwrap(),
    Path::new(Vec::new()).unwrap(),
);
let frame = Frame::Unnumbered(UnnumberedFrame::Ui {
    header,
    pf: false,
    pid: PID_NO_LAYER3,
    payload: b"!4930.00N/07245.00W-Test".to_vec(),
});
let wire = frame.encode();
let decoded = Frame::decode(&wire, ModuloSelect::Auto).unwrap();
assert_eq!(decoded, frame);
```
*/

extern crate alloc;

pub mod address;
pub mod aprs;
pub mod error;
pub mod frame;
pub mod hdlc;
pub mod header;
pub mod segment;
pub mod util;
pub mod xid;

pub use address::{Address, Path};
pub use error::{AprsError, Ax25Error};
pub use frame::Frame;
pub use header::FrameHeader;
