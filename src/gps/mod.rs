//! GPS Module
//!
//! Decoding of the fixed-layout position payload carried by protocol 0x10
//! (live) and 0x11 (offline) frames.
//!
//! ## Payload Layout
//! ```text
//! ┌──────────────────┬─────────┬──────────┬───────────┬───────────┬──────────┐
//! │ YY MM DD hh mm ss│ Len|Sat │ Lat (4)  │ Long (4)  │ Speed (1) │ Flags (2)│
//! └──────────────────┴─────────┴──────────┴───────────┴───────────┴──────────┘
//! ```

mod decoder;
mod fix;

pub use decoder::{decode_payload, decode_payload_at, encode_payload, PAYLOAD_LEN};
pub use fix::GpsFix;
