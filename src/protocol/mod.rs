//! Protocol Module
//!
//! Defines the wire protocol spoken by GPS tracking devices.
//!
//! ## Frame Format
//!
//! ```text
//! ┌───────────┬─────────┬──────────┬─────────────────┬───────────┐
//! │ 0x78 0x78 │ Len (1) │ Code (1) │ Content (0..N)  │ 0x0D 0x0A │
//! └───────────┴─────────┴──────────┴─────────────────┴───────────┘
//! ```
//!
//! `Len` counts the protocol code and the content: `content.len() + 1`.
//! There is no checksum, so framing relies on exact byte counts.
//!
//! ### Protocol Codes
//! - 0x01: LOGIN       - Reply: `01`
//! - 0x08: HEARTBEAT   - Reply: generic
//! - 0x10: GPS         - Reply: current UTC datetime (7 bytes)
//! - 0x11: GPS OFFLINE - Reply: current UTC datetime (7 bytes)
//! - 0x13: STATUS      - Reply: generic
//! - 0x14: HIBERNATION - Reply: none, connection closes
//! - 0x30: TIME        - Reply: current UTC datetime (7 bytes)
//! - 0x57: SETUP       - Reply: server setup block
//! - 0x98: INTERVAL    - Reply: the 2 interval bytes echoed
//!
//! Anything else gets the generic reply: same code, empty content.

mod codec;
mod content;
mod frame;
mod reader;
mod table;

pub use codec::{decode, encode, encode_frame, to_hex, write_frame};
pub use content::{
    encode_datetime, encode_login, encode_status, parse_login, parse_status,
    parse_upload_interval, LoginInfo, LOGIN_ACCEPTED, SetupBlock, StatusReport, STATUS_BASIC,
    STATUS_WITH_SIGNAL,
};
pub use frame::{Frame, MAX_CONTENT_LEN, MIN_FRAME_LEN, START_MARKER, STOP_MARKER};
pub use reader::FrameReader;
pub use table::{Handler, ProtocolKind};
