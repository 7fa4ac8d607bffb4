//! # dbc_codec
//!
//! Bit-exact **CAN signal** decoding and encoding driven by `.dbc` databases.
//!
//! ## Highlights
//! - **DBC builder**: `BO_`/`SG_` lines from one or more sources become channels of
//!   messages; see [`dbc::build_decoder`] and [`dbc::build_encoder`].
//! - **Exact bit layout**: Motorola and Intel placement, signed fields, and signals
//!   wider than 64 bits.
//! - **Four numeric representations** picked per signal: 32/64-bit integers,
//!   exact decimals, and doubles.
//! - **Decoders**: per-channel, consolidated (first channel wins) or raw pass-through,
//!   with post-build projection and schema export.
//! - **Encoder**: one frame per message touched by a record.
//!
//! Logging goes through `tracing`; install a subscriber to see it.
//!

pub mod config;
#[doc(hidden)]
pub mod core;
#[cfg(feature = "dbc")]
pub mod dbc;
pub mod decoder;
pub mod encoder;
pub mod types;

// Top-level re-exports (appear under Crate Items → Structs)
#[doc(inline)]
pub use crate::types::{
    canframe::{CanFrame, Direction, MessageDesc, TraceMeta},
    channel::Channel,
    dbc_id::DbcId,
    errors::{BuildError, DbcParseError, MessageLayoutError},
    message::Message,
    record::Record,
    signal::{ByteOrder, RawBits, Signal, SignalDef},
    value::Value,
};

pub use crate::config::{BuildOptions, DbcSource};
pub use crate::core::representation::RepresentationKind;
pub use crate::decoder::{
    ChannelDecoder, Column, ColumnKind, ConsolidatedDecoder, MessageDecoder, RawDecoder,
};
pub use crate::encoder::{MessageEncoder, MessageKey};
