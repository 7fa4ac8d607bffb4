use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Direction of a frame as seen by the logger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Rx,
    Tx,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Rx => "Rx",
            Direction::Tx => "Tx",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single CAN (or CAN FD) frame as delivered to a decoder or produced by an
/// encoder.
///
/// # Field semantics
///
/// - `channel_id`: bus/channel index, 1-based like the DBC source list.
/// - `message_id`: identifier with the extended-frame bit already removed.
/// - `data`: payload bytes; may be longer than `data_length` when the logger
///   pads frames.
/// - `data_length`: number of meaningful payload bytes.
/// - `offset_nanos`: capture time relative to the trace start.
/// - `error`: error frame flag reported by the logger.
/// - `extended`: 29-bit identifier.
///
/// # Examples
///
/// ```rust
/// # use dbc_codec::CanFrame;
/// let frame = CanFrame::new(1, 0x123, vec![0x12, 0x34]);
/// assert_eq!(frame.data_length, 2);
/// assert_eq!(frame.payload(), &[0x12, 0x34]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanFrame {
    pub channel_id: u32,
    pub message_id: u32,
    pub data: Vec<u8>,
    pub data_length: usize,
    pub offset_nanos: i64,
    pub error: bool,
    pub direction: Direction,
    pub extended: bool,
}

impl CanFrame {
    /// Frame with `data_length` taken from the payload.
    pub fn new(channel_id: u32, message_id: u32, data: Vec<u8>) -> Self {
        CanFrame {
            channel_id,
            message_id,
            data_length: data.len(),
            data,
            ..Default::default()
        }
    }

    pub fn with_offset(mut self, offset_nanos: i64) -> Self {
        self.offset_nanos = offset_nanos;
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_error(mut self, error: bool) -> Self {
        self.error = error;
        self
    }

    /// The meaningful part of `data`.
    pub fn payload(&self) -> &[u8] {
        &self.data[..self.data_length.min(self.data.len())]
    }

    /// `"CAN"` for payloads up to 8 bytes, `"CAN FD"` above.
    pub fn protocol(&self) -> &'static str {
        if self.data_length <= 8 { "CAN" } else { "CAN FD" }
    }

    /// Resets all fields to their default values.
    pub fn clear(&mut self) {
        *self = CanFrame::default();
    }
}

/// Trace-level information shared by every frame of one recording.
pub trait MessageDesc {
    /// Absolute start of the trace, when known.
    fn time_start(&self) -> Option<DateTime<Utc>>;

    /// `time_start + offset_nanos`, or `None` without a start time.
    fn timestamp(&self, offset_nanos: i64) -> Option<DateTime<Utc>> {
        self.time_start()
            .and_then(|start| start.checked_add_signed(Duration::nanoseconds(offset_nanos)))
    }
}

/// Plain [`MessageDesc`] implementation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceMeta {
    pub time_start: Option<DateTime<Utc>>,
}

impl TraceMeta {
    pub fn new(time_start: DateTime<Utc>) -> Self {
        TraceMeta {
            time_start: Some(time_start),
        }
    }
}

impl MessageDesc for TraceMeta {
    fn time_start(&self) -> Option<DateTime<Utc>> {
        self.time_start
    }
}

impl MessageDesc for Option<DateTime<Utc>> {
    fn time_start(&self) -> Option<DateTime<Utc>> {
        *self
    }
}
