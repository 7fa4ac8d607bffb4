//! # decoder
//!
//! Frame-to-record orchestration over the messages built from DBC sources.
//!
//! - [`ChannelDecoder`] keeps one table per channel and matches on
//!   `(channel_id, message_id)`.
//! - [`ConsolidatedDecoder`] merges every channel into one table keyed by
//!   message id, the first channel declaring an id wins.
//! - [`RawDecoder`] is used when no database is configured and describes the
//!   frame itself.

pub mod channel;
pub mod consolidated;
pub mod raw;
pub mod schema;

use indexmap::IndexSet;

pub use channel::ChannelDecoder;
pub use consolidated::ConsolidatedDecoder;
pub use raw::RawDecoder;
pub use schema::{Column, ColumnKind};

use crate::types::canframe::{CanFrame, MessageDesc};
use crate::types::message::Message;
use crate::types::record::Record;

/// Narrows `message` to the selected signals, keeping their order.
/// Returns `false` when none of its signals is selected.
pub(crate) fn select_signals(message: &mut Message, selected: &IndexSet<String>) -> bool {
    let matched: usize = message
        .signals()
        .iter()
        .filter(|s| selected.contains(s.name()))
        .count();
    if matched == 0 {
        return false;
    }
    if matched != message.len() {
        message.retain_signals(|s| selected.contains(s.name()));
    }
    true
}

/// A built decoder. Per-frame failures (unknown id, short payload) are `None`.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageDecoder {
    Channel(ChannelDecoder),
    Consolidated(ConsolidatedDecoder),
    Raw(RawDecoder),
}

impl Default for MessageDecoder {
    fn default() -> Self {
        MessageDecoder::Raw(RawDecoder)
    }
}

impl MessageDecoder {
    /// Decodes when `apply_formula` is set, interprets otherwise.
    pub fn compute<D: MessageDesc + ?Sized>(
        &self,
        desc: &D,
        frame: &CanFrame,
        apply_formula: bool,
    ) -> Option<Record> {
        if apply_formula {
            self.decode(desc, frame)
        } else {
            self.interpret(desc, frame)
        }
    }

    pub fn compute_into<D: MessageDesc + ?Sized>(
        &self,
        desc: &D,
        frame: &CanFrame,
        out: &mut Record,
        apply_formula: bool,
    ) -> bool {
        if apply_formula {
            self.decode_into(desc, frame, out)
        } else {
            self.interpret_into(desc, frame, out)
        }
    }

    pub fn decode<D: MessageDesc + ?Sized>(&self, desc: &D, frame: &CanFrame) -> Option<Record> {
        match self {
            MessageDecoder::Channel(d) => d.decode(desc, frame),
            MessageDecoder::Consolidated(d) => d.decode(desc, frame),
            MessageDecoder::Raw(d) => Some(d.decode(desc, frame)),
        }
    }

    pub fn decode_into<D: MessageDesc + ?Sized>(&self, desc: &D, frame: &CanFrame, out: &mut Record) -> bool {
        match self {
            MessageDecoder::Channel(d) => d.decode_into(desc, frame, out),
            MessageDecoder::Consolidated(d) => d.decode_into(desc, frame, out),
            MessageDecoder::Raw(d) => {
                d.decode_into(desc, frame, out);
                true
            }
        }
    }

    pub fn interpret<D: MessageDesc + ?Sized>(&self, desc: &D, frame: &CanFrame) -> Option<Record> {
        match self {
            MessageDecoder::Channel(d) => d.interpret(desc, frame),
            MessageDecoder::Consolidated(d) => d.interpret(desc, frame),
            MessageDecoder::Raw(d) => Some(d.decode(desc, frame)),
        }
    }

    pub fn interpret_into<D: MessageDesc + ?Sized>(&self, desc: &D, frame: &CanFrame, out: &mut Record) -> bool {
        match self {
            MessageDecoder::Channel(d) => d.interpret_into(desc, frame, out),
            MessageDecoder::Consolidated(d) => d.interpret_into(desc, frame, out),
            MessageDecoder::Raw(d) => {
                d.decode_into(desc, frame, out);
                true
            }
        }
    }

    /// Decodes only the selected signals of the matching message.
    pub fn inspect<D: MessageDesc + ?Sized>(
        &self,
        desc: &D,
        frame: &CanFrame,
        selected: &IndexSet<String>,
    ) -> Option<Record> {
        match self {
            MessageDecoder::Channel(d) => d.inspect(desc, frame, selected),
            MessageDecoder::Consolidated(d) => d.inspect(desc, frame, selected),
            MessageDecoder::Raw(d) => Some(d.decode(desc, frame)),
        }
    }

    /// Post-build projection; a no-op for the raw decoder and for an empty set.
    pub fn select(&mut self, selected: &IndexSet<String>) {
        match self {
            MessageDecoder::Channel(d) => d.select(selected),
            MessageDecoder::Consolidated(d) => d.select(selected),
            MessageDecoder::Raw(_) => {}
        }
    }

    pub fn output_offset(&self) -> bool {
        match self {
            MessageDecoder::Channel(d) => d.output_offset(),
            MessageDecoder::Consolidated(d) => d.output_offset(),
            MessageDecoder::Raw(_) => false,
        }
    }

    pub fn set_output_offset(&mut self, output_offset: bool) {
        match self {
            MessageDecoder::Channel(d) => d.set_output_offset(output_offset),
            MessageDecoder::Consolidated(d) => d.set_output_offset(output_offset),
            MessageDecoder::Raw(_) => {}
        }
    }

    /// Messages in decode order; empty for the raw decoder.
    pub fn messages(&self) -> Box<dyn Iterator<Item = &Message> + '_> {
        match self {
            MessageDecoder::Channel(d) => Box::new(d.messages()),
            MessageDecoder::Consolidated(d) => Box::new(d.messages()),
            MessageDecoder::Raw(_) => Box::new(std::iter::empty()),
        }
    }

    /// Message used for frames of `channel_id`/`message_id`.
    pub fn message(&self, channel_id: u32, message_id: u32) -> Option<&Message> {
        match self {
            MessageDecoder::Channel(d) => d.message(channel_id, message_id),
            MessageDecoder::Consolidated(d) => d.message(message_id),
            MessageDecoder::Raw(_) => None,
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, MessageDecoder::Raw(_))
    }

    /// Columns of every record this decoder can produce, in order.
    pub fn schema(&self) -> Vec<Column> {
        match self {
            MessageDecoder::Raw(d) => d.schema(),
            _ => schema::signal_columns(self.output_offset(), self.messages()),
        }
    }

    /// [`MessageDecoder::schema`] rendered as `"TIME instant,Speed int,..."`.
    pub fn schema_string(&self) -> String {
        schema::render(&self.schema())
    }

    /// All-null record covering every column of [`MessageDecoder::schema`].
    pub fn template_record(&self) -> Record {
        schema::null_record(&self.schema())
    }
}

impl From<ChannelDecoder> for MessageDecoder {
    fn from(d: ChannelDecoder) -> Self {
        MessageDecoder::Channel(d)
    }
}

impl From<ConsolidatedDecoder> for MessageDecoder {
    fn from(d: ConsolidatedDecoder) -> Self {
        MessageDecoder::Consolidated(d)
    }
}

impl From<RawDecoder> for MessageDecoder {
    fn from(d: RawDecoder) -> Self {
        MessageDecoder::Raw(d)
    }
}
