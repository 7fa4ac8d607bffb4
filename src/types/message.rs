use indexmap::IndexSet;
use tracing::trace;

use crate::core::strings::name_hash;
use crate::types::canframe::{CanFrame, MessageDesc};
use crate::types::record::{self, Record};
use crate::types::signal::Signal;
use crate::types::value::Value;

/// Bit 31 of a declared DBC identifier flags a 29-bit (extended) frame.
pub const EXTENDED_FRAME_FLAG: u32 = 0x8000_0000;
const ID_MASK: u32 = 0x7FFF_FFFF;

/// Definition of a CAN frame: identity, length and its ordered signals.
///
/// Output records follow the signal order. The record template is rebuilt on
/// every mutation, so decoding only ever reads it.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    channel_id: u32,
    message_id: u32,
    extended_frame: bool,
    name: String,
    byte_length: usize,
    signals: Vec<Signal>,
    output_offset: bool,
    template: Record,
    // template column of each signal; repeated names share a column
    columns: Vec<usize>,
}

impl Message {
    /// `declared_id` is the identifier as written in the `BO_` line.
    pub fn new(channel_id: u32, declared_id: u32, name: &str, byte_length: usize) -> Self {
        let mut msg = Message {
            channel_id,
            message_id: declared_id & ID_MASK,
            extended_frame: declared_id & EXTENDED_FRAME_FLAG != 0,
            name: name.to_string(),
            byte_length,
            signals: Vec::new(),
            output_offset: false,
            template: Record::new(),
            columns: Vec::new(),
        };
        msg.rebuild_template();
        msg
    }

    pub fn channel_id(&self) -> u32 {
        self.channel_id
    }

    pub fn set_channel_id(&mut self, channel_id: u32) {
        self.channel_id = channel_id;
    }

    pub fn message_id(&self) -> u32 {
        self.message_id
    }

    pub fn is_extended_frame(&self) -> bool {
        self.extended_frame
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn byte_length(&self) -> usize {
        self.byte_length
    }

    pub fn signals(&self) -> &[Signal] {
        &self.signals
    }

    pub fn signal(&self, name: &str) -> Option<&Signal> {
        self.signals.iter().find(|s| s.name() == name)
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    pub fn output_offset(&self) -> bool {
        self.output_offset
    }

    pub fn set_output_offset(&mut self, output_offset: bool) {
        if self.output_offset != output_offset {
            self.output_offset = output_offset;
            self.rebuild_template();
        }
    }

    pub fn add_signal(&mut self, signal: Signal) {
        self.signals.push(signal);
        self.rebuild_template();
    }

    pub fn remove_signal(&mut self, index: usize) -> Option<Signal> {
        if index >= self.signals.len() {
            return None;
        }
        let removed: Signal = self.signals.remove(index);
        self.rebuild_template();
        Some(removed)
    }

    /// Keeps only the signals accepted by `keep`, preserving their order.
    pub fn retain_signals<F: FnMut(&Signal) -> bool>(&mut self, keep: F) {
        self.signals.retain(keep);
        self.rebuild_template();
    }

    pub fn clear(&mut self) {
        self.signals.clear();
        self.rebuild_template();
    }

    /// Prefixes every signal name with `<message name>.`.
    pub fn qualify_signal_names(&mut self) {
        for signal in &mut self.signals {
            let qualified: String = format!("{}.{}", self.name, signal.name());
            signal.set_name(&qualified);
        }
        self.rebuild_template();
    }

    /// All-null record with the decode column layout.
    pub fn template(&self) -> &Record {
        &self.template
    }

    fn rebuild_template(&mut self) {
        let mut template: Record = Record::with_capacity(self.signals.len() + 2);
        template.add(record::TIME, Value::Null);
        if self.output_offset {
            template.add(record::OFFSET, Value::Null);
        }
        let mut columns: Vec<usize> = Vec::with_capacity(self.signals.len());
        for signal in &self.signals {
            template.add_hashed(signal.name(), signal.name_hash(), Value::Null);
            columns.push(
                template
                    .position_hashed(signal.name(), signal.name_hash())
                    .unwrap_or(template.len() - 1),
            );
        }
        self.template = template;
        self.columns = columns;
    }

    /// Decodes a frame into a copy of the template. `None` when the frame is
    /// shorter than the declared length.
    pub fn decode<D: MessageDesc + ?Sized>(&self, desc: &D, frame: &CanFrame) -> Option<Record> {
        let mut out: Record = self.template.clone();
        self.fill(desc, frame, &mut out, true, Signal::decode)
            .then_some(out)
    }

    /// Decodes into a caller-owned record, adding missing columns. Returns
    /// `false` (leaving `out` untouched) when the frame is too short.
    pub fn decode_into<D: MessageDesc + ?Sized>(
        &self,
        desc: &D,
        frame: &CanFrame,
        out: &mut Record,
    ) -> bool {
        self.fill(desc, frame, out, false, Signal::decode)
    }

    /// Like [`Message::decode`] with raw, unscaled values.
    pub fn interpret<D: MessageDesc + ?Sized>(&self, desc: &D, frame: &CanFrame) -> Option<Record> {
        let mut out: Record = self.template.clone();
        self.fill(desc, frame, &mut out, true, Signal::interpret)
            .then_some(out)
    }

    pub fn interpret_into<D: MessageDesc + ?Sized>(
        &self,
        desc: &D,
        frame: &CanFrame,
        out: &mut Record,
    ) -> bool {
        self.fill(desc, frame, out, false, Signal::interpret)
    }

    /// Decodes only the signals named in `selected`. `None` when the frame is
    /// too short or no signal of this message is selected.
    pub fn inspect<D: MessageDesc + ?Sized>(
        &self,
        desc: &D,
        frame: &CanFrame,
        selected: &IndexSet<String>,
    ) -> Option<Record> {
        if !self.accepts(frame) {
            return None;
        }
        let mut out: Record = Record::new();
        self.write_header(desc, frame, &mut out, false);
        let mut found: usize = 0;
        for signal in self.signals.iter().filter(|s| selected.contains(s.name())) {
            out.add_hashed(signal.name(), signal.name_hash(), signal.decode(&frame.data));
            found += 1;
        }
        (found > 0).then_some(out)
    }

    /// Packs the record's values into a zeroed payload of `byte_length` bytes.
    /// Signals whose value is absent or empty leave their bits at zero.
    pub fn encode(&self, record: &Record) -> Vec<u8> {
        let mut bytes: Vec<u8> = vec![0u8; self.byte_length];
        for signal in &self.signals {
            if let Some(value) = record.get_hashed(signal.name(), signal.name_hash()) {
                signal.encode(value, &mut bytes);
            }
        }
        bytes
    }

    /// [`Message::encode`] wrapped in a frame carrying this message's identity.
    pub fn encode_frame(&self, record: &Record) -> CanFrame {
        let mut frame: CanFrame = CanFrame::new(self.channel_id, self.message_id, self.encode(record));
        frame.extended = self.extended_frame;
        frame
    }

    fn accepts(&self, frame: &CanFrame) -> bool {
        if frame.data.len() < self.byte_length {
            trace!(
                channel = self.channel_id,
                message_id = self.message_id,
                got = frame.data.len(),
                expected = self.byte_length,
                "frame shorter than message, dropped"
            );
            return false;
        }
        true
    }

    fn write_header<D: MessageDesc + ?Sized>(
        &self,
        desc: &D,
        frame: &CanFrame,
        out: &mut Record,
        positional: bool,
    ) {
        let time: Value = desc
            .timestamp(frame.offset_nanos)
            .map(Value::Instant)
            .unwrap_or_default();
        put(out, positional, 0, record::TIME, time);
        if self.output_offset {
            put(out, positional, 1, record::OFFSET, Value::Long(frame.offset_nanos as i128));
        }
    }

    fn fill<D, F>(&self, desc: &D, frame: &CanFrame, out: &mut Record, positional: bool, read: F) -> bool
    where
        D: MessageDesc + ?Sized,
        F: Fn(&Signal, &[u8]) -> Value,
    {
        if !self.accepts(frame) {
            return false;
        }
        self.write_header(desc, frame, out, positional);
        for (signal, &column) in self.signals.iter().zip(&self.columns) {
            let value: Value = read(signal, &frame.data);
            if positional {
                out.set_at(column, value);
            } else {
                out.add_hashed(signal.name(), signal.name_hash(), value);
            }
        }
        true
    }
}

fn put(out: &mut Record, positional: bool, index: usize, name: &str, value: Value) {
    if positional {
        out.set_at(index, value);
    } else {
        out.add_hashed(name, name_hash(name), value);
    }
}
