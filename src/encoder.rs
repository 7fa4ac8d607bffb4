//! # encoder
//!
//! Record-to-frame packing. Messages live in a **SlotMap** arena with stable
//! [`MessageKey`]s; an insertion-ordered index maps every signal name to the
//! message that owns it. A signal name declared by several messages belongs
//! to the first one added; a message left owning no name is not stored.

use std::collections::HashSet;

use indexmap::IndexMap;
use indexmap::map::Entry;
use slotmap::{SlotMap, new_key_type};
use tracing::debug;

use crate::types::canframe::CanFrame;
use crate::types::message::Message;
use crate::types::record::Record;

new_key_type! { pub struct MessageKey; }

#[derive(Debug, Clone, Default)]
pub struct MessageEncoder {
    messages: SlotMap<MessageKey, Message>,
    by_signal: IndexMap<String, MessageKey>,
}

impl MessageEncoder {
    /// Empty encoder; [`MessageEncoder::encode`] emits no frames.
    pub fn new() -> Self {
        MessageEncoder::default()
    }

    /// Registers `message` and indexes its signal names. Names already owned
    /// by another message stay with it. Returns the message's key, or `None`
    /// when every name is taken and the message could never encode.
    pub fn add_message(&mut self, message: Message) -> Option<MessageKey> {
        let names: Vec<String> = message.signals().iter().map(|s| s.name().to_string()).collect();
        if names.iter().all(|name| self.by_signal.contains_key(name)) {
            debug!(message = message.name(), "message owns no signal name, not added");
            return None;
        }
        let key: MessageKey = self.messages.insert(message);
        for name in names {
            if let Entry::Vacant(slot) = self.by_signal.entry(name) {
                slot.insert(key);
            }
        }
        Some(key)
    }

    pub fn contains_attribute(&self, name: &str) -> bool {
        self.by_signal.contains_key(name)
    }

    /// Message that encodes the signal called `name`.
    pub fn message_for(&self, name: &str) -> Option<&Message> {
        let key: &MessageKey = self.by_signal.get(name)?;
        self.messages.get(*key)
    }

    pub fn message(&self, key: MessageKey) -> Option<&Message> {
        self.messages.get(key)
    }

    pub fn messages(&self) -> impl Iterator<Item = &Message> + '_ {
        self.messages.values()
    }

    /// Unindexes `name`; its message is dropped once no name refers to it.
    pub fn remove(&mut self, name: &str) -> bool {
        let Some(key) = self.by_signal.shift_remove(name) else {
            return false;
        };
        if !self.by_signal.values().any(|k| *k == key) {
            self.messages.remove(key);
        }
        true
    }

    /// Number of indexed signal names.
    pub fn len(&self) -> usize {
        self.by_signal.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_signal.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.by_signal.clear();
    }

    /// Packs one record into frames.
    ///
    /// Non-empty fields are visited in record order. The first unsettled
    /// field picks its message, which encodes every signal it declares from
    /// the record; those names are then settled. Unknown names emit nothing.
    pub fn encode(&self, record: &Record) -> Vec<CanFrame> {
        let mut settled: HashSet<&str> = HashSet::new();
        let mut frames: Vec<CanFrame> = Vec::new();

        for (name, value) in record.iter() {
            if value.is_empty() || !settled.insert(name) {
                continue;
            }
            let Some(message) = self.message_for(name) else {
                debug!(field = name, "no message encodes this field, skipped");
                continue;
            };
            frames.push(message.encode_frame(record));
            settled.extend(message.signals().iter().map(|s| s.name()));
        }
        frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::signal::{ByteOrder, Signal, SignalDef};
    use crate::types::value::Value;

    fn sig(name: &str, start: u16) -> Signal {
        Signal::new(SignalDef {
            name: name.into(),
            start_bit: start,
            bit_length: 8,
            byte_order: ByteOrder::Intel,
            ..Default::default()
        })
    }

    fn message(channel_id: u32, id: u32, names: &[&str]) -> Message {
        let mut m = Message::new(channel_id, id, "M", names.len());
        for (i, name) in names.iter().enumerate() {
            m.add_signal(sig(name, (i * 8) as u16));
        }
        m
    }

    fn encoder() -> MessageEncoder {
        let mut enc = MessageEncoder::new();
        enc.add_message(message(1, 0x10, &["A", "B"]));
        enc.add_message(message(1, 0x20, &["C"]));
        enc
    }

    #[test]
    fn one_frame_per_touched_message() {
        let mut rec = Record::new();
        rec.add("C", Value::Int(9))
            .add("A", Value::Int(1))
            .add("B", Value::Int(2));

        let frames = encoder().encode(&rec);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].message_id, 0x20);
        assert_eq!(frames[0].data, vec![9]);
        assert_eq!(frames[1].message_id, 0x10);
        assert_eq!(frames[1].data, vec![1, 2]);
        assert_eq!(frames[1].data_length, 2);
    }

    #[test]
    fn empty_and_unknown_fields_are_skipped() {
        let mut rec = Record::new();
        rec.add("Unknown", Value::Int(4))
            .add("C", Value::Null)
            .add("A", Value::Text(String::new()))
            .add("B", Value::Int(5));

        let frames = encoder().encode(&rec);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].message_id, 0x10);
        assert_eq!(frames[0].data, vec![0, 5]);
    }

    #[test]
    fn first_declaring_message_owns_a_name() {
        let mut enc = encoder();
        assert!(enc.add_message(message(2, 0x30, &["A", "D"])).is_some());
        assert_eq!(enc.message_for("A").map(|m| m.message_id()), Some(0x10));
        assert_eq!(enc.message_for("D").map(|m| m.message_id()), Some(0x30));
        assert_eq!(enc.len(), 4);
    }

    #[test]
    fn fully_shadowed_message_is_not_stored() {
        let mut enc = encoder();
        assert_eq!(enc.add_message(message(2, 0x30, &["A", "C"])), None);
        assert_eq!(enc.messages().count(), 2);
        assert_eq!(enc.len(), 3);
        assert!(enc.messages().all(|m| m.message_id() != 0x30));
    }

    #[test]
    fn frames_follow_first_field_of_each_message() {
        let mut enc = MessageEncoder::new();
        for i in 0..50u32 {
            let a = format!("S{i}a");
            let b = format!("S{i}b");
            enc.add_message(message(1, i, &[a.as_str(), b.as_str()]));
        }
        let mut rec = Record::new();
        for i in (0..50u32).rev() {
            rec.add(&format!("S{i}b"), Value::Int(i as i64));
        }
        for i in 0..50u32 {
            rec.add(&format!("S{i}a"), Value::Int(1));
        }

        let frames = enc.encode(&rec);
        let ids: Vec<u32> = frames.iter().map(|f| f.message_id).collect();
        assert_eq!(ids, (0..50u32).rev().collect::<Vec<_>>());
        assert_eq!(frames[0].data, vec![1, 49]);
    }

    #[test]
    fn deserialised_record_encodes() {
        let mut enc = MessageEncoder::new();
        enc.add_message(message(1, 0x40, &["A"]));
        let mut rec = Record::new();
        rec.add("A", Value::Int(7));
        let json = serde_json::to_string(&rec).unwrap();
        let back: Record = serde_json::from_str(&json).unwrap();

        let frames = enc.encode(&back);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data, vec![7]);
    }

    #[test]
    fn empty_encoder_emits_nothing() {
        let mut rec = Record::new();
        rec.add("A", Value::Int(1));
        assert!(MessageEncoder::new().encode(&rec).is_empty());
    }

    #[test]
    fn remove_drops_unreferenced_messages() {
        let mut enc = encoder();
        assert!(enc.remove("A"));
        assert_eq!(enc.messages().count(), 2);
        assert!(enc.remove("B"));
        assert_eq!(enc.messages().count(), 1);
        assert!(!enc.remove("B"));
        assert!(!enc.contains_attribute("A"));
        enc.clear();
        assert!(enc.is_empty());
    }
}
