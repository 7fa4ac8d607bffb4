use indexmap::IndexMap;
use indexmap::map::Entry;

use crate::types::canframe::{CanFrame, MessageDesc};
use crate::types::dbc_id::DbcId;
use crate::types::message::Message;
use crate::types::record::Record;

/// One logical bus: the messages of one DBC source, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    channel_id: u32,
    messages: IndexMap<u32, Message>,
}

impl Channel {
    pub fn new(channel_id: u32) -> Self {
        Channel {
            channel_id,
            messages: IndexMap::new(),
        }
    }

    pub fn channel_id(&self) -> u32 {
        self.channel_id
    }

    /// Inserts a message, replacing one with the same id in place.
    pub fn add_message(&mut self, message: Message) {
        self.messages.insert(message.message_id(), message);
    }

    /// Inserts a message only if its id is new; returns whether it was added.
    pub fn add_message_if_absent(&mut self, message: Message) -> bool {
        match self.messages.entry(message.message_id()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(message);
                true
            }
        }
    }

    pub fn contains_message(&self, message_id: u32) -> bool {
        self.messages.contains_key(&message_id)
    }

    pub fn message(&self, message_id: u32) -> Option<&Message> {
        self.messages.get(&message_id)
    }

    pub fn message_mut(&mut self, message_id: u32) -> Option<&mut Message> {
        self.messages.get_mut(&message_id)
    }

    pub fn remove_message(&mut self, message_id: u32) -> Option<Message> {
        self.messages.shift_remove(&message_id)
    }

    pub fn messages(&self) -> impl Iterator<Item = &Message> + '_ {
        self.messages.values()
    }

    pub fn messages_mut(&mut self) -> impl Iterator<Item = &mut Message> + '_ {
        self.messages.values_mut()
    }

    pub fn ids(&self) -> impl Iterator<Item = DbcId> + '_ {
        self.messages
            .keys()
            .map(move |&message_id| DbcId::new(self.channel_id, message_id))
    }

    /// Keeps the messages accepted by `keep`, preserving order.
    pub fn retain_messages<F: FnMut(&mut Message) -> bool>(&mut self, mut keep: F) {
        self.messages.retain(|_, m| keep(m));
    }

    /// Consumes the channel, yielding its messages in order.
    pub fn into_messages(self) -> impl Iterator<Item = Message> {
        self.messages.into_values()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn decode<D: MessageDesc + ?Sized>(&self, desc: &D, frame: &CanFrame) -> Option<Record> {
        self.message(frame.message_id)?.decode(desc, frame)
    }

    pub fn interpret<D: MessageDesc + ?Sized>(&self, desc: &D, frame: &CanFrame) -> Option<Record> {
        self.message(frame.message_id)?.interpret(desc, frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::canframe::TraceMeta;
    use crate::types::signal::{ByteOrder, Signal, SignalDef};
    use crate::types::value::Value;

    fn message(id: u32, signal: &str) -> Message {
        let mut m = Message::new(3, id, "M", 1);
        m.add_signal(Signal::new(SignalDef {
            name: signal.into(),
            start_bit: 0,
            bit_length: 8,
            byte_order: ByteOrder::Intel,
            ..Default::default()
        }));
        m
    }

    #[test]
    fn insertion_order_and_replacement() {
        let mut ch = Channel::new(3);
        ch.add_message(message(20, "A"));
        ch.add_message(message(10, "B"));
        ch.add_message(message(20, "C"));
        let ids: Vec<u32> = ch.messages().map(|m| m.message_id()).collect();
        assert_eq!(ids, vec![20, 10]);
        assert_eq!(ch.message(20).map(|m| m.signals()[0].name()), Some("C"));

        assert!(!ch.add_message_if_absent(message(10, "D")));
        assert_eq!(ch.message(10).map(|m| m.signals()[0].name()), Some("B"));
        assert_eq!(ch.ids().collect::<Vec<_>>(), vec![DbcId::new(3, 20), DbcId::new(3, 10)]);
    }

    #[test]
    fn decode_by_message_id() {
        let mut ch = Channel::new(3);
        ch.add_message(message(10, "B"));
        let hit = CanFrame::new(3, 10, vec![9]);
        let miss = CanFrame::new(3, 11, vec![9]);
        let rec = ch.decode(&TraceMeta::default(), &hit).unwrap();
        assert_eq!(rec.get("B"), Some(&Value::Int(9)));
        assert!(ch.decode(&TraceMeta::default(), &miss).is_none());
        assert!(ch.remove_message(10).is_some());
        assert!(ch.is_empty());
    }
}
