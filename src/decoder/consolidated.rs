use indexmap::map::Entry;
use indexmap::{IndexMap, IndexSet};

use crate::decoder::select_signals;
use crate::types::canframe::{CanFrame, MessageDesc};
use crate::types::channel::Channel;
use crate::types::message::Message;
use crate::types::record::Record;

/// Decoder over one flat message table. Channels are merged in the order they
/// are added; the first message seen for an id wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsolidatedDecoder {
    messages: IndexMap<u32, Message>,
    output_offset: bool,
}

impl ConsolidatedDecoder {
    pub fn new(output_offset: bool) -> Self {
        ConsolidatedDecoder {
            messages: IndexMap::new(),
            output_offset,
        }
    }

    pub fn output_offset(&self) -> bool {
        self.output_offset
    }

    pub fn set_output_offset(&mut self, output_offset: bool) {
        self.output_offset = output_offset;
        for message in self.messages.values_mut() {
            message.set_output_offset(output_offset);
        }
    }

    /// Merges a channel's messages; ids already present are left alone.
    pub fn add_channel(&mut self, channel: Channel) {
        for message in channel.into_messages() {
            self.add_message(message);
        }
    }

    /// Inserts `message` unless its id is taken; returns whether it was added.
    pub fn add_message(&mut self, mut message: Message) -> bool {
        match self.messages.entry(message.message_id()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                message.set_output_offset(self.output_offset);
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

    pub fn remove_message(&mut self, message_id: u32) -> Option<Message> {
        self.messages.shift_remove(&message_id)
    }

    pub fn messages(&self) -> impl Iterator<Item = &Message> + '_ {
        self.messages.values()
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

    fn lookup(&self, frame: &CanFrame) -> Option<&Message> {
        self.messages.get(&frame.message_id)
    }

    pub fn decode<D: MessageDesc + ?Sized>(&self, desc: &D, frame: &CanFrame) -> Option<Record> {
        self.lookup(frame)?.decode(desc, frame)
    }

    pub fn decode_into<D: MessageDesc + ?Sized>(&self, desc: &D, frame: &CanFrame, out: &mut Record) -> bool {
        self.lookup(frame)
            .is_some_and(|m| m.decode_into(desc, frame, out))
    }

    pub fn interpret<D: MessageDesc + ?Sized>(&self, desc: &D, frame: &CanFrame) -> Option<Record> {
        self.lookup(frame)?.interpret(desc, frame)
    }

    pub fn interpret_into<D: MessageDesc + ?Sized>(&self, desc: &D, frame: &CanFrame, out: &mut Record) -> bool {
        self.lookup(frame)
            .is_some_and(|m| m.interpret_into(desc, frame, out))
    }

    pub fn inspect<D: MessageDesc + ?Sized>(
        &self,
        desc: &D,
        frame: &CanFrame,
        selected: &IndexSet<String>,
    ) -> Option<Record> {
        self.lookup(frame)?.inspect(desc, frame, selected)
    }

    /// Prunes every message to `selected` and drops emptied messages.
    /// An empty selection keeps everything.
    pub fn select(&mut self, selected: &IndexSet<String>) {
        if selected.is_empty() {
            return;
        }
        self.messages.retain(|_, m| select_signals(m, selected));
    }
}
