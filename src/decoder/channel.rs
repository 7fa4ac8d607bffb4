use indexmap::{IndexMap, IndexSet};

use crate::decoder::select_signals;
use crate::types::canframe::{CanFrame, MessageDesc};
use crate::types::channel::Channel;
use crate::types::dbc_id::DbcId;
use crate::types::message::Message;
use crate::types::record::Record;

/// Decoder that keeps channels apart: a frame is matched on its channel id
/// first, then on its message id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelDecoder {
    channels: IndexMap<u32, Channel>,
    output_offset: bool,
}

impl ChannelDecoder {
    pub fn new(output_offset: bool) -> Self {
        ChannelDecoder {
            channels: IndexMap::new(),
            output_offset,
        }
    }

    pub fn output_offset(&self) -> bool {
        self.output_offset
    }

    pub fn set_output_offset(&mut self, output_offset: bool) {
        self.output_offset = output_offset;
        for channel in self.channels.values_mut() {
            for message in channel.messages_mut() {
                message.set_output_offset(output_offset);
            }
        }
    }

    /// Adds (or replaces) a channel; its messages take the decoder's offset flag.
    pub fn add_channel(&mut self, mut channel: Channel) {
        for message in channel.messages_mut() {
            message.set_output_offset(self.output_offset);
        }
        self.channels.insert(channel.channel_id(), channel);
    }

    pub fn contains_channel(&self, channel_id: u32) -> bool {
        self.channels.contains_key(&channel_id)
    }

    pub fn channel(&self, channel_id: u32) -> Option<&Channel> {
        self.channels.get(&channel_id)
    }

    pub fn remove_channel(&mut self, channel_id: u32) -> Option<Channel> {
        self.channels.shift_remove(&channel_id)
    }

    pub fn channels(&self) -> impl Iterator<Item = &Channel> + '_ {
        self.channels.values()
    }

    pub fn message(&self, channel_id: u32, message_id: u32) -> Option<&Message> {
        self.channel(channel_id)?.message(message_id)
    }

    pub fn messages(&self) -> impl Iterator<Item = &Message> + '_ {
        self.channels.values().flat_map(|c| c.messages())
    }

    /// Every (channel, message) pair, sorted.
    pub fn ids(&self) -> Vec<DbcId> {
        let mut ids: Vec<DbcId> = self.channels.values().flat_map(|c| c.ids()).collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn clear(&mut self) {
        self.channels.clear();
    }

    fn lookup(&self, frame: &CanFrame) -> Option<&Message> {
        self.message(frame.channel_id, frame.message_id)
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

    /// Prunes every message to `selected`, then drops emptied messages and
    /// channels. An empty selection keeps everything.
    pub fn select(&mut self, selected: &IndexSet<String>) {
        if selected.is_empty() {
            return;
        }
        for channel in self.channels.values_mut() {
            channel.retain_messages(|m| select_signals(m, selected));
        }
        self.channels.retain(|_, c| !c.is_empty());
    }
}
