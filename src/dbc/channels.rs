use std::collections::HashSet;

use tracing::{debug, warn};

use crate::config::BuildOptions;
use crate::core::message_layout::check_signal_fits;
use crate::dbc::messages::{build_message, matches_message};
use crate::dbc::signals::{build_attribute, matches_attribute};
use crate::types::channel::Channel;
use crate::types::errors::DbcParseError;
use crate::types::message::Message;
use crate::types::signal::Signal;

/// Parser position relative to the last `BO_` line.
#[derive(Debug)]
enum Active {
    /// No open message: an `SG_` line here is an error.
    Idle,
    /// `BO_` seen, no signal yet. The message joins the channel with its first signal.
    Pending(Message),
    /// Signals go to the channel's message with this id.
    Attached(u32),
    /// The id was already declared in this channel; signals are dropped.
    Shadowed,
}

/// Builds one channel from DBC text.
///
/// Lines are trimmed; blank lines are skipped and any other unrecognized line
/// closes the open message. A repeated `BO_` id keeps its first declaration.
pub(crate) fn parse_channel(
    channel_id: u32,
    text: &str,
    options: &BuildOptions,
) -> Result<Channel, DbcParseError> {
    let mut channel: Channel = Channel::new(channel_id);
    let mut active: Active = Active::Idle;

    for raw in text.lines() {
        let line: &str = raw.trim();
        if line.is_empty() {
            continue;
        }

        if matches_message(line) {
            active = Active::Pending(build_message(channel_id, line)?);
        } else if matches_attribute(line) {
            active = attach(&mut channel, active, line, options)?;
        } else {
            active = Active::Idle;
        }
    }

    debug!(channel = channel_id, messages = channel.len(), "DBC channel parsed");
    Ok(channel)
}

fn attach(
    channel: &mut Channel,
    active: Active,
    line: &str,
    options: &BuildOptions,
) -> Result<Active, DbcParseError> {
    let message_id: u32 = match active {
        Active::Idle => {
            return Err(DbcParseError::OrphanSignal {
                line: line.to_string(),
            });
        }
        Active::Shadowed => return Ok(Active::Shadowed),
        Active::Attached(message_id) => message_id,
        Active::Pending(message) => {
            let message_id: u32 = message.message_id();
            if !channel.add_message_if_absent(message) {
                debug!(
                    channel = channel.channel_id(),
                    message_id, "duplicate BO_ id in channel, later declaration ignored"
                );
                return Ok(Active::Shadowed);
            }
            message_id
        }
    };

    let Some(message) = channel.message_mut(message_id) else {
        return Ok(Active::Idle);
    };
    let signal: Signal = build_attribute(line, message.name(), options)?;
    warn_if_outside(message, &signal);
    message.add_signal(signal);
    Ok(Active::Attached(message_id))
}

fn warn_if_outside(message: &Message, signal: &Signal) {
    let byte_length: u16 = u16::try_from(message.byte_length()).unwrap_or(u16::MAX);
    if let Err(err) = check_signal_fits(
        byte_length,
        signal.start_bit(),
        signal.bit_length(),
        signal.byte_order(),
    ) {
        warn!(
            channel = message.channel_id(),
            message_id = message.message_id(),
            signal = signal.name(),
            "{err}"
        );
    }
}

/// Drops empty messages and, with deduplication on, ids already kept by an
/// earlier channel. Every kept id is recorded in `seen`.
pub(crate) fn finish_channel(
    mut channel: Channel,
    options: &BuildOptions,
    seen: &mut HashSet<u32>,
) -> Channel {
    let channel_id: u32 = channel.channel_id();
    channel.retain_messages(|message| {
        if message.is_empty() {
            return false;
        }
        let message_id: u32 = message.message_id();
        if options.deduplicate_message && seen.contains(&message_id) {
            debug!(channel = channel_id, message_id, "message already decoded by an earlier channel, dropped");
            return false;
        }
        message.set_output_offset(options.output_offset);
        seen.insert(message_id);
        true
    });
    channel
}
