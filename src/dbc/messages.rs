use crate::core::strings::split_required;
use crate::types::errors::DbcParseError;
use crate::types::message::Message;

/// Fields of a `BO_ <id> <name>: <len> <transmitter>` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MessageHeader<'a> {
    pub id: u32,
    pub name: &'a str,
    pub byte_length: usize,
}

/// Scans a trimmed `BO_` line. The transmitter is not required.
pub(crate) fn scan_message(line: &str) -> Option<MessageHeader<'_>> {
    let rest: &str = line.strip_prefix("BO_ ")?.trim();

    // 1) ID (first token)
    let (id, rest) = split_required(rest, ' ')?;

    // 2) NAME (everything up to the first ':')
    let (name, rest) = split_required(rest.trim_start(), ':')?;

    // 3) After ':' → <len> <sender?>
    let byte_length: &str = rest.split_ascii_whitespace().next()?;

    Some(MessageHeader {
        id: id.parse::<u32>().ok()?,
        name,
        byte_length: byte_length.parse::<usize>().ok()?,
    })
}

/// `true` iff `line` is a well-formed `BO_` line.
pub fn matches_message(line: &str) -> bool {
    scan_message(line).is_some()
}

/// Builds the (still empty) message declared by a `BO_` line.
pub fn build_message(channel_id: u32, line: &str) -> Result<Message, DbcParseError> {
    let header: MessageHeader = scan_message(line).ok_or_else(|| DbcParseError::MalformedMessage {
        line: line.to_string(),
    })?;
    Ok(Message::new(channel_id, header.id, header.name, header.byte_length))
}
