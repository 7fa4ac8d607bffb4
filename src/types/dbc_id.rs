use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a message across channels, ordered by channel then message id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DbcId {
    pub channel_id: u32,
    pub message_id: u32,
}

impl DbcId {
    pub fn new(channel_id: u32, message_id: u32) -> Self {
        DbcId {
            channel_id,
            message_id,
        }
    }
}

impl fmt::Display for DbcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:0x{:X}", self.channel_id, self.message_id)
    }
}
