//! Bit arithmetic, numeric representations and layout checks shared by the
//! signal codec.

pub(crate) mod bits;
pub mod message_layout;
pub mod representation;
pub mod strings;
