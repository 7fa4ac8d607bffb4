//! # types
//!
//! `types` is the module containing all the useful public structs of the crate

pub mod canframe;
pub mod channel;
pub mod dbc_id;
pub mod errors;
pub mod message;
pub mod record;
pub mod signal;
pub mod value;
