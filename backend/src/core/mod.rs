//! Time and scheduling primitives

pub mod time;
pub mod timer;
