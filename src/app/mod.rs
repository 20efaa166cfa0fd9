//! The engine core: typed boundary messages, port traits and the
//! dispatch loop that translates commands into controller intents.

pub mod dispatcher;
pub mod messages;
pub mod ports;
