//! Seams between the vehicle core and the application shell
//!
//! This module handles:
//! - The outbound command sink vehicles hand their commands to
//! - The severity-tagged notice feed for the operator UI and log

mod commands;
mod notices;

pub use commands::{ChannelCommandSink, CommandSink};
pub use notices::{Notice, NoticeSender, Severity};
