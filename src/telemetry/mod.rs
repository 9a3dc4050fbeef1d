//! Inbound telemetry fan-out
//!
//! This module handles:
//! - The field-keyed subscriber registry vehicles hang their handlers on
//! - Synchronous dispatch of inbound updates to those subscribers
//! - In-place handler removal without disturbing dispatch order

mod dispatcher;

pub use dispatcher::{FieldHandler, Retention, UpdateDispatcher};
