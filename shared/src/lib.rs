//! TerraLink Shared Protocol Types
//!
//! This crate provides the message vocabulary and telemetry codec shared
//! between the ground station and the vehicle-facing transport bridge.

pub mod codec;
pub mod messages;

use std::time::{SystemTime, UNIX_EPOCH};

// Re-export commonly used types at crate root
pub use messages::{
    CommandEnvelope, CommandMessage, FieldValue, Task, UpdateField, VehicleId, VehicleStatus,
    VehicleUpdate,
};

/// Get current timestamp in milliseconds since Unix epoch
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Connection monitoring parameters for the system
pub mod timing {
    /// A vehicle silent for longer than this is treated as disconnected
    pub const STALE_CONNECTION_TIMEOUT_MS: u64 = 10000;

    /// How often the roster is swept for silent vehicles
    pub const CONNECTION_SWEEP_INTERVAL_MS: u64 = 1000;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_ms_advances() {
        let a = now_ms();
        let b = now_ms();
        assert!(b >= a);
        // Sanity check the clock is past 2020, not counting from boot
        assert!(a > 1_577_836_800_000);
    }
}
