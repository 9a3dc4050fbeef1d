//! Vehicle metadata directory
//!
//! Maps vehicle ids to display metadata. Used for human-readable
//! diagnostics only; no control decision ever consults it.

use std::collections::HashMap;

use terralink_shared::VehicleId;

/// Placeholder name used when an id cannot be resolved
pub const UNKNOWN_VEHICLE: &str = "an unknown vehicle";

/// Display metadata for one vehicle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleInfo {
    pub name: String,
    pub kind: String,
}

/// Lookup from vehicle id to display metadata
pub trait VehicleDirectory: Send + Sync {
    fn entry(&self, id: VehicleId) -> Option<VehicleInfo>;

    /// Best-effort display name: the directory entry's name, or a
    /// placeholder when the id is unknown
    fn display_name(&self, id: VehicleId) -> String {
        self.entry(id)
            .map_or_else(|| UNKNOWN_VEHICLE.to_string(), |info| info.name)
    }
}

/// Map-backed directory
#[derive(Debug)]
pub struct StaticDirectory {
    entries: HashMap<VehicleId, VehicleInfo>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn insert(&mut self, id: VehicleId, name: impl Into<String>, kind: impl Into<String>) {
        self.entries.insert(
            id,
            VehicleInfo {
                name: name.into(),
                kind: kind.into(),
            },
        );
    }
}

impl Default for StaticDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl VehicleDirectory for StaticDirectory {
    fn entry(&self, id: VehicleId) -> Option<VehicleInfo> {
        self.entries.get(&id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_lookup() {
        let mut directory = StaticDirectory::new();
        directory.insert(100, "Scout 1", "quadcopter");

        let info = directory.entry(100).expect("entry should exist");
        assert_eq!(info.name, "Scout 1");
        assert_eq!(info.kind, "quadcopter");
        assert_eq!(directory.entry(999), None);
    }

    #[test]
    fn test_display_name_falls_back_for_unknown_ids() {
        let mut directory = StaticDirectory::new();
        directory.insert(100, "Scout 1", "quadcopter");

        assert_eq!(directory.display_name(100), "Scout 1");
        assert_eq!(directory.display_name(999), UNKNOWN_VEHICLE);
    }
}
