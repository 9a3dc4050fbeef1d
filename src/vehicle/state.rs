//! Mutable vehicle state and its serializable view

use serde::Serialize;
use terralink_shared::{VehicleId, VehicleStatus};

/// Mission-assignment phase, tracked separately from the reported status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissionPhase {
    /// No mission in flight; assignment is accepted
    Idle,
    /// A mission is in flight; assignment is refused until the vehicle is
    /// observed back at `ready`, even if the mission was stopped meanwhile
    Busy,
}

/// Callback invoked when the vehicle reports the `error` status, with the
/// error text when the update carried one
pub type ErrorHook = Box<dyn FnMut(Option<&str>) + Send>;

/// Mutable vehicle state: the dispatch context every field handler runs
/// against
pub struct VehicleState {
    pub status: VehicleStatus,
    pub phase: MissionPhase,
    pub assigned_job: Option<String>,
    pub lat: f64,
    pub lng: f64,
    pub alt: Option<f64>,
    pub battery: Option<f64>,
    pub heading: Option<f64>,
    pub error_hook: Option<ErrorHook>,
}

impl VehicleState {
    pub fn new(status: VehicleStatus) -> Self {
        Self {
            status,
            phase: MissionPhase::Idle,
            assigned_job: None,
            lat: 0.0,
            lng: 0.0,
            alt: None,
            battery: None,
            heading: None,
            error_hook: None,
        }
    }
}

/// Plain serializable view of a vehicle for the UI/IPC boundary
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleSnapshot {
    pub vehicle_id: VehicleId,
    pub status: VehicleStatus,
    pub jobs: Vec<String>,
    pub lat: f64,
    pub lng: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading: Option<f64>,
}
