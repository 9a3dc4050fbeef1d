//! Message vocabulary shared with vehicle firmware
//!
//! Inbound traffic is the [`VehicleUpdate`] telemetry message; outbound
//! traffic is the [`CommandMessage`] set, wrapped in a [`CommandEnvelope`]
//! before it reaches the transport. Wire JSON uses camelCase keys and a
//! `type` tag on commands, matching what the firmware parses.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Stable numeric identifier of a physical vehicle
pub type VehicleId = u32;

/// Lifecycle status reported by a vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleStatus {
    Ready,
    Error,
    Disconnected,
    Waiting,
    Running,
    Paused,
}

impl fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VehicleStatus::Ready => "ready",
            VehicleStatus::Error => "error",
            VehicleStatus::Disconnected => "disconnected",
            VehicleStatus::Waiting => "waiting",
            VehicleStatus::Running => "running",
            VehicleStatus::Paused => "paused",
        };
        write!(f, "{name}")
    }
}

/// Telemetry fields an update message may carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateField {
    Status,
    Lat,
    Lng,
    Alt,
    Battery,
    Heading,
}

impl fmt::Display for UpdateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UpdateField::Status => "status",
            UpdateField::Lat => "lat",
            UpdateField::Lng => "lng",
            UpdateField::Alt => "alt",
            UpdateField::Battery => "battery",
            UpdateField::Heading => "heading",
        };
        write!(f, "{name}")
    }
}

/// Value of one update field, as handed to field subscribers
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    Status(VehicleStatus),
    Numeric(f64),
}

impl FieldValue {
    pub fn as_status(&self) -> Option<VehicleStatus> {
        match self {
            FieldValue::Status(status) => Some(*status),
            FieldValue::Numeric(_) => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Numeric(value) => Some(*value),
            FieldValue::Status(_) => None,
        }
    }
}

/// Inbound telemetry from a vehicle
///
/// Any subset of the fields may be present; `sid` identifies the source
/// vehicle. `error_message` is not a telemetry field of its own, it rides
/// along with an `error` status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleUpdate {
    pub sid: VehicleId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<VehicleStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl VehicleUpdate {
    /// Create an update carrying no fields yet
    pub fn new(sid: VehicleId) -> Self {
        Self {
            sid,
            status: None,
            lat: None,
            lng: None,
            alt: None,
            battery: None,
            heading: None,
            error_message: None,
        }
    }

    pub fn with_status(mut self, status: VehicleStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_lat(mut self, lat: f64) -> Self {
        self.lat = Some(lat);
        self
    }

    pub fn with_lng(mut self, lng: f64) -> Self {
        self.lng = Some(lng);
        self
    }

    pub fn with_alt(mut self, alt: f64) -> Self {
        self.alt = Some(alt);
        self
    }

    pub fn with_battery(mut self, battery: f64) -> Self {
        self.battery = Some(battery);
        self
    }

    pub fn with_heading(mut self, heading: f64) -> Self {
        self.heading = Some(heading);
        self
    }

    pub fn with_error_message(mut self, text: impl Into<String>) -> Self {
        self.error_message = Some(text.into());
        self
    }

    /// Telemetry fields present on this update, in wire declaration order
    pub fn fields(&self) -> Vec<(UpdateField, FieldValue)> {
        let mut present = Vec::with_capacity(6);
        if let Some(status) = self.status {
            present.push((UpdateField::Status, FieldValue::Status(status)));
        }
        if let Some(lat) = self.lat {
            present.push((UpdateField::Lat, FieldValue::Numeric(lat)));
        }
        if let Some(lng) = self.lng {
            present.push((UpdateField::Lng, FieldValue::Numeric(lng)));
        }
        if let Some(alt) = self.alt {
            present.push((UpdateField::Alt, FieldValue::Numeric(alt)));
        }
        if let Some(battery) = self.battery {
            present.push((UpdateField::Battery, FieldValue::Numeric(battery)));
        }
        if let Some(heading) = self.heading {
            present.push((UpdateField::Heading, FieldValue::Numeric(heading)));
        }
        present
    }
}

/// One task issued under an assigned job
///
/// The parameter payload is opaque to the ground station; only `kind` is
/// checked against the job catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(rename = "taskType")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub params: Value,
}

impl Task {
    pub fn new(kind: impl Into<String>, params: Value) -> Self {
        Self {
            kind: kind.into(),
            params,
        }
    }
}

/// Outbound command sent to a vehicle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CommandMessage {
    /// Hand the vehicle a job to perform
    #[serde(rename_all = "camelCase")]
    Start {
        job_type: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        options: Option<Value>,
    },
    /// Issue one task under the currently assigned job
    #[serde(rename_all = "camelCase")]
    AddMission { mission_info: Task },
    /// Halt whatever the vehicle is doing
    Stop,
}

impl CommandMessage {
    /// Wire tag of this message, for logs
    pub fn label(&self) -> &'static str {
        match self {
            CommandMessage::Start { .. } => "start",
            CommandMessage::AddMission { .. } => "addMission",
            CommandMessage::Stop => "stop",
        }
    }
}

/// Addressed, timestamped command wrapper handed to the transport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandEnvelope {
    pub target: VehicleId,
    pub issued_ms: u64,
    pub message: CommandMessage,
}

impl CommandEnvelope {
    /// Stamp a command for the given vehicle with the current time
    pub fn new(target: VehicleId, message: CommandMessage) -> Self {
        Self {
            target,
            issued_ms: crate::now_ms(),
            message,
        }
    }
}
