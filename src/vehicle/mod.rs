//! Per-vehicle tracking and command protocol
//!
//! This module handles:
//! - Live telemetry state fed by dispatched update messages
//! - The mission assignment protocol (start, add task, stop)
//! - Outbound command construction for the transport bridge
//! - Contact bookkeeping for the connection monitor

mod mission;
mod state;

pub use mission::MissionHooks;
pub use state::{ErrorHook, MissionPhase, VehicleSnapshot};

use std::sync::Arc;

use terralink_shared::{
    now_ms, CommandEnvelope, CommandMessage, UpdateField, VehicleId, VehicleStatus, VehicleUpdate,
};

use crate::bridge::{CommandSink, NoticeSender, Severity};
use crate::catalog::JobCatalog;
use crate::directory::VehicleDirectory;
use crate::telemetry::{Retention, UpdateDispatcher};

use state::VehicleState;

/// Shared collaborator handles injected into every vehicle
#[derive(Clone)]
pub struct Services {
    pub commands: Arc<dyn CommandSink>,
    pub notices: NoticeSender,
    pub catalog: Arc<dyn JobCatalog>,
    pub directory: Arc<dyn VehicleDirectory>,
}

/// Registration options for one vehicle
#[derive(Debug, Clone)]
pub struct VehicleConfig {
    pub id: VehicleId,
    /// Jobs the vehicle is capable of performing
    pub jobs: Vec<String>,
    /// Reported status to start from; `None` means disconnected until the
    /// vehicle says otherwise
    pub status: Option<VehicleStatus>,
}

impl VehicleConfig {
    /// Config for a vehicle that starts out disconnected
    pub fn new<I, S>(id: VehicleId, jobs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id,
            jobs: jobs.into_iter().map(Into::into).collect(),
            status: None,
        }
    }

    pub fn with_status(mut self, status: VehicleStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// One tracked physical vehicle
///
/// Holds identity, live telemetry, and mission protocol state, plus the
/// dispatcher wiring that keeps them current. All mutation flows through
/// [`Vehicle::update`]; the field handlers registered at construction do
/// the bookkeeping.
pub struct Vehicle {
    id: VehicleId,
    jobs: Vec<String>,
    state: VehicleState,
    dispatcher: UpdateDispatcher<VehicleState>,
    commands: Arc<dyn CommandSink>,
    catalog: Arc<dyn JobCatalog>,
    /// Last time any message arrived from this vehicle (ms since epoch)
    last_contact_ms: u64,
}

impl Vehicle {
    /// Create a vehicle and register its permanent field handlers
    pub fn new(config: VehicleConfig, services: &Services) -> Self {
        let mut dispatcher = UpdateDispatcher::new();
        register_telemetry_handlers(
            &mut dispatcher,
            services.notices.clone(),
            services.directory.clone(),
        );

        Self {
            id: config.id,
            jobs: config.jobs,
            state: VehicleState::new(config.status.unwrap_or(VehicleStatus::Disconnected)),
            dispatcher,
            commands: services.commands.clone(),
            catalog: services.catalog.clone(),
            last_contact_ms: now_ms(),
        }
    }

    /// Feed one inbound update through the dispatcher
    ///
    /// All state bookkeeping lives in the registered handlers. Contact time
    /// is tracked separately via [`Vehicle::mark_contact`].
    pub fn update(&mut self, update: &VehicleUpdate) {
        self.dispatcher.dispatch(&mut self.state, update);
    }

    /// Record that a message of any kind just arrived from this vehicle
    pub fn mark_contact(&mut self) {
        self.last_contact_ms = now_ms();
    }

    pub fn id(&self) -> VehicleId {
        self.id
    }

    pub fn jobs(&self) -> &[String] {
        &self.jobs
    }

    pub fn status(&self) -> VehicleStatus {
        self.state.status
    }

    pub fn phase(&self) -> MissionPhase {
        self.state.phase
    }

    pub fn assigned_job(&self) -> Option<&str> {
        self.state.assigned_job.as_deref()
    }

    pub fn lat(&self) -> f64 {
        self.state.lat
    }

    pub fn lng(&self) -> f64 {
        self.state.lng
    }

    pub fn alt(&self) -> Option<f64> {
        self.state.alt
    }

    pub fn battery(&self) -> Option<f64> {
        self.state.battery
    }

    pub fn heading(&self) -> Option<f64> {
        self.state.heading
    }

    pub fn last_contact_ms(&self) -> u64 {
        self.last_contact_ms
    }

    /// Plain serializable view for the UI/IPC boundary
    pub fn snapshot(&self) -> VehicleSnapshot {
        VehicleSnapshot {
            vehicle_id: self.id,
            status: self.state.status,
            jobs: self.jobs.clone(),
            lat: self.state.lat,
            lng: self.state.lng,
            alt: self.state.alt,
            battery: self.state.battery,
            heading: self.state.heading,
        }
    }

    /// Hand an addressed command to the transport bridge
    fn send_command(&self, message: CommandMessage) {
        self.commands.send(CommandEnvelope::new(self.id, message));
    }
}

/// Permanent handlers for the six telemetry fields
///
/// These never unsubscribe. Mission tracking layers its own status
/// subscriber on top of the permanent one, see
/// [`Vehicle::assign_mission`].
fn register_telemetry_handlers(
    dispatcher: &mut UpdateDispatcher<VehicleState>,
    notices: NoticeSender,
    directory: Arc<dyn VehicleDirectory>,
) {
    dispatcher.subscribe(UpdateField::Status, |state, value, update| {
        if let Some(status) = value.as_status() {
            state.status = status;
            if status == VehicleStatus::Error {
                if let Some(hook) = state.error_hook.as_mut() {
                    hook(update.error_message.as_deref());
                }
            }
        }
        Retention::Keep
    });

    dispatcher.subscribe(UpdateField::Lat, |state, value, _| {
        if let Some(lat) = value.as_f64() {
            state.lat = lat;
        }
        Retention::Keep
    });

    dispatcher.subscribe(UpdateField::Lng, |state, value, _| {
        if let Some(lng) = value.as_f64() {
            state.lng = lng;
        }
        Retention::Keep
    });

    dispatcher.subscribe(UpdateField::Alt, |state, value, _| {
        if let Some(alt) = value.as_f64() {
            state.alt = Some(alt);
        }
        Retention::Keep
    });

    dispatcher.subscribe(UpdateField::Battery, move |state, value, update| {
        if let Some(battery) = value.as_f64() {
            if battery > 1.0 || battery < 0.0 {
                // Reject without touching the stored value; the operator
                // hears about it through the notice feed
                notices.post(
                    Severity::Failure,
                    format!(
                        "Received an invalid battery level ({}%) from {}",
                        battery * 100.0,
                        directory.display_name(update.sid)
                    ),
                );
            } else {
                state.battery = Some(battery);
            }
        }
        Retention::Keep
    });

    dispatcher.subscribe(UpdateField::Heading, |state, value, _| {
        if let Some(heading) = value.as_f64() {
            state.heading = Some(heading);
        }
        Retention::Keep
    });
}
