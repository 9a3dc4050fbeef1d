//! Fleet roster and lifecycle
//!
//! This module handles:
//! - Registering and unregistering tracked vehicles
//! - Routing inbound updates to the right vehicle
//! - Dropping and reporting updates for unknown vehicle ids
//! - Staleness bookkeeping for the connection monitor
//! - Roster-wide snapshots for the UI

mod service;

pub use service::{FleetService, MonitorConfig};

use std::collections::HashMap;

use terralink_shared::{now_ms, VehicleId, VehicleStatus, VehicleUpdate};
use thiserror::Error;
use tracing::{debug, warn};

use crate::bridge::Severity;
use crate::vehicle::{Services, Vehicle, VehicleConfig, VehicleSnapshot};

/// Roster-level failures
#[derive(Error, Debug, PartialEq, Eq)]
pub enum FleetError {
    #[error("Vehicle {0} is already registered")]
    DuplicateVehicle(VehicleId),
}

/// All vehicles the ground station is tracking
///
/// Owned by a single service loop; vehicles are never shared across tasks.
pub struct Fleet {
    vehicles: HashMap<VehicleId, Vehicle>,
    services: Services,
}

impl Fleet {
    pub fn new(services: Services) -> Self {
        Self {
            vehicles: HashMap::new(),
            services,
        }
    }

    /// Start tracking a vehicle
    pub fn register(&mut self, config: VehicleConfig) -> Result<(), FleetError> {
        if self.vehicles.contains_key(&config.id) {
            return Err(FleetError::DuplicateVehicle(config.id));
        }
        debug!("registering vehicle {} (jobs {:?})", config.id, config.jobs);
        self.vehicles
            .insert(config.id, Vehicle::new(config, &self.services));
        Ok(())
    }

    /// Stop tracking a vehicle
    pub fn unregister(&mut self, id: VehicleId) -> bool {
        self.vehicles.remove(&id).is_some()
    }

    pub fn get(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.get(&id)
    }

    pub fn get_mut(&mut self, id: VehicleId) -> Option<&mut Vehicle> {
        self.vehicles.get_mut(&id)
    }

    pub fn count(&self) -> usize {
        self.vehicles.len()
    }

    /// Route one inbound update to its vehicle
    ///
    /// The message itself proves the link is alive, so contact is marked
    /// before dispatch. Updates for ids not in the roster are dropped with
    /// one failure notice.
    pub fn apply(&mut self, update: &VehicleUpdate) {
        match self.vehicles.get_mut(&update.sid) {
            Some(vehicle) => {
                vehicle.mark_contact();
                vehicle.update(update);
            }
            None => {
                warn!("update for unregistered vehicle {}", update.sid);
                self.services.notices.post(
                    Severity::Failure,
                    format!(
                        "Received an update for vehicle {} which is not in the roster",
                        update.sid
                    ),
                );
            }
        }
    }

    /// Record contact for a non-update message (an ack, a log line)
    pub fn touch(&mut self, id: VehicleId) -> bool {
        match self.vehicles.get_mut(&id) {
            Some(vehicle) => {
                vehicle.mark_contact();
                true
            }
            None => false,
        }
    }

    /// Ids of vehicles whose last contact is older than `timeout_ms`
    pub fn stale_vehicles(&self, timeout_ms: u64) -> Vec<VehicleId> {
        let now = now_ms();
        self.vehicles
            .values()
            .filter(|vehicle| now.saturating_sub(vehicle.last_contact_ms()) > timeout_ms)
            .map(Vehicle::id)
            .collect()
    }

    /// Mark every stale vehicle disconnected, once per outage
    ///
    /// Each newly stale vehicle gets a synthetic `disconnected` status
    /// update so the usual dispatch path runs, mission disconnect hooks
    /// included. The synthetic update goes through [`Vehicle::update`]
    /// directly rather than [`Fleet::apply`]: the silence is the point, so
    /// contact must not advance. Returns the ids transitioned this sweep.
    pub fn expire_stale(&mut self, timeout_ms: u64) -> Vec<VehicleId> {
        let mut expired = Vec::new();

        for id in self.stale_vehicles(timeout_ms) {
            let Some(vehicle) = self.vehicles.get_mut(&id) else {
                continue;
            };
            if vehicle.status() == VehicleStatus::Disconnected {
                continue;
            }

            let outage = VehicleUpdate::new(id).with_status(VehicleStatus::Disconnected);
            vehicle.update(&outage);

            warn!("vehicle {}: silent past timeout, marked disconnected", id);
            self.services
                .notices
                .post(Severity::Warning, format!("Lost connection to vehicle {id}"));
            expired.push(id);
        }

        expired
    }

    /// Serializable view of the whole roster, ordered by vehicle id
    pub fn snapshots(&self) -> Vec<VehicleSnapshot> {
        let mut snapshots: Vec<_> = self.vehicles.values().map(Vehicle::snapshot).collect();
        snapshots.sort_by_key(|snapshot| snapshot.vehicle_id);
        snapshots
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::testutil::{drain, harness};

    fn two_vehicle_fleet(fixture: &crate::testutil::Harness) -> Fleet {
        let mut fleet = Fleet::new(fixture.services.clone());
        fleet
            .register(VehicleConfig::new(100, ["survey"]))
            .expect("register 100");
        fleet
            .register(VehicleConfig::new(200, ["delivery"]))
            .expect("register 200");
        fleet
    }

    #[test]
    fn test_register_and_count() {
        let fixture = harness();
        let fleet = two_vehicle_fleet(&fixture);

        assert_eq!(fleet.count(), 2);
        assert!(fleet.get(100).is_some());
        assert!(fleet.get(300).is_none());
    }

    #[test]
    fn test_duplicate_registration_is_refused() {
        let fixture = harness();
        let mut fleet = two_vehicle_fleet(&fixture);

        let result = fleet.register(VehicleConfig::new(100, ["survey"]));
        assert_eq!(result, Err(FleetError::DuplicateVehicle(100)));
        assert_eq!(fleet.count(), 2);
    }

    #[test]
    fn test_unregister() {
        let fixture = harness();
        let mut fleet = two_vehicle_fleet(&fixture);

        assert!(fleet.unregister(100));
        assert!(!fleet.unregister(100));
        assert_eq!(fleet.count(), 1);
    }

    #[test]
    fn test_apply_routes_to_the_right_vehicle() {
        let fixture = harness();
        let mut fleet = two_vehicle_fleet(&fixture);

        fleet.apply(&VehicleUpdate::new(100).with_lat(34.05));
        fleet.apply(&VehicleUpdate::new(200).with_lat(35.11));

        assert_eq!(fleet.get(100).expect("vehicle 100").lat(), 34.05);
        assert_eq!(fleet.get(200).expect("vehicle 200").lat(), 35.11);
    }

    #[test]
    fn test_apply_for_unknown_vehicle_is_dropped_and_reported() {
        let mut fixture = harness();
        let mut fleet = two_vehicle_fleet(&fixture);

        fleet.apply(&VehicleUpdate::new(999).with_lat(1.0));

        let notices = drain(&mut fixture.notices);
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].severity, Severity::Failure);
        assert!(notices[0].text.contains("999"), "got: {}", notices[0].text);
    }

    #[test]
    fn test_touch_marks_contact_without_dispatch() {
        let fixture = harness();
        let mut fleet = two_vehicle_fleet(&fixture);

        let before = fleet.get(100).expect("vehicle").last_contact_ms();
        std::thread::sleep(Duration::from_millis(5));

        assert!(fleet.touch(100));
        assert!(!fleet.touch(999));
        assert!(fleet.get(100).expect("vehicle").last_contact_ms() > before);
        // No dispatch happened: telemetry untouched
        assert_eq!(fleet.get(100).expect("vehicle").lat(), 0.0);
    }

    #[test]
    fn test_stale_detection_tracks_contact() {
        let fixture = harness();
        let mut fleet = two_vehicle_fleet(&fixture);

        std::thread::sleep(Duration::from_millis(300));
        let mut stale = fleet.stale_vehicles(0);
        stale.sort_unstable();
        assert_eq!(stale, [100, 200]);

        // A touched vehicle drops out of the stale set. The cutoff sits
        // halfway between the fresh contact and the 300ms-old one, so even
        // a badly preempted runner lands on the right side of both.
        fleet.touch(100);
        assert_eq!(fleet.stale_vehicles(150), [200]);
        assert!(fleet.stale_vehicles(60_000).is_empty());
    }

    #[test]
    fn test_expire_stale_marks_disconnected_once() {
        let mut fixture = harness();
        let mut fleet = Fleet::new(fixture.services.clone());
        fleet
            .register(VehicleConfig::new(100, ["survey"]).with_status(VehicleStatus::Ready))
            .expect("register");

        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(fleet.expire_stale(0), [100]);
        assert_eq!(
            fleet.get(100).expect("vehicle").status(),
            VehicleStatus::Disconnected
        );

        let notices = drain(&mut fixture.notices);
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].severity, Severity::Warning);

        // Second sweep: still silent, but already marked; no repeat notice
        assert!(fleet.expire_stale(0).is_empty());
        assert!(drain(&mut fixture.notices).is_empty());
    }

    #[test]
    fn test_fresh_update_revives_an_expired_vehicle() {
        let fixture = harness();
        let mut fleet = Fleet::new(fixture.services.clone());
        fleet
            .register(VehicleConfig::new(100, ["survey"]).with_status(VehicleStatus::Ready))
            .expect("register");

        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(fleet.expire_stale(0), [100]);

        fleet.apply(&VehicleUpdate::new(100).with_status(VehicleStatus::Ready));
        assert_eq!(
            fleet.get(100).expect("vehicle").status(),
            VehicleStatus::Ready
        );
        assert!(fleet.stale_vehicles(60_000).is_empty());
    }

    #[test]
    fn test_expire_stale_runs_mission_disconnect_hooks() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        use crate::vehicle::MissionHooks;

        let fixture = harness();
        let mut fleet = Fleet::new(fixture.services.clone());
        fleet
            .register(VehicleConfig::new(100, ["survey"]).with_status(VehicleStatus::Ready))
            .expect("register");

        let disconnects = Arc::new(AtomicUsize::new(0));
        let counter = disconnects.clone();
        let hooks = MissionHooks::new().on_disconnect(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert!(fleet
            .get_mut(100)
            .expect("vehicle")
            .assign_mission("survey", None, hooks));

        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(fleet.expire_stale(0), [100]);
        assert_eq!(disconnects.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_snapshots_are_ordered_by_id() {
        let fixture = harness();
        let mut fleet = two_vehicle_fleet(&fixture);

        fleet.apply(&VehicleUpdate::new(200).with_battery(0.7));

        let snapshots = fleet.snapshots();
        let ids: Vec<_> = snapshots.iter().map(|s| s.vehicle_id).collect();
        assert_eq!(ids, [100, 200]);
        assert_eq!(snapshots[1].battery, Some(0.7));
    }
}
