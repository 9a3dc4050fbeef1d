//! Fleet service loop
//!
//! Drives the roster from the inbound update channel and sweeps it for
//! silent vehicles in between. The loop is the fleet's single owner:
//! every vehicle is only ever touched from here.

use std::time::Duration;

use terralink_shared::{timing, VehicleUpdate};
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::Fleet;

/// Connection monitoring parameters
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Silence after which a vehicle is considered disconnected
    pub stale_timeout: Duration,
    /// How often the roster is swept for silent vehicles
    pub sweep_interval: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            stale_timeout: Duration::from_millis(timing::STALE_CONNECTION_TIMEOUT_MS),
            sweep_interval: Duration::from_millis(timing::CONNECTION_SWEEP_INTERVAL_MS),
        }
    }
}

/// Owns the roster and pumps it until the inbound channel closes
pub struct FleetService {
    fleet: Fleet,
    inbound: mpsc::UnboundedReceiver<VehicleUpdate>,
    config: MonitorConfig,
}

impl FleetService {
    pub fn new(
        fleet: Fleet,
        inbound: mpsc::UnboundedReceiver<VehicleUpdate>,
        config: MonitorConfig,
    ) -> Self {
        Self {
            fleet,
            inbound,
            config,
        }
    }

    /// Run until the inbound channel closes; hands the roster back for
    /// shutdown inspection
    pub async fn run(mut self) -> Fleet {
        let stale_ms = self.config.stale_timeout.as_millis() as u64;
        let mut sweep = tokio::time::interval(self.config.sweep_interval);

        loop {
            tokio::select! {
                maybe_update = self.inbound.recv() => {
                    match maybe_update {
                        Some(update) => {
                            debug!("inbound update from vehicle {}", update.sid);
                            self.fleet.apply(&update);
                        }
                        None => {
                            info!("inbound channel closed, stopping fleet service");
                            break;
                        }
                    }
                }
                _ = sweep.tick() => {
                    self.fleet.expire_stale(stale_ms);
                }
            }
        }

        self.fleet
    }
}

#[cfg(test)]
mod tests {
    use terralink_shared::VehicleStatus;

    use super::*;
    use crate::testutil::harness;
    use crate::vehicle::VehicleConfig;

    fn service_fixture(
        config: MonitorConfig,
    ) -> (FleetService, mpsc::UnboundedSender<VehicleUpdate>) {
        let fixture = harness();
        let mut fleet = Fleet::new(fixture.services.clone());
        fleet
            .register(VehicleConfig::new(100, ["survey"]).with_status(VehicleStatus::Ready))
            .expect("register");

        let (tx, rx) = mpsc::unbounded_channel();
        (FleetService::new(fleet, rx, config), tx)
    }

    #[tokio::test]
    async fn test_applies_updates_until_channel_closes() {
        let (service, tx) = service_fixture(MonitorConfig::default());
        let running = tokio::spawn(service.run());

        tx.send(
            VehicleUpdate::new(100)
                .with_status(VehicleStatus::Running)
                .with_lat(34.05),
        )
        .expect("send");
        tx.send(VehicleUpdate::new(100).with_lat(34.06)).expect("send");
        drop(tx);

        let fleet = running.await.expect("service task");
        let vehicle = fleet.get(100).expect("vehicle");
        assert_eq!(vehicle.status(), VehicleStatus::Running);
        assert_eq!(vehicle.lat(), 34.06);
    }

    #[tokio::test]
    async fn test_sweep_disconnects_silent_vehicles() {
        let config = MonitorConfig {
            stale_timeout: Duration::from_millis(20),
            sweep_interval: Duration::from_millis(10),
        };
        let (service, tx) = service_fixture(config);
        let running = tokio::spawn(service.run());

        // Long enough for several sweeps past the stale timeout
        tokio::time::sleep(Duration::from_millis(100)).await;
        drop(tx);

        let fleet = running.await.expect("service task");
        assert_eq!(
            fleet.get(100).expect("vehicle").status(),
            VehicleStatus::Disconnected
        );
    }
}
