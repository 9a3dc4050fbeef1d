mod bridge;
mod catalog;
mod directory;
mod fleet;
mod telemetry;
#[cfg(test)]
mod testutil;
mod vehicle;

use std::sync::Arc;

use anyhow::Result;
use terralink_shared::VehicleUpdate;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use bridge::{ChannelCommandSink, NoticeSender, Severity};
use catalog::StaticJobCatalog;
use directory::{StaticDirectory, VehicleDirectory};
use fleet::{Fleet, FleetService, MonitorConfig};
use vehicle::{Services, VehicleConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    info!("Ground station core starting");

    // Outbound side: commands stream to the transport bridge, notices to
    // the operator feed. This binary logs both; the full application hands
    // them to the radio link and the UI process instead.
    let (command_sink, mut command_rx) = ChannelCommandSink::channel();
    let (notices, mut notice_rx) = NoticeSender::channel();

    let mut catalog = StaticJobCatalog::new();
    catalog.insert("survey", ["takeoff", "loiter", "land"]);
    catalog.insert("delivery", ["takeoff", "payloadDrop", "land"]);

    let mut directory = StaticDirectory::new();
    directory.insert(100, "Scout 1", "quadcopter");
    directory.insert(200, "Scout 2", "quadcopter");
    directory.insert(400, "Hauler 1", "hexacopter");
    let directory = Arc::new(directory);

    let services = Services {
        commands: command_sink,
        notices: notices.clone(),
        catalog: Arc::new(catalog),
        directory: directory.clone(),
    };

    let mut fleet = Fleet::new(services);
    for (id, jobs) in [(100, "survey"), (200, "survey"), (400, "delivery")] {
        fleet.register(VehicleConfig::new(id, [jobs]))?;
        if let Some(info) = directory.entry(id) {
            info!("tracking vehicle {}: {} ({})", id, info.name, info.kind);
        }
    }
    let vehicle_count = fleet.count();

    tokio::spawn(async move {
        while let Some(envelope) = command_rx.recv().await {
            info!(
                "[OUT] vehicle {} <- {}",
                envelope.target,
                envelope.message.label()
            );
        }
    });

    tokio::spawn(async move {
        while let Some(notice) = notice_rx.recv().await {
            info!("[NOTICE] {}: {}", notice.severity.label(), notice.text);
        }
    });

    // Inbound updates arrive here; the transport/IPC bridge owns the
    // sender in the full application
    let (update_tx, update_rx) = mpsc::unbounded_channel::<VehicleUpdate>();

    let service = FleetService::new(fleet, update_rx, MonitorConfig::default());
    let service_task = tokio::spawn(service.run());

    notices.post(
        Severity::Info,
        format!("Ground station core online, tracking {vehicle_count} vehicles"),
    );

    tokio::signal::ctrl_c().await?;
    info!("shutdown requested");

    // Closing the inbound channel lets the service drain and hand the
    // roster back
    drop(update_tx);
    let fleet = service_task.await?;
    for snapshot in fleet.snapshots() {
        info!(
            "final state: vehicle {} {} at ({:.6}, {:.6})",
            snapshot.vehicle_id, snapshot.status, snapshot.lat, snapshot.lng
        );
    }

    Ok(())
}
