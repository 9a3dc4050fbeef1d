//! Shared fixtures for unit tests

use std::sync::Arc;

use terralink_shared::CommandEnvelope;
use tokio::sync::mpsc;

use crate::bridge::{ChannelCommandSink, Notice, NoticeSender};
use crate::catalog::StaticJobCatalog;
use crate::directory::StaticDirectory;
use crate::vehicle::Services;

/// A service bundle plus the capture ends of its outbound channels
pub struct Harness {
    pub services: Services,
    pub commands: mpsc::UnboundedReceiver<CommandEnvelope>,
    pub notices: mpsc::UnboundedReceiver<Notice>,
}

/// Services wired to capture channels, with a small fixed catalog and
/// directory
pub fn harness() -> Harness {
    let (command_sink, commands) = ChannelCommandSink::channel();
    let (notice_sender, notices) = NoticeSender::channel();

    let mut catalog = StaticJobCatalog::new();
    catalog.insert("survey", ["takeoff", "loiter", "land"]);
    catalog.insert("delivery", ["takeoff", "payloadDrop", "land"]);

    let mut directory = StaticDirectory::new();
    directory.insert(100, "Scout 1", "quadcopter");
    directory.insert(200, "Scout 2", "quadcopter");

    Harness {
        services: Services {
            commands: command_sink,
            notices: notice_sender,
            catalog: Arc::new(catalog),
            directory: Arc::new(directory),
        },
        commands,
        notices,
    }
}

/// Everything currently queued on a capture channel
pub fn drain<T>(rx: &mut mpsc::UnboundedReceiver<T>) -> Vec<T> {
    let mut items = Vec::new();
    while let Ok(item) = rx.try_recv() {
        items.push(item);
    }
    items
}
