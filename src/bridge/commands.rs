//! Outbound command handoff

use std::sync::Arc;

use terralink_shared::CommandEnvelope;
use tokio::sync::mpsc;
use tracing::warn;

/// Outbound command handoff to the transport layer
///
/// Vehicles hold a shared sink and hand commands off fire-and-forget.
/// Delivery (and any retry policy) belongs to the transport behind the
/// sink; a vehicle never waits on a send.
pub trait CommandSink: Send + Sync {
    /// Hand one addressed command to the transport
    fn send(&self, envelope: CommandEnvelope);
}

/// Channel-backed sink
///
/// Commands land on an unbounded queue that the transport bridge drains at
/// its own pace.
pub struct ChannelCommandSink {
    tx: mpsc::UnboundedSender<CommandEnvelope>,
}

impl ChannelCommandSink {
    /// Create the sink plus the receiving end for the transport bridge
    pub fn channel() -> (Arc<Self>, mpsc::UnboundedReceiver<CommandEnvelope>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { tx }), rx)
    }
}

impl CommandSink for ChannelCommandSink {
    fn send(&self, envelope: CommandEnvelope) {
        if let Err(err) = self.tx.send(envelope) {
            // Bridge has shut down; sends are fire-and-forget by contract
            warn!(
                "transport bridge closed, dropping {} command for vehicle {}",
                err.0.message.label(),
                err.0.target
            );
        }
    }
}
