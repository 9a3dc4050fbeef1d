//! Mission assignment protocol
//!
//! Hands a vehicle a job, tracks the mission until the vehicle reports
//! `ready` again, and guards against double assignment while one is in
//! flight. The tracking itself is one self-removing status subscriber
//! layered on top of the permanent telemetry handlers.

use serde_json::Value;
use terralink_shared::{CommandMessage, Task, UpdateField, VehicleStatus};
use tracing::{debug, info, warn};

use super::state::{ErrorHook, MissionPhase};
use super::Vehicle;
use crate::telemetry::Retention;

/// Completion hook: fires once, when the terminating `ready` status is
/// observed
pub type CompletionHook = Box<dyn FnOnce() + Send>;

/// Disconnect hook: fires on every `disconnected` status observed while
/// the mission is in flight
pub type DisconnectHook = Box<dyn FnMut() + Send>;

/// Optional observer callbacks for one mission assignment
#[derive(Default)]
pub struct MissionHooks {
    on_complete: Option<CompletionHook>,
    on_disconnect: Option<DisconnectHook>,
    on_error: Option<ErrorHook>,
}

impl MissionHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe mission completion, the first `ready` after assignment
    pub fn on_complete(mut self, hook: impl FnOnce() + Send + 'static) -> Self {
        self.on_complete = Some(Box::new(hook));
        self
    }

    /// Observe vehicle disconnections while the mission is in flight
    pub fn on_disconnect(mut self, hook: impl FnMut() + Send + 'static) -> Self {
        self.on_disconnect = Some(Box::new(hook));
        self
    }

    /// Replace the vehicle's error callback, for this and later missions
    pub fn on_error(mut self, hook: impl FnMut(Option<&str>) + Send + 'static) -> Self {
        self.on_error = Some(Box::new(hook));
        self
    }
}

impl Vehicle {
    /// Assign a mission to this vehicle
    ///
    /// Refused, returning `false` and sending nothing, while a previous
    /// mission is still in flight. Otherwise records the job, sends the
    /// start command, and begins tracking the mission: the next `ready`
    /// status observed from the vehicle completes it, clearing the job
    /// and returning the phase to idle. An error callback in `hooks`
    /// replaces the vehicle's current one; when none is supplied the
    /// existing callback stays in place.
    pub fn assign_mission(
        &mut self,
        job_type: &str,
        options: Option<Value>,
        hooks: MissionHooks,
    ) -> bool {
        if self.state.phase == MissionPhase::Busy {
            warn!(
                "vehicle {}: refusing mission {}, still busy with {:?}",
                self.id, job_type, self.state.assigned_job
            );
            return false;
        }

        self.state.assigned_job = Some(job_type.to_string());
        self.state.phase = MissionPhase::Busy;
        if let Some(hook) = hooks.on_error {
            self.state.error_hook = Some(hook);
        }

        self.send_command(CommandMessage::Start {
            job_type: job_type.to_string(),
            options,
        });

        // Track the mission with one extra status subscriber. It outlives
        // disconnections: only an observed `ready` ends the mission and
        // removes the subscription.
        let mut on_complete = hooks.on_complete;
        let mut on_disconnect = hooks.on_disconnect;
        self.dispatcher
            .subscribe(UpdateField::Status, move |state, value, _| {
                match value.as_status() {
                    Some(VehicleStatus::Ready) => {
                        if let Some(hook) = on_complete.take() {
                            hook();
                        }
                        state.assigned_job = None;
                        state.phase = MissionPhase::Idle;
                        Retention::Remove
                    }
                    Some(VehicleStatus::Disconnected) => {
                        if let Some(hook) = on_disconnect.as_mut() {
                            hook();
                        }
                        Retention::Keep
                    }
                    _ => Retention::Keep,
                }
            });

        info!("vehicle {}: mission assigned (job {})", self.id, job_type);
        true
    }

    /// Issue one task under the assigned job
    ///
    /// Refused, returning `false` and sending nothing, unless a mission is
    /// in flight and the job catalog permits the task under the assigned
    /// job.
    pub fn add_mission(&mut self, task: Task) -> bool {
        if self.state.phase != MissionPhase::Busy {
            debug!(
                "vehicle {}: refusing task {}, no mission in flight",
                self.id, task.kind
            );
            return false;
        }

        // A stopped vehicle is still busy but has no job anymore; nothing
        // can be issued until it reports ready and a new mission starts
        let Some(job) = self.state.assigned_job.as_deref() else {
            debug!(
                "vehicle {}: refusing task {}, mission was stopped",
                self.id, task.kind
            );
            return false;
        };

        if !self.catalog.permits(job, &task) {
            warn!(
                "vehicle {}: task {} not permitted under job {}",
                self.id, task.kind, job
            );
            return false;
        }

        self.send_command(CommandMessage::AddMission { mission_info: task });
        true
    }

    /// Stop the vehicle unconditionally and clear the assigned job
    ///
    /// Leaves the mission phase busy on purpose: the mission only ends
    /// when the vehicle is observed back at `ready`, and the completion
    /// hook still fires at that point.
    pub fn stop(&mut self) {
        self.send_command(CommandMessage::Stop);
        self.state.assigned_job = None;
        info!("vehicle {}: stop sent", self.id);
    }
}
