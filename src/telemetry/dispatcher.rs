//! Field-keyed update dispatch
//!
//! Every inbound [`VehicleUpdate`] is fanned out field by field: each
//! telemetry field has its own ordered list of subscribers, and a message
//! carrying several fields walks those lists one field at a time. Handlers
//! decide their own lifetime, a subscriber stays registered until it asks
//! to be removed.

use std::collections::HashMap;

use terralink_shared::{FieldValue, UpdateField, VehicleUpdate};
use tracing::trace;

/// What a field handler wants done with its subscription after running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retention {
    /// Stay subscribed for future dispatches
    Keep,
    /// Unsubscribe now; the handler will not run again
    Remove,
}

/// A subscriber for one update field
///
/// Receives mutable access to the dispatch context plus the field's new
/// value and the full update it arrived in.
pub type FieldHandler<C> = Box<dyn FnMut(&mut C, &FieldValue, &VehicleUpdate) -> Retention + Send>;

/// Ordered multi-subscriber registry keyed by update field
///
/// Handlers for a field run in registration order and fire once per
/// dispatched update that carries the field. Handlers mutate only the
/// context `C`, never the dispatcher itself, so a dispatch pass cannot be
/// re-entered by its own subscribers.
pub struct UpdateDispatcher<C> {
    handlers: HashMap<UpdateField, Vec<FieldHandler<C>>>,
}

impl<C> UpdateDispatcher<C> {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Subscribe a handler to one field
    ///
    /// Duplicate subscriptions are allowed and fire independently.
    pub fn subscribe<F>(&mut self, field: UpdateField, handler: F)
    where
        F: FnMut(&mut C, &FieldValue, &VehicleUpdate) -> Retention + Send + 'static,
    {
        self.handlers
            .entry(field)
            .or_default()
            .push(Box::new(handler));
    }

    /// Number of live subscriptions for a field
    pub fn subscriber_count(&self, field: UpdateField) -> usize {
        self.handlers.get(&field).map_or(0, Vec::len)
    }

    /// Fan an update out to every subscriber of every field it carries
    ///
    /// Handlers run synchronously and to completion before this returns.
    /// A handler returning [`Retention::Remove`] is dropped in place; the
    /// handlers after it still run in this same pass, in their original
    /// order. Fields with no subscribers are skipped silently.
    pub fn dispatch(&mut self, ctx: &mut C, update: &VehicleUpdate) {
        for (field, value) in update.fields() {
            let Some(entries) = self.handlers.get_mut(&field) else {
                continue;
            };

            trace!("dispatching {} to {} subscriber(s)", field, entries.len());
            entries.retain_mut(|handler| handler(ctx, &value, update) == Retention::Keep);
        }
    }
}

impl<C> Default for UpdateDispatcher<C> {
    fn default() -> Self {
        Self::new()
    }
}
