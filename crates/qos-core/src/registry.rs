//! Callback Registry
//!
//! Id-keyed container of client-registered filter capabilities. Like the
//! session store, it is owned by the tracker worker task and therefore
//! lock-free. Filters are opaque trait objects and are never mutated.

use std::collections::HashMap;
use std::sync::Arc;

use crate::filter::QosFilter;
use crate::session::CallbackId;

#[derive(Default)]
pub struct CallbackRegistry {
    callbacks: HashMap<CallbackId, Arc<dyn QosFilter>>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        callback_id: CallbackId,
        filter: Arc<dyn QosFilter>,
    ) -> Option<Arc<dyn QosFilter>> {
        self.callbacks.insert(callback_id, filter)
    }

    /// Remove a registration. Unknown ids are a no-op, not an error.
    pub fn remove(&mut self, callback_id: &CallbackId) -> Option<Arc<dyn QosFilter>> {
        self.callbacks.remove(callback_id)
    }

    pub fn get(&self, callback_id: &CallbackId) -> Option<&Arc<dyn QosFilter>> {
        self.callbacks.get(callback_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (CallbackId, &Arc<dyn QosFilter>)> {
        self.callbacks.iter().map(|(id, filter)| (*id, filter))
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}
