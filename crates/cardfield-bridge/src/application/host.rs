//! Host-side identities and the outbound event channel.

use std::fmt;
use std::sync::Arc;

use cardfield_core::domain::style::FontResolver;
use cardfield_core::protocol::events::HostEvent;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of one mounted card field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(Uuid);

impl ComponentId {
    /// Generates a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ComponentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Delivers component events to the host runtime.
///
/// Implementations must not block; emission happens on the UI thread.
pub trait HostEventSink: Send + Sync {
    fn emit(&self, source: ComponentId, event: HostEvent);
}

/// Collaborators shared by every component a registry creates.
#[derive(Clone)]
pub struct SurfaceContext {
    pub sink: Arc<dyn HostEventSink>,
    pub fonts: Arc<dyn FontResolver + Send + Sync>,
}
