//! Callbacks the transport invokes on link-level events.
//!
//! [`TransportHooks`] lets the host observe conditions the transport handles
//! internally: losing the companion, and records no consumer claimed. Every
//! method has a no-op default so implementations override only what they
//! need.

use crate::record::RecordKind;

/// Host callbacks invoked from the transport task.
///
/// ```
/// use std::sync::{
///     Arc,
///     atomic::{AtomicUsize, Ordering},
/// };
///
/// use packetlink::{hooks::TransportHooks, record::RecordKind};
///
/// struct CountUnhandled(Arc<AtomicUsize>);
///
/// impl TransportHooks for CountUnhandled {
///     fn on_unhandled_record(&mut self, _kind: RecordKind) {
///         self.0.fetch_add(1, Ordering::Relaxed);
///     }
/// }
/// ```
pub trait TransportHooks: Send {
    /// The channel reported that the companion is no longer reachable.
    fn on_connectivity_lost(&mut self) {}

    /// No consumer claimed a record of `kind`.
    fn on_unhandled_record(&mut self, _kind: RecordKind) {}
}

/// Hooks that ignore every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopHooks;

impl TransportHooks for NoopHooks {}
