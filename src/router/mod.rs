//! Routing of complete records to the consumers that own their kinds.
//!
//! A [`Router`] holds routes in priority order. Each route claims a set of
//! record kinds and wraps a [`Consumer`]. Dispatch offers a record to every
//! route claiming its kind, in order, until one consumer reports that it
//! handled the record. Records nobody handles are not errors; they leave
//! room for newer companions to send kinds this build does not know.

use std::{fmt, ops::RangeInclusive};

use crate::{
    deferred::DeferredRequest,
    record::{Record, RecordKind, RecordView},
};

/// Side effects requested by consumers while handling a record.
///
/// Consumers never touch the transport internals. They leave outbound
/// records and deferred action requests here and the transport applies them
/// in order once the consumer returns.
#[derive(Debug, Default)]
pub struct DispatchContext {
    outbound: Vec<Record>,
    deferred: Vec<DeferredRequest>,
}

impl DispatchContext {
    /// Create an empty context.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Queue `record` for transmission to the companion.
    pub fn enqueue_outbound(&mut self, record: Record) { self.outbound.push(record); }

    /// Ask for an action that may have to wait for the foreground.
    pub fn request_deferred(&mut self, request: impl Into<DeferredRequest>) {
        self.deferred.push(request.into());
    }

    /// Outbound records requested so far.
    #[must_use]
    pub fn outbound(&self) -> &[Record] { &self.outbound }

    /// Deferred requests made so far.
    #[must_use]
    pub fn deferred(&self) -> &[DeferredRequest] { &self.deferred }

    pub(crate) fn take_outbound(&mut self) -> Vec<Record> { std::mem::take(&mut self.outbound) }

    pub(crate) fn take_deferred(&mut self) -> Vec<DeferredRequest> {
        std::mem::take(&mut self.deferred)
    }
}

/// Handler for the records of the kinds it owns.
///
/// Closures of the form
/// `FnMut(&RecordView<'_>, &mut DispatchContext) -> bool` implement the trait
/// directly.
pub trait Consumer: Send {
    /// Handle `record`, returning `true` if it was consumed.
    fn handle(&mut self, record: &RecordView<'_>, ctx: &mut DispatchContext) -> bool;
}

impl<F> Consumer for F
where
    F: FnMut(&RecordView<'_>, &mut DispatchContext) -> bool + Send,
{
    fn handle(&mut self, record: &RecordView<'_>, ctx: &mut DispatchContext) -> bool {
        self(record, ctx)
    }
}

/// Record kinds claimed by a route.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KindSet {
    /// A contiguous, inclusive range of kinds.
    Range(RangeInclusive<u16>),
    /// An explicit list of kinds.
    List(Vec<RecordKind>),
    /// Every kind.
    Any,
}

impl KindSet {
    /// Claim the kinds from `first` to `last` inclusive.
    #[must_use]
    pub fn range(first: RecordKind, last: RecordKind) -> Self {
        Self::Range(first.get()..=last.get())
    }

    /// Claim an explicit list of kinds.
    #[must_use]
    pub fn list(kinds: impl IntoIterator<Item = RecordKind>) -> Self {
        Self::List(kinds.into_iter().collect())
    }

    /// Report whether `kind` is claimed.
    ///
    /// # Examples
    ///
    /// ```
    /// use packetlink::{record::RecordKind, router::KindSet};
    ///
    /// let set = KindSet::range(RecordKind::new(20), RecordKind::new(29));
    /// assert!(set.contains(RecordKind::new(29)));
    /// assert!(!set.contains(RecordKind::new(30)));
    /// ```
    #[must_use]
    pub fn contains(&self, kind: RecordKind) -> bool {
        match self {
            Self::Range(range) => range.contains(&kind.get()),
            Self::List(kinds) => kinds.contains(&kind),
            Self::Any => true,
        }
    }
}

struct Route {
    kinds: KindSet,
    consumer: Box<dyn Consumer>,
}

/// Ordered table of consumer routes.
///
/// # Examples
///
/// ```
/// use packetlink::{
///     record::{RecordKind, RecordView},
///     router::{DispatchContext, KindSet, Router},
/// };
///
/// fn accept_all(_record: &RecordView<'_>, _ctx: &mut DispatchContext) -> bool { true }
///
/// let mut router = Router::new().route(KindSet::list([RecordKind::new(20)]), accept_all);
/// let mut ctx = DispatchContext::new();
/// assert!(router.dispatch(&RecordView::new(RecordKind::new(20), &[]), &mut ctx));
/// assert!(!router.dispatch(&RecordView::new(RecordKind::new(21), &[]), &mut ctx));
/// ```
#[derive(Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    /// Create a router without routes.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Append a route with lower priority than every existing one.
    #[must_use]
    pub fn route(mut self, kinds: KindSet, consumer: impl Consumer + 'static) -> Self {
        self.routes.push(Route {
            kinds,
            consumer: Box::new(consumer),
        });
        self
    }

    /// Offer `record` to the routes claiming its kind until one handles it.
    ///
    /// Returns `false` if no consumer handled the record.
    pub fn dispatch(&mut self, record: &RecordView<'_>, ctx: &mut DispatchContext) -> bool {
        self.routes
            .iter_mut()
            .filter(|route| route.kinds.contains(record.kind()))
            .any(|route| route.consumer.handle(record, ctx))
    }

    /// Number of registered routes.
    #[must_use]
    pub fn len(&self) -> usize { self.routes.len() }

    /// Report whether no routes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.routes.is_empty() }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.routes.iter().map(|route| &route.kinds))
            .finish()
    }
}
