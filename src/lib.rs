//! Packet transport for a remote-UI device link.
//!
//! A companion process drives the device by sending small typed binary
//! records. This crate frames and validates those records, reassembles
//! segmented messages, routes records to consumers, coalesces outbound
//! records into transport-sized batches with exponential back-off, and
//! retries UI actions the host transiently blocks.
//!
//! Start with [`TransportBuilder`]:
//!
//! ```
//! use packetlink::{
//!     TransportBuilder,
//!     outbound::SendOutcome,
//!     record::{Record, RecordKind, RecordView, encode_batch},
//!     router::{DispatchContext, KindSet, Router},
//! };
//!
//! fn pong(record: &RecordView<'_>, ctx: &mut DispatchContext) -> bool {
//!     let reply = Record::new(RecordKind::new(17), record.payload().to_vec());
//!     reply.map(|reply| ctx.enqueue_outbound(reply)).is_ok()
//! }
//!
//! let router = Router::new().route(KindSet::list([RecordKind::new(16)]), pong);
//! let (mut transport, _handle) = TransportBuilder::new(|_: &[u8]| SendOutcome::Sent)
//!     .router(router)
//!     .build()
//!     .expect("valid configuration");
//!
//! let ping = Record::new(RecordKind::new(16), vec![1]).expect("small record");
//! transport.on_inbound_batch(&encode_batch([&ping]));
//! assert_eq!(transport.outbound().len(), 1);
//! ```

pub mod byte_order;
pub mod config;
pub mod deferred;
pub mod device;
pub mod hooks;
pub mod metrics;
pub mod outbound;
pub mod record;
pub mod router;
pub mod scroll;
pub mod segment;
pub mod timer;
pub mod transport;

pub use config::{ConfigError, TransportConfig};
pub use hooks::{NoopHooks, TransportHooks};
pub use metrics::Direction;
pub use record::{Record, RecordError, RecordKind, RecordView};
pub use transport::{Transport, TransportBuilder, TransportError, TransportHandle};
