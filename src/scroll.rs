//! Scroll-position requests for the foreground window.
//!
//! The companion asks for a scroll offset with a [`RecordKind::SCROLL`]
//! record. A system overlay may own the screen when it arrives, so the
//! request goes through the transport's deferred retry slot and is applied
//! once the window is back on top.

use bytes::{BufMut, BytesMut};
use log::warn;

use crate::{
    byte_order::{field, read_wire_i32},
    deferred::{Attempt, DeferredAction},
    record::{Record, RecordError, RecordKind, RecordView},
    router::{Consumer, DispatchContext, KindSet},
};

/// Target offset for the foreground window's scroll layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScrollTo {
    /// Vertical content offset in pixels.
    pub offset_y: i32,
    /// Whether the host should animate the move.
    pub animated: bool,
}

impl ScrollTo {
    /// Decode a scroll payload: an `i32` offset and an optional animation
    /// flag byte.
    ///
    /// # Examples
    ///
    /// ```
    /// use packetlink::scroll::ScrollTo;
    ///
    /// let scroll = ScrollTo::decode(&[0xf6, 0xff, 0xff, 0xff, 1]).expect("valid payload");
    /// assert_eq!(scroll.offset_y, -10);
    /// assert!(scroll.animated);
    /// assert!(!ScrollTo::decode(&[16, 0, 0, 0]).expect("flag optional").animated);
    /// assert!(ScrollTo::decode(&[16, 0]).is_none());
    /// ```
    #[must_use]
    pub fn decode(payload: &[u8]) -> Option<Self> {
        let offset_y = field::<4>(payload, 0).map(read_wire_i32)?;
        let animated = payload.get(4).is_some_and(|flag| *flag != 0);
        Some(Self { offset_y, animated })
    }

    /// Encode the request as a scroll record.
    ///
    /// # Errors
    ///
    /// Propagates [`RecordError`] from record construction.
    pub fn to_record(&self) -> Result<Record, RecordError> {
        let mut payload = BytesMut::with_capacity(5);
        payload.put_i32_le(self.offset_y);
        payload.put_u8(u8::from(self.animated));
        Record::new(RecordKind::SCROLL, payload.freeze())
    }
}

/// Result of trying to scroll the foreground window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollOutcome {
    /// The offset was applied.
    Scrolled,
    /// The foreground window has nothing to scroll; the request is moot.
    NotScrollable,
    /// A host overlay owns the screen; try again later.
    Obscured,
}

/// Window stack collaborator able to scroll the foreground window.
pub trait ScrollTarget: Send {
    /// Apply `request` to the top window if it is reachable.
    fn scroll_top_window(&mut self, request: ScrollTo) -> ScrollOutcome;
}

impl DeferredAction for ScrollTo {
    type Target = dyn ScrollTarget;

    fn attempt(&self, target: &mut Self::Target) -> Attempt {
        match target.scroll_top_window(*self) {
            ScrollOutcome::Scrolled | ScrollOutcome::NotScrollable => Attempt::Applied,
            ScrollOutcome::Obscured => Attempt::Blocked,
        }
    }
}

/// Stand-in target for hosts without scrollable windows.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoScrollTarget;

impl ScrollTarget for NoScrollTarget {
    fn scroll_top_window(&mut self, _request: ScrollTo) -> ScrollOutcome {
        ScrollOutcome::NotScrollable
    }
}

/// Consumer turning scroll records into deferred scroll requests.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScrollConsumer;

impl ScrollConsumer {
    /// Kinds handled by this consumer.
    #[must_use]
    pub fn kinds() -> KindSet { KindSet::list([RecordKind::SCROLL]) }
}

impl Consumer for ScrollConsumer {
    fn handle(&mut self, record: &RecordView<'_>, ctx: &mut DispatchContext) -> bool {
        if record.kind() != RecordKind::SCROLL {
            return false;
        }
        match ScrollTo::decode(record.payload()) {
            Some(scroll) => ctx.request_deferred(scroll),
            None => warn!(
                "ignoring scroll record with {}-byte payload",
                record.payload().len()
            ),
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::deferred::DeferredRequest;

    struct Stack(ScrollOutcome);

    impl ScrollTarget for Stack {
        fn scroll_top_window(&mut self, _request: ScrollTo) -> ScrollOutcome { self.0 }
    }

    #[rstest]
    #[case(ScrollOutcome::Scrolled, Attempt::Applied)]
    #[case(ScrollOutcome::NotScrollable, Attempt::Applied)]
    #[case(ScrollOutcome::Obscured, Attempt::Blocked)]
    fn outcome_maps_to_attempt(#[case] outcome: ScrollOutcome, #[case] expected: Attempt) {
        let scroll = ScrollTo {
            offset_y: 3,
            animated: false,
        };
        let mut stack = Stack(outcome);
        assert_eq!(scroll.attempt(&mut stack), expected);
    }

    #[test]
    fn consumer_requests_deferred_scroll() {
        let scroll = ScrollTo {
            offset_y: 120,
            animated: true,
        };
        let record = scroll.to_record().expect("scroll record");
        let mut ctx = DispatchContext::new();

        assert!(ScrollConsumer.handle(&record.view(), &mut ctx));
        assert_eq!(ctx.deferred(), &[DeferredRequest::Scroll(scroll)]);
    }

    #[test]
    fn consumer_swallows_truncated_scroll_record() {
        let mut ctx = DispatchContext::new();
        let record = RecordView::new(RecordKind::SCROLL, &[1, 2]);
        assert!(ScrollConsumer.handle(&record, &mut ctx));
        assert!(ctx.deferred().is_empty());
    }
}
