//! Record kind tags.

use std::fmt;

/// Tag identifying the shape and owner of a record.
///
/// The transport reserves a handful of kinds for itself and the built-in
/// consumers. Applications allocate their own kinds from
/// [`RecordKind::FIRST_APPLICATION`] upwards.
///
/// # Examples
///
/// ```
/// use packetlink::record::RecordKind;
///
/// let kind = RecordKind::new(42);
/// assert!(kind.is_application());
/// assert!(!RecordKind::SEGMENT.is_application());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordKind(u16);

impl RecordKind {
    /// Fragment of a logical message that did not fit one transmission.
    pub const SEGMENT: Self = Self(1);
    /// Request to move the scroll position of the foreground window.
    pub const SCROLL: Self = Self(2);
    /// Vibration pattern.
    pub const VIBE: Self = Self(3);
    /// Backlight control.
    pub const LIGHT: Self = Self(4);
    /// Raw image resource.
    pub const IMAGE: Self = Self(5);
    /// First kind available to application consumers.
    pub const FIRST_APPLICATION: Self = Self(16);

    /// Wrap a raw tag.
    #[must_use]
    pub const fn new(raw: u16) -> Self { Self(raw) }

    /// Return the raw tag value.
    #[must_use]
    pub const fn get(self) -> u16 { self.0 }

    /// Report whether the kind lies in the application range.
    #[must_use]
    pub const fn is_application(self) -> bool { self.0 >= Self::FIRST_APPLICATION.0 }
}

impl From<u16> for RecordKind {
    fn from(raw: u16) -> Self { Self(raw) }
}

impl From<RecordKind> for u16 {
    fn from(kind: RecordKind) -> Self { kind.0 }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}
