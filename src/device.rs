//! Consumer for the records that drive device hardware.
//!
//! Vibration, backlight and image records are decoded into typed values and
//! forwarded to a [`DeviceEffects`] collaborator supplied by the host. The
//! consumer validates payload shapes; the hardware calls themselves live
//! outside this crate.

use log::warn;

use crate::{
    byte_order::{field, read_wire_i16, read_wire_u16, read_wire_u32},
    record::{RecordKind, RecordView},
    router::{Consumer, DispatchContext, KindSet},
};

/// Vibration pattern requested by a [`RecordKind::VIBE`] record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VibePattern {
    /// One short pulse.
    Short,
    /// One long pulse.
    Long,
    /// Two short pulses.
    Double,
}

impl VibePattern {
    /// Decode the one-byte pattern tag.
    #[must_use]
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Short),
            1 => Some(Self::Long),
            2 => Some(Self::Double),
            _ => None,
        }
    }
}

/// Backlight mode requested by a [`RecordKind::LIGHT`] record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LightMode {
    /// Keep the light on.
    On,
    /// Return to the system's automatic behaviour.
    Auto,
    /// Flash the light as if the user interacted.
    Trigger,
}

impl LightMode {
    /// Decode the one-byte mode tag.
    #[must_use]
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::On),
            1 => Some(Self::Auto),
            2 => Some(Self::Trigger),
            _ => None,
        }
    }
}

/// Raw image carried by a [`RecordKind::IMAGE`] record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageRecord<'a> {
    /// Resource identifier the image is stored under.
    pub id: u32,
    /// Width in pixels.
    pub width: i16,
    /// Height in pixels.
    pub height: i16,
    /// Pixel data, exactly as declared by the record.
    pub pixels: &'a [u8],
}

impl<'a> ImageRecord<'a> {
    /// Bytes preceding the pixel data.
    pub const HEADER_SIZE: usize = 10;

    /// Decode an image payload.
    ///
    /// Returns `None` when the header is truncated or the declared pixel
    /// length runs past the payload.
    ///
    /// # Examples
    ///
    /// ```
    /// use packetlink::device::ImageRecord;
    ///
    /// let payload = [7, 0, 0, 0, 2, 0, 1, 0, 2, 0, 0xaa, 0xbb];
    /// let image = ImageRecord::decode(&payload).expect("valid image");
    /// assert_eq!((image.id, image.width, image.height), (7, 2, 1));
    /// assert_eq!(image.pixels, &[0xaa, 0xbb]);
    ///
    /// assert!(ImageRecord::decode(&payload[..11]).is_none());
    /// ```
    #[must_use]
    pub fn decode(payload: &'a [u8]) -> Option<Self> {
        let id = field::<4>(payload, 0).map(read_wire_u32)?;
        let width = field::<2>(payload, 4).map(read_wire_i16)?;
        let height = field::<2>(payload, 6).map(read_wire_i16)?;
        let pixels_len = usize::from(field::<2>(payload, 8).map(read_wire_u16)?);
        let pixels = payload.get(Self::HEADER_SIZE..Self::HEADER_SIZE + pixels_len)?;
        Some(Self {
            id,
            width,
            height,
            pixels,
        })
    }
}

/// Host hardware driven by device records.
pub trait DeviceEffects: Send {
    /// Run a vibration pattern.
    fn vibrate(&mut self, pattern: VibePattern);
    /// Change the backlight mode.
    fn set_light(&mut self, mode: LightMode);
    /// Store an image resource.
    fn add_image(&mut self, image: ImageRecord<'_>);
}

/// Consumer decoding vibe, light and image records.
#[derive(Debug)]
pub struct DeviceConsumer<E> {
    effects: E,
}

impl<E: DeviceEffects> DeviceConsumer<E> {
    /// Wrap the host's hardware collaborator.
    #[must_use]
    pub fn new(effects: E) -> Self { Self { effects } }

    /// Kinds handled by this consumer.
    #[must_use]
    pub fn kinds() -> KindSet { KindSet::range(RecordKind::VIBE, RecordKind::IMAGE) }

    /// Borrow the wrapped collaborator.
    pub fn effects(&self) -> &E { &self.effects }
}

impl<E: DeviceEffects> Consumer for DeviceConsumer<E> {
    fn handle(&mut self, record: &RecordView<'_>, _ctx: &mut DispatchContext) -> bool {
        let payload = record.payload();
        match record.kind() {
            RecordKind::VIBE => {
                match payload.first().copied().and_then(VibePattern::from_tag) {
                    Some(pattern) => self.effects.vibrate(pattern),
                    None => warn!("ignoring vibe record with unknown pattern: {payload:?}"),
                }
                true
            }
            RecordKind::LIGHT => {
                match payload.first().copied().and_then(LightMode::from_tag) {
                    Some(mode) => self.effects.set_light(mode),
                    None => warn!("ignoring light record with unknown mode: {payload:?}"),
                }
                true
            }
            RecordKind::IMAGE => {
                match ImageRecord::decode(payload) {
                    Some(image) => self.effects.add_image(image),
                    None => warn!("ignoring malformed image record of {} bytes", payload.len()),
                }
                true
            }
            _ => false,
        }
    }
}
