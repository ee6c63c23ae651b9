//! Loopback demonstration of `packetlink`.
//!
//! A simulated companion sends device, scroll and application records to a
//! device transport. The device echoes application records back through a
//! channel that refuses every Nth send, segmenting records that exceed the
//! per-send budget. A companion transport on the far side reassembles and
//! counts the echoes.

mod cli;

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use bytes::Bytes;
use clap::Parser;
use packetlink::{
    TransportBuilder,
    TransportConfig,
    device::{DeviceConsumer, DeviceEffects, ImageRecord, LightMode, VibePattern},
    outbound::SendOutcome,
    record::{Record, RecordKind, RecordView, encode_batch},
    router::{Consumer, DispatchContext, KindSet, Router},
    scroll::{ScrollConsumer, ScrollOutcome, ScrollTarget, ScrollTo},
};
use tracing::{info, warn};

struct LoggingEffects;

impl DeviceEffects for LoggingEffects {
    fn vibrate(&mut self, pattern: VibePattern) { info!(?pattern, "vibrate"); }

    fn set_light(&mut self, mode: LightMode) { info!(?mode, "backlight"); }

    fn add_image(&mut self, image: ImageRecord<'_>) {
        info!(
            id = image.id,
            width = image.width,
            height = image.height,
            "image stored"
        );
    }
}

/// Scroll target hidden behind an overlay for a fixed number of checks.
struct SimulatedOverlay {
    remaining: u32,
}

impl ScrollTarget for SimulatedOverlay {
    fn scroll_top_window(&mut self, request: ScrollTo) -> ScrollOutcome {
        if self.remaining > 0 {
            self.remaining -= 1;
            info!(remaining = self.remaining, "overlay blocks scrolling");
            return ScrollOutcome::Obscured;
        }
        info!(offset_y = request.offset_y, "scrolled top window");
        ScrollOutcome::Scrolled
    }
}

fn echo(record: &RecordView<'_>, ctx: &mut DispatchContext) -> bool {
    match Record::new(record.kind(), record.payload().to_vec()) {
        Ok(reply) => ctx.enqueue_outbound(reply),
        Err(e) => warn!(error = %e, "cannot echo record"),
    }
    true
}

struct Counter(Arc<AtomicUsize>);

impl Consumer for Counter {
    fn handle(&mut self, _record: &RecordView<'_>, _ctx: &mut DispatchContext) -> bool {
        self.0.fetch_add(1, Ordering::Relaxed);
        true
    }
}

fn applications() -> KindSet {
    KindSet::range(RecordKind::FIRST_APPLICATION, RecordKind::new(u16::MAX))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Applications embedding the library should install their own subscriber.
    tracing_subscriber::fmt::init();

    let cli = cli::Cli::parse();
    let config = TransportConfig {
        outbound_capacity: cli.outbound_capacity,
        ..TransportConfig::default()
    };

    let echoed = Arc::new(AtomicUsize::new(0));
    let (mut companion, link) = TransportBuilder::new(|_: &[u8]| SendOutcome::Sent)
        .config(config)
        .router(Router::new().route(applications(), Counter(Arc::clone(&echoed))))
        .build()?;

    let busy_every = cli.busy_every;
    let mut attempts = 0_usize;
    let channel = move |batch: &[u8]| {
        attempts += 1;
        if busy_every != 0 && attempts % busy_every == 0 {
            return SendOutcome::Busy;
        }
        match link.try_deliver_inbound(Bytes::copy_from_slice(batch)) {
            Ok(()) => SendOutcome::Sent,
            Err(_) => SendOutcome::Busy,
        }
    };

    let router = Router::new()
        .route(
            DeviceConsumer::<LoggingEffects>::kinds(),
            DeviceConsumer::new(LoggingEffects),
        )
        .route(ScrollConsumer::kinds(), ScrollConsumer)
        .route(applications(), echo);
    let (mut device, device_handle) = TransportBuilder::new(channel)
        .config(config)
        .router(router)
        .scroll_target(SimulatedOverlay {
            remaining: cli.overlay_checks,
        })
        .build()?;

    let companion_task = tokio::spawn(async move { companion.run().await });
    let device_task = tokio::spawn(async move { device.run().await });

    let vibe = Record::new(RecordKind::VIBE, vec![2])?;
    let light = Record::new(RecordKind::LIGHT, vec![2])?;
    let scroll = ScrollTo {
        offset_y: 120,
        animated: true,
    }
    .to_record()?;
    device_handle
        .deliver_inbound(encode_batch([&vibe, &light, &scroll]))
        .await?;

    for index in 0..cli.messages {
        let offset = u16::try_from(index % 16)?;
        let kind = RecordKind::new(RecordKind::FIRST_APPLICATION.get() + offset);
        let payload = vec![u8::try_from(index % 256)?; cli.payload_size];
        let record = Record::new(kind, payload)?;
        device_handle.deliver_inbound(encode_batch([&record])).await?;
    }
    drop(device_handle);

    device_task.await?;
    companion_task.await?;
    info!(
        sent = cli.messages,
        echoed = echoed.load(Ordering::Relaxed),
        "simulation finished"
    );
    Ok(())
}
