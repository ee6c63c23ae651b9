//! End-to-end tests running a device transport against a companion
//! transport over a loopback channel.

mod common;

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use bytes::Bytes;
use common::{Offered, Recorder, Seen, flaky_channel, record};
use packetlink::{
    RecordKind,
    RecordView,
    TransportBuilder,
    TransportConfig,
    device::{DeviceConsumer, DeviceEffects, ImageRecord, LightMode, VibePattern},
    outbound::SendOutcome,
    record::{encode_batch, split_batch},
    router::{DispatchContext, KindSet, Router},
};
use rstest::rstest;

fn echo(record: &RecordView<'_>, ctx: &mut DispatchContext) -> bool {
    ctx.enqueue_outbound(record.to_record());
    true
}

fn applications() -> KindSet {
    KindSet::range(RecordKind::FIRST_APPLICATION, RecordKind::new(u16::MAX))
}

/// Run a device echoing every application record to a companion through a
/// channel refusing every `busy_every`th send. Returns what the companion
/// received and every batch the channel was offered.
async fn echo_through_loopback(
    config: TransportConfig,
    busy_every: usize,
    inbound: Vec<Bytes>,
) -> (Vec<(u16, Vec<u8>)>, Vec<Vec<u8>>) {
    let seen = Seen::default();
    let offered = Offered::default();
    let (mut companion, link) = TransportBuilder::new(|_: &[u8]| SendOutcome::Sent)
        .config(config)
        .router(Router::new().route(KindSet::Any, Recorder(Arc::clone(&seen))))
        .build()
        .expect("build companion");

    let channel = flaky_channel(busy_every, &offered, move |batch: &[u8]| {
        match link.try_deliver_inbound(Bytes::copy_from_slice(batch)) {
            Ok(()) => SendOutcome::Sent,
            Err(_) => SendOutcome::Busy,
        }
    });
    let (mut device, handle) = TransportBuilder::new(channel)
        .config(config)
        .router(Router::new().route(applications(), echo))
        .build()
        .expect("build device");

    let companion_task = tokio::spawn(async move { companion.run().await });
    let device_task = tokio::spawn(async move { device.run().await });
    for batch in inbound {
        handle.deliver_inbound(batch).await.expect("deliver to device");
    }
    drop(handle);
    device_task.await.expect("join device");
    companion_task.await.expect("join companion");

    let seen = seen.lock().expect("seen lock").clone();
    let offered = offered.lock().expect("offered lock").clone();
    (seen, offered)
}

#[rstest]
#[case::reliable(0)]
#[case::every_second_send_refused(2)]
#[case::every_third_send_refused(3)]
#[tokio::test(start_paused = true)]
async fn small_records_arrive_once_and_in_order(#[case] busy_every: usize) {
    let records: Vec<_> = (0..20_u8).map(|i| record(16 + u16::from(i % 4), vec![i; 40])).collect();
    let inbound = records.iter().map(|r| encode_batch([r])).collect();

    let (seen, _) = echo_through_loopback(TransportConfig::default(), busy_every, inbound).await;

    let expected: Vec<_> = records
        .iter()
        .map(|r| (r.kind().get(), r.payload().to_vec()))
        .collect();
    assert_eq!(seen, expected);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn small_records_are_coalesced_within_the_budget() {
    let config = TransportConfig {
        outbound_capacity: 214,
        ..TransportConfig::default()
    };
    let records: Vec<_> = (0..10_u8).map(|i| record(16, vec![i; 46])).collect();
    let inbound = vec![encode_batch(&records)];

    let (seen, offered) = echo_through_loopback(config, 0, inbound).await;

    assert_eq!(seen.len(), 10);
    let sizes: Vec<_> = offered.iter().map(Vec::len).collect();
    assert_eq!(sizes, vec![200, 200, 100]);
}

#[rstest]
#[case::all_zero(0x00)]
#[case::all_ones(0xff)]
#[tokio::test(start_paused = true)]
async fn large_records_survive_segmentation_and_refusals(#[case] fill: u8) {
    let config = TransportConfig {
        outbound_capacity: 128,
        ..TransportConfig::default()
    };
    let large = record(40, vec![fill; 1500]);
    let small = record(41, b"after".to_vec());
    let inbound = vec![encode_batch([&large]), encode_batch([&small])];

    let (seen, offered) = echo_through_loopback(config, 3, inbound).await;

    assert_eq!(
        seen,
        vec![(40, vec![fill; 1500]), (41, b"after".to_vec())]
    );
    for batch in &offered {
        assert!(batch.len() <= config.send_budget());
        split_batch(batch).expect("well-formed outbound batch");
    }
}

#[derive(Clone, Default)]
struct Panel {
    log: Arc<Mutex<Vec<String>>>,
}

impl DeviceEffects for Panel {
    fn vibrate(&mut self, pattern: VibePattern) {
        self.log.lock().expect("panel lock").push(format!("vibe {pattern:?}"));
    }

    fn set_light(&mut self, mode: LightMode) {
        self.log.lock().expect("panel lock").push(format!("light {mode:?}"));
    }

    fn add_image(&mut self, image: ImageRecord<'_>) {
        self.log
            .lock()
            .expect("panel lock")
            .push(format!("image {} {}x{}", image.id, image.width, image.height));
    }
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn device_records_reach_effects_in_order() {
    let panel = Panel::default();
    let (mut device, handle) = TransportBuilder::new(|_: &[u8]| SendOutcome::Sent)
        .router(Router::new().route(
            DeviceConsumer::<Panel>::kinds(),
            DeviceConsumer::new(panel.clone()),
        ))
        .build()
        .expect("build device");
    let task = tokio::spawn(async move { device.run().await });

    let image = [9, 0, 0, 0, 2, 0, 2, 0, 4, 0, 1, 2, 3, 4];
    handle
        .deliver_inbound(encode_batch(&[
            record(RecordKind::LIGHT.get(), vec![0]),
            record(RecordKind::IMAGE.get(), image.to_vec()),
            record(RecordKind::VIBE.get(), vec![1]),
        ]))
        .await
        .expect("deliver");
    drop(handle);
    tokio::time::timeout(Duration::from_secs(1), task)
        .await
        .expect("transport drains")
        .expect("join device");

    assert_eq!(
        *panel.log.lock().expect("panel lock"),
        vec!["light On", "image 9 2x2", "vibe Long"]
    );
}
