//! Tests for outbound coalescing and back-off.

use std::time::Duration;

use rstest::rstest;

use super::{BackoffConfig, CoalescingQueue, OutboundError, SendOutcome};
use crate::{
    record::{Record, RecordKind, split_batch},
    timer::TimerCommand,
};

const BASE: Duration = Duration::from_millis(10);

/// Channel double that refuses the first `busy` attempts.
#[derive(Default)]
struct ScriptedChannel {
    busy: usize,
    attempts: usize,
    sent: Vec<Vec<u8>>,
}

impl super::Channel for ScriptedChannel {
    fn send(&mut self, batch: &[u8]) -> SendOutcome {
        self.attempts += 1;
        if self.busy > 0 {
            self.busy -= 1;
            return SendOutcome::Busy;
        }
        self.sent.push(batch.to_vec());
        SendOutcome::Sent
    }
}

fn queue(budget: usize) -> CoalescingQueue {
    CoalescingQueue::new(
        budget,
        BackoffConfig {
            initial_delay: BASE,
            max_delay: Duration::from_secs(60),
        },
    )
}

/// Record whose encoded size is exactly `len` bytes.
fn sized_record(id: u8, len: usize) -> Record {
    Record::new(RecordKind::new(u16::from(id) + 16), vec![id; len - 4]).expect("record fits")
}

fn drain(queue: &mut CoalescingQueue, channel: &mut ScriptedChannel) {
    for _ in 0..64 {
        if queue.on_timer_fire(channel) == TimerCommand::Cancel {
            return;
        }
    }
    panic!("queue did not drain");
}

fn sent_ids(channel: &ScriptedChannel) -> Vec<Vec<u8>> {
    channel
        .sent
        .iter()
        .map(|batch| {
            split_batch(batch)
                .expect("valid batch")
                .iter()
                .map(|view| view.payload()[0])
                .collect()
        })
        .collect()
}

#[test]
fn first_enqueue_arms_base_timer_and_later_ones_keep_it() {
    let mut queue = queue(100);
    assert_eq!(
        queue.enqueue(sized_record(1, 10)).expect("fits"),
        TimerCommand::Arm(BASE)
    );
    assert_eq!(
        queue.enqueue(sized_record(2, 10)).expect("fits"),
        TimerCommand::Keep
    );
    assert_eq!(queue.len(), 2);
}

#[test]
fn records_under_budget_share_one_send() {
    let mut queue = queue(100);
    let mut channel = ScriptedChannel::default();
    for id in 1..=3 {
        queue.enqueue(sized_record(id, 24)).expect("fits");
    }
    queue.enqueue(sized_record(4, 28)).expect("fits");

    assert_eq!(queue.on_timer_fire(&mut channel), TimerCommand::Cancel);
    assert_eq!(channel.sent.len(), 1);
    assert_eq!(channel.sent[0].len(), 100);
    assert_eq!(sent_ids(&channel), vec![vec![1, 2, 3, 4]]);
    assert!(queue.is_idle());
}

#[test]
fn records_over_budget_span_several_sends_in_order() {
    let mut queue = queue(100);
    let mut channel = ScriptedChannel::default();
    for id in 1..=7 {
        queue.enqueue(sized_record(id, 30)).expect("fits");
    }

    assert_eq!(queue.on_timer_fire(&mut channel), TimerCommand::Arm(BASE));
    drain(&mut queue, &mut channel);

    assert_eq!(
        sent_ids(&channel),
        vec![vec![1, 2, 3], vec![4, 5, 6], vec![7]]
    );
    assert!(channel.sent.iter().all(|batch| batch.len() <= 100));
}

#[test]
fn oversized_record_is_rejected() {
    let mut queue = queue(50);
    let err = queue
        .enqueue(sized_record(1, 51))
        .expect_err("record exceeds budget");
    assert_eq!(err, OutboundError::RecordTooLarge { len: 51, budget: 50 });
    assert!(queue.is_idle());
}

#[test]
fn refused_batch_is_retried_verbatim() {
    let mut queue = queue(64);
    let mut channel = ScriptedChannel {
        busy: 1,
        ..ScriptedChannel::default()
    };
    queue.enqueue(sized_record(1, 30)).expect("fits");
    queue.enqueue(sized_record(2, 30)).expect("fits");

    assert_eq!(queue.on_timer_fire(&mut channel), TimerCommand::Arm(BASE * 2));
    let retained = queue.in_flight().expect("batch retained").clone();
    assert_eq!(retained.records(), 2);

    queue.enqueue(sized_record(3, 8)).expect("fits");
    assert_eq!(queue.on_timer_fire(&mut channel), TimerCommand::Arm(BASE));
    assert_eq!(channel.sent, vec![retained.bytes().to_vec()]);

    drain(&mut queue, &mut channel);
    assert_eq!(sent_ids(&channel), vec![vec![1, 2], vec![3]]);
}

#[rstest]
#[case(1)]
#[case(5)]
#[case(12)]
fn backoff_grows_monotonically_then_resets(#[case] failures: usize) {
    let mut queue = queue(64);
    let mut channel = ScriptedChannel {
        busy: failures,
        ..ScriptedChannel::default()
    };
    queue.enqueue(sized_record(1, 8)).expect("fits");

    let mut delays = Vec::new();
    for _ in 0..failures {
        let delay = queue
            .on_timer_fire(&mut channel)
            .delay()
            .expect("refused send re-arms");
        delays.push(delay);
    }
    assert!(delays.windows(2).all(|pair| pair[0] <= pair[1]));
    assert!(delays.iter().all(|delay| *delay > BASE));

    queue.enqueue(sized_record(2, 8)).expect("fits");
    assert_eq!(queue.on_timer_fire(&mut channel), TimerCommand::Arm(BASE));
    assert_eq!(queue.current_delay(), BASE);
    assert_eq!(channel.attempts, failures + 1);
}

#[test]
fn backoff_is_capped() {
    let mut queue = CoalescingQueue::new(
        64,
        BackoffConfig {
            initial_delay: BASE,
            max_delay: Duration::from_millis(35),
        },
    );
    let mut channel = ScriptedChannel {
        busy: 4,
        ..ScriptedChannel::default()
    };
    queue.enqueue(sized_record(1, 8)).expect("fits");
    let delays: Vec<_> = (0..4)
        .filter_map(|_| queue.on_timer_fire(&mut channel).delay())
        .collect();
    assert_eq!(
        delays,
        vec![
            Duration::from_millis(20),
            Duration::from_millis(35),
            Duration::from_millis(35),
            Duration::from_millis(35),
        ]
    );
}

#[test]
fn enqueue_during_backoff_keeps_timer() {
    let mut queue = queue(64);
    let mut channel = ScriptedChannel {
        busy: 1,
        ..ScriptedChannel::default()
    };
    queue.enqueue(sized_record(1, 8)).expect("fits");
    queue.on_timer_fire(&mut channel);
    assert_eq!(
        queue.enqueue(sized_record(2, 8)).expect("fits"),
        TimerCommand::Keep
    );
}

#[test]
fn firing_with_nothing_queued_idles() {
    let mut queue = queue(64);
    let mut channel = ScriptedChannel::default();
    assert_eq!(queue.on_timer_fire(&mut channel), TimerCommand::Cancel);
    assert_eq!(channel.attempts, 0);
}
