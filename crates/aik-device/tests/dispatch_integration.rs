//! End-to-end behaviour of the device: dispatcher, validator, forwarder and
//! registry wired together the way the binary wires them.

use std::sync::Arc;

use aik_core::protocol::{encode_batch_request, encode_single_request, BATCH_HEADER_SIZE};
use aik_core::{InjectionBatch, Opcode, ResponseCode, ScancodeEvent, MAX_BATCH};
use aik_device::application::dispatch::{Completion, ControlRequest, DispatchError, Dispatcher};
use aik_device::application::forward::{ForwardingStats, StatsSnapshot};
use aik_device::application::registry::ConnectionRegistry;
use aik_device::infrastructure::queue::SequentialQueue;
use aik_device::infrastructure::sink::mock::RecordingSink;

struct Device {
    dispatcher: Dispatcher,
    registry: Arc<ConnectionRegistry>,
    stats: Arc<ForwardingStats>,
}

impl Device {
    fn new() -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        let stats = Arc::new(ForwardingStats::new());
        Self {
            dispatcher: Dispatcher::new(Arc::clone(&registry), Arc::clone(&stats)),
            registry,
            stats,
        }
    }

    fn with_sink(sink: Arc<RecordingSink>) -> Self {
        let device = Self::new();
        device.registry.attach(sink);
        device
    }

    fn call(
        &self,
        opcode: Opcode,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<Completion, DispatchError> {
        self.dispatcher
            .dispatch(ControlRequest::new(opcode.code(), input, output))
    }
}

fn numbered_events(n: usize) -> Vec<ScancodeEvent> {
    (0..n)
        .map(|i| ScancodeEvent::new(i as u16 + 1, i % 2 == 1, i % 3 == 0))
        .collect()
}

fn batch_bytes(n: usize) -> Vec<u8> {
    encode_batch_request(&InjectionBatch::new(numbered_events(n)).unwrap())
}

/// Raw header claiming `count` records, followed by `body_len` zero bytes.
fn raw_batch(count: u32, body_len: usize) -> Vec<u8> {
    let mut bytes = count.to_le_bytes().to_vec();
    bytes.resize(BATCH_HEADER_SIZE + body_len, 0);
    bytes
}

// ── Batch acceptance ──────────────────────────────────────────────────────────

#[test]
fn test_every_valid_count_succeeds_with_full_consumption() {
    let device = Device::new();
    for n in 1..=MAX_BATCH {
        let mut out = [0u8; 4];

        let completion = device
            .call(Opcode::InjectBatch, &batch_bytes(n), &mut out)
            .unwrap_or_else(|e| panic!("count {n} rejected: {e}"));

        assert_eq!(completion.consumed, Some(n as u32));
        assert_eq!(u32::from_le_bytes(out), n as u32);
    }
}

#[test]
fn test_out_of_range_counts_are_invalid_argument() {
    let device = Device::new();
    for count in [0u32, MAX_BATCH as u32 + 1, 1_000, u32::MAX] {
        let input = raw_batch(count, 3 * MAX_BATCH + 16);

        let err = device.call(Opcode::InjectBatch, &input, &mut []).unwrap_err();

        assert_eq!(err.status(), ResponseCode::InvalidArgument, "count {count}");
    }
    assert_eq!(device.stats.snapshot(), StatsSnapshot::default(), "nothing forwarded");
}

#[test]
fn test_truncated_batch_is_buffer_too_small() {
    let device = Device::new();

    let short_header = device.call(Opcode::InjectBatch, &[5, 0], &mut []);
    let short_body = device.call(Opcode::InjectBatch, &raw_batch(5, 14), &mut []);

    assert_eq!(short_header.unwrap_err().status(), ResponseCode::BufferTooSmall);
    assert_eq!(short_body.unwrap_err().status(), ResponseCode::BufferTooSmall);
}

#[test]
fn test_inject_one_requires_exactly_one_record() {
    let device = Device::new();
    let record = encode_single_request(&ScancodeEvent::key_down(0x1E, false));

    assert!(device.call(Opcode::InjectOne, &record, &mut []).is_ok());
    assert_eq!(
        device.call(Opcode::InjectOne, &record[..2], &mut []).unwrap_err().status(),
        ResponseCode::BufferTooSmall
    );
    let mut long = record.clone();
    long.push(0);
    assert_eq!(
        device.call(Opcode::InjectOne, &long, &mut []).unwrap_err().status(),
        ResponseCode::InvalidArgument
    );
}

// ── Inline opcodes ────────────────────────────────────────────────────────────

#[test]
fn test_echo_is_lossless_when_output_is_large_enough() {
    let device = Device::new();
    let input: Vec<u8> = (0..=255u8).collect();
    let mut out = vec![0u8; input.len() + 10];

    let completion = device.call(Opcode::Echo, &input, &mut out).unwrap();

    assert_eq!(completion.bytes_written, input.len());
    assert_eq!(&out[..input.len()], input.as_slice());
}

#[test]
fn test_ping_with_one_byte_output_writes_one_byte() {
    let device = Device::new();
    let mut out = [0xEEu8; 1];

    let completion = device.call(Opcode::Ping, &[], &mut out).unwrap();

    assert_eq!(completion.bytes_written, 1);
}

#[test]
fn test_unknown_control_code_leaves_buffers_untouched() {
    let device = Device::new();
    let input = batch_bytes(4);
    let mut out = [0x5Au8; 16];

    let err = device
        .dispatcher
        .dispatch(ControlRequest::new(0x0022_2100, &input, &mut out))
        .unwrap_err();

    assert_eq!(err.status(), ResponseCode::UnsupportedRequest);
    assert_eq!(out, [0x5A; 16]);
    assert_eq!(device.stats.snapshot(), StatsSnapshot::default());
}

// ── Forwarding ────────────────────────────────────────────────────────────────

#[test]
fn test_degraded_counter_grows_by_exactly_the_submitted_count() {
    // Arrange
    let device = Device::new();
    let before = device.stats.snapshot().degraded_events;

    // Act
    let completion = device
        .call(Opcode::InjectBatch, &batch_bytes(17), &mut [0u8; 4])
        .unwrap();

    // Assert
    assert_eq!(completion.consumed, Some(17));
    let after = device.stats.snapshot();
    assert_eq!(after.degraded_events - before, 17);
    assert_eq!(after.degraded_batches, 1);
    assert_eq!(after.delivered_events, 0);
}

#[test]
fn test_inject_one_without_sink_grows_degraded_counter_by_one() {
    let device = Device::new();
    let before = device.stats.snapshot();
    let record = encode_single_request(&ScancodeEvent::key_up(0x4B, true));

    let completion = device.call(Opcode::InjectOne, &record, &mut [0u8; 4]).unwrap();

    assert_eq!(completion.consumed, Some(1));
    let after = device.stats.snapshot();
    assert_eq!(after.degraded_events - before.degraded_events, 1);
    assert_eq!(after.degraded_batches - before.degraded_batches, 1);
    assert_eq!(after.delivered_events, 0);
}

#[test]
fn test_attached_sink_receives_every_batch_size_unchanged() {
    for n in 1..=MAX_BATCH {
        // Arrange
        let sink = Arc::new(RecordingSink::new());
        let device = Device::with_sink(Arc::clone(&sink));

        // Act
        let completion = device
            .call(Opcode::InjectBatch, &batch_bytes(n), &mut [])
            .unwrap_or_else(|e| panic!("count {n} rejected: {e}"));

        // Assert
        assert_eq!(completion.consumed, Some(n as u32), "count {n}");
        assert_eq!(sink.recorded(), numbered_events(n), "count {n}");
    }
}

#[test]
fn test_attached_sink_receives_events_in_wire_order() {
    // Arrange
    let sink = Arc::new(RecordingSink::new());
    let device = Device::with_sink(Arc::clone(&sink));

    // Act
    device
        .call(Opcode::InjectBatch, &batch_bytes(MAX_BATCH), &mut [])
        .unwrap();
    device
        .call(Opcode::InjectBatch, &batch_bytes(3), &mut [])
        .unwrap();

    // Assert
    let mut expected = numbered_events(MAX_BATCH);
    expected.extend(numbered_events(3));
    assert_eq!(sink.recorded(), expected);
    assert_eq!(*sink.batch_sizes.lock().unwrap(), vec![MAX_BATCH, 3]);
}

#[test]
fn test_failing_sink_still_completes_with_full_count() {
    let device = Device::with_sink(Arc::new(RecordingSink::failing()));

    let completion = device
        .call(Opcode::InjectBatch, &batch_bytes(5), &mut [])
        .unwrap();

    assert_eq!(completion.consumed, Some(5));
    let stats = device.stats.snapshot();
    assert_eq!(stats.sink_failures, 1);
    assert_eq!(stats.degraded_events, 5);
}

#[test]
fn test_partial_sink_consumption_is_reported() {
    let device = Device::with_sink(Arc::new(RecordingSink::with_consume_limit(2)));

    let completion = device
        .call(Opcode::InjectBatch, &batch_bytes(6), &mut [])
        .unwrap();

    assert_eq!(completion.consumed, Some(2));
}

#[test]
fn test_detach_returns_device_to_degraded_mode() {
    let sink = Arc::new(RecordingSink::new());
    let device = Device::with_sink(Arc::clone(&sink));

    device.call(Opcode::InjectBatch, &batch_bytes(2), &mut []).unwrap();
    device.registry.detach();
    device.call(Opcode::InjectBatch, &batch_bytes(4), &mut []).unwrap();

    assert_eq!(sink.recorded().len(), 2);
    let stats = device.stats.snapshot();
    assert_eq!(stats.delivered_events, 2);
    assert_eq!(stats.degraded_events, 4);
}

// ── Queue ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_queue_completes_requests_in_submission_order() {
    // Arrange
    let sink = Arc::new(RecordingSink::new());
    let device = Device::with_sink(Arc::clone(&sink));
    let (queue, task) = SequentialQueue::spawn(device.dispatcher, 4);

    // Act
    let text = aik_core::keymap::KeyMapper::text_to_events("Hello, queue!").unwrap();
    let mut consumed = 0;
    for batch in InjectionBatch::chunked(&text) {
        let response = queue
            .submit(Opcode::InjectBatch.code(), encode_batch_request(&batch), 4)
            .await
            .unwrap();
        assert_eq!(response.status(), ResponseCode::Success);
        assert_eq!(response.output.len(), 4);
        consumed += response.result.unwrap().consumed.unwrap();
    }
    drop(queue);
    task.await.unwrap();

    // Assert
    assert_eq!(consumed as usize, text.len());
    assert_eq!(sink.recorded(), text);
}
