use std::time::Duration;

use serde_json::json;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use wds_protocol::{PacketDataHandle, StartNetworkInput, StopNetworkInput};

use super::*;
use crate::config::Timeouts;
use crate::error::WdsError;
use crate::output::LifecycleEvent;
use crate::testing::{Entry, Journal, MockDevice, RecordingReporter, Reply};

const DEVICE: &str = "/dev/cdc-wdm0";

fn started(handle: u32) -> Reply {
	Reply::Ok(json!({ "packet_data_handle": handle }))
}

fn status(value: &str) -> Reply {
	Reply::Ok(json!({ "connection_status": value }))
}

fn stopped() -> Reply {
	Reply::Ok(serde_json::Value::Null)
}

fn lifecycle(event: LifecycleEvent) -> Entry {
	Entry::Lifecycle(event)
}

fn line(text: &str) -> Entry {
	Entry::Line(text.to_string())
}

fn cancel_after(token: &CancellationToken, after: Duration) {
	let token = token.clone();
	tokio::spawn(async move {
		tokio::time::sleep(after).await;
		token.cancel();
	});
}

#[tokio::test(start_paused = true)]
async fn start_without_follow_reports_handle() {
	let journal = Journal::default();
	let device = MockDevice::new(&journal).reply("start-network", started(16));
	let mut reporter = RecordingReporter::new(&journal);
	let mut controller = SessionController::new(&device, &mut reporter, DEVICE, Timeouts::default());

	let input = StartNetworkInput {
		apn: Some("internet".into()),
		..Default::default()
	};
	controller.start(Some(input), None).await.unwrap();

	assert_eq!(controller.state(), SessionState::Idle);
	assert_eq!(journal.requests(), vec!["start-network"]);
	assert_eq!(journal.params_of("start-network"), vec![json!({ "apn": "internet" })]);
	assert_eq!(
		journal.lines(),
		vec![
			"[/dev/cdc-wdm0] Network started",
			"\tPacket data handle: '16'",
		]
	);
	assert_eq!(journal.count(&lifecycle(LifecycleEvent::PollArmed)), 0);
}

#[tokio::test(start_paused = true)]
async fn start_without_properties_sends_empty_request() {
	let journal = Journal::default();
	let device = MockDevice::new(&journal).reply("start-network", started(1));
	let mut reporter = RecordingReporter::new(&journal);
	let mut controller = SessionController::new(&device, &mut reporter, DEVICE, Timeouts::default());

	controller.start(None, None).await.unwrap();

	assert_eq!(journal.params_of("start-network"), vec![json!({})]);
}

#[tokio::test(start_paused = true)]
async fn start_failure_returns_to_idle_with_end_reasons() {
	let journal = Journal::default();
	let details = json!({
		"call_end_reason": { "code": 1, "name": "generic-unspecified" },
		"verbose_call_end_reason": {
			"reason_type": 6, "type_name": "3gpp",
			"reason": 33, "reason_name": "option-unsubscribed"
		}
	});
	let device = MockDevice::new(&journal).reply(
		"start-network",
		Reply::Device {
			code: "call-failed",
			message: "Call failed",
			details: Some(details),
		},
	);
	let mut reporter = RecordingReporter::new(&journal);
	let mut controller = SessionController::new(&device, &mut reporter, DEVICE, Timeouts::default());

	let err = controller.start(None, None).await.unwrap_err();

	assert_eq!(controller.state(), SessionState::Idle);
	assert_eq!(
		err.report_lines(),
		vec![
			"couldn't start network: Call failed".to_string(),
			"call end reason (1): generic-unspecified".to_string(),
			"verbose call end reason (6,33): [3gpp] option-unsubscribed".to_string(),
		]
	);
	assert!(journal.lines().is_empty());
}

#[tokio::test(start_paused = true)]
async fn start_timeout_is_an_operation_failure() {
	let journal = Journal::default();
	let device = MockDevice::new(&journal).reply("start-network", Reply::Timeout);
	let mut reporter = RecordingReporter::new(&journal);
	let mut controller = SessionController::new(&device, &mut reporter, DEVICE, Timeouts::default());

	let begin = Instant::now();
	let err = controller.start(None, None).await.unwrap_err();

	assert!(matches!(err, WdsError::Transport(ref e) if e.is_timeout()));
	assert_eq!(begin.elapsed(), Duration::from_secs(45));
	assert_eq!(controller.state(), SessionState::Idle);
}

#[tokio::test(start_paused = true)]
async fn cancellation_releases_resources_before_stop() {
	let journal = Journal::default();
	let device = MockDevice::new(&journal)
		.reply("start-network", started(16))
		.reply("get-packet-service-status", status("connected"))
		.reply("stop-network", stopped());
	let mut reporter = RecordingReporter::new(&journal);
	let mut controller = SessionController::new(&device, &mut reporter, DEVICE, Timeouts::default());

	let token = CancellationToken::new();
	cancel_after(&token, Duration::from_secs(30));
	controller.start(None, Some(&token)).await.unwrap();

	assert_eq!(controller.state(), SessionState::Idle);
	assert_eq!(
		journal.requests(),
		vec!["start-network", "get-packet-service-status", "stop-network"]
	);
	assert_eq!(
		journal.params_of("stop-network"),
		vec![json!({ "packet_data_handle": 16 })]
	);

	let disarmed = journal.position(&lifecycle(LifecycleEvent::PollDisarmed)).unwrap();
	let unregistered = journal
		.position(&lifecycle(LifecycleEvent::CancellationUnregistered))
		.unwrap();
	let cancelled_line = journal.position(&line("Network cancelled... releasing resources")).unwrap();
	let stop = journal.request_position("stop-network").unwrap();
	assert!(disarmed < unregistered);
	assert!(unregistered < cancelled_line);
	assert!(unregistered < stop);
	assert!(cancelled_line < stop);
	assert_eq!(journal.count(&lifecycle(LifecycleEvent::PollDisarmed)), 1);
	assert_eq!(journal.count(&lifecycle(LifecycleEvent::CancellationUnregistered)), 1);

	assert_eq!(
		journal.lines(),
		vec![
			"[/dev/cdc-wdm0] Network started",
			"\tPacket data handle: '16'",
			"",
			"Ctrl+C will stop the network",
			"[/dev/cdc-wdm0] Connection status: 'connected'",
			"Network cancelled... releasing resources",
			"[/dev/cdc-wdm0] Network stopped",
		]
	);
}

#[tokio::test(start_paused = true)]
async fn disconnection_stops_after_polling() {
	let journal = Journal::default();
	let device = MockDevice::new(&journal)
		.reply("start-network", started(7))
		.reply("get-packet-service-status", status("connected"))
		.reply("get-packet-service-status", status("disconnected"))
		.reply("stop-network", stopped());
	let mut reporter = RecordingReporter::new(&journal);
	let mut controller = SessionController::new(&device, &mut reporter, DEVICE, Timeouts::default());

	let token = CancellationToken::new();
	let begin = Instant::now();
	controller.start(None, Some(&token)).await.unwrap();

	let elapsed = begin.elapsed();
	assert!(elapsed >= Duration::from_secs(40) && elapsed < Duration::from_secs(41));
	assert_eq!(
		journal.requests(),
		vec![
			"start-network",
			"get-packet-service-status",
			"get-packet-service-status",
			"stop-network",
		]
	);

	let lines = journal.lines();
	assert!(lines.contains(&"[/dev/cdc-wdm0] Stopping after detecting disconnection".to_string()));
	assert!(!lines.contains(&"Network cancelled... releasing resources".to_string()));
	assert_eq!(lines.last().unwrap(), "[/dev/cdc-wdm0] Network stopped");

	let disarmed = journal.position(&lifecycle(LifecycleEvent::PollDisarmed)).unwrap();
	let unregistered = journal
		.position(&lifecycle(LifecycleEvent::CancellationUnregistered))
		.unwrap();
	let stop = journal.request_position("stop-network").unwrap();
	assert!(disarmed < unregistered);
	assert!(unregistered < stop);
	assert_eq!(journal.count(&lifecycle(LifecycleEvent::PollDisarmed)), 1);
	assert_eq!(journal.count(&lifecycle(LifecycleEvent::CancellationUnregistered)), 1);
	assert!(!token.is_cancelled());
}

#[tokio::test(start_paused = true)]
async fn unknown_status_counts_as_disconnected() {
	let journal = Journal::default();
	let device = MockDevice::new(&journal)
		.reply("start-network", started(7))
		.reply("get-packet-service-status", status("something-new"))
		.reply("stop-network", stopped());
	let mut reporter = RecordingReporter::new(&journal);
	let mut controller = SessionController::new(&device, &mut reporter, DEVICE, Timeouts::default());

	controller
		.start(None, Some(&CancellationToken::new()))
		.await
		.unwrap();

	assert!(journal
		.lines()
		.contains(&"[/dev/cdc-wdm0] Connection status: 'unknown'".to_string()));
	assert_eq!(journal.requests().last().unwrap(), "stop-network");
}

#[tokio::test(start_paused = true)]
async fn cancellation_abandons_in_flight_poll() {
	let journal = Journal::default();
	let device = MockDevice::new(&journal)
		.reply("start-network", started(3))
		.reply("get-packet-service-status", Reply::Hang)
		.reply("stop-network", stopped());
	let mut reporter = RecordingReporter::new(&journal);
	let mut controller = SessionController::new(&device, &mut reporter, DEVICE, Timeouts::default());

	let token = CancellationToken::new();
	cancel_after(&token, Duration::from_secs(25));
	let begin = Instant::now();
	controller.start(None, Some(&token)).await.unwrap();

	let elapsed = begin.elapsed();
	assert!(elapsed >= Duration::from_secs(25) && elapsed < Duration::from_secs(26));
	assert_eq!(journal.requests().last().unwrap(), "stop-network");
	assert!(journal
		.lines()
		.contains(&"Network cancelled... releasing resources".to_string()));
	assert!(!journal
		.lines()
		.iter()
		.any(|l| l.contains("Connection status")));
}

#[tokio::test(start_paused = true)]
async fn failed_poll_keeps_following() {
	let journal = Journal::default();
	let device = MockDevice::new(&journal)
		.reply("start-network", started(9))
		.reply("get-packet-service-status", Reply::device("out-of-call", "Out of call"))
		.reply("get-packet-service-status", status("disconnected"))
		.reply("stop-network", stopped());
	let mut reporter = RecordingReporter::new(&journal);
	let mut controller = SessionController::new(&device, &mut reporter, DEVICE, Timeouts::default());

	controller
		.start(None, Some(&CancellationToken::new()))
		.await
		.unwrap();

	assert_eq!(
		journal.errors(),
		vec!["couldn't get packet service status: Out of call"]
	);
	assert_eq!(
		journal.requests(),
		vec![
			"start-network",
			"get-packet-service-status",
			"get-packet-service-status",
			"stop-network",
		]
	);
}

#[tokio::test(start_paused = true)]
async fn cancellation_before_first_poll_skips_polling() {
	let journal = Journal::default();
	let device = MockDevice::new(&journal)
		.reply("start-network", started(5))
		.reply("stop-network", stopped());
	let mut reporter = RecordingReporter::new(&journal);
	let mut controller = SessionController::new(&device, &mut reporter, DEVICE, Timeouts::default());

	let token = CancellationToken::new();
	token.cancel();
	controller.start(None, Some(&token)).await.unwrap();

	assert_eq!(journal.requests(), vec!["start-network", "stop-network"]);
}

#[tokio::test(start_paused = true)]
async fn teardown_stop_failure_still_releases_once() {
	let journal = Journal::default();
	let device = MockDevice::new(&journal)
		.reply("start-network", started(16))
		.reply("stop-network", Reply::device("invalid-handle", "Invalid handle"));
	let mut reporter = RecordingReporter::new(&journal);
	let mut controller = SessionController::new(&device, &mut reporter, DEVICE, Timeouts::default());

	let token = CancellationToken::new();
	cancel_after(&token, Duration::from_secs(5));
	let err = controller.start(None, Some(&token)).await.unwrap_err();

	assert_eq!(controller.state(), SessionState::Idle);
	assert_eq!(err.report_lines(), vec!["couldn't stop network: Invalid handle"]);
	assert_eq!(journal.count(&lifecycle(LifecycleEvent::PollDisarmed)), 1);
	assert_eq!(
		journal.count(&lifecycle(LifecycleEvent::CancellationUnregistered)),
		1
	);
	assert!(!journal
		.lines()
		.contains(&"[/dev/cdc-wdm0] Network stopped".to_string()));
}

#[tokio::test(start_paused = true)]
async fn explicit_stop_sends_parsed_handle() {
	let journal = Journal::default();
	let device = MockDevice::new(&journal).reply("stop-network", stopped());
	let mut reporter = RecordingReporter::new(&journal);
	let mut controller = SessionController::new(&device, &mut reporter, DEVICE, Timeouts::default());

	controller
		.stop(StopNetworkInput {
			packet_data_handle: PacketDataHandle::IMPLICIT,
			disable_autoconnect: Some(true),
		})
		.await
		.unwrap();

	assert_eq!(controller.state(), SessionState::Idle);
	assert_eq!(
		journal.params_of("stop-network"),
		vec![json!({ "packet_data_handle": 0xFFFF_FFFFu32, "disable_autoconnect": true })]
	);
	assert_eq!(journal.lines(), vec!["[/dev/cdc-wdm0] Network stopped"]);
	assert_eq!(journal.count(&lifecycle(LifecycleEvent::PollDisarmed)), 0);
}

#[tokio::test(start_paused = true)]
async fn explicit_stop_failure_is_reported() {
	let journal = Journal::default();
	let device = MockDevice::new(&journal).reply("stop-network", Reply::Closed);
	let mut reporter = RecordingReporter::new(&journal);
	let mut controller = SessionController::new(&device, &mut reporter, DEVICE, Timeouts::default());

	let err = controller
		.stop(StopNetworkInput {
			packet_data_handle: PacketDataHandle(16),
			disable_autoconnect: None,
		})
		.await
		.unwrap_err();

	assert_eq!(controller.state(), SessionState::Idle);
	assert_eq!(
		err.report_lines(),
		vec!["operation failed: Channel closed unexpectedly"]
	);
}
