use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream, duplex};

use super::*;
use crate::transport::PipeTransport;

fn create_test_connection() -> (Connection, DuplexStream, DuplexStream) {
	let (device_read, host_write) = duplex(1024);
	let (host_read, device_write) = duplex(1024);

	let (transport, message_rx) = PipeTransport::new(host_write, host_read);
	let parts = transport.into_transport_parts(message_rx);
	let connection = Connection::new(parts);

	(connection, device_read, device_write)
}

async fn read_frame(reader: &mut DuplexStream) -> Value {
	let mut len_buf = [0u8; 4];
	reader.read_exact(&mut len_buf).await.unwrap();
	let mut buf = vec![0u8; u32::from_le_bytes(len_buf) as usize];
	reader.read_exact(&mut buf).await.unwrap();
	serde_json::from_slice(&buf).unwrap()
}

async fn write_frame(writer: &mut DuplexStream, value: &Value) {
	let bytes = serde_json::to_vec(value).unwrap();
	writer.write_all(&(bytes.len() as u32).to_le_bytes()).await.unwrap();
	writer.write_all(&bytes).await.unwrap();
	writer.flush().await.unwrap();
}

#[test]
fn test_request_id_increments() {
	let (connection, _, _) = create_test_connection();

	let id1 = connection.last_id.fetch_add(1, Ordering::SeqCst);
	let id2 = connection.last_id.fetch_add(1, Ordering::SeqCst);
	let id3 = connection.last_id.fetch_add(1, Ordering::SeqCst);

	assert_eq!(id1, 0);
	assert_eq!(id2, 1);
	assert_eq!(id3, 2);
}

#[test]
fn test_request_format() {
	let request = Request {
		id: 0,
		message: "start-network".to_string(),
		params: serde_json::json!({"apn": "internet"}),
	};

	let value = serde_json::to_value(&request).unwrap();
	assert_eq!(
		value,
		serde_json::json!({"id": 0, "message": "start-network", "params": {"apn": "internet"}})
	);
}

#[tokio::test]
async fn test_dispatch_response_success() {
	let (connection, _, _) = create_test_connection();

	let id = connection.last_id.fetch_add(1, Ordering::SeqCst);
	let (tx, rx) = tokio::sync::oneshot::channel();
	connection.callbacks.lock().insert(id, tx);

	let response = Message::Response(Response {
		id,
		result: Some(serde_json::json!({"packet_data_handle": 16})),
		error: None,
	});
	connection.dispatch(response).unwrap();

	let result = rx.await.unwrap().unwrap();
	assert_eq!(result["packet_data_handle"], 16);
}

#[tokio::test]
async fn test_dispatch_response_error() {
	let (connection, _, _) = create_test_connection();

	let id = connection.last_id.fetch_add(1, Ordering::SeqCst);
	let (tx, rx) = tokio::sync::oneshot::channel();
	connection.callbacks.lock().insert(id, tx);

	let response = Message::Response(Response {
		id,
		result: None,
		error: Some(ErrorPayload {
			code: "call-failed".to_string(),
			message: "Call failed".to_string(),
			details: Some(serde_json::json!({"call_end_reason": {"code": 1}})),
		}),
	});
	connection.dispatch(response).unwrap();

	let err = rx.await.unwrap().unwrap_err();
	assert_eq!(err.protocol_code(), Some(wds_protocol::ProtocolErrorCode::CallFailed));
	assert!(err.failure_details::<Value>().is_some());
}

#[test]
fn test_dispatch_unknown_id_is_protocol_error() {
	let (connection, _, _) = create_test_connection();

	let err = connection
		.dispatch(Message::Response(Response {
			id: 99,
			result: None,
			error: None,
		}))
		.unwrap_err();
	assert!(matches!(err, Error::ProtocolError(_)));
}

#[test]
fn test_message_deserialization_response() {
	let json = r#"{"id": 42, "result": {"connection_status": "connected"}}"#;
	let message: Message = serde_json::from_str(json).unwrap();

	match message {
		Message::Response(response) => {
			assert_eq!(response.id, 42);
			assert!(response.result.is_some());
			assert!(response.error.is_none());
		}
		_ => panic!("Expected Response"),
	}
}

#[test]
fn test_message_deserialization_indication() {
	let json = r#"{"indication": "packet-service-status", "params": {"connection_status": "disconnected"}}"#;
	let message: Message = serde_json::from_str(json).unwrap();

	match message {
		Message::Indication(indication) => {
			assert_eq!(indication.indication, "packet-service-status");
			assert_eq!(indication.params["connection_status"], "disconnected");
		}
		_ => panic!("Expected Indication"),
	}
}

#[test]
fn test_message_deserialization_unknown() {
	let message: Message = serde_json::from_str(r#"{"hello": "device"}"#).unwrap();
	assert!(matches!(message, Message::Unknown(_)));
}

#[tokio::test]
async fn test_round_trip_through_run_loop() {
	let (connection, mut device_read, mut device_write) = create_test_connection();
	let connection = Arc::new(connection);

	let runner = Arc::clone(&connection);
	let run_task = tokio::spawn(async move { runner.run().await });

	let device = tokio::spawn(async move {
		let request = read_frame(&mut device_read).await;
		assert_eq!(request["message"], "get-packet-service-status");
		// Indication first, response second
		write_frame(
			&mut device_write,
			&serde_json::json!({"indication": "event-report", "params": {}}),
		)
		.await;
		write_frame(
			&mut device_write,
			&serde_json::json!({"id": request["id"], "result": {"connection_status": "connected"}}),
		)
		.await;
		(device_read, device_write)
	});

	let result = connection
		.send_message("get-packet-service-status", Value::Null, Duration::from_secs(10))
		.await
		.unwrap();
	assert_eq!(result["connection_status"], "connected");
	assert_eq!(connection.pending_requests(), 0);

	let (device_read, device_write) = device.await.unwrap();
	drop(device_write);
	drop(device_read);
	run_task.await.unwrap().unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_deadline_elapses_and_clears_pending_slot() {
	let (connection, _device_read, _device_write) = create_test_connection();
	let connection = Arc::new(connection);

	let runner = Arc::clone(&connection);
	let _run_task = tokio::spawn(async move { runner.run().await });

	let err = connection
		.send_message("stop-network", serde_json::json!({}), Duration::from_secs(10))
		.await
		.unwrap_err();
	assert!(err.is_timeout(), "got {err:?}");
	assert_eq!(connection.pending_requests(), 0);
}

#[tokio::test]
async fn test_pending_requests_fail_when_device_closes() {
	let (connection, device_read, device_write) = create_test_connection();
	let connection = Arc::new(connection);

	let runner = Arc::clone(&connection);
	let run_task = tokio::spawn(async move { runner.run().await });

	let request = {
		let connection = Arc::clone(&connection);
		tokio::spawn(async move {
			connection
				.send_message("reset", Value::Null, Duration::from_secs(10))
				.await
		})
	};

	while connection.pending_requests() == 0 {
		tokio::task::yield_now().await;
	}
	assert_eq!(connection.pending_requests(), 1);
	drop(device_write);
	drop(device_read);

	let err = request.await.unwrap().unwrap_err();
	assert!(matches!(err, Error::ChannelClosed), "got {err:?}");
	assert_eq!(connection.pending_requests(), 0);
	run_task.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_run_twice_is_rejected() {
	let (connection, _device_read, device_write) = create_test_connection();
	let connection = Arc::new(connection);

	drop(device_write);
	connection.run().await.unwrap();
	assert!(connection.run().await.is_err());
}

#[test]
fn test_error_payload_maps_to_device_error() {
	let error = parse_protocol_error(ErrorPayload {
		code: "extended-internal".to_string(),
		message: "Extended internal error".to_string(),
		details: None,
	});
	match &error {
		Error::Device { code, message, details } => {
			assert_eq!(code, "extended-internal");
			assert_eq!(message, "Extended internal error");
			assert!(details.is_none());
		}
		_ => panic!("Expected Device error"),
	}
}
