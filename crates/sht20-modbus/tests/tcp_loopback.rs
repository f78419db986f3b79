// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Modbus TCP wire tests.
//!
//! A local listener answers with hand-built Modbus TCP frames, so these run
//! the real `tokio-modbus` client and the outcome mapping behind
//! [`ModbusTcpTransport`](sht20_modbus::ModbusTcpTransport).
//!
//! ```bash
//! cargo test -p sht20-modbus --test tcp_loopback
//! ```

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use sht20_modbus::{
    ModbusError, ModbusReadError, ModbusTcpConfig, RegisterType, Sht20Device, TransportState,
};

const OPERATION_TIMEOUT: Duration = Duration::from_millis(300);

// =============================================================================
// Scripted sensor
// =============================================================================

/// What the listener sends back for one request.
#[derive(Debug, Clone)]
enum Reply {
    Registers(Vec<u16>),
    Exception(u8),
    Silent,
}

/// A Modbus TCP peer answering requests from a script, in order.
#[derive(Clone, Default)]
struct ScriptedSensor {
    replies: Arc<Mutex<VecDeque<Reply>>>,
    requests: Arc<Mutex<Vec<(u8, u16, u16)>>>,
    connections: Arc<AtomicUsize>,
}

impl ScriptedSensor {
    async fn start(replies: impl IntoIterator<Item = Reply>) -> (Self, u16) {
        let sensor = Self {
            replies: Arc::new(Mutex::new(replies.into_iter().collect())),
            ..Self::default()
        };
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let accepting = sensor.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                accepting.connections.fetch_add(1, Ordering::SeqCst);
                tokio::spawn(accepting.clone().serve(stream));
            }
        });

        (sensor, port)
    }

    async fn serve(self, mut stream: TcpStream) {
        let mut header = [0u8; 7];
        loop {
            if stream.read_exact(&mut header).await.is_err() {
                return;
            }
            let length = usize::from(u16::from_be_bytes([header[4], header[5]]));
            let mut pdu = vec![0u8; length.saturating_sub(1)];
            if stream.read_exact(&mut pdu).await.is_err() {
                return;
            }

            let function = pdu[0];
            self.requests.lock().unwrap().push((
                function,
                u16::from_be_bytes([pdu[1], pdu[2]]),
                u16::from_be_bytes([pdu[3], pdu[4]]),
            ));

            let reply = self.replies.lock().unwrap().pop_front();
            let response = match reply {
                Some(Reply::Registers(values)) => {
                    let mut out = vec![function, (values.len() * 2) as u8];
                    for value in values {
                        out.extend_from_slice(&value.to_be_bytes());
                    }
                    out
                }
                Some(Reply::Exception(code)) => vec![function | 0x80, code],
                Some(Reply::Silent) | None => continue,
            };

            let mut frame = Vec::with_capacity(7 + response.len());
            frame.extend_from_slice(&header[0..2]);
            frame.extend_from_slice(&[0, 0]);
            frame.extend_from_slice(&((response.len() + 1) as u16).to_be_bytes());
            frame.push(header[6]);
            frame.extend_from_slice(&response);

            if stream.write_all(&frame).await.is_err() {
                return;
            }
        }
    }

    fn requests(&self) -> Vec<(u8, u16, u16)> {
        self.requests.lock().unwrap().clone()
    }

    fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

fn device(port: u16) -> Sht20Device {
    let config = ModbusTcpConfig::new("127.0.0.1")
        .with_port(port)
        .with_operation_timeout(OPERATION_TIMEOUT);
    Sht20Device::new(config.into()).with_settle_delay(Duration::ZERO)
}

fn approx(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn test_realtime_read_over_tcp() {
    let (sensor, port) = ScriptedSensor::start([Reply::Registers(vec![0x00D4, 0x01F7])]).await;
    let mut device = device(port);

    let reading = device.read_realtime().await.unwrap();
    approx(reading.temperature, 21.2);
    approx(reading.humidity, 50.3);

    assert_eq!(sensor.requests(), vec![(0x04, 1, 2)]);
    assert_eq!(device.state(), TransportState::Connected);
    device.close().await.unwrap();
}

#[tokio::test]
async fn test_settings_read_over_tcp() {
    let (sensor, port) =
        ScriptedSensor::start([Reply::Registers(vec![5, 9600, 0xFFFF, 10])]).await;
    let mut device = device(port);

    let settings = device.read_settings().await.unwrap();
    assert_eq!(settings.device_id, 5);
    assert_eq!(settings.baudrate, 9600);
    approx(settings.temp_offset, -0.1);
    approx(settings.hum_offset, 1.0);

    assert_eq!(sensor.requests(), vec![(0x03, 257, 4)]);
}

#[tokio::test]
async fn test_exception_response_maps_to_read_error() {
    let (sensor, port) = ScriptedSensor::start([
        Reply::Exception(0x02),
        Reply::Registers(vec![250, 400]),
    ])
    .await;
    let mut device = device(port);

    let error = device.read_realtime().await.unwrap_err();
    assert!(matches!(
        error.modbus_error(),
        ModbusError::Read(ModbusReadError::Exception {
            register_type: RegisterType::InputRegister,
            address: 1,
            count: 2,
            exception_code: 0x02,
            ..
        })
    ));
    assert_eq!(device.state(), TransportState::Disconnected);

    let reading = device.read_realtime().await.unwrap();
    approx(reading.temperature, 25.0);
    assert_eq!(sensor.connections(), 2);
}

#[tokio::test]
async fn test_silent_peer_times_out_then_reconnects() {
    let (sensor, port) =
        ScriptedSensor::start([Reply::Silent, Reply::Registers(vec![260, 410])]).await;
    let mut device = device(port);

    let error = device.read_realtime().await.unwrap_err();
    match error.modbus_error() {
        ModbusError::Read(ModbusReadError::Timeout { duration, .. }) => {
            assert_eq!(*duration, OPERATION_TIMEOUT);
        }
        other => panic!("Expected a read timeout, got {other:?}"),
    }
    assert_eq!(device.state(), TransportState::Disconnected);

    let reading = device.read_realtime().await.unwrap();
    approx(reading.temperature, 26.0);
    approx(reading.humidity, 41.0);

    assert_eq!(sensor.connections(), 2);
    assert_eq!(sensor.requests().len(), 2);
}
