// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Polling runtime.
//!
//! The [`Poller`] owns one [`Sht20Device`] behind an async mutex, shared
//! between the realtime loop and the one-shot settings refresh:
//!
//! ```text
//!   start ──► first realtime read ──► interval loop (scan_interval) ──► close
//!                    │
//!                    └──► [settings_delay] ──► settings read (warn on failure)
//! ```
//!
//! A failed poll makes the reading unavailable until the next successful
//! one; polling itself never stops on a sensor error.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sht20_config::Sht20Config;
use sht20_modbus::{DeviceSettings, RealtimeReading, Sht20Device};
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::error::BinResult;
use crate::shutdown::ShutdownCoordinator;

/// Creates the device adapter described by the configuration.
pub fn build_device(config: &Sht20Config) -> Sht20Device {
    Sht20Device::new(config.device.connection.clone()).with_multiplier(config.device.multiplier)
}

// =============================================================================
// Observation
// =============================================================================

/// A realtime reading as presented to the operator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    /// Configured device name.
    pub device: String,
    /// When the reading completed.
    pub timestamp: DateTime<Utc>,
    /// Temperature in °C, display offset applied and rounded.
    pub temperature: f64,
    /// Relative humidity in %, display offset applied and rounded.
    pub humidity: f64,
    #[serde(skip)]
    precision: usize,
}

impl Observation {
    /// Applies the display settings of `config` to a raw reading.
    pub fn new(config: &Sht20Config, reading: &RealtimeReading) -> Self {
        let display = &config.display;
        let shown = reading.adjusted(display.temp_offset, display.hum_offset, display.precision);
        Self {
            device: config.device.name.clone(),
            timestamp: Utc::now(),
            temperature: shown.temperature,
            humidity: shown.humidity,
            precision: display.precision as usize,
        }
    }
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {:.prec$} °C, {:.prec$} %RH",
            self.device,
            self.temperature,
            self.humidity,
            prec = self.precision
        )
    }
}

// =============================================================================
// Poller
// =============================================================================

/// Polls one SHT20 until shutdown.
pub struct Poller {
    config: Arc<Sht20Config>,
    device: Arc<Mutex<Sht20Device>>,
    shutdown: ShutdownCoordinator,
    consecutive_failures: u64,
    last: Option<Observation>,
}

impl Poller {
    /// Creates a poller for the configured device.
    pub fn new(config: Sht20Config) -> Self {
        let device = build_device(&config);
        Self::with_device(config, device)
    }

    /// Creates a poller around an existing adapter.
    pub fn with_device(config: Sht20Config, device: Sht20Device) -> Self {
        Self {
            config: Arc::new(config),
            device: Arc::new(Mutex::new(device)),
            shutdown: ShutdownCoordinator::new(),
            consecutive_failures: 0,
            last: None,
        }
    }

    /// Uses an externally owned shutdown coordinator.
    pub fn with_shutdown(mut self, shutdown: ShutdownCoordinator) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Returns a handle that stops [`run`](Self::run).
    pub fn shutdown_handle(&self) -> ShutdownCoordinator {
        self.shutdown.clone()
    }

    /// Returns `true` if the latest poll produced a reading.
    pub fn is_available(&self) -> bool {
        self.last.is_some() && self.consecutive_failures == 0
    }

    /// Returns the latest successful observation.
    pub fn last_observation(&self) -> Option<&Observation> {
        self.last.as_ref()
    }

    /// Returns the number of failed polls since the last success.
    pub fn consecutive_failures(&self) -> u64 {
        self.consecutive_failures
    }

    /// Performs one realtime read and updates availability.
    pub async fn poll_once(&mut self) -> Option<Observation> {
        let result = self.device.lock().await.read_realtime().await;

        match result {
            Ok(reading) => {
                let observation = Observation::new(&self.config, &reading);

                if self.consecutive_failures > 0 {
                    info!(
                        device = %observation.device,
                        failed_polls = self.consecutive_failures,
                        "SHT20 readings recovered"
                    );
                }
                self.consecutive_failures = 0;

                info!(
                    device = %observation.device,
                    temperature = observation.temperature,
                    humidity = observation.humidity,
                    timestamp = %observation.timestamp.to_rfc3339(),
                    "{}",
                    observation
                );

                self.last = Some(observation.clone());
                Some(observation)
            }
            Err(error) => {
                self.consecutive_failures += 1;
                let cause = error.modbus_error();

                if self.consecutive_failures == 1 {
                    warn!(
                        device = %self.config.device.name,
                        category = cause.category(),
                        retryable = cause.is_retryable(),
                        error = %error,
                        "SHT20 readings unavailable"
                    );
                } else {
                    debug!(
                        device = %self.config.device.name,
                        failed_polls = self.consecutive_failures,
                        error = %error,
                        "SHT20 still unavailable"
                    );
                }
                None
            }
        }
    }

    /// Runs until shutdown is initiated, then closes the session.
    pub async fn run(mut self) -> BinResult<()> {
        let mut shutdown_rx = self.shutdown.subscribe();
        let polling = self.config.polling.clone();

        info!(
            device = %self.config.device.name,
            target = %self.config.device.connection.target(),
            unit_id = self.config.device.connection.unit_id(),
            scan_interval = %humantime::format_duration(polling.scan_interval),
            "Starting SHT20 poller"
        );

        self.poll_once().await;

        let settings_task = tokio::spawn(refresh_settings(
            self.device.clone(),
            polling.settings_delay,
        ));

        let mut ticker = tokio::time::interval(polling.scan_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; the first read already happened.
        ticker.tick().await;

        if !self.shutdown.is_shutdown_initiated() {
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        self.poll_once().await;
                    }
                    _ = shutdown_rx.recv() => break,
                }
            }
        }

        settings_task.abort();
        self.close().await;
        Ok(())
    }

    async fn close(&self) {
        let mut device = self.device.lock().await;
        {
            let stats = device.session().stats();
            info!(
                requests = stats.total_requests(),
                failed = stats.failed_requests(),
                link_resets = stats.link_resets(),
                avg_response = ?stats.average_response_time(),
                "Closing SHT20 session"
            );
        }

        if let Err(error) = device.close().await {
            warn!(error = %error, "Error while closing the Modbus session");
        }
    }
}

/// Reads the settings block once after `delay`.
///
/// Failure is logged and otherwise ignored; realtime polling is unaffected.
async fn refresh_settings(
    device: Arc<Mutex<Sht20Device>>,
    delay: Duration,
) -> Option<DeviceSettings> {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let result = device.lock().await.read_settings().await;
    match result {
        Ok(settings) => {
            info!(
                device_id = settings.device_id,
                baudrate = settings.baudrate,
                temp_offset = settings.temp_offset,
                hum_offset = settings.hum_offset,
                "SHT20 settings"
            );
            Some(settings)
        }
        Err(error) => {
            warn!(error = %error, "Could not read SHT20 settings");
            None
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
