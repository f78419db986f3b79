// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Request execution shared by the TCP and RTU transports.
//!
//! Once attached, a `tokio-modbus` context frames requests identically on
//! both links. [`ContextLink`] owns that context, applies the operation
//! timeout and maps `tokio-modbus` outcomes onto the read/write error
//! taxonomy.

use std::io;
use std::time::Duration;

use tokio::time::timeout;
use tokio_modbus::client::{Context as ModbusContext, Reader, Writer};
use tokio_modbus::prelude::*;
use tokio_modbus::{Error as TokioModbusError, ExceptionCode};

use crate::error::{ModbusError, ModbusReadError, ModbusResult, ModbusWriteError};
use crate::types::RegisterType;

/// An attached `tokio-modbus` context plus the per-request timeout.
pub(crate) struct ContextLink {
    context: Option<ModbusContext>,
    operation_timeout: Duration,
}

impl ContextLink {
    pub(crate) fn new(operation_timeout: Duration) -> Self {
        Self {
            context: None,
            operation_timeout,
        }
    }

    pub(crate) fn attach(&mut self, context: ModbusContext) {
        self.context = Some(context);
    }

    pub(crate) fn is_attached(&self) -> bool {
        self.context.is_some()
    }

    /// Drops the context, closing the link gracefully where possible.
    pub(crate) async fn detach(&mut self) {
        if let Some(mut ctx) = self.context.take() {
            if let Err(e) = ctx.disconnect().await {
                tracing::warn!(error = %e, "Error disconnecting from Modbus device");
            }
        }
    }

    fn context_for(&mut self, unit: u8) -> ModbusResult<&mut ModbusContext> {
        let ctx = self.context.as_mut().ok_or_else(ModbusError::not_connected)?;
        ctx.set_slave(Slave(unit));
        Ok(ctx)
    }

    pub(crate) async fn read(
        &mut self,
        register_type: RegisterType,
        address: u16,
        count: u16,
        unit: u8,
    ) -> ModbusResult<Vec<u16>> {
        let duration = self.operation_timeout;
        let ctx = self.context_for(unit)?;

        let outcome = match register_type {
            RegisterType::InputRegister => {
                timeout(duration, ctx.read_input_registers(address, count)).await
            }
            RegisterType::HoldingRegister => {
                timeout(duration, ctx.read_holding_registers(address, count)).await
            }
        };

        match outcome {
            Err(_) => Err(ModbusReadError::Timeout {
                register_type,
                address,
                count,
                duration,
            }
            .into()),
            Ok(Err(TokioModbusError::Transport(source))) if is_timeout(&source) => {
                Err(ModbusReadError::Timeout {
                    register_type,
                    address,
                    count,
                    duration,
                }
                .into())
            }
            Ok(Err(TokioModbusError::Transport(source))) => Err(ModbusReadError::LinkDropped {
                register_type,
                address,
                count,
                source,
            }
            .into()),
            Ok(Err(TokioModbusError::Protocol(protocol))) => {
                Err(ModbusReadError::InvalidResponse {
                    register_type,
                    address,
                    message: protocol.to_string(),
                }
                .into())
            }
            Ok(Ok(Err(exception))) => Err(ModbusReadError::exception(
                register_type,
                address,
                count,
                exception_code_to_u8(&exception),
            )
            .into()),
            Ok(Ok(Ok(values))) => Ok(values),
        }
    }

    pub(crate) async fn write_single(
        &mut self,
        address: u16,
        value: u16,
        unit: u8,
    ) -> ModbusResult<()> {
        let duration = self.operation_timeout;
        let ctx = self.context_for(unit)?;
        let outcome = timeout(duration, ctx.write_single_register(address, value)).await;
        map_write_outcome(outcome, address, 1, duration)
    }

    pub(crate) async fn write_multiple(
        &mut self,
        address: u16,
        values: &[u16],
        unit: u8,
    ) -> ModbusResult<()> {
        let duration = self.operation_timeout;
        let count = u16::try_from(values.len()).unwrap_or(u16::MAX);
        let ctx = self.context_for(unit)?;
        let outcome = timeout(duration, ctx.write_multiple_registers(address, values)).await;
        map_write_outcome(outcome, address, count, duration)
    }
}

fn map_write_outcome(
    outcome: Result<tokio_modbus::Result<()>, tokio::time::error::Elapsed>,
    address: u16,
    count: u16,
    duration: Duration,
) -> ModbusResult<()> {
    match outcome {
        Err(_) => Err(ModbusWriteError::Timeout {
            address,
            count,
            duration,
        }
        .into()),
        Ok(Err(TokioModbusError::Transport(source))) if is_timeout(&source) => {
            Err(ModbusWriteError::Timeout {
                address,
                count,
                duration,
            }
            .into())
        }
        Ok(Err(TokioModbusError::Transport(source))) => Err(ModbusWriteError::LinkDropped {
            address,
            count,
            source,
        }
        .into()),
        Ok(Err(TokioModbusError::Protocol(protocol))) => Err(ModbusWriteError::InvalidResponse {
            address,
            message: protocol.to_string(),
        }
        .into()),
        Ok(Ok(Err(exception))) => {
            Err(ModbusWriteError::exception(address, count, exception_code_to_u8(&exception)).into())
        }
        Ok(Ok(Ok(()))) => Ok(()),
    }
}

fn is_timeout(error: &io::Error) -> bool {
    error.kind() == io::ErrorKind::TimedOut
}

/// Returns the wire value of an exception code.
pub(crate) fn exception_code_to_u8(code: &ExceptionCode) -> u8 {
    match code {
        ExceptionCode::IllegalFunction => 0x01,
        ExceptionCode::IllegalDataAddress => 0x02,
        ExceptionCode::IllegalDataValue => 0x03,
        ExceptionCode::ServerDeviceFailure => 0x04,
        ExceptionCode::Acknowledge => 0x05,
        ExceptionCode::ServerDeviceBusy => 0x06,
        ExceptionCode::MemoryParityError => 0x08,
        ExceptionCode::GatewayPathUnavailable => 0x0A,
        ExceptionCode::GatewayTargetDevice => 0x0B,
        ExceptionCode::Custom(code) => *code,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exception_code_mapping() {
        assert_eq!(exception_code_to_u8(&ExceptionCode::IllegalFunction), 0x01);
        assert_eq!(exception_code_to_u8(&ExceptionCode::IllegalDataAddress), 0x02);
        assert_eq!(exception_code_to_u8(&ExceptionCode::ServerDeviceBusy), 0x06);
        assert_eq!(exception_code_to_u8(&ExceptionCode::GatewayTargetDevice), 0x0B);
        assert_eq!(exception_code_to_u8(&ExceptionCode::Custom(0x42)), 0x42);
    }

    #[tokio::test]
    async fn test_unattached_link_reports_not_connected() {
        let mut link = ContextLink::new(Duration::from_secs(3));
        assert!(!link.is_attached());

        let error = link
            .read(RegisterType::InputRegister, 1, 2, 1)
            .await
            .unwrap_err();
        assert!(matches!(
            error,
            ModbusError::Transport(crate::error::TransportError::NotConnected)
        ));

        let error = link.write_single(257, 5, 1).await.unwrap_err();
        assert_eq!(error.category(), "transport");
    }

    #[test]
    fn test_write_outcome_mapping() {
        let timeout = Duration::from_secs(3);

        let ok = map_write_outcome(Ok(Ok(Ok(()))), 259, 2, timeout);
        assert!(ok.is_ok());

        let rejected = map_write_outcome(
            Ok(Ok(Err(ExceptionCode::IllegalDataValue))),
            259,
            2,
            timeout,
        )
        .unwrap_err();
        assert_eq!(rejected.exception_code(), Some(0x03));

        let dropped = map_write_outcome(
            Ok(Err(TokioModbusError::Transport(io::Error::from(
                io::ErrorKind::BrokenPipe,
            )))),
            257,
            1,
            timeout,
        )
        .unwrap_err();
        assert!(matches!(
            dropped,
            ModbusError::Write(ModbusWriteError::LinkDropped { address: 257, .. })
        ));
    }
}
