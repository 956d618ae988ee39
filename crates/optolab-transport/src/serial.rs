use std::io::{ErrorKind, Read, Write};
use std::time::Duration;

use serialport::{ClearBuffer, DataBits, FlowControl, Parity, SerialPort, SerialPortType, StopBits};
use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::traits::ByteTransport;

/// Line settings for a serial port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialSettings {
    /// Baud rate. Default: 9600.
    pub baud_rate: u32,
    /// Data bits. Default: 8.
    pub data_bits: DataBits,
    /// Parity. Default: none.
    pub parity: Parity,
    /// Stop bits. Default: 1.
    pub stop_bits: StopBits,
    /// Flow control. Default: none.
    pub flow_control: FlowControl,
    /// Per-read timeout on the port. Default: 1 s.
    pub timeout: Duration,
}

impl SerialSettings {
    /// 8N1 settings at the given baud rate, keeping the default timeout.
    pub fn with_baud_rate(baud_rate: u32) -> Self {
        Self {
            baud_rate,
            ..Self::default()
        }
    }
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            baud_rate: 9600,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
            flow_control: FlowControl::None,
            timeout: Duration::from_secs(1),
        }
    }
}

/// A [`ByteTransport`] over an operating-system serial port.
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
    name: String,
}

impl SerialTransport {
    /// Open `port` with the given line settings.
    pub fn open(port: &str, settings: &SerialSettings) -> Result<Self> {
        let handle = serialport::new(port, settings.baud_rate)
            .data_bits(settings.data_bits)
            .parity(settings.parity)
            .stop_bits(settings.stop_bits)
            .flow_control(settings.flow_control)
            .timeout(settings.timeout)
            .open()
            .map_err(|e| TransportError::Open {
                port: port.to_string(),
                reason: e.to_string(),
            })?;

        info!(port, baud = settings.baud_rate, "serial port opened");
        Ok(Self {
            port: handle,
            name: port.to_string(),
        })
    }

    /// Wrap an already-open port handle.
    pub fn from_port(port: Box<dyn SerialPort>) -> Self {
        let name = port.name().unwrap_or_else(|| "<unnamed>".to_string());
        Self { port, name }
    }

    /// Name the port was opened under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Change the per-read timeout on the port.
    pub fn set_timeout(&mut self, timeout: Duration) -> Result<()> {
        self.port.set_timeout(timeout)?;
        Ok(())
    }

    /// Borrow the underlying port.
    pub fn get_ref(&self) -> &dyn SerialPort {
        self.port.as_ref()
    }

    /// Consume the transport and return the port handle.
    pub fn into_inner(self) -> Box<dyn SerialPort> {
        self.port
    }
}

impl ByteTransport for SerialTransport {
    fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        let mut written = 0;
        while written < buf.len() {
            match self.port.write(&buf[written..]) {
                Ok(0) => {
                    return Err(TransportError::Io(std::io::Error::new(
                        ErrorKind::WriteZero,
                        "serial port accepted zero bytes",
                    )))
                }
                Ok(n) => written += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
        self.port.flush()?;
        Ok(())
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.port.read(&mut buf[filled..]) {
                Ok(0) => {
                    return Err(TransportError::Closed {
                        expected: buf.len(),
                        received: filled,
                    })
                }
                Ok(n) => filled += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
        Ok(())
    }

    fn bytes_available(&mut self) -> Result<usize> {
        Ok(self.port.bytes_to_read()? as usize)
    }

    fn flush_input(&mut self) -> Result<()> {
        self.port.clear(ClearBuffer::Input)?;
        Ok(())
    }

    fn flush_output(&mut self) -> Result<()> {
        self.port.clear(ClearBuffer::Output)?;
        Ok(())
    }
}

impl std::fmt::Debug for SerialTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialTransport")
            .field("name", &self.name)
            .finish()
    }
}

/// A serial port visible to the operating system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortSummary {
    /// Device path or COM name.
    pub name: String,
    /// Bus the port sits on (`usb`, `pci`, `bluetooth`, `unknown`).
    pub kind: &'static str,
    /// Manufacturer / product string where the OS reports one.
    pub description: Option<String>,
}

/// Enumerate serial ports on this machine.
pub fn available_ports() -> Result<Vec<PortSummary>> {
    let ports = serialport::available_ports()?;
    debug!(count = ports.len(), "enumerated serial ports");

    Ok(ports
        .into_iter()
        .map(|info| {
            let (kind, description) = match info.port_type {
                SerialPortType::UsbPort(usb) => {
                    let text = match (usb.manufacturer, usb.product) {
                        (Some(m), Some(p)) => Some(format!("{m} {p}")),
                        (Some(m), None) => Some(m),
                        (None, Some(p)) => Some(p),
                        (None, None) => None,
                    };
                    ("usb", text)
                }
                SerialPortType::PciPort => ("pci", None),
                SerialPortType::BluetoothPort => ("bluetooth", None),
                SerialPortType::Unknown => ("unknown", None),
            };
            PortSummary {
                name: info.port_name,
                kind,
                description,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_are_9600_8n1() {
        let settings = SerialSettings::default();
        assert_eq!(settings.baud_rate, 9600);
        assert_eq!(settings.data_bits, DataBits::Eight);
        assert_eq!(settings.parity, Parity::None);
        assert_eq!(settings.stop_bits, StopBits::One);
        assert_eq!(settings.timeout, Duration::from_secs(1));
    }

    #[test]
    fn with_baud_rate_keeps_line_defaults() {
        let settings = SerialSettings::with_baud_rate(38400);
        assert_eq!(settings.baud_rate, 38400);
        assert_eq!(settings.flow_control, FlowControl::None);
    }

    #[test]
    fn open_missing_port_reports_name() {
        let err = SerialTransport::open("/dev/optolab-does-not-exist", &SerialSettings::default())
            .unwrap_err();
        match err {
            TransportError::Open { port, .. } => assert_eq!(port, "/dev/optolab-does-not-exist"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
