// Line-oriented serial transport
//
// Write framing is a trailing '\n'; read framing is one line, decoded as
// text and stripped of trailing whitespace. Reads are bounded by the
// configured timeout: a read that times out returns whatever arrived
// (possibly nothing) so downstream parsing fails instead of the caller
// hanging.

use std::io::{ErrorKind, Read, Write};

use tracing::debug;

use crate::config::{BAUD_RATE, REPLY_TIMEOUT};
use crate::motion::protocol::Result;

/// One request/reply line exchange against the device
pub trait LineTransport: Send {
    /// Write one line, newline-terminated.
    fn write_line(&mut self, line: &str) -> Result<()>;

    /// Read one line, stripped of its terminator. Returns what was received
    /// so far (possibly empty) if the read times out.
    fn read_line(&mut self) -> Result<String>;
}

/// Production transport backed by a serial port
pub struct SerialLineTransport {
    port: Box<dyn serialport::SerialPort>,
}

impl SerialLineTransport {
    /// Open the serial port at the given address with the driver's fixed
    /// baud rate and reply timeout.
    pub fn open(address: &str) -> Result<Self> {
        let port = serialport::new(address, BAUD_RATE)
            .timeout(REPLY_TIMEOUT)
            .open()?;
        Ok(Self { port })
    }
}

impl LineTransport for SerialLineTransport {
    fn write_line(&mut self, line: &str) -> Result<()> {
        debug!("-> {}", line);
        self.port.write_all(line.as_bytes())?;
        self.port.write_all(b"\n")?;
        self.port.flush()?;
        Ok(())
    }

    fn read_line(&mut self) -> Result<String> {
        let mut buf = Vec::new();
        let mut byte = [0u8; 1];
        loop {
            match self.port.read(&mut byte) {
                Ok(0) => break,
                Ok(_) => {
                    if byte[0] == b'\n' {
                        break;
                    }
                    buf.push(byte[0]);
                }
                Err(e) if e.kind() == ErrorKind::TimedOut => break,
                Err(e) => return Err(e.into()),
            }
        }
        let line = String::from_utf8_lossy(&buf).trim_end().to_string();
        debug!("<- {}", line);
        Ok(line)
    }
}

/// List serial port names visible on this machine. Discovery is for the
/// operator's benefit only; the driver's address setting keeps its fixed
/// choice list.
pub fn available_port_names() -> Result<Vec<String>> {
    let ports = serialport::available_ports()?;
    Ok(ports.into_iter().map(|p| p.port_name).collect())
}

#[cfg(test)]
pub(crate) mod mock {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use super::LineTransport;
    use crate::motion::protocol::Result;

    /// In-memory transport that replays pre-programmed replies and records
    /// every line sent to it
    pub struct ScriptedTransport {
        replies: VecDeque<String>,
        sent: Arc<Mutex<Vec<String>>>,
    }

    impl ScriptedTransport {
        pub fn new(replies: &[&str]) -> Self {
            Self {
                replies: replies.iter().map(|r| r.to_string()).collect(),
                sent: Arc::new(Mutex::new(Vec::new())),
            }
        }

        /// Shared handle to the lines written so far, valid after the
        /// transport has been handed to a driver.
        pub fn sent_lines(&self) -> Arc<Mutex<Vec<String>>> {
            Arc::clone(&self.sent)
        }
    }

    impl LineTransport for ScriptedTransport {
        fn write_line(&mut self, line: &str) -> Result<()> {
            self.sent.lock().unwrap().push(line.to_string());
            Ok(())
        }

        fn read_line(&mut self) -> Result<String> {
            // An exhausted script behaves like a timed-out device
            Ok(self.replies.pop_front().unwrap_or_default())
        }
    }
}
