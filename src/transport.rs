/*
    TQS-TNT
    Copyright (C) 2026 Moroya Sakamoto
*/

//! Byte transport to the controller.
//!
//! [`Transport`] is the seam between the session and the network; tests
//! substitute scripted implementations. [`TcpTransport`] keeps one
//! persistent connection, opens it lazily, and drops it on any send or
//! receive failure so that the next exchange reconnects.
//!
//! ## Read termination
//!
//! A response ends when the accumulated bytes contain `</tnt>`, when the
//! peer closes, or when a read blocks past the timeout. A timeout is not an
//! error: whatever has arrived is returned. A peer close also drops the
//! connection so the next exchange opens a fresh one.

use crate::error::TransportError;
use crate::tag;
use std::io::{ErrorKind, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;

const READ_CHUNK: usize = 64 * 1024;

/// Sends one request document and returns the response text.
pub trait Transport {
    /// Send `payload` and collect the response, waiting at most `timeout`
    /// per read.
    fn send_and_receive(&mut self, payload: &str, timeout: Duration) -> Result<String, TransportError>;

    /// Open the connection ahead of the first exchange.
    fn connect(&mut self) -> Result<(), TransportError> {
        Ok(())
    }

    /// Release the connection. Idempotent.
    fn close(&mut self) {}
}

enum ConnState {
    Disconnected,
    Connected { stream: TcpStream },
}

/// TCP transport with one persistent connection.
pub struct TcpTransport {
    host: String,
    port: u16,
    connect_timeout: Duration,
    state: ConnState,
}

impl TcpTransport {
    /// Create an unconnected transport.
    pub fn new(host: &str, port: u16, connect_timeout: Duration) -> Self {
        Self {
            host: host.to_string(),
            port,
            connect_timeout,
            state: ConnState::Disconnected,
        }
    }

    #[inline(always)]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[inline(always)]
    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.state, ConnState::Connected { .. })
    }

    /// Point the transport at another endpoint.
    ///
    /// A changed host or port closes the current connection; the next
    /// exchange reconnects.
    pub fn retarget(&mut self, host: &str, port: u16) {
        if self.host != host || self.port != port {
            self.close();
            self.host = host.to_string();
            self.port = port;
        }
    }

    fn open(&self) -> Result<TcpStream, TransportError> {
        let endpoint = format!("{}:{}", self.host, self.port);
        let addrs = endpoint
            .to_socket_addrs()
            .map_err(|_| TransportError::Resolve(endpoint.clone()))?;

        let mut last_err = None;
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, self.connect_timeout) {
                Ok(stream) => {
                    stream.set_nodelay(true).ok();
                    log::info!("[TcpTransport::connect] connected to {}", addr);
                    return Ok(stream);
                }
                Err(e) => last_err = Some(e),
            }
        }
        match last_err {
            Some(source) => Err(TransportError::Connect {
                addr: endpoint,
                source,
            }),
            None => Err(TransportError::Resolve(endpoint)),
        }
    }

    fn stream(&mut self) -> Result<&mut TcpStream, TransportError> {
        if !self.is_connected() {
            self.connect()?;
        }
        match &mut self.state {
            ConnState::Connected { stream } => Ok(stream),
            ConnState::Disconnected => Err(TransportError::NotConnected),
        }
    }
}

/// Read until the end-of-message marker, EOF, or a timeout.
///
/// Returns the bytes read and whether the peer closed the stream.
fn read_response<R: Read>(reader: &mut R) -> std::io::Result<(Vec<u8>, bool)> {
    let mut acc = Vec::new();
    let mut chunk = vec![0u8; READ_CHUNK];
    loop {
        match reader.read(&mut chunk) {
            Ok(0) => return Ok((acc, true)),
            Ok(n) => {
                // Only the new bytes plus a marker-sized overlap can complete the marker.
                let from = acc.len().saturating_sub(tag::END_OF_MESSAGE.len() - 1);
                acc.extend_from_slice(&chunk[..n]);
                if contains(&acc[from..], tag::END_OF_MESSAGE) {
                    break;
                }
            }
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                log::debug!(
                    "[TcpTransport] read timed out after {} bytes; returning partial response",
                    acc.len()
                );
                break;
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok((acc, false))
}

#[inline(always)]
fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

impl Transport for TcpTransport {
    fn send_and_receive(&mut self, payload: &str, timeout: Duration) -> Result<String, TransportError> {
        let stream = self.stream()?;
        stream.set_read_timeout(Some(timeout)).ok();

        if let Err(e) = stream.write_all(payload.as_bytes()).and_then(|_| stream.flush()) {
            self.close();
            return Err(TransportError::Send(e));
        }
        log::debug!("[TcpTransport::send_and_receive] sent {} bytes", payload.len());

        match read_response(stream) {
            Ok((bytes, closed)) => {
                log::debug!("[TcpTransport::send_and_receive] received {} bytes", bytes.len());
                if closed {
                    log::info!("[TcpTransport::send_and_receive] peer closed the connection");
                    self.close();
                }
                Ok(String::from_utf8_lossy(&bytes).into_owned())
            }
            Err(e) => {
                self.close();
                Err(TransportError::Receive(e))
            }
        }
    }

    fn connect(&mut self) -> Result<(), TransportError> {
        self.close();
        let stream = self.open()?;
        self.state = ConnState::Connected { stream };
        Ok(())
    }

    fn close(&mut self) {
        if let ConnState::Connected { stream } =
            std::mem::replace(&mut self.state, ConnState::Disconnected)
        {
            stream.shutdown(Shutdown::Both).ok();
            log::info!("[TcpTransport::close] closed {}:{}", self.host, self.port);
        }
    }
}

impl Drop for TcpTransport {
    fn drop(&mut self) {
        self.close();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
