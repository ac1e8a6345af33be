// Copyright (C) 2025 the syslog-stream developers
//
// This file is part of syslog-stream.
//
// syslog-stream is free software: you can redistribute it and/or modify it under the terms of the
// GNU General Public License as published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// syslog-stream is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See
// the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with syslog-stream.  If
// not, see <http://www.gnu.org/licenses/>.

//! The syslog transport layer.
//!
//! This module defines the concrete delivery mechanisms behind a stream: the opaque local OS sink
//! ([`LocalSink`]/[`LocalTransport`]), fire-and-forget datagrams ([`UdpTransport`]), and the
//! [`Transport`] value that dispatches among them. Stream-oriented delivery (TCP & TLS) rides the
//! reconnecting manager in [`connection`](crate::connection); one [`ReconnectingStream`] serves
//! both, the two differing only in how a connection is established.
//!
//! All variants share one contract: `send` never fails for transient network trouble. Datagram
//! loss is silent & acceptable; stream-oriented loss is bridged by the manager's pending queue.

use crate::{
    connection::ReconnectingStream,
    error::{Error, Result},
    facility::Facility,
};

use backtrace::Backtrace;

use std::net::UdpSocket;

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                       the local OS sink                                        //
////////////////////////////////////////////////////////////////////////////////////////////////////

/// The operating system's native syslog delivery mechanism, as an opaque collaborator.
///
/// The core neither implements nor tests this; whatever the host process uses to reach
/// `syslog(3)` (or journald, or a test double) plugs in here. The sink frames its own message
/// header, so it receives only the priority value & the message body.
pub trait LocalSink {
    /// Open the sink for the given identity; called once, before any send.
    fn open(&mut self, identity: &str, options: u32, facility: Facility);
    /// Deliver one message at the given priority (facility & severity combined).
    fn send(&mut self, priority: u8, message: &str) -> std::io::Result<()>;
    /// Tear the sink down; no sends follow.
    fn close(&mut self);
}

/// Delegates every send to the external OS sink.
pub struct LocalTransport {
    sink: Box<dyn LocalSink + Send>,
}

impl LocalTransport {
    pub fn open(
        mut sink: Box<dyn LocalSink + Send>,
        identity: &str,
        options: u32,
        facility: Facility,
    ) -> LocalTransport {
        sink.open(identity, options, facility);
        LocalTransport { sink }
    }
    /// Sink failures are treated like any other transport-transient fault: logged, not surfaced.
    pub fn send(&mut self, priority: u8, message: &str) {
        if let Err(err) = self.sink.send(priority, message) {
            tracing::warn!("local syslog sink refused a message: {}", err);
        }
    }
    pub fn close(&mut self) {
        self.sink.close();
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                       datagram transport                                       //
////////////////////////////////////////////////////////////////////////////////////////////////////

/// Sending syslog messages via UDP datagrams.
///
/// One connectionless socket per transport, opened at construction. Each send fires a single
/// packet with no acknowledgment, no retry & no queuing; loss is best-effort by design.
pub struct UdpTransport {
    socket: UdpSocket,
}

impl UdpTransport {
    /// Construct a datagram transport aimed at `addr`.
    pub fn new<A: std::net::ToSocketAddrs>(addr: A) -> Result<UdpTransport> {
        // Bind to any available port...
        let socket = UdpSocket::bind("0.0.0.0:0").map_err(|err| Error::Transport {
            source: Box::new(err),
            back: Backtrace::new(),
        })?;
        // and connect to the syslog daemon at `addr`:
        socket.connect(addr).map_err(|err| Error::Transport {
            source: Box::new(err),
            back: Backtrace::new(),
        })?;
        Ok(UdpTransport { socket })
    }
    /// Fire one packet. Failures (including ICMP rejections reported on later calls against a
    /// connected socket) are logged & swallowed.
    pub fn send(&mut self, line: &[u8]) {
        if let Err(err) = self.socket.send(line) {
            tracing::debug!("syslog datagram dropped: {}", err);
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                       variant dispatch                                         //
////////////////////////////////////////////////////////////////////////////////////////////////////

/// The delivery mechanism behind a stream, selected by configuration at construction.
///
/// Plain & encrypted stream variants share the [`ReconnectingStream`] manager; they are kept as
/// separate variants only so diagnostics can name the protocol.
pub enum Transport {
    Local(LocalTransport),
    Udp(UdpTransport),
    Tcp(ReconnectingStream),
    Tls(ReconnectingStream),
}

impl Transport {
    /// Protocol name for diagnostics; `None` for the local sink.
    pub fn proto(&self) -> Option<&'static str> {
        match self {
            Transport::Local(_) => None,
            Transport::Udp(_) => Some("udp"),
            Transport::Tcp(_) => Some("tcp"),
            Transport::Tls(_) => Some("tls"),
        }
    }

    /// Orderly, idempotent shutdown. The datagram socket simply closes with the value.
    pub fn close(&mut self) {
        match self {
            Transport::Local(sink) => sink.close(),
            Transport::Udp(_) => {}
            Transport::Tcp(stream) | Transport::Tls(stream) => stream.close(),
        }
    }
}

#[cfg(test)]
mod test {

    use super::*;

    use std::time::Duration;

    #[test]
    fn test_datagram_delivery() {
        let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
        receiver
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
        let mut transport = UdpTransport::new(receiver.local_addr().unwrap()).unwrap();
        transport.send(b"<14>fire and forget");
        let mut buf = [0u8; 64];
        let n = receiver.recv(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"<14>fire and forget");
    }

    #[test]
    fn test_datagram_loss_is_silent() {
        // Aim at a port with no listener. On Linux the ICMP rejection surfaces as an error on a
        // later call against the connected socket; none of it may reach the caller or wedge
        // subsequent sends.
        let throwaway = UdpSocket::bind("127.0.0.1:0").unwrap();
        let addr = throwaway.local_addr().unwrap();
        drop(throwaway);

        let mut transport = UdpTransport::new(addr).unwrap();
        transport.send(b"into the void");
        transport.send(b"still fine");
        transport.send(b"and again");
    }
}
