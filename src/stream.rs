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

//! The public facade: one write/end/close/destroy contract across all transport variants.
//!
//! A [`SyslogStream`] composes a [`Formatter`] with a [`Transport`] value selected at
//! construction. `write` is synchronous & non-blocking whatever the variant: formatting plus a
//! channel enqueue (stream transports), a single datagram (UDP), or a sink delegate call
//! (local). Transient network failure never reaches the caller; the only caller-visible error
//! out of `write` is writing to a stream that has been ended.

use crate::{
    connection::{ReconnectingStream, StreamOptions, TcpConnector, TlsConnector},
    error::{Error, Result},
    facility::Facility,
    formatter::Formatter,
    record::Record,
    transport::{LocalSink, LocalTransport, Transport, UdpTransport},
};

use backtrace::Backtrace;

/// The configuration surface consumed by the core. Validated at construction & immutable
/// thereafter.
#[derive(Clone, Debug)]
pub struct Config {
    /// Source-category code combined with severity to form each message's priority.
    pub facility: Facility,
    /// The emitting application; together with `env` it forms the header's process tag.
    pub name: String,
    /// Deployment environment; empty leaves the process tag as the bare name.
    pub env: String,
    /// Receiver host, network variants only.
    pub host: String,
    /// Receiver port, network variants only.
    pub port: u16,
    /// PEM certificate added to the trusted roots, TLS only; empty for the system roots.
    pub certificate: String,
}

impl std::default::Default for Config {
    fn default() -> Self {
        Config {
            facility: Facility::default(),
            name: default_name(),
            env: String::new(),
            host: String::from("127.0.0.1"),
            port: 8000,
            certificate: String::new(),
        }
    }
}

/// The emitting application's name per the current executable, `syslog` when that cannot be
/// retrieved.
fn default_name() -> String {
    std::env::current_exe()
        .ok()
        .and_then(|pbuf| {
            pbuf.file_name()
                .map(|os_str| os_str.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| String::from("syslog"))
}

/// A writable stream of log records bound for a syslog receiver.
pub struct SyslogStream {
    formatter: Formatter,
    transport: Transport,
    facility: Facility,
    host: Option<String>,
    port: Option<u16>,
    writable: bool,
}

impl SyslogStream {
    /// Deliver through the local OS sink; `sink` is opened for `config.name` before any send.
    pub fn local(sink: Box<dyn LocalSink + Send>, config: Config) -> SyslogStream {
        let transport = Transport::Local(LocalTransport::open(
            sink,
            &config.name,
            0,
            config.facility,
        ));
        SyslogStream::assemble(transport, config)
    }

    /// Deliver via fire-and-forget datagrams to `config.host:config.port`.
    pub fn udp(config: Config) -> Result<SyslogStream> {
        let transport =
            Transport::Udp(UdpTransport::new((config.host.as_str(), config.port))?);
        Ok(SyslogStream::assemble(transport, config))
    }

    /// Deliver over a persistent, reconnecting TCP connection.
    pub fn tcp(config: Config) -> Result<SyslogStream> {
        let connector = TcpConnector::new(config.host.clone(), config.port);
        let transport =
            Transport::Tcp(ReconnectingStream::start(connector, StreamOptions::default())?);
        Ok(SyslogStream::assemble(transport, config))
    }

    /// Deliver over a persistent, reconnecting, certificate-validated TLS connection.
    pub fn tls(config: Config) -> Result<SyslogStream> {
        let connector =
            TlsConnector::new(config.host.clone(), config.port, &config.certificate)?;
        let transport =
            Transport::Tls(ReconnectingStream::start(connector, StreamOptions::default())?);
        Ok(SyslogStream::assemble(transport, config))
    }

    /// Compose a stream around an already-built transport; the seam tests use to avoid real
    /// I/O, and callers use for custom connectors or retry tuning.
    pub fn with_transport(transport: Transport, config: Config) -> SyslogStream {
        SyslogStream::assemble(transport, config)
    }

    fn assemble(transport: Transport, config: Config) -> SyslogStream {
        let network = transport.proto().is_some();
        let Config {
            facility,
            name,
            env,
            host,
            port,
            certificate: _,
        } = config;
        SyslogStream {
            formatter: Formatter::new(facility, name, env),
            transport,
            facility,
            host: network.then_some(host),
            port: network.then_some(port),
            writable: true,
        }
    }

    /// Format one record & hand it to the transport.
    ///
    /// Fails only for caller misuse: writing to a stream that has been ended, closed or
    /// destroyed. Network trouble is absorbed downstream (queued for streams, dropped for
    /// datagrams).
    pub fn write<R: Into<Record>>(&mut self, record: R) -> Result<()> {
        if !self.writable {
            return Err(Error::StreamEnded {
                back: Backtrace::new(),
            });
        }
        let record = record.into();
        match &mut self.transport {
            Transport::Local(sink) => {
                let (priority, body) = self.formatter.priority_and_body(&record);
                sink.send(priority, &body);
            }
            Transport::Udp(udp) => udp.send(&self.formatter.line(&record)),
            Transport::Tcp(stream) | Transport::Tls(stream) => {
                stream.send(&self.formatter.line(&record))
            }
        }
        Ok(())
    }

    /// Mark the stream unwritable & close the transport.
    pub fn end(&mut self) {
        self.close();
    }

    /// Write one trailing record, then end the stream.
    pub fn end_with<R: Into<Record>>(&mut self, record: R) -> Result<()> {
        self.write(record)?;
        self.end();
        Ok(())
    }

    /// Transport-specific teardown; any later `write` fails. Idempotent.
    pub fn close(&mut self) {
        self.writable = false;
        self.transport.close();
    }

    /// [`close`](SyslogStream::close), kept as a distinct entry point for callers tearing a
    /// stream down on an error path.
    pub fn destroy(&mut self) {
        self.writable = false;
        self.transport.close();
    }

    pub fn writable(&self) -> bool {
        self.writable
    }

    /// Whether the transport is ready: a live connection for stream variants; trivially true
    /// for the local sink & datagrams.
    pub fn is_connected(&self) -> bool {
        match &self.transport {
            Transport::Local(_) | Transport::Udp(_) => true,
            Transport::Tcp(stream) | Transport::Tls(stream) => stream.is_connected(),
        }
    }
}

impl std::fmt::Display for SyslogStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SyslogStream<facility={}", self.facility)?;
        if let Some(host) = &self.host {
            write!(f, ", host={}", host)?;
        }
        if let Some(port) = self.port {
            write!(f, ", port={}", port)?;
        }
        if let Some(proto) = self.transport.proto() {
            write!(f, ", proto={}", proto)?;
        }
        write!(f, ">")
    }
}
