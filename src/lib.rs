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
//! Resilient delivery of structured log records to a [`syslog`] [daemon].
//!
//! [`syslog`]: https://en.wikipedia.org/wiki/Syslog
//! [daemon]: https://en.wikipedia.org/wiki/Daemon_(computing)
//!
//! # Introduction
//!
//! This crate writes structured log records to a syslog-compatible receiver over one of several
//! transports: the local operating system's syslog facility, or a remote endpoint reached over
//! UDP, TCP or TLS. The interesting part is the network story. A syslog daemon across a network
//! link will, sooner or later, go away; a logging path that starts throwing at its callers the
//! moment the link flaps is worse than useless. The stream-oriented transports here therefore
//! ride a reconnecting connection manager: writes issued during an outage are queued, the
//! connection is retried on a fixed interval for as long as it takes, and on reconnection the
//! queue is flushed in original write order before anything newer. The caller's `write` never
//! blocks & never fails for network trouble; the only error it can produce is the caller's own
//! bug of writing to a stream that has been ended.
//!
//! The pieces are small & separable: [`facility`] holds the syslog constants and the (lossy)
//! mapping from application levels onto them, [`record`] the unit of input, [`formatter`] the
//! wire-format assembly, [`transport`] the delivery variants, [`connection`] the reconnect state
//! machine, and [`stream`] the uniform write/end/close/destroy facade over the lot.
//!
//! # Usage
//!
//! ```no_run
//! use syslog_stream::facility::Level;
//! use syslog_stream::record::Record;
//! use syslog_stream::stream::{Config, SyslogStream};
//!
//! let mut stream = SyslogStream::tcp(Config {
//!     host: String::from("logs.example.com"),
//!     port: 6514,
//!     name: String::from("svc"),
//!     env: String::from("prod"),
//!     ..Config::default()
//! })
//! .unwrap();
//!
//! stream
//!     .write(Record::builder("service started").level(Level::Info).build())
//!     .unwrap();
//! stream.end();
//! ```
//!
//! Will produce syslog entries that look something like this:
//!
//! ```text
//! <14>2025-06-23T16:10:55.123Z hostname svc-prod[12345]: Info: service started
//! ```
//!
//! Plain text works too, reporting as informational:
//!
//! ```no_run
//! # use syslog_stream::stream::{Config, SyslogStream};
//! # let mut stream = SyslogStream::udp(Config::default()).unwrap();
//! stream.write("Hello, world!").unwrap();
//! ```

pub mod connection;
pub mod error;
pub mod facility;
pub mod formatter;
pub mod record;
pub mod stream;
pub mod transport;
