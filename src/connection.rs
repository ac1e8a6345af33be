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

//! The reconnecting connection manager behind stream-oriented transports.
//!
//! Syslog delivery over TCP or TLS has to tolerate flapping links without caller-visible errors:
//! the caller's `write` must never block or fail for a transient disconnect. To that end a
//! [`ReconnectingStream`] hands every line to a worker thread over a channel and returns
//! immediately. The worker exclusively owns the underlying connection & the pending queue, and
//! runs a three-state loop:
//!
//! - **Connecting**: a connection attempt is made as soon as the worker starts, and again
//!   whenever the retry delay expires.
//! - **Connected**: lines are written & flushed as they arrive. A write error drops the
//!   connection handle (at most one is ever live) and schedules a retry.
//! - **Disconnected, retry pending**: lines accumulate in the pending queue; after a fixed delay
//!   (1000 ms by default; no exponential growth, no jitter, no attempt cap) the worker tries
//!   again, indefinitely.
//!
//! On every successful connection the pending queue is drained, FIFO, exactly once, before any
//! later line is written; a single channel, a single queue & a single connection give strict
//! write-order delivery with no duplicates. Closing the stream delivers a shutdown command
//! behind any still-queued sends, cancels the retry wait & joins the worker.
//!
//! How a connection is established is the [`Connector`]'s business; [`TcpConnector`] &
//! [`TlsConnector`] cover the plaintext & certificate-validated cases, and tests substitute their
//! own. Constructing a connector performs no I/O.

use crate::error::{Error, Result};

use backtrace::Backtrace;
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};

use std::{
    collections::VecDeque,
    io::Write,
    net::TcpStream,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::JoinHandle,
    time::{Duration, Instant},
};

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                          connectors                                            //
////////////////////////////////////////////////////////////////////////////////////////////////////

/// Connection factory for stream-oriented transports.
///
/// One call per attempt; the returned writer is used until it errors, then dropped. Implementors
/// do no I/O outside [`connect`](Connector::connect), so holding a connector is free.
pub trait Connector: Send + 'static {
    fn connect(&mut self) -> std::io::Result<Box<dyn Write + Send>>;
}

/// Plaintext TCP connections.
pub struct TcpConnector {
    host: String,
    port: u16,
}

impl TcpConnector {
    pub fn new<S: Into<String>>(host: S, port: u16) -> TcpConnector {
        TcpConnector {
            host: host.into(),
            port,
        }
    }
}

impl Connector for TcpConnector {
    fn connect(&mut self) -> std::io::Result<Box<dyn Write + Send>> {
        let stream = TcpStream::connect((self.host.as_str(), self.port))?;
        Ok(Box::new(stream))
    }
}

/// Certificate-validated TLS connections.
///
/// A non-empty `certificate` (PEM) is added to the trusted roots, for daemons presenting
/// self-signed or private-CA certificates. The handshake validates against `host`.
pub struct TlsConnector {
    host: String,
    port: u16,
    connector: native_tls::TlsConnector,
}

impl TlsConnector {
    pub fn new<S: Into<String>>(host: S, port: u16, certificate: &str) -> Result<TlsConnector> {
        let mut builder = native_tls::TlsConnector::builder();
        if !certificate.is_empty() {
            let cert = native_tls::Certificate::from_pem(certificate.as_bytes()).map_err(|err| {
                Error::Tls {
                    source: Box::new(err),
                    back: Backtrace::new(),
                }
            })?;
            builder.add_root_certificate(cert);
        }
        let connector = builder.build().map_err(|err| Error::Tls {
            source: Box::new(err),
            back: Backtrace::new(),
        })?;
        Ok(TlsConnector {
            host: host.into(),
            port,
            connector,
        })
    }
}

impl Connector for TlsConnector {
    fn connect(&mut self) -> std::io::Result<Box<dyn Write + Send>> {
        let stream = TcpStream::connect((self.host.as_str(), self.port))?;
        let stream = self
            .connector
            .connect(&self.host, stream)
            .map_err(std::io::Error::other)?;
        Ok(Box::new(stream))
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                  the reconnecting stream                                       //
////////////////////////////////////////////////////////////////////////////////////////////////////

/// Tuning for the reconnect loop.
#[derive(Clone, Debug)]
pub struct StreamOptions {
    /// Delay between connection attempts.
    pub retry_interval: Duration,
    /// Cap on lines held while disconnected; the oldest are dropped at the cap. `None` keeps
    /// everything.
    pub queue_limit: Option<usize>,
}

impl std::default::Default for StreamOptions {
    fn default() -> Self {
        StreamOptions {
            retry_interval: Duration::from_millis(1000),
            queue_limit: None,
        }
    }
}

enum Command {
    Line(Vec<u8>),
    Shutdown,
}

/// A stream-oriented transport that survives its connection.
///
/// `send` is a non-blocking enqueue; all I/O, reconnection & the retry timer live on the worker
/// thread, which is joined on [`close`](ReconnectingStream::close) (or on drop).
pub struct ReconnectingStream {
    tx: Sender<Command>,
    worker: Option<JoinHandle<()>>,
    connected: Arc<AtomicBool>,
}

impl ReconnectingStream {
    /// Spawn the worker; its first connection attempt happens immediately.
    pub fn start<C: Connector>(connector: C, options: StreamOptions) -> Result<ReconnectingStream> {
        let (tx, rx) = unbounded();
        let connected = Arc::new(AtomicBool::new(false));
        let worker = Worker {
            connector,
            rx,
            retry_interval: options.retry_interval,
            queue_limit: options.queue_limit,
            queue: VecDeque::new(),
            conn: None,
            next_attempt: Instant::now(),
            connected: Arc::clone(&connected),
        };
        let handle = std::thread::Builder::new()
            .name(String::from("syslog-writer"))
            .spawn(move || worker.run())
            .map_err(|err| Error::Transport {
                source: Box::new(err),
                back: Backtrace::new(),
            })?;
        Ok(ReconnectingStream {
            tx,
            worker: Some(handle),
            connected,
        })
    }

    /// Hand one wire line to the worker, newline terminator appended. Never blocks; if the
    /// worker is gone the line is logged & dropped.
    pub fn send(&self, line: &[u8]) {
        let mut buf = Vec::with_capacity(line.len() + 1);
        buf.extend_from_slice(line);
        buf.push(b'\n');
        if self.tx.send(Command::Line(buf)).is_err() {
            tracing::warn!("syslog writer thread is gone; line dropped");
        }
    }

    /// Whether the underlying connection is currently established.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Terminate the connection, suppress further reconnect attempts & join the worker. Lines
    /// sent before the close are still written when a connection is live; queued lines from an
    /// outage are lost. Idempotent.
    pub fn close(&mut self) {
        if let Some(handle) = self.worker.take() {
            let _ = self.tx.send(Command::Shutdown);
            let _ = handle.join();
            self.connected.store(false, Ordering::SeqCst);
        }
    }
}

impl Drop for ReconnectingStream {
    fn drop(&mut self) {
        self.close();
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                        the worker loop                                         //
////////////////////////////////////////////////////////////////////////////////////////////////////

struct Worker<C: Connector> {
    connector: C,
    rx: Receiver<Command>,
    retry_interval: Duration,
    queue_limit: Option<usize>,
    queue: VecDeque<Vec<u8>>,
    conn: Option<Box<dyn Write + Send>>,
    next_attempt: Instant,
    connected: Arc<AtomicBool>,
}

impl<C: Connector> Worker<C> {
    fn run(mut self) {
        loop {
            if self.conn.is_none() {
                if !self.pause_until_retry() {
                    break;
                }
                if !self.reconnect() {
                    self.next_attempt = Instant::now() + self.retry_interval;
                    continue;
                }
            }
            match self.rx.recv() {
                Ok(Command::Line(line)) => self.transmit(line),
                Ok(Command::Shutdown) | Err(_) => break,
            }
        }
        self.teardown();
    }

    /// Queue incoming lines until the next connection attempt is due. Returns false on shutdown.
    fn pause_until_retry(&mut self) -> bool {
        loop {
            let now = Instant::now();
            if now >= self.next_attempt {
                return true;
            }
            match self.rx.recv_timeout(self.next_attempt - now) {
                Ok(Command::Line(line)) => self.enqueue(line),
                Ok(Command::Shutdown) | Err(RecvTimeoutError::Disconnected) => return false,
                Err(RecvTimeoutError::Timeout) => return true,
            }
        }
    }

    /// One connection attempt. On success the pending queue is drained, FIFO, exactly once;
    /// lines that arrived over the channel in the meantime follow it in order.
    fn reconnect(&mut self) -> bool {
        match self.connector.connect() {
            Ok(conn) => {
                tracing::debug!("syslog connection established; {} lines pending", self.queue.len());
                self.conn = Some(conn);
                self.connected.store(true, Ordering::SeqCst);
                while let Some(line) = self.queue.pop_front() {
                    self.transmit(line);
                    if self.conn.is_none() {
                        // Failed mid-drain; the remainder stays queued for the next connection.
                        return false;
                    }
                }
                true
            }
            Err(err) => {
                tracing::debug!("syslog connection attempt failed: {}", err);
                false
            }
        }
    }

    fn transmit(&mut self, line: Vec<u8>) {
        match self.conn.as_mut() {
            Some(conn) => {
                let outcome = conn.write_all(&line).and_then(|()| conn.flush());
                if let Err(err) = outcome {
                    // The line in flight is lost; everything after it queues for the next
                    // connection.
                    tracing::warn!("syslog write failed, reconnecting: {}", err);
                    self.disconnect();
                }
            }
            None => self.enqueue(line),
        }
    }

    fn enqueue(&mut self, line: Vec<u8>) {
        if let Some(limit) = self.queue_limit {
            if limit == 0 {
                return;
            }
            while self.queue.len() >= limit {
                self.queue.pop_front();
                tracing::warn!("syslog pending queue full; oldest line dropped");
            }
        }
        self.queue.push_back(line);
    }

    fn disconnect(&mut self) {
        self.conn = None;
        self.connected.store(false, Ordering::SeqCst);
        self.next_attempt = Instant::now() + self.retry_interval;
    }

    fn teardown(&mut self) {
        if let Some(mut conn) = self.conn.take() {
            let _ = conn.flush();
        }
        self.connected.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod test {

    use super::*;

    use std::{
        net::TcpListener,
        sync::{
            atomic::{AtomicUsize, Ordering},
            Mutex,
        },
    };

    /// Writer appending into shared storage.
    struct SharedWriter(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    /// Connector refusing the first `failures` attempts, then handing out writers into shared
    /// storage.
    struct ScriptedConnector {
        attempts: Arc<AtomicUsize>,
        failures: usize,
        sink: Arc<Mutex<Vec<u8>>>,
    }

    impl Connector for ScriptedConnector {
        fn connect(&mut self) -> std::io::Result<Box<dyn Write + Send>> {
            let n = self.attempts.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                Err(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    "scripted refusal",
                ))
            } else {
                Ok(Box::new(SharedWriter(Arc::clone(&self.sink))))
            }
        }
    }

    fn options() -> StreamOptions {
        StreamOptions {
            retry_interval: Duration::from_millis(5),
            queue_limit: None,
        }
    }

    fn wait_until<F: Fn() -> bool>(what: &str, pred: F) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while !pred() {
            assert!(Instant::now() < deadline, "timed out waiting for {}", what);
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn test_queued_lines_flush_in_order() {
        let sink = Arc::new(Mutex::new(Vec::new()));
        let attempts = Arc::new(AtomicUsize::new(0));
        let mut stream = ReconnectingStream::start(
            ScriptedConnector {
                attempts: Arc::clone(&attempts),
                failures: 3,
                sink: Arc::clone(&sink),
            },
            options(),
        )
        .unwrap();

        // Issued while the connector is still refusing: queued.
        stream.send(b"one");
        stream.send(b"two");
        wait_until("connection", || stream.is_connected());
        // Issued after reconnection: delivered strictly after the queue.
        stream.send(b"three");
        wait_until("flush", || sink.lock().unwrap().len() >= 14);
        stream.close();

        assert_eq!(&*sink.lock().unwrap(), b"one\ntwo\nthree\n");
    }

    #[test]
    fn test_retries_indefinitely() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let mut stream = ReconnectingStream::start(
            ScriptedConnector {
                attempts: Arc::clone(&attempts),
                failures: usize::MAX,
                sink: Arc::new(Mutex::new(Vec::new())),
            },
            options(),
        )
        .unwrap();

        wait_until("repeated attempts", || attempts.load(Ordering::SeqCst) >= 5);
        assert!(!stream.is_connected());
        stream.close();

        // Attempts stop once closed (one may have raced the shutdown).
        let after_close = attempts.load(Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(25));
        assert!(attempts.load(Ordering::SeqCst) <= after_close + 1);
    }

    #[test]
    fn test_queue_limit_drops_oldest() {
        let sink = Arc::new(Mutex::new(Vec::new()));
        let attempts = Arc::new(AtomicUsize::new(0));
        let mut stream = ReconnectingStream::start(
            ScriptedConnector {
                attempts: Arc::clone(&attempts),
                failures: 10,
                sink: Arc::clone(&sink),
            },
            StreamOptions {
                retry_interval: Duration::from_millis(5),
                queue_limit: Some(2),
            },
        )
        .unwrap();

        stream.send(b"a");
        stream.send(b"b");
        stream.send(b"c");
        wait_until("connection", || stream.is_connected());
        wait_until("flush", || sink.lock().unwrap().len() >= 4);
        stream.close();

        assert_eq!(&*sink.lock().unwrap(), b"b\nc\n");
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut stream = ReconnectingStream::start(
            ScriptedConnector {
                attempts: Arc::new(AtomicUsize::new(0)),
                failures: usize::MAX,
                sink: Arc::new(Mutex::new(Vec::new())),
            },
            options(),
        )
        .unwrap();
        stream.close();
        stream.close();
        assert!(!stream.is_connected());
    }

    #[test]
    fn test_delivers_over_tcp() {
        use std::io::Read;

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let mut stream =
            ReconnectingStream::start(TcpConnector::new("127.0.0.1", port), options()).unwrap();

        stream.send(b"hello over tcp");

        let (mut conn, _) = listener.accept().unwrap();
        conn.set_read_timeout(Some(Duration::from_secs(10))).unwrap();
        let mut buf = [0u8; 15];
        conn.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"hello over tcp\n");
        stream.close();
    }
}
