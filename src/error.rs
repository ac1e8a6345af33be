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

//! [syslog-stream](crate) errors

use backtrace::Backtrace;

/// [syslog-stream](crate) error type
///
/// [syslog-stream](crate) eschews libraries like [thiserror], [anyhow] & [Snafu] in favor of a
/// straightforward enumeration with a few match arms chosen on the basis of what the caller will
/// need to respond. Transient network failures never show up here; those are absorbed by the
/// reconnect loop. What remains is caller misuse ([`Error::StreamEnded`]) and configuration
/// problems surfaced at construction time.
///
/// [thiserror]: https://docs.rs/thiserror
/// [anyhow]: https://docs.rs/anyhow
/// [Snafu]: https://docs.rs/snafu/latest/snafu
#[non_exhaustive]
pub enum Error {
    /// Facility codes range from 0 through 23
    BadFacility { value: u8, back: Backtrace },
    /// The stream was ended, closed or destroyed; subsequent writes are a caller bug
    StreamEnded { back: Backtrace },
    /// TLS configuration error (bad certificate, connector setup)
    Tls {
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
        back: Backtrace,
    },
    /// General transport layer error
    Transport {
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
        back: Backtrace,
    },
}

impl std::fmt::Display for Error {
    // `Error` is non-exhaustive so that adding variants won't be a breaking change to our
    // callers. That means the compiler won't catch us if we miss a variant here, so we
    // always include a `_` arm.
    #[allow(unreachable_patterns)]
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::BadFacility { value, .. } => {
                write!(f, "{} is not a syslog facility (expected 0 through 23)", value)
            }
            Error::StreamEnded { .. } => write!(f, "SyslogStream has been ended already"),
            Error::Tls { source, .. } => write!(f, "TLS error: {}", source),
            Error::Transport { source, .. } => write!(f, "Transport error: {}", source),
            _ => write!(f, "Other syslog-stream error"),
        }
    }
}

impl std::fmt::Debug for Error {
    #[allow(unreachable_patterns)]
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::BadFacility { value: _, back } => write!(f, "{}\n{:?}", self, back),
            Error::StreamEnded { back } => write!(f, "{}\n{:?}", self, back),
            Error::Tls { source: _, back } => write!(f, "{}\n{:?}", self, back),
            Error::Transport { source: _, back } => write!(f, "{}\n{:?}", self, back),
            err => write!(f, "syslog-stream error: {}", err),
        }
    }
}

impl std::error::Error for Error {}

impl std::convert::From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Transport {
            source: Box::new(err),
            back: Backtrace::new(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
