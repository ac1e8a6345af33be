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

//! syslog facility & severity definitions, and the application-level mapping onto them.
//!
//! [`Facility`] and [`Severity`] replicate the names used in `<syslog.h>`. [`Level`] is the
//! application-side scale carried by log records; [`Level::severity`] collapses it onto the
//! syslog codes.

use crate::error::Error;

use backtrace::Backtrace;

type StdResult<T, E> = std::result::Result<T, E>;

/// The twenty-four syslog "facilities". The enumeration values duplicate the constants defined in
/// `<syslog.h>`, albeit multiplied by 8 for convenience in forming syslog message headers (which
/// again mirrors the `#define`s in `<syslog.h>`).
///
/// The facility indicates the source of the log message. Most network-bound emitters will want
/// [`Facility::LOG_USER`] (the default) or one of the `LOG_LOCAL` values.
#[allow(non_camel_case_types)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Facility {
    /// kernel messages
    LOG_KERN = 0 << 3,
    /// random user-level messages
    LOG_USER = 1 << 3,
    /// mail system
    LOG_MAIL = 2 << 3,
    /// system daemons
    LOG_DAEMON = 3 << 3,
    /// security/authorization messages
    LOG_AUTH = 4 << 3,
    /// messages generated internally by syslogd
    LOG_SYSLOG = 5 << 3,
    /// line printer subsystem
    LOG_LPR = 6 << 3,
    /// network news subsystem
    LOG_NEWS = 7 << 3,
    /// UUCP subsystem
    LOG_UUCP = 8 << 3,
    /// clock daemon
    LOG_CRON = 9 << 3,
    /// security/authorization messages (private)
    LOG_AUTHPRIV = 10 << 3,
    /// ftp daemon
    LOG_FTP = 11 << 3,
    /// NTP subsystem
    LOG_NTP = 12 << 3,
    /// log audit
    LOG_AUDIT = 13 << 3,
    /// log alert
    LOG_ALERT = 14 << 3,
    /// clock daemon (some systems use both 9 & 15 for cron/at messages)
    LOG_CLOCK = 15 << 3,
    /// reserved for local use
    LOG_LOCAL0 = 16 << 3,
    /// reserved for local use
    LOG_LOCAL1 = 17 << 3,
    /// reserved for local use
    LOG_LOCAL2 = 18 << 3,
    /// reserved for local use
    LOG_LOCAL3 = 19 << 3,
    /// reserved for local use
    LOG_LOCAL4 = 20 << 3,
    /// reserved for local use
    LOG_LOCAL5 = 21 << 3,
    /// reserved for local use
    LOG_LOCAL6 = 22 << 3,
    /// reserved for local use
    LOG_LOCAL7 = 23 << 3,
}

impl std::default::Default for Facility {
    /// The default facility is `LOG_USER`.
    fn default() -> Self {
        Facility::LOG_USER
    }
}

impl std::convert::TryFrom<u8> for Facility {
    type Error = Error;
    /// Validate an un-shifted facility code (0 through 23), as found in configuration surfaces.
    fn try_from(value: u8) -> StdResult<Self, Self::Error> {
        match value {
            0 => Ok(Facility::LOG_KERN),
            1 => Ok(Facility::LOG_USER),
            2 => Ok(Facility::LOG_MAIL),
            3 => Ok(Facility::LOG_DAEMON),
            4 => Ok(Facility::LOG_AUTH),
            5 => Ok(Facility::LOG_SYSLOG),
            6 => Ok(Facility::LOG_LPR),
            7 => Ok(Facility::LOG_NEWS),
            8 => Ok(Facility::LOG_UUCP),
            9 => Ok(Facility::LOG_CRON),
            10 => Ok(Facility::LOG_AUTHPRIV),
            11 => Ok(Facility::LOG_FTP),
            12 => Ok(Facility::LOG_NTP),
            13 => Ok(Facility::LOG_AUDIT),
            14 => Ok(Facility::LOG_ALERT),
            15 => Ok(Facility::LOG_CLOCK),
            16 => Ok(Facility::LOG_LOCAL0),
            17 => Ok(Facility::LOG_LOCAL1),
            18 => Ok(Facility::LOG_LOCAL2),
            19 => Ok(Facility::LOG_LOCAL3),
            20 => Ok(Facility::LOG_LOCAL4),
            21 => Ok(Facility::LOG_LOCAL5),
            22 => Ok(Facility::LOG_LOCAL6),
            23 => Ok(Facility::LOG_LOCAL7),
            _ => Err(Error::BadFacility {
                value,
                back: Backtrace::new(),
            }),
        }
    }
}

impl std::fmt::Display for Facility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> StdResult<(), std::fmt::Error> {
        write!(
            f,
            "{}",
            match self {
                Facility::LOG_KERN => "LOG_KERN",
                Facility::LOG_USER => "LOG_USER",
                Facility::LOG_MAIL => "LOG_MAIL",
                Facility::LOG_DAEMON => "LOG_DAEMON",
                Facility::LOG_AUTH => "LOG_AUTH",
                Facility::LOG_SYSLOG => "LOG_SYSLOG",
                Facility::LOG_LPR => "LOG_LPR",
                Facility::LOG_NEWS => "LOG_NEWS",
                Facility::LOG_UUCP => "LOG_UUCP",
                Facility::LOG_CRON => "LOG_CRON",
                Facility::LOG_AUTHPRIV => "LOG_AUTHPRIV",
                Facility::LOG_FTP => "LOG_FTP",
                Facility::LOG_NTP => "LOG_NTP",
                Facility::LOG_AUDIT => "LOG_AUDIT",
                Facility::LOG_ALERT => "LOG_ALERT",
                Facility::LOG_CLOCK => "LOG_CLOCK",
                Facility::LOG_LOCAL0 => "LOG_LOCAL0",
                Facility::LOG_LOCAL1 => "LOG_LOCAL1",
                Facility::LOG_LOCAL2 => "LOG_LOCAL2",
                Facility::LOG_LOCAL3 => "LOG_LOCAL3",
                Facility::LOG_LOCAL4 => "LOG_LOCAL4",
                Facility::LOG_LOCAL5 => "LOG_LOCAL5",
                Facility::LOG_LOCAL6 => "LOG_LOCAL6",
                Facility::LOG_LOCAL7 => "LOG_LOCAL7",
            }
        )
    }
}

/// The eight syslog severity codes, per the `syslog()` manual [page] & `<syslog.h>`.
///
/// [page]: https://man7.org/linux/man-pages/man3/syslog.3.html
#[allow(non_camel_case_types)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Severity {
    /// system is unusable
    LOG_EMERG,
    /// action must be taken immediately
    LOG_ALERT,
    /// critical conditions
    LOG_CRIT,
    /// error conditions
    LOG_ERR,
    /// warning conditions
    LOG_WARNING,
    /// normal, but significant condition
    LOG_NOTICE,
    /// informational message
    LOG_INFO,
    /// debug-level message
    LOG_DEBUG,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> StdResult<(), std::fmt::Error> {
        write!(
            f,
            "{}",
            match self {
                Severity::LOG_EMERG => "LOG_EMERG",
                Severity::LOG_ALERT => "LOG_ALERT",
                Severity::LOG_CRIT => "LOG_CRIT",
                Severity::LOG_ERR => "LOG_ERR",
                Severity::LOG_WARNING => "LOG_WARNING",
                Severity::LOG_NOTICE => "LOG_NOTICE",
                Severity::LOG_INFO => "LOG_INFO",
                Severity::LOG_DEBUG => "LOG_DEBUG",
            }
        )
    }
}

/// Application log levels, least to most severe. The discriminants are the conventional ordinal
/// scale for structured-logging level fields (trace 10 through fatal 60).
#[derive(Copy, Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum Level {
    Trace = 10,
    Debug = 20,
    Info = 30,
    Warn = 40,
    Error = 50,
    Fatal = 60,
}

impl Level {
    /// Collapse the application scale onto syslog severities. The mapping is lossy: five tiers
    /// land on four codes, with everything below [`Level::Info`] falling through to
    /// `LOG_DEBUG`. `LOG_ALERT` & `LOG_CRIT` are never produced.
    pub fn severity(self) -> Severity {
        match self {
            Level::Fatal => Severity::LOG_EMERG,
            Level::Error => Severity::LOG_ERR,
            Level::Warn => Severity::LOG_WARNING,
            Level::Info => Severity::LOG_INFO,
            _ => Severity::LOG_DEBUG,
        }
    }
    /// Human-readable prefix for the message body, trailing separator included.
    pub fn label(self) -> &'static str {
        match self {
            Level::Fatal => "Fatal: ",
            Level::Error => "Error: ",
            Level::Warn => "Warning: ",
            Level::Info => "Info: ",
            _ => "Debug: ",
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> StdResult<(), std::fmt::Error> {
        write!(
            f,
            "{}",
            match self {
                Level::Trace => "trace",
                Level::Debug => "debug",
                Level::Info => "info",
                Level::Warn => "warn",
                Level::Error => "error",
                Level::Fatal => "fatal",
            }
        )
    }
}

#[cfg(test)]
mod facility_severity_tests {
    use super::*;
    /// Test basic PRI formatting
    #[test]
    fn test_pri() {
        assert_eq!(14, (Facility::LOG_USER as u8) | (Severity::LOG_INFO as u8));
        assert_eq!(format!("{}", Facility::LOG_FTP), "LOG_FTP".to_string());
        assert_eq!(format!("{:?}", Facility::LOG_FTP), "LOG_FTP".to_string());
    }

    #[test]
    fn test_facility_validation() {
        assert_eq!(Facility::try_from(1).unwrap(), Facility::LOG_USER);
        assert_eq!(Facility::try_from(23).unwrap(), Facility::LOG_LOCAL7);
        assert!(Facility::try_from(24).is_err());
    }

    #[test]
    fn test_severity_mapping() {
        // The mapping is total & lossy: its image is exactly {0, 3, 4, 6, 7}.
        let all = [
            Level::Trace,
            Level::Debug,
            Level::Info,
            Level::Warn,
            Level::Error,
            Level::Fatal,
        ];
        for level in all {
            assert!([0u8, 3, 4, 6, 7].contains(&(level.severity() as u8)));
        }
        assert_eq!(Severity::LOG_EMERG, Level::Fatal.severity());
        assert_eq!(Severity::LOG_ERR, Level::Error.severity());
        assert_eq!(Severity::LOG_WARNING, Level::Warn.severity());
        assert_eq!(Severity::LOG_INFO, Level::Info.severity());
        assert_eq!(Severity::LOG_DEBUG, Level::Debug.severity());
        assert_eq!(Severity::LOG_DEBUG, Level::Trace.severity());
    }

    #[test]
    fn test_labels() {
        assert_eq!("Warning: ", Level::Warn.label());
        assert_eq!("Debug: ", Level::Trace.label());
    }
}
