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

//! syslog wire-format assembly.
//!
//! A [`Formatter`] turns a [`Record`] into the exact bytes to transmit:
//!
//! ```text
//! <PRI>TIMESTAMP HOSTNAME TAG[PID]: MESSAGE[ [tag=VALUE]]
//! ```
//!
//! where PRI is `facility * 8 + severity` as a decimal integer in angle brackets, TIMESTAMP is a
//! fixed machine-parseable UTC instant, TAG is `name-env` and PID the OS process identifier. The
//! trailing newline that stream transports require is appended at transmission time, not here;
//! datagram and local-sink primitives frame the message themselves.

use crate::{
    facility::{Facility, Level, Severity},
    record::Record,
};

use chrono::{SecondsFormat, Utc};

use std::sync::OnceLock;

static HOSTNAME: OnceLock<String> = OnceLock::new();

/// The reported hostname, resolved once on first use & reused for the process lifetime. Prefers
/// the machine's hostname, falls back to a local IP address, then to `localhost`.
fn local_hostname() -> &'static str {
    HOSTNAME.get_or_init(|| {
        hostname::get()
            .ok()
            .and_then(|name| name.into_string().ok())
            .or_else(|| local_ip_address::local_ip().ok().map(|ip| ip.to_string()))
            .unwrap_or_else(|| String::from("localhost"))
    })
}

/// Assembles wire lines for one stream's worth of records.
///
/// Holds the per-stream constants: the facility and the `name`/`env` defaults that records fall
/// back to when they don't carry their own.
pub struct Formatter {
    facility: Facility,
    name: String,
    env: String,
}

impl Formatter {
    pub fn new<S1: Into<String>, S2: Into<String>>(
        facility: Facility,
        name: S1,
        env: S2,
    ) -> Formatter {
        Formatter {
            facility,
            name: name.into(),
            env: env.into(),
        }
    }

    fn severity(record: &Record) -> Severity {
        // Records with no level (plain-string or binary input) report as informational.
        record
            .level()
            .map(Level::severity)
            .unwrap_or(Severity::LOG_INFO)
    }

    /// PRI value for `record`: `facility * 8 + severity`. The [`Facility`] discriminants are
    /// pre-shifted, so this is a bitwise or.
    pub fn priority(&self, record: &Record) -> u8 {
        self.facility as u8 | Self::severity(record) as u8
    }

    fn timestamp(record: &Record) -> String {
        record
            .time()
            .unwrap_or_else(Utc::now)
            .to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    fn process_tag(&self, record: &Record) -> String {
        let name = record.name().unwrap_or(&self.name);
        let env = record.env().unwrap_or(&self.env);
        if env.is_empty() {
            name.to_owned()
        } else {
            format!("{}-{}", name, env)
        }
    }

    /// The message body: level label (when the record carries a level), message text, and the
    /// optional message-level tag suffix.
    pub fn body(&self, record: &Record) -> String {
        let mut body = String::new();
        if let Some(level) = record.level() {
            body.push_str(level.label());
        }
        body.push_str(record.message());
        if let Some(tag) = record.tag() {
            body.push_str(" [tag=");
            body.push_str(tag);
            body.push(']');
        }
        body
    }

    /// Priority & body only, for the local sink (the OS primitive frames its own header).
    pub fn priority_and_body(&self, record: &Record) -> (u8, String) {
        (self.priority(record), self.body(record))
    }

    /// The full wire line for network transports, sans terminator.
    pub fn line(&self, record: &Record) -> Vec<u8> {
        let mut buf = format!(
            "<{}>{} {} {}[{}]:",
            self.priority(record),
            Self::timestamp(record),
            record.hostname().unwrap_or_else(|| local_hostname()),
            self.process_tag(record),
            std::process::id(),
        )
        .into_bytes();

        use bytes::BufMut;
        buf.put_slice(b" ");
        buf.put_slice(self.body(record).as_bytes());

        buf
    }
}

#[cfg(test)]
mod test {

    use super::*;

    use chrono::DateTime;

    fn formatter() -> Formatter {
        Formatter::new(Facility::LOG_USER, "svc", "prod")
    }

    fn epoch() -> DateTime<Utc> {
        DateTime::<Utc>::from(std::time::UNIX_EPOCH)
    }

    #[test]
    fn test_golden_line() {
        let r = Record::builder("hello")
            .level(Level::Info)
            .time(epoch())
            .hostname("bree")
            .build();
        let line = formatter().line(&r);
        assert_eq!(
            std::str::from_utf8(&line).unwrap(),
            format!(
                "<14>1970-01-01T00:00:00.000Z bree svc-prod[{}]: Info: hello",
                std::process::id()
            )
        );
    }

    #[test]
    fn test_labels_per_tier() {
        let f = formatter();
        for (level, golden) in [
            (Level::Fatal, "<8>"),
            (Level::Error, "<11>"),
            (Level::Warn, "<12>"),
            (Level::Info, "<14>"),
            (Level::Debug, "<15>"),
            (Level::Trace, "<15>"),
        ] {
            let r = Record::builder("x").level(level).time(epoch()).build();
            let line = f.line(&r);
            let text = std::str::from_utf8(&line).unwrap();
            assert!(text.starts_with(golden), "{}", text);
            assert!(text.ends_with(&format!("]: {}x", level.label())), "{}", text);
        }
    }

    #[test]
    fn test_tag_suffix() {
        let r = Record::builder("x").tag("abc").build();
        assert_eq!(formatter().body(&r), "x [tag=abc]");
    }

    #[test]
    fn test_plain_record_defaults_to_info() {
        let f = formatter();
        let r = Record::from("just text");
        assert_eq!(f.priority(&r), 14);
        // No level, no label.
        assert_eq!(f.body(&r), "just text");
    }

    #[test]
    fn test_record_overrides_stream_defaults() {
        let f = formatter();
        let r = Record::builder("x").name("other").env("dev").build();
        assert_eq!(f.process_tag(&r), "other-dev");

        let bare = Formatter::new(Facility::LOG_USER, "svc", "");
        let r = Record::builder("x").build();
        assert_eq!(bare.process_tag(&r), "svc");
    }

    #[test]
    fn test_priority_and_body() {
        let r = Record::builder("boom").level(Level::Fatal).build();
        let (pri, body) = formatter().priority_and_body(&r);
        assert_eq!(pri, 8);
        assert_eq!(body, "Fatal: boom");
    }
}
