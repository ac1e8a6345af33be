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

//! The unit of input: one structured log record.
//!
//! A [`Record`] is immutable once built and is supplied fresh per write call. Everything but the
//! message text is optional; the formatter substitutes per-stream defaults for whatever is
//! absent. Plain text converts directly ([`From<&str>`], [`From<String>`]), standing in for a
//! record carrying only a message.

use crate::facility::Level;

use chrono::{DateTime, Utc};

/// A single structured log record.
#[derive(Clone, Debug)]
pub struct Record {
    level: Option<Level>,
    message: String,
    time: Option<DateTime<Utc>>,
    hostname: Option<String>,
    tag: Option<String>,
    name: Option<String>,
    env: Option<String>,
}

impl Record {
    pub fn builder<S: Into<String>>(message: S) -> RecordBuilder {
        RecordBuilder {
            imp: Record {
                level: None,
                message: message.into(),
                time: None,
                hostname: None,
                tag: None,
                name: None,
                env: None,
            },
        }
    }
    pub fn level(&self) -> Option<Level> {
        self.level
    }
    pub fn message(&self) -> &str {
        &self.message
    }
    pub fn time(&self) -> Option<DateTime<Utc>> {
        self.time
    }
    pub fn hostname(&self) -> Option<&str> {
        self.hostname.as_deref()
    }
    /// The message-level tag, rendered as a ` [tag=...]` suffix on the body. Distinct from the
    /// process tag in the header.
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
    pub fn env(&self) -> Option<&str> {
        self.env.as_deref()
    }
}

pub struct RecordBuilder {
    imp: Record,
}

impl RecordBuilder {
    pub fn level(mut self, level: Level) -> Self {
        self.imp.level = Some(level);
        self
    }
    pub fn time(mut self, time: DateTime<Utc>) -> Self {
        self.imp.time = Some(time);
        self
    }
    pub fn hostname<S: Into<String>>(mut self, hostname: S) -> Self {
        self.imp.hostname = Some(hostname.into());
        self
    }
    pub fn tag<S: Into<String>>(mut self, tag: S) -> Self {
        self.imp.tag = Some(tag.into());
        self
    }
    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.imp.name = Some(name.into());
        self
    }
    pub fn env<S: Into<String>>(mut self, env: S) -> Self {
        self.imp.env = Some(env.into());
        self
    }
    pub fn build(self) -> Record {
        self.imp
    }
}

impl std::convert::From<&str> for Record {
    fn from(message: &str) -> Self {
        Record::builder(message).build()
    }
}

impl std::convert::From<String> for Record {
    fn from(message: String) -> Self {
        Record::builder(message).build()
    }
}

impl std::convert::From<Vec<u8>> for Record {
    fn from(message: Vec<u8>) -> Self {
        // expensive, but not expected
        Record::builder(String::from_utf8_lossy(&message).into_owned()).build()
    }
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn test_builder() {
        let r = Record::builder("hello")
            .level(Level::Warn)
            .name("svc")
            .env("prod")
            .tag("abc")
            .build();
        assert_eq!(r.message(), "hello");
        assert_eq!(r.level(), Some(Level::Warn));
        assert_eq!(r.name(), Some("svc"));
        assert_eq!(r.env(), Some("prod"));
        assert_eq!(r.tag(), Some("abc"));
        assert!(r.time().is_none());
        assert!(r.hostname().is_none());
    }

    #[test]
    fn test_conversions() {
        let r = Record::from("just text");
        assert_eq!(r.message(), "just text");
        assert!(r.level().is_none());

        let r = Record::from(b"raw bytes".to_vec());
        assert_eq!(r.message(), "raw bytes");
    }
}
