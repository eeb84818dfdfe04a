// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Named loggers handed out to the host application.

use std::fmt;
use std::panic::Location;

use log::Level;
use log::Record;

use crate::context::LoggerContext;

/// A handle to obtain named loggers from the active logging configuration.
///
/// An empty factory, as returned before any successful configuration or after shutdown, hands
/// out loggers that discard every record.
///
/// # Examples
///
/// ```
/// use logforth_configurator::LoggerFactory;
///
/// let factory = LoggerFactory::empty();
/// assert!(!factory.is_configured());
///
/// let logger = factory.get_logger("my_app::db");
/// logger.info(format_args!("discarded"));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggerFactory {
    context: Option<&'static LoggerContext>,
}

impl LoggerFactory {
    /// A factory that is not bound to any configuration.
    pub fn empty() -> Self {
        Self { context: None }
    }

    pub(crate) fn new(context: &'static LoggerContext) -> Self {
        Self {
            context: Some(context),
        }
    }

    /// Return whether this factory is bound to a logging context.
    pub fn is_configured(&self) -> bool {
        self.context.is_some()
    }

    /// Get the logger named `name`. The name is used as the target of its records.
    pub fn get_logger(&self, name: impl Into<String>) -> NamedLogger {
        NamedLogger {
            name: name.into(),
            context: self.context,
        }
    }
}

/// A logger obtained from a [`LoggerFactory`].
#[derive(Debug, Clone)]
pub struct NamedLogger {
    name: String,
    context: Option<&'static LoggerContext>,
}

impl NamedLogger {
    /// The name of this logger.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return whether a record at `level` would be accepted.
    pub fn enabled(&self, level: Level) -> bool {
        self.context.is_some_and(|context| {
            context.enabled(
                &log::Metadata::builder()
                    .level(level)
                    .target(&self.name)
                    .build(),
            )
        })
    }

    /// Log `args` at `level`, attributed to the caller's source location.
    #[track_caller]
    pub fn log(&self, level: Level, args: fmt::Arguments) {
        let Some(context) = self.context else {
            return;
        };

        let location = Location::caller();
        context.log(
            &Record::builder()
                .args(args)
                .level(level)
                .target(&self.name)
                .file(Some(location.file()))
                .line(Some(location.line()))
                .build(),
        );
    }

    /// Log `args` as an error. See [`NamedLogger::log`].
    #[track_caller]
    pub fn error(&self, args: fmt::Arguments) {
        self.log(Level::Error, args);
    }

    /// Log `args` as a warning. See [`NamedLogger::log`].
    #[track_caller]
    pub fn warn(&self, args: fmt::Arguments) {
        self.log(Level::Warn, args);
    }

    /// Log `args` as an informational message. See [`NamedLogger::log`].
    #[track_caller]
    pub fn info(&self, args: fmt::Arguments) {
        self.log(Level::Info, args);
    }

    /// Log `args` as a debug message. See [`NamedLogger::log`].
    #[track_caller]
    pub fn debug(&self, args: fmt::Arguments) {
        self.log(Level::Debug, args);
    }

    /// Log `args` as a trace message. See [`NamedLogger::log`].
    #[track_caller]
    pub fn trace(&self, args: fmt::Arguments) {
        self.log(Level::Trace, args);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_factory_discards() {
        let factory = LoggerFactory::default();
        assert!(!factory.is_configured());

        let logger = factory.get_logger("app");
        assert_eq!(logger.name(), "app");
        assert!(!logger.enabled(Level::Error));
        logger.error(format_args!("nowhere to go"));
    }
}
