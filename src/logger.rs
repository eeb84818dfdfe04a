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

//! The active logger: directive filtering in front of a logforth dispatch.

use std::fmt;

use log::LevelFilter;
use log::Log;
use log::Metadata;
use log::Record;
use logforth::bridge::log::LogProxy;

/// A logger built from a declarative configuration.
///
/// Records are matched against `env_logger` style directives first. Accepted records are handed
/// to a [`logforth::core::Logger`] which formats them and writes them to its appenders.
pub struct Logger {
    filter: env_filter::Filter,
    dispatch: logforth::core::Logger,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("filter", &self.filter)
            .finish_non_exhaustive()
    }
}

impl Logger {
    /// Create a logger that lets `filter` decide which records reach `dispatch`.
    pub fn new(filter: env_filter::Filter, dispatch: logforth::core::Logger) -> Self {
        Self { filter, dispatch }
    }

    /// The most verbose level this logger may accept.
    pub fn max_level(&self) -> LevelFilter {
        self.filter.filter()
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.filter.enabled(metadata) && Log::enabled(&LogProxy::new(&self.dispatch), metadata)
    }

    fn log(&self, record: &Record) {
        if self.filter.matches(record) {
            Log::log(&LogProxy::new(&self.dispatch), record);
        }
    }

    fn flush(&self) {
        Log::flush(&LogProxy::new(&self.dispatch));
    }
}
