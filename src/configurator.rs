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

//! The logger configuration contract between a host application and a logging backend.

use std::fmt;
use std::path::Path;

use crate::Error;
use crate::LoggerFactory;
use crate::ResourceLocation;
use crate::config_file::DEFAULT_RESOURCE_NAME;
use crate::context::LoggerContext;
use crate::environment::Config;
use crate::environment::Environment;
use crate::environment::Mode;
use crate::environment::absolute_path;
use crate::properties::APPLICATION_HOME;
use crate::properties::PropertyMap;
use crate::properties::generate_properties;

/// The lifecycle a host application drives a logging backend through.
///
/// The host calls one of the configuration methods once during startup, may obtain a
/// [`LoggerFactory`] afterwards, and calls [`shutdown`](LoggerConfigurator::shutdown) once on
/// teardown. Implementations are selected by the host at startup; each one binds a different
/// logging backend.
pub trait LoggerConfigurator: fmt::Debug + Send {
    /// Configure logging before an [`Environment`] is available, from the application root path
    /// alone.
    fn init(&mut self, root_path: &Path, mode: Mode) -> Result<(), Error>;

    /// Configure logging for `env`, with properties generated from an empty configuration.
    fn configure_env(&mut self, env: &Environment) -> Result<(), Error>;

    /// Configure logging for `env`, with properties generated from `config` and
    /// `optional_properties`. Optional properties win on key collisions.
    fn configure_with_overrides(
        &mut self,
        env: &Environment,
        config: &Config,
        optional_properties: &PropertyMap,
    ) -> Result<(), Error>;

    /// Configure logging from the declarative resource at `config`, resolving its property
    /// references against `properties`.
    ///
    /// # Errors
    ///
    /// * [`ConfigurationMissing`](crate::ErrorKind::ConfigurationMissing) if `config` is `None`;
    /// * [`ConfigurationMalformed`](crate::ErrorKind::ConfigurationMalformed) if `config` cannot
    ///   be turned into a configuration location;
    /// * [`AlreadyShutDown`](crate::ErrorKind::AlreadyShutDown) if this configurator has been
    ///   shut down.
    fn configure(
        &mut self,
        properties: &PropertyMap,
        config: Option<ResourceLocation>,
    ) -> Result<(), Error>;

    /// The logger factory of the active configuration.
    fn logger_factory(&self) -> LoggerFactory;

    /// Release the resources of the logging backend.
    fn shutdown(&mut self);
}

/// The lifecycle state of a [`LogforthConfigurator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfiguratorState {
    /// Not configured yet.
    Uninitialized,
    /// Configured at least once; may be configured again.
    Configured,
    /// Shut down. A new configurator is needed to configure logging again.
    Shutdown,
}

/// A [`LoggerConfigurator`] that drives the process-wide [`LoggerContext`] from a declarative
/// JSON resource, `logforth.json` by default.
///
/// # Examples
///
/// ```no_run
/// use logforth_configurator::Environment;
/// use logforth_configurator::LogforthConfigurator;
/// use logforth_configurator::LoggerConfigurator;
/// use logforth_configurator::Mode;
///
/// let env = Environment::new("/srv/app", Mode::Prod).with_resource_root("/srv/app/conf");
/// let mut configurator = LogforthConfigurator::new();
/// configurator.configure_env(&env).expect("logging must be configured");
///
/// let logger = configurator.logger_factory().get_logger("my_app");
/// logger.info(format_args!("started"));
///
/// configurator.shutdown();
/// ```
#[derive(Debug)]
pub struct LogforthConfigurator {
    resource_name: String,
    state: ConfiguratorState,
    factory: LoggerFactory,
    properties: PropertyMap,
}

impl Default for LogforthConfigurator {
    fn default() -> Self {
        Self::new()
    }
}

impl LogforthConfigurator {
    /// Create a configurator that looks for `logforth.json`.
    pub fn new() -> Self {
        Self::with_resource_name(DEFAULT_RESOURCE_NAME)
    }

    /// Create a configurator that looks for the resource `name`.
    pub fn with_resource_name(name: impl Into<String>) -> Self {
        Self {
            resource_name: name.into(),
            state: ConfiguratorState::Uninitialized,
            factory: LoggerFactory::empty(),
            properties: PropertyMap::new(),
        }
    }

    /// The name of the declarative resource this configurator looks for.
    pub fn resource_name(&self) -> &str {
        &self.resource_name
    }

    /// The lifecycle state of this configurator.
    pub fn state(&self) -> ConfiguratorState {
        self.state
    }

    /// The properties of the last successful configuration.
    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }
}

impl LoggerConfigurator for LogforthConfigurator {
    fn init(&mut self, root_path: &Path, mode: Mode) -> Result<(), Error> {
        let home = absolute_path(root_path);
        let properties =
            PropertyMap::from_iter([(APPLICATION_HOME, home.to_string_lossy().into_owned())]);

        // default search path: the application root, then the working directory
        let location = Environment::new(&home, mode)
            .resource(&self.resource_name)
            .or_else(|| {
                let cwd = std::env::current_dir().ok()?;
                Environment::new(cwd, mode).resource(&self.resource_name)
            });
        self.configure(&properties, location)
    }

    fn configure_env(&mut self, env: &Environment) -> Result<(), Error> {
        self.configure_with_overrides(env, &Config::empty(), &PropertyMap::new())
    }

    fn configure_with_overrides(
        &mut self,
        env: &Environment,
        config: &Config,
        optional_properties: &PropertyMap,
    ) -> Result<(), Error> {
        let properties = generate_properties(env, config, optional_properties);
        let location = env.resource(&self.resource_name);
        self.configure(&properties, location)
    }

    fn configure(
        &mut self,
        properties: &PropertyMap,
        config: Option<ResourceLocation>,
    ) -> Result<(), Error> {
        let location = config.ok_or_else(|| Error::configuration_missing(&self.resource_name))?;
        let path = location.to_path()?;
        if self.state == ConfiguratorState::Shutdown {
            return Err(Error::already_shut_down(&self.resource_name));
        }

        let context = LoggerContext::global();
        context.set_config_location(&path, properties);
        self.factory = context.logger_factory();
        self.properties = properties.clone();
        self.state = ConfiguratorState::Configured;
        Ok(())
    }

    fn logger_factory(&self) -> LoggerFactory {
        self.factory
    }

    fn shutdown(&mut self) {
        if self.state == ConfiguratorState::Shutdown {
            return;
        }

        LoggerContext::global().shutdown();
        self.factory = LoggerFactory::empty();
        self.state = ConfiguratorState::Shutdown;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_missing_location_keeps_state() {
        let mut configurator = LogforthConfigurator::with_resource_name("custom.json");
        let err = configurator
            .configure(&PropertyMap::new(), None)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigurationMissing);
        assert_eq!(err.context_value("resource"), Some("custom.json"));
        assert_eq!(configurator.state(), ConfiguratorState::Uninitialized);
        assert!(!configurator.logger_factory().is_configured());
    }

    #[test]
    fn test_malformed_location_keeps_state() {
        let mut configurator = LogforthConfigurator::new();
        let err = configurator
            .configure(
                &PropertyMap::new(),
                Some(ResourceLocation::new("jar:logforth.json")),
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigurationMalformed);
        assert_eq!(configurator.state(), ConfiguratorState::Uninitialized);
        assert!(configurator.properties().is_empty());
    }

    #[test]
    fn test_configure_after_shutdown_fails() {
        let mut configurator = LogforthConfigurator::new();
        configurator.shutdown();

        let err = configurator
            .configure(&PropertyMap::new(), None)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigurationMissing);

        let err = configurator
            .configure(
                &PropertyMap::new(),
                Some(ResourceLocation::from_path("/srv/app/logforth.json")),
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyShutDown);
        assert_eq!(configurator.state(), ConfiguratorState::Shutdown);
        assert!(!configurator.logger_factory().is_configured());
    }

    #[test]
    fn test_trait_object() {
        let configurator: Box<dyn LoggerConfigurator> = Box::new(LogforthConfigurator::default());
        assert!(!configurator.logger_factory().is_configured());
    }
}
