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

//! Logforth-configurator binds a declaratively configured logging backend to the logger
//! lifecycle of a host application.
//!
//! # Overview
//!
//! A host application drives logging through the [`LoggerConfigurator`] contract: it configures
//! logging once during startup, obtains named loggers through a [`LoggerFactory`], and shuts
//! logging down on teardown. [`LogforthConfigurator`] implements the contract on top of a
//! process-wide [`LoggerContext`] that reads a JSON resource named `logforth.json`, resolves
//! `${...}` property references in it, and routes the [`log`] facade into the
//! [`logforth`] appenders and layouts the document describes.
//!
//! # Examples
//!
//! ```no_run
//! use logforth_configurator::Environment;
//! use logforth_configurator::LogforthConfigurator;
//! use logforth_configurator::LoggerConfigurator;
//! use logforth_configurator::Mode;
//!
//! let mut configurator = LogforthConfigurator::new();
//! configurator
//!     .init("/srv/app".as_ref(), Mode::Prod)
//!     .expect("logforth.json must be present");
//!
//! log::info!("This is an info message.");
//!
//! configurator.shutdown();
//! ```

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod config_file;
pub mod properties;

mod configurator;
mod context;
mod environment;
mod error;
mod factory;
mod logger;
mod resource;

pub use self::configurator::ConfiguratorState;
pub use self::configurator::LogforthConfigurator;
pub use self::configurator::LoggerConfigurator;
pub use self::context::LoggerContext;
pub use self::environment::Config;
pub use self::environment::Environment;
pub use self::environment::Mode;
pub use self::error::Error;
pub use self::error::ErrorKind;
pub use self::factory::LoggerFactory;
pub use self::factory::NamedLogger;
pub use self::logger::Logger;
pub use self::properties::PropertyMap;
pub use self::resource::ResourceLocation;
