//! # xml-mapper Library
//!
//! A mapping engine that converts between strongly-typed domain objects and
//! XML documents through a pluggable XPath-navigation abstraction.
//!
//! Mapping actions are registered per type and direction in a
//! [`MapperRegistry`], then driven by the [`XmlMappingEngine`] façade.
//! Navigation goes through the [`XPathProcessor`] trait, with two
//! interchangeable backends — [`QuickXmlBackend`] and [`RoxmlBackend`] —
//! selected at composition time and guaranteed to produce byte-identical
//! documents for the same mapping action sequence.

pub mod config;
pub mod date_range;
pub mod engine;
pub mod error;
pub mod io;
pub mod mapper;
pub mod quickxml;
pub mod registry;
pub mod resolver;
pub mod roxml;
pub mod xpath;

pub use config::{BackendKind, ConfigError, DateConfig, EngineConfig, RetryConfig};
pub use date_range::{DATE_TIME_FORMAT, DateBounds, DateRange, DateRangeMapper, DateRangeState};
pub use engine::XmlMappingEngine;
pub use error::{MappingError, NavigationError, Result};
pub use io::{FileRetryError, RetryPolicy, read_to_string_with_retry};
pub use mapper::{FromXml, ReadContext, ToXml, WriteContext};
pub use quickxml::{QuickXmlBackend, QuickXmlProcessor};
pub use registry::{Direction, MapperRegistry};
pub use resolver::{TypeRegistry, TypeResolver};
pub use roxml::{RoxmlBackend, RoxmlProcessor};
pub use xpath::{NodeHandle, XPathExpression, XPathProcessor, XmlBackend};
