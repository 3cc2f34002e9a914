//! Type-keyed registry of mapping actions.
//!
//! One binding per (type, direction); registration is explicit — no runtime
//! discovery, no fallback to parent types. The registry is populated during
//! a single-threaded composition phase and then moved into the engine by
//! value, which freezes it: every later access is shared and lock-free.

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::engine::XmlMappingEngine;
use crate::error::{MappingError, Result};
use crate::mapper::{FromXml, ReadContext, ToXml};
use crate::xpath::{NodeHandle, XPathProcessor};

/// Direction of a mapping action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    ToXml,
    FromXml,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::ToXml => f.write_str("to-xml"),
            Direction::FromXml => f.write_str("from-xml"),
        }
    }
}

/// Type-erased FromXml entry point used by name-driven deserialization.
pub(crate) type ErasedFromXml = Arc<
    dyn Fn(&XmlMappingEngine, &dyn XPathProcessor, NodeHandle) -> Result<Box<dyn Any>>
        + Send
        + Sync,
>;

struct Registration {
    action: Box<dyn Any + Send + Sync>,
    erased: Option<ErasedFromXml>,
}

/// Registry of mapping actions keyed by `(TypeId, Direction)`.
///
/// Re-registration replaces the prior binding (last-registration-wins),
/// which is what lets test fixtures override production mappers.
#[derive(Default)]
pub struct MapperRegistry {
    entries: HashMap<(TypeId, Direction), Registration>,
}

impl MapperRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the ToXml action for `T`.
    pub fn register_to_xml<T: 'static>(&mut self, mapper: impl ToXml<T> + 'static) {
        trace!(type_name = type_name::<T>(), direction = %Direction::ToXml, "registering mapper");
        let action: Arc<dyn ToXml<T>> = Arc::new(mapper);
        self.entries.insert(
            (TypeId::of::<T>(), Direction::ToXml),
            Registration {
                action: Box::new(action),
                erased: None,
            },
        );
    }

    /// Bind the FromXml action for `T`.
    ///
    /// Also stores a type-erased entry point so the engine can drive this
    /// action when the target type is only known by name.
    pub fn register_from_xml<T: 'static>(&mut self, mapper: impl FromXml<T> + 'static) {
        trace!(type_name = type_name::<T>(), direction = %Direction::FromXml, "registering mapper");
        let action: Arc<dyn FromXml<T>> = Arc::new(mapper);
        let for_erasure = action.clone();
        let erased: ErasedFromXml = Arc::new(move |engine, processor, position| {
            let context = ReadContext::new(engine, processor, position);
            for_erasure
                .from_xml(&context)
                .map(|value| Box::new(value) as Box<dyn Any>)
        });
        self.entries.insert(
            (TypeId::of::<T>(), Direction::FromXml),
            Registration {
                action: Box::new(action),
                erased: Some(erased),
            },
        );
    }

    /// Register both directions of a bidirectional mapper in one call.
    pub fn register<T, M>(&mut self, mapper: M)
    where
        T: 'static,
        M: ToXml<T> + FromXml<T> + Clone + 'static,
    {
        self.register_to_xml(mapper.clone());
        self.register_from_xml(mapper);
    }

    /// Look up the ToXml action for `T`; exact type match only.
    pub fn resolve_to_xml<T: 'static>(&self) -> Result<Arc<dyn ToXml<T>>> {
        self.entries
            .get(&(TypeId::of::<T>(), Direction::ToXml))
            .and_then(|registration| registration.action.downcast_ref::<Arc<dyn ToXml<T>>>())
            .cloned()
            .ok_or_else(|| MappingError::UnregisteredType {
                type_name: type_name::<T>().to_string(),
                direction: Direction::ToXml,
            })
    }

    /// Look up the FromXml action for `T`; exact type match only.
    pub fn resolve_from_xml<T: 'static>(&self) -> Result<Arc<dyn FromXml<T>>> {
        self.entries
            .get(&(TypeId::of::<T>(), Direction::FromXml))
            .and_then(|registration| registration.action.downcast_ref::<Arc<dyn FromXml<T>>>())
            .cloned()
            .ok_or_else(|| MappingError::UnregisteredType {
                type_name: type_name::<T>().to_string(),
                direction: Direction::FromXml,
            })
    }

    pub(crate) fn erased_from_xml(
        &self,
        type_id: TypeId,
        type_name: &str,
    ) -> Result<ErasedFromXml> {
        self.entries
            .get(&(type_id, Direction::FromXml))
            .and_then(|registration| registration.erased.clone())
            .ok_or_else(|| MappingError::UnregisteredType {
                type_name: type_name.to_string(),
                direction: Direction::FromXml,
            })
    }

    /// Number of registered bindings.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
