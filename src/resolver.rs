//! Type-name resolution for documents that do not statically know their
//! target type.
//!
//! The engine depends only on the narrow [`TypeResolver`] contract; the
//! provided [`TypeRegistry`] is an explicit name map populated at
//! composition time — no runtime reflection or discovery.

use std::any::TypeId;
use std::collections::HashMap;

use crate::error::{MappingError, Result};

/// Resolve an external type name to the concrete type it maps to.
pub trait TypeResolver: Send + Sync {
    fn resolve(&self, type_name: &str) -> Result<TypeId>;
}

/// Explicit name → type registry.
#[derive(Default)]
pub struct TypeRegistry {
    names: HashMap<String, TypeId>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `T`; re-registration replaces the prior binding.
    pub fn register<T: 'static>(&mut self, name: impl Into<String>) {
        self.names.insert(name.into(), TypeId::of::<T>());
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl TypeResolver for TypeRegistry {
    fn resolve(&self, type_name: &str) -> Result<TypeId> {
        self.names
            .get(type_name)
            .copied()
            .ok_or_else(|| MappingError::UnknownTypeName {
                type_name: type_name.to_string(),
            })
    }
}
