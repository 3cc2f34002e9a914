//! Mapping engine façade.
//!
//! The engine resolves mapping actions from its frozen registry and drives
//! them against navigation positions obtained from the configured backend.
//! Each `serialize`/`deserialize` call owns its document and processor for
//! the duration of the call, so a shared engine serves concurrent callers
//! without locking.

use std::any::{Any, type_name};
use std::sync::Arc;

use tracing::debug;

use crate::error::{MappingError, Result};
use crate::mapper::{ReadContext, WriteContext};
use crate::registry::MapperRegistry;
use crate::resolver::TypeResolver;
use crate::xpath::{NodeHandle, XPathProcessor, XmlBackend};

/// Façade over the registry, the navigation backend, and the optional
/// type-name resolver.
pub struct XmlMappingEngine {
    registry: MapperRegistry,
    backend: Arc<dyn XmlBackend>,
    resolver: Option<Arc<dyn TypeResolver>>,
}

impl XmlMappingEngine {
    /// Build an engine from a populated registry and a backend.
    ///
    /// Taking the registry by value is what freezes it: registration is
    /// complete before the first lookup can happen.
    pub fn new(registry: MapperRegistry, backend: Arc<dyn XmlBackend>) -> Self {
        Self {
            registry,
            backend,
            resolver: None,
        }
    }

    /// Attach a type resolver for name-driven deserialization.
    pub fn with_type_resolver(mut self, resolver: impl TypeResolver + 'static) -> Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    /// Identifier of the configured navigation backend.
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Serialize `value` into a document rooted at `root_element`.
    pub fn serialize<T: 'static>(&self, value: &T, root_element: &str) -> Result<String> {
        debug!(
            type_name = type_name::<T>(),
            root = root_element,
            backend = self.backend.name(),
            "serializing"
        );
        let mapper = self.registry.resolve_to_xml::<T>()?;
        let mut processor = self.backend.create_document(root_element)?;
        let root = processor.root();
        {
            let mut context = WriteContext::new(self, processor.as_mut(), root);
            mapper.to_xml(value, &mut context)?;
        }
        processor.to_xml().map_err(Into::into)
    }

    /// Deserialize a document into a `T`.
    pub fn deserialize<T: 'static>(&self, xml: &str) -> Result<T> {
        debug!(
            type_name = type_name::<T>(),
            backend = self.backend.name(),
            "deserializing"
        );
        let mapper = self.registry.resolve_from_xml::<T>()?;
        let processor = self.backend.parse_document(xml)?;
        let root = processor.root();
        mapper.from_xml(&ReadContext::new(self, processor.as_ref(), root))
    }

    /// Deserialize a document whose target type is only known by name.
    ///
    /// The name is resolved through the configured [`TypeResolver`] and the
    /// matching type-erased FromXml action is driven; callers downcast the
    /// result.
    pub fn deserialize_by_name(&self, xml: &str, type_name: &str) -> Result<Box<dyn Any>> {
        debug!(
            type_name,
            backend = self.backend.name(),
            "deserializing by name"
        );
        let resolver = self.resolver.as_ref().ok_or(MappingError::NoTypeResolver)?;
        let type_id = resolver.resolve(type_name)?;
        let action = self.registry.erased_from_xml(type_id, type_name)?;
        let processor = self.backend.parse_document(xml)?;
        let root = processor.root();
        action(self, processor.as_ref(), root)
    }

    pub(crate) fn read_nested<C: 'static>(
        &self,
        processor: &dyn XPathProcessor,
        position: NodeHandle,
    ) -> Result<C> {
        let mapper = self.registry.resolve_from_xml::<C>()?;
        mapper.from_xml(&ReadContext::new(self, processor, position))
    }

    pub(crate) fn write_nested<C: 'static>(
        &self,
        value: &C,
        processor: &mut dyn XPathProcessor,
        position: NodeHandle,
    ) -> Result<()> {
        let mapper = self.registry.resolve_to_xml::<C>()?;
        let mut context = WriteContext::new(self, processor, position);
        mapper.to_xml(value, &mut context)
    }
}
