//! Mapping actions and their execution contexts.
//!
//! A mapping action is a unit of conversion logic for one type in one
//! direction. Actions receive a context bound to the current navigation
//! position; the context's field helpers implement the execution rules:
//! required fields fail loudly when absent, scalars that do not parse fail
//! with the offending text, collections preserve document order, and nested
//! fields recurse through the engine so every type uses its registered
//! action.

use std::fmt::Display;
use std::str::FromStr;

use crate::engine::XmlMappingEngine;
use crate::error::{MappingError, Result};
use crate::xpath::{NodeHandle, XPathExpression, XPathProcessor};

/// Conversion of a `T` into XML at the current position.
pub trait ToXml<T>: Send + Sync {
    fn to_xml(&self, value: &T, context: &mut WriteContext<'_>) -> Result<()>;
}

/// Construction of a `T` from XML at the current position.
///
/// Implementations return a fully constructed value or an error — never a
/// partially populated object.
pub trait FromXml<T>: Send + Sync {
    fn from_xml(&self, context: &ReadContext<'_>) -> Result<T>;
}

fn short_type_name<T>() -> String {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full).to_string()
}

/// Read-side context: a navigation position plus the engine for recursion.
pub struct ReadContext<'a> {
    engine: &'a XmlMappingEngine,
    processor: &'a dyn XPathProcessor,
    position: NodeHandle,
}

impl<'a> ReadContext<'a> {
    pub(crate) fn new(
        engine: &'a XmlMappingEngine,
        processor: &'a dyn XPathProcessor,
        position: NodeHandle,
    ) -> Self {
        Self {
            engine,
            processor,
            position,
        }
    }

    /// Name of the element this context is positioned at.
    pub fn element_name(&self) -> Result<String> {
        self.processor
            .element_name(self.position)
            .map_err(Into::into)
    }

    /// Text content of the current node.
    pub fn text(&self) -> Result<String> {
        self.processor.read_value(self.position).map_err(Into::into)
    }

    /// Read a required scalar field.
    ///
    /// Fails with [`MappingError::FieldMissing`] when the node is absent and
    /// [`MappingError::ValueFormat`] when its text does not parse as `V`.
    pub fn required<V: FromStr>(&self, path: &str, field: &str) -> Result<V> {
        let expression = XPathExpression::parse(path)?;
        let node = self
            .processor
            .select_single(self.position, &expression)?
            .ok_or_else(|| MappingError::FieldMissing {
                field: field.to_string(),
                expression: path.to_string(),
            })?;
        self.parse_scalar(node, field)
    }

    /// Read an optional scalar field; absence yields `None`, malformed text
    /// is still an error.
    pub fn optional<V: FromStr>(&self, path: &str, field: &str) -> Result<Option<V>> {
        let expression = XPathExpression::parse(path)?;
        match self.processor.select_single(self.position, &expression)? {
            None => Ok(None),
            Some(node) => self.parse_scalar(node, field).map(Some),
        }
    }

    /// Read a required nested object through its registered FromXml action.
    pub fn nested<C: 'static>(&self, path: &str, field: &str) -> Result<C> {
        let expression = XPathExpression::parse(path)?;
        let node = self
            .processor
            .select_single(self.position, &expression)?
            .ok_or_else(|| MappingError::FieldMissing {
                field: field.to_string(),
                expression: path.to_string(),
            })?;
        self.engine.read_nested::<C>(self.processor, node)
    }

    /// Read an optional nested object.
    pub fn optional_nested<C: 'static>(&self, path: &str) -> Result<Option<C>> {
        let expression = XPathExpression::parse(path)?;
        match self.processor.select_single(self.position, &expression)? {
            None => Ok(None),
            Some(node) => self.engine.read_nested::<C>(self.processor, node).map(Some),
        }
    }

    /// Read a collection field, one nested object per matching node, in
    /// document order. Absence of matches yields an empty collection.
    pub fn collection<C: 'static>(&self, path: &str) -> Result<Vec<C>> {
        let expression = XPathExpression::parse(path)?;
        self.processor
            .select_many(self.position, &expression)?
            .into_iter()
            .map(|node| self.engine.read_nested::<C>(self.processor, node))
            .collect()
    }

    /// Read a collection of scalar values in document order.
    pub fn scalar_collection<V: FromStr>(&self, path: &str, field: &str) -> Result<Vec<V>> {
        let expression = XPathExpression::parse(path)?;
        self.processor
            .select_many(self.position, &expression)?
            .into_iter()
            .map(|node| self.parse_scalar(node, field))
            .collect()
    }

    fn parse_scalar<V: FromStr>(&self, node: NodeHandle, field: &str) -> Result<V> {
        let raw = self.processor.read_value(node)?;
        raw.parse().map_err(|_| MappingError::ValueFormat {
            field: field.to_string(),
            value: raw.clone(),
            expected: short_type_name::<V>(),
        })
    }
}

/// Write-side context: a navigation position plus the engine for recursion.
pub struct WriteContext<'a> {
    engine: &'a XmlMappingEngine,
    processor: &'a mut dyn XPathProcessor,
    position: NodeHandle,
}

impl<'a> WriteContext<'a> {
    pub(crate) fn new(
        engine: &'a XmlMappingEngine,
        processor: &'a mut dyn XPathProcessor,
        position: NodeHandle,
    ) -> Self {
        Self {
            engine,
            processor,
            position,
        }
    }

    /// Write a scalar child element.
    pub fn element<V: Display + ?Sized>(&mut self, name: &str, value: &V) -> Result<()> {
        let child = self.processor.create_child(self.position, name)?;
        self.processor.set_text(child, &value.to_string())?;
        Ok(())
    }

    /// Write an attribute on the current element.
    pub fn attribute<V: Display + ?Sized>(&mut self, name: &str, value: &V) -> Result<()> {
        self.processor
            .set_attribute(self.position, name, &value.to_string())
            .map_err(Into::into)
    }

    /// Set the text content of the current element.
    pub fn text<V: Display + ?Sized>(&mut self, value: &V) -> Result<()> {
        self.processor
            .set_text(self.position, &value.to_string())
            .map_err(Into::into)
    }

    /// Write a nested object as a child element through its registered
    /// ToXml action.
    pub fn nested<C: 'static>(&mut self, name: &str, value: &C) -> Result<()> {
        let child = self.processor.create_child(self.position, name)?;
        self.engine.write_nested(value, &mut *self.processor, child)
    }

    /// Write a collection in enumeration order, one child element per item.
    pub fn collection<C: 'static>(&mut self, name: &str, values: &[C]) -> Result<()> {
        for value in values {
            self.nested(name, value)?;
        }
        Ok(())
    }
}
