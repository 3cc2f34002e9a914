//! Navigation abstraction over an XML-like tree.
//!
//! Mapping actions never touch a concrete XML library. They navigate through
//! the [`XPathProcessor`] trait using parsed [`XPathExpression`] locators and
//! opaque [`NodeHandle`] positions, so the underlying tree implementation can
//! be swapped at composition time via an [`XmlBackend`] without touching any
//! mapping logic.

use std::fmt;
use std::str::FromStr;

use crate::error::{NavigationError, NavigationResult};

/// A single navigation step of a parsed expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum Step {
    /// Descend into child elements with the given name.
    Child(String),
    /// Read an attribute of the current element; always the final step.
    Attribute(String),
}

/// An immutable, relative location path.
///
/// Supported grammar: `name`, `name/name/...`, an optional trailing
/// `@attribute` step, and `.` for the current node. Absolute paths,
/// wildcards, `..` and predicates are rejected — the engine only needs
/// relative child/attribute navigation.
///
/// Expressions are stateless and freely shareable; parsing happens once.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct XPathExpression {
    source: String,
    steps: Vec<Step>,
}

impl XPathExpression {
    /// Parse a relative location path.
    pub fn parse(path: &str) -> NavigationResult<Self> {
        let invalid = |reason: &str| NavigationError::InvalidExpression {
            expression: path.to_string(),
            reason: reason.to_string(),
        };

        if path.is_empty() {
            return Err(invalid("empty expression"));
        }
        if path.starts_with('/') {
            return Err(invalid("absolute paths are not supported"));
        }
        if path == "." {
            return Ok(Self {
                source: path.to_string(),
                steps: Vec::new(),
            });
        }

        let segments: Vec<&str> = path.split('/').collect();
        let last = segments.len() - 1;
        let mut steps = Vec::with_capacity(segments.len());

        for (index, segment) in segments.iter().enumerate() {
            if segment.is_empty() {
                return Err(invalid("empty step"));
            }
            if let Some(name) = segment.strip_prefix('@') {
                if index != last {
                    return Err(invalid("attribute step must be the final step"));
                }
                validate_name(name).map_err(|_| invalid("invalid attribute name"))?;
                steps.push(Step::Attribute(name.to_string()));
            } else {
                if *segment == "." || *segment == ".." {
                    return Err(invalid("only child steps are supported"));
                }
                validate_name(segment).map_err(|_| invalid("invalid element name"))?;
                steps.push(Step::Child(segment.to_string()));
            }
        }

        Ok(Self {
            source: path.to_string(),
            steps,
        })
    }

    /// The original path text.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub(crate) fn steps(&self) -> &[Step] {
        &self.steps
    }
}

impl fmt::Display for XPathExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl FromStr for XPathExpression {
    type Err = NavigationError;

    fn from_str(s: &str) -> NavigationResult<Self> {
        Self::parse(s)
    }
}

/// Reject names that would produce ill-formed markup.
pub(crate) fn validate_name(name: &str) -> NavigationResult<()> {
    let well_formed = !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit() || c == '-' || c == '.')
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':'));
    if well_formed {
        Ok(())
    } else {
        Err(NavigationError::InvalidName {
            name: name.to_string(),
        })
    }
}

/// Opaque handle to a position within one processor's document.
///
/// Handles are only meaningful for the processor that issued them and only
/// for the duration of the mapping call; they are never retained across
/// calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle {
    pub(crate) node: usize,
    pub(crate) attr: Option<usize>,
}

impl NodeHandle {
    pub(crate) fn element(node: usize) -> Self {
        Self { node, attr: None }
    }

    pub(crate) fn attribute(node: usize, slot: usize) -> Self {
        Self {
            node,
            attr: Some(slot),
        }
    }

    /// Whether this handle addresses an attribute rather than an element.
    pub fn is_attribute(&self) -> bool {
        self.attr.is_some()
    }
}

/// Navigation primitives over an XML tree.
///
/// Every operation either returns a valid result, `None` for an absent
/// node, or a [`NavigationError`] — never a half-constructed position.
/// A processor owns exactly one document for the duration of one mapping
/// call; implementations are not required to be `Send`.
pub trait XPathProcessor {
    /// Position of the document's root element.
    fn root(&self) -> NodeHandle;

    /// Resolve zero-or-one node; absence is `Ok(None)`, not an error.
    fn select_single(
        &self,
        position: NodeHandle,
        path: &XPathExpression,
    ) -> NavigationResult<Option<NodeHandle>>;

    /// Resolve zero-or-more nodes in document order. The sequence is finite
    /// and restartable only by re-invoking this method.
    fn select_many(
        &self,
        position: NodeHandle,
        path: &XPathExpression,
    ) -> NavigationResult<Vec<NodeHandle>>;

    /// Text content of an element, or the value of an attribute.
    fn read_value(&self, position: NodeHandle) -> NavigationResult<String>;

    /// Name of the element at `position`.
    fn element_name(&self, position: NodeHandle) -> NavigationResult<String>;

    /// Append a new child element and return its position.
    fn create_child(&mut self, position: NodeHandle, name: &str) -> NavigationResult<NodeHandle>;

    /// Set an attribute; re-setting the same name overwrites the prior value.
    fn set_attribute(
        &mut self,
        position: NodeHandle,
        name: &str,
        value: &str,
    ) -> NavigationResult<()>;

    /// Replace the text content of the element at `position`.
    fn set_text(&mut self, position: NodeHandle, value: &str) -> NavigationResult<()>;

    /// Serialize the owned document.
    fn to_xml(&self) -> NavigationResult<String>;
}

/// Factory for [`XPathProcessor`] instances, selected once at composition
/// time. The engine depends only on this trait, never on a concrete backend.
pub trait XmlBackend: Send + Sync {
    /// Short backend identifier used in diagnostics.
    fn name(&self) -> &'static str;

    /// Create an empty document with the given root element.
    fn create_document(&self, root_name: &str) -> NavigationResult<Box<dyn XPathProcessor>>;

    /// Parse an existing document.
    fn parse_document(&self, xml: &str) -> NavigationResult<Box<dyn XPathProcessor>>;
}
