//! Baseline navigation backend built on `quick-xml`.
//!
//! The document is a flat arena of element records indexed by node id.
//! Parsing drives a `quick_xml::Reader` event loop with an open-element
//! stack; serialization replays the arena through a `quick_xml::Writer`.

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use crate::error::{NavigationError, NavigationResult};
use crate::xpath::{NodeHandle, Step, XPathExpression, XPathProcessor, XmlBackend, validate_name};

/// One element in the arena. Text content is the concatenation of the
/// element's direct text nodes; mixed-content ordering is not modeled.
#[derive(Debug, Default)]
struct ElementData {
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<usize>,
}

/// Arena-based XPath processor over `quick-xml`.
///
/// Node id 0 is always the document root. Handles index into the arena and
/// stay valid for the lifetime of the processor because nodes are only ever
/// appended, never removed.
pub struct QuickXmlProcessor {
    nodes: Vec<ElementData>,
}

impl QuickXmlProcessor {
    /// Create an empty document with the given root element.
    pub fn new(root_name: &str) -> NavigationResult<Self> {
        validate_name(root_name)?;
        Ok(Self {
            nodes: vec![ElementData {
                name: root_name.to_string(),
                ..ElementData::default()
            }],
        })
    }

    /// Parse a document from text.
    pub fn parse(xml: &str) -> NavigationResult<Self> {
        let malformed = |details: String| NavigationError::MalformedDocument { details };

        let mut reader = Reader::from_str(xml);
        let config = reader.config_mut();
        config.trim_text_start = true;
        config.trim_text_end = true;

        let mut nodes: Vec<ElementData> = Vec::new();
        let mut stack: Vec<usize> = Vec::new();

        loop {
            match reader.read_event() {
                Ok(Event::Start(start)) => {
                    let id = append_element(&mut nodes, &stack, &start)?;
                    stack.push(id);
                }
                Ok(Event::Empty(start)) => {
                    append_element(&mut nodes, &stack, &start)?;
                }
                Ok(Event::End(_)) => {
                    stack.pop();
                }
                Ok(Event::Text(text)) => {
                    let content = text.unescape().map_err(|e| malformed(e.to_string()))?;
                    if let Some(&open) = stack.last() {
                        nodes[open].text.push_str(&content);
                    }
                }
                Ok(Event::CData(data)) => {
                    let content = String::from_utf8_lossy(&data.into_inner()).into_owned();
                    if let Some(&open) = stack.last() {
                        nodes[open].text.push_str(content.trim());
                    }
                }
                Ok(Event::Eof) => break,
                // declarations, comments, processing instructions, doctype
                Ok(_) => {}
                Err(e) => return Err(malformed(e.to_string())),
            }
        }

        if nodes.is_empty() {
            return Err(malformed("no root element".to_string()));
        }
        Ok(Self { nodes })
    }

    fn element(&self, position: NodeHandle) -> NavigationResult<&ElementData> {
        self.nodes
            .get(position.node)
            .ok_or_else(|| NavigationError::DetachedNode {
                details: format!("node {} out of range", position.node),
            })
    }

    fn mutable_element(
        &mut self,
        position: NodeHandle,
        operation: &'static str,
    ) -> NavigationResult<&mut ElementData> {
        if position.is_attribute() {
            return Err(NavigationError::NotAnElement { operation });
        }
        let node = position.node;
        self.nodes
            .get_mut(node)
            .ok_or_else(|| NavigationError::DetachedNode {
                details: format!("node {node} out of range"),
            })
    }

    /// Resolve all matches for `path`, breadth-per-step in document order.
    fn resolve(
        &self,
        position: NodeHandle,
        path: &XPathExpression,
    ) -> NavigationResult<Vec<NodeHandle>> {
        self.element(position)?;
        if position.is_attribute() {
            // An attribute has no substructure; only `.` resolves.
            return if path.steps().is_empty() {
                Ok(vec![position])
            } else {
                Ok(Vec::new())
            };
        }

        let mut frontier = vec![position.node];
        for step in path.steps() {
            match step {
                Step::Child(name) => {
                    frontier = frontier
                        .iter()
                        .flat_map(|&id| self.nodes[id].children.iter().copied())
                        .filter(|&child| self.nodes[child].name == *name)
                        .collect();
                }
                Step::Attribute(name) => {
                    // Guaranteed final step by expression parsing.
                    return Ok(frontier
                        .into_iter()
                        .filter_map(|id| {
                            self.nodes[id]
                                .attributes
                                .iter()
                                .position(|(key, _)| key == name)
                                .map(|slot| NodeHandle::attribute(id, slot))
                        })
                        .collect());
                }
            }
        }
        Ok(frontier.into_iter().map(NodeHandle::element).collect())
    }

    fn write_element(
        &self,
        writer: &mut Writer<Vec<u8>>,
        id: usize,
    ) -> NavigationResult<()> {
        let serialization = |details: String| NavigationError::Serialization { details };

        let node = &self.nodes[id];
        let mut start = BytesStart::new(node.name.as_str());
        for (key, value) in &node.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if node.children.is_empty() && node.text.is_empty() {
            writer
                .write_event(Event::Empty(start))
                .map_err(|e| serialization(e.to_string()))?;
            return Ok(());
        }

        writer
            .write_event(Event::Start(start))
            .map_err(|e| serialization(e.to_string()))?;
        if !node.text.is_empty() {
            writer
                .write_event(Event::Text(BytesText::new(&node.text)))
                .map_err(|e| serialization(e.to_string()))?;
        }
        for &child in &node.children {
            self.write_element(writer, child)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new(node.name.as_str())))
            .map_err(|e| serialization(e.to_string()))
    }
}

fn append_element(
    nodes: &mut Vec<ElementData>,
    stack: &[usize],
    start: &BytesStart<'_>,
) -> NavigationResult<usize> {
    let malformed = |details: String| NavigationError::MalformedDocument { details };

    if stack.is_empty() && !nodes.is_empty() {
        return Err(malformed("multiple root elements".to_string()));
    }

    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| malformed(e.to_string()))?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute
            .unescape_value()
            .map_err(|e| malformed(e.to_string()))?
            .into_owned();
        attributes.push((key, value));
    }

    let id = nodes.len();
    nodes.push(ElementData {
        name,
        attributes,
        text: String::new(),
        children: Vec::new(),
    });
    if let Some(&parent) = stack.last() {
        nodes[parent].children.push(id);
    }
    Ok(id)
}

impl XPathProcessor for QuickXmlProcessor {
    fn root(&self) -> NodeHandle {
        NodeHandle::element(0)
    }

    fn select_single(
        &self,
        position: NodeHandle,
        path: &XPathExpression,
    ) -> NavigationResult<Option<NodeHandle>> {
        Ok(self.resolve(position, path)?.into_iter().next())
    }

    fn select_many(
        &self,
        position: NodeHandle,
        path: &XPathExpression,
    ) -> NavigationResult<Vec<NodeHandle>> {
        self.resolve(position, path)
    }

    fn read_value(&self, position: NodeHandle) -> NavigationResult<String> {
        let node = self.element(position)?;
        match position.attr {
            None => Ok(node.text.clone()),
            Some(slot) => node
                .attributes
                .get(slot)
                .map(|(_, value)| value.clone())
                .ok_or_else(|| NavigationError::DetachedNode {
                    details: format!("attribute slot {slot} out of range"),
                }),
        }
    }

    fn element_name(&self, position: NodeHandle) -> NavigationResult<String> {
        if position.is_attribute() {
            return Err(NavigationError::NotAnElement {
                operation: "read element name",
            });
        }
        Ok(self.element(position)?.name.clone())
    }

    fn create_child(&mut self, position: NodeHandle, name: &str) -> NavigationResult<NodeHandle> {
        validate_name(name)?;
        self.mutable_element(position, "create a child")?;

        let id = self.nodes.len();
        self.nodes.push(ElementData {
            name: name.to_string(),
            ..ElementData::default()
        });
        self.nodes[position.node].children.push(id);
        Ok(NodeHandle::element(id))
    }

    fn set_attribute(
        &mut self,
        position: NodeHandle,
        name: &str,
        value: &str,
    ) -> NavigationResult<()> {
        validate_name(name)?;
        let node = self.mutable_element(position, "set an attribute")?;
        match node.attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => node.attributes.push((name.to_string(), value.to_string())),
        }
        Ok(())
    }

    fn set_text(&mut self, position: NodeHandle, value: &str) -> NavigationResult<()> {
        let node = self.mutable_element(position, "set text")?;
        node.text = value.to_string();
        Ok(())
    }

    fn to_xml(&self) -> NavigationResult<String> {
        let mut writer = Writer::new(Vec::new());
        self.write_element(&mut writer, 0)?;
        String::from_utf8(writer.into_inner()).map_err(|e| NavigationError::Serialization {
            details: e.to_string(),
        })
    }
}

/// Factory for [`QuickXmlProcessor`] documents.
pub struct QuickXmlBackend;

impl XmlBackend for QuickXmlBackend {
    fn name(&self) -> &'static str {
        "quick-xml"
    }

    fn create_document(&self, root_name: &str) -> NavigationResult<Box<dyn XPathProcessor>> {
        Ok(Box::new(QuickXmlProcessor::new(root_name)?))
    }

    fn parse_document(&self, xml: &str) -> NavigationResult<Box<dyn XPathProcessor>> {
        Ok(Box::new(QuickXmlProcessor::parse(xml)?))
    }
}
