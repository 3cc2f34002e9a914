//! Alternative navigation backend built on `roxmltree`.
//!
//! Documents are parsed by `roxmltree` and copied into an owned node table
//! so positions survive past the borrowed parse. Serialization walks the
//! table with an explicit work stack and emits through `quick_xml::Writer`,
//! mirroring the baseline backend's event conventions exactly — the two
//! backends must produce byte-identical documents for the same mapping
//! action sequence.

use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use crate::error::{NavigationError, NavigationResult};
use crate::xpath::{NodeHandle, Step, XPathExpression, XPathProcessor, XmlBackend, validate_name};

#[derive(Debug, Default)]
struct RoNode {
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<usize>,
}

/// XPath processor whose read machinery is `roxmltree`.
pub struct RoxmlProcessor {
    nodes: Vec<RoNode>,
}

enum Emit {
    Open(usize),
    Close(usize),
}

impl RoxmlProcessor {
    /// Create an empty document with the given root element.
    pub fn new(root_name: &str) -> NavigationResult<Self> {
        validate_name(root_name)?;
        Ok(Self {
            nodes: vec![RoNode {
                name: root_name.to_string(),
                ..RoNode::default()
            }],
        })
    }

    /// Parse a document from text.
    pub fn parse(xml: &str) -> NavigationResult<Self> {
        let document =
            roxmltree::Document::parse(xml).map_err(|e| NavigationError::MalformedDocument {
                details: e.to_string(),
            })?;
        let mut nodes = Vec::new();
        copy_element(document.root_element(), &mut nodes);
        Ok(Self { nodes })
    }

    fn node(&self, position: NodeHandle) -> NavigationResult<&RoNode> {
        self.nodes
            .get(position.node)
            .ok_or_else(|| NavigationError::DetachedNode {
                details: format!("node {} out of range", position.node),
            })
    }

    /// Depth-first step resolution, preserving document order.
    fn collect(&self, id: usize, steps: &[Step], matches: &mut Vec<NodeHandle>) {
        match steps.first() {
            None => matches.push(NodeHandle::element(id)),
            Some(Step::Child(name)) => {
                for &child in &self.nodes[id].children {
                    if self.nodes[child].name == *name {
                        self.collect(child, &steps[1..], matches);
                    }
                }
            }
            Some(Step::Attribute(name)) => {
                if let Some(slot) = self.nodes[id]
                    .attributes
                    .iter()
                    .position(|(key, _)| key == name)
                {
                    matches.push(NodeHandle::attribute(id, slot));
                }
            }
        }
    }

    fn resolve(
        &self,
        position: NodeHandle,
        path: &XPathExpression,
    ) -> NavigationResult<Vec<NodeHandle>> {
        self.node(position)?;
        if position.is_attribute() {
            return if path.steps().is_empty() {
                Ok(vec![position])
            } else {
                Ok(Vec::new())
            };
        }
        let mut matches = Vec::new();
        self.collect(position.node, path.steps(), &mut matches);
        Ok(matches)
    }
}

fn copy_element(source: roxmltree::Node<'_, '_>, nodes: &mut Vec<RoNode>) -> usize {
    let id = nodes.len();
    nodes.push(RoNode {
        name: source.tag_name().name().to_string(),
        attributes: source
            .attributes()
            .map(|a| (a.name().to_string(), a.value().to_string()))
            .collect(),
        ..RoNode::default()
    });

    let mut text = String::new();
    let mut children = Vec::new();
    for child in source.children() {
        if child.is_element() {
            children.push(copy_element(child, nodes));
        } else if child.is_text() {
            if let Some(content) = child.text() {
                text.push_str(content.trim());
            }
        }
    }
    nodes[id].text = text;
    nodes[id].children = children;
    id
}

impl XPathProcessor for RoxmlProcessor {
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
        let node = self.node(position)?;
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
        Ok(self.node(position)?.name.clone())
    }

    fn create_child(&mut self, position: NodeHandle, name: &str) -> NavigationResult<NodeHandle> {
        validate_name(name)?;
        if position.is_attribute() {
            return Err(NavigationError::NotAnElement {
                operation: "create a child",
            });
        }
        self.node(position)?;

        let id = self.nodes.len();
        self.nodes.push(RoNode {
            name: name.to_string(),
            ..RoNode::default()
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
        if position.is_attribute() {
            return Err(NavigationError::NotAnElement {
                operation: "set an attribute",
            });
        }
        self.node(position)?;

        let attributes = &mut self.nodes[position.node].attributes;
        match attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => attributes.push((name.to_string(), value.to_string())),
        }
        Ok(())
    }

    fn set_text(&mut self, position: NodeHandle, value: &str) -> NavigationResult<()> {
        if position.is_attribute() {
            return Err(NavigationError::NotAnElement { operation: "set text" });
        }
        self.node(position)?;
        self.nodes[position.node].text = value.to_string();
        Ok(())
    }

    fn to_xml(&self) -> NavigationResult<String> {
        let serialization = |details: String| NavigationError::Serialization { details };

        let mut writer = Writer::new(Vec::new());
        let mut work = vec![Emit::Open(0)];
        while let Some(item) = work.pop() {
            match item {
                Emit::Open(id) => {
                    let node = &self.nodes[id];
                    let mut start = BytesStart::new(node.name.as_str());
                    for (key, value) in &node.attributes {
                        start.push_attribute((key.as_str(), value.as_str()));
                    }

                    if node.children.is_empty() && node.text.is_empty() {
                        writer
                            .write_event(Event::Empty(start))
                            .map_err(|e| serialization(e.to_string()))?;
                        continue;
                    }

                    writer
                        .write_event(Event::Start(start))
                        .map_err(|e| serialization(e.to_string()))?;
                    work.push(Emit::Close(id));
                    for &child in node.children.iter().rev() {
                        work.push(Emit::Open(child));
                    }
                    if !node.text.is_empty() {
                        writer
                            .write_event(Event::Text(BytesText::new(&node.text)))
                            .map_err(|e| serialization(e.to_string()))?;
                    }
                }
                Emit::Close(id) => {
                    writer
                        .write_event(Event::End(BytesEnd::new(self.nodes[id].name.as_str())))
                        .map_err(|e| serialization(e.to_string()))?;
                }
            }
        }
        String::from_utf8(writer.into_inner()).map_err(|e| serialization(e.to_string()))
    }
}

/// Factory for [`RoxmlProcessor`] documents.
pub struct RoxmlBackend;

impl XmlBackend for RoxmlBackend {
    fn name(&self) -> &'static str {
        "roxmltree"
    }

    fn create_document(&self, root_name: &str) -> NavigationResult<Box<dyn XPathProcessor>> {
        Ok(Box::new(RoxmlProcessor::new(root_name)?))
    }

    fn parse_document(&self, xml: &str) -> NavigationResult<Box<dyn XPathProcessor>> {
        Ok(Box::new(RoxmlProcessor::parse(xml)?))
    }
}
