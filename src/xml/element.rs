use crate::util::{escape_ampersand, strip_invalid_chars};

use super::writer;
use super::RenderError;

/// A child of an [`Element`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A nested element.
    Element(Element),
    /// Character data with ampersands already escaped. The writer escapes
    /// `<` and `>` when it emits the node.
    Text(String),
    /// A CDATA section carrying raw, unescaped content.
    CData(String),
}

/// An owned XML element: qualified name, namespace, attributes and children.
///
/// Fragments are built bottom-up and spliced into their parent with
/// [`Element::import`], which deep-copies, so a fragment never shares
/// structure with the tree it was copied into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    namespace: Option<String>,
    declarations: Vec<(String, String)>,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    /// Creates an element with no namespace.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            declarations: Vec::new(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Creates an element bound to `namespace`. The prefix comes from the
    /// qualified `name` (`atom:link` binds `atom`); an unprefixed name binds
    /// the default namespace.
    pub fn with_namespace(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        let mut element = Self::new(name);
        element.namespace = Some(namespace.into());
        element
    }

    /// Declares `xmlns:prefix="uri"` on this element so descendants can use
    /// the prefix without redeclaring it.
    pub fn declare_namespace(
        &mut self,
        prefix: impl Into<String>,
        uri: impl Into<String>,
    ) -> &mut Self {
        let prefix = prefix.into();
        let uri = uri.into();
        match self.declarations.iter_mut().find(|(p, _)| *p == prefix) {
            Some(existing) => existing.1 = uri,
            None => self.declarations.push((prefix, uri)),
        }
        self
    }

    /// Appends a child element, optionally namespaced, with `value` as its
    /// text. Characters illegal in XML are stripped and ampersands escaped
    /// before the text is stored; an absent or empty value leaves the child
    /// empty.
    ///
    /// Returns the new child so callers can set attributes on it.
    pub fn add_child(
        &mut self,
        name: &str,
        value: Option<&str>,
        namespace: Option<&str>,
    ) -> &mut Element {
        let mut child = match namespace {
            Some(uri) => Element::with_namespace(name, uri),
            None => Element::new(name),
        };
        if let Some(value) = value {
            let value = strip_invalid_chars(value);
            if !value.is_empty() {
                child
                    .children
                    .push(Node::Text(escape_ampersand(&value).into_owned()));
            }
        }
        self.push_element(child)
    }

    /// Appends a child element whose content is a CDATA section holding the
    /// raw `value`. Only characters illegal in XML are removed. An absent
    /// value leaves the child empty.
    pub fn add_cdata_child(
        &mut self,
        name: &str,
        value: Option<&str>,
        namespace: Option<&str>,
    ) -> &mut Element {
        let child = self.add_child(name, None, namespace);
        if let Some(value) = value {
            child.children.push(Node::CData(strip_invalid_chars(value).into_owned()));
        }
        child
    }

    /// Sets an attribute, overwriting an existing one of the same name in place.
    pub fn add_attribute(&mut self, name: &str, value: &str) -> &mut Self {
        let value = strip_invalid_chars(value).into_owned();
        match self.attributes.iter_mut().find(|(n, _)| n == name) {
            Some(existing) => existing.1 = value,
            None => self.attributes.push((name.to_string(), value)),
        }
        self
    }

    /// Deep-copies `fragment` and appends the copy as the last child.
    pub fn import(&mut self, fragment: &Element) -> &mut Element {
        self.push_element(fragment.clone())
    }

    fn push_element(&mut self, child: Element) -> &mut Element {
        self.children.push(Node::Element(child));
        match self.children.last_mut() {
            Some(Node::Element(child)) => child,
            _ => unreachable!("an element was pushed just above"),
        }
    }

    /// Qualified name as written, e.g. `content:encoded`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prefix(&self) -> Option<&str> {
        self.name.split_once(':').map(|(prefix, _)| prefix)
    }

    pub fn local_name(&self) -> &str {
        self.name
            .split_once(':')
            .map_or(self.name.as_str(), |(_, local)| local)
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Namespace declarations made explicitly on this element, in order.
    pub fn declarations(&self) -> &[(String, String)] {
        &self.declarations
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Iterates over the element children, skipping text and CDATA.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            _ => None,
        })
    }

    /// First child element with the given qualified name.
    pub fn find(&self, name: &str) -> Option<&Element> {
        self.child_elements().find(|child| child.name == name)
    }

    /// Concatenated text and CDATA of the direct children, as stored.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(text) | Node::CData(text) => Some(text.as_str()),
                Node::Element(_) => None,
            })
            .collect()
    }

    /// Serializes this element as a standalone document: XML declaration,
    /// the element tree, and a trailing newline. `indent` is the number of
    /// spaces per nesting level; `None` writes everything on one line.
    pub fn to_xml(&self, indent: Option<usize>) -> Result<String, RenderError> {
        writer::write_document(self, indent)
    }
}
