// crates/jux-fixtures-core/src/xml/parse.rs
// ============================================================================
// Module: XML Parser
// Description: Builds the document tree from quick-xml events.
// Purpose: Enforce well-formedness and record source spans for every element.
// Dependencies: quick-xml
// ============================================================================

//! ## Overview
//! quick-xml tokenizes the input and checks tag pairing; this module layers
//! the remaining well-formedness rules on top (single root, no stray text,
//! declared prefixes, closed elements at EOF) and records where each element
//! starts and ends so the writer can reproduce untouched regions verbatim.
//! Line endings are normalized before tokenizing, as XML processors must.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use quick_xml::Reader;
use quick_xml::events::BytesStart;
use quick_xml::events::Event;

use super::Attribute;
use super::Document;
use super::Element;
use super::LineIndex;
use super::NamespaceDecl;
use super::Node;
use super::ProcessingInstruction;
use super::SourceSpans;
use super::TextPosition;
use super::XML_NAMESPACE;
use super::XmlDeclaration;
use super::XmlError;
use super::split_qname;

// ============================================================================
// SECTION: Entry Points
// ============================================================================

/// Parses a document from raw bytes.
///
/// # Errors
///
/// Returns [`XmlError::Encoding`] when the bytes are not UTF-8, or any other
/// [`XmlError`] when the document is not well-formed.
pub fn parse_bytes(bytes: &[u8]) -> Result<Document, XmlError> {
    let text = std::str::from_utf8(bytes).map_err(|err| XmlError::Encoding(err.to_string()))?;
    parse_str(text)
}

/// Parses a document from text.
///
/// # Errors
///
/// Returns an [`XmlError`] when the document is not well-formed.
pub fn parse_str(text: &str) -> Result<Document, XmlError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let source = normalize_line_endings(text);
    let tree = TreeBuilder::new(&source).build()?;
    Ok(Document {
        declaration: tree.declaration,
        doctype: tree.doctype,
        prolog: tree.prolog,
        root: tree.root,
        epilog: tree.epilog,
        source,
    })
}

// ============================================================================
// SECTION: Tree Builder
// ============================================================================

/// In-scope namespace bindings keyed by prefix (`""` for the default).
type NamespaceScope = BTreeMap<String, String>;

/// Parsed parts of a document before assembly.
struct ParsedTree {
    /// XML declaration, if present.
    declaration: Option<XmlDeclaration>,
    /// Raw doctype text.
    doctype: Option<String>,
    /// Nodes before the root.
    prolog: Vec<Node>,
    /// Root element.
    root: Element,
    /// Nodes after the root.
    epilog: Vec<Node>,
}

/// Open element on the builder stack.
struct OpenElement {
    /// Element under construction.
    element: Element,
    /// Byte offset of its start tag.
    start: usize,
    /// Namespace scope established by the element.
    scope: NamespaceScope,
}

/// Event-driven tree builder over a normalized source string.
struct TreeBuilder<'a> {
    /// Normalized source text.
    source: &'a str,
    /// Offset to position lookup.
    lines: LineIndex,
    /// Stack of open elements.
    stack: Vec<OpenElement>,
    /// Completed root, once closed.
    root: Option<Element>,
    /// XML declaration.
    declaration: Option<XmlDeclaration>,
    /// Raw doctype.
    doctype: Option<String>,
    /// Prolog nodes.
    prolog: Vec<Node>,
    /// Epilog nodes.
    epilog: Vec<Node>,
}

impl<'a> TreeBuilder<'a> {
    /// Creates a builder over `source`.
    fn new(source: &'a str) -> Self {
        Self {
            source,
            lines: LineIndex::new(source),
            stack: Vec::new(),
            root: None,
            declaration: None,
            doctype: None,
            prolog: Vec::new(),
            epilog: Vec::new(),
        }
    }

    /// Consumes all events and assembles the tree.
    fn build(mut self) -> Result<ParsedTree, XmlError> {
        let mut reader = Reader::from_str(self.source);
        let config = reader.config_mut();
        config.trim_text(false);
        config.check_end_names = true;
        config.check_comments = true;

        loop {
            let start = to_offset(reader.buffer_position());
            let event = match reader.read_event() {
                Ok(event) => event,
                Err(err) => {
                    let at = to_offset(reader.error_position());
                    return Err(XmlError::Syntax {
                        message: err.to_string(),
                        position: Some(self.position(at)),
                    });
                }
            };
            let end = to_offset(reader.buffer_position());
            match event {
                Event::Decl(decl) => {
                    if start != 0 {
                        return Err(self.syntax("XML declaration must appear at the start", start));
                    }
                    let standalone = match decl.standalone() {
                        Some(Ok(value)) => Some(String::from_utf8_lossy(&value).into_owned()),
                        Some(Err(err)) => return Err(self.syntax(&err.to_string(), start)),
                        None => None,
                    };
                    self.declaration = Some(XmlDeclaration {
                        standalone,
                    });
                }
                Event::DocType(_) => {
                    if self.root.is_some() || !self.stack.is_empty() {
                        return Err(self.syntax("DOCTYPE must precede the root element", start));
                    }
                    self.doctype = Some(self.slice(start, end).to_string());
                }
                Event::Start(tag) => {
                    self.ensure_single_root(start)?;
                    let scope = self.child_scope(&tag, start)?;
                    let element = self.open_element(&tag, &scope, start, end, false)?;
                    self.stack.push(OpenElement {
                        element,
                        start,
                        scope,
                    });
                }
                Event::Empty(tag) => {
                    self.ensure_single_root(start)?;
                    let scope = self.child_scope(&tag, start)?;
                    let mut element = self.open_element(&tag, &scope, start, end, true)?;
                    element.spans.element = Some(start .. end);
                    self.attach(element);
                }
                Event::End(_) => {
                    let Some(open) = self.stack.pop() else {
                        return Err(self.syntax("end tag without a matching start tag", start));
                    };
                    let mut element = open.element;
                    element.spans.element = Some(open.start .. end);
                    self.attach(element);
                }
                Event::Text(_) => {
                    let raw = self.slice(start, end);
                    let value = quick_xml::escape::unescape(raw)
                        .map_err(|err| self.syntax(&err.to_string(), start))?;
                    self.push_text(value.into_owned(), start)?;
                }
                Event::CData(_) => {
                    let content = self.inner(start, end, "<![CDATA[".len(), "]]>".len());
                    if self.stack.is_empty() {
                        return Err(XmlError::TextOutsideRoot {
                            position: self.position(start),
                        });
                    }
                    self.push_node(Node::CData(content.to_string()));
                }
                Event::Comment(_) => {
                    let content = self.inner(start, end, "<!--".len(), "-->".len());
                    self.push_node(Node::Comment(content.to_string()));
                }
                Event::PI(_) => {
                    let content = self.inner(start, end, "<?".len(), "?>".len());
                    let instruction = parse_instruction(content);
                    if instruction.target.eq_ignore_ascii_case("xml") {
                        return Err(self.syntax("reserved processing instruction target 'xml'", start));
                    }
                    self.push_node(Node::ProcessingInstruction(instruction));
                }
                Event::Eof => break,
            }
        }

        if let Some(open) = self.stack.last() {
            return Err(XmlError::UnclosedElement {
                element: open.element.name.clone(),
                position: self.position(open.start),
            });
        }
        let root = self.root.ok_or(XmlError::MissingRoot)?;
        Ok(ParsedTree {
            declaration: self.declaration,
            doctype: self.doctype,
            prolog: self.prolog,
            root,
            epilog: self.epilog,
        })
    }

    /// Rejects a second top-level element.
    fn ensure_single_root(&self, start: usize) -> Result<(), XmlError> {
        if self.stack.is_empty() && self.root.is_some() {
            return Err(XmlError::MultipleRoots {
                position: self.position(start),
            });
        }
        Ok(())
    }

    /// Computes the namespace scope introduced by a start tag.
    fn child_scope(&self, tag: &BytesStart<'_>, start: usize) -> Result<NamespaceScope, XmlError> {
        let mut scope = self.stack.last().map(|open| open.scope.clone()).unwrap_or_default();
        for attr in tag.attributes() {
            let attr = attr.map_err(|err| self.syntax(&err.to_string(), start))?;
            let key = self.utf8(attr.key.as_ref(), start)?;
            if key == "xmlns" {
                let value = self.attribute_value(&attr.value, start)?;
                scope.insert(String::new(), value);
            } else if let Some(prefix) = key.strip_prefix("xmlns:") {
                let value = self.attribute_value(&attr.value, start)?;
                if value.is_empty() {
                    return Err(self.syntax(&format!("prefix '{prefix}' cannot be undeclared"), start));
                }
                scope.insert(prefix.to_string(), value);
            }
        }
        Ok(scope)
    }

    /// Builds an element from a start or empty tag.
    fn open_element(
        &self,
        tag: &BytesStart<'_>,
        scope: &NamespaceScope,
        start: usize,
        end: usize,
        self_closing: bool,
    ) -> Result<Element, XmlError> {
        let name = self.utf8(tag.name().as_ref(), start)?.to_string();
        if !is_valid_name(&name) {
            return Err(self.syntax(&format!("invalid element name '{name}'"), start));
        }
        let namespace = self.resolve(split_qname(&name).0, scope, true, start)?;
        let mut namespaces = Vec::new();
        let mut attributes: Vec<Attribute> = Vec::new();
        for attr in tag.attributes() {
            let attr = attr.map_err(|err| self.syntax(&err.to_string(), start))?;
            let key = self.utf8(attr.key.as_ref(), start)?;
            let value = self.attribute_value(&attr.value, start)?;
            if key == "xmlns" {
                namespaces.push(NamespaceDecl {
                    prefix: None,
                    uri: value,
                });
            } else if let Some(prefix) = key.strip_prefix("xmlns:") {
                namespaces.push(NamespaceDecl {
                    prefix: Some(prefix.to_string()),
                    uri: value,
                });
            } else {
                let namespace = match split_qname(key).0 {
                    Some(prefix) => self.resolve(Some(prefix), scope, false, start)?,
                    None => None,
                };
                let local = split_qname(key).1;
                if namespace.is_some()
                    && attributes.iter().any(|other| {
                        other.namespace == namespace && other.local_name() == local
                    })
                {
                    return Err(self.syntax(&format!("duplicate attribute '{key}'"), start));
                }
                attributes.push(Attribute {
                    name: key.to_string(),
                    value,
                    namespace,
                });
            }
        }
        Ok(Element {
            name,
            namespace,
            namespaces,
            attributes,
            children: Vec::new(),
            position: Some(self.position(start)),
            self_closing,
            spans: SourceSpans {
                start_tag: Some(start .. end),
                element: None,
            },
        })
    }

    /// Resolves a prefix against the scope.
    fn resolve(
        &self,
        prefix: Option<&str>,
        scope: &NamespaceScope,
        use_default: bool,
        start: usize,
    ) -> Result<Option<String>, XmlError> {
        match prefix {
            Some("xml") => Ok(Some(XML_NAMESPACE.to_string())),
            Some(prefix) => scope.get(prefix).cloned().map(Some).ok_or_else(|| {
                XmlError::UndeclaredPrefix {
                    prefix: prefix.to_string(),
                    position: self.position(start),
                }
            }),
            None if use_default => Ok(scope.get("").filter(|uri| !uri.is_empty()).cloned()),
            None => Ok(None),
        }
    }

    /// Decodes and normalizes an attribute value.
    fn attribute_value(&self, raw: &[u8], start: usize) -> Result<String, XmlError> {
        let raw = self.utf8(raw, start)?;
        if raw.contains('<') {
            return Err(self.syntax("'<' is not allowed in attribute values", start));
        }
        let normalized: String =
            raw.chars().map(|ch| if matches!(ch, '\t' | '\n' | '\r') { ' ' } else { ch }).collect();
        quick_xml::escape::unescape(&normalized)
            .map(std::borrow::Cow::into_owned)
            .map_err(|err| self.syntax(&err.to_string(), start))
    }

    /// Adds character data to the open element.
    fn push_text(&mut self, value: String, start: usize) -> Result<(), XmlError> {
        if self.stack.is_empty() {
            if value.chars().all(char::is_whitespace) {
                return Ok(());
            }
            return Err(XmlError::TextOutsideRoot {
                position: self.position(start),
            });
        }
        self.push_node(Node::Text(value));
        Ok(())
    }

    /// Adds a node to the open element, the prolog, or the epilog.
    fn push_node(&mut self, node: Node) {
        if let Some(open) = self.stack.last_mut() {
            open.element.children.push(node);
        } else if self.root.is_some() {
            self.epilog.push(node);
        } else {
            self.prolog.push(node);
        }
    }

    /// Attaches a completed element to its parent or installs it as root.
    fn attach(&mut self, element: Element) {
        if let Some(open) = self.stack.last_mut() {
            open.element.children.push(Node::Element(element));
        } else {
            self.root = Some(element);
        }
    }

    /// Returns the source between `start` and `end`.
    fn slice(&self, start: usize, end: usize) -> &'a str {
        self.source.get(start .. end).unwrap_or_default()
    }

    /// Returns the source inside a delimited construct.
    fn inner(&self, start: usize, end: usize, open: usize, close: usize) -> &'a str {
        let from = start.saturating_add(open);
        let to = end.saturating_sub(close).max(from);
        self.slice(from, to)
    }

    /// Interprets bytes from the (already UTF-8) source.
    fn utf8<'b>(&self, bytes: &'b [u8], start: usize) -> Result<&'b str, XmlError> {
        std::str::from_utf8(bytes).map_err(|err| self.syntax(&err.to_string(), start))
    }

    /// Returns the position of a byte offset.
    fn position(&self, offset: usize) -> TextPosition {
        self.lines.position(self.source, offset)
    }

    /// Builds a syntax error located at `offset`.
    fn syntax(&self, message: &str, offset: usize) -> XmlError {
        XmlError::Syntax {
            message: message.to_string(),
            position: Some(self.position(offset)),
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Converts a reader position into a byte offset.
fn to_offset<T: TryInto<usize>>(value: T) -> usize {
    value.try_into().unwrap_or(usize::MAX)
}

/// Replaces `\r\n` and lone `\r` with `\n`.
fn normalize_line_endings(text: &str) -> String {
    if !text.contains('\r') {
        return text.to_string();
    }
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Splits processing-instruction content into target and data.
fn parse_instruction(content: &str) -> ProcessingInstruction {
    let trimmed = content.trim_start();
    let (target, data) = trimmed
        .split_once(|ch: char| ch.is_whitespace())
        .map_or((trimmed, ""), |(target, data)| (target, data.trim_start()));
    ProcessingInstruction {
        target: target.to_string(),
        data: data.to_string(),
    }
}

/// Checks the coarse shape of an XML name.
fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_alphabetic() || first == '_' || first == ':') {
        return false;
    }
    if name.starts_with(':') || name.ends_with(':') || name.matches(':').count() > 1 {
        return false;
    }
    chars.all(|ch| ch.is_alphanumeric() || matches!(ch, '_' | ':' | '-' | '.' | '\u{b7}'))
}
