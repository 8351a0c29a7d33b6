//! In-process SVG optimizer. Buffers one whole document, parses it, strips editor and
//! redundant data, and emits a single compact serialization.
//!
//! The output is a fixed point: optimizing it again yields the same bytes.

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesCData, BytesEnd, BytesStart, BytesText, Event};
use thiserror::Error;

use super::context::Chunk;
use super::stage::Transform;

/// Namespace prefixes written by vector editors; meaningless to a renderer.
const EDITOR_PREFIXES: &[&str] = &["sodipodi", "inkscape"];

/// Elements dropped together with their subtree.
const DROPPED_ELEMENTS: &[&str] = &["metadata"];

/// Containers removed when they end up with no children.
const EMPTY_CONTAINERS: &[&str] = &["g", "defs"];

/// Whitespace is content inside these.
const TEXT_CONTENT: &[&str] = &["text", "tspan", "textPath", "title", "desc", "style"];

#[derive(Error, Debug, PartialEq, Eq)]
pub enum OptimizeError {
    #[error("document is not valid UTF-8: {0}")]
    Encoding(String),
    #[error("malformed markup {0}")]
    Malformed(String),
    #[error("document has no root element")]
    NoRoot,
    #[error("document has more than one root element")]
    MultipleRoots,
    #[error("text outside the root element")]
    StrayText,
    #[error("element <{0}> is never closed")]
    Unclosed(String),
    #[error("cannot serialize optimized document: {0}")]
    Serialize(String),
}

#[derive(Debug)]
enum Node {
    Element(Element),
    /// Raw (still escaped) character data.
    Text(String),
    CData(String),
}

#[derive(Debug)]
struct Element {
    name: String,
    attrs: Vec<(String, String)>,
    children: Vec<Node>,
}

/// Optimize one complete document.
pub fn optimize_svg(doc: &str) -> Result<String, OptimizeError> {
    let root = parse(doc)?;
    let root = clean(root, true).ok_or(OptimizeError::NoRoot)?;
    let mut writer = Writer::new(Vec::with_capacity(doc.len()));
    write_element(&mut writer, &root)?;
    String::from_utf8(writer.into_inner()).map_err(|e| OptimizeError::Encoding(e.to_string()))
}

fn utf8(bytes: &[u8]) -> Result<String, OptimizeError> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| OptimizeError::Encoding(e.to_string()))
}

fn element_from(start: &BytesStart) -> Result<Element, OptimizeError> {
    let name = utf8(start.name().as_ref())?;
    let mut attrs = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| OptimizeError::Malformed(format!("in <{name}>: {e}")))?;
        attrs.push((utf8(attr.key.as_ref())?, utf8(&attr.value)?));
    }
    Ok(Element {
        name,
        attrs,
        children: Vec::new(),
    })
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, node: Node) -> Result<(), OptimizeError> {
    match (stack.last_mut(), node) {
        (Some(parent), node) => parent.children.push(node),
        (None, Node::Element(el)) => {
            if root.is_some() {
                return Err(OptimizeError::MultipleRoots);
            }
            *root = Some(el);
        }
        (None, Node::Text(t) | Node::CData(t)) => {
            if !is_xml_whitespace(&t) {
                return Err(OptimizeError::StrayText);
            }
        }
    }
    Ok(())
}

fn parse(doc: &str) -> Result<Element, OptimizeError> {
    let mut reader = Reader::from_str(doc);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;
    loop {
        let event = reader.read_event().map_err(|e| {
            OptimizeError::Malformed(format!("at byte {}: {}", reader.error_position(), e))
        })?;
        match event {
            Event::Start(e) => {
                if root.is_some() && stack.is_empty() {
                    return Err(OptimizeError::MultipleRoots);
                }
                stack.push(element_from(&e)?);
            }
            Event::Empty(e) => {
                let el = element_from(&e)?;
                attach(&mut stack, &mut root, Node::Element(el))?;
            }
            Event::End(e) => {
                let el = stack.pop().ok_or_else(|| {
                    OptimizeError::Malformed(format!(
                        "unexpected </{}>",
                        String::from_utf8_lossy(e.name().as_ref())
                    ))
                })?;
                attach(&mut stack, &mut root, Node::Element(el))?;
            }
            Event::Text(t) => {
                let text = utf8(&t.into_inner())?;
                attach(&mut stack, &mut root, Node::Text(text))?;
            }
            Event::CData(c) => {
                let text = utf8(&c.into_inner())?;
                attach(&mut stack, &mut root, Node::CData(text))?;
            }
            Event::Eof => break,
            // Declaration, processing instructions, doctype and comments are dropped.
            _ => {}
        }
    }
    if let Some(open) = stack.last() {
        return Err(OptimizeError::Unclosed(open.name.clone()));
    }
    root.ok_or(OptimizeError::NoRoot)
}

fn is_xml_whitespace(s: &str) -> bool {
    s.bytes().all(|b| matches!(b, b' ' | b'\t' | b'\n' | b'\r'))
}

fn has_editor_prefix(name: &str) -> bool {
    name.split_once(':')
        .is_some_and(|(prefix, _)| EDITOR_PREFIXES.contains(&prefix))
}

fn is_editor_attr(key: &str) -> bool {
    match key.strip_prefix("xmlns:") {
        Some(declared) => EDITOR_PREFIXES.contains(&declared),
        None => has_editor_prefix(key),
    }
}

fn normalize_value(value: &str) -> String {
    value
        .split_ascii_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace('"', "&quot;")
}

/// Returns `None` when the element should disappear. Children are cleaned first, so
/// removal cascades up in a single pass.
fn clean(mut el: Element, is_root: bool) -> Option<Element> {
    el.attrs.retain(|(key, _)| !is_editor_attr(key));
    for (_, value) in el.attrs.iter_mut() {
        *value = normalize_value(value);
    }

    let keep_whitespace = TEXT_CONTENT.contains(&el.name.as_str());
    el.children = std::mem::take(&mut el.children)
        .into_iter()
        .filter_map(|child| match child {
            Node::Element(c) => {
                if DROPPED_ELEMENTS.contains(&c.name.as_str()) || has_editor_prefix(&c.name) {
                    None
                } else {
                    clean(c, false).map(Node::Element)
                }
            }
            Node::Text(t) if !keep_whitespace && is_xml_whitespace(&t) => None,
            other => Some(other),
        })
        .collect();

    if !is_root && el.children.is_empty() && EMPTY_CONTAINERS.contains(&el.name.as_str()) {
        return None;
    }
    Some(el)
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event) -> Result<(), OptimizeError> {
    writer
        .write_event(event)
        .map_err(|e| OptimizeError::Serialize(e.to_string()))
}

fn write_element(writer: &mut Writer<Vec<u8>>, el: &Element) -> Result<(), OptimizeError> {
    let mut start = BytesStart::new(el.name.as_str());
    for (key, value) in &el.attrs {
        // Values are already escaped; push them untouched.
        start.push_attribute((key.as_bytes(), value.as_bytes()));
    }
    if el.children.is_empty() {
        return emit(writer, Event::Empty(start));
    }
    emit(writer, Event::Start(start))?;
    for child in &el.children {
        match child {
            Node::Element(c) => write_element(writer, c)?,
            Node::Text(t) => emit(writer, Event::Text(BytesText::from_escaped(t.as_str())))?,
            Node::CData(c) => emit(writer, Event::CData(BytesCData::new(c.as_str())))?,
        }
    }
    emit(writer, Event::End(BytesEnd::new(el.name.as_str())))
}

/// [`Transform`] wrapper: collects the whole item, then emits exactly one optimized document.
#[derive(Default)]
pub struct Optimize {
    buf: Vec<u8>,
}

impl Optimize {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Transform for Optimize {
    fn name(&self) -> &str {
        "optimize"
    }

    fn transform(&mut self, chunk: Chunk) -> Result<Vec<Chunk>, String> {
        self.buf.extend_from_slice(&chunk);
        Ok(Vec::new())
    }

    fn finish(&mut self) -> Result<Vec<Chunk>, String> {
        let buf = std::mem::take(&mut self.buf);
        let doc = String::from_utf8(buf).map_err(|e| OptimizeError::Encoding(e.to_string()).to_string())?;
        let optimized = optimize_svg(&doc).map_err(|e| e.to_string())?;
        Ok(vec![optimized.into_bytes()])
    }
}
