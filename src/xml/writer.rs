use std::borrow::Cow;
use std::io::Cursor;

use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use super::{Element, Node, RenderError};

/// Serializes `root` as a complete UTF-8 document.
///
/// Namespace declarations are emitted before ordinary attributes, and only
/// where the element's prefix is not already bound to the same URI by an
/// ancestor. Elements without children are self-closed; text-only elements
/// stay on one line.
pub(crate) fn write_document(root: &Element, indent: Option<usize>) -> Result<String, RenderError> {
    let mut writer = match indent {
        Some(width) => Writer::new_with_indent(Cursor::new(Vec::new()), b' ', width),
        None => Writer::new(Cursor::new(Vec::new())),
    };

    emit(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
    )?;
    if indent.is_none() {
        // Unindented output still puts the root on its own line
        emit(&mut writer, Event::Text(BytesText::from_escaped("\n")))?;
    }

    let mut scope = Vec::new();
    write_element(&mut writer, root, &mut scope)?;

    let mut bytes = writer.into_inner().into_inner();
    bytes.push(b'\n');
    let xml = String::from_utf8(bytes)?;
    tracing::debug!(root = root.name(), bytes = xml.len(), "Serialized XML document");
    Ok(xml)
}

fn write_element(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    element: &Element,
    scope: &mut Vec<(String, String)>,
) -> Result<(), RenderError> {
    let scope_len = scope.len();
    let mut start = BytesStart::new(element.name());

    for (prefix, uri) in element.declarations() {
        start.push_attribute((xmlns_attribute(prefix).as_str(), uri.as_str()));
        scope.push((prefix.clone(), uri.clone()));
    }

    if let Some(uri) = element.namespace() {
        let prefix = element.prefix().unwrap_or("");
        if !is_bound(scope, prefix, uri) {
            start.push_attribute((xmlns_attribute(prefix).as_str(), uri));
            scope.push((prefix.to_string(), uri.to_string()));
        }
    }

    for (name, value) in element.attributes() {
        start.push_attribute((name.as_str(), value.as_str()));
    }

    if element.children().is_empty() {
        emit(writer, Event::Empty(start))?;
    } else {
        emit(writer, Event::Start(start))?;
        for child in element.children() {
            match child {
                Node::Element(child) => write_element(writer, child, scope)?,
                Node::Text(text) => {
                    emit(
                        writer,
                        Event::Text(BytesText::from_escaped(escape_angle_brackets(text))),
                    )?;
                }
                Node::CData(content) => {
                    for section in cdata_sections(content) {
                        emit(writer, Event::CData(BytesCData::new(section)))?;
                    }
                }
            }
        }
        emit(writer, Event::End(BytesEnd::new(element.name())))?;
    }

    scope.truncate(scope_len);
    Ok(())
}

fn emit(writer: &mut Writer<Cursor<Vec<u8>>>, event: Event<'_>) -> Result<(), RenderError> {
    writer
        .write_event(event)
        .map_err(|e| RenderError::Write(e.to_string()))
}

fn xmlns_attribute(prefix: &str) -> String {
    if prefix.is_empty() {
        "xmlns".to_string()
    } else {
        format!("xmlns:{prefix}")
    }
}

/// Innermost binding wins, so search from the end.
fn is_bound(scope: &[(String, String)], prefix: &str, uri: &str) -> bool {
    scope
        .iter()
        .rev()
        .find(|(p, _)| p == prefix)
        .is_some_and(|(_, bound)| bound == uri)
}

/// Text nodes arrive with ampersands already escaped.
fn escape_angle_brackets(text: &str) -> Cow<'_, str> {
    if !text.contains(['<', '>']) {
        return Cow::Borrowed(text);
    }
    Cow::Owned(text.replace('<', "&lt;").replace('>', "&gt;"))
}

/// Splits content so no section contains the `]]>` terminator: each split
/// point ends one section with `]]` and starts the next with `>`.
fn cdata_sections(content: &str) -> Vec<&str> {
    let mut sections = Vec::new();
    let mut rest = content;
    while let Some(idx) = rest.find("]]>") {
        sections.push(&rest[..idx + 2]);
        rest = &rest[idx + 2..];
    }
    sections.push(rest);
    sections
}
