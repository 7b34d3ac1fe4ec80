//! Streaming XML traversal shared by the settings and POM readers
//!
//! Both documents are read the same way: keep the stack of open element
//! names and hand every text node to a visitor together with that stack.

use quick_xml::Reader;
use quick_xml::events::Event;

/// One step of the traversal; `path` holds local element names from the root
#[derive(Debug)]
pub enum XmlEvent<'a> {
    Open(&'a [String]),
    Text(&'a [String], &'a str),
    Close(&'a [String]),
}

/// Walks `xml`, reporting opened elements, trimmed non-empty text and closed elements
///
/// Returns a human readable reason when the document is not well formed.
pub fn walk<F>(xml: &str, mut visitor: F) -> Result<(), String>
where
    F: FnMut(XmlEvent<'_>),
{
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut path: Vec<String> = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                path.push(element_name(e.local_name().as_ref())?);
                visitor(XmlEvent::Open(&path));
            }
            Ok(Event::Empty(e)) => {
                path.push(element_name(e.local_name().as_ref())?);
                visitor(XmlEvent::Open(&path));
                visitor(XmlEvent::Close(&path));
                path.pop();
            }
            Ok(Event::End(_)) => {
                visitor(XmlEvent::Close(&path));
                path.pop();
            }
            Ok(Event::Text(e)) => {
                let text = e
                    .unescape()
                    .map_err(|err| at(&reader, &err.to_string()))?;
                let text = text.trim();
                if !text.is_empty() {
                    visitor(XmlEvent::Text(&path, text));
                }
            }
            Ok(Event::CData(e)) => {
                let bytes = e.into_inner();
                let text = std::str::from_utf8(&bytes).map_err(|err| at(&reader, &err.to_string()))?;
                let text = text.trim();
                if !text.is_empty() {
                    visitor(XmlEvent::Text(&path, text));
                }
            }
            Ok(Event::Eof) => break,
            Err(err) => return Err(at(&reader, &err.to_string())),
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = path.last() {
        return Err(format!("unexpected end of document inside <{open}>"));
    }
    Ok(())
}

fn element_name(raw: &[u8]) -> Result<String, String> {
    std::str::from_utf8(raw)
        .map(str::to_string)
        .map_err(|err| format!("invalid element name: {err}"))
}

fn at(reader: &Reader<&[u8]>, reason: &str) -> String {
    format!("{reason} (at byte {})", reader.buffer_position())
}

/// Whether `path` ends with the given element names
pub fn ends_with(path: &[String], suffix: &[&str]) -> bool {
    path.len() >= suffix.len()
        && path[path.len() - suffix.len()..]
            .iter()
            .zip(suffix)
            .all(|(element, expected)| element == expected)
}

/// Whether `path` equals the given element names
pub fn is(path: &[String], expected: &[&str]) -> bool {
    path.len() == expected.len() && ends_with(path, expected)
}
