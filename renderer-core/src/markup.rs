/*
   Module `markup` adapts the pull-based quick-xml reader to a push-style callback interface,
   so that the map parser only ever sees one element at a time and never a document tree.
*/

use crate::error::{Error, Result};

use std::io::BufRead;

use quick_xml::{Reader, events::BytesStart, events::Event};

/// The attributes of a single element, in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    /// Like [`Attributes::get`], but a missing attribute is an error naming `element`.
    pub fn require(&self, element: &'static str, key: &'static str) -> Result<&str> {
        self.get(key).ok_or(Error::MissingAttribute {
            element,
            attribute: key,
        })
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Attributes(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// Receives markup events in document order.
///
/// Self-closing elements are reported as an open immediately followed by a close.
pub trait MarkupHandler {
    fn element_open(&mut self, name: &str, attributes: &Attributes) -> Result<()>;

    fn element_close(&mut self, name: &str) -> Result<()>;

    fn character_data(&mut self, _text: &str) -> Result<()> {
        Ok(())
    }
}

/// Streams `source` through `handler`, failing on the first markup or handler error.
pub fn drive<R: BufRead, H: MarkupHandler>(source: R, handler: &mut H) -> Result<()> {
    let mut reader = Reader::from_reader(source);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut depth = 0_usize;
    let mut seen_root = false;

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|err| malformed(reader.buffer_position() as u64, err.to_string()))?;
        let position = reader.buffer_position() as u64;

        match event {
            Event::Eof => break,
            Event::Start(element) => {
                let name = element_name(&element, position)?;
                let attributes = collect_attributes(&element, position)?;

                depth += 1;
                seen_root = true;
                handler
                    .element_open(&name, &attributes)
                    .map_err(|err| err.at(position))?;
            }
            Event::Empty(element) => {
                let name = element_name(&element, position)?;
                let attributes = collect_attributes(&element, position)?;

                seen_root = true;
                handler
                    .element_open(&name, &attributes)
                    .and_then(|_| handler.element_close(&name))
                    .map_err(|err| err.at(position))?;
            }
            Event::End(element) => {
                let name = std::str::from_utf8(element.name().as_ref())
                    .map_err(|err| malformed(position, err.to_string()))?
                    .to_owned();

                if depth == 0 {
                    return Err(malformed(
                        position,
                        format!("closing </{}> without an open element", name),
                    ));
                }
                depth -= 1;

                handler
                    .element_close(&name)
                    .map_err(|err| err.at(position))?;
            }
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|err| malformed(position, err.to_string()))?;
                handler
                    .character_data(&text)
                    .map_err(|err| err.at(position))?;
            }
            Event::CData(data) => {
                let text = String::from_utf8_lossy(&data);
                handler
                    .character_data(&text)
                    .map_err(|err| err.at(position))?;
            }
            // Declarations, comments, processing instructions and doctypes carry no map data.
            _ => {}
        }

        buf.clear();
    }

    let position = reader.buffer_position() as u64;
    if depth > 0 {
        return Err(malformed(
            position,
            format!("input ended with {} unclosed element(s)", depth),
        ));
    }
    if !seen_root {
        return Err(malformed(position, "no root element found".to_string()));
    }

    Ok(())
}

fn malformed(position: u64, reason: String) -> Error {
    Error::MalformedInput { position, reason }
}

fn element_name(element: &BytesStart<'_>, position: u64) -> Result<String> {
    std::str::from_utf8(element.name().as_ref())
        .map(str::to_owned)
        .map_err(|err| malformed(position, err.to_string()))
}

fn collect_attributes(element: &BytesStart<'_>, position: u64) -> Result<Attributes> {
    let mut attributes = Vec::new();

    for attr in element.attributes() {
        let attr = attr.map_err(|err| malformed(position, err.to_string()))?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|err| malformed(position, err.to_string()))?
            .to_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| malformed(position, err.to_string()))?
            .into_owned();

        attributes.push((key, value));
    }

    Ok(Attributes(attributes))
}

impl Error {
    // Handlers do not know where the reader is; stamp malformed-input errors with it.
    fn at(self, position: u64) -> Error {
        match self {
            Error::MalformedInput { reason, .. } => Error::MalformedInput { position, reason },
            other => other,
        }
    }
}
