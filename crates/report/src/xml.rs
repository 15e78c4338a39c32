use quick_xml::events::{BytesDecl, Event};
use quick_xml::{Reader, Writer};

use crate::ReportError;

/// Normalize a JUnit XML document for deterministic output: drop every
/// whitespace-only text node, then re-serialize with an explicit UTF-8
/// declaration and 4-space indentation. Element structure and
/// meaningful text pass through untouched.
pub fn normalize(xml: &str) -> Result<String, ReportError> {
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 4);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    loop {
        match reader.read_event()? {
            Event::Eof => break,
            // The declaration is rewritten above with a fixed encoding.
            Event::Decl(_) => {}
            Event::Text(text) => {
                let whitespace_only = text.iter().all(|b| b.is_ascii_whitespace());
                if !whitespace_only {
                    writer.write_event(Event::Text(text))?;
                }
            }
            event => writer.write_event(event)?,
        }
    }

    Ok(String::from_utf8(writer.into_inner())?)
}
