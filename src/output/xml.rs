// src/output/xml.rs

//! XML envelope:
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <ctx_results session_id="ctx_...">
//!   <plugin name="git" version="0.3">
//!     <data>{"branch":"main"}</data>
//!   </plugin>
//! </ctx_results>
//! ```
//!
//! `data` stays JSON text so no type information is lost in XML.

use std::fmt::Write as _;

use crate::result::AggregateResult;

pub const XML_HEADER: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";
pub const ROOT_ELEMENT: &str = "ctx_results";

pub fn render(
    aggregate: &AggregateResult,
    session_id: &str,
    indent: Option<usize>,
) -> Result<String, String> {
    let mut w = XmlWriter::new(indent);
    w.out.push_str(XML_HEADER);

    w.open(0, ROOT_ELEMENT, &[("session_id", session_id)]);
    for (name, entry) in aggregate.iter() {
        let data = serde_json::to_string(&entry.data).map_err(|e| e.to_string())?;
        w.open(1, "plugin", &[("name", name), ("version", &entry.version)]);
        w.text_element(2, "data", &data);
        w.close(1, "plugin");
    }
    w.close(0, ROOT_ELEMENT);

    Ok(w.out)
}

struct XmlWriter {
    out: String,
    indent: Option<usize>,
    /// Whether the last thing written was an opening tag with no children yet.
    just_opened: bool,
}

impl XmlWriter {
    fn new(indent: Option<usize>) -> Self {
        Self {
            out: String::new(),
            indent,
            just_opened: false,
        }
    }

    fn newline_and_pad(&mut self, depth: usize) {
        if let Some(width) = self.indent {
            if !self.out.ends_with('\n') {
                self.out.push('\n');
            }
            self.out.extend(std::iter::repeat_n(' ', width * depth));
        }
    }

    fn open(&mut self, depth: usize, tag: &str, attrs: &[(&str, &str)]) {
        self.newline_and_pad(depth);
        self.out.push('<');
        self.out.push_str(tag);
        for (key, value) in attrs {
            let _ = write!(self.out, " {key}=\"{}\"", escape_attr(value));
        }
        self.out.push('>');
        self.just_opened = true;
    }

    fn close(&mut self, depth: usize, tag: &str) {
        // An element without children closes on the same line.
        if !self.just_opened {
            self.newline_and_pad(depth);
        }
        let _ = write!(self.out, "</{tag}>");
        self.just_opened = false;
    }

    fn text_element(&mut self, depth: usize, tag: &str, text: &str) {
        self.newline_and_pad(depth);
        let _ = write!(self.out, "<{tag}>{}</{tag}>", escape_text(text));
        self.just_opened = false;
    }
}

/// Escape character data.
pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\r' => out.push_str("&#xD;"),
            c if is_xml_char(c) => out.push(c),
            _ => out.push('\u{FFFD}'),
        }
    }
    out
}

/// Escape an attribute value (double-quoted).
pub fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\n' => out.push_str("&#xA;"),
            '\r' => out.push_str("&#xD;"),
            '\t' => out.push_str("&#x9;"),
            c if is_xml_char(c) => out.push(c),
            _ => out.push('\u{FFFD}'),
        }
    }
    out
}

/// Characters allowed by the XML 1.0 `Char` production.
fn is_xml_char(c: char) -> bool {
    matches!(c,
        '\u{9}' | '\u{A}' | '\u{D}'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}
