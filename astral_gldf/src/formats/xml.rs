//! `quick-xml` event helpers shared by the photometric and product
//! serializers.
//!
//! Documents are written through an indenting [`quick_xml::Writer`]; the
//! [`XmlEventsExt`] methods wrap the event sequences both serializers need.
//! Attribute order is the order given by the caller, so output is
//! reproducible byte for byte.

use std::fmt::Display;
use std::io::{self, Write};

use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

/// Spaces per nesting level.
pub const INDENT_SIZE: usize = 4;

/// Error type for XML writing operations
#[derive(Debug, thiserror::Error)]
pub enum XmlError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("XML write error: {0}")]
    Xml(String),
}

impl From<quick_xml::Error> for XmlError {
    fn from(e: quick_xml::Error) -> Self {
        XmlError::Xml(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, XmlError>;

/// Writer indenting by [`INDENT_SIZE`] spaces per level.
pub fn indented_writer<W: Write>(inner: W) -> Writer<W> {
    Writer::new_with_indent(inner, b' ', INDENT_SIZE)
}

/// Terminates the document with a newline and hands back the sink.
pub fn finish<W: Write>(writer: Writer<W>) -> Result<W> {
    let mut inner = writer.into_inner();
    inner.write_all(b"\n")?;
    inner.flush()?;
    Ok(inner)
}

fn start_tag<'a>(name: &'a str, attrs: &[(&'a str, &'a str)]) -> BytesStart<'a> {
    let mut start = BytesStart::new(name);
    for &attr in attrs {
        start.push_attribute(attr);
    }
    start
}

/// Event sequences used by the serializers.
pub trait XmlEventsExt {
    /// UTF-8 XML declaration.
    fn declaration(&mut self) -> Result<()>;

    /// Multi-line comment, each non-empty line indented by two spaces.
    ///
    /// `--` inside a line is broken up so the comment stays well formed.
    fn comment_block(&mut self, lines: &[String]) -> Result<()>;

    fn open(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()>;

    fn close(&mut self, name: &str) -> Result<()>;

    /// `<name attrs>text</name>` on one line.
    fn text_element(&mut self, name: &str, attrs: &[(&str, &str)], text: &str) -> Result<()>;

    /// Text element without attributes.
    fn leaf(&mut self, name: &str, text: impl Display) -> Result<()>;

    /// Self-closing `<name attrs/>`.
    fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()>;
}

impl<W: Write> XmlEventsExt for Writer<W> {
    fn declaration(&mut self) -> Result<()> {
        self.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        Ok(())
    }

    fn comment_block(&mut self, lines: &[String]) -> Result<()> {
        let mut body = String::new();
        for line in lines {
            body.push('\n');
            if !line.is_empty() {
                body.push_str("  ");
                body.push_str(&line.replace("--", "- -"));
            }
        }
        body.push('\n');
        self.write_event(Event::Comment(BytesText::from_escaped(body)))?;
        Ok(())
    }

    fn open(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        self.write_event(Event::Start(start_tag(name, attrs)))?;
        Ok(())
    }

    fn close(&mut self, name: &str) -> Result<()> {
        self.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    fn text_element(&mut self, name: &str, attrs: &[(&str, &str)], text: &str) -> Result<()> {
        self.write_event(Event::Start(start_tag(name, attrs)))?;
        self.write_event(Event::Text(BytesText::from_escaped(partial_escape(text))))?;
        self.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    fn leaf(&mut self, name: &str, text: impl Display) -> Result<()> {
        self.text_element(name, &[], &text.to_string())
    }

    fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        self.write_event(Event::Empty(start_tag(name, attrs)))?;
        Ok(())
    }
}
