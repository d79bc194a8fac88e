//! Office Open XML package plumbing shared by the Word and Slides exports.
//!
//! An OOXML document is a ZIP archive of XML parts. [`PackageWriter`] builds
//! one in memory, [`XmlBuilder`] produces escaped XML for a single part, and
//! [`PackageReader`] reads parts back (used to inspect generated files).

use crate::{Error, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::{Cursor, Read, Seek, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Content type of the package relationships part.
pub const RELATIONSHIPS_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-package.relationships+xml";

/// Content type of the core properties part.
pub const CORE_PROPERTIES_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-package.core-properties+xml";

/// Relationship type pointing at the main document part.
pub const OFFICE_DOCUMENT_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";

/// Relationship type pointing at the core properties part.
pub const CORE_PROPERTIES_REL: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";

/// In-memory writer for a ZIP-based OOXML package.
pub struct PackageWriter {
    zip: ZipWriter<Cursor<Vec<u8>>>,
    options: FileOptions,
}

impl PackageWriter {
    /// Create an empty package.
    pub fn new() -> Self {
        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
            options: FileOptions::default().compression_method(CompressionMethod::Deflated),
        }
    }

    /// Add a part with the given archive path and raw content.
    pub fn add_part(&mut self, path: &str, content: &[u8]) -> Result<()> {
        self.zip
            .start_file(path, self.options)
            .map_err(|e| Error::ZipError(format!("Failed to start part '{}': {}", path, e)))?;
        self.zip.write_all(content)?;
        Ok(())
    }

    /// Add an XML part built with [`XmlBuilder`].
    pub fn add_xml(&mut self, path: &str, xml: XmlBuilder) -> Result<()> {
        self.add_part(path, &xml.into_bytes())
    }

    /// Finish the archive and return its bytes.
    pub fn finish(mut self) -> Result<Vec<u8>> {
        let cursor = self
            .zip
            .finish()
            .map_err(|e| Error::ZipError(format!("Failed to finish archive: {}", e)))?;
        Ok(cursor.into_inner())
    }
}

impl Default for PackageWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Streaming XML writer for one package part.
///
/// Attribute values and text are escaped by quick-xml.
pub struct XmlBuilder {
    writer: Writer<Cursor<Vec<u8>>>,
}

impl XmlBuilder {
    /// Start a part with the standard standalone UTF-8 declaration.
    pub fn new() -> Result<Self> {
        let mut builder = Self {
            writer: Writer::new(Cursor::new(Vec::new())),
        };
        builder.write(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        Ok(builder)
    }

    /// Open an element.
    pub fn open(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<&mut Self> {
        self.write(Event::Start(start_tag(name, attrs)))?;
        Ok(self)
    }

    /// Close an element.
    pub fn close(&mut self, name: &str) -> Result<&mut Self> {
        self.write(Event::End(BytesEnd::new(name)))?;
        Ok(self)
    }

    /// Write a self-closing element.
    pub fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<&mut Self> {
        self.write(Event::Empty(start_tag(name, attrs)))?;
        Ok(self)
    }

    /// Write escaped character data.
    pub fn text(&mut self, text: &str) -> Result<&mut Self> {
        self.write(Event::Text(BytesText::new(text)))?;
        Ok(self)
    }

    /// Write `<name attrs>text</name>`.
    pub fn text_element(&mut self, name: &str, attrs: &[(&str, &str)], text: &str) -> Result<&mut Self> {
        self.open(name, attrs)?;
        self.text(text)?;
        self.close(name)
    }

    /// Consume the builder and return the serialized part.
    pub fn into_bytes(self) -> Vec<u8> {
        self.writer.into_inner().into_inner()
    }

    fn write(&mut self, event: Event<'_>) -> Result<()> {
        self.writer
            .write_event(event)
            .map_err(|e| Error::XmlError(format!("Failed to write XML: {}", e)))
    }
}

fn start_tag<'a>(name: &'a str, attrs: &[(&'a str, &'a str)]) -> BytesStart<'a> {
    let mut tag = BytesStart::new(name);
    for &(key, value) in attrs {
        tag.push_attribute((key, value));
    }
    tag
}

/// Write a `[Content_Types].xml` part from default extensions and overrides.
pub fn content_types(defaults: &[(&str, &str)], overrides: &[(String, &str)]) -> Result<XmlBuilder> {
    let mut xml = XmlBuilder::new()?;
    xml.open(
        "Types",
        &[("xmlns", "http://schemas.openxmlformats.org/package/2006/content-types")],
    )?;
    for (extension, content_type) in defaults {
        xml.empty("Default", &[("Extension", *extension), ("ContentType", *content_type)])?;
    }
    for (part_name, content_type) in overrides {
        xml.empty("Override", &[("PartName", part_name.as_str()), ("ContentType", *content_type)])?;
    }
    xml.close("Types")?;
    Ok(xml)
}

/// Write a relationships part from `(id, type, target)` triples.
pub fn relationships(rels: &[(String, &str, String)]) -> Result<XmlBuilder> {
    let mut xml = XmlBuilder::new()?;
    xml.open(
        "Relationships",
        &[("xmlns", "http://schemas.openxmlformats.org/package/2006/relationships")],
    )?;
    for (id, rel_type, target) in rels {
        xml.empty(
            "Relationship",
            &[("Id", id.as_str()), ("Type", *rel_type), ("Target", target.as_str())],
        )?;
    }
    xml.close("Relationships")?;
    Ok(xml)
}

/// Write a minimal `docProps/core.xml` carrying the document title.
pub fn core_properties(title: &str) -> Result<XmlBuilder> {
    let mut xml = XmlBuilder::new()?;
    xml.open(
        "cp:coreProperties",
        &[
            ("xmlns:cp", "http://schemas.openxmlformats.org/package/2006/metadata/core-properties"),
            ("xmlns:dc", "http://purl.org/dc/elements/1.1/"),
            ("xmlns:dcterms", "http://purl.org/dc/terms/"),
            ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
        ],
    )?;
    xml.text_element("dc:title", &[], title)?;
    xml.text_element("dc:creator", &[], "studynotes")?;
    xml.close("cp:coreProperties")?;
    Ok(xml)
}

/// Reader over the parts of an OOXML package.
pub struct PackageReader<R: Read + Seek> {
    archive: ZipArchive<R>,
}

impl<R: Read + Seek> PackageReader<R> {
    /// Open a package from a reader.
    pub fn new(reader: R) -> Result<Self> {
        let archive = ZipArchive::new(reader)
            .map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;
        Ok(Self { archive })
    }

    /// Whether the package contains a part at `path`.
    pub fn has_part(&self, path: &str) -> bool {
        self.archive.file_names().any(|name| name == path)
    }

    /// Raw bytes of the part at `path`.
    pub fn read_bytes(&mut self, path: &str) -> Result<Vec<u8>> {
        let mut part = self
            .archive
            .by_name(path)
            .map_err(|e| Error::ZipError(format!("Missing part '{}': {}", path, e)))?;
        let mut bytes = Vec::with_capacity(part.size() as usize);
        part.read_to_end(&mut bytes)?;
        Ok(bytes)
    }

    /// The part at `path`, which must be UTF-8 XML.
    pub fn read_part(&mut self, path: &str) -> Result<String> {
        String::from_utf8(self.read_bytes(path)?)
            .map_err(|e| Error::XmlError(format!("Part '{}' is not UTF-8: {}", path, e)))
    }
}
