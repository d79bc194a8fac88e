//! WordprocessingML document model and package writer.

use notes_core::ooxml::{
    content_types, core_properties, relationships, PackageWriter, XmlBuilder,
    CORE_PROPERTIES_CONTENT_TYPE, CORE_PROPERTIES_REL, OFFICE_DOCUMENT_REL,
    RELATIONSHIPS_CONTENT_TYPE,
};
use notes_core::{Result, Rgb};

const STYLES_XML: &str = include_str!("templates/styles.xml");

const MAIN_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const STYLES_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
const DOCUMENT_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
const STYLES_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml";

/// Paragraph style id of the level-0 document heading.
pub const TITLE_STYLE: &str = "Title";

/// A run of text with optional character formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub text: String,
    pub bold: bool,
    pub color: Option<Rgb>,
}

impl Run {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
            color: None,
        }
    }
}

/// A paragraph: an optional paragraph style and its runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordParagraph {
    pub style: Option<&'static str>,
    pub runs: Vec<Run>,
}

impl WordParagraph {
    pub fn new(runs: Vec<Run>) -> Self {
        Self { style: None, runs }
    }

    pub fn styled(style: &'static str, runs: Vec<Run>) -> Self {
        Self {
            style: Some(style),
            runs,
        }
    }

    /// Concatenated run text.
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// A Word document ready to be packaged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordDocument {
    pub title: String,
    pub paragraphs: Vec<WordParagraph>,
}

impl WordDocument {
    /// Create an empty document with the given core-properties title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            paragraphs: Vec::new(),
        }
    }

    /// Append a paragraph.
    pub fn add_paragraph(&mut self, paragraph: WordParagraph) {
        self.paragraphs.push(paragraph);
    }

    /// Serialize the document as a `.docx` package.
    pub fn to_docx(&self) -> Result<Vec<u8>> {
        let mut package = PackageWriter::new();

        package.add_xml(
            "[Content_Types].xml",
            content_types(
                &[("rels", RELATIONSHIPS_CONTENT_TYPE), ("xml", "application/xml")],
                &[
                    ("/word/document.xml".to_string(), DOCUMENT_CONTENT_TYPE),
                    ("/word/styles.xml".to_string(), STYLES_CONTENT_TYPE),
                    ("/docProps/core.xml".to_string(), CORE_PROPERTIES_CONTENT_TYPE),
                ],
            )?,
        )?;
        package.add_xml(
            "_rels/.rels",
            relationships(&[
                ("rId1".to_string(), OFFICE_DOCUMENT_REL, "word/document.xml".to_string()),
                ("rId2".to_string(), CORE_PROPERTIES_REL, "docProps/core.xml".to_string()),
            ])?,
        )?;
        package.add_xml(
            "word/_rels/document.xml.rels",
            relationships(&[("rId1".to_string(), STYLES_REL, "styles.xml".to_string())])?,
        )?;
        package.add_xml("word/document.xml", self.document_xml()?)?;
        package.add_part("word/styles.xml", STYLES_XML.as_bytes())?;
        package.add_xml("docProps/core.xml", core_properties(&self.title)?)?;

        package.finish()
    }

    fn document_xml(&self) -> Result<XmlBuilder> {
        let mut xml = XmlBuilder::new()?;
        xml.open("w:document", &[("xmlns:w", MAIN_NS), ("xmlns:r", REL_NS)])?;
        xml.open("w:body", &[])?;

        for paragraph in &self.paragraphs {
            write_paragraph(&mut xml, paragraph)?;
        }

        // US Letter with the default 1" / 1.25" margins, in twentieths of a point.
        xml.open("w:sectPr", &[])?;
        xml.empty("w:pgSz", &[("w:w", "12240"), ("w:h", "15840")])?;
        xml.empty(
            "w:pgMar",
            &[
                ("w:top", "1440"),
                ("w:right", "1800"),
                ("w:bottom", "1440"),
                ("w:left", "1800"),
                ("w:header", "720"),
                ("w:footer", "720"),
                ("w:gutter", "0"),
            ],
        )?;
        xml.close("w:sectPr")?;

        xml.close("w:body")?;
        xml.close("w:document")?;
        Ok(xml)
    }
}

fn write_paragraph(xml: &mut XmlBuilder, paragraph: &WordParagraph) -> Result<()> {
    xml.open("w:p", &[])?;
    if let Some(style) = paragraph.style {
        xml.open("w:pPr", &[])?;
        xml.empty("w:pStyle", &[("w:val", style)])?;
        xml.close("w:pPr")?;
    }
    for run in &paragraph.runs {
        xml.open("w:r", &[])?;
        if run.bold || run.color.is_some() {
            xml.open("w:rPr", &[])?;
            if run.bold {
                xml.empty("w:b", &[])?;
            }
            if let Some(color) = run.color {
                let hex = color.to_hex();
                xml.empty("w:color", &[("w:val", hex.as_str())])?;
            }
            xml.close("w:rPr")?;
        }
        xml.text_element("w:t", &[("xml:space", "preserve")], &run.text)?;
        xml.close("w:r")?;
    }
    xml.close("w:p")?;
    Ok(())
}
