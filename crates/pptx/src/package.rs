//! Serialize a [`Deck`] as a `.pptx` package.
//!
//! Every slide uses the single "Title and Content" layout: a title
//! placeholder and a body placeholder whose paragraphs carry the deck's
//! levels, sizes and colors as direct formatting.

use crate::deck::{Deck, Slide, SlideParagraph};
use notes_core::ooxml::{
    content_types, core_properties, relationships, PackageWriter, XmlBuilder,
    CORE_PROPERTIES_CONTENT_TYPE, CORE_PROPERTIES_REL, OFFICE_DOCUMENT_REL,
    RELATIONSHIPS_CONTENT_TYPE,
};
use notes_core::Result;

const SLIDE_MASTER_XML: &str = include_str!("templates/slideMaster1.xml");
const SLIDE_MASTER_RELS: &str = include_str!("templates/slideMaster1.xml.rels");
const SLIDE_LAYOUT_XML: &str = include_str!("templates/slideLayout1.xml");
const SLIDE_LAYOUT_RELS: &str = include_str!("templates/slideLayout1.xml.rels");
const THEME_XML: &str = include_str!("templates/theme1.xml");

const DRAWING_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const PRESENTATION_NS: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";

const REL_BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const CT_BASE: &str = "application/vnd.openxmlformats-officedocument.presentationml";

/// Slide width and height in EMU (10in x 7.5in).
const SLIDE_SIZE: (&str, &str) = ("9144000", "6858000");
/// Notes page size in EMU.
const NOTES_SIZE: (&str, &str) = ("6858000", "9144000");

/// First id of the slide master list; lower values are reserved.
const FIRST_MASTER_ID: u32 = 2_147_483_648;
/// First id of the slide list; lower values are reserved.
const FIRST_SLIDE_ID: u32 = 256;

impl Deck {
    /// Serialize the deck as a `.pptx` package.
    pub fn to_pptx(&self) -> Result<Vec<u8>> {
        let mut package = PackageWriter::new();

        package.add_xml("[Content_Types].xml", self.content_types()?)?;
        package.add_xml(
            "_rels/.rels",
            relationships(&[
                ("rId1".to_string(), OFFICE_DOCUMENT_REL, "ppt/presentation.xml".to_string()),
                ("rId2".to_string(), CORE_PROPERTIES_REL, "docProps/core.xml".to_string()),
            ])?,
        )?;
        package.add_xml("ppt/presentation.xml", self.presentation_xml()?)?;
        package.add_xml("ppt/_rels/presentation.xml.rels", self.presentation_rels()?)?;

        package.add_part("ppt/slideMasters/slideMaster1.xml", SLIDE_MASTER_XML.as_bytes())?;
        package.add_part("ppt/slideMasters/_rels/slideMaster1.xml.rels", SLIDE_MASTER_RELS.as_bytes())?;
        package.add_part("ppt/slideLayouts/slideLayout1.xml", SLIDE_LAYOUT_XML.as_bytes())?;
        package.add_part("ppt/slideLayouts/_rels/slideLayout1.xml.rels", SLIDE_LAYOUT_RELS.as_bytes())?;
        package.add_part("ppt/theme/theme1.xml", THEME_XML.as_bytes())?;

        let layout_rel = format!("{}/slideLayout", REL_BASE);
        for (index, slide) in self.slides.iter().enumerate() {
            let number = index + 1;
            package.add_xml(&format!("ppt/slides/slide{}.xml", number), slide_xml(slide)?)?;
            package.add_xml(
                &format!("ppt/slides/_rels/slide{}.xml.rels", number),
                relationships(&[(
                    "rId1".to_string(),
                    layout_rel.as_str(),
                    "../slideLayouts/slideLayout1.xml".to_string(),
                )])?,
            )?;
        }

        package.add_xml("docProps/core.xml", core_properties(&self.title)?)?;
        package.finish()
    }

    fn content_types(&self) -> Result<XmlBuilder> {
        let presentation = format!("{}.presentation.main+xml", CT_BASE);
        let master = format!("{}.slideMaster+xml", CT_BASE);
        let layout = format!("{}.slideLayout+xml", CT_BASE);
        let slide = format!("{}.slide+xml", CT_BASE);
        let theme = "application/vnd.openxmlformats-officedocument.theme+xml";

        let mut overrides: Vec<(String, &str)> = vec![
            ("/ppt/presentation.xml".to_string(), presentation.as_str()),
            ("/ppt/slideMasters/slideMaster1.xml".to_string(), master.as_str()),
            ("/ppt/slideLayouts/slideLayout1.xml".to_string(), layout.as_str()),
            ("/ppt/theme/theme1.xml".to_string(), theme),
        ];
        for number in 1..=self.slides.len() {
            overrides.push((format!("/ppt/slides/slide{}.xml", number), slide.as_str()));
        }
        overrides.push(("/docProps/core.xml".to_string(), CORE_PROPERTIES_CONTENT_TYPE));

        content_types(
            &[("rels", RELATIONSHIPS_CONTENT_TYPE), ("xml", "application/xml")],
            &overrides,
        )
    }

    /// Relationship ids: `rId1` is the master, slides follow from `rId2`,
    /// and the theme comes last.
    fn presentation_rels(&self) -> Result<XmlBuilder> {
        let master_rel = format!("{}/slideMaster", REL_BASE);
        let slide_rel = format!("{}/slide", REL_BASE);
        let theme_rel = format!("{}/theme", REL_BASE);

        let mut rels = vec![(
            "rId1".to_string(),
            master_rel.as_str(),
            "slideMasters/slideMaster1.xml".to_string(),
        )];
        for number in 1..=self.slides.len() {
            rels.push((
                slide_rel_id(number),
                slide_rel.as_str(),
                format!("slides/slide{}.xml", number),
            ));
        }
        rels.push((
            format!("rId{}", self.slides.len() + 2),
            theme_rel.as_str(),
            "theme/theme1.xml".to_string(),
        ));

        relationships(&rels)
    }

    fn presentation_xml(&self) -> Result<XmlBuilder> {
        let mut xml = XmlBuilder::new()?;
        xml.open(
            "p:presentation",
            &[
                ("xmlns:a", DRAWING_NS),
                ("xmlns:r", REL_NS),
                ("xmlns:p", PRESENTATION_NS),
                ("saveSubsetFonts", "1"),
            ],
        )?;

        let master_id = FIRST_MASTER_ID.to_string();
        xml.open("p:sldMasterIdLst", &[])?;
        xml.empty("p:sldMasterId", &[("id", master_id.as_str()), ("r:id", "rId1")])?;
        xml.close("p:sldMasterIdLst")?;

        xml.open("p:sldIdLst", &[])?;
        for number in 1..=self.slides.len() {
            let id = (FIRST_SLIDE_ID + number as u32 - 1).to_string();
            let rel_id = slide_rel_id(number);
            xml.empty("p:sldId", &[("id", id.as_str()), ("r:id", rel_id.as_str())])?;
        }
        xml.close("p:sldIdLst")?;

        xml.empty("p:sldSz", &[("cx", SLIDE_SIZE.0), ("cy", SLIDE_SIZE.1), ("type", "screen4x3")])?;
        xml.empty("p:notesSz", &[("cx", NOTES_SIZE.0), ("cy", NOTES_SIZE.1)])?;
        xml.close("p:presentation")?;
        Ok(xml)
    }
}

fn slide_rel_id(number: usize) -> String {
    format!("rId{}", number + 1)
}

fn slide_xml(slide: &Slide) -> Result<XmlBuilder> {
    let mut xml = XmlBuilder::new()?;
    xml.open(
        "p:sld",
        &[("xmlns:a", DRAWING_NS), ("xmlns:r", REL_NS), ("xmlns:p", PRESENTATION_NS)],
    )?;
    xml.open("p:cSld", &[])?;
    xml.open("p:spTree", &[])?;

    xml.open("p:nvGrpSpPr", &[])?;
    xml.empty("p:cNvPr", &[("id", "1"), ("name", "")])?;
    xml.empty("p:cNvGrpSpPr", &[])?;
    xml.empty("p:nvPr", &[])?;
    xml.close("p:nvGrpSpPr")?;
    xml.open("p:grpSpPr", &[])?;
    xml.open("a:xfrm", &[])?;
    xml.empty("a:off", &[("x", "0"), ("y", "0")])?;
    xml.empty("a:ext", &[("cx", "0"), ("cy", "0")])?;
    xml.empty("a:chOff", &[("x", "0"), ("y", "0")])?;
    xml.empty("a:chExt", &[("cx", "0"), ("cy", "0")])?;
    xml.close("a:xfrm")?;
    xml.close("p:grpSpPr")?;

    open_placeholder(&mut xml, "2", "Title 1", &[("type", "title")])?;
    xml.open("a:p", &[])?;
    write_run(&mut xml, &slide.title, None)?;
    xml.close("a:p")?;
    close_placeholder(&mut xml)?;

    open_placeholder(&mut xml, "3", "Content Placeholder 2", &[("idx", "1")])?;
    if slide.body.is_empty() {
        xml.empty("a:p", &[])?;
    }
    for paragraph in &slide.body {
        write_paragraph(&mut xml, paragraph)?;
    }
    close_placeholder(&mut xml)?;

    xml.close("p:spTree")?;
    xml.close("p:cSld")?;
    xml.open("p:clrMapOvr", &[])?;
    xml.empty("a:masterClrMapping", &[])?;
    xml.close("p:clrMapOvr")?;
    xml.close("p:sld")?;
    Ok(xml)
}

/// Open a placeholder shape up to and including its `a:lstStyle`.
fn open_placeholder(xml: &mut XmlBuilder, id: &str, name: &str, ph: &[(&str, &str)]) -> Result<()> {
    xml.open("p:sp", &[])?;
    xml.open("p:nvSpPr", &[])?;
    xml.empty("p:cNvPr", &[("id", id), ("name", name)])?;
    xml.open("p:cNvSpPr", &[])?;
    xml.empty("a:spLocks", &[("noGrp", "1")])?;
    xml.close("p:cNvSpPr")?;
    xml.open("p:nvPr", &[])?;
    xml.empty("p:ph", ph)?;
    xml.close("p:nvPr")?;
    xml.close("p:nvSpPr")?;
    xml.empty("p:spPr", &[])?;
    xml.open("p:txBody", &[])?;
    xml.empty("a:bodyPr", &[])?;
    xml.empty("a:lstStyle", &[])?;
    Ok(())
}

fn close_placeholder(xml: &mut XmlBuilder) -> Result<()> {
    xml.close("p:txBody")?;
    xml.close("p:sp")?;
    Ok(())
}

fn write_paragraph(xml: &mut XmlBuilder, paragraph: &SlideParagraph) -> Result<()> {
    xml.open("a:p", &[])?;
    if paragraph.level > 0 {
        let level = paragraph.level.to_string();
        xml.empty("a:pPr", &[("lvl", level.as_str())])?;
    }
    write_run(xml, &paragraph.text, Some(paragraph))?;
    xml.close("a:p")?;
    Ok(())
}

/// Write one run; `format` carries the direct character formatting, if any.
fn write_run(xml: &mut XmlBuilder, text: &str, format: Option<&SlideParagraph>) -> Result<()> {
    xml.open("a:r", &[])?;
    match format {
        Some(p) => {
            // Font size is in hundredths of a point.
            let size = (p.size_pt * 100).to_string();
            let mut attrs = vec![("lang", "en-US"), ("sz", size.as_str())];
            if p.bold {
                attrs.push(("b", "1"));
            }
            attrs.push(("dirty", "0"));

            match p.color {
                Some(color) => {
                    let hex = color.to_hex();
                    xml.open("a:rPr", &attrs)?;
                    xml.open("a:solidFill", &[])?;
                    xml.empty("a:srgbClr", &[("val", hex.as_str())])?;
                    xml.close("a:solidFill")?;
                    xml.close("a:rPr")?;
                }
                None => {
                    xml.empty("a:rPr", &attrs)?;
                }
            }
        }
        None => {
            xml.empty("a:rPr", &[("lang", "en-US"), ("dirty", "0")])?;
        }
    }
    xml.text_element("a:t", &[], text)?;
    xml.close("a:r")?;
    Ok(())
}
