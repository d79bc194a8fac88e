//! Read slide titles and body paragraphs back out of a `.pptx` file.

use notes_core::ooxml::PackageReader;
use notes_core::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::io::{Read, Seek};

/// A body paragraph with the formatting the exporter sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadParagraph {
    pub text: String,
    pub level: u8,
    pub bold: bool,
    /// Hex RGB of the first colored run, e.g. `"FF0000"`.
    pub color: Option<String>,
    /// Font size of the first sized run, in points.
    pub size_pt: Option<u32>,
}

/// One slide as read from the package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadSlide {
    pub number: usize,
    pub title: Option<String>,
    pub body: Vec<ReadParagraph>,
}

/// Reader for PPTX (Office Open XML) presentations.
#[derive(Debug, Clone, Default)]
pub struct PptxReader;

impl PptxReader {
    pub fn new() -> Self {
        Self
    }

    /// Read every slide in presentation order.
    pub fn read<R: Read + Seek>(&self, reader: R) -> Result<Vec<ReadSlide>> {
        let mut package = PackageReader::new(reader)?;
        let order = self.slide_order(&mut package)?;
        log::debug!("Reading {} slides", order.len());

        order
            .iter()
            .enumerate()
            .map(|(idx, path)| {
                let xml = package.read_part(path)?;
                parse_slide(&xml, idx + 1)
            })
            .collect()
    }

    /// Slide part paths in the order of the presentation's slide id list.
    fn slide_order<R: Read + Seek>(&self, package: &mut PackageReader<R>) -> Result<Vec<String>> {
        let presentation = package.read_part("ppt/presentation.xml")?;
        let rels = package.read_part("ppt/_rels/presentation.xml.rels")?;
        let targets = slide_targets(&rels)?;

        slide_rel_ids(&presentation)?
            .into_iter()
            .map(|rel_id| {
                targets
                    .get(&rel_id)
                    .cloned()
                    .ok_or_else(|| Error::XmlError(format!("Slide relationship '{}' has no slide target", rel_id)))
            })
            .collect()
    }
}

/// `r:id` of every `p:sldId`, in list order.
fn slide_rel_ids(presentation: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(presentation);
    let mut ids = Vec::new();
    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) if e.local_name().as_ref() == b"sldId" => {
                ids.extend(attr(e, b"r:id"));
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::XmlError(format!("Error parsing presentation: {}", e))),
            _ => {}
        }
    }
    Ok(ids)
}

/// Relationship id to package path, for slide relationships only.
fn slide_targets(rels: &str) -> Result<HashMap<String, String>> {
    let mut reader = Reader::from_str(rels);
    let mut targets = HashMap::new();
    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) if e.local_name().as_ref() == b"Relationship" => {
                let is_slide = attr(e, b"Type").is_some_and(|t| t.ends_with("/slide"));
                if let (true, Some(id), Some(target)) = (is_slide, attr(e, b"Id"), attr(e, b"Target")) {
                    let path = match target.strip_prefix('/') {
                        Some(absolute) => absolute.to_string(),
                        None => format!("ppt/{}", target),
                    };
                    targets.insert(id, path);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::XmlError(format!("Error parsing relationships: {}", e))),
            _ => {}
        }
    }
    Ok(targets)
}

#[derive(Debug, Default)]
struct ShapeText {
    is_title: bool,
    paragraphs: Vec<ReadParagraph>,
}

/// Collect the title placeholder text and body paragraphs of one slide.
fn parse_slide(xml: &str, number: usize) -> Result<ReadSlide> {
    let mut slide = ReadSlide {
        number,
        title: None,
        body: Vec::new(),
    };

    let mut reader = Reader::from_str(xml);
    reader.trim_text(false);

    let mut shape: Option<ShapeText> = None;
    let mut paragraph: Option<ReadParagraph> = None;
    let mut in_text = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| Error::XmlError(format!("Error parsing slide {}: {}", number, e)))?;

        match event {
            Event::Start(ref e) => match e.local_name().as_ref() {
                b"sp" => shape = Some(ShapeText::default()),
                b"p" if shape.is_some() => paragraph = Some(ReadParagraph::default()),
                b"t" => in_text = true,
                _ => apply_properties(e, shape.as_mut(), paragraph.as_mut()),
            },
            Event::Empty(ref e) => apply_properties(e, shape.as_mut(), paragraph.as_mut()),
            Event::Text(ref e) if in_text => {
                if let Some(p) = paragraph.as_mut() {
                    let text = e
                        .unescape()
                        .map_err(|e| Error::XmlError(format!("Bad text in slide {}: {}", number, e)))?;
                    p.text.push_str(&text);
                }
            }
            Event::End(ref e) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => {
                    if let (Some(s), Some(p)) = (shape.as_mut(), paragraph.take()) {
                        s.paragraphs.push(p);
                    }
                }
                b"sp" => {
                    if let Some(s) = shape.take() {
                        if s.is_title {
                            let title: Vec<String> = s.paragraphs.into_iter().map(|p| p.text).collect();
                            slide.title = Some(title.join("\n"));
                        } else {
                            slide
                                .body
                                .extend(s.paragraphs.into_iter().filter(|p| !p.text.trim().is_empty()));
                        }
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(slide)
}

/// Pick up placeholder type, paragraph level and run formatting.
fn apply_properties(e: &BytesStart<'_>, shape: Option<&mut ShapeText>, paragraph: Option<&mut ReadParagraph>) {
    match e.local_name().as_ref() {
        b"ph" => {
            if let (Some(s), Some(kind)) = (shape, attr(e, b"type")) {
                s.is_title = kind == "title" || kind == "ctrTitle";
            }
        }
        b"pPr" => {
            if let (Some(p), Some(level)) = (paragraph, attr(e, b"lvl")) {
                p.level = level.parse().unwrap_or(0);
            }
        }
        b"rPr" => {
            if let Some(p) = paragraph {
                p.bold |= attr(e, b"b").as_deref() == Some("1");
                if p.size_pt.is_none() {
                    p.size_pt = attr(e, b"sz").and_then(|sz| sz.parse::<u32>().ok()).map(|sz| sz / 100);
                }
            }
        }
        b"srgbClr" => {
            if let Some(p) = paragraph {
                if p.color.is_none() {
                    p.color = attr(e, b"val");
                }
            }
        }
        _ => {}
    }
}

fn attr(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .map(|a| String::from_utf8_lossy(&a.value).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slide_order_follows_id_list() {
        let presentation = r#"<p:presentation xmlns:p="p" xmlns:r="r"><p:sldIdLst>
            <p:sldId id="256" r:id="rId7"/><p:sldId id="257" r:id="rId3"/>
            </p:sldIdLst></p:presentation>"#;
        let rels = r#"<Relationships>
            <Relationship Id="rId3" Type="http://x/relationships/slide" Target="slides/slide1.xml"/>
            <Relationship Id="rId7" Type="http://x/relationships/slide" Target="/ppt/slides/slide9.xml"/>
            <Relationship Id="rId1" Type="http://x/relationships/slideMaster" Target="slideMasters/slideMaster1.xml"/>
            </Relationships>"#;

        assert_eq!(slide_rel_ids(presentation).unwrap(), vec!["rId7", "rId3"]);
        let targets = slide_targets(rels).unwrap();
        assert_eq!(targets.len(), 2);
        assert_eq!(targets["rId3"], "ppt/slides/slide1.xml");
        assert_eq!(targets["rId7"], "ppt/slides/slide9.xml");
    }

    #[test]
    fn test_parse_slide_placeholders() {
        let xml = r#"<p:sld xmlns:a="a" xmlns:p="p"><p:cSld><p:spTree>
            <p:sp><p:nvSpPr><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr>
              <p:txBody><a:p><a:r><a:t>Algebra</a:t></a:r></a:p></p:txBody></p:sp>
            <p:sp><p:nvSpPr><p:nvPr><p:ph idx="1"/></p:nvPr></p:nvSpPr>
              <p:txBody>
                <a:p><a:pPr lvl="2"/><a:r><a:rPr sz="1200" b="1"><a:solidFill><a:srgbClr val="FF0000"/></a:solidFill></a:rPr><a:t>NOTE: x &amp; y</a:t></a:r></a:p>
                <a:p/>
              </p:txBody></p:sp>
            </p:spTree></p:cSld></p:sld>"#;

        let slide = parse_slide(xml, 1).unwrap();
        assert_eq!(slide.title.as_deref(), Some("Algebra"));
        assert_eq!(
            slide.body,
            vec![ReadParagraph {
                text: "NOTE: x & y".to_string(),
                level: 2,
                bold: true,
                color: Some("FF0000".to_string()),
                size_pt: Some(12),
            }]
        );
    }
}
