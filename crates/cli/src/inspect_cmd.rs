use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use notes_pptx::{PptxReader, ReadParagraph, ReadSlide};

/// Print the slides of a `.pptx` file to stdout.
pub fn run_inspect(path: &Path) -> Result<()> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let slides = PptxReader::new()
        .read(BufReader::new(file))
        .with_context(|| format!("Failed to read slides from {}", path.display()))?;

    log::debug!("Found {} slides", slides.len());
    print!("{}", describe(&slides));
    Ok(())
}

/// One line per slide title, then one indented line per body paragraph.
pub fn describe(slides: &[ReadSlide]) -> String {
    let mut out = String::new();
    for slide in slides {
        out.push_str(&format!(
            "Slide {}: {}\n",
            slide.number,
            slide.title.as_deref().unwrap_or("(untitled)")
        ));
        for paragraph in &slide.body {
            out.push_str(&describe_paragraph(paragraph));
            out.push('\n');
        }
    }
    out
}

fn describe_paragraph(paragraph: &ReadParagraph) -> String {
    let indent = "  ".repeat(paragraph.level as usize + 1);
    let mut marks = Vec::new();
    if paragraph.bold {
        marks.push("bold".to_string());
    }
    if let Some(color) = &paragraph.color {
        marks.push(format!("#{}", color));
    }

    if marks.is_empty() {
        format!("{}{}", indent, paragraph.text)
    } else {
        format!("{}{} [{}]", indent, paragraph.text, marks.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notes_core::NotesInput;

    #[test]
    fn test_describe_rendered_deck() {
        let text = "INTRODUCTION\nPlain line\nNOTE: careful\n• Term A";
        let bytes = notes_pptx::render_slides("Algebra", NotesInput::Flat(text)).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Algebra.pptx");
        std::fs::write(&path, bytes).unwrap();

        let file = File::open(&path).unwrap();
        let slides = PptxReader::new().read(BufReader::new(file)).unwrap();
        assert_eq!(
            describe(&slides),
            "Slide 1: INTRODUCTION\n  Plain line\n  NOTE: careful [bold, #FF0000]\n    • Term A\n"
        );
        run_inspect(&path).unwrap();
    }

    #[test]
    fn test_missing_file() {
        let err = run_inspect(Path::new("/nonexistent/deck.pptx")).unwrap_err();
        assert!(err.to_string().contains("Failed to open"));
    }
}
