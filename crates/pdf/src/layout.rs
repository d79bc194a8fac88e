//! Flow layout for PDF pages.
//!
//! Paragraphs are word-wrapped against the text width using the embedded
//! fonts' advance widths, then stacked top to bottom; a line that would cross
//! the bottom margin moves to a new page. All lengths are in points.

use notes_core::Rgb;

use crate::fonts::FontMetrics;

/// A4 width in points.
pub const A4_WIDTH: f32 = 595.28;
/// A4 height in points.
pub const A4_HEIGHT: f32 = 841.89;
/// One inch, the default margin on every side.
pub const DEFAULT_MARGIN: f32 = 72.0;

/// Font face for a run of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    Regular,
    Bold,
    BoldOblique,
}

/// Horizontal alignment of a paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

/// Typography for one paragraph kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParagraphStyle {
    pub font_size: f32,
    pub leading: f32,
    pub space_before: f32,
    pub space_after: f32,
    pub face: Face,
    pub align: Align,
}

impl ParagraphStyle {
    pub const TITLE: Self = Self {
        font_size: 18.0,
        leading: 22.0,
        space_before: 0.0,
        space_after: 6.0,
        face: Face::Bold,
        align: Align::Center,
    };
    pub const HEADING1: Self = Self {
        font_size: 18.0,
        leading: 22.0,
        space_before: 0.0,
        space_after: 6.0,
        face: Face::Bold,
        align: Align::Left,
    };
    pub const HEADING2: Self = Self {
        font_size: 14.0,
        leading: 18.0,
        space_before: 12.0,
        space_after: 6.0,
        face: Face::Bold,
        align: Align::Left,
    };
    pub const HEADING3: Self = Self {
        font_size: 12.0,
        leading: 14.4,
        space_before: 12.0,
        space_after: 6.0,
        face: Face::BoldOblique,
        align: Align::Left,
    };
    pub const NORMAL: Self = Self {
        font_size: 10.0,
        leading: 12.0,
        space_before: 0.0,
        space_after: 0.0,
        face: Face::Regular,
        align: Align::Left,
    };
}

/// A run of text sharing one face and color.
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub text: String,
    pub face: Face,
    pub color: Option<Rgb>,
}

impl Span {
    pub fn new(text: impl Into<String>, face: Face) -> Self {
        Self {
            text: text.into(),
            face,
            color: None,
        }
    }

    pub fn colored(mut self, color: Option<Rgb>) -> Self {
        self.color = color;
        self
    }
}

/// A styled paragraph made of spans.
#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    pub spans: Vec<Span>,
    pub style: ParagraphStyle,
    pub left_indent: f32,
}

impl Paragraph {
    /// A paragraph of one span in the style's own face.
    pub fn plain(text: impl Into<String>, style: ParagraphStyle) -> Self {
        Self {
            spans: vec![Span::new(text, style.face)],
            style,
            left_indent: 0.0,
        }
    }

    pub fn with_spans(spans: Vec<Span>, style: ParagraphStyle) -> Self {
        Self {
            spans,
            style,
            left_indent: 0.0,
        }
    }

    pub fn indented(mut self, indent: f32) -> Self {
        self.left_indent = indent.max(0.0);
        self
    }
}

/// An element of the document story.
#[derive(Debug, Clone, PartialEq)]
pub enum Flowable {
    Paragraph(Paragraph),
    Spacer(f32),
}

/// Page geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
}

impl PageGeometry {
    pub fn text_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }

    fn top(&self) -> f32 {
        self.height - self.margin
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            width: A4_WIDTH,
            height: A4_HEIGHT,
            margin: DEFAULT_MARGIN,
        }
    }
}

/// A piece of text at its final position; `y` is the baseline measured from
/// the bottom of the page.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedText {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub font_size: f32,
    pub face: Face,
    pub color: Option<Rgb>,
}

/// Laid-out pages, each a list of placed text.
pub type Pages = Vec<Vec<PlacedText>>;

struct Word {
    text: String,
    face: Face,
    color: Option<Rgb>,
    width: f32,
    /// Whether whitespace separated this word from the previous one.
    spaced: bool,
}

/// Split a paragraph's spans into measured words, preserving span styles.
fn words(paragraph: &Paragraph, metrics: &FontMetrics) -> Vec<Word> {
    let size = paragraph.style.font_size;
    let mut out = Vec::new();
    let mut pending_space = false;

    for span in &paragraph.spans {
        let starts_with_space = span.text.starts_with(char::is_whitespace);
        let mut first = true;
        for piece in span.text.split_whitespace() {
            let spaced = if first {
                pending_space || starts_with_space
            } else {
                true
            };
            out.push(Word {
                text: piece.to_string(),
                face: span.face,
                color: span.color,
                width: metrics.text_width(piece, size, span.face),
                spaced: spaced && !out.is_empty(),
            });
            first = false;
        }
        pending_space = span.text.ends_with(char::is_whitespace) || (first && starts_with_space);
    }
    out
}

/// Cut a word wider than the line into pieces that fit.
fn split_long(word: Word, font_size: f32, max_width: f32, metrics: &FontMetrics) -> Vec<Word> {
    let mut pieces = Vec::new();
    let mut text = String::new();
    let mut width = 0.0;
    let mut spaced = word.spaced;

    for c in word.text.chars() {
        let w = metrics.char_width(c, font_size, word.face);
        if !text.is_empty() && width + w > max_width {
            pieces.push(Word {
                text: std::mem::take(&mut text),
                face: word.face,
                color: word.color,
                width,
                spaced,
            });
            width = 0.0;
            spaced = false;
        }
        text.push(c);
        width += w;
    }
    pieces.push(Word {
        text,
        face: word.face,
        color: word.color,
        width,
        spaced,
    });
    pieces
}

/// Break words into lines no wider than `max_width`.
fn wrap(words: Vec<Word>, font_size: f32, max_width: f32, metrics: &FontMetrics) -> Vec<Vec<Word>> {
    let mut lines: Vec<Vec<Word>> = Vec::new();
    let mut current: Vec<Word> = Vec::new();
    let mut width = 0.0;

    let words = words.into_iter().flat_map(|word| {
        if word.width > max_width {
            split_long(word, font_size, max_width, metrics)
        } else {
            vec![word]
        }
    });

    for word in words {
        let gap = if word.spaced && !current.is_empty() {
            metrics.text_width(" ", font_size, word.face)
        } else {
            0.0
        };
        if !current.is_empty() && width + gap + word.width > max_width {
            lines.push(std::mem::take(&mut current));
            width = 0.0;
        }
        width += if current.is_empty() { 0.0 } else { gap } + word.width;
        current.push(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Merge a line's words into runs of equal style, positioned from `x0`.
fn place_line(
    line: Vec<Word>,
    x0: f32,
    y: f32,
    font_size: f32,
    metrics: &FontMetrics,
) -> (Vec<PlacedText>, f32) {
    let mut placed: Vec<PlacedText> = Vec::new();
    let mut x = x0;

    for (i, word) in line.into_iter().enumerate() {
        let gap = if i > 0 && word.spaced {
            metrics.text_width(" ", font_size, word.face)
        } else {
            0.0
        };
        match placed.last_mut() {
            Some(last) if last.face == word.face && last.color == word.color => {
                if gap > 0.0 {
                    last.text.push(' ');
                }
                last.text.push_str(&word.text);
            }
            _ => placed.push(PlacedText {
                text: word.text,
                x: x + gap,
                y,
                font_size,
                face: word.face,
                color: word.color,
            }),
        }
        x += gap + word.width;
    }
    (placed, x - x0)
}

/// Lay out a story onto pages. Always returns at least one page.
pub fn layout(story: &[Flowable], geometry: &PageGeometry, metrics: &FontMetrics) -> Pages {
    let mut pages: Pages = vec![Vec::new()];
    let top = geometry.top();
    let bottom = geometry.margin;
    let mut cursor = top;

    for flowable in story {
        match flowable {
            Flowable::Spacer(height) => {
                cursor -= height;
                if cursor < bottom {
                    pages.push(Vec::new());
                    cursor = top;
                }
            }
            Flowable::Paragraph(paragraph) => {
                let style = paragraph.style;
                if cursor < top {
                    cursor -= style.space_before;
                }
                let x0 = geometry.margin + paragraph.left_indent;
                let max_width = (geometry.text_width() - paragraph.left_indent).max(style.font_size);

                for line in wrap(words(paragraph, metrics), style.font_size, max_width, metrics) {
                    if cursor - style.leading < bottom && cursor < top {
                        pages.push(Vec::new());
                        cursor = top;
                    }
                    let baseline = cursor - style.font_size;
                    let (mut placed, line_width) =
                        place_line(line, x0, baseline, style.font_size, metrics);
                    if style.align == Align::Center {
                        let shift = ((max_width - line_width) / 2.0).max(0.0);
                        for piece in &mut placed {
                            piece.x += shift;
                        }
                    }
                    if let Some(page) = pages.last_mut() {
                        page.extend(placed);
                    }
                    cursor -= style.leading;
                }
                cursor -= style.space_after;
            }
        }
    }
    pages
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(page: &[PlacedText]) -> Vec<&str> {
        page.iter().map(|p| p.text.as_str()).collect()
    }

    fn lay_out(story: &[Flowable]) -> Pages {
        layout(story, &PageGeometry::default(), &FontMetrics::bundled().unwrap())
    }

    /// Every placed run must end inside the right margin.
    fn assert_within_margin(pages: &Pages) {
        let metrics = FontMetrics::bundled().unwrap();
        let geometry = PageGeometry::default();
        for piece in pages.iter().flatten() {
            let right = piece.x + metrics.text_width(&piece.text, piece.font_size, piece.face);
            assert!(
                right <= geometry.width - geometry.margin + 0.01,
                "'{}' ends at {}",
                piece.text,
                right
            );
        }
    }

    #[test]
    fn test_single_line_paragraph() {
        let story = vec![Flowable::Paragraph(Paragraph::plain("Hello world", ParagraphStyle::NORMAL))];
        let pages = lay_out(&story);
        assert_eq!(pages.len(), 1);
        assert_eq!(texts(&pages[0]), vec!["Hello world"]);
        assert_eq!(pages[0][0].x, DEFAULT_MARGIN);
        assert_eq!(pages[0][0].y, A4_HEIGHT - DEFAULT_MARGIN - 10.0);
    }

    #[test]
    fn test_mixed_spans_stay_separate() {
        let metrics = FontMetrics::bundled().unwrap();
        let spans = vec![
            Span::new("NOTE:", Face::Bold).colored(Some(Rgb::RED)),
            Span::new(" remember signs", Face::Regular),
        ];
        let story = vec![Flowable::Paragraph(Paragraph::with_spans(spans, ParagraphStyle::NORMAL))];
        let page = &lay_out(&story)[0];

        assert_eq!(texts(page), vec!["NOTE:", "remember signs"]);
        assert_eq!(page[0].color, Some(Rgb::RED));
        assert_eq!(page[0].face, Face::Bold);
        assert_eq!(page[1].color, None);
        assert!(page[1].x > page[0].x + metrics.text_width("NOTE:", 10.0, Face::Bold));
    }

    #[test]
    fn test_indent_shifts_x() {
        let story = vec![Flowable::Paragraph(
            Paragraph::plain("• item", ParagraphStyle::NORMAL).indented(24.0),
        )];
        let page = &lay_out(&story)[0];
        assert_eq!(page[0].x, DEFAULT_MARGIN + 24.0);
    }

    #[test]
    fn test_long_paragraph_wraps() {
        let text = "word ".repeat(200);
        let story = vec![Flowable::Paragraph(Paragraph::plain(text, ParagraphStyle::NORMAL))];
        let pages = lay_out(&story);

        assert!(pages[0].len() > 1);
        assert_within_margin(&pages);
        let total_words: usize = pages[0].iter().map(|p| p.text.split(' ').count()).sum();
        assert_eq!(total_words, 200);
    }

    #[test]
    fn test_wide_glyphs_stay_inside_margin() {
        let story = vec![
            Flowable::Paragraph(Paragraph::plain("WWWW ".repeat(40), ParagraphStyle::NORMAL)),
            Flowable::Paragraph(Paragraph::plain("MMMM WWWW ".repeat(20), ParagraphStyle::HEADING1)),
        ];
        let pages = lay_out(&story);
        assert_within_margin(&pages);
    }

    #[test]
    fn test_overlong_word_is_split() {
        let word = "W".repeat(120);
        let story = vec![Flowable::Paragraph(Paragraph::plain(word.clone(), ParagraphStyle::NORMAL))];
        let pages = lay_out(&story);

        assert!(pages[0].len() > 1);
        assert_within_margin(&pages);
        assert_eq!(texts(&pages[0]).concat(), word);
    }

    #[test]
    fn test_content_flows_to_new_pages_in_order() {
        let story: Vec<Flowable> = (0..200)
            .flat_map(|i| {
                [
                    Flowable::Paragraph(Paragraph::plain(format!("Line {}", i), ParagraphStyle::NORMAL)),
                    Flowable::Spacer(6.0),
                ]
            })
            .collect();
        let pages = lay_out(&story);

        assert!(pages.len() > 1);
        let all: Vec<&str> = pages.iter().flat_map(|p| texts(p)).collect();
        let expected: Vec<String> = (0..200).map(|i| format!("Line {}", i)).collect();
        assert_eq!(all, expected);
        for piece in pages.iter().flatten() {
            assert!(piece.y >= DEFAULT_MARGIN - 12.0);
        }
    }

    #[test]
    fn test_centered_title() {
        let story = vec![Flowable::Paragraph(Paragraph::plain("Notes on X", ParagraphStyle::TITLE))];
        let page = &lay_out(&story)[0];
        assert!(page[0].x > DEFAULT_MARGIN);
    }

    #[test]
    fn test_empty_story_has_one_page() {
        assert_eq!(lay_out(&[]).len(), 1);
    }
}
