//! HTML page for the search view.

use notes_core::{Block, BlockKind};
use notes_service::{ExportFormat, SearchOutcome};

/// Escape text for use in HTML element content and quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn render_block(block: &Block) -> String {
    let text = escape(block.trimmed_text());
    match block.kind {
        BlockKind::Heading => format!("<h1>{text}</h1>"),
        BlockKind::Subheading => format!("<h2>{text}</h2>"),
        BlockKind::Subsubheading => format!("<h3>{text}</h3>"),
        BlockKind::Paragraph => format!("<p>{text}</p>"),
        BlockKind::Note => format!("<p class=\"note\"><b style=\"color:red\">NOTE:</b> {text}</p>"),
        BlockKind::ListItem => format!(
            "<p class=\"item\" style=\"margin-left:{}em\">&bull; {text}</p>",
            1.5 * block.list_level() as f32
        ),
    }
}

/// Render the search page: the form, then the notes and download links when
/// a topic was searched.
pub fn render_page(outcome: &SearchOutcome) -> String {
    let topic = escape(&outcome.topic);

    let results = if outcome.topic.is_empty() {
        String::new()
    } else {
        let notes = outcome
            .notes
            .iter()
            .map(render_block)
            .collect::<Vec<_>>()
            .join("\n");
        let links = ExportFormat::ALL
            .iter()
            .map(|f| {
                format!(
                    "<a href=\"/download/{}/\">Download {}</a>",
                    f.as_str(),
                    f.extension().to_uppercase()
                )
            })
            .collect::<Vec<_>>()
            .join(" | ");

        format!(
            "<section id=\"notes\"><h2>Notes on {topic}</h2>\n{notes}</section>\n\
<details><summary>Plain text</summary><pre id=\"notes-text\">{text}</pre></details>\n\
<p id=\"downloads\">{links}</p>",
            text = escape(&outcome.notes_text),
        )
    };

    format!(
        "<!DOCTYPE html>\
<html><head><meta charset=\"utf-8\"><title>Study Notes</title></head><body>\
<h1>Study Notes Generator</h1>\
<form action=\"/search/\" method=\"get\">\
<input type=\"text\" name=\"topic\" value=\"{topic}\" placeholder=\"Enter a topic\">\
<button type=\"submit\">Generate</button></form>\n\
{results}\
</body></html>"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use notes_core::NoteDocument;

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"<b>"A" & 'B'</b>"#), "&lt;b&gt;&quot;A&quot; &amp; &#39;B&#39;&lt;/b&gt;");
    }

    #[test]
    fn test_empty_page_has_no_results() {
        let html = render_page(&SearchOutcome::default());
        assert!(html.contains("<form action=\"/search/\""));
        assert!(!html.contains("/download/"));
    }

    #[test]
    fn test_results_page() {
        let outcome = SearchOutcome {
            topic: "A<B".to_string(),
            notes: NoteDocument::from_blocks([
                Block::new(BlockKind::Heading, "Title"),
                Block::note("careful"),
                Block::list_item("Deep", 2),
            ]),
            notes_text: "Title\nNOTE: careful\n    • Deep".to_string(),
        };
        let html = render_page(&outcome);

        assert!(html.contains("value=\"A&lt;B\""));
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<b style=\"color:red\">NOTE:</b> careful"));
        assert!(html.contains("margin-left:3em"));
        assert!(html.contains("<pre id=\"notes-text\">Title\nNOTE: careful\n    • Deep</pre>"));
        for format in ["pdf", "word", "ppt"] {
            assert!(html.contains(&format!("href=\"/download/{}/\"", format)));
        }
    }
}
