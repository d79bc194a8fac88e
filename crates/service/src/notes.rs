//! Search and download orchestration over a session store.

use crate::error::{Result, ServiceError};
use crate::generator::{build_prompt, NoteGenerator};
use crate::session::{SessionStore, NOTES, NOTES_TEXT, TOPIC};
use notes_core::{flatten, Block, NoteDocument, NoteExtractor, NotesInput};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Placeholder note stored when the backend fails.
pub const GENERATION_FAILED_NOTE: &str = "Unable to generate notes right now. Please try again later.";
/// Placeholder note stored when the backend answers with nothing usable.
pub const NO_NOTES_NOTE: &str = "No notes generated.";
/// Topic used for downloads when the session has none.
pub const DEFAULT_TOPIC: &str = "Notes";

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Pdf,
    Word,
    Slides,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Pdf, ExportFormat::Word, ExportFormat::Slides];

    /// Short name used in routes and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Word => "word",
            ExportFormat::Slides => "ppt",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Word => "docx",
            ExportFormat::Slides => "pptx",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Pdf => notes_pdf::CONTENT_TYPE,
            ExportFormat::Word => notes_docx::CONTENT_TYPE,
            ExportFormat::Slides => notes_pptx::CONTENT_TYPE,
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(ExportFormat::Pdf),
            "word" | "docx" => Ok(ExportFormat::Word),
            "ppt" | "pptx" | "slides" => Ok(ExportFormat::Slides),
            other => Err(ServiceError::UnknownFormat(other.to_string())),
        }
    }
}

/// Result of a search. Empty when the topic was blank.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOutcome {
    pub topic: String,
    pub notes: NoteDocument,
    pub notes_text: String,
}

/// Result of a download request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    File {
        filename: String,
        content_type: &'static str,
        bytes: Vec<u8>,
    },
    NothingToDownload,
}

/// Render notes in the given format.
///
/// PDF and Slides use the structured document when it is non-empty and fall
/// back to `text`; Word only ever uses `text`. Returns
/// [`DownloadOutcome::NothingToDownload`] when the chosen source is empty.
pub fn render_export(
    topic: &str,
    format: ExportFormat,
    notes: Option<&NoteDocument>,
    text: &str,
) -> Result<DownloadOutcome> {
    let structured = notes.filter(|doc| !doc.is_empty());
    let input = match structured {
        Some(doc) if format != ExportFormat::Word => NotesInput::Structured(doc),
        _ if text.trim().is_empty() => return Ok(DownloadOutcome::NothingToDownload),
        _ => NotesInput::Flat(text),
    };

    let bytes = match format {
        ExportFormat::Pdf => notes_pdf::render_pdf(topic, input)?,
        ExportFormat::Word => notes_docx::render_word(topic, text)?,
        ExportFormat::Slides => notes_pptx::render_slides(topic, input)?,
    };
    log::info!("Rendered {} export for '{}' ({} bytes)", format, topic, bytes.len());

    Ok(DownloadOutcome::File {
        filename: format!("{}.{}", topic, format.extension()),
        content_type: format.content_type(),
        bytes,
    })
}

/// Ties the generator, the extractor and a session store together.
#[derive(Clone)]
pub struct NotesService {
    generator: Arc<dyn NoteGenerator>,
    store: Arc<dyn SessionStore>,
    extractor: NoteExtractor,
}

impl NotesService {
    pub fn new(generator: Arc<dyn NoteGenerator>, store: Arc<dyn SessionStore>) -> Self {
        Self {
            generator,
            store,
            extractor: NoteExtractor::new(),
        }
    }

    /// Ask the backend for notes on `topic` and extract them.
    ///
    /// Never fails: a backend error or an empty answer yields a single
    /// placeholder note.
    pub async fn generate(&self, topic: &str) -> NoteDocument {
        let markup = match self.generator.generate(&build_prompt(topic)).await {
            Ok(markup) => markup,
            Err(e) => {
                log::warn!("Note generation for '{}' failed: {}", topic, e);
                return NoteDocument::from_blocks([Block::note(GENERATION_FAILED_NOTE)]);
            }
        };

        let doc = self.extractor.extract(&markup);
        if doc.is_empty() {
            log::warn!("Backend returned no usable notes for '{}'", topic);
            return NoteDocument::from_blocks([Block::note(NO_NOTES_NOTE)]);
        }
        log::debug!("Extracted {} blocks for '{}'", doc.len(), topic);
        doc
    }

    /// Generate notes for `topic` and store them in the session.
    ///
    /// A blank topic returns an empty outcome and leaves the session alone.
    pub async fn search(&self, session: &str, topic: &str) -> Result<SearchOutcome> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Ok(SearchOutcome::default());
        }

        let notes = self.generate(topic).await;
        let notes_text = flatten(&notes);

        self.store.set(session, TOPIC, Value::String(topic.to_string()));
        self.store.set(session, NOTES, serde_json::to_value(&notes)?);
        self.store.set(session, NOTES_TEXT, Value::String(notes_text.clone()));

        Ok(SearchOutcome {
            topic: topic.to_string(),
            notes,
            notes_text,
        })
    }

    /// Render the session's notes in the requested format.
    pub fn download(&self, session: &str, format: ExportFormat) -> Result<DownloadOutcome> {
        let topic = self
            .stored_string(session, TOPIC)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_TOPIC.to_string());
        let notes = self.stored_notes(session);
        let text = self.stored_string(session, NOTES_TEXT).unwrap_or_default();

        let outcome = render_export(&topic, format, notes.as_ref(), &text)?;
        if outcome == DownloadOutcome::NothingToDownload {
            log::debug!("Nothing to download as {} for session {}", format, session);
        }
        Ok(outcome)
    }

    fn stored_string(&self, session: &str, field: &str) -> Option<String> {
        match self.store.get(session, field)? {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Stored document; unreadable data is treated as absent.
    fn stored_notes(&self, session: &str) -> Option<NoteDocument> {
        let value = self.store.get(session, NOTES)?;
        match serde_json::from_value(value) {
            Ok(doc) => Some(doc),
            Err(e) => {
                log::warn!("Ignoring unreadable stored notes for session {}: {}", session, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::InMemorySessionStore;
    use async_trait::async_trait;
    use notes_core::BlockKind;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Generator with a canned answer that counts its calls.
    struct MockGenerator {
        answer: Option<String>,
        calls: AtomicUsize,
    }

    impl MockGenerator {
        fn answering(markup: &str) -> Arc<Self> {
            Arc::new(Self {
                answer: Some(markup.to_string()),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                answer: None,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl NoteGenerator for MockGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer
                .clone()
                .ok_or_else(|| ServiceError::Generation("backend down".to_string()))
        }
    }

    const ALGEBRA: &str = "<h1>Algebra</h1><p>Intro text</p>\
        <p><b style='color:red'>NOTE:</b> remember signs</p>\
        <ul><li>Term A<ul><li>Sub A1</li></ul></li></ul>";

    fn service(generator: Arc<MockGenerator>) -> (NotesService, Arc<InMemorySessionStore>) {
        let store = Arc::new(InMemorySessionStore::new());
        (NotesService::new(generator, store.clone()), store)
    }

    #[tokio::test]
    async fn test_search_stores_notes() {
        let generator = MockGenerator::answering(ALGEBRA);
        let (svc, store) = service(generator.clone());

        let outcome = svc.search("s1", "  Algebra ").await.unwrap();
        assert_eq!(generator.calls(), 1);
        assert_eq!(outcome.topic, "Algebra");
        assert_eq!(outcome.notes.len(), 5);
        assert_eq!(
            outcome.notes_text,
            "Algebra\nIntro text\nNOTE: remember signs\n• Term A\n  • Sub A1"
        );

        assert_eq!(store.get("s1", TOPIC), Some(json!("Algebra")));
        assert_eq!(store.get("s1", NOTES_TEXT), Some(json!(outcome.notes_text)));
        let stored: NoteDocument = serde_json::from_value(store.get("s1", NOTES).unwrap()).unwrap();
        assert_eq!(stored, outcome.notes);
    }

    #[tokio::test]
    async fn test_blank_topic_skips_backend() {
        let generator = MockGenerator::answering(ALGEBRA);
        let (svc, store) = service(generator.clone());

        let outcome = svc.search("s1", "   ").await.unwrap();
        assert_eq!(outcome, SearchOutcome::default());
        assert_eq!(generator.calls(), 0);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_backend_failure_placeholder() {
        let (svc, _) = service(MockGenerator::failing());
        let outcome = svc.search("s1", "Algebra").await.unwrap();

        assert_eq!(outcome.notes.len(), 1);
        let block = &outcome.notes.blocks()[0];
        assert_eq!(block.kind, BlockKind::Note);
        assert_eq!(block.text, GENERATION_FAILED_NOTE);
        assert_eq!(outcome.notes_text, format!("NOTE: {}", GENERATION_FAILED_NOTE));
    }

    #[tokio::test]
    async fn test_empty_answer_placeholder() {
        let (svc, _) = service(MockGenerator::answering("<div>   </div>"));
        let outcome = svc.search("s1", "Algebra").await.unwrap();
        assert_eq!(outcome.notes.blocks(), &[Block::note(NO_NOTES_NOTE)]);
    }

    #[tokio::test]
    async fn test_search_overwrites_previous() {
        let (svc, store) = service(MockGenerator::answering(ALGEBRA));
        svc.search("s1", "First").await.unwrap();
        svc.search("s1", "Second").await.unwrap();
        assert_eq!(store.get("s1", TOPIC), Some(json!("Second")));
    }

    #[test]
    fn test_empty_session_has_nothing_to_download() {
        let (svc, _) = service(MockGenerator::answering(ALGEBRA));
        for format in ExportFormat::ALL {
            assert_eq!(svc.download("nobody", format).unwrap(), DownloadOutcome::NothingToDownload);
        }
    }

    #[tokio::test]
    async fn test_download_after_search() {
        let (svc, _) = service(MockGenerator::answering(ALGEBRA));
        svc.search("s1", "Algebra").await.unwrap();

        for format in ExportFormat::ALL {
            match svc.download("s1", format).unwrap() {
                DownloadOutcome::File {
                    filename,
                    content_type,
                    bytes,
                } => {
                    assert_eq!(filename, format!("Algebra.{}", format.extension()));
                    assert_eq!(content_type, format.content_type());
                    assert!(!bytes.is_empty());
                }
                DownloadOutcome::NothingToDownload => panic!("expected a file for {}", format),
            }
        }
    }

    #[test]
    fn test_word_needs_text() {
        let (svc, store) = service(MockGenerator::answering(ALGEBRA));
        let doc = NoteDocument::from_blocks([Block::note("structured only")]);
        store.set("s1", NOTES, serde_json::to_value(&doc).unwrap());

        assert_eq!(svc.download("s1", ExportFormat::Word).unwrap(), DownloadOutcome::NothingToDownload);
        assert!(matches!(
            svc.download("s1", ExportFormat::Pdf).unwrap(),
            DownloadOutcome::File { .. }
        ));
    }

    #[test]
    fn test_text_only_session_uses_default_topic() {
        let (svc, store) = service(MockGenerator::answering(ALGEBRA));
        store.set("s1", NOTES_TEXT, json!("INTRODUCTION\nSome text"));

        for format in ExportFormat::ALL {
            match svc.download("s1", format).unwrap() {
                DownloadOutcome::File { filename, .. } => {
                    assert_eq!(filename, format!("Notes.{}", format.extension()))
                }
                DownloadOutcome::NothingToDownload => panic!("expected a file for {}", format),
            }
        }
    }

    #[test]
    fn test_empty_structured_falls_back_to_text() {
        let (svc, store) = service(MockGenerator::answering(ALGEBRA));
        store.set("s1", NOTES, json!([]));
        assert_eq!(svc.download("s1", ExportFormat::Slides).unwrap(), DownloadOutcome::NothingToDownload);

        store.set("s1", NOTES_TEXT, json!("text"));
        assert!(matches!(
            svc.download("s1", ExportFormat::Slides).unwrap(),
            DownloadOutcome::File { .. }
        ));
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("pdf".parse::<ExportFormat>().unwrap(), ExportFormat::Pdf);
        assert_eq!("Word".parse::<ExportFormat>().unwrap(), ExportFormat::Word);
        assert_eq!("ppt".parse::<ExportFormat>().unwrap(), ExportFormat::Slides);
        assert!(matches!(
            "odt".parse::<ExportFormat>(),
            Err(ServiceError::UnknownFormat(f)) if f == "odt"
        ));
        assert_eq!(ExportFormat::Slides.to_string(), "ppt");
    }
}
