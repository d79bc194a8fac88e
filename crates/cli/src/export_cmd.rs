use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use notes_core::{flatten, NoteExtractor};
use notes_service::{render_export, DownloadOutcome, ExportFormat, InMemorySessionStore, NoteGenerator, NotesService};

/// Where exported notes come from.
pub enum NotesSource {
    /// Saved HTML markup, run through the extractor.
    Markup(PathBuf),
    /// Flattened notes text.
    Text(PathBuf),
    /// A live generation backend.
    Generate(Arc<dyn NoteGenerator>),
}

/// Export notes on `topic` to `{output_dir}/{topic}.{ext}` and return the path.
pub async fn run_export(
    topic: &str,
    format: ExportFormat,
    source: NotesSource,
    output_dir: &Path,
) -> Result<PathBuf> {
    let topic = topic.trim();
    if topic.is_empty() {
        bail!("topic must not be empty");
    }

    let outcome = match source {
        NotesSource::Markup(path) => {
            let markup = read_input(&path)?;
            let doc = NoteExtractor::new().extract(&markup);
            log::info!("Extracted {} blocks from {}", doc.len(), path.display());
            render_export(topic, format, Some(&doc), &flatten(&doc))?
        }
        NotesSource::Text(path) => render_export(topic, format, None, &read_input(&path)?)?,
        NotesSource::Generate(generator) => {
            // A one-off session keeps this path identical to the web flow.
            let service = NotesService::new(generator, Arc::new(InMemorySessionStore::new()));
            service.search("export", topic).await?;
            service.download("export", format)?
        }
    };

    let (filename, bytes) = match outcome {
        DownloadOutcome::File { filename, bytes, .. } => (filename, bytes),
        DownloadOutcome::NothingToDownload => bail!("no notes to export for '{}'", topic),
    };

    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory: {}", output_dir.display()))?;
    let path = output_dir.join(disk_filename(&filename));
    std::fs::write(&path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

/// Keep the file inside the output directory: path separators and control
/// characters in the topic become `_`.
fn disk_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') || c.is_control() { '_' } else { c })
        .collect()
}

fn read_input(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}
