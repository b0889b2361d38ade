use std::io::{Cursor, Write};
use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, info};
use uuid::Uuid;
use zip::write::SimpleFileOptions;

use crate::error::ExportError;

/// Exports older than this are removed by [`NotesExporter::sweep_stale`] at startup.
pub const EXPORT_RETENTION: Duration = Duration::from_secs(24 * 60 * 60);

pub const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const ROOT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

/// A DOCX written by [`NotesExporter::export_docx`].
#[derive(Debug, Clone)]
pub struct ExportedNotes {
    /// `<uuid>.docx`; the only handle clients get.
    pub file_name: String,
    pub path: PathBuf,
}

/// Writes generated notes to DOCX files and hands each file out once.
#[derive(Debug, Clone)]
pub struct NotesExporter {
    dir: PathBuf,
}

impl NotesExporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub async fn export_docx(&self, notes: &str) -> Result<ExportedNotes, ExportError> {
        let bytes = build_docx(notes)?;

        tokio::fs::create_dir_all(&self.dir).await?;
        let file_name = format!("{}.docx", Uuid::new_v4());
        let path = self.dir.join(&file_name);
        tokio::fs::write(&path, bytes).await?;

        info!("📄 Exported notes to {}", path.display());
        Ok(ExportedNotes { file_name, path })
    }

    /// Read an exported file and delete it. `None` for names the exporter
    /// could not have produced or files already taken.
    pub async fn take(&self, file_name: &str) -> Result<Option<Vec<u8>>, ExportError> {
        let Some(path) = self.resolve(file_name) else {
            debug!("rejected export name {:?}", file_name);
            return Ok(None);
        };

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        tokio::fs::remove_file(&path).await?;

        Ok(Some(bytes))
    }

    /// Delete exports that were never downloaded and are at least
    /// `max_age` old. Other files in the directory are left alone.
    pub async fn sweep_stale(&self, max_age: Duration) -> Result<usize, ExportError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let mut removed = 0;
        while let Some(entry) = entries.next_entry().await? {
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            if self.resolve(name).is_none() {
                continue;
            }

            let age = entry.metadata().await?.modified()?.elapsed().unwrap_or_default();
            if age >= max_age {
                tokio::fs::remove_file(entry.path()).await?;
                removed += 1;
            }
        }

        if removed > 0 {
            info!("🧹 Removed {} stale export(s) from {}", removed, self.dir.display());
        }
        Ok(removed)
    }

    // Only `<uuid>.docx` maps to a path, which rules out traversal.
    fn resolve(&self, file_name: &str) -> Option<PathBuf> {
        let stem = file_name.strip_suffix(".docx")?;
        let id = Uuid::parse_str(stem).ok()?;
        Some(self.dir.join(format!("{}.docx", id)))
    }
}

/// Minimal WordprocessingML package, one paragraph per line of `notes`.
pub fn build_docx(notes: &str) -> Result<Vec<u8>, ExportError> {
    let paragraphs: String = notes
        .lines()
        .map(|line| {
            format!(
                r#"<w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
                escape_xml(line)
            )
        })
        .collect();

    let document_xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
        paragraphs
    );

    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    zip.start_file("[Content_Types].xml", options)?;
    zip.write_all(CONTENT_TYPES_XML.as_bytes())?;
    zip.start_file("_rels/.rels", options)?;
    zip.write_all(ROOT_RELS_XML.as_bytes())?;
    zip.start_file("word/document.xml", options)?;
    zip.write_all(document_xml.as_bytes())?;

    Ok(zip.finish()?.into_inner())
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
