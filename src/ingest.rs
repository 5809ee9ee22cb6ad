//! Upload ingestion: spool to a temp file, extract, publish as context.
//!
//! The uploaded bytes are streamed into a [`tempfile::NamedTempFile`]
//! inside the configured upload directory. The spool owns the file, so it
//! is deleted when the spool is dropped, whichever way ingestion ends.

use std::path::Path;

use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;

use crate::document::DocumentContext;
use crate::extract::{extract_pdf_file, ExtractError};

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("failed to spool upload: {0}")]
    Spool(#[from] std::io::Error),
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error("extraction task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Result of a successful ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestSummary {
    pub page_count: usize,
    pub characters: usize,
}

/// A temporary file receiving an upload.
pub struct UploadSpool {
    file: NamedTempFile,
    writer: tokio::fs::File,
    bytes_written: u64,
}

impl UploadSpool {
    /// Creates an empty spool file in `dir`.
    pub fn create(dir: &Path) -> std::io::Result<Self> {
        let file = tempfile::Builder::new()
            .prefix("upload-")
            .suffix(".pdf")
            .tempfile_in(dir)?;
        let writer = tokio::fs::File::from_std(file.reopen()?);
        Ok(Self {
            file,
            writer,
            bytes_written: 0,
        })
    }

    pub async fn write_chunk(&mut self, chunk: &[u8]) -> std::io::Result<()> {
        self.writer.write_all(chunk).await?;
        self.bytes_written += chunk.len() as u64;
        Ok(())
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Flushes and closes the writer, keeping the file itself.
    async fn finish(mut self) -> std::io::Result<NamedTempFile> {
        self.writer.flush().await?;
        self.writer.sync_all().await?;
        Ok(self.file)
    }
}

/// Extracts the spooled PDF and replaces the current document with it.
///
/// On failure the current document is left untouched. The spool file is
/// removed before this returns in every case.
pub async fn ingest_pdf(
    spool: UploadSpool,
    documents: &DocumentContext,
) -> Result<IngestSummary, IngestError> {
    let file = spool.finish().await?;
    let extracted = tokio::task::spawn_blocking(move || {
        let result = extract_pdf_file(file.path());
        drop(file);
        result
    })
    .await??;

    let doc = documents.replace(extracted.text, extracted.page_count);
    tracing::info!(
        pages = doc.page_count,
        characters = doc.characters(),
        "document context replaced"
    );
    Ok(IngestSummary {
        page_count: doc.page_count,
        characters: doc.characters(),
    })
}
