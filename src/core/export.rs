//! Export collaborator
//!
//! Exporters receive a read-only snapshot of the document title and markup.
//! Format conversion and delivery are their business; the bundled exporter
//! only pretends to do it.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::error::TaskError;
use super::tasks::{TaskHandle, TaskRunner};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Pdf,
    Docx,
    Html,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [Self::Pdf, Self::Docx, Self::Html];

    pub fn label(self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::Docx => "DOCX",
            Self::Html => "HTML",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Html => "html",
        }
    }
}

/// What an exporter may read from the editor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSource {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    pub format: ExportFormat,
    pub source: ExportSource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReceipt {
    pub format: ExportFormat,
    pub file_name: String,
    pub bytes: usize,
    pub message: String,
}

#[async_trait]
pub trait Exporter: Send + Sync {
    async fn export(&self, request: ExportRequest) -> Result<ExportReceipt, TaskError>;
}

/// File name derived from a document title
pub fn suggested_file_name(title: &str, format: ExportFormat) -> String {
    let stem: String = title
        .split_whitespace()
        .map(|word| {
            word.chars()
                .filter(|c| c.is_alphanumeric() || matches!(c, '-' | '_'))
                .collect::<String>()
        })
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    let stem = if stem.is_empty() { "belge" } else { stem.as_str() };
    format!("{stem}.{}", format.extension())
}

/// Waits `delay`, then reports success without writing anything
#[derive(Debug, Clone)]
pub struct SimulatedExporter {
    delay: Duration,
}

impl SimulatedExporter {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl Exporter for SimulatedExporter {
    async fn export(&self, request: ExportRequest) -> Result<ExportReceipt, TaskError> {
        tokio::time::sleep(self.delay).await;
        let format = request.format;
        Ok(ExportReceipt {
            format,
            file_name: suggested_file_name(&request.source.title, format),
            bytes: request.source.content.len(),
            message: format!(
                "{} dosyası başarıyla dışa aktarıldı ve indirildi.",
                format.label()
            ),
        })
    }
}

/// Run an export in the background
pub fn submit_export(
    runner: &TaskRunner,
    exporter: Arc<dyn Exporter>,
    request: ExportRequest,
) -> TaskHandle<ExportReceipt> {
    runner.submit("export", move |_| async move { exporter.export(request).await })
}

#[cfg(test)]
mod tests {
    use tokio::runtime::Handle;

    use super::*;

    #[test]
    fn test_suggested_file_name() {
        assert_eq!(
            suggested_file_name("Q3 Pazarlama Raporu", ExportFormat::Pdf),
            "Q3-Pazarlama-Raporu.pdf"
        );
        assert_eq!(
            suggested_file_name("Proje Teklifi - Acme", ExportFormat::Docx),
            "Proje-Teklifi---Acme.docx"
        );
        assert_eq!(suggested_file_name("  /?  ", ExportFormat::Html), "belge.html");
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulated_export_receipt() {
        let runner = TaskRunner::new(Handle::current());
        let exporter: Arc<dyn Exporter> = Arc::new(SimulatedExporter::new(Duration::from_millis(1500)));
        let request = ExportRequest {
            format: ExportFormat::Html,
            source: ExportSource {
                title: "Notlar".to_string(),
                content: "<p>abc</p>".to_string(),
            },
        };

        let receipt = submit_export(&runner, exporter, request).wait().await.unwrap();
        assert_eq!(receipt.file_name, "Notlar.html");
        assert_eq!(receipt.bytes, 10);
        assert!(receipt.message.starts_with("HTML dosyası"));
    }
}
