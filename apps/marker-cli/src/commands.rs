//! Subcommand implementations.

use std::path::Path;

use anyhow::Context;
use marker_client::ApiClient;
use marker_core::{download_pdf, export_annotations, render_annotations, Downloader};
use marker_types::{AnnotationSet, LabelSettings};
use serde_json::Value;
use tracing::info;

pub fn load_annotations(path: &Path) -> anyhow::Result<AnnotationSet> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read annotations file: {}", path.display()))?;
    AnnotationSet::from_json(&json)
        .with_context(|| format!("Invalid annotations file: {}", path.display()))
}

/// Export the annotations as CSV; returns the saved filename.
pub fn export(
    annotations_path: &Path,
    document_name: &str,
    settings: &LabelSettings,
    downloader: &dyn Downloader,
) -> anyhow::Result<String> {
    let annotations = load_annotations(annotations_path)?;
    let filename = export_annotations(&annotations, settings, document_name, downloader)
        .context("Failed to export annotations")?;
    Ok(filename)
}

/// Draw the annotations onto a PDF and save it; returns the saved filename.
pub async fn render(
    document_path: &Path,
    annotations_path: &Path,
    output: Option<&str>,
    settings: LabelSettings,
    downloader: &dyn Downloader,
) -> anyhow::Result<String> {
    let annotations = load_annotations(annotations_path)?;
    let bytes = tokio::fs::read(document_path)
        .await
        .with_context(|| format!("Failed to read PDF: {}", document_path.display()))?;

    info!(
        document = %document_path.display(),
        markers = annotations.total(),
        "rendering markers"
    );

    // lopdf parsing and serialization are blocking
    let rendered = tokio::task::spawn_blocking(move || {
        render_annotations(&bytes, &annotations, &settings)
    })
    .await
    .context("Render task failed")?
    .with_context(|| format!("Failed to render {}", document_path.display()))?;

    download_pdf(&rendered, output, downloader).context("Failed to save rendered PDF")?;
    Ok(output.unwrap_or(marker_core::DEFAULT_PDF_FILENAME).to_string())
}

pub async fn submit(
    client: &ApiClient,
    data_path: &Path,
    pdf_path: &str,
) -> anyhow::Result<Value> {
    let json = tokio::fs::read_to_string(data_path)
        .await
        .with_context(|| format!("Failed to read data file: {}", data_path.display()))?;
    let data: Value = serde_json::from_str(&json)
        .with_context(|| format!("Invalid JSON in {}", data_path.display()))?;

    client
        .submit_pdf_data(&data, pdf_path)
        .await
        .context("Failed to submit PDF data")
}

pub async fn list(client: &ApiClient, directory: &str) -> anyhow::Result<Value> {
    client
        .list_pdfs(directory)
        .await
        .with_context(|| format!("Failed to list PDFs in {}", directory))
}
