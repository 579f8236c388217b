//! Command-line arguments.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use marker_types::{BorderStyle, LabelSettings};

#[derive(Parser, Debug)]
#[command(name = "marker")]
#[command(
    version,
    about = "Export page markers as CSV, burn them into PDFs, and talk to the PDF backend"
)]
pub struct Cli {
    /// Directory that exported and rendered files are saved into
    #[arg(long, global = true, default_value = ".")]
    pub out_dir: PathBuf,

    /// Backend base URL (default: http://localhost:8000)
    #[arg(long, global = true, env = "PDF_MARKER_API_URL")]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Export annotations as `<document>_annotations.csv`
    Export {
        /// Annotations JSON: { "<page>": [{x, y, style, number}, ...] }
        annotations: PathBuf,

        /// Name of the annotated document; the CSV is named after it
        #[arg(long)]
        document: String,

        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// Draw the annotations onto a PDF and save the result
    Render {
        /// Source PDF
        document: PathBuf,

        /// Annotations JSON
        annotations: PathBuf,

        /// Name of the saved PDF (default: annotated.pdf)
        #[arg(long)]
        output: Option<String>,

        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// Submit form data for a PDF to the backend
    Submit {
        /// JSON file with the data to send
        data: PathBuf,

        /// Path of the PDF on the backend
        #[arg(long)]
        pdf_path: String,
    },

    /// List the PDFs in a backend directory
    List {
        directory: String,
    },
}

/// Label settings: an optional JSON file, then individual overrides.
#[derive(Args, Debug, Default, Clone)]
pub struct SettingsArgs {
    /// Label settings JSON (startNumber, increment, prefix, suffix, fontSize, borderStyle)
    #[arg(long)]
    pub settings: Option<PathBuf>,

    #[arg(long, allow_negative_numbers = true)]
    pub start_number: Option<i64>,

    #[arg(long, allow_negative_numbers = true)]
    pub increment: Option<i64>,

    #[arg(long)]
    pub prefix: Option<String>,

    #[arg(long)]
    pub suffix: Option<String>,

    #[arg(long)]
    pub font_size: Option<f64>,

    /// circle, rect or none
    #[arg(long)]
    pub border_style: Option<BorderStyle>,
}

impl SettingsArgs {
    pub fn resolve(&self) -> anyhow::Result<LabelSettings> {
        let mut settings = match &self.settings {
            Some(path) => load_settings(path)?,
            None => LabelSettings::default(),
        };

        if let Some(start_number) = self.start_number {
            settings.start_number = start_number;
        }
        if let Some(increment) = self.increment {
            settings.increment = increment;
        }
        if let Some(prefix) = &self.prefix {
            settings.prefix = prefix.clone();
        }
        if let Some(suffix) = &self.suffix {
            settings.suffix = suffix.clone();
        }
        if let Some(font_size) = self.font_size {
            settings.font_size = font_size;
        }
        if let Some(border_style) = self.border_style {
            settings.border_style = border_style;
        }

        Ok(settings)
    }
}

fn load_settings(path: &Path) -> anyhow::Result<LabelSettings> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
    LabelSettings::from_json(&json)
        .with_context(|| format!("Invalid settings file: {}", path.display()))
}
