//! Assessment reports
//!
//! Renders a stored assessment for the field crew or the office: Markdown
//! narrative, plain-text summary, or the raw JSON record.

mod narrative;

pub use narrative::{render_markdown, render_text};

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use crate::types::AssessmentRecord;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to serialize report: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("unknown report format '{0}' (expected markdown, json or text)")]
    UnknownFormat(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Markdown,
    Json,
    Text,
}

impl FromStr for ReportFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(ReportFormat::Markdown),
            "json" => Ok(ReportFormat::Json),
            "text" | "txt" => Ok(ReportFormat::Text),
            other => Err(ReportError::UnknownFormat(other.to_string())),
        }
    }
}

/// Render a record in the requested format.
pub fn render(record: &AssessmentRecord, format: ReportFormat) -> Result<String, ReportError> {
    match format {
        ReportFormat::Markdown => Ok(render_markdown(record)),
        ReportFormat::Json => Ok(serde_json::to_string_pretty(record)?),
        ReportFormat::Text => Ok(format!(
            "{} - {}\n{}",
            record.id,
            record.site.site_name,
            render_text(&record.result)
        )),
    }
}
