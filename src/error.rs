use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    /// The drawing primitive cannot be used at all; nothing was composed.
    #[error("report library unavailable: {0}")]
    RenderEnvironment(String),
    /// Composition failed part-way. `section` names what was being built.
    #[error("failed to compose {section}: {message}")]
    Generation { section: String, message: String },
    #[error("canvas error: {0}")]
    Canvas(String),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("failed to save report: {0}")]
    Save(String),
    #[error("invalid analysis payload: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReportError {
    pub(crate) fn in_section(self, section: &str) -> ReportError {
        match self {
            ReportError::Generation { .. } | ReportError::RenderEnvironment(_) => self,
            other => ReportError::Generation {
                section: section.to_string(),
                message: other.to_string(),
            },
        }
    }

    /// The single sentence a host shows to the person who asked for the report.
    /// Internals stay in the log.
    pub fn user_message(&self) -> &'static str {
        match self {
            ReportError::RenderEnvironment(_) => "Report library unavailable, reload the page.",
            ReportError::Save(_) | ReportError::Io(_) => {
                "The PDF report could not be saved. No file was created."
            }
            _ => "The PDF report could not be generated. No file was created.",
        }
    }

    /// Stage that failed. Sink failures report `save`.
    pub fn section(&self) -> Option<&str> {
        match self {
            ReportError::Generation { section, .. } => Some(section),
            ReportError::Save(_) => Some("save"),
            _ => None,
        }
    }
}
