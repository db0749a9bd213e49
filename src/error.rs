use thiserror::Error;

pub type RoadmapResult<T> = Result<T, RoadmapError>;

#[derive(Error, Debug)]
pub enum RoadmapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    /// The workbook could not be assembled; no file was produced.
    #[error("Excel export unavailable: {0}")]
    Export(String),
}

impl RoadmapError {
    /// True when the failure came from the spreadsheet builder rather than
    /// from input or storage.
    pub fn is_export_unavailable(&self) -> bool {
        matches!(self, RoadmapError::Export(_))
    }
}
