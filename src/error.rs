use std::path::PathBuf;

use thiserror::Error;

use crate::schema::Dataset;

#[derive(Error, Debug)]
pub enum DashError {
    #[error("Data file not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("Missing column '{column}' in {dataset}")]
    MissingColumn { dataset: Dataset, column: String },

    #[error("InvalidData: {dataset} row {row}, column '{column}': {value:?}")]
    InvalidData {
        dataset: Dataset,
        row: usize,
        column: String,
        value: String,
    },

    #[error("Unknown {kind}: {value:?}")]
    UnknownCategory { kind: &'static str, value: String },

    #[error("No data: {0}")]
    NoData(String),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DashError {
    /// Load failures are the ones that come from reading a source file.
    pub fn is_load_failure(&self) -> bool {
        matches!(
            self,
            Self::MissingFile(_)
                | Self::MissingColumn { .. }
                | Self::InvalidData { .. }
                | Self::UnknownCategory { .. }
                | Self::Polars(_)
                | Self::Io(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn read_failure() -> Result<(), DashError> {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))?;
        Ok(())
    }

    #[test]
    fn io_errors_are_load_failures() {
        let err = read_failure().unwrap_err();
        assert!(matches!(err, DashError::Io(_)));
        assert!(err.is_load_failure());
        assert_eq!(err.to_string(), "IO error: denied");
    }

    #[test]
    fn no_data_is_not_a_load_failure() {
        assert!(!DashError::NoData("empty".into()).is_load_failure());
    }
}
