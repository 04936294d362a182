#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid text: {0}")]
    Text(#[from] docbridge_types::TextError),

    #[error("failed to read timesheet CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid timesheet row at line {line}: {message}")]
    TimesheetRow { line: u64, message: String },
    #[error("failed to write timesheet CSV: {0}")]
    CsvWrite(String),

    #[error("failed to process PDF: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("failed to serialise PDF: {0}")]
    PdfWrite(String),

    #[error("failed to read file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to write file: {0}")]
    FileWrite(std::io::Error),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
