use crate::validation::ValidationReport;

/// State for each open document
#[derive(Debug)]
pub struct DocumentState {
    pub content: String,
    /// Diagnostics of the latest content, ignored rules already removed
    pub report: ValidationReport,
}
