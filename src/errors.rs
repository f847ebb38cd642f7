use thiserror::Error;

/// Analysis-level failures.
///
/// Unresolved constants are deliberately NOT in this taxonomy: a call site
/// whose operands cannot be folded to literals is a reportable outcome
/// (`DiagnosticRecord { resolved: false, .. }`), never an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuditError {
    /// The requested traversal root does not exist in the program graph.
    /// Fatal for that catalog entry; other entries keep running.
    #[error("entry function `{0}` not found in the program graph")]
    UnknownEntryFunction(String),
}
