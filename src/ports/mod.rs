use crate::application::EntryAudit;
use crate::domain::graph::{ProgramGraph, ValueId};
use std::io::Write;

pub mod report;

/// A statically determined constant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstValue {
    Int(i64),
    Str(String),
}

/// Constant-resolution queries against the value-flow summaries.
/// Implementations must be shareable across the per-entry worker threads.
pub trait ValueResolver: Sync {
    /// The constant a value is guaranteed to hold along all reaching
    /// definitions, or `None` when no single literal can be determined.
    /// Looks through at most one level of addressing; deeper indirection
    /// chains stay unresolved by contract.
    fn resolve(&self, graph: &ProgramGraph, value: ValueId) -> Option<ConstValue>;
}

/// Formats per-entry audit results into a report.
pub trait ReportExporter {
    fn export(&self, audits: &[EntryAudit], out: &mut dyn Write) -> anyhow::Result<()>;
}
