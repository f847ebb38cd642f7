//! Diagnostic Extraction
//!
//! Maps the argument operands of a matched call to their semantic roles
//! (numeric code, message text) and resolves each to a literal through the
//! value resolver. Extraction is best-effort: whatever half resolves is
//! reported, and an unresolvable operand is an outcome, not an error.

use crate::config::AuditConfig;
use crate::domain::callsite::CallSiteDescriptor;
use crate::domain::graph::ProgramGraph;
use crate::ports::{ConstValue, ValueResolver};
use serde::Serialize;

/// The extracted payload of one diagnostic call site.
///
/// `resolved` is true only when both operands folded to literals. Consumers
/// must treat a partially resolved record as a reportable "unknown", never
/// as a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticRecord {
    pub code: Option<i64>,
    pub message: Option<String>,
    pub resolved: bool,
}

/// Resolves the configured code/message operands of matched call sites.
pub struct DiagnosticExtractor<'a> {
    graph: &'a ProgramGraph,
    resolver: &'a dyn ValueResolver,
    code_arg: usize,
    message_arg: usize,
}

impl<'a> DiagnosticExtractor<'a> {
    pub fn new(
        graph: &'a ProgramGraph,
        resolver: &'a dyn ValueResolver,
        config: &AuditConfig,
    ) -> Self {
        Self {
            graph,
            resolver,
            code_arg: config.code_arg,
            message_arg: config.message_arg,
        }
    }

    /// Extract the diagnostic payload of one matched call.
    ///
    /// A call with fewer operands than the configured positions yields an
    /// unresolved record with both fields absent. Panics if handed a
    /// descriptor that does not point at a call-shaped operation; only the
    /// matcher produces valid descriptors.
    pub fn extract(&self, call: &CallSiteDescriptor) -> DiagnosticRecord {
        let operation = self.graph.operation(call.op);
        let Some((_, args)) = operation.kind.call_parts() else {
            panic!("descriptor does not reference a call-shaped operation");
        };

        let code = args.get(self.code_arg).and_then(|v| {
            match self.resolver.resolve(self.graph, *v) {
                Some(ConstValue::Int(n)) => Some(n),
                _ => None,
            }
        });
        let message = args.get(self.message_arg).and_then(|v| {
            match self.resolver.resolve(self.graph, *v) {
                Some(ConstValue::Str(s)) => Some(s),
                _ => None,
            }
        });

        DiagnosticRecord {
            resolved: code.is_some() && message.is_some(),
            code,
            message,
        }
    }
}
