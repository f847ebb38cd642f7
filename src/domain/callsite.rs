//! Call-Site Discovery
//!
//! Interprocedural traversal from one entry function, classifying every
//! call-shaped operation it reaches and collecting the direct calls into the
//! configured diagnostic-emitting symbol.

use crate::domain::graph::{Callee, FuncId, OpKind, OpRef, ProgramGraph};
use crate::errors::AuditError;
use std::collections::HashSet;

/// Normalized view over the low-level call encodings. An operand-indirected
/// call that resolves to exactly one concrete function is still `Direct`;
/// `ExceptionalDirect` is the invoke-style transfer with an unwind successor.
/// Adding a new encoding means adding a variant, not another branch ladder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallShape {
    Direct(String),
    ExceptionalDirect(String),
    Indirect,
}

impl CallShape {
    pub fn is_direct(&self) -> bool {
        !matches!(self, CallShape::Indirect)
    }

    /// Callee linker symbol, for the direct shapes.
    pub fn symbol(&self) -> Option<&str> {
        match self {
            CallShape::Direct(s) | CallShape::ExceptionalDirect(s) => Some(s),
            CallShape::Indirect => None,
        }
    }
}

/// A classified call operation. The `op` handle is only meaningful against
/// the graph the matcher ran over.
#[derive(Debug, Clone)]
pub struct CallSiteDescriptor {
    pub op: OpRef,
    pub shape: CallShape,
    pub loc: Option<String>,
}

impl CallSiteDescriptor {
    pub fn is_direct(&self) -> bool {
        self.shape.is_direct()
    }

    pub fn callee_symbol(&self) -> Option<&str> {
        self.shape.symbol()
    }
}

/// Matched call sites for one entry function, deduplicated by operation
/// identity. Insertion order is discovery order, kept for reproducible
/// reports; equality is set equality over the operations.
#[derive(Debug, Default)]
pub struct MatchSet {
    sites: Vec<CallSiteDescriptor>,
    seen: HashSet<OpRef>,
}

impl MatchSet {
    pub fn insert(&mut self, site: CallSiteDescriptor) -> bool {
        if self.seen.insert(site.op) {
            self.sites.push(site);
            true
        } else {
            false
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &CallSiteDescriptor> {
        self.sites.iter()
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub fn contains(&self, op: OpRef) -> bool {
        self.seen.contains(&op)
    }
}

impl PartialEq for MatchSet {
    fn eq(&self, other: &Self) -> bool {
        self.seen == other.seen
    }
}

/// Walks the interprocedural control flow reachable from an entry function
/// and yields the direct calls into a target symbol.
pub struct CallSiteMatcher<'g> {
    graph: &'g ProgramGraph,
}

impl<'g> CallSiteMatcher<'g> {
    pub fn new(graph: &'g ProgramGraph) -> Self {
        Self { graph }
    }

    /// Classify one operation, or `None` if it is not call-shaped.
    pub fn descriptor(&self, op: OpRef) -> Option<CallSiteDescriptor> {
        let operation = self.graph.operation(op);
        let (callee, _args) = operation.kind.call_parts()?;

        let symbol = match callee {
            Callee::Symbol { symbol } => Some(symbol.clone()),
            Callee::Value { value } => self.graph.single_callee(*value).map(str::to_string),
        };

        let shape = match (symbol, &operation.kind) {
            (Some(s), OpKind::Invoke { .. }) => CallShape::ExceptionalDirect(s),
            (Some(s), _) => CallShape::Direct(s),
            (None, _) => CallShape::Indirect,
        };

        Some(CallSiteDescriptor {
            op,
            shape,
            loc: operation.loc.clone(),
        })
    }

    /// Collect every direct call to `target_symbol` reachable from
    /// `entry_symbol`, following direct calls into callees defined in the
    /// graph. Indirect calls are skipped, both as matches and as traversal
    /// edges; that is the documented limit of the analysis, not an error.
    pub fn find_matches(
        &self,
        entry_symbol: &str,
        target_symbol: &str,
    ) -> Result<MatchSet, AuditError> {
        let entry = self
            .graph
            .function_by_symbol(entry_symbol)
            .ok_or_else(|| AuditError::UnknownEntryFunction(entry_symbol.to_string()))?;

        let mut matches = MatchSet::default();
        let mut visited: HashSet<FuncId> = HashSet::new();
        let mut worklist: Vec<FuncId> = vec![entry];
        visited.insert(entry);

        while let Some(func) = worklist.pop() {
            let op_count = self.graph.function(func).ops.len();
            for index in 0..op_count {
                let op = OpRef { func, index };
                let Some(site) = self.descriptor(op) else {
                    continue;
                };
                let Some(callee) = site.callee_symbol().map(str::to_string) else {
                    continue; // indirect: cannot be matched or followed
                };

                if callee == target_symbol {
                    matches.insert(site);
                }
                // Follow the call so sites nested arbitrarily deep below the
                // entry are still found, including inside the target's own
                // body when it is defined in the graph. Callees without a
                // definition contribute nothing.
                if let Some(next) = self.graph.function_by_symbol(&callee) {
                    if visited.insert(next) {
                        worklist.push(next);
                    }
                }
            }
        }

        Ok(matches)
    }
}
