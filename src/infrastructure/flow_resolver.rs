//! Value-Flow Constant Resolver
//!
//! Folds a value back through its reaching definitions to a literal. All
//! definitions must agree on one constant; a single runtime-computed or
//! diverging definition makes the value unresolved. Addressing is unwrapped
//! at most once (a pointer to a string constant reaches the literal, deeper
//! chains do not), keeping termination and complexity obvious.

use crate::domain::graph::{ProgramGraph, ValueId, ValueKind};
use crate::ports::{ConstValue, ValueResolver};
use dashmap::DashMap;
use std::collections::HashSet;

/// `ValueResolver` over the graph's `Flow` summaries, with a concurrent memo
/// shared across the per-entry worker threads. Use one resolver per loaded
/// graph; memoized results are keyed by value id only.
#[derive(Default)]
pub struct FlowValueResolver {
    memo: DashMap<ValueId, Option<ConstValue>>,
}

impl FlowValueResolver {
    pub fn new() -> Self {
        Self::default()
    }

    fn fold(
        &self,
        graph: &ProgramGraph,
        value: ValueId,
        derefs_left: u8,
        visiting: &mut HashSet<ValueId>,
    ) -> Option<ConstValue> {
        if !visiting.insert(value) {
            return None; // cyclic flow cannot pin down one literal
        }
        let folded = match graph.value(value) {
            ValueKind::ConstInt { value } => Some(ConstValue::Int(*value)),
            ValueKind::ConstStr { value } => Some(ConstValue::Str(value.clone())),
            ValueKind::AddrOf { target } => {
                if derefs_left > 0 {
                    self.fold(graph, *target, derefs_left - 1, visiting)
                } else {
                    None
                }
            }
            ValueKind::Flow { defs } => {
                let mut agreed: Option<ConstValue> = None;
                if defs.is_empty() {
                    return None;
                }
                for def in defs {
                    let c = self.fold(graph, *def, derefs_left, visiting)?;
                    match &agreed {
                        Some(prev) if *prev != c => return None,
                        Some(_) => {}
                        None => agreed = Some(c),
                    }
                }
                agreed
            }
            ValueKind::FuncRef { .. } | ValueKind::Opaque => None,
        };
        visiting.remove(&value);
        folded
    }
}

impl ValueResolver for FlowValueResolver {
    fn resolve(&self, graph: &ProgramGraph, value: ValueId) -> Option<ConstValue> {
        if let Some(hit) = self.memo.get(&value) {
            return hit.clone();
        }
        let mut visiting = HashSet::new();
        let folded = self.fold(graph, value, 1, &mut visiting);
        self.memo.insert(value, folded.clone());
        folded
    }
}
