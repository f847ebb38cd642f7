//! Program Graph
//!
//! The consumed representation of the external whole-program analysis: one
//! function per linker symbol, each carrying its call-shaped operations, plus
//! a value table whose `Flow` entries summarize the reaching definitions the
//! value-flow engine computed. The graph is built once by the artifact loader
//! and is read-only for the rest of the run.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Index into the graph's value table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValueId(pub u32);

/// Index into the graph's function list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FuncId(pub usize);

/// Stable identity of one operation: a call site is `(function, position)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OpRef {
    pub func: FuncId,
    pub index: usize,
}

/// A function with its operations in program order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Function {
    pub symbol: String,
    #[serde(default)]
    pub ops: Vec<Operation>,
}

/// One operation, with an optional `file:line` source location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    #[serde(flatten)]
    pub kind: OpKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<String>,
}

/// The low-level encodings an operation can have. `Call` and `Invoke` are
/// both call-shaped; `Invoke` is the variant with exceptional/ordinary
/// successors. Everything else is `Other` and ignored by the matcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum OpKind {
    Call {
        callee: Callee,
        #[serde(default)]
        args: Vec<ValueId>,
    },
    Invoke {
        callee: Callee,
        #[serde(default)]
        args: Vec<ValueId>,
    },
    Other,
}

impl OpKind {
    /// Callee and argument operands, for call-shaped operations.
    pub fn call_parts(&self) -> Option<(&Callee, &[ValueId])> {
        match self {
            OpKind::Call { callee, args } | OpKind::Invoke { callee, args } => {
                Some((callee, args))
            }
            OpKind::Other => None,
        }
    }
}

/// Callee encoding: a plain symbol reference, or a call through a value
/// (which may still turn out to name exactly one concrete function).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Callee {
    Symbol { symbol: String },
    Value { value: ValueId },
}

/// An entry in the value table. `Flow` carries the reaching definitions the
/// external value-flow analysis computed for a temporary; `Opaque` marks a
/// value only known at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValueKind {
    ConstInt { value: i64 },
    ConstStr { value: String },
    AddrOf { target: ValueId },
    FuncRef { symbol: String },
    Flow { defs: Vec<ValueId> },
    Opaque,
}

/// The whole-program graph: functions keyed by symbol plus the value table.
#[derive(Debug, Default)]
pub struct ProgramGraph {
    functions: Vec<Function>,
    values: Vec<ValueKind>,
    by_symbol: HashMap<String, FuncId>,
}

impl ProgramGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a function. The first definition of a symbol wins; later
    /// duplicates (e.g. the same function in two artifact modules) keep
    /// their ops but are not reachable by symbol lookup.
    pub fn push_function(&mut self, function: Function) -> FuncId {
        let id = FuncId(self.functions.len());
        self.by_symbol
            .entry(function.symbol.clone())
            .or_insert(id);
        self.functions.push(function);
        id
    }

    pub fn push_value(&mut self, value: ValueKind) -> ValueId {
        let id = ValueId(self.values.len() as u32);
        self.values.push(value);
        id
    }

    pub fn function_by_symbol(&self, symbol: &str) -> Option<FuncId> {
        self.by_symbol.get(symbol).copied()
    }

    pub fn function(&self, id: FuncId) -> &Function {
        &self.functions[id.0]
    }

    /// Dereference an operation handle. Handles not produced against this
    /// graph are a contract violation and panic.
    pub fn operation(&self, op: OpRef) -> &Operation {
        &self.functions[op.func.0].ops[op.index]
    }

    pub fn value(&self, id: ValueId) -> &ValueKind {
        &self.values[id.0 as usize]
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    pub fn value_count(&self) -> usize {
        self.values.len()
    }

    /// Resolve a callee operand to a single concrete function, if every
    /// reaching definition names the same one. Any constant or opaque
    /// definition on the way disqualifies the call from being direct.
    pub fn single_callee(&self, value: ValueId) -> Option<&str> {
        let mut seen: HashSet<ValueId> = HashSet::new();
        let mut stack = vec![value];
        let mut found: Option<&str> = None;

        while let Some(v) = stack.pop() {
            if !seen.insert(v) {
                continue;
            }
            match self.value(v) {
                ValueKind::FuncRef { symbol } => match found {
                    Some(prev) if prev == symbol => {}
                    Some(_) => return None,
                    None => found = Some(symbol),
                },
                ValueKind::Flow { defs } => stack.extend(defs.iter().copied()),
                ValueKind::AddrOf { target } => stack.push(*target),
                ValueKind::ConstInt { .. } | ValueKind::ConstStr { .. } | ValueKind::Opaque => {
                    return None
                }
            }
        }
        found
    }
}
