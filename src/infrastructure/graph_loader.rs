//! Program Artifact Loader
//!
//! Reads pre-built program-graph modules (the serialized output of the
//! external IR/value-flow pipeline) and merges them into one `ProgramGraph`.
//! Files are memory-mapped while parsing. Value ids are module-local in the
//! documents, so merging shifts them by the running size of the value table.

use anyhow::{Context, Result};
use memmap2::Mmap;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

use crate::domain::graph::{Callee, Function, OpKind, ProgramGraph, ValueId, ValueKind};

/// One serialized program-graph module.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GraphModule {
    #[serde(default)]
    pub functions: Vec<Function>,
    #[serde(default)]
    pub values: Vec<ValueKind>,
}

/// Load and merge all artifact modules into a single graph.
pub fn load_artifacts<P: AsRef<Path>>(paths: &[P]) -> Result<ProgramGraph> {
    let mut graph = ProgramGraph::new();
    for path in paths {
        let module = read_module(path.as_ref())?;
        merge_module(&mut graph, module);
    }
    println!(
        "[Graph] Loaded {} function(s), {} value(s) from {} module(s)",
        graph.function_count(),
        graph.value_count(),
        paths.len()
    );
    Ok(graph)
}

fn read_module(path: &Path) -> Result<GraphModule> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open program artifact {}", path.display()))?;
    // Read-only map of an immutable input file.
    let mmap = unsafe { Mmap::map(&file) }
        .with_context(|| format!("Failed to map program artifact {}", path.display()))?;
    let module: GraphModule = serde_json::from_slice(&mmap)
        .with_context(|| format!("Malformed program artifact {}", path.display()))?;
    check_value_refs(&module)
        .with_context(|| format!("Malformed program artifact {}", path.display()))?;
    Ok(module)
}

/// Value ids in a module are module-local and must index the module's own
/// value table. A dangling id would otherwise only surface deep inside
/// matching or extraction, so it is rejected before the module is merged.
fn check_value_refs(module: &GraphModule) -> Result<()> {
    let limit = module.values.len() as u32;
    let check = |id: ValueId| -> Result<()> {
        if id.0 < limit {
            Ok(())
        } else {
            anyhow::bail!(
                "value id {} is out of range (value table holds {} entries)",
                id.0,
                limit
            )
        }
    };

    for value in &module.values {
        match value {
            ValueKind::AddrOf { target } => check(*target)?,
            ValueKind::Flow { defs } => {
                for def in defs {
                    check(*def)?;
                }
            }
            _ => {}
        }
    }
    for function in &module.functions {
        for op in &function.ops {
            if let OpKind::Call { callee, args } | OpKind::Invoke { callee, args } = &op.kind {
                if let Callee::Value { value } = callee {
                    check(*value)?;
                }
                for arg in args {
                    check(*arg)?;
                }
            }
        }
    }
    Ok(())
}

/// Append one module to the graph, shifting its value ids past the values
/// already present.
pub fn merge_module(graph: &mut ProgramGraph, module: GraphModule) {
    let offset = graph.value_count() as u32;

    for mut value in module.values {
        shift_value_kind(&mut value, offset);
        graph.push_value(value);
    }
    for mut function in module.functions {
        for op in &mut function.ops {
            shift_op(&mut op.kind, offset);
        }
        graph.push_function(function);
    }
}

fn shift_value_kind(kind: &mut ValueKind, offset: u32) {
    match kind {
        ValueKind::AddrOf { target } => target.0 += offset,
        ValueKind::Flow { defs } => {
            for def in defs {
                def.0 += offset;
            }
        }
        _ => {}
    }
}

fn shift_op(kind: &mut OpKind, offset: u32) {
    if let OpKind::Call { callee, args } | OpKind::Invoke { callee, args } = kind {
        if let Callee::Value { value } = callee {
            value.0 += offset;
        }
        for arg in args {
            arg.0 += offset;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::graph::{Operation, ValueId};

    fn module_one() -> GraphModule {
        serde_json::from_str(
            r#"{
                "functions": [
                    {"symbol": "entry", "ops": [
                        {"op": "call", "callee": {"symbol": "emit"}, "args": [1], "loc": "a.cc:3"}
                    ]}
                ],
                "values": [
                    {"kind": "const_str", "value": "stale"},
                    {"kind": "const_int", "value": 11}
                ]
            }"#,
        )
        .unwrap()
    }

    fn module_two() -> GraphModule {
        serde_json::from_str(
            r#"{
                "functions": [
                    {"symbol": "emit", "ops": [
                        {"op": "call", "callee": {"value": 1}, "args": [0]}
                    ]}
                ],
                "values": [
                    {"kind": "const_int", "value": 22},
                    {"kind": "flow", "defs": [2]},
                    {"kind": "func_ref", "symbol": "inner"}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn merge_shifts_value_ids_per_module() {
        let mut graph = ProgramGraph::new();
        merge_module(&mut graph, module_one());
        merge_module(&mut graph, module_two());

        assert_eq!(graph.function_count(), 2);
        assert_eq!(graph.value_count(), 5);

        // Module one's ids are untouched.
        let entry = graph.function_by_symbol("entry").unwrap();
        let op: &Operation = graph.operation(crate::domain::graph::OpRef {
            func: entry,
            index: 0,
        });
        let (_, args) = op.kind.call_parts().unwrap();
        assert!(matches!(graph.value(args[0]), ValueKind::ConstInt { value: 11 }));

        // Module two's ids are shifted by two: its arg 0 is global id 2,
        // and its flow value feeds the callee which names `inner`.
        let emit = graph.function_by_symbol("emit").unwrap();
        let op = graph.operation(crate::domain::graph::OpRef {
            func: emit,
            index: 0,
        });
        let (callee, args) = op.kind.call_parts().unwrap();
        assert!(matches!(graph.value(args[0]), ValueKind::ConstInt { value: 22 }));
        match callee {
            Callee::Value { value } => {
                assert_eq!(*value, ValueId(3));
                assert_eq!(graph.single_callee(*value), Some("inner"));
            }
            Callee::Symbol { .. } => panic!("expected operand-indirected callee"),
        }
    }

    #[test]
    fn load_reads_json_artifacts_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("module.json");
        std::fs::write(&path, serde_json::to_vec(&module_one()).unwrap()).unwrap();

        let graph = load_artifacts(&[&path]).unwrap();
        assert_eq!(graph.function_count(), 1);
        assert!(graph.function_by_symbol("entry").is_some());
    }

    #[test]
    fn malformed_artifact_fails_with_context() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, b"{\"functions\": [{\"ops\": []}]}").unwrap();

        let err = load_artifacts(&[&path]).unwrap_err();
        assert!(err.to_string().contains("Malformed program artifact"));
    }

    #[test]
    fn dangling_operand_id_is_rejected_at_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dangling.json");
        // The call references value 99, but the table holds a single entry.
        std::fs::write(
            &path,
            br#"{
                "functions": [
                    {"symbol": "entry", "ops": [
                        {"op": "call", "callee": {"symbol": "emit"}, "args": [0, 99]}
                    ]}
                ],
                "values": [{"kind": "const_int", "value": 1}]
            }"#,
        )
        .unwrap();

        let err = load_artifacts(&[&path]).unwrap_err();
        let chain = format!("{err:#}");
        assert!(chain.contains("Malformed program artifact"));
        assert!(chain.contains("value id 99 is out of range"));
    }

    #[test]
    fn dangling_flow_def_is_rejected_at_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dangling_def.json");
        std::fs::write(
            &path,
            br#"{
                "functions": [],
                "values": [{"kind": "flow", "defs": [7]}]
            }"#,
        )
        .unwrap();

        let err = load_artifacts(&[&path]).unwrap_err();
        assert!(format!("{err:#}").contains("value id 7 is out of range"));
    }
}
