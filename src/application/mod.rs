//! Catalog-driven orchestration: run the matcher and extractor for each
//! selected catalog entry and collect per-entry results for the reporter.
//! Entries are independent over a read-only graph, so they run on the rayon
//! pool; collection preserves catalog order, keeping reports deterministic.

use rayon::prelude::*;

use crate::config::AuditConfig;
use crate::domain::callsite::CallSiteMatcher;
use crate::domain::catalog::{Catalog, CatalogEntry};
use crate::domain::extract::{DiagnosticExtractor, DiagnosticRecord};
use crate::domain::graph::ProgramGraph;
use crate::errors::AuditError;
use crate::ports::ValueResolver;

/// One matched call site with its extracted payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSiteReport {
    pub loc: Option<String>,
    pub record: DiagnosticRecord,
}

/// The audit result for one catalog entry. An unknown entry symbol is
/// surfaced here instead of aborting the other entries.
#[derive(Debug)]
pub struct EntryAudit {
    pub entry: CatalogEntry,
    pub outcome: Result<Vec<CallSiteReport>, AuditError>,
}

pub struct AuditUsecase<'a> {
    pub graph: &'a ProgramGraph,
    pub resolver: &'a dyn ValueResolver,
    pub config: &'a AuditConfig,
}

impl<'a> AuditUsecase<'a> {
    /// Audit the selected entries (all of them when the selection is absent
    /// or out of range).
    pub fn run(&self, catalog: &Catalog, selection: Option<i64>) -> Vec<EntryAudit> {
        let selected = catalog.select(selection);
        println!(
            "[Audit] Analyzing {} of {} catalog entries against `{}`",
            selected.len(),
            catalog.len(),
            self.config.target_symbol
        );
        selected
            .par_iter()
            .map(|entry| self.audit_entry(entry))
            .collect()
    }

    /// Audit a single entry: discovery, then extraction per matched site.
    pub fn audit_entry(&self, entry: &CatalogEntry) -> EntryAudit {
        let matcher = CallSiteMatcher::new(self.graph);
        let outcome = matcher
            .find_matches(&entry.symbol, &self.config.target_symbol)
            .map(|matches| {
                let extractor = DiagnosticExtractor::new(self.graph, self.resolver, self.config);
                matches
                    .iter()
                    .map(|site| CallSiteReport {
                        loc: site.loc.clone(),
                        record: extractor.extract(site),
                    })
                    .collect()
            });
        EntryAudit {
            entry: entry.clone(),
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::graph::{Callee, Function, OpKind, Operation, ValueKind};
    use crate::infrastructure::FlowValueResolver;

    const TARGET: &str = "emit_diag";

    fn fixture_graph() -> ProgramGraph {
        let mut g = ProgramGraph::new();
        let code = g.push_value(ValueKind::ConstInt { value: 1282 });
        let msg = g.push_value(ValueKind::ConstStr {
            value: "invalid operation".to_string(),
        });
        g.push_function(Function {
            symbol: "_Zgood".to_string(),
            ops: vec![Operation {
                kind: OpKind::Call {
                    callee: Callee::Symbol {
                        symbol: TARGET.to_string(),
                    },
                    args: vec![code, msg],
                },
                loc: Some("gl.cc:10".to_string()),
            }],
        });
        g.push_function(Function {
            symbol: "_Zquiet".to_string(),
            ops: vec![],
        });
        g
    }

    fn fixture_catalog() -> Catalog {
        Catalog {
            mappings: vec![
                CatalogEntry {
                    id: 0,
                    name: "good".to_string(),
                    symbol: "_Zgood".to_string(),
                },
                CatalogEntry {
                    id: 1,
                    name: "quiet".to_string(),
                    symbol: "_Zquiet".to_string(),
                },
                CatalogEntry {
                    id: 2,
                    name: "missing".to_string(),
                    symbol: "_Zmissing".to_string(),
                },
            ],
        }
    }

    fn usecase<'a>(
        graph: &'a ProgramGraph,
        resolver: &'a FlowValueResolver,
        config: &'a AuditConfig,
    ) -> AuditUsecase<'a> {
        AuditUsecase {
            graph,
            resolver,
            config,
        }
    }

    #[test]
    fn analyze_all_surfaces_unknown_entries_without_aborting() {
        let graph = fixture_graph();
        let resolver = FlowValueResolver::new();
        let config = AuditConfig::new(TARGET, 0, 1);
        let audits = usecase(&graph, &resolver, &config).run(&fixture_catalog(), None);

        assert_eq!(audits.len(), 3);
        let good = audits[0].outcome.as_ref().unwrap();
        assert_eq!(good.len(), 1);
        assert_eq!(good[0].record.code, Some(1282));
        assert!(good[0].record.resolved);

        assert!(audits[1].outcome.as_ref().unwrap().is_empty());
        assert_eq!(
            audits[2].outcome,
            Err(AuditError::UnknownEntryFunction("_Zmissing".to_string()))
        );
    }

    #[test]
    fn selection_narrows_to_one_entry() {
        let graph = fixture_graph();
        let resolver = FlowValueResolver::new();
        let config = AuditConfig::new(TARGET, 0, 1);
        let audits = usecase(&graph, &resolver, &config).run(&fixture_catalog(), Some(1));

        assert_eq!(audits.len(), 1);
        assert_eq!(audits[0].entry.name, "quiet");
    }

    #[test]
    fn results_keep_catalog_order() {
        let graph = fixture_graph();
        let resolver = FlowValueResolver::new();
        let config = AuditConfig::new(TARGET, 0, 1);
        let audits = usecase(&graph, &resolver, &config).run(&fixture_catalog(), Some(-1));

        let names: Vec<&str> = audits.iter().map(|a| a.entry.name.as_str()).collect();
        assert_eq!(names, ["good", "quiet", "missing"]);
    }
}
