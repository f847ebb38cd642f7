//! Report Exporters
//!
//! Text is the human-facing audit report, one block per catalog entry in
//! discovery order. JSON carries the same data for downstream tooling.

use crate::application::{CallSiteReport, EntryAudit};
use crate::ports::ReportExporter;
use serde::Serialize;
use std::io::Write;

pub struct TextReporter;

impl ReportExporter for TextReporter {
    fn export(&self, audits: &[EntryAudit], out: &mut dyn Write) -> anyhow::Result<()> {
        for audit in audits {
            writeln!(out, "id: {}, name: {} {{", audit.entry.id, audit.entry.name)?;
            match &audit.outcome {
                Err(e) => {
                    writeln!(out, "  error: {}", e)?;
                }
                Ok(sites) => {
                    for site in sites {
                        write_site(site, out)?;
                    }
                    writeln!(out, "  {} call site(s)", sites.len())?;
                }
            }
            writeln!(out, "}}")?;
        }
        Ok(())
    }
}

fn write_site(site: &CallSiteReport, out: &mut dyn Write) -> std::io::Result<()> {
    writeln!(out, "  {}", site.loc.as_deref().unwrap_or("<unknown location>"))?;
    let record = &site.record;
    if !record.resolved {
        writeln!(out, "    unresolved")?;
    }
    if let Some(code) = record.code {
        writeln!(out, "    ec: {}", code)?;
    }
    if let Some(message) = &record.message {
        writeln!(out, "    message: {}", message)?;
    }
    Ok(())
}

// ============================================================================
// JSON report
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ReportDto {
    pub entries: Vec<EntryDto>,
}

#[derive(Debug, Serialize)]
pub struct EntryDto {
    pub id: i64,
    pub name: String,
    pub symbol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub sites: Vec<SiteDto>,
}

#[derive(Debug, Serialize)]
pub struct SiteDto {
    pub loc: Option<String>,
    pub code: Option<i64>,
    pub message: Option<String>,
    pub resolved: bool,
}

impl From<&EntryAudit> for EntryDto {
    fn from(audit: &EntryAudit) -> Self {
        let (error, sites) = match &audit.outcome {
            Err(e) => (Some(e.to_string()), Vec::new()),
            Ok(sites) => (
                None,
                sites
                    .iter()
                    .map(|s| SiteDto {
                        loc: s.loc.clone(),
                        code: s.record.code,
                        message: s.record.message.clone(),
                        resolved: s.record.resolved,
                    })
                    .collect(),
            ),
        };
        EntryDto {
            id: audit.entry.id,
            name: audit.entry.name.clone(),
            symbol: audit.entry.symbol.clone(),
            error,
            sites,
        }
    }
}

pub struct JsonReporter;

impl ReportExporter for JsonReporter {
    fn export(&self, audits: &[EntryAudit], out: &mut dyn Write) -> anyhow::Result<()> {
        let dto = ReportDto {
            entries: audits.iter().map(EntryDto::from).collect(),
        };
        serde_json::to_writer_pretty(&mut *out, &dto)?;
        writeln!(out)?;
        Ok(())
    }
}
