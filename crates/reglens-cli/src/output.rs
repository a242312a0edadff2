//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use reglens_analysis::{
    ChangeHistoryEntry, ChangeReport, ConflictSummary, ConflictWarning, DocumentRelationshipSummary,
    DuplicatePair, SimilarityBand,
};
use reglens_domain::{
    ChangeKind, ChangeResult, DocumentId, DocumentKey, Relationship, RelationshipCandidate,
    RelationshipKind,
};
use reglens_sweep::BulkResult;
use serde_json::json;
use std::collections::HashMap;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Document keys by id, used to label relationship endpoints.
pub type Labels = HashMap<DocumentId, DocumentKey>;

fn label(labels: &Labels, id: DocumentId) -> String {
    labels
        .get(&id)
        .map(|k| k.to_string())
        .unwrap_or_else(|| format!("#{}", id))
}

fn kind_label(kind: &RelationshipKind) -> String {
    match kind.conflict_severity() {
        Some(severity) => format!("{} ({})", kind.relationship_type(), severity),
        None => kind.relationship_type().to_string(),
    }
}

fn score_label(score: Option<f64>) -> String {
    score.map(|s| format!("{:.3}", s)).unwrap_or_else(|| "-".to_string())
}

fn candidate_json(c: &RelationshipCandidate, labels: &Labels) -> serde_json::Value {
    json!({
        "source": label(labels, c.source),
        "target": label(labels, c.target),
        "relationship_type": c.kind.relationship_type().as_str(),
        "conflict_severity": c.kind.conflict_severity().map(|s| s.as_str()),
        "similarity_score": c.similarity_score,
        "overlap_details": c.overlap_details,
        "detected_by": c.detected_by.as_str(),
    })
}

fn relationship_json(r: &Relationship, labels: &Labels) -> serde_json::Value {
    json!({
        "id": r.id.to_string(),
        "source": label(labels, r.source),
        "target": label(labels, r.target),
        "relationship_type": r.kind.relationship_type().as_str(),
        "conflict_severity": r.kind.conflict_severity().map(|s| s.as_str()),
        "similarity_score": r.similarity_score,
        "overlap_details": r.overlap_details,
        "detected_by": r.detected_by.as_str(),
        "is_confirmed": r.is_confirmed,
        "detected_at": r.detected_at,
    })
}

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format a change classification.
    pub fn format_change(&self, key: &DocumentKey, result: &ChangeResult) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let details = result.details.as_ref().map(|d| {
                    json!({
                        "title": d.title.as_ref().map(|c| json!({ "old": c.old, "new": c.new })),
                        "agency": d.agency.as_ref().map(|c| json!({ "old": c.old, "new": c.new })),
                        "content": {
                            "old_length": d.content.old_length,
                            "new_length": d.content.new_length,
                            "old_word_count": d.content.old_word_count,
                            "new_word_count": d.content.new_word_count,
                            "similarity_percentage": d.content.similarity_percentage,
                        }
                    })
                });
                Ok(serde_json::to_string_pretty(&json!({
                    "document": key.to_string(),
                    "change_type": result.kind.as_str(),
                    "previous_fingerprint": result.previous_fingerprint,
                    "new_fingerprint": result.new_fingerprint,
                    "description": result.description,
                    "details": details,
                }))?)
            }
            OutputFormat::Quiet => Ok(result.kind.to_string()),
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["Field", "Value"]);
                builder.push_record(["Document".to_string(), key.to_string()]);
                builder.push_record(["Change".to_string(), self.change_kind(result.kind)]);
                builder.push_record(["Description", result.description.as_str()]);
                if let Some(fp) = &result.previous_fingerprint {
                    builder.push_record(["Previous fingerprint", fp.get(..16).unwrap_or(fp)]);
                }
                if let Some(fp) = &result.new_fingerprint {
                    builder.push_record(["New fingerprint", fp.get(..16).unwrap_or(fp)]);
                }
                if let Some(details) = &result.details {
                    if let Some(title) = &details.title {
                        builder.push_record(["Title".to_string(), format!("{} → {}", title.old, title.new)]);
                    }
                    if let Some(agency) = &details.agency {
                        builder.push_record(["Agency".to_string(), format!("{} → {}", agency.old, agency.new)]);
                    }
                    let c = &details.content;
                    builder.push_record([
                        "Length".to_string(),
                        format!("{} → {} chars", c.old_length, c.new_length),
                    ]);
                    builder.push_record([
                        "Words".to_string(),
                        format!("{} → {}", c.old_word_count, c.new_word_count),
                    ]);
                    builder.push_record([
                        "Similarity".to_string(),
                        format!("{:.1}%", c.similarity_percentage),
                    ]);
                }
                Ok(self.render(builder))
            }
        }
    }

    /// Format the per-document classifications of an import.
    pub fn format_import(&self, rows: &[(DocumentKey, ChangeKind)], stored: usize) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let documents: Vec<_> = rows
                    .iter()
                    .map(|(key, kind)| json!({ "document": key.to_string(), "change_type": kind.as_str() }))
                    .collect();
                Ok(serde_json::to_string_pretty(&json!({
                    "documents": documents,
                    "stored": stored,
                }))?)
            }
            OutputFormat::Quiet => Ok(rows
                .iter()
                .filter(|(_, kind)| kind.requires_write())
                .map(|(key, _)| key.to_string())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if rows.is_empty() {
                    return Ok(self.colorize("No documents in input.", "yellow"));
                }
                let mut builder = Builder::default();
                builder.push_record(["Document", "Change"]);
                for (key, kind) in rows {
                    builder.push_record([key.to_string(), self.change_kind(*kind)]);
                }
                Ok(format!(
                    "{}\n{}",
                    self.render(builder),
                    self.success(&format!("Stored {} of {} document(s)", stored, rows.len()))
                ))
            }
        }
    }

    /// Format a similarity score.
    pub fn format_similarity(&self, score: f64, band: SimilarityBand) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
                "similarity": score,
                "band": band.description(),
            }))?),
            OutputFormat::Quiet => Ok(format!("{:.4}", score)),
            OutputFormat::Table => Ok(format!("Similarity: {:.4} ({})", score, band)),
        }
    }

    /// Format relationship candidates.
    pub fn format_candidates(&self, candidates: &[RelationshipCandidate], labels: &Labels) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let values: Vec<_> = candidates.iter().map(|c| candidate_json(c, labels)).collect();
                Ok(serde_json::to_string_pretty(&values)?)
            }
            OutputFormat::Quiet => Ok(candidates
                .iter()
                .map(|c| {
                    format!(
                        "{}\t{}\t{}",
                        label(labels, c.source),
                        label(labels, c.target),
                        c.kind.relationship_type()
                    )
                })
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if candidates.is_empty() {
                    return Ok(self.colorize("No relationships detected.", "yellow"));
                }
                let mut builder = Builder::default();
                builder.push_record(["Source", "Target", "Type", "Similarity", "Detected by"]);
                for c in candidates {
                    builder.push_record([
                        label(labels, c.source),
                        label(labels, c.target),
                        self.kind(&c.kind),
                        score_label(c.similarity_score),
                        c.detected_by.to_string(),
                    ]);
                }
                Ok(self.render(builder))
            }
        }
    }

    /// Format the aggregate of a bulk run.
    pub fn format_bulk(&self, result: &BulkResult) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let partitions: serde_json::Map<String, serde_json::Value> = result
                    .per_partition
                    .iter()
                    .map(|(p, outcome)| {
                        (
                            p.to_string(),
                            json!({
                                "completed": outcome.is_completed(),
                                "relationships": outcome.relationships(),
                                "errors": outcome.errors(),
                                "status": outcome.to_string(),
                            }),
                        )
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&json!({
                    "requested": result.requested,
                    "processed": result.processed,
                    "total_relationships": result.total_relationships,
                    "errors": result.errors,
                    "cancelled": result.cancelled(),
                    "dry_run": result.dry_run,
                    "duration_ms": result.duration.as_millis() as u64,
                    "partitions": partitions,
                }))?)
            }
            OutputFormat::Quiet => Ok(format!("{} {}", result.total_relationships, result.errors)),
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["Partition", "Result"]);
                for (partition, outcome) in &result.per_partition {
                    let status = if outcome.is_completed() {
                        outcome.to_string()
                    } else {
                        self.colorize(&outcome.to_string(), "red")
                    };
                    builder.push_record([partition.to_string(), status]);
                }
                let verb = if result.dry_run { "Would create" } else { "Created" };
                let summary = format!(
                    "{} {} relationship(s); {}/{} partitions processed, {} error(s) in {:.2}s",
                    verb,
                    result.total_relationships,
                    result.processed,
                    result.requested,
                    result.errors,
                    result.duration.as_secs_f64()
                );
                let summary = if result.errors > 0 {
                    self.warning(&summary)
                } else {
                    self.success(&summary)
                };
                Ok(format!("{}\n{}", self.render(builder), summary))
            }
        }
    }

    /// Format duplicate pairs.
    pub fn format_duplicates(&self, pairs: &[DuplicatePair]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let values: Vec<_> = pairs
                    .iter()
                    .map(|p| {
                        json!({
                            "first": p.first.to_string(),
                            "second": p.second.to_string(),
                            "similarity": p.score,
                            "band": p.band.description(),
                        })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&values)?)
            }
            OutputFormat::Quiet => Ok(pairs
                .iter()
                .map(|p| format!("{}\t{}\t{:.4}", p.first, p.second, p.score))
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if pairs.is_empty() {
                    return Ok(self.colorize("No duplicates found.", "yellow"));
                }
                let mut builder = Builder::default();
                builder.push_record(["First", "Second", "Similarity", "Band"]);
                for p in pairs {
                    builder.push_record([
                        p.first.to_string(),
                        p.second.to_string(),
                        format!("{:.3}", p.score),
                        p.band.to_string(),
                    ]);
                }
                Ok(self.render(builder))
            }
        }
    }

    /// Format the corpus-wide conflict summary.
    pub fn format_conflict_summary(&self, summary: &ConflictSummary) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let by_severity: serde_json::Map<String, serde_json::Value> = summary
                    .by_severity
                    .iter()
                    .map(|(s, n)| (s.as_str().to_string(), json!(n)))
                    .collect();
                Ok(serde_json::to_string_pretty(&json!({
                    "total_relationships": summary.total_relationships,
                    "total_conflicts": summary.total_conflicts(),
                    "conflicts_by_severity": by_severity,
                    "unconfirmed": summary.unconfirmed,
                }))?)
            }
            OutputFormat::Quiet => Ok(summary.total_conflicts().to_string()),
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["Severity", "Conflicts"]);
                for (severity, count) in &summary.by_severity {
                    let name = if severity.is_high() && *count > 0 {
                        self.colorize(severity.as_str(), "red")
                    } else {
                        severity.to_string()
                    };
                    builder.push_record([name, count.to_string()]);
                }
                Ok(format!(
                    "{}\n{}",
                    self.render(builder),
                    self.info(&format!(
                        "{} relationship(s), {} unconfirmed",
                        summary.total_relationships, summary.unconfirmed
                    ))
                ))
            }
        }
    }

    /// Format the relationships of one document.
    pub fn format_document_summary(
        &self,
        summary: &DocumentRelationshipSummary,
        labels: &Labels,
    ) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let by_type: serde_json::Map<String, serde_json::Value> = summary
                    .by_type
                    .iter()
                    .map(|(t, n)| (t.as_str().to_string(), json!(n)))
                    .collect();
                let by_severity: serde_json::Map<String, serde_json::Value> = summary
                    .conflicts_by_severity
                    .iter()
                    .map(|(s, n)| (s.as_str().to_string(), json!(n)))
                    .collect();
                let relationships: Vec<_> = summary
                    .relationships
                    .iter()
                    .map(|r| relationship_json(r, labels))
                    .collect();
                Ok(serde_json::to_string_pretty(&json!({
                    "document": summary.key.to_string(),
                    "title": summary.title,
                    "total_relationships": summary.total_relationships,
                    "total_conflicts": summary.total_conflicts,
                    "by_type": by_type,
                    "conflicts_by_severity": by_severity,
                    "has_high_severity_conflicts": summary.has_high_severity_conflicts,
                    "relationships": relationships,
                }))?)
            }
            OutputFormat::Quiet => Ok(summary.total_relationships.to_string()),
            OutputFormat::Table => {
                let mut out = format!(
                    "{} {}: {} relationship(s), {} conflict(s)\n",
                    summary.key, summary.title, summary.total_relationships, summary.total_conflicts
                );
                if summary.has_high_severity_conflicts {
                    out.push_str(&self.warning("High severity conflicts present"));
                    out.push('\n');
                }
                if summary.relationships.is_empty() {
                    out.push_str(&self.colorize("No relationships recorded.", "yellow"));
                    return Ok(out);
                }
                let mut builder = Builder::default();
                builder.push_record(["With", "Type", "Similarity", "Confirmed"]);
                for r in &summary.relationships {
                    let other = if labels.get(&r.source) == Some(&summary.key) {
                        r.target
                    } else {
                        r.source
                    };
                    builder.push_record([
                        label(labels, other),
                        self.kind(&r.kind),
                        score_label(r.similarity_score),
                        (if r.is_confirmed { "yes" } else { "no" }).to_string(),
                    ]);
                }
                out.push_str(&self.render(builder));
                Ok(out)
            }
        }
    }

    /// Format a change report.
    pub fn format_change_report(&self, report: &ChangeReport, days: u64) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let by_agency: serde_json::Map<String, serde_json::Value> = report
                    .by_agency
                    .iter()
                    .map(|(a, n)| (a.clone(), json!(n)))
                    .collect();
                let by_partition: serde_json::Map<String, serde_json::Value> = report
                    .by_partition
                    .iter()
                    .map(|(p, n)| (p.to_string(), json!(n)))
                    .collect();
                let recent: Vec<_> = report
                    .recent
                    .iter()
                    .map(|(key, at)| json!({ "document": key.to_string(), "updated_at": at }))
                    .collect();
                Ok(serde_json::to_string_pretty(&json!({
                    "period_days": days,
                    "since": report.since,
                    "total_changes": report.total_changes,
                    "by_agency": by_agency,
                    "by_partition": by_partition,
                    "recent": recent,
                }))?)
            }
            OutputFormat::Quiet => Ok(report.total_changes.to_string()),
            OutputFormat::Table => {
                if report.total_changes == 0 {
                    return Ok(self.colorize(&format!("No changes in the last {} day(s).", days), "yellow"));
                }
                let mut builder = Builder::default();
                builder.push_record(["Agency", "Changes"]);
                for (agency, count) in &report.by_agency {
                    builder.push_record([agency.clone(), count.to_string()]);
                }
                Ok(format!(
                    "{}\n{}",
                    self.info(&format!(
                        "{} document(s) changed in the last {} day(s) across {} partition(s)",
                        report.total_changes,
                        days,
                        report.by_partition.len()
                    )),
                    self.render(builder)
                ))
            }
        }
    }

    /// Format the change history of one document.
    pub fn format_history(
        &self,
        key: &DocumentKey,
        history: &[ChangeHistoryEntry],
        days: u64,
    ) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let entries: Vec<_> = history
                    .iter()
                    .map(|e| {
                        json!({
                            "document_id": e.document.value(),
                            "changed_at": e.changed_at,
                            "change_type": e.action.to_string(),
                            "fingerprint": e.fingerprint,
                            "word_count": e.word_count,
                        })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&json!({
                    "document": key.to_string(),
                    "period_days": days,
                    "history": entries,
                }))?)
            }
            OutputFormat::Quiet => Ok(history
                .iter()
                .map(|e| format!("{}\t{}", e.changed_at, e.action))
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if history.is_empty() {
                    return Ok(self.colorize(
                        &format!("No changes to {} in the last {} day(s).", key, days),
                        "yellow",
                    ));
                }
                let mut builder = Builder::default();
                builder.push_record(["Changed At", "Change", "Words", "Fingerprint"]);
                for e in history {
                    builder.push_record([
                        e.changed_at.to_string(),
                        e.action.to_string(),
                        e.word_count.to_string(),
                        e.fingerprint.get(..16).unwrap_or(e.fingerprint.as_str()).to_string(),
                    ]);
                }
                Ok(self.render(builder))
            }
        }
    }

    /// Format the conflicts touching one document.
    pub fn format_conflict_warnings(&self, key: &DocumentKey, warnings: &[ConflictWarning]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let entries: Vec<_> = warnings
                    .iter()
                    .map(|w| {
                        json!({
                            "conflict_id": w.relationship.to_string(),
                            "conflicting_document": w.other_key.as_ref().map(|k| k.to_string()),
                            "conflicting_title": w.other_title,
                            "severity": w.severity.as_str(),
                            "similarity_score": w.similarity_score,
                            "details": w.details,
                            "is_confirmed": w.is_confirmed,
                            "detected_at": w.detected_at,
                        })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&json!({
                    "document": key.to_string(),
                    "conflicts": entries,
                }))?)
            }
            OutputFormat::Quiet => Ok(warnings
                .iter()
                .map(|w| {
                    let other = w.other_key.as_ref().map(|k| k.to_string());
                    format!("{}\t{}", other.unwrap_or_else(|| format!("#{}", w.other)), w.severity)
                })
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if warnings.is_empty() {
                    return Ok(self.success(&format!("No conflicts recorded for {}", key)));
                }
                let mut builder = Builder::default();
                builder.push_record(["With", "Title", "Severity", "Similarity", "Confirmed"]);
                for w in warnings {
                    let severity = if w.severity.is_high() {
                        self.colorize(w.severity.as_str(), "red")
                    } else {
                        w.severity.to_string()
                    };
                    builder.push_record([
                        w.other_key
                            .as_ref()
                            .map(|k| k.to_string())
                            .unwrap_or_else(|| format!("#{}", w.other)),
                        w.other_title.clone().unwrap_or_else(|| "Unknown".to_string()),
                        severity,
                        score_label(w.similarity_score),
                        (if w.is_confirmed { "yes" } else { "no" }).to_string(),
                    ]);
                }
                Ok(format!(
                    "{}\n{}",
                    self.warning(&format!("{} conflict(s) for {}", warnings.len(), key)),
                    self.render(builder)
                ))
            }
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn change_kind(&self, kind: ChangeKind) -> String {
        let color = match kind {
            ChangeKind::New => "green",
            ChangeKind::ContentChanged => "yellow",
            ChangeKind::MetadataChanged => "cyan",
            ChangeKind::NoChange => "",
        };
        self.colorize(kind.as_str(), color)
    }

    fn kind(&self, kind: &RelationshipKind) -> String {
        match kind {
            RelationshipKind::Conflicting(_) => self.colorize(&kind_label(kind), "red"),
            RelationshipKind::Redundant => self.colorize(&kind_label(kind), "magenta"),
            _ => kind_label(kind),
        }
    }

    fn render(&self, builder: Builder) -> String {
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            "magenta" => text.magenta().to_string(),
            _ => text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reglens_analysis::HistoryAction;
    use reglens_domain::{ConflictSeverity, DetectionMethod, PartitionId, RelationshipId};
    use std::collections::BTreeMap;

    fn key(part: &str) -> DocumentKey {
        DocumentKey::new(PartitionId::new(29).unwrap(), part)
    }

    fn candidates() -> (Vec<RelationshipCandidate>, Labels) {
        let a = DocumentId::from_value(1);
        let b = DocumentId::from_value(2);
        let candidate = RelationshipCandidate::new(
            a,
            b,
            RelationshipKind::Conflicting(ConflictSeverity::Medium),
            Some(0.42),
            "Potential conflict",
            DetectionMethod::KeywordConflictAnalysis,
        );
        let labels = [(a, key("1910")), (b, key("1926"))].into_iter().collect();
        (vec![candidate], labels)
    }

    #[test]
    fn test_candidates_json() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let (candidates, labels) = candidates();
        let output = formatter.format_candidates(&candidates, &labels).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value[0]["source"], "29:1910");
        assert_eq!(value[0]["relationship_type"], "CONFLICTING");
        assert_eq!(value[0]["conflict_severity"], "MEDIUM");
        assert_eq!(value[0]["detected_by"], "KEYWORD_CONFLICT_ANALYSIS");
    }

    #[test]
    fn test_candidates_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let (candidates, labels) = candidates();
        let output = formatter.format_candidates(&candidates, &labels).unwrap();
        assert!(output.contains("CONFLICTING (MEDIUM)"));
        assert!(output.contains("0.420"));
        assert!(output.contains("29:1926"));
    }

    #[test]
    fn test_unlabelled_endpoint_uses_id() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let (candidates, _) = candidates();
        let output = formatter.format_candidates(&candidates, &Labels::new()).unwrap();
        assert_eq!(output, "#1\t#2\tCONFLICTING");
    }

    #[test]
    fn test_empty_candidates() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_candidates(&[], &Labels::new()).unwrap();
        assert!(output.contains("No relationships detected"));
    }

    #[test]
    fn test_new_document_change() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter
            .format_change(&key("1910"), &ChangeResult::new_document())
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["change_type"], "NEW");
        assert!(value["previous_fingerprint"].is_null());
        assert!(value["details"].is_null());
    }

    #[test]
    fn test_import_quiet_lists_written_keys() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let rows = vec![
            (key("1"), ChangeKind::New),
            (key("2"), ChangeKind::NoChange),
            (key("3"), ChangeKind::MetadataChanged),
        ];
        let output = formatter.format_import(&rows, 2).unwrap();
        assert_eq!(output, "29:1\n29:3");
    }

    #[test]
    fn test_conflict_summary_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let summary = ConflictSummary {
            by_severity: ConflictSeverity::ALL.iter().map(|s| (*s, 0)).collect::<BTreeMap<_, _>>(),
            unconfirmed: 3,
            total_relationships: 3,
        };
        let output = formatter.format_conflict_summary(&summary).unwrap();
        assert!(output.contains("CRITICAL"));
        assert!(output.contains("3 relationship(s), 3 unconfirmed"));
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.success("test"), "✓ test");
        assert_eq!(formatter.warning("test"), "⚠ test");
    }

    #[test]
    fn test_history_json() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let history = vec![ChangeHistoryEntry {
            document: DocumentId::from_value(7),
            changed_at: 1_700_000_000,
            fingerprint: "ab".repeat(32),
            word_count: 12,
            action: HistoryAction::Updated,
        }];
        let output = formatter.format_history(&key("1910"), &history, 30).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["document"], "29:1910");
        assert_eq!(value["history"][0]["change_type"], "UPDATED");
        assert_eq!(value["history"][0]["word_count"], 12);
    }

    #[test]
    fn test_conflict_warnings_table_marks_unknown_titles() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let warning = ConflictWarning {
            relationship: RelationshipId::new(),
            other: DocumentId::from_value(9),
            other_key: None,
            other_title: None,
            severity: ConflictSeverity::High,
            similarity_score: Some(0.5),
            details: "Potential conflict".to_string(),
            is_confirmed: false,
            detected_at: 1,
        };
        let output = formatter.format_conflict_warnings(&key("1910"), &[warning]).unwrap();
        assert!(output.contains("1 conflict(s) for 29:1910"));
        assert!(output.contains("Unknown"));
        assert!(output.contains("#9"));
        assert!(output.contains("HIGH"));
    }
}
