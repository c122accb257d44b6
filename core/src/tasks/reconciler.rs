use crate::prelude::SondeResult;
use crate::tasks::record::{
    frequency_label, parse_snapshot, SkippedEntry, Snapshot, SourceKind, TaskKind, TaskRecord,
};
use crate::telemetry::{LogManager, PollMetrics};
use std::collections::HashMap;

/// Task counts above this switch the panel to the compact summary view.
pub const SUMMARY_THRESHOLD: usize = 3;

/// Status icon for a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    Idle,
    Scanning,
    Active,
}

/// Glyphs used for each [`Marker`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerSet {
    pub idle: String,
    pub scanning: String,
    pub active: String,
}

impl MarkerSet {
    pub fn glyph(&self, marker: Marker) -> &str {
        match marker {
            Marker::Idle => &self.idle,
            Marker::Scanning => &self.scanning,
            Marker::Active => &self.active,
        }
    }
}

impl Default for MarkerSet {
    fn default() -> Self {
        Self {
            idle: "○".into(),
            scanning: "◎".into(),
            active: "●".into(),
        }
    }
}

/// A classified task ready to draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskLine {
    pub identifier: String,
    pub marker: Marker,
    pub glyph: String,
    pub label: String,
}

/// Rendered task panel.
///
/// `Detail` lists each task once. `Summary` shows each task once as a glyph
/// (label in the tooltip) and once more in the expandable detail region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderView {
    Detail {
        lines: Vec<TaskLine>,
    },
    Summary {
        glyphs: Vec<TaskLine>,
        lines: Vec<TaskLine>,
    },
}

impl RenderView {
    pub fn lines(&self) -> &[TaskLine] {
        match self {
            RenderView::Detail { lines } | RenderView::Summary { lines, .. } => lines,
        }
    }

    /// Compact row entries; empty in the detail-only view.
    pub fn glyphs(&self) -> &[TaskLine] {
        match self {
            RenderView::Detail { .. } => &[],
            RenderView::Summary { glyphs, .. } => glyphs,
        }
    }

    pub fn is_summary(&self) -> bool {
        matches!(self, RenderView::Summary { .. })
    }

    pub fn summary_html(&self) -> String {
        self.glyphs()
            .iter()
            .map(|line| {
                format!(
                    "<span class='sdrinfo-icon' title='{}'>{}</span>",
                    escape_html(&line.label),
                    escape_html(&line.glyph)
                )
            })
            .collect()
    }

    pub fn detail_html(&self) -> String {
        let body: String = self
            .lines()
            .iter()
            .map(|line| {
                format!(
                    "<div class='sdrinfo-element'>{} {}</div>",
                    escape_html(&line.glyph),
                    escape_html(&line.label)
                )
            })
            .collect();
        match self {
            RenderView::Detail { .. } => body,
            RenderView::Summary { lines, .. } => format!(
                "<details class='sdrinfo-details'><summary>{} tasks</summary>{}</details>",
                lines.len(),
                body
            ),
        }
    }
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\'' => escaped.push_str("&#39;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Result of ingesting one raw poll body.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled {
    pub snapshot: Snapshot,
    pub view: RenderView,
    pub skipped: Vec<SkippedEntry>,
}

/// Turns task snapshots into the task panel.
///
/// The source kind of each identifier is resolved the first time it is seen
/// and reused on later polls.
pub struct TaskListReconciler {
    markers: MarkerSet,
    sources: HashMap<String, SourceKind>,
    metrics: PollMetrics,
    logger: LogManager,
}

impl TaskListReconciler {
    pub fn new(markers: MarkerSet) -> Self {
        Self {
            markers,
            sources: HashMap::new(),
            metrics: PollMetrics::new(),
            logger: LogManager::new("tasks"),
        }
    }

    pub fn metrics(&self) -> &PollMetrics {
        &self.metrics
    }

    fn source_kind(&mut self, identifier: &str) -> SourceKind {
        if let Some(kind) = self.sources.get(identifier) {
            return *kind;
        }
        let kind = SourceKind::classify(identifier);
        self.logger
            .record(&format!("new task source {} -> {:?}", identifier, kind));
        self.sources.insert(identifier.to_string(), kind);
        kind
    }

    fn classify(&mut self, record: &TaskRecord) -> TaskLine {
        let mut label = match self.source_kind(&record.identifier) {
            SourceKind::ExternalReceiver => format!("{} - ", record.identifier),
            SourceKind::Sdr => format!("SDR:{} - ", record.identifier),
        };

        let marker = if record.is_tuned() {
            label.push_str(&frequency_label(record.frequency_hz));
            if let Some(decoder) = &record.decoder_type {
                label.push(' ');
                label.push_str(decoder);
            }
            Marker::Active
        } else if record.kind == TaskKind::Scanning {
            label.push_str("Scan");
            Marker::Scanning
        } else {
            label.push_str("Idle");
            Marker::Idle
        };

        TaskLine {
            identifier: record.identifier.clone(),
            marker,
            glyph: self.markers.glyph(marker).to_string(),
            label,
        }
    }

    pub fn reconcile(&mut self, snapshot: &Snapshot) -> RenderView {
        let lines: Vec<TaskLine> = snapshot
            .values()
            .map(|record| self.classify(record))
            .collect();
        self.metrics.record_reconciled();
        self.logger
            .detail(&format!("reconciled {} tasks", lines.len()));

        if lines.len() > SUMMARY_THRESHOLD {
            RenderView::Summary {
                glyphs: lines.clone(),
                lines,
            }
        } else {
            RenderView::Detail { lines }
        }
    }

    /// Parses a raw `get_task_list` body and reconciles it.
    pub fn ingest(&mut self, body: &str) -> SondeResult<Reconciled> {
        let parsed = match parse_snapshot(body) {
            Ok(parsed) => parsed,
            Err(err) => {
                self.metrics.record_failed_poll();
                return Err(err);
            }
        };
        for entry in &parsed.skipped {
            self.logger.warn(&format!(
                "skipping task entry {}: {}",
                entry.identifier, entry.reason
            ));
        }
        self.metrics.record_skipped(parsed.skipped.len());

        let view = self.reconcile(&parsed.snapshot);
        Ok(Reconciled {
            snapshot: parsed.snapshot,
            view,
            skipped: parsed.skipped,
        })
    }
}

impl Default for TaskListReconciler {
    fn default() -> Self {
        Self::new(MarkerSet::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_of(records: Vec<TaskRecord>) -> Snapshot {
        records
            .into_iter()
            .map(|record| (record.identifier.clone(), record))
            .collect()
    }

    fn idle_sdrs(count: usize) -> Snapshot {
        snapshot_of((0..count).map(|i| TaskRecord::idle(i.to_string())).collect())
    }

    #[test]
    fn labels_follow_classification_rules() {
        let mut reconciler = TaskListReconciler::default();
        let snapshot = snapshot_of(vec![
            TaskRecord::decoding("0", 403_500_000.0, Some("RS41".into())),
            TaskRecord::scanning("1"),
            TaskRecord::idle("SPY-host:5555"),
        ]);
        let view = reconciler.reconcile(&snapshot);
        let labels: Vec<&str> = view.lines().iter().map(|l| l.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["SDR:0 - 403.500 RS41", "SDR:1 - Scan", "SPY-host:5555 - Idle"]
        );
        let markers: Vec<Marker> = view.lines().iter().map(|l| l.marker).collect();
        assert_eq!(markers, vec![Marker::Active, Marker::Scanning, Marker::Idle]);
    }

    #[test]
    fn frequency_takes_precedence_over_scanning() {
        let mut reconciler = TaskListReconciler::default();
        let record = TaskRecord {
            identifier: "0".into(),
            frequency_hz: 403_500_000.0,
            kind: TaskKind::Scanning,
            decoder_type: None,
        };
        let view = reconciler.reconcile(&snapshot_of(vec![record]));
        assert_eq!(view.lines()[0].marker, Marker::Active);
        assert_eq!(view.lines()[0].label, "SDR:0 - 403.500");
    }

    #[test]
    fn three_tasks_render_detail_only() {
        let mut reconciler = TaskListReconciler::default();
        let view = reconciler.reconcile(&idle_sdrs(3));
        assert!(!view.is_summary());
        assert!(view.glyphs().is_empty());
        assert_eq!(view.lines().len(), 3);
        assert_eq!(view.summary_html(), "");
    }

    #[test]
    fn four_tasks_render_summary_and_detail() {
        let mut reconciler = TaskListReconciler::default();
        let view = reconciler.reconcile(&idle_sdrs(4));
        assert!(view.is_summary());
        assert_eq!(view.glyphs().len(), 4);
        assert_eq!(view.lines().len(), 4);
        assert!(view.summary_html().contains("title='SDR:3 - Idle'"));
        assert!(view.detail_html().starts_with("<details"));
    }

    #[test]
    fn every_task_appears_once_per_region() {
        let mut reconciler = TaskListReconciler::default();
        let view = reconciler.reconcile(&idle_sdrs(6));
        for region in [view.glyphs(), view.lines()] {
            let mut ids: Vec<&str> = region.iter().map(|l| l.identifier.as_str()).collect();
            ids.sort();
            ids.dedup();
            assert_eq!(ids.len(), 6);
        }
    }

    #[test]
    fn reconcile_is_idempotent() {
        let mut reconciler = TaskListReconciler::default();
        let snapshot = snapshot_of(vec![
            TaskRecord::decoding("0", 401_500_000.0, None),
            TaskRecord::scanning("1"),
            TaskRecord::idle("2"),
            TaskRecord::idle("3"),
        ]);
        let first = reconciler.reconcile(&snapshot);
        let second = reconciler.reconcile(&snapshot);
        assert_eq!(first, second);
        assert_eq!(first.summary_html(), second.summary_html());
        assert_eq!(first.detail_html(), second.detail_html());
        assert_eq!(reconciler.metrics().snapshot().reconciled, 2);
    }

    #[test]
    fn labels_are_escaped_in_html() {
        let mut reconciler = TaskListReconciler::default();
        let view = reconciler.reconcile(&snapshot_of(vec![TaskRecord::idle("<b>")]));
        assert_eq!(
            view.detail_html(),
            "<div class='sdrinfo-element'>○ SDR:&lt;b&gt; - Idle</div>"
        );
    }

    #[test]
    fn custom_markers_are_used() {
        let markers = MarkerSet {
            idle: "I".into(),
            scanning: "S".into(),
            active: "A".into(),
        };
        let mut reconciler = TaskListReconciler::new(markers);
        let view = reconciler.reconcile(&snapshot_of(vec![TaskRecord::scanning("0")]));
        assert_eq!(view.lines()[0].glyph, "S");
    }

    #[test]
    fn ingest_counts_skipped_entries() {
        let mut reconciler = TaskListReconciler::default();
        let body = r#"{"0": {"task": "Scanning", "freq": 0}, "1": {"freq": 0}}"#;
        let reconciled = reconciler.ingest(body).unwrap();
        assert_eq!(reconciled.view.lines().len(), 1);
        assert_eq!(reconciled.skipped.len(), 1);
        assert_eq!(reconciler.metrics().snapshot().skipped_entries, 1);

        assert!(reconciler.ingest("null").is_err());
        assert_eq!(reconciler.metrics().snapshot().failed_polls, 1);
    }
}
