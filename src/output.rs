use std::fmt::Write as _;

use serde::Serialize;

use crate::enrich::EnrichedMessage;
use crate::events::{Outcome, ReportSink};
use crate::models::Channel;
use crate::stats::{HistogramBucket, StatsSnapshot};

/// One finished message as it appears in the run log.
#[derive(Clone, Debug, Serialize)]
pub struct CompletionRecord {
    pub message_id: String,
    pub channel: Channel,
    pub outcome: &'static str,
    pub response_eq_secs: u32,
    pub queue: String,
    pub intent: String,
    pub satisfaction: i32,
}

/// Sink that records completions for the CLI's run log.
#[derive(Debug, Default)]
pub struct CompletionLog {
    pub completions: Vec<CompletionRecord>,
}

impl ReportSink for CompletionLog {
    fn on_completion(&mut self, message: &EnrichedMessage, _snapshot: &StatsSnapshot) {
        self.completions.push(CompletionRecord {
            message_id: message.message.message_id.clone(),
            channel: message.message.channel,
            outcome: Outcome::for_message(message).label(),
            response_eq_secs: message.response_eq_secs,
            queue: message.message.triage.queue.clone(),
            intent: message.message.triage.primary_intent.clone(),
            satisfaction: message.satisfaction,
        });
    }
}

/// Final report handed to a formatter after the engine drains.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub snapshot: StatsSnapshot,
    pub histogram: Vec<HistogramBucket>,
    pub median_response_secs: Option<u32>,
    pub completions: Vec<CompletionRecord>,
}

pub trait Formatter {
    fn write(&self, report: &RunReport) -> String;
}

pub struct HumanFormatter;
pub struct SummaryFormatter;
pub struct JsonFormatter;

impl Formatter for HumanFormatter {
    fn write(&self, report: &RunReport) -> String {
        let mut out = String::new();
        out.push_str("Completions:\n");
        for c in &report.completions {
            let _ = writeln!(
                out,
                "{} -> {} ({}, {}, {} eq)",
                c.message_id,
                c.outcome,
                c.channel.label(),
                c.queue,
                format_duration(c.response_eq_secs)
            );
        }
        out.push_str(&summary_block(report));
        out.push_str(&histogram_block(report));
        out
    }
}

impl Formatter for SummaryFormatter {
    fn write(&self, report: &RunReport) -> String {
        let mut out = summary_block(report);
        out.push_str(&histogram_block(report));
        out
    }
}

impl Formatter for JsonFormatter {
    fn write(&self, report: &RunReport) -> String {
        let mut out = serde_json::to_string_pretty(report)
            .unwrap_or_else(|err| format!("{{\"error\":\"{}\"}}", err));
        out.push('\n');
        out
    }
}

fn summary_block(report: &RunReport) -> String {
    let snap = &report.snapshot;
    let mut out = String::new();
    out.push_str("Summary:\n");
    let _ = writeln!(out, "arrived: {}", snap.arrived);
    let _ = writeln!(out, "processed: {}", snap.processed);
    let _ = writeln!(
        out,
        "auto drafts: {}{}",
        snap.auto_resolved,
        rate_suffix(snap.auto_rate)
    );
    let _ = writeln!(
        out,
        "human handoffs: {}{}",
        snap.escalated,
        rate_suffix(snap.escalation_rate)
    );
    let _ = writeln!(out, "urgent: {}", snap.urgent);
    let _ = writeln!(out, "high-intent: {}", snap.high_intent);
    let _ = writeln!(
        out,
        "under 5m: {}{}",
        snap.under_sla,
        rate_suffix(snap.under_sla_rate)
    );
    let _ = writeln!(
        out,
        "avg response (equiv): {}",
        snap.avg_response_secs
            .map(|s| format_duration(s.round() as u32))
            .unwrap_or_else(|| "-".to_string())
    );
    let _ = writeln!(
        out,
        "avg satisfaction: {}",
        snap.avg_satisfaction
            .map(|s| format!("{}", s.round()))
            .unwrap_or_else(|| "-".to_string())
    );
    let _ = writeln!(
        out,
        "avg confidence: {}",
        snap.avg_confidence
            .map(|c| format!("{}%", (c * 100.0).round()))
            .unwrap_or_else(|| "-".to_string())
    );
    let _ = writeln!(out, "hours saved vs 4h baseline: {:.1}h", snap.hours_saved_total);
    let _ = writeln!(out, "max backlog: {}", snap.max_backlog);
    if !snap.queue_counts.is_empty() {
        out.push_str("Queues:\n");
        for (queue, count) in &snap.queue_counts {
            let _ = writeln!(out, "{}: {}", queue, count);
        }
    }
    out
}

fn histogram_block(report: &RunReport) -> String {
    let mut out = String::new();
    out.push_str("Response-time histogram:\n");
    for bucket in &report.histogram {
        let _ = writeln!(
            out,
            "{}: {} auto / {} handoff",
            bucket.label, bucket.auto_resolved, bucket.escalated
        );
    }
    if let Some(median) = report.median_response_secs {
        let _ = writeln!(out, "median: {}", format_duration(median));
    }
    out
}

fn rate_suffix(rate: Option<f64>) -> String {
    match rate {
        Some(rate) => format!(" ({}%)", (rate * 100.0).round()),
        None => String::new(),
    }
}

/// `1h 02m`, `4m 05s` or `45s`, like the original demo's duration labels.
pub fn format_duration(secs: u32) -> String {
    let h = secs / 3600;
    let m = (secs % 3600) / 60;
    let s = secs % 60;
    if h > 0 {
        format!("{}h {:02}m", h, m)
    } else if m > 0 {
        format!("{}m {:02}s", m, s)
    } else {
        format!("{}s", s)
    }
}
