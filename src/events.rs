use crate::enrich::EnrichedMessage;
use crate::state::{Phase, ProcessorRecord};
use crate::stats::StatsSnapshot;

/// Terminal outcome for a processed message.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome {
    AutoResolved,
    Escalated,
}

impl Outcome {
    pub fn for_message(message: &EnrichedMessage) -> Self {
        if message.escalated {
            Outcome::Escalated
        } else {
            Outcome::AutoResolved
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Outcome::AutoResolved => "auto draft",
            Outcome::Escalated => "human handoff",
        }
    }
}

/// Rendering collaborator. The engine reports everything observable through
/// these callbacks and knows nothing about what the sink does with them.
/// All methods default to no-ops so sinks implement only what they draw.
pub trait ReportSink {
    fn on_arrival(&mut self, message: &EnrichedMessage, queue_depth: usize) {
        let _ = (message, queue_depth);
    }

    /// Fired on every phase transition. The Thinking→Streaming transition is
    /// the moment triage/routing/draft metadata becomes visible.
    fn on_phase_change(&mut self, record: &ProcessorRecord, message: &EnrichedMessage, phase: Phase) {
        let _ = (record, message, phase);
    }

    fn on_token_revealed(&mut self, message: &EnrichedMessage, partial_text: &str) {
        let _ = (message, partial_text);
    }

    /// Fired exactly once per message, when streaming completes.
    fn on_outcome_decided(&mut self, message: &EnrichedMessage, outcome: Outcome) {
        let _ = (message, outcome);
    }

    fn on_completion(&mut self, message: &EnrichedMessage, snapshot: &StatsSnapshot) {
        let _ = (message, snapshot);
    }

    fn on_stats_snapshot(&mut self, snapshot: &StatsSnapshot) {
        let _ = snapshot;
    }
}

/// Sink that ignores everything; useful for headless drains and benches.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl ReportSink for NullSink {}
