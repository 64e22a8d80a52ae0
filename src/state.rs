use crate::enrich::EnrichedMessage;

/// Processing phases for the single in-flight message.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Phase {
    Thinking,
    Streaming,
    Hold,
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Thinking => "thinking",
            Phase::Streaming => "streaming",
            Phase::Hold => "hold",
        }
    }
}

/// Mutable bookkeeping for the message currently being processed.
/// Created on dequeue, dropped when the hold phase completes.
#[derive(Clone, Debug)]
pub struct ProcessorRecord {
    pub message_index: usize,
    pub phase: Phase,
    pub phase_elapsed_ms: f64,
    pub started_at_sim_ms: f64,
    pub thinking_ms: f64,
    pub stream_token_interval_ms: f64,
    pub hold_after_stream_ms: f64,
    pub stream_accumulator_ms: f64,
    pub stream_cursor: usize,
    pub revealed: String,
    pub outcome_emitted: bool,
}

impl ProcessorRecord {
    pub fn new(message: &EnrichedMessage, started_at_sim_ms: f64) -> Self {
        Self {
            message_index: message.index,
            phase: Phase::Thinking,
            phase_elapsed_ms: 0.0,
            started_at_sim_ms,
            thinking_ms: message.durations.thinking_ms,
            stream_token_interval_ms: message.durations.stream_token_interval_ms,
            hold_after_stream_ms: message.durations.hold_after_stream_ms,
            stream_accumulator_ms: 0.0,
            stream_cursor: 0,
            revealed: String::new(),
            outcome_emitted: false,
        }
    }

    /// Thinking progress clamped to [0, 1].
    pub fn thinking_progress(&self) -> f64 {
        if self.thinking_ms <= 0.0 {
            return 1.0;
        }
        (self.phase_elapsed_ms / self.thinking_ms).clamp(0.0, 1.0)
    }

    /// True when any timer has gone non-finite or negative. Such a record is
    /// a programming-error-class fault and must be halted, not finalized.
    pub fn is_corrupt(&self) -> bool {
        let timers = [
            self.phase_elapsed_ms,
            self.thinking_ms,
            self.stream_token_interval_ms,
            self.hold_after_stream_ms,
            self.stream_accumulator_ms,
        ];
        timers.iter().any(|t| !t.is_finite()) || self.thinking_ms < 0.0
            || self.stream_token_interval_ms <= 0.0
            || self.hold_after_stream_ms < 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ProcessorRecord {
        ProcessorRecord {
            message_index: 0,
            phase: Phase::Thinking,
            phase_elapsed_ms: 0.0,
            started_at_sim_ms: 0.0,
            thinking_ms: 2000.0,
            stream_token_interval_ms: 50.0,
            hold_after_stream_ms: 300.0,
            stream_accumulator_ms: 0.0,
            stream_cursor: 0,
            revealed: String::new(),
            outcome_emitted: false,
        }
    }

    #[test]
    fn thinking_progress_clamps() {
        let mut rec = record();
        rec.phase_elapsed_ms = 1000.0;
        assert_eq!(rec.thinking_progress(), 0.5);
        rec.phase_elapsed_ms = 9000.0;
        assert_eq!(rec.thinking_progress(), 1.0);
    }

    #[test]
    fn nan_timers_mark_the_record_corrupt() {
        let mut rec = record();
        assert!(!rec.is_corrupt());
        rec.phase_elapsed_ms = f64::NAN;
        assert!(rec.is_corrupt());

        let mut rec = record();
        rec.thinking_ms = -1.0;
        assert!(rec.is_corrupt());

        let mut rec = record();
        rec.stream_token_interval_ms = 0.0;
        assert!(rec.is_corrupt());
    }
}
