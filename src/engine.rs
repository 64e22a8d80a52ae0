use std::collections::VecDeque;

use crate::arrivals::{next_arrival_delay_ms, INITIAL_ARRIVAL_DELAY_MS};
use crate::dataset::validate_dataset;
use crate::enrich::{enrich_messages, EnrichedMessage};
use crate::error::{Error, Result};
use crate::events::{Outcome, ReportSink};
use crate::models::Dataset;
use crate::state::{Phase, ProcessorRecord};
use crate::stats::{Stats, StatsSnapshot};

/// Upper bound on a single wall-clock frame delta, so a suspended tab (or a
/// stalled driver loop) cannot inject a huge simulated jump on resume.
pub const MAX_FRAME_DELTA_MS: f64 = 120.0;

/// The triage simulation: arrival generator, FIFO queue, single-server phase
/// state machine and live statistics. Owns all of its state; callers drive it
/// with `frame` (wall clock) or `advance` (simulated time) and observe it
/// through a `ReportSink`.
pub struct Simulation {
    messages: Vec<EnrichedMessage>,
    arrival_cursor: usize,
    next_arrival_in_ms: f64,
    queue: VecDeque<usize>,
    current: Option<ProcessorRecord>,
    stats: Stats,
    sim_time_ms: f64,
    running: bool,
    speed: f64,
    burst_mode: bool,
    last_frame_ts: Option<f64>,
}

impl Simulation {
    pub fn new(dataset: Dataset) -> Result<Self> {
        validate_dataset(&dataset)?;
        Ok(Self {
            messages: enrich_messages(dataset.messages),
            arrival_cursor: 0,
            next_arrival_in_ms: INITIAL_ARRIVAL_DELAY_MS,
            queue: VecDeque::new(),
            current: None,
            stats: Stats::default(),
            sim_time_ms: 0.0,
            running: false,
            speed: 1.0,
            burst_mode: true,
            last_frame_ts: None,
        })
    }

    pub fn start(&mut self) {
        self.running = true;
        self.last_frame_ts = None;
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Discards all in-flight state and statistics. Speed and burst-mode
    /// settings survive a reset, matching the control surface.
    pub fn reset(&mut self) {
        self.arrival_cursor = 0;
        self.next_arrival_in_ms = INITIAL_ARRIVAL_DELAY_MS;
        self.queue.clear();
        self.current = None;
        self.stats = Stats::default();
        self.sim_time_ms = 0.0;
        self.running = false;
        self.last_frame_ts = None;
    }

    pub fn set_speed(&mut self, speed: f64) -> Result<()> {
        if !speed.is_finite() || speed <= 0.0 {
            return Err(Error::InvalidSpeed(speed));
        }
        self.speed = speed;
        Ok(())
    }

    pub fn set_burst_mode(&mut self, burst_mode: bool) {
        self.burst_mode = burst_mode;
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// True once every dataset item has arrived, been processed and retired.
    pub fn is_drained(&self) -> bool {
        self.arrival_cursor >= self.messages.len() && self.queue.is_empty() && self.current.is_none()
    }

    pub fn sim_time_ms(&self) -> f64 {
        self.sim_time_ms
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn current(&self) -> Option<&ProcessorRecord> {
        self.current.as_ref()
    }

    pub fn messages(&self) -> &[EnrichedMessage] {
        &self.messages
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        self.stats
            .snapshot(self.queue.len(), self.current.is_some(), self.sim_time_ms)
    }

    /// Wall-clock driver entry point. Converts the delta since the previous
    /// frame (clamped to `MAX_FRAME_DELTA_MS`) into simulated time via the
    /// speed multiplier. Paused frames only refresh the timestamp, so no
    /// simulated time leaks across a pause.
    pub fn frame(&mut self, now_ms: f64, sink: &mut dyn ReportSink) {
        let last = self.last_frame_ts.replace(now_ms);
        if !self.running {
            return;
        }
        let raw_dt = match last {
            Some(last) => (now_ms - last).clamp(0.0, MAX_FRAME_DELTA_MS),
            None => 0.0,
        };
        if raw_dt > 0.0 {
            self.advance(raw_dt * self.speed, sink);
        }
    }

    /// Advances the simulation by `sim_dt_ms` of simulated time: arrivals
    /// first, then dequeue-if-idle, then the current item's phase machine.
    pub fn advance(&mut self, sim_dt_ms: f64, sink: &mut dyn ReportSink) {
        if !sim_dt_ms.is_finite() || sim_dt_ms < 0.0 {
            return;
        }
        self.sim_time_ms += sim_dt_ms;

        self.next_arrival_in_ms -= sim_dt_ms;
        while self.next_arrival_in_ms <= 0.0 && self.arrival_cursor < self.messages.len() {
            let index = self.arrival_cursor;
            self.arrival_cursor += 1;
            self.queue.push_back(index);
            self.stats.on_arrival(
                &self.messages[index],
                self.queue.len(),
                self.current.is_some(),
                self.sim_time_ms,
            );
            sink.on_arrival(&self.messages[index], self.queue.len());
            let snapshot = self.snapshot();
            sink.on_stats_snapshot(&snapshot);
            self.next_arrival_in_ms += next_arrival_delay_ms(
                self.arrival_cursor,
                self.stats.arrived(),
                self.sim_time_ms,
                self.burst_mode,
            );
        }

        if self.current.is_none() {
            if let Some(index) = self.queue.pop_front() {
                let record = ProcessorRecord::new(&self.messages[index], self.sim_time_ms);
                sink.on_phase_change(&record, &self.messages[index], Phase::Thinking);
                self.current = Some(record);
            }
        }

        if self.current.is_some() {
            self.advance_processor(sim_dt_ms, sink);
        }

        if self.is_drained() && self.running {
            self.running = false;
            let snapshot = self.snapshot();
            sink.on_stats_snapshot(&snapshot);
        }
    }

    fn advance_processor(&mut self, sim_dt_ms: f64, sink: &mut dyn ReportSink) {
        let Some(mut record) = self.current.take() else {
            return;
        };
        if record.is_corrupt() {
            // Programming-error-class fault: halt this item rather than let a
            // bad timer corrupt the aggregates. Recovery is reset() only.
            self.running = false;
            return;
        }
        record.phase_elapsed_ms += sim_dt_ms;

        match record.phase {
            Phase::Thinking => {
                if record.thinking_progress() >= 1.0 {
                    record.phase = Phase::Streaming;
                    record.phase_elapsed_ms = 0.0;
                    record.stream_accumulator_ms = 0.0;
                    let message = &self.messages[record.message_index];
                    sink.on_phase_change(&record, message, Phase::Streaming);
                }
                self.current = Some(record);
            }
            Phase::Streaming => {
                let message = &self.messages[record.message_index];
                let interval = record.stream_token_interval_ms;
                record.stream_accumulator_ms += sim_dt_ms;
                let batch = token_batch_size(self.speed);
                let mut advanced = false;
                while record.stream_accumulator_ms >= interval
                    && record.stream_cursor < message.tokens.len()
                {
                    record.stream_accumulator_ms -= interval;
                    for _ in 0..batch {
                        if record.stream_cursor >= message.tokens.len() {
                            break;
                        }
                        record.revealed.push_str(&message.tokens[record.stream_cursor]);
                        record.stream_cursor += 1;
                    }
                    advanced = true;
                }
                if advanced {
                    sink.on_token_revealed(message, &record.revealed);
                }

                if record.stream_cursor >= message.tokens.len() {
                    record.phase = Phase::Hold;
                    record.phase_elapsed_ms = 0.0;
                    if !record.outcome_emitted {
                        record.outcome_emitted = true;
                        sink.on_outcome_decided(message, Outcome::for_message(message));
                    }
                    sink.on_phase_change(&record, message, Phase::Hold);
                }
                self.current = Some(record);
            }
            Phase::Hold => {
                if record.phase_elapsed_ms >= record.hold_after_stream_ms {
                    self.stats.on_completion(
                        &self.messages[record.message_index],
                        self.queue.len(),
                        self.sim_time_ms,
                    );
                    let snapshot = self.snapshot();
                    let message = &self.messages[record.message_index];
                    sink.on_completion(message, &snapshot);
                    sink.on_stats_snapshot(&snapshot);
                    // record dropped: back to Idle
                } else {
                    self.current = Some(record);
                }
            }
        }
    }
}

/// Tokens revealed per streaming interval. Batches grow with the speed
/// multiplier to keep visual pacing acceptable at high speeds.
fn token_batch_size(speed: f64) -> usize {
    if speed >= 4.0 {
        3
    } else if speed >= 2.0 {
        2
    } else {
        1
    }
}
