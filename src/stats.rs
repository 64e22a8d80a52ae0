use std::collections::{BTreeMap, VecDeque};

use serde::Serialize;

use crate::enrich::EnrichedMessage;
use crate::models::{Channel, Priority};

/// Rolling cap on individual response-time samples (histogram input).
pub const MAX_RESPONSE_SAMPLES: usize = 500;
/// Cap on the periodic history used for trend charts.
pub const HISTORY_LIMIT: usize = 160;

/// SLA boundary the storyboard highlights (5 minutes).
pub const SLA_TARGET_SECS: u32 = 300;

#[derive(Clone, Copy, Debug, Serialize)]
pub struct ResponseSample {
    pub secs: u32,
    pub escalated: bool,
}

/// One periodic snapshot of the run, recorded on every arrival and
/// completion. Bounded to `HISTORY_LIMIT` entries, oldest evicted first.
#[derive(Clone, Debug, Serialize)]
pub struct HistoryPoint {
    pub t_min: f64,
    pub arrived: u64,
    pub processed: u64,
    pub backlog: usize,
    pub auto_resolved: u64,
    pub escalated: u64,
    pub latest_response_min: f64,
    pub avg_response_min: f64,
    pub satisfaction: f64,
}

/// Point-in-time aggregate view handed to the reporting sink. Averages are
/// `None` until at least one item has been processed.
#[derive(Clone, Debug, Serialize)]
pub struct StatsSnapshot {
    pub sim_time_ms: f64,
    pub arrived: u64,
    pub processed: u64,
    pub auto_resolved: u64,
    pub escalated: u64,
    pub urgent: u64,
    pub high_intent: u64,
    pub under_sla: u64,
    pub backlog: usize,
    pub max_backlog: usize,
    pub avg_response_secs: Option<f64>,
    pub avg_satisfaction: Option<f64>,
    pub avg_confidence: Option<f64>,
    pub auto_rate: Option<f64>,
    pub escalation_rate: Option<f64>,
    pub under_sla_rate: Option<f64>,
    pub resolution_rate: Option<f64>,
    pub throughput_per_min: f64,
    pub hours_saved_total: f64,
    pub last_response_min: f64,
    pub channel_arrived: BTreeMap<Channel, u64>,
    pub channel_processed: BTreeMap<Channel, u64>,
    pub queue_counts: BTreeMap<String, u64>,
    pub intent_counts: BTreeMap<String, u64>,
}

/// Response-time histogram bucket, split by outcome like the original chart.
#[derive(Clone, Debug, Serialize)]
pub struct HistogramBucket {
    pub label: &'static str,
    pub auto_resolved: u64,
    pub escalated: u64,
}

const BUCKET_EDGES: [(&str, u32, u32); 6] = [
    ("<1m", 0, 60),
    ("1-2m", 60, 120),
    ("2-3m", 120, 180),
    ("3-5m", 180, 300),
    ("5-10m", 300, 600),
    ("10m+", 600, u32::MAX),
];

/// Incrementally maintained run statistics. Counters are monotonic for the
/// life of a run; only `reset()` (dropping the whole struct) zeroes them.
#[derive(Clone, Debug, Default)]
pub struct Stats {
    arrived: u64,
    processed: u64,
    auto_resolved: u64,
    escalated: u64,
    urgent: u64,
    high_intent: u64,
    under_sla: u64,
    response_eq_secs_total: u64,
    satisfaction_total: i64,
    confidence_total: f64,
    hours_saved_total: f64,
    last_response_min: f64,
    max_backlog: usize,
    channel_arrived: BTreeMap<Channel, u64>,
    channel_processed: BTreeMap<Channel, u64>,
    queue_counts: BTreeMap<String, u64>,
    intent_counts: BTreeMap<String, u64>,
    response_samples: VecDeque<ResponseSample>,
    history: VecDeque<HistoryPoint>,
}

impl Stats {
    pub fn on_arrival(
        &mut self,
        message: &EnrichedMessage,
        queue_len: usize,
        in_flight: bool,
        sim_time_ms: f64,
    ) {
        self.arrived += 1;
        *self
            .channel_arrived
            .entry(message.message.channel)
            .or_insert(0) += 1;
        if message.message.triage.priority == Priority::Urgent {
            self.urgent += 1;
        }
        self.max_backlog = self.max_backlog.max(queue_len);
        self.push_history(queue_len, in_flight, sim_time_ms);
    }

    pub fn on_completion(
        &mut self,
        message: &EnrichedMessage,
        queue_len: usize,
        sim_time_ms: f64,
    ) {
        self.processed += 1;
        if message.escalated {
            self.escalated += 1;
        } else {
            self.auto_resolved += 1;
        }
        if message.high_intent {
            self.high_intent += 1;
        }
        if message.under_sla {
            self.under_sla += 1;
        }
        self.response_eq_secs_total += u64::from(message.response_eq_secs);
        self.satisfaction_total += i64::from(message.satisfaction);
        self.confidence_total += message.confidence;
        self.hours_saved_total += message.saved_hours;
        self.last_response_min = message.response_eq_mins();

        self.response_samples.push_back(ResponseSample {
            secs: message.response_eq_secs,
            escalated: message.escalated,
        });
        if self.response_samples.len() > MAX_RESPONSE_SAMPLES {
            self.response_samples.pop_front();
        }

        *self
            .queue_counts
            .entry(message.message.triage.queue.clone())
            .or_insert(0) += 1;
        *self
            .intent_counts
            .entry(message.message.triage.primary_intent.clone())
            .or_insert(0) += 1;
        *self
            .channel_processed
            .entry(message.message.channel)
            .or_insert(0) += 1;

        self.push_history(queue_len, false, sim_time_ms);
    }

    fn push_history(&mut self, queue_len: usize, in_flight: bool, sim_time_ms: f64) {
        let backlog = queue_len + usize::from(in_flight);
        let avg_response_min = if self.processed > 0 {
            self.response_eq_secs_total as f64 / self.processed as f64 / 60.0
        } else {
            0.0
        };
        let satisfaction = if self.processed > 0 {
            self.satisfaction_total as f64 / self.processed as f64
        } else {
            0.0
        };
        self.history.push_back(HistoryPoint {
            t_min: sim_time_ms / 60_000.0,
            arrived: self.arrived,
            processed: self.processed,
            backlog,
            auto_resolved: self.auto_resolved,
            escalated: self.escalated,
            latest_response_min: self.last_response_min,
            avg_response_min,
            satisfaction,
        });
        if self.history.len() > HISTORY_LIMIT {
            self.history.pop_front();
        }
    }

    pub fn snapshot(&self, queue_len: usize, in_flight: bool, sim_time_ms: f64) -> StatsSnapshot {
        let processed = self.processed;
        let per_processed = |total: f64| {
            if processed > 0 {
                Some(total / processed as f64)
            } else {
                None
            }
        };
        let elapsed_min = (sim_time_ms / 60_000.0).max(0.0001);
        StatsSnapshot {
            sim_time_ms,
            arrived: self.arrived,
            processed,
            auto_resolved: self.auto_resolved,
            escalated: self.escalated,
            urgent: self.urgent,
            high_intent: self.high_intent,
            under_sla: self.under_sla,
            backlog: queue_len + usize::from(in_flight),
            max_backlog: self.max_backlog,
            avg_response_secs: per_processed(self.response_eq_secs_total as f64),
            avg_satisfaction: per_processed(self.satisfaction_total as f64),
            avg_confidence: per_processed(self.confidence_total),
            auto_rate: per_processed(self.auto_resolved as f64),
            escalation_rate: per_processed(self.escalated as f64),
            under_sla_rate: per_processed(self.under_sla as f64),
            resolution_rate: if self.arrived > 0 {
                Some(processed as f64 / self.arrived as f64)
            } else {
                None
            },
            throughput_per_min: processed as f64 / elapsed_min,
            hours_saved_total: self.hours_saved_total,
            last_response_min: self.last_response_min,
            channel_arrived: self.channel_arrived.clone(),
            channel_processed: self.channel_processed.clone(),
            queue_counts: self.queue_counts.clone(),
            intent_counts: self.intent_counts.clone(),
        }
    }

    /// Bucketed response-time distribution over the bounded sample window.
    pub fn histogram(&self) -> Vec<HistogramBucket> {
        let mut buckets: Vec<HistogramBucket> = BUCKET_EDGES
            .iter()
            .map(|(label, _, _)| HistogramBucket {
                label,
                auto_resolved: 0,
                escalated: 0,
            })
            .collect();
        for sample in &self.response_samples {
            let idx = BUCKET_EDGES
                .iter()
                .position(|(_, min, max)| sample.secs >= *min && sample.secs < *max)
                .unwrap_or(BUCKET_EDGES.len() - 1);
            if sample.escalated {
                buckets[idx].escalated += 1;
            } else {
                buckets[idx].auto_resolved += 1;
            }
        }
        buckets
    }

    /// Median equivalent response time over the sample window.
    pub fn median_response_secs(&self) -> Option<u32> {
        if self.response_samples.is_empty() {
            return None;
        }
        let mut secs: Vec<u32> = self.response_samples.iter().map(|s| s.secs).collect();
        secs.sort_unstable();
        Some(secs[secs.len() / 2])
    }

    pub fn arrived(&self) -> u64 {
        self.arrived
    }

    pub fn processed(&self) -> u64 {
        self.processed
    }

    pub fn auto_resolved(&self) -> u64 {
        self.auto_resolved
    }

    pub fn escalated(&self) -> u64 {
        self.escalated
    }

    pub fn history(&self) -> &VecDeque<HistoryPoint> {
        &self.history
    }

    pub fn response_samples(&self) -> &VecDeque<ResponseSample> {
        &self.response_samples
    }
}
