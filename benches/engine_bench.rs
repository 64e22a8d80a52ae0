use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use triage_sim::engine::Simulation;
use triage_sim::enrich::enrich_messages;
use triage_sim::events::NullSink;
use triage_sim::models::{
    Channel, Dataset, DraftResponse, Message, MessageContent, Priority, ResponseMetadata, Triage,
};

const DATASET_SIZES: &[usize] = &[32, 128, 512];
const STEP_MS: f64 = 250.0;

fn build_dataset(count: usize) -> Dataset {
    let channels = [
        Channel::Email,
        Channel::WebChat,
        Channel::Sms,
        Channel::PhoneVoicemail,
    ];
    let messages = (0..count)
        .map(|idx| Message {
            message_id: format!("msg-{:05}", idx),
            channel: channels[idx % channels.len()],
            received_at_utc: "2025-03-02T14:00:00Z".to_string(),
            message_content: MessageContent {
                text: format!(
                    "Inquiry number {} about transfer credits and the upcoming term start.",
                    idx
                ),
                sentiment: "curious".to_string(),
                urgency_signals: Vec::new(),
                normalized_summary: None,
                language_detected: "en".to_string(),
            },
            triage: Triage {
                primary_intent: "program_question".to_string(),
                category: Some("Admissions".to_string()),
                queue: "Admissions".to_string(),
                priority: Priority::Normal,
                requires_human_handoff: idx % 4 == 0,
                sla_target_minutes: Some(60),
                high_intent_score: (idx % 100) as u32,
            },
            draft_response: DraftResponse {
                body: format!(
                    "Thanks for reaching out! Here is what you need to know about inquiry {}: \
                     credits usually transfer, the next term starts soon, and an advisor can \
                     walk you through the remaining steps whenever you are ready.",
                    idx
                ),
                metadata: ResponseMetadata::default(),
            },
            compliance: None,
        })
        .collect();
    Dataset { messages }
}

fn bench_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_drain");

    for &count in DATASET_SIZES {
        group.bench_with_input(BenchmarkId::new("drain", count), &count, |b, &count| {
            b.iter_batched(
                || {
                    let mut sim =
                        Simulation::new(build_dataset(count)).expect("dataset should validate");
                    sim.set_speed(8.0).expect("speed is valid");
                    sim
                },
                |mut sim| {
                    sim.start();
                    while !sim.is_drained() {
                        sim.advance(STEP_MS, &mut NullSink);
                    }
                    black_box(sim.snapshot());
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_enrichment(c: &mut Criterion) {
    let mut group = c.benchmark_group("enrichment");

    for &count in DATASET_SIZES {
        group.bench_with_input(BenchmarkId::new("enrich", count), &count, |b, &count| {
            b.iter_batched(
                || build_dataset(count).messages,
                |messages| {
                    black_box(enrich_messages(messages));
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_drain, bench_enrichment);
criterion_main!(benches);
