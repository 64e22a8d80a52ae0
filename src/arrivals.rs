use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Countdown before the first message arrives.
pub const INITIAL_ARRIVAL_DELAY_MS: f64 = 900.0;

/// Samples the delay until the next arrival, in simulated milliseconds.
///
/// The draw is seeded from the arrival cursor, the total arrivals so far and
/// the simulated time truncated to 100ms buckets, so a given tick is
/// inspectable and reproducible while runs as a whole still vary with
/// speed changes. Burst mode mixes four speed bands; otherwise spacing is
/// near-uniform.
pub fn next_arrival_delay_ms(
    cursor: usize,
    arrived: u64,
    sim_time_ms: f64,
    burst_mode: bool,
) -> f64 {
    let time_bucket = (sim_time_ms / 100.0).floor() as u64;
    let mut rng = StdRng::seed_from_u64(arrival_seed(cursor as u64, arrived, time_bucket));
    let r = rng.gen::<f64>();
    if !burst_mode {
        return 850.0 + r * 1250.0;
    }
    if r < 0.18 {
        180.0 + r * 260.0
    } else if r < 0.52 {
        420.0 + r * 520.0
    } else if r < 0.86 {
        900.0 + r * 1100.0
    } else {
        1600.0 + r * 1800.0
    }
}

fn arrival_seed(cursor: u64, arrived: u64, time_bucket: u64) -> u64 {
    splitmix(cursor)
        .wrapping_add(splitmix(arrived.wrapping_mul(0x9e37_79b9_7f4a_7c15)))
        .wrapping_add(splitmix(time_bucket ^ 0xd1b5_4a32_d192_ed03))
}

fn splitmix(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9e37_79b9_7f4a_7c15);
    x = (x ^ (x >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    x ^ (x >> 31)
}
