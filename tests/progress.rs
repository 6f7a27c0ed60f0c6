mod common;

use common::VirtualPace;
use forensight::{config::Config, progress::ProgressSimulator};
use rand::{rngs::StdRng, SeedableRng};
use std::time::Duration;

fn simulator() -> ProgressSimulator {
    ProgressSimulator::from_config(&Config::default().progress)
}

#[test]
fn steps_stay_in_range_and_stop_at_cap() {
    let sim = simulator();
    for seed in 0..20 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut pace = VirtualPace::default();
        let mut seen = vec![5u8];
        let last = sim.run(5, &mut rng, &mut pace, |p| seen.push(p));

        assert_eq!(last, 95);
        for w in seen.windows(2) {
            let step = w[1] - w[0];
            if w[1] != 95 {
                assert!((3..=8).contains(&step), "seed={seed} step={step}");
            }
        }
        assert_eq!(pace.waits, seen.len() - 1);
    }
}

#[test]
fn stalled_ticks_end_at_the_ceiling() {
    let sim = simulator();
    let mut rng = StdRng::seed_from_u64(1);
    let mut pace = VirtualPace::stalling(Duration::from_secs(3));
    let mut ticks = 0;
    let last = sim.run(5, &mut rng, &mut pace, |_| ticks += 1);

    // 3.12s per tick against an 8s ceiling.
    assert_eq!(ticks, 3);
    assert!(last < 95);
    assert!(pace.now >= Duration::from_millis(8000));
}

#[test]
fn start_above_cap_is_clamped() {
    let sim = simulator();
    let mut rng = StdRng::seed_from_u64(3);
    let mut pace = VirtualPace::default();
    let last = sim.run(99, &mut rng, &mut pace, |_| {});
    assert_eq!(last, 95);
}
