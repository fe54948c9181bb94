//! `retrykit schedule` – print the backoff envelope.

use retrykit_core::retry::delay_bounds;
use retrykit_core::RetryConfig;
use std::time::Duration;

fn secs(d: Duration) -> f64 {
    d.as_secs_f64()
}

pub fn run_schedule(retry: &RetryConfig) {
    println!(
        "max_retries={} initial={}ms max={}ms multiplier={}",
        retry.max_retries,
        retry.initial_delay.as_millis(),
        retry.max_delay.as_millis(),
        retry.backoff_multiplier
    );
    if retry.max_retries == 0 {
        println!("No retries: the operation runs once.");
        return;
    }
    println!("  {:>5}  {:>10}  {:>10}", "Retry", "Min(s)", "Max(s)");
    println!("  {}  {}  {}", "-----", "----------", "----------");
    let mut worst_total = Duration::ZERO;
    for attempt in 0..retry.max_retries {
        let (lo, hi) = delay_bounds(attempt, retry);
        worst_total = worst_total.saturating_add(hi);
        println!("  {:>5}  {:>10.3}  {:>10.3}", attempt + 1, secs(lo), secs(hi));
    }
    println!("Worst-case total wait: {:.3}s", secs(worst_total));
}
