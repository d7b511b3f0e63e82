use super::domain::{AllocationEntry, SummaryStats};

/// Aggregate statistics over the final (reconciled) allocation.
pub fn summarize(entries: &[AllocationEntry], kitty: u64) -> SummaryStats {
    let amounts: Vec<i64> = entries.iter().map(|entry| entry.assigned_amount).collect();
    let total: i128 = amounts.iter().map(|amount| i128::from(*amount)).sum();

    let mut sorted = amounts.clone();
    sorted.sort_unstable();

    let min = sorted.first().copied().unwrap_or(0);
    let max = sorted.last().copied().unwrap_or(0);
    let count = sorted.len();

    let mean = if count == 0 {
        0.0
    } else {
        total as f64 / count as f64
    };

    SummaryStats {
        total_allocated: saturate(total),
        remaining_kitty: saturate(i128::from(kitty) - total),
        mean,
        median: median(&sorted),
        min,
        max,
        agents_at_min: amounts.iter().filter(|amount| **amount == min).count(),
        agents_at_max: amounts.iter().filter(|amount| **amount == max).count(),
    }
}

fn saturate(value: i128) -> i64 {
    value.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
}

fn median(sorted: &[i64]) -> f64 {
    let count = sorted.len();
    match count {
        0 => 0.0,
        _ if count % 2 == 0 => (sorted[count / 2 - 1] as f64 + sorted[count / 2] as f64) / 2.0,
        _ => sorted[count / 2] as f64,
    }
}
