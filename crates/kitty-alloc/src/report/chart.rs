use std::fmt::Write as _;

use crate::allocation::AllocationEntry;

/// Width of a full-length bar, in characters.
pub const BAR_WIDTH: usize = 50;

const FILLED: char = '█';
const EMPTY: char = '░';

/// Renders allocations as horizontal bars scaled to the largest amount.
pub fn render_chart(entries: &[AllocationEntry]) -> String {
    let max_value = entries
        .iter()
        .map(|entry| entry.assigned_amount)
        .max()
        .unwrap_or(0);

    let mut output = String::from("=== Allocation Chart ===\n");
    for entry in entries {
        let filled = bar_length(entry.assigned_amount, max_value);
        let bar: String = std::iter::repeat(FILLED)
            .take(filled)
            .chain(std::iter::repeat(EMPTY).take(BAR_WIDTH - filled))
            .collect();
        let _ = writeln!(
            output,
            "{:<3}: {} {:>6}",
            entry.id, bar, entry.assigned_amount
        );
    }
    let _ = write!(output, "Max: {max_value}");
    output
}

fn bar_length(amount: i64, max_value: i64) -> usize {
    if max_value <= 0 {
        return 0;
    }
    let fraction = amount as f64 / max_value as f64;
    ((fraction * BAR_WIDTH as f64).round()).clamp(0.0, BAR_WIDTH as f64) as usize
}
