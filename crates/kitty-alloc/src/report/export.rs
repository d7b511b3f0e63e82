use std::io::Write;

use serde::Serialize;

use crate::allocation::AllocationResult;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write allocation csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to flush allocation csv: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Serialize)]
struct CsvRow<'a> {
    id: &'a str,
    assigned_amount: i64,
    justification: &'a str,
}

/// Writes one row per agent, in allocation order, with a header line.
pub fn write_csv<W: Write>(writer: W, result: &AllocationResult) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for entry in &result.allocations {
        csv_writer.serialize(CsvRow {
            id: &entry.id,
            assigned_amount: entry.assigned_amount,
            justification: &entry.justification,
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::{summarize, AllocationEntry};

    #[test]
    fn exports_header_and_rows() {
        let allocations = vec![
            AllocationEntry {
                id: "A1".to_string(),
                assigned_amount: 600,
                justification: "Exceptional: performanceScore, activeClients.".to_string(),
            },
            AllocationEntry {
                id: "A2".to_string(),
                assigned_amount: 400,
                justification: "Balanced contribution.".to_string(),
            },
        ];
        let summary = summarize(&allocations, 1000);
        let result = AllocationResult {
            allocations,
            summary,
        };

        let mut buffer = Vec::new();
        write_csv(&mut buffer, &result).expect("csv written");
        let text = String::from_utf8(buffer).expect("utf8 output");

        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("id,assigned_amount,justification"));
        assert_eq!(
            lines.next(),
            Some("A1,600,\"Exceptional: performanceScore, activeClients.\"")
        );
        assert_eq!(lines.next(), Some("A2,400,Balanced contribution."));
    }
}
