//! Output Formatting
//!
//! Human-readable terminal output: one sorted (block, misses) table per
//! workload with the minimum-miss row marked, followed by any skipped
//! blocks and a summary line.

use crate::report::Report;

/// Format a report for human-readable terminal display.
pub fn format_human_output(report: &Report) -> String {
    let mut output = String::new();

    output.push('\n');
    output.push_str("Blocksweep Results\n");
    output.push_str(&"=".repeat(60));
    output.push_str("\n\n");

    output.push_str(&format!(
        "Sweep: block {}..={}  artifact: {}  marker: {}\n\n",
        report.meta.domain.min(),
        report.meta.domain.max(),
        report.meta.artifact,
        report.meta.marker
    ));

    for series in &report.series {
        let w = &series.workload;
        let gate = match w.block_ceiling {
            Some(c) => format!(", block < {}", c),
            None => String::new(),
        };
        output.push_str(&format!("Workload: {} ({}x{}{})\n", w.name, w.rows, w.cols, gate));
        output.push_str(&"-".repeat(60));
        output.push('\n');

        if series.samples.is_empty() {
            output.push_str("  (no samples)\n");
        } else {
            output.push_str(&format!("  {:>6}  {:>12}\n", "block", "misses"));
            for sample in &series.samples {
                let marker = match series.best {
                    Some(best) if best.block == sample.block && best.misses == sample.misses => {
                        "  <- min"
                    }
                    _ => "",
                };
                output.push_str(&format!(
                    "  {:>6}  {:>12}{}\n",
                    sample.block, sample.misses, marker
                ));
            }
        }

        if !series.skipped.is_empty() {
            output.push_str(&format!("  skipped {} block(s):\n", series.skipped.len()));
            for skip in &series.skipped {
                output.push_str(&format!("    block {}: {}\n", skip.block, skip.reason));
            }
        }

        output.push('\n');
    }

    // Summary
    output.push_str("Summary\n");
    output.push_str(&"-".repeat(60));
    output.push('\n');
    for series in &report.series {
        match series.best {
            Some(best) => output.push_str(&format!(
                "  {}: min misses {} at block {}\n",
                series.workload.name, best.misses, best.block
            )),
            None => output.push_str(&format!("  {}: no samples\n", series.workload.name)),
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{ReportMeta, build_report};
    use blocksweep_core::{ResultSeries, SweepDomain, Workload};

    fn report_with_samples() -> Report {
        let mut s = ResultSeries::new(Workload::new("t64", 64, 64));
        s.push(3, 40);
        s.push(1, 50);
        s.push(2, 30);
        s.push_skipped(4, "extraction failed: no marker line");

        build_report(
            &[s],
            ReportMeta {
                version: "0.1.0".to_string(),
                timestamp: chrono::Utc::now(),
                domain: SweepDomain::new(1, 4).unwrap(),
                marker: "TEST_TRANS_RESULTS".to_string(),
                artifact: "./test-trans".to_string(),
                timeout_secs: Some(60.0),
            },
        )
    }

    #[test]
    fn human_output_marks_the_minimum() {
        let text = format_human_output(&report_with_samples());
        assert!(text.contains("Workload: t64 (64x64)"));
        assert!(text.contains("<- min"));
        assert!(text.contains("min misses 30 at block 2"));
    }

    #[test]
    fn human_output_lists_skipped_blocks() {
        let text = format_human_output(&report_with_samples());
        assert!(text.contains("skipped 1 block(s)"));
        assert!(text.contains("block 4: extraction failed"));
    }

    #[test]
    fn human_output_orders_rows_by_block() {
        let text = format_human_output(&report_with_samples());
        let pos1 = text.find("     1            50").expect("block 1 row");
        let pos2 = text.find("     2            30").expect("block 2 row");
        let pos3 = text.find("     3            40").expect("block 3 row");
        assert!(pos1 < pos2 && pos2 < pos3);
    }
}
