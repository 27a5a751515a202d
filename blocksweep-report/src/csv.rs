//! CSV report generation.

use crate::report::Report;

/// Render the report as CSV: one row per sample, sorted by block within
/// each workload.
pub fn generate_csv_report(report: &Report) -> String {
    let mut out = String::from("workload,rows,cols,block,misses\n");
    for series in &report.series {
        for sample in &series.samples {
            out.push_str(&format!(
                "{},{},{},{},{}\n",
                series.workload.name,
                series.workload.rows,
                series.workload.cols,
                sample.block,
                sample.misses
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{ReportMeta, build_report};
    use blocksweep_core::{ResultSeries, SweepDomain, Workload};

    #[test]
    fn csv_lists_sorted_samples_per_workload() {
        let mut s = ResultSeries::new(Workload::new("t61x67", 61, 67));
        s.push(2, 4000);
        s.push(1, 4400);

        let report = build_report(
            &[s],
            ReportMeta {
                version: "0.1.0".to_string(),
                timestamp: chrono::Utc::now(),
                domain: SweepDomain::new(1, 2).unwrap(),
                marker: "TEST_TRANS_RESULTS".to_string(),
                artifact: "./test-trans".to_string(),
                timeout_secs: None,
            },
        );

        let csv = generate_csv_report(&report);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "workload,rows,cols,block,misses");
        assert_eq!(lines[1], "t61x67,61,67,1,4400");
        assert_eq!(lines[2], "t61x67,61,67,2,4000");
    }
}
