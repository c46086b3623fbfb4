use std::io::{self, Write};

use serde::Serialize;

use crate::config::SimulationConfig;
use crate::simulator::{SimulationSummary, TrialReport};

/// Receives simulation results as they are produced.
pub trait ReportSink {
    fn on_start(&mut self, _config: &SimulationConfig) -> io::Result<()> {
        Ok(())
    }

    fn on_trial(&mut self, report: &TrialReport) -> io::Result<()>;

    fn on_summary(&mut self, summary: &SimulationSummary) -> io::Result<()>;
}

/// Plain text: free chunk sizes and mean per trial, then the overall mean.
pub struct TextReport<W: Write> {
    out: W,
}

impl<W: Write> TextReport<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

fn format_mean(mean: Option<f64>) -> String {
    mean.map_or_else(|| "n/a".to_string(), |value| format!("{value:.2}"))
}

impl<W: Write> ReportSink for TextReport<W> {
    fn on_start(&mut self, config: &SimulationConfig) -> io::Result<()> {
        writeln!(self.out, "Launching {} simulator ...", config.strategy)?;
        writeln!(self.out)
    }

    fn on_trial(&mut self, report: &TrialReport) -> io::Result<()> {
        let fragmentation = &report.fragmentation;
        let sizes: Vec<String> = fragmentation
            .free_chunk_sizes
            .iter()
            .map(usize::to_string)
            .collect();
        writeln!(self.out, "{}", sizes.join(" "))?;
        writeln!(
            self.out,
            "Free: {}, Av. Size: {}",
            fragmentation.free_chunk_count,
            format_mean(fragmentation.average_free_size)
        )
    }

    fn on_summary(&mut self, summary: &SimulationSummary) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(
            self.out,
            "Average Total: {}",
            format_mean(summary.average_free_size)
        )?;
        self.out.flush()
    }
}

#[derive(Serialize)]
#[serde(tag = "event", rename_all = "lowercase")]
enum Event<'a> {
    Trial(&'a TrialReport),
    Summary(&'a SimulationSummary),
}

/// Newline-delimited JSON, one object per trial and one for the summary.
pub struct JsonReport<W: Write> {
    out: W,
}

impl<W: Write> JsonReport<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, event: &Event<'_>) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, event)?;
        writeln!(self.out)
    }
}

impl<W: Write> ReportSink for JsonReport<W> {
    fn on_trial(&mut self, report: &TrialReport) -> io::Result<()> {
        self.emit(&Event::Trial(report))
    }

    fn on_summary(&mut self, summary: &SimulationSummary) -> io::Result<()> {
        self.emit(&Event::Summary(summary))?;
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fit::Strategy;
    use crate::simulator::{FragmentationReport, OperationStats};

    fn trial(sizes: Vec<usize>) -> TrialReport {
        let total: usize = sizes.iter().sum();
        let average = (!sizes.is_empty()).then(|| total as f64 / sizes.len() as f64);
        TrialReport {
            trial: 0,
            strategy: Strategy::BestFit,
            fragmentation: FragmentationReport {
                chunk_count: sizes.len() * 2,
                free_chunk_count: sizes.len(),
                largest_free: sizes.iter().copied().max().unwrap_or(0),
                free_chunk_sizes: sizes,
                total_free: total,
                average_free_size: average,
            },
            operations: OperationStats::default(),
            live_allocations: 0,
        }
    }

    fn summary(trials: Vec<TrialReport>, average: Option<f64>) -> SimulationSummary {
        SimulationSummary {
            strategy: Strategy::BestFit,
            arena_size: 1024,
            operations_per_trial: 1000,
            trial_count: trials.len(),
            trials,
            average_free_size: average,
        }
    }

    #[test]
    fn text_report_lists_sizes_and_means() {
        let mut sink = TextReport::new(Vec::new());
        sink.on_start(&SimulationConfig::default()).unwrap();
        sink.on_trial(&trial(vec![10, 20, 3])).unwrap();
        sink.on_summary(&summary(vec![], Some(11.0))).unwrap();

        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(
            text,
            "Launching best-fit simulator ...\n\n10 20 3\nFree: 3, Av. Size: 11.00\n\nAverage Total: 11.00\n"
        );
    }

    #[test]
    fn text_report_marks_missing_mean() {
        let mut sink = TextReport::new(Vec::new());
        sink.on_trial(&trial(vec![])).unwrap();

        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert!(text.ends_with("Free: 0, Av. Size: n/a\n"));
    }

    #[test]
    fn json_report_emits_one_object_per_line() {
        let mut sink = JsonReport::new(Vec::new());
        let report = trial(vec![4, 8]);
        sink.on_trial(&report).unwrap();
        sink.on_summary(&summary(vec![report], Some(6.0))).unwrap();

        let text = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["event"], "trial");
        assert_eq!(lines[0]["fragmentation"]["free_chunk_sizes"], serde_json::json!([4, 8]));
        assert_eq!(lines[0]["strategy"], "best-fit");
        assert_eq!(lines[1]["event"], "summary");
        assert_eq!(lines[1]["average_free_size"], 6.0);
        assert!(lines[1].get("trials").is_none());
    }
}
