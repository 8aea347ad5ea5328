use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;

/// Per-generation timing recorder. Constructed fresh for every `generate`
/// call and shared with the capture worker; there is no process-global
/// state, so overlapping generations cannot corrupt each other's numbers.
///
/// Disabled recorders accept and discard everything, which keeps the call
/// sites unconditional.
#[derive(Debug)]
pub(crate) struct GenerationTimings {
    enabled: bool,
    inner: Mutex<TimingState>,
}

#[derive(Debug, Default)]
struct TimingState {
    phases: Vec<(String, f64)>,
    mockups: Vec<(String, f64)>,
}

const LABEL_COLUMN: usize = 40;

impl GenerationTimings {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            inner: Mutex::new(TimingState::default()),
        }
    }

    pub fn record_phase(&self, name: &str, ms: f64) {
        if !self.enabled {
            return;
        }
        if let Ok(mut state) = self.inner.lock() {
            state.phases.push((name.to_string(), ms));
        }
    }

    /// One bucket per mockup, in capture order.
    pub fn record_mockup(&self, id: &str, ms: f64) {
        if !self.enabled {
            return;
        }
        if let Ok(mut state) = self.inner.lock() {
            state.mockups.push((id.to_string(), ms));
        }
    }

    /// Runs `f`, recording its wall time under `name`.
    pub fn time_phase<T>(&self, name: &str, f: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let value = f();
        self.record_phase(name, elapsed_ms(start));
        value
    }

    /// Fixed-width breakdown. `None` when instrumentation is off.
    pub fn report(&self) -> Option<String> {
        if !self.enabled {
            return None;
        }
        let state = self.inner.lock().ok()?;
        let mut out = String::from("brandbook generation timings\n");
        let mut total = 0.0;
        for (name, ms) in &state.phases {
            total += ms;
            out.push_str(&leader_line(2, name, *ms));
            if name == "captures" {
                let last = state.mockups.len().saturating_sub(1);
                for (index, (id, mockup_ms)) in state.mockups.iter().enumerate() {
                    let branch = if index == last { "└─ " } else { "├─ " };
                    let label = format!("{branch}{id}");
                    out.push_str(&leader_line(4, &label, *mockup_ms));
                }
            }
        }
        out.push_str(&leader_line(2, "total", total));
        Some(out)
    }

    /// Writes the report next to the generated document under a
    /// timestamped filename. Returns the path, or `None` when disabled.
    pub fn write_report(&self, dir: &Path) -> io::Result<Option<PathBuf>> {
        let Some(report) = self.report() else {
            return Ok(None);
        };
        let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
        let path = dir.join(format!("brandbook-timings-{stamp}.txt"));
        std::fs::write(&path, report)?;
        Ok(Some(path))
    }
}

pub(crate) fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

fn leader_line(indent: usize, label: &str, ms: f64) -> String {
    let mut line = " ".repeat(indent);
    line.push_str(label);
    line.push(' ');
    while line.chars().count() < LABEL_COLUMN {
        line.push('.');
    }
    line.push_str(&format!(" {ms:>9.1} ms\n"));
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_recorder_reports_nothing() {
        let timings = GenerationTimings::new(false);
        timings.record_phase("captures", 10.0);
        timings.record_mockup("business-card", 5.0);
        assert!(timings.report().is_none());
    }

    #[test]
    fn report_breaks_down_mockups_with_tree_glyphs() {
        let timings = GenerationTimings::new(true);
        timings.record_phase("static pages", 3.0);
        timings.record_phase("captures", 30.0);
        timings.record_mockup("business-card", 12.0);
        timings.record_mockup("letterhead", 10.0);
        timings.record_mockup("slide", 8.0);
        timings.record_phase("pdf write", 2.0);

        let report = timings.report().expect("enabled");
        assert!(report.contains("├─ business-card"));
        assert!(report.contains("├─ letterhead"));
        assert!(report.contains("└─ slide"));
        assert!(!report.contains("└─ business-card"));
        assert!(report.contains("total"));
        assert!(report.contains("35.0 ms"));
    }

    #[test]
    fn mockup_rows_keep_capture_order() {
        let timings = GenerationTimings::new(true);
        timings.record_phase("captures", 3.0);
        timings.record_mockup("envelope", 2.0);
        timings.record_mockup("slide", 1.0);
        let report = timings.report().unwrap();
        let envelope = report.find("envelope").unwrap();
        let slide = report.find("slide").unwrap();
        assert!(envelope < slide);
    }
}
