//! Coarse progress reporting for a single mix call

use tracing::debug;

/// Forwards strictly increasing percentages to an optional caller callback
pub(crate) struct ProgressReporter<'a> {
    sink: Option<&'a mut dyn FnMut(u8)>,
    last: Option<u8>,
}

impl<'a> ProgressReporter<'a> {
    pub(crate) fn new(sink: &'a mut dyn FnMut(u8)) -> Self {
        Self {
            sink: Some(sink),
            last: None,
        }
    }

    pub(crate) fn silent() -> Self {
        Self {
            sink: None,
            last: None,
        }
    }

    /// Report a milestone; values not above the last report are dropped
    pub(crate) fn report(&mut self, percent: u8) {
        let percent = percent.min(100);
        if self.last.is_some_and(|last| percent <= last) {
            return;
        }
        self.last = Some(percent);
        debug!("Progress MIX = {}", percent);
        if let Some(sink) = self.sink.as_mut() {
            sink(percent);
        }
    }

    /// Report only once `percent` has moved more than `step` past the last report
    pub(crate) fn report_coarse(&mut self, percent: u8, step: u8) {
        let last = self.last.unwrap_or(0);
        if percent > last.saturating_add(step) {
            self.report(percent);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_non_increasing_values() {
        let mut seen = Vec::new();
        let mut sink = |p: u8| seen.push(p);
        let mut reporter = ProgressReporter::new(&mut sink);
        reporter.report(0);
        reporter.report(0);
        reporter.report(40);
        reporter.report(30);
        reporter.report(200);
        drop(reporter);
        assert_eq!(seen, vec![0, 40, 100]);
    }

    #[test]
    fn coarse_steps() {
        let mut seen = Vec::new();
        let mut sink = |p: u8| seen.push(p);
        let mut reporter = ProgressReporter::new(&mut sink);
        reporter.report(0);
        for p in 0..=75 {
            reporter.report_coarse(p, 5);
        }
        drop(reporter);
        assert_eq!(seen, vec![0, 6, 12, 18, 24, 30, 36, 42, 48, 54, 60, 66, 72]);
    }

    #[test]
    fn silent_reporter_is_a_no_op() {
        let mut reporter = ProgressReporter::silent();
        reporter.report(50);
        reporter.report_coarse(90, 5);
    }
}
