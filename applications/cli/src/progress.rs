//! Stage progress for rendering and saving (`Progress BEEPS = N`, `Progress SAVE = N`)

use tracing::info;

/// Smallest jump between two intermediate reports, in percent
const REPORT_STEP: u8 = 5;

/// Logs coarse percentages for one driver stage
#[derive(Debug)]
pub struct StageProgress {
    stage: &'static str,
    last: u8,
}

impl StageProgress {
    /// Start a stage and report 0
    pub fn start(stage: &'static str) -> Self {
        info!("Progress {} = 0", stage);
        Self { stage, last: 0 }
    }

    /// Report `done / total` once it has moved more than 5 points past the last report
    ///
    /// Returns the reported percentage, if any.
    pub fn advance(&mut self, done: usize, total: usize) -> Option<u8> {
        if total == 0 {
            return None;
        }
        let percent = (done.min(total) * 100 / total) as u8;
        if percent <= self.last.saturating_add(REPORT_STEP) || percent >= 100 {
            return None;
        }
        self.last = percent;
        info!("Progress {} = {}", self.stage, percent);
        Some(percent)
    }

    /// Report 100
    pub fn finish(self) {
        info!("Progress {} = 100", self.stage);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reports_in_coarse_steps() {
        let mut progress = StageProgress::start("SAVE");
        let reported: Vec<u8> = (0..=1_000)
            .filter_map(|done| progress.advance(done, 1_000))
            .collect();
        assert_eq!(reported, vec![6, 12, 18, 24, 30, 36, 42, 48, 54, 60, 66, 72, 78, 84, 90, 96]);
        progress.finish();
    }

    #[test]
    fn test_empty_stage_reports_nothing_in_between() {
        let mut progress = StageProgress::start("BEEPS");
        assert_eq!(progress.advance(0, 0), None);
        assert_eq!(progress.advance(3, 100), None);
    }
}
