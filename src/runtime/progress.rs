use std::time::Duration;

use crate::config::ProgressConfig;

const BAR_CELLS: usize = 10;
const FILLED: &str = "🟩";
const EMPTY: &str = "⬜";

/// Simulated progress shown while a link is being fetched. It does not track real bytes.
#[derive(Debug, Clone)]
pub struct ProgressBar {
    steps: u8,
    step_delay: Duration,
}

impl ProgressBar {
    pub fn new(config: &ProgressConfig) -> Self {
        Self {
            steps: config.steps.max(1),
            step_delay: config.step_delay,
        }
    }

    pub fn steps(&self) -> u8 {
        self.steps
    }

    pub fn step_delay(&self) -> Duration {
        self.step_delay
    }

    pub fn percent(&self, step: u8) -> u32 {
        u32::from(step.min(self.steps)) * 100 / u32::from(self.steps)
    }

    pub fn bar(&self, step: u8) -> String {
        let filled = (self.percent(step) as usize / 10).clamp(1, BAR_CELLS);
        format!("{}{}", FILLED.repeat(filled), EMPTY.repeat(BAR_CELLS - filled))
    }

    pub fn render(&self, step: u8) -> String {
        t!(
            "messages.download.wait",
            bar = self.bar(step),
            percent = self.percent(step)
        )
        .to_string()
    }

    pub fn render_done(&self) -> String {
        self.render(self.steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(steps: u8) -> ProgressBar {
        ProgressBar::new(&ProgressConfig {
            steps,
            step_delay: Duration::ZERO,
        })
    }

    #[test]
    fn test_render_default_steps() {
        let progress = bar(10);
        assert_eq!(progress.render(0), "Please wait... 🟩⬜⬜⬜⬜⬜⬜⬜⬜⬜ 0%");
        assert_eq!(progress.render(1), "Please wait... 🟩⬜⬜⬜⬜⬜⬜⬜⬜⬜ 10%");
        assert_eq!(progress.render(5), "Please wait... 🟩🟩🟩🟩🟩⬜⬜⬜⬜⬜ 50%");
        assert_eq!(progress.render_done(), "Please wait... 🟩🟩🟩🟩🟩🟩🟩🟩🟩🟩 100%");
    }

    #[test]
    fn test_render_uneven_steps() {
        let progress = bar(4);
        assert_eq!(progress.percent(1), 25);
        assert_eq!(progress.bar(1), "🟩🟩⬜⬜⬜⬜⬜⬜⬜⬜");
        assert_eq!(progress.percent(3), 75);
        assert_eq!(progress.bar(3), "🟩🟩🟩🟩🟩🟩🟩⬜⬜⬜");
        // Steps past the end stay at 100%
        assert_eq!(progress.percent(9), 100);
    }
}
