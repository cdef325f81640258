//! Progress reporting for book generation

use bookwright_application::ports::progress::BookProgressNotifier;
use bookwright_domain::{Chapter, GenerationErrorKind, Outline, ProviderKind};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;

/// Reports progress with an outline spinner and a chapter progress bar
pub struct ProgressReporter {
    outline: Mutex<Option<ProgressBar>>,
    chapters: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            outline: Mutex::new(None),
            chapters: Mutex::new(None),
        }
    }

    fn chapter_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    /// The chapter bar, created on first use with `total` steps.
    fn chapter_bar(&self, total: u32) -> Option<ProgressBar> {
        let mut slot = self.chapters.lock().ok()?;
        let bar = slot.get_or_insert_with(|| {
            let pb = ProgressBar::new(total as u64);
            pb.set_style(Self::chapter_style());
            pb.set_prefix("Chapters");
            pb.enable_steady_tick(Duration::from_millis(120));
            pb
        });
        Some(bar.clone())
    }

    fn finish_outline(&self, message: String) {
        if let Ok(mut slot) = self.outline.lock()
            && let Some(pb) = slot.take()
        {
            pb.finish_with_message(message);
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl BookProgressNotifier for ProgressReporter {
    fn on_outline_start(&self, provider: ProviderKind, chapter_count: u32) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(Self::spinner_style());
        pb.set_prefix("Outline");
        pb.set_message(format!("asking {} for {} chapters...", provider, chapter_count));
        pb.enable_steady_tick(Duration::from_millis(120));
        if let Ok(mut slot) = self.outline.lock() {
            *slot = Some(pb);
        }
    }

    fn on_outline_complete(&self, outline: &Outline) {
        self.finish_outline(format!(
            "{} ({} chapters)",
            "planned".green(),
            outline.len()
        ));
    }

    fn on_chapter_start(&self, index: u32, total: u32) {
        if let Some(pb) = self.chapter_bar(total) {
            pb.set_message(format!("writing chapter {}...", index));
        }
    }

    fn on_chapter_complete(&self, chapter: &Chapter) {
        if let Ok(slot) = self.chapters.lock()
            && let Some(pb) = slot.as_ref()
        {
            pb.set_message(format!(
                "{} {} ({} words)",
                "v".green(),
                chapter.title,
                chapter.word_count()
            ));
            pb.inc(1);
            if pb.position() >= pb.length().unwrap_or(u64::MAX) {
                pb.finish_with_message(format!("{}", "all chapters written".green()));
            }
        }
    }

    fn on_failure(&self, index: Option<u32>, kind: GenerationErrorKind, _message: &str) {
        match index {
            None => self.finish_outline(format!("{} ({})", "failed".red(), kind)),
            Some(index) => {
                if let Ok(mut slot) = self.chapters.lock()
                    && let Some(pb) = slot.take()
                {
                    pb.abandon_with_message(format!(
                        "{} chapter {} ({})",
                        "x".red(),
                        index,
                        kind
                    ));
                }
            }
        }
    }

    fn on_rate_limited(&self, delay: Duration) {
        let message = format!("rate limited, retrying in {:.1}s", delay.as_secs_f32());
        if let Ok(slot) = self.chapters.lock()
            && let Some(pb) = slot.as_ref()
        {
            pb.set_message(message.yellow().to_string());
            return;
        }
        if let Ok(slot) = self.outline.lock()
            && let Some(pb) = slot.as_ref()
        {
            pb.set_message(message.yellow().to_string());
        }
    }

    fn on_cancelled(&self, completed: usize) {
        self.finish_outline(format!("{}", "cancelled".yellow()));
        if let Ok(mut slot) = self.chapters.lock()
            && let Some(pb) = slot.take()
        {
            pb.abandon_with_message(format!(
                "{} after {} chapters",
                "cancelled".yellow(),
                completed
            ));
        }
    }
}

/// Simple line-based progress on stderr (no fancy UI)
pub struct SimpleProgress;

impl BookProgressNotifier for SimpleProgress {
    fn on_outline_start(&self, provider: ProviderKind, chapter_count: u32) {
        eprintln!(
            "{} {} ({} chapters, {})",
            "->".cyan(),
            "Outline".bold(),
            chapter_count,
            provider
        );
    }

    fn on_outline_complete(&self, outline: &Outline) {
        eprintln!("  {} {} chapters planned", "v".green(), outline.len());
    }

    fn on_chapter_start(&self, index: u32, total: u32) {
        eprintln!("{} {} {}/{}", "->".cyan(), "Chapter".bold(), index, total);
    }

    fn on_chapter_complete(&self, chapter: &Chapter) {
        eprintln!(
            "  {} {} ({} words)",
            "v".green(),
            chapter.title,
            chapter.word_count()
        );
    }

    fn on_failure(&self, index: Option<u32>, kind: GenerationErrorKind, message: &str) {
        let stage = match index {
            Some(i) => format!("chapter {}", i),
            None => "outline".to_string(),
        };
        eprintln!("  {} {} failed ({}): {}", "x".red(), stage, kind, message);
    }

    fn on_rate_limited(&self, delay: Duration) {
        eprintln!(
            "  {} rate limited, retrying in {:.1}s",
            "!".yellow(),
            delay.as_secs_f32()
        );
    }

    fn on_cancelled(&self, completed: usize) {
        eprintln!(
            "{} cancelled after {} chapters",
            "!".yellow(),
            completed
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookwright_domain::ChapterPlan;

    fn outline(n: u32) -> Outline {
        let plans = (1..=n)
            .map(|i| ChapterPlan::new(i, format!("T{}", i), "s"))
            .collect();
        Outline::new(None, plans).unwrap()
    }

    #[test]
    fn test_reporter_tracks_chapter_bar() {
        let reporter = ProgressReporter::new();
        reporter.on_outline_start(ProviderKind::OpenAi, 2);
        reporter.on_outline_complete(&outline(2));
        assert!(reporter.outline.lock().unwrap().is_none());

        reporter.on_chapter_start(1, 2);
        reporter.on_chapter_complete(&Chapter::new(1, "One", "a b c", ProviderKind::OpenAi, Some(1)));
        let position = reporter
            .chapters
            .lock()
            .unwrap()
            .as_ref()
            .map(|pb| pb.position());
        assert_eq!(position, Some(1));
    }

    #[test]
    fn test_reporter_failure_clears_bar() {
        let reporter = ProgressReporter::new();
        reporter.on_chapter_start(1, 3);
        reporter.on_failure(Some(1), GenerationErrorKind::Timeout, "slow");
        assert!(reporter.chapters.lock().unwrap().is_none());

        reporter.on_outline_start(ProviderKind::Gemini, 3);
        reporter.on_failure(None, GenerationErrorKind::AuthenticationFailed, "bad key");
        assert!(reporter.outline.lock().unwrap().is_none());
    }
}
