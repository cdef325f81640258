//! Console and JSON formatters for outlines, chapters and books

use crate::output::formatter::OutputFormatter;
use bookwright_application::{BookStatus, FullBookOutcome};
use bookwright_domain::{Chapter, Outline};
use colored::Colorize;
use serde::Serialize;

/// Formats results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Force colors on or off for all console output.
    pub fn set_color(enabled: bool) {
        colored::control::set_override(enabled);
    }

    pub fn outline(outline: &Outline) -> String {
        let mut output = String::new();
        output.push_str(&Self::header("Book Outline"));
        output.push('\n');

        if let Some(synopsis) = &outline.synopsis {
            output.push_str(&format!("\n{}\n{}\n", "Synopsis:".cyan().bold(), synopsis));
        }

        for plan in outline.chapters() {
            output.push_str(&format!(
                "\n{}\n",
                format!("Chapter {}: {}", plan.index, plan.title).yellow().bold()
            ));
            if !plan.summary.is_empty() {
                output.push_str(&Self::indent(&plan.summary, "  "));
                output.push('\n');
            }
            for point in &plan.key_points {
                output.push_str(&format!("  * {}\n", point));
            }
        }

        output.push_str(&Self::footer());
        output
    }

    pub fn chapter(chapter: &Chapter) -> String {
        format!(
            "{}\n\n{}\n\n{}\n",
            format!("Chapter {}: {}", chapter.index, chapter.title)
                .cyan()
                .bold(),
            chapter.body.trim(),
            format!("({} words, {})", chapter.word_count(), chapter.provider).dimmed()
        )
    }

    pub fn book(outcome: &FullBookOutcome) -> String {
        let mut output = String::new();

        if let Some(outline) = &outcome.outline {
            output.push_str(&Self::outline(outline));
        }
        for chapter in &outcome.chapters {
            output.push('\n');
            output.push_str(&Self::section_header(&format!(
                "Chapter {}: {}",
                chapter.index, chapter.title
            )));
            output.push_str(chapter.body.trim());
            output.push('\n');
        }

        output.push_str(&format!("\n{}\n", Self::status_line(outcome)));
        if let Some(failure) = &outcome.failure {
            output.push_str(&format!("{} {}\n", "Error:".red().bold(), failure.message));
            if failure.kind.is_transient() {
                let hint = match failure.index {
                    Some(index) => format!(
                        "The failure may be temporary; retry with `bookwright chapter {}`.",
                        index
                    ),
                    None => "The failure may be temporary; retry the run.".to_string(),
                };
                output.push_str(&format!("{}\n", hint.dimmed()));
            }
        }
        output
    }

    fn status_line(outcome: &FullBookOutcome) -> String {
        let words = outcome.total_words();
        let written = outcome.chapters.len();
        match outcome.status() {
            BookStatus::Complete => format!(
                "{} {} chapters, {} words",
                "Complete:".green().bold(),
                written,
                words
            ),
            BookStatus::NothingGenerated => {
                format!("{} no chapters were generated", "Failed:".red().bold())
            }
            BookStatus::Partial { failed_at: Some(index) } => format!(
                "{} {} chapters, {} words; stopped at chapter {}",
                "Partial:".yellow().bold(),
                written,
                words,
                index
            ),
            BookStatus::Partial { failed_at: None } => format!(
                "{} {} chapters, {} words; outline stage failed",
                "Partial:".yellow().bold(),
                written,
                words
            ),
            BookStatus::Cancelled => format!(
                "{} {} chapters, {} words kept",
                "Cancelled:".yellow().bold(),
                written,
                words
            ),
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_outline(&self, outline: &Outline) -> String {
        Self::outline(outline)
    }

    fn format_chapter(&self, chapter: &Chapter) -> String {
        Self::chapter(chapter)
    }

    fn format_book(&self, outcome: &FullBookOutcome) -> String {
        Self::book(outcome)
    }
}

/// Formats results as pretty-printed JSON
pub struct JsonFormatter;

#[derive(Serialize)]
struct BookDocument<'a> {
    #[serde(flatten)]
    status: BookStatus,
    total_words: usize,
    #[serde(flatten)]
    outcome: &'a FullBookOutcome,
}

impl JsonFormatter {
    fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_outline(&self, outline: &Outline) -> String {
        Self::to_json(outline)
    }

    fn format_chapter(&self, chapter: &Chapter) -> String {
        Self::to_json(chapter)
    }

    fn format_book(&self, outcome: &FullBookOutcome) -> String {
        Self::to_json(&BookDocument {
            status: outcome.status(),
            total_words: outcome.total_words(),
            outcome,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookwright_application::ChapterFailure;
    use bookwright_domain::{ChapterPlan, GenerationErrorKind, ProviderKind};

    fn outline() -> Outline {
        Outline::new(
            Some("A town keeps its secrets.".to_string()),
            vec![
                ChapterPlan::new(1, "The Body", "A fisherman is found.")
                    .with_key_points(vec!["Introduce the inspector".to_string()]),
                ChapterPlan::new(2, "The Ledger", "Debts surface."),
            ],
        )
        .unwrap()
    }

    fn chapter(index: u32) -> Chapter {
        Chapter::new(
            index,
            format!("Part {}", index),
            "Fog rolled in over the harbor.",
            ProviderKind::OpenAi,
            Some(1),
        )
    }

    fn partial() -> FullBookOutcome {
        FullBookOutcome {
            outline: Some(outline()),
            chapters: vec![chapter(1)],
            failure: Some(ChapterFailure {
                index: Some(2),
                kind: GenerationErrorKind::ProviderUnavailable,
                message: "503 from provider".to_string(),
            }),
            cancelled: false,
        }
    }

    #[test]
    fn test_text_outline_lists_chapters() {
        colored::control::set_override(false);
        let text = ConsoleFormatter.format_outline(&outline());
        assert!(text.contains("A town keeps its secrets."));
        assert!(text.contains("Chapter 1: The Body"));
        assert!(text.contains("  * Introduce the inspector"));
        assert!(text.contains("Chapter 2: The Ledger"));
    }

    #[test]
    fn test_text_book_reports_partial_status() {
        colored::control::set_override(false);
        let text = ConsoleFormatter.format_book(&partial());
        assert!(text.contains("Fog rolled in over the harbor."));
        assert!(text.contains("stopped at chapter 2"));
        assert!(text.contains("503 from provider"));
    }

    #[test]
    fn test_retry_hint_only_for_transient_failures() {
        colored::control::set_override(false);
        let text = ConsoleFormatter.format_book(&partial());
        assert!(text.contains("retry with `bookwright chapter 2`"));

        let mut rejected = partial();
        if let Some(failure) = rejected.failure.as_mut() {
            failure.kind = GenerationErrorKind::AuthenticationFailed;
        }
        let text = ConsoleFormatter.format_book(&rejected);
        assert!(!text.contains("may be temporary"));
    }

    #[test]
    fn test_json_book_document() {
        let json: serde_json::Value =
            serde_json::from_str(&JsonFormatter.format_book(&partial())).unwrap();
        assert_eq!(json["status"], "partial");
        assert_eq!(json["failed_at"], 2);
        assert_eq!(json["total_words"], 6);
        assert_eq!(json["chapters"][0]["index"], 1);
        assert_eq!(json["failure"]["kind"], "provider_unavailable");
        assert_eq!(json["outline"]["chapters"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_json_chapter_has_no_credentials() {
        let json: serde_json::Value =
            serde_json::from_str(&JsonFormatter.format_chapter(&chapter(3))).unwrap();
        assert_eq!(json["index"], 3);
        assert_eq!(json["provider"], "openai");
        assert!(json.get("credential").is_none());
    }
}
