//! Prompt templates for outline and chapter generation

use crate::book::BookSpecification;
use crate::continuity::ContinuityContext;
use crate::core::error::GenerationErrorKind;
use std::fmt::Write;
use thiserror::Error;

/// Maximum accepted length (in characters) of user-supplied text fields.
pub struct PromptLimits;

impl PromptLimits {
    pub const TITLE: usize = 200;
    pub const TARGET_AUDIENCE: usize = 200;
    pub const THEME: usize = 2_000;
    pub const ADDITIONAL_DETAILS: usize = 4_000;
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PromptError {
    #[error("{field} is too long: {actual} characters (maximum {max})")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },
}

impl PromptError {
    pub fn kind(&self) -> GenerationErrorKind {
        GenerationErrorKind::InvalidRequest
    }
}

/// Templates for the prompts sent to every provider
pub struct BookPromptTemplate;

impl BookPromptTemplate {
    /// System prompt shared by all requests
    pub fn system_prompt() -> &'static str {
        "You are a professional book writer. Create engaging, well-structured content."
    }

    /// Reject text fields above [`PromptLimits`]. Nothing is ever truncated.
    pub fn check_limits(spec: &BookSpecification) -> Result<(), PromptError> {
        check_len("title", &spec.title, PromptLimits::TITLE)?;
        check_len(
            "target audience",
            &spec.target_audience,
            PromptLimits::TARGET_AUDIENCE,
        )?;
        check_len("theme", &spec.theme, PromptLimits::THEME)?;
        if let Some(details) = &spec.additional_details {
            check_len(
                "additional details",
                details,
                PromptLimits::ADDITIONAL_DETAILS,
            )?;
        }
        Ok(())
    }

    /// Prompt asking for an outline with exactly `chapter_count` entries
    pub fn outline_prompt(spec: &BookSpecification) -> Result<String, PromptError> {
        Self::check_limits(spec)?;
        let mut prompt = format!(
            "Create a detailed book outline for a {} book with the following specifications:\n\n",
            spec.genre
        );
        push_book_details(&mut prompt, spec);
        let _ = write!(
            prompt,
            r#"
Provide a one-paragraph synopsis of the whole book, then exactly {count} chapters.
Use exactly this format and these labels, with no other headers:

SYNOPSIS: <one paragraph>

CHAPTER 1: <chapter title>
SUMMARY: <2-4 sentences describing what happens in the chapter>
KEY POINTS:
- <key event or concept>
- <key event or concept>

CHAPTER 2: <chapter title>
...

Number the chapters 1 to {count}, in reading order."#,
            count = spec.chapter_count
        );
        Ok(prompt)
    }

    /// Re-prompt used when the first outline had the wrong number of chapters
    pub fn strict_outline_prompt(
        spec: &BookSpecification,
        previous_count: usize,
    ) -> Result<String, PromptError> {
        let base = Self::outline_prompt(spec)?;
        Ok(format!(
            r#"{base}

IMPORTANT: Your previous answer contained {previous_count} chapters, but exactly {count} are required.
Return exactly {count} chapters, numbered CHAPTER 1 through CHAPTER {count}, each with a SUMMARY line and a KEY POINTS list.
Do not add any text before SYNOPSIS or after the last chapter."#,
            count = spec.chapter_count
        ))
    }

    /// Prompt for chapter `index`, including its plan and continuity context
    pub fn chapter_prompt(
        spec: &BookSpecification,
        index: u32,
        context: &ContinuityContext,
    ) -> Result<String, PromptError> {
        Self::check_limits(spec)?;

        let mut prompt = match &context.current_plan {
            Some(plan) => format!(
                "Write Chapter {} \"{}\" of {} for the book \"{}\".\n\n",
                index, plan.title, spec.chapter_count, spec.title
            ),
            None => format!(
                "Write Chapter {} of {} for the book \"{}\".\n\n",
                index, spec.chapter_count, spec.title
            ),
        };

        prompt.push_str("Book Context:\n");
        let _ = writeln!(prompt, "- Genre: {}", spec.genre);
        let _ = writeln!(prompt, "- Target Audience: {}", spec.target_audience);
        let _ = writeln!(prompt, "- Theme: {}", spec.theme);
        if let Some(details) = &spec.additional_details {
            let _ = writeln!(prompt, "- Additional Details: {}", details);
        }

        prompt.push_str("\nChapter Guidelines:\n");
        let _ = writeln!(
            prompt,
            "- Target Length: Approximately {} words",
            spec.chapter_word_target()
        );
        let _ = writeln!(prompt, "- Tone: {}", spec.tone.description());

        match &context.current_plan {
            Some(plan) => {
                let _ = writeln!(prompt, "- Chapter Description: {}", plan.summary);
                if !plan.key_points.is_empty() {
                    prompt.push_str("- Key Points to cover:\n");
                    for point in &plan.key_points {
                        let _ = writeln!(prompt, "  - {}", point);
                    }
                }
            }
            None => prompt.push_str(
                "- No outline is available. Write this chapter so it stands on its own while fitting the book details above.\n",
            ),
        }

        if !context.prior.is_empty() {
            prompt.push_str("\nStory so far (earlier chapters, condensed):\n");
            for digest in &context.prior {
                let _ = writeln!(
                    prompt,
                    "- Chapter {} \"{}\": {}",
                    digest.index, digest.title, digest.summary
                );
            }
        }

        if let Some(previous) = context.missing_predecessor {
            let _ = writeln!(
                prompt,
                "\nNote: Chapter {} has not been written yet. Do not invent its specific events; keep transitions general.",
                previous
            );
        }

        prompt.push_str(
            r#"
Write the complete chapter text only. Do not repeat or summarize events from earlier chapters; continue from where the story stands.
Keep characters, names, settings, and plot facts consistent with the earlier chapters.
Include proper pacing and advance the main theme or plot."#,
        );

        Ok(prompt)
    }
}

fn check_len(field: &'static str, value: &str, max: usize) -> Result<(), PromptError> {
    let actual = value.chars().count();
    if actual > max {
        return Err(PromptError::TooLong { field, max, actual });
    }
    Ok(())
}

fn push_book_details(prompt: &mut String, spec: &BookSpecification) {
    let _ = writeln!(prompt, "Title: {}", spec.title);
    let _ = writeln!(prompt, "Genre: {}", spec.genre);
    let _ = writeln!(prompt, "Target Audience: {}", spec.target_audience);
    let _ = writeln!(prompt, "Main Theme: {}", spec.theme);
    let _ = writeln!(prompt, "Tone: {}", spec.tone.description());
    let _ = writeln!(prompt, "Number of Chapters: {}", spec.chapter_count);
    let _ = writeln!(prompt, "Estimated Length: {} words", spec.target_length);
    if let Some(details) = &spec.additional_details {
        let _ = write!(prompt, "\nAdditional Details:\n{}\n", details);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::{Genre, Tone};
    use crate::continuity::PriorChapterDigest;
    use crate::outline::ChapterPlan;

    fn spec() -> BookSpecification {
        BookSpecification::new(
            "The Quiet Harbor",
            Genre::Mystery,
            "Adults",
            50_000,
            "Secrets of a fishing town",
            5,
            Tone::Dark,
        )
    }

    #[test]
    fn test_outline_prompt_contains_spec_fields() {
        let prompt = BookPromptTemplate::outline_prompt(&spec()).unwrap();
        assert!(prompt.contains("The Quiet Harbor"));
        assert!(prompt.contains("mystery"));
        assert!(prompt.contains("Adults"));
        assert!(prompt.contains("Secrets of a fishing town"));
        assert!(prompt.contains("exactly 5 chapters"));
        assert!(prompt.contains("50000 words"));
        assert!(prompt.contains("SYNOPSIS:"));
        assert!(prompt.contains("KEY POINTS:"));
    }

    #[test]
    fn test_outline_prompt_is_deterministic() {
        assert_eq!(
            BookPromptTemplate::outline_prompt(&spec()).unwrap(),
            BookPromptTemplate::outline_prompt(&spec()).unwrap()
        );
    }

    #[test]
    fn test_strict_prompt_mentions_previous_count() {
        let prompt = BookPromptTemplate::strict_outline_prompt(&spec(), 3).unwrap();
        assert!(prompt.contains("contained 3 chapters"));
        assert!(prompt.contains("CHAPTER 1 through CHAPTER 5"));
    }

    #[test]
    fn test_theme_too_long_is_rejected() {
        let mut spec = spec();
        spec.theme = "x".repeat(PromptLimits::THEME + 1);
        let err = BookPromptTemplate::outline_prompt(&spec).unwrap_err();
        assert_eq!(
            err,
            PromptError::TooLong {
                field: "theme",
                max: PromptLimits::THEME,
                actual: PromptLimits::THEME + 1
            }
        );
        assert_eq!(err.kind(), GenerationErrorKind::InvalidRequest);
    }

    #[test]
    fn test_title_limit_counts_characters() {
        let mut spec = spec();
        spec.title = "é".repeat(PromptLimits::TITLE);
        assert!(BookPromptTemplate::check_limits(&spec).is_ok());
        spec.title.push('é');
        assert!(BookPromptTemplate::check_limits(&spec).is_err());
    }

    #[test]
    fn test_chapter_prompt_with_plan_and_context() {
        let context = ContinuityContext {
            current_plan: Some(
                ChapterPlan::new(2, "The Storm", "A storm cuts the town off.")
                    .with_key_points(vec!["The ferry sinks".to_string()]),
            ),
            prior: vec![PriorChapterDigest {
                index: 1,
                title: "Arrival".to_string(),
                summary: "Mara returns home.".to_string(),
            }],
            missing_predecessor: None,
        };
        let prompt = BookPromptTemplate::chapter_prompt(&spec(), 2, &context).unwrap();
        assert!(prompt.contains("Chapter 2 \"The Storm\""));
        assert!(prompt.contains("A storm cuts the town off."));
        assert!(prompt.contains("The ferry sinks"));
        assert!(prompt.contains("Mara returns home."));
        assert!(prompt.contains("10000 words"));
        assert!(prompt.contains("Do not repeat"));
        assert!(prompt.contains("consistent"));
        assert!(!prompt.contains("No outline is available"));
    }

    #[test]
    fn test_chapter_prompt_standalone() {
        let context = ContinuityContext {
            missing_predecessor: Some(2),
            ..Default::default()
        };
        let prompt = BookPromptTemplate::chapter_prompt(&spec(), 3, &context).unwrap();
        assert!(prompt.contains("No outline is available"));
        assert!(prompt.contains("Chapter 2 has not been written yet"));
        assert!(!prompt.contains("Story so far"));
    }
}
