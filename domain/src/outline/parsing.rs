//! Outline response parsing.
//!
//! Extracts a structured outline from the free-form text a provider returns
//! for the outline prompt. Pure text pattern matching, no I/O.
//!
//! # Accepted formats
//!
//! 1. **JSON** (tried first): `{"synopsis": "...", "chapters": [{"title": ..., "summary": ..., "key_points": [...]}]}`
//! 2. **Labelled sections** (what the outline prompt asks for):
//!
//! ```text
//! SYNOPSIS: One paragraph.
//!
//! CHAPTER 1: The Arrival
//! SUMMARY: Two to four sentences.
//! KEY POINTS:
//! - First point
//! ```
//!
//! Markdown decoration (`#`, `**`), label case, and the separator after the
//! chapter number (`:`, `-`, `.`) are tolerated. Plans are numbered by order
//! of appearance.

use super::entities::ChapterPlan;
use serde::Deserialize;

/// Result of parsing an outline response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedOutline {
    pub synopsis: Option<String>,
    pub plans: Vec<ChapterPlan>,
}

const SYNOPSIS_LABELS: [&str; 3] = ["book summary", "synopsis", "overview"];
const TITLE_LABELS: [&str; 1] = ["title"];
const SUMMARY_LABELS: [&str; 3] = ["summary", "description", "synopsis"];
const KEY_POINT_LABELS: [&str; 5] = [
    "key points",
    "key point",
    "keypoints",
    "key events",
    "main points",
];

/// Parse an outline response. Returns an empty `plans` list when nothing
/// recognizable was found.
pub fn parse_outline(response: &str) -> ParsedOutline {
    if let Some(parsed) = parse_outline_json(response) {
        return parsed;
    }
    parse_outline_sections(response)
}

#[derive(Deserialize)]
struct JsonOutline {
    #[serde(default, alias = "summary", alias = "book_summary")]
    synopsis: Option<String>,
    chapters: Vec<JsonChapter>,
}

#[derive(Deserialize)]
struct JsonChapter {
    #[serde(default)]
    title: String,
    #[serde(default, alias = "description")]
    summary: String,
    #[serde(default, alias = "keyPoints", alias = "key_events")]
    key_points: Vec<String>,
}

fn parse_outline_json(response: &str) -> Option<ParsedOutline> {
    let start = response.find('{')?;
    let end = response.rfind('}')?;
    if end <= start {
        return None;
    }
    let parsed: JsonOutline = serde_json::from_str(&response[start..=end]).ok()?;
    let plans = parsed
        .chapters
        .into_iter()
        .enumerate()
        .map(|(i, ch)| {
            let index = i as u32 + 1;
            let title = non_empty_or(ch.title.trim(), || default_title(index));
            ChapterPlan::new(index, title, ch.summary.trim()).with_key_points(
                ch.key_points
                    .into_iter()
                    .map(|p| p.trim().to_string())
                    .filter(|p| !p.is_empty())
                    .collect(),
            )
        })
        .collect();
    Some(ParsedOutline {
        synopsis: parsed
            .synopsis
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
        plans,
    })
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    Preamble,
    Synopsis,
    Summary,
    KeyPoints,
}

struct PlanDraft {
    title: String,
    summary: Vec<String>,
    key_points: Vec<String>,
}

impl PlanDraft {
    fn into_plan(self, index: u32) -> ChapterPlan {
        let title = non_empty_or(self.title.trim(), || default_title(index));
        ChapterPlan::new(index, title, self.summary.join(" ")).with_key_points(self.key_points)
    }
}

fn parse_outline_sections(response: &str) -> ParsedOutline {
    let mut synopsis: Vec<String> = Vec::new();
    let mut drafts: Vec<PlanDraft> = Vec::new();
    let mut section = Section::Preamble;

    for raw in response.lines() {
        let line = strip_decoration(raw);
        if line.is_empty() {
            continue;
        }

        if let Some((_, title)) = parse_chapter_heading(&line) {
            drafts.push(PlanDraft {
                title,
                summary: Vec::new(),
                key_points: Vec::new(),
            });
            section = Section::Summary;
            continue;
        }

        let Some(current) = drafts.last_mut() else {
            // Before the first chapter heading only the synopsis matters.
            if let Some(rest) = strip_label(&line, &SYNOPSIS_LABELS) {
                section = Section::Synopsis;
                push_non_empty(&mut synopsis, rest);
            } else if section == Section::Synopsis {
                synopsis.push(line);
            }
            continue;
        };

        if let Some(rest) = strip_label(&line, &KEY_POINT_LABELS) {
            section = Section::KeyPoints;
            push_non_empty(&mut current.key_points, rest);
        } else if let Some(rest) = strip_label(&line, &SUMMARY_LABELS) {
            section = Section::Summary;
            push_non_empty(&mut current.summary, rest);
        } else if let Some(rest) = strip_label(&line, &TITLE_LABELS) {
            if current.title.is_empty() {
                current.title = clean_title(rest);
            }
        } else if section == Section::KeyPoints {
            let point = strip_bullet(&line).unwrap_or(&line);
            push_non_empty(&mut current.key_points, point);
        } else {
            current.summary.push(line);
        }
    }

    ParsedOutline {
        synopsis: Some(synopsis.join(" ")).filter(|s| !s.is_empty()),
        plans: drafts
            .into_iter()
            .enumerate()
            .map(|(i, d)| d.into_plan(i as u32 + 1))
            .collect(),
    }
}

/// Recognize a `Chapter N: Title` heading, returning the number and title.
///
/// The title may be empty when the model puts it on a separate `TITLE:` line.
pub fn parse_chapter_heading(line: &str) -> Option<(u32, String)> {
    let after = strip_prefix_ignore_case(line, "chapter")?.trim_start();
    let digits = after.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    let number: u32 = after[..digits].parse().ok()?;
    let title = after[digits..].trim_start_matches(|c: char| {
        c.is_whitespace() || matches!(c, ':' | '-' | '.' | ')' | '\u{2013}' | '\u{2014}')
    });
    Some((number, clean_title(title)))
}

/// Normalize a generated chapter body.
///
/// Trims surrounding whitespace and drops a leading `Chapter N ...` heading
/// the model may have echoed. Returns `None` when nothing remains.
pub fn clean_chapter_body(text: &str) -> Option<String> {
    let trimmed = text.trim();
    let mut lines = trimmed.lines();
    let body = match lines.next() {
        Some(first) if parse_chapter_heading(&strip_decoration(first)).is_some() => {
            lines.collect::<Vec<_>>().join("\n").trim().to_string()
        }
        _ => trimmed.to_string(),
    };
    Some(body).filter(|b| !b.is_empty())
}

fn strip_decoration(line: &str) -> String {
    line.replace("**", "")
        .replace("__", "")
        .trim()
        .trim_start_matches('#')
        .trim()
        .to_string()
}

fn strip_label<'a>(line: &'a str, labels: &[&str]) -> Option<&'a str> {
    for label in labels {
        if let Some(rest) = strip_prefix_ignore_case(line, label) {
            let rest = rest.trim_start();
            if let Some(value) = rest.strip_prefix(':') {
                return Some(value.trim());
            }
            if rest.is_empty() {
                return Some("");
            }
        }
    }
    None
}

fn strip_prefix_ignore_case<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let head = line.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &line[prefix.len()..])
}

fn strip_bullet(line: &str) -> Option<&str> {
    for prefix in ["- ", "* ", "• ", "+ "] {
        if let Some(rest) = line.strip_prefix(prefix) {
            return Some(rest.trim());
        }
    }
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(rest) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            return Some(rest.trim());
        }
    }
    None
}

fn clean_title(title: &str) -> String {
    title
        .trim()
        .trim_matches(|c: char| matches!(c, '"' | '\'' | '*' | '“' | '”'))
        .trim()
        .to_string()
}

fn push_non_empty(target: &mut Vec<String>, text: &str) {
    let text = text.trim();
    if !text.is_empty() {
        target.push(text.to_string());
    }
}

fn non_empty_or(text: &str, fallback: impl FnOnce() -> String) -> String {
    if text.is_empty() {
        fallback()
    } else {
        text.to_string()
    }
}

fn default_title(index: u32) -> String {
    format!("Chapter {}", index)
}
