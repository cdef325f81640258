//! Genre and tone value objects.

use super::specification::SpecificationError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Fixed catalog of supported genres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Genre {
    Fiction,
    NonFiction,
    Mystery,
    Romance,
    ScienceFiction,
    Fantasy,
    Thriller,
    Horror,
    Biography,
    SelfHelp,
    Business,
    Children,
    YoungAdult,
    History,
    Poetry,
}

impl Genre {
    pub const ALL: [Genre; 15] = [
        Genre::Fiction,
        Genre::NonFiction,
        Genre::Mystery,
        Genre::Romance,
        Genre::ScienceFiction,
        Genre::Fantasy,
        Genre::Thriller,
        Genre::Horror,
        Genre::Biography,
        Genre::SelfHelp,
        Genre::Business,
        Genre::Children,
        Genre::YoungAdult,
        Genre::History,
        Genre::Poetry,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Genre::Fiction => "fiction",
            Genre::NonFiction => "non-fiction",
            Genre::Mystery => "mystery",
            Genre::Romance => "romance",
            Genre::ScienceFiction => "science-fiction",
            Genre::Fantasy => "fantasy",
            Genre::Thriller => "thriller",
            Genre::Horror => "horror",
            Genre::Biography => "biography",
            Genre::SelfHelp => "self-help",
            Genre::Business => "business",
            Genre::Children => "children",
            Genre::YoungAdult => "young-adult",
            Genre::History => "history",
            Genre::Poetry => "poetry",
        }
    }

    /// Narrative genres get character/plot continuity instructions; the rest
    /// get argument/concept continuity instructions.
    pub fn is_narrative(&self) -> bool {
        !matches!(
            self,
            Genre::NonFiction | Genre::Biography | Genre::SelfHelp | Genre::Business | Genre::History
        )
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Genre {
    type Err = SpecificationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['_', ' '], "-");
        let normalized = match normalized.as_str() {
            "nonfiction" => "non-fiction",
            "sci-fi" | "scifi" => "science-fiction",
            "ya" => "young-adult",
            "childrens" | "children's" => "children",
            other => other,
        };
        Genre::ALL
            .into_iter()
            .find(|g| g.as_str() == normalized)
            .ok_or_else(|| SpecificationError::UnknownGenre(s.to_string()))
    }
}

/// Narrative tone requested for the book.
///
/// The common tones are named; anything else is kept verbatim as `Custom`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Tone {
    #[default]
    Engaging,
    Dark,
    Humorous,
    Formal,
    Conversational,
    Inspirational,
    Suspenseful,
    Whimsical,
    Custom(String),
}

impl Tone {
    pub fn as_str(&self) -> &str {
        match self {
            Tone::Engaging => "engaging",
            Tone::Dark => "dark",
            Tone::Humorous => "humorous",
            Tone::Formal => "formal",
            Tone::Conversational => "conversational",
            Tone::Inspirational => "inspirational",
            Tone::Suspenseful => "suspenseful",
            Tone::Whimsical => "whimsical",
            Tone::Custom(s) => s,
        }
    }

    /// Wording used in prompts.
    pub fn description(&self) -> &str {
        match self {
            Tone::Engaging => "Engaging and appropriate for the genre",
            Tone::Dark => "Dark and brooding",
            Tone::Humorous => "Humorous and light-hearted",
            Tone::Formal => "Formal and precise",
            Tone::Conversational => "Conversational and approachable",
            Tone::Inspirational => "Inspirational and uplifting",
            Tone::Suspenseful => "Suspenseful, building tension",
            Tone::Whimsical => "Whimsical and playful",
            Tone::Custom(s) => s,
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tone {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "engaging" => Tone::Engaging,
            "dark" => Tone::Dark,
            "humorous" | "funny" => Tone::Humorous,
            "formal" => Tone::Formal,
            "conversational" => Tone::Conversational,
            "inspirational" => Tone::Inspirational,
            "suspenseful" => Tone::Suspenseful,
            "whimsical" => Tone::Whimsical,
            _ => Tone::Custom(s.trim().to_string()),
        })
    }
}

impl Serialize for Tone {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Tone {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(s.parse::<Tone>().unwrap_or_default())
    }
}
