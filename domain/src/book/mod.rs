//! Book domain
//!
//! The user's description of the book to generate: [`BookSpecification`],
//! with its [`Genre`] catalog and [`Tone`].

mod genre;
mod specification;

pub use genre::{Genre, Tone};
pub use specification::{
    BookSpecification, CHAPTER_COUNT_RANGE, SpecificationError, TARGET_LENGTH_RANGE,
    WORDS_PER_CHAPTER_RANGE,
};
