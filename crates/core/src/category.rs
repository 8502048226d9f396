use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fixed rule category taxonomy.
///
/// Declaration order is the canonical iteration order: catalogs sort rules by
/// category first, and results list category scores in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Grammatical form of the term and definition (e.g. singular policy).
    Grammar,
    /// Does the definition restate the defined term.
    Circularity,
    /// Sentence openings, sentence count, required structural elements.
    Structure,
    /// Qualifier/genus relationships.
    Coherence,
    /// Forbidden constructs.
    Integrity,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Grammar,
        Category::Circularity,
        Category::Structure,
        Category::Coherence,
        Category::Integrity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Grammar => "grammar",
            Category::Circularity => "circularity",
            Category::Structure => "structure",
            Category::Coherence => "coherence",
            Category::Integrity => "integrity",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "grammar" => Ok(Category::Grammar),
            "circularity" => Ok(Category::Circularity),
            "structure" => Ok(Category::Structure),
            "coherence" => Ok(Category::Coherence),
            "integrity" => Ok(Category::Integrity),
            other => Err(format!("unknown category: '{}'", other)),
        }
    }
}
