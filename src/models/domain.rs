use serde::{Deserialize, Serialize};

/// The five personality dimensions measured by the survey.
///
/// The set is closed: every question maps to exactly one of these, and a
/// score vector always carries one value per variant. Labels follow the
/// survey's published category names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Mindset,
    #[serde(rename = "Self-Management")]
    SelfManagement,
    Interactions,
    Personality,
    Resilience,
}

impl Category {
    /// All categories, in canonical (storage and display) order.
    pub const ALL: [Category; 5] = [
        Category::Mindset,
        Category::SelfManagement,
        Category::Interactions,
        Category::Personality,
        Category::Resilience,
    ];

    /// The survey label for this category.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Mindset => "Mindset",
            Category::SelfManagement => "Self-Management",
            Category::Interactions => "Interactions",
            Category::Personality => "Personality",
            Category::Resilience => "Resilience",
        }
    }

    /// Look up a category by its survey label.
    ///
    /// Returns `None` for labels outside the closed set so a typo in
    /// reference data surfaces as an error instead of a dropped category.
    pub fn from_label(label: &str) -> Option<Category> {
        match label {
            "Mindset" => Some(Category::Mindset),
            "Self-Management" => Some(Category::SelfManagement),
            "Interactions" => Some(Category::Interactions),
            "Personality" => Some(Category::Personality),
            "Resilience" => Some(Category::Resilience),
            _ => None,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One user's derived personality scores, one value per category.
///
/// Values are intended to lie in [0, 100]. A vector is recomputed wholesale
/// whenever the owner's response set changes; it is never patched
/// incrementally.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryScores {
    pub mindset: f64,
    #[serde(rename = "selfManagement")]
    pub self_management: f64,
    pub interactions: f64,
    pub personality: f64,
    pub resilience: f64,
}

impl CategoryScores {
    /// Build a vector by evaluating `f` for every category.
    pub fn from_fn(mut f: impl FnMut(Category) -> f64) -> Self {
        Self {
            mindset: f(Category::Mindset),
            self_management: f(Category::SelfManagement),
            interactions: f(Category::Interactions),
            personality: f(Category::Personality),
            resilience: f(Category::Resilience),
        }
    }

    /// Build a vector with the same value in every dimension.
    pub fn uniform(value: f64) -> Self {
        Self::from_fn(|_| value)
    }

    /// The score for one category.
    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::Mindset => self.mindset,
            Category::SelfManagement => self.self_management,
            Category::Interactions => self.interactions,
            Category::Personality => self.personality,
            Category::Resilience => self.resilience,
        }
    }

    /// The five scores in canonical category order.
    pub fn to_array(&self) -> [f64; 5] {
        [
            self.mindset,
            self.self_management,
            self.interactions,
            self.personality,
            self.resilience,
        ]
    }
}

/// A survey question: static reference data seeded by migration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub category: Category,
    #[serde(rename = "questionText")]
    pub text: String,
    #[serde(rename = "questionNumber")]
    pub number: i16,
}

/// One answered question: the unit the aggregator consumes.
///
/// `answer` is a Likert value, 1 through 5. The category is resolved from
/// the question before the response reaches the core, so the core never
/// performs reference-data lookups of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurveyResponse {
    pub question_id: i64,
    pub category: Category,
    pub answer: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_round_trip() {
        for category in Category::ALL {
            assert_eq!(Category::from_label(category.label()), Some(category));
        }
    }

    #[test]
    fn test_unknown_label_rejected() {
        assert_eq!(Category::from_label("Charisma"), None);
        assert_eq!(Category::from_label("mindset"), None);
        assert_eq!(Category::from_label(""), None);
    }

    #[test]
    fn test_scores_array_order_matches_all() {
        let scores = CategoryScores::from_fn(|c| match c {
            Category::Mindset => 1.0,
            Category::SelfManagement => 2.0,
            Category::Interactions => 3.0,
            Category::Personality => 4.0,
            Category::Resilience => 5.0,
        });

        let array = scores.to_array();
        for (i, category) in Category::ALL.iter().enumerate() {
            assert_eq!(array[i], scores.get(*category));
        }
    }

    #[test]
    fn test_uniform() {
        let scores = CategoryScores::uniform(60.0);
        assert!(scores.to_array().iter().all(|&s| s == 60.0));
    }
}
