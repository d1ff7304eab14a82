use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Word stems that mark a review as positive. Matched as substrings.
const POSITIVE_STEMS: &[&str] = &[
    "хорош",
    "отличн",
    "прекрасн",
    "люблю",
    "нравится",
    "супер",
    "класс",
];

/// Word stems that mark a review as negative. Matched as substrings.
const NEGATIVE_STEMS: &[&str] = &[
    "плох",
    "ужасн",
    "ненавиж",
    "отвратительн",
    "кошмар",
    "разочарован",
];

/// Sentiment label assigned to a review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Negative, Sentiment::Neutral];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown sentiment label: {0}")]
pub struct UnknownSentiment(pub String);

impl FromStr for Sentiment {
    type Err = UnknownSentiment;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Sentiment::ALL
            .into_iter()
            .find(|label| label.as_str() == s)
            .ok_or_else(|| UnknownSentiment(s.to_string()))
    }
}

/// Classify text by keyword stems.
///
/// Positive stems are checked first, so text carrying both positive and
/// negative stems is positive.
pub fn classify(text: &str) -> Sentiment {
    let text = text.to_lowercase();

    if POSITIVE_STEMS.iter().any(|stem| text.contains(stem)) {
        Sentiment::Positive
    } else if NEGATIVE_STEMS.iter().any(|stem| text.contains(stem)) {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}
