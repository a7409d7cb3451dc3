//! Mascot expression catalog identifiers
//!
//! Expressions are a closed set: internally-produced values are always valid
//! by construction, and the single place untrusted names enter the system
//! (the vision model's reply) goes through [`Expression::parse_lenient`].

use serde::{Deserialize, Serialize};

/// One entry in the fixed mascot-mood catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expression {
    /// Neutral resting face
    Idle,
    /// Pondering a question
    Thinking,
    /// Extended analysis variant of thinking
    DeepThinking,
    /// Composing a reply
    Typing,
    /// Celebrating a success or compliment
    Excited,
    /// Rain-themed face
    Rainy,
    /// Heat-themed face
    Hot,
    /// Cold-themed face
    Cold,
    /// Reacting to a warning or emergency
    Alarmed,
    /// Apologising for a failure
    Apologetic,
    /// Thunderstorm-themed face
    Stormy,
    /// Downcast
    Sad,
    /// Frightened
    Scared,
    /// Irritated
    Angry,
    /// Flustered
    Embarrassed,
    /// In love
    Smitten,
    /// Optimistic
    Hopeful,
    /// Waving goodbye
    Farewell,
    /// Puzzled
    Confused,
}

impl Expression {
    /// Every catalog member, in catalog order
    pub const ALL: [Self; 19] = [
        Self::Idle,
        Self::Thinking,
        Self::DeepThinking,
        Self::Typing,
        Self::Excited,
        Self::Rainy,
        Self::Hot,
        Self::Cold,
        Self::Alarmed,
        Self::Apologetic,
        Self::Stormy,
        Self::Sad,
        Self::Scared,
        Self::Angry,
        Self::Embarrassed,
        Self::Smitten,
        Self::Hopeful,
        Self::Farewell,
        Self::Confused,
    ];

    /// Stable identifier used in prompts and wire formats
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Thinking => "thinking",
            Self::DeepThinking => "deep_thinking",
            Self::Typing => "typing",
            Self::Excited => "excited",
            Self::Rainy => "rainy",
            Self::Hot => "hot",
            Self::Cold => "cold",
            Self::Alarmed => "alarmed",
            Self::Apologetic => "apologetic",
            Self::Stormy => "stormy",
            Self::Sad => "sad",
            Self::Scared => "scared",
            Self::Angry => "angry",
            Self::Embarrassed => "embarrassed",
            Self::Smitten => "smitten",
            Self::Hopeful => "hopeful",
            Self::Farewell => "farewell",
            Self::Confused => "confused",
        }
    }

    /// Parse an exact catalog identifier, e.g. `"deep_thinking"`
    pub fn from_name(name: &str) -> Result<Self, crate::DomainError> {
        Self::ALL
            .into_iter()
            .find(|expr| expr.name() == name)
            .ok_or_else(|| crate::DomainError::UnknownExpression(name.to_string()))
    }

    /// Parse an untrusted expression name, e.g. from a vision model reply.
    ///
    /// Resolution order: exact identifier or display-name match, then
    /// substring containment in either direction, then a keyword scan over
    /// the catalog rules. Always returns a catalog member; unrecognisable
    /// input maps to [`Expression::Idle`].
    #[must_use]
    pub fn parse_lenient(raw: &str) -> Self {
        let needle = raw.trim().to_lowercase().replace(['-', ' '], "_");
        if needle.is_empty() {
            return Self::Idle;
        }

        if let Ok(expr) = Self::from_name(&needle) {
            return expr;
        }

        let loose = needle.replace('_', " ");
        for rule in crate::catalog::CATALOG {
            if loose == rule.display_name.to_lowercase() {
                return rule.expression;
            }
        }

        for expr in Self::ALL {
            let name = expr.name().replace('_', " ");
            if loose.contains(&name) || name.contains(&loose) {
                return expr;
            }
        }

        // Last resort: does the reply mention any of a rule's keywords?
        for rule in crate::catalog::CATALOG {
            if rule.keywords.iter().any(|k| loose.contains(k)) {
                return rule.expression;
            }
        }

        Self::Idle
    }
}

impl std::fmt::Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
