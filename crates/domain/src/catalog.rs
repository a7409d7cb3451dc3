//! Static scoring rules for the expression catalog
//!
//! One rule per [`Expression`]: literal keywords (stack per distinct match),
//! sentiment labels (single bonus), trigger phrases (first match only), and
//! an integer priority in `1..=10` reflecting general salience. The table is
//! immutable data; the scoring and adjustment logic lives in the
//! application layer so the "why did X win" reasoning stays inspectable.

use crate::expression::Expression;

/// Immutable scoring rule for one catalog expression
#[derive(Debug, Clone, Copy)]
pub struct ExpressionRule {
    /// The expression this rule scores
    pub expression: Expression,
    /// Human-readable name, also accepted by `Expression::parse_lenient`
    pub display_name: &'static str,
    /// Literal keywords, matched as substrings of lowercased content
    pub keywords: &'static [&'static str],
    /// Sentiment labels, single bonus if any is present
    pub sentiments: &'static [&'static str],
    /// Salience priority, 1 (background) to 10 (dominant)
    pub priority: u8,
    /// Trigger phrases; the first match scores, further ones do not stack
    pub triggers: &'static [&'static str],
}

/// The full rule table, in catalog order (ties in scoring keep this order)
pub const CATALOG: &[ExpressionRule] = &[
    ExpressionRule {
        expression: Expression::Idle,
        display_name: "Neutral",
        keywords: &["hello", "hey", "okay"],
        sentiments: &["neutral"],
        priority: 1,
        triggers: &["how are you", "what's up"],
    },
    ExpressionRule {
        expression: Expression::Thinking,
        display_name: "Thinking",
        keywords: &["think", "consider", "ponder", "hmm"],
        sentiments: &["curious"],
        priority: 3,
        triggers: &["let me think", "good question"],
    },
    ExpressionRule {
        expression: Expression::DeepThinking,
        display_name: "Deep in thought",
        keywords: &["analyze", "analysis", "complex", "deep dive"],
        sentiments: &["focused"],
        priority: 4,
        triggers: &["thinking hard", "deep analysis"],
    },
    ExpressionRule {
        expression: Expression::Typing,
        display_name: "Typing",
        keywords: &["typing", "writing", "drafting"],
        sentiments: &[],
        priority: 2,
        triggers: &["one moment", "hold on"],
    },
    ExpressionRule {
        expression: Expression::Excited,
        display_name: "Celebrating",
        keywords: &[
            "awesome",
            "amazing",
            "fantastic",
            "wonderful",
            "thank",
            "congrats",
            "yay",
        ],
        sentiments: &["positive", "joy"],
        priority: 5,
        triggers: &["thank you", "well done", "you did it"],
    },
    ExpressionRule {
        expression: Expression::Rainy,
        display_name: "Rainy",
        keywords: &["rain", "drizzle", "umbrella", "downpour", "wet"],
        sentiments: &[],
        priority: 6,
        triggers: &["bring an umbrella", "it's raining"],
    },
    ExpressionRule {
        expression: Expression::Hot,
        display_name: "Hot",
        keywords: &["hot", "heat", "scorching", "sweat", "sweltering"],
        sentiments: &[],
        priority: 6,
        triggers: &["heat wave", "so hot today"],
    },
    ExpressionRule {
        expression: Expression::Cold,
        display_name: "Cold",
        keywords: &["cold", "freezing", "chilly", "frost", "snow"],
        sentiments: &[],
        priority: 6,
        triggers: &["below zero", "bundle up"],
    },
    ExpressionRule {
        expression: Expression::Alarmed,
        display_name: "Alarmed",
        keywords: &["warning", "alert", "danger", "urgent", "emergency"],
        sentiments: &["alarm"],
        priority: 8,
        triggers: &["watch out", "be careful", "severe weather"],
    },
    ExpressionRule {
        expression: Expression::Apologetic,
        display_name: "Apologetic",
        keywords: &["sorry", "apologize", "apologies", "my bad", "oops"],
        sentiments: &["regret"],
        priority: 7,
        triggers: &["i'm sorry", "so sorry", "that failed"],
    },
    ExpressionRule {
        expression: Expression::Stormy,
        display_name: "Stormy",
        keywords: &["storm", "thunder", "lightning", "typhoon", "hurricane"],
        sentiments: &[],
        priority: 7,
        triggers: &["thunderstorm warning"],
    },
    ExpressionRule {
        expression: Expression::Sad,
        display_name: "Sad",
        keywords: &["sad", "unhappy", "gloomy", "cry"],
        sentiments: &["negative", "sorrow"],
        priority: 5,
        triggers: &["i feel down", "this sucks"],
    },
    ExpressionRule {
        expression: Expression::Scared,
        display_name: "Scared",
        keywords: &["scary", "scared", "afraid", "frightening", "spooky"],
        sentiments: &["fear"],
        priority: 6,
        triggers: &["i'm scared"],
    },
    ExpressionRule {
        expression: Expression::Angry,
        display_name: "Angry",
        keywords: &["angry", "furious", "annoying", "hate"],
        sentiments: &["anger"],
        priority: 6,
        triggers: &["so annoying", "fed up"],
    },
    ExpressionRule {
        expression: Expression::Embarrassed,
        display_name: "Embarrassed",
        keywords: &["embarrass", "awkward", "blush", "cringe"],
        sentiments: &["shame"],
        priority: 5,
        triggers: &["how embarrassing"],
    },
    ExpressionRule {
        expression: Expression::Smitten,
        display_name: "In love",
        keywords: &["love", "adore", "crush", "darling", "sweetheart"],
        sentiments: &["affection"],
        priority: 7,
        triggers: &["i love you", "love you"],
    },
    ExpressionRule {
        expression: Expression::Hopeful,
        display_name: "Hopeful",
        keywords: &["hope", "wish", "fingers crossed", "looking forward"],
        sentiments: &["optimism"],
        priority: 4,
        triggers: &["i hope so"],
    },
    ExpressionRule {
        expression: Expression::Farewell,
        display_name: "Waving goodbye",
        keywords: &["goodbye", "goodnight", "bye"],
        sentiments: &[],
        priority: 5,
        triggers: &["see you later", "good night", "see you tomorrow"],
    },
    ExpressionRule {
        expression: Expression::Confused,
        display_name: "Confused",
        keywords: &["confused", "confusing", "huh", "unsure", "puzzled"],
        sentiments: &["uncertain"],
        priority: 4,
        triggers: &["i don't understand", "what do you mean"],
    },
];

/// Look up the rule for an expression.
///
/// The catalog is total over `Expression::ALL`, so this never fails for
/// internally-produced values.
#[must_use]
pub fn rule_for(expression: Expression) -> &'static ExpressionRule {
    // CATALOG covers every variant; fall back to the first rule (Idle)
    // to keep the lookup total without a panic path.
    CATALOG
        .iter()
        .find(|r| r.expression == expression)
        .unwrap_or(&CATALOG[0])
}
