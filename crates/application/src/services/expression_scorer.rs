//! Expression scoring against the catalog rule table
//!
//! Scores free text against every catalog rule using one pre-compiled
//! Aho-Corasick automaton (keywords, sentiment labels, and trigger phrases
//! all feed the same scan), then runs an explicitly ordered pipeline of
//! contextual adjustments driven by coarse topical flags. The scorer is
//! deterministic: identical input produces identical ranked output. Ties
//! keep catalog order, which is an implementation detail rather than a
//! stability guarantee.

use std::{collections::HashSet, sync::LazyLock};

use aho_corasick::AhoCorasick;
use domain::{CATALOG, Expression};
use tracing::trace;

/// Trigger phrase bonus (first match only, patterns do not stack)
const TRIGGER_BONUS: f64 = 3.0;

/// Bonus per distinct keyword (keywords do stack)
const KEYWORD_BONUS: f64 = 2.0;

/// Single bonus when any sentiment label is present
const SENTIMENT_BONUS: f64 = 1.0;

/// Salience bonus multiplier applied to the rule priority
const PRIORITY_WEIGHT: f64 = 0.5;

/// Below this score a weather expression in non-weather talk is considered
/// a stray-word leak and discounted
const WEATHER_CONFIDENCE_THRESHOLD: f64 = 6.0;

/// Factor applied to leaked weather expressions
const WEATHER_LEAK_DISCOUNT: f64 = 0.4;

/// Factor applied to the in-love expression under a romantic flag
const ROMANTIC_BOOST: f64 = 3.0;

/// Factor applied to the celebratory expression under a romantic flag, so
/// romance is not overshadowed by a generic positive-sentiment match
const ROMANTIC_SUPPRESSION: f64 = 0.3;

/// Minimum in-love score forced by romance-coded dialog
const ROMANTIC_FLOOR: f64 = 1.5;

/// Factor applied to sociable expressions in non-weather dialog
const SOCIAL_BOOST: f64 = 1.5;

/// Factor applied to the alarmed expression under an emergency flag
const EMERGENCY_BOOST: f64 = 2.0;

/// Factor applied to the celebratory expression for non-romantic compliments
const COMPLIMENT_BOOST: f64 = 1.5;

/// One expression's score for one input, with the reasons it got there
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub expression: Expression,
    pub score: f64,
    pub reason_tags: Vec<String>,
}

/// Coarse topical flags detected from the content
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContentFlags {
    /// Weather or temperature talk
    pub weather_talk: bool,
    /// Dialog/social talk (pronouns, conversational verbs)
    pub social_talk: bool,
    /// Love/affection signals; a broader net than the in-love rule's own
    /// keywords
    pub romantic: bool,
    /// A compliment
    pub compliment: bool,
    /// An emergency or severe-conditions warning
    pub emergency: bool,
}

const WEATHER_NET: &[&str] = &[
    "weather",
    "temperature",
    "forecast",
    "degrees",
    "celsius",
    "fahrenheit",
    "humidity",
    "wind",
    "rain",
    "snowing",
    "umbrella",
    "sunny",
    "cloudy",
    "overcast",
];

const SOCIAL_NET: &[&str] = &[
    "you", "we ", "let's", "chat", "talk", "tell me", "how are", "your",
];

const ROMANTIC_NET: &[&str] = &[
    "love",
    "beautiful",
    "gorgeous",
    "cute",
    "adore",
    "crush on",
    "marry",
    "miss you",
    "darling",
    "sweetheart",
    "date me",
    "xoxo",
];

const COMPLIMENT_NET: &[&str] = &[
    "thank",
    "beautiful",
    "awesome",
    "amazing",
    "great job",
    "well done",
    "nice work",
    "impressive",
    "you're the best",
];

const EMERGENCY_NET: &[&str] = &[
    "emergency",
    "help me",
    "911",
    "danger",
    "urgent",
    "evacuate",
    "tornado",
    "flood",
];

impl ContentFlags {
    /// Detect topical flags from lowercased, whitespace-normalized content
    #[must_use]
    pub fn detect(normalized: &str) -> Self {
        let any = |net: &[&str]| net.iter().any(|k| normalized.contains(k));
        Self {
            weather_talk: any(WEATHER_NET),
            social_talk: any(SOCIAL_NET),
            romantic: any(ROMANTIC_NET),
            compliment: any(COMPLIMENT_NET),
            emergency: any(EMERGENCY_NET),
        }
    }
}

/// What a matched automaton pattern contributes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    Keyword,
    Sentiment,
    Trigger,
}

#[derive(Debug, Clone, Copy)]
struct MatchEntry {
    rule_idx: usize,
    kind: EntryKind,
    text: &'static str,
}

/// Pre-compiled automaton over every keyword, sentiment label, and trigger
/// phrase in the catalog, plus the table mapping pattern ids back to rules
static SCORING_MATCHER: LazyLock<(AhoCorasick, Vec<MatchEntry>)> = LazyLock::new(|| {
    let mut patterns: Vec<&'static str> = Vec::new();
    let mut entries: Vec<MatchEntry> = Vec::new();

    for (rule_idx, rule) in CATALOG.iter().enumerate() {
        for keyword in rule.keywords {
            patterns.push(keyword);
            entries.push(MatchEntry {
                rule_idx,
                kind: EntryKind::Keyword,
                text: keyword,
            });
        }
        for sentiment in rule.sentiments {
            patterns.push(sentiment);
            entries.push(MatchEntry {
                rule_idx,
                kind: EntryKind::Sentiment,
                text: sentiment,
            });
        }
        for trigger in rule.triggers {
            patterns.push(trigger);
            entries.push(MatchEntry {
                rule_idx,
                kind: EntryKind::Trigger,
                text: trigger,
            });
        }
    }

    #[allow(clippy::expect_used)] // Infallible with valid static patterns
    let matcher = AhoCorasick::builder()
        .ascii_case_insensitive(true)
        .build(&patterns)
        .expect("Failed to build catalog matcher");

    (matcher, entries)
});

/// Deterministic catalog scorer
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpressionScorer;

impl ExpressionScorer {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Score every catalog expression against `content` and return the top
    /// `limit` candidates, ranked by descending score.
    #[must_use]
    pub fn score_expressions(&self, content: &str, limit: usize) -> Vec<ScoredCandidate> {
        let normalized = normalize(content);
        let flags = ContentFlags::detect(&normalized);
        trace!(?flags, "Detected content flags");

        let mut candidates = base_scores(&normalized);
        apply_adjustments(&mut candidates, flags);

        candidates.retain(|c| c.score > 0.0);
        // Stable sort: equal scores keep catalog order.
        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
        candidates.truncate(limit);
        candidates
    }

    /// The single best candidate, or the neutral expression when nothing
    /// scores above zero
    #[must_use]
    pub fn best_match(&self, content: &str) -> Expression {
        self.score_expressions(content, 1)
            .first()
            .map_or(Expression::Idle, |c| c.expression)
    }

    /// The topical flags for `content`, exposed for observability
    #[must_use]
    #[allow(clippy::unused_self)]
    pub fn content_flags(&self, content: &str) -> ContentFlags {
        ContentFlags::detect(&normalize(content))
    }
}

/// Lowercase and collapse all whitespace runs to single spaces
fn normalize(content: &str) -> String {
    content
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Raw per-rule scores: trigger (first match), distinct keywords, single
/// sentiment bonus, and the priority salience bonus when anything matched
fn base_scores(normalized: &str) -> Vec<ScoredCandidate> {
    let (matcher, entries) = &*SCORING_MATCHER;

    let mut keyword_hits: Vec<HashSet<&'static str>> = vec![HashSet::new(); CATALOG.len()];
    let mut trigger_hits: Vec<Option<&'static str>> = vec![None; CATALOG.len()];
    let mut sentiment_hits: Vec<bool> = vec![false; CATALOG.len()];

    for mat in matcher.find_overlapping_iter(normalized) {
        let entry = entries[mat.pattern().as_usize()];
        match entry.kind {
            EntryKind::Keyword => {
                keyword_hits[entry.rule_idx].insert(entry.text);
            }
            EntryKind::Sentiment => sentiment_hits[entry.rule_idx] = true,
            EntryKind::Trigger => {
                trigger_hits[entry.rule_idx].get_or_insert(entry.text);
            }
        }
    }

    CATALOG
        .iter()
        .enumerate()
        .map(|(idx, rule)| {
            let mut score = 0.0;
            let mut reason_tags = Vec::new();

            if let Some(trigger) = trigger_hits[idx] {
                score += TRIGGER_BONUS;
                reason_tags.push(format!("trigger:{trigger}"));
            }
            let mut keywords: Vec<&str> = keyword_hits[idx].iter().copied().collect();
            keywords.sort_unstable();
            for keyword in keywords {
                score += KEYWORD_BONUS;
                reason_tags.push(format!("keyword:{keyword}"));
            }
            if sentiment_hits[idx] {
                score += SENTIMENT_BONUS;
                reason_tags.push("sentiment".to_string());
            }

            if score > 0.0 {
                score += PRIORITY_WEIGHT * f64::from(rule.priority);
                reason_tags.push(format!("salience:{}", rule.priority));
            }

            ScoredCandidate {
                expression: rule.expression,
                score,
                reason_tags,
            }
        })
        .collect()
}

/// The ordered contextual-adjustment pipeline.
///
/// Order matters: the romantic floor must exist before the romantic boost
/// multiplies it, and the compliment boost stays mutually exclusive with the
/// romantic suppression so the two never both favor the same content.
fn apply_adjustments(candidates: &mut [ScoredCandidate], flags: ContentFlags) {
    discount_weather_leaks(candidates, flags);
    boost_social(candidates, flags);
    weigh_romance(candidates, flags);
    boost_emergency(candidates, flags);
    boost_compliment(candidates, flags);
}

fn is_weather_expression(expression: Expression) -> bool {
    matches!(
        expression,
        Expression::Rainy | Expression::Hot | Expression::Cold
    )
}

fn is_sociable_expression(expression: Expression) -> bool {
    matches!(
        expression,
        Expression::Idle | Expression::Smitten | Expression::Confused
    )
}

/// Outside weather talk, a weather expression that scored below the
/// "clearly about weather" threshold only matched a stray word
fn discount_weather_leaks(candidates: &mut [ScoredCandidate], flags: ContentFlags) {
    if flags.weather_talk {
        return;
    }
    for candidate in candidates.iter_mut() {
        if is_weather_expression(candidate.expression)
            && candidate.score > 0.0
            && candidate.score < WEATHER_CONFIDENCE_THRESHOLD
        {
            candidate.score *= WEATHER_LEAK_DISCOUNT;
            candidate.reason_tags.push("weather-leak-discount".to_string());
        }
    }
}

fn boost_social(candidates: &mut [ScoredCandidate], flags: ContentFlags) {
    if !flags.social_talk || flags.weather_talk {
        return;
    }
    for candidate in candidates.iter_mut() {
        if is_sociable_expression(candidate.expression) && candidate.score > 0.0 {
            candidate.score *= SOCIAL_BOOST;
            candidate.reason_tags.push("social-boost".to_string());
        }
        // Romance-coded dialog must always surface the in-love candidate,
        // even when keyword scoring alone produced nothing.
        if candidate.expression == Expression::Smitten
            && flags.romantic
            && candidate.score < ROMANTIC_FLOOR
        {
            candidate.score = ROMANTIC_FLOOR;
            candidate.reason_tags.push("romantic-floor".to_string());
        }
    }
}

fn weigh_romance(candidates: &mut [ScoredCandidate], flags: ContentFlags) {
    if !flags.romantic {
        return;
    }
    for candidate in candidates.iter_mut() {
        match candidate.expression {
            Expression::Smitten if candidate.score > 0.0 => {
                candidate.score *= ROMANTIC_BOOST;
                candidate.reason_tags.push("romantic-boost".to_string());
            }
            Expression::Excited if candidate.score > 0.0 => {
                candidate.score *= ROMANTIC_SUPPRESSION;
                candidate
                    .reason_tags
                    .push("romantic-suppression".to_string());
            }
            _ => {}
        }
    }
}

fn boost_emergency(candidates: &mut [ScoredCandidate], flags: ContentFlags) {
    if !flags.emergency {
        return;
    }
    for candidate in candidates.iter_mut() {
        if candidate.expression == Expression::Alarmed && candidate.score > 0.0 {
            candidate.score *= EMERGENCY_BOOST;
            candidate.reason_tags.push("emergency-boost".to_string());
        }
    }
}

fn boost_compliment(candidates: &mut [ScoredCandidate], flags: ContentFlags) {
    if !flags.compliment || flags.romantic {
        return;
    }
    for candidate in candidates.iter_mut() {
        if candidate.expression == Expression::Excited && candidate.score > 0.0 {
            candidate.score *= COMPLIMENT_BOOST;
            candidate.reason_tags.push("compliment-boost".to_string());
        }
    }
}
