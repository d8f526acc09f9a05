//! Lexicon/heuristic compound polarity scorer for review text.
//!
//! Each lexicon word carries a valence on a `[-4.0, 4.0]` scale. Valences are
//! adjusted for negation, intensity modifiers, capitalised emphasis and a
//! contrastive "but", summed, then normalized into a compound score in
//! `[-1.0, 1.0]`.

/// Review-domain word valences.
///
/// Keys are lowercase single words. Positive values are favourable.
pub(crate) const LEXICON: &[(&str, f64)] = &[
    // Positive signals
    ("amazing", 2.8),
    ("awesome", 3.1),
    ("beautiful", 2.9),
    ("best", 3.2),
    ("comfortable", 1.8),
    ("durable", 1.6),
    ("easy", 1.9),
    ("excellent", 2.7),
    ("fantastic", 2.6),
    ("fast", 1.2),
    ("fine", 0.8),
    ("good", 1.9),
    ("great", 3.1),
    ("happy", 2.7),
    ("helpful", 1.8),
    ("impressed", 2.1),
    ("like", 1.5),
    ("liked", 1.8),
    ("love", 3.2),
    ("loved", 2.9),
    ("nice", 1.8),
    ("perfect", 2.7),
    ("pleased", 1.9),
    ("quality", 1.0),
    ("recommend", 1.5),
    ("recommended", 1.5),
    ("reliable", 1.9),
    ("satisfied", 1.8),
    ("smooth", 1.4),
    ("sturdy", 1.4),
    ("superb", 3.1),
    ("worth", 0.9),
    ("wonderful", 2.7),
    ("works", 0.8),
    // Negative signals
    ("annoying", -1.7),
    ("awful", -2.0),
    ("bad", -2.5),
    ("broke", -1.8),
    ("broken", -2.1),
    ("cheap", -0.9),
    ("complaint", -1.8),
    ("damaged", -2.2),
    ("defective", -2.4),
    ("disappointed", -1.9),
    ("disappointing", -2.2),
    ("faulty", -2.0),
    ("flimsy", -1.6),
    ("hate", -2.7),
    ("horrible", -2.5),
    ("issue", -0.9),
    ("issues", -0.9),
    ("poor", -2.1),
    ("problem", -1.7),
    ("problems", -1.7),
    ("refund", -0.7),
    ("return", -0.4),
    ("returned", -0.9),
    ("slow", -1.2),
    ("terrible", -2.1),
    ("useless", -1.8),
    ("waste", -1.8),
    ("worse", -2.1),
    ("worst", -3.1),
    ("wrong", -2.1),
];

/// Words that flip the valence of a lexicon word within the next three tokens.
const NEGATORS: &[&str] = &[
    "not", "no", "never", "neither", "nor", "none", "nothing", "cannot", "cant", "can't",
    "dont", "don't", "doesnt", "doesn't", "didnt", "didn't", "isnt", "isn't", "wasnt", "wasn't",
    "wont", "won't", "without", "hardly",
];

const BOOSTERS: &[&str] = &[
    "absolutely", "completely", "extremely", "highly", "incredibly", "really", "so", "super",
    "totally", "very",
];

const DAMPENERS: &[&str] = &["barely", "kinda", "slightly", "somewhat", "marginally"];

const NEGATION_SCALAR: f64 = -0.74;
const BOOST_INCREMENT: f64 = 0.293;
const CAPS_INCREMENT: f64 = 0.733;
const EXCLAMATION_INCREMENT: f64 = 0.292;
const MAX_EXCLAMATIONS: usize = 4;
/// Normalization constant: `sum / sqrt(sum^2 + ALPHA)`.
const ALPHA: f64 = 15.0;

struct Token {
    word: String,
    shouted: bool,
}

fn tokenize(text: &str) -> Vec<Token> {
    text.split_whitespace()
        .filter_map(|raw| {
            let trimmed = raw.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'');
            if trimmed.is_empty() {
                return None;
            }
            let letters: Vec<char> = trimmed.chars().filter(|c| c.is_alphabetic()).collect();
            let shouted = letters.len() > 1 && letters.iter().all(|c| c.is_uppercase());
            Some(Token {
                word: trimmed.to_lowercase(),
                shouted,
            })
        })
        .collect()
}

fn valence(word: &str) -> Option<f64> {
    LEXICON
        .iter()
        .find(|(lex_word, _)| *lex_word == word)
        .map(|&(_, weight)| weight)
}

fn toward_sign(value: f64, increment: f64) -> f64 {
    if value >= 0.0 {
        increment
    } else {
        -increment
    }
}

/// Compound polarity of `text` in `[-1.0, 1.0]`.
///
/// Returns `0.0` for empty text or text with no lexicon words.
#[must_use]
pub fn polarity_score(text: &str) -> f64 {
    let tokens = tokenize(text);
    // Emphasis by capitals only counts when the text is not shouted throughout.
    let mixed_case = tokens.iter().any(|t| !t.shouted);
    let but_at = tokens.iter().position(|t| t.word == "but");

    let mut sum = 0.0_f64;
    for (i, token) in tokens.iter().enumerate() {
        let Some(base) = valence(&token.word) else {
            continue;
        };
        let mut v = base;

        if token.shouted && mixed_case {
            v += toward_sign(v, CAPS_INCREMENT);
        }

        let window = &tokens[i.saturating_sub(3)..i];
        if let Some(prev) = window.last() {
            if BOOSTERS.contains(&prev.word.as_str()) {
                v += toward_sign(v, BOOST_INCREMENT);
            } else if DAMPENERS.contains(&prev.word.as_str()) {
                v -= toward_sign(v, BOOST_INCREMENT);
            }
        }
        if window.iter().any(|t| NEGATORS.contains(&t.word.as_str())) {
            v *= NEGATION_SCALAR;
        }

        match but_at {
            Some(b) if i < b => v *= 0.5,
            Some(b) if i > b => v *= 1.5,
            _ => {}
        }
        sum += v;
    }

    if sum.abs() < f64::EPSILON {
        return 0.0;
    }

    let exclamations = text.matches('!').count().min(MAX_EXCLAMATIONS);
    #[allow(clippy::cast_precision_loss)]
    let emphasis = exclamations as f64 * EXCLAMATION_INCREMENT;
    sum += toward_sign(sum, emphasis);

    (sum / (sum * sum + ALPHA).sqrt()).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_returns_zero() {
        assert_eq!(polarity_score(""), 0.0);
    }

    #[test]
    fn whitespace_only_returns_zero() {
        assert_eq!(polarity_score("   \n\t"), 0.0);
    }

    #[test]
    fn unknown_text_returns_zero() {
        assert_eq!(polarity_score("the box arrived on tuesday"), 0.0);
    }

    #[test]
    fn positive_keyword_returns_positive() {
        let score = polarity_score("This phone is great");
        assert!(score > 0.05, "expected positive score, got {score}");
    }

    #[test]
    fn negative_keyword_returns_negative() {
        let score = polarity_score("Terrible battery, total waste of money");
        assert!(score < -0.05, "expected negative score, got {score}");
    }

    #[test]
    fn negation_flips_polarity() {
        let plain = polarity_score("it is good");
        let negated = polarity_score("it is not good");
        assert!(plain > 0.0);
        assert!(negated < 0.0, "expected negated score below zero, got {negated}");
    }

    #[test]
    fn negated_negative_turns_positive() {
        assert!(polarity_score("not bad at all") > 0.0);
    }

    #[test]
    fn booster_increases_intensity() {
        assert!(polarity_score("very good") > polarity_score("good"));
        assert!(polarity_score("very bad") < polarity_score("bad"));
    }

    #[test]
    fn dampener_reduces_intensity() {
        assert!(polarity_score("slightly good") < polarity_score("good"));
    }

    #[test]
    fn clause_after_but_dominates() {
        let score = polarity_score("The screen is good but the battery is terrible");
        assert!(score < 0.0, "expected negative overall, got {score}");
    }

    #[test]
    fn exclamations_amplify() {
        assert!(polarity_score("good!!!") > polarity_score("good"));
    }

    #[test]
    fn capitalised_emphasis_amplifies_in_mixed_case_text() {
        assert!(polarity_score("this is GREAT") > polarity_score("this is great"));
    }

    #[test]
    fn punctuation_stripped_from_words() {
        assert!(polarity_score("great!") > 0.0);
        assert!(polarity_score("(awful)") < 0.0);
    }

    #[test]
    fn score_stays_within_unit_interval() {
        let stacked = "great excellent best love amazing awesome superb perfect wonderful!!!!";
        let score = polarity_score(stacked);
        assert!(score > 0.9 && score <= 1.0, "got {score}");
        let low = polarity_score("worst awful terrible horrible defective useless broken");
        assert!((-1.0..-0.9).contains(&low), "got {low}");
    }
}
