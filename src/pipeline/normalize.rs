//! Text normalizer: drops descriptive filler and collapses whitespace.
//!
//! The normalizer is a single tokenizer pass instead of a chain of regex
//! replacements. Each pass:
//!
//! 1. removes invisible Unicode (zero-width spaces, BOM, soft hyphens)
//! 2. splits on whitespace
//! 3. drops tokens and multi-token phrases from the filler list
//!    (case-insensitive, longest phrase first)
//! 4. strips a unit suffix glued to a number (`12.5mm` → `12.5`)
//! 5. joins the survivors with single spaces
//!
//! Passes repeat until the text stops changing, so
//! `normalize(normalize(x)) == normalize(x)` for every input. Every step
//! only removes characters, so the loop terminates and the output never
//! contains a character that was not in the input (bar the joining spaces).

use serde::{Deserialize, Serialize};

/// Filler vocabulary removed by the [`Normalizer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FillerConfig {
    /// Words and phrases dropped wherever they occur as whole tokens.
    pub words: Vec<String>,
    /// Unit suffixes stripped from the end of numeric tokens.
    pub unit_suffixes: Vec<String>,
}

impl Default for FillerConfig {
    fn default() -> Self {
        Self {
            words: DEFAULT_FILLER.iter().map(|w| w.to_string()).collect(),
            unit_suffixes: vec!["mm".to_string()],
        }
    }
}

impl FillerConfig {
    /// An empty vocabulary: the normalizer only collapses whitespace.
    pub fn none() -> Self {
        Self {
            words: Vec::new(),
            unit_suffixes: Vec::new(),
        }
    }

    /// Add extra filler words on top of the current list.
    pub fn with_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.words.extend(words.into_iter().map(Into::into));
        self
    }
}

const DEFAULT_FILLER: &[&str] = &[
    // units
    "mm", "millimeter", "millimeters", "millimetre", "millimetres", "milimetr", "milimetry",
    "milimetrów",
    // qualifiers
    "typ", "typ.", "(typ)", "(typ.)", "typical", "typically", "typowo", "typowy", "basic",
    "(basic)",
    // datum references
    "datum", "datums", "baza", "bazy", "bazą", "względem", "with respect to", "relative to", "wrt",
    "of", "to", "do",
    // repetition
    "places", "place", "pl", "pl.", "miejsca", "miejsc",
    // tolerance words
    "tolerance", "tolerancja", "tolerancji", "tol", "tol.", "zone", "strefa", "gd&t", "gdt",
    // weld words, once the weld symbol has been identified
    "weld", "welds", "spoina", "spoiny", "spaw", "leg", "length", "throat", "thickness", "size",
    "grubość", "ramię", "all around", "all-around", "allaround", "dookoła", "wokół",
    // separators
    "|", ":", ",", ";",
];

/// Compiled filler vocabulary.
#[derive(Debug, Clone)]
pub struct Normalizer {
    /// Lower-cased phrases as token lists, longest first.
    phrases: Vec<Vec<String>>,
    unit_suffixes: Vec<String>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(&FillerConfig::default())
    }
}

impl Normalizer {
    pub fn new(filler: &FillerConfig) -> Self {
        let mut phrases: Vec<Vec<String>> = filler
            .words
            .iter()
            .map(|w| w.split_whitespace().map(str::to_lowercase).collect::<Vec<_>>())
            .filter(|p| !p.is_empty())
            .collect();
        phrases.sort_by_key(|p| std::cmp::Reverse(p.len()));
        phrases.dedup();

        let unit_suffixes = filler
            .unit_suffixes
            .iter()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        Self {
            phrases,
            unit_suffixes,
        }
    }

    /// Normalize `text` to its fixpoint.
    pub fn normalize(&self, text: &str) -> String {
        let mut current = self.pass(text);
        loop {
            let next = self.pass(&current);
            if next == current {
                return current;
            }
            current = next;
        }
    }

    fn pass(&self, text: &str) -> String {
        let visible = remove_invisible_chars(text);
        let tokens: Vec<&str> = visible.split_whitespace().collect();
        let lowered: Vec<String> = tokens.iter().map(|t| t.to_lowercase()).collect();

        let mut kept: Vec<&str> = Vec::with_capacity(tokens.len());
        let mut i = 0;
        while i < tokens.len() {
            if let Some(len) = self.filler_at(&lowered[i..]) {
                i += len;
                continue;
            }
            let token = self.strip_unit_suffix(tokens[i]);
            if !token.is_empty() {
                kept.push(token);
            }
            i += 1;
        }
        kept.join(" ")
    }

    /// Length (in tokens) of the filler phrase starting at `tokens[0]`.
    fn filler_at(&self, tokens: &[String]) -> Option<usize> {
        self.phrases
            .iter()
            .find(|phrase| {
                phrase.len() <= tokens.len()
                    && phrase.iter().zip(tokens).all(|(p, t)| p == t)
            })
            .map(Vec::len)
    }

    fn strip_unit_suffix<'a>(&self, token: &'a str) -> &'a str {
        for suffix in &self.unit_suffixes {
            let Some(cut) = token.len().checked_sub(suffix.len()) else {
                continue;
            };
            if cut == 0 || !token.is_char_boundary(cut) {
                continue;
            }
            let (head, tail) = token.split_at(cut);
            if tail.to_lowercase() == *suffix && head.ends_with(|c: char| c.is_ascii_digit()) {
                return head;
            }
        }
        token
    }
}

// ── Invisible Unicode ────────────────────────────────────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}',
        ],
        "",
    )
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(text: &str) -> String {
        Normalizer::default().normalize(text)
    }

    #[test]
    fn test_collapses_and_trims_whitespace() {
        assert_eq!(norm("  25 \t ±0.1\n"), "25 ±0.1");
        assert_eq!(norm(""), "");
        assert_eq!(norm("   "), "");
    }

    #[test]
    fn test_drops_filler_words_case_insensitively() {
        assert_eq!(norm("R5 TYP."), "R5");
        assert_eq!(norm("0.05 to Datum A"), "0.05 A");
        assert_eq!(norm("4 Places ⌀6"), "4 ⌀6");
        assert_eq!(norm("Tolerancja 0.1 względem A"), "0.1 A");
    }

    #[test]
    fn test_drops_multi_token_phrases() {
        assert_eq!(norm("0.1 with respect to A B"), "0.1 A B");
        assert_eq!(norm("0.1 Relative To C"), "0.1 C");
    }

    #[test]
    fn test_strips_unit_suffix_from_numbers_only() {
        assert_eq!(norm("12.5mm"), "12.5");
        assert_eq!(norm("±0.1MM"), "±0.1");
        // Not a number in front of the suffix: left alone.
        assert_eq!(norm("comm"), "comm");
        assert_eq!(norm("mm"), "");
    }

    #[test]
    fn test_removes_invisible_chars() {
        assert_eq!(norm("25\u{200B} ±0.1\u{FEFF}"), "25 ±0.1");
    }

    #[test]
    fn test_separator_tokens_are_filler() {
        assert_eq!(norm("⏥ | 0.05 | A"), "⏥ 0.05 A");
    }

    #[test]
    fn test_idempotent_on_samples() {
        let samples = [
            "Flatness 0.05 mm to datum A",
            "12.5mm typ. 4 places",
            "  ⌀  20 H7  ",
            "a 5 fillet weld all around",
            "mm mm 3mm",
            "to to to",
            "Position ⌀0.1 | A | B",
            "\u{00AD}0.2\u{200D} basic",
        ];
        for s in samples {
            let once = norm(s);
            assert_eq!(norm(&once), once, "not idempotent for {s:?}");
        }
    }

    #[test]
    fn test_never_introduces_new_characters() {
        let s = "Płaskość 0.05mm względem bazy A";
        let out = norm(s);
        assert!(out.chars().all(|c| c == ' ' || s.contains(c)), "got {out:?}");
    }

    #[test]
    fn test_all_around_modifier_is_filler() {
        assert_eq!(norm("a5 all around"), "a5");
        assert_eq!(norm("5 all-around"), "5");
    }

    #[test]
    fn test_custom_filler_list() {
        let n = Normalizer::new(&FillerConfig::none().with_words(["approx"]));
        assert_eq!(n.normalize("approx 10 mm"), "10 mm");
    }
}
