//! Symbol table: keyword/glyph patterns → canonical drafting symbols.
//!
//! The table is an ordered list of [`SymbolRule`]s. Lookup walks the list
//! top to bottom and returns the **first** rule whose keywords occur in the
//! lower-cased text, so precedence is simply list order:
//!
//! - total runout before runout (`"total runout"` contains `"runout"`)
//! - profile of a surface before profile of a line (`"profil"` is the broad
//!   fallback keyword of the latter)
//! - every GD&T characteristic before diameter, so `"position ⌀0.1 A"` is a
//!   position frame whose value happens to carry a diameter sign
//! - both weld rules before circularity and straightness, so the weld
//!   modifier `"all around"` cannot turn a weld into a `"round"` frame
//! - V-groove welds before the fillet rule, which also owns the generic
//!   `weld`/`spoina` keywords
//!
//! Matching is plain substring containment. `"surround"` therefore hits the
//! circularity keyword `"round"`; this imprecision is accepted rather than
//! replaced by a tokenizer whose behaviour on ambiguous callouts would be a
//! guess.

use regex::{Captures, NoExpand, Regex};
use std::fmt;

/// The drafting characteristic a rule stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum SymbolCategory {
    TotalRunout,
    Runout,
    ProfileOfSurface,
    ProfileOfLine,
    Position,
    Perpendicularity,
    Parallelism,
    Flatness,
    Concentricity,
    Angularity,
    Cylindricity,
    Circularity,
    Straightness,
    VGrooveWeld,
    FilletWeld,
    Diameter,
}

/// How a symbol is rendered by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolFamily {
    /// Framed GD&T callout: `symbol | value | datum`.
    Gdt,
    /// Prefix notation: `⌀12.5`.
    Diameter,
    /// Weld symbol appended after the size: `a5 ◺`.
    Weld,
}

impl SymbolCategory {
    /// Canonical Unicode glyph for the category.
    pub fn glyph(self) -> &'static str {
        match self {
            SymbolCategory::TotalRunout => "⌰",
            SymbolCategory::Runout => "↗",
            SymbolCategory::ProfileOfSurface => "⌓",
            SymbolCategory::ProfileOfLine => "⌒",
            SymbolCategory::Position => "⌖",
            SymbolCategory::Perpendicularity => "⟂",
            SymbolCategory::Parallelism => "∥",
            SymbolCategory::Flatness => "⏥",
            SymbolCategory::Concentricity => "◎",
            SymbolCategory::Angularity => "∠",
            SymbolCategory::Cylindricity => "⌭",
            SymbolCategory::Circularity => "○",
            SymbolCategory::Straightness => "⏤",
            SymbolCategory::VGrooveWeld => "⌵",
            SymbolCategory::FilletWeld => "◺",
            SymbolCategory::Diameter => "⌀",
        }
    }

    pub fn family(self) -> SymbolFamily {
        match self {
            SymbolCategory::VGrooveWeld | SymbolCategory::FilletWeld => SymbolFamily::Weld,
            SymbolCategory::Diameter => SymbolFamily::Diameter,
            _ => SymbolFamily::Gdt,
        }
    }
}

impl fmt::Display for SymbolCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SymbolCategory::TotalRunout => "total runout",
            SymbolCategory::Runout => "runout",
            SymbolCategory::ProfileOfSurface => "profile of a surface",
            SymbolCategory::ProfileOfLine => "profile of a line",
            SymbolCategory::Position => "position",
            SymbolCategory::Perpendicularity => "perpendicularity",
            SymbolCategory::Parallelism => "parallelism",
            SymbolCategory::Flatness => "flatness",
            SymbolCategory::Concentricity => "concentricity",
            SymbolCategory::Angularity => "angularity",
            SymbolCategory::Cylindricity => "cylindricity",
            SymbolCategory::Circularity => "circularity",
            SymbolCategory::Straightness => "straightness",
            SymbolCategory::VGrooveWeld => "V-groove weld",
            SymbolCategory::FilletWeld => "fillet weld",
            SymbolCategory::Diameter => "diameter",
        };
        f.write_str(name)
    }
}

/// One row of the symbol table.
///
/// `keywords` are words or phrases; when stripped they take any letters
/// glued to them along (`"perpendicular"` removes all of
/// `"perpendicularity"`, `"płaskoś"` all of `"płaskości"`). `glyphs` are
/// literal marks (`⌀`, `//`, `◺`) and are removed exactly, so the number
/// glued to a glyph survives. `words` are short abbreviations (`dia`) that
/// only count when no letter touches them on either side.
#[derive(Debug, Clone)]
pub struct SymbolRule {
    category: SymbolCategory,
    symbol: String,
    keywords: Vec<String>,
    glyphs: Vec<String>,
    words: Vec<String>,
    /// `None` for a rule with neither keywords nor glyphs.
    stripper: Option<Regex>,
    /// `None` for a rule without whole-word keywords.
    word_matcher: Option<Regex>,
}

impl SymbolRule {
    /// Build a rule. Keywords and glyphs are lower-cased; the canonical
    /// symbol is always recognised as a glyph of its own rule.
    pub fn new<K, G>(category: SymbolCategory, symbol: impl Into<String>, keywords: K, glyphs: G) -> Self
    where
        K: IntoIterator,
        K::Item: AsRef<str>,
        G: IntoIterator,
        G::Item: AsRef<str>,
    {
        let symbol = symbol.into();
        let mut keywords: Vec<String> = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        let mut glyphs: Vec<String> = glyphs
            .into_iter()
            .map(|g| g.as_ref().trim().to_lowercase())
            .filter(|g| !g.is_empty())
            .collect();
        if !glyphs.iter().any(|g| g == &symbol) {
            glyphs.push(symbol.to_lowercase());
        }
        // Longest alternative first: the regex alternation is leftmost-first.
        keywords.sort_by_key(|k| std::cmp::Reverse(k.chars().count()));
        glyphs.sort_by_key(|g| std::cmp::Reverse(g.chars().count()));

        let stripper = build_stripper(&keywords, &glyphs);
        Self {
            category,
            symbol,
            keywords,
            glyphs,
            words: Vec::new(),
            stripper,
            word_matcher: None,
        }
    }

    /// Add whole-word keywords, matched only between non-letters.
    pub fn with_words<W>(mut self, words: W) -> Self
    where
        W: IntoIterator,
        W::Item: AsRef<str>,
    {
        self.words.extend(
            words
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty()),
        );
        self.words.sort_by_key(|w| std::cmp::Reverse(w.chars().count()));
        self.words.dedup();
        self.word_matcher = build_word_matcher(&self.words);
        self
    }

    /// Rule for a category with its canonical glyph.
    pub fn for_category<K, G>(category: SymbolCategory, keywords: K, glyphs: G) -> Self
    where
        K: IntoIterator,
        K::Item: AsRef<str>,
        G: IntoIterator,
        G::Item: AsRef<str>,
    {
        Self::new(category, category.glyph(), keywords, glyphs)
    }

    pub fn category(&self) -> SymbolCategory {
        self.category
    }

    pub fn family(&self) -> SymbolFamily {
        self.category.family()
    }

    /// The symbol emitted for this rule.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn glyphs(&self) -> &[String] {
        &self.glyphs
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Does the already lower-cased text mention this rule?
    pub fn matches_lower(&self, lower: &str) -> bool {
        self.keywords.iter().any(|k| lower.contains(k.as_str()))
            || self.contains_glyph_lower(lower)
            || self.word_matcher.as_ref().is_some_and(|re| re.is_match(lower))
    }

    fn contains_glyph_lower(&self, lower: &str) -> bool {
        self.glyphs.iter().any(|g| lower.contains(g.as_str()))
    }

    /// Remove every keyword and glyph of this rule, leaving a space where
    /// each one stood so neighbouring tokens do not fuse.
    pub fn strip(&self, text: &str) -> String {
        self.replace_with(text, " ")
    }

    /// Replace every keyword and glyph of this rule with the canonical
    /// symbol, in place and as a token of its own.
    pub fn mark(&self, text: &str) -> String {
        self.replace_with(text, &format!(" {} ", self.symbol))
    }

    fn replace_with(&self, text: &str, with: &str) -> String {
        let replaced = match &self.stripper {
            Some(re) => re.replace_all(text, NoExpand(with)).into_owned(),
            None => text.to_string(),
        };
        match &self.word_matcher {
            Some(re) => re
                .replace_all(&replaced, |caps: &Captures<'_>| format!("{}{with}{}", &caps[1], &caps[2]))
                .into_owned(),
            None => replaced,
        }
    }
}

/// `(?i)(^|\P{L})(?:dia|…)(\P{L}|$)`: the neighbours are captured so the
/// replacement can put them back.
fn build_word_matcher(words: &[String]) -> Option<Regex> {
    if words.is_empty() {
        return None;
    }
    let alternatives: Vec<String> = words.iter().map(|w| regex::escape(w)).collect();
    Regex::new(&format!(r"(?i)(^|\P{{L}})(?:{})(\P{{L}}|$)", alternatives.join("|"))).ok()
}

fn build_stripper(keywords: &[String], glyphs: &[String]) -> Option<Regex> {
    let mut alternatives = Vec::with_capacity(2);
    if !keywords.is_empty() {
        let words: Vec<String> = keywords.iter().map(|k| regex::escape(k)).collect();
        alternatives.push(format!(r"\p{{L}}*(?:{})\p{{L}}*", words.join("|")));
    }
    if !glyphs.is_empty() {
        let marks: Vec<String> = glyphs.iter().map(|g| regex::escape(g)).collect();
        alternatives.push(marks.join("|"));
    }
    if alternatives.is_empty() {
        return None;
    }
    let pattern = format!("(?i)(?:{})", alternatives.join("|"));
    // Every piece is escaped, so the pattern is always valid.
    Regex::new(&pattern).ok()
}

/// Ordered symbol table. See the module docs for the precedence rules.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    rules: Vec<SymbolRule>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SymbolTable {
    /// Build a table from rules in priority order (highest first).
    pub fn from_rules(rules: Vec<SymbolRule>) -> Self {
        Self { rules }
    }

    /// The built-in English/Polish drafting vocabulary.
    pub fn builtin() -> Self {
        use SymbolCategory as C;
        let none: [&str; 0] = [];
        Self::from_rules(vec![
            SymbolRule::for_category(
                C::TotalRunout,
                ["total runout", "total run-out", "bicie całkowite"],
                none,
            ),
            SymbolRule::for_category(
                C::Runout,
                ["circular runout", "runout", "run-out", "bicie"],
                none,
            ),
            SymbolRule::for_category(
                C::ProfileOfSurface,
                [
                    "profile of a surface",
                    "profile of surface",
                    "surface profile",
                    "profil powierzchni",
                ],
                none,
            ),
            SymbolRule::for_category(
                C::ProfileOfLine,
                ["profile of a line", "profile of line", "line profile", "profil linii", "profil"],
                none,
            ),
            SymbolRule::for_category(
                C::Position,
                ["true position", "position", "pozycj", "położeni"],
                none,
            ),
            SymbolRule::for_category(C::Perpendicularity, ["perpendicular", "prostopadł"], ["⊥"]),
            SymbolRule::for_category(C::Parallelism, ["parallel", "równoległ"], ["//"]),
            SymbolRule::for_category(C::Flatness, ["flatness", "płaskoś"], none),
            SymbolRule::for_category(
                C::Concentricity,
                ["concentric", "coaxial", "współosiow"],
                none,
            ),
            SymbolRule::for_category(C::Angularity, ["angularity", "nachyleni"], none),
            SymbolRule::for_category(C::Cylindricity, ["cylindricity", "walcowoś"], none),
            SymbolRule::for_category(
                C::VGrooveWeld,
                ["v-groove", "v groove", "single-v", "v-weld", "v weld", "czołow"],
                none,
            ),
            SymbolRule::for_category(
                C::FilletWeld,
                ["fillet", "pachwin", "weld", "spoin", "spaw"],
                none,
            ),
            SymbolRule::for_category(
                C::Circularity,
                ["circularity", "roundness", "round", "okrągłoś"],
                none,
            ),
            SymbolRule::for_category(C::Straightness, ["straightness", "prostoliniowoś"], none),
            SymbolRule::for_category(
                C::Diameter,
                ["diameter", "diam.", "dia.", "średnic"],
                ["ø", "φ"],
            )
            .with_words(["dia", "diam", "fi"]),
        ])
    }

    pub fn rules(&self) -> &[SymbolRule] {
        &self.rules
    }

    /// First rule, in priority order, mentioned by `text`. `None` is a
    /// normal outcome: the text carries no recognised symbol.
    pub fn lookup(&self, text: &str) -> Option<&SymbolRule> {
        let lower = text.to_lowercase();
        self.rules.iter().find(|r| r.matches_lower(&lower))
    }

    /// First weld rule whose glyph (not keyword) already appears in `text`.
    pub fn find_weld_glyph(&self, text: &str) -> Option<&SymbolRule> {
        let lower = text.to_lowercase();
        self.rules
            .iter()
            .filter(|r| r.family() == SymbolFamily::Weld)
            .find(|r| r.contains_glyph_lower(&lower))
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn category_of(text: &str) -> Option<SymbolCategory> {
        SymbolTable::builtin().lookup(text).map(|r| r.category())
    }

    #[test]
    fn test_lookup_basic_categories() {
        assert_eq!(category_of("Flatness 0.05"), Some(SymbolCategory::Flatness));
        assert_eq!(category_of("POSITION 0.1 A B"), Some(SymbolCategory::Position));
        assert_eq!(category_of("cylindricity 0.02"), Some(SymbolCategory::Cylindricity));
        assert_eq!(category_of("Straightness 0.1"), Some(SymbolCategory::Straightness));
        assert_eq!(category_of("Angularity 0.1 A"), Some(SymbolCategory::Angularity));
    }

    #[test]
    fn test_lookup_polish_keywords() {
        assert_eq!(category_of("Płaskość 0.05"), Some(SymbolCategory::Flatness));
        assert_eq!(category_of("Prostopadłość 0.1 A"), Some(SymbolCategory::Perpendicularity));
        assert_eq!(category_of("Średnica 12"), Some(SymbolCategory::Diameter));
    }

    #[test]
    fn test_total_runout_precedes_runout() {
        assert_eq!(category_of("total runout 0.03 A"), Some(SymbolCategory::TotalRunout));
        assert_eq!(category_of("runout 0.03 A"), Some(SymbolCategory::Runout));
    }

    #[test]
    fn test_surface_profile_precedes_line_profile() {
        assert_eq!(
            category_of("profile of a surface 0.2 A"),
            Some(SymbolCategory::ProfileOfSurface)
        );
        assert_eq!(category_of("profile 0.2"), Some(SymbolCategory::ProfileOfLine));
    }

    #[test]
    fn test_gdt_precedes_diameter() {
        assert_eq!(category_of("position ⌀0.1 A"), Some(SymbolCategory::Position));
        assert_eq!(category_of("⌀12.5"), Some(SymbolCategory::Diameter));
        assert_eq!(category_of("Ø12.5"), Some(SymbolCategory::Diameter));
    }

    #[test]
    fn test_v_groove_precedes_generic_weld() {
        assert_eq!(category_of("V-groove weld 6"), Some(SymbolCategory::VGrooveWeld));
        assert_eq!(category_of("weld 5"), Some(SymbolCategory::FilletWeld));
    }

    #[test]
    fn test_weld_precedes_circularity() {
        assert_eq!(category_of("a5 fillet weld all around"), Some(SymbolCategory::FilletWeld));
        assert_eq!(category_of("weld all-around 5"), Some(SymbolCategory::FilletWeld));
        assert_eq!(category_of("V-groove weld 6 all around"), Some(SymbolCategory::VGrooveWeld));
        assert_eq!(category_of("roundness 0.02"), Some(SymbolCategory::Circularity));
    }

    #[test]
    fn test_whole_word_keywords() {
        assert_eq!(category_of("dia 12"), Some(SymbolCategory::Diameter));
        assert_eq!(category_of("DIA12"), Some(SymbolCategory::Diameter));
        assert_eq!(category_of("radial 4"), None);
        assert_eq!(category_of("diagonal 40"), None);
    }

    #[test]
    fn test_mark_puts_symbol_in_place() {
        let table = SymbolTable::builtin();
        let rule = table.lookup("dia 12").unwrap();
        assert_eq!(rule.mark("2x dia 12").split_whitespace().collect::<Vec<_>>(), ["2x", "⌀", "12"]);
        assert_eq!(rule.strip("dia 12").trim(), "12");
    }

    #[test]
    fn test_glyphs_are_recognised() {
        assert_eq!(category_of("⏥ 0.05 A"), Some(SymbolCategory::Flatness));
        assert_eq!(category_of("// 0.1 B"), Some(SymbolCategory::Parallelism));
        assert_eq!(category_of("⊥ 0.1 B"), Some(SymbolCategory::Perpendicularity));
    }

    #[test]
    fn test_no_match_is_none() {
        assert_eq!(category_of("25 ±0.1"), None);
        assert_eq!(category_of(""), None);
    }

    #[test]
    fn test_substring_imprecision_is_kept() {
        // "round" inside "surround" still selects circularity.
        assert_eq!(category_of("surround 5"), Some(SymbolCategory::Circularity));
    }

    #[test]
    fn test_weld_glyph_lookup_ignores_keywords() {
        let table = SymbolTable::builtin();
        assert!(table.find_weld_glyph("fillet weld 5").is_none());
        let rule = table.find_weld_glyph("a5 ◺").expect("glyph present");
        assert_eq!(rule.category(), SymbolCategory::FilletWeld);
    }

    #[test]
    fn test_strip_takes_inflection_along() {
        let table = SymbolTable::builtin();
        let rule = table.lookup("Perpendicularity 0.1 A").unwrap();
        assert_eq!(rule.strip("Perpendicularity 0.1 A").trim(), "0.1 A");
        let rule = table.lookup("Płaskości 0.05").unwrap();
        assert_eq!(rule.strip("Płaskości 0.05").trim(), "0.05");
    }

    #[test]
    fn test_strip_glyph_keeps_glued_value() {
        let table = SymbolTable::builtin();
        let rule = table.lookup("⌀12.5").unwrap();
        assert_eq!(rule.strip("⌀12.5").trim(), "12.5");
        let rule = table.lookup("dia.12").unwrap();
        assert_eq!(rule.strip("dia.12").trim(), "12");
    }

    #[test]
    fn test_custom_rule_order_is_respected() {
        let table = SymbolTable::from_rules(vec![
            SymbolRule::for_category(SymbolCategory::Flatness, ["flat"], ["⏥"]),
            SymbolRule::for_category(SymbolCategory::Position, ["flat position"], ["⌖"]),
        ]);
        let rule = table.lookup("flat position 0.1").unwrap();
        assert_eq!(rule.category(), SymbolCategory::Flatness);
        assert_eq!(rule.symbol(), "⏥");
    }
}
