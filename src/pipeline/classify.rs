//! Characteristic classifier: raw callout text → canonical notation.
//!
//! Precedence, first match wins:
//!
//! 1. A weld glyph already in the text → [`ClassificationKind::WeldSymbol`].
//! 2. A symbol-table hit:
//!    - GD&T rule → framed `"⏥ | 0.05 | A"` ([`ClassificationKind::GdtFrame`])
//!    - diameter rule → `"⌀12.5"`, the sign glued to the value it stood
//!      before (`"2x ⌀6 thru"` keeps its order) ([`ClassificationKind::GdtFrame`])
//!    - weld keyword → `"a5 ◺"` ([`ClassificationKind::WeldSymbol`])
//! 3. Nothing recognised → the normalized text
//!    ([`ClassificationKind::PlainDimension`]).
//!
//! Every canonical form classifies back to itself, so classifying an
//! already-canonical characteristic is a no-op. The classifier has no
//! error path.

use crate::model::ClassificationKind;
use crate::pipeline::normalize::Normalizer;
use crate::pipeline::symbols::{SymbolCategory, SymbolFamily, SymbolRule, SymbolTable};
use once_cell::sync::Lazy;
use regex::Regex;

/// Result of classifying one characteristic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub kind: ClassificationKind,
    /// Canonical display text.
    pub text: String,
    /// The symbol-table category that decided the outcome, if any.
    pub category: Option<SymbolCategory>,
}

impl Classification {
    fn plain(text: String) -> Self {
        Self {
            kind: ClassificationKind::PlainDimension,
            text,
            category: None,
        }
    }
}

/// Symbol table plus normalizer, built once per configuration.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    symbols: SymbolTable,
    normalizer: Normalizer,
}

impl Classifier {
    pub fn new(symbols: SymbolTable, normalizer: Normalizer) -> Self {
        Self {
            symbols,
            normalizer,
        }
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Classify one raw characteristic.
    pub fn classify(&self, raw: &str) -> Classification {
        if let Some(rule) = self.symbols.find_weld_glyph(raw) {
            return self.weld(rule, raw);
        }
        match self.symbols.lookup(raw) {
            Some(rule) => match rule.family() {
                SymbolFamily::Weld => self.weld(rule, raw),
                SymbolFamily::Diameter => self.diameter(rule, raw),
                SymbolFamily::Gdt => self.frame(rule, raw),
            },
            None => Classification::plain(self.normalizer.normalize(raw)),
        }
    }

    /// Strip the rule's own vocabulary, then the filler.
    fn remainder(&self, rule: &SymbolRule, raw: &str) -> String {
        self.normalizer.normalize(&rule.strip(raw))
    }

    // ── Weld: `<size><rest> <glyph>` ─────────────────────────────────────────

    fn weld(&self, rule: &SymbolRule, raw: &str) -> Classification {
        let rest = self.remainder(rule, raw);
        let rest = weld_size(&rest, raw);
        let text = if rest.is_empty() {
            rule.symbol().to_string()
        } else {
            format!("{rest} {}", rule.symbol())
        };
        Classification {
            kind: ClassificationKind::WeldSymbol,
            text,
            category: Some(rule.category()),
        }
    }

    // ── Diameter: `⌀<value>` where the sign stood ────────────────────────────

    fn diameter(&self, rule: &SymbolRule, raw: &str) -> Classification {
        let marked = self.normalizer.normalize(&rule.mark(raw));
        let text = attach_marks(&marked, rule.symbol());
        Classification {
            kind: ClassificationKind::GdtFrame,
            text,
            category: Some(rule.category()),
        }
    }

    // ── GD&T frame: `<symbol> | <value>[ | <datum>…]` ────────────────────────

    fn frame(&self, rule: &SymbolRule, raw: &str) -> Classification {
        let rest = self.remainder(rule, raw);
        let mut tokens = rest.split_whitespace().peekable();

        let mut text = rule.symbol().to_string();
        if let Some(first) = tokens.next() {
            let mut value = if is_diameter_sign(first) {
                let sign = SymbolCategory::Diameter.glyph();
                match tokens.next() {
                    Some(next) => format!("{sign}{next}"),
                    None => sign.to_string(),
                }
            } else {
                canonical_diameter(first)
            };
            while let Some(modifier) = tokens.next_if(|t| is_material_modifier(t)) {
                value.push_str(modifier);
            }
            text.push_str(" | ");
            text.push_str(&value);
            for datum in tokens {
                text.push_str(" | ");
                text.push_str(&datum.to_uppercase());
            }
        }
        Classification {
            kind: ClassificationKind::GdtFrame,
            text,
            category: Some(rule.category()),
        }
    }
}

/// Circled modifiers (Ⓜ, Ⓛ, Ⓢ, Ⓟ, Ⓕ, Ⓤ, Ⓔ, Ⓣ) belong to the tolerance value,
/// not to the datum list.
fn is_material_modifier(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| "ⓂⓁⓈⓅⒻⓊⒺⓉ".contains(c))
}

const DIAMETER_SIGNS: &[char] = &['⌀', 'ø', 'Ø', 'φ', 'Φ'];

/// A diameter sign standing on its own, separated from its value.
fn is_diameter_sign(token: &str) -> bool {
    let mut chars = token.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if DIAMETER_SIGNS.contains(&c))
}

/// `Ø0.1` → `⌀0.1`; anything else unchanged.
fn canonical_diameter(token: &str) -> String {
    match token.strip_prefix(DIAMETER_SIGNS) {
        Some(rest) => format!("{}{rest}", SymbolCategory::Diameter.glyph()),
        None => token.to_string(),
    }
}

/// Glue each standalone `mark` token to the token after it. A mark with
/// nothing after it (`"12 dia."`) prefixes the first token instead.
fn attach_marks(text: &str, mark: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut pending = false;
    for token in text.split_whitespace() {
        if token == mark {
            pending = true;
        } else if pending {
            out.push(format!("{mark}{token}"));
            pending = false;
        } else {
            out.push(token.to_string());
        }
    }
    if pending {
        match out.first_mut() {
            None => out.push(mark.to_string()),
            Some(first) if !first.starts_with(mark) => first.insert_str(0, mark),
            Some(_) => {}
        }
    }
    out.join(" ")
}

static RE_WELD_SIZE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([aAzZ])\s*=?\s*(\d)").unwrap());
static RE_HAS_WELD_SIZE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\s)[aAzZ]=?\d").unwrap());

/// Normalise `a 5` / `A=5` to `a5`, and prefix a bare leading number with
/// `a` (throat) or `z` (leg, when the source text says so).
fn weld_size(rest: &str, raw: &str) -> String {
    let rest = RE_WELD_SIZE
        .replace(rest, |caps: &regex::Captures<'_>| {
            format!("{}{}", caps[1].to_lowercase(), &caps[2])
        })
        .into_owned();

    let starts_with_digit = rest.chars().next().is_some_and(|c| c.is_ascii_digit());
    if !starts_with_digit || RE_HAS_WELD_SIZE.is_match(&rest) {
        return rest;
    }
    let lower = raw.to_lowercase();
    let prefix = if lower.contains("leg") || lower.contains("ramię") || lower.contains("ramie") {
        'z'
    } else {
        'a'
    };
    format!("{prefix}{rest}")
}

// ── Tests ────────────────────────────────────────────────────────────────────
