//! Data model: the upstream payload and the classified drawing.
//!
//! Two layers:
//!
//! * [`DrawingInput`] / [`RawDimension`] mirror the JSON returned by the
//!   drawing extraction service. They are deliberately lenient (numbers are
//!   accepted where strings are expected, optional fields may be absent).
//! * [`DrawingData`] / [`Dimension`] are the classified, read-only records the
//!   report engine consumes. They are built once by
//!   [`crate::pipeline::record::build_drawing`] and never mutated afterwards.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Number of independent samples, and therefore reports, per drawing.
pub const SAMPLE_COUNT: usize = 3;

/// Default number of inspection rows per report page.
pub const DEFAULT_PAGE_CAPACITY: usize = 23;

// ── Classification ───────────────────────────────────────────────────────────

/// Outcome of classifying one characteristic. Mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ClassificationKind {
    /// A plain dimension or note, rendered as normalized text.
    #[default]
    PlainDimension,
    /// A weld callout; pass/fail rather than measured.
    WeldSymbol,
    /// A framed geometric tolerance (or diameter callout).
    #[serde(rename = "GDTFrame")]
    GdtFrame,
}

impl ClassificationKind {
    pub fn is_weld(self) -> bool {
        self == ClassificationKind::WeldSymbol
    }

    pub fn is_gdt(self) -> bool {
        self == ClassificationKind::GdtFrame
    }

    /// Short label used by the CLI inspection table.
    pub fn label(self) -> &'static str {
        match self {
            ClassificationKind::PlainDimension => "plain",
            ClassificationKind::WeldSymbol => "weld",
            ClassificationKind::GdtFrame => "gd&t",
        }
    }
}

impl fmt::Display for ClassificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ── Classified records ───────────────────────────────────────────────────────

/// One inspection row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dimension {
    /// Balloon number as printed on the drawing; defines row order.
    pub balloon_id: String,
    /// Source text, kept for audit.
    pub raw_characteristic: String,
    /// Canonical display string.
    pub normalized_characteristic: String,
    pub kind: ClassificationKind,
    /// One result per sample; index `i` belongs to sample `i + 1`.
    pub results: [String; SAMPLE_COUNT],
    pub is_weld: bool,
    #[serde(rename = "isGDT")]
    pub is_gdt: bool,
}

impl Dimension {
    /// Result displayed in the report for a 0-based sample index.
    /// Out-of-range indices read as blank.
    pub fn result(&self, sample: usize) -> &str {
        self.results.get(sample).map(String::as_str).unwrap_or("")
    }
}

/// A classified drawing: metadata plus rows in balloon order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawingData {
    pub drawing_number: String,
    pub part_name: String,
    pub report_date: String,
    pub dimensions: Vec<Dimension>,
}

// ── Upstream payload ─────────────────────────────────────────────────────────

/// Drawing payload as produced by the extraction service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawingInput {
    #[serde(deserialize_with = "lenient_string")]
    pub drawing_number: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub part_name: String,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub report_date: Option<String>,
    pub dimensions: Vec<RawDimension>,
}

/// One balloon as extracted from the drawing, before classification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDimension {
    #[serde(deserialize_with = "lenient_string")]
    pub balloon_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub characteristic: String,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub results: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_weld: Option<bool>,
    #[serde(default, rename = "isGDT", skip_serializing_if = "Option::is_none")]
    pub is_gdt: Option<bool>,
    #[serde(default, deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub nominal: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub upper_tol: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub lower_tol: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl RawDimension {
    /// Convenience constructor used by tests and library callers.
    pub fn new(balloon_id: impl Into<String>, characteristic: impl Into<String>) -> Self {
        Self {
            balloon_id: balloon_id.into(),
            characteristic: characteristic.into(),
            ..Self::default()
        }
    }

    pub fn with_results<I, S>(mut self, results: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.results = results.into_iter().map(Into::into).collect();
        self
    }

    /// The text to classify. A blank characteristic is composed from the
    /// structured nominal/tolerance fields when those are present.
    pub fn characteristic_text(&self) -> String {
        if !self.characteristic.trim().is_empty() {
            return self.characteristic.clone();
        }
        let Some(nominal) = self.nominal.as_deref().map(str::trim).filter(|n| !n.is_empty()) else {
            return self.characteristic.clone();
        };

        let upper = self.upper_tol.as_deref().map(str::trim).filter(|t| !t.is_empty());
        let lower = self.lower_tol.as_deref().map(str::trim).filter(|t| !t.is_empty());
        let mut text = nominal.to_string();
        match (upper, lower) {
            (Some(u), Some(l)) if strip_sign(u) == strip_sign(l) => {
                text.push_str(" ±");
                text.push_str(strip_sign(u));
            }
            (u, l) => {
                if let Some(u) = u {
                    text.push(' ');
                    text.push_str(&signed(u, '+'));
                }
                if let Some(l) = l {
                    text.push(' ');
                    text.push_str(&signed(l, '-'));
                }
            }
        }
        if let Some(unit) = self.unit.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
            text.push(' ');
            text.push_str(unit);
        }
        text
    }
}

fn strip_sign(tol: &str) -> &str {
    tol.trim_start_matches(['+', '-', '±']).trim()
}

fn signed(tol: &str, default_sign: char) -> String {
    if tol.starts_with(['+', '-', '±']) {
        tol.to_string()
    } else {
        format!("{default_sign}{tol}")
    }
}

// ── Lenient field decoding ───────────────────────────────────────────────────
//
// Extraction models occasionally emit `"balloonId": 7` or `"results": [0.05]`.
// Numbers and booleans are accepted and rendered as text; `null` reads as empty.

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Number(serde_json::Number),
    Flag(bool),
}

impl From<Scalar> for String {
    fn from(value: Scalar) -> Self {
        match value {
            Scalar::Text(s) => s,
            Scalar::Number(n) => n.to_string(),
            Scalar::Flag(b) => b.to_string(),
        }
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    Ok(Option::<Scalar>::deserialize(de)?.map(String::from).unwrap_or_default())
}

fn lenient_opt_string<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<Scalar>::deserialize(de)?.map(String::from))
}

fn lenient_strings<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<String>, D::Error> {
    let items = Option::<Vec<Option<Scalar>>>::deserialize(de)?.unwrap_or_default();
    Ok(items
        .into_iter()
        .map(|s| s.map(String::from).unwrap_or_default())
        .collect())
}
