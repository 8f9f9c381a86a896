//! Printed texts of the inspection report form.
//!
//! The layout code never hard-codes a label; every visible string comes from
//! a [`ReportTemplate`]. The default reproduces the Polish sample-approval
//! form ("Raport z kontroli wzorca do zatwierdzenia"). A template can be
//! loaded from JSON, and any field left out of the JSON keeps its default.

use crate::error::ReportError;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReportTemplate {
    /// Form codes printed above the header, left / centre / right.
    pub form_codes: Vec<String>,
    pub organization_name: String,
    pub organization_subtitle: String,
    /// Centred title block, one paragraph per line.
    pub title_lines: Vec<String>,

    pub report_number_label: String,
    pub date_label: String,
    pub page_label: String,

    pub description_heading: String,
    pub part_heading: String,
    /// Checkbox line in the description cell.
    pub change_kind_line: String,
    pub drawing_number_label: String,
    pub part_name_label: String,
    /// Printed when the payload has no part name.
    pub part_name_fallback: String,

    pub balloon_header: String,
    pub characteristic_header: String,
    pub result_header: String,
    /// Extra, always-blank column for the customer's own measurement.
    pub reviewer_header: Option<String>,

    /// Render the attestation, decision matrix and signature line.
    pub show_footer: bool,
    pub attestation: String,
    pub remarks_lines: Vec<String>,
    pub decision_title: String,
    pub decision_columns: Vec<String>,
    pub decision_rows: Vec<String>,
    /// Signature fields, separated by tabs on one line.
    pub signature_fields: Vec<String>,

    pub body_font: String,
    /// Font of the characteristic column; narrow so frames fit one line.
    pub characteristic_font: String,
    /// Hex fill of heading cells.
    pub heading_fill: String,
}

impl Default for ReportTemplate {
    fn default() -> Self {
        let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Self {
            form_codes: owned(&["DJ-IO 06", "F-NP 016", "z06.01"]),
            organization_name: "CBM Polska".into(),
            organization_subtitle: "KONSTRUKCJE MECHANICZNE Sp. z o.o.".into(),
            title_lines: owned(&["Raport z kontroli", "WZORCA DO ZATWIERDZENIA"]),

            report_number_label: "Rap. Nr".into(),
            date_label: "Data".into(),
            page_label: "Strona".into(),

            description_heading: "Opis wzorca".into(),
            part_heading: "Nazwa i rysunek części".into(),
            change_kind_line: "Nowa część [ X ]  Zmodyfikowana [  ]  Nowy dostawca [  ]".into(),
            drawing_number_label: "Nr rys.".into(),
            part_name_label: "Nazwa części".into(),
            part_name_fallback: "Część".into(),

            balloon_header: "Lp".into(),
            characteristic_header: "Charakterystyka".into(),
            result_header: "Wynik dostawcy".into(),
            reviewer_header: None,

            show_footer: true,
            attestation: "Gwarantujemy że wyniki zapisane powyżej są prawdziwe i nasz wzorzec \
                          został wykonany zgodnie z wymaganiami KJ CBM Polska"
                .into(),
            remarks_lines: owned(&[
                "UWAGI: __________________________________________________________________",
                "__________________________________________________________________________",
            ]),
            decision_title: "DECYZJE".into(),
            decision_columns: owned(&["WYM.", "WZROK.", "MAT.", "OBR."]),
            decision_rows: owned(&["TAK", "NIE"]),
            signature_fields: owned(&[
                "Podpis KJ Dostawcy: _________________",
                "Lab. Metrologiczne: _________________",
                "KJ CBM: _________________",
            ]),

            body_font: "Arial".into(),
            characteristic_font: "Arial Narrow".into(),
            heading_fill: "F2F2F2".into(),
        }
    }
}

impl ReportTemplate {
    /// Parse a template from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ReportError> {
        serde_json::from_str(json).map_err(|e| ReportError::InvalidConfig(format!("Report template: {e}")))
    }

    /// Read a JSON template file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ReportError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ReportError::FileNotFound {
                path: path.to_path_buf(),
            },
            std::io::ErrorKind::PermissionDenied => ReportError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => ReportError::InvalidConfig(format!("Report template '{}': {e}", path.display())),
        })?;
        Self::from_json(&json)
    }

    /// Number of columns in the inspection table.
    pub fn column_count(&self) -> usize {
        if self.reviewer_header.is_some() {
            4
        } else {
            3
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ReportError> {
        if !is_hex_colour(&self.heading_fill) {
            return Err(ReportError::InvalidConfig(format!(
                "Heading fill must be a 6-digit hex colour, got '{}'",
                self.heading_fill
            )));
        }
        if self.show_footer && (self.decision_columns.is_empty() || self.decision_rows.is_empty()) {
            return Err(ReportError::InvalidConfig(
                "Decision matrix needs at least one column and one row".into(),
            ));
        }
        Ok(())
    }
}

fn is_hex_colour(s: &str) -> bool {
    s.len() == 6 && s.chars().all(|c| c.is_ascii_hexdigit())
}
