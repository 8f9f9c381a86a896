//! Pipeline stages from drawing payload to DOCX bytes.
//!
//! Each submodule implements exactly one transformation step, so each can
//! be tested on its own.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ record ──▶ assemble ──▶ layout ──▶ docx
//! (JSON)    │            │ (×3)       (tree)    (zip)
//!           │            └─ paginate
//!           └─ classify ◀── normalize, symbols
//! ```
//!
//! 1. [`input`]: read the payload from a file or stdin and decode it
//! 2. [`symbols`]: ordered keyword → glyph rule table
//! 3. [`normalize`]: strip filler words and units until nothing changes
//! 4. [`classify`]: weld / diameter / GD&T frame / plain dimension
//! 5. [`record`]: one classified [`crate::model::Dimension`] per balloon,
//!    results filled to three samples
//! 6. [`paginate`]: fixed-capacity pages
//! 7. [`assemble`]: one report per sample
//! 8. [`layout`]: report → format-neutral [`crate::document::Document`]
//! 9. [`docx`]: document → WordprocessingML package; the only stage
//!    that can fail per report
//!
//! [`tsv`] is a side output for pasting rows into another table.

pub mod assemble;
pub mod classify;
pub mod docx;
pub mod input;
pub mod layout;
pub mod normalize;
pub mod paginate;
pub mod record;
pub mod symbols;
pub mod tsv;
