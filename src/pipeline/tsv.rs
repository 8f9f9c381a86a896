//! Tab-separated rows for pasting into a word-processor table.
//!
//! `balloonId<TAB>normalizedCharacteristic<TAB>result`, one line per row,
//! no header and no trailing newline. Tabs and line breaks inside a field
//! become spaces so each dimension stays on one line with three cells.

use crate::model::Dimension;

/// One line for one dimension; `sample` is 0-based.
pub fn tsv_row(dimension: &Dimension, sample: usize) -> String {
    [
        clean(&dimension.balloon_id),
        clean(&dimension.normalized_characteristic),
        clean(dimension.result(sample)),
    ]
    .join("\t")
}

/// All selected dimensions, one line each.
pub fn to_tsv<'a, I>(dimensions: I, sample: usize) -> String
where
    I: IntoIterator<Item = &'a Dimension>,
{
    dimensions
        .into_iter()
        .map(|d| tsv_row(d, sample))
        .collect::<Vec<_>>()
        .join("\n")
}

fn clean(field: &str) -> String {
    field
        .chars()
        .map(|c| if matches!(c, '\t' | '\n' | '\r') { ' ' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ClassificationKind;

    fn dim(id: &str, text: &str, results: [&str; 3]) -> Dimension {
        Dimension {
            balloon_id: id.into(),
            raw_characteristic: text.into(),
            normalized_characteristic: text.into(),
            kind: ClassificationKind::PlainDimension,
            results: results.map(String::from),
            is_weld: false,
            is_gdt: false,
        }
    }

    #[test]
    fn single_row() {
        let d = dim("1", "⏥ | 0.05 | A", ["0.04", "0.06", "0.05"]);
        assert_eq!(tsv_row(&d, 1), "1\t⏥ | 0.05 | A\t0.06");
    }

    #[test]
    fn multi_row_has_no_trailing_newline() {
        let dims = [dim("1", "25", ["a", "b", "c"]), dim("2", "30", ["d", "e", "f"])];
        assert_eq!(to_tsv(&dims, 2), "1\t25\tc\n2\t30\tf");
        assert_eq!(to_tsv(&[], 0), "");
    }

    #[test]
    fn embedded_separators_become_spaces() {
        let d = dim("3", "line\tone\ntwo", ["x\ty", "", ""]);
        assert_eq!(tsv_row(&d, 0), "3\tline one two\tx y");
    }
}
