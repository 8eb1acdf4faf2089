//! Row cleaning: column restriction plus phone normalization

use crate::config::PipelineConfig;
use crate::pipeline::columns::ColumnClassification;
use crate::pipeline::document::CsvDocument;
use crate::pipeline::phone::{clean_phone, is_valid_phone};

/// Builds the cleaned document for `doc`
///
/// Each row is restricted to the selected columns and its phone-bearing values
/// are reduced to digits. A row survives only if at least one phone-bearing
/// value is then a valid phone number.
pub fn clean_rows(
    doc: &CsvDocument,
    classification: &ColumnClassification,
    config: &PipelineConfig,
) -> CsvDocument {
    let header = classification.selected_names(doc.header());

    let rows = doc
        .rows()
        .iter()
        .filter_map(|row| {
            let mut has_valid_phone = false;
            let cleaned: Vec<String> = classification
                .selected
                .iter()
                .map(|&index| {
                    let value = &row[index];
                    if classification.is_phone(index) {
                        let digits = clean_phone(value);
                        if is_valid_phone(&digits, config.min_phone_digits) {
                            has_valid_phone = true;
                        }
                        digits
                    } else {
                        value.clone()
                    }
                })
                .collect();

            has_valid_phone.then_some(cleaned)
        })
        .collect();

    CsvDocument::new(header, rows)
}
