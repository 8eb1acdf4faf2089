//! Column classification by header keyword

use crate::config::PipelineConfig;

/// Header columns relevant to contact data
///
/// Both lists hold header indices in original header order; `phone` is a
/// subset of `selected`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnClassification {
    pub selected: Vec<usize>,
    pub phone: Vec<usize>,
}

impl ColumnClassification {
    /// Classifies `header` against the configured keywords
    ///
    /// A column is selected when its name contains any keyword, and is
    /// phone-bearing when it also contains the phone keyword. Matching is a
    /// case-insensitive substring test.
    pub fn classify(header: &[String], config: &PipelineConfig) -> Self {
        let keywords: Vec<String> = config
            .column_keywords
            .iter()
            .map(|k| k.to_lowercase())
            .collect();
        let phone_keyword = config.phone_keyword.to_lowercase();

        let mut classification = Self::default();
        for (index, name) in header.iter().enumerate() {
            let lowered = name.to_lowercase();
            if !keywords.iter().any(|k| lowered.contains(k.as_str())) {
                continue;
            }
            classification.selected.push(index);
            if lowered.contains(&phone_keyword) {
                classification.phone.push(index);
            }
        }
        classification
    }

    pub fn is_phone(&self, index: usize) -> bool {
        self.phone.contains(&index)
    }

    /// Names of the selected columns, in header order
    pub fn selected_names(&self, header: &[String]) -> Vec<String> {
        self.selected.iter().map(|&i| header[i].clone()).collect()
    }
}
