//! Ordered list of the image records currently displayed.

use crate::api::{ImageRecord, ResultPage};

/// Replaced on a new search, appended on pagination. No cross-page
/// deduplication: a repeated id from a later page is kept.
#[derive(Debug, Clone, Default)]
pub struct ResultAccumulator {
    records: Vec<ImageRecord>,
}

impl ResultAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&mut self, page: ResultPage) {
        self.records = page.results;
    }

    pub fn append(&mut self, page: ResultPage) {
        self.records.extend(page.results);
    }

    pub fn records(&self) -> &[ImageRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockSearchApi;

    fn ids(acc: &ResultAccumulator) -> Vec<&str> {
        acc.records().iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_replace_discards_previous() {
        let api = MockSearchApi::new(2);
        let mut acc = ResultAccumulator::new();
        acc.replace(api.page_for("cats", 1));
        acc.replace(api.page_for("dogs", 1));
        assert_eq!(ids(&acc), vec!["dogs-p1-0", "dogs-p1-1"]);
    }

    #[test]
    fn test_append_preserves_order() {
        let api = MockSearchApi::new(2);
        let mut acc = ResultAccumulator::new();
        acc.replace(api.page_for("cats", 1));
        acc.append(api.page_for("cats", 2));
        assert_eq!(
            ids(&acc),
            vec!["cats-p1-0", "cats-p1-1", "cats-p2-0", "cats-p2-1"]
        );
    }

    #[test]
    fn test_duplicate_ids_across_pages_are_kept() {
        let api = MockSearchApi::new(3);
        let mut acc = ResultAccumulator::new();
        acc.replace(api.page_for("cats", 1));
        acc.append(api.page_for("cats", 1));
        assert_eq!(acc.len(), 6);
        assert_eq!(acc.records()[0], acc.records()[3]);
    }
}
