use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

/// One encoded tweet: a fixed-length id sequence and its target unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentItem {
    pub token_ids: Vec<u32>,
    /// Zero-based output unit (class number - 1)
    pub target:    usize,
}

impl SentimentItem {
    pub fn new(token_ids: Vec<u32>, target: usize) -> Self {
        Self { token_ids, target }
    }
}

pub struct SentimentDataset {
    items: Vec<SentimentItem>,
}

impl SentimentDataset {
    pub fn new(items: Vec<SentimentItem>) -> Self { Self { items } }

    pub fn items(&self) -> &[SentimentItem] { &self.items }

    pub fn targets(&self) -> Vec<usize> {
        self.items.iter().map(|i| i.target).collect()
    }
}

impl Dataset<SentimentItem> for SentimentDataset {
    fn get(&self, index: usize) -> Option<SentimentItem> {
        self.items.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_access() {
        let ds = SentimentDataset::new(vec![
            SentimentItem::new(vec![0, 0, 4, 2], 1),
            SentimentItem::new(vec![0, 1, 1, 3], 4),
        ]);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.get(1).unwrap().target, 4);
        assert!(ds.get(2).is_none());
        assert_eq!(ds.targets(), vec![1, 4]);
    }
}
