// ============================================================
// Layer 4 — Sentiment Batcher
// ============================================================
// Implements Burn's Batcher trait to stack SentimentItems into
// tensors.
//
//   Input:  Vec of N items, each with seq_len token ids
//   Output: token_ids [N, seq_len], targets [N]
//
// All sequences are already padded to the same length by the
// SequenceEncoder, so batching is a flatten + reshape.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::SentimentItem;

#[derive(Debug, Clone)]
pub struct SentimentBatch<B: Backend> {
    /// Token id sequences — shape: [batch_size, seq_len]
    pub token_ids: Tensor<B, 2, Int>,

    /// Target output units — shape: [batch_size]
    pub targets: Tensor<B, 1, Int>,
}

#[derive(Clone, Debug)]
pub struct SentimentBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> SentimentBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<SentimentItem, SentimentBatch<B>> for SentimentBatcher<B> {
    fn batch(&self, items: Vec<SentimentItem>) -> SentimentBatch<B> {
        let batch_size = items.len();
        let seq_len    = items.first().map(|i| i.token_ids.len()).unwrap_or(0);

        // Vec<Vec<u32>> → flat Vec<i32> (Burn Int tensors take i32 input)
        let ids_flat: Vec<i32> = items
            .iter()
            .flat_map(|item| item.token_ids.iter().map(|&id| id as i32))
            .collect();

        let targets: Vec<i32> = items.iter().map(|item| item.target as i32).collect();

        let token_ids = Tensor::<B, 1, Int>::from_ints(ids_flat.as_slice(), &self.device)
            .reshape([batch_size, seq_len]);
        let targets = Tensor::<B, 1, Int>::from_ints(targets.as_slice(), &self.device);

        SentimentBatch { token_ids, targets }
    }
}
