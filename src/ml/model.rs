use burn::{
    module::Param,
    nn::{
        loss::CrossEntropyLossConfig,
        Embedding, EmbeddingConfig,
        Linear, LinearConfig,
    },
    prelude::*,
    tensor::{activation, backend::AutodiffBackend},
};

use crate::domain::cell_kind::CellKind;
use crate::ml::recurrent::{RecurrentCell, RecurrentCellConfig};

// #[derive(Config)] brings Clone + serde; the record side lives in SentimentRnnRecord.
#[derive(Config, Debug)]
pub struct SentimentRnnConfig {
    /// Embedding rows: vocabulary size + 1 for padding
    pub vocab_size:        usize,
    pub embedding_dim:     usize,
    pub hidden_size:       usize,
    pub num_classes:       usize,
    #[config(default = true)]
    pub bidirectional:     bool,
    #[config(default = "CellKind::Gru")]
    pub cell:              CellKind,
    #[config(default = 0.2)]
    pub dropout:           f64,
    #[config(default = 0.2)]
    pub recurrent_dropout: f64,
}

impl SentimentRnnConfig {
    /// Randomly initialised embedding. Used when weights are about to be
    /// replaced by a checkpoint record.
    pub fn init<B: Backend>(&self, device: &B::Device) -> SentimentRnn<B> {
        let embedding = EmbeddingConfig::new(self.vocab_size, self.embedding_dim).init(device);
        self.assemble(embedding, device)
    }

    /// Embedding initialised from a pretrained matrix of shape
    /// [vocab_size, embedding_dim].
    pub fn init_with_embeddings<B: Backend>(
        &self,
        weights: Tensor<B, 2>,
        device:  &B::Device,
    ) -> SentimentRnn<B> {
        let mut embedding = EmbeddingConfig::new(self.vocab_size, self.embedding_dim).init(device);
        embedding.weight = Param::from_tensor(weights);
        self.assemble(embedding, device)
    }

    fn assemble<B: Backend>(&self, embedding: Embedding<B>, device: &B::Device) -> SentimentRnn<B> {
        let cell_cfg = RecurrentCellConfig::new(self.embedding_dim, self.hidden_size)
            .with_kind(self.cell);
        let forward_cell  = cell_cfg.init(device);
        let backward_cell = self.bidirectional.then(|| cell_cfg.init(device));
        let directions    = if self.bidirectional { 2 } else { 1 };

        SentimentRnn {
            // Frozen: parameters carry no gradient and forward() detaches the lookup
            embedding: embedding.no_grad(),
            forward_cell,
            backward_cell,
            classifier: LinearConfig::new(directions * self.hidden_size, self.num_classes).init(device),
            dropout: self.dropout,
            recurrent_dropout: self.recurrent_dropout,
        }
    }
}

#[derive(Module, Debug)]
pub struct SentimentRnn<B: Backend> {
    pub embedding:         Embedding<B>,
    pub forward_cell:      RecurrentCell<B>,
    pub backward_cell:     Option<RecurrentCell<B>>,
    pub classifier:        Linear<B>,
    pub dropout:           f64,
    pub recurrent_dropout: f64,
}

pub struct ClassificationOutput<B: Backend> {
    pub loss:    Tensor<B, 1>,
    pub logits:  Tensor<B, 2>,
    pub targets: Tensor<B, 1, Int>,
}

impl<B: Backend> SentimentRnn<B> {
    /// token_ids: [batch, seq_len] → logits: [batch, num_classes]
    pub fn forward(&self, token_ids: Tensor<B, 2, Int>) -> Tensor<B, 2> {
        // [batch, seq_len, embedding_dim], cut from the graph so it never trains
        let embedded = self.embedding.forward(token_ids).detach();

        let mut encoded = self.forward_cell.forward(
            embedded.clone(),
            false,
            self.dropout,
            self.recurrent_dropout,
        );
        if let Some(backward) = &self.backward_cell {
            let reversed = backward.forward(embedded, true, self.dropout, self.recurrent_dropout);
            encoded = Tensor::cat(vec![encoded, reversed], 1);
        }

        self.classifier.forward(encoded)
    }

    /// Softmax over classes: [batch, num_classes], rows sum to 1.
    pub fn probabilities(&self, token_ids: Tensor<B, 2, Int>) -> Tensor<B, 2> {
        activation::softmax(self.forward(token_ids), 1)
    }

    /// Arg-max output unit per row: [batch].
    pub fn predict(&self, token_ids: Tensor<B, 2, Int>) -> Tensor<B, 1, Int> {
        self.forward(token_ids).argmax(1).flatten::<1>(0, 1)
    }

    pub fn forward_classification(
        &self,
        token_ids: Tensor<B, 2, Int>,
        targets:   Tensor<B, 1, Int>,
    ) -> ClassificationOutput<B> {
        let logits = self.forward(token_ids);
        let loss = CrossEntropyLossConfig::new()
            .init(&logits.device())
            .forward(logits.clone(), targets.clone());
        ClassificationOutput { loss, logits, targets }
    }
}

impl<B: AutodiffBackend> SentimentRnn<B> {
    /// Loss only, for the training step.
    pub fn forward_loss(&self, token_ids: Tensor<B, 2, Int>, targets: Tensor<B, 1, Int>) -> Tensor<B, 1> {
        self.forward_classification(token_ids, targets).loss
    }
}
