// ============================================================
// Layer 5 — Inferencer
// ============================================================
// Rebuilds the trained classifier from a checkpoint directory
// and classifies single texts with it:
//
//   text → clean → vocabulary ids → left-pad to max_seq_len
//        → forward → softmax → arg-max class
//
// The vocabulary, cleaner settings and sequence length all come
// from the checkpoint, never from the command line, so a text is
// encoded exactly as the training data was.
//
// Runs on the inner (non-autodiff) backend: no dropout.

use std::time::Instant;

use anyhow::Result;
use burn::{prelude::*, tensor::activation};

use crate::data::{encoder::SequenceEncoder, preprocessor::TextCleaner, vocabulary::Vocabulary};
use crate::domain::{
    error::PipelineError,
    example::LabelScheme,
    traits::{Prediction, SentimentClassifier},
};
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::{model::SentimentRnn, Device, InferenceBackend};

pub struct Inferencer {
    model:   SentimentRnn<InferenceBackend>,
    vocab:   Vocabulary,
    cleaner: TextCleaner,
    encoder: SequenceEncoder,
    scheme:  LabelScheme,
    device:  Device,
}

impl Inferencer {
    pub fn from_checkpoint(ckpt_manager: &CheckpointManager, device: Device) -> Result<Self> {
        let cfg   = ckpt_manager.load_config()?;
        let vocab = ckpt_manager.load_vocabulary()?;

        if vocab.embedding_rows() != cfg.embedding_rows {
            return Err(PipelineError::VocabularyMismatch {
                expected: cfg.embedding_rows,
                actual:   vocab.embedding_rows(),
            }
            .into());
        }

        let model = cfg.model_config(cfg.embedding_rows).init::<InferenceBackend>(&device);
        let model = ckpt_manager.load_model(model, &device)?;
        tracing::info!(
            "Model loaded from '{}' ({} tokens, max_seq_len={})",
            ckpt_manager.dir().display(),
            vocab.len(),
            cfg.max_seq_len,
        );

        Ok(Self {
            model,
            vocab,
            cleaner: cfg.cleaner(),
            encoder: cfg.encoder(),
            scheme:  cfg.label_scheme(),
            device,
        })
    }

    pub fn model(&self) -> &SentimentRnn<InferenceBackend> {
        &self.model
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn cleaner(&self) -> &TextCleaner {
        &self.cleaner
    }

    pub fn encoder(&self) -> &SequenceEncoder {
        &self.encoder
    }

    pub fn label_scheme(&self) -> &LabelScheme {
        &self.scheme
    }

    pub fn device(&self) -> &Device {
        &self.device
    }
}

impl SentimentClassifier for Inferencer {
    fn classify(&self, text: &str) -> Result<Prediction> {
        let started = Instant::now();

        let tokens  = self.cleaner.clean(text)?;
        // Unknown tokens become padding but are still counted
        let encoded = self.encoder.encode_with_stats(&tokens, &self.vocab);

        let ids: Vec<i32> = encoded.ids.iter().map(|&id| id as i32).collect();
        let input = Tensor::<InferenceBackend, 1, Int>::from_ints(ids.as_slice(), &self.device)
            .reshape([1, self.encoder.max_len()]);

        let probabilities: Vec<f32> = activation::softmax(self.model.forward(input), 1)
            .into_data()
            .iter::<f32>()
            .collect();

        let unit = probabilities
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap_or(0);
        let label = self.scheme.from_index(unit);

        Ok(Prediction {
            label,
            class_name: self.scheme.name_of(label),
            probabilities,
            unknown_tokens: encoded.unknown_tokens,
            elapsed: started.elapsed(),
        })
    }
}
