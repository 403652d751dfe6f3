// ============================================================
// Layer 4 — Sequence Encoder / Padder
// ============================================================
// Converts a token sequence into exactly `max_len` ids.
//
//   tokens → ids        unknown tokens become PAD_ID (0)
//   len > max_len       keep only the LAST max_len ids
//   len < max_len       prepend zeros until len == max_len
//
// Example with max_len = 5:
//   [7, 3, 9]             → [0, 0, 7, 3, 9]
//   [1, 2, 3, 4, 5, 6, 7] → [3, 4, 5, 6, 7]
//
// Padding and truncating at the front keeps the end of every
// tweet adjacent to the final step of the forward recurrent
// pass. The encoder is pure, so training and inference produce
// identical arrays for identical text.

use crate::data::vocabulary::{Vocabulary, PAD_ID};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceEncoder {
    max_len: usize,
}

/// An encoded sequence plus how many tokens fell outside the vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    pub ids:            Vec<u32>,
    pub unknown_tokens: usize,
}

impl SequenceEncoder {
    pub fn new(max_len: usize) -> Self {
        Self { max_len }
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Encode tokens, counting out-of-vocabulary tokens.
    pub fn encode_with_stats<S: AsRef<str>>(&self, tokens: &[S], vocab: &Vocabulary) -> Encoded {
        let mut unknown_tokens = 0usize;
        let ids: Vec<u32> = tokens
            .iter()
            .map(|t| {
                vocab.id(t.as_ref()).unwrap_or_else(|| {
                    unknown_tokens += 1;
                    PAD_ID
                })
            })
            .collect();

        if unknown_tokens > 0 {
            tracing::debug!("{} of {} tokens not in vocabulary", unknown_tokens, tokens.len());
        }

        Encoded { ids: self.pad(&ids), unknown_tokens }
    }

    pub fn encode<S: AsRef<str>>(&self, tokens: &[S], vocab: &Vocabulary) -> Vec<u32> {
        self.encode_with_stats(tokens, vocab).ids
    }

    /// Pre-truncate / pre-pad raw ids to `max_len`.
    pub fn pad(&self, ids: &[u32]) -> Vec<u32> {
        let keep = &ids[ids.len().saturating_sub(self.max_len)..];
        let mut out = vec![PAD_ID; self.max_len - keep.len()];
        out.extend_from_slice(keep);
        out
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::preprocessor::TextCleaner;

    #[test]
    fn test_left_pads_short_sequences() {
        let enc = SequenceEncoder::new(5);
        assert_eq!(enc.pad(&[7, 3, 9]), vec![0, 0, 7, 3, 9]);
    }

    #[test]
    fn test_keeps_last_tokens_of_long_sequences() {
        let enc = SequenceEncoder::new(5);
        assert_eq!(enc.pad(&[1, 2, 3, 4, 5, 6, 7]), vec![3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_length_is_always_max_len() {
        let enc = SequenceEncoder::new(8);
        for n in 0..20u32 {
            let ids: Vec<u32> = (1..=n).collect();
            assert_eq!(enc.pad(&ids).len(), 8);
        }
        assert!(SequenceEncoder::new(0).pad(&[1, 2]).is_empty());
    }

    #[test]
    fn test_unknown_tokens_map_to_padding_and_are_counted() {
        let vocab = Vocabulary::from_tokens(vec!["pizza".into(), "cold".into()]);
        let enc   = SequenceEncoder::new(4);
        let out   = enc.encode_with_stats(&["pizza", "was", "cold"], &vocab);
        assert_eq!(out.ids, vec![0, 1, 0, 2]);
        assert_eq!(out.unknown_tokens, 1);
    }

    #[test]
    fn test_end_to_end_tweet_encoding() {
        let cleaner = TextCleaner::default();
        let tokens  = cleaner.clean("delivery was hour late and my pizza was cold!").unwrap();
        let vocab   = Vocabulary::build(&vec![tokens.clone()]);
        let enc     = SequenceEncoder::new(500);
        let ids     = enc.encode(&tokens, &vocab);

        assert_eq!(ids.len(), 500);
        let expected: Vec<u32> = tokens.iter().map(|t| vocab.id(t).unwrap()).collect();
        assert_eq!(&ids[500 - expected.len()..], expected.as_slice());
        assert!(ids[..500 - expected.len()].iter().all(|&id| id == PAD_ID));
    }
}
