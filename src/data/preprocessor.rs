// ============================================================
// Layer 4 — Text Cleaner
// ============================================================
// Turns one raw tweet into the word tokens used everywhere
// downstream (vocabulary fitting, encoding, inference).
//
// Cleaning steps (applied in order):
//   1. Remove hashtags  — `#` followed by word chars or dots
//   2. Remove mentions  — `@` followed by word chars or dots
//   3. Split with the HuggingFace `Whitespace` pre-tokenizer
//      (`\w+|[^\w\s]+`), so "cold!" becomes "cold" + "!"
//   4. Keep only pieces made entirely of word characters; any
//      symbol run (e.g. "½!!", "Ⓐ+") is dropped whole
//   5. Lowercase (on by default)
//
// There is no stemming or lemmatisation: the tokens have to
// match the surface forms in the pretrained vector file.
//
// The same cleaner instance is used for training data and for
// the single text given to `predict`, so both sides always
// tokenise identically.
//
// Reference: tokenizers crate (pre_tokenizers::whitespace)
//            regex crate documentation

use anyhow::Result;
use regex::Regex;
use tokenizers::{
    pre_tokenizers::whitespace::Whitespace,
    OffsetReferential, OffsetType, PreTokenizedString, PreTokenizer,
};

pub struct TextCleaner {
    hashtag:   Regex,
    mention:   Regex,
    word:      Regex,
    splitter:  Whitespace,
    lowercase: bool,
}

impl TextCleaner {
    pub fn new(lowercase: bool) -> Self {
        Self {
            hashtag:  Regex::new(r"#[\w.]+").expect("hashtag pattern compiles"),
            mention:  Regex::new(r"@[\w.]+").expect("mention pattern compiles"),
            // Same Unicode `\w` class the pre-tokenizer splits on
            word:     Regex::new(r"^\w+$").expect("word pattern compiles"),
            splitter: Whitespace::default(),
            lowercase,
        }
    }

    /// Clean and tokenise one text.
    pub fn clean(&self, text: &str) -> Result<Vec<String>> {
        // Replace with a space, not "", so text on either side never fuses
        let stripped = self.hashtag.replace_all(text, " ");
        let stripped = self.mention.replace_all(&stripped, " ");

        let mut pre = PreTokenizedString::from(stripped.as_ref());
        self.splitter
            .pre_tokenize(&mut pre)
            .map_err(|e| anyhow::anyhow!("Tokenisation error: {e}"))?;

        let tokens = pre
            .get_splits(OffsetReferential::Original, OffsetType::Byte)
            .into_iter()
            .map(|(piece, _, _)| piece)
            .filter(|piece| self.word.is_match(piece))
            .map(|piece| {
                if self.lowercase {
                    piece.to_lowercase()
                } else {
                    piece.to_string()
                }
            })
            .collect();

        Ok(tokens)
    }

    /// Clean every text in order.
    pub fn clean_all<'a, I>(&self, texts: I) -> Result<Vec<Vec<String>>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        texts.into_iter().map(|t| self.clean(t)).collect()
    }
}

impl Default for TextCleaner {
    fn default() -> Self {
        Self::new(true)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn clean(text: &str) -> Vec<String> {
        TextCleaner::default().clean(text).unwrap()
    }

    #[test]
    fn test_strips_hashtags_and_mentions() {
        let tokens = clean("@pizzahut my order is late #fail #worst.ever");
        assert_eq!(tokens, vec!["my", "order", "is", "late"]);
    }

    #[test]
    fn test_punctuation_is_not_attached() {
        let tokens = clean("delivery was hour late and my pizza was cold!");
        assert_eq!(
            tokens,
            vec!["delivery", "was", "hour", "late", "and", "my", "pizza", "was", "cold"]
        );
    }

    #[test]
    fn test_splits_words_from_punctuation_inside_text() {
        assert_eq!(clean("great,really great...love it"), vec!["great", "really", "great", "love", "it"]);
    }

    #[test]
    fn test_symbol_runs_are_dropped_whole() {
        assert_eq!(clean("I rate it ½!!"), vec!["i", "rate", "it"]);
        let word = Regex::new(r"^\w+$").unwrap();
        for input in ["level Ⅻ!", "Ⓐ+ grade", "3½!! stars", "I rate it ½!!"] {
            for token in clean(input) {
                assert!(word.is_match(&token), "{token:?} from {input:?} carries punctuation");
            }
        }
        assert_eq!(clean("3½!! stars"), vec!["3", "stars"]);
    }

    #[test]
    fn test_word_pieces_not_starting_with_a_letter_are_kept() {
        assert_eq!(clean("a ‿abc"), vec!["a", "‿abc"]);
        assert_eq!(clean("_private"), vec!["_private"]);
    }

    #[test]
    fn test_lowercase_can_be_disabled() {
        let tokens = TextCleaner::new(false).clean("Cold Pizza").unwrap();
        assert_eq!(tokens, vec!["Cold", "Pizza"]);
    }

    #[test]
    fn test_cleaning_is_idempotent() {
        let inputs = [
            "delivery was hour late and my pizza was cold!",
            "@bob: can't   believe it #smh...",
            "Ünïcödé tëxt, with émojis 😀 and_underscores",
            "#only #tags @and @mentions",
            "",
        ];
        for input in inputs {
            let once  = clean(input);
            let twice = clean(&once.join(" "));
            assert_eq!(once, twice, "not idempotent for {input:?}");
            assert!(once.iter().all(|t| !t.contains('#') && !t.contains('@')));
        }
    }

    #[test]
    fn test_empty_string() {
        assert!(clean("").is_empty());
    }
}
