// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the three subcommands, `train`, `evaluate` and
// `predict`, and all their configurable flags.
//
// clap's derive macros generate --help text, errors for
// missing args, and string → usize / f64 / CellKind conversion
// (CellKind goes through its FromStr impl).
//
// Reference: Rust Book §12 (Building a CLI Program)

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::application::{evaluate_use_case::EvaluateRequest, train_use_case::TrainConfig};
use crate::domain::cell_kind::CellKind;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the classifier, then score it on the test file
    Train(TrainArgs),

    /// Score a trained checkpoint on a labelled CSV
    Evaluate(EvaluateArgs),

    /// Classify one or more texts with a trained checkpoint
    Predict(PredictArgs),
}

/// All arguments for the `train` command.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Labelled training CSV
    #[arg(long, default_value = "data/train.csv")]
    pub train: PathBuf,

    /// Labelled test CSV, held out until training finishes
    #[arg(long, default_value = "data/test.csv")]
    pub test: PathBuf,

    /// Pretrained word vectors, one `token f1 ... fD` per line
    #[arg(long, default_value = "data/vectors.txt")]
    pub vectors: PathBuf,

    /// Directory for weights, vocabulary, config and metrics
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: PathBuf,

    /// Column holding the tweet text (both files)
    #[arg(long, default_value = "text")]
    pub text_column: String,

    /// Label column of the training file
    #[arg(long, default_value = "sentiment")]
    pub train_label_column: String,

    /// Label column of the test file
    #[arg(long, default_value = "sentiment")]
    pub test_label_column: String,

    /// Class names in class-number order; labels may use a number or a name
    #[arg(
        long,
        value_delimiter = ',',
        default_value = "very negative,negative,neutral,positive,very positive"
    )]
    pub class_names: Vec<String>,

    /// Keep the original letter case of tokens
    #[arg(long)]
    pub keep_case: bool,

    /// Tokens per encoded tweet; longer tweets keep their last tokens
    #[arg(long, default_value_t = 500)]
    pub max_seq_len: usize,

    /// Width of every vector in the vectors file
    #[arg(long, default_value_t = 300)]
    pub embedding_dim: usize,

    /// Hidden units per recurrent direction
    #[arg(long, default_value_t = 128)]
    pub hidden_size: usize,

    /// Read tweets left-to-right only
    #[arg(long)]
    pub unidirectional: bool,

    /// Recurrent cell: gru or lstm
    #[arg(long, default_value_t = CellKind::Gru)]
    pub cell: CellKind,

    /// Dropout on the recurrent layer's input
    #[arg(long, default_value_t = 0.2)]
    pub dropout: f64,

    /// Dropout on the recurrent state between time steps
    #[arg(long, default_value_t = 0.2)]
    pub recurrent_dropout: f64,

    #[arg(long, default_value_t = 128)]
    pub batch_size: usize,

    #[arg(long, default_value_t = 15)]
    pub epochs: usize,

    /// Adam learning rate
    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    /// Share of the training file held back for per-epoch validation
    #[arg(long, default_value_t = 0.1)]
    pub val_fraction: f64,

    /// Seed for the validation split and batch shuffling
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            train_path:         a.train,
            test_path:          a.test,
            vectors_path:       a.vectors,
            checkpoint_dir:     a.checkpoint_dir,
            text_column:        a.text_column,
            train_label_column: a.train_label_column,
            test_label_column:  a.test_label_column,
            class_names:        a.class_names.iter().map(|n| n.trim().to_string()).collect(),
            lowercase:          !a.keep_case,
            max_seq_len:        a.max_seq_len,
            embedding_dim:      a.embedding_dim,
            embedding_rows:     0,
            hidden_size:        a.hidden_size,
            bidirectional:      !a.unidirectional,
            cell:               a.cell,
            dropout:            a.dropout,
            recurrent_dropout:  a.recurrent_dropout,
            batch_size:         a.batch_size,
            epochs:             a.epochs,
            lr:                 a.lr,
            val_fraction:       a.val_fraction,
            seed:               a.seed,
        }
    }
}

/// All arguments for the `evaluate` command
#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Labelled CSV to score
    #[arg(long)]
    pub data: PathBuf,

    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: PathBuf,

    /// Text column (defaults to the one used in training)
    #[arg(long)]
    pub text_column: Option<String>,

    /// Label column (defaults to the training run's test label column)
    #[arg(long)]
    pub label_column: Option<String>,

    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Also write the report as JSON to this file
    #[arg(long)]
    pub output: Option<PathBuf>,
}

impl From<EvaluateArgs> for EvaluateRequest {
    fn from(a: EvaluateArgs) -> Self {
        EvaluateRequest {
            checkpoint_dir: a.checkpoint_dir,
            data_path:      a.data,
            text_column:    a.text_column,
            label_column:   a.label_column,
            batch_size:     a.batch_size,
            output:         a.output,
        }
    }
}

/// All arguments for the `predict` command
#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Texts to classify
    #[arg(required = true)]
    pub texts: Vec<String>,

    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: PathBuf,

    /// Print every class probability, not just the winner
    #[arg(long)]
    pub probabilities: bool,
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    #[test]
    fn test_train_defaults_match_config_defaults() {
        let cli = Cli::try_parse_from(["tweet-sentiment", "train"]).unwrap();
        let Commands::Train(args) = cli.command else { panic!("expected train") };
        let cfg      = TrainConfig::from(args);
        let defaults = TrainConfig::default();
        assert_eq!(cfg.class_names, defaults.class_names);
        assert_eq!(cfg.max_seq_len, defaults.max_seq_len);
        assert_eq!(cfg.batch_size, defaults.batch_size);
        assert_eq!(cfg.epochs, defaults.epochs);
        assert_eq!(cfg.cell, defaults.cell);
        assert!(cfg.bidirectional && cfg.lowercase);
    }

    #[test]
    fn test_train_flags() {
        let cli = Cli::try_parse_from([
            "tweet-sentiment", "train",
            "--cell", "lstm",
            "--unidirectional",
            "--class-names", "neg, pos",
            "--test-label-column", "Emotion",
            "--epochs", "3",
        ])
        .unwrap();
        let Commands::Train(args) = cli.command else { panic!("expected train") };
        let cfg = TrainConfig::from(args);
        assert_eq!(cfg.cell, CellKind::Lstm);
        assert!(!cfg.bidirectional);
        assert_eq!(cfg.class_names, vec!["neg".to_string(), "pos".to_string()]);
        assert_eq!(cfg.test_label_column, "Emotion");
        assert_eq!(cfg.epochs, 3);
    }

    #[test]
    fn test_unknown_cell_is_rejected() {
        assert!(Cli::try_parse_from(["tweet-sentiment", "train", "--cell", "rnn"]).is_err());
    }

    #[test]
    fn test_predict_requires_text() {
        assert!(Cli::try_parse_from(["tweet-sentiment", "predict"]).is_err());
        let cli = Cli::try_parse_from(["tweet-sentiment", "predict", "cold pizza", "great"]).unwrap();
        let Commands::Predict(args) = cli.command else { panic!("expected predict") };
        assert_eq!(args.texts.len(), 2);
    }
}
