// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction, parsed with `clap`.
// All work is delegated to Layer 2 (application); this layer
// only routes and prints.
//
// Three commands are supported:
//   1. `train`    — fit on the training CSV, score on the test CSV
//   2. `evaluate` — score a saved checkpoint on any labelled CSV
//   3. `predict`  — classify texts with a saved checkpoint
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, EvaluateArgs, PredictArgs, TrainArgs};

#[derive(Parser, Debug)]
#[command(
    name = "tweet-sentiment",
    version,
    about = "Train a recurrent sentiment classifier on labelled tweets, then classify new text."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the matching use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)    => run_train(args),
            Commands::Evaluate(args) => run_evaluate(args),
            Commands::Predict(args)  => run_predict(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Starting training on '{}'", args.train.display());
    let checkpoint_dir = args.checkpoint_dir.clone();

    let report = TrainUseCase::new(args.into()).execute()?;

    println!("\nTest set\n{report}");
    println!("Training complete. Checkpoint saved to '{}'.", checkpoint_dir.display());
    Ok(())
}

fn run_evaluate(args: EvaluateArgs) -> Result<()> {
    use crate::application::evaluate_use_case::EvaluateUseCase;

    let report = EvaluateUseCase::new(args.into()).execute()?;
    println!("{report}");
    Ok(())
}

fn run_predict(args: PredictArgs) -> Result<()> {
    use crate::application::predict_use_case::PredictUseCase;

    let use_case = PredictUseCase::new(&args.checkpoint_dir)?;

    let predictions = use_case.predict_all(&args.texts)?;

    for (text, p) in args.texts.iter().zip(&predictions) {
        println!(
            "\n{}\n  → class {} ({}), confidence {:.1}%, {} unknown token(s), {:.2?}",
            text,
            p.label,
            p.class_name,
            p.confidence() * 100.0,
            p.unknown_tokens,
            p.elapsed,
        );
        if args.probabilities {
            for (i, prob) in p.probabilities.iter().enumerate() {
                println!("    {:>2}: {:.4}", i + 1, prob);
            }
        }
    }
    Ok(())
}
