//! misvm Command Line Interface
//!
//! Train, evaluate, and apply mixed-integer optimized SVM models on
//! CSV datasets (last column is the label).

use clap::{Args, Parser, Subcommand, ValueEnum};
use env_logger::Env;
use log::{error, info, warn};
use misvm::persistence::SerializableModel;
use misvm::{CsvDataset, MipSvm, ModelVariant, Result, SolveOutcome, StandardScaler};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "misvm")]
#[command(about = "Mixed-integer optimization based SVM training")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a new SVM model
    Train(TrainArgs),
    /// Make predictions using a trained model
    Predict(PredictArgs),
    /// Evaluate a model on test data
    Evaluate(EvaluateArgs),
    /// Display model information
    Info(InfoArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CliVariant {
    /// Plain soft-margin linear SVM
    Linear,
    /// Feature-selecting SVM with a cardinality bound
    SparseLinear,
    /// Outlier-robust SVM with a discrete ramp loss
    RampLoss,
}

impl From<CliVariant> for ModelVariant {
    fn from(v: CliVariant) -> Self {
        match v {
            CliVariant::Linear => ModelVariant::Linear,
            CliVariant::SparseLinear => ModelVariant::SparseLinear,
            CliVariant::RampLoss => ModelVariant::RampLoss,
        }
    }
}

#[derive(Args)]
struct TrainArgs {
    /// Training data file (CSV, label in the last column)
    #[arg(long)]
    data: PathBuf,

    /// Output model file
    #[arg(short, long)]
    output: PathBuf,

    /// Optimization model variant
    #[arg(long, default_value = "linear")]
    variant: CliVariant,

    /// Misclassification penalty weight C
    #[arg(short = 'C', long, default_value = "0.125")]
    c: f64,

    /// Solver time limit in seconds
    #[arg(short, long, default_value = "5.0")]
    time_limit: f64,

    /// Solver log level (0-5)
    #[arg(long, default_value = "0")]
    solver_verbosity: i32,

    /// Allowed fraction of nonzero feature weights (sparse-linear)
    #[arg(long, default_value = "0.2")]
    sparsity: f64,

    /// Bound on the absolute value of weights and offset
    #[arg(long, default_value = "10.0")]
    weight_bound: f64,

    /// Penalty multiplier for class -1
    #[arg(long, default_value = "1.0")]
    negative_class_weight: f64,

    /// Penalty multiplier for class +1
    #[arg(long, default_value = "1.0")]
    positive_class_weight: f64,

    /// Standardize features before training
    #[arg(long)]
    scale: bool,
}

#[derive(Args)]
struct PredictArgs {
    /// Trained model file
    #[arg(short, long)]
    model: PathBuf,

    /// Data file to classify (CSV)
    #[arg(long)]
    data: PathBuf,
}

#[derive(Args)]
struct EvaluateArgs {
    /// Trained model file
    #[arg(short, long)]
    model: PathBuf,

    /// Labeled test data file (CSV)
    #[arg(long)]
    data: PathBuf,
}

#[derive(Args)]
struct InfoArgs {
    /// Trained model file
    #[arg(short, long)]
    model: PathBuf,
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let result = match cli.command {
        Commands::Train(args) => train_command(args),
        Commands::Predict(args) => predict_command(args),
        Commands::Evaluate(args) => evaluate_command(args),
        Commands::Info(args) => info_command(args),
    };

    if let Err(e) = result {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn load_features_and_labels(path: &PathBuf) -> Result<(Vec<Vec<f64>>, Vec<f64>)> {
    let dataset = CsvDataset::from_file(path)?;
    let features: Vec<Vec<f64>> = (0..dataset.len()).map(|j| dataset.row(j).to_vec()).collect();
    let labels = dataset.labels().to_vec();
    Ok((features, labels))
}

fn train_command(args: TrainArgs) -> Result<()> {
    info!("Training SVM model from {:?}", args.data);
    info!(
        "Parameters: variant={:?}, C={}, time_limit={}s, weight_bound={}",
        args.variant, args.c, args.time_limit, args.weight_bound
    );

    let (mut features, labels) = load_features_and_labels(&args.data)?;
    let scaler = if args.scale {
        info!("Standardizing features");
        let (scaler, scaled) = StandardScaler::fit_transform(&features);
        features = scaled;
        Some(scaler)
    } else {
        None
    };

    let mut svm = MipSvm::new(args.variant.into())
        .with_c(args.c)
        .with_time_limit(args.time_limit)
        .with_verbosity(args.solver_verbosity)
        .with_sparsity(args.sparsity)
        .with_weight_bound(args.weight_bound)
        .with_class_weights(args.negative_class_weight, args.positive_class_weight);

    svm.fit(&features, &labels)?;

    match svm.last_outcome() {
        Some(SolveOutcome::Optimal) => info!("Solved to optimality"),
        Some(SolveOutcome::TimeLimitWithIncumbent) => {
            info!("Time limit reached, best incumbent kept")
        }
        Some(outcome) => warn!("No solution found ({outcome:?}), model is trivial"),
        None => {}
    }

    let metrics = svm.evaluate(&features, &labels)?;
    info!("Training accuracy: {:.2}%", metrics.accuracy() * 100.0);
    if let Some(decision) = svm.decision() {
        info!(
            "Active features: {}/{}",
            decision.nnz(),
            decision.weights.len()
        );
    }

    let mut model = SerializableModel::from_classifier(&svm)?;
    if let Some(scaler) = scaler {
        model = model.with_scaler(scaler);
    }
    model.save_to_file(&args.output)?;
    info!("Model saved to {:?}", args.output);
    Ok(())
}

fn predict_command(args: PredictArgs) -> Result<()> {
    info!("Loading model from {:?}", args.model);
    let model = SerializableModel::load_from_file(&args.model)?;
    let svm = model.to_classifier()?;

    let (features, _) = load_features_and_labels(&args.data)?;
    let scores = svm.predict(&model.prepare_features(&features))?;

    for score in scores {
        let label = if score >= 0.0 { 1 } else { -1 };
        println!("{label} {score:.6}");
    }
    Ok(())
}

fn evaluate_command(args: EvaluateArgs) -> Result<()> {
    info!("Loading model from {:?}", args.model);
    let model = SerializableModel::load_from_file(&args.model)?;
    let svm = model.to_classifier()?;

    let (features, labels) = load_features_and_labels(&args.data)?;
    let metrics = svm.evaluate(&model.prepare_features(&features), &labels)?;

    println!("Accuracy:  {:.4}", metrics.accuracy());
    println!("Precision: {:.4}", metrics.precision());
    println!("Recall:    {:.4}", metrics.recall());
    println!("F1 score:  {:.4}", metrics.f1_score());
    Ok(())
}

fn info_command(args: InfoArgs) -> Result<()> {
    let model = SerializableModel::load_from_file(&args.model)?;

    println!("Variant:         {}", model.variant);
    println!("Features:        {}", model.decision.weights.len());
    println!("Active features: {}", model.metadata.active_features);
    println!("Offset:          {:.6}", model.decision.offset);
    println!("Created at:      {}", model.metadata.created_at);
    println!("Library version: {}", model.metadata.library_version);
    Ok(())
}
