//! 学習ジョブ。コーパスを層化分割して学習し、バージョン付き成果物と
//! 評価レポートを書き出す。
use std::env;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result, anyhow, bail};
use tracing::info;
use uuid::Uuid;

use news_classifier::{config::Config, dataset::read_corpus, observability, training};

struct Args {
    corpus: PathBuf,
    model_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    observability::tracing::init()?;
    let args = parse_args()?;
    let config = Config::from_env().context("failed to load configuration")?;
    let model_dir = args
        .model_dir
        .unwrap_or_else(|| config.model_dir().to_path_buf());

    let job_id = Uuid::new_v4();
    let records = read_corpus(&args.corpus)?;
    info!(%job_id, corpus = %args.corpus.display(), samples = records.len(), "corpus loaded");

    let outcome = training::train(&records, &config.trainer_config())?;
    let artifact_path = outcome.artifact.save(&model_dir)?;

    let report_path = model_dir.join(format!("report-{}.json", outcome.artifact.version));
    let report_json =
        serde_json::to_string_pretty(&outcome.report).context("failed to serialize report")?;
    std::fs::write(&report_path, report_json)
        .with_context(|| format!("failed to write report {}", report_path.display()))?;

    info!(
        %job_id,
        artifact = %artifact_path.display(),
        report = %report_path.display(),
        accuracy = outcome.report.accuracy,
        macro_f1 = outcome.report.macro_f1,
        "training finished"
    );
    Ok(())
}

fn parse_args() -> Result<Args> {
    let mut corpus = None;
    let mut model_dir = None;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--corpus" => {
                let value = args.next().context("--corpus requires a path argument")?;
                corpus = Some(PathBuf::from(value));
            }
            "--model-dir" => {
                let value = args.next().context("--model-dir requires a path argument")?;
                model_dir = Some(PathBuf::from(value));
            }
            "--help" => {
                print_usage();
                process::exit(0);
            }
            _ => {
                bail!("unknown argument: {}", arg);
            }
        }
    }

    let corpus = corpus.ok_or_else(|| anyhow!("--corpus is required"))?;

    Ok(Args { corpus, model_dir })
}

fn print_usage() {
    eprintln!("Usage: train_model --corpus <path> [--model-dir ./models]");
}
