//! コーパス構築ジョブ。マニフェストに列挙されたソースを取り込み、
//! 正規化・重複排除・補強済みの学習コーパスを1ファイルに書き出す。
use std::env;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result, anyhow, bail};
use tracing::info;
use uuid::Uuid;

use news_classifier::{
    config::Config,
    dataset::{DatasetBuilder, SourceManifest, write_corpus},
    observability,
};

struct Args {
    manifest: PathBuf,
    output: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    observability::tracing::init()?;
    let args = parse_args()?;
    let config = Config::from_env().context("failed to load configuration")?;

    let job_id = Uuid::new_v4();
    info!(%job_id, manifest = %args.manifest.display(), "corpus build started");

    let manifest = SourceManifest::from_path(&args.manifest)?;
    let builder = DatasetBuilder::new(config.dataset_config())?;
    let built = builder.build(&manifest.sources).await?;

    write_corpus(&args.output, &built.records)?;

    let total = built.records.len();
    info!(
        %job_id,
        output = %args.output.display(),
        total,
        real = built.stats.real_samples,
        synthetic = built.stats.synthetic_samples,
        synthetic_ratio = built.stats.synthetic_samples as f64 / total as f64,
        "corpus written"
    );
    Ok(())
}

fn parse_args() -> Result<Args> {
    let mut manifest = None;
    let mut output = None;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--manifest" => {
                let value = args.next().context("--manifest requires a path argument")?;
                manifest = Some(PathBuf::from(value));
            }
            "--output" => {
                let value = args.next().context("--output requires a path argument")?;
                output = Some(PathBuf::from(value));
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

    let manifest = manifest.ok_or_else(|| anyhow!("--manifest is required"))?;
    let output = output.unwrap_or_else(|| PathBuf::from("data/news_corpus.csv"));

    Ok(Args { manifest, output })
}

fn print_usage() {
    eprintln!("Usage: build_dataset --manifest <path> [--output data/news_corpus.csv]");
}
