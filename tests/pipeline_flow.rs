//! コーパス構築→学習→成果物→推論の一気通貫テスト。
use std::collections::HashMap;

use news_classifier::dataset::{
    DatasetBuilder, DatasetConfig, RecordFormat, SourceDescriptor, SourceLocation, read_corpus,
    write_corpus,
};
use news_classifier::service::FastBackend;
use news_classifier::taxonomy::Category;
use news_classifier::training::{self, PipelineArtifact, TrainerConfig};

#[tokio::test]
async fn corpus_to_artifact_to_prediction() {
    let dir = tempfile::tempdir().expect("tempdir");

    // 1ソースの小さなコーパスを作り、補強で全カテゴリを床まで埋める。
    let source_path = dir.path().join("source.csv");
    std::fs::write(
        &source_path,
        "category,text\n\
         business,Stock market gains extended as investor confidence grew through the week\n\
         business,Corporate earnings season lifted shares of exporters and manufacturers alike\n",
    )
    .expect("write source");

    let builder = DatasetBuilder::new(DatasetConfig {
        category_floor: 30,
        ..DatasetConfig::default()
    })
    .expect("builder constructs");
    let built = builder
        .build(&[SourceDescriptor {
            name: "seed".into(),
            location: SourceLocation::Path(source_path),
            format: RecordFormat::Csv {
                text_column: "text".into(),
                category_column: "category".into(),
            },
            labels: HashMap::from([("business".to_string(), Category::Business)]),
        }])
        .await
        .expect("build succeeds");

    let corpus_path = dir.path().join("corpus.csv");
    write_corpus(&corpus_path, &built.records).expect("corpus written");
    let records = read_corpus(&corpus_path).expect("corpus read back");
    assert_eq!(records.len(), built.records.len());

    // 学習して成果物を書き、ディスク経由でロードし直す。
    let outcome = training::train(
        &records,
        &TrainerConfig {
            version: "it".into(),
            ..TrainerConfig::default()
        },
    )
    .expect("training succeeds");
    let artifact_path = outcome.artifact.save(dir.path()).expect("artifact saved");
    let loaded = PipelineArtifact::load(&artifact_path).expect("artifact loads");
    assert_eq!(loaded.version, "it");

    // ロードしたパイプラインで推論できる。
    let backend = FastBackend::from_artifact(loaded).expect("backend builds");
    let distribution =
        backend.predict("parliament debates sweeping tax reform with coalition partners");
    assert_eq!(distribution.len(), 12);
    let sum: f64 = distribution.values().sum();
    assert!((sum - 1.0).abs() < 1e-6);
}
