/// 正規化とfastバックエンド推論の性能ベンチマーク。
use criterion::{Criterion, black_box, criterion_group, criterion_main};

use news_classifier::dataset::{CorpusRecord, augment};
use news_classifier::normalize::TextNormalizer;
use news_classifier::service::FastBackend;
use news_classifier::taxonomy::Category;
use news_classifier::training::{self, TrainerConfig};

fn sample_bodies(per_category: usize) -> Vec<String> {
    Category::ALL
        .iter()
        .flat_map(|category| {
            augment::candidates(*category, 42)
                .into_iter()
                .take(per_category)
        })
        .collect()
}

fn bench_normalization(c: &mut Criterion) {
    let normalizer = TextNormalizer::new(20_000);
    let bodies = sample_bodies(32);

    c.bench_function("normalize_384_bodies", |b| {
        b.iter(|| {
            let total: usize = bodies
                .iter()
                .map(|body| normalizer.normalize_raw(body).len())
                .sum();
            black_box(total);
        });
    });
}

fn bench_fast_prediction(c: &mut Criterion) {
    let records: Vec<CorpusRecord> = Category::ALL
        .iter()
        .flat_map(|category| {
            augment::candidates(*category, 42)
                .into_iter()
                .take(40)
                .map(|text| CorpusRecord::synthetic(text.to_lowercase(), *category))
        })
        .collect();
    let outcome = training::train(&records, &TrainerConfig::default()).expect("training succeeds");
    let backend = FastBackend::from_artifact(outcome.artifact).expect("backend builds");

    c.bench_function("fast_predict_single", |b| {
        b.iter(|| {
            let distribution =
                backend.predict("stock market rises as investor confidence grows today");
            black_box(distribution.len());
        });
    });
}

criterion_group!(benches, bench_normalization, bench_fast_prediction);
criterion_main!(benches);
