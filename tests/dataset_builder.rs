//! コーパス構築のHTTP経路テスト。wiremockでソース配信を模す。
use std::collections::HashMap;

use news_classifier::dataset::{
    DatasetBuilder, DatasetConfig, RecordFormat, SampleOrigin, SourceDescriptor, SourceLocation,
};
use news_classifier::taxonomy::Category;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn business_csv() -> String {
    let mut body = String::from("category,text\n");
    for index in 0..5 {
        body.push_str(&format!(
            "business,Quarterly earnings update number {index} lifted confidence across markets\n"
        ));
    }
    body.push_str("weather,Heavy rain expected across the northern region later this week\n");
    body
}

fn descriptor(url: String, name: &str) -> SourceDescriptor {
    SourceDescriptor {
        name: name.to_string(),
        location: SourceLocation::Url(url),
        format: RecordFormat::Csv {
            text_column: "text".into(),
            category_column: "category".into(),
        },
        labels: HashMap::from([("business".to_string(), Category::Business)]),
    }
}

fn builder() -> DatasetBuilder {
    DatasetBuilder::new(DatasetConfig {
        category_floor: 10,
        ..DatasetConfig::default()
    })
    .expect("builder constructs")
}

#[tokio::test]
async fn http_source_is_fetched_and_mapped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/news.csv"))
        .respond_with(ResponseTemplate::new(200).set_body_string(business_csv()))
        .mount(&server)
        .await;

    let source = descriptor(format!("{}/news.csv", server.uri()), "mock-news");
    let built = builder()
        .build(std::slice::from_ref(&source))
        .await
        .expect("build succeeds");

    // weatherラベルは対応表になく捨てられる。
    assert_eq!(built.stats.real_samples, 5);
    assert_eq!(built.stats.dropped_unmapped, 1);
    assert!(
        built
            .records
            .iter()
            .filter(|record| record.origin == SampleOrigin::Real)
            .all(|record| record.category == Category::Business)
    );
}

#[tokio::test]
async fn failing_source_is_skipped_not_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/good.csv"))
        .respond_with(ResponseTemplate::new(200).set_body_string(business_csv()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken.csv"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let sources = vec![
        descriptor(format!("{}/broken.csv", server.uri()), "broken"),
        descriptor(format!("{}/good.csv", server.uri()), "good"),
    ];

    let built = builder().build(&sources).await.expect("build succeeds");

    assert_eq!(built.stats.sources_failed, 1);
    assert_eq!(built.stats.sources_succeeded, 1);
    assert_eq!(built.stats.real_samples, 5);
}

#[tokio::test]
async fn all_sources_failing_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/broken.csv"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let source = descriptor(format!("{}/broken.csv", server.uri()), "broken");
    let error = builder()
        .build(std::slice::from_ref(&source))
        .await
        .expect_err("must fail");
    assert!(matches!(
        error,
        news_classifier::error::ClassifyError::Configuration(_)
    ));
}

#[tokio::test]
async fn real_samples_precede_synthetic_ones() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/news.csv"))
        .respond_with(ResponseTemplate::new(200).set_body_string(business_csv()))
        .mount(&server)
        .await;

    let source = descriptor(format!("{}/news.csv", server.uri()), "mock-news");
    let built = builder()
        .build(std::slice::from_ref(&source))
        .await
        .expect("build succeeds");

    let first_synthetic = built
        .records
        .iter()
        .position(|record| record.origin == SampleOrigin::Synthetic)
        .expect("synthetic samples exist");
    assert!(
        built.records[..first_synthetic]
            .iter()
            .all(|record| record.origin == SampleOrigin::Real)
    );
    assert!(
        built.records[first_synthetic..]
            .iter()
            .all(|record| record.origin == SampleOrigin::Synthetic)
    );
}
