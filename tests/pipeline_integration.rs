use chrono::NaiveDate;
use newsprice::application::data::aligner::merge;
use newsprice::application::ml::inference::InferenceAdapter;
use newsprice::application::ml::predictor::PricePredictor;
use newsprice::application::ml::trainer::TrainerConfig;
use newsprice::application::pipeline::{load_records, run_training, run_training_from_store};
use newsprice::config::DataEnvConfig;
use newsprice::domain::ml::feature_registry::FeatureVector;
use newsprice::domain::records::RawRecord;
use newsprice::infrastructure::documents::{fetch_sentiment, publish_prices, publish_sentiment};
use newsprice::infrastructure::{ArtifactStore, InMemoryDocumentStore};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// Ten news days, 01-01-2024 to 10-01-2024. Every flag column is either
/// constant or has both values several times, so nothing is an outlier.
fn sentiment_csv() -> String {
    let mut csv = String::from(
        "Dates,News,Price Direction Up,Price Direction Constant,Price Direction Down,\
Asset Comparision,Past Information,Future Information,Price Sentiment\n",
    );
    for i in 0..10 {
        let up = i % 2;
        let past = (i / 2) % 2;
        let label = if up == 1 { "positive" } else { "negative" };
        writeln!(
            csv,
            "{:02}-01-2024,headline {i},{up},0,{},{up},{past},0,{label}",
            i + 1,
            1 - up
        )
        .unwrap();
    }
    csv
}

/// Ten trading days on the same dates as the news, 01-01-2024 to 10-01-2024.
fn price_csv() -> String {
    let mut csv = String::from("Date,Close,Adj Close\n");
    for i in 0..10 {
        let close = 2000.0 + 3.0 * i as f64;
        writeln!(csv, "{:02}-01-2024,{close:.1},{close:.1}", i + 1).unwrap();
    }
    csv
}

fn data_config(dir: &Path) -> DataEnvConfig {
    let sentiment_path = dir.join("sentiment_data.csv");
    let price_path = dir.join("price_data.csv");
    fs::write(&sentiment_path, sentiment_csv()).unwrap();
    fs::write(&price_path, price_csv()).unwrap();

    DataEnvConfig {
        sentiment_path,
        price_path,
        model_path: dir.join("models").join("random_forest_model.json"),
        ..Default::default()
    }
}

fn trainer() -> TrainerConfig {
    TrainerConfig {
        n_trees: 10,
        ..Default::default()
    }
}

fn raw(date: &str) -> RawRecord {
    RawRecord {
        date: date.to_string(),
        news: "gold steady".to_string(),
        price_direction_up: "1".to_string(),
        price_direction_constant: "0".to_string(),
        price_direction_down: "0".to_string(),
        asset_comparison: "1".to_string(),
        past_information: "0".to_string(),
        future_information: "0".to_string(),
        price_sentiment: "positive".to_string(),
    }
}

#[test]
fn test_train_then_predict() {
    let dir = tempfile::tempdir().unwrap();
    let data = data_config(dir.path());

    let report = run_training(&data, &trainer()).expect("training should succeed");

    assert_eq!(report.sentiment.records, 10);
    assert_eq!(report.price.records, 10);
    assert_eq!(report.sentiment.outliers_removed, 0);
    assert_eq!(report.price.outliers_removed, 0);
    assert_eq!(report.alignment.matched, 10);
    assert_eq!(report.alignment.unmatched_sentiment, 0);
    assert_eq!(report.alignment.unmatched_price, 0);
    assert_eq!(report.outcome.n_train, 8);
    assert_eq!(report.outcome.n_test, 2);
    assert!(report.outcome.mae >= 0.0);
    assert!(data.model_path.exists());

    let adapter = InferenceAdapter::new(ArtifactStore::new(&data.model_path), "%d-%m-%Y");
    assert!(adapter.is_ready());

    let message = adapter.respond(&raw("05-01-2024"));
    assert!(message.starts_with("Predicted Adj Close: "), "{message}");

    // Forest predictions are averages of training targets
    let price = adapter.predict_raw(&raw("2024-01-05")).unwrap();
    assert!((2000.0..=2027.0).contains(&price), "{price}");
}

#[test]
fn test_inference_is_repeatable() {
    let dir = tempfile::tempdir().unwrap();
    let data = data_config(dir.path());
    run_training(&data, &trainer()).unwrap();

    let adapter = InferenceAdapter::new(ArtifactStore::new(&data.model_path), "%d-%m-%Y");
    let record = raw("06-01-2024").parse("%d-%m-%Y").unwrap();
    let first = adapter.predict(&record).unwrap();
    let second = adapter.predict(&record).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_bad_inference_input_is_a_message() {
    let dir = tempfile::tempdir().unwrap();
    let data = data_config(dir.path());
    run_training(&data, &trainer()).unwrap();
    let adapter = InferenceAdapter::new(ArtifactStore::new(&data.model_path), "%d-%m-%Y");

    let mut bad_flag = raw("05-01-2024");
    bad_flag.price_direction_up = "2".to_string();
    assert!(adapter.respond(&bad_flag).starts_with("Error: "));

    let bad_date = raw("January 5th");
    assert!(adapter.respond(&bad_date).contains("Date"));
}

#[test]
fn test_reload_after_training() {
    let dir = tempfile::tempdir().unwrap();
    let data = data_config(dir.path());

    let adapter = InferenceAdapter::new(ArtifactStore::new(&data.model_path), "%d-%m-%Y");
    assert!(!adapter.is_ready());
    assert!(
        adapter
            .respond(&raw("05-01-2024"))
            .starts_with("Model could not be loaded")
    );

    run_training(&data, &trainer()).unwrap();
    adapter.reload().unwrap();
    assert!(adapter.is_ready());
}

#[test]
fn test_same_seed_same_model_quality() {
    let dir = tempfile::tempdir().unwrap();
    let data = data_config(dir.path());

    let first = run_training(&data, &trainer()).unwrap();
    let second = run_training(&data, &trainer()).unwrap();
    assert_eq!(first.outcome.mae, second.outcome.mae);
}

#[tokio::test]
async fn test_training_from_document_store() {
    let dir = tempfile::tempdir().unwrap();
    let data = data_config(dir.path());
    let prepared = load_records(&data, NaiveDate::from_ymd_opt(2030, 1, 1).unwrap()).unwrap();

    let store = InMemoryDocumentStore::new();
    let published = publish_sentiment(&store, &prepared.sentiment).await.unwrap();
    assert_eq!(published.written, 10);
    assert_eq!(published.collapsed, 0);
    let published = publish_prices(&store, &prepared.prices).await.unwrap();
    assert_eq!(published.written, 10);

    let artifacts = ArtifactStore::new(dir.path().join("from_store.json"));
    let (outcome, stats) = run_training_from_store(&store, &artifacts, &trainer())
        .await
        .unwrap();

    assert_eq!(stats.matched, 10);
    assert_eq!(outcome.n_test, 2);
    assert!(artifacts.exists());
}

#[test]
fn test_persisted_artifact_matches_trained_model() {
    let dir = tempfile::tempdir().unwrap();
    let data = data_config(dir.path());
    let report = run_training(&data, &trainer()).unwrap();

    let loaded = ArtifactStore::new(&data.model_path).load().unwrap();
    let features: Vec<FeatureVector> = ["01-01-2024", "04-01-2024", "09-01-2024"]
        .iter()
        .map(|d| FeatureVector::from_record(&raw(d).parse("%d-%m-%Y").unwrap()))
        .collect();

    let trained = report.outcome.artifact.predict(&features).unwrap();
    let reloaded = loaded.predict(&features).unwrap();
    let trained_bits: Vec<u64> = trained.iter().map(|p| p.to_bits()).collect();
    let reloaded_bits: Vec<u64> = reloaded.iter().map(|p| p.to_bits()).collect();
    assert_eq!(trained_bits, reloaded_bits);
}

#[tokio::test]
async fn test_duplicate_news_date_same_on_file_and_store_paths() {
    let dir = tempfile::tempdir().unwrap();
    let data = data_config(dir.path());
    // A second story on 05-01-2024 with the same flags as the first
    let mut csv = sentiment_csv();
    csv.push_str("05-01-2024,late headline,0,0,1,0,0,0,negative\n");
    fs::write(&data.sentiment_path, csv).unwrap();

    let prepared = load_records(&data, NaiveDate::from_ymd_opt(2030, 1, 1).unwrap()).unwrap();
    assert_eq!(prepared.sentiment.len(), 11);
    let duplicate = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();

    let (aligned, file_stats) = merge(&prepared.sentiment, &prepared.prices);
    assert_eq!(file_stats.duplicate_sentiment_dates, 1);
    let from_file = aligned
        .iter()
        .find(|r| r.date() == duplicate)
        .map(|r| r.sentiment.clone())
        .unwrap();
    assert_eq!(from_file.news, "headline 4");

    let store = InMemoryDocumentStore::new();
    let published = publish_sentiment(&store, &prepared.sentiment).await.unwrap();
    assert_eq!(published.written, 10);
    assert_eq!(published.collapsed, 1);
    publish_prices(&store, &prepared.prices).await.unwrap();

    let (stored, rejected) = fetch_sentiment(&store).await.unwrap();
    assert!(rejected.is_empty());
    let from_store = stored.iter().find(|r| r.date == duplicate).unwrap();
    assert_eq!(from_store, &from_file);

    let artifacts = ArtifactStore::new(dir.path().join("dup.json"));
    let (_, store_stats) = run_training_from_store(&store, &artifacts, &trainer())
        .await
        .unwrap();
    assert_eq!(store_stats.matched, file_stats.matched);
}
