use chrono::NaiveDate;
use newsprice::domain::records::{Indicators, PriceEntry, PriceRecord, SentimentRecord};
use newsprice::domain::repositories::{DocumentStore, PRICE_COLLECTION, SENTIMENT_COLLECTION};
use newsprice::infrastructure::InMemoryDocumentStore;
use newsprice::infrastructure::documents::{
    fetch_prices, fetch_sentiment, index_prices, index_sentiment, publish_prices,
    publish_sentiment,
};
use serde_json::json;

fn sentiment(day: u32, label: &str) -> SentimentRecord {
    SentimentRecord {
        date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
        news: format!("news {day}"),
        indicators: Indicators {
            past_information: 1,
            ..Default::default()
        },
        price_sentiment: label.to_string(),
    }
}

#[tokio::test]
async fn test_publish_and_fetch_back() {
    let store = InMemoryDocumentStore::new();
    let records = vec![sentiment(2, "positive"), sentiment(1, "negative")];
    publish_sentiment(&store, &records).await.unwrap();

    let doc = store
        .get(SENTIMENT_COLLECTION, "2024-01-01")
        .await
        .unwrap()
        .expect("document keyed by ISO date");
    assert_eq!(doc["Price Sentiment"], json!("negative"));
    assert_eq!(doc["Past Information"], json!(1));

    let (fetched, rejected) = fetch_sentiment(&store).await.unwrap();
    assert!(rejected.is_empty());
    assert_eq!(fetched, vec![sentiment(1, "negative"), sentiment(2, "positive")]);
}

#[tokio::test]
async fn test_republish_overwrites_by_date() {
    let store = InMemoryDocumentStore::new();
    publish_sentiment(&store, &[sentiment(1, "positive")])
        .await
        .unwrap();
    publish_sentiment(&store, &[sentiment(1, "negative")])
        .await
        .unwrap();

    assert_eq!(store.count(SENTIMENT_COLLECTION).await, 1);
    let (fetched, _) = fetch_sentiment(&store).await.unwrap();
    assert_eq!(fetched[0].price_sentiment, "negative");
}

#[tokio::test]
async fn test_price_entry_to_store() {
    let store = InMemoryDocumentStore::new();
    let entry = PriceEntry {
        date: "2024-01-02".to_string(),
        adj_close: "2064.40".to_string(),
    };
    let record = entry.parse().unwrap();
    publish_prices(&store, &[record]).await.unwrap();

    let (prices, _) = fetch_prices(&store).await.unwrap();
    assert_eq!(
        prices,
        vec![PriceRecord {
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            adj_close: 2064.4,
        }]
    );
}

#[tokio::test]
async fn test_malformed_documents_are_rejected_not_fatal() {
    let store = InMemoryDocumentStore::new();
    publish_prices(
        &store,
        &[PriceRecord {
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            adj_close: 1.0,
        }],
    )
    .await
    .unwrap();

    let mut broken = serde_json::Map::new();
    broken.insert("Date".to_string(), json!("02/01/2024"));
    broken.insert("Adj Close".to_string(), json!(1.0));
    store
        .set(PRICE_COLLECTION, "broken", broken)
        .await
        .unwrap();

    let (prices, rejected) = fetch_prices(&store).await.unwrap();
    assert_eq!(prices.len(), 1);
    assert_eq!(rejected.len(), 1);
}

#[tokio::test]
async fn test_search_index_bulk_upsert() {
    let store = InMemoryDocumentStore::new();
    let indexed = index_sentiment(&store, &[sentiment(1, "positive"), sentiment(2, "neutral")])
        .await
        .unwrap();
    assert_eq!(indexed.written, 2);
    assert_eq!(indexed.collapsed, 0);
    assert_eq!(store.count(SENTIMENT_COLLECTION).await, 2);

    let day = |d: u32| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
    let prices = [
        PriceRecord { date: day(3), adj_close: 2050.5 },
        PriceRecord { date: day(3), adj_close: 2099.0 },
        PriceRecord { date: day(4), adj_close: 2061.25 },
    ];
    let indexed = index_prices(&store, &prices).await.unwrap();
    assert_eq!(indexed.written, 2);
    assert_eq!(indexed.collapsed, 1);

    let doc = store.get(PRICE_COLLECTION, "2024-01-03").await.unwrap().unwrap();
    assert_eq!(doc["Adj Close"], json!(2050.5));
}

#[tokio::test]
async fn test_duplicate_dates_publish_first_record() {
    let store = InMemoryDocumentStore::new();
    let mut first = sentiment(2, "positive");
    first.news = "first".to_string();
    let mut second = sentiment(2, "negative");
    second.news = "second".to_string();

    let published = publish_sentiment(&store, &[first.clone(), second])
        .await
        .unwrap();
    assert_eq!(published.written, 1);
    assert_eq!(published.collapsed, 1);

    let (fetched, _) = fetch_sentiment(&store).await.unwrap();
    assert_eq!(fetched, vec![first]);
}
