//! Field maps exchanged with the document store and search index.
//!
//! Documents are keyed by ISO date string. Field names follow the stored
//! schema ("Date", "News", ..., "Price Sentiment"; "Date", "Adj Close").

use crate::domain::errors::PipelineError;
use crate::domain::records::{
    Dated, ISO_DATE_FORMAT, Indicators, PriceRecord, SentimentRecord, first_per_date,
};
use crate::domain::repositories::{
    Document, DocumentStore, PRICE_COLLECTION, SENTIMENT_COLLECTION, SearchIndex,
};
use crate::domain::schema::{ADJ_CLOSE, INDICATOR_COLUMNS, NEWS, PRICE_DATE, PRICE_SENTIMENT};
use chrono::NaiveDate;
use serde_json::{Value, json};
use tracing::{info, warn};

pub fn document_key(date: NaiveDate) -> String {
    date.format(ISO_DATE_FORMAT).to_string()
}

pub fn sentiment_document(record: &SentimentRecord) -> Document {
    let mut doc = Document::new();
    doc.insert("Date".to_string(), json!(document_key(record.date)));
    doc.insert(NEWS.name.to_string(), json!(record.news));
    for (spec, flag) in INDICATOR_COLUMNS.iter().zip(record.indicators.as_array()) {
        doc.insert(spec.name.to_string(), json!(flag));
    }
    doc.insert(PRICE_SENTIMENT.name.to_string(), json!(record.price_sentiment));
    doc
}

pub fn price_document(record: &PriceRecord) -> Document {
    let mut doc = Document::new();
    doc.insert(PRICE_DATE.name.to_string(), json!(document_key(record.date)));
    doc.insert(ADJ_CLOSE.name.to_string(), json!(record.adj_close));
    doc
}

fn field<'a>(doc: &'a Document, names: &[&str]) -> Result<&'a Value, PipelineError> {
    names
        .iter()
        .find_map(|n| doc.get(*n))
        .ok_or_else(|| PipelineError::validation(names[0], "field missing from document"))
}

fn date_field(doc: &Document, names: &[&str]) -> Result<NaiveDate, PipelineError> {
    let raw = field(doc, names)?
        .as_str()
        .ok_or_else(|| PipelineError::validation(names[0], "expected a date string"))?;
    NaiveDate::parse_from_str(raw, ISO_DATE_FORMAT)
        .map_err(|e| PipelineError::validation(names[0], format!("'{raw}': {e}")))
}

/// Flags may be stored as numbers or numeric strings.
fn flag_field(doc: &Document, names: &[&str]) -> Result<i64, PipelineError> {
    let value = field(doc, names)?;
    value
        .as_i64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
        .ok_or_else(|| PipelineError::validation(names[0], format!("{value} is not an integer")))
}

pub fn sentiment_from_document(doc: &Document) -> Result<SentimentRecord, PipelineError> {
    let date = date_field(doc, &["Date", "Dates"])?;
    let mut values = [0i64; 6];
    for (slot, spec) in values.iter_mut().zip(INDICATOR_COLUMNS.iter()) {
        *slot = flag_field(doc, &spec.names())?;
    }
    let text = |name: &str| {
        doc.get(name)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    Ok(SentimentRecord {
        date,
        news: text(NEWS.name),
        indicators: Indicators::from_values(values)?,
        price_sentiment: text(PRICE_SENTIMENT.name),
    })
}

pub fn price_from_document(doc: &Document) -> Result<PriceRecord, PipelineError> {
    let date = date_field(doc, &PRICE_DATE.names())?;
    let adj_close = field(doc, &ADJ_CLOSE.names())?
        .as_f64()
        .ok_or_else(|| PipelineError::validation(ADJ_CLOSE.name, "expected a number"))?;
    Ok(PriceRecord { date, adj_close })
}

/// Outcome of writing records keyed by date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Published {
    /// Documents written, one per distinct date.
    pub written: usize,
    /// Records dropped because an earlier record had the same date.
    pub collapsed: usize,
}

/// One `(key, document)` pair per distinct date, first record winning, in date order.
fn keyed_documents<T, F>(records: &[T], to_document: F) -> (Vec<(String, Document)>, usize)
where
    T: Dated,
    F: Fn(&T) -> Document,
{
    let (by_date, collapsed) = first_per_date(records);
    let docs = by_date
        .into_iter()
        .map(|(date, record)| (document_key(date), to_document(record)))
        .collect();
    (docs, collapsed)
}

async fn upsert_all(
    store: &dyn DocumentStore,
    collection: &str,
    docs: Vec<(String, Document)>,
    collapsed: usize,
) -> anyhow::Result<Published> {
    let written = docs.len();
    for (key, doc) in docs {
        store.set(collection, &key, doc).await?;
    }
    if collapsed > 0 {
        warn!(
            "{} records in '{}' shared a date with an earlier record and were not published",
            collapsed, collection
        );
    }
    info!("Published {} documents to '{}'", written, collection);
    Ok(Published { written, collapsed })
}

/// Upserts records into the sentiment collection, keeping the first record per date.
pub async fn publish_sentiment(
    store: &dyn DocumentStore,
    records: &[SentimentRecord],
) -> anyhow::Result<Published> {
    let (docs, collapsed) = keyed_documents(records, sentiment_document);
    upsert_all(store, SENTIMENT_COLLECTION, docs, collapsed).await
}

/// Upserts records into the price collection, keeping the first record per date.
pub async fn publish_prices(
    store: &dyn DocumentStore,
    records: &[PriceRecord],
) -> anyhow::Result<Published> {
    let (docs, collapsed) = keyed_documents(records, price_document);
    upsert_all(store, PRICE_COLLECTION, docs, collapsed).await
}

/// Bulk-indexes sentiment records into a search index, first record per date.
pub async fn index_sentiment(
    index: &dyn SearchIndex,
    records: &[SentimentRecord],
) -> anyhow::Result<Published> {
    let (docs, collapsed) = keyed_documents(records, sentiment_document);
    let written = index.bulk_upsert(SENTIMENT_COLLECTION, docs).await?;
    Ok(Published { written, collapsed })
}

/// Bulk-indexes price records into a search index, first record per date.
pub async fn index_prices(
    index: &dyn SearchIndex,
    records: &[PriceRecord],
) -> anyhow::Result<Published> {
    let (docs, collapsed) = keyed_documents(records, price_document);
    let written = index.bulk_upsert(PRICE_COLLECTION, docs).await?;
    Ok(Published { written, collapsed })
}

/// Reads a whole collection back into records. Documents that do not
/// convert are returned separately with the reason.
pub async fn fetch_sentiment(
    store: &dyn DocumentStore,
) -> anyhow::Result<(Vec<SentimentRecord>, Vec<String>)> {
    let docs = store.get_all(SENTIMENT_COLLECTION).await?;
    let mut records = Vec::with_capacity(docs.len());
    let mut rejected = Vec::new();
    for doc in &docs {
        match sentiment_from_document(doc) {
            Ok(r) => records.push(r),
            Err(e) => rejected.push(e.to_string()),
        }
    }
    info!(
        "Fetched {} sentiment documents ({} rejected)",
        records.len(),
        rejected.len()
    );
    Ok((records, rejected))
}

pub async fn fetch_prices(
    store: &dyn DocumentStore,
) -> anyhow::Result<(Vec<PriceRecord>, Vec<String>)> {
    let docs = store.get_all(PRICE_COLLECTION).await?;
    let mut records = Vec::with_capacity(docs.len());
    let mut rejected = Vec::new();
    for doc in &docs {
        match price_from_document(doc) {
            Ok(r) => records.push(r),
            Err(e) => rejected.push(e.to_string()),
        }
    }
    info!(
        "Fetched {} price documents ({} rejected)",
        records.len(),
        rejected.len()
    );
    Ok((records, rejected))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> SentimentRecord {
        SentimentRecord {
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            news: "gold climbs on weak dollar".to_string(),
            indicators: Indicators {
                price_up: 1,
                future_information: 1,
                ..Default::default()
            },
            price_sentiment: "positive".to_string(),
        }
    }

    #[test]
    fn test_sentiment_document_fields() {
        let doc = sentiment_document(&record());
        let keys: Vec<&str> = doc.keys().map(String::as_str).collect();
        for expected in [
            "Date",
            "News",
            "Price Direction Up",
            "Price Direction Constant",
            "Price Direction Down",
            "Asset Comparison",
            "Past Information",
            "Future Information",
            "Price Sentiment",
        ] {
            assert!(keys.contains(&expected), "missing {expected}");
        }
        assert_eq!(doc.len(), 9);
        assert_eq!(doc["Date"], json!("2024-01-02"));
        assert_eq!(doc["Price Direction Up"], json!(1));
    }

    #[test]
    fn test_document_with_legacy_spelling_and_string_flags() {
        let mut doc = sentiment_document(&record());
        let flag = doc.remove("Asset Comparison").unwrap();
        doc.insert("Asset Comparision".to_string(), json!(flag.to_string()));

        let parsed = sentiment_from_document(&doc).unwrap();
        assert_eq!(parsed, record());
    }

    #[test]
    fn test_price_document() {
        let price = PriceRecord {
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            adj_close: 2064.4,
        };
        let doc = price_document(&price);
        assert_eq!(doc["Adj Close"], json!(2064.4));
        assert_eq!(price_from_document(&doc).unwrap(), price);
    }

    #[test]
    fn test_keyed_documents_keep_first_per_date() {
        let mut later = record();
        later.news = "second story".to_string();
        let (docs, collapsed) = keyed_documents(&[record(), later], sentiment_document);

        assert_eq!(collapsed, 1);
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].0, "2024-01-02");
        assert_eq!(docs[0].1["News"], json!("gold climbs on weak dollar"));
    }

    #[test]
    fn test_bad_document_rejected() {
        let mut doc = price_document(&PriceRecord {
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            adj_close: 1.0,
        });
        doc.insert("Adj Close".to_string(), json!("n/a"));
        assert!(price_from_document(&doc).is_err());
    }
}
