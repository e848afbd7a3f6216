use crate::domain::records::{AlignedRecord, PriceRecord, SentimentRecord, first_per_date};
use tracing::{info, warn};

/// Join coverage counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlignmentStats {
    pub matched: usize,
    pub unmatched_sentiment: usize,
    pub unmatched_price: usize,
    pub duplicate_sentiment_dates: usize,
    pub duplicate_price_dates: usize,
}

/// Inner join on exact date equality, sorted ascending by date.
///
/// Dates present on only one side produce no row. When a date occurs more
/// than once on a side, only its first record takes part in the join.
pub fn merge(
    sentiment: &[SentimentRecord],
    prices: &[PriceRecord],
) -> (Vec<AlignedRecord>, AlignmentStats) {
    let (news_by_date, duplicate_sentiment_dates) = first_per_date(sentiment);
    let (price_by_date, duplicate_price_dates) = first_per_date(prices);

    let aligned: Vec<AlignedRecord> = news_by_date
        .iter()
        .filter_map(|(date, news)| {
            price_by_date.get(date).map(|price| AlignedRecord {
                sentiment: (*news).clone(),
                adj_close: price.adj_close,
            })
        })
        .collect();

    let stats = AlignmentStats {
        matched: aligned.len(),
        unmatched_sentiment: news_by_date.len() - aligned.len(),
        unmatched_price: price_by_date.len() - aligned.len(),
        duplicate_sentiment_dates,
        duplicate_price_dates,
    };

    if duplicate_sentiment_dates + duplicate_price_dates > 0 {
        warn!(
            "Discarded duplicate dates before join: {} sentiment, {} price (kept first)",
            duplicate_sentiment_dates, duplicate_price_dates
        );
    }
    info!(
        "Merged {} dates. Unmatched: {} sentiment, {} price",
        stats.matched, stats.unmatched_sentiment, stats.unmatched_price
    );

    (aligned, stats)
}
