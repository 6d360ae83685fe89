use anyhow::{bail, Result};
use analytics_service::{
    config::load_engine_config,
    engine::{
        pattern::ConsumerPatternSummary,
        ranking::{ConsumerRankEntry, GroupFilter},
        AnalyticsEngine,
    },
    observability,
    store::{group_by_consumer, CsvReadingStore, ReadingStore},
};
use serde::Serialize;
use std::env;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConsumerReport {
    consumer_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    patterns: ConsumerPatternSummary,
}

#[derive(Serialize)]
struct Report {
    consumers: Vec<ConsumerReport>,
    ranking: Vec<ConsumerRankEntry>,
}

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        bail!("usage: pattern_report <csv_file_path>");
    }
    let file_path = &args[1];

    // Only the [engine] table is read (ANALYTICS_CONFIG may point elsewhere).
    let engine = AnalyticsEngine::new(&load_engine_config()?)?;

    let store = CsvReadingStore::from_path(file_path)?;
    let population = group_by_consumer(store.consumers().await?, store.all_readings().await?);

    let consumers = population
        .iter()
        .map(|(consumer, readings)| ConsumerReport {
            consumer_id: consumer.consumer_id.clone(),
            name: consumer.short_name.clone(),
            patterns: engine.pattern_summary(readings),
        })
        .collect();
    let ranking = engine.rank_consumers(population, GroupFilter::All);

    tracing::info!(ranked = ranking.len(), "pattern report complete");
    println!("{}", serde_json::to_string_pretty(&Report { consumers, ranking })?);

    Ok(())
}
