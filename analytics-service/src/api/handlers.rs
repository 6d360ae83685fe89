use std::collections::BTreeMap;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use meter_store::domain::{Consumer, MeterReading};
use serde::Deserialize;
use time::{macros::format_description, Date, Month};

use super::{ApiError, AppState};
use crate::engine::{
    hourly::DateRange,
    pattern::ConsumerPatternSummary,
    ranking::{ConsumerRankEntry, GroupFilter},
    rollup::{Granularity, WeekdayFilter, WeekdayProfiles},
    variance::{PopulationVariance, VarianceScope},
    HourOfDayTotal, PeriodBuckets, RollupReport, RollupView, TaggedHour,
};
use crate::store::group_by_consumer;

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: String,
}

#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    pub month: String,
}

#[derive(Debug, Deserialize)]
pub struct YearQuery {
    pub year: i32,
}

#[derive(Debug, Deserialize)]
pub struct RollupQuery {
    pub view: String,
    pub date: String,
    pub granularity: Option<String>,
    pub weekday: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ViewQuery {
    pub view: String,
    pub date: String,
}

#[derive(Debug, Deserialize)]
pub struct VarianceQuery {
    pub scope: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RankQuery {
    #[serde(rename = "type")]
    pub group: Option<String>,
}

fn parse_date(s: &str) -> Result<Date, ApiError> {
    Date::parse(s.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|e| ApiError::BadRequest(format!("invalid date '{s}': {e}")))
}

/// `YYYY-MM`
fn parse_month(s: &str) -> Result<(i32, Month), ApiError> {
    let invalid = || ApiError::BadRequest(format!("invalid month '{s}', expected YYYY-MM"));

    let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u8 = month.parse().map_err(|_| invalid())?;
    let month = Month::try_from(month).map_err(|_| invalid())?;
    Ok((year, month))
}

async fn fetch(state: &AppState, consumer_id: &str, range: Option<DateRange>) -> Result<Vec<MeterReading>, ApiError> {
    let readings = state.store.readings(consumer_id, range).await?;
    if readings.is_empty() {
        return Err(ApiError::NoData(format!("No readings found for consumer {consumer_id}")));
    }
    Ok(readings)
}

pub async fn list_consumers(State(state): State<AppState>) -> Result<Json<Vec<Consumer>>, ApiError> {
    metrics::counter!("api_requests_total", "endpoint" => "consumers").increment(1);
    Ok(Json(state.store.consumers().await?))
}

pub async fn hourly(
    State(state): State<AppState>,
    Path(consumer_id): Path<String>,
    Query(q): Query<DateQuery>,
) -> Result<Json<Vec<TaggedHour>>, ApiError> {
    metrics::counter!("api_requests_total", "endpoint" => "hourly").increment(1);
    let date = parse_date(&q.date)?;

    let readings = fetch(&state, &consumer_id, Some(DateRange::day(date))).await?;
    Ok(Json(state.engine.hourly_with_tariff(&readings, date)))
}

pub async fn hourly_totals(
    State(state): State<AppState>,
    Path(consumer_id): Path<String>,
    Query(q): Query<ViewQuery>,
) -> Result<Json<Vec<HourOfDayTotal>>, ApiError> {
    metrics::counter!("api_requests_total", "endpoint" => "hourly_totals").increment(1);
    let view: RollupView = q.view.parse()?;
    let date = parse_date(&q.date)?;

    let readings = fetch(&state, &consumer_id, Some(view.range(date)?)).await?;
    Ok(Json(state.engine.hour_of_day_totals(&readings, view, date)?))
}

pub async fn weekly_tariff(
    State(state): State<AppState>,
    Path(consumer_id): Path<String>,
    Query(q): Query<MonthQuery>,
) -> Result<Json<Vec<PeriodBuckets>>, ApiError> {
    metrics::counter!("api_requests_total", "endpoint" => "weekly_tariff").increment(1);
    let (year, month) = parse_month(&q.month)?;
    let range = DateRange::month(year, month)?;

    let readings = fetch(&state, &consumer_id, Some(range)).await?;
    Ok(Json(state.engine.weekly_tariff(&readings, year, month)?))
}

pub async fn monthly_tariff(
    State(state): State<AppState>,
    Path(consumer_id): Path<String>,
    Query(q): Query<YearQuery>,
) -> Result<Json<Vec<PeriodBuckets>>, ApiError> {
    metrics::counter!("api_requests_total", "endpoint" => "monthly_tariff").increment(1);
    let range = DateRange::year(q.year)?;

    let readings = fetch(&state, &consumer_id, Some(range)).await?;
    Ok(Json(state.engine.monthly_tariff(&readings, q.year)?))
}

pub async fn rollup(
    State(state): State<AppState>,
    Path(consumer_id): Path<String>,
    Query(q): Query<RollupQuery>,
) -> Result<Json<RollupReport>, ApiError> {
    metrics::counter!("api_requests_total", "endpoint" => "rollup").increment(1);
    let view: RollupView = q.view.parse()?;
    let date = parse_date(&q.date)?;
    let granularity = q.granularity.as_deref().map(str::parse::<Granularity>).transpose()?;
    let weekday = q
        .weekday
        .as_deref()
        .map(str::parse::<WeekdayFilter>)
        .transpose()?
        .unwrap_or_default();

    let readings = fetch(&state, &consumer_id, Some(view.range(date)?)).await?;
    Ok(Json(state.engine.rollup_view(&readings, view, date, granularity, weekday)?))
}

pub async fn peak_demand(
    State(state): State<AppState>,
    Path(consumer_id): Path<String>,
    Query(q): Query<MonthQuery>,
) -> Result<Json<WeekdayProfiles>, ApiError> {
    metrics::counter!("api_requests_total", "endpoint" => "peak_demand").increment(1);
    let (year, month) = parse_month(&q.month)?;

    let readings = fetch(&state, &consumer_id, Some(DateRange::month(year, month)?)).await?;
    Ok(Json(state.engine.weekday_profiles(&readings, year, month)?))
}

pub async fn peak_variance(
    State(state): State<AppState>,
    Path(consumer_id): Path<String>,
) -> Result<Json<BTreeMap<String, f64>>, ApiError> {
    metrics::counter!("api_requests_total", "endpoint" => "peak_variance").increment(1);

    let readings = fetch(&state, &consumer_id, None).await?;
    Ok(Json(state.engine.peak_variance(&readings)))
}

pub async fn patterns(
    State(state): State<AppState>,
    Path(consumer_id): Path<String>,
) -> Result<Json<ConsumerPatternSummary>, ApiError> {
    metrics::counter!("api_requests_total", "endpoint" => "patterns").increment(1);

    let readings = fetch(&state, &consumer_id, None).await?;
    Ok(Json(state.engine.pattern_summary(&readings)))
}

pub async fn variance(
    State(state): State<AppState>,
    Query(q): Query<VarianceQuery>,
) -> Result<Json<PopulationVariance>, ApiError> {
    metrics::counter!("api_requests_total", "endpoint" => "variance").increment(1);
    let scope: VarianceScope = match q.scope.as_deref() {
        Some(scope) => scope.parse()?,
        None => VarianceScope::All,
    };
    // reject out-of-range years before reading the whole table
    scope.range()?;

    let consumers = state.store.consumers().await?;
    let readings = state.store.all_readings().await?;
    if readings.is_empty() {
        return Err(ApiError::NoData("No readings found".to_string()));
    }

    let population = group_by_consumer(consumers, readings);
    Ok(Json(state.engine.population_variance(population, scope)?))
}

pub async fn rank(
    State(state): State<AppState>,
    Query(q): Query<RankQuery>,
) -> Result<Json<Vec<ConsumerRankEntry>>, ApiError> {
    metrics::counter!("api_requests_total", "endpoint" => "rank").increment(1);
    let filter: GroupFilter = match q.group.as_deref() {
        Some(group) => group.parse()?,
        None => GroupFilter::All,
    };

    let consumers = state.store.consumers().await?;
    let readings = state.store.all_readings().await?;
    if readings.is_empty() {
        return Err(ApiError::NoData("No readings found".to_string()));
    }

    let population = group_by_consumer(consumers, readings);
    tracing::debug!(consumers = population.len(), ?filter, "ranking consumers");
    Ok(Json(state.engine.rank_consumers(population, filter)))
}
