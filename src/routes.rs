use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, RawQuery, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    cache::{CacheEntry, OfferCache, Source},
    city::City,
    format,
    parse::VenueOffers,
    trigger::{LunchRequest, Trigger},
};

pub fn router<S: Source>(cache: Arc<OfferCache<S>>) -> Router {
    Router::new()
        .route("/", get(lunch::<S>).post(lunch::<S>))
        .route("/offers/:city", get(offers::<S>))
        .route("/status", get(status::<S>))
        .route("/health", get(health))
        .with_state(cache)
}

/// The chat command. Always answers 200 with plain text, failures included.
async fn lunch<S: Source>(
    State(cache): State<Arc<OfferCache<S>>>,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Response {
    let body = String::from_utf8_lossy(&body);
    let trigger = Trigger::new(query.as_deref(), (!body.is_empty()).then_some(&*body));
    let request = LunchRequest::from_trigger(&trigger);
    log::info!(
        "Lunch command for {} with {} filter term(s)",
        request.city,
        request.filter.patterns().len()
    );
    let entry = cache.get(request.city).await;
    let text = format::render(entry.extraction(), &request.filter);
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        text,
    )
        .into_response()
}

#[derive(Debug, Serialize)]
struct OffersBody<'a> {
    city: City,
    fetched_at: DateTime<Utc>,
    venues: Option<&'a VenueOffers>,
}

async fn offers<S: Source>(
    State(cache): State<Arc<OfferCache<S>>>,
    Path(slug): Path<String>,
) -> Response {
    let Some(city) = City::from_slug(&slug) else {
        return (StatusCode::NOT_FOUND, format!("unsupported city {slug}")).into_response();
    };
    let entry = cache.get(city).await;
    log::debug!(
        "Serving offers for {city} fetched {}s ago",
        entry.age().num_seconds()
    );
    Json(OffersBody {
        city,
        fetched_at: entry.fetched_at(),
        venues: entry.extraction().offers(),
    })
    .into_response()
}

#[derive(Debug, Serialize)]
struct CityStatus {
    fetched_at: DateTime<Utc>,
    age_secs: i64,
    available: bool,
    venues: usize,
}

impl From<&CacheEntry> for CityStatus {
    fn from(entry: &CacheEntry) -> Self {
        let offers = entry.extraction().offers();
        Self {
            fetched_at: entry.fetched_at(),
            age_secs: entry.age().num_seconds(),
            available: offers.is_some(),
            venues: offers.map_or(0, VenueOffers::len),
        }
    }
}

/// `null` for a city nobody has asked about yet.
#[derive(Debug, Serialize)]
struct StatusBody {
    tallinn: Option<CityStatus>,
    tartu: Option<CityStatus>,
}

/// Reports what is cached without fetching anything.
async fn status<S: Source>(State(cache): State<Arc<OfferCache<S>>>) -> Json<StatusBody> {
    Json(StatusBody {
        tallinn: cache.cached(City::Tallinn).map(CityStatus::from),
        tartu: cache.cached(City::Tartu).map(CityStatus::from),
    })
}

async fn health() -> &'static str {
    "ok"
}
