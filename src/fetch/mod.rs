use std::{
    io::{self, Read},
    time::{Duration, Instant},
};

use html5ever::tendril::{stream::Utf8LossyDecoder, ByteTendril, TendrilSink};
use reqwest::{
    blocking::Client,
    header::{HeaderMap, HeaderValue, CONNECTION},
    StatusCode,
};
use tracing::{instrument, Level};
use url::Url;

use crate::{
    city::City,
    error::{Error, Result},
    parse::{Extraction, OfferScanner, Scan, VenueOffers},
};

pub const CHUNK_SIZE: usize = 8 * 1024;

/// Builds a one-shot client: the connection is closed after the response
/// and never pooled.
pub fn make_client(timeout: Duration) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(CONNECTION, HeaderValue::from_static("close"));
    Client::builder()
        .default_headers(headers)
        .pool_max_idle_per_host(0)
        .timeout(timeout)
        .gzip(true)
        .build()
        .map_err(From::from)
}

pub fn offers_url(base_url: &Url, city: City) -> Result<Url> {
    base_url.join(&city.resource_path()).map_err(From::from)
}

/// Feeds `reader` to a scanner [`CHUNK_SIZE`] bytes at a time, so the page
/// is never held in memory as a whole. Invalid UTF-8 becomes U+FFFD.
pub fn scan_reader(mut reader: impl Read) -> io::Result<Scan> {
    let mut decoder = Utf8LossyDecoder::new(OfferScanner::new());
    let mut buf = vec![0; CHUNK_SIZE];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => decoder.process(ByteTendril::from_slice(&buf[..n])),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(decoder.finish())
}

/// Blocking: performs exactly one GET, no retries.
#[instrument(skip(client, url), fields(url = %url), level = Level::TRACE)]
pub fn fetch_offers(client: &Client, url: Url, city: City) -> Result<VenueOffers> {
    let start = Instant::now();
    let response = client.get(url).send()?;
    let status = response.status();
    if status != StatusCode::OK {
        return Err(Error::Status(city, status));
    }
    let scan = scan_reader(response)?;
    if scan.offers.is_empty() {
        log::warn!("No venues found on the {city} offers page");
    }
    log::info!(
        "Scanned {} venues for {city} in {:?}",
        scan.offers.len(),
        start.elapsed()
    );
    Ok(scan.offers)
}

/// Fetches and scans the page for `city` on the blocking pool. Every
/// failure, including running past `timeout`, ends up as
/// [`Extraction::Unavailable`].
pub async fn fetch_extraction(base_url: &Url, city: City, timeout: Duration) -> Extraction {
    let url = match offers_url(base_url, city) {
        Ok(url) => url,
        Err(e) => {
            log::warn!("No offers page for {city}: {e}");
            return Extraction::Unavailable;
        }
    };
    let task = tokio::task::spawn_blocking(move || {
        let client = make_client(timeout)?;
        fetch_offers(&client, url, city)
    });
    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(Ok(offers))) => Extraction::Offers(offers),
        Ok(Ok(Err(e))) => {
            log::warn!("Fetching offers for {city} failed: {e}");
            Extraction::Unavailable
        }
        Ok(Err(e)) => {
            log::error!("Offer fetch task for {city} died: {e}");
            Extraction::Unavailable
        }
        Err(_elapsed) => {
            log::warn!("{}", Error::Timeout(city));
            Extraction::Unavailable
        }
    }
}
