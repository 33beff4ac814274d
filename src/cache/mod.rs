use std::{future::Future, time::Duration};

use chrono::{DateTime, Utc};
use tokio::sync::OnceCell;
use url::Url;

use crate::{city::City, fetch, parse::Extraction};

/// Where cache misses get their offers from.
pub trait Source: Send + Sync + 'static {
    fn fetch(&self, city: City) -> impl Future<Output = Extraction> + Send;
}

/// The live offers site.
#[derive(Debug, Clone)]
pub struct HttpSource {
    base_url: Url,
    timeout: Duration,
}

impl HttpSource {
    #[must_use]
    pub const fn new(base_url: Url, timeout: Duration) -> Self {
        Self { base_url, timeout }
    }
}

impl Source for HttpSource {
    async fn fetch(&self, city: City) -> Extraction {
        fetch::fetch_extraction(&self.base_url, city, self.timeout).await
    }
}

#[derive(Debug)]
pub struct CacheEntry {
    fetched_at: DateTime<Utc>,
    extraction: Extraction,
}

impl CacheEntry {
    #[must_use]
    pub fn new(extraction: Extraction) -> Self {
        Self {
            fetched_at: Utc::now(),
            extraction,
        }
    }

    #[inline]
    #[must_use]
    pub const fn extraction(&self) -> &Extraction {
        &self.extraction
    }

    #[inline]
    #[must_use]
    pub const fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    #[inline]
    #[must_use]
    pub fn age(&self) -> chrono::Duration {
        Utc::now().signed_duration_since(self.fetched_at)
    }
}

/// One extraction per city for as long as the process lives. Failures are
/// cached too; there is no expiry and no way to invalidate an entry.
#[derive(Debug)]
pub struct OfferCache<S> {
    source: S,
    tallinn: OnceCell<CacheEntry>,
    tartu: OnceCell<CacheEntry>,
}

impl<S: Source> OfferCache<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            tallinn: OnceCell::new(),
            tartu: OnceCell::new(),
        }
    }

    fn cell(&self, city: City) -> &OnceCell<CacheEntry> {
        match city {
            City::Tallinn => &self.tallinn,
            City::Tartu => &self.tartu,
        }
    }

    /// Callers racing on an empty slot share a single fetch and all see its
    /// result.
    pub async fn get(&self, city: City) -> &CacheEntry {
        self.cell(city)
            .get_or_init(|| async {
                log::info!("No cached offers for {city}, fetching");
                let entry = CacheEntry::new(self.source.fetch(city).await);
                match entry.extraction.offers() {
                    Some(offers) => log::info!("Cached {} venues for {city}", offers.len()),
                    None => log::warn!("Cached unavailable offers for {city}"),
                }
                entry
            })
            .await
    }

    /// Looks at the slot without triggering a fetch.
    pub fn cached(&self, city: City) -> Option<&CacheEntry> {
        self.cell(city).get()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::parse::VenueOffers;

    #[derive(Debug, Default)]
    struct Counting {
        calls: AtomicUsize,
        unavailable: bool,
    }

    impl Source for Counting {
        async fn fetch(&self, city: City) -> Extraction {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            if self.unavailable {
                return Extraction::Unavailable;
            }
            Extraction::Offers([(city.slug(), vec!["Supp"])].into_iter().collect())
        }
    }

    #[tokio::test]
    async fn test_get_fetches_once() {
        let cache = OfferCache::new(Counting::default());
        assert!(cache.cached(City::Tartu).is_none());
        let first = cache.get(City::Tartu).await;
        let second = cache.get(City::Tartu).await;
        assert!(std::ptr::eq(first, second));
        assert_eq!(cache.source.calls.load(Ordering::SeqCst), 1);
        let expected: VenueOffers = [("tartu", vec!["Supp"])].into_iter().collect();
        assert_eq!(first.extraction(), &Extraction::Offers(expected));
        assert!(cache.cached(City::Tartu).is_some());
    }

    #[tokio::test]
    async fn test_cities_are_cached_separately() {
        let cache = OfferCache::new(Counting::default());
        let tartu = cache.get(City::Tartu).await;
        let tallinn = cache.get(City::Tallinn).await;
        assert_ne!(tartu.extraction(), tallinn.extraction());
        assert_eq!(cache.source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_concurrent_first_access_shares_fetch() {
        let cache = OfferCache::new(Counting::default());
        let (a, b, c) = tokio::join!(
            cache.get(City::Tallinn),
            cache.get(City::Tallinn),
            cache.get(City::Tallinn)
        );
        assert_eq!(cache.source.calls.load(Ordering::SeqCst), 1);
        assert!(std::ptr::eq(a, b) && std::ptr::eq(b, c));
    }

    #[tokio::test]
    async fn test_unavailable_is_cached() {
        let cache = OfferCache::new(Counting {
            unavailable: true,
            ..Counting::default()
        });
        assert_eq!(cache.get(City::Tartu).await.extraction(), &Extraction::Unavailable);
        assert_eq!(cache.get(City::Tartu).await.extraction(), &Extraction::Unavailable);
        assert_eq!(cache.source.calls.load(Ordering::SeqCst), 1);
    }
}
