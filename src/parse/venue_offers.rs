use indexmap::IndexMap;
use serde::Serialize;

/// Venue name to its offers, both kept in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct VenueOffers(IndexMap<String, Vec<String>>);

impl VenueOffers {
    /// Adds `venue` with no offers unless it is already known.
    pub fn register(&mut self, venue: &str) {
        if !self.0.contains_key(venue) {
            self.0.insert(venue.to_owned(), Vec::new());
        }
    }

    pub fn push_offer(&mut self, venue: &str, offer: String) {
        if let Some(offers) = self.0.get_mut(venue) {
            offers.push(offer);
        } else {
            self.0.insert(venue.to_owned(), vec![offer]);
        }
    }

    #[cfg(test)]
    #[must_use]
    pub fn get(&self, venue: &str) -> Option<&[String]> {
        self.0.get(venue).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0
            .iter()
            .map(|(venue, offers)| (venue.as_str(), offers.as_slice()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<V, O> FromIterator<(V, Vec<O>)> for VenueOffers
where
    V: Into<String>,
    O: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (V, Vec<O>)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(venue, offers)| (venue.into(), offers.into_iter().map(Into::into).collect()))
                .collect(),
        )
    }
}

/// Outcome of fetching one city's page. `Unavailable` covers every failure
/// (unsupported city, bad status, transport error, timeout) and is distinct
/// from a page that parsed fine but listed nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Offers(VenueOffers),
    Unavailable,
}

impl Extraction {
    #[must_use]
    pub const fn offers(&self) -> Option<&VenueOffers> {
        match self {
            Self::Offers(offers) => Some(offers),
            Self::Unavailable => None,
        }
    }
}

impl From<Option<VenueOffers>> for Extraction {
    fn from(offers: Option<VenueOffers>) -> Self {
        offers.map_or(Self::Unavailable, Self::Offers)
    }
}
