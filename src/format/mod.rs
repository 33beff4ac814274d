use crate::parse::Extraction;

pub const HEADER: &str = "Today's lunch offers:";
pub const UNAVAILABLE: &str = "Lunch offers are unavailable right now.";
pub const NO_OFFERS: &str = "no offers today";
pub const SEPARATOR: &str = " | ";
pub const MAX_VENUES: usize = 5;
pub const MAX_OFFERS: usize = 8;

/// Lowercase substring patterns a venue name is matched against.
/// Empty means every venue is shown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec(Vec<String>);

impl FilterSpec {
    /// Splits a comma separated list of terms. Terms are trimmed and
    /// lowercased; blank ones are dropped.
    #[must_use]
    pub fn parse(terms: &str) -> Self {
        Self(
            terms
                .split(',')
                .map(str::trim)
                .filter(|term| !term.is_empty())
                .map(str::to_lowercase)
                .collect(),
        )
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn patterns(&self) -> &[String] {
        &self.0
    }
}

/// Matching is case-insensitive on both sides: patterns are lowercased by
/// [`FilterSpec::parse`] and the venue name is lowercased here.
#[must_use]
pub fn should_show_venue(venue: &str, filter: &FilterSpec) -> bool {
    if venue.is_empty() {
        return false;
    }
    if filter.is_empty() {
        return true;
    }
    let venue = venue.to_lowercase();
    filter
        .patterns()
        .iter()
        .any(|pattern| venue.contains(pattern.as_str()))
}

fn render_venue(venue: &str, offers: &[String]) -> String {
    if offers.is_empty() {
        return format!("{venue}: {NO_OFFERS}");
    }
    let offers: Vec<&str> = offers.iter().take(MAX_OFFERS).map(String::as_str).collect();
    format!("{venue}: {}", offers.join(SEPARATOR))
}

/// Renders the chat reply: the header, then one line for each of the first
/// [`MAX_VENUES`] venues that pass `filter`, in page order.
#[must_use]
pub fn render(extraction: &Extraction, filter: &FilterSpec) -> String {
    let Some(venue_offers) = extraction.offers() else {
        return UNAVAILABLE.to_owned();
    };
    let mut out = String::from(HEADER);
    for (venue, offers) in venue_offers
        .iter()
        .filter(|(venue, _)| should_show_venue(venue, filter))
        .take(MAX_VENUES)
    {
        out.push('\n');
        out.push_str(&render_venue(venue, offers));
    }
    out
}
