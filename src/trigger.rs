use url::form_urlencoded;

use crate::{city::City, format::FilterSpec};

pub const CITY_MAX_CHARS: usize = 7;
pub const FILTER_MAX_CHARS: usize = 512;

/// Raw inputs of one chat command: the query string pairs and the
/// url-encoded form body, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trigger {
    query: Vec<(String, String)>,
    form: Vec<(String, String)>,
}

fn decode_pairs(raw: &str) -> Vec<(String, String)> {
    form_urlencoded::parse(raw.as_bytes())
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect()
}

impl Trigger {
    #[must_use]
    pub fn new(query: Option<&str>, body: Option<&str>) -> Self {
        Self {
            query: query.map(decode_pairs).unwrap_or_default(),
            form: body.map(decode_pairs).unwrap_or_default(),
        }
    }

    /// First value of a query parameter.
    fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn form_values(&self, name: &str) -> Vec<&str> {
        self.form
            .iter()
            .filter(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
            .collect()
    }
}

/// At most `max` characters of `s`.
#[must_use]
pub fn truncate_chars(s: &str, max: usize) -> &str {
    s.char_indices().nth(max).map_or(s, |(end, _)| &s[..end])
}

/// What the command asks for, after lenient normalization: bad input is
/// cut down or replaced by defaults, never rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LunchRequest {
    pub city: City,
    pub filter: FilterSpec,
}

impl LunchRequest {
    #[must_use]
    pub fn from_trigger(trigger: &Trigger) -> Self {
        let city = trigger
            .query_param("city")
            .map(|city| truncate_chars(city, CITY_MAX_CHARS))
            .and_then(City::from_slug)
            .unwrap_or_default();

        // a single form `text` wins over the `venues` query parameter
        let terms = match trigger.form_values("text").as_slice() {
            [text] => Some(*text),
            _ => trigger.query_param("venues"),
        };
        let filter = terms
            .map(|terms| FilterSpec::parse(truncate_chars(terms, FILTER_MAX_CHARS)))
            .unwrap_or_default();

        Self { city, filter }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(query: &str, body: Option<&str>) -> LunchRequest {
        LunchRequest::from_trigger(&Trigger::new(Some(query), body))
    }

    #[test]
    fn test_defaults() {
        assert_eq!(
            LunchRequest::from_trigger(&Trigger::new(None, None)),
            LunchRequest {
                city: City::Tartu,
                filter: FilterSpec::default(),
            }
        );
    }

    #[test]
    fn test_city_truncation() {
        assert_eq!(request("city=tallinn", None).city, City::Tallinn);
        assert_eq!(request("city=tallinnnnnnnn", None).city, City::Tallinn);
        assert_eq!(request("city=xtallinn", None).city, City::Tartu);
        assert_eq!(request("city=narva", None).city, City::Tartu);
        assert_eq!(request("city=Tallinn", None).city, City::Tartu);
        assert_eq!(request("city=tartu&city=tallinn", None).city, City::Tartu);
    }

    #[test]
    fn test_venues_query() {
        assert_eq!(
            request("city=tallinn&venues=rp9,G%C3%B6%C3%B6k", None).filter,
            FilterSpec::parse("rp9,göök")
        );
    }

    #[test]
    fn test_form_text_overrides_query() {
        let req = request("venues=rp9", Some("token=x&text=vilde%2C+trepp"));
        assert_eq!(req.filter.patterns(), ["vilde", "trepp"]);
    }

    #[test]
    fn test_repeated_form_text_is_ignored() {
        let req = request("venues=rp9", Some("text=vilde&text=trepp"));
        assert_eq!(req.filter.patterns(), ["rp9"]);
        let req = request("", Some("text=vilde&text=trepp"));
        assert!(req.filter.is_empty());
    }

    #[test]
    fn test_filter_truncated_before_split() {
        let long = format!("{},göök", "a".repeat(FILTER_MAX_CHARS));
        let req = request(&format!("venues={long}"), None);
        assert_eq!(req.filter.patterns(), ["a".repeat(FILTER_MAX_CHARS)]);
    }

    #[test]
    fn test_truncate_chars_counts_characters() {
        assert_eq!(truncate_chars("göökgöök", 3), "göö");
        assert_eq!(truncate_chars("rp9", 7), "rp9");
        assert_eq!(truncate_chars("", 7), "");
    }
}
