use std::fmt::{self, Display, Formatter};

use serde::Serialize;

/// One of the cities the offers site publishes a page for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum City {
    Tallinn,
    #[default]
    Tartu,
}

impl City {
    /// Exact, case-sensitive match against the supported slugs. Anything
    /// else has no page, so nothing gets fetched for it.
    #[must_use]
    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "tallinn" => Some(Self::Tallinn),
            "tartu" => Some(Self::Tartu),
            _ => None,
        }
    }

    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Tallinn => "tallinn",
            Self::Tartu => "tartu",
        }
    }

    #[must_use]
    pub fn resource_path(self) -> String {
        format!("/{}", self.slug())
    }
}

impl Display for City {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_known_cities_have_a_page() {
        let path = |slug| City::from_slug(slug).map(City::resource_path);
        assert_eq!(path("tallinn").as_deref(), Some("/tallinn"));
        assert_eq!(path("tartu").as_deref(), Some("/tartu"));
        assert_eq!(path("Tartu"), None);
        assert_eq!(path("narva"), None);
        assert_eq!(path(""), None);
    }

    #[test]
    fn test_default_is_tartu() {
        assert_eq!(City::default(), City::Tartu);
    }
}
