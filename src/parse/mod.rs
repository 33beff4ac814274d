mod offer_scanner;
mod remove_excess_whitespace;
mod venue_offers;

pub use offer_scanner::{OfferScanner, Scan};
pub use remove_excess_whitespace::remove_excess_whitespace;
pub use venue_offers::{Extraction, VenueOffers};
