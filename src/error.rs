use std::fmt::{self, Display, Formatter};

use reqwest::StatusCode;

use crate::city::City;

#[derive(Debug)]
pub enum Error {
    Request(reqwest::Error),
    Io(std::io::Error),
    Status(City, StatusCode),
    Timeout(City),
    Url(url::ParseError),
    Config(String),
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Self::Request(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<url::ParseError> for Error {
    fn from(e: url::ParseError) -> Self {
        Self::Url(e)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request(e) => write!(f, "Request error: {e}"),
            Self::Io(e) => write!(f, "Io error: {e}"),
            Self::Status(city, status) => {
                write!(f, "Offers page for {city} answered with {status}")
            }
            Self::Timeout(city) => write!(f, "Timed out fetching offers for {city}"),
            Self::Url(e) => write!(f, "Url error: {e}"),
            Self::Config(msg) => write!(f, "Config error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
