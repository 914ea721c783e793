//! Domain types for tracked products

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Product stock status as reported by the retailer.
///
/// The store must tolerate values it has never seen (the retailer adds
/// statuses without notice), so anything unrecognized round-trips through
/// `Other` instead of failing the row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    Available,
    Preorder,
    NotAvailable,
    Other(String),
}

impl Availability {
    /// Statuses that show up in listings; everything else is hidden.
    pub fn is_listable(&self) -> bool {
        matches!(self, Availability::Available | Availability::Preorder)
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Availability::Available => write!(f, "Available"),
            Availability::Preorder => write!(f, "Preorder"),
            Availability::NotAvailable => write!(f, "NotAvailable"),
            Availability::Other(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for Availability {
    fn from(s: &str) -> Self {
        match s {
            "Available" => Availability::Available,
            "Preorder" => Availability::Preorder,
            "NotAvailable" => Availability::NotAvailable,
            other => Availability::Other(other.to_string()),
        }
    }
}

impl FromStr for Availability {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Availability::from(s))
    }
}

impl Serialize for Availability {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Availability {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Availability::from(s.as_str()))
    }
}

/// A product listing scraped from the retailer.
///
/// `url` is the natural key; a product belongs to exactly one (artist, site)
/// pair. Rows are written by the external scraper and read-only here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub url: String,
    pub title: String,
    pub artist: String,
    pub site: String,
    pub img_url: String,
    pub date_added: NaiveDate,
    pub availability: Availability,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn availability_parses_known_values() {
        assert_eq!("Available".parse::<Availability>().unwrap(), Availability::Available);
        assert_eq!("Preorder".parse::<Availability>().unwrap(), Availability::Preorder);
        assert_eq!("NotAvailable".parse::<Availability>().unwrap(), Availability::NotAvailable);
    }

    #[test]
    fn availability_passes_through_unknown_values() {
        let parsed = "Weird".parse::<Availability>().unwrap();
        assert_eq!(parsed, Availability::Other("Weird".to_string()));
        assert_eq!(parsed.to_string(), "Weird");
        assert!(!parsed.is_listable());
    }

    #[test]
    fn availability_listable_statuses() {
        assert!(Availability::Available.is_listable());
        assert!(Availability::Preorder.is_listable());
        assert!(!Availability::NotAvailable.is_listable());
    }

    #[test]
    fn availability_serializes_as_plain_string() {
        let json = serde_json::to_string(&Availability::Preorder).unwrap();
        assert_eq!(json, "\"Preorder\"");
        let back: Availability = serde_json::from_str("\"SoldOutSoon\"").unwrap();
        assert_eq!(back, Availability::Other("SoldOutSoon".to_string()));
    }
}
