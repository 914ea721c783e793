//! Query engine: the filtered, ordered product listing and the row
//! partitioning used by the presentation layer.
//!
//! Listings only ever show Available/Preorder products. Ordering is done in
//! Rust with an explicit comparator so the tie-break rules are spelled out
//! here instead of being implicit database behavior.

use crate::database::{product_from_row, DbResult};
use crate::error::{Result, TrackerError};
use crate::models::Product;
use rusqlite::{params, Connection};
use std::cmp::Ordering;

/// Marker preceding the retailer-assigned numeric product id in listing urls.
const PRODUCT_ID_MARKER: &str = "product_id=";

/// Listing filter; `artist = None` means all tracked artists.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub artist: Option<String>,
}

/// Fetch the product listing, most recent first.
///
/// Base predicate: availability in {Available, Preorder} - NotAvailable and
/// unknown statuses never appear, regardless of filter. Returns a snapshot
/// `Vec`, not a live cursor.
pub fn list_products(conn: &Connection, filter: &ProductFilter) -> DbResult<Vec<Product>> {
    let mut products = match &filter.artist {
        Some(artist) => {
            let mut stmt = conn.prepare(
                "SELECT url, title, artist, site, img_url, date_added, availability
                 FROM products
                 WHERE availability IN ('Available', 'Preorder') AND artist = ?1",
            )?;
            let rows: DbResult<Vec<Product>> =
                stmt.query_map(params![artist], product_from_row)?.collect();
            rows?
        }
        None => {
            let mut stmt = conn.prepare(
                "SELECT url, title, artist, site, img_url, date_added, availability
                 FROM products
                 WHERE availability IN ('Available', 'Preorder')",
            )?;
            let rows: DbResult<Vec<Product>> = stmt.query_map([], product_from_row)?.collect();
            rows?
        }
    };

    products.sort_by(listing_order);
    Ok(products)
}

/// Display order: `date_added` descending, then the numeric id embedded in
/// the url descending. Dates alone are too coarse for same-day additions;
/// the embedded id reflects the retailer-assigned sequence. When either url
/// lacks the marker, fall back to lexicographic comparison of the urls.
fn listing_order(a: &Product, b: &Product) -> Ordering {
    b.date_added.cmp(&a.date_added).then_with(|| {
        match (product_id_from_url(&a.url), product_id_from_url(&b.url)) {
            (Some(ida), Some(idb)) => idb.cmp(&ida),
            _ => b.url.cmp(&a.url),
        }
    })
}

/// Extract the numeric id following `product_id=` in a listing url.
pub fn product_id_from_url(url: &str) -> Option<u64> {
    let start = url.find(PRODUCT_ID_MARKER)? + PRODUCT_ID_MARKER.len();
    let digits: &str = &url[start..];
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse().ok()
}

/// Split a listing into consecutive rows of `column_count` items.
///
/// Pure layout helper, no I/O. The final row may be short and is kept as-is,
/// never padded or dropped. `column_count` of zero is `InvalidInput`.
pub fn partition_into_rows<T>(items: Vec<T>, column_count: usize) -> Result<Vec<Vec<T>>> {
    if column_count == 0 {
        return Err(TrackerError::InvalidInput(
            "column count must be at least 1".to_string(),
        ));
    }

    let mut rows: Vec<Vec<T>> = Vec::with_capacity(items.len().div_ceil(column_count));
    for item in items {
        match rows.last_mut() {
            Some(row) if row.len() < column_count => row.push(item),
            _ => rows.push(vec![item]),
        }
    }
    Ok(rows)
}
