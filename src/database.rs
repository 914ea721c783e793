//! Catalog store: all SQL for artists, products and title skip sequences.
//!
//! Uses parameterized queries exclusively (no SQL string concatenation).
//! Multi-statement writes are transactional. Each function is a single
//! logical unit; callers hold the connection.

use crate::error::{Result, TrackerError};
use crate::models::{Availability, Product};
use rusqlite::{params, Connection, Row};

/// Result type for plain database operations
pub type DbResult<T> = rusqlite::Result<T>;

/// Initialize the database schema
///
/// Creates tables if they don't exist:
/// - `artists`: tracked artists, unique per (name, site)
/// - `products`: scraped listings keyed by url
/// - `title_skip_sequences`: per-artist title substrings to suppress
pub fn init_schema(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS artists (
            name TEXT NOT NULL,
            site TEXT NOT NULL,
            PRIMARY KEY (name, site)
        );

        CREATE TABLE IF NOT EXISTS products (
            url          TEXT NOT NULL PRIMARY KEY,
            title        TEXT NOT NULL,
            artist       TEXT NOT NULL,
            site         TEXT NOT NULL,
            img_url      TEXT NOT NULL,
            date_added   TEXT NOT NULL,
            availability TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_products_artist ON products(artist, site);
        CREATE INDEX IF NOT EXISTS idx_products_availability ON products(availability);

        -- No FK: cascade to skip sequences is handled explicitly in remove_artist
        CREATE TABLE IF NOT EXISTS title_skip_sequences (
            artist   TEXT NOT NULL,
            site     TEXT NOT NULL,
            sequence TEXT NOT NULL
        );
        ",
    )?;

    log::info!("Database schema initialized");
    Ok(())
}

/// True when the error is a primary key / uniqueness violation.
fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

// ── Artists ────────────────────────────────────────────────────────────────

/// Track a new artist for a site.
///
/// `name` is trimmed before insertion. Blank name or site is `InvalidInput`;
/// an existing (name, site) pair is `DuplicateArtist`.
pub fn add_artist(conn: &Connection, name: &str, site: &str) -> Result<()> {
    let name = name.trim();
    let site = site.trim();
    if name.is_empty() || site.is_empty() {
        return Err(TrackerError::InvalidInput(
            "artist name and site must be non-blank".to_string(),
        ));
    }

    let res = conn.execute(
        "INSERT INTO artists (name, site) VALUES (?1, ?2)",
        params![name, site],
    );
    match res {
        Ok(_) => {
            log::info!("Tracking artist '{}' on {}", name, site);
            Ok(())
        }
        Err(e) if is_constraint_violation(&e) => Err(TrackerError::DuplicateArtist {
            name: name.to_string(),
            site: site.to_string(),
        }),
        Err(e) => Err(e.into()),
    }
}

/// Stop tracking an artist.
///
/// Deletes the exact (name, site) row and, in the same transaction, the
/// artist's skip sequences. Deleting a missing artist is a no-op.
pub fn remove_artist(conn: &mut Connection, name: &str, site: &str) -> DbResult<()> {
    let tx = conn.transaction()?;
    let removed = tx.execute(
        "DELETE FROM artists WHERE name = ?1 AND site = ?2",
        params![name, site],
    )?;
    tx.execute(
        "DELETE FROM title_skip_sequences WHERE artist = ?1 AND site = ?2",
        params![name, site],
    )?;
    tx.commit()?;

    if removed > 0 {
        log::info!("Removed artist '{}' from {}", name, site);
    } else {
        log::debug!("Remove artist '{}' on {}: no matching row", name, site);
    }
    Ok(())
}

/// Names of all tracked artists for a site, in table scan order.
pub fn list_artist_names(conn: &Connection, site: &str) -> DbResult<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM artists WHERE site = ?1")?;
    let rows: DbResult<Vec<String>> = stmt
        .query_map(params![site], |row| row.get(0))?
        .collect();
    rows
}

// ── Title skip sequences ───────────────────────────────────────────────────

/// Add a title substring to suppress for an artist.
///
/// Blank sequence after trimming is `InvalidInput`. Duplicates are not
/// rejected at this level.
pub fn add_skip_sequence(conn: &Connection, artist: &str, site: &str, sequence: &str) -> Result<()> {
    let sequence = sequence.trim();
    if sequence.is_empty() {
        return Err(TrackerError::InvalidInput(
            "skip sequence must be non-blank".to_string(),
        ));
    }
    conn.execute(
        "INSERT INTO title_skip_sequences (artist, site, sequence) VALUES (?1, ?2, ?3)",
        params![artist, site, sequence],
    )?;
    log::info!("Added skip sequence '{}' for '{}' on {}", sequence, artist, site);
    Ok(())
}

/// Remove an exactly matching skip sequence. No-op when absent.
pub fn remove_skip_sequence(
    conn: &Connection,
    artist: &str,
    site: &str,
    sequence: &str,
) -> DbResult<()> {
    conn.execute(
        "DELETE FROM title_skip_sequences WHERE artist = ?1 AND site = ?2 AND sequence = ?3",
        params![artist, site, sequence],
    )?;
    Ok(())
}

/// Skip sequences stored for an artist, in table scan order.
pub fn list_skip_sequences(conn: &Connection, artist: &str, site: &str) -> DbResult<Vec<String>> {
    let mut stmt = conn
        .prepare("SELECT sequence FROM title_skip_sequences WHERE artist = ?1 AND site = ?2")?;
    let rows: DbResult<Vec<String>> = stmt
        .query_map(params![artist, site], |row| row.get(0))?
        .collect();
    rows
}

/// True when any stored sequence for the artist is a substring of `title`.
pub fn title_contains_skip_sequence(
    conn: &Connection,
    artist: &str,
    site: &str,
    title: &str,
) -> DbResult<bool> {
    let mut stmt = conn.prepare(
        "SELECT 1 FROM title_skip_sequences
         WHERE artist = ?1 AND site = ?2 AND instr(?3, sequence) > 0",
    )?;
    stmt.exists(params![artist, site, title])
}

// ── Products (written by the external scraper) ─────────────────────────────

/// Map a product row in the fixed column order used by every SELECT here.
pub(crate) fn product_from_row(row: &Row<'_>) -> rusqlite::Result<Product> {
    let date: String = row.get(5)?;
    let availability: String = row.get(6)?;
    Ok(Product {
        url: row.get(0)?,
        title: row.get(1)?,
        artist: row.get(2)?,
        site: row.get(3)?,
        img_url: row.get(4)?,
        date_added: date.parse().map_err(|e: chrono::ParseError| {
            rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
        })?,
        availability: Availability::from(availability.as_str()),
    })
}

/// Insert a batch of products, ignoring urls already present.
///
/// Returns the number of newly inserted rows. All inserts happen in one
/// transaction.
pub fn insert_products(conn: &mut Connection, products: &[Product]) -> DbResult<usize> {
    let tx = conn.transaction()?;
    let mut inserted = 0;
    {
        let mut stmt = tx.prepare_cached(
            "INSERT OR IGNORE INTO products
             (url, title, artist, site, img_url, date_added, availability)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?;
        for product in products {
            inserted += stmt.execute(params![
                &product.url,
                &product.title,
                &product.artist,
                &product.site,
                &product.img_url,
                product.date_added.to_string(),
                product.availability.to_string(),
            ])?;
        }
    }
    tx.commit()?;

    log::info!("Inserted {} of {} products", inserted, products.len());
    Ok(inserted)
}

/// Update the availability of a stored product. No-op for unknown urls.
pub fn update_availability(
    conn: &Connection,
    url: &str,
    availability: &Availability,
) -> DbResult<()> {
    conn.execute(
        "UPDATE products SET availability = ?2 WHERE url = ?1",
        params![url, availability.to_string()],
    )?;
    Ok(())
}

/// True when a product with this url is already stored.
pub fn contains_product(conn: &Connection, url: &str) -> DbResult<bool> {
    let mut stmt = conn.prepare("SELECT 1 FROM products WHERE url = ?1")?;
    stmt.exists(params![url])
}
