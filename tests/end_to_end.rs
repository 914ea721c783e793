use chrono::NaiveDate;
use melonbooks_tracker::curation::{Curation, CurationOutcome, CurationRequest};
use melonbooks_tracker::database::{init_schema, insert_products, list_artist_names};
use melonbooks_tracker::query::{list_products, partition_into_rows, ProductFilter};
use melonbooks_tracker::{Availability, Product, TrackerError};
use rusqlite::Connection;
use tempfile::TempDir;

fn open_db(dir: &TempDir) -> Connection {
    let conn = Connection::open(dir.path().join("melonbooks.db")).unwrap();
    init_schema(&conn).unwrap();
    conn
}

fn product(url: &str, artist: &str, day: u32, availability: Availability) -> Product {
    Product {
        url: url.to_string(),
        title: format!("title {}", url),
        artist: artist.to_string(),
        site: "melonbooks".to_string(),
        img_url: "img".to_string(),
        date_added: NaiveDate::from_ymd_opt(2026, 2, day).unwrap(),
        availability,
    }
}

#[test]
fn curation_lifecycle_on_a_fresh_store() {
    let dir = TempDir::new().unwrap();
    let mut conn = open_db(&dir);
    let curation = Curation::new("melonbooks");

    let add_yui = || CurationRequest::AddArtist {
        name: "Yui".to_string(),
        site: "melonbooks".to_string(),
    };

    assert_eq!(
        curation.handle(&mut conn, add_yui()).unwrap(),
        CurationOutcome::Applied
    );
    assert!(matches!(
        curation.handle(&mut conn, add_yui()).unwrap_err(),
        TrackerError::DuplicateArtist { .. }
    ));
    assert_eq!(list_artist_names(&conn, "melonbooks").unwrap(), vec!["Yui"]);

    curation
        .handle(&mut conn, CurationRequest::RemoveArtist { name: "Yui".to_string() })
        .unwrap();
    assert!(list_artist_names(&conn, "melonbooks").unwrap().is_empty());
}

#[test]
fn listing_pipeline_from_scraper_writes_to_row_groups() {
    let dir = TempDir::new().unwrap();
    let mut conn = open_db(&dir);

    // The external scraper writes through the same contract
    insert_products(
        &mut conn,
        &[
            product("u1?product_id=100", "mafuyu", 1, Availability::Available),
            product("u2?product_id=200", "mafuyu", 1, Availability::Preorder),
            product("u3?product_id=300", "mafuyu", 2, Availability::Available),
            product("u4?product_id=400", "mafuyu", 2, Availability::NotAvailable),
            product("u5?product_id=500", "kantoku", 2, Availability::Other("Weird".into())),
            product("u6?product_id=600", "kantoku", 3, Availability::Available),
        ],
    )
    .unwrap();

    let listed = list_products(&conn, &ProductFilter::default()).unwrap();
    let urls: Vec<&str> = listed.iter().map(|p| p.url.as_str()).collect();
    // Newest date first, embedded id breaks the same-day tie
    assert_eq!(
        urls,
        vec![
            "u6?product_id=600",
            "u3?product_id=300",
            "u2?product_id=200",
            "u1?product_id=100",
        ]
    );

    let rows = partition_into_rows(listed, 3).unwrap();
    let sizes: Vec<usize> = rows.iter().map(|r| r.len()).collect();
    assert_eq!(sizes, vec![3, 1]);
}
