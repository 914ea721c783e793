//! Curation service: validated add/remove of tracked artists and title skip
//! sequences.
//!
//! Requests arrive in a free-form, form-shaped payload; they are converted
//! into the closed `CurationRequest` enum at the boundary, so an unknown or
//! incomplete action never reaches the store. Malformed input is a silent
//! no-op; only a real uniqueness violation surfaces as an error.

use crate::database;
use crate::error::{Result, TrackerError};
use rusqlite::Connection;
use serde::Deserialize;

/// Form-shaped curation payload, as posted by the web UI.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CurationForm {
    pub action: Option<String>,
    pub name: Option<String>,
    pub site: Option<String>,
    pub sequence: Option<String>,
    pub selected_artist: Option<String>,
}

/// A validated curation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CurationRequest {
    AddArtist { name: String, site: String },
    RemoveArtist { name: String },
    AddSkipSequence { artist: String, sequence: String },
    RemoveSkipSequence { artist: String, sequence: String },
}

impl CurationRequest {
    /// Build a request from the form payload.
    ///
    /// Returns `None` for unknown actions or missing fields - the caller
    /// treats that as a no-op, mirroring how a malformed form submission is
    /// simply ignored.
    pub fn from_form(form: &CurationForm) -> Option<Self> {
        let action = form.action.as_deref()?;
        match action {
            "AddArtist" => Some(CurationRequest::AddArtist {
                name: form.name.clone()?,
                site: form.site.clone()?,
            }),
            "RemoveArtist" => Some(CurationRequest::RemoveArtist {
                // The form posts the currently selected artist
                name: form.name.clone().or_else(|| form.selected_artist.clone())?,
            }),
            "AddSkipSequence" => Some(CurationRequest::AddSkipSequence {
                artist: form.selected_artist.clone()?,
                sequence: form.sequence.clone()?,
            }),
            "RemoveSkipSequence" => Some(CurationRequest::RemoveSkipSequence {
                artist: form.selected_artist.clone()?,
                sequence: form.sequence.clone()?,
            }),
            _ => None,
        }
    }
}

/// What a handled request did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurationOutcome {
    /// The mutation was applied (idempotent deletes included)
    Applied,
    /// Input was blank or malformed; state untouched
    Ignored,
}

/// Hook invoked with (name, site) after an artist was successfully added.
pub type PostAddHook = Box<dyn Fn(&str, &str) + Send + Sync>;

/// Curation service for one configured source site.
///
/// Removal always targets the configured site; multi-site removal is not
/// supported.
pub struct Curation {
    site: String,
    post_add: Option<PostAddHook>,
}

impl Curation {
    pub fn new(site: impl Into<String>) -> Self {
        Curation {
            site: site.into(),
            post_add: None,
        }
    }

    /// Register a hook to run after each successful artist add. Seam for
    /// future side effects such as triggering an initial scrape.
    pub fn with_post_add_hook(mut self, hook: PostAddHook) -> Self {
        self.post_add = Some(hook);
        self
    }

    /// The configured source site.
    pub fn site(&self) -> &str {
        &self.site
    }

    /// Apply a curation request.
    ///
    /// Blank-after-trim input yields `Ignored` without touching the store.
    /// Deleting something that is not there is `Applied` (idempotent).
    /// `DuplicateArtist` and storage failures propagate to the caller.
    pub fn handle(&self, conn: &mut Connection, request: CurationRequest) -> Result<CurationOutcome> {
        match request {
            CurationRequest::AddArtist { name, site } => {
                let name = name.trim();
                let site = site.trim();
                if name.is_empty() || site.is_empty() {
                    log::debug!("Ignoring add-artist request with blank fields");
                    return Ok(CurationOutcome::Ignored);
                }
                database::add_artist(conn, name, site)?;
                if let Some(hook) = &self.post_add {
                    hook(name, site);
                }
                Ok(CurationOutcome::Applied)
            }
            CurationRequest::RemoveArtist { name } => {
                let name = name.trim();
                if name.is_empty() {
                    log::debug!("Ignoring remove-artist request with blank name");
                    return Ok(CurationOutcome::Ignored);
                }
                database::remove_artist(conn, name, &self.site)?;
                Ok(CurationOutcome::Applied)
            }
            CurationRequest::AddSkipSequence { artist, sequence } => {
                let artist = artist.trim();
                let sequence = sequence.trim();
                if artist.is_empty() || sequence.is_empty() {
                    log::debug!("Ignoring add-skip request with blank fields");
                    return Ok(CurationOutcome::Ignored);
                }
                match database::add_skip_sequence(conn, artist, &self.site, sequence) {
                    Ok(()) => Ok(CurationOutcome::Applied),
                    Err(TrackerError::InvalidInput(_)) => Ok(CurationOutcome::Ignored),
                    Err(e) => Err(e),
                }
            }
            CurationRequest::RemoveSkipSequence { artist, sequence } => {
                let artist = artist.trim();
                let sequence = sequence.trim();
                if artist.is_empty() || sequence.is_empty() {
                    log::debug!("Ignoring remove-skip request with blank fields");
                    return Ok(CurationOutcome::Ignored);
                }
                database::remove_skip_sequence(conn, artist, &self.site, sequence)?;
                Ok(CurationOutcome::Applied)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{init_schema, list_artist_names, list_skip_sequences};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    fn curation() -> Curation {
        Curation::new("melonbooks")
    }

    fn add_artist_request(name: &str) -> CurationRequest {
        CurationRequest::AddArtist {
            name: name.to_string(),
            site: "melonbooks".to_string(),
        }
    }

    #[test]
    fn add_then_duplicate_then_remove() {
        let mut conn = test_db();
        let curation = curation();

        let outcome = curation.handle(&mut conn, add_artist_request("Yui")).unwrap();
        assert_eq!(outcome, CurationOutcome::Applied);

        let err = curation.handle(&mut conn, add_artist_request("Yui")).unwrap_err();
        assert!(matches!(err, TrackerError::DuplicateArtist { .. }));
        assert_eq!(list_artist_names(&conn, "melonbooks").unwrap(), vec!["Yui"]);

        let outcome = curation
            .handle(&mut conn, CurationRequest::RemoveArtist { name: "Yui".to_string() })
            .unwrap();
        assert_eq!(outcome, CurationOutcome::Applied);
        assert!(list_artist_names(&conn, "melonbooks").unwrap().is_empty());
    }

    #[test]
    fn blank_fields_are_ignored_without_mutation() {
        let mut conn = test_db();
        let curation = curation();

        let outcome = curation
            .handle(
                &mut conn,
                CurationRequest::AddArtist {
                    name: "   ".to_string(),
                    site: "melonbooks".to_string(),
                },
            )
            .unwrap();
        assert_eq!(outcome, CurationOutcome::Ignored);

        let outcome = curation
            .handle(
                &mut conn,
                CurationRequest::AddSkipSequence {
                    artist: "Yui".to_string(),
                    sequence: "".to_string(),
                },
            )
            .unwrap();
        assert_eq!(outcome, CurationOutcome::Ignored);

        assert!(list_artist_names(&conn, "melonbooks").unwrap().is_empty());
    }

    #[test]
    fn removing_absent_artist_is_applied_noop() {
        let mut conn = test_db();
        let outcome = curation()
            .handle(&mut conn, CurationRequest::RemoveArtist { name: "Nobody".to_string() })
            .unwrap();
        assert_eq!(outcome, CurationOutcome::Applied);
    }

    #[test]
    fn skip_sequences_are_scoped_to_configured_site() {
        let mut conn = test_db();
        let curation = curation();
        curation.handle(&mut conn, add_artist_request("Yui")).unwrap();
        curation
            .handle(
                &mut conn,
                CurationRequest::AddSkipSequence {
                    artist: "Yui".to_string(),
                    sequence: "  badge  ".to_string(),
                },
            )
            .unwrap();
        assert_eq!(
            list_skip_sequences(&conn, "Yui", "melonbooks").unwrap(),
            vec!["badge"]
        );

        curation
            .handle(
                &mut conn,
                CurationRequest::RemoveSkipSequence {
                    artist: "Yui".to_string(),
                    sequence: "badge".to_string(),
                },
            )
            .unwrap();
        assert!(list_skip_sequences(&conn, "Yui", "melonbooks").unwrap().is_empty());
    }

    #[test]
    fn post_add_hook_fires_on_successful_add_only() {
        let mut conn = test_db();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let curation = Curation::new("melonbooks").with_post_add_hook(Box::new(move |name, site| {
            assert_eq!(name, "Yui");
            assert_eq!(site, "melonbooks");
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        curation.handle(&mut conn, add_artist_request("Yui")).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // Duplicate add fails, hook must not fire again
        let _ = curation.handle(&mut conn, add_artist_request("Yui"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // Blank input is ignored, hook must not fire
        curation
            .handle(
                &mut conn,
                CurationRequest::AddArtist { name: " ".to_string(), site: "melonbooks".to_string() },
            )
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn from_form_builds_known_actions() {
        let form = CurationForm {
            action: Some("AddArtist".to_string()),
            name: Some("Yui".to_string()),
            site: Some("melonbooks".to_string()),
            ..Default::default()
        };
        assert_eq!(
            CurationRequest::from_form(&form),
            Some(CurationRequest::AddArtist {
                name: "Yui".to_string(),
                site: "melonbooks".to_string()
            })
        );

        let form = CurationForm {
            action: Some("RemoveArtist".to_string()),
            selected_artist: Some("Yui".to_string()),
            ..Default::default()
        };
        assert_eq!(
            CurationRequest::from_form(&form),
            Some(CurationRequest::RemoveArtist { name: "Yui".to_string() })
        );

        let form = CurationForm {
            action: Some("AddSkipSequence".to_string()),
            selected_artist: Some("Yui".to_string()),
            sequence: Some("badge".to_string()),
            ..Default::default()
        };
        assert_eq!(
            CurationRequest::from_form(&form),
            Some(CurationRequest::AddSkipSequence {
                artist: "Yui".to_string(),
                sequence: "badge".to_string()
            })
        );
    }

    #[test]
    fn from_form_rejects_unknown_or_incomplete_actions() {
        // Unknown action text
        let form = CurationForm {
            action: Some("DropTables".to_string()),
            name: Some("Yui".to_string()),
            ..Default::default()
        };
        assert_eq!(CurationRequest::from_form(&form), None);

        // Missing action entirely
        assert_eq!(CurationRequest::from_form(&CurationForm::default()), None);

        // AddSkipSequence without a selected artist
        let form = CurationForm {
            action: Some("AddSkipSequence".to_string()),
            sequence: Some("badge".to_string()),
            ..Default::default()
        };
        assert_eq!(CurationRequest::from_form(&form), None);
    }
}
