//! Assessment catalog: record model, acquisition, and persistence.

pub mod record;
pub mod source;
pub mod store;

pub use record::{AssessmentCategory, AssessmentRecord};
pub use source::{builtin_catalog, load_catalog, load_catalog_csv, CatalogOrigin};
pub use store::{CatalogStore, CATALOG_FILE};

use sha2::{Digest, Sha256};

/// Calculate a SHA256 fingerprint over the catalog content.
///
/// Covers URLs and embedding texts in positional order, so any change to
/// record content, ordering, or count produces a different fingerprint.
/// Builds compare this against the stored artifact to detect staleness.
pub fn catalog_fingerprint(records: &[AssessmentRecord]) -> String {
    let mut hasher = Sha256::new();
    for record in records {
        hasher.update(record.url.as_bytes());
        hasher.update(b"\n");
        hasher.update(record.embedding_text().as_bytes());
        hasher.update(b"\n");
    }
    format!("{:x}", hasher.finalize())
}
