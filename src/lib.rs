/// The main library module for aptrank
// Debug macro for consistent debug output
#[macro_export]
macro_rules! debug_print {
    ($self:expr, $($arg:tt)*) => {
        if $crate::config::is_global_debug_enabled() {
            eprintln!("DEBUG: {}", format!($($arg)*));
        }
    };
}

pub mod catalog;
pub mod config;
pub mod display;
pub mod encoder;
pub mod error;
pub mod evaluate;
pub mod index;
pub mod init;
pub mod io;
pub mod retrieve;

// Explicit exports for better API clarity
pub use catalog::{AssessmentCategory, AssessmentRecord, CatalogOrigin, CatalogStore};
pub use config::Settings;
pub use encoder::{EMBEDDING_DIMENSION, EncodeError, FastEmbedEncoder, TextEncoder};
pub use error::{ErrorContext, RecommendError, RecommendResult};
pub use evaluate::{EvaluationSummary, Evaluator, QueryRecall, SubmissionRow};
pub use index::{BuildOutcome, FlatIndex, IndexBuilder, SearchHit, Snapshot};
pub use retrieve::{MAX_RESULTS, MIN_RESULTS, RankedCandidate, Recommendation, Recommender};
