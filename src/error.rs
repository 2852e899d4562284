use thiserror::Error;

/// Failure taxonomy of the console.
///
/// A superseded page fetch is not a failure and has no variant here; see
/// `list::ApplyOutcome`.
#[derive(Debug, Error)]
pub enum ReviewError {
    /// Fatal. Login happens once per process; the only recovery is a restart.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),
    /// Fatal at page scope. No partial list is rendered for the page.
    #[error("failed to fetch review list: {0}")]
    ListFetchFailed(String),
    /// Scoped to one item and retryable by re-submitting the decision.
    #[error("review submission failed for post {post_id}: {reason}")]
    ItemReviewFailed { post_id: String, reason: String },
}

impl ReviewError {
    pub fn item(post_id: &str, reason: impl ToString) -> Self {
        Self::ItemReviewFailed {
            post_id: post_id.to_string(),
            reason: reason.to_string(),
        }
    }
}
