use futures::future::join;
use log::{error, info};

use crate::{
    api::{PostUpdate, ReviewApi},
    post::{playable_url, Post, ReviewDecision},
};

/// Values written back on every approved or rejected post. Fixed by the
/// moderation workflow.
const COMMENT_PERMISSION: u32 = 1;
const PROTECTION_LV: u32 = 1;

/// What a submission attempt did to the item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Both calls succeeded; the decision is now terminal.
    Committed(ReviewDecision),
    /// At least one call failed; the item stays pending and editable.
    Retryable,
    /// The item was already submitting or already decided. No calls fired.
    Ignored,
}

//==============================================================================
// Item review controller
//==============================================================================

/// Review state of one listed post.
///
/// Pending --submit ok--> Approved | Rejected (terminal)
/// Pending --submit err--> Pending (retryable)
#[derive(Debug, Clone)]
pub struct ItemReview {
    post: Post,
    playable: Option<String>,
    decision: ReviewDecision,
    submitting: bool,
    complete: bool,
}

impl ItemReview {
    pub fn new(post: Post) -> Self {
        let playable = match post.web_vtt_url.is_empty() {
            true => None,
            false => Some(playable_url(&post.web_vtt_url)),
        };
        Self {
            post,
            playable,
            decision: ReviewDecision::Pending,
            submitting: false,
            complete: false,
        }
    }

    pub fn post(&self) -> &Post {
        &self.post
    }

    pub fn decision(&self) -> ReviewDecision {
        self.decision
    }

    pub fn submitting(&self) -> bool {
        self.submitting
    }

    /// Whether a new decision may be submitted for this item.
    pub fn editable(&self) -> bool {
        !self.submitting && !self.complete
    }

    /// Playable rendition of the preview, if the post carries one.
    pub fn playable_url(&self) -> Option<&str> {
        self.playable.as_deref()
    }

    /// Submit a decision. The review-status call and the metadata update are
    /// issued together and the decision commits only if both succeed. A
    /// failure leaves the item pending and resubmittable; it is logged, not
    /// surfaced.
    pub async fn submit(
        &mut self,
        api: &impl ReviewApi,
        decision: ReviewDecision,
    ) -> SubmitOutcome {
        if !decision.is_terminal() || !self.editable() {
            return SubmitOutcome::Ignored;
        }

        self.submitting = true;
        let update = self.update_body();
        let (status, metadata) = join(
            api.set_review_status(&self.post.id, decision),
            api.update_post(&update),
        )
        .await;
        self.submitting = false;

        match status.and(metadata) {
            Ok(()) => {
                self.decision = decision;
                self.complete = true;
                info!("Review committed for {} ({})", self.post.id, decision.label());
                SubmitOutcome::Committed(decision)
            }
            Err(err) => {
                error!("Review submission failed: {err}");
                SubmitOutcome::Retryable
            }
        }
    }

    fn update_body(&self) -> PostUpdate {
        PostUpdate {
            comment_permission: COMMENT_PERMISSION,
            content: self.post.content.clone(),
            creator_id: self.post.creator_id.clone(),
            post_id: self.post.id.clone(),
            protection_lv: PROTECTION_LV,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::api::testing::{post, FakeApi};

    #[tokio::test]
    async fn joint_success_commits_and_locks_the_item() {
        let api = FakeApi::default();
        let mut item = ItemReview::new(post("p-1", "https://x/imageSprite1"));

        let outcome = item.submit(&api, ReviewDecision::Approved).await;

        assert_eq!(outcome, SubmitOutcome::Committed(ReviewDecision::Approved));
        assert_eq!(item.decision(), ReviewDecision::Approved);
        assert!(!item.editable());
        assert_eq!(api.status_calls.load(Ordering::SeqCst), 1);
        assert_eq!(api.update_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn a_failed_status_call_leaves_the_item_pending_and_editable() {
        let api = FakeApi {
            fail_status: true,
            ..FakeApi::default()
        };
        let mut item = ItemReview::new(post("p-1", "https://x/a.mp4"));

        let outcome = item.submit(&api, ReviewDecision::Rejected).await;

        assert_eq!(outcome, SubmitOutcome::Retryable);
        assert_eq!(item.decision(), ReviewDecision::Pending);
        assert!(item.editable());
        assert!(!item.submitting());
        // both halves of the pair were still attempted
        assert_eq!(api.status_calls.load(Ordering::SeqCst), 1);
        assert_eq!(api.update_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn a_failed_metadata_call_leaves_the_item_pending_and_editable() {
        let api = FakeApi {
            fail_update: true,
            ..FakeApi::default()
        };
        let mut item = ItemReview::new(post("p-1", "https://x/a.mp4"));

        let outcome = item.submit(&api, ReviewDecision::Approved).await;

        assert_eq!(outcome, SubmitOutcome::Retryable);
        assert_eq!(item.decision(), ReviewDecision::Pending);
        assert!(item.editable());
    }

    #[tokio::test]
    async fn a_retryable_item_can_be_resubmitted_and_then_commits() {
        let mut item = ItemReview::new(post("p-1", "https://x/a.mp4"));

        let failing = FakeApi {
            fail_update: true,
            ..FakeApi::default()
        };
        assert_eq!(
            item.submit(&failing, ReviewDecision::Approved).await,
            SubmitOutcome::Retryable
        );

        let api = FakeApi::default();
        assert_eq!(
            item.submit(&api, ReviewDecision::Approved).await,
            SubmitOutcome::Committed(ReviewDecision::Approved)
        );
    }

    #[tokio::test]
    async fn terminal_items_ignore_further_submissions() {
        let api = FakeApi::default();
        let mut item = ItemReview::new(post("p-1", "https://x/a.mp4"));

        item.submit(&api, ReviewDecision::Rejected).await;
        let outcome = item.submit(&api, ReviewDecision::Approved).await;

        assert_eq!(outcome, SubmitOutcome::Ignored);
        assert_eq!(item.decision(), ReviewDecision::Rejected);
        // no further network traffic once decided
        assert_eq!(api.status_calls.load(Ordering::SeqCst), 1);
        assert_eq!(api.update_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn submitting_pending_is_a_no_op() {
        let api = FakeApi::default();
        let mut item = ItemReview::new(post("p-1", "https://x/a.mp4"));

        let outcome = item.submit(&api, ReviewDecision::Pending).await;

        assert_eq!(outcome, SubmitOutcome::Ignored);
        assert_eq!(api.status_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn the_update_body_fixes_the_workflow_constants() {
        let item = ItemReview::new(post("p-7", "https://x/a.mp4"));
        let update = item.update_body();
        assert_eq!(update.comment_permission, 1);
        assert_eq!(update.protection_lv, 1);
        assert_eq!(update.post_id, "p-7");
        assert_eq!(update.creator_id, "creator-p-7");
        assert_eq!(update.content, "content of p-7");
    }

    #[test]
    fn items_without_a_preview_have_no_playable_url() {
        let item = ItemReview::new(post("p-1", ""));
        assert!(item.playable_url().is_none());

        let item = ItemReview::new(post("p-2", "https://x/imageSprite9"));
        assert_eq!(item.playable_url(), Some("https://x/v.f1484071.mp4"));
    }
}
