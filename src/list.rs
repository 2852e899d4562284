use std::sync::Arc;

use log::debug;
use rand::Rng;
use tokio::task::AbortHandle;

use crate::{
    api::{PostPage, ReviewApi},
    config::BrowseMode,
    error::ReviewError,
    review::ItemReview,
};

pub const PAGE_SIZE: u32 = 20;

//==============================================================================
// Page state
//==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    current: u32,
    total_items: u64,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            current: 1,
            total_items: 0,
        }
    }
}

impl PageState {
    pub const fn current(&self) -> u32 {
        self.current
    }

    pub const fn total_items(&self) -> u64 {
        self.total_items
    }

    pub fn total_pages(&self) -> u32 {
        self.total_items.div_ceil(PAGE_SIZE as u64) as u32
    }

    /// Clamp a navigation target into `[1, total_pages]`.
    pub fn clamp(&self, page: u32) -> u32 {
        page.clamp(1, self.total_pages().max(1))
    }

    pub fn has_prev(&self) -> bool {
        self.current > 1
    }

    pub fn has_next(&self) -> bool {
        self.current < self.total_pages()
    }
}

/// Uniform page draw for the random-sample browsing mode.
pub fn sample_page(total_pages: u32, rng: &mut impl Rng) -> u32 {
    rng.gen_range(1..=total_pages.max(1))
}

/// Whether a fetched page made it onto the screen. A superseded response is
/// dropped silently; it is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    Superseded,
}

//==============================================================================
// List controller
//==============================================================================

/// Owns the visible page of review items. Every page change opens a new
/// fetch generation and aborts the previous in-flight fetch; a response from
/// an old generation is never applied.
#[derive(Debug)]
pub struct ListController<A> {
    api: Arc<A>,
    mode: BrowseMode,
    page: PageState,
    items: Vec<ItemReview>,
    generation: u64,
    inflight: Option<AbortHandle>,
}

impl<A: ReviewApi + Send + Sync + 'static> ListController<A> {
    pub fn new(api: Arc<A>, mode: BrowseMode) -> Self {
        Self {
            api,
            mode,
            page: PageState::default(),
            items: Vec::new(),
            generation: 0,
            inflight: None,
        }
    }

    pub fn page(&self) -> &PageState {
        &self.page
    }

    pub fn mode(&self) -> BrowseMode {
        self.mode
    }

    pub fn items(&self) -> &[ItemReview] {
        &self.items
    }

    /// Item by 1-based display index.
    pub fn item(&self, index: usize) -> Option<&ItemReview> {
        self.items.get(index.checked_sub(1)?)
    }

    pub fn item_mut(&mut self, index: usize) -> Option<&mut ItemReview> {
        self.items.get_mut(index.checked_sub(1)?)
    }

    /// Navigate to a page and fetch it. In random-sample mode a successful
    /// fetch is followed by one uniform jump drawn from the fresh total, and
    /// the landed page is what ends up visible.
    pub async fn change_page(
        &mut self,
        page: u32,
        rng: &mut impl Rng,
    ) -> Result<ApplyOutcome, ReviewError> {
        let target = self.target_page(page);
        let outcome = self.fetch_into(target).await?;
        if let ApplyOutcome::Superseded = outcome {
            return Ok(outcome);
        }

        if let BrowseMode::RandomSample = self.mode {
            let total_pages = self.page.total_pages();
            if total_pages > 1 {
                let jump = sample_page(total_pages, rng);
                debug!("Sampling page {jump} of {total_pages}");
                return self.fetch_into(jump).await;
            }
        }

        Ok(outcome)
    }

    async fn fetch_into(&mut self, page: u32) -> Result<ApplyOutcome, ReviewError> {
        let tag = self.supersede();
        debug!("Fetching page {page}");

        let task = tokio::spawn({
            let api = Arc::clone(&self.api);
            async move { api.fetch_page(page, PAGE_SIZE).await }
        });
        self.inflight = Some(task.abort_handle());

        let result = match task.await {
            Ok(result) => result,
            Err(join_error) if join_error.is_cancelled() => return Ok(ApplyOutcome::Superseded),
            Err(join_error) => return Err(ReviewError::ListFetchFailed(join_error.to_string())),
        };
        self.inflight = None;

        match result {
            Ok(fetched) => Ok(self.apply_fetch(tag, page, fetched)),
            Err(err) => {
                // page-scope failure, no partial list stays visible
                self.items.clear();
                Err(err)
            }
        }
    }

    /// Invalidate interest in any in-flight fetch and open a new generation.
    /// Cancellation is advisory; the aborted request may still complete
    /// server-side, its response just never lands.
    fn supersede(&mut self) -> u64 {
        if let Some(inflight) = self.inflight.take() {
            inflight.abort();
        }
        self.generation += 1;
        self.generation
    }

    fn apply_fetch(&mut self, tag: u64, page: u32, fetched: PostPage) -> ApplyOutcome {
        if tag != self.generation {
            debug!("Dropping superseded response for page {page}");
            return ApplyOutcome::Superseded;
        }

        self.page.current = page;
        self.page.total_items = fetched.page_result.total;
        self.items = fetched
            .data
            .into_iter()
            .filter(|post| !post.web_vtt_url.is_empty())
            .map(ItemReview::new)
            .collect();
        ApplyOutcome::Applied
    }

    /// Before the first fetch the total is unknown and the requested page is
    /// taken as-is; afterwards targets are clamped into range.
    fn target_page(&self, page: u32) -> u32 {
        match self.page.total_items {
            0 => page.max(1),
            _ => self.page.clamp(page),
        }
    }
}
