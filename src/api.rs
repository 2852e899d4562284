use std::{future::Future, sync::OnceLock};

use log::debug;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{
    config::Config,
    error::ReviewError,
    post::{Post, ReviewDecision},
    session::Credential,
};

/// Server-side filter for the pending queue. Opaque codes, passed through
/// unchanged.
const PROTECTION_LV_FILTER: u32 = 2;
const DATE_RANGE_TYPE: u32 = 1;
const REVIEW_STATUS_PENDING: u32 = 1;

//==============================================================================
// Wire types
//==============================================================================

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(default)]
    pub access_token: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct PostPage {
    #[serde(default)]
    pub data: Vec<Post>,
    #[serde(default)]
    pub page_result: PageResult,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct PageResult {
    #[serde(default)]
    pub total: u64,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
struct ReviewBody<'a> {
    #[serde(rename = "postIDs")]
    post_ids: [&'a str; 1],
    review_status: i32,
}

/// Metadata written back alongside every review decision. The creator id is
/// spelled `memberID` on this endpoint.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PostUpdate {
    pub comment_permission: u32,
    pub content: String,
    #[serde(rename = "memberID")]
    pub creator_id: String,
    #[serde(rename = "postID")]
    pub post_id: String,
    #[serde(rename = "protectionLv")]
    pub protection_lv: u32,
}

//==============================================================================
// Client
//==============================================================================

/// Everything the controllers need from the remote admin API. The console is
/// generic over this so the state machines can be exercised without a server.
pub trait ReviewApi {
    fn login(
        &self,
        credential: &Credential,
    ) -> impl Future<Output = Result<LoginResponse, ReviewError>> + Send;

    fn fetch_page(
        &self,
        page: u32,
        page_size: u32,
    ) -> impl Future<Output = Result<PostPage, ReviewError>> + Send;

    fn set_review_status(
        &self,
        post_id: &str,
        decision: ReviewDecision,
    ) -> impl Future<Output = Result<(), ReviewError>> + Send;

    fn update_post(
        &self,
        update: &PostUpdate,
    ) -> impl Future<Output = Result<(), ReviewError>> + Send;
}

#[derive(Debug)]
pub struct AdminApi {
    http: Client,
    base: Url,
    token: OnceLock<String>,
}

impl AdminApi {
    pub fn new(config: &Config) -> Self {
        Self {
            http: Client::new(),
            base: config.api_base(),
            token: OnceLock::new(),
        }
    }

    /// Attach the session token carried by every call after login. The token
    /// is write-once; later calls are ignored.
    pub fn authorize(&self, token: &str) {
        let _ = self.token.set(token.to_string());
    }

    fn endpoint(&self, path: &str) -> Url {
        // base is normalized with a trailing slash, relative joins cannot fail
        self.base.join(path).expect("endpoint path")
    }

    fn wrap_request(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.token.get() {
            Some(token) => builder.header("authcat", format!("Bearer {token}")),
            None => builder,
        }
    }
}

impl ReviewApi for AdminApi {
    async fn login(&self, credential: &Credential) -> Result<LoginResponse, ReviewError> {
        let url = self.endpoint("user/login");
        debug!("POST {url}");
        let response = self
            .http
            .post(url)
            .json(credential)
            .send()
            .await
            .map_err(|e| ReviewError::AuthenticationFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ReviewError::AuthenticationFailed(format!(
                "login returned {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ReviewError::AuthenticationFailed(e.to_string()))
    }

    async fn fetch_page(&self, page: u32, page_size: u32) -> Result<PostPage, ReviewError> {
        let url = self.endpoint("post");
        debug!("GET {url} current={page} pageSize={page_size}");
        let response = self
            .wrap_request(self.http.get(url))
            .query(&[
                ("protectionLv", PROTECTION_LV_FILTER),
                ("dateRangeType", DATE_RANGE_TYPE),
                ("reviewStatus", REVIEW_STATUS_PENDING),
                ("current", page),
                ("pageSize", page_size),
            ])
            .send()
            .await
            .map_err(|e| ReviewError::ListFetchFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ReviewError::ListFetchFailed(format!(
                "list returned {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ReviewError::ListFetchFailed(e.to_string()))
    }

    async fn set_review_status(
        &self,
        post_id: &str,
        decision: ReviewDecision,
    ) -> Result<(), ReviewError> {
        let url = self.endpoint("post/review");
        let body = ReviewBody {
            post_ids: [post_id],
            review_status: decision.code(),
        };
        debug!("PUT {url} reviewStatus={}", decision.code());
        let response = self
            .wrap_request(self.http.put(url))
            .json(&body)
            .send()
            .await
            .map_err(|e| ReviewError::item(post_id, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReviewError::item(
                post_id,
                format!("review returned {status}"),
            ));
        }
        Ok(())
    }

    async fn update_post(&self, update: &PostUpdate) -> Result<(), ReviewError> {
        let url = self.endpoint("post");
        debug!("PUT {url} postID={}", update.post_id);
        let response = self
            .wrap_request(self.http.put(url))
            .json(update)
            .send()
            .await
            .map_err(|e| ReviewError::item(&update.post_id, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReviewError::item(
                &update.post_id,
                format!("update returned {status}"),
            ));
        }
        Ok(())
    }
}

//==============================================================================
// Test double
//==============================================================================

#[cfg(test)]
pub mod testing {
    use std::{
        collections::HashMap,
        sync::{
            atomic::{AtomicUsize, Ordering},
            Mutex,
        },
    };

    use super::{LoginResponse, PageResult, PostPage, PostUpdate, ReviewApi};
    use crate::{
        error::ReviewError,
        post::{Post, ReviewDecision},
        session::Credential,
    };

    /// In-memory stand-in for the admin API, with call counters and failure
    /// switches so the controllers' state machines can be driven directly.
    #[derive(Debug, Default)]
    pub struct FakeApi {
        pub login_calls: AtomicUsize,
        pub fetch_calls: AtomicUsize,
        pub status_calls: AtomicUsize,
        pub update_calls: AtomicUsize,
        pub missing_token: bool,
        pub fail_login: bool,
        pub fail_fetch: bool,
        pub fail_status: bool,
        pub fail_update: bool,
        pub pages: Mutex<HashMap<u32, PostPage>>,
    }

    impl FakeApi {
        pub fn with_pages(pages: impl IntoIterator<Item = (u32, PostPage)>) -> Self {
            Self {
                pages: Mutex::new(pages.into_iter().collect()),
                ..Self::default()
            }
        }
    }

    impl ReviewApi for FakeApi {
        async fn login(&self, _credential: &Credential) -> Result<LoginResponse, ReviewError> {
            self.login_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_login {
                return Err(ReviewError::AuthenticationFailed("login returned 500".into()));
            }
            Ok(LoginResponse {
                access_token: (!self.missing_token).then(|| "token-1".to_string()),
            })
        }

        async fn fetch_page(&self, page: u32, _page_size: u32) -> Result<PostPage, ReviewError> {
            self.fetch_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_fetch {
                return Err(ReviewError::ListFetchFailed("list returned 500".into()));
            }
            let pages = self.pages.lock().unwrap();
            Ok(pages.get(&page).cloned().unwrap_or_default())
        }

        async fn set_review_status(
            &self,
            post_id: &str,
            _decision: ReviewDecision,
        ) -> Result<(), ReviewError> {
            self.status_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_status {
                return Err(ReviewError::item(post_id, "review returned 500"));
            }
            Ok(())
        }

        async fn update_post(&self, update: &PostUpdate) -> Result<(), ReviewError> {
            self.update_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_update {
                return Err(ReviewError::item(&update.post_id, "update returned 500"));
            }
            Ok(())
        }
    }

    pub fn post(id: &str, web_vtt_url: &str) -> Post {
        Post {
            id: id.to_string(),
            creator_id: format!("creator-{id}"),
            content: format!("content of {id}"),
            cover_url: format!("https://cdn.example.com/{id}/cover.jpg"),
            web_vtt_url: web_vtt_url.to_string(),
        }
    }

    pub fn page_of(posts: Vec<Post>, total: u64) -> PostPage {
        PostPage {
            data: posts,
            page_result: PageResult { total },
        }
    }
}
