use std::sync::{
    atomic::{AtomicBool, Ordering},
    OnceLock,
};

use log::info;
use rand::Rng;
use serde::Serialize;

use crate::{api::ReviewApi, error::ReviewError};

/// One entry of the reviewer account rotation. Static data, not a secrets
/// mechanism.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub username: &'static str,
    pub password: &'static str,
    #[serde(rename = "code2FA")]
    pub code_2fa: &'static str,
}

pub const CREDENTIAL_POOL: &[Credential] = &[
    Credential {
        username: "darren",
        password: "abc123",
        code_2fa: "222",
    },
    Credential {
        username: "chic",
        password: "chihchih",
        code_2fa: "222",
    },
    Credential {
        username: "meimei",
        password: "abc123",
        code_2fa: "222",
    },
    Credential {
        username: "pony",
        password: "abc123",
        code_2fa: "222",
    },
    Credential {
        username: "raychen",
        password: "55665566",
        code_2fa: "222",
    },
    Credential {
        username: "rhys",
        password: "55665566",
        code_2fa: "222",
    },
];

/// Pick one credential uniformly at random. The pool must be non-empty.
pub fn pick_credential<'a>(pool: &'a [Credential], rng: &mut impl Rng) -> &'a Credential {
    &pool[rng.gen_range(0..pool.len())]
}

/// Authenticated session. The token is produced once and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub username: String,
}

//==============================================================================
// Authenticator
//==============================================================================

/// One-shot login. However many times `login_once` is called, the network
/// call fires at most once per process; after a failure the error is
/// terminal and a restart is the only recovery.
#[derive(Debug, Default)]
pub struct Authenticator {
    attempted: AtomicBool,
    session: OnceLock<Session>,
}

impl Authenticator {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn login_once(
        &self,
        api: &impl ReviewApi,
        pool: &[Credential],
        rng: &mut impl Rng,
    ) -> Result<Session, ReviewError> {
        if self.attempted.swap(true, Ordering::SeqCst) {
            return self.session.get().cloned().ok_or_else(|| {
                ReviewError::AuthenticationFailed("login already failed, restart to retry".into())
            });
        }

        let credential = pick_credential(pool, rng);
        info!("Logging in as {}", credential.username);

        let response = api.login(credential).await?;
        let Some(token) = response.access_token else {
            return Err(ReviewError::AuthenticationFailed(
                "no access token received".into(),
            ));
        };

        let session = Session {
            token,
            username: credential.username.to_string(),
        };
        let _ = self.session.set(session.clone());
        Ok(session)
    }
}
