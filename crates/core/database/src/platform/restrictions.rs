use std::{collections::HashMap, sync::Arc, time::Duration};

use futures::lock::Mutex;
use garrison_config::config;
use garrison_result::Result;
use iso8601_timestamp::Timestamp;

/// Client for the platform restriction authority.
///
/// The authority applies and clears account-level join restrictions;
/// server-scoped enforcement never goes through it.
#[derive(Clone)]
pub enum Restrictions {
    /// Remote platform service
    Http(HttpRestrictions),
    /// In-process implementation, used by the test suite and
    /// deployments without a platform service
    Reference(ReferenceRestrictions),
}

impl Restrictions {
    /// Create a client from the current configuration
    pub async fn from_config() -> Restrictions {
        let config = config().await;

        if config.hosts.restrictions.is_empty() {
            Restrictions::Reference(Default::default())
        } else {
            Restrictions::Http(HttpRestrictions::new(config.hosts.restrictions))
        }
    }

    /// Apply a platform-level restriction, returning the authority's
    /// raw reply for the ledger
    pub async fn apply_restriction(
        &self,
        target_id: &str,
        reason: Option<&str>,
        expires_at: Option<Timestamp>,
    ) -> Result<String> {
        match self {
            Restrictions::Http(http) => http.apply(target_id, reason, expires_at).await,
            Restrictions::Reference(reference) => {
                reference.apply(target_id, reason, expires_at).await
            }
        }
    }

    /// Clear a platform-level restriction
    pub async fn clear_restriction(&self, target_id: &str) -> Result<String> {
        match self {
            Restrictions::Http(http) => http.clear(target_id).await,
            Restrictions::Reference(reference) => reference.clear(target_id).await,
        }
    }
}

#[derive(Serialize)]
struct DataApplyRestriction<'a> {
    target_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expires_at: Option<Timestamp>,
}

/// Remote restriction authority over HTTP
#[derive(Debug, Clone)]
pub struct HttpRestrictions {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRestrictions {
    pub fn new(base_url: String) -> Self {
        HttpRestrictions {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .connect_timeout(Duration::from_secs(5))
                .build()
                .expect("reqwest Client"),
            base_url,
        }
    }

    async fn apply(
        &self,
        target_id: &str,
        reason: Option<&str>,
        expires_at: Option<Timestamp>,
    ) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/restrictions", self.base_url))
            .json(&DataApplyRestriction {
                target_id,
                reason,
                expires_at,
            })
            .send()
            .await
            .map_err(|err| {
                create_error!(RestrictionUnavailable {
                    error: err.to_string()
                })
            })?;

        if !response.status().is_success() {
            return Err(create_error!(RestrictionUnavailable {
                error: format!("status {}", response.status())
            }));
        }

        response.text().await.map_err(|err| {
            create_error!(RestrictionUnavailable {
                error: err.to_string()
            })
        })
    }

    async fn clear(&self, target_id: &str) -> Result<String> {
        let response = self
            .client
            .delete(format!("{}/restrictions/{target_id}", self.base_url))
            .send()
            .await
            .map_err(|err| {
                create_error!(RestrictionUnavailable {
                    error: err.to_string()
                })
            })?;

        if !response.status().is_success() {
            return Err(create_error!(RestrictionUnavailable {
                error: format!("status {}", response.status())
            }));
        }

        response.text().await.map_err(|err| {
            create_error!(RestrictionUnavailable {
                error: err.to_string()
            })
        })
    }
}

/// In-process restriction authority
#[derive(Debug, Clone, Default)]
pub struct ReferenceRestrictions {
    pub restricted: Arc<Mutex<HashMap<String, String>>>,
    /// Refuse every call, used to exercise downstream-failure paths
    pub broken: bool,
}

impl ReferenceRestrictions {
    /// Create an authority that refuses every call
    pub fn broken() -> Self {
        ReferenceRestrictions {
            restricted: Default::default(),
            broken: true,
        }
    }

    /// Whether a target currently carries a restriction
    pub async fn is_restricted(&self, target_id: &str) -> bool {
        self.restricted.lock().await.contains_key(target_id)
    }

    async fn apply(
        &self,
        target_id: &str,
        reason: Option<&str>,
        _expires_at: Option<Timestamp>,
    ) -> Result<String> {
        if self.broken {
            return Err(create_error!(RestrictionUnavailable {
                error: "refused".to_string()
            }));
        }

        self.restricted
            .lock()
            .await
            .insert(target_id.to_string(), reason.unwrap_or_default().to_string());

        Ok("{\"status\":\"ok\"}".to_string())
    }

    async fn clear(&self, target_id: &str) -> Result<String> {
        if self.broken {
            return Err(create_error!(RestrictionUnavailable {
                error: "refused".to_string()
            }));
        }

        self.restricted.lock().await.remove(target_id);
        Ok("{\"status\":\"ok\"}".to_string())
    }
}
