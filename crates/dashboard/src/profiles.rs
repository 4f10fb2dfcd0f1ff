use std::{collections::HashMap, sync::Arc, time::Duration};

use futures::lock::Mutex;
use garrison_config::config;
use garrison_result::Result;
use moka::future::Cache;

/// Icon substituted when a player has none or resolution fails
static DEFAULT_ICON: &str = "/assets/default-avatar.png";

/// Resolved display profile for a player
#[derive(Serialize, Deserialize, Debug, Clone, Eq, PartialEq)]
pub struct Profile {
    pub username: String,
    pub icon_url: String,
    pub rank: u32,
    #[serde(default)]
    pub role: String,
}

impl Profile {
    /// Synthetic profile substituted when resolution fails
    pub fn fallback() -> Profile {
        Profile {
            username: "System".to_string(),
            icon_url: DEFAULT_ICON.to_string(),
            rank: 0,
            role: String::new(),
        }
    }
}

/// Where profiles come from
#[derive(Clone)]
pub enum ProfileSource {
    /// Remote profile lookup service
    Http(HttpProfiles),
    /// In-memory set, used by the test suite and offline runs
    Reference(Arc<Mutex<HashMap<String, Profile>>>),
}

impl ProfileSource {
    async fn lookup(&self, player_id: &str) -> Result<Profile> {
        match self {
            ProfileSource::Http(http) => http.fetch(player_id).await,
            ProfileSource::Reference(profiles) => profiles
                .lock()
                .await
                .get(player_id)
                .cloned()
                .ok_or_else(|| create_error!(NotFound)),
        }
    }
}

/// Remote profile lookup over HTTP
#[derive(Debug, Clone)]
pub struct HttpProfiles {
    client: reqwest::Client,
    base_url: String,
}

impl HttpProfiles {
    pub fn new(base_url: String, timeout: Duration) -> Self {
        HttpProfiles {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .connect_timeout(Duration::from_secs(5))
                .build()
                .expect("reqwest Client"),
            base_url,
        }
    }

    async fn fetch(&self, player_id: &str) -> Result<Profile> {
        let response = self
            .client
            .get(format!("{}/profiles/{player_id}", self.base_url))
            .send()
            .await
            .map_err(|err| {
                create_error!(ProfileUnavailable {
                    error: err.to_string()
                })
            })?;

        if !response.status().is_success() {
            return Err(create_error!(ProfileUnavailable {
                error: format!("status {}", response.status())
            }));
        }

        response.json().await.map_err(|err| {
            create_error!(ProfileUnavailable {
                error: err.to_string()
            })
        })
    }
}

/// Resolver with a bounded, expiring cache in front of the source, so
/// one player costs at most one lookup per TTL rather than one per
/// poll cycle
pub struct ProfileResolver {
    source: ProfileSource,
    cache: Cache<String, Profile>,
}

impl ProfileResolver {
    pub fn new(source: ProfileSource, capacity: u64, ttl: Duration) -> ProfileResolver {
        ProfileResolver {
            source,
            cache: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Create a resolver from the current configuration
    pub async fn from_config() -> ProfileResolver {
        let config = config().await;

        let source = if config.hosts.profiles.is_empty() {
            ProfileSource::Reference(Default::default())
        } else {
            ProfileSource::Http(HttpProfiles::new(
                config.hosts.profiles,
                Duration::from_secs(config.sync.request_timeout_seconds),
            ))
        };

        ProfileResolver::new(
            source,
            config.sync.profile_cache_capacity,
            Duration::from_secs(config.sync.profile_cache_ttl_seconds),
        )
    }

    /// Resolve a player id to a display profile.
    ///
    /// A failed lookup substitutes the fallback profile rather than
    /// erroring, so one unresolvable player never aborts a refresh
    /// cycle; the failure is not cached and will be retried.
    pub async fn resolve(&self, player_id: &str) -> Profile {
        if let Some(hit) = self.cache.get(player_id).await {
            return hit;
        }

        match self.source.lookup(player_id).await {
            Ok(profile) => {
                self.cache
                    .insert(player_id.to_string(), profile.clone())
                    .await;
                profile
            }
            Err(err) => {
                warn!("Profile lookup for {player_id} failed with {err:?}.");
                Profile::fallback()
            }
        }
    }
}
