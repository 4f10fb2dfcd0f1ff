use std::collections::HashMap;
use std::time::Duration;

use futures::try_join;
use garrison_config::config;
use garrison_database::{AuditEntry, ChatEntry, PlayerEntry, ServerStateMeta};
use garrison_result::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::profiles::{Profile, ProfileResolver};

/// An entry with its resolved display profile merged on
#[derive(Serialize, Debug, Clone)]
pub struct Enriched<T> {
    #[serde(flatten)]
    pub entry: T,
    pub profile: Profile,
}

/// One staff-facing view of a server, assembled per refresh cycle
#[derive(Serialize, Debug, Clone)]
pub struct DashboardView {
    pub meta: ServerStateMeta,
    pub players: Vec<Enriched<PlayerEntry>>,
    pub chat: Vec<Enriched<ChatEntry>>,
    pub audit: Vec<AuditEntry>,
}

/// Staff-facing poller: re-pulls the four read endpoints on a fixed
/// interval and merges resolved profiles onto the raw entries
pub struct SyncClient {
    http: reqwest::Client,
    api_base: String,
    resolver: ProfileResolver,
}

impl SyncClient {
    pub fn new(api_base: String, resolver: ProfileResolver, timeout: Duration) -> SyncClient {
        SyncClient {
            http: reqwest::Client::builder()
                .timeout(timeout)
                .connect_timeout(Duration::from_secs(5))
                .build()
                .expect("reqwest Client"),
            api_base,
            resolver,
        }
    }

    /// Create a client from the current configuration
    pub async fn from_config() -> SyncClient {
        let config = config().await;

        SyncClient::new(
            config.hosts.api,
            ProfileResolver::from_config().await,
            Duration::from_secs(config.sync.request_timeout_seconds),
        )
    }

    async fn get<T: DeserializeOwned>(&self, path: String) -> Result<T> {
        let response = self
            .http
            .get(format!("{}{path}", self.api_base))
            .send()
            .await
            .map_err(|err| {
                create_error!(ApiUnavailable {
                    error: err.to_string()
                })
            })?;

        if !response.status().is_success() {
            return Err(create_error!(ApiUnavailable {
                error: format!("status {}", response.status())
            }));
        }

        response.json().await.map_err(|err| {
            create_error!(ApiUnavailable {
                error: err.to_string()
            })
        })
    }

    /// One refresh cycle for a single server: fetch meta, roster, chat
    /// and audit concurrently, then enrich. Nothing renders until the
    /// whole cycle has completed.
    pub async fn fetch_view(&self, server: &str) -> Result<DashboardView> {
        let (meta, players, chat, audit) = try_join!(
            self.get::<ServerStateMeta>(format!("/servers/{server}")),
            self.get::<Vec<PlayerEntry>>(format!("/servers/{server}/players")),
            self.get::<Vec<ChatEntry>>(format!("/servers/{server}/chat")),
            self.get::<Vec<AuditEntry>>(format!("/servers/{server}/audit")),
        )?;

        Ok(self.enrich(meta, players, chat, audit).await)
    }

    /// Refresh the view of every known server
    pub async fn refresh(&self) -> Result<Vec<DashboardView>> {
        let metas = self.get::<Vec<ServerStateMeta>>("/servers".to_string()).await?;

        let mut views = Vec::with_capacity(metas.len());
        for meta in metas {
            views.push(self.fetch_view(&meta.id).await?);
        }

        Ok(views)
    }

    /// Merge resolved profiles onto roster and chat entries; every
    /// distinct player id costs at most one resolution per cycle
    pub async fn enrich(
        &self,
        meta: ServerStateMeta,
        players: Vec<PlayerEntry>,
        chat: Vec<ChatEntry>,
        audit: Vec<AuditEntry>,
    ) -> DashboardView {
        let mut profiles: HashMap<String, Profile> = HashMap::new();

        let ids = players
            .iter()
            .map(|player| &player.id)
            .chain(chat.iter().filter_map(|entry| entry.player_id.as_ref()));

        for id in ids {
            if !profiles.contains_key(id) {
                profiles.insert(id.to_string(), self.resolver.resolve(id).await);
            }
        }

        DashboardView {
            meta,
            players: players
                .into_iter()
                .map(|entry| Enriched {
                    profile: profiles
                        .get(&entry.id)
                        .cloned()
                        .unwrap_or_else(Profile::fallback),
                    entry,
                })
                .collect(),
            chat: chat
                .into_iter()
                .map(|entry| Enriched {
                    profile: entry
                        .player_id
                        .as_ref()
                        .and_then(|id| profiles.get(id).cloned())
                        .unwrap_or_else(Profile::fallback),
                    entry,
                })
                .collect(),
            audit,
        }
    }
}

/// Polling loop
pub async fn worker(client: SyncClient) {
    loop {
        match client.refresh().await {
            Ok(views) => {
                for view in &views {
                    info!(
                        "{}: {} player(s), {} chat entries, {} audit entries{}",
                        view.meta.id,
                        view.meta.player_count,
                        view.meta.chat_count,
                        view.meta.audit_count,
                        if view.meta.flagged { " [flagged]" } else { "" }
                    );
                }
            }
            Err(err) => warn!("Refresh cycle failed with {err:?}."),
        }

        let interval = config().await.sync.interval_seconds;
        async_std::task::sleep(Duration::from_secs(interval)).await;
    }
}
