use cached::proc_macro::cached;
use config::{Config, File, FileFormat};
use futures_locks::RwLock;
use once_cell::sync::Lazy;
use serde::Deserialize;

static CONFIG_BUILDER: Lazy<RwLock<Config>> = Lazy::new(|| {
    RwLock::new({
        let mut builder = Config::builder().add_source(File::from_str(
            include_str!("../Garrison.toml"),
            FileFormat::Toml,
        ));

        if std::path::Path::new("Garrison.toml").exists() {
            builder = builder.add_source(File::new("Garrison.toml", FileFormat::Toml));
        }

        builder.build().unwrap()
    })
});

#[derive(Deserialize, Debug, Clone)]
pub struct Database {
    pub mongodb: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Hosts {
    pub api: String,
    pub profiles: String,
    pub restrictions: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ApiSecurity {
    pub ingest_key: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Api {
    pub security: ApiSecurity,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Retention {
    pub days: i64,
    pub flagged_days: i64,
    pub sweep_interval_seconds: u64,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Commands {
    pub delivery_expiry_seconds: i64,
    pub requeue_interval_seconds: u64,
}

#[derive(Deserialize, Debug, Clone)]
pub struct SyncSettings {
    pub interval_seconds: u64,
    pub request_timeout_seconds: u64,
    pub profile_cache_capacity: u64,
    pub profile_cache_ttl_seconds: u64,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    pub database: Database,
    pub hosts: Hosts,
    pub api: Api,
    pub retention: Retention,
    pub commands: Commands,
    pub sync: SyncSettings,
}

pub async fn init() {
    println!(
        ":: Garrison Configuration ::\n\x1b[32m{:?}\x1b[0m",
        config().await
    );
}

pub async fn read() -> Config {
    CONFIG_BUILDER.read().await.clone()
}

#[cached(time = 30)]
pub async fn config() -> Settings {
    read().await.try_deserialize::<Settings>().unwrap()
}

#[cfg(test)]
mod tests {
    use crate::config;

    #[async_std::test]
    async fn it_deserialises_the_default_configuration() {
        let settings = config().await;
        assert_eq!(settings.retention.days, 14);
        assert_eq!(settings.retention.flagged_days, 90);
        assert_eq!(settings.sync.interval_seconds, 30);
    }
}
