use garrison_dashboard::sync::{worker, SyncClient};
use log::info;

#[async_std::main]
async fn main() {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().filter_or("RUST_LOG", "info"));

    garrison_config::init().await;

    info!(
        "Starting Garrison dashboard sync client [version {}].",
        env!("CARGO_PKG_VERSION")
    );

    worker(SyncClient::from_config().await).await;
}
