#[macro_use]
extern crate rocket;
#[macro_use]
extern crate revolt_rocket_okapi;
#[macro_use]
extern crate serde_json;
#[macro_use]
extern crate log;

pub mod routes;
pub mod util;

use garrison_database::platform::Restrictions;
use garrison_database::{Database, DatabaseInfo};
use rocket::{Build, Rocket};
use rocket_cors::AllowedOrigins;
use std::str::FromStr;

/// Build the web server
pub async fn web() -> Rocket<Build> {
    // Setup database
    let db = DatabaseInfo::Auto
        .connect()
        .await
        .expect("Failed to connect to database.");

    // Setup restriction authority client
    let restrictions = Restrictions::from_config().await;

    let cors = rocket_cors::CorsOptions {
        allowed_origins: AllowedOrigins::All,
        allowed_methods: [
            "Get", "Put", "Post", "Delete", "Options", "Head", "Trace", "Connect", "Patch",
        ]
        .iter()
        .map(|s| FromStr::from_str(s).unwrap())
        .collect(),
        ..Default::default()
    }
    .to_cors()
    .expect("Failed to create CORS.");

    // Configure Rocket
    let rocket = rocket::build();
    routes::mount(rocket)
        .register("/", util::catchers::all_catchers())
        .mount("/", rocket_cors::catch_all_options_routes())
        .mount(
            "/swagger/",
            revolt_rocket_okapi::swagger_ui::make_swagger_ui(&revolt_rocket_okapi::swagger_ui::SwaggerUIConfig {
                url: "../openapi.json".to_owned(),
                ..Default::default()
            }),
        )
        .manage(db)
        .manage(restrictions)
        .manage(cors.clone())
        .attach(cors)
}

#[launch]
async fn rocket() -> _ {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().filter_or("RUST_LOG", "info"));

    garrison_config::init().await;

    info!(
        "Starting Garrison API server [version {}].",
        env!("CARGO_PKG_VERSION")
    );

    let rocket = web().await;

    // Launch background task workers on the same database handle.
    let db = rocket
        .state::<Database>()
        .expect("database is managed above")
        .clone();
    garrison_database::tasks::start_workers(db);

    rocket
}
