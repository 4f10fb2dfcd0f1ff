use revolt_okapi::openapi3::OpenApi;
use revolt_rocket_okapi::settings::OpenApiSettings;
use rocket::{Build, Rocket};

mod moderation;
mod root;
mod servers;

pub fn mount(mut rocket: Rocket<Build>) -> Rocket<Build> {
    let settings = OpenApiSettings::default();

    mount_endpoints_and_merged_docs! {
        rocket, "/".to_owned(), settings,
        "/" => (vec![], custom_openapi_spec()),
        "" => openapi_get_routes_spec![root::root],
        "/servers" => servers::routes(),
        "/moderation" => moderation::routes()
    };

    rocket
}

fn custom_openapi_spec() -> OpenApi {
    use revolt_okapi::openapi3::Info;

    OpenApi {
        openapi: OpenApi::default_version(),
        info: Info {
            title: "Garrison API".to_string(),
            description: Some(
                "Companion backend for the live game server fleet: state \
                 synchronisation, moderation command dispatch and the \
                 enforcement ledger."
                    .to_string(),
            ),
            version: env!("CARGO_PKG_VERSION").to_string(),
            ..Default::default()
        },
        ..Default::default()
    }
}
