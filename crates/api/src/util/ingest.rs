use garrison_config::config;
use garrison_result::{create_error, Error};
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome};
use revolt_rocket_okapi::gen::OpenApiGenerator;
use revolt_okapi::openapi3::{Parameter, ParameterValue};
use revolt_rocket_okapi::request::{OpenApiFromRequest, RequestHeaderInput};
use schemars::schema::{InstanceType, SchemaObject, SingleOrVec};

/// Shared secret presented by game servers on ingestion and polling
/// endpoints via the `x-ingest-key` header
pub struct IngestKey;

#[rocket::async_trait]
impl<'r> FromRequest<'r> for IngestKey {
    type Error = Error;

    async fn from_request(request: &'r rocket::Request<'_>) -> Outcome<Self, Self::Error> {
        let key = config().await.api.security.ingest_key;

        match request.headers().get("x-ingest-key").next() {
            Some(provided) if !key.is_empty() && provided == key => Outcome::Success(IngestKey),
            _ => Outcome::Error((Status::Forbidden, create_error!(InvalidCredentials))),
        }
    }
}

impl<'r> OpenApiFromRequest<'r> for IngestKey {
    fn from_request_input(
        _gen: &mut OpenApiGenerator,
        _name: String,
        _required: bool,
    ) -> revolt_rocket_okapi::Result<RequestHeaderInput> {
        Ok(RequestHeaderInput::Parameter(Parameter {
            name: "x-ingest-key".to_string(),
            description: Some("Shared secret identifying the game server".to_string()),
            allow_empty_value: false,
            required: true,
            deprecated: false,
            extensions: schemars::Map::new(),
            location: "header".to_string(),
            value: ParameterValue::Schema {
                allow_reserved: false,
                example: None,
                examples: None,
                explode: None,
                style: None,
                schema: SchemaObject {
                    instance_type: Some(SingleOrVec::Single(Box::new(InstanceType::String))),
                    ..Default::default()
                },
            },
        }))
    }
}
