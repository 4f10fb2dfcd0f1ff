use rocket::Route;
use revolt_okapi::openapi3::OpenApi;

mod ban_create;
mod ban_remove;
mod log_fetch;

pub fn routes() -> (Vec<Route>, OpenApi) {
    openapi_get_routes_spec![ban_create::ban, ban_remove::unban, log_fetch::fetch_log]
}
