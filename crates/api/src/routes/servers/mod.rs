use rocket::Route;
use revolt_okapi::openapi3::OpenApi;

mod audit_fetch;
mod chat_fetch;
mod chat_push;
mod command_ack;
mod command_create;
mod command_poll;
mod notification_post;
mod outbox_poll;
mod roster_fetch;
mod roster_replace;
mod server_fetch;
mod server_flag;
mod server_list;

pub fn routes() -> (Vec<Route>, OpenApi) {
    openapi_get_routes_spec![
        server_list::list,
        server_fetch::fetch,
        server_flag::flag,
        chat_push::push_chat,
        chat_fetch::fetch_chat,
        roster_replace::replace_roster,
        roster_fetch::fetch_roster,
        command_create::create_command,
        command_poll::poll_commands,
        command_ack::acknowledge_command,
        notification_post::post_notification,
        outbox_poll::poll_outbox,
        audit_fetch::fetch_audit
    ]
}
