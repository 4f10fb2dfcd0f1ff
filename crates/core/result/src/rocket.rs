use std::io::Cursor;

use rocket::{
    http::{ContentType, Status},
    response::{self, Responder},
    Request, Response,
};

use crate::{Error, ErrorType};

/// HTTP response builder for Error enum
impl<'r> Responder<'r, 'static> for Error {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let status = match self.error_type {
            ErrorType::LabelMe => Status::InternalServerError,

            ErrorType::UnknownServer => Status::NotFound,
            ErrorType::UnknownCommand => Status::NotFound,

            ErrorType::NotAuthenticated => Status::Unauthorized,
            ErrorType::InvalidCredentials => Status::Forbidden,

            ErrorType::DeliveryExpired => Status::BadRequest,
            ErrorType::CommandConcluded => Status::Conflict,

            ErrorType::RestrictionUnavailable { .. } => Status::BadGateway,
            ErrorType::ApiUnavailable { .. } => Status::BadGateway,
            ErrorType::ProfileUnavailable { .. } => Status::BadGateway,

            ErrorType::DatabaseError { .. } => Status::InternalServerError,
            ErrorType::InternalError => Status::InternalServerError,
            ErrorType::InvalidOperation => Status::BadRequest,
            ErrorType::NotFound => Status::NotFound,
            ErrorType::NoEffect => Status::Ok,
            ErrorType::Conflict => Status::Conflict,
            ErrorType::UnprocessableEntity => Status::UnprocessableEntity,
            ErrorType::FailedValidation { .. } => Status::BadRequest,
        };

        // Serialize the error data structure into JSON.
        let string = serde_json::to_string(&self).unwrap();

        // Build and send the request.
        Response::build()
            .sized_body(string.len(), Cursor::new(string))
            .header(ContentType::new("application", "json"))
            .status(status)
            .ok()
    }
}
