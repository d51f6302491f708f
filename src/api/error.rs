use crate::floof::FloofError;
use rocket::http::{ContentType, Status};
use serde_json::json;

#[derive(Debug)]
pub enum ApiError {
    FloofError(FloofError),
    NoScores,
}

impl From<FloofError> for ApiError {
    fn from(error: FloofError) -> Self {
        ApiError::FloofError(error)
    }
}

impl ApiError {
    fn status_and_label(&self) -> (Status, &'static str) {
        match self {
            ApiError::NoScores => (Status::NotFound, "No scores yet"),
            ApiError::FloofError(FloofError::NotConfigured) => {
                (Status::ServiceUnavailable, "Floof store not configured")
            }
            ApiError::FloofError(FloofError::EmptyUrl) => (Status::BadRequest, "Invalid image URL"),
            ApiError::FloofError(FloofError::FetchError(_)) => (Status::BadGateway, "Image fetch error"),
            ApiError::FloofError(FloofError::DecodeError(_)) => {
                (Status::UnprocessableEntity, "Image decode error")
            }
            ApiError::FloofError(FloofError::PersistenceError(_)) => {
                (Status::InternalServerError, "Score persistence error")
            }
            ApiError::FloofError(FloofError::TaskError(_)) => {
                (Status::InternalServerError, "Scoring task error")
            }
        }
    }
}

impl<'r> rocket::response::Responder<'r, 'static> for ApiError {
    fn respond_to(self, _: &'r rocket::Request<'_>) -> rocket::response::Result<'static> {
        let (status, label) = self.status_and_label();
        let message = match &self {
            ApiError::FloofError(error) => error.to_string(),
            ApiError::NoScores => "No image has been scored yet".to_string(),
        };

        if status.code >= 500 {
            log::error!("{}: {}", label, message);
        }

        let body = json!({
            "error": label,
            "message": message
        })
        .to_string();

        rocket::Response::build()
            .status(status)
            .header(ContentType::JSON)
            .sized_body(body.len(), std::io::Cursor::new(body))
            .ok()
    }
}
