pub mod auth;
pub mod respondents;
pub mod responses;
pub mod surveys;
pub mod templates;

use axum::Json;
use serde::Serialize;

/// `{ "success": true, "message"?: .., "data"?: .. }`
#[derive(Serialize)]
pub struct Envelope<T: Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
}

pub fn success<T: Serialize>(data: T) -> Json<Envelope<T>> {
    Json(Envelope {
        success: true,
        message: None,
        data: Some(data),
    })
}

pub fn success_with<T: Serialize>(message: &'static str, data: T) -> Json<Envelope<T>> {
    Json(Envelope {
        success: true,
        message: Some(message),
        data: Some(data),
    })
}

pub fn done(message: &'static str) -> Json<Envelope<()>> {
    Json(Envelope {
        success: true,
        message: Some(message),
        data: None,
    })
}
