//! Error response DTO

use actix_web::http::StatusCode;
use actix_web::HttpResponse;

pub use kg_shared::types::response::ErrorResponse;

/// Render an error response with the given status code
pub trait ToResponse {
    fn to_response(&self, status: StatusCode) -> HttpResponse;
}

impl ToResponse for ErrorResponse {
    fn to_response(&self, status: StatusCode) -> HttpResponse {
        HttpResponse::build(status).json(self)
    }
}
