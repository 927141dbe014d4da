use axum::{
    http::{
        header::CONTENT_TYPE,
        StatusCode,
    },
    response::{
        IntoResponse,
        Response,
    },
};

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("{} collector(s) failed during the scrape:\n{}", .0.len(), .0.join("\n"))]
    Scrape(Vec<String>),
    #[error("Rendering metrics failed: {0}")]
    Encode(#[from] prometheus::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.to_string(),
        )
            .into_response()
    }
}
