use axum::{
    extract::{FromRequest, Request},
    Json,
};
use crate::error::AppError;

/// `Json<T>` whose rejections (bad syntax, wrong field types, missing
/// content type) become a 400 `invalid_input` with the usual error body.
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = axum::extract::rejection::JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(JsonBody(value))
    }
}
