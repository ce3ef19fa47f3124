//! HTTP mapping for every error a handler can return

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::geo::{GeocodeError, LocationError};
use crate::services::checkout::CheckoutError;
use crate::session::SessionError;
use crate::StorefrontError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Storefront(#[from] StorefrontError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Geocode(#[from] GeocodeError),

    #[error(transparent)]
    Location(#[from] LocationError),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    redirect: Option<&'static str>,
}

const INTERNAL_MESSAGE: &str = "Something went wrong. Please try again.";

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Storefront(e) => match e {
                StorefrontError::Validation(_) => StatusCode::BAD_REQUEST,
                StorefrontError::Unauthenticated => StatusCode::UNAUTHORIZED,
                StorefrontError::Forbidden => StatusCode::FORBIDDEN,
                StorefrontError::NotFound(_) => StatusCode::NOT_FOUND,
                StorefrontError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Checkout(e) => match e {
                CheckoutError::NotSignedIn => StatusCode::UNAUTHORIZED,
                CheckoutError::EmptyCart | CheckoutError::MissingDeliveryAddress => StatusCode::BAD_REQUEST,
                CheckoutError::InFlight => StatusCode::CONFLICT,
                CheckoutError::Write(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Session(e) => match e {
                SessionError::Cart(_) => StatusCode::BAD_REQUEST,
                SessionError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                SessionError::Storage(_) | SessionError::Encode(_) | SessionError::Repository(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Geocode(e) => match e {
                GeocodeError::EmptyQuery | GeocodeError::InvalidCoordinates => StatusCode::BAD_REQUEST,
                GeocodeError::NotFound => StatusCode::NOT_FOUND,
                GeocodeError::Http(_) | GeocodeError::Transport(_) => StatusCode::BAD_GATEWAY,
            },
            Self::Location(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    /// What the caller sees. Storage failures are logged and replaced by a generic
    /// retry message.
    fn message(&self) -> String {
        match self {
            Self::Storefront(StorefrontError::Storage(_))
            | Self::Session(SessionError::Storage(_) | SessionError::Encode(_) | SessionError::Repository(_)) => {
                INTERNAL_MESSAGE.to_string()
            }
            Self::Geocode(e) => e.user_message(),
            other => other.to_string(),
        }
    }

    fn redirect(&self) -> Option<&'static str> {
        match self {
            Self::Checkout(e) => e.redirect(),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, source = ?std::error::Error::source(&self), "request failed");
        }
        let body = ErrorBody { error: self.message(), redirect: self.redirect() };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::CartError;
    use crate::repository::RepositoryError;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::from(StorefrontError::NotFound("order")).status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::from(CheckoutError::InFlight).status(), StatusCode::CONFLICT);
        assert_eq!(AppError::from(SessionError::Cart(CartError::OnlyOneItem)).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::from(GeocodeError::Http(503)).status(), StatusCode::BAD_GATEWAY);
        assert_eq!(AppError::from(LocationError::Timeout).status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_storage_details_hidden() {
        let err = AppError::from(StorefrontError::Storage(RepositoryError::Unavailable("pg down at 10.0.0.3".into())));
        assert_eq!(err.message(), INTERNAL_MESSAGE);
        let err = AppError::from(CheckoutError::Write(RepositoryError::Unavailable("pg down".into())));
        assert_eq!(err.message(), "Could not place your order. Please try again.");
    }

    #[test]
    fn test_sign_in_redirect() {
        assert_eq!(AppError::from(CheckoutError::NotSignedIn).redirect(), Some("/login"));
        assert_eq!(AppError::from(CheckoutError::MissingDeliveryAddress).redirect(), None);
    }
}
