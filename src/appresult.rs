use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};

/// Fixed body for ownership check failures.
pub const NOT_ALLOWED: &str = "You are not allowed here!!";

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{}", NOT_ALLOWED)]
    NotAllowed,
    #[error(transparent)]
    Internal(anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::NotAllowed => StatusCode::FORBIDDEN,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::NotAllowed => "NOT_ALLOWED",
            Self::Internal(_) => "INTERNAL",
        }
    }

    fn log(&self) {
        if let Self::Internal(e) = self {
            tracing::error!(error = %e, backtrace = %e.backtrace(), "internal error");
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();
        let body = match &self {
            Self::Internal(_) => "internal server error".to_owned(),
            _ => self.to_string(),
        };
        (self.status(), body).into_response()
    }
}

/// [`AppError`] rendered as a JSON body, for the read-only API.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl<E: Into<AppError>> From<E> for ApiError {
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.0.log();
        let message = match &self.0 {
            AppError::Internal(_) => "internal error".to_owned(),
            other => other.to_string(),
        };
        let body = serde_json::json!({
            "kind": self.0.kind(),
            "message": message,
        });
        (self.0.status(), Json(body)).into_response()
    }
}

impl From<String> for AppError {
    fn from(err: String) -> Self {
        Self::Internal(anyhow::Error::msg(err))
    }
}

impl From<&str> for AppError {
    fn from(err: &str) -> Self {
        Self::Internal(anyhow::Error::msg(err.to_owned()))
    }
}

macro_rules! apperr_impl {
    ($E:ty) => {
        impl From<$E> for AppError {
            fn from(err: $E) -> Self {
                Self::Internal(anyhow::Error::from(err))
            }
        }
    };
}

apperr_impl!(anyhow::Error);
apperr_impl!(serde_json::Error);
apperr_impl!(sqlx::Error);
apperr_impl!(tower_sessions::session::Error);
apperr_impl!(axum::extract::multipart::MultipartError);
apperr_impl!(std::io::Error);
apperr_impl!(tokio::task::JoinError);

impl From<argon2::password_hash::Error> for AppError {
    fn from(err: argon2::password_hash::Error) -> Self {
        Self::Internal(anyhow::anyhow!("password hash: {err}"))
    }
}
