// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 CasinoFound

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::chain::ChainWriteError;
use crate::gate::AdminAccessError;
use crate::orchestrator::TxError;
use crate::storage::StoreError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<TxError> for ApiError {
    fn from(err: TxError) -> Self {
        let message = err.to_string();
        match err {
            TxError::NotConnected | TxError::NetworkMismatch(_) => Self::conflict(message),
            TxError::Validation(_) => Self::unprocessable(message),
            TxError::ApprovalFailed { .. } => Self::bad_gateway(message),
            TxError::ApprovalPending { .. } => Self::new(StatusCode::GATEWAY_TIMEOUT, message),
            TxError::Write(write) => match write {
                ChainWriteError::InsufficientFunds(_) => Self::unprocessable(message),
                ChainWriteError::NetworkMismatch(_) => Self::conflict(message),
                ChainWriteError::InvalidTxHash(_) => Self::bad_request(message),
                ChainWriteError::Rejected(_) | ChainWriteError::Rpc(_) => {
                    Self::bad_gateway(message)
                }
                ChainWriteError::InvalidRpcUrl(_) | ChainWriteError::Signer(_) => {
                    Self::internal(message)
                }
            },
        }
    }
}

impl From<AdminAccessError> for ApiError {
    fn from(err: AdminAccessError) -> Self {
        Self::forbidden(err.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => Self::not_found(err.to_string()),
            _ => {
                tracing::error!(error = %err, "storage failure");
                Self::internal("storage failure")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::ValidationError;
    use alloy::primitives::Address;
    use axum::body::to_bytes;

    #[test]
    fn constructors_set_status_and_message() {
        let nf = ApiError::not_found("missing");
        assert_eq!(nf.status, StatusCode::NOT_FOUND);
        assert_eq!(nf.message, "missing");

        let bad = ApiError::bad_request("bad");
        assert_eq!(bad.status, StatusCode::BAD_REQUEST);
        assert_eq!(bad.message, "bad");

        let unp = ApiError::unprocessable("oops");
        assert_eq!(unp.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(unp.message, "oops");
    }

    #[tokio::test]
    async fn into_response_returns_json_body() {
        let response = ApiError::bad_request("bad data").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body_bytes.to_vec()).unwrap();
        assert_eq!(body, r#"{"error":"bad data"}"#);
    }

    #[test]
    fn transaction_errors_map_to_statuses() {
        assert_eq!(
            ApiError::from(TxError::NotConnected).status,
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(TxError::Validation(ValidationError::ZeroAmount)).status,
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::from(TxError::ApprovalPending {
                tx_hash: "0xabc".to_string(),
                waited_secs: 60,
            })
            .status,
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            ApiError::from(TxError::Write(ChainWriteError::InsufficientFunds(
                "no gas".to_string()
            )))
            .status,
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn admin_refusal_is_forbidden() {
        let err = AdminAccessError {
            account: Address::repeat_byte(0x01),
        };
        assert_eq!(ApiError::from(err).status, StatusCode::FORBIDDEN);
    }

    #[test]
    fn missing_records_are_not_found() {
        let err = StoreError::NotFound("transaction 0xabc".to_string());
        assert_eq!(ApiError::from(err).status, StatusCode::NOT_FOUND);
    }
}
