//! # 에러 처리 모듈
//!
//! 폴더 엔진과 HTTP 계층에서 발생할 수 있는 모든 에러 타입을 정의합니다.
//!
//! 저장소 에러는 크게 두 가지로 나뉩니다:
//! - `StoreRead`: 문서를 읽는 도중 실패 (findOne / find)
//! - `StoreWrite`: 문서를 쓰는 도중 실패 (insert / update)
//!
//! 엔진은 저장소 에러를 "작업이 일어나지 않았다"로 취급합니다.
//! 메모리 상태는 커밋되지 않고, 호출자(HTTP 핸들러)에게 에러만 전달됩니다.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// 애플리케이션에서 발생할 수 있는 모든 에러 종류
///
/// 핸들러에서 `Result<T, AppError>`를 반환하면,
/// Axum이 `IntoResponse`를 호출하여 JSON 에러 응답으로 변환합니다.
#[derive(Debug, Error)]
pub enum AppError {
    /// 저장소 읽기 실패 (HTTP 500)
    #[error("Store read error: {0}")]
    StoreRead(String),

    /// 저장소 쓰기 실패 (HTTP 500)
    #[error("Store write error: {0}")]
    StoreWrite(String),

    /// 트리 문서나 폴더 노드가 없음 (HTTP 404)
    #[error("Resource not found")]
    NotFound,

    /// 잘못된 요청 (HTTP 400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// JSON 문서 ↔ 구조체 변환 실패
    /// 트리 문서의 모양이 FolderNode와 맞지 않으면 여기에 해당합니다.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AppError {
    /// sqlx 읽기 에러를 `StoreRead`로 감쌉니다.
    ///
    /// `.map_err(AppError::read)` 형태로 쓰기 위한 헬퍼입니다.
    pub fn read(err: impl std::fmt::Display) -> Self {
        AppError::StoreRead(err.to_string())
    }

    /// sqlx 쓰기 에러를 `StoreWrite`로 감쌉니다.
    pub fn write(err: impl std::fmt::Display) -> Self {
        AppError::StoreWrite(err.to_string())
    }
}

impl IntoResponse for AppError {
    /// AppError를 HTTP 응답으로 변환합니다.
    ///
    /// 저장소/내부 에러는 실제 원인을 로그에만 기록하고,
    /// 클라이언트에는 일반적인 메시지만 반환합니다.
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "not_found", self.to_string()),
            AppError::BadRequest(ref msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", msg.clone())
            }
            AppError::StoreRead(ref msg) => {
                tracing::error!("Store read error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "store_read_error",
                    "Failed to read from the store".to_string(),
                )
            }
            AppError::StoreWrite(ref msg) => {
                tracing::error!("Store write error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "store_write_error",
                    "Failed to write to the store".to_string(),
                )
            }
            AppError::Serialization(ref e) => {
                tracing::error!("Serialization error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "serialization_error",
                    "A stored document is malformed".to_string(),
                )
            }
        };

        // 결과: { "error": { "code": "not_found", "message": "Resource not found" } }
        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
