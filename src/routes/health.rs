//! # 헬스체크(Health Check) 핸들러
//!
//! ## 엔드포인트
//! - `GET /api/v1/health` → `{ "status": "ok", "folders": <루트 폴더 수> }`

use crate::routes::AppState;
use axum::{extract::State, Json};
use serde_json::{json, Value};

/// `GET /health`: 서버 상태를 확인합니다.
///
/// 저장소를 읽지 않고 메모리 트리만 봅니다. 실패하지 않습니다.
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    // forest()는 메모리 트리만 읽으므로 저장소가 느려도 바로 응답합니다.
    let folders = state.engine.forest().await.len();
    Json(json!({
        "status": "ok",
        "folders": folders
    }))
}
