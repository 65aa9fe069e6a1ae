//! # 선택(Selection) 라우트 핸들러
//!
//! | 메서드 | 경로 | 핸들러 | 설명 |
//! |--------|------|--------|------|
//! | GET | /api/v1/selection | `get_selection` | 현재 선택 상태 |
//! | PUT | /api/v1/selection | `select_folder` | 폴더/시스템 폴더 선택, `null`이면 해제 |
//! | DELETE | /api/v1/selection/editable | `clear_editable` | 이름 편집 모드 종료 |

use crate::{
    models::*,        // SelectionState, SelectRequest
    routes::AppState, // 폴더 엔진을 담은 공유 상태
};
use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value}; // 응답 JSON을 조립할 때 사용

/// 선택 상태에 파생 값(`defaultLanguage`, `isSystemFolder`)을 붙여 응답을 만듭니다.
async fn selection_body(state: &AppState, selection: SelectionState) -> Json<Value> {
    // 선택 직후에 읽으므로 같은 요청 안에서는 선택 상태와 맞습니다.
    let default_language = state.engine.default_language().await;
    let is_system_folder = state.engine.is_system_folder().await;
    Json(json!({
        "selection": selection,
        "defaultLanguage": default_language,
        "isSystemFolder": is_system_folder
    }))
}

/// `GET /selection`
pub async fn get_selection(State(state): State<AppState>) -> Json<Value> {
    let selection = state.engine.snapshot().await;
    selection_body(&state, selection).await
}

/// `PUT /selection` + `{ "id": "trash" | "<folder id>" | null }`
///
/// 선택은 실패하지 않습니다. 트리에 없는 폴더 ID를 고르면
/// `selected`가 비어 있고 아무 스니펫도 보이지 않는 상태가 됩니다.
pub async fn select_folder(
    State(state): State<AppState>,
    Json(req): Json<SelectRequest>,
) -> Json<Value> {
    // as_deref(): Option<String> → Option<&str>. 소유권을 넘기지 않고 빌려줍니다.
    let selection = state.engine.select(req.id.as_deref()).await;
    selection_body(&state, selection).await
}

/// `DELETE /selection/editable`
pub async fn clear_editable(State(state): State<AppState>) -> StatusCode {
    state.engine.clear_editable().await;
    StatusCode::NO_CONTENT
}
