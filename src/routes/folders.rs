//! # 폴더(Folder) 라우트 핸들러
//!
//! ## 엔드포인트
//! - `GET    /api/v1/folders`      → 폴더 트리 전체 (저장소에서 다시 읽음)
//! - `POST   /api/v1/folders`      → 루트에 `Untitled` 폴더 생성
//! - `PUT    /api/v1/folders`      → 트리 전체 교체 (드래그 앤 드롭)
//! - `PATCH  /api/v1/folders/{id}` → 이름/기본 언어/펼침 수정 (부분 업데이트)
//! - `DELETE /api/v1/folders/{id}` → 폴더와 하위 폴더 삭제, 안의 스니펫은 휴지통으로
//!
//! 폴더는 부모가 `children`을 가지는 중첩 구조라서,
//! 응답도 평평한 목록이 아니라 트리 모양 그대로 내려갑니다.

use crate::{
    error::AppError,  // 핸들러 에러 → JSON 에러 응답
    models::*,        // FolderNode, UpdateFolderRequest, ReplaceFoldersRequest
    routes::AppState, // 폴더 엔진을 담은 공유 상태
    services::tree,   // 수정 후 응답할 노드를 찾을 때 사용
};
use axum::{
    extract::{Path, State}, // Path: URL의 {id}, State: 앱 상태
    http::StatusCode,       // 201 Created, 204 No Content
    Json,
};
use serde_json::{json, Value};

/// `GET /folders`: 폴더 트리를 조회합니다.
///
/// 응답: `{ "folders": [...] }`
pub async fn list_folders(State(state): State<AppState>) -> Json<Value> {
    // list()는 실패하지 않습니다. 저장소를 읽지 못하면 직전 트리를 그대로 돌려줍니다.
    let folders = state.engine.list().await;
    Json(json!({ "folders": folders }))
}

/// `POST /folders`: 새 폴더를 만듭니다.
///
/// 요청 본문이 없습니다. 이름은 항상 `Untitled`로 시작하고,
/// 만들어진 폴더는 선택 + 이름 편집 상태가 됩니다.
pub async fn create_folder(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<FolderNode>), AppError> {
    let folder = state.engine.create().await?;
    // (상태 코드, 본문) 튜플: 201과 함께 새 폴더를 돌려줍니다.
    Ok((StatusCode::CREATED, Json(folder)))
}

/// `PUT /folders`: 트리 전체를 교체합니다.
///
/// 요청 본문: `{ "list": [...] }`
pub async fn replace_folders(
    State(state): State<AppState>,
    Json(req): Json<ReplaceFoldersRequest>,
) -> Result<Json<Value>, AppError> {
    // req.list의 소유권이 엔진으로 넘어갑니다. ID가 잘못되면 400.
    let folders = state.engine.replace_all(req.list).await?;
    Ok(Json(json!({ "folders": folders })))
}

/// `PATCH /folders/{id}`: 폴더를 수정합니다 (부분 업데이트).
///
/// 예: `{ "name": "Recipes" }` → 이름만 변경, 나머지는 그대로
pub async fn update_folder(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateFolderRequest>,
) -> Result<Json<FolderNode>, AppError> {
    // 빈 PATCH는 아무것도 저장하지 않고 400으로 돌려보냅니다.
    if req.name.is_none() && req.default_language.is_none() && req.open.is_none() {
        return Err(AppError::BadRequest("nothing to update".to_string()));
    }

    // 각 필드는 엔진의 한 작업(읽기 → 수정 → 저장 → 다시 읽기)으로 따로 반영됩니다.
    // 엔진이 false를 돌려주면 트리에 그 ID가 없다는 뜻이므로 404입니다.
    if let Some(name) = &req.name {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::BadRequest("folder name is empty".to_string()));
        }
        if !state.engine.rename(&id, name).await? {
            return Err(AppError::NotFound);
        }
    }
    if let Some(language) = &req.default_language {
        if !state.engine.set_default_language(&id, language).await? {
            return Err(AppError::NotFound);
        }
    }
    if let Some(open) = req.open {
        if !state.engine.set_open(&id, open).await? {
            return Err(AppError::NotFound);
        }
    }

    // 응답은 다시 읽어온 canonical 트리에서 찾은 노드입니다.
    let forest = state.engine.forest().await;
    tree::find_by_id(&forest, &id)
        .cloned()
        .map(Json)
        .ok_or(AppError::NotFound)
}

/// `DELETE /folders/{id}`: 폴더를 삭제합니다.
///
/// 성공 시 HTTP 204 No Content를 반환합니다.
/// 이후 선택은 `allSnippets`로 바뀝니다.
pub async fn delete_folder(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    // Ok(false): 트리에 없는 폴더. 아무것도 하지 않았으므로 404입니다.
    if !state.engine.delete(&id).await? {
        return Err(AppError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}
