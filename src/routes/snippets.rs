//! # 스니펫(Snippet) 라우트 핸들러
//!
//! ## 엔드포인트
//! - `GET  /api/v1/snippets` → 현재 선택에 맞는 스니펫 목록 (수정 시각 내림차순)
//! - `POST /api/v1/snippets` → 현재 선택된 위치에 새 스니펫 추가
//!
//! 목록은 매 요청마다 조회하지 않고, 폴더 엔진이 알려준 조건으로
//! 스니펫 피드가 마지막으로 갱신해 둔 결과를 그대로 돌려줍니다.

use crate::{
    error::AppError,
    models::*,        // Snippet, CreateSnippetRequest, SelectionState 등
    routes::AppState, // 엔진, 피드, 스니펫 컬렉션, ID 생성기
};
use axum::{
    extract::State,   // 앱 상태 추출
    http::StatusCode, // 201 Created
    Json,             // JSON 요청/응답 래퍼
};
use serde_json::{json, Value};

/// 이름 없이 만든 스니펫의 이름
const DEFAULT_SNIPPET_NAME: &str = "Untitled snippet";

/// `GET /snippets`: 지금 보이는 스니펫 목록
pub async fn list_snippets(State(state): State<AppState>) -> Json<Value> {
    let snippets = state.feed.visible().await;
    Json(json!({ "snippets": snippets }))
}

/// `POST /snippets`: 새 스니펫을 추가합니다.
///
/// 요청 본문: `{ "name": "...", "content": "...", "language": "...", "tags": [...] }` (모두 선택)
///
/// - 실제 폴더가 선택되어 있으면 그 폴더에, 아니면 인박스(`folderId: null`)에 들어갑니다.
/// - `language`가 없으면 선택된 폴더의 기본 언어를 씁니다.
/// - 즐겨찾기를 보고 있으면 즐겨찾기로 표시합니다.
pub async fn create_snippet(
    State(state): State<AppState>,
    Json(req): Json<CreateSnippetRequest>,
) -> Result<(StatusCode, Json<Snippet>), AppError> {
    // 선택 상태는 복사본입니다. 요청 처리 중에 선택이 바뀌어도 이 스니펫의 위치는 그대로입니다.
    let selection = state.engine.snapshot().await;
    // RFC 3339 문자열은 사전순 정렬이 곧 시간순 정렬이라 피드 정렬에 그대로 씁니다.
    let now = chrono::Utc::now().to_rfc3339();
    let snippet = new_snippet(state.ids.generate(), req, &selection, now);

    // Snippet → serde_json::Value로 바꿔 문서 컬렉션에 넣습니다.
    // `?`: 직렬화 에러와 저장소 에러 모두 AppError로 바뀌어 그대로 응답이 됩니다.
    state
        .snippets
        .insert(serde_json::to_value(&snippet)?)
        .await?;
    tracing::info!(snippet_id = %snippet.id, folder_id = ?snippet.folder_id, "Snippet created");

    // 피드 갱신은 엔진을 거칩니다. 엔진 잠금 아래에서 "지금의" 선택 조건을 읽어야
    // 그 사이 바뀐 선택의 목록을 덮어쓰지 않습니다.
    state.engine.refresh_content().await;

    // (상태 코드, 본문) 튜플도 IntoResponse를 구현합니다.
    Ok((StatusCode::CREATED, Json(snippet)))
}

/// 선택 상태를 보고 새 스니펫의 위치와 기본값을 정합니다.
fn new_snippet(
    id: String,
    req: CreateSnippetRequest,
    selection: &SelectionState,
    now: String,
) -> Snippet {
    let folder = selection.selected.as_ref();
    let language = req
        .language
        .filter(|language| !language.is_empty())
        .or_else(|| folder.map(|folder| folder.default_language.clone()))
        .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());
    let is_favorite = selection.selected_id == Some(SelectionTarget::System(SystemFolder::Favorites));

    Snippet {
        id,
        name: req
            .name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SNIPPET_NAME.to_string()),
        folder_id: folder.map(|folder| folder.id.clone()),
        is_deleted: false,
        is_favorite,
        language,
        content: req.content.unwrap_or_default(),
        tags: req.tags,
        created_at: now.clone(),
        updated_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(language: Option<&str>) -> CreateSnippetRequest {
        CreateSnippetRequest {
            name: None,
            content: Some("fn main() {}".to_string()),
            language: language.map(str::to_string),
            tags: vec![],
        }
    }

    fn folder_selection() -> SelectionState {
        let mut folder = FolderNode::untitled("A".to_string());
        folder.default_language = "rust".to_string();
        SelectionState {
            selected_id: Some(SelectionTarget::Folder("A".to_string())),
            selected: Some(folder),
            selected_ids: Some(vec!["A".to_string()]),
            editable_id: None,
        }
    }

    #[test]
    fn lands_in_the_selected_folder_with_its_language() {
        let snippet = new_snippet("s1".into(), request(None), &folder_selection(), "t".into());
        assert_eq!(snippet.folder_id.as_deref(), Some("A"));
        assert_eq!(snippet.language, "rust");
        assert_eq!(snippet.name, "Untitled snippet");
        assert!(!snippet.is_favorite);
    }

    #[test]
    fn explicit_language_wins() {
        let snippet = new_snippet("s1".into(), request(Some("sql")), &folder_selection(), "t".into());
        assert_eq!(snippet.language, "sql");
    }

    #[test]
    fn system_views_file_into_the_inbox() {
        let favorites = SelectionState {
            selected_id: Some(SelectionTarget::System(SystemFolder::Favorites)),
            ..SelectionState::default()
        };
        let snippet = new_snippet("s1".into(), request(None), &favorites, "t".into());
        assert_eq!(snippet.folder_id, None);
        assert_eq!(snippet.language, "text");
        assert!(snippet.is_favorite);

        let nothing = new_snippet("s2".into(), request(None), &SelectionState::default(), "t".into());
        assert_eq!(nothing.folder_id, None);
        assert!(!nothing.is_favorite);
    }
}
