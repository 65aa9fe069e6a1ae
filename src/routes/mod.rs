//! # 라우트 핸들러 모듈
//!
//! HTTP 요청을 처리하는 핸들러 함수들을 모아둔 모듈입니다.
//! 핸들러는 요청을 폴더 엔진 호출로 바꾸고, 결과를 JSON으로 돌려주는 일만 합니다.
//!
//! 각 하위 모듈:
//! - `folders`: 폴더 트리 조회/생성/수정/삭제
//! - `selection`: 사이드바 선택 상태
//! - `snippets`: 현재 보이는 스니펫 목록과 새 스니펫 추가
//! - `health`: 서버 상태 확인 (헬스체크)

pub mod folders;
pub mod health;
pub mod selection;
pub mod snippets;

// 핸들러 함수들을 재공개하여 `api_router`에서 `list_folders`처럼 바로 쓸 수 있게 합니다.
pub use folders::*;
pub use health::*;
pub use selection::*;
pub use snippets::*;

use crate::db::DocumentCollection;
use crate::services::{FolderEngine, IdSource, SnippetFeed};
use axum::{
    routing::{delete, get, patch},
    Router,
};
use std::sync::Arc;

/// 애플리케이션 공유 상태
///
/// 모든 요청 핸들러가 `State(state): State<AppState>`로 접근합니다.
/// 필드가 전부 `Arc`라서 clone해도 같은 엔진과 저장소를 가리킵니다.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<FolderEngine>,
    /// 엔진의 알림을 받는 스니펫 피드 (엔진에도 같은 인스턴스가 주입됨)
    pub feed: Arc<SnippetFeed>,
    pub snippets: Arc<dyn DocumentCollection>,
    pub ids: Arc<dyn IdSource>,
}

/// `/api/v1` 아래에 중첩될 API 라우터를 만듭니다.
pub fn api_router(state: AppState) -> Router {
    // 같은 경로에 메서드를 체이닝하면 한 경로에 여러 핸들러가 붙습니다.
    // axum 0.8의 경로 파라미터 문법은 `{id}`입니다.
    Router::new()
        .route("/folders", get(list_folders).post(create_folder).put(replace_folders))
        .route("/folders/{id}", patch(update_folder).delete(delete_folder))
        .route("/selection", get(get_selection).put(select_folder))
        .route("/selection/editable", delete(clear_editable))
        .route("/snippets", get(list_snippets).post(create_snippet))
        .route("/health", get(health_check))
        // with_state(): 모든 핸들러가 State<AppState>로 꺼내 쓸 수 있게 합니다.
        .with_state(state)
}
