//! # 스니펫 피드 (Content Notifier)
//!
//! 폴더 엔진은 선택이 바뀌거나 트리가 바뀌면 `ContentNotifier::refresh()`를 호출합니다.
//! 엔진은 스니펫 쪽 내부 상태를 직접 건드리지 않고, 이 트레이트를 통해서만 알립니다.
//!
//! `SnippetFeed`는 그 알림을 받아 스니펫 컬렉션을 다시 조회하고,
//! 결과를 "지금 화면에 보이는 목록"으로 보관합니다.

use crate::db::{DocumentCollection, Filter};
use crate::error::AppError;
use crate::models::Snippet;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

#[async_trait]
pub trait ContentNotifier: Send + Sync {
    /// 주어진 조건으로 스니펫 목록을 다시 조회하게 합니다.
    ///
    /// 실패는 구현 쪽에서 로그로 처리하고, 엔진에는 전달하지 않습니다.
    async fn refresh(&self, query: Filter);
}

/// 조건과 그 조건으로 얻은 목록. 항상 한 덩어리로 바뀝니다.
#[derive(Default)]
struct FeedState {
    query: Option<Filter>,
    visible: Vec<Snippet>,
}

pub struct SnippetFeed {
    snippets: Arc<dyn DocumentCollection>,
    /// 조회 → 저장 전체를 이 잠금 하나로 감싸서 동시에 들어온 갱신이 섞이지 않게 합니다.
    state: Mutex<FeedState>,
}

impl SnippetFeed {
    pub fn new(snippets: Arc<dyn DocumentCollection>) -> Self {
        Self {
            snippets,
            state: Mutex::new(FeedState::default()),
        }
    }

    /// 마지막으로 성공한 조회 결과 (수정 시각 내림차순)
    pub async fn visible(&self) -> Vec<Snippet> {
        self.state.lock().await.visible.clone()
    }

    /// 마지막으로 요청받은 조건
    #[cfg(test)]
    pub async fn query(&self) -> Option<Filter> {
        self.state.lock().await.query.clone()
    }

    async fn load(&self, query: &Filter) -> Result<Vec<Snippet>, AppError> {
        let docs = self.snippets.find(query).await?;
        let mut snippets = docs
            .into_iter()
            .map(serde_json::from_value::<Snippet>)
            .collect::<Result<Vec<_>, _>>()?;
        // RFC 3339 문자열은 사전순 비교가 곧 시간순 비교입니다.
        snippets.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(snippets)
    }
}

#[async_trait]
impl ContentNotifier for SnippetFeed {
    async fn refresh(&self, query: Filter) {
        let mut state = self.state.lock().await;

        match self.load(&query).await {
            Ok(snippets) => {
                tracing::debug!(count = snippets.len(), ?query, "snippet feed refreshed");
                state.visible = snippets;
                state.query = Some(query);
            }
            // 이전 조건과 목록을 그대로 둡니다.
            Err(e) => tracing::warn!(error = %e, ?query, "snippet feed refresh failed"),
        }
    }
}
