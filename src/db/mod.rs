//! # 문서 저장소 계층 (Document Store Adapter)
//!
//! 엔진은 저장소를 "JSON 문서 컬렉션"으로만 바라봅니다.
//! 실제 구현은 SQLite 테이블 하나(`documents`)에 JSON 본문을 저장하지만,
//! 엔진 쪽에서는 아래 트레이트만 보이므로 테스트에서는 메모리 구현으로 바꿔 끼울 수 있습니다.
//!
//! 각 하위 모듈:
//! - `filter`: 조회/갱신 조건(`Filter`)과 갱신 연산(`Patch`)
//! - `sqlite`: sqlx 기반 컬렉션과 환경설정 저장소
//! - `memory`: 테스트용 메모리 구현 (실패 주입 가능)

pub mod filter;
#[cfg(test)]
pub mod memory;
pub mod sqlite;

pub use filter::*;
pub use sqlite::*;

use crate::error::AppError;
use async_trait::async_trait;
use serde_json::Value;

/// 폴더 트리 문서 하나만 들어 있는 컬렉션
pub const LIBRARY_COLLECTION: &str = "library";

/// 스니펫 문서들이 들어 있는 컬렉션
pub const SNIPPETS_COLLECTION: &str = "snippets";

/// 마지막으로 선택한 폴더 ID를 저장하는 환경설정 키
pub const SELECTED_FOLDER_KEY: &str = "selectedFolderId";

/// `update`의 옵션
///
/// `multi`가 false이면 조건에 맞는 문서 중 **첫 번째만** 갱신합니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOptions {
    pub multi: bool,
}

impl UpdateOptions {
    pub const fn single() -> Self {
        Self { multi: false }
    }

    pub const fn multi() -> Self {
        Self { multi: true }
    }
}

/// JSON 문서 컬렉션
///
/// `#[async_trait]`: 트레이트 객체(`Arc<dyn DocumentCollection>`)로 쓰기 위해
/// async fn을 `Pin<Box<dyn Future>>` 반환으로 바꿔주는 매크로입니다.
///
/// 모든 문서는 문자열 `_id` 키를 가진 JSON 객체입니다.
#[async_trait]
pub trait DocumentCollection: Send + Sync {
    /// 조건에 맞는 첫 번째 문서 (삽입 순서 기준)
    async fn find_one(&self, filter: &Filter) -> Result<Option<Value>, AppError>;

    /// 조건에 맞는 모든 문서 (삽입 순서 기준)
    async fn find(&self, filter: &Filter) -> Result<Vec<Value>, AppError>;

    async fn insert(&self, doc: Value) -> Result<(), AppError>;

    /// 조건에 맞는 문서에 `patch`를 적용하고 영향받은 문서 수를 반환합니다.
    ///
    /// `multi` 갱신도 저장소 입장에서 한 번의 원자적 연산이어야 합니다.
    async fn update(
        &self,
        filter: &Filter,
        patch: &Patch,
        options: UpdateOptions,
    ) -> Result<u64, AppError>;
}

/// 키-값 환경설정 저장소
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), AppError>;
    async fn delete(&self, key: &str) -> Result<(), AppError>;
}
