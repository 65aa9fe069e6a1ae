//! # 폴더 트리 모델 정의
//!
//! 폴더 계층 전체는 저장소의 **단 하나의 문서**(`TreeDocument`)에 중첩된 형태로 저장됩니다.
//!
//! ```text
//! { "_id": "folders",
//!   "list": [ { "id": "A", ..., "children": [ { "id": "B", ... } ] },
//!             { "id": "D", ..., "children": [] } ] }
//! ```
//!
//! 부모 노드가 `children`을 소유(ownership)하므로 공유나 순환이 생길 수 없습니다.

use serde::{Deserialize, Serialize};

/// 트리 문서의 고정 `_id`
pub const TREE_DOCUMENT_ID: &str = "folders";

/// 새 폴더의 기본 이름
pub const DEFAULT_FOLDER_NAME: &str = "Untitled";

/// 새 폴더의 기본 언어. 폴더를 선택한 채로 만든 스니펫이 이 값을 물려받습니다.
pub const DEFAULT_LANGUAGE: &str = "text";

/// 폴더 트리의 노드 하나
///
/// `#[serde(rename_all = "camelCase")]`: `default_language` ↔ `defaultLanguage`처럼
/// Rust의 snake_case 필드명을 문서의 camelCase 키로 매핑합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderNode {
    /// 생성 시 한 번 정해지고 바뀌지 않는 고유 ID
    pub id: String,
    pub name: String,
    /// 사이드바에서 펼쳐져 있는지 여부
    #[serde(default)]
    pub open: bool,
    #[serde(default = "default_language")]
    pub default_language: String,
    /// 하위 폴더. 예전 문서에는 이 키가 없을 수 있어 기본값(빈 Vec)을 둡니다.
    #[serde(default)]
    pub children: Vec<FolderNode>,
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

impl FolderNode {
    /// 루트에 추가될 새 폴더를 만듭니다: `Untitled`, 닫힘, 언어 `text`, 자식 없음.
    pub fn untitled(id: String) -> Self {
        Self {
            id,
            name: DEFAULT_FOLDER_NAME.to_string(),
            open: false,
            default_language: default_language(),
            children: Vec::new(),
        }
    }
}

/// 저장소에 영속화되는 유일한 계층 표현
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeDocument {
    #[serde(rename = "_id")]
    pub id: String,
    /// 최상위 폴더들의 순서 있는 목록(forest)
    #[serde(default)]
    pub list: Vec<FolderNode>,
}

impl TreeDocument {
    pub fn new(list: Vec<FolderNode>) -> Self {
        Self {
            id: TREE_DOCUMENT_ID.to_string(),
            list,
        }
    }
}

/// 폴더 수정 요청: `PATCH /api/v1/folders/{id}`
///
/// PATCH는 부분 업데이트이므로 모든 필드가 Option입니다.
/// 여러 필드가 함께 오면 name → defaultLanguage → open 순서로 적용합니다.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFolderRequest {
    pub name: Option<String>,
    pub default_language: Option<String>,
    pub open: Option<bool>,
}

/// 트리 전체 교체 요청: `PUT /api/v1/folders`
///
/// 사이드바에서 드래그 앤 드롭으로 순서나 부모를 바꾸면
/// 클라이언트가 새 forest 전체를 보냅니다.
#[derive(Debug, Deserialize)]
pub struct ReplaceFoldersRequest {
    pub list: Vec<FolderNode>,
}
