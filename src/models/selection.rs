//! # 선택 상태 모델
//!
//! 사이드바에서 무엇이 선택되어 있는지를 나타냅니다.
//! 선택 대상은 실제 폴더이거나, 트리에 저장되지 않는 **시스템 폴더**입니다.

use serde::{Deserialize, Serialize};

use super::FolderNode;

/// 트리에 저장되지 않는 가상 폴더. 트리 탐색 대신 스니펫 조건으로 해석됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SystemFolder {
    #[serde(rename = "inBox")]
    InBox,
    #[serde(rename = "favorites")]
    Favorites,
    #[serde(rename = "allSnippets")]
    AllSnippets,
    #[serde(rename = "trash")]
    Trash,
}

impl SystemFolder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SystemFolder::InBox => "inBox",
            SystemFolder::Favorites => "favorites",
            SystemFolder::AllSnippets => "allSnippets",
            SystemFolder::Trash => "trash",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "inBox" => Some(SystemFolder::InBox),
            "favorites" => Some(SystemFolder::Favorites),
            "allSnippets" => Some(SystemFolder::AllSnippets),
            "trash" => Some(SystemFolder::Trash),
            _ => None,
        }
    }
}

/// 선택된 ID: 시스템 폴더 태그이거나 실제 폴더 ID
///
/// `#[serde(untagged)]`: JSON에서는 그냥 문자열입니다.
/// "trash"처럼 시스템 태그와 일치하면 `System`, 아니면 `Folder`로 해석됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectionTarget {
    System(SystemFolder),
    Folder(String),
}

impl SelectionTarget {
    /// 문자열 ID를 선택 대상으로 변환합니다.
    pub fn from_id(id: &str) -> Self {
        match SystemFolder::parse(id) {
            Some(system) => SelectionTarget::System(system),
            None => SelectionTarget::Folder(id.to_string()),
        }
    }

    /// 환경설정에 저장할 문자열 형태
    pub fn as_str(&self) -> &str {
        match self {
            SelectionTarget::System(system) => system.as_str(),
            SelectionTarget::Folder(id) => id,
        }
    }
}

/// 프로세스 로컬 선택 상태. 디스크에는 마지막 선택 ID만 남습니다.
///
/// 불변식: `selected`가 있으면 `selected_ids`는 정확히
/// `selected.id`와 그 모든 하위 폴더 ID입니다. 없으면 `None`입니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionState {
    pub selected_id: Option<SelectionTarget>,
    pub selected: Option<FolderNode>,
    /// 전위 순회(pre-order) 순서의 ID 목록
    pub selected_ids: Option<Vec<String>>,
    /// 이름 편집 모드인 폴더 (한 번에 하나)
    pub editable_id: Option<String>,
}

/// 선택 변경 요청: `PUT /api/v1/selection`
///
/// `{ "id": null }`이면 선택을 해제합니다.
#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    pub id: Option<String>,
}
