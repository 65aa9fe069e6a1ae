use serde::{Deserialize, Serialize};

/// 스니펫 문서에서 조건(Filter)에 쓰는 필드명
pub const FOLDER_ID: &str = "folderId";
pub const IS_DELETED: &str = "isDeleted";
pub const IS_FAVORITE: &str = "isFavorite";

/// 스니펫 컬렉션의 문서 하나
///
/// `folder_id`가 `None`이면 인박스(inBox)에 있는 스니펫입니다.
/// None도 `null`로 직렬화해야 `folderId = null` 조건과 맞습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub folder_id: Option<String>,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default)]
    pub is_favorite: bool,
    pub language: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateSnippetRequest {
    pub name: Option<String>,
    pub content: Option<String>,
    /// 없으면 선택된 폴더의 defaultLanguage를 씁니다.
    pub language: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}
