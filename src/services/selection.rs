//! # 선택 → 스니펫 조건 변환
//!
//! 현재 선택 상태를 스니펫 컬렉션의 조회 조건(`Filter`)으로 바꿉니다.
//! I/O는 하지 않습니다.
//!
//! | 선택 | 조건 |
//! |------|------|
//! | `trash` | `isDeleted = true` |
//! | `favorites` | `isFavorite = true` |
//! | `allSnippets` | 조건 없음 |
//! | `inBox` | `folderId = null` |
//! | 실제 폴더 | `folderId ∈ selectedIds` |
//! | 선택 없음 | `None` (스니펫 목록을 새로 고치지 않음) |

use crate::db::Filter;
use crate::models::{SelectionTarget, SystemFolder, FOLDER_ID, IS_DELETED, IS_FAVORITE};
use serde_json::Value;

pub fn resolve_query(
    selected_id: Option<&SelectionTarget>,
    selected_ids: Option<&[String]>,
) -> Option<Filter> {
    let target = selected_id?;
    let filter = match target {
        SelectionTarget::System(SystemFolder::Trash) => Filter::eq(IS_DELETED, true),
        SelectionTarget::System(SystemFolder::Favorites) => Filter::eq(IS_FAVORITE, true),
        SelectionTarget::System(SystemFolder::AllSnippets) => Filter::All,
        SelectionTarget::System(SystemFolder::InBox) => Filter::eq(FOLDER_ID, Value::Null),
        // 트리에서 찾지 못한 폴더는 빈 집합이 되어 아무 스니펫도 보이지 않습니다.
        SelectionTarget::Folder(_) => {
            Filter::is_in(FOLDER_ID, selected_ids.unwrap_or_default().iter().cloned())
        }
    };
    Some(filter)
}
