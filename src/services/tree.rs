//! # 폴더 트리 코덱과 탐색 함수
//!
//! 저장 형식 ↔ 메모리 트리 변환(코덱)과, 트리를 재귀적으로 훑는 순수 함수들입니다.
//! I/O가 전혀 없어서 저장소 없이 단독으로 테스트할 수 있습니다.
//!
//! 모든 탐색은 **깊이 우선 전위 순회(pre-order)** 입니다:
//! 노드 자신을 먼저 보고, 자식 서브트리를 하나씩 끝까지 본 뒤 다음 형제로 넘어갑니다.
//! ID는 유일해야 하며, 중복 ID가 있으면 순회 순서상 처음 만난 노드가 선택됩니다.

use crate::error::AppError;
use crate::models::{FolderNode, SystemFolder, TreeDocument};
use serde_json::Value;
use std::collections::HashSet;

/// forest를 트리 문서의 `list` 값으로 직렬화합니다.
///
/// 메모리 모양과 저장 모양이 같으므로 지금은 항등 변환이지만,
/// 저장 형식이 바뀔 때를 위해 경계를 이 함수 하나로 모아둡니다.
pub fn serialize(forest: &[FolderNode]) -> Result<Value, AppError> {
    Ok(serde_json::to_value(forest)?)
}

/// 저장소에서 읽은 트리 문서를 구조체로 역직렬화합니다.
pub fn deserialize(doc: Value) -> Result<TreeDocument, AppError> {
    Ok(serde_json::from_value(doc)?)
}

/// 전위 순회로 모든 노드를 방문합니다.
pub fn visit<'a, F>(forest: &'a [FolderNode], visitor: &mut F)
where
    F: FnMut(&'a FolderNode),
{
    for node in forest {
        visitor(node);
        visit(&node.children, visitor);
    }
}

/// ID로 노드를 찾습니다. 없으면 `None` (에러가 아니라 정상적인 결과입니다).
pub fn find_by_id<'a>(forest: &'a [FolderNode], id: &str) -> Option<&'a FolderNode> {
    for node in forest {
        if node.id == id {
            return Some(node);
        }
        if let Some(found) = find_by_id(&node.children, id) {
            return Some(found);
        }
    }
    None
}

/// `node` 자신을 포함해 모든 하위 노드의 ID를 전위 순서로 모읍니다.
pub fn collect_descendant_ids(node: &FolderNode) -> Vec<String> {
    let mut ids = vec![node.id.clone()];
    visit(&node.children, &mut |child| ids.push(child.id.clone()));
    ids
}

/// ID가 일치하는 첫 노드를 부모의 `children`에서 떼어냅니다 (서브트리 통째로).
///
/// 루트 레벨을 포함해 어느 깊이에서든 동작합니다.
/// 반환값은 실제로 제거가 일어났는지 여부입니다.
pub fn remove_by_id(forest: &mut Vec<FolderNode>, id: &str) -> bool {
    for index in 0..forest.len() {
        if forest[index].id == id {
            forest.remove(index);
            return true;
        }
        if remove_by_id(&mut forest[index].children, id) {
            return true;
        }
    }
    false
}

/// ID가 일치하는 첫 노드에 `update`를 적용합니다. 찾았으면 true.
///
/// 트리 모양과 다른 노드는 건드리지 않습니다.
pub fn update_by_id<F>(forest: &mut [FolderNode], id: &str, update: F) -> bool
where
    F: FnOnce(&mut FolderNode),
{
    match find_by_id_mut(forest, id) {
        Some(node) => {
            update(node);
            true
        }
        None => false,
    }
}

/// 외부에서 받은 forest가 트리 불변식을 지키는지 검사합니다.
///
/// - ID는 비어 있지 않고 트리 전체에서 유일해야 합니다.
/// - 시스템 폴더 태그(`trash`, `inBox` 등)는 폴더 ID로 쓸 수 없습니다.
pub fn validate(forest: &[FolderNode]) -> Result<(), AppError> {
    let mut seen = HashSet::new();
    let mut problem = None;
    visit(forest, &mut |node| {
        if problem.is_some() {
            return;
        }
        if node.id.is_empty() {
            problem = Some("folder id is empty".to_string());
        } else if SystemFolder::parse(&node.id).is_some() {
            problem = Some(format!("folder id `{}` is reserved", node.id));
        } else if !seen.insert(node.id.as_str()) {
            problem = Some(format!("folder id `{}` appears more than once", node.id));
        }
    });
    match problem {
        Some(message) => Err(AppError::BadRequest(message)),
        None => Ok(()),
    }
}

fn find_by_id_mut<'a>(forest: &'a mut [FolderNode], id: &str) -> Option<&'a mut FolderNode> {
    for node in forest.iter_mut() {
        if node.id == id {
            return Some(node);
        }
        if let Some(found) = find_by_id_mut(&mut node.children, id) {
            return Some(found);
        }
    }
    None
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    pub(crate) fn folder(id: &str, children: Vec<FolderNode>) -> FolderNode {
        FolderNode {
            id: id.to_string(),
            name: format!("folder {}", id),
            open: false,
            default_language: "text".to_string(),
            children,
        }
    }

    /// `{A[B[C]], D}`
    pub(crate) fn sample_forest() -> Vec<FolderNode> {
        vec![
            folder("A", vec![folder("B", vec![folder("C", vec![])])]),
            folder("D", vec![]),
        ]
    }

    fn deep_forest(depth: usize) -> Vec<FolderNode> {
        let mut node = folder(&format!("n{}", depth), vec![]);
        for level in (0..depth).rev() {
            node = folder(&format!("n{}", level), vec![node, folder(&format!("leaf{}", level), vec![])]);
        }
        vec![node]
    }

    fn round_trip(forest: Vec<FolderNode>) {
        let list = serialize(&forest).unwrap();
        let doc = deserialize(json!({ "_id": "folders", "list": list })).unwrap();
        assert_eq!(doc.list, forest);
    }

    #[test]
    fn round_trips_empty_flat_and_deep_forests() {
        round_trip(vec![]);
        round_trip(sample_forest());
        round_trip(deep_forest(6));
    }

    #[test]
    fn serializes_with_document_field_names() {
        let list = serialize(&[folder("A", vec![])]).unwrap();
        assert_eq!(
            list,
            json!([{
                "id": "A",
                "name": "folder A",
                "open": false,
                "defaultLanguage": "text",
                "children": []
            }])
        );
    }

    #[test]
    fn deserializes_nodes_without_children_or_language() {
        let doc = deserialize(json!({
            "_id": "folders",
            "list": [{ "id": "A", "name": "Legacy" }]
        }))
        .unwrap();
        assert!(doc.list[0].children.is_empty());
        assert_eq!(doc.list[0].default_language, "text");
        assert!(!doc.list[0].open);
    }

    #[test]
    fn finds_nodes_at_any_depth() {
        let forest = sample_forest();
        assert_eq!(find_by_id(&forest, "C").map(|n| n.id.as_str()), Some("C"));
        assert_eq!(find_by_id(&forest, "D").map(|n| n.id.as_str()), Some("D"));
        assert!(find_by_id(&forest, "missing").is_none());
    }

    #[test]
    fn duplicate_ids_resolve_in_traversal_order() {
        let mut first = folder("X", vec![]);
        first.name = "nested".to_string();
        let forest = vec![folder("A", vec![first]), folder("X", vec![])];
        assert_eq!(find_by_id(&forest, "X").unwrap().name, "nested");
    }

    #[test]
    fn collects_the_whole_subtree_in_pre_order() {
        let forest = vec![
            folder("A", vec![folder("B", vec![folder("C", vec![])]), folder("E", vec![])]),
            folder("D", vec![]),
        ];
        let a = find_by_id(&forest, "A").unwrap();
        assert_eq!(collect_descendant_ids(a), vec!["A", "B", "C", "E"]);

        let d = find_by_id(&forest, "D").unwrap();
        assert_eq!(collect_descendant_ids(d), vec!["D"]);
    }

    #[test]
    fn descendant_ids_match_every_reachable_node() {
        let forest = deep_forest(5);
        let root = &forest[0];
        let mut reachable = Vec::new();
        visit(&forest, &mut |n| reachable.push(n.id.clone()));
        assert_eq!(collect_descendant_ids(root), reachable);
        assert_eq!(reachable.len(), 11);
    }

    #[test]
    fn removes_root_and_nested_nodes() {
        let mut forest = sample_forest();
        assert!(remove_by_id(&mut forest, "B"));
        assert_eq!(forest, vec![folder("A", vec![]), folder("D", vec![])]);

        assert!(remove_by_id(&mut forest, "A"));
        assert_eq!(forest, vec![folder("D", vec![])]);
    }

    #[test]
    fn removal_is_idempotent() {
        let mut forest = sample_forest();
        assert!(remove_by_id(&mut forest, "A"));
        let after_first = forest.clone();
        assert!(!remove_by_id(&mut forest, "A"));
        assert_eq!(forest, after_first);
    }

    #[test]
    fn validation_rejects_empty_reserved_and_repeated_ids() {
        assert!(validate(&sample_forest()).is_ok());
        assert!(validate(&[]).is_ok());

        for forest in [
            vec![folder("", vec![])],
            vec![folder("A", vec![folder("trash", vec![])])],
            vec![folder("X", vec![folder("X", vec![])])],
            vec![folder("A", vec![]), folder("B", vec![folder("A", vec![])])],
        ] {
            assert!(matches!(validate(&forest), Err(AppError::BadRequest(_))));
        }
    }

    #[test]
    fn update_changes_only_the_target_node() {
        let mut forest = sample_forest();
        let found = update_by_id(&mut forest, "B", |node| node.name = "Renamed".to_string());
        assert!(found);

        let mut expected = sample_forest();
        expected[0].children[0].name = "Renamed".to_string();
        assert_eq!(forest, expected);

        assert!(!update_by_id(&mut forest, "missing", |node| node.open = true));
        assert_eq!(forest, expected);
    }
}
