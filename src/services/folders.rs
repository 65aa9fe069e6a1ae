//! # 폴더 엔진
//!
//! 폴더 트리의 생성/수정/삭제와 선택 상태를 관리하는 핵심 모듈입니다.
//!
//! ## 모든 변경 작업의 순서
//! 1. 저장소에서 트리 문서를 읽는다 (canonical copy)
//! 2. 읽어온 사본(working copy)을 수정한다
//! 3. 문서 전체를 저장한다
//! 4. 저장소에서 다시 읽어 메모리 트리를 교체한다
//! 5. 선택 상태를 다시 계산하고 스니펫 피드에 알린다
//!
//! 메모리 트리는 저장이 성공하고 다시 읽어온 뒤에만 바뀝니다.
//! 저장소 에러가 나면 그 단계에서 로그를 남기고 멈추며, 재시도는 하지 않습니다.
//!
//! ## 동시성
//! HTTP 요청은 동시에 들어올 수 있으므로 변경 작업은 `write_lock`으로 하나씩 실행합니다.
//! 읽기 전용 조회(`snapshot`, `forest` 등)는 잠금 없이 바로 반환합니다.

use crate::db::{
    DocumentCollection, Filter, Patch, PreferenceStore, UpdateOptions, SELECTED_FOLDER_KEY,
};
use crate::error::AppError;
use crate::models::{
    FolderNode, SelectionState, SelectionTarget, SystemFolder, TreeDocument, FOLDER_ID,
    IS_DELETED, TREE_DOCUMENT_ID,
};
use crate::services::feed::ContentNotifier;
use crate::services::ids::IdSource;
use crate::services::selection::resolve_query;
use crate::services::tree;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// 엔진이 메모리에 들고 있는 상태
#[derive(Debug, Default)]
struct EngineState {
    /// 마지막으로 다시 읽어온 canonical forest
    forest: Vec<FolderNode>,
    selection: SelectionState,
}

impl EngineState {
    /// 선택된 실제 폴더를 현재 forest에서 다시 찾아 `selected`/`selected_ids`를 맞춥니다.
    ///
    /// 폴더가 사라졌으면 둘 다 비웁니다. 시스템 폴더는 건드리지 않습니다.
    fn rematerialize_selection(&mut self) {
        let Some(SelectionTarget::Folder(id)) = &self.selection.selected_id else {
            return;
        };
        match tree::find_by_id(&self.forest, id) {
            Some(node) => {
                self.selection.selected_ids = Some(tree::collect_descendant_ids(node));
                self.selection.selected = Some(node.clone());
            }
            None => {
                self.selection.selected = None;
                self.selection.selected_ids = None;
            }
        }
    }

    fn query(&self) -> Option<Filter> {
        resolve_query(
            self.selection.selected_id.as_ref(),
            self.selection.selected_ids.as_deref(),
        )
    }
}

/// 폴더 엔진
///
/// 저장소, 환경설정, ID 생성기, 스니펫 피드는 모두 생성자로 주입받습니다.
/// `Arc<dyn Trait>`이므로 테스트에서는 메모리 구현을 넣을 수 있습니다.
pub struct FolderEngine {
    library: Arc<dyn DocumentCollection>,
    snippets: Arc<dyn DocumentCollection>,
    preferences: Arc<dyn PreferenceStore>,
    ids: Arc<dyn IdSource>,
    notifier: Arc<dyn ContentNotifier>,
    state: RwLock<EngineState>,
    write_lock: Mutex<()>,
}

impl FolderEngine {
    pub fn new(
        library: Arc<dyn DocumentCollection>,
        snippets: Arc<dyn DocumentCollection>,
        preferences: Arc<dyn PreferenceStore>,
        ids: Arc<dyn IdSource>,
        notifier: Arc<dyn ContentNotifier>,
    ) -> Self {
        Self {
            library,
            snippets,
            preferences,
            ids,
            notifier,
            state: RwLock::new(EngineState::default()),
            write_lock: Mutex::new(()),
        }
    }

    // ── 저장소 왕복 ──

    /// 트리 문서가 없으면 빈 forest로 만듭니다. 시작할 때 한 번 호출합니다.
    pub async fn ensure_tree(&self) -> Result<(), AppError> {
        let _guard = self.write_lock.lock().await;
        if self
            .library
            .find_one(&Filter::id(TREE_DOCUMENT_ID))
            .await?
            .is_none()
        {
            let doc = serde_json::to_value(TreeDocument::new(Vec::new()))?;
            self.library.insert(doc).await?;
            tracing::info!("Created empty folder tree document");
        }
        Ok(())
    }

    async fn load_tree(&self) -> Result<TreeDocument, AppError> {
        let doc = self
            .library
            .find_one(&Filter::id(TREE_DOCUMENT_ID))
            .await?
            .ok_or(AppError::NotFound)?;
        tree::deserialize(doc)
    }

    /// forest 전체를 트리 문서에 덮어씁니다.
    async fn persist(&self, forest: &[FolderNode]) -> Result<(), AppError> {
        let patch = Patch::Replace(json!({ "list": tree::serialize(forest)? }));
        let changed = self
            .library
            .update(&Filter::id(TREE_DOCUMENT_ID), &patch, UpdateOptions::single())
            .await?;
        if changed == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    /// 트리 문서를 다시 읽어 메모리 forest를 교체합니다.
    ///
    /// 실패하면 아무것도 바꾸지 않고 false를 반환합니다 (로그만 남김).
    async fn reload(&self) -> bool {
        match self.load_tree().await {
            Ok(doc) => {
                let mut state = self.state.write().await;
                state.forest = doc.list;
                state.rematerialize_selection();
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Folder tree reload failed, keeping previous tree");
                false
            }
        }
    }

    async fn notify_current(&self) {
        let query = self.state.read().await.query();
        if let Some(query) = query {
            self.notifier.refresh(query).await;
        }
    }

    // ── 조회 ──

    /// 트리 문서를 다시 읽고 현재 forest를 반환합니다.
    ///
    /// 문서가 없거나 읽기에 실패하면 조용히 이전 forest를 반환합니다.
    /// 호출자는 "갱신이 일어나지 않았을 수 있음"을 감안해야 합니다.
    pub async fn list(&self) -> Vec<FolderNode> {
        self.reload().await;
        self.forest().await
    }

    /// 저장소를 거치지 않고 메모리 forest를 반환합니다.
    pub async fn forest(&self) -> Vec<FolderNode> {
        self.state.read().await.forest.clone()
    }

    pub async fn snapshot(&self) -> SelectionState {
        self.state.read().await.selection.clone()
    }

    /// 선택된 실제 폴더의 기본 언어. 시스템 폴더나 선택 없음이면 None.
    pub async fn default_language(&self) -> Option<String> {
        self.state
            .read()
            .await
            .selection
            .selected
            .as_ref()
            .map(|folder| folder.default_language.clone())
    }

    pub async fn is_system_folder(&self) -> bool {
        matches!(
            self.state.read().await.selection.selected_id,
            Some(SelectionTarget::System(_))
        )
    }

    // ── 변경 ──

    /// 루트 레벨 끝에 `Untitled` 폴더를 추가하고, 선택 + 이름 편집 상태로 만듭니다.
    ///
    /// 현재 선택된 폴더의 하위로 만들지 않습니다. 항상 루트입니다.
    pub async fn create(&self) -> Result<FolderNode, AppError> {
        let _guard = self.write_lock.lock().await;

        let folder = FolderNode::untitled(self.ids.generate());
        let changed = self
            .library
            .update(
                &Filter::id(TREE_DOCUMENT_ID),
                &Patch::push("list", serde_json::to_value(&folder)?),
                UpdateOptions::single(),
            )
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "Failed to append folder"))?;
        if changed == 0 {
            tracing::warn!("Folder tree document is missing, folder not created");
            return Err(AppError::NotFound);
        }

        {
            let mut state = self.state.write().await;
            let selection = &mut state.selection;
            selection.selected_id = Some(SelectionTarget::Folder(folder.id.clone()));
            selection.selected = Some(folder.clone());
            selection.selected_ids = Some(vec![folder.id.clone()]);
            selection.editable_id = Some(folder.id.clone());
        }
        self.remember_selection(Some(&folder.id)).await;

        // 로컬에서 붙인 사본이 아니라 다시 읽어온 canonical 트리를 관찰자에게 보여줍니다.
        self.reload().await;
        self.notify_current().await;

        tracing::info!(folder_id = %folder.id, "Folder created");
        Ok(folder)
    }

    /// 트리 어디에 있든 `id` 폴더의 이름을 바꿉니다. 폴더가 없으면 `Ok(false)`.
    pub async fn rename(&self, id: &str, name: &str) -> Result<bool, AppError> {
        let _guard = self.write_lock.lock().await;
        let name = name.to_string();
        if !self
            .rewrite_node(id, |folder| folder.name = name)
            .await?
        {
            return Ok(false);
        }

        // 이름만 바뀌었으니 보이는 스니펫은 같지만, 조건을 다시 확인해 둡니다.
        self.notify_current().await;
        Ok(true)
    }

    /// 폴더의 기본 언어를 바꿉니다.
    ///
    /// 바뀐 폴더가 지금 선택된 폴더라면 선택 절차 전체를 다시 실행해서
    /// 언어 추론에 쓰이는 상태를 한 경로로만 갱신합니다.
    pub async fn set_default_language(&self, id: &str, language: &str) -> Result<bool, AppError> {
        let _guard = self.write_lock.lock().await;
        let language = language.to_string();
        if !self
            .rewrite_node(id, |folder| folder.default_language = language)
            .await?
        {
            return Ok(false);
        }

        let is_selected = matches!(
            &self.state.read().await.selection.selected_id,
            Some(SelectionTarget::Folder(selected)) if selected == id
        );
        if is_selected {
            self.select_unlocked(Some(id)).await;
        }
        Ok(true)
    }

    /// 사이드바에서 폴더를 펼치거나 접습니다. 스니펫 목록은 바뀌지 않습니다.
    pub async fn set_open(&self, id: &str, open: bool) -> Result<bool, AppError> {
        let _guard = self.write_lock.lock().await;
        self.rewrite_node(id, |folder| folder.open = open).await
    }

    /// 클라이언트가 보낸 forest로 트리 전체를 교체합니다 (드래그 앤 드롭 정렬).
    ///
    /// ID가 비었거나, 겹치거나, 시스템 폴더 태그와 같으면 저장하지 않고 `BadRequest`.
    pub async fn replace_all(&self, forest: Vec<FolderNode>) -> Result<Vec<FolderNode>, AppError> {
        tree::validate(&forest)?;
        let _guard = self.write_lock.lock().await;
        self.persist(&forest)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "Failed to replace folder tree"))?;
        self.reload().await;
        self.notify_current().await;
        Ok(self.forest().await)
    }

    /// 읽기 → 노드 하나 수정 → 저장 → 다시 읽기. 노드를 못 찾으면 저장하지 않고 false.
    async fn rewrite_node<F>(&self, id: &str, update: F) -> Result<bool, AppError>
    where
        F: FnOnce(&mut FolderNode),
    {
        let mut doc = self
            .load_tree()
            .await
            .inspect_err(|e| tracing::warn!(error = %e, folder_id = id, "Failed to load folder tree"))?;

        if !tree::update_by_id(&mut doc.list, id, update) {
            tracing::debug!(folder_id = id, "Folder not found, nothing to update");
            return Ok(false);
        }

        self.persist(&doc.list)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, folder_id = id, "Failed to save folder tree"))?;
        self.reload().await;
        Ok(true)
    }

    /// 폴더를 선택합니다.
    ///
    /// - `None`: 선택을 모두 비우고 저장된 선택 힌트도 지웁니다.
    /// - 시스템 폴더: `selected`와 `selected_ids`는 None
    /// - 실제 폴더: 트리에서 찾아 `selected`와 하위 ID 집합을 계산
    ///
    /// 선택한 ID는 다음 실행을 위해 환경설정에 저장됩니다.
    pub async fn select(&self, id: Option<&str>) -> SelectionState {
        let _guard = self.write_lock.lock().await;
        self.select_unlocked(id).await
    }

    async fn select_unlocked(&self, id: Option<&str>) -> SelectionState {
        let snapshot = {
            let mut state = self.state.write().await;
            match id {
                None => {
                    state.selection.selected_id = None;
                    state.selection.selected = None;
                    state.selection.selected_ids = None;
                }
                Some(id) => {
                    let target = SelectionTarget::from_id(id);
                    state.selection.selected = None;
                    state.selection.selected_ids = None;
                    state.selection.selected_id = Some(target);
                    state.rematerialize_selection();
                }
            }
            state.selection.clone()
        };

        self.remember_selection(id).await;
        self.notify_current().await;
        snapshot
    }

    /// 선택 힌트를 환경설정에 저장하거나 지웁니다. 실패해도 선택 자체는 유지됩니다.
    async fn remember_selection(&self, id: Option<&str>) {
        let result = match id {
            Some(id) => self.preferences.set(SELECTED_FOLDER_KEY, id).await,
            None => self.preferences.delete(SELECTED_FOLDER_KEY).await,
        };
        if let Err(e) = result {
            tracing::warn!(error = %e, "Failed to persist selected folder hint");
        }
    }

    /// 스니펫 컬렉션이 바깥에서 바뀌었을 때(새 스니펫 추가 등) 현재 선택 조건으로 다시 알립니다.
    ///
    /// 다른 변경 작업과 같은 잠금 아래에서 조건을 읽고 알리므로,
    /// 그 사이에 바뀐 선택의 목록을 오래된 조건으로 덮어쓰지 않습니다.
    pub async fn refresh_content(&self) {
        let _guard = self.write_lock.lock().await;
        self.notify_current().await;
    }

    /// 이름 편집 모드를 끝냅니다.
    pub async fn clear_editable(&self) {
        self.state.write().await.selection.editable_id = None;
    }

    /// 폴더와 그 하위 폴더 전체를 트리에서 제거하고, 그 안의 스니펫을 휴지통으로 보냅니다.
    ///
    /// 휴지통으로 보낼 폴더 집합은 방금 읽어온 트리에서 `id`를 기준으로 계산합니다.
    /// 두 효과(스니펫 일괄 플래그, 트리 저장)는 서로를 기다리지 않고 함께 실행되며,
    /// 한쪽이 실패해도 다른 쪽은 되돌리지 않습니다.
    ///
    /// 트리에서 폴더를 찾지 못하면 아무것도 하지 않고 `Ok(false)`.
    pub async fn delete(&self, id: &str) -> Result<bool, AppError> {
        let _guard = self.write_lock.lock().await;

        let mut doc = self
            .load_tree()
            .await
            .inspect_err(|e| tracing::warn!(error = %e, folder_id = id, "Failed to load folder tree"))?;
        let Some(node) = tree::find_by_id(&doc.list, id) else {
            tracing::debug!(folder_id = id, "Folder not found, nothing to delete");
            return Ok(false);
        };
        let ids = tree::collect_descendant_ids(node);
        tree::remove_by_id(&mut doc.list, id);

        let (trashed, removed) = tokio::join!(self.trash_content(&ids), self.persist(&doc.list));

        match &trashed {
            Ok(count) => tracing::info!(folder_id = id, snippets = count, "Moved folder snippets to trash"),
            Err(e) => tracing::warn!(error = %e, folder_id = id, "Failed to trash folder snippets"),
        }

        match &removed {
            Ok(()) => {
                tracing::info!(folder_id = id, folders = ids.len(), "Folder subtree removed");
                self.reload().await;
                {
                    let mut state = self.state.write().await;
                    if state
                        .selection
                        .editable_id
                        .as_ref()
                        .is_some_and(|editable| ids.contains(editable))
                    {
                        state.selection.editable_id = None;
                    }
                }
                self.select_unlocked(Some(SystemFolder::AllSnippets.as_str()))
                    .await;
            }
            Err(e) => {
                tracing::warn!(error = %e, folder_id = id, "Failed to save folder tree after removal");
                // 스니펫은 휴지통으로 갔으니 목록은 새로 고칩니다.
                if trashed.is_ok() {
                    self.notify_current().await;
                }
            }
        }

        removed?;
        trashed?;
        Ok(true)
    }

    /// `folderId ∈ ids`인 스니펫을 한 번의 일괄 갱신으로 휴지통 표시합니다.
    async fn trash_content(&self, ids: &[String]) -> Result<u64, AppError> {
        self.snippets
            .update(
                &Filter::is_in(FOLDER_ID, ids.iter().cloned()),
                &Patch::set(IS_DELETED, true),
                UpdateOptions::multi(),
            )
            .await
    }

    /// 시작 시 트리를 읽고, 지난 실행에서 저장한 선택을 복원합니다.
    pub async fn restore_selection(&self) -> SelectionState {
        self.list().await;
        match self.preferences.get(SELECTED_FOLDER_KEY).await {
            Ok(Some(id)) => {
                tracing::info!(selected = %id, "Restoring selected folder");
                self.select(Some(&id)).await
            }
            Ok(None) => self.snapshot().await,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read selected folder hint");
                self.snapshot().await
            }
        }
    }
}
