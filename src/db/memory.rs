//! 테스트용 메모리 저장소.
//!
//! SQLite 구현과 같은 의미를 가지며, 읽기/쓰기 실패를 주입할 수 있어
//! "저장소 에러 시 작업이 일어나지 않는다"는 엔진 정책을 검증하는 데 씁니다.

use super::{DocumentCollection, Filter, Patch, PreferenceStore, UpdateOptions};
use crate::error::AppError;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Mutex;

#[derive(Default)]
pub struct MemoryCollection {
    docs: Mutex<Vec<Value>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_docs(docs: Vec<Value>) -> Self {
        Self {
            docs: Mutex::new(docs),
            ..Self::default()
        }
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// 지금까지 성공한 쓰기 연산(insert/update) 횟수
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub async fn snapshot(&self) -> Vec<Value> {
        self.docs.lock().await.clone()
    }

    fn check_read(&self) -> Result<(), AppError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::StoreRead("injected read failure".to_string()));
        }
        Ok(())
    }

    fn check_write(&self) -> Result<(), AppError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::StoreWrite("injected write failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentCollection for MemoryCollection {
    async fn find_one(&self, filter: &Filter) -> Result<Option<Value>, AppError> {
        self.check_read()?;
        let docs = self.docs.lock().await;
        Ok(docs.iter().find(|doc| filter.matches(doc)).cloned())
    }

    async fn find(&self, filter: &Filter) -> Result<Vec<Value>, AppError> {
        self.check_read()?;
        let docs = self.docs.lock().await;
        Ok(docs.iter().filter(|doc| filter.matches(doc)).cloned().collect())
    }

    async fn insert(&self, doc: Value) -> Result<(), AppError> {
        self.check_write()?;
        let id = doc
            .get("_id")
            .and_then(Value::as_str)
            .ok_or_else(|| AppError::BadRequest("document has no string `_id`".to_string()))?;

        let mut docs = self.docs.lock().await;
        if docs.iter().any(|d| d.get("_id").and_then(Value::as_str) == Some(id)) {
            return Err(AppError::StoreWrite(format!("duplicate _id `{}`", id)));
        }
        docs.push(doc);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn update(
        &self,
        filter: &Filter,
        patch: &Patch,
        options: UpdateOptions,
    ) -> Result<u64, AppError> {
        self.check_write()?;
        let mut docs = self.docs.lock().await;

        // 전부 적용에 성공한 뒤에만 반영해서 multi 갱신을 원자적으로 만듭니다.
        let mut working = docs.clone();
        let mut changed = 0;
        for doc in working.iter_mut().filter(|doc| filter.matches(doc)) {
            patch.apply(doc)?;
            changed += 1;
            if !options.multi {
                break;
            }
        }
        *docs = working;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(changed)
    }
}

#[derive(Default)]
pub struct MemoryPreferences {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PreferenceStore for MemoryPreferences {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.values.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.values
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        self.values.lock().await.remove(key);
        Ok(())
    }
}
