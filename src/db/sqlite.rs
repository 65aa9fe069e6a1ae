//! # SQLite 문서 컬렉션
//!
//! 모든 컬렉션은 `documents(collection, id, body)` 테이블 하나를 공유합니다.
//! `body`는 JSON 텍스트이며, 조건은 `json_extract()`로, 갱신은
//! `json_set()` / `json_insert()`로 SQL 한 문장 안에서 처리합니다.
//! 그래서 여러 문서를 한꺼번에 바꾸는 `multi` 갱신도 저장소 입장에서는 원자적입니다.

use super::{DocumentCollection, Filter, Patch, PreferenceStore, SqlValue, UpdateOptions};
use crate::error::AppError;
use async_trait::async_trait;
use serde_json::Value;
use sqlx::{
    query::Query,
    sqlite::{Sqlite, SqliteArguments},
    Row, SqlitePool,
};

/// 이름이 붙은 논리 컬렉션 하나
///
/// `SqlitePool`은 내부적으로 Arc이므로 clone해도 같은 풀을 가리킵니다.
#[derive(Clone)]
pub struct SqliteCollection {
    pool: SqlitePool,
    name: &'static str,
}

impl SqliteCollection {
    pub fn new(pool: SqlitePool, name: &'static str) -> Self {
        Self { pool, name }
    }
}

/// 동적으로 만든 바인딩 값들을 순서대로 `?` 자리에 채웁니다.
fn bind_values<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    values: Vec<SqlValue>,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for value in values {
        query = match value {
            SqlValue::Text(s) => query.bind(s),
            SqlValue::Int(i) => query.bind(i),
            SqlValue::Real(f) => query.bind(f),
        };
    }
    query
}

fn parse_body(body: &str) -> Result<Value, AppError> {
    Ok(serde_json::from_str(body)?)
}

#[async_trait]
impl DocumentCollection for SqliteCollection {
    async fn find_one(&self, filter: &Filter) -> Result<Option<Value>, AppError> {
        let (clause, binds) = filter.to_sql()?;
        let sql = format!(
            "SELECT body FROM documents WHERE collection = ? AND ({}) ORDER BY rowid LIMIT 1",
            clause
        );

        let row = bind_values(sqlx::query(&sql).bind(self.name), binds)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::read)?;

        match row {
            Some(row) => {
                let body: String = row.try_get("body").map_err(AppError::read)?;
                Ok(Some(parse_body(&body)?))
            }
            None => Ok(None),
        }
    }

    async fn find(&self, filter: &Filter) -> Result<Vec<Value>, AppError> {
        let (clause, binds) = filter.to_sql()?;
        let sql = format!(
            "SELECT body FROM documents WHERE collection = ? AND ({}) ORDER BY rowid",
            clause
        );

        let rows = bind_values(sqlx::query(&sql).bind(self.name), binds)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::read)?;

        rows.iter()
            .map(|row| {
                let body: String = row.try_get("body").map_err(AppError::read)?;
                parse_body(&body)
            })
            .collect()
    }

    async fn insert(&self, doc: Value) -> Result<(), AppError> {
        let id = doc
            .get("_id")
            .and_then(Value::as_str)
            .ok_or_else(|| AppError::BadRequest("document has no string `_id`".to_string()))?
            .to_string();

        sqlx::query("INSERT INTO documents (collection, id, body) VALUES (?, ?, ?)")
            .bind(self.name)
            .bind(&id)
            .bind(serde_json::to_string(&doc)?)
            .execute(&self.pool)
            .await
            .map_err(AppError::write)?;

        Ok(())
    }

    async fn update(
        &self,
        filter: &Filter,
        patch: &Patch,
        options: UpdateOptions,
    ) -> Result<u64, AppError> {
        let (set_expr, mut binds) = patch.to_sql()?;
        let (clause, filter_binds) = filter.to_sql()?;

        // 바인딩 순서: SET 식 → 컬렉션 이름 → (단건이면 하위 쿼리의 컬렉션 이름) → 조건절
        let sql = if options.multi {
            binds.push(SqlValue::Text(self.name.to_string()));
            format!(
                "UPDATE documents SET body = {} WHERE collection = ? AND ({})",
                set_expr, clause
            )
        } else {
            binds.push(SqlValue::Text(self.name.to_string()));
            binds.push(SqlValue::Text(self.name.to_string()));
            format!(
                "UPDATE documents SET body = {} WHERE collection = ? AND rowid IN \
                 (SELECT rowid FROM documents WHERE collection = ? AND ({}) ORDER BY rowid LIMIT 1)",
                set_expr, clause
            )
        };
        binds.extend(filter_binds);

        let result = bind_values(sqlx::query(&sql), binds)
            .execute(&self.pool)
            .await
            .map_err(AppError::write)?;

        Ok(result.rows_affected())
    }
}

/// `preferences` 테이블 기반 환경설정 저장소
#[derive(Clone)]
pub struct SqlitePreferenceStore {
    pool: SqlitePool,
}

impl SqlitePreferenceStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PreferenceStore for SqlitePreferenceStore {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM preferences WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::read)?;
        Ok(row.map(|(value,)| value))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        // UPSERT: 키가 이미 있으면 값만 바꿉니다.
        sqlx::query(
            "INSERT INTO preferences (key, value) VALUES (?, ?) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(AppError::write)?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM preferences WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(AppError::write)?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    // 메모리 DB는 연결마다 따로 생기므로 연결을 하나로 고정합니다.
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();
    pool
}
