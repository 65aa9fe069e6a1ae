//! # 조회 조건(Filter)과 갱신 연산(Patch)
//!
//! 문서 저장소 어댑터가 이해하는 작은 질의 언어입니다.
//! 선택 상태에서 계산한 스니펫 조건(`folderId ∈ ids`, `isDeleted = true` 등)도
//! 같은 `Filter` 타입으로 표현합니다.
//!
//! 하나의 `Filter`는 두 가지 방식으로 평가됩니다:
//! - `matches()`: 메모리의 JSON 값에 직접 적용
//! - `to_sql()`: SQLite의 `json_extract()` 조건절로 컴파일

use crate::error::AppError;
use serde_json::{Map, Value};

/// 문서 조회 조건
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// 조건 없음 (모든 문서)
    All,
    /// `_id = id`
    Id(String),
    /// `field = value`. value가 null이면 필드가 없거나 null인 문서와 일치합니다.
    Eq(String, Value),
    /// `field ∈ values`. values가 비어 있으면 어떤 문서와도 일치하지 않습니다.
    In(String, Vec<Value>),
    /// 모든 하위 조건을 만족
    And(Vec<Filter>),
}

/// SQL 자리표시자(`?`)에 바인딩할 값
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    Int(i64),
    Real(f64),
}

impl Filter {
    pub fn id(id: impl Into<String>) -> Self {
        Filter::Id(id.into())
    }

    pub fn eq(field: &str, value: impl Into<Value>) -> Self {
        Filter::Eq(field.to_string(), value.into())
    }

    pub fn is_in<I, V>(field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Filter::In(field.to_string(), values.into_iter().map(Into::into).collect())
    }

    /// 메모리의 JSON 문서가 이 조건을 만족하는지 검사합니다.
    pub fn matches(&self, doc: &Value) -> bool {
        match self {
            Filter::All => true,
            Filter::Id(id) => doc.get("_id").and_then(Value::as_str) == Some(id.as_str()),
            Filter::Eq(field, Value::Null) => matches!(doc.get(field), None | Some(Value::Null)),
            Filter::Eq(field, value) => doc.get(field) == Some(value),
            Filter::In(field, values) => doc
                .get(field)
                .map_or(false, |found| values.contains(found)),
            Filter::And(filters) => filters.iter().all(|f| f.matches(doc)),
        }
    }

    /// SQLite 조건절과 바인딩 값 목록으로 컴파일합니다.
    ///
    /// 반환되는 조건절은 `documents.body` 컬럼을 기준으로 합니다.
    /// 예: `Filter::eq("isDeleted", true)` → `("json_extract(body, '$.isDeleted') = ?", [Int(1)])`
    pub fn to_sql(&self) -> Result<(String, Vec<SqlValue>), AppError> {
        let mut binds = Vec::new();
        let clause = self.write_sql(&mut binds)?;
        Ok((clause, binds))
    }

    fn write_sql(&self, binds: &mut Vec<SqlValue>) -> Result<String, AppError> {
        let clause = match self {
            Filter::All => "1 = 1".to_string(),
            Filter::Id(id) => {
                binds.push(SqlValue::Text(id.clone()));
                "id = ?".to_string()
            }
            Filter::Eq(field, Value::Null) => format!("{} IS NULL", json_path(field)?),
            Filter::Eq(field, value) => {
                binds.push(sql_scalar(value)?);
                format!("{} = ?", json_path(field)?)
            }
            // IN () 은 SQLite 문법상 허용되지만, 의도를 드러내기 위해 명시적으로 거짓을 씁니다.
            Filter::In(_, values) if values.is_empty() => "1 = 0".to_string(),
            Filter::In(field, values) => {
                for value in values {
                    binds.push(sql_scalar(value)?);
                }
                let placeholders = vec!["?"; values.len()].join(", ");
                format!("{} IN ({})", json_path(field)?, placeholders)
            }
            Filter::And(filters) if filters.is_empty() => "1 = 1".to_string(),
            Filter::And(filters) => {
                let mut parts = Vec::with_capacity(filters.len());
                for filter in filters {
                    parts.push(format!("({})", filter.write_sql(binds)?));
                }
                parts.join(" AND ")
            }
        };
        Ok(clause)
    }
}

/// 문서 갱신 연산
#[derive(Debug, Clone, PartialEq)]
pub enum Patch {
    /// 문서 전체 교체. `_id`는 유지됩니다.
    Replace(Value),
    /// 지정한 필드만 덮어쓰기 (`$set`)
    Set(Map<String, Value>),
    /// 배열 필드 끝에 값 추가 (`$push`). 필드가 없으면 새 배열을 만듭니다.
    Push { field: String, value: Value },
}

impl Patch {
    /// 필드 하나짜리 `$set`
    pub fn set(field: &str, value: impl Into<Value>) -> Self {
        let mut fields = Map::new();
        fields.insert(field.to_string(), value.into());
        Patch::Set(fields)
    }

    pub fn push(field: &str, value: Value) -> Self {
        Patch::Push {
            field: field.to_string(),
            value,
        }
    }

    /// 메모리의 문서에 연산을 적용합니다.
    pub fn apply(&self, doc: &mut Value) -> Result<(), AppError> {
        let id = doc.get("_id").cloned();
        let object = doc
            .as_object_mut()
            .ok_or_else(|| AppError::BadRequest("document is not an object".to_string()))?;

        match self {
            Patch::Replace(replacement) => {
                let mut replacement = replacement
                    .as_object()
                    .cloned()
                    .ok_or_else(|| AppError::BadRequest("replacement is not an object".to_string()))?;
                if let Some(id) = id {
                    replacement.insert("_id".to_string(), id);
                }
                *object = replacement;
            }
            Patch::Set(fields) => {
                for (key, value) in fields {
                    object.insert(key.clone(), value.clone());
                }
            }
            Patch::Push { field, value } => {
                let slot = object
                    .entry(field.clone())
                    .or_insert_with(|| Value::Array(Vec::new()));
                match slot {
                    Value::Array(items) => items.push(value.clone()),
                    _ => {
                        return Err(AppError::BadRequest(format!(
                            "field `{}` is not an array",
                            field
                        )))
                    }
                }
            }
        }
        Ok(())
    }

    /// `UPDATE documents SET body = <식>`의 오른쪽 식과 바인딩 값 목록을 만듭니다.
    ///
    /// 모든 값은 JSON 텍스트로 바인딩하고 `json(?)`으로 감싸서,
    /// 문자열이 아닌 JSON 값(true, 숫자, 객체)으로 저장되게 합니다.
    pub fn to_sql(&self) -> Result<(String, Vec<SqlValue>), AppError> {
        match self {
            Patch::Replace(replacement) => {
                if !replacement.is_object() {
                    return Err(AppError::BadRequest("replacement is not an object".to_string()));
                }
                // `_id`는 행의 id 컬럼에서 다시 채웁니다.
                Ok((
                    "json_set(json(?), '$._id', id)".to_string(),
                    vec![SqlValue::Text(serde_json::to_string(replacement)?)],
                ))
            }
            Patch::Set(fields) if fields.is_empty() => Ok(("body".to_string(), Vec::new())),
            Patch::Set(fields) => {
                let mut pairs = Vec::with_capacity(fields.len());
                let mut binds = Vec::with_capacity(fields.len());
                for (key, value) in fields {
                    check_field(key)?;
                    pairs.push(format!("'$.{}', json(?)", key));
                    binds.push(SqlValue::Text(serde_json::to_string(value)?));
                }
                Ok((format!("json_set(body, {})", pairs.join(", ")), binds))
            }
            Patch::Push { field, value } => {
                check_field(field)?;
                let expr = format!(
                    "json_set(body, '$.{f}', json_insert(COALESCE(json_extract(body, '$.{f}'), json_array()), '$[#]', json(?)))",
                    f = field
                );
                Ok((expr, vec![SqlValue::Text(serde_json::to_string(value)?)]))
            }
        }
    }
}

/// 필드명은 영문자, 숫자, `_`만 허용합니다. SQL 문자열에 그대로 들어가기 때문입니다.
fn check_field(field: &str) -> Result<(), AppError> {
    let valid = !field.is_empty()
        && field
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!("invalid field name `{}`", field)))
    }
}

fn json_path(field: &str) -> Result<String, AppError> {
    check_field(field)?;
    Ok(format!("json_extract(body, '$.{}')", field))
}

/// JSON 스칼라 값을 SQL 바인딩 값으로 바꿉니다.
///
/// SQLite의 `json_extract()`는 JSON true/false를 정수 1/0으로 돌려주므로
/// bool도 정수로 바인딩합니다.
fn sql_scalar(value: &Value) -> Result<SqlValue, AppError> {
    match value {
        Value::Bool(b) => Ok(SqlValue::Int(i64::from(*b))),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Ok(SqlValue::Int(i)),
            None => n
                .as_f64()
                .map(SqlValue::Real)
                .ok_or_else(|| AppError::BadRequest(format!("unsupported number {}", n))),
        },
        Value::String(s) => Ok(SqlValue::Text(s.clone())),
        other => Err(AppError::BadRequest(format!(
            "cannot compare against {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_filter_matches_missing_and_null_fields() {
        let filter = Filter::eq("folderId", Value::Null);
        assert!(filter.matches(&json!({ "_id": "1", "folderId": null })));
        assert!(filter.matches(&json!({ "_id": "2" })));
        assert!(!filter.matches(&json!({ "_id": "3", "folderId": "A" })));
    }

    #[test]
    fn in_filter_matches_listed_values_only() {
        let filter = Filter::is_in("folderId", ["A", "B"]);
        assert!(filter.matches(&json!({ "folderId": "B" })));
        assert!(!filter.matches(&json!({ "folderId": "C" })));
        assert!(!filter.matches(&json!({})));
        assert!(!Filter::is_in("folderId", Vec::<String>::new()).matches(&json!({ "folderId": "A" })));
    }

    #[test]
    fn and_filter_requires_every_branch() {
        let filter = Filter::And(vec![Filter::id("x"), Filter::eq("isDeleted", true)]);
        assert!(filter.matches(&json!({ "_id": "x", "isDeleted": true })));
        assert!(!filter.matches(&json!({ "_id": "x", "isDeleted": false })));
        assert!(!filter.matches(&json!({ "_id": "y", "isDeleted": true })));
    }

    #[test]
    fn compiles_filters_to_json_extract() {
        let (clause, binds) = Filter::eq("isDeleted", true).to_sql().unwrap();
        assert_eq!(clause, "json_extract(body, '$.isDeleted') = ?");
        assert_eq!(binds, vec![SqlValue::Int(1)]);

        let (clause, binds) = Filter::is_in("folderId", ["A", "B"]).to_sql().unwrap();
        assert_eq!(clause, "json_extract(body, '$.folderId') IN (?, ?)");
        assert_eq!(
            binds,
            vec![SqlValue::Text("A".into()), SqlValue::Text("B".into())]
        );

        let (clause, binds) = Filter::eq("folderId", Value::Null).to_sql().unwrap();
        assert_eq!(clause, "json_extract(body, '$.folderId') IS NULL");
        assert!(binds.is_empty());
    }

    #[test]
    fn rejects_field_names_that_would_break_the_path() {
        let err = Filter::eq("a'); DROP TABLE documents; --", 1).to_sql();
        assert!(matches!(err, Err(AppError::BadRequest(_))));
        assert!(matches!(
            Patch::set("x.y", 1).to_sql(),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn replace_keeps_the_document_id() {
        let mut doc = json!({ "_id": "folders", "list": [] });
        Patch::Replace(json!({ "list": [{ "id": "A" }] }))
            .apply(&mut doc)
            .unwrap();
        assert_eq!(doc, json!({ "_id": "folders", "list": [{ "id": "A" }] }));
    }

    #[test]
    fn push_creates_the_array_when_missing() {
        let mut doc = json!({ "_id": "folders" });
        Patch::push("list", json!({ "id": "A" })).apply(&mut doc).unwrap();
        Patch::push("list", json!({ "id": "B" })).apply(&mut doc).unwrap();
        assert_eq!(doc["list"], json!([{ "id": "A" }, { "id": "B" }]));

        let mut scalar = json!({ "_id": "x", "list": 3 });
        assert!(Patch::push("list", json!(1)).apply(&mut scalar).is_err());
    }
}
