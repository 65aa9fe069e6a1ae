//! # 데이터 모델 모듈
//!
//! 각 하위 모듈은 특정 도메인의 데이터 타입을 담당합니다:
//! - `folder`: 폴더 노드와 트리 문서
//! - `selection`: 시스템 폴더와 선택 상태
//! - `snippet`: 스니펫(콘텐츠) 문서
//!
//! `pub use X::*;`로 재공개하여 `crate::models::FolderNode`처럼 짧게 접근합니다.

pub mod folder;
pub mod selection;
pub mod snippet;

pub use folder::*;
pub use selection::*;
pub use snippet::*;
