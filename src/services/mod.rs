//! # 비즈니스 로직 모듈
//!
//! HTTP와 저장소 어느 쪽에도 묶이지 않는 폴더 관리 로직입니다.
//!
//! 각 하위 모듈:
//! - `tree`: 폴더 트리 코덱과 탐색/수정 함수 (순수 함수)
//! - `selection`: 선택 상태 → 스니펫 조건 변환 (순수 함수)
//! - `folders`: 폴더 엔진 (트리 변경, 선택, 연쇄 삭제)
//! - `feed`: 엔진의 알림을 받아 보이는 스니펫 목록을 갱신
//! - `ids`: 폴더 ID 생성기

pub mod feed;
pub mod folders;
pub mod ids;
pub mod selection;
pub mod tree;

pub use feed::{ContentNotifier, SnippetFeed};
pub use folders::FolderEngine;
pub use ids::{IdSource, UuidV7Ids};
