//! # 애플리케이션 설정(Configuration) 모듈
//!
//! 환경변수에서 서버 설정값을 읽어오는 모듈입니다.
//! `.env` 파일이나 시스템 환경변수에서 값을 가져옵니다.
//!
//! 설정 항목:
//! - `DATABASE_URL`: SQLite 데이터베이스 경로 (필수)
//! - `DATA_DIR`: 데이터베이스 파일이 놓일 디렉토리
//! - `HOST`: 서버 바인딩 주소
//! - `PORT`: 서버 포트 번호

// std::env: 프로세스 환경변수를 읽는 표준 라이브러리 모듈
// (.env 파일 내용은 main에서 dotenvy가 미리 환경변수로 올려둡니다)
use std::env;

/// 애플리케이션 전체 설정을 담는 구조체
///
/// 서버 시작 시 한 번 읽고, 필요한 값만 꺼내 각 구성 요소에 넘깁니다.
// Clone: 설정 일부를 다른 곳에 넘길 때 소유권 문제 없이 복제하기 위해 derive합니다.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite 데이터베이스 URL (예: "sqlite:data/snipfold.db?mode=rwc")
    /// `mode=rwc`: 읽기/쓰기 + 파일이 없으면 생성(create)
    pub database_url: String,
    /// 데이터 디렉토리 (기본값: "data"). 시작 시 없으면 생성합니다.
    pub data_dir: String,
    /// 서버가 바인딩할 호스트 주소 (기본값: "127.0.0.1")
    /// 로컬 전용 도구이므로 외부 인터페이스에는 열지 않습니다.
    pub host: String,
    /// 서버 포트 번호 (기본값: 3000)
    /// u16: 포트 번호 범위(0~65535)와 정확히 맞는 타입
    pub port: u16,
}

impl Config {
    /// 환경변수에서 설정값을 읽어 Config 인스턴스를 생성합니다.
    ///
    /// # 에러
    /// `DATABASE_URL`은 필수이며, 없으면 `VarError`를 반환합니다.
    /// 나머지 설정은 기본값이 있습니다.
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            // `?`: 변수가 없으면 여기서 바로 Err를 반환합니다.
            database_url: env::var("DATABASE_URL")?,

            // unwrap_or_else(|_| ...): Err일 때만 클로저를 실행해 기본값을 만듭니다.
            // 기본값 문자열은 필요할 때만 할당됩니다.
            data_dir: env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()),
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),

            // 문자열 → u16 변환. `.parse()`의 대상 타입은 필드 타입(u16)에서 추론됩니다.
            // 값이 없거나 숫자가 아니면 둘 다 3000으로 떨어집니다.
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
        })
    }
}
