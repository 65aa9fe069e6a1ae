//! # snipfold 서버 진입점
//!
//! 스니펫 정리 도구의 폴더 엔진을 로컬 HTTP API로 띄웁니다.
//!
//! 이 파일이 수행하는 작업:
//! 1. 환경변수(.env) 로딩
//! 2. 로깅(tracing) 초기화
//! 3. SQLite 데이터베이스 연결 풀 생성과 마이그레이션
//! 4. 폴더 트리 문서 준비, 지난 선택 복원
//! 5. API 라우터 설정과 HTTP 서버 시작

// ── 모듈 선언 ──
// `mod X;`는 같은 디렉토리의 `X.rs` 또는 `X/mod.rs`를 모듈로 가져옵니다.
mod config;
mod db;
mod error;
mod models;
mod routes;
mod services;

use anyhow::Result; // 시작 단계의 서로 다른 에러 타입(설정, sqlx, 마이그레이션, IO)을 한 타입으로 받습니다
use axum::Router;
use config::Config;
// 구체 저장소 타입과, 그것을 담을 트레이트 객체 타입
use db::{
    DocumentCollection, PreferenceStore, SqliteCollection, SqlitePreferenceStore,
    LIBRARY_COLLECTION, SNIPPETS_COLLECTION,
};
use routes::AppState;
use services::{ContentNotifier, FolderEngine, IdSource, SnippetFeed, UuidV7Ids};
use sqlx::sqlite::SqlitePoolOptions;
use std::{path::Path, sync::Arc};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt}; // .with() / .init()

// #[tokio::main]: main을 tokio 런타임 안에서 실행하는 매크로
#[tokio::main]
async fn main() -> Result<()> {
    // ── 1단계: 환경변수 로딩 ──
    // .ok(): .env 파일이 없어도 에러로 보지 않고 시스템 환경변수로 계속 진행합니다.
    dotenvy::dotenv().ok();

    // ── 2단계: 로깅 초기화 ──
    // registry 위에 필터(RUST_LOG)와 터미널 출력 레이어를 쌓습니다.
    tracing_subscriber::registry()
        .with(
            // RUST_LOG가 없으면 이 크레이트와 HTTP 요청 로그만 debug로 봅니다.
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "snipfold=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // ── 3단계: 설정 로딩 ──
    // VarError도 `?`로 anyhow::Error가 됩니다.
    let config = Config::from_env()?;
    tracing::info!("Starting snipfold on {}:{}", config.host, config.port);

    // `mode=rwc`로 DB 파일은 자동 생성되지만 디렉토리는 만들어주지 않습니다.
    let data_dir = Path::new(&config.data_dir);
    if !data_dir.exists() {
        tokio::fs::create_dir_all(data_dir).await?;
        tracing::info!("Created data directory: {}", config.data_dir);
    }

    // ── 4단계: SQLite 연결 풀과 마이그레이션 ──
    let pool = SqlitePoolOptions::new()
        .max_connections(5) // 단일 사용자 로컬 도구라 작은 풀로 충분합니다
        .connect(&config.database_url)
        .await?;

    // migrate!: ./migrations의 SQL 파일을 컴파일 시점에 바이너리에 포함시킵니다.
    // 이미 적용된 마이그레이션은 건너뜁니다.
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;

    // ── 5단계: 의존성 조립 ──
    // 엔진은 트레이트 객체만 받으므로 여기서 구체 타입을 정합니다.
    // pool.clone(): SqlitePool은 내부가 Arc라서 같은 풀을 공유합니다.
    let library: Arc<dyn DocumentCollection> =
        Arc::new(SqliteCollection::new(pool.clone(), LIBRARY_COLLECTION));
    let snippets: Arc<dyn DocumentCollection> =
        Arc::new(SqliteCollection::new(pool.clone(), SNIPPETS_COLLECTION));
    let preferences: Arc<dyn PreferenceStore> = Arc::new(SqlitePreferenceStore::new(pool));
    let ids: Arc<dyn IdSource> = Arc::new(UuidV7Ids);
    // 피드는 두 곳에서 씁니다: 엔진(알림 대상)과 라우트(목록 조회).
    // 같은 Arc를 복제해서 넘기므로 두 쪽이 같은 인스턴스를 봅니다.
    let feed = Arc::new(SnippetFeed::new(snippets.clone()));
    let notifier: Arc<dyn ContentNotifier> = feed.clone(); // Arc<SnippetFeed> → Arc<dyn ContentNotifier>

    let engine = Arc::new(FolderEngine::new(
        library,
        snippets.clone(),
        preferences,
        ids.clone(),
        notifier,
    ));

    // ── 6단계: 트리 문서 준비와 지난 선택 복원 ──
    // 첫 실행이면 빈 트리 문서를 만들고, 저장된 선택 힌트가 있으면 다시 선택합니다.
    engine.ensure_tree().await?;
    let selection = engine.restore_selection().await;
    tracing::info!(
        folders = engine.forest().await.len(),
        selected = ?selection.selected_id.as_ref().map(|target| target.as_str().to_string()),
        "Folder tree loaded"
    );

    // ── 7단계: 라우터와 미들웨어 ──
    // AppState의 필드는 모두 Arc라서 요청마다 clone되어도 비용이 거의 없습니다.
    let state = AppState {
        engine,
        feed,
        snippets,
        ids,
    };

    // 로컬 데스크톱 클라이언트(다른 origin)에서 호출하므로 CORS를 엽니다.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // .nest(): 모든 API 경로 앞에 /api/v1을 붙입니다. (/folders → /api/v1/folders)
    // .layer(): 바깥쪽에 요청/응답을 감싸는 미들웨어를 추가합니다.
    let app = Router::new()
        .nest("/api/v1", routes::api_router(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http()); // 요청마다 메서드/경로/지연시간 로그

    // ── 8단계: 서버 시작 ──
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    // Ctrl+C로 종료할 때까지 여기서 요청을 처리합니다.
    axum::serve(listener, app).await?;

    Ok(())
}
