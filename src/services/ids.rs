/// 고유 ID 생성기
///
/// 엔진은 ID의 형식을 알 필요가 없습니다. 테스트에서는 순차 ID로 바꿔 끼웁니다.
pub trait IdSource: Send + Sync {
    fn generate(&self) -> String;
}

/// UUIDv7 ID. 시간 기반이라 생성 순서대로 정렬됩니다.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidV7Ids;

impl IdSource for UuidV7Ids {
    fn generate(&self) -> String {
        uuid::Uuid::now_v7().to_string()
    }
}

#[cfg(test)]
pub(crate) struct SequentialIds {
    prefix: &'static str,
    next: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl SequentialIds {
    pub(crate) fn new(prefix: &'static str) -> Self {
        Self {
            prefix,
            next: std::sync::atomic::AtomicUsize::new(1),
        }
    }
}

#[cfg(test)]
impl IdSource for SequentialIds {
    fn generate(&self) -> String {
        let n = self.next.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        format!("{}{}", self.prefix, n)
    }
}
