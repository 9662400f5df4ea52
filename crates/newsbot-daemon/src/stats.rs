//! 사이클 통계 구조체.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 사이클 한 번의 통계
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CycleStats {
    /// 처리 대상 수 (뉴스 후보, 알림 티커, 다이제스트 티커)
    pub total: usize,
    /// 성공 (새 뉴스, 시세 조회 성공, 분석 완료)
    pub success: usize,
    /// 에러 횟수
    pub errors: usize,
    /// 건너뛴 횟수 (이미 본 뉴스, 시세 없음)
    pub skipped: usize,
    /// 발송 성공 메시지 수
    pub dispatched: usize,
    /// 발송 실패 메시지 수
    pub dispatch_failed: usize,
    /// 소요 시간
    #[serde(skip)]
    pub elapsed: Duration,
}

impl CycleStats {
    /// 새 통계 객체 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 아무 작업도 하지 않은 사이클인지 확인
    pub fn is_idle(&self) -> bool {
        self.total == 0 && self.dispatched == 0 && self.dispatch_failed == 0 && self.errors == 0
    }

    /// 발송 결과 누적
    pub fn record_dispatch(&mut self, report: newsbot_notification::DispatchReport) {
        self.dispatched += report.sent;
        self.dispatch_failed += report.failed;
    }

    /// 통계 요약 로그 출력
    pub fn log_summary(&self, cycle: &str) {
        if self.is_idle() {
            tracing::debug!(cycle, "처리할 항목 없음");
            return;
        }

        tracing::info!(
            cycle = cycle,
            total = self.total,
            success = self.success,
            errors = self.errors,
            skipped = self.skipped,
            dispatched = self.dispatched,
            dispatch_failed = self.dispatch_failed,
            elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
            "사이클 완료"
        );
    }
}
