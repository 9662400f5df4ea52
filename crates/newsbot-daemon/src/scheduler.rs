//! 주기 실행 스케줄러.
//!
//! 각 사이클은 독립된 tokio 태스크로 돌며 공유 취소 토큰이 취소되면 멈춥니다.
//! 취소는 다음 실행의 예약만 막습니다. 이미 시작된 본문은 끝까지 실행됩니다.
//! 사이클 본문 전체가 실패하면 에러를 기록하고 backoff 만큼 쉰 뒤 계속합니다.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, Instrument};

use crate::stats::CycleStats;
use crate::Result;

/// 주기적으로 실행되는 사이클 본문.
///
/// 본문은 논리적으로 상태가 없어야 합니다. 필요한 상태는 주입된 저장소에서 읽고 씁니다.
#[async_trait]
pub trait Cycle: Send + Sync {
    fn name(&self) -> &'static str;

    async fn run_once(&self) -> Result<CycleStats>;
}

/// 사이클 실행 주기.
#[derive(Debug, Clone, Copy)]
pub struct Schedule {
    pub interval: Duration,
    pub error_backoff: Duration,
}

impl Schedule {
    pub fn new(interval: Duration, error_backoff: Duration) -> Self {
        Self {
            interval,
            error_backoff,
        }
    }
}

/// 취소될 때까지 사이클을 주기적으로 실행합니다.
///
/// 첫 실행은 즉시 일어나며, 밀린 tick은 건너뜁니다.
/// 취소는 tick 대기와 backoff 대기에서만 관찰됩니다.
pub async fn run_periodic(cycle: Arc<dyn Cycle>, schedule: Schedule, cancel: CancellationToken) {
    let name = cycle.name();
    info!(cycle = name, interval_secs = schedule.interval.as_secs(), "사이클 시작");

    let mut interval = tokio::time::interval(schedule.interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {}
        }

        let started = Instant::now();
        let outcome = cycle
            .run_once()
            .instrument(newsbot_core::cycle_span!(name))
            .await;

        match outcome {
            Ok(mut stats) => {
                stats.elapsed = started.elapsed();
                stats.log_summary(name);
            }
            Err(e) => {
                error!(cycle = name, error = %e, backoff_secs = schedule.error_backoff.as_secs(), "사이클 실패");
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(schedule.error_backoff) => {}
                }
            }
        }
    }

    info!(cycle = name, "사이클 종료");
}

/// 사이클 태스크 묶음.
pub struct Scheduler {
    cancel: CancellationToken,
    handles: Vec<(&'static str, JoinHandle<()>)>,
}

impl Scheduler {
    pub fn new(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            handles: Vec::new(),
        }
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// 사이클을 주기 태스크로 등록합니다.
    pub fn spawn_cycle(&mut self, cycle: Arc<dyn Cycle>, schedule: Schedule) {
        let name = cycle.name();
        let handle = tokio::spawn(run_periodic(cycle, schedule, self.cancel.clone()));
        self.handles.push((name, handle));
    }

    /// 임의의 장기 실행 태스크를 등록합니다 (봇 명령어 폴링 등).
    pub fn spawn_task<F>(&mut self, name: &'static str, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.handles.push((name, tokio::spawn(task)));
    }

    pub fn task_count(&self) -> usize {
        self.handles.len()
    }

    /// 모든 태스크가 끝날 때까지 기다립니다.
    pub async fn join(self) {
        for (name, handle) in self.handles {
            if let Err(e) = handle.await {
                error!(task = name, error = %e, "태스크 비정상 종료");
            }
        }
    }

    /// 취소 후 모든 태스크 종료를 기다립니다.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        self.join().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DaemonError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// 호출 횟수를 세고, 지정된 회차에는 실패하는 사이클.
    struct Counting {
        runs: AtomicUsize,
        fail_on: Option<usize>,
    }

    #[async_trait]
    impl Cycle for Counting {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn run_once(&self) -> Result<CycleStats> {
            let run = self.runs.fetch_add(1, Ordering::SeqCst) + 1;
            if Some(run) == self.fail_on {
                return Err(DaemonError::Config("boom".into()));
            }
            Ok(CycleStats::new())
        }
    }

    /// 본문이 오래 걸리는 사이클.
    struct Slow {
        started: AtomicUsize,
        finished: AtomicUsize,
    }

    #[async_trait]
    impl Cycle for Slow {
        fn name(&self) -> &'static str {
            "slow"
        }

        async fn run_once(&self) -> Result<CycleStats> {
            self.started.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_secs(5)).await;
            self.finished.fetch_add(1, Ordering::SeqCst);
            Ok(CycleStats::new())
        }
    }

    fn counting(fail_on: Option<usize>) -> Arc<Counting> {
        Arc::new(Counting {
            runs: AtomicUsize::new(0),
            fail_on,
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_on_interval_until_cancelled() {
        let cycle = counting(None);
        let cancel = CancellationToken::new();
        let schedule = Schedule::new(Duration::from_secs(60), Duration::from_secs(300));
        let task = tokio::spawn(run_periodic(cycle.clone(), schedule, cancel.clone()));

        // 즉시 1회, 이후 60초마다
        tokio::time::sleep(Duration::from_secs(150)).await;
        assert_eq!(cycle.runs.load(Ordering::SeqCst), 3);

        cancel.cancel();
        task.await.unwrap();

        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(cycle.runs.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_backs_off() {
        let cycle = counting(Some(1));
        let cancel = CancellationToken::new();
        let schedule = Schedule::new(Duration::from_secs(10), Duration::from_secs(60));
        let task = tokio::spawn(run_periodic(cycle.clone(), schedule, cancel.clone()));

        // 첫 실행 실패 후 60초 동안 대기
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(cycle.runs.load(Ordering::SeqCst), 1);

        // backoff 이후 재개
        tokio::time::sleep(Duration::from_secs(45)).await;
        assert!(cycle.runs.load(Ordering::SeqCst) >= 2);

        cancel.cancel();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_scheduler_shutdown_stops_every_task() {
        let first = counting(None);
        let second = counting(None);
        let mut scheduler = Scheduler::new(CancellationToken::new());
        let schedule = Schedule::new(Duration::from_secs(5), Duration::from_secs(5));
        scheduler.spawn_cycle(first.clone(), schedule);
        scheduler.spawn_cycle(second.clone(), schedule);

        let token = scheduler.cancel_token();
        scheduler.spawn_task("waiter", async move { token.cancelled().await });
        assert_eq!(scheduler.task_count(), 3);

        tokio::time::sleep(Duration::from_secs(12)).await;
        scheduler.shutdown().await;

        assert_eq!(first.runs.load(Ordering::SeqCst), 3);
        assert_eq!(second.runs.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_lets_running_cycle_finish() {
        let cycle = Arc::new(Slow {
            started: AtomicUsize::new(0),
            finished: AtomicUsize::new(0),
        });
        let cancel = CancellationToken::new();
        let schedule = Schedule::new(Duration::from_secs(60), Duration::from_secs(60));
        let task = tokio::spawn(run_periodic(cycle.clone(), schedule, cancel.clone()));

        // 본문 실행 도중 취소
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(cycle.started.load(Ordering::SeqCst), 1);
        cancel.cancel();
        task.await.unwrap();

        // 진행 중이던 본문은 끝까지 실행되고 다음 실행은 예약되지 않음
        assert_eq!(cycle.finished.load(Ordering::SeqCst), 1);
        assert_eq!(cycle.started.load(Ordering::SeqCst), 1);
    }
}
