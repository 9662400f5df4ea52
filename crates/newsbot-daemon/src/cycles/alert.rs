//! 가격 알림 사이클.

use std::sync::Arc;

use async_trait::async_trait;
use newsbot_data::AlertStore;
use newsbot_notification::{Broadcaster, NotificationEvent};
use tracing::error;

use crate::scheduler::Cycle;
use crate::service::MarketService;
use crate::stats::CycleStats;
use crate::Result;

/// 저장된 알림을 현재가로 평가하고 발동한 알림을 소유자에게 보냅니다.
///
/// 축소된 알림 상태는 발송 전에 저장됩니다.
pub struct AlertCycle {
    alerts: Arc<AlertStore>,
    market: Arc<MarketService>,
    broadcaster: Broadcaster,
}

impl AlertCycle {
    pub fn new(alerts: Arc<AlertStore>, market: Arc<MarketService>, broadcaster: Broadcaster) -> Self {
        Self {
            alerts,
            market,
            broadcaster,
        }
    }
}

#[async_trait]
impl Cycle for AlertCycle {
    fn name(&self) -> &'static str {
        "alert"
    }

    async fn run_once(&self) -> Result<CycleStats> {
        let mut stats = CycleStats::new();

        // FETCHING: 서로 다른 티커마다 한 번씩 조회
        let tickers = self.alerts.distinct_tickers().await?;
        if tickers.is_empty() {
            return Ok(stats);
        }
        stats.total = tickers.len();

        let quotes = self.market.latest_quotes(&tickers).await;
        stats.success = quotes.len();
        stats.skipped = tickers.len() - quotes.len();

        // PROCESSING + PERSISTING
        let evaluation = self.alerts.evaluate_cycle(&quotes).await?;
        if let Some(e) = &evaluation.persist_error {
            stats.errors += 1;
            error!(error = %e, "알림 상태 저장 실패, 메모리 상태로 계속");
        }

        // DISPATCHING
        for alert in evaluation.fired {
            let owner = alert.owner.clone();
            if self
                .broadcaster
                .send_to(&owner, &NotificationEvent::AlertTriggered(alert))
                .await
            {
                stats.dispatched += 1;
            } else {
                stats.dispatch_failed += 1;
            }
        }

        Ok(stats)
    }
}
