//! 가격 알림 저장소 및 평가기.
//!
//! 알림은 구독자별 목록으로 저장되며, 평가 시 현재가가 목표가 이상이면
//! 발동과 동시에 삭제됩니다 (fire-once). 시세가 없는 티커의 알림은 그대로 둡니다.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use newsbot_core::{Price, PriceAlert, SubscriberId, TriggeredAlert};
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::error::StoreError;
use crate::storage::{Persisted, SnapshotStore};

/// 구독자별 알림 목록. JSON 문서에서는 구독자 id가 키입니다.
pub type AlertBook = BTreeMap<SubscriberId, Vec<PriceAlert>>;

/// 한 번의 평가 결과.
#[derive(Debug, Default)]
pub struct AlertEvaluation {
    /// 발동되어 삭제된 알림
    pub fired: Vec<TriggeredAlert>,
    /// 시세가 있어 평가된 알림 수
    pub evaluated: usize,
    /// 시세가 없어 건너뛴 알림 수
    pub skipped: usize,
    /// 축소된 상태의 저장 실패. 메모리에 보관되어 다음 사이클에 재시도됩니다.
    pub persist_error: Option<StoreError>,
}

/// 영속 알림 저장소.
pub struct AlertStore {
    state: Persisted<AlertBook>,
}

impl AlertStore {
    pub fn new(store: impl SnapshotStore<AlertBook> + 'static) -> Self {
        Self {
            state: Persisted::new("alerts", store),
        }
    }

    /// 알림을 추가합니다. 동일한 알림도 중복으로 쌓입니다.
    ///
    /// 목표가는 0보다 커야 하고 티커는 비어 있으면 안 됩니다.
    /// 저장에 실패하면 알림은 등록되지 않습니다.
    pub async fn add_alert(
        &self,
        owner: SubscriberId,
        ticker: &str,
        target_price: Price,
    ) -> Result<PriceAlert, StoreError> {
        let ticker = ticker.trim();
        if ticker.is_empty() {
            return Err(StoreError::InvalidInput("티커가 비어 있습니다".to_string()));
        }
        if target_price <= Decimal::ZERO {
            return Err(StoreError::InvalidInput(format!(
                "목표가는 0보다 커야 합니다: {}",
                target_price
            )));
        }

        let alert = PriceAlert::new(ticker, target_price);

        let mut guard = self.state.lock().await;
        let mut book = guard.load().await?;
        book.entry(owner.clone()).or_default().push(alert.clone());
        guard.commit_or_discard(book).await?;

        info!(owner = %owner, ticker, target = %target_price, "가격 알림 등록");
        Ok(alert)
    }

    /// 해당 구독자의 해당 티커 알림을 모두 제거하고 제거한 개수를 반환합니다.
    pub async fn remove_alerts(&self, owner: &SubscriberId, ticker: &str) -> Result<usize, StoreError> {
        let ticker = ticker.trim();
        let mut guard = self.state.lock().await;
        let mut book = guard.load().await?;

        let removed = match book.get_mut(owner) {
            Some(alerts) => {
                let before = alerts.len();
                alerts.retain(|a| a.ticker != ticker);
                before - alerts.len()
            }
            None => 0,
        };

        if removed == 0 {
            return Ok(0);
        }

        book.retain(|_, alerts| !alerts.is_empty());
        guard.commit_or_discard(book).await?;
        info!(owner = %owner, ticker, removed, "가격 알림 삭제");
        Ok(removed)
    }

    /// 구독자의 알림 목록 (읽기 전용).
    pub async fn list_alerts(&self, owner: &SubscriberId) -> Result<Vec<PriceAlert>, StoreError> {
        let book = self.state.read().await?;
        Ok(book.get(owner).cloned().unwrap_or_default())
    }

    /// 저장된 모든 알림의 서로 다른 티커.
    pub async fn distinct_tickers(&self) -> Result<BTreeSet<String>, StoreError> {
        let book = self.state.read().await?;
        Ok(book
            .values()
            .flatten()
            .map(|a| a.ticker.clone())
            .collect())
    }

    /// 현재가로 모든 알림을 평가합니다.
    ///
    /// 발동된 알림은 같은 평가에서 삭제되고, 축소된 상태는 평가 끝에 저장됩니다.
    /// 저장이 실패해도 발동 목록은 반환되며, 축소된 상태는 메모리에 남아
    /// 같은 알림이 다시 발동하지 않습니다.
    pub async fn evaluate_cycle(
        &self,
        quotes: &HashMap<String, Price>,
    ) -> Result<AlertEvaluation, StoreError> {
        let mut guard = self.state.lock().await;
        let book = guard.load().await?;

        let mut evaluation = AlertEvaluation::default();
        let mut reduced = AlertBook::new();

        for (owner, alerts) in book {
            let mut kept = Vec::with_capacity(alerts.len());
            for alert in alerts {
                match quotes.get(&alert.ticker) {
                    Some(&price) => {
                        evaluation.evaluated += 1;
                        if alert.is_triggered(price) {
                            debug!(owner = %owner, ticker = %alert.ticker, %price, "알림 발동");
                            evaluation.fired.push(TriggeredAlert {
                                owner: owner.clone(),
                                ticker: alert.ticker,
                                target_price: alert.target_price,
                                current_price: price,
                            });
                        } else {
                            kept.push(alert);
                        }
                    }
                    None => {
                        evaluation.skipped += 1;
                        kept.push(alert);
                    }
                }
            }
            if !kept.is_empty() {
                reduced.insert(owner, kept);
            }
        }

        if !evaluation.fired.is_empty() || guard.is_pending() {
            if let Err(e) = guard.commit(reduced).await {
                evaluation.persist_error = Some(e);
            }
        }

        Ok(evaluation)
    }
}
