//! 가격 알림.
//!
//! 알림은 상향 돌파만 지원하며 한 번 발동하면 삭제됩니다 (재무장 없음).

use super::subscriber::SubscriberId;
use crate::types::Price;
use serde::{Deserialize, Serialize};

/// 구독자가 등록한 가격 알림.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceAlert {
    /// 시세 조회 심볼 (정규화된 형태)
    pub ticker: String,
    /// 목표 가격
    pub target_price: Price,
}

impl PriceAlert {
    pub fn new(ticker: impl Into<String>, target_price: Price) -> Self {
        Self {
            ticker: ticker.into(),
            target_price,
        }
    }

    /// 현재가가 목표가 이상이면 발동합니다.
    pub fn is_triggered(&self, current_price: Price) -> bool {
        current_price >= self.target_price
    }
}

/// 발동된 알림. 소유자에게 한 번 발송됩니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggeredAlert {
    pub owner: SubscriberId,
    pub ticker: String,
    pub target_price: Price,
    pub current_price: Price,
}
