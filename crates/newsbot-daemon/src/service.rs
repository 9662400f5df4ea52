//! 시세 조회와 지표 분석을 묶은 서비스.
//!
//! 모든 사이클과 명령어가 같은 경로로 티커를 정규화하고 분석합니다.

use std::collections::HashMap;
use std::sync::Arc;

use newsbot_analytics::{IndicatorEngine, IndicatorError};
use newsbot_core::{normalize_symbol, Price, PriceChange, SignalReport};
use newsbot_data::QuoteProvider;
use tracing::{debug, warn};

/// 시세 제공자 + 지표 엔진.
pub struct MarketService {
    provider: Arc<dyn QuoteProvider>,
    engine: IndicatorEngine,
    lookback_days: u32,
    ticker_suffix: String,
}

impl MarketService {
    pub fn new(
        provider: Arc<dyn QuoteProvider>,
        engine: IndicatorEngine,
        lookback_days: u32,
        ticker_suffix: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            engine,
            lookback_days,
            ticker_suffix: ticker_suffix.into(),
        }
    }

    pub fn ticker_suffix(&self) -> &str {
        &self.ticker_suffix
    }

    /// 티커를 시세 조회용 심볼로 정규화합니다.
    pub fn normalize(&self, ticker: &str) -> String {
        normalize_symbol(ticker, &self.ticker_suffix)
    }

    /// 티커의 지표 스냅샷을 계산합니다.
    ///
    /// 조회 실패나 데이터 부족도 명시적인 결과로 반환합니다.
    pub async fn report(&self, ticker: &str) -> SignalReport {
        self.report_symbol(&self.normalize(ticker)).await
    }

    /// 이미 조회용 형태인 심볼의 스냅샷을 계산합니다 (접미사를 붙이지 않음).
    pub async fn report_symbol(&self, symbol: &str) -> SignalReport {
        let symbol = symbol.trim().to_string();

        let series = match self.provider.daily_series(&symbol, self.lookback_days).await {
            Ok(series) => series,
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "일봉 조회 실패");
                return SignalReport::Unavailable { symbol };
            }
        };

        match self.engine.analyze(&symbol, &series) {
            Ok(snapshot) => SignalReport::Ready(snapshot),
            Err(IndicatorError::InsufficientData { provided, .. }) => {
                debug!(symbol = %symbol, provided, "유효 종가 부족");
                SignalReport::InsufficientData { symbol, provided }
            }
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "지표 계산 실패");
                SignalReport::Unavailable { symbol }
            }
        }
    }

    /// 최근 종가와 전일 대비 변화.
    ///
    /// 일봉을 가져오지 못하면 최근가만으로 응답합니다 (변화율 없음).
    pub async fn price_change(&self, ticker: &str) -> Option<PriceChange> {
        let symbol = self.normalize(ticker);

        match self.provider.price_change(&symbol).await {
            Ok(change) => return Some(change),
            Err(e) => debug!(symbol = %symbol, error = %e, "일봉 기반 변화율 조회 실패, 최근가로 대체"),
        }

        match self.provider.latest_price(&symbol).await {
            Ok(last) => Some(PriceChange {
                symbol,
                last,
                previous: None,
            }),
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "시세 조회 실패");
                None
            }
        }
    }

    /// 티커마다 한 번씩 최근가를 조회합니다. 실패한 티커는 결과에서 빠집니다.
    ///
    /// 결과의 키는 입력 티커 문자열 그대로입니다.
    pub async fn latest_quotes<'a, I>(&self, tickers: I) -> HashMap<String, Price>
    where
        I: IntoIterator<Item = &'a String>,
    {
        let mut quotes = HashMap::new();
        for ticker in tickers {
            if quotes.contains_key(ticker) {
                continue;
            }
            let symbol = self.normalize(ticker);
            match self.provider.latest_price(&symbol).await {
                Ok(price) => {
                    quotes.insert(ticker.clone(), price);
                }
                Err(e) => warn!(symbol = %symbol, error = %e, "최근가 조회 실패, 이번 사이클에서 제외"),
            }
        }
        quotes
    }
}
