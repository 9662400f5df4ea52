//! 지표 스냅샷 및 신호 분류 엔진.
//!
//! 일봉 시계열 → 유효 종가 추출 → EMA20/EMA50/RSI14/MACD(12,26,9) →
//! 규칙 기반 BUY/SELL/HOLD 분류.

use newsbot_core::{valid_closes, IndicatorSnapshot, PriceBar, Signal};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

use crate::indicators::{
    latest, EmaParams, IndicatorError, IndicatorResult, MacdParams, MomentumCalculator, RsiParams,
    TrendIndicators,
};

/// 분류 규칙 임계값.
///
/// 매수는 RSI 70 미만, 매도는 RSI 65 초과이며 이 비대칭은 의도된 값입니다.
#[derive(Debug, Clone, Copy)]
pub struct SignalRules {
    /// 분류에 필요한 최소 유효 종가 수
    pub min_bars: usize,
    /// BUY 조건의 RSI 상한 (미만)
    pub buy_rsi_below: Decimal,
    /// SELL 조건의 RSI 하한 (초과)
    pub sell_rsi_above: Decimal,
}

impl Default for SignalRules {
    fn default() -> Self {
        Self {
            min_bars: 20,
            buy_rsi_below: dec!(70),
            sell_rsi_above: dec!(65),
        }
    }
}

/// 통합 지표 엔진.
///
/// 부수 효과와 캐시가 없는 순수 계산기입니다.
#[derive(Debug, Default)]
pub struct IndicatorEngine {
    trend: TrendIndicators,
    momentum: MomentumCalculator,
    rules: SignalRules,
}

impl IndicatorEngine {
    /// 기본 규칙으로 엔진을 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: SignalRules) -> Self {
        Self {
            rules,
            ..Default::default()
        }
    }

    pub fn rules(&self) -> &SignalRules {
        &self.rules
    }

    /// 일봉 시계열을 분석하여 지표 스냅샷을 만듭니다.
    ///
    /// 종가가 0 이하인 일봉(제공자 결측치)은 건너뜁니다.
    /// 유효 종가가 `min_bars`개 미만이면 `InsufficientData`를 반환합니다.
    pub fn analyze(&self, symbol: &str, series: &[PriceBar]) -> IndicatorResult<IndicatorSnapshot> {
        let closes = valid_closes(series);
        self.analyze_closes(symbol, &closes)
    }

    /// 유효 종가 배열로부터 스냅샷을 계산합니다.
    pub fn analyze_closes(&self, symbol: &str, closes: &[Decimal]) -> IndicatorResult<IndicatorSnapshot> {
        if closes.len() < self.rules.min_bars {
            return Err(IndicatorError::InsufficientData {
                required: self.rules.min_bars,
                provided: closes.len(),
            });
        }

        let insufficient = || IndicatorError::InsufficientData {
            required: self.rules.min_bars,
            provided: closes.len(),
        };

        let ema20 = latest(&self.trend.ema(closes, EmaParams::new(20))?).ok_or_else(insufficient)?;
        let ema50 = latest(&self.trend.ema(closes, EmaParams::new(50))?).ok_or_else(insufficient)?;
        let rsi14 = latest(&self.momentum.rsi(closes, RsiParams::default())?).ok_or_else(insufficient)?;

        let macd = self.trend.macd(closes, MacdParams::default())?;
        let last_macd = macd.last().copied().ok_or_else(insufficient)?;
        let (macd_line, macd_signal, macd_histogram) =
            match (last_macd.macd, last_macd.signal, last_macd.histogram) {
                (Some(m), Some(s), Some(h)) => (m, s, h),
                _ => return Err(insufficient()),
            };

        let latest_price = *closes.last().ok_or_else(insufficient)?;

        let signal = self.classify(ema20, ema50, macd_line, macd_signal, rsi14);

        debug!(
            symbol,
            bars = closes.len(),
            %ema20,
            %ema50,
            %rsi14,
            %macd_line,
            %macd_signal,
            %signal,
            "지표 계산 완료"
        );

        Ok(IndicatorSnapshot {
            symbol: symbol.to_string(),
            latest_price,
            ema20,
            ema50,
            rsi14,
            macd_line,
            macd_signal,
            macd_histogram,
            signal,
        })
    }

    /// 분석 결과를 신호로 축약합니다. 데이터 부족이면 `InsufficientData`.
    pub fn signal_for(&self, symbol: &str, series: &[PriceBar]) -> Signal {
        match self.analyze(symbol, series) {
            Ok(snapshot) => snapshot.signal,
            Err(_) => Signal::InsufficientData,
        }
    }

    /// 규칙 기반 분류 (먼저 일치하는 규칙 적용).
    ///
    /// 1. `ema20 > ema50` 이고 `macd > signal` 이고 `rsi < 70` → BUY
    /// 2. `ema20 < ema50` 이고 `macd < signal` 이고 `rsi > 65` → SELL
    /// 3. 그 외 → HOLD
    pub fn classify(
        &self,
        ema20: Decimal,
        ema50: Decimal,
        macd_line: Decimal,
        macd_signal: Decimal,
        rsi14: Decimal,
    ) -> Signal {
        if ema20 > ema50 && macd_line > macd_signal && rsi14 < self.rules.buy_rsi_below {
            Signal::Buy
        } else if ema20 < ema50 && macd_line < macd_signal && rsi14 > self.rules.sell_rsi_above {
            Signal::Sell
        } else {
            Signal::Hold
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_rules() {
        let engine = IndicatorEngine::new();

        assert_eq!(
            engine.classify(dec!(11), dec!(10), dec!(1), dec!(0.5), dec!(69.9)),
            Signal::Buy
        );
        // RSI 70은 BUY가 아님
        assert_eq!(
            engine.classify(dec!(11), dec!(10), dec!(1), dec!(0.5), dec!(70)),
            Signal::Hold
        );
        assert_eq!(
            engine.classify(dec!(9), dec!(10), dec!(0.1), dec!(0.5), dec!(65.1)),
            Signal::Sell
        );
        // RSI 65는 SELL이 아님
        assert_eq!(
            engine.classify(dec!(9), dec!(10), dec!(0.1), dec!(0.5), dec!(65)),
            Signal::Hold
        );
        // EMA 동률은 어느 쪽도 아님
        assert_eq!(
            engine.classify(dec!(10), dec!(10), dec!(1), dec!(0.5), dec!(50)),
            Signal::Hold
        );
    }

    #[test]
    fn test_custom_min_bars() {
        let engine = IndicatorEngine::with_rules(SignalRules {
            min_bars: 30,
            ..Default::default()
        });
        let closes: Vec<Decimal> = (0..25).map(|i| Decimal::from(100 + i)).collect();

        assert!(matches!(
            engine.analyze_closes("X", &closes),
            Err(IndicatorError::InsufficientData {
                required: 30,
                provided: 25
            })
        ));
    }
}
