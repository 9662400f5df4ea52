//! 모멘텀 지표 (Momentum Indicators).
//!
//! - RSI (Relative Strength Index)

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::{IndicatorError, IndicatorResult};

/// RSI 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RsiParams {
    /// RSI 기간 (기본: 14).
    pub period: usize,
}

impl Default for RsiParams {
    fn default() -> Self {
        Self { period: 14 }
    }
}

/// 모멘텀 지표 계산기.
#[derive(Debug, Default)]
pub struct MomentumCalculator;

impl MomentumCalculator {
    /// 새로운 모멘텀 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// RSI (Relative Strength Index) 계산.
    ///
    /// RSI = 100 - (100 / (1 + RS)), RS = 평균 상승폭 / 평균 하락폭
    ///
    /// 평균은 Wilder 평활(α = 1/period)을 재귀적으로 적용하며,
    /// 첫 가격 변화를 초기값으로 사용합니다. `period`개의 가격 변화가
    /// 관측된 시점(인덱스 `period`)부터 값이 정의됩니다.
    /// 평균 하락폭이 0이면 100입니다.
    ///
    /// # 반환
    /// 0-100 사이의 RSI 값들 (처음 `period`개는 None)
    pub fn rsi(&self, prices: &[Decimal], params: RsiParams) -> IndicatorResult<Vec<Option<Decimal>>> {
        let period = params.period;

        if period == 0 {
            return Err(IndicatorError::InvalidParameter(
                "기간은 0보다 커야 합니다".to_string(),
            ));
        }

        if prices.len() < period + 1 {
            return Err(IndicatorError::InsufficientData {
                required: period + 1,
                provided: prices.len(),
            });
        }

        let alpha = Decimal::ONE / Decimal::from(period);
        let one_minus_alpha = Decimal::ONE - alpha;

        let mut result = Vec::with_capacity(prices.len());
        result.push(None);

        let mut avg_gain = Decimal::ZERO;
        let mut avg_loss = Decimal::ZERO;

        for (i, window) in prices.windows(2).enumerate() {
            let delta = window[1] - window[0];
            let gain = delta.max(Decimal::ZERO);
            let loss = (-delta).max(Decimal::ZERO);

            if i == 0 {
                avg_gain = gain;
                avg_loss = loss;
            } else {
                avg_gain = gain * alpha + avg_gain * one_minus_alpha;
                avg_loss = loss * alpha + avg_loss * one_minus_alpha;
            }

            // i + 1개의 변화가 관측됨
            if i + 1 < period {
                result.push(None);
            } else {
                result.push(Some(Self::rsi_value(avg_gain, avg_loss)));
            }
        }

        Ok(result)
    }

    fn rsi_value(avg_gain: Decimal, avg_loss: Decimal) -> Decimal {
        if avg_loss.is_zero() {
            return dec!(100);
        }
        let rs = avg_gain / avg_loss;
        dec!(100) - (dec!(100) / (Decimal::ONE + rs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rsi_all_gains_is_100() {
        let calc = MomentumCalculator::new();
        let prices: Vec<Decimal> = (0..30).map(|i| Decimal::from(100 + i)).collect();

        let rsi = calc.rsi(&prices, RsiParams::default()).unwrap();

        assert_eq!(rsi.len(), 30);
        assert!(rsi[13].is_none());
        assert_eq!(rsi[14], Some(dec!(100)));
        assert_eq!(rsi[29], Some(dec!(100)));
    }

    #[test]
    fn test_rsi_all_losses_is_0() {
        let calc = MomentumCalculator::new();
        let prices: Vec<Decimal> = (0..20).map(|i| Decimal::from(100 - i)).collect();

        let rsi = calc.rsi(&prices, RsiParams::default()).unwrap();
        assert_eq!(rsi[19], Some(Decimal::ZERO));
    }

    #[test]
    fn test_rsi_recursive_smoothing() {
        let calc = MomentumCalculator::new();
        // period 2, α = 0.5
        // 변화: +2, -1, +1
        // gain: 2 -> 0.5*0 + 0.5*2 = 1 -> 0.5*1 + 0.5*1 = 1
        // loss: 0 -> 0.5*1 + 0.5*0 = 0.5 -> 0.5*0 + 0.5*0.5 = 0.25
        let prices = vec![dec!(10), dec!(12), dec!(11), dec!(12)];

        let rsi = calc.rsi(&prices, RsiParams { period: 2 }).unwrap();

        assert_eq!(rsi[0], None);
        assert_eq!(rsi[1], None);
        // RS = 1 / 0.5 = 2 -> 100 - 100/3
        assert_eq!(rsi[2], Some(dec!(100) - dec!(100) / dec!(3)));
        // RS = 1 / 0.25 = 4 -> 80
        assert_eq!(rsi[3], Some(dec!(80)));
    }

    #[test]
    fn test_rsi_insufficient_data() {
        let calc = MomentumCalculator::new();
        let prices: Vec<Decimal> = (0..14).map(Decimal::from).collect();

        let err = calc.rsi(&prices, RsiParams::default()).unwrap_err();
        assert_eq!(
            err,
            IndicatorError::InsufficientData {
                required: 15,
                provided: 14
            }
        );
    }
}
