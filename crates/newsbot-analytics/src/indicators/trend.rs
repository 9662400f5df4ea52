//! 추세 지표 (Trend Indicators).
//!
//! 이동평균 기반의 추세 지표들을 제공합니다.
//! - SMA (Simple Moving Average)
//! - EMA (Exponential Moving Average)
//! - MACD (Moving Average Convergence Divergence)

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::{IndicatorError, IndicatorResult};

/// SMA 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SmaParams {
    /// 이동평균 기간.
    pub period: usize,
}

impl Default for SmaParams {
    fn default() -> Self {
        Self { period: 20 }
    }
}

/// EMA 초기값 결정 방식.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmaSeed {
    /// 첫 가격을 초기값으로 사용. 첫 시점부터 값이 정의됩니다.
    #[default]
    FirstValue,
    /// 첫 `period`개의 SMA를 초기값으로 사용. 처음 period-1개는 None.
    Sma,
}

/// EMA 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EmaParams {
    /// 이동평균 기간.
    pub period: usize,
    /// 초기값 방식.
    #[serde(default)]
    pub seed: EmaSeed,
}

impl EmaParams {
    /// 첫 값 시드 EMA 파라미터.
    pub fn new(period: usize) -> Self {
        Self {
            period,
            seed: EmaSeed::FirstValue,
        }
    }

    /// SMA 시드 EMA 파라미터.
    pub fn sma_seeded(period: usize) -> Self {
        Self {
            period,
            seed: EmaSeed::Sma,
        }
    }
}

impl Default for EmaParams {
    fn default() -> Self {
        Self::new(12)
    }
}

/// MACD 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MacdParams {
    /// 단기 EMA 기간 (기본: 12).
    pub fast_period: usize,
    /// 장기 EMA 기간 (기본: 26).
    pub slow_period: usize,
    /// 시그널 라인 기간 (기본: 9).
    pub signal_period: usize,
    /// 세 EMA 모두에 적용되는 초기값 방식.
    #[serde(default)]
    pub seed: EmaSeed,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
            seed: EmaSeed::FirstValue,
        }
    }
}

/// MACD 결과.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdResult {
    /// MACD 라인 (단기 EMA - 장기 EMA).
    pub macd: Option<Decimal>,
    /// 시그널 라인 (MACD의 EMA).
    pub signal: Option<Decimal>,
    /// 히스토그램 (MACD - 시그널).
    pub histogram: Option<Decimal>,
}

impl MacdResult {
    const EMPTY: Self = Self {
        macd: None,
        signal: None,
        histogram: None,
    };
}

/// 추세 지표 계산기.
#[derive(Debug, Default)]
pub struct TrendIndicators;

impl TrendIndicators {
    /// 새로운 추세 지표 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// 단순 이동평균 (SMA) 계산.
    ///
    /// SMA = (P1 + P2 + ... + Pn) / n
    ///
    /// # 반환
    /// 각 시점의 SMA 값 (처음 period-1개는 None)
    pub fn sma(
        &self,
        prices: &[Decimal],
        params: SmaParams,
    ) -> IndicatorResult<Vec<Option<Decimal>>> {
        let period = params.period;

        if period == 0 {
            return Err(IndicatorError::InvalidParameter(
                "기간은 0보다 커야 합니다".to_string(),
            ));
        }

        if prices.len() < period {
            return Err(IndicatorError::InsufficientData {
                required: period,
                provided: prices.len(),
            });
        }

        let period_decimal = Decimal::from(period);
        let result = (0..prices.len())
            .map(|i| {
                if i + 1 < period {
                    None
                } else {
                    let sum: Decimal = prices[i + 1 - period..=i].iter().sum();
                    Some(sum / period_decimal)
                }
            })
            .collect();

        Ok(result)
    }

    /// 지수 이동평균 (EMA) 계산.
    ///
    /// EMA = (현재가 × k) + (이전 EMA × (1 - k)), k = 2 / (period + 1)
    ///
    /// 첫 값 시드는 입력 길이에 제약이 없고 (빈 입력이면 빈 결과),
    /// SMA 시드는 최소 `period`개가 필요합니다.
    pub fn ema(
        &self,
        prices: &[Decimal],
        params: EmaParams,
    ) -> IndicatorResult<Vec<Option<Decimal>>> {
        let period = params.period;

        if period == 0 {
            return Err(IndicatorError::InvalidParameter(
                "기간은 0보다 커야 합니다".to_string(),
            ));
        }

        let multiplier = dec!(2) / Decimal::from(period + 1);
        let mut result = Vec::with_capacity(prices.len());

        let (seed, start) = match params.seed {
            EmaSeed::FirstValue => match prices.first() {
                Some(first) => (*first, 1),
                None => return Ok(result),
            },
            EmaSeed::Sma => {
                let window = &prices[..period.min(prices.len())];
                let initial_sma = match self.sma(window, SmaParams { period })?.last() {
                    Some(Some(value)) => *value,
                    _ => {
                        return Err(IndicatorError::InsufficientData {
                            required: period,
                            provided: prices.len(),
                        })
                    }
                };
                result.resize(period - 1, None);
                (initial_sma, period)
            }
        };

        result.push(Some(seed));

        let mut prev_ema = seed;
        for price in &prices[start..] {
            let ema = (*price * multiplier) + (prev_ema * (Decimal::ONE - multiplier));
            result.push(Some(ema));
            prev_ema = ema;
        }

        Ok(result)
    }

    /// MACD 계산.
    ///
    /// MACD 라인 = 단기 EMA - 장기 EMA
    /// 시그널 라인 = MACD 라인의 EMA
    /// 히스토그램 = MACD 라인 - 시그널 라인
    pub fn macd(&self, prices: &[Decimal], params: MacdParams) -> IndicatorResult<Vec<MacdResult>> {
        if params.fast_period >= params.slow_period {
            return Err(IndicatorError::InvalidParameter(format!(
                "단기 기간({})은 장기 기간({})보다 작아야 합니다",
                params.fast_period, params.slow_period
            )));
        }

        let min_required = match params.seed {
            EmaSeed::FirstValue => 1,
            EmaSeed::Sma => params.slow_period + params.signal_period - 1,
        };
        if prices.len() < min_required {
            return Err(IndicatorError::InsufficientData {
                required: min_required,
                provided: prices.len(),
            });
        }

        let ema_params = |period| EmaParams {
            period,
            seed: params.seed,
        };
        let fast_ema = self.ema(prices, ema_params(params.fast_period))?;
        let slow_ema = self.ema(prices, ema_params(params.slow_period))?;

        let macd_line: Vec<Option<Decimal>> = fast_ema
            .iter()
            .zip(&slow_ema)
            .map(|(fast, slow)| match (fast, slow) {
                (Some(f), Some(s)) => Some(*f - *s),
                _ => None,
            })
            .collect();

        // 시그널 라인은 정의된 MACD 값들만으로 계산
        let macd_values: Vec<Decimal> = macd_line.iter().flatten().copied().collect();
        let signal_ema = self.ema(&macd_values, ema_params(params.signal_period))?;

        let mut signal_iter = signal_ema.into_iter();
        let result = macd_line
            .into_iter()
            .map(|macd_val| match macd_val {
                Some(m) => {
                    let signal = signal_iter.next().flatten();
                    MacdResult {
                        macd: Some(m),
                        signal,
                        histogram: signal.map(|s| m - s),
                    }
                }
                None => MacdResult::EMPTY,
            })
            .collect();

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_prices() -> Vec<Decimal> {
        vec![
            dec!(100.0),
            dec!(102.0),
            dec!(101.0),
            dec!(103.0),
            dec!(105.0),
            dec!(104.0),
            dec!(106.0),
            dec!(108.0),
            dec!(107.0),
            dec!(109.0),
        ]
    }

    #[test]
    fn test_sma_basic() {
        let trend = TrendIndicators::new();
        let sma = trend.sma(&sample_prices(), SmaParams { period: 3 }).unwrap();

        assert!(sma[0].is_none());
        assert!(sma[1].is_none());
        // (100 + 102 + 101) / 3 = 101
        assert_eq!(sma[2], Some(dec!(101)));
    }

    #[test]
    fn test_ema_first_value_seed() {
        let trend = TrendIndicators::new();
        let ema = trend.ema(&sample_prices(), EmaParams::new(3)).unwrap();

        assert_eq!(ema.len(), 10);
        assert_eq!(ema[0], Some(dec!(100)));
        // k = 0.5: 102 * 0.5 + 100 * 0.5 = 101
        assert_eq!(ema[1], Some(dec!(101)));
        // 101 * 0.5 + 101 * 0.5 = 101
        assert_eq!(ema[2], Some(dec!(101)));
    }

    #[test]
    fn test_ema_first_value_shorter_than_period() {
        let trend = TrendIndicators::new();
        let ema = trend
            .ema(&[dec!(10), dec!(20)], EmaParams::new(50))
            .unwrap();
        assert_eq!(ema.len(), 2);
        assert!(ema.iter().all(Option::is_some));

        assert!(trend.ema(&[], EmaParams::new(5)).unwrap().is_empty());
    }

    #[test]
    fn test_ema_sma_seed() {
        let trend = TrendIndicators::new();
        let ema = trend
            .ema(&sample_prices(), EmaParams::sma_seeded(3))
            .unwrap();

        assert!(ema[0].is_none());
        assert!(ema[1].is_none());
        assert_eq!(ema[2], Some(dec!(101)));
        // 103 * 0.5 + 101 * 0.5 = 102
        assert_eq!(ema[3], Some(dec!(102)));

        let err = trend
            .ema(&[dec!(1), dec!(2)], EmaParams::sma_seeded(3))
            .unwrap_err();
        assert_eq!(
            err,
            IndicatorError::InsufficientData {
                required: 3,
                provided: 2
            }
        );
    }

    #[test]
    fn test_zero_period_rejected() {
        let trend = TrendIndicators::new();
        assert!(matches!(
            trend.ema(&sample_prices(), EmaParams::new(0)),
            Err(IndicatorError::InvalidParameter(_))
        ));
        assert!(matches!(
            trend.sma(&sample_prices(), SmaParams { period: 0 }),
            Err(IndicatorError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_macd_first_value_seed() {
        let trend = TrendIndicators::new();
        let prices: Vec<Decimal> = (0..50).map(|i| Decimal::from(100 + i)).collect();

        let macd = trend.macd(&prices, MacdParams::default()).unwrap();

        assert_eq!(macd.len(), prices.len());
        assert_eq!(macd[0].macd, Some(Decimal::ZERO));
        assert_eq!(macd[0].signal, Some(Decimal::ZERO));

        // 상승 추세에서는 MACD 라인이 양수이고 시그널보다 위
        let last = macd[49];
        let (m, s, h) = (last.macd.unwrap(), last.signal.unwrap(), last.histogram.unwrap());
        assert!(m > Decimal::ZERO);
        assert!(m > s);
        assert_eq!(h, m - s);
    }

    #[test]
    fn test_macd_sma_seed_leading_none() {
        let trend = TrendIndicators::new();
        let prices: Vec<Decimal> = (0..50).map(|i| Decimal::from(100 + i)).collect();
        let params = MacdParams {
            seed: EmaSeed::Sma,
            ..Default::default()
        };

        let macd = trend.macd(&prices, params).unwrap();

        assert!(macd[0].macd.is_none());
        assert!(macd[25].macd.is_some());
        assert!(macd[25].signal.is_none());
        assert!(macd[33].signal.is_some());
    }

    #[test]
    fn test_macd_invalid_periods() {
        let trend = TrendIndicators::new();
        let params = MacdParams {
            fast_period: 26,
            slow_period: 12,
            ..Default::default()
        };
        assert!(matches!(
            trend.macd(&sample_prices(), params),
            Err(IndicatorError::InvalidParameter(_))
        ));
    }
}
