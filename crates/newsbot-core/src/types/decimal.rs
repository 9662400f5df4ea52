//! 가격 계산을 위한 Decimal 유틸리티.

use rust_decimal::{Decimal, RoundingStrategy};

/// 가격 타입. 저장 시 문자열로 직렬화되어 정확히 왕복됩니다.
pub type Price = Decimal;

/// 퍼센트 타입 (1.5 = 1.5%).
pub type Percentage = Decimal;

/// 표시용 Decimal 확장 트레이트.
pub trait DecimalExt {
    /// 지정된 소수점 자릿수로 반올림합니다 (사사오입).
    fn round_half_up(&self, dp: u32) -> Decimal;

    /// 부호가 포함된 퍼센트 문자열로 변환합니다 (예: "+1.25%").
    fn to_signed_percent(&self) -> String;

    /// 천 단위 구분자가 포함된 가격 문자열로 변환합니다 (예: "9,875" / "1,234.5").
    fn to_price_string(&self) -> String;
}

impl DecimalExt for Decimal {
    fn round_half_up(&self, dp: u32) -> Decimal {
        self.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
    }

    fn to_signed_percent(&self) -> String {
        let rounded = self.round_half_up(2);
        if rounded.is_sign_negative() && !rounded.is_zero() {
            format!("{:.2}%", rounded)
        } else {
            format!("+{:.2}%", rounded.abs())
        }
    }

    fn to_price_string(&self) -> String {
        let rounded = self.round_half_up(2).normalize();
        let text = rounded.abs().to_string();
        let (int_part, frac_part) = match text.split_once('.') {
            Some((i, f)) => (i.to_string(), Some(f.to_string())),
            None => (text.clone(), None),
        };

        let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
        for (i, ch) in int_part.chars().enumerate() {
            if i > 0 && (int_part.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        match frac_part {
            Some(f) => format!("{}{}.{}", sign, grouped, f),
            None => format!("{}{}", sign, grouped),
        }
    }
}

/// 이전 값 대비 변화율(%)을 계산합니다. 이전 값이 0이면 `None`.
pub fn percent_change(previous: Decimal, current: Decimal) -> Option<Percentage> {
    if previous.is_zero() {
        return None;
    }
    Some((current - previous) / previous * Decimal::ONE_HUNDRED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_signed_percent() {
        assert_eq!(dec!(1.254).to_signed_percent(), "+1.25%");
        assert_eq!(dec!(-0.5).to_signed_percent(), "-0.50%");
        assert_eq!(dec!(0).to_signed_percent(), "+0.00%");
    }

    #[test]
    fn test_price_string() {
        assert_eq!(dec!(9875).to_price_string(), "9,875");
        assert_eq!(dec!(1234.50).to_price_string(), "1,234.5");
        assert_eq!(dec!(100).to_price_string(), "100");
        assert_eq!(dec!(1000000.125).to_price_string(), "1,000,000.13");
    }

    #[test]
    fn test_percent_change() {
        assert_eq!(percent_change(dec!(100), dec!(105)), Some(dec!(5)));
        assert_eq!(percent_change(dec!(200), dec!(190)), Some(dec!(-5)));
        assert_eq!(percent_change(dec!(0), dec!(1)), None);
    }
}
