//! 티커 정규화.
//!
//! 사용자/뉴스 소스가 주는 티커(`bbca`, `BBCA`, `BBCA.JK`)를
//! 시세 제공자가 요구하는 거래소 접미사 형식으로 맞춥니다.

/// 접미사를 붙일 수 있는 순수 알파벳 티커의 최대 길이.
pub const MAX_BARE_TICKER_LEN: usize = 6;

/// 티커를 시세 조회용 심볼로 정규화합니다.
///
/// - 앞뒤 공백 제거 후 대문자화
/// - 이미 접미사로 끝나면 그대로 유지
/// - 6자 이하의 순수 알파벳이면 접미사 추가
/// - 그 외(숫자 포함, 다른 거래소 접미사 등)는 그대로 유지
///
/// ```
/// use newsbot_core::normalize_symbol;
///
/// assert_eq!(normalize_symbol(" bbca ", ".JK"), "BBCA.JK");
/// assert_eq!(normalize_symbol("BBRI.JK", ".JK"), "BBRI.JK");
/// assert_eq!(normalize_symbol("^JKSE", ".JK"), "^JKSE");
/// ```
pub fn normalize_symbol(ticker: &str, suffix: &str) -> String {
    let upper = ticker.trim().to_uppercase();
    let suffix = suffix.to_uppercase();

    if suffix.is_empty() || upper.ends_with(&suffix) {
        return upper;
    }

    let is_bare = !upper.is_empty()
        && upper.len() <= MAX_BARE_TICKER_LEN
        && upper.chars().all(|c| c.is_ascii_alphabetic());

    if is_bare {
        format!("{}{}", upper, suffix)
    } else {
        upper
    }
}

/// 표시용으로 거래소 접미사를 제거합니다.
pub fn display_symbol(symbol: &str, suffix: &str) -> String {
    let upper = symbol.trim().to_uppercase();
    let suffix = suffix.to_uppercase();
    match upper.strip_suffix(&suffix) {
        Some(stripped) if !suffix.is_empty() && !stripped.is_empty() => stripped.to_string(),
        _ => upper,
    }
}
