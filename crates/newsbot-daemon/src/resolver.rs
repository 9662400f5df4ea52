//! 뉴스 제목에서 티커를 추정하는 전략.

use std::collections::HashSet;

/// 뉴스 제목에서 티커를 찾는 교체 가능한 전략.
pub trait TickerResolver: Send + Sync {
    /// 제목에서 티커를 찾습니다. 없으면 `None`.
    fn resolve(&self, title: &str) -> Option<String>;
}

/// 흔한 대문자 약어 (티커가 아님).
const DEFAULT_STOPWORDS: &[&str] = &[
    "IHSG", "BUMN", "IPO", "OJK", "BEI", "IDX", "USD", "IDR", "RUPS", "PDB", "GDP", "CEO", "THE",
    "AND", "ETF", "FED", "BI", "YOY", "QOQ", "LQ",
];

/// 대문자 알파벳 토큰을 티커로 보는 휴리스틱.
///
/// 제목을 영숫자가 아닌 문자로 나누고, 길이 조건을 만족하는 첫 번째
/// 전부 대문자인 토큰을 반환합니다. 알려진 티커 목록이 있으면 그 안에서만 찾습니다.
#[derive(Debug, Clone)]
pub struct UppercaseTokenResolver {
    min_len: usize,
    max_len: usize,
    stopwords: HashSet<String>,
    known: Option<HashSet<String>>,
}

impl UppercaseTokenResolver {
    /// IDX 종목 코드 형식(대문자 4자)을 기본으로 합니다.
    pub fn new() -> Self {
        Self {
            min_len: 4,
            max_len: 4,
            stopwords: DEFAULT_STOPWORDS.iter().map(|s| s.to_string()).collect(),
            known: None,
        }
    }

    pub fn with_length(mut self, min_len: usize, max_len: usize) -> Self {
        self.min_len = min_len;
        self.max_len = max_len.max(min_len);
        self
    }

    pub fn with_known_tickers<I, S>(mut self, tickers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.known = Some(
            tickers
                .into_iter()
                .map(|t| t.as_ref().trim().to_uppercase())
                .collect(),
        );
        self
    }
}

impl Default for UppercaseTokenResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl TickerResolver for UppercaseTokenResolver {
    fn resolve(&self, title: &str) -> Option<String> {
        title
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|token| (self.min_len..=self.max_len).contains(&token.len()))
            .filter(|token| token.chars().all(|c| c.is_ascii_uppercase()))
            .filter(|token| !self.stopwords.contains(*token))
            .find(|token| match &self.known {
                Some(known) => known.contains(*token),
                None => true,
            })
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_first_ticker_like_token() {
        let resolver = UppercaseTokenResolver::new();
        assert_eq!(
            resolver.resolve("Laba BBCA naik 12%, saham (TLKM) melemah"),
            Some("BBCA".to_string())
        );
        assert_eq!(resolver.resolve("Saham GOTO.JK melonjak"), Some("GOTO".to_string()));
    }

    #[test]
    fn test_skips_stopwords_and_mixed_case() {
        let resolver = UppercaseTokenResolver::new();
        assert_eq!(resolver.resolve("IHSG ditutup menguat"), None);
        assert_eq!(resolver.resolve("Bank Bbca rilis laporan"), None);
        assert_eq!(resolver.resolve("RUPS ASII setujui dividen"), Some("ASII".to_string()));
    }

    #[test]
    fn test_known_tickers_restrict_matches() {
        let resolver = UppercaseTokenResolver::new().with_known_tickers(["bbri", "BMRI"]);
        assert_eq!(resolver.resolve("ANTM dan BMRI jadi sorotan"), Some("BMRI".to_string()));
        assert_eq!(resolver.resolve("ANTM naik"), None);
    }

    #[test]
    fn test_custom_length() {
        let resolver = UppercaseTokenResolver::new().with_length(2, 5);
        assert_eq!(resolver.resolve("Saham BRPT dan BREN"), Some("BRPT".to_string()));
        assert_eq!(resolver.resolve("Emiten MDKA"), Some("MDKA".to_string()));
    }
}
