//! 뉴스 아이템.

use serde::{Deserialize, Serialize};

/// 뉴스 소스가 반환하는 기사 한 건.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    /// 제목
    pub title: String,
    /// 원문 링크 (비어 있을 수 있음)
    pub link: String,
    /// 출처 태그 (예: "yahoo", "kontan")
    pub origin_tag: String,
    /// 소스가 제공한 티커 코드
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticker_code: Option<String>,
}

impl NewsItem {
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        origin_tag: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            origin_tag: origin_tag.into(),
            ticker_code: None,
        }
    }

    /// 티커 코드를 설정합니다. 공백뿐인 코드는 무시됩니다.
    pub fn with_ticker(mut self, code: impl Into<String>) -> Self {
        let code = code.into();
        let trimmed = code.trim();
        self.ticker_code = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
        self
    }

    /// 중복 제거 키. 링크가 비어 있으면 제목을 사용합니다.
    ///
    /// 같은 키를 가진 아이템은 출처와 무관하게 같은 기사로 취급됩니다.
    pub fn dedup_key(&self) -> &str {
        let link = self.link.trim();
        if link.is_empty() {
            self.title.trim()
        } else {
            link
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_key_prefers_link() {
        let item = NewsItem::new("IHSG naik", "https://x/1", "yahoo");
        assert_eq!(item.dedup_key(), "https://x/1");
    }

    #[test]
    fn test_dedup_key_falls_back_to_title() {
        let item = NewsItem::new(" IHSG naik ", "   ", "kontan");
        assert_eq!(item.dedup_key(), "IHSG naik");
    }

    #[test]
    fn test_with_ticker_ignores_blank() {
        let item = NewsItem::new("t", "l", "o").with_ticker("  ");
        assert_eq!(item.ticker_code, None);
        let item = NewsItem::new("t", "l", "o").with_ticker(" BBCA ");
        assert_eq!(item.ticker_code.as_deref(), Some("BBCA"));
    }
}
