//! HTML 헤드라인 스크래퍼 뉴스 소스.
//!
//! 설정된 페이지를 받아 CSS 셀렉터에 맞는 요소에서 제목과 링크를 추출합니다.
//! 선택된 요소가 `<a>`가 아니면 첫 번째 하위 `<a>`의 href를 사용합니다.
//! 상대 링크는 페이지 주소 기준으로 절대 주소가 됩니다.

use std::time::Duration;

use async_trait::async_trait;
use newsbot_core::NewsItem;
use reqwest::{Client, Url};
use scraper::{ElementRef, Html, Selector};
use tracing::warn;

use super::{collapse_whitespace, NewsSource};
use crate::error::{DataError, Result};

/// HTML 페이지의 헤드라인 목록 소스.
pub struct HtmlHeadlineSource {
    client: Client,
    page_url: Url,
    selector: String,
    origin_tag: String,
}

impl HtmlHeadlineSource {
    pub fn new(
        page_url: &str,
        selector: &str,
        origin_tag: impl Into<String>,
        request_timeout: Duration,
    ) -> Result<Self> {
        let page_url = Url::parse(page_url)
            .map_err(|e| DataError::ConfigError(format!("잘못된 URL {}: {}", page_url, e)))?;
        Selector::parse(selector)
            .map_err(|e| DataError::ConfigError(format!("잘못된 셀렉터 {}: {}", selector, e)))?;
        let client = Client::builder()
            .timeout(request_timeout)
            .user_agent("Mozilla/5.0 (compatible; newsbot/0.1)")
            .build()
            .map_err(|e| DataError::ConfigError(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        Ok(Self {
            client,
            page_url,
            selector: selector.to_string(),
            origin_tag: origin_tag.into(),
        })
    }

    async fn fetch_page(&self) -> Result<String> {
        let response = self.client.get(self.page_url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DataError::FetchError(format!("HTTP {} ({})", status, self.page_url)));
        }
        Ok(response.text().await?)
    }

    /// HTML 문서에서 헤드라인을 추출합니다.
    pub fn parse_headlines(&self, html: &str, limit: usize) -> Vec<NewsItem> {
        let (Ok(selector), Ok(anchor)) = (Selector::parse(&self.selector), Selector::parse("a[href]"))
        else {
            return Vec::new();
        };
        let document = Html::parse_document(html);

        document
            .select(&selector)
            .filter_map(|element| {
                let title = collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "));
                let href = find_href(element, &anchor);
                let link = href
                    .and_then(|h| self.page_url.join(h.trim()).ok())
                    .map(|u| u.to_string())
                    .unwrap_or_default();

                if title.is_empty() && link.is_empty() {
                    return None;
                }
                Some(NewsItem::new(title, link, self.origin_tag.as_str()))
            })
            .take(limit)
            .collect()
    }
}

fn find_href<'a>(element: ElementRef<'a>, anchor: &Selector) -> Option<&'a str> {
    if let Some(href) = element.value().attr("href") {
        return Some(href);
    }
    element
        .select(anchor)
        .next()
        .and_then(|a| a.value().attr("href"))
}

#[async_trait]
impl NewsSource for HtmlHeadlineSource {
    fn name(&self) -> &str {
        &self.origin_tag
    }

    async fn fetch_recent(&self, limit: usize) -> Vec<NewsItem> {
        match self.fetch_page().await {
            Ok(html) => self.parse_headlines(&html, limit),
            Err(e) => {
                warn!(source = self.name(), error = %e, "헤드라인 페이지 수집 실패");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <ul class="news">
            <li class="item"><a href="/market/ihsg-naik">IHSG
                naik 1%</a></li>
            <li class="item"><h3>Saham <b>BBCA</b> menguat</h3><a href="https://other.example/bbca">baca</a></li>
            <li class="item"><span>Tanpa link</span></li>
            <li class="item"></li>
          </ul>
        </body></html>
    "#;

    fn source(selector: &str) -> HtmlHeadlineSource {
        HtmlHeadlineSource::new(
            "https://news.example/market/",
            selector,
            "kontan",
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_parse_anchor_headlines() {
        let items = source("ul.news li.item a").parse_headlines(PAGE, 10);

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "IHSG naik 1%");
        assert_eq!(items[0].link, "https://news.example/market/ihsg-naik");
        assert_eq!(items[0].origin_tag, "kontan");
        assert_eq!(items[1].link, "https://other.example/bbca");
    }

    #[test]
    fn test_parse_container_uses_nested_anchor() {
        let items = source("ul.news li.item").parse_headlines(PAGE, 10);

        assert_eq!(items.len(), 3);
        assert_eq!(items[1].title, "Saham BBCA menguat baca");
        assert_eq!(items[1].link, "https://other.example/bbca");
        // 링크가 없으면 제목이 중복 제거 키가 됨
        assert_eq!(items[2].link, "");
        assert_eq!(items[2].dedup_key(), "Tanpa link");
    }

    #[test]
    fn test_limit() {
        assert_eq!(source("li.item").parse_headlines(PAGE, 1).len(), 1);
    }

    #[test]
    fn test_invalid_config() {
        assert!(HtmlHeadlineSource::new("not a url", "a", "x", Duration::from_secs(1)).is_err());
        assert!(HtmlHeadlineSource::new("https://x.example", "<<", "x", Duration::from_secs(1)).is_err());
    }
}
