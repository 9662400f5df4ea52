//! Yahoo Finance 검색 API 뉴스 소스.
//!
//! `GET {base}/v1/finance/search?q=<query>&newsCount=<limit>&quotesCount=0`
//! 응답의 `news` 배열을 사용합니다. 기사에 `relatedTickers`가 있으면
//! 첫 번째 티커를 기사 티커로 사용합니다.

use std::time::Duration;

use async_trait::async_trait;
use newsbot_core::NewsItem;
use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

use super::{collapse_whitespace, NewsSource};
use crate::error::{DataError, Result};

/// 기본 API 주소.
pub const YAHOO_SEARCH_BASE: &str = "https://query2.finance.yahoo.com";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/127.0.0.0 Safari/537.36";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    news: Vec<SearchNews>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchNews {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    related_tickers: Vec<String>,
}

/// 검색어 목록으로 Yahoo 뉴스를 수집하는 소스.
pub struct YahooNewsSource {
    client: Client,
    base_url: String,
    queries: Vec<String>,
}

impl YahooNewsSource {
    pub fn new(queries: Vec<String>, request_timeout: Duration) -> Result<Self> {
        Self::with_base_url(YAHOO_SEARCH_BASE, queries, request_timeout)
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        queries: Vec<String>,
        request_timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(request_timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| DataError::ConfigError(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            queries,
        })
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<NewsItem>> {
        let url = format!("{}/v1/finance/search", self.base_url);
        let limit_param = limit.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", query),
                ("newsCount", limit_param.as_str()),
                ("quotesCount", "0"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DataError::FetchError(format!("HTTP {} ({})", status, query)));
        }

        let body: SearchResponse = response.json().await?;

        Ok(body
            .news
            .into_iter()
            .filter(|n| !n.title.trim().is_empty() || !n.link.trim().is_empty())
            .take(limit)
            .map(|n| {
                let item = NewsItem::new(collapse_whitespace(&n.title), n.link.trim(), self.name());
                match n.related_tickers.into_iter().next() {
                    Some(ticker) => item.with_ticker(ticker),
                    None => item,
                }
            })
            .collect())
    }
}

#[async_trait]
impl NewsSource for YahooNewsSource {
    fn name(&self) -> &str {
        "yahoo"
    }

    async fn fetch_recent(&self, limit: usize) -> Vec<NewsItem> {
        let mut items = Vec::new();
        for query in &self.queries {
            match self.search(query, limit).await {
                Ok(batch) => items.extend(batch),
                Err(e) => warn!(source = self.name(), query = %query, error = %e, "뉴스 검색 실패"),
            }
        }
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    const BODY: &str = r#"{
        "count": 3,
        "quotes": [],
        "news": [
            {"uuid": "1", "title": "IHSG  ditutup menguat", "publisher": "Kontan",
             "link": "https://finance.yahoo.com/news/ihsg-1.html", "relatedTickers": ["BBCA.JK", "BBRI.JK"]},
            {"uuid": "2", "title": "Rupiah melemah", "link": "https://finance.yahoo.com/news/rupiah-2.html"},
            {"uuid": "3", "title": "", "link": ""}
        ]
    }"#;

    #[tokio::test]
    async fn test_parses_news_and_tickers() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/finance/search")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), "IHSG".into()),
                Matcher::UrlEncoded("newsCount".into(), "10".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(BODY)
            .create_async()
            .await;

        let source = YahooNewsSource::with_base_url(
            server.url(),
            vec!["IHSG".to_string()],
            Duration::from_secs(5),
        )
        .unwrap();

        let items = source.fetch_recent(10).await;
        mock.assert_async().await;

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "IHSG ditutup menguat");
        assert_eq!(items[0].ticker_code.as_deref(), Some("BBCA.JK"));
        assert_eq!(items[0].origin_tag, "yahoo");
        assert_eq!(items[1].ticker_code, None);
    }

    #[tokio::test]
    async fn test_http_error_yields_empty() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v1/finance/search")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let source = YahooNewsSource::with_base_url(
            server.url(),
            vec!["IHSG".to_string()],
            Duration::from_secs(5),
        )
        .unwrap();

        assert!(source.fetch_recent(10).await.is_empty());
    }

    #[tokio::test]
    async fn test_one_failing_query_does_not_hide_others() {
        let mut server = mockito::Server::new_async().await;
        let _bad = server
            .mock("GET", "/v1/finance/search")
            .match_query(Matcher::UrlEncoded("q".into(), "bad".into()))
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;
        let _good = server
            .mock("GET", "/v1/finance/search")
            .match_query(Matcher::UrlEncoded("q".into(), "saham".into()))
            .with_status(200)
            .with_body(BODY)
            .create_async()
            .await;

        let source = YahooNewsSource::with_base_url(
            server.url(),
            vec!["bad".to_string(), "saham".to_string()],
            Duration::from_secs(5),
        )
        .unwrap();

        assert_eq!(source.fetch_recent(5).await.len(), 2);
    }
}
