//! 텔레그램 알림 서비스.
//!
//! Telegram Bot API(`{api_base}/bot{token}/{method}`)를 reqwest로 직접 호출합니다.

use std::time::Duration;

use async_trait::async_trait;
use newsbot_core::SubscriberId;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use crate::types::{NotificationError, NotificationResult, Notifier};

/// 기본 Bot API 주소.
pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// 429 응답에 retry_after가 없을 때 사용하는 대기 시간(초).
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// 텔레그램 전송 설정.
#[derive(Debug)]
pub struct TelegramConfig {
    /// @BotFather에서 받은 봇 토큰
    pub bot_token: SecretString,
    /// Bot API 주소 (테스트 시 mock 서버)
    pub api_base: String,
    /// 파싱 모드 (HTML 또는 MarkdownV2)
    pub parse_mode: String,
    /// 요청 타임아웃
    pub request_timeout: Duration,
}

impl TelegramConfig {
    /// 새 텔레그램 설정을 생성합니다.
    pub fn new(bot_token: impl Into<String>) -> Self {
        let token: String = bot_token.into();
        Self {
            bot_token: SecretString::new(token.into()),
            api_base: TELEGRAM_API_BASE.to_string(),
            parse_mode: "HTML".to_string(),
            request_timeout: Duration::from_secs(10),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Bot API 공통 응답.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
    parameters: Option<ResponseParameters>,
}

#[derive(Debug, Deserialize)]
struct ResponseParameters {
    retry_after: Option<u64>,
}

/// 텔레그램 알림 전송기.
pub struct TelegramNotifier {
    config: TelegramConfig,
    client: reqwest::Client,
}

impl TelegramNotifier {
    /// 새 텔레그램 전송기를 생성합니다.
    pub fn new(config: TelegramConfig) -> NotificationResult<Self> {
        if config.bot_token.expose_secret().trim().is_empty() {
            return Err(NotificationError::InvalidConfig(
                "TELEGRAM_BOT_TOKEN이 비어 있습니다".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self { config, client })
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.config.api_base,
            self.config.bot_token.expose_secret(),
            method
        )
    }

    /// Bot API 메서드를 호출하고 `result`를 역직렬화합니다.
    ///
    /// `timeout`이 주어지면 클라이언트 기본 타임아웃 대신 사용합니다 (long polling).
    pub(crate) async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &serde_json::Value,
        timeout: Option<Duration>,
    ) -> NotificationResult<T> {
        let mut request = self.client.post(self.method_url(method)).json(params);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        let parsed: Option<ApiResponse<T>> = serde_json::from_str(&body).ok();

        if status.as_u16() == 429 {
            let retry_after = parsed
                .as_ref()
                .and_then(|r| r.parameters.as_ref())
                .and_then(|p| p.retry_after)
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            warn!(method, retry_after, "Telegram 요청 한도 초과");
            return Err(NotificationError::RateLimited(retry_after));
        }

        let description = parsed
            .as_ref()
            .and_then(|r| r.description.clone())
            .unwrap_or_else(|| body.clone());

        if status.as_u16() == 403 {
            return Err(NotificationError::RecipientUnavailable(description));
        }

        if !status.is_success() {
            error!(method, status = %status, "Telegram API 호출 실패: {}", description);
            return Err(NotificationError::SendFailed(format!(
                "HTTP {}: {}",
                status, description
            )));
        }

        let parsed: ApiResponse<T> = serde_json::from_str(&body)?;
        if !parsed.ok {
            return Err(NotificationError::SendFailed(description));
        }

        parsed
            .result
            .ok_or_else(|| NotificationError::SendFailed(format!("{} 응답에 result 없음", method)))
    }

    /// 봇 명령어 목록을 등록합니다 (`setMyCommands`).
    pub async fn set_my_commands(&self, commands: &[(&str, &str)]) -> NotificationResult<()> {
        let commands: Vec<serde_json::Value> = commands
            .iter()
            .map(|(command, description)| {
                serde_json::json!({ "command": command, "description": description })
            })
            .collect();

        let _: bool = self
            .call(
                "setMyCommands",
                &serde_json::json!({ "commands": commands }),
                None,
            )
            .await?;

        info!(count = commands.len(), "봇 명령어 등록 완료");
        Ok(())
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send_text(&self, recipient: &SubscriberId, text: &str) -> NotificationResult<()> {
        let params = serde_json::json!({
            "chat_id": recipient.as_str(),
            "text": text,
            "parse_mode": self.config.parse_mode,
            "disable_web_page_preview": true,
        });

        debug!(chat_id = %recipient, "Telegram 메시지 전송");
        let _: serde_json::Value = self.call("sendMessage", &params, None).await?;
        Ok(())
    }

    fn name(&self) -> &str {
        "telegram"
    }
}
