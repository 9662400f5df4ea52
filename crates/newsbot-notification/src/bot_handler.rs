//! 텔레그램 봇 명령어 핸들러.
//!
//! `getUpdates` long polling으로 명령어를 수신하고, 명령을 보낸 채팅에 응답합니다.
//! 구독/알림/시세 조회 등 실제 로직은 [`BotCommandHandler`] 구현체가 담당합니다.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use newsbot_core::SubscriberId;
use rust_decimal::Decimal;
use serde::Deserialize;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::telegram::TelegramNotifier;
use crate::types::{NotificationResult, Notifier};

/// `setMyCommands`에 등록하는 명령어 목록.
pub const COMMAND_DESCRIPTIONS: &[(&str, &str)] = &[
    ("start", "berlangganan berita & sinyal"),
    ("stop", "berhenti berlangganan"),
    ("alert", "pasang alert harga: /alert BBCA 9500"),
    ("alerts", "daftar alert saya"),
    ("removealert", "hapus alert: /removealert BBCA"),
    ("signal", "indikator & sinyal: /signal BBCA"),
    ("harga", "cek harga: /harga BBCA TLKM"),
    ("help", "bantuan"),
];

/// 개별 업데이트.
#[derive(Debug, Deserialize)]
struct TelegramUpdate {
    update_id: i64,
    message: Option<TelegramMessage>,
}

/// 메시지 정보.
#[derive(Debug, Deserialize)]
struct TelegramMessage {
    chat: TelegramChat,
    text: Option<String>,
}

/// 채팅 정보.
#[derive(Debug, Deserialize)]
struct TelegramChat {
    id: i64,
}

/// 봇 명령어 타입.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    /// 구독
    Subscribe,
    /// 구독 해지
    Unsubscribe,
    /// 가격 알림 등록
    SetAlert { ticker: String, target: Decimal },
    /// 내 알림 목록
    ListAlerts,
    /// 티커 알림 삭제
    RemoveAlert { ticker: String },
    /// 지표 스냅샷
    Signal { ticker: String },
    /// 현재가 및 전일 대비
    Price { tickers: Vec<String> },
    /// 도움말
    Help,
    /// 인자가 잘못됨. 사용법 문구를 담습니다.
    Usage(&'static str),
    /// 알 수 없는 명령어
    Unknown(String),
}

const USAGE_ALERT: &str = "/alert &lt;TICKER&gt; &lt;HARGA&gt;\nContoh: /alert BBCA 9500";
const USAGE_REMOVE_ALERT: &str = "/removealert &lt;TICKER&gt;\nContoh: /removealert BBCA";
const USAGE_SIGNAL: &str = "/signal &lt;TICKER&gt;\nContoh: /signal BBCA";
const USAGE_PRICE: &str = "/harga &lt;TICKER1&gt; [TICKER2 ...]\nContoh: /harga BBCA.JK TLKM.JK";

impl BotCommand {
    /// 텍스트에서 명령어 파싱.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();

        // /명령어 형식 확인
        let Some(body) = text.strip_prefix('/') else {
            return BotCommand::Unknown(text.to_string());
        };

        let parts: Vec<&str> = body.split_whitespace().collect();
        // 그룹 채팅의 "/cmd@BotName" 형식
        let command = parts
            .first()
            .map(|s| s.split('@').next().unwrap_or_default().to_lowercase());
        let args = parts.get(1..).unwrap_or_default();

        match command.as_deref() {
            Some("start") | Some("subscribe") => BotCommand::Subscribe,
            Some("stop") | Some("unsubscribe") => BotCommand::Unsubscribe,
            Some("alert") => match args {
                [ticker, price] => match parse_price(price) {
                    Some(target) => BotCommand::SetAlert {
                        ticker: ticker.to_string(),
                        target,
                    },
                    None => BotCommand::Usage(USAGE_ALERT),
                },
                _ => BotCommand::Usage(USAGE_ALERT),
            },
            Some("alerts") => BotCommand::ListAlerts,
            Some("removealert") => match args {
                [ticker] => BotCommand::RemoveAlert {
                    ticker: ticker.to_string(),
                },
                _ => BotCommand::Usage(USAGE_REMOVE_ALERT),
            },
            Some("signal") => match args {
                [ticker] => BotCommand::Signal {
                    ticker: ticker.to_string(),
                },
                _ => BotCommand::Usage(USAGE_SIGNAL),
            },
            Some("harga") => {
                if args.is_empty() {
                    BotCommand::Usage(USAGE_PRICE)
                } else {
                    BotCommand::Price {
                        tickers: args.iter().map(|s| s.to_string()).collect(),
                    }
                }
            }
            Some("help") | Some("h") => BotCommand::Help,
            _ => BotCommand::Unknown(text.to_string()),
        }
    }
}

/// "9500", "9,500", "9500.5" 형식의 가격을 파싱합니다.
fn parse_price(raw: &str) -> Option<Decimal> {
    Decimal::from_str(&raw.replace(',', "")).ok()
}

/// 명령어 응답 데이터 (HTML 형식).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResponse {
    pub text: String,
}

impl CommandResponse {
    /// HTML 형식 응답 생성.
    pub fn html(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// 봇 명령어 핸들러 trait.
///
/// 각 명령어의 실제 로직을 구현합니다. `chat`은 명령을 보낸 채팅입니다.
#[async_trait]
pub trait BotCommandHandler: Send + Sync {
    /// 구독 등록.
    async fn handle_subscribe(&self, chat: &SubscriberId) -> NotificationResult<CommandResponse>;

    /// 구독 해지.
    async fn handle_unsubscribe(&self, chat: &SubscriberId)
        -> NotificationResult<CommandResponse>;

    /// 가격 알림 등록.
    async fn handle_set_alert(
        &self,
        chat: &SubscriberId,
        ticker: &str,
        target: Decimal,
    ) -> NotificationResult<CommandResponse>;

    /// 알림 목록 조회.
    async fn handle_list_alerts(&self, chat: &SubscriberId)
        -> NotificationResult<CommandResponse>;

    /// 티커 알림 삭제.
    async fn handle_remove_alert(
        &self,
        chat: &SubscriberId,
        ticker: &str,
    ) -> NotificationResult<CommandResponse>;

    /// 지표 스냅샷 조회.
    async fn handle_signal(&self, ticker: &str) -> NotificationResult<CommandResponse>;

    /// 현재가 조회.
    async fn handle_price(&self, tickers: &[String]) -> NotificationResult<CommandResponse>;
}

/// 텔레그램 봇 핸들러.
///
/// Long polling으로 업데이트를 수신하고 명령어를 처리합니다.
pub struct TelegramBotHandler<H: BotCommandHandler> {
    notifier: Arc<TelegramNotifier>,
    handler: Arc<H>,
    last_update_id: RwLock<i64>,
    /// 허용된 채팅 ID 목록. `None`이면 모든 채팅 허용.
    allowed_chat_ids: Option<Vec<SubscriberId>>,
    poll_timeout_secs: u64,
    error_backoff: Duration,
}

impl<H: BotCommandHandler> TelegramBotHandler<H> {
    /// 새 봇 핸들러 생성.
    pub fn new(notifier: Arc<TelegramNotifier>, handler: Arc<H>) -> Self {
        Self {
            notifier,
            handler,
            last_update_id: RwLock::new(0),
            allowed_chat_ids: None,
            poll_timeout_secs: 30,
            error_backoff: Duration::from_secs(5),
        }
    }

    /// 허용 채팅 ID 제한.
    pub fn with_allowed_chat_ids(mut self, chat_ids: Vec<SubscriberId>) -> Self {
        self.allowed_chat_ids = Some(chat_ids);
        self
    }

    /// long polling 대기 시간(초). 테스트에서는 0으로 둡니다.
    pub fn with_poll_timeout(mut self, secs: u64) -> Self {
        self.poll_timeout_secs = secs;
        self
    }

    /// 봇 폴링 시작.
    ///
    /// 취소 토큰이 취소될 때까지 업데이트를 수신합니다.
    pub async fn run(&self, cancel: CancellationToken) {
        info!("텔레그램 봇 폴링 시작");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                result = self.poll_once() => {
                    if let Err(e) = result {
                        error!("업데이트 폴링 실패: {}", e);
                        // 에러 발생 시 잠시 대기
                        tokio::select! {
                            _ = cancel.cancelled() => break,
                            _ = tokio::time::sleep(self.error_backoff) => {}
                        }
                    }
                }
            }
        }

        info!("텔레그램 봇 폴링 종료");
    }

    /// 업데이트를 한 번 가져와 처리하고, 처리한 업데이트 수를 반환합니다.
    pub async fn poll_once(&self) -> NotificationResult<usize> {
        let updates = self.poll_updates().await?;
        let count = updates.len();

        for update in updates {
            if let Err(e) = self.process_update(update).await {
                error!("업데이트 처리 실패: {}", e);
            }
        }
        Ok(count)
    }

    /// 업데이트 폴링.
    async fn poll_updates(&self) -> NotificationResult<Vec<TelegramUpdate>> {
        let last_id = *self.last_update_id.read().await;

        let params = serde_json::json!({
            "offset": last_id + 1,
            "timeout": self.poll_timeout_secs,
            "allowed_updates": ["message"],
        });

        let updates: Vec<TelegramUpdate> = self
            .notifier
            .call(
                "getUpdates",
                &params,
                Some(Duration::from_secs(self.poll_timeout_secs + 5)),
            )
            .await?;

        // 마지막 업데이트 ID 갱신
        if let Some(last) = updates.iter().map(|u| u.update_id).max() {
            *self.last_update_id.write().await = last;
        }

        Ok(updates)
    }

    /// 개별 업데이트 처리.
    async fn process_update(&self, update: TelegramUpdate) -> NotificationResult<()> {
        let Some(message) = update.message else {
            return Ok(());
        };

        let chat = SubscriberId::from(message.chat.id);

        // 허용된 채팅 ID 확인
        if let Some(allowed) = &self.allowed_chat_ids {
            if !allowed.contains(&chat) {
                warn!(chat_id = %chat, "허용되지 않은 채팅 ID에서 메시지 수신");
                return Ok(());
            }
        }

        let Some(text) = message.text else {
            return Ok(());
        };

        debug!(chat_id = %chat, text = %text, "명령어 수신");

        let command = BotCommand::parse(&text);
        let response = self.execute_command(&chat, command).await;

        // 응답 전송
        self.notifier.send_text(&chat, &response.text).await
    }

    /// 명령어 실행. 핸들러 에러는 사용자에게 일반 실패 문구로 응답합니다.
    pub async fn execute_command(&self, chat: &SubscriberId, command: BotCommand) -> CommandResponse {
        let result = match command {
            BotCommand::Subscribe => self.handler.handle_subscribe(chat).await,
            BotCommand::Unsubscribe => self.handler.handle_unsubscribe(chat).await,
            BotCommand::SetAlert { ticker, target } => {
                self.handler.handle_set_alert(chat, &ticker, target).await
            }
            BotCommand::ListAlerts => self.handler.handle_list_alerts(chat).await,
            BotCommand::RemoveAlert { ticker } => {
                self.handler.handle_remove_alert(chat, &ticker).await
            }
            BotCommand::Signal { ticker } => self.handler.handle_signal(&ticker).await,
            BotCommand::Price { tickers } => self.handler.handle_price(&tickers).await,
            BotCommand::Help => Ok(help_message()),
            BotCommand::Usage(usage) => Ok(CommandResponse::html(format!("⚠️ Gunakan: {}", usage))),
            BotCommand::Unknown(text) => Ok(CommandResponse::html(format!(
                "❓ Perintah tidak dikenal: <code>{}</code>\n\
                 Ketik /help untuk daftar perintah.",
                crate::format::escape_html(&text)
            ))),
        };

        result.unwrap_or_else(|e| {
            error!(chat_id = %chat, error = %e, "명령어 처리 실패");
            CommandResponse::html("❌ Terjadi kesalahan, coba lagi nanti.")
        })
    }
}

/// 도움말 메시지 생성.
fn help_message() -> CommandResponse {
    CommandResponse::html(
        "🤖 <b>Bot berita &amp; sinyal saham</b>\n\n\
         /start - berlangganan berita &amp; sinyal\n\
         /stop - berhenti berlangganan\n\
         /alert &lt;TICKER&gt; &lt;HARGA&gt; - alert saat harga naik ke target\n\
         /alerts - daftar alert saya\n\
         /removealert &lt;TICKER&gt; - hapus alert\n\
         /signal &lt;TICKER&gt; - EMA/RSI/MACD &amp; sinyal\n\
         /harga &lt;TICKER1&gt; [TICKER2 ...] - cek harga\n\
         /help - bantuan\n\n\
         <i>Contoh: /harga BBCA.JK TLKM.JK</i>",
    )
}
