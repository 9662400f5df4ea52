//! 봇 명령어 처리.
//!
//! 텔레그램 폴링 루프가 파싱한 명령을 구독자 목록, 알림 저장소, 시세 서비스로 연결합니다.
//! 응답 문구는 사용자 언어(인도네시아어)로 작성합니다.

use std::sync::Arc;

use async_trait::async_trait;
use newsbot_core::{DecimalExt, SubscriberId};
use newsbot_data::{AlertStore, StoreError, SubscriberRegistry};
use newsbot_notification::{
    escape_html, BotCommandHandler, CommandResponse, MessageFormatter, NotificationError,
    NotificationEvent, NotificationResult,
};
use rust_decimal::Decimal;
use tracing::info;

use crate::service::MarketService;

/// [`BotCommandHandler`] 구현.
pub struct CommandService {
    registry: Arc<SubscriberRegistry>,
    alerts: Arc<AlertStore>,
    market: Arc<MarketService>,
    formatter: MessageFormatter,
}

impl CommandService {
    pub fn new(
        registry: Arc<SubscriberRegistry>,
        alerts: Arc<AlertStore>,
        market: Arc<MarketService>,
        formatter: MessageFormatter,
    ) -> Self {
        Self {
            registry,
            alerts,
            market,
            formatter,
        }
    }

    fn display(&self, symbol: &str) -> String {
        newsbot_core::display_symbol(symbol, self.market.ticker_suffix())
    }
}

/// 입력 검증 실패는 사용자에게 그대로 알리고, 저장 실패는 명령 실패로 올립니다.
fn store_failure(e: StoreError) -> NotificationResult<CommandResponse> {
    match e {
        StoreError::InvalidInput(reason) => Ok(CommandResponse::html(format!(
            "⚠️ {}",
            escape_html(&reason)
        ))),
        other => Err(NotificationError::CommandFailed(other.to_string())),
    }
}

#[async_trait]
impl BotCommandHandler for CommandService {
    async fn handle_subscribe(&self, chat: &SubscriberId) -> NotificationResult<CommandResponse> {
        match self.registry.add(chat.clone()).await {
            Ok(true) => {
                info!(chat = %chat, "구독 등록");
                Ok(CommandResponse::html(
                    "🚀 Halo! Bot saham aktif.\n\
                     Kamu akan menerima berita pasar, alert harga, dan ringkasan harian.\n\
                     Ketik /help untuk daftar perintah.",
                ))
            }
            Ok(false) => Ok(CommandResponse::html("ℹ️ Kamu sudah berlangganan.")),
            Err(e) => store_failure(e),
        }
    }

    async fn handle_unsubscribe(&self, chat: &SubscriberId) -> NotificationResult<CommandResponse> {
        match self.registry.remove(chat).await {
            Ok(true) => {
                info!(chat = %chat, "구독 해지");
                Ok(CommandResponse::html(
                    "👋 Langganan dihentikan. Ketik /start untuk aktif lagi.",
                ))
            }
            Ok(false) => Ok(CommandResponse::html("ℹ️ Kamu belum berlangganan.")),
            Err(e) => store_failure(e),
        }
    }

    async fn handle_set_alert(
        &self,
        chat: &SubscriberId,
        ticker: &str,
        target: Decimal,
    ) -> NotificationResult<CommandResponse> {
        let symbol = self.market.normalize(ticker);
        match self.alerts.add_alert(chat.clone(), &symbol, target).await {
            Ok(alert) => Ok(CommandResponse::html(format!(
                "✅ Alert dipasang: <b>{}</b> naik ke Rp {}",
                self.display(&alert.ticker),
                alert.target_price.to_price_string()
            ))),
            Err(e) => store_failure(e),
        }
    }

    async fn handle_list_alerts(&self, chat: &SubscriberId) -> NotificationResult<CommandResponse> {
        let alerts = match self.alerts.list_alerts(chat).await {
            Ok(alerts) => alerts,
            Err(e) => return store_failure(e),
        };

        if alerts.is_empty() {
            return Ok(CommandResponse::html(
                "📭 Belum ada alert. Gunakan /alert &lt;TICKER&gt; &lt;HARGA&gt;",
            ));
        }

        let mut text = String::from("🔔 <b>Alert aktif</b>\n");
        for alert in &alerts {
            text.push_str(&format!(
                "\n• <b>{}</b> ≥ Rp {}",
                self.display(&alert.ticker),
                alert.target_price.to_price_string()
            ));
        }
        Ok(CommandResponse::html(text))
    }

    async fn handle_remove_alert(
        &self,
        chat: &SubscriberId,
        ticker: &str,
    ) -> NotificationResult<CommandResponse> {
        let symbol = self.market.normalize(ticker);
        match self.alerts.remove_alerts(chat, &symbol).await {
            Ok(0) => Ok(CommandResponse::html(format!(
                "ℹ️ Tidak ada alert untuk <b>{}</b>.",
                self.display(&symbol)
            ))),
            Ok(removed) => Ok(CommandResponse::html(format!(
                "🗑️ {} alert untuk <b>{}</b> dihapus.",
                removed,
                self.display(&symbol)
            ))),
            Err(e) => store_failure(e),
        }
    }

    async fn handle_signal(&self, ticker: &str) -> NotificationResult<CommandResponse> {
        let report = self.market.report(ticker).await;
        Ok(CommandResponse::html(
            self.formatter.render(&NotificationEvent::Signal(report)),
        ))
    }

    async fn handle_price(&self, tickers: &[String]) -> NotificationResult<CommandResponse> {
        let mut rows = Vec::with_capacity(tickers.len());
        for ticker in tickers {
            rows.push((ticker.clone(), self.market.price_change(ticker).await));
        }
        Ok(CommandResponse::html(
            self.formatter.render(&NotificationEvent::PriceTable(rows)),
        ))
    }
}
