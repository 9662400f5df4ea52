//! 알림 메시지 렌더링.
//!
//! 모든 메시지는 Telegram HTML parse mode 기준으로 만들어집니다.
//! 사용자에게 보이는 문구는 봇 사용자층에 맞춰 인도네시아어로 작성합니다.

use chrono::NaiveDate;
use newsbot_core::{
    display_symbol, DecimalExt, IndicatorSnapshot, NewsItem, PriceChange, Signal, SignalReport,
    TriggeredAlert,
};
use rust_decimal::Decimal;

use crate::types::NotificationEvent;

/// HTML 특수 문자를 이스케이프합니다.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// "Rp 9,875" 형식. 정수 단위로 반올림합니다.
pub fn format_rupiah(price: Decimal) -> String {
    format!("Rp {}", price.round_half_up(0).to_price_string())
}

/// 알림 이벤트를 메시지 텍스트로 변환합니다.
#[derive(Debug, Clone)]
pub struct MessageFormatter {
    ticker_suffix: String,
}

impl MessageFormatter {
    /// 표시 시 제거할 거래소 접미사를 받아 생성합니다.
    pub fn new(ticker_suffix: impl Into<String>) -> Self {
        Self {
            ticker_suffix: ticker_suffix.into(),
        }
    }

    pub fn render(&self, event: &NotificationEvent) -> String {
        match event {
            NotificationEvent::News(item) => self.render_news(item),
            NotificationEvent::Signal(report) => self.render_report(report),
            NotificationEvent::AlertTriggered(alert) => self.render_alert(alert),
            NotificationEvent::DailyDigest { date, reports } => {
                self.render_digest(*date, reports)
            }
            NotificationEvent::PriceTable(rows) => self.render_price_table(rows),
        }
    }

    fn display(&self, symbol: &str) -> String {
        display_symbol(symbol, &self.ticker_suffix)
    }

    fn render_news(&self, item: &NewsItem) -> String {
        let mut text = format!(
            "📰 <b>{}</b>\n<i>Sumber: {}</i>",
            escape_html(item.title.trim()),
            escape_html(&item.origin_tag)
        );
        let link = item.link.trim();
        if !link.is_empty() {
            text.push_str(&format!(
                "\n<a href=\"{}\">Baca selengkapnya</a>",
                escape_html(link)
            ));
        }
        text
    }

    fn render_report(&self, report: &SignalReport) -> String {
        match report {
            SignalReport::Ready(snapshot) => self.render_snapshot(snapshot),
            SignalReport::InsufficientData { symbol, provided } => format!(
                "⚪ <b>{}</b>\nData belum cukup untuk analisis ({} bar).",
                escape_html(&self.display(symbol)),
                provided
            ),
            SignalReport::Unavailable { symbol } => format!(
                "❌ Gagal ambil data untuk <b>{}</b>",
                escape_html(&self.display(symbol))
            ),
        }
    }

    fn render_snapshot(&self, snapshot: &IndicatorSnapshot) -> String {
        format!(
            "{emoji} <b>{symbol}</b> • {price}\n\
             Sinyal: <b>{signal}</b>\n\
             <code>EMA20  {ema20}\n\
             EMA50  {ema50}\n\
             RSI14  {rsi}\n\
             MACD   {macd} / {macd_signal} ({hist})</code>",
            emoji = snapshot.signal.emoji(),
            symbol = escape_html(&self.display(&snapshot.symbol)),
            price = format_rupiah(snapshot.latest_price),
            signal = snapshot.signal,
            ema20 = snapshot.ema20.round_half_up(2),
            ema50 = snapshot.ema50.round_half_up(2),
            rsi = snapshot.rsi14.round_half_up(2),
            macd = snapshot.macd_line.round_half_up(2),
            macd_signal = snapshot.macd_signal.round_half_up(2),
            hist = snapshot.macd_histogram.round_half_up(2),
        )
    }

    fn render_alert(&self, alert: &TriggeredAlert) -> String {
        format!(
            "🔔 <b>Alert harga tercapai</b>\n\n\
             <b>{}</b> naik ke {} (target {})",
            escape_html(&self.display(&alert.ticker)),
            format_rupiah(alert.current_price),
            alert.target_price.to_price_string()
        )
    }

    fn render_digest(&self, date: NaiveDate, reports: &[SignalReport]) -> String {
        let mut lines = vec![format!(
            "📅 <b>Ringkasan harian</b> ({})",
            date.format("%Y-%m-%d")
        )];
        lines.push(String::new());

        for report in reports {
            let symbol = escape_html(&self.display(report.symbol()));
            let line = match report {
                SignalReport::Ready(snapshot) => format!(
                    "{} <b>{}</b> {} • {} • RSI {}",
                    snapshot.signal.emoji(),
                    symbol,
                    format_rupiah(snapshot.latest_price),
                    snapshot.signal,
                    snapshot.rsi14.round_half_up(1)
                ),
                SignalReport::InsufficientData { .. } => {
                    format!("{} <b>{}</b> data belum cukup", Signal::InsufficientData.emoji(), symbol)
                }
                SignalReport::Unavailable { .. } => format!("❌ <b>{}</b> N/A", symbol),
            };
            lines.push(line);
        }

        if reports.is_empty() {
            lines.push("<i>Tidak ada ticker.</i>".to_string());
        }
        lines.join("\n")
    }

    /// `/harga` 응답. 고정폭 표로 정렬합니다.
    fn render_price_table(&self, rows: &[(String, Option<PriceChange>)]) -> String {
        let cells: Vec<(String, String, String, &str)> = rows
            .iter()
            .map(|(ticker, change)| match change {
                Some(change) => {
                    let (pct, emoji) = match change.change_pct() {
                        Some(pct) => {
                            let rounded = pct.round_half_up(2);
                            let emoji = if rounded > Decimal::ZERO {
                                "🟢📈"
                            } else if rounded < Decimal::ZERO {
                                "🔴📉"
                            } else {
                                "⚪"
                            };
                            (pct.to_signed_percent(), emoji)
                        }
                        None => (String::new(), "⚪"),
                    };
                    (ticker.to_uppercase(), format_rupiah(change.last), pct, emoji)
                }
                None => (ticker.to_uppercase(), "N/A".to_string(), String::new(), "❌"),
            })
            .collect();

        let max_t = cells.iter().map(|c| c.0.chars().count()).max().unwrap_or(0);
        let max_p = cells.iter().map(|c| c.1.chars().count()).max().unwrap_or(0);
        let max_pct = cells.iter().map(|c| c.2.chars().count()).max().unwrap_or(0);

        let lines: Vec<String> = cells
            .iter()
            .map(|(t, p, pct, emoji)| {
                format!("{t:<max_t$} | {p:>max_p$} | {pct:>max_pct$} {emoji}")
            })
            .collect();

        format!("<pre>{}</pre>", escape_html(&lines.join("\n")))
    }
}

impl Default for MessageFormatter {
    fn default() -> Self {
        Self::new(".JK")
    }
}
