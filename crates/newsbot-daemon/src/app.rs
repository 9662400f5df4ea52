//! 설정으로부터 구성 요소를 조립합니다.

use std::sync::Arc;

use newsbot_analytics::IndicatorEngine;
use newsbot_data::{
    AlertStore, HtmlHeadlineSource, JsonFileStore, NewsDeduplicator, NewsSource, SubscriberRegistry,
    YahooNewsSource, YahooQuoteProvider,
};
use newsbot_notification::{
    Broadcaster, MessageFormatter, TelegramBotHandler, TelegramConfig, TelegramNotifier,
    COMMAND_DESCRIPTIONS,
};
use secrecy::ExposeSecret;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::clock::{Clock, SystemClock};
use crate::commands::CommandService;
use crate::config::{BotConfig, NewsConfig};
use crate::cycles::{AlertCycle, DigestCycle, NewsCycle};
use crate::resolver::UppercaseTokenResolver;
use crate::scheduler::{Schedule, Scheduler};
use crate::service::MarketService;
use crate::Result;

/// 시세 서비스만 필요한 경우 (`signal` 서브커맨드 등).
pub fn build_market_service(config: &BotConfig) -> Result<MarketService> {
    let provider = YahooQuoteProvider::new(config.market.request_timeout())?
        .with_fallback_suffix(config.market.ticker_suffix.clone());

    Ok(MarketService::new(
        Arc::new(provider),
        IndicatorEngine::new(),
        config.market.lookback_days,
        config.market.ticker_suffix.clone(),
    ))
}

/// 설정된 뉴스 소스 목록.
///
/// Yahoo 검색은 항상 포함되고, HTML 스크래퍼는 URL과 셀렉터가 모두 있을 때만 추가됩니다.
pub fn build_news_sources(
    news: &NewsConfig,
    request_timeout: std::time::Duration,
) -> Result<Vec<Box<dyn NewsSource>>> {
    let mut sources: Vec<Box<dyn NewsSource>> = vec![Box::new(YahooNewsSource::new(
        news.queries.clone(),
        request_timeout,
    )?)];

    if let (Some(url), Some(selector)) = (&news.html_url, &news.html_selector) {
        sources.push(Box::new(HtmlHeadlineSource::new(
            url,
            selector,
            "html",
            request_timeout,
        )?));
    }

    Ok(sources)
}

/// 제목 기반 티커 추정기.
pub fn build_resolver(news: &NewsConfig) -> UppercaseTokenResolver {
    let resolver =
        UppercaseTokenResolver::new().with_length(news.ticker_min_len, news.ticker_max_len);
    if news.known_tickers.is_empty() {
        resolver
    } else {
        resolver.with_known_tickers(&news.known_tickers)
    }
}

/// 조립된 봇.
pub struct App {
    config: BotConfig,
    registry: Arc<SubscriberRegistry>,
    alerts: Arc<AlertStore>,
    dedup: Arc<NewsDeduplicator>,
    market: Arc<MarketService>,
    notifier: Arc<TelegramNotifier>,
    broadcaster: Broadcaster,
    clock: Arc<dyn Clock>,
}

impl App {
    /// 설정으로부터 모든 구성 요소를 생성합니다. 봇 토큰이 필요합니다.
    pub fn build(config: BotConfig) -> Result<Self> {
        let token = config.require_bot_token()?;
        let telegram = TelegramConfig::new(token.expose_secret())
            .with_api_base(config.telegram.api_base.clone())
            .with_request_timeout(config.market.request_timeout());
        let notifier = Arc::new(TelegramNotifier::new(telegram)?);

        let market = Arc::new(build_market_service(&config)?);
        let formatter = MessageFormatter::new(config.market.ticker_suffix.clone());
        let broadcaster = Broadcaster::new(notifier.clone(), formatter);

        info!(state_dir = %config.state_dir.display(), "상태 디렉토리");

        Ok(Self {
            registry: Arc::new(SubscriberRegistry::new(JsonFileStore::new(
                config.subscribers_path(),
            ))),
            alerts: Arc::new(AlertStore::new(JsonFileStore::new(config.alerts_path()))),
            dedup: Arc::new(NewsDeduplicator::new(JsonFileStore::new(
                config.seen_news_path(),
            ))),
            market,
            notifier,
            broadcaster,
            clock: Arc::new(SystemClock),
            config,
        })
    }

    pub fn news_cycle(&self) -> Result<NewsCycle> {
        let sources = build_news_sources(&self.config.news, self.config.market.request_timeout())?;
        Ok(NewsCycle::new(
            sources,
            self.dedup.clone(),
            self.registry.clone(),
            self.market.clone(),
            Arc::new(build_resolver(&self.config.news)),
            self.broadcaster.clone(),
            self.config.news.fetch_limit,
        ))
    }

    pub fn alert_cycle(&self) -> AlertCycle {
        AlertCycle::new(
            self.alerts.clone(),
            self.market.clone(),
            self.broadcaster.clone(),
        )
    }

    pub fn digest_cycle(&self) -> Result<DigestCycle> {
        Ok(DigestCycle::new(
            self.registry.clone(),
            self.market.clone(),
            self.broadcaster.clone(),
            self.clock.clone(),
            self.config.schedule.utc_offset()?,
            self.config.schedule.digest_hour,
            self.config.market.default_tickers.clone(),
        ))
    }

    pub fn command_service(&self) -> CommandService {
        CommandService::new(
            self.registry.clone(),
            self.alerts.clone(),
            self.market.clone(),
            self.broadcaster.formatter().clone(),
        )
    }

    /// 세 사이클과 (설정된 경우) 명령어 폴링 태스크를 등록합니다.
    pub async fn start(&self, cancel: CancellationToken) -> Result<Scheduler> {
        let schedule = &self.config.schedule;
        let backoff = schedule.error_backoff();
        let mut scheduler = Scheduler::new(cancel);

        scheduler.spawn_cycle(
            Arc::new(self.news_cycle()?),
            Schedule::new(schedule.news_interval(), backoff),
        );
        scheduler.spawn_cycle(
            Arc::new(self.alert_cycle()),
            Schedule::new(schedule.alert_interval(), backoff),
        );
        scheduler.spawn_cycle(
            Arc::new(self.digest_cycle()?.with_cancel(scheduler.cancel_token())),
            Schedule::new(schedule.digest_check_interval(), backoff),
        );

        if self.config.telegram.commands_enabled {
            if let Err(e) = self.notifier.set_my_commands(COMMAND_DESCRIPTIONS).await {
                warn!(error = %e, "명령어 목록 등록 실패, 폴링은 계속");
            }
            let handler =
                TelegramBotHandler::new(self.notifier.clone(), Arc::new(self.command_service()));
            let token = scheduler.cancel_token();
            scheduler.spawn_task("commands", async move { handler.run(token).await });
        }

        info!(tasks = scheduler.task_count(), "스케줄러 시작");
        Ok(scheduler)
    }

    /// 다이제스트를 즉시 한 번 발송합니다.
    pub async fn send_digest_now(&self) -> Result<()> {
        let cycle = self.digest_cycle()?;
        let date = cycle.local_now().date_naive();
        let stats = cycle.send_digest(date).await?;
        stats.log_summary("digest");
        Ok(())
    }
}
