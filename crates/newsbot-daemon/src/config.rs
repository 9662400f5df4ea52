//! 환경변수 기반 설정 모듈.

use std::path::PathBuf;
use std::time::Duration;

use chrono::FixedOffset;
use secrecy::SecretString;
use tracing::warn;

use crate::error::DaemonError;
use crate::Result;

/// 데몬 전체 설정
#[derive(Debug)]
pub struct BotConfig {
    /// 텔레그램 설정
    pub telegram: TelegramSettings,
    /// 영속 상태 파일 디렉터리
    pub state_dir: PathBuf,
    /// 사이클 주기 설정
    pub schedule: ScheduleConfig,
    /// 시세 조회 설정
    pub market: MarketConfig,
    /// 뉴스 수집 설정
    pub news: NewsConfig,
}

/// 텔레그램 설정
#[derive(Debug)]
pub struct TelegramSettings {
    /// 봇 토큰 (`run`/`digest`에 필수)
    pub bot_token: Option<SecretString>,
    /// Bot API 주소
    pub api_base: String,
    /// 명령어 long polling 활성화
    pub commands_enabled: bool,
}

/// 사이클 주기 설정
#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    pub news_interval_secs: u64,
    pub alert_interval_secs: u64,
    /// 다이제스트 시각 확인 주기
    pub digest_check_secs: u64,
    /// 다이제스트 발송 시각 (현지 시, 0-23)
    pub digest_hour: u32,
    /// 현지 시간대의 UTC 오프셋 (시간)
    pub digest_utc_offset_hours: i32,
    /// 사이클 전체 실패 후 대기 시간
    pub error_backoff_secs: u64,
}

/// 시세 조회 설정
#[derive(Debug, Clone)]
pub struct MarketConfig {
    pub request_timeout_secs: u64,
    /// 지표 계산용 일봉 조회 기간 (일)
    pub lookback_days: u32,
    /// 거래소 접미사 (예: ".JK")
    pub ticker_suffix: String,
    /// 다이제스트 대상 티커
    pub default_tickers: Vec<String>,
}

/// 뉴스 수집 설정
#[derive(Debug, Clone)]
pub struct NewsConfig {
    /// 소스당 최대 기사 수
    pub fetch_limit: usize,
    /// Yahoo 검색어
    pub queries: Vec<String>,
    /// 선택적 HTML 헤드라인 페이지
    pub html_url: Option<String>,
    pub html_selector: Option<String>,
    /// 제목에서 찾을 티커 길이 범위
    pub ticker_min_len: usize,
    pub ticker_max_len: usize,
    /// 비어 있지 않으면 이 목록의 티커만 제목에서 인식
    pub known_tickers: Vec<String>,
}

impl BotConfig {
    /// 환경변수에서 설정 로드 (`.env` 포함)
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 키 조회 함수로부터 설정을 만듭니다.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = EnvReader { lookup };

        let config = Self {
            telegram: TelegramSettings {
                bot_token: env
                    .string("TELEGRAM_BOT_TOKEN")
                    .map(|token| SecretString::new(token.into())),
                api_base: env
                    .string("TELEGRAM_API_BASE")
                    .unwrap_or_else(|| newsbot_notification::TELEGRAM_API_BASE.to_string()),
                commands_enabled: env.bool("BOT_COMMANDS_ENABLED", true),
            },
            state_dir: env
                .string("STATE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./data")),
            schedule: ScheduleConfig {
                news_interval_secs: env.parse("NEWS_INTERVAL_SECS", 300),
                alert_interval_secs: env.parse("ALERT_INTERVAL_SECS", 60),
                digest_check_secs: env.parse("DIGEST_CHECK_SECS", 20),
                digest_hour: env.parse("DIGEST_HOUR", 8),
                digest_utc_offset_hours: env.parse("DIGEST_UTC_OFFSET_HOURS", 7),
                error_backoff_secs: env.parse("ERROR_BACKOFF_SECS", 60),
            },
            market: MarketConfig {
                request_timeout_secs: env.parse("REQUEST_TIMEOUT_SECS", 10),
                lookback_days: env.parse("LOOKBACK_DAYS", 120),
                ticker_suffix: env.string("TICKER_SUFFIX").unwrap_or_else(|| ".JK".to_string()),
                default_tickers: env.list("DEFAULT_TICKERS", "BBCA,BBRI,BMRI,TLKM,ASII"),
            },
            news: NewsConfig {
                fetch_limit: env.parse("NEWS_FETCH_LIMIT", 10),
                queries: env.list("NEWS_QUERIES", "IHSG,saham"),
                html_url: env.string("NEWS_HTML_URL"),
                html_selector: env.string("NEWS_HTML_SELECTOR"),
                ticker_min_len: env.parse("NEWS_TICKER_MIN_LEN", 4),
                ticker_max_len: env.parse("NEWS_TICKER_MAX_LEN", 4),
                known_tickers: env.list("NEWS_KNOWN_TICKERS", ""),
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.schedule.digest_hour > 23 {
            return Err(DaemonError::Config(format!(
                "DIGEST_HOUR는 0-23 이어야 합니다: {}",
                self.schedule.digest_hour
            )));
        }
        self.schedule.utc_offset()?;

        let intervals = [
            ("NEWS_INTERVAL_SECS", self.schedule.news_interval_secs),
            ("ALERT_INTERVAL_SECS", self.schedule.alert_interval_secs),
            ("DIGEST_CHECK_SECS", self.schedule.digest_check_secs),
            ("REQUEST_TIMEOUT_SECS", self.market.request_timeout_secs),
        ];
        for (key, value) in intervals {
            if value == 0 {
                return Err(DaemonError::Config(format!("{}는 0보다 커야 합니다", key)));
            }
        }

        if self.news.ticker_min_len == 0 || self.news.ticker_min_len > self.news.ticker_max_len {
            return Err(DaemonError::Config(format!(
                "NEWS_TICKER_MIN_LEN/MAX_LEN 범위가 잘못되었습니다: {}..{}",
                self.news.ticker_min_len, self.news.ticker_max_len
            )));
        }

        if self.news.html_url.is_some() != self.news.html_selector.is_some() {
            return Err(DaemonError::Config(
                "NEWS_HTML_URL과 NEWS_HTML_SELECTOR는 함께 설정해야 합니다".to_string(),
            ));
        }
        Ok(())
    }

    /// 봇 토큰을 요구합니다.
    pub fn require_bot_token(&self) -> Result<&SecretString> {
        self.telegram.bot_token.as_ref().ok_or_else(|| {
            DaemonError::Config("TELEGRAM_BOT_TOKEN 환경변수가 설정되지 않았습니다".to_string())
        })
    }

    pub fn subscribers_path(&self) -> PathBuf {
        self.state_dir.join("subscribers.json")
    }

    pub fn alerts_path(&self) -> PathBuf {
        self.state_dir.join("alerts.json")
    }

    pub fn seen_news_path(&self) -> PathBuf {
        self.state_dir.join("seen_news.json")
    }
}

impl ScheduleConfig {
    pub fn news_interval(&self) -> Duration {
        Duration::from_secs(self.news_interval_secs)
    }

    pub fn alert_interval(&self) -> Duration {
        Duration::from_secs(self.alert_interval_secs)
    }

    pub fn digest_check_interval(&self) -> Duration {
        Duration::from_secs(self.digest_check_secs)
    }

    pub fn error_backoff(&self) -> Duration {
        Duration::from_secs(self.error_backoff_secs)
    }

    /// 현지 시간대 오프셋
    pub fn utc_offset(&self) -> Result<FixedOffset> {
        self.digest_utc_offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                DaemonError::Config(format!(
                    "잘못된 DIGEST_UTC_OFFSET_HOURS: {}",
                    self.digest_utc_offset_hours
                ))
            })
    }
}

impl MarketConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// 환경변수 조회 도우미
struct EnvReader<F> {
    lookup: F,
}

impl<F> EnvReader<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// 공백뿐인 값은 설정되지 않은 것으로 봅니다.
    fn string(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// 값을 파싱 (실패 시 경고 후 기본값 사용)
    fn parse<T>(&self, key: &str, default: T) -> T
    where
        T: std::str::FromStr + std::fmt::Display,
    {
        let Some(raw) = self.string(key) else {
            return default;
        };
        match raw.parse() {
            Ok(value) => value,
            Err(_) => {
                warn!(key, value = %raw, default = %default, "설정값 파싱 실패, 기본값 사용");
                default
            }
        }
    }

    fn bool(&self, key: &str, default: bool) -> bool {
        self.string(key)
            .map(|v| v == "true" || v == "1")
            .unwrap_or(default)
    }

    /// 쉼표 구분 목록
    fn list(&self, key: &str, default: &str) -> Vec<String> {
        self.string(key)
            .unwrap_or_else(|| default.to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}
