//! tracing 기반 로깅 초기화.
//!
//! 출력 형식은 세 가지를 지원합니다:
//! - **pretty**: 로컬 개발용
//! - **json**: 로그 수집기 연동용
//! - **compact**: 한 줄 요약 형식 (데몬 기본값)

use tracing_subscriber::filter::ParseError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// 로그 출력 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// 색상이 포함된 여러 줄 형식
    Pretty,
    /// JSON 한 줄 형식
    Json,
    /// 간결한 한 줄 형식
    #[default]
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            _ => Err(format!("알 수 없는 로그 형식: {}", s)),
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// 로그 레벨 필터 (예: "info", "newsbot_daemon=debug")
    pub level: String,
    /// 출력 형식
    pub format: LogFormat,
    /// 대상(모듈 경로) 포함 여부
    pub with_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
            with_target: true,
        }
    }
}

impl LogConfig {
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            ..Default::default()
        }
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// `RUST_LOG`, `LOG_FORMAT` 환경 변수에서 설정을 읽습니다.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 키 조회 함수로부터 설정을 만듭니다.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let level = lookup("RUST_LOG").unwrap_or_else(|| "info".to_string());
        let format = lookup("LOG_FORMAT")
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();

        Self {
            level,
            format,
            ..Default::default()
        }
    }
}

/// 주어진 설정으로 전역 subscriber를 설치합니다.
///
/// 필터는 `config.level`만으로 만듭니다. `RUST_LOG`는 `LogConfig::from_env`에서
/// 이미 반영되므로, 호출자가 바꾼 레벨이 항상 우선합니다.
///
/// ```no_run
/// use newsbot_core::logging::{init_logging, LogConfig, LogFormat};
///
/// init_logging(LogConfig::new("debug").with_format(LogFormat::Json)).unwrap();
/// ```
pub fn init_logging(config: LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = level_filter(&config)?;

    let fmt_layer = match config.format {
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_target(config.with_target)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(config.with_target)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_target(config.with_target)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    tracing::debug!(format = ?config.format, level = %config.level, "로깅 초기화 완료");

    Ok(())
}

fn level_filter(config: &LogConfig) -> Result<EnvFilter, ParseError> {
    EnvFilter::try_new(&config.level)
}

/// 사이클 이름과 선택적 티커를 담은 span을 생성합니다.
#[macro_export]
macro_rules! cycle_span {
    ($cycle:expr) => {
        tracing::info_span!("cycle", cycle = %$cycle)
    };
    ($cycle:expr, $ticker:expr) => {
        tracing::info_span!("cycle", cycle = %$cycle, ticker = %$ticker)
    };
}
