//! 뉴스/가격 알림 봇 CLI.

use anyhow::Context;
use clap::{Parser, Subcommand};
use newsbot_core::{init_logging, LogConfig, SignalReport};
use newsbot_daemon::{app, App, BotConfig};
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "newsbot")]
#[command(about = "Market news & price-alert notifier", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 로그 레벨 (trace, debug, info, warn, error). 지정하지 않으면 RUST_LOG 사용
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// 데몬 모드: 뉴스/알림/다이제스트 사이클과 명령어 폴링 실행
    Run,

    /// 티커 하나의 지표 스냅샷을 출력
    Signal {
        /// 티커 (예: BBCA, BBCA.JK)
        ticker: String,
    },

    /// 일일 다이제스트를 즉시 발송
    Digest,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    // 로깅 초기화
    let mut log_config = LogConfig::from_env();
    if let Some(level) = cli.log_level {
        log_config.level = level;
    }
    init_logging(log_config).map_err(|e| anyhow::anyhow!("로깅 초기화 실패: {e}"))?;

    let config = BotConfig::from_env().context("설정 로드 실패")?;
    tracing::debug!(state_dir = %config.state_dir.display(), "설정 로드 완료");

    match cli.command {
        Commands::Run => {
            tracing::info!("newsbot 시작");
            let app = App::build(config)?;
            let cancel = CancellationToken::new();
            let scheduler = app.start(cancel.clone()).await?;

            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("종료 신호 수신, 태스크 종료 중...");
                }
                _ = cancel.cancelled() => {}
            }

            scheduler.shutdown().await;
            tracing::info!("newsbot 종료");
        }
        Commands::Signal { ticker } => {
            let market = app::build_market_service(&config)?;
            match market.report(&ticker).await {
                SignalReport::Ready(snapshot) => {
                    println!("{}", serde_json::to_string_pretty(&snapshot)?);
                }
                SignalReport::InsufficientData { symbol, provided } => {
                    anyhow::bail!("{symbol}: 유효 종가 부족 ({provided}개)");
                }
                SignalReport::Unavailable { symbol } => {
                    anyhow::bail!("{symbol}: 시세 조회 실패");
                }
            }
        }
        Commands::Digest => {
            let app = App::build(config)?;
            app.send_digest_now().await?;
        }
    }

    Ok(())
}
