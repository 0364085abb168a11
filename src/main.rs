use std::io::Write;
use std::path::PathBuf;

use chrono::Local;
use clap::Parser;
use env_logger::Builder;
use log::{LevelFilter, Record, error, info, warn};
use once_cell::sync::Lazy;

use fwd_proxy_config::Settings;
use fwd_proxy_error::{Result, internal_err};
use fwd_proxy_server::{AppState, ProxyServer};

/// 파일 디스크립터 제한 설정
static FD_LIMIT: Lazy<u64> = Lazy::new(|| {
    std::env::var("FD_LIMIT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(1000000) // 기본값 1M
});

/// HTTP GET/HEAD 포워딩 프록시
#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
    /// 리슨 포트
    port: u16,

    /// 설정파일 경로
    #[arg(long, default_value = "config.yml")]
    config: PathBuf,
}

/// 시스템 리소스 제한 설정
fn setup_resource_limits() {
    #[cfg(unix)]
    {
        use nix::sys::resource::{Resource, setrlimit};
        // 트랜잭션마다 클라이언트/오리진 fd 두 개를 사용
        match setrlimit(Resource::RLIMIT_NOFILE, *FD_LIMIT, *FD_LIMIT) {
            Ok(_) => {
                info!("파일 디스크립터 제한 {}", *FD_LIMIT);
            }
            Err(e) => {
                warn!("파일 디스크립터 제한 설정 실패: {:?}", e);
            }
        }
    }
}

/// 진단 로그 한 줄, 어느 모듈(커넥션/릴레이/감사 로그)에서 나왔는지 target 으로 구분
fn format_record(timestamp: &str, record: &Record, with_location: bool) -> String {
    if with_location {
        format!(
            "[{} {} {} {}:{}] {}",
            timestamp,
            record.level(),
            record.target(),
            record.file().unwrap_or("unknown"),
            record.line().unwrap_or(0),
            record.args()
        )
    } else {
        format!(
            "[{} {} {}] {}",
            timestamp,
            record.level(),
            record.target(),
            record.args()
        )
    }
}

/// 로거 세팅, RUST_LOG 가 있으면 기본 레벨보다 우선
fn setup_logger() {
    let (level, with_location) = if cfg!(debug_assertions) {
        (LevelFilter::Debug, true)
    } else {
        (LevelFilter::Info, false)
    };

    Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(move |buf, record| {
            let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
            writeln!(buf, "{}", format_record(&timestamp, record, with_location))
        })
        .init()
}

fn main() -> Result<()> {
    // 인자가 잘못되면 여기서 사용법 출력 후 종료
    let cli = Cli::parse();

    // 로거 세팅
    setup_logger();

    // fd 세팅
    setup_resource_limits();

    // 통합 설정 로드
    let settings = Settings::new(&cli.config, cli.port)?;

    let worker_threads = settings.proxy.worker_threads.unwrap_or_else(num_cpus::get);
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads.max(1))
        .enable_all()
        .build()
        .map_err(|e| internal_err(format!("런타임 생성 실패: {e}")))?;
    info!("fwdproxy 서버 시작 (워커 스레드 {worker_threads}개)");

    runtime.block_on(serve(settings))
}

async fn serve(settings: Settings) -> Result<()> {
    // 로그파일을 열 수 없으면 서비스하지 않음
    let state = AppState::from_config(settings.proxy).await?;
    let audit = state.audit.clone();
    let server = ProxyServer::new(state);

    tokio::select! {
        result = server.run() => {
            if let Err(e) = &result {
                error!("프록시 서버 종료: {e}");
            }
            result
        }
        _ = tokio::signal::ctrl_c() => {
            info!("종료 신호 수신");
            audit.close().await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Level;

    #[test]
    fn debug_format_carries_target_and_location() {
        let line = format_record(
            "2026-10-19 12:00:00",
            &Record::builder()
                .args(format_args!("요청 거부"))
                .level(Level::Info)
                .target("fwd_proxy_server::relay")
                .file(Some("fwd-proxy-server/src/relay.rs"))
                .line(Some(42))
                .build(),
            true,
        );
        assert_eq!(
            line,
            "[2026-10-19 12:00:00 INFO fwd_proxy_server::relay fwd-proxy-server/src/relay.rs:42] 요청 거부"
        );
    }

    #[test]
    fn release_format_keeps_target_without_location() {
        let line = format_record(
            "2026-10-19 12:00:00",
            &Record::builder()
                .args(format_args!("감사 로그파일 열기"))
                .level(Level::Warn)
                .target("fwd_proxy_logging::audit")
                .build(),
            false,
        );
        assert_eq!(line, "[2026-10-19 12:00:00 WARN fwd_proxy_logging::audit] 감사 로그파일 열기");
    }

    #[test]
    fn cli_requires_exactly_one_port() {
        assert!(Cli::try_parse_from(["fwdproxy"]).is_err());
        assert!(Cli::try_parse_from(["fwdproxy", "3128", "extra"]).is_err());
        assert!(Cli::try_parse_from(["fwdproxy", "notaport"]).is_err());

        let cli = Cli::try_parse_from(["fwdproxy", "3128"]).unwrap();
        assert_eq!(cli.port, 3128);
        assert_eq!(cli.config, PathBuf::from("config.yml"));
    }
}
