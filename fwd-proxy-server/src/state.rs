use std::sync::Arc;

use fwd_proxy_acl::Blocklist;
use fwd_proxy_config::Config;
use fwd_proxy_error::Result;
use fwd_proxy_logging::AuditLogger;

/// 모든 트랜잭션이 공유하는 프로세스 범위 컨텍스트.
///
/// 차단목록은 로드 후 읽기 전용이고, 감사 로거만 내부 잠금을 가집니다.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub blocklist: Arc<Blocklist>,
    pub audit: Arc<AuditLogger>,
}

impl AppState {
    pub fn new(config: Config, blocklist: Blocklist, audit: AuditLogger) -> Self {
        Self {
            config: Arc::new(config),
            blocklist: Arc::new(blocklist),
            audit: Arc::new(audit),
        }
    }

    /// 설정으로부터 생성, 로그파일을 열 수 없으면 실패
    pub async fn from_config(config: Config) -> Result<Self> {
        let audit = AuditLogger::open(&config.log_path).await?;
        let blocklist = Blocklist::load(&config.blocklist_path, config.match_policy)?;

        Ok(Self::new(config, blocklist, audit))
    }
}
