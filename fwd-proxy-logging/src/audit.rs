use std::fmt;
use std::net::IpAddr;
use std::path::Path;

use chrono::{DateTime, Local};
use log::{debug, info};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use fwd_proxy_error::{Result, log_err};

/// 로그 타임스탬프 형식 (예: `Sun 19 Oct 2026 14:03:11 +09:00`)
const TIMESTAMP_FORMAT: &str = "%a %d %b %Y %H:%M:%S %Z";

/// 완료된 트랜잭션 한 건의 감사 로그
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub client_ip: IpAddr,
    pub uri: String,
    pub bytes: u64,
}

impl LogEntry {
    /// 현재 시각으로 생성
    pub fn new(client_ip: IpAddr, uri: impl Into<String>, bytes: u64) -> Self {
        Self::at(Local::now(), client_ip, uri, bytes)
    }

    pub(crate) fn at(
        timestamp: DateTime<Local>,
        client_ip: IpAddr,
        uri: impl Into<String>,
        bytes: u64,
    ) -> Self {
        Self {
            timestamp,
            client_ip,
            uri: uri.into(),
            bytes,
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {} {}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.client_ip,
            self.uri,
            self.bytes
        )
    }
}

/// 동시에 실행되는 트랜잭션들의 로그 기록을 하나의 파일로 직렬화하는 로거.
///
/// 한 번에 하나의 append 만 진행되며, 한 줄을 쓰고 flush 할 때까지 잠금을 유지합니다.
pub struct AuditLogger {
    file: Mutex<File>,
}

impl AuditLogger {
    /// append 모드로 로그파일 열기, 실패하면 서비스를 시작할 수 없음
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(|e| log_err(format!("로그파일 열기 실패 '{}': {e}", path.display())))?;

        info!("감사 로그파일 열기: {}", path.display());
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// 로그 한 줄 기록
    pub async fn append(&self, entry: &LogEntry) -> Result<()> {
        let line = format!("{entry}\n");

        let mut file = self.file.lock().await;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| log_err(format!("로그 기록 실패: {e}")))?;
        file.flush()
            .await
            .map_err(|e| log_err(format!("로그 flush 실패: {e}")))?;

        debug!("로그 기록: {}", line.trim_end());
        Ok(())
    }

    /// 종료 전 디스크 동기화
    pub async fn close(&self) -> Result<()> {
        let mut file = self.file.lock().await;
        file.flush().await?;
        file.sync_all().await?;
        info!("감사 로그파일 닫기");
        Ok(())
    }
}
