use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use fwd_proxy_error::Result;

/// 오리진으로 보내는 고정 User-Agent
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:10.0.3) Gecko/20120305 Firefox/10.0.3";

/// 차단목록 매칭 정책
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchPolicy {
    /// 분해된 호스트명이 항목과 대소문자 구분 없이 일치하면 차단
    #[default]
    Hostname,
    /// 요청 URI 원문에 항목이 포함되어 있으면 차단
    Substring,
}

/// 프록시 서버 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub bind_host: String,
    pub bind_port: u16,
    pub blocklist_path: String,
    pub log_path: String,
    pub match_policy: MatchPolicy,
    /// false 면 accept 루프에서 트랜잭션을 직접 처리
    pub concurrent: bool,
    pub worker_threads: Option<usize>,
    /// 요청/응답 한 줄을 읽을 때의 최대 바이트 수
    pub max_line_bytes: usize,
    /// 버려지는 클라이언트 헤더 블록의 최대 바이트 수
    pub max_header_bytes: usize,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// 기본설정으로 생성
    #[must_use]
    pub fn new() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            bind_port: 8080,
            blocklist_path: "blocklist.txt".to_string(),
            log_path: "proxy.log".to_string(),
            match_policy: MatchPolicy::Hostname,
            concurrent: true,
            worker_threads: None,
            max_line_bytes: 8192,
            max_header_bytes: 65536,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// 설정파일에서 설정 로드
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let config = serde_yml::from_str(&contents)?;

        Ok(config)
    }

    /// 바인딩 주소 문자열
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_host, self.bind_port)
    }
}
