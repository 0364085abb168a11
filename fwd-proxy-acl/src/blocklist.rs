use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use log::{debug, info, warn};

use fwd_proxy_config::MatchPolicy;
use fwd_proxy_error::{ProxyError, Result};

/// 요청 대상 차단 여부를 판단하는 구조체.
///
/// 시작 시 한 번 로드된 뒤에는 변경되지 않으므로 잠금 없이 여러 태스크가 동시에 읽습니다.
#[derive(Debug, Default)]
pub struct Blocklist {
    policy: MatchPolicy,
    // 로드 순서를 유지한 소문자 항목
    entries: Vec<String>,
    // 호스트명 정책용 조회 테이블
    hosts: HashSet<String>,
}

impl Blocklist {
    /// 항목 목록으로 생성
    pub fn new<I, S>(policy: MatchPolicy, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries: Vec<String> = entries
            .into_iter()
            .filter_map(|entry| normalize_entry(entry.as_ref()))
            .collect();
        let hosts = entries.iter().cloned().collect();

        Self {
            policy,
            entries,
            hosts,
        }
    }

    /// 차단목록 파일 로드, 파일이 없으면 빈 목록으로 동작
    pub fn load<P: AsRef<Path>>(path: P, policy: MatchPolicy) -> Result<Self> {
        let path = path.as_ref();
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("차단목록 파일 없음, 제한 없이 동작: {}", path.display());
                return Ok(Self::new(policy, std::iter::empty::<&str>()));
            }
            Err(e) => {
                return Err(ProxyError::Config(format!(
                    "차단목록 파일 읽기 실패 '{}': {e}",
                    path.display()
                )));
            }
        };

        let blocklist = Self::new(policy, contents.lines());
        info!(
            "차단목록 로드 완료. {}개의 항목 로드 ({:?} 정책)",
            blocklist.len(),
            policy
        );
        Ok(blocklist)
    }

    /// 요청 차단여부.
    ///
    /// `host` 는 URI 분해에 성공했을 때의 호스트명입니다. 호스트명 정책에서
    /// 분해에 실패한 요청은 차단 대상으로 보지 않습니다.
    pub fn is_blocked(&self, uri: &str, host: Option<&str>) -> bool {
        if self.entries.is_empty() {
            return false;
        }

        match self.policy {
            MatchPolicy::Hostname => {
                let Some(host) = host.filter(|h| !h.is_empty()) else {
                    return false;
                };
                let host = host.to_ascii_lowercase();
                if self.hosts.contains(&host) {
                    debug!("정확히 차단된 호스트: {host}");
                    return true;
                }
                false
            }
            MatchPolicy::Substring => {
                let uri = uri.to_ascii_lowercase();
                match self.entries.iter().find(|entry| uri.contains(entry.as_str())) {
                    Some(entry) => {
                        debug!("부분 문자열로 차단된 URI: {uri} ({entry})");
                        true
                    }
                    None => false,
                }
            }
        }
    }

    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// 한 줄을 항목으로 정규화, 빈 줄과 주석은 제외
fn normalize_entry(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    Some(line.to_ascii_lowercase())
}
