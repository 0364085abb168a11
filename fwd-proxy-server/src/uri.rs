use fwd_proxy_error::TransactionError;

/// 포트가 없을 때 사용하는 기본 HTTP 포트
pub const DEFAULT_PORT: u16 = 80;

const SCHEME: &str = "http://";

// 호스트명이 끝나는 경계 문자
const HOST_DELIMITERS: [char; 5] = [' ', ':', '/', '\r', '\n'];

/// 절대 URI 를 분해한 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTarget {
    pub hostname: String,
    pub port: u16,
    pub path: String,
}

/// `http://host[:port][/path]` 형태의 URI 분해.
///
/// 스킴은 대소문자를 구분하지 않습니다. 경로는 디코딩이나 정규화 없이 그대로
/// 유지되며, 없으면 `/` 입니다. 포트 자리의 숫자가 올바르지 않으면 0 이 되고
/// 그대로 전달됩니다(연결 단계에서 실패).
pub fn decompose(uri: &str) -> Result<ParsedTarget, TransactionError> {
    let rest = match uri.get(..SCHEME.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(SCHEME) => &uri[SCHEME.len()..],
        _ => return Err(TransactionError::InvalidUri(uri.to_string())),
    };

    let host_end = rest.find(HOST_DELIMITERS).unwrap_or(rest.len());
    let (hostname, after_host) = rest.split_at(host_end);
    if hostname.is_empty() {
        return Err(TransactionError::InvalidUri(uri.to_string()));
    }

    let port = match after_host.strip_prefix(':') {
        Some(digits) => parse_port(digits),
        None => DEFAULT_PORT,
    };

    let path = match after_host.find('/') {
        Some(start) => &after_host[start..],
        None => "/",
    };

    Ok(ParsedTarget {
        hostname: hostname.to_string(),
        port,
        path: path.to_string(),
    })
}

/// 앞쪽의 10진 숫자만 해석, 숫자가 없거나 범위를 넘으면 0
fn parse_port(s: &str) -> u16 {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s[..end].parse().unwrap_or(0)
}
