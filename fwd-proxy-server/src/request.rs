use std::fmt;

use crate::uri::ParsedTarget;

/// 프록시가 전달하는 메서드
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Head,
}

impl Method {
    /// 대소문자 구분 없이 해석, GET/HEAD 외에는 None
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("GET") {
            Some(Method::Get)
        } else if s.eq_ignore_ascii_case("HEAD") {
            Some(Method::Head)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 클라이언트가 보낸 요청 라인
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestLine {
    pub method: String,
    pub uri: String,
    pub version: String,
}

impl RequestLine {
    /// 공백으로 나눠 해석, 빠진 필드는 빈 문자열
    pub fn parse(line: &str) -> Self {
        let mut parts = line.split_whitespace();
        let mut next = || parts.next().unwrap_or_default().to_string();

        Self {
            method: next(),
            uri: next(),
            version: next(),
        }
    }
}

/// 오리진으로 보낼 HTTP/1.0 요청 생성.
///
/// 클라이언트 헤더는 전달하지 않고 Host 와 User-Agent 만 강제합니다.
pub fn origin_request(method: Method, target: &ParsedTarget, user_agent: &str) -> String {
    format!(
        "{method} {path} HTTP/1.0\r\n\
         Host: {host}\r\n\
         User-Agent: {user_agent}\r\n\
         Connection: close\r\n\
         Proxy-Connection: close\r\n\
         \r\n",
        path = target.path,
        host = target.hostname,
    )
}
