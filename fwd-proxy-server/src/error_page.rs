use std::io;

use hyper::StatusCode;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use fwd_proxy_error::TransactionError;

/// 에러 페이지 본문 생성
pub fn render_body(cause: &str, status: StatusCode, explanation: &str) -> String {
    format!(
        "<html><title>Proxy Error</title><body bgcolor=\"ffffff\">\r\n\
         {code}: {reason}\r\n\
         <p>{explanation}: {cause}\r\n\
         <hr><em>The Forwarding Proxy Server</em>\r\n\
         </body></html>\r\n",
        code = status.as_u16(),
        reason = status.canonical_reason().unwrap_or("Error"),
        cause = escape_html(cause),
    )
}

/// 상태 라인과 헤더 생성, Content-Length 는 본문의 실제 바이트 길이
pub fn render_head(status: StatusCode, body_len: usize) -> String {
    format!(
        "HTTP/1.0 {} {}\r\nContent-Type: text/html\r\nContent-Length: {}\r\n\r\n",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Error"),
        body_len
    )
}

/// 클라이언트에 에러 페이지 전송
pub async fn write_error_page<W>(
    writer: &mut W,
    cause: &str,
    status: StatusCode,
    explanation: &str,
) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let body = render_body(cause, status, explanation);
    let head = render_head(status, body.len());

    writer.write_all(head.as_bytes()).await?;
    writer.write_all(body.as_bytes()).await?;
    writer.flush().await
}

/// 트랜잭션 에러를 에러 페이지로 응답
pub async fn respond_with_error<W>(writer: &mut W, err: &TransactionError) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    write_error_page(writer, err.cause(), err.status(), err.explanation()).await
}

fn escape_html(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
