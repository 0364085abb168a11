use std::io;
use std::net::SocketAddr;

use log::{debug, error, info};
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader,
};
use tokio::net::TcpStream;

use fwd_proxy_error::TransactionError;
use fwd_proxy_logging::LogEntry;

use crate::error_page::respond_with_error;
use crate::request::{Method, RequestLine, origin_request};
use crate::state::AppState;
use crate::uri::{self, ParsedTarget};

/// 트랜잭션 처리 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// 요청 전에 클라이언트가 연결을 닫음
    ClientGone,
    /// 에러 페이지로 응답하고 종료
    Rejected(TransactionError),
    /// 오리진 응답을 중계, 전달한 바이트 수
    Relayed(u64),
}

/// 한 연결에서 요청 하나를 처리.
///
/// 클라이언트 소켓은 호출자가 닫고, 오리진 소켓은 반환 전에 닫힙니다.
/// 반환되는 에러는 클라이언트 쪽 입출력 실패뿐입니다.
pub async fn relay_transaction<S>(
    client: &mut S,
    peer: SocketAddr,
    state: &AppState,
) -> io::Result<Outcome>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let config = &state.config;

    // 요청 라인 읽기, 나머지 헤더는 읽어서 버림
    let mut line = Vec::new();
    {
        let mut reader = BufReader::new(&mut *client);
        if read_line_bounded(&mut reader, &mut line, config.max_line_bytes).await? == 0 {
            debug!("요청 없이 연결 종료: {peer}");
            return Ok(Outcome::ClientGone);
        }
        drain_headers(&mut reader, config.max_line_bytes, config.max_header_bytes).await?;
    }

    let request = match decode_request_line(&line, config.max_line_bytes) {
        Ok(request) => request,
        Err(err) => return reject(client, peer, err).await,
    };
    debug!(
        "요청 수신 {peer}: {} {} {}",
        request.method, request.uri, request.version
    );

    let (method, target) = match prepare(&request, state) {
        Ok(prepared) => prepared,
        Err(err) => return reject(client, peer, err).await,
    };

    let mut origin = match TcpStream::connect((target.hostname.as_str(), target.port)).await {
        Ok(stream) => stream,
        Err(e) => {
            info!("오리진 연결 실패 {}:{}: {e}", target.hostname, target.port);
            let err = TransactionError::OriginUnreachable(target.hostname.clone());
            return reject(client, peer, err).await;
        }
    };

    let forwarded = origin_request(method, &target, &config.user_agent);
    let bytes = match origin.write_all(forwarded.as_bytes()).await {
        Ok(()) => relay_response(&mut origin, client, config.max_line_bytes).await,
        Err(e) => {
            debug!("오리진 요청 전송 실패 {}: {e}", target.hostname);
            0
        }
    };
    drop(origin);

    let entry = LogEntry::new(peer.ip(), request.uri, bytes);
    if let Err(e) = state.audit.append(&entry).await {
        error!("감사 로그 기록 실패: {e}");
    }

    debug!("트랜잭션 완료 {peer}: {bytes} bytes");
    Ok(Outcome::Relayed(bytes))
}

/// 에러 페이지로 응답하고 트랜잭션 종료
async fn reject<S>(client: &mut S, peer: SocketAddr, err: TransactionError) -> io::Result<Outcome>
where
    S: AsyncWrite + Unpin,
{
    info!("요청 거부 {peer}: {err}");
    respond_with_error(client, &err).await?;
    Ok(Outcome::Rejected(err))
}

/// 요청 라인 해석.
///
/// 개행 없이 길이 제한에 닿은 줄이나 UTF-8 이 아닌 줄은 잘라내거나 치환하지 않고 거부합니다.
fn decode_request_line(
    line: &[u8],
    max_line_bytes: usize,
) -> Result<RequestLine, TransactionError> {
    if line.len() >= max_line_bytes.max(1) && !line.ends_with(b"\n") {
        return Err(TransactionError::InvalidUri(format!(
            "request line exceeds {max_line_bytes} bytes"
        )));
    }
    let text = std::str::from_utf8(line)
        .map_err(|_| TransactionError::InvalidUri("non-UTF-8 request line".to_string()))?;

    Ok(RequestLine::parse(text))
}

/// 메서드 검사, 차단목록 검사, URI 분해 순으로 진행
fn prepare(
    request: &RequestLine,
    state: &AppState,
) -> Result<(Method, ParsedTarget), TransactionError> {
    let method = Method::parse(&request.method)
        .ok_or_else(|| TransactionError::UnsupportedMethod(request.method.clone()))?;

    let target = uri::decompose(&request.uri);
    let host = target.as_ref().ok().map(|t| t.hostname.as_str());
    if state.blocklist.is_blocked(&request.uri, host) {
        debug!("{:?} 정책으로 차단: {}", state.blocklist.policy(), request.uri);
        return Err(TransactionError::Blocked(request.uri.clone()));
    }

    Ok((method, target?))
}

/// 오리진 응답을 줄 단위로 클라이언트에 그대로 전달하고 전달한 바이트 수를 반환.
///
/// 오리진이 연결을 닫거나 어느 쪽이든 입출력 에러가 나면 스트림 끝으로 봅니다.
async fn relay_response<O, C>(origin: &mut O, client: &mut C, max_line_bytes: usize) -> u64
where
    O: AsyncRead + Unpin,
    C: AsyncWrite + Unpin,
{
    let mut reader = BufReader::new(origin);
    let mut chunk = Vec::with_capacity(max_line_bytes.min(8192));
    let mut total = 0u64;

    loop {
        chunk.clear();
        let n = match read_line_bounded(&mut reader, &mut chunk, max_line_bytes).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                debug!("오리진 읽기 에러, 중계 종료: {e}");
                break;
            }
        };
        if let Err(e) = client.write_all(&chunk).await {
            debug!("클라이언트 쓰기 에러, 중계 종료: {e}");
            break;
        }
        total += n as u64;
    }

    if let Err(e) = client.flush().await {
        debug!("클라이언트 flush 에러: {e}");
    }
    total
}

/// 개행까지 최대 `limit` 바이트를 읽음
async fn read_line_bounded<R>(reader: &mut R, buf: &mut Vec<u8>, limit: usize) -> io::Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    (&mut *reader).take(limit.max(1) as u64).read_until(b'\n', buf).await
}

/// 빈 줄까지 클라이언트 헤더를 읽어서 버림
async fn drain_headers<R>(reader: &mut R, max_line_bytes: usize, budget: usize) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = Vec::new();
    let mut consumed = 0usize;

    while consumed < budget {
        line.clear();
        let n = read_line_bounded(reader, &mut line, max_line_bytes).await?;
        if n == 0 || line == b"\r\n" || line == b"\n" {
            break;
        }
        consumed += n;
    }
    Ok(())
}
