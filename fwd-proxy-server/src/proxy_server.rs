use std::net::SocketAddr;

use log::{debug, error, info};
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{Duration, sleep};

use fwd_proxy_error::Result;

use crate::relay::relay_transaction;
use crate::state::AppState;

// accept 실패 후 재시도까지 대기 시간 (fd 고갈 등)
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// 프록시 서버 구조체
pub struct ProxyServer {
    /// 트랜잭션 간 공유 상태
    state: AppState,
}

impl ProxyServer {
    /// 새로운 프록시 서버 인스턴스를 생성
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// 설정된 주소로 리스너 바인딩
    pub async fn bind(&self) -> Result<TcpListener> {
        let addr = self.state.config.bind_addr();
        let listener = TcpListener::bind(&addr).await?;
        info!("프록시 서버 시작: {addr}");
        Ok(listener)
    }

    /// 서버실행
    pub async fn run(&self) -> Result<()> {
        let listener = self.bind().await?;
        self.serve(listener).await
    }

    /// 이미 바인딩된 리스너로 accept 루프 실행, 정상 동작 중에는 반환하지 않음
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        let concurrent = self.state.config.concurrent;
        if !concurrent {
            info!("단일 처리 모드로 동작");
        }

        loop {
            let (stream, client_addr) = match listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    error!("accept 실패: {e}");
                    sleep(ACCEPT_BACKOFF).await;
                    continue;
                }
            };
            debug!("커넥션 수락: {client_addr}");

            if concurrent {
                let state = self.state.clone();
                tokio::spawn(async move {
                    handle_connection(stream, client_addr, state).await;
                });
            } else {
                handle_connection(stream, client_addr, self.state.clone()).await;
            }
        }
    }
}

/// 연결 하나를 처리하고 닫음
async fn handle_connection(mut stream: TcpStream, client_addr: SocketAddr, state: AppState) {
    if let Err(err) = relay_transaction(&mut stream, client_addr, &state).await {
        error!("커넥션 에러 {client_addr}: {err}");
    }

    if let Err(err) = stream.shutdown().await {
        debug!("커넥션 shutdown 실패 {client_addr}: {err}");
    }
    debug!("커넥션 종료: {client_addr}");
}
