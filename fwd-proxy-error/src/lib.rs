use std::error::Error as StdError;
use std::fmt;
use std::io;

use hyper::StatusCode;
use serde_yml::Error as YmlError;

/// 포워딩 프록시의 프로세스 레벨 에러 타입을 정의합니다.
#[derive(Debug)]
pub enum ProxyError {
    /// 설정 관련 에러
    Config(String),

    /// 네트워크 입출력 에러
    Io(io::Error),

    /// 감사 로그 관련 에러
    Logging(String),

    /// 내부 상태 관련 에러
    Internal(String),
}

impl fmt::Display for ProxyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProxyError::Config(msg) => write!(f, "설정 에러: {}", msg),
            ProxyError::Io(err) => write!(f, "I/O 에러: {}", err),
            ProxyError::Logging(msg) => write!(f, "로깅 에러: {}", msg),
            ProxyError::Internal(msg) => write!(f, "내부 에러: {}", msg),
        }
    }
}

impl StdError for ProxyError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ProxyError::Io(err) => Some(err),
            _ => None,
        }
    }
}

/// Result 타입 별칭 정의
pub type Result<T> = std::result::Result<T, ProxyError>;

/// From 트레이트 구현으로 다양한 에러 타입을 ProxyError로 변환
impl From<io::Error> for ProxyError {
    fn from(err: io::Error) -> Self {
        ProxyError::Io(err)
    }
}

impl From<YmlError> for ProxyError {
    fn from(err: YmlError) -> Self {
        ProxyError::Config(format!("YAML 파싱 에러: {}", err))
    }
}

/// 에러 처리 유틸리티 함수
pub fn log_err<E: fmt::Display>(err: E) -> ProxyError {
    ProxyError::Logging(format!("{}", err))
}

pub fn internal_err<E: fmt::Display>(err: E) -> ProxyError {
    ProxyError::Internal(format!("{}", err))
}

/// 트랜잭션 하나에 국한되는 에러.
///
/// 클라이언트에게는 에러 페이지로 전달되고 해당 트랜잭션만 종료됩니다.
/// 각 variant 가 들고 있는 문자열은 에러 페이지에 표시되는 원인(cause) 입니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    /// GET/HEAD 이외의 메서드 (501)
    UnsupportedMethod(String),

    /// 차단목록에 걸린 요청 (403)
    Blocked(String),

    /// 분해할 수 없는 요청 URI (400)
    InvalidUri(String),

    /// 오리진 서버 연결 실패 (404)
    OriginUnreachable(String),
}

impl TransactionError {
    /// 클라이언트에 돌려줄 상태코드
    pub fn status(&self) -> StatusCode {
        match self {
            TransactionError::UnsupportedMethod(_) => StatusCode::NOT_IMPLEMENTED,
            TransactionError::Blocked(_) => StatusCode::FORBIDDEN,
            TransactionError::InvalidUri(_) => StatusCode::BAD_REQUEST,
            TransactionError::OriginUnreachable(_) => StatusCode::NOT_FOUND,
        }
    }

    /// 에러 페이지의 원인 문자열
    pub fn cause(&self) -> &str {
        match self {
            TransactionError::UnsupportedMethod(cause)
            | TransactionError::Blocked(cause)
            | TransactionError::InvalidUri(cause)
            | TransactionError::OriginUnreachable(cause) => cause,
        }
    }

    /// 에러 페이지의 상세 설명
    pub fn explanation(&self) -> &'static str {
        match self {
            TransactionError::UnsupportedMethod(_) => "This method is not implemented by the proxy",
            TransactionError::Blocked(_) => "This site is blocked by the proxy.",
            TransactionError::InvalidUri(_) => "Proxy cannot parse the request",
            TransactionError::OriginUnreachable(_) => "Cannot connect to the host",
        }
    }
}

impl fmt::Display for TransactionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionError::UnsupportedMethod(method) => {
                write!(f, "지원하지 않는 메서드: {}", method)
            }
            TransactionError::Blocked(target) => write!(f, "차단된 요청: {}", target),
            TransactionError::InvalidUri(uri) => write!(f, "잘못된 URI: {}", uri),
            TransactionError::OriginUnreachable(host) => {
                write!(f, "오리진 서버 연결 실패: {}", host)
            }
        }
    }
}

impl StdError for TransactionError {}
