use std::path::Path;

use log::info;

use fwd_proxy_error::{ProxyError, Result};

use crate::config::Config;

/// 통합 세팅 인스턴스
#[derive(Debug, Clone)]
pub struct Settings {
    pub proxy: Config,
}

impl Settings {
    /// Setting 생성, 명령행에서 받은 포트가 설정파일보다 우선
    pub fn new<P: AsRef<Path>>(config_path: P, listen_port: u16) -> Result<Self> {
        let mut proxy = Self::load_proxy_config(config_path.as_ref())?;
        proxy.bind_port = listen_port;

        Ok(Self { proxy })
    }

    /// 프록시 설정 로드
    fn load_proxy_config(path: &Path) -> Result<Config> {
        // yml 파일 유무 확인
        if path.exists() {
            info!("프록시 설정파일 로드: {}", path.display());
            match Config::from_file(path) {
                Ok(config) => Ok(config),
                Err(e) => Err(ProxyError::Config(format!(
                    "프록시 설정파일 로드 실패: {}",
                    e
                ))),
            }
        } else {
            // 기본설정사용
            info!("프록시 기본설정 사용");
            Ok(Config::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::new(dir.path().join("nope.yml"), 15213).unwrap();
        assert_eq!(settings.proxy.bind_port, 15213);
        assert_eq!(settings.proxy.log_path, "proxy.log");
    }

    #[test]
    fn cli_port_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "bind_port: 9999\nlog_path: audit.log").unwrap();

        let settings = Settings::new(file.path(), 3128).unwrap();
        assert_eq!(settings.proxy.bind_port, 3128);
        assert_eq!(settings.proxy.log_path, "audit.log");
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "concurrent: [not, a, bool]").unwrap();

        let err = Settings::new(file.path(), 3128).unwrap_err();
        assert!(matches!(err, ProxyError::Config(_)));
    }
}
