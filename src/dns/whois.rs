use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::error::{AgentError, Result};

const WHOIS_PORT: u16 = 43;

/// 从IANA响应中取出 `refer:` 指向的注册局WHOIS服务器
pub fn parse_refer(response: &str) -> Option<String> {
    response.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        let key = key.trim();
        if key.eq_ignore_ascii_case("refer") || key.eq_ignore_ascii_case("whois") {
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_string())
        } else {
            None
        }
    })
}

/// WHOIS客户端（TCP/43）
#[derive(Debug, Clone)]
pub struct WhoisClient {
    root_server: String,
    timeout: Duration,
}

impl WhoisClient {
    pub fn new(root_server: &str, timeout: Duration) -> Self {
        Self {
            root_server: root_server.to_string(),
            timeout,
        }
    }

    async fn query(&self, server: &str, query: &str) -> Result<String> {
        let exchange = async {
            let mut stream = TcpStream::connect((server, WHOIS_PORT)).await?;
            stream.write_all(format!("{}\r\n", query).as_bytes()).await?;
            let mut buf = Vec::new();
            stream.read_to_end(&mut buf).await?;
            Ok::<_, std::io::Error>(String::from_utf8_lossy(&buf).to_string())
        };

        tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| AgentError::Whois(format!("{} did not answer in time", server)))?
            .map_err(|e| AgentError::Whois(format!("{}: {}", server, e)))
    }

    /// 先查询根服务器，再跟随引用到注册局服务器
    pub async fn lookup(&self, domain: &str) -> Result<String> {
        let domain = domain.trim().trim_end_matches('.');
        if domain.is_empty() {
            return Err(AgentError::InvalidInput("domain must not be empty".into()));
        }

        let root_response = self.query(&self.root_server, domain).await?;
        match parse_refer(&root_response) {
            Some(registry) if !registry.eq_ignore_ascii_case(&self.root_server) => {
                tracing::debug!(domain, registry = %registry, "following WHOIS referral");
                self.query(&registry, domain).await
            }
            _ => Ok(root_response),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_refer_finds_registry() {
        let response = "% IANA WHOIS server\n\nrefer:        whois.verisign-grs.com\n\ndomain:       COM\n";
        assert_eq!(parse_refer(response).as_deref(), Some("whois.verisign-grs.com"));
    }

    #[test]
    fn test_parse_refer_accepts_whois_key() {
        let response = "domain: ORG\nwhois: whois.publicinterestregistry.org\n";
        assert_eq!(
            parse_refer(response).as_deref(),
            Some("whois.publicinterestregistry.org")
        );
    }

    #[test]
    fn test_parse_refer_absent() {
        assert_eq!(parse_refer("% no referral here\nstatus: ACTIVE\n"), None);
        assert_eq!(parse_refer("refer:   \n"), None);
    }

    #[tokio::test]
    async fn test_empty_domain_is_rejected() {
        let client = WhoisClient::new("whois.iana.org", Duration::from_secs(1));
        assert!(matches!(
            client.lookup("  ").await,
            Err(AgentError::InvalidInput(_))
        ));
    }
}
