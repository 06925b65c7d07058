//! 域名安全扫描：用DNS/WHOIS/信誉工具驱动的Agent生成markdown报告

use std::fmt;
use std::str::FromStr;

use crate::error::{AgentError, Result};
use crate::llm::{ModelGateway, Toolset};
use crate::llm::tools::time::today;

const SCANNER_SYSTEM_PROMPT: &str = r#"You are a domain security analyst. You assess domains and URLs for phishing, malware hosting, spoofing and infrastructure risk.

Work through these steps, calling the domain_intel and web_search tools for evidence:
1. Domain assessment: validate the domain, find the registrar and age via WHOIS, look for suspicious naming patterns.
2. DNS analysis: query A, AAAA, MX, TXT, CNAME and NS records; note anomalies, missing SPF/DMARC and CDN usage.
3. Reputation: check Google Safe Browsing and search the web for reports that mention the domain.
4. Similar domains: look for registered typosquatting variants.
5. Infrastructure: geolocate the resolved IP addresses and identify the hosting provider.
6. Risk scoring: give an overall risk score from 1 to 10 with the threat categories and your confidence.

Only report facts you obtained from a tool; mark anything you could not verify as unknown.

Answer in markdown with these sections:
# Domain Security Report
## Executive Summary (domain, risk score, primary threats, scan date, confidence)
## Critical Findings
## Domain Information
## DNS Analysis
## Reputation
## Similar Domains
## Infrastructure
## Recommendations"#;

/// 扫描深度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanMode {
    #[default]
    Quick,
    Deep,
}

impl ScanMode {
    /// 发给Agent的请求文本
    pub fn query(&self, domain: &str) -> String {
        match self {
            ScanMode::Quick => format!(
                "Perform a quick security analysis of {} with basic threat assessment and risk scoring.",
                domain
            ),
            ScanMode::Deep => format!(
                "Perform comprehensive deep security analysis of {} including DNS security, SSL analysis, reputation check, similar domains, infrastructure assessment, and detailed threat intelligence with actionable recommendations.",
                domain
            ),
        }
    }
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanMode::Quick => write!(f, "quick"),
            ScanMode::Deep => write!(f, "deep"),
        }
    }
}

impl FromStr for ScanMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "quick" => Ok(ScanMode::Quick),
            "deep" => Ok(ScanMode::Deep),
            _ => Err(format!("Unknown scan mode: {}", s)),
        }
    }
}

/// 把用户输入的域名或URL规整为裸域名
///
/// 去掉协议、路径、端口、`www.` 前缀与结尾的点，转为小写，并校验标签格式。
pub fn normalize_domain(input: &str) -> Result<String> {
    let trimmed = input.trim();
    let without_scheme = trimmed
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(trimmed);
    let host = without_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();
    // user:pass@host
    let host = host.rsplit('@').next().unwrap_or(host);
    let host = host.split(':').next().unwrap_or(host);
    let host = host.trim_end_matches('.').to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host).to_string();

    let invalid = || AgentError::InvalidInput(format!("'{}' is not a valid domain", input.trim()));

    if host.is_empty() || host.len() > 253 || !host.contains('.') {
        return Err(invalid());
    }
    let labels_ok = host.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-')
    });
    if !labels_ok {
        return Err(invalid());
    }
    Ok(host)
}

/// 域名扫描Agent
pub struct DomainScanner<G: ModelGateway> {
    gateway: G,
}

impl<G: ModelGateway> DomainScanner<G> {
    pub fn new(gateway: G) -> Self {
        Self { gateway }
    }

    /// 规整输入后执行扫描，返回markdown报告
    pub async fn scan(&self, input: &str, mode: ScanMode) -> Result<String> {
        let domain = normalize_domain(input)?;
        println!("🛡️ 正在扫描 {} ({} 模式)...", domain, mode);
        tracing::info!(domain = %domain, mode = %mode, "domain scan started");

        let user_prompt = format!("Scan date: {}\n\n{}", today(), mode.query(&domain));
        let report = self
            .gateway
            .prompt_with_tools(SCANNER_SYSTEM_PROMPT, &user_prompt, Toolset::DomainScan)
            .await?;

        if report.trim().is_empty() {
            return Err(AgentError::EmptyOutput {
                stage: "domain_scan",
                field: "report",
            });
        }
        println!("✓ {} 扫描完成", domain);
        Ok(report)
    }
}
