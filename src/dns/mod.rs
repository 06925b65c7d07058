//! 域名信誉工具集 - DNS、WHOIS、地理位置、Safe Browsing 与仿冒域名探测
//!
//! `DomainToolkit` 的所有操作都返回JSON值（列表、对象或说明文字），
//! 查询失败被渲染成文字，不会越过这一边界。

use async_trait::async_trait;
use serde_json::{Value, json};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::DnsConfig;

mod reputation;
mod resolver;
mod scan;
mod typosquat;
mod whois;

pub use resolver::HickoryLookup;
pub use scan::{QuickScanReport, RecordFacts, Verdict};
pub use typosquat::generate_variants;
pub use whois::{WhoisClient, parse_refer};

/// 支持查询的记录类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordKind {
    A,
    Aaaa,
    Mx,
    Ns,
    Txt,
    Cname,
    Soa,
    Ptr,
    Caa,
    Srv,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordKind::A => "A",
            RecordKind::Aaaa => "AAAA",
            RecordKind::Mx => "MX",
            RecordKind::Ns => "NS",
            RecordKind::Txt => "TXT",
            RecordKind::Cname => "CNAME",
            RecordKind::Soa => "SOA",
            RecordKind::Ptr => "PTR",
            RecordKind::Caa => "CAA",
            RecordKind::Srv => "SRV",
        };
        f.write_str(name)
    }
}

impl FromStr for RecordKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(RecordKind::A),
            "AAAA" => Ok(RecordKind::Aaaa),
            "MX" => Ok(RecordKind::Mx),
            "NS" => Ok(RecordKind::Ns),
            "TXT" => Ok(RecordKind::Txt),
            "CNAME" => Ok(RecordKind::Cname),
            "SOA" => Ok(RecordKind::Soa),
            "PTR" => Ok(RecordKind::Ptr),
            "CAA" => Ok(RecordKind::Caa),
            "SRV" => Ok(RecordKind::Srv),
            other => Err(format!("unsupported record type `{}`", other)),
        }
    }
}

/// 一条解析结果
#[derive(Debug, Clone, PartialEq)]
pub enum DnsRecord {
    Address(IpAddr),
    Mx { preference: u16, exchange: String },
    /// CNAME / NS / PTR 的目标主机名
    Name(String),
    Text(String),
}

impl DnsRecord {
    pub fn to_text(&self) -> String {
        match self {
            DnsRecord::Address(ip) => ip.to_string(),
            DnsRecord::Mx {
                preference,
                exchange,
            } => format!("{} {}", preference, exchange),
            DnsRecord::Name(name) => name.clone(),
            DnsRecord::Text(text) => text.clone(),
        }
    }
}

/// 查询失败的类别
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LookupFailure {
    #[error("the DNS response does not contain an answer to the question")]
    NoAnswer,
    #[error("the DNS query name does not exist")]
    NxDomain,
    #[error("all nameservers failed to answer the query")]
    NoNameservers,
    #[error("the DNS operation timed out")]
    Timeout,
    #[error("{0}")]
    Other(String),
}

/// 解析器接缝，测试中以内存实现替换
#[async_trait]
pub trait DnsLookup: Send + Sync {
    async fn lookup(
        &self,
        domain: &str,
        kind: RecordKind,
    ) -> Result<Vec<DnsRecord>, LookupFailure>;

    async fn reverse(&self, ip: IpAddr) -> Result<Vec<String>, LookupFailure>;
}

/// CNAME目标中可识别的CDN特征
const CDN_SIGNATURES: [(&str, &str); 9] = [
    ("cloudflare", "cdn.cloudflare.net"),
    ("akamai", "akamaiedge.net"),
    ("cloudfront", "cloudfront.net"),
    ("fastly", "fastly.net"),
    ("google", "googleusercontent.com"),
    ("azure", "azureedge.net"),
    ("stackpath", "stackpathdns.com"),
    ("limelight", "llnwd.net"),
    ("bunnycdn", "b-cdn.net"),
];

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// 在CNAME目标列表中查找已知CDN
pub fn match_cdn(targets: &[String]) -> Option<(String, &'static str)> {
    targets.iter().find_map(|target| {
        let target = target.to_lowercase();
        CDN_SIGNATURES
            .iter()
            .find(|(_, signature)| target.contains(signature))
            .map(|(cdn, signature)| (capitalize(cdn), *signature))
    })
}

/// 域名信誉工具集
#[derive(Clone)]
pub struct DomainToolkit {
    resolver: Arc<dyn DnsLookup>,
    whois: WhoisClient,
    http: reqwest::Client,
    config: DnsConfig,
}

impl DomainToolkit {
    /// 使用系统默认解析配置
    pub fn new(config: &DnsConfig) -> Self {
        let resolver = HickoryLookup::new(Duration::from_secs(config.timeout_seconds));
        Self::with_resolver(Arc::new(resolver), config)
    }

    pub fn with_resolver(resolver: Arc<dyn DnsLookup>, config: &DnsConfig) -> Self {
        let timeout = Duration::from_secs(config.timeout_seconds);
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            resolver,
            whois: WhoisClient::new(&config.whois_server, timeout),
            http,
            config: config.clone(),
        }
    }

    pub fn resolver(&self) -> &Arc<dyn DnsLookup> {
        &self.resolver
    }

    /// WHOIS查询，返回注册局的原始响应
    pub async fn whois(&self, domain: &str) -> Value {
        println!("   🔎 WHOIS lookup for {}", domain);
        match self.whois.lookup(domain).await {
            Ok(raw) => Value::String(raw),
            Err(e) => Value::String(format!("Error: {}", e)),
        }
    }

    pub async fn get_dns_records(&self, domain: &str, record_type: &str) -> Value {
        let kind = match RecordKind::from_str(record_type) {
            Ok(kind) => kind,
            Err(e) => return json!(format!("Error retrieving {} records: {}", record_type, e)),
        };
        match self.resolver.lookup(domain, kind).await {
            Ok(records) if records.is_empty() => {
                json!(format!("No {} records found for {}.", record_type, domain))
            }
            Ok(records) => json!(records.iter().map(DnsRecord::to_text).collect::<Vec<_>>()),
            Err(LookupFailure::NoAnswer) => {
                json!(format!("No {} records found for {}.", record_type, domain))
            }
            Err(LookupFailure::NxDomain) => json!(format!("Domain {} does not exist.", domain)),
            Err(LookupFailure::NoNameservers) => {
                json!(format!("No nameservers found for {}.", domain))
            }
            Err(e) => json!(format!("Error retrieving {} records: {}", record_type, e)),
        }
    }

    /// MX记录，优先级数值越小越优先
    pub async fn get_mx_records(&self, domain: &str) -> Value {
        match self.resolver.lookup(domain, RecordKind::Mx).await {
            Ok(records) => {
                let mx: Vec<Value> = records
                    .iter()
                    .filter_map(|record| match record {
                        DnsRecord::Mx {
                            preference,
                            exchange,
                        } => Some(json!({ "priority": preference, "mail_server": exchange })),
                        _ => None,
                    })
                    .collect();
                if mx.is_empty() {
                    json!(format!("No MX records found for domain: {}", domain))
                } else {
                    Value::Array(mx)
                }
            }
            Err(LookupFailure::NoAnswer) => {
                json!(format!("No MX records found for domain: {}", domain))
            }
            Err(LookupFailure::NxDomain) => json!(format!("Domain does not exist: {}", domain)),
            Err(LookupFailure::Timeout) => {
                json!(format!("DNS query timed out for domain: {}", domain))
            }
            Err(e) => json!(format!("An error occurred: {}", e)),
        }
    }

    async fn address_list(&self, domain: &str, kind: RecordKind) -> Vec<String> {
        match self.resolver.lookup(domain, kind).await {
            Ok(records) if !records.is_empty() => records.iter().map(DnsRecord::to_text).collect(),
            Ok(_) | Err(LookupFailure::NoAnswer) => vec![format!("No {} record found.", kind)],
            Err(e) => vec![format!("Error: {}", e)],
        }
    }

    pub async fn get_all_domain_ips(&self, domain: &str) -> Value {
        let a = self.address_list(domain, RecordKind::A).await;
        let aaaa = self.address_list(domain, RecordKind::Aaaa).await;
        json!({ "A": a, "AAAA": aaaa })
    }

    pub async fn reverse_dns_lookup(&self, ip: &str) -> Value {
        let addr = match IpAddr::from_str(ip.trim()) {
            Ok(addr) => addr,
            Err(_) => return json!(format!("Error: invalid IP address: {}", ip)),
        };
        match self.resolver.reverse(addr).await {
            Ok(hosts) => match hosts.first() {
                Some(host) => json!(format!("Reverse DNS: {}", host.trim_end_matches('.'))),
                None => json!("No PTR record found or IP not mapped to any hostname."),
            },
            Err(_) => json!("No PTR record found or IP not mapped to any hostname."),
        }
    }

    pub async fn detect_cdn_by_cname(&self, domain: &str) -> Value {
        match self.resolver.lookup(domain, RecordKind::Cname).await {
            Ok(records) if records.is_empty() => json!("No CNAME record (likely A record used)."),
            Ok(records) => {
                let targets: Vec<String> = records.iter().map(DnsRecord::to_text).collect();
                match match_cdn(&targets) {
                    Some((cdn, signature)) => {
                        json!(format!("CDN Detected: {} ({})", cdn, signature))
                    }
                    None => json!("No known CDN detected via CNAME."),
                }
            }
            Err(LookupFailure::NoAnswer) => json!("No CNAME record (likely A record used)."),
            Err(e) => json!(format!("Error: {}", e)),
        }
    }

    /// 生成仿冒变体并返回已注册（有A或NS记录）的域名
    pub async fn find_typosquatted_domains(&self, domain: &str) -> Value {
        let variants = generate_variants(domain);
        tracing::debug!(domain, variants = variants.len(), "checking typosquat variants");

        let mut registered = Vec::new();
        for chunk in variants.chunks(16) {
            let mut tasks = tokio::task::JoinSet::new();
            for variant in chunk {
                let resolver = Arc::clone(&self.resolver);
                let variant = variant.clone();
                tasks.spawn(async move {
                    let has_a = matches!(
                        resolver.lookup(&variant, RecordKind::A).await,
                        Ok(ref r) if !r.is_empty()
                    );
                    let active = has_a
                        || matches!(
                            resolver.lookup(&variant, RecordKind::Ns).await,
                            Ok(ref r) if !r.is_empty()
                        );
                    (variant, active)
                });
            }
            while let Some(joined) = tasks.join_next().await {
                if let Ok((variant, true)) = joined {
                    registered.push(variant);
                }
            }
        }
        registered.sort();
        json!(registered)
    }
}
