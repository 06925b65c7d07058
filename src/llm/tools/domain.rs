//! 域名信誉工具 - 将 DomainToolkit 暴露给Agent

use rig::tool::Tool;
use serde::Deserialize;
use serde_json::Value;

use crate::dns::DomainToolkit;

#[derive(Clone)]
pub struct AgentToolDomain {
    toolkit: DomainToolkit,
}

#[derive(Debug, Deserialize)]
pub struct DomainArgs {
    pub action: String,
    pub domain: Option<String>,
    pub ip: Option<String>,
    pub record_type: Option<String>,
}

#[derive(Debug, thiserror::Error)]
#[error("domain tool error: {0}")]
pub struct DomainToolError(String);

pub const DOMAIN_ACTIONS: [&str; 10] = [
    "whois",
    "get_dns_records",
    "get_mx_records",
    "get_all_domain_ips",
    "reverse_dns_lookup",
    "get_domain_geolocation",
    "detect_cdn_by_cname",
    "check_safe_browsing",
    "find_typosquatted_domains",
    "quick_scan",
];

impl AgentToolDomain {
    pub fn new(toolkit: DomainToolkit) -> Self {
        Self { toolkit }
    }

    fn require<'a>(value: &'a Option<String>, name: &str, action: &str) -> Result<&'a str, DomainToolError> {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| DomainToolError(format!("`{}` is required for {}", name, action)))
    }

    pub async fn dispatch(&self, args: &DomainArgs) -> Result<Value, DomainToolError> {
        let action = args.action.as_str();
        let toolkit = &self.toolkit;
        let result = match action {
            "whois" => toolkit.whois(Self::require(&args.domain, "domain", action)?).await,
            "get_dns_records" => {
                let domain = Self::require(&args.domain, "domain", action)?;
                let record_type = Self::require(&args.record_type, "record_type", action)?;
                toolkit.get_dns_records(domain, record_type).await
            }
            "get_mx_records" => {
                toolkit
                    .get_mx_records(Self::require(&args.domain, "domain", action)?)
                    .await
            }
            "get_all_domain_ips" => {
                toolkit
                    .get_all_domain_ips(Self::require(&args.domain, "domain", action)?)
                    .await
            }
            "reverse_dns_lookup" => {
                toolkit
                    .reverse_dns_lookup(Self::require(&args.ip, "ip", action)?)
                    .await
            }
            "get_domain_geolocation" => {
                toolkit
                    .get_domain_geolocation(Self::require(&args.ip, "ip", action)?)
                    .await
            }
            "detect_cdn_by_cname" => {
                toolkit
                    .detect_cdn_by_cname(Self::require(&args.domain, "domain", action)?)
                    .await
            }
            "check_safe_browsing" => {
                toolkit
                    .check_safe_browsing(Self::require(&args.domain, "domain", action)?)
                    .await
            }
            "find_typosquatted_domains" => {
                toolkit
                    .find_typosquatted_domains(Self::require(&args.domain, "domain", action)?)
                    .await
            }
            "quick_scan" => Value::String(
                toolkit
                    .quick_scan(Self::require(&args.domain, "domain", action)?)
                    .await
                    .to_string(),
            ),
            other => return Err(DomainToolError(format!("unknown action `{}`", other))),
        };
        Ok(result)
    }
}

impl Tool for AgentToolDomain {
    const NAME: &'static str = "domain_intel";

    type Error = DomainToolError;
    type Args = DomainArgs;
    type Output = Value;

    async fn definition(&self, _prompt: String) -> rig::completion::ToolDefinition {
        rig::completion::ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Investigate a domain or IP address: WHOIS registration data, DNS records, MX records, A/AAAA addresses, reverse DNS, IP geolocation, CDN detection via CNAME, Google Safe Browsing reputation, registered typosquatting variants, and a deterministic DNS quick scan.".to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "action": {
                        "type": "string",
                        "enum": DOMAIN_ACTIONS,
                        "description": "operation to perform"
                    },
                    "domain": {
                        "type": "string",
                        "description": "domain name, e.g. example.com (all actions except reverse_dns_lookup and get_domain_geolocation)"
                    },
                    "ip": {
                        "type": "string",
                        "description": "IP address (reverse_dns_lookup, get_domain_geolocation)"
                    },
                    "record_type": {
                        "type": "string",
                        "description": "DNS record type for get_dns_records: A, AAAA, MX, NS, TXT, CNAME, SOA, PTR, CAA, SRV"
                    }
                },
                "required": ["action"]
            }),
        }
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        println!("   🔧 tool called...domain_intel@{:?}", args);
        self.dispatch(&args).await
    }
}
