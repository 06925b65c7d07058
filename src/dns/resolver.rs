use async_trait::async_trait;
use hickory_resolver::TokioAsyncResolver;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::error::{ResolveError, ResolveErrorKind};
use hickory_resolver::proto::op::ResponseCode;
use hickory_resolver::proto::rr::{RData, Record, RecordType};
use hickory_resolver::system_conf::read_system_conf;
use std::net::IpAddr;
use std::time::Duration;

use super::{DnsLookup, DnsRecord, LookupFailure, RecordKind};

impl From<RecordKind> for RecordType {
    fn from(kind: RecordKind) -> Self {
        match kind {
            RecordKind::A => RecordType::A,
            RecordKind::Aaaa => RecordType::AAAA,
            RecordKind::Mx => RecordType::MX,
            RecordKind::Ns => RecordType::NS,
            RecordKind::Txt => RecordType::TXT,
            RecordKind::Cname => RecordType::CNAME,
            RecordKind::Soa => RecordType::SOA,
            RecordKind::Ptr => RecordType::PTR,
            RecordKind::Caa => RecordType::CAA,
            RecordKind::Srv => RecordType::SRV,
        }
    }
}

fn classify(err: ResolveError) -> LookupFailure {
    match err.kind() {
        ResolveErrorKind::NoRecordsFound { response_code, .. } => match *response_code {
            ResponseCode::NXDomain => LookupFailure::NxDomain,
            ResponseCode::ServFail | ResponseCode::Refused => LookupFailure::NoNameservers,
            _ => LookupFailure::NoAnswer,
        },
        ResolveErrorKind::NoConnections => LookupFailure::NoNameservers,
        ResolveErrorKind::Timeout => LookupFailure::Timeout,
        _ => LookupFailure::Other(err.to_string()),
    }
}

fn convert(rdata: &RData) -> DnsRecord {
    match rdata {
        RData::A(a) => DnsRecord::Address(IpAddr::V4(a.0)),
        RData::AAAA(aaaa) => DnsRecord::Address(IpAddr::V6(aaaa.0)),
        RData::MX(mx) => DnsRecord::Mx {
            preference: mx.preference(),
            exchange: mx.exchange().to_string(),
        },
        RData::CNAME(name) => DnsRecord::Name(name.0.to_string()),
        RData::NS(name) => DnsRecord::Name(name.0.to_string()),
        RData::PTR(name) => DnsRecord::Name(name.0.to_string()),
        other => DnsRecord::Text(other.to_string()),
    }
}

/// 只保留与查询类型一致的记录，解析器会把CNAME链上的中间记录一并返回
fn answers_of_kind<'a>(
    records: impl IntoIterator<Item = &'a Record>,
    kind: RecordKind,
) -> Vec<DnsRecord> {
    let wanted = RecordType::from(kind);
    records
        .into_iter()
        .filter(|record| record.record_type() == wanted)
        .filter_map(|record| record.data())
        .map(convert)
        .collect()
}

/// 优先使用系统解析配置（/etc/resolv.conf），读取失败时退回内置的公共DNS
fn resolver_setup<E: std::fmt::Display>(
    system: Result<(ResolverConfig, ResolverOpts), E>,
    timeout: Duration,
) -> (ResolverConfig, ResolverOpts) {
    let (config, mut opts) = system.unwrap_or_else(|e| {
        tracing::warn!("system resolver configuration unavailable, using defaults: {}", e);
        (ResolverConfig::default(), ResolverOpts::default())
    });
    opts.timeout = timeout;
    (config, opts)
}

/// 基于 hickory-resolver 的系统解析器
pub struct HickoryLookup {
    resolver: TokioAsyncResolver,
}

impl HickoryLookup {
    pub fn new(timeout: Duration) -> Self {
        let (config, opts) = resolver_setup(read_system_conf(), timeout);
        Self {
            resolver: TokioAsyncResolver::tokio(config, opts),
        }
    }
}

#[async_trait]
impl DnsLookup for HickoryLookup {
    async fn lookup(
        &self,
        domain: &str,
        kind: RecordKind,
    ) -> Result<Vec<DnsRecord>, LookupFailure> {
        let answer = self
            .resolver
            .lookup(domain, RecordType::from(kind))
            .await
            .map_err(classify)?;
        Ok(answers_of_kind(answer.record_iter(), kind))
    }

    async fn reverse(&self, ip: IpAddr) -> Result<Vec<String>, LookupFailure> {
        let answer = self.resolver.reverse_lookup(ip).await.map_err(classify)?;
        Ok(answer.iter().map(|ptr| ptr.0.to_string()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hickory_resolver::config::NameServerConfigGroup;
    use hickory_resolver::proto::rr::Name;
    use hickory_resolver::proto::rr::rdata::{A, CNAME, MX};

    fn name(text: &str) -> Name {
        Name::from_ascii(text).unwrap()
    }

    /// www.github.com 的A查询应答：CNAME中间记录加目标的A记录
    fn cname_chain() -> Vec<Record> {
        vec![
            Record::from_rdata(
                name("www.github.com."),
                3600,
                RData::CNAME(CNAME(name("github.com."))),
            ),
            Record::from_rdata(name("github.com."), 60, RData::A(A::new(140, 82, 112, 3))),
        ]
    }

    #[test]
    fn test_cname_intermediates_are_dropped_from_address_answers() {
        let records = cname_chain();
        assert_eq!(
            answers_of_kind(&records, RecordKind::A),
            vec![DnsRecord::Address("140.82.112.3".parse().unwrap())]
        );
        assert!(answers_of_kind(&records, RecordKind::Aaaa).is_empty());
    }

    #[test]
    fn test_cname_query_keeps_cname_records() {
        let records = cname_chain();
        assert_eq!(
            answers_of_kind(&records, RecordKind::Cname),
            vec![DnsRecord::Name("github.com.".into())]
        );
    }

    #[test]
    fn test_mx_answers_are_converted() {
        let records = vec![
            Record::from_rdata(
                name("mail.example.com."),
                300,
                RData::CNAME(CNAME(name("example.com."))),
            ),
            Record::from_rdata(
                name("example.com."),
                300,
                RData::MX(MX::new(10, name("mx1.example.com."))),
            ),
        ];
        assert_eq!(
            answers_of_kind(&records, RecordKind::Mx),
            vec![DnsRecord::Mx {
                preference: 10,
                exchange: "mx1.example.com.".into()
            }]
        );
    }

    #[test]
    fn test_system_configuration_is_preferred() {
        let system = ResolverConfig::from_parts(None, vec![], NameServerConfigGroup::cloudflare());
        let expected = system.name_servers().len();

        let (config, opts) = resolver_setup::<String>(
            Ok((system, ResolverOpts::default())),
            Duration::from_secs(3),
        );

        assert_eq!(config.name_servers().len(), expected);
        assert_eq!(
            config.name_servers()[0].socket_addr,
            NameServerConfigGroup::cloudflare()[0].socket_addr
        );
        assert_eq!(opts.timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_unreadable_system_configuration_falls_back_to_defaults() {
        let (config, opts) =
            resolver_setup(Err("no /etc/resolv.conf"), Duration::from_secs(7));

        assert_eq!(
            config.name_servers().len(),
            ResolverConfig::default().name_servers().len()
        );
        assert_eq!(opts.timeout, Duration::from_secs(7));
    }
}
