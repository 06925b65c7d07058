//! 不依赖模型的快速扫描：只根据DNS事实给出确定性的分类

use std::fmt;

use super::{DnsRecord, DomainToolkit, LookupFailure, RecordKind, match_cdn};

/// 单一记录类型的查询事实
#[derive(Debug, Clone, PartialEq)]
pub enum RecordFacts {
    Found(Vec<String>),
    Missing,
    Failed(String),
}

impl RecordFacts {
    fn from_lookup(result: Result<Vec<DnsRecord>, LookupFailure>) -> (Self, bool) {
        match result {
            Ok(records) if records.is_empty() => (RecordFacts::Missing, false),
            Ok(records) => {
                let mut texts: Vec<String> = records.iter().map(DnsRecord::to_text).collect();
                texts.sort();
                texts.dedup();
                (RecordFacts::Found(texts), false)
            }
            Err(LookupFailure::NoAnswer) => (RecordFacts::Missing, false),
            Err(LookupFailure::NxDomain) => (RecordFacts::Missing, true),
            Err(e) => (RecordFacts::Failed(e.to_string()), false),
        }
    }

    pub fn values(&self) -> &[String] {
        match self {
            RecordFacts::Found(values) => values,
            _ => &[],
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, RecordFacts::Found(_))
    }
}

/// 快速扫描结论
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// 域名不存在
    Unregistered,
    /// 已注册但没有可访问的地址
    Parked,
    /// 有地址且配置完整
    Active,
    /// 有地址但缺少邮件或认证配置
    ActiveWithGaps,
    /// 查询失败，无法判断
    Inconclusive,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Verdict::Unregistered => "UNREGISTERED (domain does not exist)",
            Verdict::Parked => "PARKED (registered but not serving any address)",
            Verdict::Active => "ACTIVE (resolves with mail and sender policy configured)",
            Verdict::ActiveWithGaps => "ACTIVE WITH GAPS (resolves but lacks mail hygiene records)",
            Verdict::Inconclusive => "INCONCLUSIVE (DNS queries failed)",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuickScanReport {
    pub domain: String,
    pub records: Vec<(RecordKind, RecordFacts)>,
    pub cdn: Option<String>,
    pub has_spf: bool,
    pub has_dmarc: bool,
    pub nxdomain: bool,
}

const SCANNED_KINDS: [RecordKind; 6] = [
    RecordKind::A,
    RecordKind::Aaaa,
    RecordKind::Cname,
    RecordKind::Mx,
    RecordKind::Ns,
    RecordKind::Txt,
];

impl QuickScanReport {
    fn facts(&self, kind: RecordKind) -> Option<&RecordFacts> {
        self.records
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, facts)| facts)
    }

    fn found(&self, kind: RecordKind) -> bool {
        self.facts(kind).map(RecordFacts::is_found).unwrap_or(false)
    }

    pub fn verdict(&self) -> Verdict {
        if self.nxdomain {
            return Verdict::Unregistered;
        }
        let failed = self
            .records
            .iter()
            .filter(|(_, facts)| matches!(facts, RecordFacts::Failed(_)))
            .count();
        if failed == self.records.len() {
            return Verdict::Inconclusive;
        }
        let resolves = self.found(RecordKind::A)
            || self.found(RecordKind::Aaaa)
            || self.found(RecordKind::Cname);
        if !resolves {
            return Verdict::Parked;
        }
        if self.found(RecordKind::Mx) && self.has_spf && self.has_dmarc {
            Verdict::Active
        } else {
            Verdict::ActiveWithGaps
        }
    }

    /// 观察项，顺序固定
    pub fn observations(&self) -> Vec<String> {
        let mut notes = Vec::new();
        if self.nxdomain {
            notes.push(format!("Domain {} does not exist.", self.domain));
            return notes;
        }
        if !self.found(RecordKind::Ns) {
            notes.push("No NS records were returned.".to_string());
        }
        if !self.found(RecordKind::Mx) {
            notes.push("No MX records: the domain does not receive mail.".to_string());
        }
        if !self.has_spf {
            notes.push("No SPF policy (v=spf1) published in TXT records.".to_string());
        }
        if !self.has_dmarc {
            notes.push("No DMARC policy published at _dmarc.".to_string());
        }
        if let Some(cdn) = &self.cdn {
            notes.push(format!("Served through a CDN: {}.", cdn));
        }
        notes
    }
}

impl fmt::Display for QuickScanReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# Quick scan: {}", self.domain)?;
        writeln!(f)?;
        writeln!(f, "Verdict: {}", self.verdict())?;
        writeln!(f)?;
        writeln!(f, "## Records")?;
        for (kind, facts) in &self.records {
            match facts {
                RecordFacts::Found(values) => writeln!(f, "- {}: {}", kind, values.join(", "))?,
                RecordFacts::Missing => writeln!(f, "- {}: none", kind)?,
                RecordFacts::Failed(reason) => writeln!(f, "- {}: error ({})", kind, reason)?,
            }
        }
        let observations = self.observations();
        if !observations.is_empty() {
            writeln!(f)?;
            writeln!(f, "## Observations")?;
            for note in observations {
                writeln!(f, "- {}", note)?;
            }
        }
        Ok(())
    }
}

impl DomainToolkit {
    /// 汇总A/AAAA/CNAME/MX/NS/TXT与DMARC事实。DNS状态不变时结果相同
    pub async fn quick_scan(&self, domain: &str) -> QuickScanReport {
        let domain = domain.trim().trim_end_matches('.').to_lowercase();
        let mut records = Vec::with_capacity(SCANNED_KINDS.len());
        let mut nxdomain = false;

        for kind in SCANNED_KINDS {
            let (facts, missing_domain) =
                RecordFacts::from_lookup(self.resolver.lookup(&domain, kind).await);
            nxdomain |= missing_domain;
            records.push((kind, facts));
        }

        let spf_present = |facts: &RecordFacts| {
            facts
                .values()
                .iter()
                .any(|txt| txt.trim_matches('"').to_lowercase().starts_with("v=spf1"))
        };
        let has_spf = records
            .iter()
            .any(|(kind, facts)| *kind == RecordKind::Txt && spf_present(facts));

        let dmarc_name = format!("_dmarc.{}", domain);
        let has_dmarc = match self.resolver.lookup(&dmarc_name, RecordKind::Txt).await {
            Ok(txt) => txt.iter().any(|record| {
                record
                    .to_text()
                    .trim_matches('"')
                    .to_lowercase()
                    .starts_with("v=dmarc1")
            }),
            Err(_) => false,
        };

        let cname_targets = records
            .iter()
            .find(|(kind, _)| *kind == RecordKind::Cname)
            .map(|(_, facts)| facts.values().to_vec())
            .unwrap_or_default();
        let cdn = match_cdn(&cname_targets).map(|(cdn, signature)| format!("{} ({})", cdn, signature));

        QuickScanReport {
            domain,
            records,
            cdn,
            has_spf,
            has_dmarc,
            nxdomain,
        }
    }
}
