//! 仿冒域名变体生成

use std::collections::BTreeSet;

const SWAP_TLDS: [&str; 10] = [
    "com", "net", "org", "info", "biz", "co", "io", "xyz", "online", "site",
];

fn qwerty_neighbours(c: char) -> &'static str {
    match c {
        'q' => "12wa",
        'w' => "3esaq2",
        'e' => "4rdsw3",
        'r' => "5tfde4",
        't' => "6ygfr5",
        'y' => "7uhgt6",
        'u' => "8ijhy7",
        'i' => "9okju8",
        'o' => "0plki9",
        'p' => "lo0",
        'a' => "qwsz",
        's' => "edxzaw",
        'd' => "rfcxse",
        'f' => "tgvcdr",
        'g' => "yhbvft",
        'h' => "ujnbgy",
        'j' => "ikmnhu",
        'k' => "olmji",
        'l' => "kop",
        'z' => "asx",
        'x' => "zsdc",
        'c' => "xdfv",
        'v' => "cfgb",
        'b' => "vghn",
        'n' => "bhjm",
        'm' => "njk",
        _ => "",
    }
}

fn valid_label(label: &str) -> bool {
    !label.is_empty() && !label.starts_with('-') && !label.ends_with('-') && label.len() <= 63
}

fn omission(name: &[char]) -> Vec<String> {
    (0..name.len())
        .map(|i| name.iter().enumerate().filter(|(j, _)| *j != i).map(|(_, c)| c).collect())
        .collect()
}

fn repetition(name: &[char]) -> Vec<String> {
    (0..name.len())
        .filter(|i| name[*i].is_alphanumeric())
        .map(|i| {
            let mut chars = name.to_vec();
            chars.insert(i, name[i]);
            chars.into_iter().collect()
        })
        .collect()
}

fn transposition(name: &[char]) -> Vec<String> {
    (0..name.len().saturating_sub(1))
        .filter(|i| name[*i] != name[i + 1])
        .map(|i| {
            let mut chars = name.to_vec();
            chars.swap(i, i + 1);
            chars.into_iter().collect()
        })
        .collect()
}

fn replacement(name: &[char]) -> Vec<String> {
    let mut out = Vec::new();
    for (i, c) in name.iter().enumerate() {
        for neighbour in qwerty_neighbours(*c).chars() {
            let mut chars = name.to_vec();
            chars[i] = neighbour;
            out.push(chars.into_iter().collect());
        }
    }
    out
}

fn hyphenation(name: &[char]) -> Vec<String> {
    (1..name.len())
        .map(|i| {
            let mut chars = name.to_vec();
            chars.insert(i, '-');
            chars.into_iter().collect()
        })
        .collect()
}

/// 以第一个标签为名称、其余部分为后缀生成变体（省略、重复、换位、邻键替换、连字符、换后缀），
/// 结果去重、排序，不含原域名
pub fn generate_variants(domain: &str) -> Vec<String> {
    let domain = domain.trim().trim_end_matches('.').to_lowercase();
    let Some((name, suffix)) = domain.split_once('.') else {
        return Vec::new();
    };
    if name.is_empty() || suffix.is_empty() {
        return Vec::new();
    }

    let chars: Vec<char> = name.chars().collect();
    let mut variants = BTreeSet::new();

    for label in omission(&chars)
        .into_iter()
        .chain(repetition(&chars))
        .chain(transposition(&chars))
        .chain(replacement(&chars))
        .chain(hyphenation(&chars))
    {
        if valid_label(&label) {
            variants.insert(format!("{}.{}", label, suffix));
        }
    }

    for tld in SWAP_TLDS {
        if tld != suffix {
            variants.insert(format!("{}.{}", name, tld));
        }
    }

    variants.remove(&domain);
    variants.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variants_cover_each_fuzzer() {
        let variants = generate_variants("google.com");

        assert!(variants.contains(&"gogle.com".to_string())); // omission
        assert!(variants.contains(&"gooogle.com".to_string())); // repetition
        assert!(variants.contains(&"googel.com".to_string())); // transposition
        assert!(variants.contains(&"foogle.com".to_string())); // replacement
        assert!(variants.contains(&"goo-gle.com".to_string())); // hyphenation
        assert!(variants.contains(&"google.net".to_string())); // tld swap
        assert!(!variants.contains(&"google.com".to_string()));
    }

    #[test]
    fn test_variants_are_sorted_and_unique() {
        let variants = generate_variants("Example.COM.");
        let mut sorted = variants.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(variants, sorted);
        assert!(variants.iter().all(|v| v == &v.to_lowercase()));
    }

    #[test]
    fn test_no_leading_or_trailing_hyphens() {
        for variant in generate_variants("ab.io") {
            let label = variant.split('.').next().unwrap();
            assert!(!label.starts_with('-') && !label.ends_with('-'), "{}", variant);
        }
    }

    #[test]
    fn test_bare_names_produce_nothing() {
        assert!(generate_variants("localhost").is_empty());
        assert!(generate_variants(".com").is_empty());
    }

    #[test]
    fn test_multi_label_suffix_is_kept() {
        let variants = generate_variants("bbc.co.uk");
        assert!(variants.contains(&"bc.co.uk".to_string()));
        assert!(variants.contains(&"bbc.com".to_string()));
    }
}
