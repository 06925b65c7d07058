use serde::Deserialize;
use serde_json::{Value, json};

use super::DomainToolkit;
use crate::error::Result;

/// ip-api.com 的响应
#[derive(Debug, Deserialize)]
struct GeoResponse {
    status: String,
    message: Option<String>,
    country: Option<String>,
    #[serde(rename = "regionName")]
    region_name: Option<String>,
    city: Option<String>,
    zip: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    timezone: Option<String>,
    isp: Option<String>,
    org: Option<String>,
}

/// Safe Browsing 查询体
pub(super) fn safe_browsing_payload(domain: &str) -> Value {
    json!({
        "client": { "clientId": "agent-lab", "clientVersion": env!("CARGO_PKG_VERSION") },
        "threatInfo": {
            "threatTypes": [
                "MALWARE",
                "SOCIAL_ENGINEERING",
                "UNWANTED_SOFTWARE",
                "POTENTIALLY_HARMFUL_APPLICATION"
            ],
            "platformTypes": ["ANY_PLATFORM"],
            "threatEntryTypes": ["URL"],
            "threatEntries": [{ "url": format!("http://{}/", domain) }]
        }
    })
}

/// 根据 Safe Browsing 响应生成结论
pub(super) fn render_safe_browsing(response: &Value) -> String {
    match response.get("matches") {
        Some(matches) => format!("⚠️ Threat detected: {}", matches),
        None => "✅ Domain is clean according to Google Safe Browsing.".to_string(),
    }
}

impl DomainToolkit {
    async fn fetch_geolocation(&self, ip: &str) -> Result<GeoResponse> {
        let url = format!(
            "{}/{}",
            self.config.geolocation_url.trim_end_matches('/'),
            ip.trim()
        );
        Ok(self.http.get(url).send().await?.json::<GeoResponse>().await?)
    }

    pub async fn get_domain_geolocation(&self, ip: &str) -> Value {
        println!("   🌍 Geolocation lookup for {}", ip);
        match self.fetch_geolocation(ip).await {
            Ok(geo) if geo.status == "success" => json!({
                "ip": ip,
                "country": geo.country,
                "region": geo.region_name,
                "city": geo.city,
                "zip": geo.zip,
                "lat": geo.lat,
                "lon": geo.lon,
                "timezone": geo.timezone,
                "isp": geo.isp,
                "org": geo.org,
            }),
            Ok(geo) => json!(format!(
                "API error: {}",
                geo.message.unwrap_or_else(|| "unknown error".to_string())
            )),
            Err(e) => json!(format!("Error: {}", e)),
        }
    }

    async fn query_safe_browsing(&self, domain: &str) -> Result<Value> {
        let response = self
            .http
            .post(&self.config.safe_browsing_url)
            .query(&[("key", self.config.safe_browsing_api_key.as_str())])
            .json(&safe_browsing_payload(domain))
            .send()
            .await?
            .json::<Value>()
            .await?;
        Ok(response)
    }

    /// Google Safe Browsing v4 查询
    pub async fn check_safe_browsing(&self, domain: &str) -> Value {
        if self.config.safe_browsing_api_key.trim().is_empty() {
            return json!("Error: Google Safe Browsing API key is not configured (GOOGLE_API_KEY).");
        }
        match self.query_safe_browsing(domain).await {
            Ok(response) => json!(render_safe_browsing(&response)),
            Err(e) => json!(format!("Error: {}", e)),
        }
    }
}
