use anyhow::{bail, Result};
use serde_json::json;
use shared::Coin;

const QUICKCHART_URL: &str = "https://quickchart.io/chart";

/// Price-history charts rendered by the QuickChart HTTP API. Image
/// generation stays outside the bot; this only shapes the request and
/// hands back PNG bytes.
pub struct ChartService {
    http: reqwest::Client,
}

impl ChartService {
    pub fn new(http: reqwest::Client) -> Self {
        ChartService { http }
    }

    /// Line chart over hourly closes, oldest first.
    pub async fn render_line_chart(&self, coin: Coin, closes: &[f64]) -> Result<Vec<u8>> {
        if closes.is_empty() {
            bail!("no data points for {}", coin);
        }
        let config = json!({
            "type": "line",
            "data": {
                "labels": vec![""; closes.len()],
                "datasets": [{
                    "label": format!("{} / USDT, 1h", coin),
                    "data": closes,
                    "fill": false,
                    "borderColor": "rgb(13, 110, 253)",
                    "borderWidth": 2,
                    "pointRadius": 0,
                }],
            },
        });
        let config = config.to_string();
        let resp = self
            .http
            .get(QUICKCHART_URL)
            .query(&[
                ("w", "700"),
                ("h", "400"),
                ("format", "png"),
                ("c", config.as_str()),
            ])
            .send()
            .await?;
        if !resp.status().is_success() {
            bail!("chart render returned {}", resp.status());
        }
        Ok(resp.bytes().await?.to_vec())
    }
}
