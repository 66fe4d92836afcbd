// src/catalog/scihub.rs
use log::{debug, info, warn};
use reqwest::blocking::Client;
use serde_json::Value;
use std::time::Duration;

use super::{BandLocator, BandUrls, Scene, SceneCatalog, SceneQuery};
use crate::config::Credentials;
use crate::error::{NbrError, Result};

const NIR_SUFFIX: &str = "_B08_10m.jp2";
const TRUE_COLOR_SUFFIX: &str = "_TCI_10m.jp2";
const SWIR_SUFFIX: &str = "_B12_20m.jp2";

/// Rows requested per OpenSearch call; the hub caps pages at 100
const PAGE_SIZE: usize = 100;

/// Client for a Sentinel data hub: OpenSearch for product search and the
/// OData node tree for locating band files inside a product.
#[derive(Clone)]
pub struct SciHubClient {
    client: Client,
    api_url: String,
    credentials: Credentials,
}

impl SciHubClient {
    pub fn new(api_url: &str, credentials: Credentials) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .timeout(Duration::from_secs(120))
            .build()?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value> {
        debug!("GET {url}");
        let response = self
            .client
            .get(url)
            .query(query)
            .basic_auth(&self.credentials.user, Some(&self.credentials.pass))
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(NbrError::Http(format!("GET {url} returned {status}")));
        }
        Ok(response.json()?)
    }

    fn list_nodes(&self, url: &str) -> Result<Vec<Value>> {
        let body = self.get_json(url, &[("$format", "json".to_string())])?;
        parse_node_listing(&body)
    }
}

impl SceneCatalog for SciHubClient {
    /// Page through every match, up to `query.max_results` scenes
    fn search(&self, query: &SceneQuery) -> Result<Vec<Scene>> {
        let url = format!("{}/search", self.api_url);
        let q = query.to_opensearch();
        debug!("OpenSearch query: {q}");

        let mut scenes: Vec<Scene> = Vec::new();
        loop {
            let rows = PAGE_SIZE.min(query.max_results.saturating_sub(scenes.len()));
            let body = self.get_json(
                &url,
                &[
                    ("q", q.clone()),
                    ("rows", rows.to_string()),
                    ("start", scenes.len().to_string()),
                    ("format", "json".to_string()),
                ],
            )?;

            let page = parse_search_response(&body)?;
            let fetched = page.len();
            scenes.extend(page);

            let total = parse_total_results(&body).unwrap_or(scenes.len());
            if fetched == 0 || scenes.len() >= total {
                break;
            }
            if scenes.len() >= query.max_results {
                warn!(
                    "Catalog matched {total} scenes; only the first {} are considered",
                    scenes.len()
                );
                break;
            }
        }

        info!("Catalog returned {} scenes", scenes.len());
        Ok(scenes)
    }
}

impl BandLocator for SciHubClient {
    fn locate(&self, scene: &Scene) -> Result<BandUrls> {
        let product = format!(
            "{}/Nodes('{}')",
            scene.link_alternative.trim_end_matches('/'),
            scene.filename
        );

        let granules = self.list_nodes(&format!("{product}/Nodes('GRANULE')/Nodes"))?;
        let granule_id = granules
            .first()
            .and_then(|node| node["Id"].as_str())
            .ok_or_else(|| NbrError::Catalog(format!("{} has no granules", scene.filename)))?;

        let img_data =
            format!("{product}/Nodes('GRANULE')/Nodes('{granule_id}')/Nodes('IMG_DATA')");
        let bands_10m = self.list_nodes(&format!("{img_data}/Nodes('R10m')/Nodes"))?;
        let bands_20m = self.list_nodes(&format!("{img_data}/Nodes('R20m')/Nodes"))?;

        let urls = BandUrls {
            nir: find_media_src(&bands_10m, NIR_SUFFIX)?,
            swir: find_media_src(&bands_20m, SWIR_SUFFIX)?,
            true_color: find_media_src(&bands_10m, TRUE_COLOR_SUFFIX).ok(),
        };
        debug!("Resolved bands for {}: {:?}", scene.filename, urls);
        Ok(urls)
    }
}

/// Parse an OpenSearch JSON feed into scenes.
///
/// The hub returns a bare object instead of a one-element array when there
/// is a single entry, and omits `entry` entirely when nothing matched.
pub fn parse_search_response(body: &Value) -> Result<Vec<Scene>> {
    let feed = body
        .get("feed")
        .ok_or_else(|| NbrError::Catalog("response has no feed".to_string()))?;

    one_or_many(&feed["entry"])
        .into_iter()
        .map(parse_entry)
        .collect()
}

/// `opensearch:totalResults` of a feed, if present
pub fn parse_total_results(body: &Value) -> Option<usize> {
    match &body["feed"]["opensearch:totalResults"] {
        Value::String(s) => s.parse().ok(),
        other => other.as_u64().map(|n| n as usize),
    }
}

fn parse_entry(entry: &Value) -> Result<Scene> {
    let id = entry["id"]
        .as_str()
        .ok_or_else(|| NbrError::Catalog("entry without id".to_string()))?
        .to_string();

    let link_alternative = one_or_many(&entry["link"])
        .into_iter()
        .find(|link| link["rel"].as_str() == Some("alternative"))
        .and_then(|link| link["href"].as_str())
        .ok_or_else(|| NbrError::Catalog(format!("entry {id} has no alternative link")))?
        .to_string();

    let filename = named_field(entry, "str", "filename")
        .and_then(Value::as_str)
        .ok_or_else(|| NbrError::Catalog(format!("entry {id} has no filename")))?
        .to_string();

    let begin_position = named_field(entry, "date", "beginposition")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let cloud_cover = named_field(entry, "double", "cloudcoverpercentage")
        .and_then(|content| match content {
            Value::String(s) => s.parse().ok(),
            other => other.as_f64(),
        })
        .unwrap_or(f64::NAN);

    Ok(Scene {
        title: entry["title"].as_str().unwrap_or(&filename).to_string(),
        id,
        filename,
        begin_position,
        cloud_cover,
        link_alternative,
    })
}

/// Look up `{"name": name, "content": ...}` inside the `kind` list of an entry
fn named_field<'a>(entry: &'a Value, kind: &str, name: &str) -> Option<&'a Value> {
    one_or_many(&entry[kind])
        .into_iter()
        .find(|field| field["name"].as_str() == Some(name))
        .map(|field| &field["content"])
}

fn one_or_many(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        Value::Null => Vec::new(),
        single => vec![single],
    }
}

/// Extract `d.results` from an OData listing
pub fn parse_node_listing(body: &Value) -> Result<Vec<Value>> {
    body["d"]["results"]
        .as_array()
        .cloned()
        .ok_or_else(|| NbrError::Catalog("node listing has no d.results".to_string()))
}

/// Media URL of the node whose name ends with `suffix`
pub fn find_media_src(nodes: &[Value], suffix: &str) -> Result<String> {
    nodes
        .iter()
        .find(|node| {
            ["Id", "Name"]
                .iter()
                .filter_map(|key| node[*key].as_str())
                .any(|name| name.ends_with(suffix))
        })
        .and_then(|node| node["__metadata"]["media_src"].as_str())
        .map(str::to_string)
        .ok_or_else(|| NbrError::Catalog(format!("no band file ending in {suffix}")))
}
