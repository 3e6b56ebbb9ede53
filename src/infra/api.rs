//! Thin asynchronous client for the SpaceBuy backend.
//!
//! - Loads the four reference collections concurrently and validates them
//!   into a [`Catalog`].
//! - Keeps the catalog in a 60-minute in-memory cache with a stale fallback.
//! - Submits login, order, order-history and AI-search requests. Their
//!   responses are passed through untouched.

use std::{
    sync::Arc,
    time::{Duration, SystemTime},
};

use reqwest::{Client, Url};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{Map, Value};
use thiserror::Error;
use time::{format_description, PrimitiveDateTime};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::domain::{
    AiSearchResult, Agency, Catalog, CatalogError, Credentials, OrderConfirmation, OrderRecord,
    OrderRequest, Planet, Product, SearchRequest, User, UserId,
};
use crate::util::version::{version_label, APP_NAME};

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/";
const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Error)]
pub enum ApiClientError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("http request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("malformed payload: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("api error: {0}")]
    Api(String),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CacheStatus {
    Fresh,
    Cached,
    Stale,
}

#[derive(Clone, Debug)]
pub struct CachedPayload<T> {
    pub data: T,
    pub fetched_at: SystemTime,
    pub status: CacheStatus,
}

impl<T> CachedPayload<T> {
    fn new(data: T, fetched_at: SystemTime, status: CacheStatus) -> Self {
        Self {
            data,
            fetched_at,
            status,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Deserialize)]
struct HealthBody {
    status: String,
}

#[derive(Clone)]
pub struct SpaceBuyClient {
    http: Client,
    base_url: Url,
    cache: Arc<Mutex<Option<Cached<Catalog>>>>,
    ttl: Duration,
}

impl SpaceBuyClient {
    pub fn with_base_url(base: &str) -> Result<Self, ApiClientError> {
        let base_url = Url::parse(base)?;
        let user_agent = format!("{}/{}", APP_NAME.replace(' ', "-"), version_label());
        let http = Client::builder().user_agent(user_agent).build()?;
        Ok(Self {
            http,
            base_url,
            cache: Arc::new(Mutex::new(None)),
            ttl: DEFAULT_TTL,
        })
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Catalog for this session; served from cache while fresh, stale copy
    /// when the backend is unreachable.
    pub async fn get_catalog(&self) -> Result<CachedPayload<Catalog>, ApiClientError> {
        if let Some(payload) = self.cached_catalog().await {
            debug!("serving cached catalog");
            return Ok(payload);
        }

        match self.fetch_catalog().await {
            Ok(catalog) => {
                info!(
                    products = catalog.products().len(),
                    planets = catalog.planets().len(),
                    agencies = catalog.agencies().len(),
                    "catalog loaded"
                );
                Ok(self.store_catalog(catalog).await)
            }
            Err(error) => {
                if let Some(stale) = self.cached_catalog_stale().await {
                    warn!("catalog refresh failed ({error}); serving stale copy");
                    return Ok(stale);
                }
                Err(error)
            }
        }
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<User, ApiClientError> {
        let url = self.url("api/login")?;
        self.send_json(self.http.post(url).json(credentials)).await
    }

    pub async fn create_order(
        &self,
        order: &OrderRequest,
    ) -> Result<OrderConfirmation, ApiClientError> {
        let url = self.url("api/orders")?;
        let confirmation: OrderConfirmation =
            self.send_json(self.http.post(url).json(order)).await?;
        info!(
            order_id = %confirmation.order_id,
            tracking = %confirmation.tracking_number,
            "order placed"
        );
        Ok(confirmation)
    }

    pub async fn get_orders(&self, user_id: UserId) -> Result<Vec<OrderRecord>, ApiClientError> {
        let url = self.url(&format!("api/orders/{user_id}"))?;
        let raw: Vec<Value> = self.send_json(self.http.get(url)).await?;
        parse_order_records(raw)
    }

    pub async fn ai_search(
        &self,
        request: &SearchRequest,
    ) -> Result<AiSearchResult, ApiClientError> {
        let url = self.url("api/ai-search")?;
        debug!(query = %request.product_query, planet = %request.target_planet, "ai search");
        self.send_json(self.http.post(url).json(request)).await
    }

    pub async fn health(&self) -> Result<bool, ApiClientError> {
        let url = self.url("health")?;
        let body: HealthBody = self.send_json(self.http.get(url)).await?;
        Ok(body.status.eq_ignore_ascii_case("healthy"))
    }

    async fn fetch_catalog(&self) -> Result<Catalog, ApiClientError> {
        let (products, planets, agencies, exclusives) = tokio::try_join!(
            self.get_json::<Vec<Product>>("api/products"),
            self.get_json::<Map<String, Value>>("api/planets"),
            self.get_json::<Map<String, Value>>("api/agencies"),
            self.get_json::<Map<String, Value>>("api/exclusive-products"),
        )?;

        let catalog = Catalog::new(
            products,
            parse_planets(planets)?,
            parse_agencies(agencies)?,
            parse_exclusives(exclusives)?,
        )?;
        Ok(catalog)
    }

    async fn cached_catalog(&self) -> Option<CachedPayload<Catalog>> {
        let cache = self.cache.lock().await;
        cache.as_ref().and_then(|entry| entry.if_fresh(self.ttl))
    }

    async fn cached_catalog_stale(&self) -> Option<CachedPayload<Catalog>> {
        let cache = self.cache.lock().await;
        cache.as_ref().map(Cached::stale)
    }

    async fn store_catalog(&self, catalog: Catalog) -> CachedPayload<Catalog> {
        let fetched_at = SystemTime::now();
        let payload = CachedPayload::new(catalog.clone(), fetched_at, CacheStatus::Fresh);
        *self.cache.lock().await = Some(Cached::new(catalog, fetched_at));
        payload
    }

    async fn get_json<T>(&self, path: &str) -> Result<T, ApiClientError>
    where
        T: DeserializeOwned,
    {
        let url = self.url(path)?;
        debug!("GET {url}");
        self.send_json(self.http.get(url)).await
    }

    async fn send_json<T>(&self, builder: reqwest::RequestBuilder) -> Result<T, ApiClientError>
    where
        T: DeserializeOwned,
    {
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .map(|body| body.error)
                .unwrap_or_else(|_| status.to_string());
            return Err(ApiClientError::Api(message));
        }
        Ok(response.json().await?)
    }

    fn url(&self, path: &str) -> Result<Url, url::ParseError> {
        self.base_url.join(path)
    }
}

struct Cached<T> {
    value: T,
    fetched_at: SystemTime,
}

impl<T: Clone> Cached<T> {
    fn new(value: T, fetched_at: SystemTime) -> Self {
        Self { value, fetched_at }
    }

    fn if_fresh(&self, ttl: Duration) -> Option<CachedPayload<T>> {
        if self
            .fetched_at
            .elapsed()
            .map(|elapsed| elapsed <= ttl)
            .unwrap_or(false)
        {
            Some(CachedPayload::new(
                self.value.clone(),
                self.fetched_at,
                CacheStatus::Cached,
            ))
        } else {
            None
        }
    }

    fn stale(&self) -> CachedPayload<T> {
        CachedPayload::new(self.value.clone(), self.fetched_at, CacheStatus::Stale)
    }
}

#[derive(Debug, Deserialize)]
struct PlanetDto {
    #[serde(deserialize_with = "f64_from_json")]
    distance: f64,
    #[serde(deserialize_with = "f64_from_json")]
    gravity: f64,
    #[serde(default)]
    atmosphere: Option<String>,
    #[serde(default)]
    fun_fact: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AgencyDto {
    #[serde(default)]
    motto: String,
    #[serde(default)]
    reliability: String,
    #[serde(default)]
    delivery_time: String,
    #[serde(default)]
    specialty: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OrderRecordDto {
    #[serde(deserialize_with = "string_from_json")]
    order_id: String,
    product_name: String,
    destination_planet: String,
    #[serde(deserialize_with = "f64_from_json")]
    total_price_inr: f64,
    #[serde(default)]
    space_agency: Option<String>,
    #[serde(default)]
    tracking_number: Option<String>,
    #[serde(default)]
    estimated_delivery_time: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
}

impl From<OrderRecordDto> for OrderRecord {
    fn from(dto: OrderRecordDto) -> Self {
        Self {
            order_id: dto.order_id,
            product_name: dto.product_name,
            destination_planet: dto.destination_planet,
            total_price_inr: dto.total_price_inr,
            space_agency: dto.space_agency,
            tracking_number: dto.tracking_number,
            estimated_delivery_time: dto.estimated_delivery_time,
            status: dto.status.unwrap_or_else(|| "pending".to_string()),
            created_at: dto.created_at.as_deref().and_then(parse_created_at),
        }
    }
}

/// Planets keyed by name, in payload order.
fn parse_planets(raw: Map<String, Value>) -> Result<Vec<Planet>, ApiClientError> {
    raw.into_iter()
        .map(|(name, value)| -> Result<Planet, ApiClientError> {
            let dto: PlanetDto = serde_json::from_value(value)?;
            Ok(Planet {
                name,
                distance: dto.distance,
                gravity: dto.gravity,
                atmosphere: dto.atmosphere,
                fun_fact: dto.fun_fact,
            })
        })
        .collect()
}

fn parse_agencies(raw: Map<String, Value>) -> Result<Vec<Agency>, ApiClientError> {
    raw.into_iter()
        .map(|(name, value)| -> Result<Agency, ApiClientError> {
            let dto: AgencyDto = serde_json::from_value(value)?;
            Ok(Agency {
                name,
                motto: dto.motto,
                reliability: dto.reliability,
                delivery_time: dto.delivery_time,
                specialty: dto.specialty,
            })
        })
        .collect()
}

/// Exclusive groups keyed by planet. Products that omit `exclusive_to` are
/// assigned to the planet they are filed under.
fn parse_exclusives(
    raw: Map<String, Value>,
) -> Result<Vec<(String, Vec<Product>)>, ApiClientError> {
    raw.into_iter()
        .map(|(planet, value)| -> Result<(String, Vec<Product>), ApiClientError> {
            let mut products: Vec<Product> = serde_json::from_value(value)?;
            for product in &mut products {
                product.exclusive_to.get_or_insert_with(|| planet.clone());
            }
            Ok((planet, products))
        })
        .collect()
}

fn parse_order_records(raw: Vec<Value>) -> Result<Vec<OrderRecord>, ApiClientError> {
    raw.into_iter()
        .map(|value| -> Result<OrderRecord, ApiClientError> {
            Ok(serde_json::from_value::<OrderRecordDto>(value)?.into())
        })
        .collect()
}

/// Parses the backend's naive ISO timestamps, e.g. `2025-03-01T10:15:30.123456`.
fn parse_created_at(raw: &str) -> Option<PrimitiveDateTime> {
    let normalized = raw.trim().replacen(' ', "T", 1);
    let without_fraction = normalized.split('.').next()?;
    let format = format_description::parse("[year]-[month]-[day]T[hour]:[minute]:[second]").ok()?;
    PrimitiveDateTime::parse(without_fraction, format.as_slice()).ok()
}

fn string_from_json<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct StringOrNumber;

    impl<'de> serde::de::Visitor<'de> for StringOrNumber {
        type Value = String;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a string or number")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }
    }

    deserializer.deserialize_any(StringOrNumber)
}

/// Decimal columns arrive either as JSON numbers or as strings.
fn f64_from_json<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct NumberOrString;

    impl<'de> serde::de::Visitor<'de> for NumberOrString {
        type Value = f64;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a number or numeric string")
        }

        fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value)
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value as f64)
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value as f64)
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            value.trim().parse().map_err(E::custom)
        }
    }

    deserializer.deserialize_any(NumberOrString)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn planets_keep_payload_order() {
        let raw = object(json!({
            "Mercury": {"distance": 0.39, "gravity": 0.38, "atmosphere": "None"},
            "Venus": {"distance": 0.72, "gravity": 0.9},
            "Mars": {"distance": 1.52, "gravity": 0.38, "fun_fact": "Starbucks!"},
            "Sun": {"distance": 0.0, "gravity": 27.01}
        }));
        let planets = parse_planets(raw).unwrap();
        let names: Vec<_> = planets.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Mercury", "Venus", "Mars", "Sun"]);
        assert_eq!(planets[0].atmosphere.as_deref(), Some("None"));
        assert_eq!(planets[2].fun_fact.as_deref(), Some("Starbucks!"));
    }

    #[test]
    fn planet_numbers_may_be_strings() {
        let raw = object(json!({"Moon": {"distance": "0.0026", "gravity": 0.17}}));
        let planets = parse_planets(raw).unwrap();
        assert_eq!(planets[0].distance, 0.0026);
    }

    #[test]
    fn malformed_planet_is_a_decode_error() {
        let raw = object(json!({"Moon": {"gravity": 0.17}}));
        assert!(matches!(parse_planets(raw), Err(ApiClientError::Decode(_))));
    }

    #[test]
    fn agencies_take_their_name_from_the_key() {
        let raw = object(json!({
            "NASA Planetary Logistics": {
                "motto": "We Put the Science in Delivery Science",
                "reliability": "94%",
                "delivery_time": "2-5 years",
                "specialty": "Peer-reviewed delivery receipts"
            }
        }));
        let agencies = parse_agencies(raw).unwrap();
        assert_eq!(agencies[0].name, "NASA Planetary Logistics");
        assert_eq!(agencies[0].delivery_time, "2-5 years");
    }

    #[test]
    fn exclusives_inherit_their_planet() {
        let raw = object(json!({
            "Mars": [
                {"name": "Red Dust", "category": "Souvenirs", "base_price": 4.0,
                 "description": "", "emoji": "🔴"},
                {"name": "Olympus Ice", "category": "Food", "base_price": 9.5,
                 "description": "", "emoji": "🧊", "exclusive_to": "Mars"}
            ]
        }));
        let groups = parse_exclusives(raw).unwrap();
        assert_eq!(groups.len(), 1);
        let (planet, products) = &groups[0];
        assert_eq!(planet, "Mars");
        assert!(products
            .iter()
            .all(|p| p.exclusive_to.as_deref() == Some("Mars")));
    }

    #[test]
    fn order_records_accept_decimal_strings() {
        let raw = vec![json!({
            "id": 7,
            "order_id": "ORD-123",
            "user_id": 1,
            "product_name": "Instant Ramen",
            "destination_planet": "Moon",
            "total_price_inr": "82.17",
            "space_agency": "JAXA Precision Delivery",
            "tracking_number": "COSMIC-12345678",
            "status": "pending",
            "created_at": "2025-03-01T10:15:30.123456"
        })];
        let orders = parse_order_records(raw).unwrap();
        let order = &orders[0];
        assert_eq!(order.order_id, "ORD-123");
        assert_eq!(order.total_price_inr, 82.17);
        assert_eq!(order.status, "pending");
        let created = order.created_at.unwrap();
        assert_eq!(created.year(), 2025);
        assert_eq!(created.hour(), 10);
        assert_eq!(created.second(), 30);
    }

    #[test]
    fn order_record_defaults_missing_status() {
        let raw = vec![json!({
            "order_id": 42,
            "product_name": "Pizza",
            "destination_planet": "Mars",
            "total_price_inr": 1000
        })];
        let orders = parse_order_records(raw).unwrap();
        assert_eq!(orders[0].order_id, "42");
        assert_eq!(orders[0].status, "pending");
        assert!(orders[0].created_at.is_none());
    }

    #[test]
    fn created_at_accepts_space_separator_and_rejects_garbage() {
        assert!(parse_created_at("2025-03-01 10:15:30").is_some());
        assert!(parse_created_at("yesterday").is_none());
    }

    #[test]
    fn ai_search_payload_deserializes_without_base_price() {
        let result: AiSearchResult = serde_json::from_value(json!({
            "product_query": "toaster",
            "target_planet": "Jupiter",
            "product_description": "Crispy under pressure.",
            "total_price": 900.0,
            "multiplier": 9.0,
            "reasoning": "Gas giant surcharge"
        }))
        .unwrap();
        assert_eq!(result.base_price, None);
        assert_eq!(result.breakdown().base_price, 100.0);
    }

    #[test]
    fn login_payload_maps_planet_preference() {
        let user: User = serde_json::from_value(json!({
            "id": 3,
            "name": "Ripley",
            "email": "ripley@nostromo.space",
            "planet_preference": "Mars",
            "total_spent_inr": "0.00",
            "loyalty_level": "Space Cadet"
        }))
        .unwrap();
        assert_eq!(user.favorite_planet.as_deref(), Some("Mars"));
        assert_eq!(user.loyalty_level, "Space Cadet");
    }

    #[test]
    fn cache_entries_report_freshness() {
        let fresh = Cached::new(7, SystemTime::now());
        let hit = fresh.if_fresh(Duration::from_secs(60)).unwrap();
        assert_eq!(hit.status, CacheStatus::Cached);
        assert_eq!(hit.data, 7);

        let old = Cached::new(7, SystemTime::now() - Duration::from_secs(120));
        assert!(old.if_fresh(Duration::from_secs(60)).is_none());
        let stale = old.stale();
        assert_eq!(stale.status, CacheStatus::Stale);
        assert!(stale.fetched_at.elapsed().unwrap() >= Duration::from_secs(120));
    }

    #[test]
    fn client_rejects_invalid_base_url() {
        assert!(matches!(
            SpaceBuyClient::with_base_url("not a url"),
            Err(ApiClientError::InvalidUrl(_))
        ));
    }
}
