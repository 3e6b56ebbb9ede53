use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::CatalogError;

/// Reserved pseudo-planet that can be selected but never delivered to.
pub const SUN: &str = "Sun";

/// Returns true if `name` refers to the reserved Sun destination.
pub fn is_sun(name: &str) -> bool {
    name.trim().eq_ignore_ascii_case(SUN)
}

/// A catalog product. Earth products have no `exclusive_to`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub category: String,
    /// Earth price in the reference currency (USD).
    pub base_price: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub emoji: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusive_to: Option<String>,
}

impl Product {
    pub fn is_exclusive(&self) -> bool {
        self.exclusive_to.is_some()
    }

    /// Name as shown in product lists, e.g. "📱 iPhone 15 Pro Max".
    pub fn display_name(&self) -> String {
        if self.emoji.is_empty() {
            self.name.clone()
        } else {
            format!("{} {}", self.emoji, self.name)
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Planet {
    pub name: String,
    /// Distance from Earth in AU.
    pub distance: f64,
    /// Surface gravity as a multiple of Earth's.
    pub gravity: f64,
    #[serde(default)]
    pub atmosphere: Option<String>,
    #[serde(default)]
    pub fun_fact: Option<String>,
}

impl Planet {
    pub fn new(name: impl Into<String>, distance: f64, gravity: f64) -> Self {
        Self {
            name: name.into(),
            distance,
            gravity,
            atmosphere: None,
            fun_fact: None,
        }
    }

    pub fn is_sun(&self) -> bool {
        is_sun(&self.name)
    }
}

/// Delivery provider. Only used for attribution, never priced.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Agency {
    pub name: String,
    pub motto: String,
    pub reliability: String,
    pub delivery_time: String,
    #[serde(default)]
    pub specialty: Option<String>,
}

/// Read-only reference data for one session.
///
/// Planets, agencies and exclusive groups keep the order they were loaded in;
/// comparisons and selectors rely on it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Catalog {
    products: Vec<Product>,
    planets: Vec<Planet>,
    agencies: Vec<Agency>,
    exclusives: Vec<(String, Vec<Product>)>,
}

impl Catalog {
    pub fn new(
        products: Vec<Product>,
        planets: Vec<Planet>,
        agencies: Vec<Agency>,
        exclusives: Vec<(String, Vec<Product>)>,
    ) -> Result<Self, CatalogError> {
        let catalog = Self {
            products,
            planets,
            agencies,
            exclusives,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn planets(&self) -> &[Planet] {
        &self.planets
    }

    pub fn agencies(&self) -> &[Agency] {
        &self.agencies
    }

    pub fn exclusive_groups(&self) -> impl Iterator<Item = (&str, &[Product])> {
        self.exclusives
            .iter()
            .map(|(planet, products)| (planet.as_str(), products.as_slice()))
    }

    pub fn planet(&self, name: &str) -> Option<&Planet> {
        self.planets.iter().find(|planet| planet.name == name)
    }

    pub fn agency(&self, name: &str) -> Option<&Agency> {
        self.agencies.iter().find(|agency| agency.name == name)
    }

    /// Finds a product by exact name, Earth products first.
    pub fn product(&self, name: &str) -> Option<&Product> {
        self.products
            .iter()
            .chain(self.exclusives.iter().flat_map(|(_, products)| products))
            .find(|product| product.name == name)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        let mut names = HashSet::new();
        for product in &self.products {
            check_price(product)?;
            if product.is_exclusive() {
                return Err(invalid(format!(
                    "product {} is exclusive but listed as an Earth product",
                    product.name
                )));
            }
            if !names.insert(product.name.as_str()) {
                return Err(invalid(format!("duplicate product {}", product.name)));
            }
        }

        let mut planet_names = HashSet::new();
        for planet in &self.planets {
            if !planet_names.insert(planet.name.as_str()) {
                return Err(invalid(format!("duplicate planet {}", planet.name)));
            }
            // The Sun is never priced, so its zero distance is tolerated.
            if planet.is_sun() {
                continue;
            }
            if !(planet.distance.is_finite() && planet.distance > 0.0) {
                return Err(invalid(format!(
                    "planet {} has non-positive distance {}",
                    planet.name, planet.distance
                )));
            }
            if !(planet.gravity.is_finite() && planet.gravity > 0.0) {
                return Err(invalid(format!(
                    "planet {} has non-positive gravity {}",
                    planet.name, planet.gravity
                )));
            }
        }

        for (planet, products) in &self.exclusives {
            for product in products {
                check_price(product)?;
                if product.exclusive_to.as_deref() != Some(planet.as_str()) {
                    return Err(invalid(format!(
                        "exclusive product {} is filed under {planet} but marked for {:?}",
                        product.name, product.exclusive_to
                    )));
                }
                if !names.insert(product.name.as_str()) {
                    return Err(invalid(format!("duplicate product {}", product.name)));
                }
            }
        }

        Ok(())
    }
}

fn check_price(product: &Product) -> Result<(), CatalogError> {
    if product.base_price.is_finite() && product.base_price >= 0.0 {
        Ok(())
    } else {
        Err(invalid(format!(
            "product {} has invalid base price {}",
            product.name, product.base_price
        )))
    }
}

fn invalid(reason: String) -> CatalogError {
    CatalogError::InvalidCatalog(reason)
}

pub type UserId = i64;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(default, alias = "planet_preference")]
    pub favorite_planet: Option<String>,
    #[serde(default = "default_loyalty")]
    pub loyalty_level: String,
}

fn default_loyalty() -> String {
    "Space Cadet".to_string()
}

impl User {
    /// The demo account every session starts with when auto-login is on.
    pub fn space_explorer() -> Self {
        Self {
            id: 1,
            name: "Space Explorer".to_string(),
            email: "explorer@spacebuy.com".to_string(),
            favorite_planet: None,
            loyalty_level: "Galactic Wanderer".to_string(),
        }
    }
}

/// Purchase payload submitted to the backend.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OrderRequest {
    pub user_id: UserId,
    pub product_name: String,
    pub destination_planet: String,
    /// Total in display currency (INR).
    pub total_price_inr: f64,
    pub space_agency: String,
    pub is_exclusive: bool,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct OrderConfirmation {
    pub order_id: String,
    pub tracking_number: String,
    #[serde(default)]
    pub estimated_delivery_time: Option<String>,
}

/// An entry of the user's order history as returned by the backend.
#[derive(Clone, Debug, PartialEq)]
pub struct OrderRecord {
    pub order_id: String,
    pub product_name: String,
    pub destination_planet: String,
    pub total_price_inr: f64,
    pub space_agency: Option<String>,
    pub tracking_number: Option<String>,
    pub estimated_delivery_time: Option<String>,
    pub status: String,
    pub created_at: Option<time::PrimitiveDateTime>,
}

/// Opaque AI-search payload; only the price breakdown is derived from it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AiSearchResult {
    pub product_query: String,
    pub target_planet: String,
    #[serde(default)]
    pub product_description: String,
    #[serde(default)]
    pub base_price: Option<f64>,
    pub total_price: f64,
    pub multiplier: f64,
    #[serde(default)]
    pub reasoning: String,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AiPriceBreakdown {
    pub base_price: f64,
    pub delivery_cost: f64,
    pub total_price: f64,
}

impl AiSearchResult {
    pub fn breakdown(&self) -> AiPriceBreakdown {
        let base_price = self.base_price.unwrap_or_else(|| {
            if self.multiplier.is_finite() && self.multiplier > 0.0 {
                self.total_price / self.multiplier
            } else {
                self.total_price
            }
        });
        AiPriceBreakdown {
            base_price,
            delivery_cost: self.total_price - base_price,
            total_price: self.total_price,
        }
    }
}
