//! Per-session state: destination, filters and the logged-in user.
//!
//! The session is an explicit value owned by the caller. Every state change
//! goes through a method here, and this is the only place that decides what
//! the reserved Sun destination means.

use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{
    entities::{is_sun, AiSearchResult, Catalog, OrderRequest, Planet, Product, User, UserId, SUN},
    pricing::{
        delivery_cost, estimated_delivery_time, format_price, pick_agency, to_display_currency,
        total_price, RandomSource,
    },
    query::{exclusives_for, filter_agencies, filter_by_category, ALL_CATEGORIES},
    CatalogError,
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Destination {
    #[default]
    Unselected,
    Planet(String),
    /// Selected but undeliverable.
    Sun,
}

impl Destination {
    pub fn name(&self) -> Option<&str> {
        match self {
            Destination::Unselected => None,
            Destination::Planet(name) => Some(name),
            Destination::Sun => Some(SUN),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum AuthState {
    #[default]
    LoggedOut,
    LoggedIn(User),
}

/// What the presentation layer has to do after a destination change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DestinationChange {
    Repriced,
    Blocked,
}

/// Themed dead end shown instead of a catalog for the Sun.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SunNotice {
    pub headline: &'static str,
    pub message: &'static str,
}

pub const SUN_NOTICE: SunNotice = SunNotice {
    headline: "SUN DELIVERY REQUEST DETECTED!",
    message: "None of our couriers came back from a Sun delivery. \
              Interested in joining the team? We need someone with your heat resistance.",
};

/// Who carries an offer to its destination.
#[derive(Clone, Debug, PartialEq)]
pub struct Attribution {
    pub name: String,
    pub motto: Option<String>,
    pub reliability: Option<String>,
    pub delivery_time: String,
}

impl Attribution {
    fn local(planet: &str) -> Self {
        Self {
            name: local_courier(planet),
            motto: None,
            reliability: None,
            delivery_time: "Same day".to_string(),
        }
    }
}

fn local_courier(planet: &str) -> String {
    format!("{planet} Express")
}

/// A product priced for the session's destination.
#[derive(Clone, Debug, PartialEq)]
pub struct Offer {
    pub product: Product,
    pub destination: String,
    pub exclusive: bool,
    pub delivery_cost: f64,
    pub total_price: f64,
    pub display_price: String,
    pub agency: Attribution,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Listing {
    pub planet: Planet,
    pub category: String,
    pub transit_estimate: String,
    pub earth_offers: Vec<Offer>,
    pub exclusive_offers: Vec<Offer>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum CatalogView {
    NoDestination,
    Blocked(SunNotice),
    Listing(Listing),
}

impl CatalogView {
    pub fn is_blocked(&self) -> bool {
        matches!(self, CatalogView::Blocked(_))
    }

    pub fn offers(&self) -> impl Iterator<Item = &Offer> {
        let listing = match self {
            CatalogView::Listing(listing) => Some(listing),
            _ => None,
        };
        listing
            .into_iter()
            .flat_map(|listing| listing.earth_offers.iter().chain(&listing.exclusive_offers))
    }
}

/// Raw login form input.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub name: String,
    pub email: String,
    pub favorite_planet: Option<String>,
}

/// Validated login payload, ready for the backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub name: String,
    pub email: String,
    pub planet_pref: Option<String>,
}

impl LoginForm {
    pub fn validate(&self) -> Result<Credentials, CatalogError> {
        let name = self.name.trim();
        let email = self.email.trim();
        if name.is_empty() || email.is_empty() {
            return Err(CatalogError::InvalidCredentials);
        }
        Ok(Credentials {
            name: name.to_string(),
            email: email.to_string(),
            planet_pref: self
                .favorite_planet
                .as_deref()
                .map(str::trim)
                .filter(|planet| !planet.is_empty())
                .map(str::to_string),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SearchRequest {
    pub product_query: String,
    pub target_planet: String,
    pub user_session: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchPlan {
    Blocked(SunNotice),
    Request(SearchRequest),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    destination: Destination,
    category: String,
    agency_filter: Option<String>,
    auth: AuthState,
    search_token: Option<Uuid>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            destination: Destination::Unselected,
            category: ALL_CATEGORIES.to_string(),
            agency_filter: None,
            auth: AuthState::LoggedOut,
            search_token: None,
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// New session with `default_destination` preselected when the catalog
    /// knows it.
    pub fn start(catalog: &Catalog, default_destination: &str) -> Self {
        let mut session = Self::new();
        if let Err(err) = session.select_destination(catalog, default_destination) {
            warn!("default destination not applied: {err}");
        }
        session
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn agency_filter(&self) -> Option<&str> {
        self.agency_filter.as_deref()
    }

    pub fn user(&self) -> Option<&User> {
        match &self.auth {
            AuthState::LoggedIn(user) => Some(user),
            AuthState::LoggedOut => None,
        }
    }

    /// Moves to a new destination. Unknown planets leave the session as is.
    pub fn select_destination(
        &mut self,
        catalog: &Catalog,
        name: &str,
    ) -> Result<DestinationChange, CatalogError> {
        if is_sun(name) {
            debug!("destination set to the Sun; catalog blocked");
            self.destination = Destination::Sun;
            return Ok(DestinationChange::Blocked);
        }

        let planet = catalog
            .planet(name.trim())
            .ok_or_else(|| CatalogError::InvalidSelection(name.to_string()))?;
        debug!(planet = %planet.name, "destination selected");
        self.destination = Destination::Planet(planet.name.clone());
        Ok(DestinationChange::Repriced)
    }

    /// Sets the category filter. Unknown categories simply list nothing.
    pub fn set_category(&mut self, category: impl Into<String>) {
        self.category = category.into();
    }

    pub fn set_agency_filter(&mut self, agency: Option<String>) {
        self.agency_filter = agency;
    }

    /// Prices everything visible for the current destination and filters.
    pub fn view(&self, catalog: &Catalog, rng: &mut dyn RandomSource) -> CatalogView {
        let name = match &self.destination {
            Destination::Unselected => return CatalogView::NoDestination,
            Destination::Sun => return CatalogView::Blocked(SUN_NOTICE),
            Destination::Planet(name) => name,
        };
        let Some(planet) = catalog.planet(name) else {
            // A session can outlive the catalog it was built against.
            return CatalogView::NoDestination;
        };

        let pool: Vec<_> = filter_agencies(catalog.agencies(), self.agency_filter.as_deref())
            .into_iter()
            .cloned()
            .collect();

        let earth_offers = if pool.is_empty() {
            Vec::new()
        } else {
            filter_by_category(catalog.products(), &self.category)
                .into_iter()
                .filter_map(|product| {
                    let agency = pick_agency(&pool, rng)?;
                    let total = total_price(product, planet, false);
                    Some(Offer {
                        product: product.clone(),
                        destination: planet.name.clone(),
                        exclusive: false,
                        delivery_cost: delivery_cost(product.base_price, planet),
                        total_price: total,
                        display_price: format_price(total),
                        agency: Attribution {
                            name: agency.name.clone(),
                            motto: Some(agency.motto.clone()),
                            reliability: Some(agency.reliability.clone()),
                            delivery_time: agency.delivery_time.clone(),
                        },
                    })
                })
                .collect()
        };

        let exclusive_offers = exclusives_for(catalog, &planet.name)
            .iter()
            .map(|product| {
                let total = total_price(product, planet, true);
                Offer {
                    product: product.clone(),
                    destination: planet.name.clone(),
                    exclusive: true,
                    delivery_cost: 0.0,
                    total_price: total,
                    display_price: format_price(total),
                    agency: Attribution::local(&planet.name),
                }
            })
            .collect();

        CatalogView::Listing(Listing {
            planet: planet.clone(),
            category: self.category.clone(),
            transit_estimate: estimated_delivery_time(planet, rng),
            earth_offers,
            exclusive_offers,
        })
    }

    pub fn log_in(&mut self, user: User) {
        info!(user = %user.name, "logged in");
        self.auth = AuthState::LoggedIn(user);
    }

    pub fn log_out(&mut self) -> Option<User> {
        match std::mem::take(&mut self.auth) {
            AuthState::LoggedIn(user) => {
                info!(user = %user.name, "logged out");
                Some(user)
            }
            AuthState::LoggedOut => None,
        }
    }

    /// Builds the order for an offer taken from this session's current view.
    pub fn prepare_purchase(&self, offer: &Offer) -> Result<OrderRequest, CatalogError> {
        let user = self.user().ok_or(CatalogError::UnauthenticatedAction)?;
        match &self.destination {
            Destination::Planet(name) if *name == offer.destination => {}
            _ => return Err(CatalogError::InvalidSelection(offer.destination.clone())),
        }

        let (product_name, space_agency) = if offer.exclusive {
            (
                format!("{} ({} Exclusive)", offer.product.name, offer.destination),
                local_courier(&offer.destination),
            )
        } else {
            (offer.product.name.clone(), offer.agency.name.clone())
        };

        Ok(OrderRequest {
            user_id: user.id,
            product_name,
            destination_planet: offer.destination.clone(),
            total_price_inr: to_display_currency(offer.total_price),
            space_agency,
            is_exclusive: offer.exclusive,
        })
    }

    /// Builds the order for an AI search result, shipped to its own target.
    ///
    /// The carrier is drawn from every agency; browse filters do not apply.
    /// A catalog without agencies falls back to the local courier.
    pub fn prepare_ai_purchase(
        &self,
        catalog: &Catalog,
        result: &AiSearchResult,
        rng: &mut dyn RandomSource,
    ) -> Result<OrderRequest, CatalogError> {
        let user = self.user().ok_or(CatalogError::UnauthenticatedAction)?;
        let planet = deliverable_planet(catalog, &result.target_planet)?;
        let space_agency = pick_agency(catalog.agencies(), rng)
            .map(|agency| agency.name.clone())
            .unwrap_or_else(|| local_courier(&planet.name));

        Ok(OrderRequest {
            user_id: user.id,
            product_name: result.product_query.clone(),
            destination_planet: planet.name.clone(),
            total_price_inr: to_display_currency(result.total_price),
            space_agency,
            is_exclusive: false,
        })
    }

    pub fn order_history_owner(&self) -> Result<UserId, CatalogError> {
        self.user()
            .map(|user| user.id)
            .ok_or(CatalogError::UnauthenticatedAction)
    }

    /// Validates an AI search before anything is sent to the backend.
    pub fn prepare_search(
        &mut self,
        catalog: &Catalog,
        query: &str,
        target_planet: &str,
    ) -> Result<SearchPlan, CatalogError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(CatalogError::EmptyQuery);
        }
        if is_sun(target_planet) {
            return Ok(SearchPlan::Blocked(SUN_NOTICE));
        }
        let planet = deliverable_planet(catalog, target_planet)?;
        let token = *self.search_token.get_or_insert_with(Uuid::new_v4);

        Ok(SearchPlan::Request(SearchRequest {
            product_query: query.to_string(),
            target_planet: planet.name.clone(),
            user_session: format!("user_{}", token.simple()),
        }))
    }
}

fn deliverable_planet<'a>(catalog: &'a Catalog, name: &str) -> Result<&'a Planet, CatalogError> {
    if is_sun(name) {
        return Err(CatalogError::InvalidSelection(name.to_string()));
    }
    catalog
        .planet(name.trim())
        .ok_or_else(|| CatalogError::InvalidSelection(name.to_string()))
}
