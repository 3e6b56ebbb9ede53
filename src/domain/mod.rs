//! Pricing and catalog logic lives here. Nothing in this module performs I/O.

pub mod entities;
pub mod error;
pub mod pricing;
pub mod query;
pub mod session;

pub use entities::{
    is_sun, AiPriceBreakdown, AiSearchResult, Agency, Catalog, OrderConfirmation, OrderRecord,
    OrderRequest, Planet, Product, User, UserId, SUN,
};
pub use error::CatalogError;
pub use pricing::{
    cost_breakdown, delivery_cost, estimated_delivery_time, format_display_amount, format_price,
    pick_agency, planet_emoji, to_display_currency, total_price, CostBreakdown, CostLine,
    FixedSource, RandomSource, RngSource, DELIVERY_COST_SHARES,
};
pub use query::{
    categories, compare_across_planets, exclusives_for, filter_agencies, filter_by_category,
    first_match, search_by_text, summarize_comparison, ComparisonSummary, PlanetQuote,
    ALL_CATEGORIES,
};
pub use session::{
    Attribution, AuthState, CatalogView, Credentials, Destination, DestinationChange, Listing,
    LoginForm, Offer, SearchPlan, SearchRequest, Session, SunNotice, SUN_NOTICE,
};
