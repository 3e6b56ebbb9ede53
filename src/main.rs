use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info, warn};

use spacebuy_catalog::domain::{
    categories, compare_across_planets, cost_breakdown, exclusives_for, first_match,
    format_display_amount, format_price, planet_emoji, summarize_comparison, Catalog,
    CatalogView, CostBreakdown, Destination, Listing, LoginForm, Offer, OrderRequest, Planet,
    PlanetQuote, RngSource, SearchPlan, Session, SunNotice, User, ALL_CATEGORIES, SUN_NOTICE,
};
use spacebuy_catalog::infra::{
    api::{CacheStatus, SpaceBuyClient},
    seed::seed_catalog,
};
use spacebuy_catalog::util::{
    config::AppConfig,
    logging,
    version::{version_label, APP_NAME},
};

#[derive(Parser)]
#[command(name = "spacebuy")]
#[command(about = "SpaceBuy - Earth products delivered across the solar system", long_about = None)]
struct Cli {
    /// Use the bundled catalog instead of the backend
    #[arg(long, global = true)]
    offline: bool,
    /// Backend base URL
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// Log filter, e.g. "debug" or "spacebuy_catalog=trace"
    #[arg(long, global = true)]
    log: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List priced offers for a destination
    Browse {
        #[arg(long)]
        planet: Option<String>,
        #[arg(long, default_value = ALL_CATEGORIES)]
        category: String,
        #[arg(long)]
        agency: Option<String>,
    },
    /// Compare the first matching product across planets
    Compare {
        query: String,
        /// Limit the comparison to these planets (repeatable)
        #[arg(long = "planet")]
        planets: Vec<String>,
    },
    /// Itemise the delivery cost of a product to one planet
    Breakdown {
        query: String,
        #[arg(long)]
        planet: Option<String>,
    },
    /// Show products sold only on one planet
    Exclusives { planet: String },
    /// Order a product for the current destination
    Buy {
        product: String,
        #[arg(long)]
        planet: Option<String>,
    },
    /// Sign in with the backend, optionally listing that user's orders
    Login {
        name: String,
        email: String,
        #[arg(long)]
        planet: Option<String>,
        #[arg(long)]
        orders: bool,
    },
    /// Show the logged-in user's order history
    Orders,
    /// Ask the backend's AI pricing for any product
    Search {
        query: String,
        #[arg(long)]
        planet: Option<String>,
        /// Place an order for the quoted price
        #[arg(long)]
        buy: bool,
    },
    /// List product categories
    Categories,
    /// List delivery destinations
    Planets,
    /// List delivery agencies
    Agencies,
    /// Check that the backend is reachable
    Health,
}

impl Cli {
    fn apply(&self, config: &mut AppConfig) {
        if self.offline {
            config.offline = true;
        }
        if let Some(url) = &self.api_url {
            config.api_base_url = url.clone();
        }
        if let Some(filter) = &self.log {
            config.log_filter = filter.clone();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = AppConfig::load().context("failed to load configuration")?;
    cli.apply(&mut config);
    logging::init(&config.log_filter);
    info!("{APP_NAME} {}", version_label());

    let client = SpaceBuyClient::with_base_url(&config.api_base_url)
        .context("invalid backend URL")?
        .with_ttl(Duration::from_secs(config.catalog_ttl_secs));
    let catalog = load_catalog(&client, &config).await?;

    let mut session = Session::start(&catalog, &config.default_destination);
    if config.auto_login {
        session.log_in(User::space_explorer());
    }
    let mut rng = RngSource::system();

    match cli.command {
        Commands::Browse {
            planet,
            category,
            agency,
        } => {
            if let Some(planet) = planet {
                session.select_destination(&catalog, &planet)?;
            }
            session.set_category(category);
            if let Some(name) = agency.as_deref() {
                if catalog.agency(name).is_none() {
                    warn!("no agency named {name}; Earth products will not be listed");
                }
            }
            session.set_agency_filter(agency);
            render_view(&session.view(&catalog, &mut rng));
        }
        Commands::Compare { query, planets } => match first_match(catalog.products(), &query)? {
            Some(product) => {
                let mut quotes = compare_across_planets(product, catalog.planets());
                if !planets.is_empty() {
                    quotes.retain(|quote| {
                        planets
                            .iter()
                            .any(|name| name.trim().eq_ignore_ascii_case(&quote.planet.name))
                    });
                }
                render_comparison(&product.display_name(), &quotes);
            }
            None => println!("No products match \"{query}\"."),
        },
        Commands::Breakdown { query, planet } => {
            if let Some(planet) = planet {
                session.select_destination(&catalog, &planet)?;
            }
            let Some(product) = first_match(catalog.products(), &query)? else {
                bail!("no products match \"{query}\"");
            };
            let planet = match session.destination() {
                Destination::Planet(name) => catalog
                    .planet(name)
                    .with_context(|| format!("unknown destination {name}"))?,
                Destination::Sun => {
                    render_notice(&SUN_NOTICE);
                    return Ok(());
                }
                Destination::Unselected => bail!("pick a destination with --planet"),
            };
            render_breakdown(&product.display_name(), planet, &cost_breakdown(product, planet));
        }
        Commands::Exclusives { planet } => {
            let products = exclusives_for(&catalog, &planet);
            if products.is_empty() {
                println!("No exclusive products on {planet} yet.");
            }
            for product in products {
                println!(
                    "{} - {} ({})",
                    product.display_name(),
                    format_price(product.base_price),
                    product.description
                );
            }
        }
        Commands::Buy { product, planet } => {
            if let Some(planet) = planet {
                session.select_destination(&catalog, &planet)?;
            }
            let view = session.view(&catalog, &mut rng);
            if let CatalogView::Blocked(notice) = &view {
                render_notice(notice);
                return Ok(());
            }
            let Some(offer) = find_offer(&view, &product) else {
                bail!("\"{product}\" is not on sale for this destination");
            };
            let order = session.prepare_purchase(offer)?;
            submit_order(&client, &config, &order).await?;
        }
        Commands::Login {
            name,
            email,
            planet,
            orders,
        } => {
            let credentials = LoginForm {
                name,
                email,
                favorite_planet: planet,
            }
            .validate()?;
            if config.offline {
                bail!("login needs the backend; drop --offline");
            }
            let user = client.login(&credentials).await?;
            println!("👋 Welcome, {} ({})", user.name, user.loyalty_level);
            session.log_in(user);
            if orders {
                show_orders(&client, &config, &session).await?;
            }
        }
        Commands::Orders => show_orders(&client, &config, &session).await?,
        Commands::Search { query, planet, buy } => {
            let target = planet
                .or_else(|| session.destination().name().map(str::to_string))
                .unwrap_or_else(|| config.default_destination.clone());
            match session.prepare_search(&catalog, &query, &target)? {
                SearchPlan::Blocked(notice) => render_notice(&notice),
                SearchPlan::Request(request) => {
                    if config.offline {
                        bail!("AI search needs the backend; drop --offline");
                    }
                    let result = client.ai_search(&request).await?;
                    let breakdown = result.breakdown();
                    println!("{} to {}", result.product_query, result.target_planet);
                    println!("  {}", result.product_description);
                    println!("  base      {}", format_price(breakdown.base_price));
                    println!("  delivery  {}", format_price(breakdown.delivery_cost));
                    println!("  total     {}", format_price(breakdown.total_price));
                    println!("  {}", result.reasoning);
                    if buy {
                        let order = session.prepare_ai_purchase(&catalog, &result, &mut rng)?;
                        submit_order(&client, &config, &order).await?;
                    }
                }
            }
        }
        Commands::Categories => {
            println!("{ALL_CATEGORIES}");
            for category in categories(catalog.products()) {
                println!("{category}");
            }
        }
        Commands::Planets => {
            for planet in catalog.planets() {
                println!(
                    "{} {:<8} {:>6} AU  {:>5}g  {}",
                    planet_emoji(&planet.name),
                    planet.name,
                    planet.distance,
                    planet.gravity,
                    planet.fun_fact.as_deref().unwrap_or_default()
                );
            }
        }
        Commands::Agencies => {
            for agency in catalog.agencies() {
                println!("{} - \"{}\"", agency.name, agency.motto);
                println!("    {} | {}", agency.reliability, agency.delivery_time);
            }
        }
        Commands::Health => {
            if client.health().await? {
                println!("backend healthy at {}", config.api_base_url);
            } else {
                println!("backend at {} reports problems", config.api_base_url);
            }
        }
    }

    Ok(())
}

async fn load_catalog(client: &SpaceBuyClient, config: &AppConfig) -> Result<Catalog> {
    if config.offline {
        return Ok(seed_catalog()?);
    }
    match client.get_catalog().await {
        Ok(payload) => {
            let age = payload.fetched_at.elapsed().unwrap_or_default();
            debug!(status = ?payload.status, age_secs = age.as_secs(), "catalog ready");
            if payload.status == CacheStatus::Stale {
                warn!("showing a catalog fetched {}s ago", age.as_secs());
            }
            Ok(payload.data)
        }
        Err(error) => {
            warn!("backend unavailable ({error}); using bundled catalog");
            Ok(seed_catalog()?)
        }
    }
}

async fn show_orders(
    client: &SpaceBuyClient,
    config: &AppConfig,
    session: &Session,
) -> Result<()> {
    let user_id = session.order_history_owner()?;
    if config.offline {
        bail!("order history needs the backend; drop --offline");
    }
    let orders = client.get_orders(user_id).await?;
    if orders.is_empty() {
        println!("No orders yet.");
    }
    for order in orders {
        println!(
            "{} {} -> {} {} [{}] {}",
            order.order_id,
            order.product_name,
            order.destination_planet,
            format_display_amount(order.total_price_inr),
            order.status,
            order
                .created_at
                .map(|at| at.to_string())
                .unwrap_or_default(),
        );
    }
    Ok(())
}

async fn submit_order(
    client: &SpaceBuyClient,
    config: &AppConfig,
    order: &OrderRequest,
) -> Result<()> {
    if config.offline {
        println!(
            "Offline: would order {} to {} via {} for {}",
            order.product_name,
            order.destination_planet,
            order.space_agency,
            format_display_amount(order.total_price_inr)
        );
        return Ok(());
    }
    let confirmation = client.create_order(order).await?;
    println!("🚀 Order {} placed!", confirmation.order_id);
    println!("   Tracking: {}", confirmation.tracking_number);
    if let Some(eta) = confirmation.estimated_delivery_time {
        println!("   Estimated delivery: {eta}");
    }
    Ok(())
}

fn render_comparison(label: &str, quotes: &[PlanetQuote]) {
    println!("{label} across the solar system");
    for quote in quotes {
        println!(
            "  {} {:<10} delivery {:>16}  total {:>16}",
            planet_emoji(&quote.planet.name),
            quote.planet.name,
            format_price(quote.delivery_cost),
            format_price(quote.total_price),
        );
    }
    let Some(summary) = summarize_comparison(quotes) else {
        return;
    };
    println!(
        "🏆 Cheapest: {} - {}",
        summary.cheapest.planet.name,
        format_price(summary.cheapest.total_price)
    );
    println!(
        "💸 Most expensive: {} - {}",
        summary.most_expensive.planet.name,
        format_price(summary.most_expensive.total_price)
    );
    if summary.savings > 0.0 {
        println!(
            "💡 You could save {} by choosing {} over {}!",
            format_price(summary.savings),
            summary.cheapest.planet.name,
            summary.most_expensive.planet.name
        );
    }
}

fn render_breakdown(label: &str, planet: &Planet, breakdown: &CostBreakdown) {
    println!(
        "💸 {label} to {} ({} AU, {}g)",
        planet.name, planet.distance, planet.gravity
    );
    println!("  {:<32} {:>16}", "Base Product Price", format_price(breakdown.base_price));
    for line in &breakdown.components {
        println!("  {:<32} {:>16}", line.label, format_price(line.amount));
    }
    println!("  {:<32} {:>16}", "TOTAL PRICE", format_price(breakdown.total_price));
}

fn find_offer<'a>(view: &'a CatalogView, name: &str) -> Option<&'a Offer> {
    let needle = name.trim().to_lowercase();
    view.offers()
        .find(|offer| offer.product.name.to_lowercase() == needle)
}

fn render_notice(notice: &SunNotice) {
    println!("☀️  {}", notice.headline);
    println!("   {}", notice.message);
}

fn render_view(view: &CatalogView) {
    match view {
        CatalogView::NoDestination => println!("Pick a destination with --planet."),
        CatalogView::Blocked(notice) => render_notice(notice),
        CatalogView::Listing(listing) => render_listing(listing),
    }
}

fn render_listing(listing: &Listing) {
    let planet = &listing.planet;
    println!(
        "{} Delivering to {} ({} AU, {}g) - transit about {}",
        planet_emoji(&planet.name),
        planet.name,
        planet.distance,
        planet.gravity,
        listing.transit_estimate
    );
    if listing.earth_offers.is_empty() {
        println!("  No Earth products match the current filters.");
    }
    for offer in &listing.earth_offers {
        println!(
            "  {} {:<24} {:>16}  via {}",
            offer.product.emoji, offer.product.name, offer.display_price, offer.agency.name
        );
    }
    if !listing.exclusive_offers.is_empty() {
        println!("  {} exclusives:", planet.name);
        for offer in &listing.exclusive_offers {
            println!(
                "  {} {:<24} {:>16}  via {}",
                offer.product.emoji, offer.product.name, offer.display_price, offer.agency.name
            );
        }
    }
}
