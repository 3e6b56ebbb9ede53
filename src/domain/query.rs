//! Filtering, search and cross-planet comparison over the catalog.

use std::collections::HashSet;

use super::{
    entities::{Agency, Catalog, Planet, Product},
    pricing::{delivery_cost, total_price},
    CatalogError,
};

/// Category sentinel meaning "no filter".
pub const ALL_CATEGORIES: &str = "All";

/// Products of `category` in catalog order; everything for [`ALL_CATEGORIES`].
pub fn filter_by_category<'a>(products: &'a [Product], category: &str) -> Vec<&'a Product> {
    if category == ALL_CATEGORIES {
        return products.iter().collect();
    }
    products
        .iter()
        .filter(|product| product.category == category)
        .collect()
}

/// Case-insensitive substring search over name and description.
pub fn search_by_text<'a>(
    products: &'a [Product],
    query: &str,
) -> Result<Vec<&'a Product>, CatalogError> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Err(CatalogError::EmptyQuery);
    }

    Ok(products
        .iter()
        .filter(|product| {
            product.name.to_lowercase().contains(&needle)
                || product.description.to_lowercase().contains(&needle)
        })
        .collect())
}

/// The reference product for a price comparison: the first search hit.
pub fn first_match<'a>(
    products: &'a [Product],
    query: &str,
) -> Result<Option<&'a Product>, CatalogError> {
    Ok(search_by_text(products, query)?.into_iter().next())
}

/// One row of a cross-planet price comparison.
#[derive(Clone, Debug, PartialEq)]
pub struct PlanetQuote {
    pub planet: Planet,
    pub delivery_cost: f64,
    pub total_price: f64,
}

/// Prices `product` for every deliverable planet, in catalog order.
pub fn compare_across_planets(product: &Product, planets: &[Planet]) -> Vec<PlanetQuote> {
    planets
        .iter()
        .filter(|planet| !planet.is_sun())
        .map(|planet| PlanetQuote {
            planet: planet.clone(),
            delivery_cost: delivery_cost(product.base_price, planet),
            total_price: total_price(product, planet, false),
        })
        .collect()
}

/// Cheapest and dearest destinations of a comparison.
#[derive(Clone, Debug, PartialEq)]
pub struct ComparisonSummary {
    pub cheapest: PlanetQuote,
    pub most_expensive: PlanetQuote,
    /// Reference-currency difference between the two totals.
    pub savings: f64,
}

/// Picks the extremes of a comparison. Ties go to the earlier quote.
pub fn summarize_comparison(quotes: &[PlanetQuote]) -> Option<ComparisonSummary> {
    let (first, rest) = quotes.split_first()?;
    let mut cheapest = first;
    let mut most_expensive = first;
    for quote in rest {
        if quote.total_price < cheapest.total_price {
            cheapest = quote;
        }
        if quote.total_price > most_expensive.total_price {
            most_expensive = quote;
        }
    }

    Some(ComparisonSummary {
        cheapest: cheapest.clone(),
        most_expensive: most_expensive.clone(),
        savings: most_expensive.total_price - cheapest.total_price,
    })
}

pub fn exclusives_for<'a>(catalog: &'a Catalog, planet: &str) -> &'a [Product] {
    catalog
        .exclusive_groups()
        .find(|(name, _)| *name == planet)
        .map(|(_, products)| products)
        .unwrap_or(&[])
}

/// Agencies eligible for delivery attribution under an optional agency filter.
pub fn filter_agencies<'a>(agencies: &'a [Agency], agency: Option<&str>) -> Vec<&'a Agency> {
    match agency {
        None => agencies.iter().collect(),
        Some(name) => agencies.iter().filter(|entry| entry.name == name).collect(),
    }
}

/// Distinct categories in first-seen order.
pub fn categories(products: &[Product]) -> Vec<&str> {
    let mut seen = HashSet::new();
    products
        .iter()
        .map(|product| product.category.as_str())
        .filter(|category| seen.insert(*category))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(name: &str, category: &str, description: &str) -> Product {
        Product {
            name: name.to_string(),
            category: category.to_string(),
            base_price: 10.0,
            description: description.to_string(),
            emoji: String::new(),
            exclusive_to: None,
        }
    }

    fn sample_products() -> Vec<Product> {
        vec![
            product("iPhone 15", "Electronics", "Smartphone"),
            product("Latte", "Food & Beverages", "Coffee that freezes"),
            product("Echo Dot", "Electronics", "Smart speaker"),
            product("Sneakers", "Fashion", "Anti-gravity soles"),
        ]
    }

    fn names(products: &[&Product]) -> Vec<String> {
        products.iter().map(|p| p.name.clone()).collect()
    }

    #[test]
    fn all_category_returns_everything_in_order() {
        let products = sample_products();
        let filtered = filter_by_category(&products, ALL_CATEGORIES);
        assert_eq!(
            names(&filtered),
            vec!["iPhone 15", "Latte", "Echo Dot", "Sneakers"]
        );
    }

    #[test]
    fn category_filter_is_exact() {
        let products = sample_products();
        let filtered = filter_by_category(&products, "Electronics");
        assert_eq!(names(&filtered), vec!["iPhone 15", "Echo Dot"]);
        assert!(filter_by_category(&products, "electronics").is_empty());
        assert!(filter_by_category(&products, "Vehicles").is_empty());
    }

    #[test]
    fn search_matches_name_or_description_ignoring_case() {
        let products = sample_products();
        let hits = search_by_text(&products, "SMART").unwrap();
        assert_eq!(names(&hits), vec!["iPhone 15", "Echo Dot"]);

        let hits = search_by_text(&products, "coffee").unwrap();
        assert_eq!(names(&hits), vec!["Latte"]);
    }

    #[test]
    fn blank_search_is_rejected() {
        let products = sample_products();
        assert_eq!(search_by_text(&products, "   "), Err(CatalogError::EmptyQuery));
        assert_eq!(first_match(&products, ""), Err(CatalogError::EmptyQuery));
    }

    #[test]
    fn first_match_picks_catalog_order() {
        let products = sample_products();
        let hit = first_match(&products, "smart").unwrap().unwrap();
        assert_eq!(hit.name, "iPhone 15");
        assert!(first_match(&products, "tesla").unwrap().is_none());
    }

    #[test]
    fn comparison_skips_sun_and_keeps_order() {
        let planets = vec![
            Planet::new("Mercury", 0.39, 0.38),
            Planet::new("Sun", 0.0, 27.01),
            Planet::new("Mars", 1.5, 0.38),
        ];
        let quotes = compare_across_planets(&product("Widget", "Misc", ""), &planets);
        let order: Vec<_> = quotes.iter().map(|q| q.planet.name.as_str()).collect();
        assert_eq!(order, vec!["Mercury", "Mars"]);

        let mars = &quotes[1];
        assert!((mars.delivery_cost - 182.25).abs() < 1e-9);
        assert!((mars.total_price - 192.25).abs() < 1e-9);
    }

    #[test]
    fn summary_finds_extremes_and_savings() {
        let planets = vec![
            Planet::new("Mars", 1.5, 0.38),
            Planet::new("Moon", 0.0026, 0.17),
            Planet::new("Sun", 0.0, 27.01),
            Planet::new("Jupiter", 5.2, 2.36),
        ];
        let quotes = compare_across_planets(&product("Widget", "Misc", ""), &planets);
        let summary = summarize_comparison(&quotes).unwrap();

        assert_eq!(summary.cheapest.planet.name, "Moon");
        assert_eq!(summary.most_expensive.planet.name, "Jupiter");
        assert_eq!(
            summary.savings,
            summary.most_expensive.total_price - summary.cheapest.total_price
        );
        assert!(summary.savings > 0.0);
    }

    #[test]
    fn summary_of_identical_quotes_keeps_first_and_saves_nothing() {
        let planets = vec![Planet::new("A", 1.0, 1.0), Planet::new("B", 1.0, 1.0)];
        let quotes = compare_across_planets(&product("Widget", "Misc", ""), &planets);
        let summary = summarize_comparison(&quotes).unwrap();

        assert_eq!(summary.cheapest.planet.name, "A");
        assert_eq!(summary.most_expensive.planet.name, "A");
        assert_eq!(summary.savings, 0.0);
    }

    #[test]
    fn empty_comparison_has_no_summary() {
        assert!(summarize_comparison(&[]).is_none());
    }

    #[test]
    fn exclusives_lookup_defaults_to_empty() {
        let mut local = product("Red Dust", "Souvenirs", "");
        local.exclusive_to = Some("Mars".to_string());
        let catalog = Catalog::new(
            Vec::new(),
            vec![Planet::new("Mars", 1.52, 0.38), Planet::new("Venus", 0.72, 0.9)],
            Vec::new(),
            vec![("Mars".to_string(), vec![local])],
        )
        .unwrap();

        assert_eq!(exclusives_for(&catalog, "Mars").len(), 1);
        assert!(exclusives_for(&catalog, "Venus").is_empty());
        assert!(exclusives_for(&catalog, "Atlantis").is_empty());
    }

    #[test]
    fn agency_filter_narrows_pool() {
        let agencies: Vec<Agency> = ["NASA", "ESA"]
            .iter()
            .map(|name| Agency {
                name: name.to_string(),
                motto: String::new(),
                reliability: String::new(),
                delivery_time: String::new(),
                specialty: None,
            })
            .collect();

        assert_eq!(filter_agencies(&agencies, None).len(), 2);
        let only = filter_agencies(&agencies, Some("ESA"));
        assert_eq!(only.len(), 1);
        assert_eq!(only[0].name, "ESA");
        assert!(filter_agencies(&agencies, Some("CNSA")).is_empty());
    }

    #[test]
    fn categories_are_distinct_in_first_seen_order() {
        let products = sample_products();
        assert_eq!(
            categories(&products),
            vec!["Electronics", "Food & Beverages", "Fashion"]
        );
    }
}
