//! Delivery pricing, display formatting and delivery attribution.
//!
//! Everything here is pure; randomness comes in through [`RandomSource`].

use rand::{
    rngs::{StdRng, ThreadRng},
    Rng, SeedableRng,
};

use super::entities::{Agency, Planet, Product};

/// Flat surcharge factor applied before distance and gravity scaling.
pub const DELIVERY_MULTIPLIER: f64 = 5.0;
/// Reference currency (USD) to display currency (INR).
pub const DISPLAY_RATE: f64 = 83.0;
pub const CURRENCY_GLYPH: &str = "₹";

const KM_PER_AU: f64 = 149_597_870.7;
const CARGO_SPEED_KM_S: f64 = 20.0;
const PROCESSING_DAYS: (u32, u32) = (30, 90);

/// Cost of shipping an Earth product worth `base_price` to `planet`.
///
/// `base_price * 5 * distance² * (|gravity - 1| + 1)`. Quadratic in distance,
/// and every deviation from Earth gravity (lighter or heavier) costs extra.
pub fn delivery_cost(base_price: f64, planet: &Planet) -> f64 {
    let distance_factor = planet.distance.powi(2);
    let gravity_factor = (planet.gravity - 1.0).abs() + 1.0;
    base_price * DELIVERY_MULTIPLIER * distance_factor * gravity_factor
}

/// Exclusives are delivered locally and cost exactly their base price.
pub fn total_price(product: &Product, planet: &Planet, is_exclusive: bool) -> f64 {
    if is_exclusive {
        product.base_price
    } else {
        product.base_price + delivery_cost(product.base_price, planet)
    }
}

/// How the delivery cost is itemised. The shares sum to one.
pub const DELIVERY_COST_SHARES: [(&str, f64); 6] = [
    ("Basic Interplanetary Shipping", 0.15),
    ("Rocket Fuel (Premium Grade)", 0.35),
    ("Insurance", 0.20),
    ("Hazard Pay for Crew", 0.15),
    ("Spaceship Maintenance", 0.10),
    ("Galactic Bureaucracy Fee", 0.05),
];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CostLine {
    pub label: &'static str,
    pub amount: f64,
}

/// Itemised price of one product delivered to one planet.
#[derive(Clone, Debug, PartialEq)]
pub struct CostBreakdown {
    pub base_price: f64,
    pub delivery_cost: f64,
    pub components: Vec<CostLine>,
    pub total_price: f64,
}

/// Splits the delivery cost of `product` to `planet` into its components.
/// Exclusives have no delivery cost, so every component is zero.
pub fn cost_breakdown(product: &Product, planet: &Planet) -> CostBreakdown {
    let exclusive = product.is_exclusive();
    let delivery = if exclusive {
        0.0
    } else {
        delivery_cost(product.base_price, planet)
    };
    let components = DELIVERY_COST_SHARES
        .iter()
        .map(|&(label, share)| CostLine {
            label,
            amount: delivery * share,
        })
        .collect();

    CostBreakdown {
        base_price: product.base_price,
        delivery_cost: delivery,
        components,
        total_price: total_price(product, planet, exclusive),
    }
}

pub fn to_display_currency(price: f64) -> f64 {
    price * DISPLAY_RATE
}

/// Renders a reference-currency amount in display currency, e.g. `₹15,957`.
///
/// Rounds half away from zero and groups digits the Indian way
/// (`₹10,24,635`).
pub fn format_price(price: f64) -> String {
    format_display_amount(to_display_currency(price))
}

/// Formats an amount that is already in display currency.
pub fn format_display_amount(amount: f64) -> String {
    let rounded = amount.round();
    if !rounded.is_finite() {
        return format!("{CURRENCY_GLYPH}{rounded}");
    }

    let digits = format!("{:.0}", rounded.abs());
    let grouped = group_digits(&digits);
    if rounded < 0.0 {
        format!("-{CURRENCY_GLYPH}{grouped}")
    } else {
        format!("{CURRENCY_GLYPH}{grouped}")
    }
}

fn group_digits(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups = Vec::with_capacity(head.len() / 2 + 1);
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{},{tail}", groups.join(","))
}

/// Source of randomness for agency attribution and transit jitter.
pub trait RandomSource {
    /// Uniform index in `0..len`. Callers never pass zero.
    fn pick_index(&mut self, len: usize) -> usize;
    /// Uniform integer in `low..=high`.
    fn between(&mut self, low: u32, high: u32) -> u32;
}

/// Adapter turning any `rand` generator into a [`RandomSource`].
#[derive(Clone, Debug)]
pub struct RngSource<R>(R);

impl RngSource<ThreadRng> {
    pub fn system() -> Self {
        Self(rand::thread_rng())
    }
}

impl RngSource<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> RandomSource for RngSource<R> {
    fn pick_index(&mut self, len: usize) -> usize {
        self.0.gen_range(0..len)
    }

    fn between(&mut self, low: u32, high: u32) -> u32 {
        self.0.gen_range(low..=high)
    }
}

/// Always makes the same choice. Out-of-range values are clamped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FixedSource {
    pub index: usize,
    pub value: u32,
}

impl RandomSource for FixedSource {
    fn pick_index(&mut self, len: usize) -> usize {
        self.index.min(len.saturating_sub(1))
    }

    fn between(&mut self, low: u32, high: u32) -> u32 {
        self.value.clamp(low, high)
    }
}

pub fn pick_agency<'a>(agencies: &'a [Agency], rng: &mut dyn RandomSource) -> Option<&'a Agency> {
    if agencies.is_empty() {
        return None;
    }
    agencies.get(rng.pick_index(agencies.len()))
}

/// Rough door-to-door time for an Earth shipment.
///
/// Cargo cruises at 20 km/s, the trip is budgeted both ways, and the depot
/// adds 30 to 90 days of processing.
pub fn estimated_delivery_time(planet: &Planet, rng: &mut dyn RandomSource) -> String {
    let travel_days = planet.distance * KM_PER_AU / CARGO_SPEED_KM_S / 86_400.0;
    let processing = rng.between(PROCESSING_DAYS.0, PROCESSING_DAYS.1);
    let total_days = travel_days * 2.0 + f64::from(processing);

    if total_days < 365.0 {
        format!("{} days", total_days as u64)
    } else {
        let years = total_days / 365.0;
        if years < 2.0 {
            format!("{years:.1} year")
        } else {
            format!("{years:.1} years")
        }
    }
}

pub fn planet_emoji(name: &str) -> &'static str {
    match name.to_ascii_lowercase().as_str() {
        "mercury" => "☿️",
        "venus" => "♀️",
        "earth" => "🌍",
        "mars" => "🔴",
        "jupiter" | "saturn" => "🪐",
        "uranus" => "🟦",
        "neptune" => "🔵",
        "pluto" => "⚫",
        "sun" => "☀️",
        "moon" => "🌙",
        _ => "🪐",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mars() -> Planet {
        Planet::new("Mars", 1.5, 0.38)
    }

    fn product(base_price: f64) -> Product {
        Product {
            name: "Widget".to_string(),
            category: "Electronics".to_string(),
            base_price,
            description: String::new(),
            emoji: String::new(),
            exclusive_to: None,
        }
    }

    fn agency(name: &str) -> Agency {
        Agency {
            name: name.to_string(),
            motto: String::new(),
            reliability: String::new(),
            delivery_time: String::new(),
            specialty: None,
        }
    }

    #[test]
    fn mars_delivery_matches_worked_example() {
        let cost = delivery_cost(10.0, &mars());
        assert!((cost - 182.25).abs() < 1e-9, "cost was {cost}");

        let total = total_price(&product(10.0), &mars(), false);
        assert!((total - 192.25).abs() < 1e-9, "total was {total}");
    }

    #[test]
    fn heavier_and_lighter_worlds_cost_the_same_deviation() {
        let light = Planet::new("Light", 2.0, 0.5);
        let heavy = Planet::new("Heavy", 2.0, 1.5);
        assert_eq!(delivery_cost(3.0, &light), delivery_cost(3.0, &heavy));
    }

    #[test]
    fn free_products_ship_for_free() {
        assert_eq!(delivery_cost(0.0, &Planet::new("Pluto", 39.48, 0.07)), 0.0);
    }

    #[test]
    fn breakdown_itemises_mars_delivery() {
        let breakdown = cost_breakdown(&product(10.0), &mars());
        assert_eq!(breakdown.base_price, 10.0);
        assert!((breakdown.delivery_cost - 182.25).abs() < 1e-9);
        assert!((breakdown.total_price - 192.25).abs() < 1e-9);

        let labels: Vec<_> = breakdown.components.iter().map(|line| line.label).collect();
        assert_eq!(labels[1], "Rocket Fuel (Premium Grade)");
        assert_eq!(labels.len(), 6);
        let fuel = breakdown.components[1].amount;
        assert!((fuel - 182.25 * 0.35).abs() < 1e-9);
    }

    #[test]
    fn breakdown_shares_cover_whole_delivery_cost() {
        let shares: f64 = DELIVERY_COST_SHARES.iter().map(|(_, share)| share).sum();
        assert!((shares - 1.0).abs() < 1e-12);
    }

    #[test]
    fn exclusive_breakdown_has_no_delivery() {
        let mut local = product(4.0);
        local.exclusive_to = Some("Mars".to_string());
        let breakdown = cost_breakdown(&local, &mars());
        assert_eq!(breakdown.delivery_cost, 0.0);
        assert_eq!(breakdown.total_price, 4.0);
        assert!(breakdown.components.iter().all(|line| line.amount == 0.0));
    }

    #[test]
    fn format_price_converts_and_prefixes() {
        assert_eq!(format_price(1.0), "₹83");
        assert_eq!(format_price(0.0), "₹0");
        assert_eq!(format_price(192.25), "₹15,957");
    }

    #[test]
    fn format_price_uses_indian_grouping() {
        assert_eq!(format_price(12_345.0), "₹10,24,635");
        assert_eq!(format_price(100_000.0), "₹83,00,000");
        assert_eq!(format_price(1_204_819.28), "₹10,00,00,000");
    }

    #[test]
    fn format_price_rounds_half_away_from_zero() {
        assert_eq!(format_display_amount(0.5), "₹1");
        assert_eq!(format_display_amount(2.5), "₹3");
        assert_eq!(format_display_amount(-2.5), "-₹3");
        assert_eq!(format_display_amount(1_999.49), "₹1,999");
    }

    #[test]
    fn digit_grouping_edges() {
        assert_eq!(group_digits("7"), "7");
        assert_eq!(group_digits("999"), "999");
        assert_eq!(group_digits("1000"), "1,000");
        assert_eq!(group_digits("12345"), "12,345");
        assert_eq!(group_digits("123456"), "1,23,456");
    }

    #[test]
    fn pick_agency_handles_empty_pool() {
        let mut rng = FixedSource::default();
        assert!(pick_agency(&[], &mut rng).is_none());
    }

    #[test]
    fn pick_agency_uses_injected_source() {
        let agencies = vec![agency("NASA"), agency("ESA"), agency("JAXA")];
        let mut rng = FixedSource { index: 1, value: 0 };
        assert_eq!(pick_agency(&agencies, &mut rng).unwrap().name, "ESA");

        let mut clamped = FixedSource { index: 42, value: 0 };
        assert_eq!(pick_agency(&agencies, &mut clamped).unwrap().name, "JAXA");
    }

    #[test]
    fn seeded_pick_always_lands_in_pool() {
        let agencies = vec![agency("NASA"), agency("ESA")];
        let mut rng = RngSource::seeded(7);
        for _ in 0..50 {
            let picked = pick_agency(&agencies, &mut rng).unwrap();
            assert!(agencies.contains(picked));
        }
    }

    #[test]
    fn delivery_time_for_nearby_and_distant_worlds() {
        let mut rng = FixedSource { index: 0, value: 30 };
        let moon = Planet::new("Moon", 0.0026, 0.17);
        assert_eq!(estimated_delivery_time(&moon, &mut rng), "30 days");

        let neptune = Planet::new("Neptune", 30.05, 1.13);
        let estimate = estimated_delivery_time(&neptune, &mut rng);
        assert!(estimate.ends_with("years"), "estimate was {estimate}");
    }

    #[test]
    fn processing_days_are_clamped_to_window() {
        let mut rng = FixedSource { index: 0, value: 500 };
        let moon = Planet::new("Moon", 0.0026, 0.17);
        assert_eq!(estimated_delivery_time(&moon, &mut rng), "90 days");
    }

    #[test]
    fn planet_emoji_falls_back() {
        assert_eq!(planet_emoji("MARS"), "🔴");
        assert_eq!(planet_emoji("Vulcan"), "🪐");
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 500,
                ..ProptestConfig::default()
            })]

            /// Property: delivery cost follows the published formula.
            #[test]
            fn delivery_cost_matches_formula(
                base in 0.0f64..100_000.0,
                distance in 0.001f64..50.0,
                gravity in 0.01f64..30.0,
            ) {
                let planet = Planet::new("P", distance, gravity);
                let expected = base * 5.0 * distance.powi(2) * ((gravity - 1.0).abs() + 1.0);
                prop_assert_eq!(delivery_cost(base, &planet), expected);
            }

            /// Property: farther never means cheaper at fixed gravity.
            #[test]
            fn delivery_cost_monotonic_in_distance(
                base in 0.0f64..100_000.0,
                near in 0.001f64..50.0,
                extra in 0.0f64..50.0,
                gravity in 0.01f64..30.0,
            ) {
                let close = Planet::new("Close", near, gravity);
                let far = Planet::new("Far", near + extra, gravity);
                prop_assert!(delivery_cost(base, &close) <= delivery_cost(base, &far));
            }

            /// Property: exclusives always cost their base price.
            #[test]
            fn exclusives_bypass_delivery(
                base in 0.0f64..100_000.0,
                distance in 0.001f64..50.0,
                gravity in 0.01f64..30.0,
            ) {
                let planet = Planet::new("P", distance, gravity);
                prop_assert_eq!(total_price(&product(base), &planet, true), base);
            }

            /// Property: itemised components add back up to the delivery cost.
            #[test]
            fn breakdown_components_sum_to_delivery(
                base in 0.0f64..100_000.0,
                distance in 0.001f64..50.0,
                gravity in 0.01f64..30.0,
            ) {
                let planet = Planet::new("P", distance, gravity);
                let breakdown = cost_breakdown(&product(base), &planet);
                let sum: f64 = breakdown.components.iter().map(|line| line.amount).sum();
                let tolerance = 1e-9 * breakdown.delivery_cost.max(1.0);
                prop_assert!((sum - breakdown.delivery_cost).abs() <= tolerance);
            }

            /// Property: formatting is stable and always glyph-prefixed.
            #[test]
            fn format_price_is_deterministic(price in 0.0f64..1.0e9) {
                let first = format_price(price);
                prop_assert!(first.starts_with(CURRENCY_GLYPH));
                prop_assert_eq!(first, format_price(price));
            }
        }
    }
}
