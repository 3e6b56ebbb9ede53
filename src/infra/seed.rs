//! Bundled reference data for running without a backend.

use crate::domain::{Agency, Catalog, CatalogError, Planet, Product};

fn product(name: &str, emoji: &str, category: &str, base_price: f64, description: &str) -> Product {
    Product {
        name: name.to_string(),
        category: category.to_string(),
        base_price,
        description: description.to_string(),
        emoji: emoji.to_string(),
        exclusive_to: None,
    }
}

fn exclusive(planet: &str, mut item: Product) -> Product {
    item.exclusive_to = Some(planet.to_string());
    item
}

fn planet(name: &str, distance: f64, gravity: f64, atmosphere: &str, fun_fact: &str) -> Planet {
    Planet {
        atmosphere: Some(atmosphere.to_string()),
        fun_fact: Some(fun_fact.to_string()),
        ..Planet::new(name, distance, gravity)
    }
}

fn agency(
    name: &str,
    motto: &str,
    reliability: &str,
    delivery_time: &str,
    specialty: &str,
) -> Agency {
    Agency {
        name: name.to_string(),
        motto: motto.to_string(),
        reliability: reliability.to_string(),
        delivery_time: delivery_time.to_string(),
        specialty: Some(specialty.to_string()),
    }
}

pub fn seed_products() -> Vec<Product> {
    vec![
        product(
            "iPhone 15 Pro Max",
            "📱",
            "Electronics",
            1199.99,
            "Latest smartphone with space-grade aluminum. Warning: May not work in vacuum of space.",
        ),
        product(
            "Tesla Model S Plaid",
            "🚗",
            "Vehicles",
            89990.00,
            "Electric vehicle adapted for planetary surfaces. Includes magnetic wheels for low-gravity environments.",
        ),
        product(
            "Starbucks Venti Latte",
            "☕",
            "Food & Beverages",
            5.95,
            "Premium coffee beverage. May freeze instantly in space. Warming systems sold separately.",
        ),
        product(
            "Nintendo Switch OLED",
            "🎮",
            "Electronics",
            349.99,
            "Portable gaming console. Perfect for long space journeys. Battery life: 3 hours or 3 light-years.",
        ),
        product(
            "MacBook Pro M3",
            "💻",
            "Electronics",
            2399.99,
            "High-performance laptop with space-resistant screen. Cosmic ray damage not covered by warranty.",
        ),
        product(
            "Air Jordan 4 Retro",
            "👟",
            "Fashion",
            200.00,
            "Classic basketball shoes. Anti-gravity soles available for Jupiter deliveries at extra cost.",
        ),
        product(
            "Dominos Large Pizza",
            "🍕",
            "Food & Beverages",
            15.99,
            "Hot and fresh pizza. Delivered hot or your money back! (Heat retention in space not guaranteed)",
        ),
        product(
            "IKEA Billy Bookshelf",
            "📚",
            "Home & Garden",
            49.99,
            "Self-assembly furniture. Assembly instructions translated into 47 alien languages. Allen key included.",
        ),
        product(
            "Rolex Submariner",
            "⌚",
            "Fashion",
            8550.00,
            "Luxury timepiece. Synchronized with galactic standard time. Works underwater and in vacuum.",
        ),
        product(
            "Amazon Echo Dot",
            "🔊",
            "Electronics",
            49.99,
            "Smart speaker with Alexa. Now understands 12 alien languages. \"Alexa, what's the weather on Mars?\"",
        ),
        product(
            "Instant Ramen",
            "🍜",
            "Food & Beverages",
            0.99,
            "Quick and easy meal. Just add hot water (bring your own heat source to space).",
        ),
        product(
            "Dyson V15 Vacuum",
            "🌪️",
            "Home & Garden",
            749.99,
            "Powerful vacuum cleaner. Ironically useless in the vacuum of space. Great for spaceship interiors.",
        ),
    ]
}

pub fn seed_planets() -> Vec<Planet> {
    vec![
        planet("Mercury", 0.39, 0.38, "None (Extreme temperatures)", "Hot enough to melt lead!"),
        planet(
            "Venus",
            0.72,
            0.90,
            "Toxic (Sulfuric acid clouds)",
            "Surface pressure could crush a submarine!",
        ),
        planet(
            "Mars",
            1.52,
            0.38,
            "Thin (Mostly CO2)",
            "Home to the first interplanetary Starbucks!",
        ),
        planet(
            "Jupiter",
            5.20,
            2.36,
            "Dense (Crushing gas giant)",
            "Packages delivered to floating platforms only!",
        ),
        planet(
            "Saturn",
            9.58,
            0.92,
            "Dense (Beautiful but deadly)",
            "Ring delivery available for small packages!",
        ),
        planet(
            "Uranus",
            19.22,
            0.89,
            "Icy (Sideways rotation)",
            "The planet that makes everyone giggle!",
        ),
        planet(
            "Neptune",
            30.05,
            1.13,
            "Icy (Supersonic winds)",
            "Winds faster than the speed of sound!",
        ),
        planet("Pluto", 39.48, 0.07, "Thin (Very cold)", "Still a planet in our hearts!"),
        planet(
            "Sun",
            0.00,
            27.01,
            "Plasma (Nuclear fusion)",
            "Our delivery record: 0% success rate, 100% vaporization rate!",
        ),
        planet(
            "Moon",
            0.0026,
            0.17,
            "None (But great views)",
            "Cheese reserves confirmed to be fake!",
        ),
    ]
}

pub fn seed_agencies() -> Vec<Agency> {
    vec![
        agency(
            "SpaceX Mars Division",
            "Making Mars Great Again, One Package at a Time",
            "73% (When Elon tweets positively)",
            "6-9 months (Earth-Mars only)",
            "Reusable rockets, unreusable packages",
        ),
        agency(
            "NASA Planetary Logistics",
            "We Put the Science in Delivery Science",
            "94% (But very expensive)",
            "2-5 years (Includes scientific study)",
            "Peer-reviewed delivery receipts",
        ),
        agency(
            "Blue Origin Express",
            "Gradatim Ferociter (Step by Step, Package by Package)",
            "45% (Still figuring it out)",
            "8-12 years (Under development)",
            "Space tourism for your packages",
        ),
        agency(
            "Virgin Galactic Courier",
            "Your Package's Space Adventure Awaits",
            "67% (Weather dependent)",
            "3-6 months (Suborbital only)",
            "Luxury space experience for premium items",
        ),
        agency(
            "Roscosmos Reliable",
            "In Soviet Space, Package Delivers You",
            "89% (Built like a tank)",
            "4-8 months (Via Soyuz truck)",
            "Vodka-resistant packaging",
        ),
        agency(
            "JAXA Precision Delivery",
            "Precision, Politeness, and Planetary Packages",
            "97% (Extremely methodical)",
            "1-3 years (Worth the wait)",
            "Origami-folded packages",
        ),
        agency(
            "ESA European Express",
            "United in Delivery, Diverse in Delays",
            "82% (Bureaucracy slows us down)",
            "6 months - 2 years (Committee dependent)",
            "Multi-language delivery confirmations",
        ),
        agency(
            "CNSA Cosmic Courier",
            "The Great Wall of Space Delivery",
            "76% (Rapidly improving)",
            "3-7 months (Moon deliveries preferred)",
            "Bulk orders and space station construction",
        ),
    ]
}

pub fn seed_exclusives() -> Vec<(String, Vec<Product>)> {
    let group = |planet: &str, items: Vec<Product>| {
        let items: Vec<Product> = items.into_iter().map(|item| exclusive(planet, item)).collect();
        (planet.to_string(), items)
    };

    vec![
        group(
            "Mars",
            vec![
                product(
                    "Red Dust Snow Globe",
                    "🔴",
                    "Souvenirs",
                    24.99,
                    "Genuine Martian regolith in a pressurised dome. Shake gently.",
                ),
                product(
                    "Olympus Mons Climbing Kit",
                    "🧗",
                    "Sports",
                    1299.00,
                    "Everything needed for the tallest climb in the solar system. Oxygen not included.",
                ),
            ],
        ),
        group(
            "Moon",
            vec![product(
                "Lunar Cheese Sampler",
                "🧀",
                "Food & Beverages",
                12.50,
                "Certified not made of the Moon. Aged in low gravity for extra holes.",
            )],
        ),
        group(
            "Jupiter",
            vec![product(
                "Great Red Spot Umbrella",
                "☂️",
                "Fashion",
                399.00,
                "Rated for storms larger than Earth. Handle reinforced for 2.36g.",
            )],
        ),
    ]
}

/// The full bundled catalog, validated like any backend payload.
pub fn seed_catalog() -> Result<Catalog, CatalogError> {
    Catalog::new(
        seed_products(),
        seed_planets(),
        seed_agencies(),
        seed_exclusives(),
    )
}
