//! # Seed Data Generator
//!
//! Populates the catalog with demo products for development.
//!
//! ## Usage
//! ```bash
//! # Generate 50 products (default)
//! cargo run -p tienda-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p tienda-db --bin seed -- --count 500
//!
//! # Specify database path
//! cargo run -p tienda-db --bin seed -- --db ./data/tienda.db
//! ```
//!
//! Each product gets:
//! - A name from the pantry list, suffixed once the list wraps
//! - Price: $49.00 - $448.00
//! - Stock: 0 - 40 (some products are sold out on purpose)
//! - Images in both catalog shapes: bare URL strings and `{url, alt}` records

use chrono::Utc;
use std::env;
use tienda_core::{Money, Product, ProductImage};
use tienda_db::{generate_product_id, Database, DbConfig};

const PRODUCTS: &[&str] = &[
    "Mole Poblano",
    "Salsa Macha",
    "Cajeta de Celaya",
    "Chapulines Tostados",
    "Vainilla de Papantla",
    "Café de Chiapas",
    "Mezcal Espadín",
    "Chocolate de Oaxaca",
    "Tortillas de Maíz Azul",
    "Chile Ancho",
    "Chile Pasilla",
    "Rompope",
    "Miel de Yucatán",
    "Achiote",
    "Jamaica Seca",
    "Tamarindo Enchilado",
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 50;
    let mut db_path = "./data/tienda.db".to_string();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse()?;
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Usage: seed [--count N] [--db PATH]");
                return Ok(());
            }
            other => {
                return Err(format!("unknown argument: {other}").into());
            }
        }
        i += 1;
    }

    println!("Seeding {} products into {}", count, db_path);

    let db = Database::new(DbConfig::new(&db_path)).await?;
    let products = db.products();

    let before = products.count().await?;

    for seed in 0..count {
        products.insert(&generate_product(seed)).await?;
    }

    let after = products.count().await?;
    println!("  Active products: {} → {}", before, after);

    db.close().await;

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Generates a single demo product.
fn generate_product(seed: usize) -> Product {
    let now = Utc::now();

    let base = PRODUCTS[seed % PRODUCTS.len()];
    let round = seed / PRODUCTS.len();
    let name = if round == 0 {
        base.to_string()
    } else {
        format!("{} #{}", base, round + 1)
    };

    let price_cents = 4_900 + ((seed * 37) % 400) as i64 * 100;
    let stock_quantity = if seed % 7 == 0 { 0 } else { (seed % 41) as i64 };

    let slug = name.to_lowercase().replace([' ', '#'], "-");
    let images = match seed % 3 {
        0 => vec![ProductImage::Url(format!("https://cdn.tienda.mx/{slug}.jpg"))],
        1 => vec![ProductImage::Structured {
            url: format!("https://cdn.tienda.mx/{slug}.jpg"),
            alt: Some(name.clone()),
        }],
        _ => vec![],
    };

    Product {
        id: generate_product_id(),
        name,
        price: Money::from_cents(price_cents),
        images,
        stock_quantity,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}
