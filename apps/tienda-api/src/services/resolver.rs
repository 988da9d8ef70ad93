//! # Catalog Resolver
//!
//! Turns a requested cart line into an authoritative line item.
//!
//! ```text
//! identifier ──► find_by_id ──► found? ──────────────────┐
//!                    │ no                                 │
//!                    ▼                                    ▼
//!  fallback name ──► find_by_name ──► found? ──► stock check ──► snapshot
//!                                       │ no          │ short
//!                                       ▼             ▼
//!                               ProductNotFound  InsufficientStock
//! ```
//!
//! The client never supplies the price: unit price, name and image are copied
//! from the catalog record at resolution time.

use tracing::debug;

use tienda_core::{CoreError, ResolvedLineItem};

use crate::ports::Catalog;
use crate::services::error::IntakeResult;

/// Resolves line items against a catalog.
pub struct CatalogResolver<'a, C> {
    catalog: &'a C,
}

impl<'a, C: Catalog> CatalogResolver<'a, C> {
    pub fn new(catalog: &'a C) -> Self {
        CatalogResolver { catalog }
    }

    /// Resolves one line item.
    ///
    /// ## Arguments
    /// * `identifier` - product id as sent by the client
    /// * `quantity` - requested units, already validated as positive
    /// * `fallback_name` - display name, tried as exact product name when the
    ///   id does not resolve
    pub async fn resolve(
        &self,
        identifier: &str,
        quantity: i64,
        fallback_name: Option<&str>,
    ) -> IntakeResult<ResolvedLineItem> {
        let fallback_name = fallback_name.map(str::trim).filter(|name| !name.is_empty());

        let mut product = self.catalog.find_by_id(identifier).await?;

        if product.is_none() {
            if let Some(name) = fallback_name {
                debug!(identifier = %identifier, name = %name, "Id did not resolve, trying name");
                product = self.catalog.find_by_name(name).await?;
            }
        }

        let Some(product) = product else {
            return Err(CoreError::ProductNotFound {
                name: fallback_name.unwrap_or(identifier).to_string(),
            }
            .into());
        };

        if !product.has_stock_for(quantity) {
            return Err(CoreError::InsufficientStock {
                name: product.name,
                available: product.stock_quantity,
                requested: quantity,
            }
            .into());
        }

        Ok(ResolvedLineItem::snapshot(&product, quantity)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::error::IntakeError;
    use crate::services::testing::{seed_product, setup};
    use tienda_core::{ProductImage, PLACEHOLDER_IMAGE_URL};

    #[tokio::test]
    async fn test_resolve_by_id_snapshots_catalog() {
        let db = setup().await;
        let mole = seed_product(&db, "Mole Poblano", 1000, 5).await;
        let catalog = db.products();

        let item = CatalogResolver::new(&catalog)
            .resolve(&mole.id, 2, Some("Some other label"))
            .await
            .unwrap();

        assert_eq!(item.product_id, mole.id);
        assert_eq!(item.name, "Mole Poblano");
        assert_eq!(item.unit_price.cents(), 1000);
        assert_eq!(item.line_total.cents(), 2000);
        assert_eq!(item.image_url, "https://cdn.example/Mole Poblano.jpg");
    }

    #[tokio::test]
    async fn test_resolve_falls_back_to_name() {
        let db = setup().await;
        let salsa = seed_product(&db, "Salsa Macha", 800, 3).await;
        let catalog = db.products();

        let item = CatalogResolver::new(&catalog)
            .resolve("legacy-sku-17", 1, Some("Salsa Macha"))
            .await
            .unwrap();

        assert_eq!(item.product_id, salsa.id);
    }

    #[tokio::test]
    async fn test_not_found_names_fallback_or_identifier() {
        let db = setup().await;
        let catalog = db.products();
        let resolver = CatalogResolver::new(&catalog);

        let err = resolver.resolve("p-404", 1, Some("Cajeta")).await.unwrap_err();
        assert!(matches!(
            err,
            IntakeError::Core(CoreError::ProductNotFound { ref name }) if name == "Cajeta"
        ));

        let err = resolver.resolve("p-404", 1, Some("   ")).await.unwrap_err();
        assert!(matches!(
            err,
            IntakeError::Core(CoreError::ProductNotFound { ref name }) if name == "p-404"
        ));
    }

    #[tokio::test]
    async fn test_inactive_product_is_not_found() {
        let db = setup().await;
        let rompope = seed_product(&db, "Rompope", 9900, 4).await;
        db.products().deactivate(&rompope.id).await.unwrap();
        let catalog = db.products();

        let err = CatalogResolver::new(&catalog)
            .resolve(&rompope.id, 1, Some("Rompope"))
            .await
            .unwrap_err();

        assert!(matches!(err, IntakeError::Core(CoreError::ProductNotFound { .. })));
    }

    #[tokio::test]
    async fn test_insufficient_stock_reports_available() {
        let db = setup().await;
        let mole = seed_product(&db, "Mole Poblano", 1000, 3).await;
        let catalog = db.products();

        let err = CatalogResolver::new(&catalog)
            .resolve(&mole.id, 5, None)
            .await
            .unwrap_err();

        match err {
            IntakeError::Core(CoreError::InsufficientStock {
                name,
                available,
                requested,
            }) => {
                assert_eq!(name, "Mole Poblano");
                assert_eq!(available, 3);
                assert_eq!(requested, 5);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_image_shapes() {
        let db = setup().await;
        let catalog = db.products();

        let mut structured = seed_product(&db, "Vainilla", 4500, 2).await;
        structured.id = tienda_db::generate_product_id();
        structured.name = "Vainilla Estructurada".to_string();
        structured.images = vec![ProductImage::Structured {
            url: "https://cdn.example/vainilla.jpg".to_string(),
            alt: None,
        }];
        catalog.insert(&structured).await.unwrap();

        let mut bare = structured.clone();
        bare.id = tienda_db::generate_product_id();
        bare.name = "Sin Imagen".to_string();
        bare.images = vec![];
        catalog.insert(&bare).await.unwrap();

        let resolver = CatalogResolver::new(&catalog);

        let item = resolver.resolve(&structured.id, 1, None).await.unwrap();
        assert_eq!(item.image_url, "https://cdn.example/vainilla.jpg");

        let item = resolver.resolve(&bare.id, 1, None).await.unwrap();
        assert_eq!(item.image_url, PLACEHOLDER_IMAGE_URL);
    }
}
