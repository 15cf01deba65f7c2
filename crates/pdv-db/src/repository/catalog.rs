//! # Catalog Repository
//!
//! Database operations for products and groups.
//!
//! The checkout path treats the catalog as read-only: it resolves
//! products into cart-line snapshots and never writes back through
//! here. Stock is mutated exclusively by the [`StockLedger`]; this
//! repository's `update_product` deliberately leaves `stock` alone.
//!
//! [`StockLedger`]: crate::repository::stock::StockLedger

use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use pdv_core::{Group, Product};

/// Repository for catalog database operations.
///
/// ## Usage
/// ```rust,ignore
/// let catalog = db.catalog();
/// let product = catalog.get_product("uuid-here").await?;
/// let all = catalog.list_products().await?;
/// ```
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_product(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, price_cents, group_id, min_stock, stock
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Lists all products, sorted by name.
    pub async fn list_products(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, price_cents, group_id, min_stock, stock
            FROM products
            ORDER BY name COLLATE NOCASE
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "listed products");
        Ok(products)
    }

    /// Lists all groups, sorted by name.
    pub async fn list_groups(&self) -> DbResult<Vec<Group>> {
        let groups = sqlx::query_as::<_, Group>(
            r#"
            SELECT id, name
            FROM groups
            ORDER BY name COLLATE NOCASE
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(groups)
    }

    /// Inserts a new group, returning it with its generated id.
    pub async fn insert_group(&self, name: &str) -> DbResult<Group> {
        let group = Group {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
        };

        debug!(name = %group.name, "inserting group");

        sqlx::query("INSERT INTO groups (id, name) VALUES (?1, ?2)")
            .bind(&group.id)
            .bind(&group.name)
            .execute(&self.pool)
            .await?;

        Ok(group)
    }

    /// Inserts a new product.
    ///
    /// The caller supplies everything but the id, which is generated
    /// here. Negative amounts are rejected by the schema CHECKs.
    pub async fn insert_product(&self, product: &Product) -> DbResult<Product> {
        let mut inserted = product.clone();
        if inserted.id.is_empty() {
            inserted.id = Uuid::new_v4().to_string();
        }

        debug!(name = %inserted.name, "inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (id, name, price_cents, group_id, min_stock, stock)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&inserted.id)
        .bind(&inserted.name)
        .bind(inserted.price_cents)
        .bind(&inserted.group_id)
        .bind(inserted.min_stock)
        .bind(inserted.stock)
        .execute(&self.pool)
        .await?;

        Ok(inserted)
    }

    /// Updates a product's catalog fields (name, price, group,
    /// threshold). Stock is NOT touched here.
    pub async fn update_product(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, "updating product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                price_cents = ?3,
                group_id = ?4,
                min_stock = ?5
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(product.price_cents)
        .bind(&product.group_id)
        .bind(product.min_stock)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(())
    }

    /// Counts products (for diagnostics).
    pub async fn count_products(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn cafe(group_id: Option<String>) -> Product {
        Product {
            id: String::new(),
            name: "Cafe Expresso".into(),
            price_cents: 990,
            group_id,
            min_stock: 5,
            stock: 10,
        }
    }

    #[tokio::test]
    async fn test_product_round_trip() {
        let db = test_db().await;
        let catalog = db.catalog();

        let group = catalog.insert_group("Bebidas").await.unwrap();
        let inserted = catalog.insert_product(&cafe(Some(group.id.clone()))).await.unwrap();
        assert!(!inserted.id.is_empty());

        let fetched = catalog.get_product(&inserted.id).await.unwrap().unwrap();
        assert_eq!(fetched, inserted);
        assert_eq!(fetched.group_id.as_deref(), Some(group.id.as_str()));

        assert!(catalog.get_product("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_products_sorted_case_insensitive() {
        let db = test_db().await;
        let catalog = db.catalog();

        for name in ["pastel", "Agua", "Bolo"] {
            let mut p = cafe(None);
            p.name = name.into();
            catalog.insert_product(&p).await.unwrap();
        }

        let names: Vec<String> = catalog
            .list_products()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Agua", "Bolo", "pastel"]);
    }

    #[tokio::test]
    async fn test_update_product_leaves_stock_alone() {
        let db = test_db().await;
        let catalog = db.catalog();

        let mut product = catalog.insert_product(&cafe(None)).await.unwrap();
        product.name = "Cafe Duplo".into();
        product.price_cents = 1200;
        product.stock = 999; // must be ignored
        catalog.update_product(&product).await.unwrap();

        let fetched = catalog.get_product(&product.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Cafe Duplo");
        assert_eq!(fetched.price_cents, 1200);
        assert_eq!(fetched.stock, 10);
    }

    #[tokio::test]
    async fn test_update_missing_product_is_not_found() {
        let db = test_db().await;
        let mut product = cafe(None);
        product.id = "ghost".into();

        let err = db.catalog().update_product(&product).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
