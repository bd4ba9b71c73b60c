use sqlx::SqlitePool;
use time::OffsetDateTime;

use crate::products::{
    query::{fold_case, ProductFilter, PRODUCT_SELECT},
    repo_types::{NewProduct, PriceLeader, PriceTotals, Product},
};

const RELATED_LIMIT: i64 = 4;

impl Product {
    pub async fn list(db: &SqlitePool, filter: &ProductFilter) -> sqlx::Result<Vec<Product>> {
        let mut qb = filter.build();
        qb.build_query_as::<Product>().fetch_all(db).await
    }

    pub async fn find_by_id(db: &SqlitePool, id: i64) -> sqlx::Result<Option<Product>> {
        sqlx::query_as::<_, Product>(&format!("{PRODUCT_SELECT} WHERE p.id = ?"))
            .bind(id)
            .fetch_optional(db)
            .await
    }

    pub async fn create(db: &SqlitePool, p: &NewProduct) -> sqlx::Result<i64> {
        sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO products
                   (name, description, name_folded, description_folded,
                    price, category_id, featured, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&p.name)
        .bind(&p.description)
        .bind(fold_case(&p.name))
        .bind(p.description.as_deref().map(fold_case))
        .bind(p.price)
        .bind(p.category_id)
        .bind(p.featured)
        .bind(OffsetDateTime::now_utc().unix_timestamp())
        .fetch_one(db)
        .await
    }

    /// Overwrite every editable field. Returns false when no such product exists.
    pub async fn replace(db: &SqlitePool, id: i64, p: &NewProduct) -> sqlx::Result<bool> {
        let res = sqlx::query(
            r#"
            UPDATE products
               SET name = ?, description = ?, name_folded = ?, description_folded = ?,
                   price = ?, category_id = ?, featured = ?
             WHERE id = ?
            "#,
        )
        .bind(&p.name)
        .bind(&p.description)
        .bind(fold_case(&p.name))
        .bind(p.description.as_deref().map(fold_case))
        .bind(p.price)
        .bind(p.category_id)
        .bind(p.featured)
        .bind(id)
        .execute(db)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    pub async fn delete(db: &SqlitePool, id: i64) -> sqlx::Result<bool> {
        let res = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(db)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    /// Other products of the same category, featured first.
    ///
    /// `None` when the product does not exist; empty when it has no category.
    pub async fn related(db: &SqlitePool, id: i64) -> sqlx::Result<Option<Vec<Product>>> {
        let category: Option<Option<i64>> =
            sqlx::query_scalar("SELECT category_id FROM products WHERE id = ?")
                .bind(id)
                .fetch_optional(db)
                .await?;

        let Some(category) = category else {
            return Ok(None);
        };
        let Some(category) = category else {
            return Ok(Some(Vec::new()));
        };

        let rows = sqlx::query_as::<_, Product>(&format!(
            "{PRODUCT_SELECT} WHERE p.category_id = ? AND p.id != ? \
             ORDER BY p.featured DESC, RANDOM() LIMIT ?"
        ))
        .bind(category)
        .bind(id)
        .bind(RELATED_LIMIT)
        .fetch_all(db)
        .await?;
        Ok(Some(rows))
    }

    pub async fn totals(db: &SqlitePool) -> sqlx::Result<PriceTotals> {
        sqlx::query_as::<_, PriceTotals>(
            r#"
            SELECT COUNT(*)                    AS count,
                   COALESCE(SUM(price), 0.0)   AS total,
                   COALESCE(AVG(price), 0.0)   AS average
              FROM products
            "#,
        )
        .fetch_one(db)
        .await
    }

    pub async fn most_expensive(db: &SqlitePool) -> sqlx::Result<Option<PriceLeader>> {
        sqlx::query_as::<_, PriceLeader>(
            "SELECT name, price FROM products ORDER BY price DESC, id ASC LIMIT 1",
        )
        .fetch_optional(db)
        .await
    }
}
