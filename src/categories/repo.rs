use sqlx::SqlitePool;
use time::OffsetDateTime;

use crate::categories::repo_types::{Category, NewCategory};

impl Category {
    /// All categories by name, each with the number of products filed under it.
    pub async fn list(db: &SqlitePool) -> sqlx::Result<Vec<Category>> {
        sqlx::query_as::<_, Category>(
            r#"
            SELECT c.id, c.name, c.slug, c.description, c.icon,
                   COUNT(p.id) AS product_count
              FROM categories c
              LEFT JOIN products p ON p.category_id = c.id
             GROUP BY c.id
             ORDER BY c.name ASC
            "#,
        )
        .fetch_all(db)
        .await
    }

    pub async fn create(db: &SqlitePool, c: &NewCategory) -> sqlx::Result<Category> {
        sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, slug, description, icon, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, name, slug, description, icon, 0 AS product_count
            "#,
        )
        .bind(&c.name)
        .bind(&c.slug)
        .bind(&c.description)
        .bind(&c.icon)
        .bind(OffsetDateTime::now_utc().unix_timestamp())
        .fetch_one(db)
        .await
    }

    /// Products of a deleted category keep existing, uncategorised.
    pub async fn delete(db: &SqlitePool, id: i64) -> sqlx::Result<bool> {
        let res = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(db)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::products::{
        repo::tests::widget,
        repo_types::{NewProduct, Product},
    };

    fn category(name: &str, slug: &str) -> NewCategory {
        NewCategory {
            name: name.into(),
            slug: slug.into(),
            description: None,
            icon: None,
        }
    }

    #[tokio::test]
    async fn list_counts_products() {
        let db = test_pool().await;
        let tools = Category::create(&db, &category("Tools", "tools")).await.unwrap();
        Category::create(&db, &category("Books", "books")).await.unwrap();
        for name in ["Hammer", "Saw"] {
            Product::create(
                &db,
                &NewProduct {
                    category_id: Some(tools.id),
                    ..widget(name, 1.0)
                },
            )
            .await
            .unwrap();
        }

        let all = Category::list(&db).await.unwrap();
        let summary: Vec<(&str, i64)> = all
            .iter()
            .map(|c| (c.name.as_str(), c.product_count))
            .collect();
        assert_eq!(summary, [("Books", 0), ("Tools", 2)]);
    }

    #[tokio::test]
    async fn duplicate_name_or_slug_is_unique_violation() {
        let db = test_pool().await;
        Category::create(&db, &category("Tools", "tools")).await.unwrap();

        for dup in [category("Tools", "other"), category("Other", "tools")] {
            match Category::create(&db, &dup).await {
                Err(sqlx::Error::Database(e)) => assert!(e.is_unique_violation()),
                other => panic!("expected unique violation, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn delete_detaches_products() {
        let db = test_pool().await;
        let tools = Category::create(&db, &category("Tools", "tools")).await.unwrap();
        let hammer = Product::create(
            &db,
            &NewProduct {
                category_id: Some(tools.id),
                ..widget("Hammer", 1.0)
            },
        )
        .await
        .unwrap();

        assert!(Category::delete(&db, tools.id).await.unwrap());
        assert!(!Category::delete(&db, tools.id).await.unwrap());

        let p = Product::find_by_id(&db, hammer).await.unwrap().unwrap();
        assert_eq!(p.category_id, None);
        assert_eq!(p.category_name, None);
    }
}
