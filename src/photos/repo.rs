use sqlx::SqlitePool;

/// Store `bytes` as the product's photo, replacing any previous one.
///
/// Returns false when the product does not exist.
pub async fn set_photo(db: &SqlitePool, product_id: i64, bytes: &[u8]) -> sqlx::Result<bool> {
    let res = sqlx::query("UPDATE products SET photo = ? WHERE id = ?")
        .bind(bytes)
        .bind(product_id)
        .execute(db)
        .await?;
    Ok(res.rows_affected() > 0)
}

/// The stored photo, or `None` when the product or its photo is missing.
pub async fn get_photo(db: &SqlitePool, product_id: i64) -> sqlx::Result<Option<Vec<u8>>> {
    sqlx::query_scalar::<_, Vec<u8>>(
        "SELECT photo FROM products WHERE id = ? AND photo IS NOT NULL",
    )
    .bind(product_id)
    .fetch_optional(db)
    .await
}
