use serde::Serialize;
use sqlx::FromRow;

/// Product row joined with its category name.
///
/// Serialized with the catalog's established wire names.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Product {
    #[serde(rename = "ID")]
    pub id: i64,
    #[serde(rename = "Nome")]
    pub name: String,
    #[serde(rename = "Descrizione")]
    pub description: Option<String>,
    #[serde(rename = "Prezzo")]
    pub price: f64,
    #[serde(rename = "Featured")]
    pub featured: bool,
    #[serde(rename = "Categoria_ID")]
    pub category_id: Option<i64>,
    #[serde(rename = "Categoria_Nome")]
    pub category_name: Option<String>,
    #[serde(rename = "hasFoto")]
    pub has_photo: bool,
    pub created_at: i64, // unix seconds
}

/// Validated product fields, ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub category_id: Option<i64>,
    pub featured: bool,
}

/// Name and price of the priciest product, for `/stats`.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PriceLeader {
    #[serde(rename = "Nome")]
    pub name: String,
    #[serde(rename = "Prezzo")]
    pub price: f64,
}

#[derive(Debug, Clone, Copy, FromRow)]
pub struct PriceTotals {
    pub count: i64,
    pub total: f64,
    pub average: f64,
}
