use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Category {
    #[serde(rename = "ID")]
    pub id: i64,
    #[serde(rename = "Nome")]
    pub name: String,
    #[serde(rename = "Slug")]
    pub slug: String,
    #[serde(rename = "Descrizione")]
    pub description: Option<String>,
    #[serde(rename = "Icona")]
    pub icon: Option<String>,
    pub product_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub icon: Option<String>,
}
