use serde::{Deserialize, Deserializer, Serialize};

/// Body of `POST /products` and `PUT /products/:id`.
#[derive(Debug, Default, Deserialize)]
pub struct ProductRequest {
    #[serde(default, rename = "Nome", alias = "name")]
    pub name: Option<String>,
    #[serde(default, rename = "Descrizione", alias = "description")]
    pub description: Option<String>,
    #[serde(default, rename = "Prezzo", alias = "price")]
    pub price: Option<f64>,
    #[serde(default, rename = "Categoria_ID", alias = "category_id")]
    pub category_id: Option<i64>,
    #[serde(
        default,
        rename = "Featured",
        alias = "featured",
        deserialize_with = "flag"
    )]
    pub featured: bool,
}

/// Accepts `true`/`false`, `0`/`1` and `null` (as false).
fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }
    Ok(match Option::<Flag>::deserialize(d)? {
        Some(Flag::Bool(b)) => b,
        Some(Flag::Int(n)) => n != 0,
        None => false,
    })
}

#[derive(Debug, Serialize)]
pub struct Created {
    pub success: bool,
    pub id: i64,
}
