use serde::Deserialize;

/// Body of `POST /categories`.
#[derive(Debug, Default, Deserialize)]
pub struct CategoryRequest {
    #[serde(default, rename = "Nome", alias = "name")]
    pub name: Option<String>,
    #[serde(default, rename = "Slug", alias = "slug")]
    pub slug: Option<String>,
    #[serde(default, rename = "Descrizione", alias = "description")]
    pub description: Option<String>,
    #[serde(default, rename = "Icona", alias = "icon")]
    pub icon: Option<String>,
}
