//! Listing query for `GET /products`.
//!
//! Raw query-string values are parsed leniently into a [`ProductFilter`];
//! anything unparsable is dropped rather than rejected. Every caller-supplied
//! value reaches SQL as a bound parameter. The only text spliced into the
//! statement is the sort column and direction, and both come from fixed
//! allow-lists.

use serde::Deserialize;
use sqlx::{QueryBuilder, Sqlite};

/// Column list shared by every query returning [`Product`](super::repo_types::Product).
pub(crate) const PRODUCT_SELECT: &str = r#"
    SELECT p.id, p.name, p.description, p.price, p.featured, p.category_id,
           c.name AS category_name,
           p.photo IS NOT NULL AS has_photo,
           p.created_at
      FROM products p
      LEFT JOIN categories c ON c.id = p.category_id
"#;

/// Query string of `GET /products`, exactly as received.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListParams {
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub categoria_id: Option<String>,
    pub search: Option<String>,
    pub featured: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    #[default]
    Name,
    Price,
    CreatedAt,
}

impl SortField {
    /// Unknown names fall back to sorting by name.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "Nome" | "name" => Self::Name,
            "Prezzo" | "price" => Self::Price,
            "created_at" => Self::CreatedAt,
            _ => Self::Name,
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            Self::Name => "p.name",
            Self::Price => "p.price",
            Self::CreatedAt => "p.created_at",
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("desc") {
            Self::Desc
        } else {
            Self::Asc
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Typed listing filter.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ProductFilter {
    pub sort: SortField,
    pub order: SortOrder,
    pub category_id: Option<i64>,
    /// Raw search term, trimmed and non-empty.
    pub search: Option<String>,
    pub featured_only: bool,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

fn parse_price(raw: Option<&str>) -> Option<f64> {
    raw?.trim()
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite() && *p >= 0.0)
}

/// Case folding applied both to stored search columns and to search terms.
pub fn fold_case(text: &str) -> String {
    text.to_lowercase()
}

/// Escape `LIKE` metacharacters; pair with `ESCAPE '\'`.
pub fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len() + 2);
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

impl From<ProductListParams> for ProductFilter {
    fn from(p: ProductListParams) -> Self {
        Self {
            sort: p.sort_by.as_deref().map(SortField::parse).unwrap_or_default(),
            order: p.sort_order.as_deref().map(SortOrder::parse).unwrap_or_default(),
            category_id: p
                .categoria_id
                .as_deref()
                .and_then(|v| v.trim().parse::<i64>().ok()),
            search: p
                .search
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            featured_only: matches!(p.featured.as_deref(), Some("true") | Some("1")),
            min_price: parse_price(p.min_price.as_deref()),
            max_price: parse_price(p.max_price.as_deref()),
        }
    }
}

impl ProductFilter {
    pub fn build(&self) -> QueryBuilder<'static, Sqlite> {
        let mut qb = QueryBuilder::new(PRODUCT_SELECT);
        qb.push(" WHERE 1=1");

        if let Some(id) = self.category_id {
            qb.push(" AND p.category_id = ").push_bind(id);
        }
        if let Some(term) = &self.search {
            let pattern = format!("%{}%", escape_like(&fold_case(term)));
            qb.push(" AND (p.name_folded LIKE ")
                .push_bind(pattern.clone())
                .push(r" ESCAPE '\' OR p.description_folded LIKE ")
                .push_bind(pattern)
                .push(r" ESCAPE '\')");
        }
        if self.featured_only {
            qb.push(" AND p.featured = 1");
        }
        if let Some(min) = self.min_price {
            qb.push(" AND p.price >= ").push_bind(min);
        }
        if let Some(max) = self.max_price {
            qb.push(" AND p.price <= ").push_bind(max);
        }

        qb.push(" ORDER BY ")
            .push(self.sort.column())
            .push(" ")
            .push(self.order.keyword())
            .push(", p.id ASC");
        qb
    }
}
