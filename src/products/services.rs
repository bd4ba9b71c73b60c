use crate::{
    error::{AppError, AppResult},
    products::{dto::ProductRequest, repo_types::NewProduct},
};

pub const MAX_NAME_CHARS: usize = 40;
pub const MAX_DESCRIPTION_CHARS: usize = 1000;

/// Turn a request body into a writable product, or name the first bad field.
pub fn validate(req: ProductRequest) -> AppResult<NewProduct> {
    let name = req.name.as_deref().map(str::trim).unwrap_or_default();
    if name.is_empty() {
        return Err(AppError::validation("Nome", "name is required"));
    }
    if name.chars().count() > MAX_NAME_CHARS {
        return Err(AppError::validation(
            "Nome",
            format!("name must be at most {MAX_NAME_CHARS} characters"),
        ));
    }

    let description = req
        .description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());
    if let Some(d) = &description {
        if d.chars().count() > MAX_DESCRIPTION_CHARS {
            return Err(AppError::validation(
                "Descrizione",
                format!("description must be at most {MAX_DESCRIPTION_CHARS} characters"),
            ));
        }
    }

    let price = match req.price {
        Some(p) if p.is_finite() && p >= 0.0 => p,
        _ => {
            return Err(AppError::validation(
                "Prezzo",
                "price must be a non-negative number",
            ))
        }
    };

    Ok(NewProduct {
        name: name.to_string(),
        description,
        price,
        // 0 is what clients send for "no category"
        category_id: req.category_id.filter(|id| *id > 0),
        featured: req.featured,
    })
}

/// A product write failed because `Categoria_ID` names no category.
pub fn map_write_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_foreign_key_violation() {
            return AppError::validation("Categoria_ID", "unknown category");
        }
    }
    e.into()
}
