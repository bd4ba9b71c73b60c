use crate::{
    categories::{dto::CategoryRequest, repo_types::NewCategory},
    error::{AppError, AppResult},
};

/// Lowercase ASCII slug; every run of other characters becomes one `-`.
pub fn slugify(raw: &str) -> String {
    let mut slug = String::with_capacity(raw.len());
    for ch in raw.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

pub fn validate(req: CategoryRequest) -> AppResult<NewCategory> {
    fn clean(v: Option<String>) -> Option<String> {
        v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
    }

    let name = clean(req.name).ok_or_else(|| AppError::validation("Nome", "name is required"))?;
    let slug = slugify(clean(req.slug).as_deref().unwrap_or(&name));
    if slug.is_empty() {
        return Err(AppError::validation(
            "Slug",
            "slug must contain at least one letter or digit",
        ));
    }

    Ok(NewCategory {
        name,
        slug,
        description: clean(req.description),
        icon: clean(req.icon),
    })
}
