use axum::Json;
use serde::Serialize;

use crate::taxonomy::Category;

#[derive(Debug, Serialize)]
pub(crate) struct CategoriesResponse {
    categories: Vec<&'static str>,
    total_categories: usize,
}

/// 固定の12カテゴリを序数順で返す。
pub(crate) async fn list() -> Json<CategoriesResponse> {
    let categories: Vec<&'static str> = Category::ALL
        .iter()
        .map(|category| category.label())
        .collect();
    Json(CategoriesResponse {
        total_categories: categories.len(),
        categories,
    })
}
