use super::Database;
use crate::models::Category;
use crate::Result;

impl Database {
    /// List all categories ordered by name
    pub(super) async fn list_category_rows(&self) -> Result<Vec<Category>> {
        let categories = sqlx::query_as(
            r#"
            SELECT id, name, slug
            FROM categories
            ORDER BY name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }
}
