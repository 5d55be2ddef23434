//! ListForMaterialHandler - Query handler resolving the tests that apply to
//! a material.
//!
//! Tests explicitly bound to the material win. Without any binding the
//! material's category is matched case-insensitively against test
//! categories. The category match is an approximation: it assumes catalog
//! categories are named after material categories.

use std::sync::Arc;

use crate::domain::catalog::{CatalogError, TestDefinition};
use crate::ports::TestRepository;

/// Query for applicable active tests. At least one selector is required.
#[derive(Debug, Clone, Default)]
pub struct ListForMaterialQuery {
    /// Material whose bound tests are listed first.
    pub material_id: Option<String>,
    /// Fallback when no test is bound to the material.
    pub category: Option<String>,
}

pub struct ListForMaterialHandler {
    repository: Arc<dyn TestRepository>,
}

impl ListForMaterialHandler {
    pub fn new(repository: Arc<dyn TestRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(
        &self,
        query: ListForMaterialQuery,
    ) -> Result<Vec<TestDefinition>, CatalogError> {
        let material_id = non_blank(query.material_id);
        let category = non_blank(query.category);

        if material_id.is_none() && category.is_none() {
            return Err(CatalogError::validation(
                "materialId",
                "Either materialId or category is required",
            ));
        }

        if let Some(material_id) = &material_id {
            let bound = self.repository.find_active_for_material(material_id).await?;
            if !bound.is_empty() {
                return Ok(bound);
            }
        }

        match category {
            Some(category) => Ok(self.repository.find_active_by_category(&category).await?),
            None => Ok(Vec::new()),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
