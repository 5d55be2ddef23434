//! Catalog service endpoint.

use async_trait::async_trait;
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;

use super::dto::{IdRequest, ListForMaterialRequest, PatchRequest};
use super::patterns::{self, CATALOG_PATTERNS};
use super::{decode, decode_patch, encode, metadata};
use crate::application::handlers::catalog::{
    CreateTestCommand, CreateTestHandler, DeleteTestCommand, DeleteTestHandler, GetTestHandler,
    GetTestQuery, ListForMaterialHandler, ListForMaterialQuery, UpdateTestCommand,
    UpdateTestHandler,
};
use crate::domain::catalog::TestDraft;
use crate::domain::foundation::TestId;
use crate::ports::{EventPublisher, MessageHandler, ServiceError, ServiceTarget, TestRepository};

pub struct CatalogService {
    create: CreateTestHandler,
    update: UpdateTestHandler,
    get: GetTestHandler,
    delete: DeleteTestHandler,
    list_for_material: ListForMaterialHandler,
}

impl CatalogService {
    pub fn new(
        tests: Arc<dyn TestRepository>,
        event_publisher: Arc<dyn EventPublisher>,
        require_unique_codes: bool,
    ) -> Self {
        Self {
            create: CreateTestHandler::new(
                tests.clone(),
                event_publisher.clone(),
                require_unique_codes,
            ),
            update: UpdateTestHandler::new(
                tests.clone(),
                event_publisher.clone(),
                require_unique_codes,
            ),
            get: GetTestHandler::new(tests.clone()),
            delete: DeleteTestHandler::new(tests.clone(), event_publisher),
            list_for_material: ListForMaterialHandler::new(tests),
        }
    }
}

#[async_trait]
impl MessageHandler for CatalogService {
    fn service(&self) -> ServiceTarget {
        ServiceTarget::Catalog
    }

    fn patterns(&self) -> &'static [&'static str] {
        CATALOG_PATTERNS
    }

    async fn handle(
        &self,
        pattern: &str,
        payload: JsonValue,
        correlation_id: Option<String>,
    ) -> Result<JsonValue, ServiceError> {
        let meta = metadata(None, correlation_id);
        match pattern {
            patterns::TEST_CREATE => {
                let draft: TestDraft = decode(payload)?;
                let created = self.create.handle(CreateTestCommand { draft }, meta).await?;
                encode(&created.test)
            }
            patterns::TEST_UPDATE => {
                let req: PatchRequest<TestId> = decode(payload)?;
                let cmd = UpdateTestCommand {
                    test_id: req.id,
                    patch: decode_patch(req.patch)?,
                };
                encode(&self.update.handle(cmd, meta).await?.test)
            }
            patterns::TEST_GET => {
                let req: IdRequest<TestId> = decode(payload)?;
                encode(&self.get.handle(GetTestQuery { test_id: req.id }).await?)
            }
            patterns::TEST_DELETE => {
                let req: IdRequest<TestId> = decode(payload)?;
                let deleted = self
                    .delete
                    .handle(DeleteTestCommand { test_id: req.id }, meta)
                    .await?;
                Ok(json!({ "id": deleted.test_id }))
            }
            patterns::TEST_LIST_FOR_MATERIAL => {
                let req: ListForMaterialRequest = decode(payload)?;
                let tests = self
                    .list_for_material
                    .handle(ListForMaterialQuery {
                        material_id: req.material_id,
                        category: req.category,
                    })
                    .await?;
                encode(&tests)
            }
            other => Err(ServiceError::unknown_pattern(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::events::InMemoryEventBus;
    use crate::adapters::memory::InMemoryTestRepository;
    use crate::domain::foundation::ErrorKind;

    fn service() -> CatalogService {
        CatalogService::new(
            Arc::new(InMemoryTestRepository::new()),
            Arc::new(InMemoryEventBus::new()),
            true,
        )
    }

    fn assay() -> JsonValue {
        json!({
            "name": "Assay by HPLC",
            "code": "as-01",
            "category": "API",
            "specifications": [
                { "parameter": "Assay", "minValue": "90", "maxValue": "110", "unit": "%" }
            ]
        })
    }

    #[tokio::test]
    async fn create_then_get() {
        let service = service();
        let created = service.handle(patterns::TEST_CREATE, assay(), None).await.unwrap();
        assert_eq!(created["code"], "AS-01");
        assert_eq!(created["specifications"][0]["parameter"], "Assay");

        let fetched = service
            .handle(patterns::TEST_GET, json!({ "id": created["id"] }), None)
            .await
            .unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn duplicate_code_conflicts() {
        let service = service();
        service.handle(patterns::TEST_CREATE, assay(), None).await.unwrap();
        let err = service
            .handle(patterns::TEST_CREATE, assay(), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn status_patch_is_rejected() {
        let service = service();
        let created = service.handle(patterns::TEST_CREATE, assay(), None).await.unwrap();
        let err = service
            .handle(
                patterns::TEST_UPDATE,
                json!({ "id": created["id"], "patch": { "status": "inactive" } }),
                None,
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, "WRITE_PROTECTED_FIELD");
    }

    #[tokio::test]
    async fn update_replaces_specifications() {
        let service = service();
        let created = service.handle(patterns::TEST_CREATE, assay(), None).await.unwrap();
        let updated = service
            .handle(
                patterns::TEST_UPDATE,
                json!({
                    "id": created["id"],
                    "patch": { "specifications": [{ "parameter": "Purity", "minValue": 98 }] }
                }),
                None,
            )
            .await
            .unwrap();
        let specs = updated["specifications"].as_array().unwrap();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0]["parameter"], "Purity");
    }

    #[tokio::test]
    async fn delete_then_get_is_not_found() {
        let service = service();
        let created = service.handle(patterns::TEST_CREATE, assay(), None).await.unwrap();
        let id = json!({ "id": created["id"] });

        let deleted = service.handle(patterns::TEST_DELETE, id.clone(), None).await.unwrap();
        assert_eq!(deleted["id"], created["id"]);
        let err = service.handle(patterns::TEST_GET, id, None).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn list_requires_a_selector() {
        let err = service()
            .handle(patterns::TEST_LIST_FOR_MATERIAL, json!({}), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }
}
