//! QC's catalog client over the gateway.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

use super::{decode, missing_as_none, request};
use crate::adapters::messaging::patterns::{TEST_GET, TEST_LIST_FOR_MATERIAL};
use crate::domain::catalog::TestDefinition;
use crate::domain::foundation::{CommandMetadata, DomainError, TestId};
use crate::ports::{ServiceGateway, ServiceTarget, TestCatalog};

pub struct GatewayTestCatalog {
    gateway: Arc<dyn ServiceGateway>,
}

impl GatewayTestCatalog {
    pub fn new(gateway: Arc<dyn ServiceGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl TestCatalog for GatewayTestCatalog {
    async fn get_test(
        &self,
        id: TestId,
        metadata: &CommandMetadata,
    ) -> Result<Option<TestDefinition>, DomainError> {
        let response = self
            .gateway
            .call(request(ServiceTarget::Catalog, TEST_GET, json!({ "id": id }), metadata))
            .await;
        missing_as_none(response)?.map(decode).transpose()
    }

    async fn list_for_material(
        &self,
        material_id: Option<&str>,
        category: Option<&str>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<TestDefinition>, DomainError> {
        let payload = json!({ "materialId": material_id, "category": category });
        let response = self
            .gateway
            .call(request(ServiceTarget::Catalog, TEST_LIST_FOR_MATERIAL, payload, metadata))
            .await?;
        decode(response)
    }
}
