//! QA's read view of QC over the gateway.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

use super::{decode, missing_as_none, request};
use crate::adapters::messaging::patterns::{RESULT_LIST_FOR_SAMPLE, SAMPLE_GET};
use crate::domain::foundation::{CommandMetadata, DomainError, SampleId};
use crate::domain::result::TestResult;
use crate::domain::sample::Sample;
use crate::ports::{QcReader, ServiceGateway, ServiceTarget};

pub struct GatewayQcReader {
    gateway: Arc<dyn ServiceGateway>,
}

impl GatewayQcReader {
    pub fn new(gateway: Arc<dyn ServiceGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl QcReader for GatewayQcReader {
    async fn get_sample(
        &self,
        id: SampleId,
        metadata: &CommandMetadata,
    ) -> Result<Option<Sample>, DomainError> {
        let response = self
            .gateway
            .call(request(ServiceTarget::Qc, SAMPLE_GET, json!({ "id": id }), metadata))
            .await;
        missing_as_none(response)?.map(decode).transpose()
    }

    async fn list_results(
        &self,
        sample_id: SampleId,
        metadata: &CommandMetadata,
    ) -> Result<Vec<TestResult>, DomainError> {
        let payload = json!({ "sampleId": sample_id });
        let response = self
            .gateway
            .call(request(ServiceTarget::Qc, RESULT_LIST_FOR_SAMPLE, payload, metadata))
            .await?;
        decode(response)
    }
}
