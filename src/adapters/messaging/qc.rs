//! QC service endpoint: samples and results.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;
use std::sync::Arc;

use super::dto::{
    user, AssignTestsRequest, CancelSampleRequest, CreateFromSourceRequest, CreateSampleRequest,
    IdRequest, PatchRequest, ReviewResultRequest, SampleIdRequest, SubmitResultRequest,
};
use super::patterns::{self, QC_PATTERNS};
use super::{decode, decode_patch, encode, metadata};
use crate::application::handlers::result::{
    ListResultsHandler, ListResultsQuery, ReviewResultCommand, ReviewResultHandler,
    SubmitResultCommand, SubmitResultHandler,
};
use crate::application::handlers::sample::{
    AssignTestsCommand, AssignTestsHandler, CancelSampleCommand, CancelSampleHandler,
    CreateSampleCommand, CreateSampleFromSourceCommand, CreateSampleFromSourceHandler,
    CreateSampleHandler, GetSampleHandler, GetSampleQuery, ReceiveSampleCommand,
    ReceiveSampleHandler, UpdateSampleCommand, UpdateSampleHandler,
};
use crate::domain::foundation::SampleId;
use crate::domain::result::ResultSubmission;
use crate::ports::{
    EventPublisher, MessageHandler, ResultRepository, SampleRepository, ServiceError,
    ServiceTarget, TestCatalog,
};

pub struct QcService {
    create: CreateSampleHandler,
    create_from_source: CreateSampleFromSourceHandler,
    get: GetSampleHandler,
    receive: ReceiveSampleHandler,
    assign_tests: AssignTestsHandler,
    update: UpdateSampleHandler,
    cancel: CancelSampleHandler,
    submit_result: SubmitResultHandler,
    list_results: ListResultsHandler,
    review_result: ReviewResultHandler,
}

impl QcService {
    pub fn new(
        samples: Arc<dyn SampleRepository>,
        results: Arc<dyn ResultRepository>,
        catalog: Arc<dyn TestCatalog>,
        event_publisher: Arc<dyn EventPublisher>,
        target_tolerance: Decimal,
    ) -> Self {
        Self {
            create: CreateSampleHandler::new(
                samples.clone(),
                catalog.clone(),
                event_publisher.clone(),
            ),
            create_from_source: CreateSampleFromSourceHandler::new(
                samples.clone(),
                catalog.clone(),
                event_publisher.clone(),
            ),
            get: GetSampleHandler::new(samples.clone()),
            receive: ReceiveSampleHandler::new(samples.clone(), event_publisher.clone()),
            assign_tests: AssignTestsHandler::new(samples.clone(), catalog.clone()),
            update: UpdateSampleHandler::new(samples.clone()),
            cancel: CancelSampleHandler::new(
                samples.clone(),
                results.clone(),
                event_publisher.clone(),
            ),
            submit_result: SubmitResultHandler::new(
                samples.clone(),
                results.clone(),
                catalog,
                event_publisher,
                target_tolerance,
            ),
            list_results: ListResultsHandler::new(samples, results.clone()),
            review_result: ReviewResultHandler::new(results),
        }
    }
}

#[async_trait]
impl MessageHandler for QcService {
    fn service(&self) -> ServiceTarget {
        ServiceTarget::Qc
    }

    fn patterns(&self) -> &'static [&'static str] {
        QC_PATTERNS
    }

    async fn handle(
        &self,
        pattern: &str,
        payload: JsonValue,
        correlation_id: Option<String>,
    ) -> Result<JsonValue, ServiceError> {
        match pattern {
            patterns::SAMPLE_CREATE => {
                let req: CreateSampleRequest = decode(payload)?;
                let draft = req.sample.into_draft()?;
                let meta = metadata(Some(draft.requested_by.clone()), correlation_id);
                let cmd = CreateSampleCommand {
                    draft,
                    test_ids: req.test_ids,
                };
                encode(&self.create.handle(cmd, meta).await?.sample)
            }
            patterns::SAMPLE_CREATE_FROM_SOURCE => {
                let req: CreateFromSourceRequest = decode(payload)?;
                let draft = req.sample.into_draft()?;
                let meta = metadata(Some(draft.requested_by.clone()), correlation_id);
                let cmd = CreateSampleFromSourceCommand {
                    draft,
                    category: req.category,
                };
                encode(&self.create_from_source.handle(cmd, meta).await?.sample)
            }
            patterns::SAMPLE_GET => {
                let req: IdRequest<SampleId> = decode(payload)?;
                encode(&self.get.handle(GetSampleQuery { sample_id: req.id }).await?)
            }
            patterns::SAMPLE_RECEIVE => {
                let req: IdRequest<SampleId> = decode(payload)?;
                let sample = self
                    .receive
                    .handle(
                        ReceiveSampleCommand { sample_id: req.id },
                        metadata(None, correlation_id),
                    )
                    .await?;
                encode(&sample)
            }
            patterns::SAMPLE_ASSIGN_TESTS => {
                let req: AssignTestsRequest = decode(payload)?;
                let cmd = AssignTestsCommand {
                    sample_id: req.id,
                    test_ids: req.test_ids,
                };
                let assigned = self
                    .assign_tests
                    .handle(cmd, metadata(None, correlation_id))
                    .await?;
                encode(&assigned.sample)
            }
            patterns::SAMPLE_UPDATE => {
                let req: PatchRequest<SampleId> = decode(payload)?;
                let cmd = UpdateSampleCommand {
                    sample_id: req.id,
                    patch: decode_patch(req.patch)?,
                };
                encode(&self.update.handle(cmd).await?)
            }
            patterns::SAMPLE_CANCEL => {
                let req: CancelSampleRequest = decode(payload)?;
                let cmd = CancelSampleCommand {
                    sample_id: req.id,
                    reason: req.reason,
                };
                encode(&self.cancel.handle(cmd, metadata(None, correlation_id)).await?)
            }
            patterns::RESULT_SUBMIT => {
                let req: SubmitResultRequest = decode(payload)?;
                let tested_by = user(&req.tested_by, "testedBy")?;
                let meta = metadata(Some(tested_by.clone()), correlation_id);
                let cmd = SubmitResultCommand {
                    sample_id: req.sample_id,
                    test_id: req.test_id,
                    submission: ResultSubmission {
                        parameter: req.parameter.clone(),
                        result_value: req.raw_value()?,
                        unit: req.unit.clone(),
                        tested_by,
                        tested_at: req.tested_at,
                    },
                    passed: req.passed,
                    deviation: req.deviation,
                };
                let submitted = self.submit_result.handle(cmd, meta).await?;
                let mut response = encode(&submitted.result)?;
                if let Some(fields) = response.as_object_mut() {
                    fields.insert("sampleStatus".to_string(), encode(&submitted.sample.status())?);
                }
                Ok(response)
            }
            patterns::RESULT_LIST_FOR_SAMPLE => {
                let req: SampleIdRequest = decode(payload)?;
                let results = self
                    .list_results
                    .handle(ListResultsQuery {
                        sample_id: req.sample_id,
                    })
                    .await?;
                encode(&results)
            }
            patterns::RESULT_REVIEW => {
                let req: ReviewResultRequest = decode(payload)?;
                let cmd = ReviewResultCommand {
                    result_id: req.result_id,
                    reviewed_by: user(&req.reviewed_by, "reviewedBy")?,
                };
                encode(&self.review_result.handle(cmd).await?)
            }
            other => Err(ServiceError::unknown_pattern(other)),
        }
    }
}
