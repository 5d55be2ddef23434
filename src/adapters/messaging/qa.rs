//! QA service endpoint: releases and disposition delivery.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::sync::Arc;

use super::dto::{
    user, DecideRequest, DecideResponse, DeliveryOutcome, DeliveryReport, GetReleaseRequest,
    ReleaseIdRequest, SubmitToQaRequest, UpdateChecklistRequest,
};
use super::patterns::{self, QA_PATTERNS};
use super::{decode, encode, metadata};
use crate::application::handlers::release::{
    DecideCommand, DecideHandler, DeliverDispositionCommand, DeliverDispositionHandler,
    GetReleaseHandler, GetReleaseQuery, RetryPendingDeliveriesHandler, SubmissionPolicy,
    SubmitToQaCommand, SubmitToQaHandler, UpdateChecklistCommand, UpdateChecklistHandler,
};
use crate::domain::foundation::UserId;
use crate::domain::release::Decision;
use crate::ports::{
    DispositionSink, EventPublisher, MessageHandler, QcReader, ReleaseRepository, ServiceError,
    ServiceTarget,
};

pub struct QaService {
    submit: SubmitToQaHandler,
    update_checklist: UpdateChecklistHandler,
    decide: DecideHandler,
    deliver: Arc<DeliverDispositionHandler>,
    retry: RetryPendingDeliveriesHandler,
    get: GetReleaseHandler,
}

impl QaService {
    pub fn new(
        releases: Arc<dyn ReleaseRepository>,
        qc: Arc<dyn QcReader>,
        sink: Arc<dyn DispositionSink>,
        event_publisher: Arc<dyn EventPublisher>,
        policy: SubmissionPolicy,
    ) -> Self {
        let deliver = Arc::new(DeliverDispositionHandler::new(
            releases.clone(),
            sink,
            event_publisher.clone(),
        ));
        Self {
            submit: SubmitToQaHandler::new(releases.clone(), qc, event_publisher.clone(), policy),
            update_checklist: UpdateChecklistHandler::new(releases.clone()),
            decide: DecideHandler::new(releases.clone(), event_publisher),
            retry: RetryPendingDeliveriesHandler::new(releases.clone(), deliver.clone()),
            get: GetReleaseHandler::new(releases),
            deliver,
        }
    }
}

#[async_trait]
impl MessageHandler for QaService {
    fn service(&self) -> ServiceTarget {
        ServiceTarget::Qa
    }

    fn patterns(&self) -> &'static [&'static str] {
        QA_PATTERNS
    }

    async fn handle(
        &self,
        pattern: &str,
        payload: JsonValue,
        correlation_id: Option<String>,
    ) -> Result<JsonValue, ServiceError> {
        match pattern {
            patterns::RELEASE_SUBMIT_TO_QA => {
                let req: SubmitToQaRequest = decode(payload)?;
                let submitted_by = user(&req.submitted_by, "submittedBy")?;
                let meta = metadata(Some(submitted_by.clone()), correlation_id);
                let cmd = SubmitToQaCommand {
                    sample_id: req.sample_id,
                    submitted_by,
                };
                encode(&self.submit.handle(cmd, meta).await?.release)
            }
            patterns::RELEASE_UPDATE_CHECKLIST => {
                let req: UpdateChecklistRequest = decode(payload)?;
                let checked_by = match req.checked_by.as_deref() {
                    Some(by) => user(by, "checkedBy")?,
                    None => UserId::system(),
                };
                let cmd = UpdateChecklistCommand {
                    release_id: req.release_id,
                    item_id: req.item_id,
                    checked: req.checked,
                    checked_by,
                };
                encode(&self.update_checklist.handle(cmd).await?)
            }
            patterns::RELEASE_DECIDE => {
                let req: DecideRequest = decode(payload)?;
                let decision = Decision::parse(req.decision.trim().to_lowercase().as_str())
                    .ok_or_else(|| {
                        ServiceError::validation(format!("Unknown decision '{}'", req.decision))
                    })?;
                let decided_by = user(&req.decided_by, "decidedBy")?;
                let meta = metadata(Some(decided_by.clone()), correlation_id);
                let cmd = DecideCommand {
                    release_id: req.release_id,
                    decision,
                    remarks: req.remarks,
                    decided_by,
                };
                let decided = self.decide.handle(cmd, meta.clone()).await?;

                // The decision stands whatever happens to delivery.
                let (release, delivery) = match self
                    .deliver
                    .handle(
                        DeliverDispositionCommand {
                            release_id: decided.release.id(),
                        },
                        meta,
                    )
                    .await
                {
                    Ok(release) => (
                        release,
                        DeliveryReport {
                            delivered: true,
                            error: None,
                        },
                    ),
                    Err(err) => {
                        let release = self
                            .get
                            .handle(GetReleaseQuery::ById(decided.release.id()))
                            .await
                            .unwrap_or(decided.release);
                        (
                            release,
                            DeliveryReport {
                                delivered: false,
                                error: Some(err.into()),
                            },
                        )
                    }
                };
                encode(&DecideResponse {
                    release,
                    disposition: decided.disposition,
                    delivery,
                })
            }
            patterns::RELEASE_DELIVER => {
                let req: ReleaseIdRequest = decode(payload)?;
                let release = self
                    .deliver
                    .handle(
                        DeliverDispositionCommand {
                            release_id: req.release_id,
                        },
                        metadata(None, correlation_id),
                    )
                    .await?;
                encode(&release)
            }
            patterns::RELEASE_RETRY_DELIVERIES => {
                let attempts = self.retry.handle(metadata(None, correlation_id)).await?;
                let outcomes: Vec<DeliveryOutcome> = attempts
                    .into_iter()
                    .map(|a| DeliveryOutcome {
                        release_id: a.release_id,
                        release_number: a.release_number.to_string(),
                        delivered: a.delivered,
                        error: a.error,
                    })
                    .collect();
                encode(&outcomes)
            }
            patterns::RELEASE_GET => {
                let req: GetReleaseRequest = decode(payload)?;
                let query = match (req.id, req.sample_id) {
                    (Some(id), _) => GetReleaseQuery::ById(id),
                    (None, Some(sample_id)) => GetReleaseQuery::BySample(sample_id),
                    (None, None) => {
                        return Err(ServiceError::validation("Either id or sampleId is required"))
                    }
                };
                encode(&self.get.handle(query).await?)
            }
            other => Err(ServiceError::unknown_pattern(other)),
        }
    }
}
