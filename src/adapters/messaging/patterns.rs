//! Message pattern names, one constant per operation.

// catalog
pub const TEST_CREATE: &str = "test.create";
pub const TEST_UPDATE: &str = "test.update";
pub const TEST_GET: &str = "test.get";
pub const TEST_DELETE: &str = "test.delete";
pub const TEST_LIST_FOR_MATERIAL: &str = "test.listForMaterial";

// qc
pub const SAMPLE_CREATE: &str = "sample.create";
pub const SAMPLE_CREATE_FROM_SOURCE: &str = "sample.createFromSource";
pub const SAMPLE_GET: &str = "sample.get";
pub const SAMPLE_RECEIVE: &str = "sample.receive";
pub const SAMPLE_ASSIGN_TESTS: &str = "sample.assignTests";
pub const SAMPLE_UPDATE: &str = "sample.update";
pub const SAMPLE_CANCEL: &str = "sample.cancel";
pub const RESULT_SUBMIT: &str = "result.submit";
pub const RESULT_LIST_FOR_SAMPLE: &str = "result.listForSample";
pub const RESULT_REVIEW: &str = "result.review";

// qa
pub const RELEASE_SUBMIT_TO_QA: &str = "release.submitToQA";
pub const RELEASE_UPDATE_CHECKLIST: &str = "release.updateChecklist";
pub const RELEASE_DECIDE: &str = "release.decide";
pub const RELEASE_DELIVER: &str = "release.deliver";
pub const RELEASE_RETRY_DELIVERIES: &str = "release.retryDeliveries";
pub const RELEASE_GET: &str = "release.get";

/// Owned by inventory and batch; consumed by QA.
pub const DISPOSITION_APPLY: &str = "qa.disposition.apply";

pub const CATALOG_PATTERNS: &[&str] = &[
    TEST_CREATE,
    TEST_UPDATE,
    TEST_GET,
    TEST_DELETE,
    TEST_LIST_FOR_MATERIAL,
];

pub const QC_PATTERNS: &[&str] = &[
    SAMPLE_CREATE,
    SAMPLE_CREATE_FROM_SOURCE,
    SAMPLE_GET,
    SAMPLE_RECEIVE,
    SAMPLE_ASSIGN_TESTS,
    SAMPLE_UPDATE,
    SAMPLE_CANCEL,
    RESULT_SUBMIT,
    RESULT_LIST_FOR_SAMPLE,
    RESULT_REVIEW,
];

pub const QA_PATTERNS: &[&str] = &[
    RELEASE_SUBMIT_TO_QA,
    RELEASE_UPDATE_CHECKLIST,
    RELEASE_DECIDE,
    RELEASE_DELIVER,
    RELEASE_RETRY_DELIVERIES,
    RELEASE_GET,
];
