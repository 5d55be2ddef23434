//! Module errors to wire errors.

use crate::domain::catalog::CatalogError;
use crate::domain::release::ReleaseError;
use crate::domain::result::ResultError;
use crate::domain::sample::SampleError;
use crate::ports::ServiceError;

macro_rules! into_service_error {
    ($($error:ty),+ $(,)?) => {
        $(
            impl From<$error> for ServiceError {
                fn from(err: $error) -> Self {
                    ServiceError::new(err.code(), err.to_string())
                }
            }
        )+
    };
}

into_service_error!(CatalogError, SampleError, ResultError, ReleaseError);
