//! Cross-service gateway configuration

use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use super::error::ValidationError;
use crate::ports::ServiceTarget;

/// Base URLs of remote services and the default call timeout.
///
/// A service hosted by this process is dispatched in-process and needs no
/// URL. Any other target must be configured here to be reachable.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_timeout_ms")]
    pub default_timeout_ms: u64,

    /// Overrides the default for disposition delivery calls
    pub delivery_timeout_ms: Option<u64>,

    pub catalog_url: Option<String>,
    pub qc_url: Option<String>,
    pub qa_url: Option<String>,
    pub inventory_url: Option<String>,
    pub batch_url: Option<String>,
}

impl GatewayConfig {
    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    pub fn delivery_timeout(&self) -> Duration {
        Duration::from_millis(self.delivery_timeout_ms.unwrap_or(self.default_timeout_ms))
    }

    fn url_for(&self, target: ServiceTarget) -> Option<&String> {
        match target {
            ServiceTarget::Catalog => self.catalog_url.as_ref(),
            ServiceTarget::Qc => self.qc_url.as_ref(),
            ServiceTarget::Qa => self.qa_url.as_ref(),
            ServiceTarget::Inventory => self.inventory_url.as_ref(),
            ServiceTarget::Batch => self.batch_url.as_ref(),
        }
    }

    /// Configured base URLs, trailing slashes removed.
    pub fn base_urls(&self) -> HashMap<ServiceTarget, String> {
        ServiceTarget::ALL
            .iter()
            .filter_map(|target| {
                self.url_for(*target)
                    .map(|url| (*target, url.trim().trim_end_matches('/').to_string()))
            })
            .collect()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let timeouts = [Some(self.default_timeout_ms), self.delivery_timeout_ms];
        if timeouts.iter().flatten().any(|ms| *ms == 0 || *ms > 300_000) {
            return Err(ValidationError::InvalidGatewayTimeout);
        }
        for target in ServiceTarget::ALL {
            if let Some(url) = self.url_for(target) {
                let url = url.trim();
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    return Err(ValidationError::InvalidGatewayUrl(target.as_str()));
                }
            }
        }
        Ok(())
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: default_timeout_ms(),
            delivery_timeout_ms: None,
            catalog_url: None,
            qc_url: None,
            qa_url: None,
            inventory_url: None,
            batch_url: None,
        }
    }
}

fn default_timeout_ms() -> u64 {
    5_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_configured_targets_have_urls() {
        let config = GatewayConfig {
            inventory_url: Some("http://inventory:8080/".to_string()),
            ..Default::default()
        };
        let urls = config.base_urls();
        assert_eq!(urls.len(), 1);
        assert_eq!(urls[&ServiceTarget::Inventory], "http://inventory:8080");
    }

    #[test]
    fn delivery_timeout_falls_back_to_default() {
        let mut config = GatewayConfig::default();
        assert_eq!(config.delivery_timeout(), Duration::from_secs(5));

        config.delivery_timeout_ms = Some(1_500);
        assert_eq!(config.delivery_timeout(), Duration::from_millis(1_500));
    }

    #[test]
    fn non_http_urls_are_rejected() {
        let config = GatewayConfig {
            batch_url: Some("batch:8080".to_string()),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidGatewayUrl("batch"))
        );
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let config = GatewayConfig {
            delivery_timeout_ms: Some(0),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidGatewayTimeout));
    }
}
