//! Provider descriptors and persisted provider status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Static description of a rate provider, fixed at construction.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderDescriptor {
    pub name: String,
    /// Lower runs earlier.
    pub priority: i32,
    pub enabled: bool,
    pub base_url: String,
    pub credential: Option<String>,
    pub requires_credential: bool,
    is_active: bool,
}

impl ProviderDescriptor {
    /// Creates a descriptor and computes its activation once.
    ///
    /// A provider is active only when enabled, with a base URL, and with a
    /// credential if the source requires one. Blank credentials count as
    /// missing.
    pub fn new(
        name: impl Into<String>,
        priority: i32,
        enabled: bool,
        base_url: impl Into<String>,
        credential: Option<String>,
        requires_credential: bool,
    ) -> Self {
        let base_url = base_url.into();
        let credential = credential.filter(|c| !c.trim().is_empty());
        let is_active = enabled
            && !base_url.trim().is_empty()
            && (credential.is_some() || !requires_credential);

        Self {
            name: name.into(),
            priority,
            enabled,
            base_url,
            credential,
            requires_credential,
            is_active,
        }
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }
}

impl fmt::Debug for ProviderDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderDescriptor")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .field("enabled", &self.enabled)
            .field("base_url", &self.base_url)
            .field("credential", &self.credential.as_ref().map(|_| "***"))
            .field("requires_credential", &self.requires_credential)
            .field("is_active", &self.is_active)
            .finish()
    }
}

/// Persisted health bookkeeping for one provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProviderStatusRecord {
    #[schema(example = "exchangerates")]
    pub name: String,
    pub base_url: String,
    #[schema(example = 1)]
    pub priority: i32,
    pub is_active: bool,
    pub requires_credential: bool,
    pub last_success_at: Option<DateTime<Utc>>,
    pub last_failure_at: Option<DateTime<Utc>>,
    /// Consecutive failures since the last success.
    #[schema(example = 0)]
    pub failure_count: i64,
}

impl ProviderStatusRecord {
    /// A freshly registered provider with no recorded attempts.
    pub fn registered(descriptor: &ProviderDescriptor) -> Self {
        Self {
            name: descriptor.name.clone(),
            base_url: descriptor.base_url.clone(),
            priority: descriptor.priority,
            is_active: descriptor.is_active(),
            requires_credential: descriptor.requires_credential,
            last_success_at: None,
            last_failure_at: None,
            failure_count: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_without_credential_when_not_required() {
        let d = ProviderDescriptor::new("exchangerates", 1, true, "https://x", None, false);
        assert!(d.is_active());
    }

    #[test]
    fn test_inactive_when_credential_missing() {
        let d = ProviderDescriptor::new("fixer", 3, true, "http://x", None, true);
        assert!(!d.is_active());

        let blank = ProviderDescriptor::new("fixer", 3, true, "http://x", Some("  ".into()), true);
        assert!(!blank.is_active());
        assert!(blank.credential.is_none());
    }

    #[test]
    fn test_inactive_when_disabled_or_no_url() {
        assert!(!ProviderDescriptor::new("a", 1, false, "http://x", None, false).is_active());
        assert!(!ProviderDescriptor::new("a", 1, true, "", None, false).is_active());
    }

    #[test]
    fn test_debug_redacts_credential() {
        let d = ProviderDescriptor::new("fixer", 3, true, "http://x", Some("secret".into()), true);
        let debug = format!("{:?}", d);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("***"));
    }

    #[test]
    fn test_registered_record_starts_clean() {
        let d = ProviderDescriptor::new("fixer", 3, true, "http://x", Some("k".into()), true);
        let record = ProviderStatusRecord::registered(&d);
        assert_eq!(record.failure_count, 0);
        assert!(record.is_active);
        assert!(record.last_success_at.is_none());
    }
}
