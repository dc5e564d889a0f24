//! Typed request payloads for the endpoints that validate their body.
//!
//! # Design
//! The façade accepts any `Serialize` payload and forwards it untouched.
//! These types cover the few payloads the client itself inspects. Field
//! names follow the API's PascalCase wire format.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How a supplier link reports completes back to the marketplace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TrackingType {
    None,
    Pixel,
    S2s,
}

impl TrackingType {
    pub const ALL: [TrackingType; 3] = [TrackingType::None, TrackingType::Pixel, TrackingType::S2s];

    pub fn code(self) -> &'static str {
        match self {
            TrackingType::None => "NONE",
            TrackingType::Pixel => "PIXEL",
            TrackingType::S2s => "S2S",
        }
    }
}

impl fmt::Display for TrackingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for TrackingType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TrackingType::ALL
            .into_iter()
            .find(|t| t.code() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// Payload for creating a supplier link. Only the type codes are required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SupplierLinkCreate {
    pub supplier_link_type_code: String,
    pub tracking_type_code: TrackingType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub over_quota_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_termination_link: Option<String>,
}

/// Payload for updating a supplier link; every link is resent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SupplierLinkUpdate {
    pub supplier_link_type_code: String,
    pub tracking_type_code: TrackingType,
    pub default_link: String,
    pub success_link: String,
    pub over_quota_link: String,
    pub quality_termination_link: String,
}

/// Body of a survey reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileRequest {
    #[serde(rename = "ResponseIDs")]
    pub response_ids: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tracking_type_uses_wire_codes() {
        assert_eq!(serde_json::to_value(TrackingType::S2s).unwrap(), json!("S2S"));
        assert_eq!(serde_json::to_value(TrackingType::None).unwrap(), json!("NONE"));
        assert_eq!("PIXEL".parse::<TrackingType>(), Ok(TrackingType::Pixel));
        assert!("pixel".parse::<TrackingType>().is_err());
    }

    #[test]
    fn link_create_skips_absent_links() {
        let link = SupplierLinkCreate {
            supplier_link_type_code: "OWS".to_string(),
            tracking_type_code: TrackingType::S2s,
            default_link: Some("https://example.com/?rid=[%RID%]".to_string()),
            success_link: None,
            failure_link: None,
            over_quota_link: None,
            quality_termination_link: None,
        };
        let value = serde_json::to_value(&link).unwrap();
        assert_eq!(
            value,
            json!({
                "SupplierLinkTypeCode": "OWS",
                "TrackingTypeCode": "S2S",
                "DefaultLink": "https://example.com/?rid=[%RID%]"
            })
        );
    }

    #[test]
    fn link_update_requires_all_links() {
        let parsed: Result<SupplierLinkUpdate, _> = serde_json::from_value(json!({
            "SupplierLinkTypeCode": "OWS",
            "TrackingTypeCode": "NONE",
            "DefaultLink": "a"
        }));
        assert!(parsed.is_err());
    }

    #[test]
    fn reconcile_request_wire_name() {
        let body = ReconcileRequest {
            response_ids: vec!["r1".to_string(), "r2".to_string()],
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"ResponseIDs": ["r1", "r2"]})
        );
    }
}
