//! Gumroad API data models
//!
//! Typed views over the upstream JSON payloads. Every envelope carries a
//! `success` flag; fields the upstream may omit or send as `null` decode to
//! their defaults.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Decode an explicit JSON `null` as the type's default
///
/// Missing keys are covered by `#[serde(default)]` on the struct.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Product in the seller's catalog
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Product {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    pub description: Option<String>,
    /// Price in cents
    #[serde(deserialize_with = "null_as_default")]
    pub price: i64,
}

/// Products list envelope
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProductsResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub success: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub products: Vec<Product>,
}

/// License record (subscriber) of a product
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct License {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub product_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub license_key: String,
    #[serde(deserialize_with = "null_as_default")]
    pub permalink: String,
    #[serde(deserialize_with = "null_as_default")]
    pub sale_datetime: String,
    #[serde(deserialize_with = "null_as_default")]
    pub purchaser_email: String,
    #[serde(deserialize_with = "null_as_default")]
    pub refunded: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub disputed: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub chargebacked: bool,
}

/// License list envelope
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LicensesResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub success: bool,
    #[serde(alias = "subscribers", deserialize_with = "null_as_default")]
    pub licenses: Vec<License>,
}

/// Sale record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sale {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub email: String,
    /// Price in cents
    #[serde(deserialize_with = "null_as_default")]
    pub price: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub gumroad_fee: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub currency: String,
    #[serde(deserialize_with = "null_as_default")]
    pub quantity: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub discover_fee: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub can_contact: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub referrer: String,
    #[serde(deserialize_with = "null_as_default")]
    pub order_id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub created_at: String,
    #[serde(deserialize_with = "null_as_default")]
    pub product_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub product_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub refunded: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub disputed: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub chargebacked: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub affiliate_credit: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub purchaser_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub license_key: String,
    #[serde(deserialize_with = "null_as_default")]
    pub timestamp: String,
    #[serde(deserialize_with = "null_as_default")]
    pub daystamp: String,
}

/// Sales list envelope
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SalesResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub success: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub sales: Vec<Sale>,
}

/// Raw answer of the license verification endpoint
///
/// The upstream reports an unknown license in-body with `success: false`,
/// so every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerifyLicenseResponse {
    pub success: Option<bool>,
    pub uses: Option<i64>,
    pub purchase: Option<Map<String, Value>>,
    pub message: Option<String>,
}

/// Incoming license validation request from the dashboard
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidateLicenseRequest {
    #[serde(default)]
    pub product_id: String,
    #[serde(default)]
    pub license_key: String,
}

/// License validation result returned to the dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LicenseValidation {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uses: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<VerifyLicenseResponse> for LicenseValidation {
    fn from(response: VerifyLicenseResponse) -> Self {
        if response.success.unwrap_or(false) {
            Self {
                success: true,
                uses: response.uses,
                purchase: response.purchase,
                message: None,
            }
        } else {
            Self {
                success: false,
                uses: None,
                purchase: None,
                message: Some(
                    response
                        .message
                        .filter(|m| !m.is_empty())
                        .unwrap_or_else(|| "Invalid license key".to_string()),
                ),
            }
        }
    }
}
