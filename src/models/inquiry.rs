//! Inquiry model
//!
//! Raw submissions from the public contact, quote and product forms.
//! Each submission spawns a Lead and keeps a reference to it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inquiry {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub inquiry_type: InquiryType,
    /// Form payload as submitted
    pub data: serde_json::Map<String, serde_json::Value>,
    /// Lead created from this inquiry
    pub lead_id: Option<Uuid>,
    pub processed: bool,
    pub created_at: DateTime<Utc>,
}

impl Inquiry {
    pub fn new(
        inquiry_type: InquiryType,
        data: serde_json::Map<String, serde_json::Value>,
        lead_id: Option<Uuid>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            inquiry_type,
            data,
            lead_id,
            processed: false,
            created_at: Utc::now(),
        }
    }

    /// Read a string field from the payload, treating blanks as absent
    pub fn field(&self, name: &str) -> Option<&str> {
        data_field(&self.data, name)
    }
}

/// Read a non-blank string field from a form payload
pub fn data_field<'a>(data: &'a serde_json::Map<String, serde_json::Value>, name: &str) -> Option<&'a str> {
    data.get(name)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Which public form produced the inquiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InquiryType {
    ContactForm,
    QuoteRequest,
    ProductInquiry,
}

impl fmt::Display for InquiryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InquiryType::ContactForm => write!(f, "contact_form"),
            InquiryType::QuoteRequest => write!(f, "quote_request"),
            InquiryType::ProductInquiry => write!(f, "product_inquiry"),
        }
    }
}

impl FromStr for InquiryType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "contact_form" => Ok(InquiryType::ContactForm),
            "quote_request" => Ok(InquiryType::QuoteRequest),
            "product_inquiry" => Ok(InquiryType::ProductInquiry),
            _ => Err(anyhow::anyhow!("Invalid inquiry type: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_field_renamed() {
        let data = json!({"name": "Budi"}).as_object().cloned().unwrap();
        let inquiry = Inquiry::new(InquiryType::QuoteRequest, data, None);
        let value = serde_json::to_value(&inquiry).unwrap();
        assert_eq!(value["type"], "quote_request");
        assert_eq!(value["processed"], false);
    }

    #[test]
    fn test_field_skips_blank_and_non_string() {
        let data = json!({"name": "  ", "email": "a@b.co", "phone": 123})
            .as_object()
            .cloned()
            .unwrap();
        assert_eq!(data_field(&data, "name"), None);
        assert_eq!(data_field(&data, "email"), Some("a@b.co"));
        assert_eq!(data_field(&data, "phone"), None);
        assert_eq!(data_field(&data, "missing"), None);
    }
}
