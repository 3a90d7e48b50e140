//! Export market model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A destination country the company ships to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMarket {
    pub id: Uuid,
    pub country: String,
    /// ISO 3166-1 alpha-2 code
    pub country_code: String,
    pub description: Option<String>,
    pub product_count: i32,
    pub shipment_frequency: Option<String>,
    pub is_active: bool,
    pub flag_icon: Option<String>,
}

impl ExportMarket {
    pub fn from_input(input: CreateExportMarketInput) -> Self {
        Self {
            id: Uuid::new_v4(),
            country: input.country,
            country_code: input.country_code.to_uppercase(),
            description: input.description,
            product_count: input.product_count.unwrap_or(0),
            shipment_frequency: input.shipment_frequency,
            is_active: input.is_active.unwrap_or(true),
            flag_icon: input.flag_icon,
        }
    }

    pub fn apply(&mut self, update: UpdateExportMarketInput) {
        if let Some(country) = update.country {
            self.country = country;
        }
        if let Some(code) = update.country_code {
            self.country_code = code.to_uppercase();
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        if let Some(count) = update.product_count {
            self.product_count = count;
        }
        if let Some(frequency) = update.shipment_frequency {
            self.shipment_frequency = Some(frequency);
        }
        if let Some(active) = update.is_active {
            self.is_active = active;
        }
        if let Some(flag) = update.flag_icon {
            self.flag_icon = Some(flag);
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateExportMarketInput {
    pub country: String,
    pub country_code: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub product_count: Option<i32>,
    #[serde(default)]
    pub shipment_frequency: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub flag_icon: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExportMarketInput {
    pub country: Option<String>,
    pub country_code: Option<String>,
    pub description: Option<String>,
    pub product_count: Option<i32>,
    pub shipment_frequency: Option<String>,
    pub is_active: Option<bool>,
    pub flag_icon: Option<String>,
}
