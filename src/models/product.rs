//! Product model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    /// Catalog category slug, e.g. `micronutrients`
    pub category: String,
    pub description: Option<String>,
    /// Free-form specification table (label → value)
    pub specifications: Option<BTreeMap<String, String>>,
    pub image_url: Option<String>,
    pub suitable_crops: Vec<String>,
    pub packing_sizes: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Product {
    pub fn from_input(input: CreateProductInput) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: input.name,
            category: input.category,
            description: input.description,
            specifications: input.specifications,
            image_url: input.image_url,
            suitable_crops: input.suitable_crops,
            packing_sizes: input.packing_sizes,
            is_active: input.is_active.unwrap_or(true),
            created_at: Utc::now(),
        }
    }

    /// Merge a partial update into this product
    pub fn apply(&mut self, update: UpdateProductInput) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        if let Some(specifications) = update.specifications {
            self.specifications = Some(specifications);
        }
        if let Some(image_url) = update.image_url {
            self.image_url = Some(image_url);
        }
        if let Some(crops) = update.suitable_crops {
            self.suitable_crops = crops;
        }
        if let Some(sizes) = update.packing_sizes {
            self.packing_sizes = sizes;
        }
        if let Some(active) = update.is_active {
            self.is_active = active;
        }
    }
}

/// Input for creating a product
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductInput {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub specifications: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub suitable_crops: Vec<String>,
    #[serde(default)]
    pub packing_sizes: Vec<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// Partial product update
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub specifications: Option<BTreeMap<String, String>>,
    pub image_url: Option<String>,
    pub suitable_crops: Option<Vec<String>>,
    pub packing_sizes: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_input_defaults_active() {
        let product = Product::from_input(CreateProductInput {
            name: "K-Max".to_string(),
            category: "micronutrients".to_string(),
            ..Default::default()
        });
        assert!(product.is_active);
        assert!(product.suitable_crops.is_empty());
    }

    #[test]
    fn test_apply_only_touches_given_fields() {
        let mut product = Product::from_input(CreateProductInput {
            name: "Humic Power".to_string(),
            category: "liquid-fertilizer".to_string(),
            packing_sizes: vec!["1 L".to_string()],
            ..Default::default()
        });
        product.apply(UpdateProductInput {
            is_active: Some(false),
            ..Default::default()
        });
        assert!(!product.is_active);
        assert_eq!(product.name, "Humic Power");
        assert_eq!(product.packing_sizes, vec!["1 L".to_string()]);
    }

    #[test]
    fn test_deserialize_camel_case_input() {
        let input: CreateProductInput = serde_json::from_value(serde_json::json!({
            "name": "Cyto Max",
            "category": "plant-growth-promotor",
            "imageUrl": "/cyto.jpeg",
            "suitableCrops": ["Paddy"],
        }))
        .unwrap();
        assert_eq!(input.image_url.as_deref(), Some("/cyto.jpeg"));
        assert_eq!(input.suitable_crops, vec!["Paddy".to_string()]);
        assert!(input.packing_sizes.is_empty());
    }
}
