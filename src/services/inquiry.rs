//! Inquiry service
//!
//! Turns public form submissions into a Lead plus the linked raw Inquiry.

use crate::db::repositories::{InquiryRepository, LeadRepository};
use crate::models::{data_field, CreateLeadInput, Inquiry, InquiryType, Lead, LeadSource};
use anyhow::Context;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum InquiryServiceError {
    #[error("Inquiry not found: {0}")]
    NotFound(Uuid),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Result of a public submission
#[derive(Debug, Clone, Serialize)]
pub struct Submission {
    pub inquiry: Inquiry,
    pub lead: Lead,
}

pub struct InquiryService {
    inquiries: Arc<dyn InquiryRepository>,
    leads: Arc<dyn LeadRepository>,
}

impl InquiryService {
    pub fn new(inquiries: Arc<dyn InquiryRepository>, leads: Arc<dyn LeadRepository>) -> Self {
        Self { inquiries, leads }
    }

    /// Record a form submission.
    ///
    /// `data` must be a JSON object with a non-blank `name` and an `email`
    /// containing `@`. The lead is created first so the inquiry can point to
    /// it.
    pub async fn submit(
        &self,
        inquiry_type: InquiryType,
        data: serde_json::Value,
    ) -> Result<Submission, InquiryServiceError> {
        let data = match data {
            serde_json::Value::Object(map) => map,
            _ => {
                return Err(InquiryServiceError::ValidationError(
                    "Inquiry data must be an object".to_string(),
                ))
            }
        };

        let name = data_field(&data, "name")
            .ok_or_else(|| InquiryServiceError::ValidationError("Name is required".to_string()))?;
        let email = data_field(&data, "email")
            .filter(|e| e.contains('@'))
            .ok_or_else(|| {
                InquiryServiceError::ValidationError("A valid email is required".to_string())
            })?;

        let owned = |field: &str| data_field(&data, field).map(str::to_string);
        let lead_input = CreateLeadInput {
            name: name.to_string(),
            email: email.to_string(),
            phone: owned("phone"),
            company: owned("company").unwrap_or_default(),
            country: owned("country").unwrap_or_default(),
            product_interest: owned("productInterest"),
            message: owned("message"),
            source: Some(LeadSource::Website),
            utm_source: owned("utmSource"),
            utm_medium: owned("utmMedium"),
            utm_campaign: owned("utmCampaign"),
            ..Default::default()
        };

        let lead = self
            .leads
            .create(&Lead::from_input(lead_input))
            .await
            .context("Failed to create lead")?;

        let inquiry = self
            .inquiries
            .create(&Inquiry::new(inquiry_type, data, Some(lead.id)))
            .await
            .context("Failed to create inquiry")?;

        tracing::info!("New {} from {} (lead {})", inquiry_type, lead.email, lead.id);
        Ok(Submission { inquiry, lead })
    }

    /// All inquiries, newest first
    pub async fn list(&self) -> Result<Vec<Inquiry>, InquiryServiceError> {
        Ok(self.inquiries.list().await.context("Failed to list inquiries")?)
    }

    pub async fn mark_processed(&self, id: Uuid, processed: bool) -> Result<Inquiry, InquiryServiceError> {
        self.inquiries
            .set_processed(id, processed)
            .await
            .context("Failed to update inquiry")?
            .ok_or(InquiryServiceError::NotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{MemoryInquiryRepository, MemoryLeadRepository};
    use serde_json::json;

    fn setup_service() -> (InquiryService, Arc<dyn LeadRepository>) {
        let leads = MemoryLeadRepository::boxed();
        (
            InquiryService::new(MemoryInquiryRepository::boxed(), leads.clone()),
            leads,
        )
    }

    #[tokio::test]
    async fn test_submit_creates_linked_lead() {
        let (service, leads) = setup_service();
        let submission = service
            .submit(
                InquiryType::QuoteRequest,
                json!({
                    "name": "Abebe Kebede",
                    "email": "abebe@addisagro.et",
                    "company": "Addis Agro",
                    "country": "Ethiopia",
                    "productInterest": "Micro Mac Coconut Special",
                    "quantity": "2 tonnes",
                    "utmSource": "google",
                    "utmCampaign": "east-africa"
                }),
            )
            .await
            .unwrap();

        assert_eq!(submission.inquiry.lead_id, Some(submission.lead.id));
        assert_eq!(submission.lead.source, LeadSource::Website);
        assert_eq!(submission.lead.company, "Addis Agro");
        assert_eq!(submission.lead.utm_source.as_deref(), Some("google"));
        assert_eq!(submission.lead.utm_medium, None);
        assert_eq!(submission.inquiry.field("quantity"), Some("2 tonnes"));
        assert_eq!(leads.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_submit_rejects_invalid_payloads() {
        let (service, leads) = setup_service();

        for data in [
            json!("just a string"),
            json!({"email": "a@b.com"}),
            json!({"name": "  ", "email": "a@b.com"}),
            json!({"name": "Budi", "email": "not-an-email"}),
            json!({"name": "Budi"}),
        ] {
            assert!(matches!(
                service.submit(InquiryType::ContactForm, data).await,
                Err(InquiryServiceError::ValidationError(_))
            ));
        }
        assert!(leads.list().await.unwrap().is_empty());
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mark_processed() {
        let (service, _) = setup_service();
        let submission = service
            .submit(InquiryType::ContactForm, json!({"name": "Budi", "email": "budi@tani.id"}))
            .await
            .unwrap();

        let updated = service.mark_processed(submission.inquiry.id, true).await.unwrap();
        assert!(updated.processed);
        assert!(matches!(
            service.mark_processed(Uuid::new_v4(), true).await,
            Err(InquiryServiceError::NotFound(_))
        ));
    }
}
