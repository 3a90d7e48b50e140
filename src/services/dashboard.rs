//! Dashboard service
//!
//! KPI figures for the admin landing page, computed from the store on each
//! request.

use crate::db::Store;
use crate::models::{Lead, LeadSource, LeadStatus};
use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lead counts per pipeline stage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineCounts {
    pub new: usize,
    pub contacted: usize,
    pub quoted: usize,
    pub negotiation: usize,
    pub converted: usize,
    pub closed: usize,
}

impl PipelineCounts {
    fn tally(leads: &[Lead]) -> Self {
        let mut counts = Self::default();
        for lead in leads {
            *counts.slot(lead.status) += 1;
        }
        counts
    }

    fn slot(&mut self, status: LeadStatus) -> &mut usize {
        match status {
            LeadStatus::New => &mut self.new,
            LeadStatus::Contacted => &mut self.contacted,
            LeadStatus::Quoted => &mut self.quoted,
            LeadStatus::Negotiation => &mut self.negotiation,
            LeadStatus::Converted => &mut self.converted,
            LeadStatus::Closed => &mut self.closed,
        }
    }

    pub fn total(&self) -> usize {
        self.new + self.contacted + self.quoted + self.negotiation + self.converted + self.closed
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_inquiries: usize,
    /// Leads in new, contacted, quoted or negotiation
    pub active_leads: usize,
    /// Active catalog products
    pub total_products: usize,
    /// Active export markets
    pub export_countries: usize,
    pub leads_this_month: usize,
    pub pipeline: PipelineCounts,
    /// Converted leads over all leads, 0 when there are none
    pub conversion_rate: f64,
    pub leads_by_source: BTreeMap<String, usize>,
}

pub struct DashboardService {
    store: Store,
}

impl DashboardService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn stats(&self, now: DateTime<Utc>) -> Result<DashboardStats> {
        let leads = self.store.leads.list().await.context("Failed to list leads")?;
        let total_inquiries = self
            .store
            .inquiries
            .count()
            .await
            .context("Failed to count inquiries")?;
        let total_products = self
            .store
            .products
            .list_active()
            .await
            .context("Failed to list products")?
            .len();
        let export_countries = self
            .store
            .export_markets
            .list_active()
            .await
            .context("Failed to list export markets")?
            .len();

        let month_start = start_of_month(now);
        let pipeline = PipelineCounts::tally(&leads);

        let mut leads_by_source: BTreeMap<String, usize> = [
            LeadSource::Website,
            LeadSource::Whatsapp,
            LeadSource::Referral,
        ]
        .iter()
        .map(|s| (s.to_string(), 0))
        .collect();
        for lead in &leads {
            *leads_by_source.entry(lead.source.to_string()).or_default() += 1;
        }

        let conversion_rate = if leads.is_empty() {
            0.0
        } else {
            pipeline.converted as f64 / leads.len() as f64
        };

        Ok(DashboardStats {
            total_inquiries,
            active_leads: leads.iter().filter(|l| l.status.is_active()).count(),
            total_products,
            export_countries,
            leads_this_month: leads.iter().filter(|l| l.created_at >= month_start).count(),
            pipeline,
            conversion_rate,
            leads_by_source,
        })
    }
}

/// First instant of `now`'s calendar month, UTC
pub fn start_of_month(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(now)
}
