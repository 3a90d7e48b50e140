//! Lead service
//!
//! The sales pipeline behind the admin console:
//! - Filtered lead lists (status, source, country, assignee, creation date,
//!   free-text search)
//! - The six-column Kanban board
//! - Stage moves, partial updates and deletion

use crate::db::repositories::{LeadRepository, UserRepository};
use crate::models::{CreateLeadInput, Lead, LeadSource, LeadStatus, UpdateLeadInput};
use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum LeadServiceError {
    #[error("Lead not found: {0}")]
    NotFound(Uuid),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Creation-date windows offered by the pipeline filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateRange {
    /// Same UTC calendar day as now
    Today,
    /// Last 7 days
    Week,
    /// Last 30 days
    Month,
    /// Last 90 days
    Quarter,
}

impl DateRange {
    pub fn contains(self, created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        let days = match self {
            DateRange::Today => return created_at.date_naive() == now.date_naive(),
            DateRange::Week => 7,
            DateRange::Month => 30,
            DateRange::Quarter => 90,
        };
        created_at >= now - Duration::days(days)
    }
}

/// Query filters for the lead list; every field is optional
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadFilter {
    pub status: Option<LeadStatus>,
    pub source: Option<LeadSource>,
    pub country: Option<String>,
    pub assigned_to: Option<Uuid>,
    /// Only leads nobody owns; takes precedence over `assigned_to`
    pub unassigned: Option<bool>,
    pub date_range: Option<DateRange>,
    /// Matches name, email or company, case-insensitive
    pub search: Option<String>,
}

impl LeadFilter {
    /// Date ranges are measured back from `now`
    pub fn matches_at(&self, lead: &Lead, now: DateTime<Utc>) -> bool {
        if self.status.is_some_and(|s| lead.status != s) {
            return false;
        }
        if self.source.is_some_and(|s| lead.source != s) {
            return false;
        }
        if let Some(country) = self.country.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            if !lead.country.eq_ignore_ascii_case(country) {
                return false;
            }
        }
        if self.unassigned == Some(true) {
            if lead.assigned_to.is_some() {
                return false;
            }
        } else if self.assigned_to.is_some() && lead.assigned_to != self.assigned_to {
            return false;
        }
        if self.date_range.is_some_and(|r| !r.contains(lead.created_at, now)) {
            return false;
        }
        match self.search.as_deref() {
            Some(needle) => lead.matches_search(needle),
            None => true,
        }
    }
}

/// One Kanban column
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardColumn {
    pub status: LeadStatus,
    pub count: usize,
    pub leads: Vec<Lead>,
}

pub struct LeadService {
    leads: Arc<dyn LeadRepository>,
    users: Arc<dyn UserRepository>,
    /// Serializes read-modify-write edits so concurrent saves don't drop fields
    edit_lock: Mutex<()>,
}

impl LeadService {
    pub fn new(leads: Arc<dyn LeadRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self {
            leads,
            users,
            edit_lock: Mutex::new(()),
        }
    }

    /// Leads matching `filter`, newest first
    pub async fn list(&self, filter: &LeadFilter) -> Result<Vec<Lead>, LeadServiceError> {
        let leads = match (filter.status, filter.assigned_to, filter.unassigned) {
            (Some(status), _, _) => self.leads.list_by_status(status).await,
            (None, Some(user_id), None | Some(false)) => self.leads.list_by_assignee(user_id).await,
            _ => self.leads.list().await,
        }
        .context("Failed to list leads")?;

        let now = Utc::now();
        Ok(leads.into_iter().filter(|l| filter.matches_at(l, now)).collect())
    }

    /// Group leads into the six pipeline columns, in pipeline order
    pub async fn board(&self, filter: &LeadFilter) -> Result<Vec<BoardColumn>, LeadServiceError> {
        let leads = self.list(filter).await?;
        let mut columns: Vec<BoardColumn> = LeadStatus::PIPELINE
            .iter()
            .map(|&status| BoardColumn {
                status,
                count: 0,
                leads: Vec::new(),
            })
            .collect();

        for lead in leads {
            if let Some(column) = columns.iter_mut().find(|c| c.status == lead.status) {
                column.leads.push(lead);
            }
        }
        for column in &mut columns {
            column.count = column.leads.len();
        }
        Ok(columns)
    }

    pub async fn get(&self, id: Uuid) -> Result<Lead, LeadServiceError> {
        self.leads
            .get_by_id(id)
            .await
            .context("Failed to get lead")?
            .ok_or(LeadServiceError::NotFound(id))
    }

    pub async fn create(&self, input: CreateLeadInput) -> Result<Lead, LeadServiceError> {
        if input.name.trim().is_empty() {
            return Err(LeadServiceError::ValidationError("Name is required".to_string()));
        }
        if let Some(user_id) = input.assigned_to {
            self.ensure_user_exists(user_id).await?;
        }

        let lead = self
            .leads
            .create(&Lead::from_input(input))
            .await
            .context("Failed to create lead")?;
        tracing::info!("Created lead {} from {}", lead.id, lead.source);
        Ok(lead)
    }

    /// Partial update; an `assignedTo` value must reference an existing user
    pub async fn update(&self, id: Uuid, input: UpdateLeadInput) -> Result<Lead, LeadServiceError> {
        if matches!(input.name.as_deref(), Some(n) if n.trim().is_empty()) {
            return Err(LeadServiceError::ValidationError("Name cannot be empty".to_string()));
        }
        if let Some(Some(user_id)) = input.assigned_to {
            self.ensure_user_exists(user_id).await?;
        }

        let _guard = self.edit_lock.lock().await;
        let mut lead = self.get(id).await?;
        lead.apply(input);
        self.save(lead).await
    }

    /// Kanban drop: move a lead to another stage.
    ///
    /// Dropping onto the lead's current column leaves it untouched.
    pub async fn move_to_stage(&self, id: Uuid, status: LeadStatus) -> Result<Lead, LeadServiceError> {
        let _guard = self.edit_lock.lock().await;
        let lead = self.get(id).await?;
        if lead.status == status {
            return Ok(lead);
        }

        let from = lead.status;
        let mut lead = lead;
        lead.apply(UpdateLeadInput {
            status: Some(status),
            ..Default::default()
        });
        let saved = self.save(lead).await?;
        tracing::info!("Lead {} moved {} -> {}", id, from, status);
        Ok(saved)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), LeadServiceError> {
        if !self.leads.delete(id).await.context("Failed to delete lead")? {
            return Err(LeadServiceError::NotFound(id));
        }
        tracing::info!("Deleted lead {}", id);
        Ok(())
    }

    async fn save(&self, lead: Lead) -> Result<Lead, LeadServiceError> {
        let id = lead.id;
        self.leads
            .update(&lead)
            .await
            .context("Failed to update lead")?
            .ok_or(LeadServiceError::NotFound(id))
    }

    async fn ensure_user_exists(&self, user_id: Uuid) -> Result<(), LeadServiceError> {
        match self.users.get_by_id(user_id).await.context("Failed to get user")? {
            Some(_) => Ok(()),
            None => Err(LeadServiceError::ValidationError(format!(
                "Assigned user does not exist: {}",
                user_id
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{MemoryLeadRepository, MemoryUserRepository};
    use crate::models::{User, UserRole};

    fn setup_service() -> (LeadService, Arc<dyn UserRepository>) {
        let users = MemoryUserRepository::boxed();
        (
            LeadService::new(MemoryLeadRepository::boxed(), users.clone()),
            users,
        )
    }

    fn lead(name: &str, company: &str, country: &str) -> CreateLeadInput {
        CreateLeadInput {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            company: company.to_string(),
            country: country.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_filters() {
        let (service, _) = setup_service();
        let a = service.create(lead("Abebe", "Addis Agro", "Ethiopia")).await.unwrap();
        service.create(lead("Budi", "Tani Makmur", "Indonesia")).await.unwrap();
        service
            .create(CreateLeadInput {
                source: Some(LeadSource::Whatsapp),
                ..lead("Wanjiru", "Rift Farms", "Kenya")
            })
            .await
            .unwrap();
        service.move_to_stage(a.id, LeadStatus::Quoted).await.unwrap();

        let by_status = service
            .list(&LeadFilter {
                status: Some(LeadStatus::Quoted),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_status.len(), 1);
        assert_eq!(by_status[0].id, a.id);

        let by_source = service
            .list(&LeadFilter {
                source: Some(LeadSource::Whatsapp),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_source[0].name, "Wanjiru");

        let by_country = service
            .list(&LeadFilter {
                country: Some("indonesia".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_country[0].name, "Budi");

        let by_search = service
            .list(&LeadFilter {
                search: Some("RIFT".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_search.len(), 1);
        assert_eq!(by_search[0].company, "Rift Farms");
    }

    #[tokio::test]
    async fn test_unassigned_filter() {
        let (service, users) = setup_service();
        let rep = users
            .create(&User::new(
                "sales2".to_string(),
                String::new(),
                UserRole::SalesTeam,
                "sales2@example.com".to_string(),
                "Sales Two".to_string(),
            ))
            .await
            .unwrap();
        let owned = service.create(lead("Owned", "Co", "Kenya")).await.unwrap();
        let free = service.create(lead("Free", "Co", "Kenya")).await.unwrap();
        service
            .update(
                owned.id,
                UpdateLeadInput {
                    assigned_to: Some(Some(rep.id)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let unassigned = service
            .list(&LeadFilter {
                unassigned: Some(true),
                assigned_to: Some(rep.id),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(unassigned.len(), 1);
        assert_eq!(unassigned[0].id, free.id);

        let everyone = service
            .list(&LeadFilter {
                unassigned: Some(false),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(everyone.len(), 2);
    }

    #[test]
    fn test_date_ranges() {
        let now = "2026-03-15T10:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let mut l = Lead::from_input(lead("A", "Co", "Kenya"));

        let at = |lead: &mut Lead, offset: Duration| lead.created_at = now - offset;
        let filter = |range| LeadFilter {
            date_range: Some(range),
            ..Default::default()
        };

        at(&mut l, Duration::hours(9));
        assert!(filter(DateRange::Today).matches_at(&l, now));
        at(&mut l, Duration::hours(11));
        assert!(!filter(DateRange::Today).matches_at(&l, now));
        assert!(filter(DateRange::Week).matches_at(&l, now));

        at(&mut l, Duration::days(7));
        assert!(filter(DateRange::Week).matches_at(&l, now));
        at(&mut l, Duration::days(8));
        assert!(!filter(DateRange::Week).matches_at(&l, now));
        assert!(filter(DateRange::Month).matches_at(&l, now));

        at(&mut l, Duration::days(31));
        assert!(!filter(DateRange::Month).matches_at(&l, now));
        assert!(filter(DateRange::Quarter).matches_at(&l, now));

        at(&mut l, Duration::days(91));
        assert!(!filter(DateRange::Quarter).matches_at(&l, now));
        assert!(LeadFilter::default().matches_at(&l, now));
    }

    #[test]
    fn test_filter_query_names() {
        let filter: LeadFilter =
            serde_json::from_value(serde_json::json!({"dateRange": "quarter", "unassigned": true}))
                .unwrap();
        assert_eq!(filter.date_range, Some(DateRange::Quarter));
        assert_eq!(filter.unassigned, Some(true));
    }

    #[tokio::test]
    async fn test_concurrent_edits_keep_both_changes() {
        let (service, _) = setup_service();
        for i in 0..20 {
            let created = service.create(lead(&format!("L{}", i), "Co", "Kenya")).await.unwrap();
            let note = service.update(
                created.id,
                UpdateLeadInput {
                    notes: Some(Some("Sent samples".to_string())),
                    ..Default::default()
                },
            );
            let moved = service.move_to_stage(created.id, LeadStatus::Negotiation);
            let (note, moved) = tokio::join!(note, moved);
            note.unwrap();
            moved.unwrap();

            let saved = service.get(created.id).await.unwrap();
            assert_eq!(saved.status, LeadStatus::Negotiation);
            assert_eq!(saved.notes.as_deref(), Some("Sent samples"));
        }
    }

    #[tokio::test]
    async fn test_board_has_six_columns_in_order() {
        let (service, _) = setup_service();
        let a = service.create(lead("A", "Co", "Kenya")).await.unwrap();
        service.create(lead("B", "Co", "Kenya")).await.unwrap();
        service.move_to_stage(a.id, LeadStatus::Closed).await.unwrap();

        let board = service.board(&LeadFilter::default()).await.unwrap();
        let statuses: Vec<LeadStatus> = board.iter().map(|c| c.status).collect();
        assert_eq!(statuses, LeadStatus::PIPELINE.to_vec());
        assert_eq!(board[0].count, 1);
        assert_eq!(board[5].count, 1);
        assert_eq!(board.iter().map(|c| c.count).sum::<usize>(), 2);
    }

    #[tokio::test]
    async fn test_same_stage_move_is_noop() {
        let (service, _) = setup_service();
        let created = service.create(lead("A", "Co", "Kenya")).await.unwrap();

        let moved = service.move_to_stage(created.id, LeadStatus::New).await.unwrap();
        assert_eq!(moved.updated_at, created.updated_at);

        let moved = service.move_to_stage(created.id, LeadStatus::Contacted).await.unwrap();
        assert_eq!(moved.status, LeadStatus::Contacted);
        assert!(moved.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn test_assignee_must_exist() {
        let (service, users) = setup_service();
        let created = service.create(lead("A", "Co", "Kenya")).await.unwrap();

        let result = service
            .update(
                created.id,
                UpdateLeadInput {
                    assigned_to: Some(Some(Uuid::new_v4())),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(LeadServiceError::ValidationError(_))));

        let rep = users
            .create(&User::new(
                "sales1".to_string(),
                String::new(),
                UserRole::SalesTeam,
                "sales1@example.com".to_string(),
                "Sales One".to_string(),
            ))
            .await
            .unwrap();
        let updated = service
            .update(
                created.id,
                UpdateLeadInput {
                    assigned_to: Some(Some(rep.id)),
                    notes: Some(Some("Call Monday".to_string())),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.assigned_to, Some(rep.id));

        let mine = service
            .list(&LeadFilter {
                assigned_to: Some(rep.id),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(mine.len(), 1);

        let cleared = service
            .update(
                created.id,
                UpdateLeadInput {
                    assigned_to: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(cleared.assigned_to, None);
        assert_eq!(cleared.notes.as_deref(), Some("Call Monday"));
    }

    #[tokio::test]
    async fn test_missing_lead() {
        let (service, _) = setup_service();
        let id = Uuid::new_v4();
        assert!(matches!(service.get(id).await, Err(LeadServiceError::NotFound(_))));
        assert!(matches!(
            service.move_to_stage(id, LeadStatus::Quoted).await,
            Err(LeadServiceError::NotFound(_))
        ));
        assert!(matches!(service.delete(id).await, Err(LeadServiceError::NotFound(_))));
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn stage() -> impl Strategy<Value = LeadStatus> {
            (0usize..6).prop_map(|i| LeadStatus::PIPELINE[i])
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(24))]

            /// Board columns always partition the lead list
            #[test]
            fn board_partitions_leads(moves in proptest::collection::vec(stage(), 0..12)) {
                let rt = tokio::runtime::Runtime::new().unwrap();
                rt.block_on(async {
                    let (service, _) = setup_service();
                    for (i, status) in moves.iter().enumerate() {
                        let created = service.create(lead(&format!("L{}", i), "Co", "Kenya")).await.unwrap();
                        service.move_to_stage(created.id, *status).await.unwrap();
                    }

                    let board = service.board(&LeadFilter::default()).await.unwrap();
                    prop_assert_eq!(board.len(), 6);
                    prop_assert_eq!(board.iter().map(|c| c.count).sum::<usize>(), moves.len());
                    for column in &board {
                        prop_assert!(column.leads.iter().all(|l| l.status == column.status));
                        let expected = moves.iter().filter(|s| **s == column.status).count();
                        prop_assert_eq!(column.count, expected);
                    }
                    Ok(())
                })?;
            }
        }
    }
}
