use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::database::models::*;
use crate::database::storage::{Storage, StorageError, StorageResult};

/// In-process storage with the same observable semantics as [`PgStorage`].
///
/// Used by the test suite and by `serve --memory` for local development.
/// Every trait call bumps an operation counter so callers can assert that a
/// request never reached the data layer.
///
/// [`PgStorage`]: crate::database::PgStorage
#[derive(Default)]
pub struct MemoryStorage {
    tables: RwLock<Tables>,
    operations: AtomicU64,
}

#[derive(Default)]
struct Tables {
    next_id: HashMap<&'static str, i32>,
    users: BTreeMap<i32, User>,
    companies: BTreeMap<i32, Company>,
    jobs: BTreeMap<i32, Job>,
    applications: BTreeMap<i32, JobApplication>,
    connections: BTreeMap<i32, Connection>,
    messages: BTreeMap<i32, Message>,
    groups: BTreeMap<i32, Group>,
    memberships: Vec<GroupMembership>,
    vendors: BTreeMap<i32, Vendor>,
}

impl Tables {
    fn mint(&mut self, table: &'static str) -> i32 {
        let id = self.next_id.entry(table).or_insert(0);
        *id += 1;
        *id
    }
}

fn matches_any(term: &str, fields: &[Option<&str>]) -> bool {
    let needle = term.to_lowercase();
    fields
        .iter()
        .flatten()
        .any(|value| value.to_lowercase().contains(&needle))
}

fn newest_first<'a, T: Clone + 'a>(rows: impl DoubleEndedIterator<Item = &'a T>, limit: i64) -> Vec<T> {
    rows.rev().take(limit.max(0) as usize).cloned().collect()
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of storage operations served so far
    pub fn operations(&self) -> u64 {
        self.operations.load(Ordering::SeqCst)
    }

    fn record_op(&self) {
        self.operations.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn ping(&self) -> StorageResult<()> {
        self.record_op();
        Ok(())
    }

    async fn create_user(&self, user: NewUserRecord) -> StorageResult<User> {
        self.record_op();
        let mut t = self.tables.write().await;
        if t.users.values().any(|u| u.email.eq_ignore_ascii_case(&user.email)) {
            return Err(StorageError::Conflict("Email is already registered".into()));
        }
        let now = Utc::now();
        let row = User {
            id: t.mint("users"),
            email: user.email,
            password_hash: user.password_hash,
            first_name: user.first_name,
            last_name: user.last_name,
            user_type: user.user_type,
            headline: None,
            bio: None,
            location: None,
            avatar_url: None,
            created_at: now,
            updated_at: now,
        };
        t.users.insert(row.id, row.clone());
        Ok(row)
    }

    async fn get_user(&self, id: i32) -> StorageResult<Option<User>> {
        self.record_op();
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> StorageResult<Option<User>> {
        self.record_op();
        let t = self.tables.read().await;
        Ok(t.users.values().find(|u| u.email.eq_ignore_ascii_case(email)).cloned())
    }

    async fn update_user(&self, id: i32, update: UpdateProfile) -> StorageResult<Option<User>> {
        self.record_op();
        let mut t = self.tables.write().await;
        let Some(user) = t.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(v) = update.first_name {
            user.first_name = v;
        }
        if let Some(v) = update.last_name {
            user.last_name = v;
        }
        if update.headline.is_some() {
            user.headline = update.headline;
        }
        if update.bio.is_some() {
            user.bio = update.bio;
        }
        if update.location.is_some() {
            user.location = update.location;
        }
        if update.avatar_url.is_some() {
            user.avatar_url = update.avatar_url;
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn search_users(&self, query: Option<&str>, limit: i64) -> StorageResult<Vec<User>> {
        self.record_op();
        let t = self.tables.read().await;
        Ok(t.users
            .values()
            .filter(|u| {
                query.map_or(true, |q| {
                    matches_any(
                        q,
                        &[Some(&u.first_name), Some(&u.last_name), Some(&u.email), u.headline.as_deref()],
                    )
                })
            })
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn list_companies(&self, filter: &CompanyFilter) -> StorageResult<Vec<Company>> {
        self.record_op();
        let t = self.tables.read().await;
        let rows = t.companies.values().filter(|c| {
            filter.status.map_or(true, |s| c.status == s)
                && filter.query.as_deref().map_or(true, |q| {
                    matches_any(
                        q,
                        &[
                            Some(&c.name),
                            c.industry.as_deref(),
                            c.description.as_deref(),
                            c.location.as_deref(),
                        ],
                    )
                })
        });
        Ok(newest_first(rows, filter.limit))
    }

    async fn get_company(&self, id: i32) -> StorageResult<Option<Company>> {
        self.record_op();
        Ok(self.tables.read().await.companies.get(&id).cloned())
    }

    async fn create_company(&self, owner_id: i32, company: NewCompany) -> StorageResult<Company> {
        self.record_op();
        let mut t = self.tables.write().await;
        if !t.users.contains_key(&owner_id) {
            return Err(StorageError::InvalidReference("Owner does not exist".into()));
        }
        let now = Utc::now();
        let row = Company {
            id: t.mint("companies"),
            owner_id,
            name: company.name.unwrap_or_default(),
            description: company.description,
            industry: company.industry,
            website: company.website,
            location: company.location,
            logo_url: None,
            status: ApprovalStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        t.companies.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_company(&self, id: i32, update: UpdateCompany) -> StorageResult<Option<Company>> {
        self.record_op();
        let mut t = self.tables.write().await;
        let Some(company) = t.companies.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(v) = update.name {
            company.name = v;
        }
        if update.description.is_some() {
            company.description = update.description;
        }
        if update.industry.is_some() {
            company.industry = update.industry;
        }
        if update.website.is_some() {
            company.website = update.website;
        }
        if update.location.is_some() {
            company.location = update.location;
        }
        company.updated_at = Utc::now();
        Ok(Some(company.clone()))
    }

    async fn set_company_status(&self, id: i32, status: ApprovalStatus) -> StorageResult<Option<Company>> {
        self.record_op();
        let mut t = self.tables.write().await;
        Ok(t.companies.get_mut(&id).map(|company| {
            if company.status != status {
                company.status = status;
                company.updated_at = Utc::now();
            }
            company.clone()
        }))
    }

    async fn set_company_logo(&self, id: i32, logo_url: &str) -> StorageResult<Option<Company>> {
        self.record_op();
        let mut t = self.tables.write().await;
        Ok(t.companies.get_mut(&id).map(|company| {
            company.logo_url = Some(logo_url.to_string());
            company.updated_at = Utc::now();
            company.clone()
        }))
    }

    async fn delete_company(&self, id: i32) -> StorageResult<bool> {
        self.record_op();
        let mut t = self.tables.write().await;
        if t.companies.remove(&id).is_none() {
            return Ok(false);
        }
        let job_ids: Vec<i32> = t.jobs.values().filter(|j| j.company_id == id).map(|j| j.id).collect();
        t.jobs.retain(|_, j| j.company_id != id);
        t.applications.retain(|_, a| !job_ids.contains(&a.job_id));
        t.vendors.retain(|_, v| v.company_id != id);
        Ok(true)
    }

    async fn list_jobs(&self, filter: &JobFilter) -> StorageResult<Vec<Job>> {
        self.record_op();
        let t = self.tables.read().await;
        let rows = t.jobs.values().filter(|j| {
            (!filter.active_only || j.is_active)
                && filter.job_type.map_or(true, |v| j.job_type == v)
                && filter.experience_level.map_or(true, |v| j.experience_level == v)
                && filter.company_id.map_or(true, |v| j.company_id == v)
                && filter.location.as_deref().map_or(true, |l| matches_any(l, &[Some(&j.location)]))
                && filter.query.as_deref().map_or(true, |q| {
                    matches_any(q, &[Some(&j.title), Some(&j.description), Some(&j.location)])
                })
        });
        Ok(newest_first(rows, filter.limit))
    }

    async fn get_job(&self, id: i32) -> StorageResult<Option<Job>> {
        self.record_op();
        Ok(self.tables.read().await.jobs.get(&id).cloned())
    }

    async fn create_job(&self, job: NewJobRecord) -> StorageResult<Job> {
        self.record_op();
        let mut t = self.tables.write().await;
        if !t.companies.contains_key(&job.company_id) {
            return Err(StorageError::InvalidReference("Company does not exist".into()));
        }
        let now = Utc::now();
        let row = Job {
            id: t.mint("jobs"),
            company_id: job.company_id,
            posted_by: job.posted_by,
            title: job.title,
            description: job.description,
            requirements: job.requirements,
            job_type: job.job_type,
            experience_level: job.experience_level,
            city: job.city,
            state: job.state,
            country: job.country,
            location: job.location,
            salary_min: job.salary_min,
            salary_max: job.salary_max,
            is_active: job.is_active,
            created_at: now,
            updated_at: now,
        };
        t.jobs.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_job(&self, id: i32, update: UpdateJob) -> StorageResult<Option<Job>> {
        self.record_op();
        let mut t = self.tables.write().await;
        let Some(job) = t.jobs.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(v) = update.title {
            job.title = v;
        }
        if let Some(v) = update.description {
            job.description = v;
        }
        if update.requirements.is_some() {
            job.requirements = update.requirements;
        }
        if let Some(v) = update.job_type {
            job.job_type = v;
        }
        if let Some(v) = update.experience_level {
            job.experience_level = v;
        }
        if let Some(v) = update.location {
            job.location = v;
        }
        if update.city.is_some() {
            job.city = update.city;
        }
        if update.state.is_some() {
            job.state = update.state;
        }
        if update.country.is_some() {
            job.country = update.country;
        }
        if update.salary_min.is_some() {
            job.salary_min = update.salary_min;
        }
        if update.salary_max.is_some() {
            job.salary_max = update.salary_max;
        }
        if let Some(v) = update.is_active {
            job.is_active = v;
        }
        job.updated_at = Utc::now();
        Ok(Some(job.clone()))
    }

    async fn delete_job(&self, id: i32) -> StorageResult<bool> {
        self.record_op();
        let mut t = self.tables.write().await;
        if t.jobs.remove(&id).is_none() {
            return Ok(false);
        }
        t.applications.retain(|_, a| a.job_id != id);
        Ok(true)
    }

    async fn create_application(&self, application: NewApplicationRecord) -> StorageResult<JobApplication> {
        self.record_op();
        let mut t = self.tables.write().await;
        if !t.jobs.contains_key(&application.job_id) {
            return Err(StorageError::InvalidReference("Job does not exist".into()));
        }
        if !t.users.contains_key(&application.applicant_id) {
            return Err(StorageError::InvalidReference("Applicant does not exist".into()));
        }
        if t.applications
            .values()
            .any(|a| a.job_id == application.job_id && a.applicant_id == application.applicant_id)
        {
            return Err(StorageError::Conflict("You have already applied to this job".into()));
        }
        let now = Utc::now();
        let row = JobApplication {
            id: t.mint("applications"),
            job_id: application.job_id,
            applicant_id: application.applicant_id,
            cover_letter: application.cover_letter,
            resume_url: application.resume_url,
            status: ApplicationStatus::Submitted,
            created_at: now,
            updated_at: now,
        };
        t.applications.insert(row.id, row.clone());
        Ok(row)
    }

    async fn get_application(&self, id: i32) -> StorageResult<Option<JobApplication>> {
        self.record_op();
        Ok(self.tables.read().await.applications.get(&id).cloned())
    }

    async fn list_applications_for_job(&self, job_id: i32) -> StorageResult<Vec<JobApplication>> {
        self.record_op();
        let t = self.tables.read().await;
        Ok(newest_first(t.applications.values().filter(|a| a.job_id == job_id), i64::MAX))
    }

    async fn list_applications_for_user(&self, applicant_id: i32) -> StorageResult<Vec<JobApplication>> {
        self.record_op();
        let t = self.tables.read().await;
        Ok(newest_first(
            t.applications.values().filter(|a| a.applicant_id == applicant_id),
            i64::MAX,
        ))
    }

    async fn set_application_status(
        &self,
        id: i32,
        status: ApplicationStatus,
    ) -> StorageResult<Option<JobApplication>> {
        self.record_op();
        let mut t = self.tables.write().await;
        Ok(t.applications.get_mut(&id).map(|application| {
            if application.status != status {
                application.status = status;
                application.updated_at = Utc::now();
            }
            application.clone()
        }))
    }

    async fn delete_application(&self, id: i32) -> StorageResult<bool> {
        self.record_op();
        Ok(self.tables.write().await.applications.remove(&id).is_some())
    }

    async fn create_connection(&self, requester_id: i32, addressee_id: i32) -> StorageResult<Connection> {
        self.record_op();
        let mut t = self.tables.write().await;
        if !t.users.contains_key(&requester_id) || !t.users.contains_key(&addressee_id) {
            return Err(StorageError::InvalidReference("User does not exist".into()));
        }
        if t.connections
            .values()
            .any(|c| c.involves(requester_id) && c.involves(addressee_id))
        {
            return Err(StorageError::Conflict("Connection already exists".into()));
        }
        let now = Utc::now();
        let row = Connection {
            id: t.mint("connections"),
            requester_id,
            addressee_id,
            status: ConnectionStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        t.connections.insert(row.id, row.clone());
        Ok(row)
    }

    async fn get_connection(&self, id: i32) -> StorageResult<Option<Connection>> {
        self.record_op();
        Ok(self.tables.read().await.connections.get(&id).cloned())
    }

    async fn list_connections(&self, user_id: i32, status: ConnectionStatus) -> StorageResult<Vec<Connection>> {
        self.record_op();
        let t = self.tables.read().await;
        Ok(newest_first(
            t.connections.values().filter(|c| c.involves(user_id) && c.status == status),
            i64::MAX,
        ))
    }

    async fn list_connection_requests(&self, user_id: i32) -> StorageResult<Vec<Connection>> {
        self.record_op();
        let t = self.tables.read().await;
        Ok(newest_first(
            t.connections
                .values()
                .filter(|c| c.addressee_id == user_id && c.status == ConnectionStatus::Pending),
            i64::MAX,
        ))
    }

    async fn set_connection_status(
        &self,
        id: i32,
        status: ConnectionStatus,
    ) -> StorageResult<Option<Connection>> {
        self.record_op();
        let mut t = self.tables.write().await;
        Ok(t.connections.get_mut(&id).map(|connection| {
            if connection.status != status {
                connection.status = status;
                connection.updated_at = Utc::now();
            }
            connection.clone()
        }))
    }

    async fn delete_connection(&self, id: i32) -> StorageResult<bool> {
        self.record_op();
        Ok(self.tables.write().await.connections.remove(&id).is_some())
    }

    async fn create_message(&self, sender_id: i32, recipient_id: i32, content: &str) -> StorageResult<Message> {
        self.record_op();
        let mut t = self.tables.write().await;
        if !t.users.contains_key(&sender_id) || !t.users.contains_key(&recipient_id) {
            return Err(StorageError::InvalidReference("Recipient does not exist".into()));
        }
        let row = Message {
            id: t.mint("messages"),
            sender_id,
            recipient_id,
            content: content.to_string(),
            is_read: false,
            sent_at: Utc::now(),
        };
        t.messages.insert(row.id, row.clone());
        Ok(row)
    }

    async fn get_message(&self, id: i32) -> StorageResult<Option<Message>> {
        self.record_op();
        Ok(self.tables.read().await.messages.get(&id).cloned())
    }

    async fn list_conversation(&self, user_id: i32, peer_id: i32, limit: i64) -> StorageResult<Vec<Message>> {
        self.record_op();
        let t = self.tables.read().await;
        let mut recent = newest_first(
            t.messages.values().filter(|m| {
                (m.sender_id == user_id && m.recipient_id == peer_id)
                    || (m.sender_id == peer_id && m.recipient_id == user_id)
            }),
            limit,
        );
        recent.reverse();
        Ok(recent)
    }

    async fn list_conversations(&self, user_id: i32) -> StorageResult<Vec<ConversationSummary>> {
        self.record_op();
        let t = self.tables.read().await;
        let mut by_partner: BTreeMap<i32, ConversationSummary> = BTreeMap::new();
        // Ascending id order, so later messages overwrite earlier ones
        for m in t.messages.values() {
            let partner_id = if m.sender_id == user_id {
                m.recipient_id
            } else if m.recipient_id == user_id {
                m.sender_id
            } else {
                continue;
            };
            let unread = i64::from(m.recipient_id == user_id && !m.is_read);
            by_partner
                .entry(partner_id)
                .and_modify(|s| {
                    s.last_message = m.clone();
                    s.unread_count += unread;
                })
                .or_insert_with(|| ConversationSummary {
                    partner_id,
                    last_message: m.clone(),
                    unread_count: unread,
                });
        }
        let mut summaries: Vec<ConversationSummary> = by_partner.into_values().collect();
        summaries.sort_by(|a, b| b.last_message.id.cmp(&a.last_message.id));
        Ok(summaries)
    }

    async fn mark_message_read(&self, id: i32) -> StorageResult<Option<Message>> {
        self.record_op();
        let mut t = self.tables.write().await;
        Ok(t.messages.get_mut(&id).map(|message| {
            message.is_read = true;
            message.clone()
        }))
    }

    async fn count_unread_messages(&self, user_id: i32) -> StorageResult<i64> {
        self.record_op();
        let t = self.tables.read().await;
        Ok(t.messages
            .values()
            .filter(|m| m.recipient_id == user_id && !m.is_read)
            .count() as i64)
    }

    async fn create_group(&self, created_by: i32, name: &str, description: Option<&str>) -> StorageResult<Group> {
        self.record_op();
        let mut t = self.tables.write().await;
        if !t.users.contains_key(&created_by) {
            return Err(StorageError::InvalidReference("User does not exist".into()));
        }
        let now = Utc::now();
        let group = Group {
            id: t.mint("groups"),
            name: name.to_string(),
            description: description.map(str::to_string),
            created_by,
            created_at: now,
        };
        t.groups.insert(group.id, group.clone());
        t.memberships.push(GroupMembership {
            group_id: group.id,
            user_id: created_by,
            role: GroupRole::Owner,
            joined_at: now,
        });
        Ok(group)
    }

    async fn get_group(&self, id: i32) -> StorageResult<Option<Group>> {
        self.record_op();
        Ok(self.tables.read().await.groups.get(&id).cloned())
    }

    async fn list_groups(&self, filter: &GroupFilter) -> StorageResult<Vec<Group>> {
        self.record_op();
        let t = self.tables.read().await;
        let rows = t.groups.values().filter(|g| {
            filter
                .query
                .as_deref()
                .map_or(true, |q| matches_any(q, &[Some(&g.name), g.description.as_deref()]))
        });
        Ok(newest_first(rows, filter.limit))
    }

    async fn list_user_groups(&self, user_id: i32) -> StorageResult<Vec<Group>> {
        self.record_op();
        let t = self.tables.read().await;
        Ok(t.memberships
            .iter()
            .rev()
            .filter(|m| m.user_id == user_id)
            .filter_map(|m| t.groups.get(&m.group_id).cloned())
            .collect())
    }

    async fn add_group_member(&self, group_id: i32, user_id: i32, role: GroupRole) -> StorageResult<GroupMembership> {
        self.record_op();
        let mut t = self.tables.write().await;
        if !t.groups.contains_key(&group_id) {
            return Err(StorageError::InvalidReference("Group does not exist".into()));
        }
        if t.memberships.iter().any(|m| m.group_id == group_id && m.user_id == user_id) {
            return Err(StorageError::Conflict("Already a member of this group".into()));
        }
        let membership = GroupMembership {
            group_id,
            user_id,
            role,
            joined_at: Utc::now(),
        };
        t.memberships.push(membership.clone());
        Ok(membership)
    }

    async fn remove_group_member(&self, group_id: i32, user_id: i32) -> StorageResult<bool> {
        self.record_op();
        let mut t = self.tables.write().await;
        let before = t.memberships.len();
        t.memberships.retain(|m| !(m.group_id == group_id && m.user_id == user_id));
        Ok(t.memberships.len() < before)
    }

    async fn list_group_members(&self, group_id: i32) -> StorageResult<Vec<GroupMembership>> {
        self.record_op();
        let t = self.tables.read().await;
        Ok(t.memberships.iter().filter(|m| m.group_id == group_id).cloned().collect())
    }

    async fn create_vendor(&self, created_by: i32, vendor: NewVendor) -> StorageResult<Vendor> {
        self.record_op();
        let mut t = self.tables.write().await;
        let company_id = vendor.company_id.unwrap_or_default();
        if !t.companies.contains_key(&company_id) {
            return Err(StorageError::InvalidReference("Company does not exist".into()));
        }
        let now = Utc::now();
        let row = Vendor {
            id: t.mint("vendors"),
            company_id,
            created_by,
            name: vendor.name.unwrap_or_default(),
            email: vendor.email,
            phone: vendor.phone,
            services: vendor.services,
            status: ApprovalStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        t.vendors.insert(row.id, row.clone());
        Ok(row)
    }

    async fn get_vendor(&self, id: i32) -> StorageResult<Option<Vendor>> {
        self.record_op();
        Ok(self.tables.read().await.vendors.get(&id).cloned())
    }

    async fn list_vendors(&self, filter: &VendorFilter) -> StorageResult<Vec<Vendor>> {
        self.record_op();
        let t = self.tables.read().await;
        let rows = t.vendors.values().filter(|v| {
            filter.status.map_or(true, |s| v.status == s) && filter.company_id.map_or(true, |c| v.company_id == c)
        });
        Ok(newest_first(rows, filter.limit))
    }

    async fn set_vendor_status(&self, id: i32, status: ApprovalStatus) -> StorageResult<Option<Vendor>> {
        self.record_op();
        let mut t = self.tables.write().await;
        Ok(t.vendors.get_mut(&id).map(|vendor| {
            if vendor.status != status {
                vendor.status = status;
                vendor.updated_at = Utc::now();
            }
            vendor.clone()
        }))
    }
}
