use async_trait::async_trait;
use thiserror::Error;

use crate::database::models::*;

/// Errors surfaced by a storage backend
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    InvalidReference(String),

    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Data-access collaborator behind every handler.
///
/// Singular lookups return `Ok(None)` when the row is absent so handlers can
/// choose the not-found message. Mutations of absent rows also return `None`
/// (or `false` for deletes). Unique violations surface as
/// [`StorageError::Conflict`], dangling references as
/// [`StorageError::InvalidReference`].
#[async_trait]
pub trait Storage: Send + Sync {
    async fn ping(&self) -> StorageResult<()>;

    // Users
    async fn create_user(&self, user: NewUserRecord) -> StorageResult<User>;
    async fn get_user(&self, id: i32) -> StorageResult<Option<User>>;
    async fn get_user_by_email(&self, email: &str) -> StorageResult<Option<User>>;
    async fn update_user(&self, id: i32, update: UpdateProfile) -> StorageResult<Option<User>>;
    async fn search_users(&self, query: Option<&str>, limit: i64) -> StorageResult<Vec<User>>;

    // Companies
    async fn list_companies(&self, filter: &CompanyFilter) -> StorageResult<Vec<Company>>;
    async fn get_company(&self, id: i32) -> StorageResult<Option<Company>>;
    async fn create_company(&self, owner_id: i32, company: NewCompany) -> StorageResult<Company>;
    async fn update_company(&self, id: i32, update: UpdateCompany) -> StorageResult<Option<Company>>;
    async fn set_company_status(&self, id: i32, status: ApprovalStatus) -> StorageResult<Option<Company>>;
    async fn set_company_logo(&self, id: i32, logo_url: &str) -> StorageResult<Option<Company>>;
    async fn delete_company(&self, id: i32) -> StorageResult<bool>;

    // Jobs
    async fn list_jobs(&self, filter: &JobFilter) -> StorageResult<Vec<Job>>;
    async fn get_job(&self, id: i32) -> StorageResult<Option<Job>>;
    async fn create_job(&self, job: NewJobRecord) -> StorageResult<Job>;
    async fn update_job(&self, id: i32, update: UpdateJob) -> StorageResult<Option<Job>>;
    async fn delete_job(&self, id: i32) -> StorageResult<bool>;

    // Applications
    async fn create_application(&self, application: NewApplicationRecord) -> StorageResult<JobApplication>;
    async fn get_application(&self, id: i32) -> StorageResult<Option<JobApplication>>;
    async fn list_applications_for_job(&self, job_id: i32) -> StorageResult<Vec<JobApplication>>;
    async fn list_applications_for_user(&self, applicant_id: i32) -> StorageResult<Vec<JobApplication>>;
    async fn set_application_status(
        &self,
        id: i32,
        status: ApplicationStatus,
    ) -> StorageResult<Option<JobApplication>>;
    async fn delete_application(&self, id: i32) -> StorageResult<bool>;

    // Connections
    async fn create_connection(&self, requester_id: i32, addressee_id: i32) -> StorageResult<Connection>;
    async fn get_connection(&self, id: i32) -> StorageResult<Option<Connection>>;
    /// Connections of `user_id` in `status`, in either direction
    async fn list_connections(&self, user_id: i32, status: ConnectionStatus) -> StorageResult<Vec<Connection>>;
    /// Pending requests addressed to `user_id`
    async fn list_connection_requests(&self, user_id: i32) -> StorageResult<Vec<Connection>>;
    async fn set_connection_status(
        &self,
        id: i32,
        status: ConnectionStatus,
    ) -> StorageResult<Option<Connection>>;
    async fn delete_connection(&self, id: i32) -> StorageResult<bool>;

    // Messages
    async fn create_message(&self, sender_id: i32, recipient_id: i32, content: &str) -> StorageResult<Message>;
    async fn get_message(&self, id: i32) -> StorageResult<Option<Message>>;
    /// Messages between two users, oldest first
    async fn list_conversation(&self, user_id: i32, peer_id: i32, limit: i64) -> StorageResult<Vec<Message>>;
    /// One summary per partner, most recent conversation first
    async fn list_conversations(&self, user_id: i32) -> StorageResult<Vec<ConversationSummary>>;
    async fn mark_message_read(&self, id: i32) -> StorageResult<Option<Message>>;
    async fn count_unread_messages(&self, user_id: i32) -> StorageResult<i64>;

    // Groups
    /// Creates the group and enrolls the creator as owner
    async fn create_group(&self, created_by: i32, name: &str, description: Option<&str>) -> StorageResult<Group>;
    async fn get_group(&self, id: i32) -> StorageResult<Option<Group>>;
    async fn list_groups(&self, filter: &GroupFilter) -> StorageResult<Vec<Group>>;
    async fn list_user_groups(&self, user_id: i32) -> StorageResult<Vec<Group>>;
    async fn add_group_member(&self, group_id: i32, user_id: i32, role: GroupRole) -> StorageResult<GroupMembership>;
    async fn remove_group_member(&self, group_id: i32, user_id: i32) -> StorageResult<bool>;
    async fn list_group_members(&self, group_id: i32) -> StorageResult<Vec<GroupMembership>>;

    // Vendors
    async fn create_vendor(&self, created_by: i32, vendor: NewVendor) -> StorageResult<Vendor>;
    async fn get_vendor(&self, id: i32) -> StorageResult<Option<Vendor>>;
    async fn list_vendors(&self, filter: &VendorFilter) -> StorageResult<Vec<Vendor>>;
    async fn set_vendor_status(&self, id: i32, status: ApprovalStatus) -> StorageResult<Option<Vendor>>;
}
