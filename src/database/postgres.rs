use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::database::models::*;
use crate::database::storage::{Storage, StorageError, StorageResult};

/// PostgreSQL-backed storage using runtime-checked sqlx queries
#[derive(Clone)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Postgres SQLSTATE codes we translate
const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

fn map_write_error(err: sqlx::Error, conflict: &str, reference: &str) -> StorageError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.code().as_deref() {
            Some(UNIQUE_VIOLATION) => return StorageError::Conflict(conflict.to_string()),
            Some(FOREIGN_KEY_VIOLATION) => return StorageError::InvalidReference(reference.to_string()),
            _ => {}
        }
    }
    StorageError::Sqlx(err)
}

/// ILIKE pattern matching `term` anywhere, with wildcards in the term escaped
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn push_text_match(qb: &mut QueryBuilder<'_, Postgres>, columns: &[&str], term: &str) {
    let pattern = like_pattern(term);
    qb.push(" AND (");
    for (i, column) in columns.iter().enumerate() {
        if i > 0 {
            qb.push(" OR ");
        }
        qb.push(*column).push(" ILIKE ").push_bind(pattern.clone());
    }
    qb.push(")");
}

#[derive(sqlx::FromRow)]
struct ConversationRow {
    partner_id: i32,
    #[sqlx(flatten)]
    message: Message,
}

#[async_trait]
impl Storage for PgStorage {
    async fn ping(&self) -> StorageResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn create_user(&self, user: NewUserRecord) -> StorageResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, first_name, last_name, user_type)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.user_type)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Email is already registered", "Invalid user reference"))
    }

    async fn get_user(&self, id: i32) -> StorageResult<Option<User>> {
        Ok(sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn get_user_by_email(&self, email: &str) -> StorageResult<Option<User>> {
        Ok(sqlx::query_as::<_, User>("SELECT * FROM users WHERE lower(email) = lower($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn update_user(&self, id: i32, update: UpdateProfile) -> StorageResult<Option<User>> {
        Ok(sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                first_name = COALESCE($2, first_name),
                last_name  = COALESCE($3, last_name),
                headline   = COALESCE($4, headline),
                bio        = COALESCE($5, bio),
                location   = COALESCE($6, location),
                avatar_url = COALESCE($7, avatar_url),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(update.first_name)
        .bind(update.last_name)
        .bind(update.headline)
        .bind(update.bio)
        .bind(update.location)
        .bind(update.avatar_url)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn search_users(&self, query: Option<&str>, limit: i64) -> StorageResult<Vec<User>> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM users WHERE TRUE");
        if let Some(term) = query {
            push_text_match(&mut qb, &["first_name", "last_name", "email", "headline"], term);
        }
        qb.push(" ORDER BY id LIMIT ").push_bind(limit);
        Ok(qb.build_query_as::<User>().fetch_all(&self.pool).await?)
    }

    async fn list_companies(&self, filter: &CompanyFilter) -> StorageResult<Vec<Company>> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM companies WHERE TRUE");
        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status);
        }
        if let Some(term) = filter.query.as_deref() {
            push_text_match(&mut qb, &["name", "industry", "description", "location"], term);
        }
        qb.push(" ORDER BY created_at DESC, id DESC LIMIT ").push_bind(filter.limit);
        Ok(qb.build_query_as::<Company>().fetch_all(&self.pool).await?)
    }

    async fn get_company(&self, id: i32) -> StorageResult<Option<Company>> {
        Ok(sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_company(&self, owner_id: i32, company: NewCompany) -> StorageResult<Company> {
        sqlx::query_as::<_, Company>(
            r#"
            INSERT INTO companies (owner_id, name, description, industry, website, location)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(owner_id)
        .bind(company.name.unwrap_or_default())
        .bind(company.description)
        .bind(company.industry)
        .bind(company.website)
        .bind(company.location)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Company already exists", "Owner does not exist"))
    }

    async fn update_company(&self, id: i32, update: UpdateCompany) -> StorageResult<Option<Company>> {
        Ok(sqlx::query_as::<_, Company>(
            r#"
            UPDATE companies SET
                name        = COALESCE($2, name),
                description = COALESCE($3, description),
                industry    = COALESCE($4, industry),
                website     = COALESCE($5, website),
                location    = COALESCE($6, location),
                updated_at  = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(update.name)
        .bind(update.description)
        .bind(update.industry)
        .bind(update.website)
        .bind(update.location)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn set_company_status(&self, id: i32, status: ApprovalStatus) -> StorageResult<Option<Company>> {
        // Re-applying the current status leaves updated_at alone
        Ok(sqlx::query_as::<_, Company>(
            r#"
            UPDATE companies SET
                updated_at = CASE WHEN status = $2 THEN updated_at ELSE now() END,
                status = $2
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn set_company_logo(&self, id: i32, logo_url: &str) -> StorageResult<Option<Company>> {
        Ok(sqlx::query_as::<_, Company>(
            "UPDATE companies SET logo_url = $2, updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(logo_url)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn delete_company(&self, id: i32) -> StorageResult<bool> {
        let result = sqlx::query("DELETE FROM companies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_error(e, "Company is still referenced", "Company is still referenced"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_jobs(&self, filter: &JobFilter) -> StorageResult<Vec<Job>> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM jobs WHERE TRUE");
        if filter.active_only {
            qb.push(" AND is_active");
        }
        if let Some(job_type) = filter.job_type {
            qb.push(" AND job_type = ").push_bind(job_type);
        }
        if let Some(level) = filter.experience_level {
            qb.push(" AND experience_level = ").push_bind(level);
        }
        if let Some(company_id) = filter.company_id {
            qb.push(" AND company_id = ").push_bind(company_id);
        }
        if let Some(location) = filter.location.as_deref() {
            qb.push(" AND location ILIKE ").push_bind(like_pattern(location));
        }
        if let Some(term) = filter.query.as_deref() {
            push_text_match(&mut qb, &["title", "description", "location"], term);
        }
        qb.push(" ORDER BY created_at DESC, id DESC LIMIT ").push_bind(filter.limit);
        Ok(qb.build_query_as::<Job>().fetch_all(&self.pool).await?)
    }

    async fn get_job(&self, id: i32) -> StorageResult<Option<Job>> {
        Ok(sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_job(&self, job: NewJobRecord) -> StorageResult<Job> {
        sqlx::query_as::<_, Job>(
            r#"
            INSERT INTO jobs (
                company_id, posted_by, title, description, requirements, job_type,
                experience_level, city, state, country, location, salary_min, salary_max, is_active
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING *
            "#,
        )
        .bind(job.company_id)
        .bind(job.posted_by)
        .bind(job.title)
        .bind(job.description)
        .bind(job.requirements)
        .bind(job.job_type)
        .bind(job.experience_level)
        .bind(job.city)
        .bind(job.state)
        .bind(job.country)
        .bind(job.location)
        .bind(job.salary_min)
        .bind(job.salary_max)
        .bind(job.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Job already exists", "Company does not exist"))
    }

    async fn update_job(&self, id: i32, update: UpdateJob) -> StorageResult<Option<Job>> {
        Ok(sqlx::query_as::<_, Job>(
            r#"
            UPDATE jobs SET
                title            = COALESCE($2, title),
                description      = COALESCE($3, description),
                requirements     = COALESCE($4, requirements),
                job_type         = COALESCE($5, job_type),
                experience_level = COALESCE($6, experience_level),
                location         = COALESCE($7, location),
                city             = COALESCE($8, city),
                state            = COALESCE($9, state),
                country          = COALESCE($10, country),
                salary_min       = COALESCE($11, salary_min),
                salary_max       = COALESCE($12, salary_max),
                is_active        = COALESCE($13, is_active),
                updated_at       = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(update.title)
        .bind(update.description)
        .bind(update.requirements)
        .bind(update.job_type)
        .bind(update.experience_level)
        .bind(update.location)
        .bind(update.city)
        .bind(update.state)
        .bind(update.country)
        .bind(update.salary_min)
        .bind(update.salary_max)
        .bind(update.is_active)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn delete_job(&self, id: i32) -> StorageResult<bool> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_application(&self, application: NewApplicationRecord) -> StorageResult<JobApplication> {
        sqlx::query_as::<_, JobApplication>(
            r#"
            INSERT INTO job_applications (job_id, applicant_id, cover_letter, resume_url)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(application.job_id)
        .bind(application.applicant_id)
        .bind(application.cover_letter)
        .bind(application.resume_url)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "You have already applied to this job", "Job does not exist"))
    }

    async fn get_application(&self, id: i32) -> StorageResult<Option<JobApplication>> {
        Ok(sqlx::query_as::<_, JobApplication>("SELECT * FROM job_applications WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_applications_for_job(&self, job_id: i32) -> StorageResult<Vec<JobApplication>> {
        Ok(sqlx::query_as::<_, JobApplication>(
            "SELECT * FROM job_applications WHERE job_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn list_applications_for_user(&self, applicant_id: i32) -> StorageResult<Vec<JobApplication>> {
        Ok(sqlx::query_as::<_, JobApplication>(
            "SELECT * FROM job_applications WHERE applicant_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(applicant_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn set_application_status(
        &self,
        id: i32,
        status: ApplicationStatus,
    ) -> StorageResult<Option<JobApplication>> {
        Ok(sqlx::query_as::<_, JobApplication>(
            r#"
            UPDATE job_applications SET
                updated_at = CASE WHEN status = $2 THEN updated_at ELSE now() END,
                status = $2
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn delete_application(&self, id: i32) -> StorageResult<bool> {
        let result = sqlx::query("DELETE FROM job_applications WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_connection(&self, requester_id: i32, addressee_id: i32) -> StorageResult<Connection> {
        sqlx::query_as::<_, Connection>(
            "INSERT INTO connections (requester_id, addressee_id) VALUES ($1, $2) RETURNING *",
        )
        .bind(requester_id)
        .bind(addressee_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Connection already exists", "User does not exist"))
    }

    async fn get_connection(&self, id: i32) -> StorageResult<Option<Connection>> {
        Ok(sqlx::query_as::<_, Connection>("SELECT * FROM connections WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_connections(&self, user_id: i32, status: ConnectionStatus) -> StorageResult<Vec<Connection>> {
        Ok(sqlx::query_as::<_, Connection>(
            r#"
            SELECT * FROM connections
            WHERE (requester_id = $1 OR addressee_id = $1) AND status = $2
            ORDER BY updated_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .bind(status)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn list_connection_requests(&self, user_id: i32) -> StorageResult<Vec<Connection>> {
        Ok(sqlx::query_as::<_, Connection>(
            r#"
            SELECT * FROM connections
            WHERE addressee_id = $1 AND status = 'pending'
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn set_connection_status(
        &self,
        id: i32,
        status: ConnectionStatus,
    ) -> StorageResult<Option<Connection>> {
        Ok(sqlx::query_as::<_, Connection>(
            r#"
            UPDATE connections SET
                updated_at = CASE WHEN status = $2 THEN updated_at ELSE now() END,
                status = $2
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn delete_connection(&self, id: i32) -> StorageResult<bool> {
        let result = sqlx::query("DELETE FROM connections WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_message(&self, sender_id: i32, recipient_id: i32, content: &str) -> StorageResult<Message> {
        sqlx::query_as::<_, Message>(
            "INSERT INTO messages (sender_id, recipient_id, content) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(sender_id)
        .bind(recipient_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Duplicate message", "Recipient does not exist"))
    }

    async fn get_message(&self, id: i32) -> StorageResult<Option<Message>> {
        Ok(sqlx::query_as::<_, Message>("SELECT * FROM messages WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_conversation(&self, user_id: i32, peer_id: i32, limit: i64) -> StorageResult<Vec<Message>> {
        Ok(sqlx::query_as::<_, Message>(
            r#"
            SELECT * FROM (
                SELECT * FROM messages
                WHERE (sender_id = $1 AND recipient_id = $2)
                   OR (sender_id = $2 AND recipient_id = $1)
                ORDER BY sent_at DESC, id DESC
                LIMIT $3
            ) recent
            ORDER BY sent_at, id
            "#,
        )
        .bind(user_id)
        .bind(peer_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn list_conversations(&self, user_id: i32) -> StorageResult<Vec<ConversationSummary>> {
        let latest = sqlx::query_as::<_, ConversationRow>(
            r#"
            SELECT DISTINCT ON (partner_id) *
            FROM (
                SELECT m.*,
                       CASE WHEN m.sender_id = $1 THEN m.recipient_id ELSE m.sender_id END AS partner_id
                FROM messages m
                WHERE m.sender_id = $1 OR m.recipient_id = $1
            ) t
            ORDER BY partner_id, sent_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let unread: HashMap<i32, i64> = sqlx::query_as::<_, (i32, i64)>(
            r#"
            SELECT sender_id, COUNT(*) FROM messages
            WHERE recipient_id = $1 AND NOT is_read
            GROUP BY sender_id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .collect();

        let mut summaries: Vec<ConversationSummary> = latest
            .into_iter()
            .map(|row| ConversationSummary {
                unread_count: unread.get(&row.partner_id).copied().unwrap_or(0),
                partner_id: row.partner_id,
                last_message: row.message,
            })
            .collect();
        summaries.sort_by(|a, b| {
            (b.last_message.sent_at, b.last_message.id).cmp(&(a.last_message.sent_at, a.last_message.id))
        });
        Ok(summaries)
    }

    async fn mark_message_read(&self, id: i32) -> StorageResult<Option<Message>> {
        Ok(sqlx::query_as::<_, Message>("UPDATE messages SET is_read = TRUE WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn count_unread_messages(&self, user_id: i32) -> StorageResult<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM messages WHERE recipient_id = $1 AND NOT is_read")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    async fn create_group(&self, created_by: i32, name: &str, description: Option<&str>) -> StorageResult<Group> {
        let mut tx = self.pool.begin().await?;

        let group = sqlx::query_as::<_, Group>(
            "INSERT INTO groups (name, description, created_by) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(name)
        .bind(description)
        .bind(created_by)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, "Group already exists", "User does not exist"))?;

        sqlx::query("INSERT INTO group_memberships (group_id, user_id, role) VALUES ($1, $2, $3)")
            .bind(group.id)
            .bind(created_by)
            .bind(GroupRole::Owner)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(group)
    }

    async fn get_group(&self, id: i32) -> StorageResult<Option<Group>> {
        Ok(sqlx::query_as::<_, Group>("SELECT * FROM groups WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_groups(&self, filter: &GroupFilter) -> StorageResult<Vec<Group>> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM groups WHERE TRUE");
        if let Some(term) = filter.query.as_deref() {
            push_text_match(&mut qb, &["name", "description"], term);
        }
        qb.push(" ORDER BY created_at DESC, id DESC LIMIT ").push_bind(filter.limit);
        Ok(qb.build_query_as::<Group>().fetch_all(&self.pool).await?)
    }

    async fn list_user_groups(&self, user_id: i32) -> StorageResult<Vec<Group>> {
        Ok(sqlx::query_as::<_, Group>(
            r#"
            SELECT g.* FROM groups g
            JOIN group_memberships gm ON gm.group_id = g.id
            WHERE gm.user_id = $1
            ORDER BY gm.joined_at DESC, g.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn add_group_member(&self, group_id: i32, user_id: i32, role: GroupRole) -> StorageResult<GroupMembership> {
        sqlx::query_as::<_, GroupMembership>(
            "INSERT INTO group_memberships (group_id, user_id, role) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(group_id)
        .bind(user_id)
        .bind(role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Already a member of this group", "Group does not exist"))
    }

    async fn remove_group_member(&self, group_id: i32, user_id: i32) -> StorageResult<bool> {
        let result = sqlx::query("DELETE FROM group_memberships WHERE group_id = $1 AND user_id = $2")
            .bind(group_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_group_members(&self, group_id: i32) -> StorageResult<Vec<GroupMembership>> {
        Ok(sqlx::query_as::<_, GroupMembership>(
            "SELECT * FROM group_memberships WHERE group_id = $1 ORDER BY joined_at, user_id",
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn create_vendor(&self, created_by: i32, vendor: NewVendor) -> StorageResult<Vendor> {
        sqlx::query_as::<_, Vendor>(
            r#"
            INSERT INTO vendors (company_id, created_by, name, email, phone, services)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(vendor.company_id.unwrap_or_default())
        .bind(created_by)
        .bind(vendor.name.unwrap_or_default())
        .bind(vendor.email)
        .bind(vendor.phone)
        .bind(vendor.services)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Vendor already exists", "Company does not exist"))
    }

    async fn get_vendor(&self, id: i32) -> StorageResult<Option<Vendor>> {
        Ok(sqlx::query_as::<_, Vendor>("SELECT * FROM vendors WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_vendors(&self, filter: &VendorFilter) -> StorageResult<Vec<Vendor>> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM vendors WHERE TRUE");
        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status);
        }
        if let Some(company_id) = filter.company_id {
            qb.push(" AND company_id = ").push_bind(company_id);
        }
        qb.push(" ORDER BY created_at DESC, id DESC LIMIT ").push_bind(filter.limit);
        Ok(qb.build_query_as::<Vendor>().fetch_all(&self.pool).await?)
    }

    async fn set_vendor_status(&self, id: i32, status: ApprovalStatus) -> StorageResult<Option<Vendor>> {
        Ok(sqlx::query_as::<_, Vendor>(
            r#"
            UPDATE vendors SET
                updated_at = CASE WHEN status = $2 THEN updated_at ELSE now() END,
                status = $2
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_like_wildcards() {
        assert_eq!(like_pattern("rust"), "%rust%");
        assert_eq!(like_pattern("100%_done"), "%100\\%\\_done%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn builds_text_match_clause() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM jobs WHERE TRUE");
        push_text_match(&mut qb, &["title", "location"], "dev");
        assert_eq!(
            qb.sql(),
            "SELECT * FROM jobs WHERE TRUE AND (title ILIKE $1 OR location ILIKE $2)"
        );
    }
}
