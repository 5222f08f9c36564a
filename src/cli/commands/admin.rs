use anyhow::{bail, Context};

use crate::auth::hash_password;
use crate::config::AppConfig;
use crate::database::models::{NewUserRecord, UserType};
use crate::database::{DatabaseManager, Storage};

/// Admin accounts cannot self-register over HTTP; they are created here
pub async fn handle(
    config: AppConfig,
    email: String,
    password: String,
    first_name: String,
    last_name: String,
) -> anyhow::Result<()> {
    let email = email.trim().to_lowercase();
    if !email.contains('@') {
        bail!("invalid email address: {}", email);
    }
    if password.chars().count() < 8 {
        bail!("password must be at least 8 characters");
    }

    let storage = super::postgres_storage(&config).await?;
    let user = storage
        .create_user(NewUserRecord {
            email,
            password_hash: hash_password(&password)?,
            first_name,
            last_name,
            user_type: UserType::Admin,
        })
        .await
        .context("failed to create admin")?;

    println!("Created admin {} (id {})", user.email, user.id);
    DatabaseManager::close(storage.pool()).await;
    Ok(())
}
