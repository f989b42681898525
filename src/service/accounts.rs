use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::model::EmpId;
use crate::model::settings::Settings;
use crate::model::user::{
    LoginRequest, PendingUser, PendingUserView, RegisterRequest, Registration, Role, UserAccount, UserProfile,
};
use crate::store::{Batch, Mutation, Store};
use crate::utils::username_filter::{self, normalize};

fn hash(password: &str) -> AppResult<String> {
    hash_password(password).map_err(|e| AppError::Internal(anyhow::anyhow!("password hashing failed: {e}")))
}

/// true  => username AVAILABLE
/// false => username TAKEN (as an account or a pending request)
pub async fn is_username_available(store: &dyn Store, username: &str) -> AppResult<bool> {
    let username = normalize(username);

    // 1️⃣ Cuckoo filter: once warm, a miss means nobody has it
    if username_filter::is_warm() && !username_filter::might_exist(&username) {
        return Ok(true);
    }

    // 2️⃣ Store lookup settles the maybe
    let taken = store.get_user(&username).await?.is_some() || store.get_pending_user(&username).await?.is_some();
    Ok(!taken)
}

async fn ensure_linkable(store: &dyn Store, emp_id: EmpId) -> AppResult<()> {
    let faculty = store
        .get_faculty(emp_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Faculty {emp_id} not found")))?;
    if faculty.registered {
        return Err(AppError::Conflict(format!("Faculty {emp_id} already has an account")));
    }
    Ok(())
}

/// Creates the account straight away when account creation is on, otherwise
/// files a request for an administrator when requests are on.
#[instrument(name = "auth_register", skip(store, settings, request), fields(username = %request.username))]
pub async fn register(store: &dyn Store, settings: &Settings, request: RegisterRequest) -> AppResult<Registration> {
    let username = normalize(&request.username);

    let mut errors = Vec::new();
    if username.is_empty() {
        errors.push("username must not be empty".to_string());
    }
    if request.password.is_empty() {
        errors.push("password must not be empty".to_string());
    }
    if request.password != request.confirm_password {
        errors.push("passwords do not match".to_string());
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    if !settings.account_creation_enabled && !settings.user_account_request_enabled {
        return Err(AppError::Forbidden("Registration is currently closed".into()));
    }

    ensure_linkable(store, request.emp_id).await?;
    if store
        .list_pending_users()
        .await?
        .iter()
        .any(|p| p.emp_id == request.emp_id)
    {
        return Err(AppError::Conflict(format!(
            "Faculty {} already has a pending request",
            request.emp_id
        )));
    }

    // Always confirmed against the store: the filter may still be warming up.
    if store.get_user(&username).await?.is_some() || store.get_pending_user(&username).await?.is_some() {
        return Err(AppError::Conflict("Username already taken".into()));
    }

    let password_hash = hash(&request.password)?;

    let outcome = if settings.account_creation_enabled {
        let account = UserAccount {
            username: username.clone(),
            password_hash,
            role: Role::Faculty,
            emp_id: Some(request.emp_id),
        };
        let mut batch = Batch::single(Mutation::PutUser(account.clone()));
        batch.push(Mutation::LinkAccount {
            emp_id: request.emp_id,
            username: Some(username.clone()),
        });
        store.apply(batch).await?;
        info!(emp_id = request.emp_id, "Account created");
        Registration::Created {
            profile: UserProfile::from(&account),
        }
    } else {
        let pending = PendingUser {
            username: username.clone(),
            password_hash,
            emp_id: request.emp_id,
            requested_at: Utc::now(),
        };
        store.apply(Batch::single(Mutation::PutPendingUser(pending))).await?;
        info!(emp_id = request.emp_id, "Account request filed");
        Registration::Requested {
            username: username.clone(),
        }
    };

    username_filter::insert(&username);
    Ok(outcome)
}

/// Checks credentials. There is no session; the caller gets the profile back.
#[instrument(name = "auth_login", skip(store, request), fields(username = %request.username))]
pub async fn login(store: &dyn Store, request: LoginRequest) -> AppResult<UserProfile> {
    let username = normalize(&request.username);
    let invalid = || AppError::Unauthorized("Invalid username or password".into());

    let Some(account) = store.get_user(&username).await? else {
        if store.get_pending_user(&username).await?.is_some() {
            return Err(AppError::Forbidden("Account request is awaiting approval".into()));
        }
        debug!("Unknown username");
        return Err(invalid());
    };

    match verify_password(&request.password, &account.password_hash) {
        Ok(true) => {
            info!(role = %account.role, "Login succeeded");
            Ok(UserProfile::from(&account))
        }
        Ok(false) => {
            warn!("Wrong password");
            Err(invalid())
        }
        Err(e) => Err(AppError::Internal(anyhow::anyhow!("stored hash for {username} is unreadable: {e}"))),
    }
}

pub async fn list_users(store: &dyn Store) -> AppResult<Vec<UserProfile>> {
    Ok(store.list_users().await?.iter().map(UserProfile::from).collect())
}

pub async fn list_pending(store: &dyn Store) -> AppResult<Vec<PendingUserView>> {
    Ok(store.list_pending_users().await?.iter().map(PendingUserView::from).collect())
}

/// Turns a request into an account and links it, in one batch.
pub async fn approve_pending(store: &dyn Store, username: &str) -> AppResult<UserProfile> {
    let username = normalize(username);
    let pending = store
        .get_pending_user(&username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No pending request for {username}")))?;
    ensure_linkable(store, pending.emp_id).await?;

    let account = UserAccount {
        username: pending.username.clone(),
        password_hash: pending.password_hash,
        role: Role::Faculty,
        emp_id: Some(pending.emp_id),
    };
    let batch: Batch = [
        Mutation::DeletePendingUser(pending.username.clone()),
        Mutation::PutUser(account.clone()),
        Mutation::LinkAccount {
            emp_id: pending.emp_id,
            username: Some(pending.username),
        },
    ]
    .into_iter()
    .collect();
    store.apply(batch).await?;

    info!(username = %account.username, "Account request approved");
    Ok(UserProfile::from(&account))
}

pub async fn reject_pending(store: &dyn Store, username: &str) -> AppResult<()> {
    let username = normalize(username);
    if store.get_pending_user(&username).await?.is_none() {
        return Err(AppError::NotFound(format!("No pending request for {username}")));
    }
    store
        .apply(Batch::single(Mutation::DeletePendingUser(username.clone())))
        .await?;
    username_filter::remove(&username);
    info!(%username, "Account request rejected");
    Ok(())
}

/// Deletes the account and clears the faculty link. The last administrator stays.
pub async fn delete_user(store: &dyn Store, username: &str) -> AppResult<()> {
    let username = normalize(username);
    let account = store
        .get_user(&username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {username} not found")))?;

    if account.role == Role::Admin {
        let admins = store.list_users().await?.iter().filter(|u| u.role == Role::Admin).count();
        if admins <= 1 {
            return Err(AppError::Conflict("Cannot delete the last administrator".into()));
        }
    }

    let mut batch = Batch::single(Mutation::DeleteUser(username.clone()));
    if let Some(emp_id) = account.emp_id {
        if store.get_faculty(emp_id).await?.is_some() {
            batch.push(Mutation::LinkAccount { emp_id, username: None });
        }
    }
    store.apply(batch).await?;

    username_filter::remove(&username);
    info!(%username, "User deleted");
    Ok(())
}

/// Creates the configured administrator when no account has that name yet.
pub async fn seed_admin(store: &dyn Store, username: &str, password: &str) -> AppResult<bool> {
    let username = normalize(username);
    if store.get_user(&username).await?.is_some() {
        return Ok(false);
    }

    let account = UserAccount {
        username: username.clone(),
        password_hash: hash(password)?,
        role: Role::Admin,
        emp_id: None,
    };
    store.apply(Batch::single(Mutation::PutUser(account))).await?;
    username_filter::insert(&username);
    info!(%username, "Administrator seeded");
    Ok(true)
}
