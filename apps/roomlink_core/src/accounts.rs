//! Account persistence: users, their profile row, passwords and sessions.

use anyhow::anyhow;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm as ArgonAlgorithm, Argon2, Params, Version,
};
use chrono::Utc;
use jsonwebtoken::{Algorithm, Header as JwtHeader, Validation};
use rand::rngs::OsRng;
use sea_orm::sea_query::OnConflict;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait,
    IntoActiveModel, QueryFilter, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use crate::media::Upload;
use crate::models::session::{self, Column as SessionCol, Entity as Session};
use crate::models::user::{self, Column as UserCol, Entity as User};
use crate::models::user_profile::{self, Column as ProfileCol, Entity as Profile};
use crate::serializers::profile::ProfileChanges;
use crate::serializers::user_auth::{Claims, NewAccount};
use crate::AppState;

const ISSUER: &str = "roomlink";
const AUDIENCE: &str = "roomlink-web";

// ---------- users ----------

pub async fn username_taken<C: ConnectionTrait>(db: &C, username: &str) -> Result<bool, DbErr> {
    Ok(User::find()
        .filter(UserCol::Username.eq(username))
        .one(db)
        .await?
        .is_some())
}

pub async fn email_taken<C: ConnectionTrait>(db: &C, email: &str) -> Result<bool, DbErr> {
    Ok(User::find()
        .filter(UserCol::Email.eq(email))
        .one(db)
        .await?
        .is_some())
}

/// Creates the user and its profile in one transaction, so every account has
/// exactly one profile from the moment it exists.
pub async fn create_account<C>(db: &C, account: NewAccount) -> Result<user::Model, DbErr>
where
    C: ConnectionTrait + TransactionTrait,
{
    let hash = hash_password(&account.password).map_err(|e| DbErr::Custom(e.to_string()))?;
    let now = Utc::now();

    let txn = db.begin().await?;
    let created = user::ActiveModel {
        id: NotSet,
        username: Set(account.username),
        email: Set(account.email),
        first_name: Set(account.first_name),
        last_name: Set(account.last_name),
        password_hash: Set(hash),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;
    ensure_profile(&txn, created.id).await?;
    txn.commit().await?;

    info!(user_id = created.id, username = %created.username, "account created");
    Ok(created)
}

/// Inserts an empty profile for `user_id` unless one already exists.
pub async fn ensure_profile<C: ConnectionTrait>(db: &C, user_id: i32) -> Result<(), DbErr> {
    let now = Utc::now();
    let row = user_profile::ActiveModel {
        id: NotSet,
        user_id: Set(user_id),
        phone_number: Set(None),
        bio: Set(String::new()),
        profile_picture: Set(None),
        is_landlord: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Profile::insert(row)
        .on_conflict(OnConflict::column(ProfileCol::UserId).do_nothing().to_owned())
        .exec_without_returning(db)
        .await?;
    Ok(())
}

/// Looks a user up by username or email and checks the password.
pub async fn authenticate<C: ConnectionTrait>(
    db: &C,
    identifier: &str,
    password: &str,
) -> Result<Option<user::Model>, DbErr> {
    let cond = Condition::any()
        .add(UserCol::Email.eq(identifier))
        .add(UserCol::Username.eq(identifier));

    let Some(found) = User::find()
        .filter(cond)
        .filter(UserCol::IsActive.eq(true))
        .one(db)
        .await?
    else {
        return Ok(None);
    };

    let ok = verify_password(&found.password_hash, password)
        .map_err(|e| DbErr::Custom(e.to_string()))?;
    Ok(ok.then_some(found))
}

// ---------- profiles ----------

pub async fn find_profile<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
) -> Result<Option<user_profile::Model>, DbErr> {
    Profile::find()
        .filter(ProfileCol::UserId.eq(user_id))
        .one(db)
        .await
}

/// Applies a validated profile form. The picture is stored first so a failed
/// upload leaves the row untouched.
pub async fn update_profile(
    state: &AppState,
    profile: user_profile::Model,
    changes: ProfileChanges,
) -> anyhow::Result<user_profile::Model> {
    let picture = match changes.profile_picture {
        Some(ref upload) => Some(store_image(state, "profile_pictures", upload).await?),
        None => None,
    };

    let mut am = profile.into_active_model();
    am.phone_number = Set(changes.phone_number);
    am.bio = Set(changes.bio);
    am.is_landlord = Set(changes.is_landlord);
    if let Some(reference) = picture {
        am.profile_picture = Set(Some(reference));
    }
    am.updated_at = Set(Utc::now());
    Ok(am.update(&state.db).await?)
}

pub async fn store_image(state: &AppState, folder: &str, upload: &Upload) -> anyhow::Result<String> {
    state.media.save(folder, upload).await
}

// ---------- password hashing ----------

fn argon() -> Result<Argon2<'static>, anyhow::Error> {
    // Argon2id, ~19MB memory, 2 iterations
    let params = Params::new(19456, 2, 1, None).map_err(|e| anyhow!(e))?;
    Ok(Argon2::new(ArgonAlgorithm::Argon2id, Version::V0x13, params))
}

pub fn hash_password(password: &str) -> Result<String, anyhow::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(argon()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!(e))?
        .to_string())
}

pub fn verify_password(phc: &str, password: &str) -> Result<bool, anyhow::Error> {
    let parsed = PasswordHash::new(phc).map_err(|e| anyhow!(e))?;
    Ok(argon()?.verify_password(password.as_bytes(), &parsed).is_ok())
}

// ---------- sessions ----------

/// Stores a session row and returns the signed token for the cookie.
pub async fn issue_session(state: &AppState, user: &user::Model) -> anyhow::Result<String> {
    let now = Utc::now();
    let expires = now + state.settings.session.ttl;
    let claims = Claims {
        sub: user.id,
        username: user.username.clone(),
        jti: Uuid::new_v4(),
        iat: now.timestamp(),
        exp: expires.timestamp(),
        iss: ISSUER.into(),
        aud: AUDIENCE.into(),
    };
    let token = jsonwebtoken::encode(&JwtHeader::new(Algorithm::HS256), &claims, &state.session_enc)?;

    session::ActiveModel {
        id: NotSet,
        user_id: Set(user.id),
        jti: Set(claims.jti),
        issued_at: Set(now),
        expires_at: Set(expires),
        revoked_at: Set(None),
    }
    .insert(&state.db)
    .await?;

    info!(user_id = user.id, "session issued");
    Ok(token)
}

pub fn decode_session(state: &AppState, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut v = Validation::new(Algorithm::HS256);
    v.validate_exp = true;
    v.set_audience(&[AUDIENCE]);
    v.set_issuer(&[ISSUER]);
    jsonwebtoken::decode::<Claims>(token, &state.session_dec, &v).map(|d| d.claims)
}

/// The user behind a session token, if the token verifies and its row is
/// neither revoked nor expired.
pub async fn resolve_session(state: &AppState, token: &str) -> Result<Option<user::Model>, DbErr> {
    let Ok(claims) = decode_session(state, token) else {
        return Ok(None);
    };

    let live = Session::find()
        .filter(SessionCol::Jti.eq(claims.jti))
        .filter(SessionCol::UserId.eq(claims.sub))
        .filter(SessionCol::RevokedAt.is_null())
        .filter(SessionCol::ExpiresAt.gt(Utc::now()))
        .one(&state.db)
        .await?;
    if live.is_none() {
        return Ok(None);
    }

    User::find_by_id(claims.sub)
        .filter(UserCol::IsActive.eq(true))
        .one(&state.db)
        .await
}

pub async fn revoke_session(state: &AppState, token: &str) -> Result<(), DbErr> {
    let Ok(claims) = decode_session(state, token) else {
        return Ok(());
    };
    if let Some(found) = Session::find()
        .filter(SessionCol::Jti.eq(claims.jti))
        .one(&state.db)
        .await?
    {
        let mut am = found.into_active_model();
        am.revoked_at = Set(Some(Utc::now()));
        am.update(&state.db).await?;
        info!(user_id = claims.sub, "session revoked");
    }
    Ok(())
}
