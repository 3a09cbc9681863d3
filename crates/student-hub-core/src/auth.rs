//! Credentials: PBKDF2 password hashes, bearer tokens, account form validation.
//!
//! Stored password hashes read `pbkdf2_sha256${iterations}${salt}${key}` with base64 salt and key.
//! A token handed to a client reads `"{token_id}|{secret}"`. Only the SHA-256 hex digest of the
//! secret is stored.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use pbkdf2::pbkdf2_hmac;
use rand::distributions::Alphanumeric;
use rand::rngs::OsRng;
use rand::{Rng, RngCore};
use regex::Regex;
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::error::{HubError, HubResult, ValidationErrors};
use crate::store::{HubStore, User};

const HASH_SCHEME: &str = "pbkdf2_sha256";
const PBKDF2_ITERATIONS: u32 = 100_000;
const SALT_SIZE: usize = 16;
const KEY_SIZE: usize = 32;
const TOKEN_SECRET_LEN: usize = 40;
const TOKEN_NAME: &str = "auth_token";
const NAME_MAX_CHARS: usize = 255;
const EMAIL_MAX_CHARS: usize = 255;
const PASSWORD_MIN_CHARS: usize = 6;

static EMAIL_PATTERN: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok());

fn derive_key(password: &str, salt: &[u8], iterations: u32) -> [u8; KEY_SIZE] {
    let mut key = [0u8; KEY_SIZE];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut key);
    key
}

pub fn hash_password(password: &str) -> HubResult<String> {
    let mut salt = [0u8; SALT_SIZE];
    OsRng
        .try_fill_bytes(&mut salt)
        .map_err(|e| HubError::PasswordHash(e.to_string()))?;
    let key = derive_key(password, &salt, PBKDF2_ITERATIONS);
    Ok(format!(
        "{HASH_SCHEME}${PBKDF2_ITERATIONS}${}${}",
        BASE64.encode(salt),
        BASE64.encode(key)
    ))
}

/// False for a wrong password and for an unparseable stored hash.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let mut parts = stored_hash.split('$');
    let (Some(HASH_SCHEME), Some(iterations), Some(salt), Some(expected), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return false;
    };
    let (Ok(iterations), Ok(salt), Ok(expected)) = (
        iterations.parse::<u32>(),
        BASE64.decode(salt),
        BASE64.decode(expected),
    ) else {
        return false;
    };
    iterations > 0 && derive_key(password, &salt, iterations).as_slice() == expected.as_slice()
}

fn digest_secret(secret: &str) -> String {
    format!("{:x}", Sha256::digest(secret.as_bytes()))
}

fn random_secret() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_SECRET_LEN)
        .map(char::from)
        .collect()
}

/// Creates a token for `user_id` and returns the plain-text bearer value.
pub fn issue_token(store: &HubStore, user_id: i64) -> HubResult<String> {
    let secret = random_secret();
    let id = store.insert_token(user_id, TOKEN_NAME, &digest_secret(&secret))?;
    Ok(format!("{id}|{secret}"))
}

/// The owner of a valid bearer token plus the token row that was used.
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub user: User,
    pub token_id: i64,
}

/// Resolves a bearer value. `Ok(None)` for malformed, unknown, mismatched or expired tokens.
pub fn authenticate(
    store: &HubStore,
    bearer: &str,
    ttl: Option<chrono::Duration>,
    now: DateTime<Utc>,
) -> HubResult<Option<Authenticated>> {
    let Some((id, secret)) = bearer.trim().split_once('|') else {
        return Ok(None);
    };
    let Ok(token_id) = id.parse::<i64>() else {
        return Ok(None);
    };
    let Some(token) = store.get_token(token_id)? else {
        return Ok(None);
    };
    if token.token_hash != digest_secret(secret) {
        return Ok(None);
    }
    // An expiry past chrono's range never arrives.
    let expires_at = ttl.and_then(|ttl| token.created_at.checked_add_signed(ttl));
    if expires_at.is_some_and(|expires_at| expires_at <= now) {
        tracing::debug!(token_id, "expired token rejected");
        return Ok(None);
    }
    let Some(user) = store.get_user(token.user_id)? else {
        return Ok(None);
    };
    store.touch_token(token_id)?;
    Ok(Some(Authenticated { user, token_id }))
}

/// Checks email/password; unknown email and wrong password are indistinguishable.
pub fn login(store: &HubStore, email: &str, password: &str) -> HubResult<User> {
    match store.find_user_by_email(email)? {
        Some(user) if verify_password(password, &user.password_hash) => Ok(user),
        _ => Err(HubError::InvalidCredentials),
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(email))
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub password_confirmation: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdateForm {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
}

fn check_name(errors: &mut ValidationErrors, name: &str) {
    if name.is_empty() {
        errors.add("name", "The name field is required.");
    } else if name.chars().count() > NAME_MAX_CHARS {
        errors.add("name", format!("The name may not be greater than {NAME_MAX_CHARS} characters."));
    }
}

fn check_email(errors: &mut ValidationErrors, email: &str) {
    if email.is_empty() {
        errors.add("email", "The email field is required.");
    } else if email.chars().count() > EMAIL_MAX_CHARS {
        errors.add("email", format!("The email may not be greater than {EMAIL_MAX_CHARS} characters."));
    } else if !is_valid_email(email) {
        errors.add("email", "The email must be a valid email address.");
    }
}

impl RegisterForm {
    /// Shape rules only; uniqueness is checked against the store by the caller.
    pub fn validate(self) -> Result<Registration, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = self.name.unwrap_or_default().trim().to_string();
        let email = self.email.unwrap_or_default().trim().to_string();
        let password = self.password.unwrap_or_default();

        check_name(&mut errors, &name);
        check_email(&mut errors, &email);
        if password.is_empty() {
            errors.add("password", "The password field is required.");
        } else if password.chars().count() < PASSWORD_MIN_CHARS {
            errors.add(
                "password",
                format!("The password must be at least {PASSWORD_MIN_CHARS} characters."),
            );
        }
        if !password.is_empty() && self.password_confirmation.as_deref() != Some(password.as_str()) {
            errors.add("password", "The password confirmation does not match.");
        }

        errors.into_result(Registration {
            name,
            email,
            password,
        })
    }
}

impl LoginForm {
    pub fn validate(self) -> Result<(String, String), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let email = self.email.unwrap_or_default().trim().to_string();
        let password = self.password.unwrap_or_default();
        if email.is_empty() {
            errors.add("email", "The email field is required.");
        } else if !is_valid_email(&email) {
            errors.add("email", "The email must be a valid email address.");
        }
        if password.is_empty() {
            errors.add("password", "The password field is required.");
        }
        errors.into_result((email, password))
    }
}

impl ProfileUpdateForm {
    /// Absent fields stay unchanged; present ones follow the registration rules.
    pub fn validate(self) -> Result<ProfileUpdate, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = self.name.map(|n| n.trim().to_string());
        let email = self.email.map(|e| e.trim().to_string());
        if let Some(name) = &name {
            check_name(&mut errors, name);
        }
        if let Some(email) = &email {
            check_email(&mut errors, email);
        }
        errors.into_result(ProfileUpdate { name, email })
    }
}
