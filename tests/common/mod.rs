#![allow(dead_code)]

use std::{
    sync::{Arc, Mutex},
    time::SystemTime,
};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use movie_portal::{
    AppState,
    auth::Claims,
    config::{AppConfig, Env},
    create_router,
    error::RepositoryError,
    models::{
        Distributor, ListQuery, Movie, MovieChanges, NewMovie, UpdateDistributorRequest, User,
    },
    repository::{Page, RepoResult, Repository, RepositoryState},
};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "test-secret-value-1234567890";

pub const ADMIN_ID: Uuid = Uuid::from_u128(1);
pub const OWNER_ID: Uuid = Uuid::from_u128(2);
pub const STRANGER_ID: Uuid = Uuid::from_u128(3);

// --- In-memory Repository ---

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    distributors: Vec<Distributor>,
    movies: Vec<Movie>,
    next_id: i64,
}

impl Tables {
    /// Monotonic ids; `created_at` follows the id so "newest first" is stable.
    fn allocate(&mut self) -> (i64, DateTime<Utc>) {
        self.next_id += 1;
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        (self.next_id, base + Duration::seconds(self.next_id))
    }
}

/// Repository double backed by vectors behind a mutex. `offline` makes every
/// call fail like an unreachable database.
#[derive(Default)]
pub struct InMemoryRepo {
    tables: Mutex<Tables>,
    pub offline: bool,
}

impl InMemoryRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }

    pub fn add_user(&self, id: Uuid, email: &str, role: &str) -> User {
        let user = User {
            id,
            email: email.to_string(),
            username: None,
            role: role.to_string(),
        };
        self.tables.lock().unwrap().users.push(user.clone());
        user
    }

    pub fn add_distributor(&self, user_id: Uuid, company_name: &str, approved: bool) -> Distributor {
        let mut tables = self.tables.lock().unwrap();
        let (id, created_at) = tables.allocate();
        let distributor = Distributor {
            id,
            user_id,
            company_name: company_name.to_string(),
            approved,
            created_at,
        };
        tables.distributors.push(distributor.clone());
        distributor
    }

    pub fn add_movie(&self, title: &str, distributor_id: i64, approved: bool) -> Movie {
        let mut tables = self.tables.lock().unwrap();
        let (id, created_at) = tables.allocate();
        let movie = Movie {
            id,
            title: title.to_string(),
            distributor_id,
            approved,
            verification_status: Some("unverified".to_string()),
            created_at,
            ..Movie::default()
        };
        tables.movies.push(movie.clone());
        movie
    }

    pub fn movie(&self, id: i64) -> Option<Movie> {
        self.tables
            .lock()
            .unwrap()
            .movies
            .iter()
            .find(|m| m.id == id)
            .cloned()
    }

    pub fn movie_count(&self) -> usize {
        self.tables.lock().unwrap().movies.len()
    }

    pub fn distributor_count(&self) -> usize {
        self.tables.lock().unwrap().distributors.len()
    }

    fn check_online(&self) -> RepoResult<()> {
        if self.offline {
            Err(RepositoryError::Database(sqlx::Error::PoolTimedOut))
        } else {
            Ok(())
        }
    }
}

fn paginate<T: Clone>(mut rows: Vec<T>, query: &ListQuery) -> Page<T> {
    let total = rows.len() as i64;
    let items = rows
        .drain(..)
        .skip(query.offset().max(0) as usize)
        .take(query.limit as usize)
        .collect();
    Page { items, total }
}

#[async_trait]
impl Repository for InMemoryRepo {
    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>> {
        self.check_online()?;
        let tables = self.tables.lock().unwrap();
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn list_users(&self) -> RepoResult<Vec<User>> {
        self.check_online()?;
        Ok(self.tables.lock().unwrap().users.clone())
    }

    async fn list_distributors(&self, query: &ListQuery) -> RepoResult<Page<Distributor>> {
        self.check_online()?;
        let mut rows = self.tables.lock().unwrap().distributors.clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(paginate(rows, query))
    }

    async fn get_distributor(&self, id: i64) -> RepoResult<Option<Distributor>> {
        self.check_online()?;
        let tables = self.tables.lock().unwrap();
        Ok(tables.distributors.iter().find(|d| d.id == id).cloned())
    }

    async fn get_distributor_for_user(&self, user_id: Uuid) -> RepoResult<Option<Distributor>> {
        self.check_online()?;
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .distributors
            .iter()
            .find(|d| d.user_id == user_id)
            .cloned())
    }

    async fn create_distributor(
        &self,
        user_id: Uuid,
        company_name: &str,
        approved: bool,
    ) -> RepoResult<Distributor> {
        self.check_online()?;
        Ok(self.add_distributor(user_id, company_name, approved))
    }

    async fn update_distributor(
        &self,
        id: i64,
        changes: &UpdateDistributorRequest,
    ) -> RepoResult<Option<Distributor>> {
        self.check_online()?;
        let mut tables = self.tables.lock().unwrap();
        let Some(row) = tables.distributors.iter_mut().find(|d| d.id == id) else {
            return Ok(None);
        };
        if let Some(name) = &changes.company_name {
            row.company_name = name.clone();
        }
        if let Some(approved) = changes.approved {
            row.approved = approved;
        }
        Ok(Some(row.clone()))
    }

    async fn delete_distributor(&self, id: i64) -> RepoResult<bool> {
        self.check_online()?;
        let mut tables = self.tables.lock().unwrap();
        let before = tables.distributors.len();
        tables.distributors.retain(|d| d.id != id);
        Ok(tables.distributors.len() < before)
    }

    async fn list_movies(&self, query: &ListQuery) -> RepoResult<Page<Movie>> {
        self.check_online()?;
        let mut rows: Vec<Movie> = self
            .tables
            .lock()
            .unwrap()
            .movies
            .iter()
            .filter(|m| query.approved.is_none_or(|a| m.approved == a))
            .filter(|m| query.distributor_id.is_none_or(|d| m.distributor_id == d))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(paginate(rows, query))
    }

    async fn get_movie(&self, id: i64) -> RepoResult<Option<Movie>> {
        self.check_online()?;
        Ok(self.movie(id))
    }

    async fn create_movie(&self, movie: &NewMovie) -> RepoResult<Movie> {
        self.check_online()?;
        let mut tables = self.tables.lock().unwrap();
        let (id, created_at) = tables.allocate();
        let row = Movie {
            id,
            title: movie.title.clone(),
            description: movie.description.clone(),
            religion_category: movie.religion_category.clone(),
            language: movie.language.clone(),
            video_url: movie.video_url.clone(),
            distributor_id: movie.distributor_id,
            approved: false,
            verification_status: Some(movie.verification_status.clone()),
            verification_details: Some(movie.verification_details.clone()),
            created_at,
        };
        tables.movies.push(row.clone());
        Ok(row)
    }

    async fn update_movie(&self, id: i64, changes: &MovieChanges) -> RepoResult<Option<Movie>> {
        self.check_online()?;
        let mut tables = self.tables.lock().unwrap();
        let Some(row) = tables.movies.iter_mut().find(|m| m.id == id) else {
            return Ok(None);
        };
        let fields = &changes.fields;
        if let Some(title) = &fields.title {
            row.title = title.clone();
        }
        if fields.description.is_some() {
            row.description = fields.description.clone();
        }
        if fields.religion_category.is_some() {
            row.religion_category = fields.religion_category.clone();
        }
        if fields.language.is_some() {
            row.language = fields.language.clone();
        }
        if fields.video_url.is_some() {
            row.video_url = fields.video_url.clone();
        }
        if let Some(approved) = fields.approved {
            row.approved = approved;
        }
        if changes.verification_status.is_some() {
            row.verification_status = changes.verification_status.clone();
        }
        if changes.verification_details.is_some() {
            row.verification_details = changes.verification_details.clone();
        }
        Ok(Some(row.clone()))
    }

    async fn delete_movie(&self, id: i64) -> RepoResult<bool> {
        self.check_online()?;
        let mut tables = self.tables.lock().unwrap();
        let before = tables.movies.len();
        tables.movies.retain(|m| m.id != id);
        Ok(tables.movies.len() < before)
    }

    async fn count_movies(&self) -> RepoResult<i64> {
        self.check_online()?;
        Ok(self.tables.lock().unwrap().movies.len() as i64)
    }
}

// --- Fixtures ---

/// Admin, a distributor owner and an unrelated account.
pub fn seeded_repo() -> Arc<InMemoryRepo> {
    let repo = Arc::new(InMemoryRepo::new());
    repo.add_user(ADMIN_ID, "admin@example.com", "admin");
    repo.add_user(OWNER_ID, "owner@example.com", "user");
    repo.add_user(STRANGER_ID, "stranger@example.com", "user");
    repo
}

pub fn test_config(env: Env) -> AppConfig {
    AppConfig {
        env,
        jwt_secret: TEST_JWT_SECRET.to_string(),
        ..AppConfig::default()
    }
}

pub fn test_state(repo: Arc<InMemoryRepo>, env: Env) -> AppState {
    AppState::new(repo as RepositoryState, test_config(env))
}

pub fn test_app(repo: Arc<InMemoryRepo>) -> Router {
    create_router(test_state(repo, Env::Production))
}

/// HS256 token for `user_id` expiring `exp_offset` seconds from now (negative
/// offsets produce an already expired token).
pub fn mint_token(user_id: Uuid, secret: &str, exp_offset: i64) -> String {
    let now = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64;

    let claims = Claims {
        sub: user_id,
        iat: now as usize,
        exp: (now + exp_offset) as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

pub fn bearer(user_id: Uuid) -> String {
    format!("Bearer {}", mint_token(user_id, TEST_JWT_SECRET, 3600))
}

/// Builds a request; `body` is sent as JSON when present.
pub fn request(method: &str, uri: &str, user: Option<Uuid>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(id) = user {
        builder = builder.header("authorization", bearer(id));
    }
    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Runs one request through the router and returns the status and JSON body
/// (`Value::Null` for empty bodies).
pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, body)
}
