//! PostgreSQL implementations of the user, child and location ports.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use uuid::Uuid;

use super::rows::{column, db_error, parsed_column, timestamp_column};
use crate::domain::foundation::{ChildId, DomainError, ErrorCode, LocationId, UserId};
use crate::domain::people::{Child, Location, User, UserRole};
use crate::ports::{ChildRepository, LocationRepository, UserRepository};

/// PostgreSQL implementation of UserRepository.
#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn save(&self, user: &User) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, role, email, name, phone, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(user.role.as_str())
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.phone)
        .bind(user.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => DomainError::new(
                ErrorCode::AlreadyExists,
                format!("User with email {} already exists", user.email),
            ),
            _ => db_error("insert user", e),
        })?;

        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let row = sqlx::query(
            "SELECT id, role, email, name, phone, created_at FROM users WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("fetch user", e))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn list_by_roles(&self, roles: &[UserRole]) -> Result<Vec<User>, DomainError> {
        let roles: Vec<&str> = roles.iter().map(|r| r.as_str()).collect();
        let rows = sqlx::query(
            r#"
            SELECT id, role, email, name, phone, created_at
            FROM users
            WHERE role = ANY($1)
            ORDER BY name
            "#,
        )
        .bind(&roles)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("list users by role", e))?;

        rows.iter().map(row_to_user).collect()
    }
}

/// PostgreSQL implementation of ChildRepository.
#[derive(Clone)]
pub struct PostgresChildRepository {
    pool: PgPool,
}

impl PostgresChildRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const CHILD_COLUMNS: &str = "id, parent_id, name, age, gender, medical_condition, goals";

#[async_trait]
impl ChildRepository for PostgresChildRepository {
    async fn save(&self, child: &Child) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO children (id, parent_id, name, age, gender, medical_condition, goals)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(child.id.as_uuid())
        .bind(child.parent_id.as_uuid())
        .bind(&child.name)
        .bind(child.age as i16)
        .bind(child.gender.as_str())
        .bind(&child.medical_condition)
        .bind(&child.goals)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("insert child", e))?;

        Ok(())
    }

    async fn find_by_id(&self, id: &ChildId) -> Result<Option<Child>, DomainError> {
        let row = sqlx::query(&format!("SELECT {} FROM children WHERE id = $1", CHILD_COLUMNS))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("fetch child", e))?;

        row.as_ref().map(row_to_child).transpose()
    }

    async fn find_by_ids(&self, ids: &[ChildId]) -> Result<Vec<Child>, DomainError> {
        let ids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let rows = sqlx::query(&format!(
            "SELECT {} FROM children WHERE id = ANY($1) ORDER BY name",
            CHILD_COLUMNS
        ))
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("fetch children", e))?;

        rows.iter().map(row_to_child).collect()
    }

    async fn list_all(&self) -> Result<Vec<Child>, DomainError> {
        let rows = sqlx::query(&format!("SELECT {} FROM children ORDER BY name", CHILD_COLUMNS))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("list children", e))?;

        rows.iter().map(row_to_child).collect()
    }
}

/// PostgreSQL implementation of LocationRepository.
#[derive(Clone)]
pub struct PostgresLocationRepository {
    pool: PgPool,
}

impl PostgresLocationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LocationRepository for PostgresLocationRepository {
    async fn save(&self, location: &Location) -> Result<(), DomainError> {
        sqlx::query("INSERT INTO locations (id, label) VALUES ($1, $2)")
            .bind(location.id.as_uuid())
            .bind(&location.label)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("insert location", e))?;

        Ok(())
    }

    async fn find_by_id(&self, id: &LocationId) -> Result<Option<Location>, DomainError> {
        let row = sqlx::query("SELECT id, label FROM locations WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("fetch location", e))?;

        row.map(|row| {
            Ok(Location {
                id: LocationId::from_uuid(column(&row, "id")?),
                label: column(&row, "label")?,
            })
        })
        .transpose()
    }
}

fn row_to_user(row: &PgRow) -> Result<User, DomainError> {
    Ok(User {
        id: UserId::from_uuid(column(row, "id")?),
        role: parsed_column(row, "role")?,
        email: column(row, "email")?,
        name: column(row, "name")?,
        phone: column(row, "phone")?,
        created_at: timestamp_column(row, "created_at")?,
    })
}

fn row_to_child(row: &PgRow) -> Result<Child, DomainError> {
    let age: i16 = column(row, "age")?;
    Ok(Child {
        id: ChildId::from_uuid(column(row, "id")?),
        parent_id: UserId::from_uuid(column(row, "parent_id")?),
        name: column(row, "name")?,
        age: u8::try_from(age).map_err(|e| db_error("decode child age", e))?,
        gender: parsed_column(row, "gender")?,
        medical_condition: column(row, "medical_condition")?,
        goals: column(row, "goals")?,
    })
}
