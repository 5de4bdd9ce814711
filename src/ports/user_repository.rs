//! User and child lookups.

use async_trait::async_trait;

use crate::domain::foundation::{ChildId, DomainError, LocationId, UserId};
use crate::domain::people::{Child, Location, User, UserRole};

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// # Errors
    ///
    /// - `AlreadyExists` if the email is taken
    /// - `DatabaseError` on persistence failure
    async fn save(&self, user: &User) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError>;

    /// All users holding any of `roles`, ordered by name.
    async fn list_by_roles(&self, roles: &[UserRole]) -> Result<Vec<User>, DomainError>;
}

#[async_trait]
pub trait ChildRepository: Send + Sync {
    async fn save(&self, child: &Child) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &ChildId) -> Result<Option<Child>, DomainError>;

    /// Children matching `ids`. Unknown IDs are skipped.
    async fn find_by_ids(&self, ids: &[ChildId]) -> Result<Vec<Child>, DomainError>;

    async fn list_all(&self) -> Result<Vec<Child>, DomainError>;
}

#[async_trait]
pub trait LocationRepository: Send + Sync {
    async fn save(&self, location: &Location) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &LocationId) -> Result<Option<Location>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repositories_are_object_safe() {
        fn _users(_repo: &dyn UserRepository) {}
        fn _children(_repo: &dyn ChildRepository) {}
        fn _locations(_repo: &dyn LocationRepository) {}
    }
}
