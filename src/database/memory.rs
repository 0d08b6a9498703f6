use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::manager::DatabaseError;
use super::store::Store;
use crate::model::{Organization, Role, User};

/// Rows kept in insertion order; ids are unique per table
#[derive(Debug, Default)]
struct Tables {
    organizations: Vec<Organization>,
    roles: Vec<Role>,
    users: Vec<User>,
}

/// In-process store used for development and tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

trait Row: Clone {
    fn row_id(&self) -> Uuid;
}

impl Row for Organization {
    fn row_id(&self) -> Uuid {
        self.id
    }
}

impl Row for Role {
    fn row_id(&self) -> Uuid {
        self.id
    }
}

impl Row for User {
    fn row_id(&self) -> Uuid {
        self.id
    }
}

fn insert<T: Row>(table: &mut Vec<T>, row: &T, what: &str) -> Result<T, DatabaseError> {
    if table.iter().any(|r| r.row_id() == row.row_id()) {
        return Err(DatabaseError::Conflict(format!("{} {} already exists", what, row.row_id())));
    }
    table.push(row.clone());
    Ok(row.clone())
}

fn find<T: Row>(table: &[T], id: Uuid) -> Option<T> {
    table.iter().find(|r| r.row_id() == id).cloned()
}

fn find_mut<'a, T: Row>(table: &'a mut [T], id: Uuid, what: &str) -> Result<&'a mut T, DatabaseError> {
    table
        .iter_mut()
        .find(|r| r.row_id() == id)
        .ok_or_else(|| DatabaseError::NotFound(format!("{} {}", what, id)))
}

fn replace<T: Row>(table: &mut [T], row: &T, what: &str) -> Result<T, DatabaseError> {
    let slot = find_mut(table, row.row_id(), what)?;
    *slot = row.clone();
    Ok(row.clone())
}

fn ensure_parent(organizations: &[Organization], id: Option<Uuid>, what: &str) -> Result<(), DatabaseError> {
    match id {
        Some(id) if find(organizations, id).is_none() => Err(DatabaseError::NotFound(format!(
            "{} references a missing parent",
            what
        ))),
        _ => Ok(()),
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn insert_organization(&self, organization: &Organization) -> Result<Organization, DatabaseError> {
        let mut tables = self.tables.write().await;
        insert(&mut tables.organizations, organization, "organization")
    }

    async fn organization(&self, id: Uuid) -> Result<Option<Organization>, DatabaseError> {
        Ok(find(&self.tables.read().await.organizations, id))
    }

    async fn organizations(&self) -> Result<Vec<Organization>, DatabaseError> {
        Ok(self.tables.read().await.organizations.clone())
    }

    async fn update_organization(&self, organization: &Organization) -> Result<Organization, DatabaseError> {
        let mut tables = self.tables.write().await;
        replace(&mut tables.organizations, organization, "organization")
    }

    async fn insert_role(&self, role: &Role) -> Result<Role, DatabaseError> {
        let mut tables = self.tables.write().await;
        ensure_parent(&tables.organizations, role.organization_id, "role")?;
        insert(&mut tables.roles, role, "role")
    }

    async fn role(&self, id: Uuid) -> Result<Option<Role>, DatabaseError> {
        Ok(find(&self.tables.read().await.roles, id))
    }

    async fn roles(&self) -> Result<Vec<Role>, DatabaseError> {
        Ok(self.tables.read().await.roles.clone())
    }

    async fn roles_for_organization(&self, organization_id: Uuid) -> Result<Vec<Role>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .roles
            .iter()
            .filter(|r| r.organization_id == Some(organization_id))
            .cloned()
            .collect())
    }

    async fn update_role(&self, role: &Role) -> Result<Role, DatabaseError> {
        let mut tables = self.tables.write().await;
        ensure_parent(&tables.organizations, role.organization_id, "role")?;

        let stored = find_mut(&mut tables.roles, role.id, "role")?;
        stored.name = role.name.clone();
        stored.organization_id = role.organization_id;
        stored.updated_at = role.updated_at;
        Ok(stored.clone())
    }

    async fn set_role_tag(
        &self,
        id: Uuid,
        tag: Option<&str>,
        updated_at: DateTime<Utc>,
    ) -> Result<Role, DatabaseError> {
        let mut tables = self.tables.write().await;
        let stored = find_mut(&mut tables.roles, id, "role")?;
        stored.role = tag.map(str::to_string);
        stored.updated_at = updated_at;
        Ok(stored.clone())
    }

    async fn insert_user(&self, user: &User) -> Result<User, DatabaseError> {
        let mut tables = self.tables.write().await;
        ensure_parent(&tables.organizations, user.organization_id, "user")?;
        insert(&mut tables.users, user, "user")
    }

    async fn user(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        Ok(find(&self.tables.read().await.users, id))
    }

    async fn users(&self) -> Result<Vec<User>, DatabaseError> {
        Ok(self.tables.read().await.users.clone())
    }

    async fn update_user(&self, user: &User) -> Result<User, DatabaseError> {
        let mut tables = self.tables.write().await;
        ensure_parent(&tables.organizations, user.organization_id, "user")?;
        replace(&mut tables.users, user, "user")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn roles_for_organization_keeps_insertion_order_and_scope() {
        let store = MemoryStore::new();
        let acme = store.insert_organization(&Organization::new("Acme")).await.unwrap();
        let globex = store.insert_organization(&Organization::new("Globex")).await.unwrap();

        for name in ["Admin", "Auditor", "Viewer"] {
            store.insert_role(&Role::new(name, Some(acme.id))).await.unwrap();
        }
        store.insert_role(&Role::new("Other", Some(globex.id))).await.unwrap();
        store.insert_role(&Role::new("Unassigned", None)).await.unwrap();

        let names: Vec<String> = store
            .roles_for_organization(acme.id)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["Admin", "Auditor", "Viewer"]);
        assert_eq!(store.roles().await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn update_of_missing_row_is_not_found() {
        let store = MemoryStore::new();
        let err = store.update_role(&Role::new("Ghost", None)).await.unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound(_)));
    }

    #[tokio::test]
    async fn role_updates_never_touch_the_stored_tag() {
        let store = MemoryStore::new();
        let role = store.insert_role(&Role::new("Auditor", None)).await.unwrap();
        store.set_role_tag(role.id, Some("ROLE_AUDITOR"), Utc::now()).await.unwrap();

        let mut renamed = role.clone();
        renamed.name = "Lead Auditor".into();
        renamed.role = Some("ROLE_STALE".into());
        let updated = store.update_role(&renamed).await.unwrap();

        assert_eq!(updated.name, "Lead Auditor");
        assert_eq!(updated.role.as_deref(), Some("ROLE_AUDITOR"));
    }

    #[tokio::test]
    async fn duplicate_ids_conflict() {
        let store = MemoryStore::new();
        let org = Organization::new("Acme");
        store.insert_organization(&org).await.unwrap();
        let err = store.insert_organization(&org).await.unwrap_err();
        assert!(matches!(err, DatabaseError::Conflict(_)));
    }

    #[tokio::test]
    async fn rejects_missing_parent() {
        let store = MemoryStore::new();
        let err = store
            .insert_role(&Role::new("Orphan", Some(Uuid::new_v4())))
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound(_)));
    }
}
