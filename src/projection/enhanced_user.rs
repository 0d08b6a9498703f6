use futures::stream::{self, StreamExt};
use serde::Serialize;

use crate::directory::{Profile, ProfileDirectory};
use crate::model::User;

/// User merged with its directory profile. Profile fields are null when the
/// directory has nothing for the user or could not be reached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnhancedUser {
    #[serde(flatten)]
    pub user: User,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub display_name: Option<String>,
}

impl EnhancedUser {
    pub fn merge(user: User, profile: Option<Profile>) -> Self {
        let profile = profile.unwrap_or_default();
        Self {
            display_name: profile.display_name(),
            first_name: profile.first_name,
            last_name: profile.last_name,
            user,
        }
    }
}

/// Join every user with its profile. At most `max_in_flight` lookups run at
/// once, results keep the user order, and a failed lookup only blanks that
/// user's profile fields.
pub async fn enhance(
    users: Vec<User>,
    directory: &dyn ProfileDirectory,
    max_in_flight: usize,
) -> Vec<EnhancedUser> {
    let lookups: Vec<_> = users.iter().map(|user| lookup(directory, &user.username)).collect();
    let profiles: Vec<Option<Profile>> = stream::iter(lookups)
        .buffered(max_in_flight.max(1))
        .collect()
        .await;

    users
        .into_iter()
        .zip(profiles)
        .map(|(user, profile)| EnhancedUser::merge(user, profile))
        .collect()
}

async fn lookup(directory: &dyn ProfileDirectory, username: &str) -> Option<Profile> {
    match directory.lookup(username).await {
        Ok(profile) => profile,
        Err(e) => {
            tracing::warn!("profile lookup for '{}' failed, continuing without it: {}", username, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{DirectoryError, StaticDirectory};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Records the highest number of lookups in flight at once
    #[derive(Default)]
    struct SlowDirectory {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl ProfileDirectory for SlowDirectory {
        async fn lookup(&self, key: &str) -> Result<Option<Profile>, DirectoryError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(Some(Profile::new(key, "Tester")))
        }
    }

    struct BrokenDirectory;

    #[async_trait]
    impl ProfileDirectory for BrokenDirectory {
        async fn lookup(&self, _key: &str) -> Result<Option<Profile>, DirectoryError> {
            Err(DirectoryError::Unavailable("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn merges_profiles_and_tolerates_missing_ones() {
        let directory = StaticDirectory::new().with_profile("ada", Profile::new("Ada", "Lovelace"));
        let users = vec![User::new("ada"), User::new("ghost")];

        let enhanced = enhance(users, &directory, 4).await;
        assert_eq!(enhanced.len(), 2);
        assert_eq!(enhanced[0].display_name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(enhanced[1].user.username, "ghost");
        assert_eq!(enhanced[1].first_name, None);
        assert_eq!(enhanced[1].display_name, None);
    }

    #[tokio::test]
    async fn directory_failures_become_empty_profiles() {
        let enhanced = enhance(vec![User::new("ada")], &BrokenDirectory, 4).await;
        assert_eq!(enhanced.len(), 1);
        assert_eq!(enhanced[0].last_name, None);
    }

    #[tokio::test]
    async fn lookups_are_bounded_and_keep_order() {
        let directory = SlowDirectory::default();
        let users: Vec<User> = (0..10).map(|i| User::new(format!("user{}", i))).collect();

        let enhanced = enhance(users, &directory, 3).await;

        assert!(directory.peak.load(Ordering::SeqCst) <= 3);
        assert!(directory.peak.load(Ordering::SeqCst) >= 2);
        let names: Vec<_> = enhanced.iter().filter_map(|u| u.first_name.clone()).collect();
        let expected: Vec<_> = (0..10).map(|i| format!("user{}", i)).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn serializes_flat_with_null_profile_fields() {
        let value = serde_json::to_value(EnhancedUser::merge(User::new("ghost"), None)).unwrap();
        assert_eq!(value["username"], "ghost");
        assert!(value["first_name"].is_null());
        assert!(value["display_name"].is_null());
    }
}
