use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod manager;

/// Trait for managing people.
#[async_trait]
pub trait Manager {
    /// Find a person by their contact key.
    async fn find_by_contact_key(&self, contact_key: &str) -> anyhow::Result<Option<Person>>;
}

/// Trait for managing transactional people.
#[async_trait]
pub trait TxManager {
    /// Insert a person, or fetch the id of the person already using the same contact key.
    async fn upsert(&mut self, person: &NewPerson) -> anyhow::Result<i64>;
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
/// Model for a person, either a commit author or the sender of a push.
pub struct Person {
    /// Row id.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Login on the origin host.
    pub handle: String,
    /// Natural key of the person.
    /// E-mail address for commit authors, login for push senders.
    pub contact_key: String,
    /// Profile page on the origin host, known for senders only.
    pub profile_url: Option<String>,
    /// Avatar image on the origin host, known for senders only.
    pub avatar_url: Option<String>,
}

/// A person that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NewPerson {
    /// Display name.
    pub name: String,
    /// Login on the origin host.
    pub handle: String,
    /// Natural key of the person.
    pub contact_key: String,
    /// Profile page on the origin host.
    pub profile_url: Option<String>,
    /// Avatar image on the origin host.
    pub avatar_url: Option<String>,
}

impl NewPerson {
    /// A commit author, keyed by e-mail.
    #[must_use]
    pub const fn author(name: String, handle: String, email: String) -> Self {
        Self {
            name,
            handle,
            contact_key: email,
            profile_url: None,
            avatar_url: None,
        }
    }

    /// The sender of a push, keyed by login.
    #[must_use]
    pub fn sender(login: String, profile_url: String, avatar_url: String) -> Self {
        Self {
            name: login.clone(),
            handle: login.clone(),
            contact_key: login,
            profile_url: Some(profile_url),
            avatar_url: Some(avatar_url),
        }
    }
}
