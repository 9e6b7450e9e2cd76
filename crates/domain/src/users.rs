//! Authorized users: who may talk to the bridge and who administers it.

use crate::id::UserId;

/// The configured admin plus the set of users the admin has approved.
///
/// The admin is never stored in `users`; it is authorized implicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorizedUsers {
    admin: UserId,
    users: Vec<UserId>,
}

impl AuthorizedUsers {
    /// Build the set from its persisted form.
    ///
    /// Duplicates and entries equal to `admin` are dropped, keeping the first
    /// occurrence order.
    #[must_use]
    pub fn new(admin: UserId, users: impl IntoIterator<Item = UserId>) -> Self {
        let mut set = Self {
            admin,
            users: Vec::new(),
        };
        for user in users {
            set.insert(user);
        }
        set
    }

    /// The configured admin identity.
    #[must_use]
    pub fn admin(&self) -> UserId {
        self.admin
    }

    /// Whether an admin account has been configured at all.
    ///
    /// A zero admin id is the placeholder written into fresh config files.
    #[must_use]
    pub fn has_admin(&self) -> bool {
        self.admin.get() != 0
    }

    /// Approved users, in the order they were authorized.
    #[must_use]
    pub fn users(&self) -> &[UserId] {
        &self.users
    }

    #[must_use]
    pub fn is_admin(&self, id: UserId) -> bool {
        id == self.admin
    }

    #[must_use]
    pub fn is_authorized(&self, id: UserId) -> bool {
        self.is_admin(id) || self.users.contains(&id)
    }

    /// Add `id` to the approved users.
    ///
    /// Returns `false` without mutating when `id` is the admin or already
    /// approved.
    pub fn insert(&mut self, id: UserId) -> bool {
        if self.is_authorized(id) {
            return false;
        }
        self.users.push(id);
        true
    }
}
