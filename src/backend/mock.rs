//! In-memory [`Backend`] used by unit and router tests.
//!
//! Tokens are plain strings registered up front; rows live in `Mutex`ed
//! vectors. Call counters let tests assert that a path never reached the
//! provider.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use uuid::Uuid;

use super::types::*;

#[derive(Debug, Clone)]
struct MembershipRecord {
    org_id: Uuid,
    user_id: Uuid,
    role: MembershipRole,
    seq: usize,
}

#[derive(Default)]
pub struct MockBackend {
    access_tokens: Mutex<HashMap<String, AuthIdentity>>,
    refresh_tokens: Mutex<HashMap<String, AuthIdentity>>,
    passwords: Mutex<HashMap<String, (String, AuthIdentity)>>,
    organizations: Mutex<Vec<OrganizationRow>>,
    memberships: Mutex<Vec<MembershipRecord>>,
    profiles: Mutex<HashMap<Uuid, Profile>>,
    objects: Mutex<HashMap<String, Vec<u8>>>,
    pub signups: Mutex<Vec<(String, String)>>,
    pub signed_out: Mutex<Vec<String>>,
    pub fail_memberships: AtomicBool,
    pub fail_membership_insert: AtomicBool,
    pub fail_user_lookup: AtomicBool,
    pub get_user_calls: AtomicUsize,
    pub membership_calls: AtomicUsize,
    refresh_counter: AtomicUsize,
}

impl MockBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, access_token: &str, email: &str) -> AuthIdentity {
        let user = AuthIdentity { id: Uuid::new_v4(), email: Some(email.to_owned()) };
        self.access_tokens
            .lock()
            .unwrap()
            .insert(access_token.to_owned(), user.clone());
        user
    }

    pub fn add_refresh_token(&self, refresh_token: &str, user: &AuthIdentity) {
        self.refresh_tokens
            .lock()
            .unwrap()
            .insert(refresh_token.to_owned(), user.clone());
    }

    pub fn add_password(&self, email: &str, password: &str, user: &AuthIdentity) {
        self.passwords
            .lock()
            .unwrap()
            .insert(email.to_owned(), (password.to_owned(), user.clone()));
    }

    pub fn add_profile(&self, profile: Profile) {
        self.profiles.lock().unwrap().insert(profile.id, profile);
    }

    /// Seed an organization with the given member as `role`.
    pub fn add_organization(&self, name: &str, user_id: Uuid, role: MembershipRole) -> Uuid {
        let id = Uuid::new_v4();
        self.organizations.lock().unwrap().push(OrganizationRow {
            id,
            name: name.to_owned(),
            slug: name.to_ascii_lowercase(),
            avatar_url: None,
            owner_id: Some(user_id),
        });
        self.push_membership(id, user_id, role);
        id
    }

    fn push_membership(&self, org_id: Uuid, user_id: Uuid, role: MembershipRole) {
        let mut memberships = self.memberships.lock().unwrap();
        let seq = memberships.len();
        memberships.push(MembershipRecord { org_id, user_id, role, seq });
    }

    #[must_use]
    pub fn profile(&self, user_id: Uuid) -> Option<Profile> {
        self.profiles.lock().unwrap().get(&user_id).cloned()
    }

    #[must_use]
    pub fn object(&self, bucket: &str, name: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(&format!("{bucket}/{name}"))
            .cloned()
    }

    #[must_use]
    pub fn organization_count(&self) -> usize {
        self.organizations.lock().unwrap().len()
    }

    fn user_for(&self, access_token: &str) -> Result<AuthIdentity, BackendError> {
        self.access_tokens
            .lock()
            .unwrap()
            .get(access_token)
            .cloned()
            .ok_or(BackendError::Response { status: 401, body: "invalid token".into() })
    }
}

#[async_trait::async_trait]
impl Backend for MockBackend {
    async fn get_user(&self, access_token: &str) -> Result<Option<AuthIdentity>, BackendError> {
        self.get_user_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_user_lookup.load(Ordering::SeqCst) {
            return Err(BackendError::Request("connection refused".into()));
        }
        Ok(self.access_tokens.lock().unwrap().get(access_token).cloned())
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<Option<AuthSession>, BackendError> {
        let Some(user) = self.refresh_tokens.lock().unwrap().remove(refresh_token) else {
            return Ok(None);
        };
        let n = self.refresh_counter.fetch_add(1, Ordering::SeqCst);
        let tokens = SessionTokens {
            access_token: format!("refreshed-at-{n}"),
            refresh_token: format!("refreshed-rt-{n}"),
            expires_in: 3600,
        };
        self.access_tokens
            .lock()
            .unwrap()
            .insert(tokens.access_token.clone(), user.clone());
        self.refresh_tokens
            .lock()
            .unwrap()
            .insert(tokens.refresh_token.clone(), user.clone());
        Ok(Some(AuthSession { tokens, user }))
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession, BackendError> {
        let entry = self.passwords.lock().unwrap().get(email).cloned();
        match entry {
            Some((expected, user)) if expected == password => {
                let n = self.refresh_counter.fetch_add(1, Ordering::SeqCst);
                let tokens = SessionTokens {
                    access_token: format!("login-at-{n}"),
                    refresh_token: format!("login-rt-{n}"),
                    expires_in: 3600,
                };
                self.access_tokens
                    .lock()
                    .unwrap()
                    .insert(tokens.access_token.clone(), user.clone());
                Ok(AuthSession { tokens, user })
            }
            _ => Err(BackendError::Rejected("Invalid login credentials".into())),
        }
    }

    async fn sign_up(&self, email: &str, _password: &str, full_name: &str) -> Result<(), BackendError> {
        if self.passwords.lock().unwrap().contains_key(email) {
            return Err(BackendError::Rejected("User already registered".into()));
        }
        self.signups
            .lock()
            .unwrap()
            .push((email.to_owned(), full_name.to_owned()));
        Ok(())
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), BackendError> {
        self.access_tokens.lock().unwrap().remove(access_token);
        self.signed_out
            .lock()
            .unwrap()
            .push(access_token.to_owned());
        Ok(())
    }

    async fn first_membership(&self, access_token: &str, user_id: Uuid) -> Result<Option<Uuid>, BackendError> {
        self.membership_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_memberships.load(Ordering::SeqCst) {
            return Err(BackendError::Response { status: 500, body: "db down".into() });
        }
        self.user_for(access_token)?;
        Ok(self
            .memberships
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.user_id == user_id)
            .min_by_key(|m| m.seq)
            .map(|m| m.org_id))
    }

    async fn list_organizations(&self, access_token: &str, user_id: Uuid) -> Result<Vec<Organization>, BackendError> {
        if self.fail_memberships.load(Ordering::SeqCst) {
            return Err(BackendError::Response { status: 500, body: "db down".into() });
        }
        self.user_for(access_token)?;
        let memberships = self.memberships.lock().unwrap().clone();
        let orgs = self.organizations.lock().unwrap();
        let mut out: Vec<Organization> = orgs
            .iter()
            .filter_map(|org| {
                let m = memberships
                    .iter()
                    .find(|m| m.org_id == org.id && m.user_id == user_id)?;
                Some(Organization {
                    id: org.id,
                    name: org.name.clone(),
                    slug: org.slug.clone(),
                    avatar_url: org.avatar_url.clone(),
                    role: m.role,
                })
            })
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }

    async fn insert_organization(
        &self,
        access_token: &str,
        org: &NewOrganization,
    ) -> Result<OrganizationRow, BackendError> {
        self.user_for(access_token)?;
        let row = OrganizationRow {
            id: Uuid::new_v4(),
            name: org.name.clone(),
            slug: org.slug.clone(),
            avatar_url: None,
            owner_id: Some(org.owner_id),
        };
        self.organizations.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn insert_membership(&self, access_token: &str, membership: &NewMembership) -> Result<(), BackendError> {
        self.user_for(access_token)?;
        if self.fail_membership_insert.load(Ordering::SeqCst) {
            return Err(BackendError::Response { status: 403, body: "row-level security violation".into() });
        }
        self.push_membership(membership.org_id, membership.user_id, membership.role);
        Ok(())
    }

    async fn get_organization(&self, access_token: &str, org_id: Uuid) -> Result<Option<OrganizationRow>, BackendError> {
        self.user_for(access_token)?;
        Ok(self
            .organizations
            .lock()
            .unwrap()
            .iter()
            .find(|o| o.id == org_id)
            .cloned())
    }

    async fn get_profile(&self, access_token: &str, user_id: Uuid) -> Result<Option<Profile>, BackendError> {
        self.user_for(access_token)?;
        Ok(self.profile(user_id))
    }

    async fn update_profile(
        &self,
        access_token: &str,
        user_id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<Profile, BackendError> {
        self.user_for(access_token)?;
        let mut profiles = self.profiles.lock().unwrap();
        let profile = profiles
            .get_mut(&user_id)
            .ok_or_else(|| BackendError::Parse("no rows returned".into()))?;
        if let Some(name) = &update.full_name {
            profile.full_name = Some(name.clone());
        }
        if let Some(url) = &update.avatar_url {
            profile.avatar_url.clone_from(url);
        }
        profile.updated_at = Some(update.updated_at.clone());
        Ok(profile.clone())
    }

    async fn upload_object(
        &self,
        access_token: &str,
        bucket: &str,
        name: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<(), BackendError> {
        self.user_for(access_token)?;
        self.objects
            .lock()
            .unwrap()
            .insert(format!("{bucket}/{name}"), bytes);
        Ok(())
    }

    fn public_url(&self, bucket: &str, name: &str) -> String {
        super::storage::public_object_url("https://mock.supabase.test", bucket, name)
    }
}
