//! In-memory port doubles shared by the service tests.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use bizdir_domain::attribute::{Attribute, AttributeKind, NewAttribute};
use bizdir_domain::business::{Business, BusinessDraft, BusinessFilter, ImageUpload, image_path};
use bizdir_domain::error::{BizDirError, ValidationError};
use bizdir_domain::id::{AttributeId, BusinessId, UserId};
use bizdir_domain::time;
use bizdir_domain::user::{AuthToken, NewUser, User};

use crate::ports::{
    AttributeRepository, BusinessRepository, CredentialHasher, ImageStore, UserRepository,
};

#[derive(Default)]
struct State {
    next_id: i64,
    users: Vec<User>,
    tokens: Vec<AuthToken>,
    attributes: Vec<Attribute>,
    businesses: HashMap<BusinessId, Business>,
    image_writes_fail: bool,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// One shared store implementing every repository port.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    fn with<T>(&self, f: impl FnOnce(&mut State) -> T) -> T {
        let mut state = self.state.lock().unwrap();
        f(&mut state)
    }

    pub fn business(&self, id: BusinessId) -> Option<Business> {
        self.with(|state| state.businesses.get(&id).cloned())
    }

    pub fn attribute_count(&self) -> usize {
        self.with(|state| state.attributes.len())
    }

    /// Make every later `set_image` call fail with a storage error.
    pub fn fail_image_writes(&self) {
        self.with(|state| state.image_writes_fail = true);
    }

    pub fn deactivate(&self, id: UserId) {
        self.with(|state| {
            if let Some(user) = state.users.iter_mut().find(|u| u.id == id) {
                user.is_active = false;
            }
        });
    }
}

impl UserRepository for InMemoryStore {
    async fn create(&self, user: NewUser) -> Result<User, BizDirError> {
        self.with(|state| {
            if state.users.iter().any(|u| u.email == user.email) {
                return Err(ValidationError::EmailTaken.into());
            }
            let created = User {
                id: UserId::new(state.next_id()),
                email: user.email,
                name: user.name,
                password_hash: user.password_hash,
                is_active: true,
                is_staff: user.is_staff,
                is_superuser: user.is_superuser,
            };
            state.users.push(created.clone());
            Ok(created)
        })
    }

    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, BizDirError> {
        Ok(self.with(|state| state.users.iter().find(|u| u.id == id).cloned()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, BizDirError> {
        Ok(self.with(|state| state.users.iter().find(|u| u.email == email).cloned()))
    }

    async fn update(&self, user: User) -> Result<User, BizDirError> {
        self.with(|state| {
            if let Some(stored) = state.users.iter_mut().find(|u| u.id == user.id) {
                *stored = user.clone();
            }
        });
        Ok(user)
    }

    async fn get_or_create_token(
        &self,
        user_id: UserId,
        candidate_key: String,
    ) -> Result<AuthToken, BizDirError> {
        Ok(self.with(|state| {
            if let Some(token) = state.tokens.iter().find(|t| t.user_id == user_id) {
                return token.clone();
            }
            let token = AuthToken {
                key: candidate_key,
                user_id,
                created: time::now(),
            };
            state.tokens.push(token.clone());
            token
        }))
    }

    async fn find_by_token(&self, key: &str) -> Result<Option<User>, BizDirError> {
        Ok(self.with(|state| {
            let user_id = state.tokens.iter().find(|t| t.key == key)?.user_id;
            state.users.iter().find(|u| u.id == user_id).cloned()
        }))
    }
}

impl AttributeRepository for InMemoryStore {
    async fn create(
        &self,
        owner: UserId,
        attribute: NewAttribute,
    ) -> Result<Attribute, BizDirError> {
        Ok(self.with(|state| {
            let created = Attribute {
                id: AttributeId::new(state.next_id()),
                owner_id: owner,
                kind: attribute.kind,
                name: attribute.name,
            };
            state.attributes.push(created.clone());
            created
        }))
    }

    async fn list(
        &self,
        owner: UserId,
        kind: AttributeKind,
        assigned_only: bool,
    ) -> Result<Vec<Attribute>, BizDirError> {
        Ok(self.with(|state| {
            let mut found: Vec<Attribute> = state
                .attributes
                .iter()
                .filter(|a| a.owner_id == owner && a.kind == kind)
                .filter(|a| {
                    !assigned_only
                        || state
                            .businesses
                            .values()
                            .any(|b| b.owner_id == owner && b.links(kind).contains(&a.id))
                })
                .cloned()
                .collect();
            found.sort_by(|a, b| b.name.cmp(&a.name).then(b.id.cmp(&a.id)));
            found
        }))
    }

    async fn find_by_ids(
        &self,
        owner: UserId,
        kind: AttributeKind,
        ids: &BTreeSet<AttributeId>,
    ) -> Result<Vec<Attribute>, BizDirError> {
        Ok(self.with(|state| {
            let mut found: Vec<Attribute> = state
                .attributes
                .iter()
                .filter(|a| a.owner_id == owner && a.kind == kind && ids.contains(&a.id))
                .cloned()
                .collect();
            found.sort_by_key(|a| a.id);
            found
        }))
    }
}

impl BusinessRepository for InMemoryStore {
    async fn create(&self, owner: UserId, draft: BusinessDraft) -> Result<Business, BizDirError> {
        Ok(self.with(|state| {
            let business = Business {
                id: BusinessId::new(state.next_id()),
                owner_id: owner,
                name: draft.name,
                image: None,
                categories: draft.categories,
                services: draft.services,
            };
            state.businesses.insert(business.id, business.clone());
            business
        }))
    }

    async fn get_by_id(
        &self,
        owner: UserId,
        id: BusinessId,
    ) -> Result<Option<Business>, BizDirError> {
        Ok(self.with(|state| {
            state
                .businesses
                .get(&id)
                .filter(|b| b.owner_id == owner)
                .cloned()
        }))
    }

    async fn list(
        &self,
        owner: UserId,
        filter: &BusinessFilter,
    ) -> Result<Vec<Business>, BizDirError> {
        Ok(self.with(|state| {
            let mut found: Vec<Business> = state
                .businesses
                .values()
                .filter(|b| b.owner_id == owner && filter.matches(b))
                .cloned()
                .collect();
            found.sort_by(|a, b| b.name.cmp(&a.name).then(b.id.cmp(&a.id)));
            found
        }))
    }

    async fn update(
        &self,
        owner: UserId,
        id: BusinessId,
        draft: BusinessDraft,
    ) -> Result<Option<Business>, BizDirError> {
        Ok(self.with(|state| {
            let business = state
                .businesses
                .get_mut(&id)
                .filter(|b| b.owner_id == owner)?;
            business.name = draft.name;
            business.categories = draft.categories;
            business.services = draft.services;
            Some(business.clone())
        }))
    }

    async fn set_image(
        &self,
        owner: UserId,
        id: BusinessId,
        path: String,
    ) -> Result<Option<Business>, BizDirError> {
        self.with(|state| {
            if state.image_writes_fail {
                return Err(BizDirError::Storage(Box::new(std::io::Error::other(
                    "image write failed",
                ))));
            }
            Ok(state
                .businesses
                .get_mut(&id)
                .filter(|b| b.owner_id == owner)
                .map(|business| {
                    business.image = Some(path);
                    business.clone()
                }))
        })
    }

    async fn delete(&self, owner: UserId, id: BusinessId) -> Result<bool, BizDirError> {
        Ok(self.with(|state| {
            let visible = state
                .businesses
                .get(&id)
                .is_some_and(|b| b.owner_id == owner);
            if visible {
                state.businesses.remove(&id);
            }
            visible
        }))
    }
}

/// Reversible "hash" so tests can assert on what got stored.
pub struct PlainHasher;

impl CredentialHasher for PlainHasher {
    async fn hash_password(&self, password: &str) -> Result<String, BizDirError> {
        Ok(format!("plain${password}"))
    }

    async fn verify_password(&self, password: &str, hash: &str) -> Result<bool, BizDirError> {
        Ok(hash.strip_prefix("plain$") == Some(password))
    }

    fn generate_token(&self) -> String {
        format!("token-{}", time::now().timestamp_nanos_opt().unwrap_or_default())
    }
}

/// Accepts payloads starting with the PNG signature, rejects everything else.
#[derive(Clone, Default)]
pub struct FakeImageStore {
    saved: Arc<Mutex<Vec<String>>>,
    removed: Arc<Mutex<Vec<String>>>,
}

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

impl FakeImageStore {
    pub fn saved(&self) -> Vec<String> {
        self.saved.lock().unwrap().clone()
    }

    pub fn removed(&self) -> Vec<String> {
        self.removed.lock().unwrap().clone()
    }
}

impl ImageStore for FakeImageStore {
    async fn save(&self, upload: ImageUpload) -> Result<String, BizDirError> {
        if !upload.bytes.starts_with(PNG_SIGNATURE) {
            return Err(ValidationError::InvalidImage.into());
        }
        let path = image_path(&upload.extension().unwrap_or_else(|| "png".to_string()));
        self.saved.lock().unwrap().push(path.clone());
        Ok(path)
    }

    async fn remove(&self, path: &str) -> Result<(), BizDirError> {
        self.removed.lock().unwrap().push(path.to_string());
        Ok(())
    }
}

pub fn png_upload(filename: &str) -> ImageUpload {
    let mut bytes = PNG_SIGNATURE.to_vec();
    bytes.extend_from_slice(b"rest-of-file");
    ImageUpload {
        filename: Some(filename.to_string()),
        bytes,
    }
}
