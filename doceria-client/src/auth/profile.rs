use async_trait::async_trait;
use shared::models::{UserCreate, UserProfile};

use crate::{ClientResult, HttpClient};

/// Side store holding the role of each account
#[async_trait]
pub trait ProfileStore: Send + Sync + 'static {
    /// `None` when the account has no profile yet
    async fn load_profile(&self, uid: &str) -> ClientResult<Option<UserProfile>>;

    async fn save_profile(&self, uid: &str, profile: &UserProfile) -> ClientResult<()>;
}

#[async_trait]
impl ProfileStore for HttpClient {
    async fn load_profile(&self, uid: &str) -> ClientResult<Option<UserProfile>> {
        match self.get_user(uid).await {
            Ok(account) => Ok(Some(UserProfile {
                email: account.email,
                role: account.role,
            })),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn save_profile(&self, uid: &str, profile: &UserProfile) -> ClientResult<()> {
        let user = UserCreate {
            id: Some(uid.to_string()),
            email: profile.email.clone().unwrap_or_default(),
            password: None,
            name: None,
            role: profile.role,
        };
        self.create_user(&user).await?;
        Ok(())
    }
}
