use shared::menu::{self, MenuEntry};
use shared::models::UserProfile;
use shared::{Role, View};
use tokio::sync::watch;

use super::{AuthError, IdentityProvider, ProfileStore, Session};

/// Current session plus the provider and profile store behind it.
///
/// The role is resolved once per sign-in and published on a `watch`
/// channel; `None` means signed out.
pub struct SessionManager<P, S> {
    provider: P,
    profiles: S,
    current: watch::Sender<Option<Session>>,
}

impl<P: IdentityProvider, S: ProfileStore> SessionManager<P, S> {
    pub fn new(provider: P, profiles: S) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            provider,
            profiles,
            current,
        }
    }

    pub fn current(&self) -> Option<Session> {
        self.current.borrow().clone()
    }

    pub fn role(&self) -> Option<Role> {
        self.current.borrow().as_ref().map(|s| s.role)
    }

    /// Receives the session on every sign-in and sign-out
    pub fn on_auth_state_change(&self) -> watch::Receiver<Option<Session>> {
        self.current.subscribe()
    }

    pub fn visible_menu(&self) -> Vec<&'static MenuEntry> {
        menu::visible_menu(self.role())
    }

    pub fn resolve_view(&self, requested: View) -> View {
        menu::resolve_view(requested, self.role())
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let identity = match self.provider.sign_in(email, password).await {
            Ok(identity) => identity,
            Err(e) => {
                tracing::warn!(target: "security", email = %email, error = %e, "Sign-in failed");
                return Err(e);
            }
        };

        let role = self.resolve_role(&identity.uid).await;
        let session = Session { identity, role };
        tracing::info!(target: "security", uid = %session.identity.uid, role = %role, "Signed in");
        self.current.send_replace(Some(session.clone()));
        Ok(session)
    }

    /// Create the account, then provision an attendant profile for it
    pub async fn register(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let identity = match self.provider.register(email, password).await {
            Ok(identity) => identity,
            Err(e) => {
                tracing::warn!(target: "security", email = %email, error = %e, "Registration failed");
                return Err(e);
            }
        };

        let profile = UserProfile::new_attendant(identity.email.clone());
        if let Err(e) = self.profiles.save_profile(&identity.uid, &profile).await {
            tracing::error!(uid = %identity.uid, error = %e, "Failed to save profile for new account");
        }

        let session = Session {
            identity,
            role: Role::Attendant,
        };
        tracing::info!(target: "security", uid = %session.identity.uid, "Account registered");
        self.current.send_replace(Some(session.clone()));
        Ok(session)
    }

    /// Signing out while signed out is a no-op
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        let Some(session) = self.current() else {
            return Ok(());
        };
        self.provider.sign_out(&session.identity).await?;
        tracing::info!(target: "security", uid = %session.identity.uid, "Signed out");
        self.current.send_replace(None);
        Ok(())
    }

    /// Missing or unreadable profiles resolve to the least-privileged role
    async fn resolve_role(&self, uid: &str) -> Role {
        match self.profiles.load_profile(uid).await {
            Ok(Some(profile)) => profile.role,
            Ok(None) => {
                tracing::debug!(uid = %uid, "No profile found, defaulting to attendant");
                Role::Attendant
            }
            Err(e) => {
                tracing::warn!(uid = %uid, error = %e, "Failed to load profile, defaulting to attendant");
                Role::Attendant
            }
        }
    }
}
