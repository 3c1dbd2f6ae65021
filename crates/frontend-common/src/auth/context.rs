//! Authentication state and the actions that change it

use collab_core::{Role, User};

/// Who the client is acting as
#[derive(Clone, Debug, Default, PartialEq)]
pub enum SessionState {
    #[default]
    Anonymous,
    Authenticated(User),
}

impl SessionState {
    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        match self {
            Self::Authenticated(user) => Some(user),
            Self::Anonymous => None,
        }
    }

    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.user().map(|user| user.role)
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    #[must_use]
    pub fn is_student(&self) -> bool {
        self.role() == Some(Role::Student)
    }

    #[must_use]
    pub fn is_company(&self) -> bool {
        self.role() == Some(Role::Company)
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role() == Some(Role::Admin)
    }

    #[must_use]
    pub fn is_committee(&self) -> bool {
        self.role() == Some(Role::Committee)
    }
}

/// Authentication context data
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AuthState {
    pub session: SessionState,
    /// A profile fetch is in flight
    pub is_loading: bool,
}

/// Authentication context actions
#[derive(Debug)]
pub enum AuthAction {
    Login(User),
    Logout,
    SetLoading(bool),
}

impl AuthState {
    pub fn reduce(&mut self, action: AuthAction) {
        match action {
            AuthAction::Login(user) => {
                self.session = SessionState::Authenticated(user);
                self.is_loading = false;
            }
            AuthAction::Logout => {
                self.session = SessionState::Anonymous;
                self.is_loading = false;
            }
            AuthAction::SetLoading(is_loading) => self.is_loading = is_loading,
        }
    }
}
