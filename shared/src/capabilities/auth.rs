use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};

use super::BackendError;
use crate::model::{Password, UserId};

#[derive(Clone)]
pub struct Auth<E> {
    context: CapabilityContext<AuthOperation, E>,
}

impl<Ev> Capability<Ev> for Auth<Ev> {
    type Operation = AuthOperation;
    type MappedSelf<MappedEv> = Auth<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Auth::new(self.context.map_event(f))
    }
}

impl<E> Auth<E>
where
    E: 'static,
{
    pub fn new(context: CapabilityContext<AuthOperation, E>) -> Self {
        Self { context }
    }

    /// Creates an email/password credential and yields the new account id.
    ///
    /// The provider rejects duplicate emails and weak credentials; its error
    /// code and message are passed through untouched in [`BackendError::Auth`].
    pub fn create_account<F>(&self, email: String, password: Password, callback: F)
    where
        F: FnOnce(Result<UserId, BackendError>) -> E + Send + 'static,
        E: Send,
    {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let result = ctx
                .request_from_shell(AuthOperation::CreateAccount { email, password })
                .await;
            ctx.update_app(callback(result.and_then(AccountCreated::into_user_id)));
        });
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum AuthOperation {
    CreateAccount { email: String, password: Password },
}

impl Operation for AuthOperation {
    type Output = Result<AccountCreated, BackendError>;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountCreated {
    pub uid: String,
}

impl AccountCreated {
    fn into_user_id(self) -> Result<UserId, BackendError> {
        let uid = self.uid.trim();
        if uid.is_empty() {
            return Err(BackendError::UnexpectedResponse {
                operation: "create_account".into(),
            });
        }
        Ok(UserId::new(uid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_debug_hides_password() {
        let op = AuthOperation::CreateAccount {
            email: "john@doe.com".into(),
            password: Password::new("abc123!"),
        };
        let debug = format!("{op:?}");
        assert!(debug.contains("john@doe.com"));
        assert!(!debug.contains("abc123!"));
    }

    #[test]
    fn blank_uid_is_rejected() {
        let created = AccountCreated { uid: "  ".into() };
        assert!(matches!(
            created.into_user_id(),
            Err(BackendError::UnexpectedResponse { .. })
        ));
    }

    #[test]
    fn uid_becomes_user_id() {
        let created = AccountCreated { uid: "uid-42".into() };
        assert_eq!(created.into_user_id(), Ok(UserId::new("uid-42")));
    }
}
