//! [`Command`] for registering a new [`User`].

use common::{
    operations::{Commit, Insert, Transact, Transacted},
    DateTime,
};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::{Email, Name, Role};
use crate::{
    domain::{user, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for registering a new [`User`].
#[derive(Clone, Debug)]
pub struct RegisterUser {
    /// [`Name`] of a new [`User`].
    pub name: user::Name,

    /// [`Role`] of a new [`User`].
    pub role: user::Role,

    /// [`Email`] of a new [`User`].
    pub email: Option<user::Email>,
}

impl<Db> Command<RegisterUser> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<User>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: RegisterUser) -> Result<Self::Ok, Self::Err> {
        let RegisterUser { name, role, email } = cmd;

        let user = User {
            id: user::Id::new(),
            name,
            role,
            email,
            created_at: DateTime::now().coerce(),
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::wrap!())?;
        tx.execute(Insert(user.clone()))
            .await
            .map_err(tracerr::wrap!())
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::wrap!())
            .map(drop)?;

        Ok(user)
    }
}

/// Error of [`RegisterUser`] [`Command`] execution.
pub type ExecutionError = database::Error;
