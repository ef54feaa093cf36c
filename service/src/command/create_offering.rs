//! [`Command`] for publishing a new [`Offering`].

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::offering::{Description, Price, SessionCount, Title};
use crate::{
    domain::{offering, user, Offering, User},
    infra::{database, Database},
    Event, Service,
};

use super::Command;

/// [`Command`] for publishing a new [`Offering`].
#[derive(Clone, Debug)]
pub struct CreateOffering {
    /// ID of the trainer [`User`] publishing the [`Offering`].
    pub trainer_id: user::Id,

    /// [`Title`] of a new [`Offering`].
    pub title: offering::Title,

    /// [`Description`] of a new [`Offering`].
    pub description: Option<offering::Description>,

    /// [`Price`] of a new [`Offering`].
    pub price: offering::Price,

    /// [`SessionCount`] granted by a new [`Offering`].
    pub total_sessions: offering::SessionCount,
}

impl<Db> Command<CreateOffering> for Service<Db>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<Offering>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Offering;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateOffering,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateOffering {
            trainer_id,
            title,
            description,
            price,
            total_sessions,
        } = cmd;

        let trainer = self
            .database()
            .execute(Select(By::<Option<User>, _>::new(trainer_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::TrainerNotExists(trainer_id))
            .map_err(tracerr::wrap!())?;
        if !trainer.is_trainer() {
            return Err(tracerr::new!(E::NotTrainer(trainer_id)));
        }

        let offering = Offering {
            id: offering::Id::new(),
            trainer_id: trainer.id,
            title,
            description,
            price,
            total_sessions,
            created_at: DateTime::now().coerce(),
            deactivated_at: None,
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Insert(offering.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        self.publish(Event::OfferingCreated {
            offering_id: offering.id,
        });

        Ok(offering)
    }
}

/// Error of [`CreateOffering`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`User`] with the provided ID is not a trainer.
    #[display("`User(id: {_0})` is not a trainer")]
    NotTrainer(#[error(not(source))] user::Id),

    /// Trainer with the provided ID does not exist.
    #[display("`User(id: {_0})` does not exist")]
    TrainerNotExists(#[error(not(source))] user::Id),
}
