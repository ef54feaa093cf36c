//! [`Command`] for deactivating an [`Offering`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::User;
use crate::{
    domain::{offering, user, Offering},
    infra::{database, Database},
    Event, Service,
};

use super::Command;

/// [`Command`] for deactivating an [`Offering`], closing it for new
/// applications.
///
/// Already submitted applications remain resolvable: rejection always works,
/// while approval fails once the [`Offering`] is not sellable anymore.
#[derive(Clone, Copy, Debug)]
pub struct DeactivateOffering {
    /// ID of the [`Offering`] to be deactivated.
    pub offering_id: offering::Id,

    /// ID of the trainer [`User`] deactivating the [`Offering`].
    pub trainer_id: user::Id,
}

impl<Db> Command<DeactivateOffering> for Service<Db>
where
    Db: Database<
            Select<By<Option<Offering>, offering::Id>>,
            Ok = Option<Offering>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Offering, offering::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Offering>, offering::Id>>,
            Ok = Option<Offering>,
            Err = Traced<database::Error>,
        > + Database<Update<Offering>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Offering;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: DeactivateOffering,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeactivateOffering {
            offering_id,
            trainer_id,
        } = cmd;

        let offering = self
            .database()
            .execute(Select(By::<Option<Offering>, _>::new(offering_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::OfferingNotExists(offering_id))
            .map_err(tracerr::wrap!())?;
        if offering.trainer_id != trainer_id {
            return Err(tracerr::new!(E::NotOwner(trainer_id)));
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `Offering`.
        tx.execute(Lock(By::new(offering_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut offering = tx
            .execute(Select(By::<Option<Offering>, _>::new(offering_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::OfferingNotExists(offering_id))
            .map_err(tracerr::wrap!())?;
        if offering.deactivated_at.is_some() {
            return Err(tracerr::new!(E::AlreadyDeactivated(offering_id)));
        }

        offering.deactivated_at = Some(DateTime::now().coerce());
        tx.execute(Update(offering.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        self.publish(Event::OfferingDeactivated {
            offering_id: offering.id,
        });

        Ok(offering)
    }
}

/// Error of [`DeactivateOffering`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Offering`] is already deactivated.
    #[display("`Offering(id: {_0})` is already deactivated")]
    AlreadyDeactivated(#[error(not(source))] offering::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`User`] with the provided ID does not own the [`Offering`].
    #[display("`User(id: {_0})` does not own the `Offering`")]
    NotOwner(#[error(not(source))] user::Id),

    /// [`Offering`] with the provided ID does not exist.
    #[display("`Offering(id: {_0})` does not exist")]
    OfferingNotExists(#[error(not(source))] offering::Id),
}
