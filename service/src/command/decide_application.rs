//! [`Command`] for deciding a pending [`Application`].

use common::{
    operations::{
        By, Commit, Insert, Lock, Select, Transact, Transacted, Update,
    },
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::User;
use crate::{
    domain::{
        application, contract, offering, user, Application, Contract, Offering,
    },
    infra::{database, Database},
    Event, Service,
};

use super::Command;

/// [`Command`] for deciding a pending [`Application`].
///
/// Approval opens a [`Contract`] in the same transaction, copying the session
/// total from the [`Offering`]. Rejection closes the [`Application`] with no
/// further effect. Either decision is final.
#[derive(Clone, Copy, Debug)]
pub struct DecideApplication {
    /// ID of the [`Application`] to be decided.
    pub application_id: application::Id,

    /// ID of the trainer [`User`] deciding the [`Application`].
    pub trainer_id: user::Id,

    /// Whether the [`Application`] is approved or rejected.
    pub approve: bool,
}

/// Output of [`DecideApplication`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// Decided [`Application`].
    pub application: Application,

    /// [`Contract`] opened by the decision, if it was an approval.
    pub contract: Option<Contract>,
}

impl<Db> Command<DecideApplication> for Service<Db>
where
    Db: Database<
            Select<By<Option<Application>, application::Id>>,
            Ok = Option<Application>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Offering>, offering::Id>>,
            Ok = Option<Offering>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Offering, offering::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<Application, application::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Application>, application::Id>>,
            Ok = Option<Application>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Offering>, offering::Id>>,
            Ok = Option<Offering>,
            Err = Traced<database::Error>,
        > + Database<Update<Application>, Err = Traced<database::Error>>
        + Database<Insert<Contract>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: DecideApplication,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DecideApplication {
            application_id,
            trainer_id,
            approve,
        } = cmd;

        let application = self
            .database()
            .execute(Select(By::<Option<Application>, _>::new(application_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ApplicationNotExists(application_id))
            .map_err(tracerr::wrap!())?;

        let offering_id = application.offering_id;
        let offering = self
            .database()
            .execute(Select(By::<Option<Offering>, _>::new(offering_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::OfferingNotSellable(offering_id))
            .map_err(tracerr::wrap!())?;
        if offering.trainer_id != trainer_id {
            return Err(tracerr::new!(E::NotOwner(trainer_id)));
        }
        if !application.is_pending() {
            return Err(tracerr::new!(E::AlreadyDecided(application_id)));
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid racing a concurrent deactivation of the `Offering`.
        tx.execute(Lock(By::<Offering, _>::new(offering_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        // Avoid concurrent decisions upon the same `Application`.
        tx.execute(Lock(By::<Application, _>::new(application_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut application = tx
            .execute(Select(By::<Option<Application>, _>::new(application_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ApplicationNotExists(application_id))
            .map_err(tracerr::wrap!())?;
        if !application.is_pending() {
            return Err(tracerr::new!(E::AlreadyDecided(application_id)));
        }

        if !approve {
            application.rejected_at = Some(DateTime::now().coerce());

            tx.execute(Update(application.clone()))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
            tx.execute(Commit)
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;

            self.publish(Event::ApplicationRejected { application_id });

            return Ok(Output {
                application,
                contract: None,
            });
        }

        // Approval re-checks sellability inside the transaction: the
        // `Offering` may have been deactivated since the submission.
        let offering = tx
            .execute(Select(By::<Option<Offering>, _>::new(offering_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .filter(Offering::is_sellable)
            .ok_or(E::OfferingNotSellable(offering_id))
            .map_err(tracerr::wrap!())?;

        application.approved_at = Some(DateTime::now().coerce());

        let contract = Contract {
            id: contract::Id::new(),
            member_id: application.member_id,
            trainer_id: offering.trainer_id,
            offering_id: offering.id,
            total_sessions: offering.total_sessions,
            remaining_sessions: contract::SessionBalance::new(
                offering.total_sessions,
            ),
            created_at: DateTime::now().coerce(),
            completed_at: None,
            cancelled_at: None,
        };

        tx.execute(Update(application.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Insert(contract.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        self.publish(Event::ApplicationApproved { application_id });
        self.publish(Event::ContractCreated {
            contract_id: contract.id,
        });

        Ok(Output {
            application,
            contract: Some(contract),
        })
    }
}

/// Error of [`DecideApplication`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Application`] is already decided.
    #[display("`Application(id: {_0})` is already decided")]
    AlreadyDecided(#[error(not(source))] application::Id),

    /// [`Application`] with the provided ID does not exist.
    #[display("`Application(id: {_0})` does not exist")]
    ApplicationNotExists(#[error(not(source))] application::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`User`] with the provided ID does not own the [`Offering`].
    #[display("`User(id: {_0})` does not own the `Offering`")]
    NotOwner(#[error(not(source))] user::Id),

    /// [`Offering`] of the [`Application`] cannot be sold anymore.
    #[display("`Offering(id: {_0})` does not exist or is deactivated")]
    OfferingNotSellable(#[error(not(source))] offering::Id),
}
