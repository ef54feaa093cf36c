//! [`Command`] for cancelling a [`Contract`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::User;
use crate::{
    domain::{appointment, contract, user, Appointment, Contract},
    infra::{database, Database},
    Event, Service,
};

use super::Command;

/// [`Command`] for cancelling a [`Contract`].
///
/// All the scheduled [`Appointment`]s under the [`Contract`] are cancelled in
/// the same transaction. Consumed sessions are not reversed, and the remaining
/// balance is left untouched.
#[derive(Clone, Copy, Debug)]
pub struct CancelContract {
    /// ID of the [`Contract`] to be cancelled.
    pub contract_id: contract::Id,

    /// ID of the [`User`] cancelling the [`Contract`].
    pub actor_id: user::Id,
}

impl<Db> Command<CancelContract> for Service<Db>
where
    Db: Database<
            Select<By<Option<Contract>, contract::Id>>,
            Ok = Option<Contract>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Contract, contract::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Contract>, contract::Id>>,
            Ok = Option<Contract>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Appointment>, contract::Id>>,
            Ok = Vec<Appointment>,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<Appointment, appointment::Id>>,
            Err = Traced<database::Error>,
        > + Database<Update<Contract>, Err = Traced<database::Error>>
        + Database<Update<Appointment>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Contract;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CancelContract,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CancelContract {
            contract_id,
            actor_id,
        } = cmd;

        let contract = self
            .database()
            .execute(Select(By::<Option<Contract>, _>::new(contract_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ContractNotExists(contract_id))
            .map_err(tracerr::wrap!())?;
        if !contract.is_party(actor_id) {
            return Err(tracerr::new!(E::NotParty(actor_id)));
        }
        if !contract.is_active() {
            return Err(tracerr::new!(E::NotActive(contract_id)));
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `Contract`.
        tx.execute(Lock(By::new(contract_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut contract = tx
            .execute(Select(By::<Option<Contract>, _>::new(contract_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ContractNotExists(contract_id))
            .map_err(tracerr::wrap!())?;
        if !contract.is_active() {
            return Err(tracerr::new!(E::NotActive(contract_id)));
        }

        contract.cancelled_at = Some(DateTime::now().coerce());
        tx.execute(Update(contract.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let appointments = tx
            .execute(Select(By::<Vec<Appointment>, _>::new(contract_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut cancelled_appointments = Vec::new();
        for mut appointment in
            appointments.into_iter().filter(Appointment::is_scheduled)
        {
            tx.execute(Lock(By::<Appointment, _>::new(appointment.id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;

            appointment.cancelled_at = Some(DateTime::now().coerce());
            tx.execute(Update(appointment.clone()))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;

            cancelled_appointments.push(appointment.id);
        }

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        self.publish(Event::ContractCancelled { contract_id });
        for appointment_id in cancelled_appointments {
            self.publish(Event::AppointmentCancelled { appointment_id });
        }

        Ok(contract)
    }
}

/// Error of [`CancelContract`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Contract`] with the provided ID does not exist.
    #[display("`Contract(id: {_0})` does not exist")]
    ContractNotExists(#[error(not(source))] contract::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Contract`] is not active.
    #[display("`Contract(id: {_0})` is not active")]
    NotActive(#[error(not(source))] contract::Id),

    /// [`User`] with the provided ID is not a party of the [`Contract`].
    #[display("`User(id: {_0})` is not a party of the `Contract`")]
    NotParty(#[error(not(source))] user::Id),
}
