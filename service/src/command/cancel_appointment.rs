//! [`Command`] for cancelling an [`Appointment`].

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

/// [`Command`] for cancelling a scheduled [`Appointment`].
///
/// Cancelling frees the occupied time slot and leaves the [`Contract`]
/// balance untouched.
#[derive(Clone, Copy, Debug)]
pub struct CancelAppointment {
    /// ID of the [`Appointment`] to be cancelled.
    pub appointment_id: appointment::Id,

    /// ID of the [`User`] cancelling the [`Appointment`].
    pub actor_id: user::Id,
}

impl<Db> Command<CancelAppointment> for Service<Db>
where
    Db: Database<
            Select<By<Option<Appointment>, appointment::Id>>,
            Ok = Option<Appointment>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Contract, contract::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<Appointment, appointment::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Appointment>, appointment::Id>>,
            Ok = Option<Appointment>,
            Err = Traced<database::Error>,
        > + Database<Update<Appointment>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Appointment;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CancelAppointment,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CancelAppointment {
            appointment_id,
            actor_id,
        } = cmd;

        let appointment = self
            .database()
            .execute(Select(By::<Option<Appointment>, _>::new(appointment_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::AppointmentNotExists(appointment_id))
            .map_err(tracerr::wrap!())?;
        if !appointment.is_party(actor_id) {
            return Err(tracerr::new!(E::NotParty(actor_id)));
        }
        if !appointment.is_scheduled() {
            return Err(tracerr::new!(E::NotScheduled(appointment_id)));
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Appointment mutations take the `Contract` lock first.
        tx.execute(Lock(By::<Contract, _>::new(appointment.contract_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Lock(By::<Appointment, _>::new(appointment_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut appointment = tx
            .execute(Select(By::<Option<Appointment>, _>::new(appointment_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::AppointmentNotExists(appointment_id))
            .map_err(tracerr::wrap!())?;
        if !appointment.is_scheduled() {
            return Err(tracerr::new!(E::NotScheduled(appointment_id)));
        }

        appointment.cancelled_at = Some(DateTime::now().coerce());
        tx.execute(Update(appointment.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        self.publish(Event::AppointmentCancelled { appointment_id });

        Ok(appointment)
    }
}

/// Error of [`CancelAppointment`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Appointment`] with the provided ID does not exist.
    #[display("`Appointment(id: {_0})` does not exist")]
    AppointmentNotExists(#[error(not(source))] appointment::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`User`] with the provided ID is not a party of the [`Appointment`].
    #[display("`User(id: {_0})` is not a party of the `Appointment`")]
    NotParty(#[error(not(source))] user::Id),

    /// [`Appointment`] is not scheduled anymore.
    #[display("`Appointment(id: {_0})` is not scheduled")]
    NotScheduled(#[error(not(source))] appointment::Id),
}
