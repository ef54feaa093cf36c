//! [`Command`] for marking an [`Appointment`] as a no-show.

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{appointment, contract, Appointment, Contract},
    infra::{database, Database},
    Event, Service,
};

use super::Command;

/// [`Command`] for marking a scheduled [`Appointment`] as a no-show.
///
/// A no-show frees the occupied time slot once it has elapsed, and leaves
/// the [`Contract`] balance untouched.
#[derive(Clone, Copy, Debug)]
pub struct MarkAppointmentNoShow {
    /// ID of the [`Appointment`] to be marked.
    pub appointment_id: appointment::Id,
}

impl<Db> Command<MarkAppointmentNoShow> for Service<Db>
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
        cmd: MarkAppointmentNoShow,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let MarkAppointmentNoShow { appointment_id } = cmd;

        let appointment = self
            .database()
            .execute(Select(By::<Option<Appointment>, _>::new(appointment_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::AppointmentNotExists(appointment_id))
            .map_err(tracerr::wrap!())?;
        if !appointment.is_scheduled() {
            return Err(tracerr::new!(E::NotScheduled(appointment_id)));
        }
        if DateTime::now().coerce() < appointment.slot.ends_at() {
            return Err(tracerr::new!(E::NotElapsed(appointment_id)));
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

        appointment.no_show_at = Some(DateTime::now().coerce());
        tx.execute(Update(appointment.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        self.publish(Event::AppointmentNoShow { appointment_id });

        Ok(appointment)
    }
}

/// Error of [`MarkAppointmentNoShow`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Appointment`] with the provided ID does not exist.
    #[display("`Appointment(id: {_0})` does not exist")]
    AppointmentNotExists(#[error(not(source))] appointment::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Time slot of the [`Appointment`] has not elapsed yet.
    #[display("`Appointment(id: {_0})` slot has not elapsed yet")]
    NotElapsed(#[error(not(source))] appointment::Id),

    /// [`Appointment`] is not scheduled anymore.
    #[display("`Appointment(id: {_0})` is not scheduled")]
    NotScheduled(#[error(not(source))] appointment::Id),
}
