//! [`Command`] for completing an [`Appointment`] with a recorded
//! [`Session`].

use common::{
    operations::{
        By, Commit, Insert, Lock, Select, Transact, Transacted, Update,
    },
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{appointment, contract, session, Appointment, Contract, Session},
    infra::{database, Database},
    Event, Service,
};

use super::Command;

/// [`Command`] for completing a scheduled [`Appointment`].
///
/// Completion records a [`Session`] referencing the provided workout log,
/// and consumes one session from the [`Contract`] balance, all in a single
/// transaction.
#[derive(Clone, Copy, Debug)]
pub struct CompleteAppointment {
    /// ID of the [`Appointment`] to be completed.
    pub appointment_id: appointment::Id,

    /// ID of the workout log capturing what was performed.
    pub workout_log_id: session::WorkoutLogId,
}

impl CompleteAppointment {
    /// Number of attempts to complete before giving up on transient
    /// [`Database`] failures.
    const MAX_ATTEMPTS: u32 = 3;
}

impl<Db> Command<CompleteAppointment> for Service<Db>
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
        > + Database<
            Select<By<Option<Session>, appointment::Id>>,
            Ok = Option<Session>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Session>, session::WorkoutLogId>>,
            Ok = Option<Session>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Contract>, contract::Id>>,
            Ok = Option<Contract>,
            Err = Traced<database::Error>,
        > + Database<Update<Appointment>, Err = Traced<database::Error>>
        + Database<Update<Contract>, Err = Traced<database::Error>>
        + Database<Insert<Session>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Session;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CompleteAppointment,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CompleteAppointment {
            appointment_id,
            workout_log_id,
        } = cmd;

        let appointment = self
            .database()
            .execute(Select(By::<Option<Appointment>, _>::new(appointment_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::AppointmentNotExists(appointment_id))
            .map_err(tracerr::wrap!())?;
        let contract_id = appointment.contract_id;

        // Transient lock failures are retried a few times before giving up.
        let mut attempt = 1;
        loop {
            let res: Result<(Session, Contract), Self::Err> = async {
                let tx = self
                    .database()
                    .execute(Transact)
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;

                // Appointment mutations take the `Contract` lock first.
                tx.execute(Lock(By::<Contract, _>::new(contract_id)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))
                    .map(drop)?;
                tx.execute(Lock(By::<Appointment, _>::new(appointment_id)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))
                    .map(drop)?;

                let mut appointment = tx
                    .execute(Select(By::<Option<Appointment>, _>::new(
                        appointment_id,
                    )))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .ok_or(E::AppointmentNotExists(appointment_id))
                    .map_err(tracerr::wrap!())?;

                // Checked before the status, so a repeated completion
                // reports the duplicate `Session`.
                let recorded = tx
                    .execute(Select(By::<Option<Session>, _>::new(
                        appointment_id,
                    )))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;
                if recorded.is_some() {
                    return Err(tracerr::new!(E::SessionAlreadyRecorded(
                        appointment_id
                    )));
                }
                let linked = tx
                    .execute(Select(By::<Option<Session>, _>::new(
                        workout_log_id,
                    )))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;
                if linked.is_some() {
                    return Err(tracerr::new!(E::WorkoutLogAlreadyLinked(
                        workout_log_id
                    )));
                }
                if !appointment.is_scheduled() {
                    return Err(tracerr::new!(E::NotScheduled(
                        appointment_id
                    )));
                }

                let mut contract = tx
                    .execute(Select(By::<Option<Contract>, _>::new(
                        contract_id,
                    )))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .ok_or(E::NoSessionsRemaining(contract_id))
                    .map_err(tracerr::wrap!())?;
                contract.consume_session().map_err(|_| {
                    tracerr::new!(E::NoSessionsRemaining(contract_id))
                })?;

                appointment.completed_at = Some(DateTime::now().coerce());
                let session = Session {
                    id: session::Id::new(),
                    appointment_id,
                    workout_log_id,
                    created_at: DateTime::now().coerce(),
                };

                tx.execute(Update(appointment))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))
                    .map(drop)?;
                tx.execute(Update(contract.clone()))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))
                    .map(drop)?;
                tx.execute(Insert(session.clone()))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))
                    .map(drop)?;
                tx.execute(Commit)
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))
                    .map(drop)?;

                Ok((session, contract))
            }
            .await;

            match res {
                Ok((session, contract)) => {
                    self.publish(Event::SessionRecorded {
                        session_id: session.id,
                        appointment_id,
                        contract_id,
                    });
                    if contract.completed_at.is_some() {
                        self.publish(Event::ContractCompleted { contract_id });
                    }

                    return Ok(session);
                }
                Err(e)
                    if attempt < CompleteAppointment::MAX_ATTEMPTS
                        && matches!(
                            e.as_ref(),
                            E::Db(e) if e.is_transient(),
                        ) =>
                {
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Error of [`CompleteAppointment`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Appointment`] with the provided ID does not exist.
    #[display("`Appointment(id: {_0})` does not exist")]
    AppointmentNotExists(#[error(not(source))] appointment::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Contract`] has no deliverable sessions remaining.
    #[display("`Contract(id: {_0})` has no deliverable sessions remaining")]
    NoSessionsRemaining(#[error(not(source))] contract::Id),

    /// [`Appointment`] is not scheduled anymore.
    #[display("`Appointment(id: {_0})` is not scheduled")]
    NotScheduled(#[error(not(source))] appointment::Id),

    /// [`Appointment`] has a [`Session`] recorded already.
    #[display("`Appointment(id: {_0})` has a `Session` recorded already")]
    SessionAlreadyRecorded(#[error(not(source))] appointment::Id),

    /// Workout log is linked to another [`Session`] already.
    #[display("`WorkoutLog(id: {_0})` is linked to a `Session` already")]
    WorkoutLogAlreadyLinked(#[error(not(source))] session::WorkoutLogId),
}
