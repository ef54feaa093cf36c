//! [`Command`] for rescheduling an [`Appointment`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime, TimeSlot,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::User;
use crate::{
    domain::{appointment, contract, user, Appointment, Contract},
    infra::{database, Database},
    read::appointment::{Calendar, HasConflict, Overlapping},
    Event, Service,
};

use super::Command;

/// [`Command`] for moving a scheduled [`Appointment`] to another time slot.
///
/// The conflict check excludes the [`Appointment`] being moved, so it never
/// conflicts with itself.
#[derive(Clone, Copy, Debug)]
pub struct RescheduleAppointment {
    /// ID of the [`Appointment`] to be rescheduled.
    pub appointment_id: appointment::Id,

    /// New [`DateTime`] when the [`Appointment`] starts.
    pub starts_at: DateTime,

    /// New [`DateTime`] when the [`Appointment`] ends (exclusive).
    pub ends_at: DateTime,
}

impl RescheduleAppointment {
    /// Number of attempts to reschedule before giving up on transient
    /// [`Database`] failures.
    const MAX_ATTEMPTS: u32 = 3;
}

impl<Db> Command<RescheduleAppointment> for Service<Db>
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
            Lock<By<Calendar, user::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Appointment>, appointment::Id>>,
            Ok = Option<Appointment>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<HasConflict, Overlapping>>,
            Ok = HasConflict,
            Err = Traced<database::Error>,
        > + Database<Update<Appointment>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Appointment;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: RescheduleAppointment,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RescheduleAppointment {
            appointment_id,
            starts_at,
            ends_at,
        } = cmd;

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
        let contract_id = appointment.contract_id;

        // Transient lock failures are retried a few times before giving up.
        let mut attempt = 1;
        loop {
            let res: Result<Self::Ok, Self::Err> = async {
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
                if !appointment.is_scheduled() {
                    return Err(tracerr::new!(E::NotScheduled(
                        appointment_id
                    )));
                }

                let slot = TimeSlot::new(starts_at, ends_at)
                    .ok_or(E::InvalidInterval)
                    .map_err(tracerr::wrap!())?;

                // Serialize concurrent bookings touching the same calendars.
                tx.execute(Lock(By::<Calendar, _>::new(
                    appointment.trainer_id,
                )))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
                tx.execute(Lock(By::<Calendar, _>::new(
                    appointment.member_id,
                )))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;

                for user_id in [appointment.trainer_id, appointment.member_id]
                {
                    let conflict = tx
                        .execute(Select(By::<HasConflict, _>::new(
                            Overlapping {
                                user_id,
                                slot,
                                except: Some(appointment_id),
                            },
                        )))
                        .await
                        .map_err(tracerr::map_from_and_wrap!(=> E))?;
                    if *conflict {
                        return Err(tracerr::new!(E::SlotConflict(user_id)));
                    }
                }

                appointment.slot = slot;
                tx.execute(Update(appointment.clone()))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))
                    .map(drop)?;
                tx.execute(Commit)
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))
                    .map(drop)?;

                Ok(appointment)
            }
            .await;

            match res {
                Ok(appointment) => {
                    self.publish(Event::AppointmentRescheduled {
                        appointment_id,
                    });

                    return Ok(appointment);
                }
                Err(e)
                    if attempt < RescheduleAppointment::MAX_ATTEMPTS
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

/// Error of [`RescheduleAppointment`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Appointment`] with the provided ID does not exist.
    #[display("`Appointment(id: {_0})` does not exist")]
    AppointmentNotExists(#[error(not(source))] appointment::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Provided interval ends not strictly after it starts.
    #[display("`Appointment` interval must end after it starts")]
    InvalidInterval,

    /// [`Appointment`] is not scheduled anymore.
    #[display("`Appointment(id: {_0})` is not scheduled")]
    NotScheduled(#[error(not(source))] appointment::Id),

    /// [`User`] already has a scheduled [`Appointment`] overlapping the slot.
    #[display("`User(id: {_0})` has a conflicting `Appointment`")]
    SlotConflict(#[error(not(source))] user::Id),
}
