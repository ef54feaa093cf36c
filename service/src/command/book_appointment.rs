//! [`Command`] for booking a new [`Appointment`].

use common::{
    operations::{By, Commit, Insert, Lock, Select, Transact, Transacted},
    DateTime, TimeSlot,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::User;
use crate::{
    domain::{appointment, contract, user, Appointment, Contract},
    infra::{database, Database},
    read::appointment::{Calendar, HasConflict, Overlapping, ScheduledCount},
    Event, Service,
};

use super::Command;

/// [`Command`] for booking a new [`Appointment`] under a [`Contract`].
///
/// Booking is admitted only while the [`Contract`] can still deliver it: the
/// number of scheduled [`Appointment`]s never exceeds the remaining session
/// balance.
#[derive(Clone, Copy, Debug)]
pub struct BookAppointment {
    /// ID of the [`Contract`] to book the [`Appointment`] under.
    pub contract_id: contract::Id,

    /// ID of the trainer [`User`] delivering the [`Appointment`].
    pub trainer_id: user::Id,

    /// ID of the member [`User`] attending the [`Appointment`].
    pub member_id: user::Id,

    /// [`DateTime`] when the [`Appointment`] starts.
    pub starts_at: DateTime,

    /// [`DateTime`] when the [`Appointment`] ends (exclusive).
    pub ends_at: DateTime,
}

impl BookAppointment {
    /// Number of attempts to book before giving up on transient [`Database`]
    /// failures.
    const MAX_ATTEMPTS: u32 = 3;
}

impl<Db> Command<BookAppointment> for Service<Db>
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
            Lock<By<Calendar, user::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Contract>, contract::Id>>,
            Ok = Option<Contract>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<ScheduledCount, contract::Id>>,
            Ok = ScheduledCount,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<HasConflict, Overlapping>>,
            Ok = HasConflict,
            Err = Traced<database::Error>,
        > + Database<Insert<Appointment>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Appointment;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: BookAppointment,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let BookAppointment {
            contract_id,
            trainer_id,
            member_id,
            starts_at,
            ends_at,
        } = cmd;

        let contract = self
            .database()
            .execute(Select(By::<Option<Contract>, _>::new(contract_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ContractNotExists(contract_id))
            .map_err(tracerr::wrap!())?;
        if contract.trainer_id != trainer_id {
            return Err(tracerr::new!(E::NotParty(trainer_id)));
        }
        if contract.member_id != member_id {
            return Err(tracerr::new!(E::NotParty(member_id)));
        }

        // Transient lock failures are retried a few times before giving up.
        let mut attempt = 1;
        loop {
            let res: Result<Self::Ok, Self::Err> = async {
                let tx = self
                    .database()
                    .execute(Transact)
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;

                // Admission control happens under the `Contract` lock.
                tx.execute(Lock(By::<Contract, _>::new(contract_id)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))
                    .map(drop)?;

                let contract = tx
                    .execute(Select(By::<Option<Contract>, _>::new(
                        contract_id,
                    )))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .ok_or(E::ContractNotExists(contract_id))
                    .map_err(tracerr::wrap!())?;
                if !contract.is_active() {
                    return Err(tracerr::new!(E::NoSessionsRemaining(
                        contract_id
                    )));
                }

                let scheduled = tx
                    .execute(Select(By::<ScheduledCount, _>::new(
                        contract_id,
                    )))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;
                if i32::from(scheduled)
                    >= i32::from(contract.remaining_sessions)
                {
                    return Err(tracerr::new!(E::NoSessionsRemaining(
                        contract_id
                    )));
                }

                let slot = TimeSlot::new(starts_at, ends_at)
                    .ok_or(E::InvalidInterval)
                    .map_err(tracerr::wrap!())?;

                // Serialize concurrent bookings touching the same calendars.
                tx.execute(Lock(By::<Calendar, _>::new(trainer_id)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))
                    .map(drop)?;
                tx.execute(Lock(By::<Calendar, _>::new(member_id)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))
                    .map(drop)?;

                for user_id in [trainer_id, member_id] {
                    let conflict = tx
                        .execute(Select(By::<HasConflict, _>::new(
                            Overlapping {
                                user_id,
                                slot,
                                except: None,
                            },
                        )))
                        .await
                        .map_err(tracerr::map_from_and_wrap!(=> E))?;
                    if *conflict {
                        return Err(tracerr::new!(E::SlotConflict(user_id)));
                    }
                }

                let appointment = Appointment {
                    id: appointment::Id::new(),
                    contract_id,
                    trainer_id,
                    member_id,
                    slot,
                    booked_at: DateTime::now().coerce(),
                    completed_at: None,
                    cancelled_at: None,
                    no_show_at: None,
                };

                tx.execute(Insert(appointment.clone()))
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
                    self.publish(Event::AppointmentBooked {
                        appointment_id: appointment.id,
                        contract_id,
                    });

                    return Ok(appointment);
                }
                Err(e)
                    if attempt < BookAppointment::MAX_ATTEMPTS
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

/// Error of [`BookAppointment`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Contract`] with the provided ID does not exist.
    #[display("`Contract(id: {_0})` does not exist")]
    ContractNotExists(#[error(not(source))] contract::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Provided interval ends not strictly after it starts.
    #[display("`Appointment` interval must end after it starts")]
    InvalidInterval,

    /// [`Contract`] cannot admit another [`Appointment`].
    #[display("`Contract(id: {_0})` has no deliverable sessions remaining")]
    NoSessionsRemaining(#[error(not(source))] contract::Id),

    /// [`User`] with the provided ID is not a party of the [`Contract`].
    #[display("`User(id: {_0})` is not a party of the `Contract`")]
    NotParty(#[error(not(source))] user::Id),

    /// [`User`] already has a scheduled [`Appointment`] overlapping the slot.
    #[display("`User(id: {_0})` has a conflicting `Appointment`")]
    SlotConflict(#[error(not(source))] user::Id),
}
