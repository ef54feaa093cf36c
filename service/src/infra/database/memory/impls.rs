//! [`Database`] implementations on top of a [`Memory`] client.

use std::collections::HashSet;

use common::operations::{
    By, Commit, Delete, Insert, Lock, Select, Transact, Update,
};
use tracerr::Traced;
use uuid::Uuid;

use crate::{
    domain::{
        application, appointment, contract, offering, session, user,
        Application, Appointment, Contract, Offering, Session, User,
    },
    infra::{
        database::{
            self,
            memory::{self, NonTx, Tx, View},
            Memory,
        },
        Database,
    },
    read,
};

impl Database<Transact> for Memory<NonTx> {
    type Ok = Memory<Tx>;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(memory::Memory(Tx::from_non_tx(&self.0)))
    }
}

impl Database<Transact> for Memory<Tx> {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(self.clone())
    }
}

impl Database<Commit> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        self.0.commit().await;
        Ok(())
    }
}

impl<C> Database<Select<By<Option<Application>, application::Id>>>
    for Memory<C>
where
    C: View,
{
    type Ok = Option<Application>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Application>, application::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        Ok(self.read(|s| s.applications.get(&id).cloned()).await)
    }
}

impl<C> Database<Select<By<Vec<Application>, offering::Id>>> for Memory<C>
where
    C: View,
{
    type Ok = Vec<Application>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Application>, offering::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let offering_id = by.into_inner();

        Ok(self
            .read(|s| {
                let mut applications = s
                    .applications
                    .values()
                    .filter(|a| a.offering_id == offering_id)
                    .cloned()
                    .collect::<Vec<_>>();
                applications.sort_unstable_by_key(|a| {
                    (a.applied_at, Uuid::from(a.id))
                });
                applications
            })
            .await)
    }
}

impl<C>
    Database<
        Select<
            By<
                Option<read::application::Pending<Application>>,
                (user::Id, offering::Id),
            >,
        >,
    > for Memory<C>
where
    C: View,
{
    type Ok = Option<read::application::Pending<Application>>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<
                Option<read::application::Pending<Application>>,
                (user::Id, offering::Id),
            >,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let (member_id, offering_id) = by.into_inner();

        Ok(self
            .read(|s| {
                s.applications
                    .values()
                    .find(|a| {
                        a.member_id == member_id
                            && a.offering_id == offering_id
                            && a.is_pending()
                    })
                    .cloned()
                    .map(read::application::Pending)
            })
            .await)
    }
}

impl<C> Database<Insert<Application>> for Memory<C>
where
    C: View,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(application): Insert<Application>,
    ) -> Result<Self::Ok, Self::Err> {
        self.write(|s| {
            // Emulates the partial unique index guarding pending
            // `Application`s.
            if application.is_pending()
                && s.applications.values().any(|a| {
                    a.id != application.id
                        && a.member_id == application.member_id
                        && a.offering_id == application.offering_id
                        && a.is_pending()
                })
            {
                return Err(tracerr::new!(database::Error::Memory(
                    memory::Error::UniqueViolation("applications_pending_idx"),
                )));
            }
            drop(s.applications.insert(application.id, application));
            Ok(())
        })
        .await
    }
}

impl<C> Database<Update<Application>> for Memory<C>
where
    C: View,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(application): Update<Application>,
    ) -> Result<Self::Ok, Self::Err> {
        self.write(|s| {
            drop(s.applications.insert(application.id, application));
        })
        .await;
        Ok(())
    }
}

// Row locks are no-ops here: the `State` mutex already serializes whole
// transactions.
impl<C> Database<Lock<By<Application, application::Id>>> for Memory<C>
where
    C: View,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Application, application::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl<C> Database<Select<By<Option<Appointment>, appointment::Id>>>
    for Memory<C>
where
    C: View,
{
    type Ok = Option<Appointment>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Appointment>, appointment::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        Ok(self.read(|s| s.appointments.get(&id).cloned()).await)
    }
}

impl<C> Database<Select<By<Vec<Appointment>, user::Id>>> for Memory<C>
where
    C: View,
{
    type Ok = Vec<Appointment>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Appointment>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let user_id = by.into_inner();

        Ok(self
            .read(|s| {
                let mut appointments = s
                    .appointments
                    .values()
                    .filter(|a| {
                        a.trainer_id == user_id || a.member_id == user_id
                    })
                    .cloned()
                    .collect::<Vec<_>>();
                appointments.sort_unstable_by_key(|a| {
                    (a.slot.starts_at(), Uuid::from(a.id))
                });
                appointments
            })
            .await)
    }
}

impl<C> Database<Select<By<Vec<Appointment>, contract::Id>>> for Memory<C>
where
    C: View,
{
    type Ok = Vec<Appointment>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Appointment>, contract::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let contract_id = by.into_inner();

        Ok(self
            .read(|s| {
                let mut appointments = s
                    .appointments
                    .values()
                    .filter(|a| a.contract_id == contract_id)
                    .cloned()
                    .collect::<Vec<_>>();
                appointments.sort_unstable_by_key(|a| {
                    (a.slot.starts_at(), Uuid::from(a.id))
                });
                appointments
            })
            .await)
    }
}

impl<C> Database<Select<By<read::appointment::ScheduledCount, contract::Id>>>
    for Memory<C>
where
    C: View,
{
    type Ok = read::appointment::ScheduledCount;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::appointment::ScheduledCount, contract::Id>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let contract_id = by.into_inner();

        Ok(self
            .read(|s| {
                i32::try_from(
                    s.appointments
                        .values()
                        .filter(|a| {
                            a.contract_id == contract_id && a.is_scheduled()
                        })
                        .count(),
                )
                .expect("fits into `i32`")
                .into()
            })
            .await)
    }
}

impl<C>
    Database<
        Select<
            By<read::appointment::HasConflict, read::appointment::Overlapping>,
        >,
    > for Memory<C>
where
    C: View,
{
    type Ok = read::appointment::HasConflict;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::appointment::HasConflict, read::appointment::Overlapping>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::appointment::Overlapping { user_id, slot, except } =
            by.into_inner();

        Ok(self
            .read(|s| {
                read::appointment::HasConflict(s.appointments.values().any(
                    |a| {
                        (a.trainer_id == user_id || a.member_id == user_id)
                            && a.is_scheduled()
                            && a.slot.overlaps(&slot)
                            && except != Some(a.id)
                    },
                ))
            })
            .await)
    }
}

impl<C> Database<Insert<Appointment>> for Memory<C>
where
    C: View,
    Self: Database<Update<Appointment>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(appointment): Insert<Appointment>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(appointment))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Appointment>> for Memory<C>
where
    C: View,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(appointment): Update<Appointment>,
    ) -> Result<Self::Ok, Self::Err> {
        self.write(|s| {
            drop(s.appointments.insert(appointment.id, appointment));
        })
        .await;
        Ok(())
    }
}

impl<C> Database<Lock<By<Appointment, appointment::Id>>> for Memory<C>
where
    C: View,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Appointment, appointment::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl<C> Database<Lock<By<read::appointment::Calendar, user::Id>>>
    for Memory<C>
where
    C: View,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<read::appointment::Calendar, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl<C> Database<Select<By<Option<Contract>, contract::Id>>> for Memory<C>
where
    C: View,
{
    type Ok = Option<Contract>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Contract>, contract::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        Ok(self.read(|s| s.contracts.get(&id).cloned()).await)
    }
}

impl<C> Database<Select<By<Vec<Contract>, user::Id>>> for Memory<C>
where
    C: View,
{
    type Ok = Vec<Contract>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Contract>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let user_id = by.into_inner();

        Ok(self
            .read(|s| {
                let mut contracts = s
                    .contracts
                    .values()
                    .filter(|c| {
                        c.member_id == user_id || c.trainer_id == user_id
                    })
                    .cloned()
                    .collect::<Vec<_>>();
                contracts.sort_unstable_by_key(|c| {
                    (c.created_at, Uuid::from(c.id))
                });
                contracts
            })
            .await)
    }
}

impl<C> Database<Insert<Contract>> for Memory<C>
where
    C: View,
    Self: Database<Update<Contract>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(contract): Insert<Contract>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(contract)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Contract>> for Memory<C>
where
    C: View,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(contract): Update<Contract>,
    ) -> Result<Self::Ok, Self::Err> {
        self.write(|s| {
            drop(s.contracts.insert(contract.id, contract));
        })
        .await;
        Ok(())
    }
}

impl<C> Database<Lock<By<Contract, contract::Id>>> for Memory<C>
where
    C: View,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Contract, contract::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl<C> Database<Select<By<Option<Offering>, offering::Id>>> for Memory<C>
where
    C: View,
{
    type Ok = Option<Offering>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Offering>, offering::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        Ok(self.read(|s| s.offerings.get(&id).cloned()).await)
    }
}

impl<C> Database<Select<By<Vec<Offering>, user::Id>>> for Memory<C>
where
    C: View,
{
    type Ok = Vec<Offering>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Offering>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let trainer_id = by.into_inner();

        Ok(self
            .read(|s| {
                let mut offerings = s
                    .offerings
                    .values()
                    .filter(|o| o.trainer_id == trainer_id)
                    .cloned()
                    .collect::<Vec<_>>();
                offerings.sort_unstable_by_key(|o| {
                    (o.created_at, Uuid::from(o.id))
                });
                offerings
            })
            .await)
    }
}

impl<C> Database<Insert<Offering>> for Memory<C>
where
    C: View,
    Self: Database<Update<Offering>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(offering): Insert<Offering>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(offering)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Offering>> for Memory<C>
where
    C: View,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(offering): Update<Offering>,
    ) -> Result<Self::Ok, Self::Err> {
        self.write(|s| {
            drop(s.offerings.insert(offering.id, offering));
        })
        .await;
        Ok(())
    }
}

impl<C> Database<Lock<By<Offering, offering::Id>>> for Memory<C>
where
    C: View,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Offering, offering::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl<C> Database<Delete<By<Offering, offering::DeactivationDateTime>>>
    for Memory<C>
where
    C: View,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Offering, offering::DeactivationDateTime>>,
    ) -> Result<Self::Ok, Self::Err> {
        let deadline = by.into_inner();

        self.write(|s| {
            let applied = s
                .applications
                .values()
                .map(|a| a.offering_id)
                .collect::<HashSet<_>>();
            s.offerings.retain(|id, o| {
                applied.contains(id)
                    || o.deactivated_at.map_or(true, |at| at >= deadline)
            });
        })
        .await;
        Ok(())
    }
}

impl<C> Database<Select<By<Option<Session>, appointment::Id>>> for Memory<C>
where
    C: View,
{
    type Ok = Option<Session>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Session>, appointment::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let appointment_id = by.into_inner();

        Ok(self
            .read(|s| {
                s.sessions
                    .values()
                    .find(|x| x.appointment_id == appointment_id)
                    .cloned()
            })
            .await)
    }
}

impl<C> Database<Select<By<Option<Session>, session::WorkoutLogId>>>
    for Memory<C>
where
    C: View,
{
    type Ok = Option<Session>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Session>, session::WorkoutLogId>>,
    ) -> Result<Self::Ok, Self::Err> {
        let workout_log_id = by.into_inner();

        Ok(self
            .read(|s| {
                s.sessions
                    .values()
                    .find(|x| x.workout_log_id == workout_log_id)
                    .cloned()
            })
            .await)
    }
}

impl<C> Database<Insert<Session>> for Memory<C>
where
    C: View,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(session): Insert<Session>,
    ) -> Result<Self::Ok, Self::Err> {
        self.write(|s| {
            if s.sessions
                .values()
                .any(|x| x.appointment_id == session.appointment_id)
            {
                return Err(tracerr::new!(database::Error::Memory(
                    memory::Error::UniqueViolation(
                        "sessions_appointment_id_idx",
                    ),
                )));
            }
            if s.sessions
                .values()
                .any(|x| x.workout_log_id == session.workout_log_id)
            {
                return Err(tracerr::new!(database::Error::Memory(
                    memory::Error::UniqueViolation(
                        "sessions_workout_log_id_idx",
                    ),
                )));
            }
            drop(s.sessions.insert(session.id, session));
            Ok(())
        })
        .await
    }
}

impl<C> Database<Select<By<Option<User>, user::Id>>> for Memory<C>
where
    C: View,
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        Ok(self.read(|s| s.users.get(&id).cloned()).await)
    }
}

impl<C> Database<Insert<User>> for Memory<C>
where
    C: View,
    Self: Database<Update<User>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(user): Insert<User>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(user)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<User>> for Memory<C>
where
    C: View,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(user): Update<User>,
    ) -> Result<Self::Ok, Self::Err> {
        self.write(|s| {
            drop(s.users.insert(user.id, user));
        })
        .await;
        Ok(())
    }
}
