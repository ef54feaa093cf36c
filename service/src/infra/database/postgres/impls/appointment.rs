//! [`Appointment`]-related [`Database`] implementations.

use common::{
    operations::{By, Insert, Lock, Select, Update},
    TimeSlot,
};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{appointment, contract, user, Appointment},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

/// Constructs an [`Appointment`] from the provided [`Row`].
fn from_row(row: &Row) -> Appointment {
    Appointment {
        id: row.get("id"),
        contract_id: row.get("contract_id"),
        trainer_id: row.get("trainer_id"),
        member_id: row.get("member_id"),
        slot: TimeSlot::new(row.get("starts_at"), row.get("ends_at"))
            .expect("`ends_at` is after `starts_at`"),
        booked_at: row.get("booked_at"),
        completed_at: row.get("completed_at"),
        cancelled_at: row.get("cancelled_at"),
        no_show_at: row.get("no_show_at"),
    }
}

impl<C> Database<Select<By<Option<Appointment>, appointment::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Appointment>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Appointment>, appointment::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: appointment::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, contract_id, trainer_id, member_id, \
                   starts_at, ends_at, booked_at, \
                   completed_at, cancelled_at, no_show_at \
            FROM appointments \
            WHERE id = $1::UUID \
            LIMIT 1";
        Ok(self
            .query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| from_row(&row)))
    }
}

impl<C> Database<Select<By<Vec<Appointment>, user::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Appointment>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Appointment>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let user_id: user::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, contract_id, trainer_id, member_id, \
                   starts_at, ends_at, booked_at, \
                   completed_at, cancelled_at, no_show_at \
            FROM appointments \
            WHERE trainer_id = $1::UUID \
               OR member_id = $1::UUID \
            ORDER BY starts_at, id";
        Ok(self
            .query(SQL, &[&user_id])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Select<By<Vec<Appointment>, contract::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Appointment>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Appointment>, contract::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let contract_id: contract::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, contract_id, trainer_id, member_id, \
                   starts_at, ends_at, booked_at, \
                   completed_at, cancelled_at, no_show_at \
            FROM appointments \
            WHERE contract_id = $1::UUID \
            ORDER BY starts_at, id";
        Ok(self
            .query(SQL, &[&contract_id])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Insert<Appointment>> for Postgres<C>
where
    C: Connection,
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

impl<C> Database<Update<Appointment>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(appointment): Update<Appointment>,
    ) -> Result<Self::Ok, Self::Err> {
        let Appointment {
            id,
            contract_id,
            trainer_id,
            member_id,
            slot,
            booked_at,
            completed_at,
            cancelled_at,
            no_show_at,
        } = appointment;

        let starts_at = slot.starts_at();
        let ends_at = slot.ends_at();

        const SQL: &str = "\
            INSERT INTO appointments (\
                id, contract_id, trainer_id, member_id, \
                starts_at, ends_at, booked_at, \
                completed_at, cancelled_at, no_show_at\
            ) \
            VALUES (\
                $1::UUID, $2::UUID, $3::UUID, $4::UUID, \
                $5::TIMESTAMPTZ, $6::TIMESTAMPTZ, $7::TIMESTAMPTZ, \
                $8::TIMESTAMPTZ, $9::TIMESTAMPTZ, $10::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET contract_id = EXCLUDED.contract_id, \
                trainer_id = EXCLUDED.trainer_id, \
                member_id = EXCLUDED.member_id, \
                starts_at = EXCLUDED.starts_at, \
                ends_at = EXCLUDED.ends_at, \
                booked_at = EXCLUDED.booked_at, \
                completed_at = EXCLUDED.completed_at, \
                cancelled_at = EXCLUDED.cancelled_at, \
                no_show_at = EXCLUDED.no_show_at";
        self.exec(
            SQL,
            &[
                &id,
                &contract_id,
                &trainer_id,
                &member_id,
                &starts_at,
                &ends_at,
                &booked_at,
                &completed_at,
                &cancelled_at,
                &no_show_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Lock<By<Appointment, appointment::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Appointment, appointment::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: appointment::Id = by.into_inner();

        // `DO UPDATE` takes the row lock even when the row already
        // exists, so concurrent lockers of the same key serialize until
        // the transaction ends.
        const SQL: &str = "\
            INSERT INTO appointments_lock \
            VALUES ($1::UUID) \
            ON CONFLICT (id) DO UPDATE SET id = EXCLUDED.id";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Lock<By<read::appointment::Calendar, user::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<read::appointment::Calendar, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let user_id: user::Id = by.into_inner();

        // `DO UPDATE` takes the row lock even when the row already
        // exists, so concurrent lockers of the same key serialize until
        // the transaction ends.
        const SQL: &str = "\
            INSERT INTO calendars_lock \
            VALUES ($1::UUID) \
            ON CONFLICT (id) DO UPDATE SET id = EXCLUDED.id";
        self.query(SQL, &[&user_id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Select<By<read::appointment::ScheduledCount, contract::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = read::appointment::ScheduledCount;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<read::appointment::ScheduledCount, contract::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let contract_id: contract::Id = by.into_inner();

        const SQL: &str = "\
            SELECT COUNT(*)::INT4 \
            FROM appointments \
            WHERE contract_id = $1::UUID \
              AND completed_at IS NULL \
              AND cancelled_at IS NULL \
              AND no_show_at IS NULL";
        self.query_opt(SQL, &[&contract_id])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.expect("always exists").get::<_, i32>(0).into())
    }
}

impl<C>
    Database<
        Select<
            By<read::appointment::HasConflict, read::appointment::Overlapping>,
        >,
    > for Postgres<C>
where
    C: Connection,
{
    type Ok = read::appointment::HasConflict;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::appointment::HasConflict, read::appointment::Overlapping>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::appointment::Overlapping {
            user_id,
            slot,
            except,
        } = by.into_inner();

        let starts_at = slot.starts_at();
        let ends_at = slot.ends_at();

        const SQL: &str = "\
            SELECT id \
            FROM appointments \
            WHERE (trainer_id = $1::UUID \
                   OR member_id = $1::UUID) \
              AND completed_at IS NULL \
              AND cancelled_at IS NULL \
              AND no_show_at IS NULL \
              AND starts_at < $3::TIMESTAMPTZ \
              AND ends_at > $2::TIMESTAMPTZ \
              AND ($4::UUID IS NULL \
                   OR id != $4::UUID) \
            LIMIT 1";
        self.query_opt(SQL, &[&user_id, &starts_at, &ends_at, &except])
            .await
            .map_err(tracerr::wrap!())
            .map(|r| read::appointment::HasConflict(r.is_some()))
    }
}
