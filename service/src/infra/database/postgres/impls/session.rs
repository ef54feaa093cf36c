//! [`Session`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select};
use tracerr::Traced;

use crate::{
    domain::{appointment, session, Session},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

impl<C> Database<Select<By<Option<Session>, appointment::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Session>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Session>, appointment::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let appointment_id: appointment::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, appointment_id, workout_log_id, created_at \
            FROM sessions \
            WHERE appointment_id = $1::UUID \
            LIMIT 1";
        Ok(self
            .query_opt(SQL, &[&appointment_id])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| Session {
                id: row.get("id"),
                appointment_id: row.get("appointment_id"),
                workout_log_id: row.get("workout_log_id"),
                created_at: row.get("created_at"),
            }))
    }
}

impl<C> Database<Select<By<Option<Session>, session::WorkoutLogId>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Session>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Session>, session::WorkoutLogId>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let workout_log_id: session::WorkoutLogId = by.into_inner();

        const SQL: &str = "\
            SELECT id, appointment_id, workout_log_id, created_at \
            FROM sessions \
            WHERE workout_log_id = $1::UUID \
            LIMIT 1";
        Ok(self
            .query_opt(SQL, &[&workout_log_id])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| Session {
                id: row.get("id"),
                appointment_id: row.get("appointment_id"),
                workout_log_id: row.get("workout_log_id"),
                created_at: row.get("created_at"),
            }))
    }
}

impl<C> Database<Insert<Session>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(session): Insert<Session>,
    ) -> Result<Self::Ok, Self::Err> {
        let Session {
            id,
            appointment_id,
            workout_log_id,
            created_at,
        } = session;

        // A `Session` is immutable, so no upsert here.
        const SQL: &str = "\
            INSERT INTO sessions (\
                id, appointment_id, workout_log_id, created_at\
            ) \
            VALUES (\
                $1::UUID, $2::UUID, $3::UUID, $4::TIMESTAMPTZ\
            )";
        self.exec(SQL, &[&id, &appointment_id, &workout_log_id, &created_at])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
