//! [`Contract`]-related [`Database`] implementations.

use common::operations::{By, Insert, Lock, Select, Update};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{contract, user, Contract},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

/// Constructs a [`Contract`] from the provided [`Row`].
fn from_row(row: &Row) -> Contract {
    Contract {
        id: row.get("id"),
        member_id: row.get("member_id"),
        trainer_id: row.get("trainer_id"),
        offering_id: row.get("offering_id"),
        total_sessions: row.get("total_sessions"),
        remaining_sessions: row.get("remaining_sessions"),
        created_at: row.get("created_at"),
        completed_at: row.get("completed_at"),
        cancelled_at: row.get("cancelled_at"),
    }
}

impl<C> Database<Select<By<Option<Contract>, contract::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Contract>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Contract>, contract::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: contract::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, member_id, trainer_id, offering_id, \
                   total_sessions, remaining_sessions, \
                   created_at, completed_at, cancelled_at \
            FROM contracts \
            WHERE id = $1::UUID \
            LIMIT 1";
        Ok(self
            .query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| from_row(&row)))
    }
}

impl<C> Database<Select<By<Vec<Contract>, user::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Contract>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Contract>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let user_id: user::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, member_id, trainer_id, offering_id, \
                   total_sessions, remaining_sessions, \
                   created_at, completed_at, cancelled_at \
            FROM contracts \
            WHERE member_id = $1::UUID \
               OR trainer_id = $1::UUID \
            ORDER BY created_at, id";
        Ok(self
            .query(SQL, &[&user_id])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Insert<Contract>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Contract>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(contract): Insert<Contract>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(contract))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Contract>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(contract): Update<Contract>,
    ) -> Result<Self::Ok, Self::Err> {
        let Contract {
            id,
            member_id,
            trainer_id,
            offering_id,
            total_sessions,
            remaining_sessions,
            created_at,
            completed_at,
            cancelled_at,
        } = contract;

        const SQL: &str = "\
            INSERT INTO contracts (\
                id, member_id, trainer_id, offering_id, \
                total_sessions, remaining_sessions, \
                created_at, completed_at, cancelled_at\
            ) \
            VALUES (\
                $1::UUID, $2::UUID, $3::UUID, $4::UUID, \
                $5::INT4, $6::INT4, \
                $7::TIMESTAMPTZ, $8::TIMESTAMPTZ, $9::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET member_id = EXCLUDED.member_id, \
                trainer_id = EXCLUDED.trainer_id, \
                offering_id = EXCLUDED.offering_id, \
                total_sessions = EXCLUDED.total_sessions, \
                remaining_sessions = EXCLUDED.remaining_sessions, \
                created_at = EXCLUDED.created_at, \
                completed_at = EXCLUDED.completed_at, \
                cancelled_at = EXCLUDED.cancelled_at";
        self.exec(
            SQL,
            &[
                &id,
                &member_id,
                &trainer_id,
                &offering_id,
                &total_sessions,
                &remaining_sessions,
                &created_at,
                &completed_at,
                &cancelled_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Lock<By<Contract, contract::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Contract, contract::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: contract::Id = by.into_inner();

        // `DO UPDATE` takes the row lock even when the row already
        // exists, so concurrent lockers of the same key serialize until
        // the transaction ends.
        const SQL: &str = "\
            INSERT INTO contracts_lock \
            VALUES ($1::UUID) \
            ON CONFLICT (id) DO UPDATE SET id = EXCLUDED.id";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
