//! [`Application`]-related [`Database`] implementations.

use common::operations::{By, Insert, Lock, Select, Update};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{application, offering, user, Application},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

/// Constructs an [`Application`] from the provided [`Row`].
fn from_row(row: &Row) -> Application {
    Application {
        id: row.get("id"),
        member_id: row.get("member_id"),
        offering_id: row.get("offering_id"),
        applied_at: row.get("applied_at"),
        approved_at: row.get("approved_at"),
        rejected_at: row.get("rejected_at"),
    }
}

impl<C> Database<Select<By<Option<Application>, application::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Application>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Application>, application::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: application::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, member_id, offering_id, \
                   applied_at, approved_at, rejected_at \
            FROM applications \
            WHERE id = $1::UUID \
            LIMIT 1";
        Ok(self
            .query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| from_row(&row)))
    }
}

impl<C> Database<Select<By<Vec<Application>, offering::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Application>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Application>, offering::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let offering_id: offering::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, member_id, offering_id, \
                   applied_at, approved_at, rejected_at \
            FROM applications \
            WHERE offering_id = $1::UUID \
            ORDER BY applied_at, id";
        Ok(self
            .query(SQL, &[&offering_id])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
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
    > for Postgres<C>
where
    C: Connection,
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

        const SQL: &str = "\
            SELECT id, member_id, offering_id, \
                   applied_at, approved_at, rejected_at \
            FROM applications \
            WHERE member_id = $1::UUID \
              AND offering_id = $2::UUID \
              AND approved_at IS NULL \
              AND rejected_at IS NULL \
            LIMIT 1";
        Ok(self
            .query_opt(SQL, &[&member_id, &offering_id])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| read::application::Pending(from_row(&row))))
    }
}

impl<C> Database<Insert<Application>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Application>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(application): Insert<Application>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(application))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Application>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(application): Update<Application>,
    ) -> Result<Self::Ok, Self::Err> {
        let Application {
            id,
            member_id,
            offering_id,
            applied_at,
            approved_at,
            rejected_at,
        } = application;

        const SQL: &str = "\
            INSERT INTO applications (\
                id, member_id, offering_id, \
                applied_at, approved_at, rejected_at\
            ) \
            VALUES (\
                $1::UUID, $2::UUID, $3::UUID, \
                $4::TIMESTAMPTZ, $5::TIMESTAMPTZ, $6::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET member_id = EXCLUDED.member_id, \
                offering_id = EXCLUDED.offering_id, \
                applied_at = EXCLUDED.applied_at, \
                approved_at = EXCLUDED.approved_at, \
                rejected_at = EXCLUDED.rejected_at";
        self.exec(
            SQL,
            &[
                &id,
                &member_id,
                &offering_id,
                &applied_at,
                &approved_at,
                &rejected_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Lock<By<Application, application::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Application, application::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: application::Id = by.into_inner();

        // `DO UPDATE` takes the row lock even when the row already
        // exists, so concurrent lockers of the same key serialize until
        // the transaction ends.
        const SQL: &str = "\
            INSERT INTO applications_lock \
            VALUES ($1::UUID) \
            ON CONFLICT (id) DO UPDATE SET id = EXCLUDED.id";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
