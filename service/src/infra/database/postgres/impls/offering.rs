//! [`Offering`]-related [`Database`] implementations.

use common::{
    operations::{By, Delete, Insert, Lock, Select, Update},
    Money,
};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{offering, user, Offering},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

/// Constructs an [`Offering`] from the provided [`Row`].
fn from_row(row: &Row) -> Offering {
    Offering {
        id: row.get("id"),
        trainer_id: row.get("trainer_id"),
        title: row.get("title"),
        description: row.get("description"),
        price: offering::Price::new(Money {
            amount: row.get("price"),
            currency: row.get("price_currency"),
        })
        .expect("non-negative `price`"),
        total_sessions: row.get("total_sessions"),
        created_at: row.get("created_at"),
        deactivated_at: row.get("deactivated_at"),
    }
}

impl<C> Database<Select<By<Option<Offering>, offering::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Offering>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Offering>, offering::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: offering::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, trainer_id, title, description, \
                   price, price_currency, total_sessions, \
                   created_at, deactivated_at \
            FROM offerings \
            WHERE id = $1::UUID \
            LIMIT 1";
        Ok(self
            .query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| from_row(&row)))
    }
}

impl<C> Database<Select<By<Vec<Offering>, user::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Offering>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Offering>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let trainer_id: user::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, trainer_id, title, description, \
                   price, price_currency, total_sessions, \
                   created_at, deactivated_at \
            FROM offerings \
            WHERE trainer_id = $1::UUID \
            ORDER BY created_at, id";
        Ok(self
            .query(SQL, &[&trainer_id])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Insert<Offering>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Offering>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(offering): Insert<Offering>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(offering))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Offering>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(offering): Update<Offering>,
    ) -> Result<Self::Ok, Self::Err> {
        let Offering {
            id,
            trainer_id,
            title,
            description,
            price,
            total_sessions,
            created_at,
            deactivated_at,
        } = offering;

        let Money { amount, currency } = price.into();

        const SQL: &str = "\
            INSERT INTO offerings (\
                id, trainer_id, title, description, \
                price, price_currency, total_sessions, \
                created_at, deactivated_at\
            ) \
            VALUES (\
                $1::UUID, $2::UUID, \
                $3::VARCHAR, $4::VARCHAR, \
                $5::NUMERIC, $6::INT2, $7::INT4, \
                $8::TIMESTAMPTZ, $9::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET trainer_id = EXCLUDED.trainer_id, \
                title = EXCLUDED.title, \
                description = EXCLUDED.description, \
                price = EXCLUDED.price, \
                price_currency = EXCLUDED.price_currency, \
                total_sessions = EXCLUDED.total_sessions, \
                created_at = EXCLUDED.created_at, \
                deactivated_at = EXCLUDED.deactivated_at";
        self.exec(
            SQL,
            &[
                &id,
                &trainer_id,
                &title,
                &description,
                &amount,
                &currency,
                &total_sessions,
                &created_at,
                &deactivated_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Lock<By<Offering, offering::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Offering, offering::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: offering::Id = by.into_inner();

        // `DO UPDATE` takes the row lock even when the row already
        // exists, so concurrent lockers of the same key serialize until
        // the transaction ends.
        const SQL: &str = "\
            INSERT INTO offerings_lock \
            VALUES ($1::UUID) \
            ON CONFLICT (id) DO UPDATE SET id = EXCLUDED.id";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Delete<By<Offering, offering::DeactivationDateTime>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Offering, offering::DeactivationDateTime>>,
    ) -> Result<Self::Ok, Self::Err> {
        let deadline: offering::DeactivationDateTime = by.into_inner();

        const SQL: &str = "\
            DELETE FROM offerings \
            WHERE (SELECT COUNT(*) \
                   FROM applications \
                   WHERE offering_id = offerings.id) = 0 \
              AND deactivated_at < $1";
        self.exec(SQL, &[&deadline])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
