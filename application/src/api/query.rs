//! GraphQL [`Query`]s definitions.

use juniper::graphql_object;
use service::{query, Query as _};

use crate::{api, define_error, AsError, Context, Error};

/// Root of all GraphQL queries.
#[derive(Clone, Copy, Debug)]
pub struct Query;

impl Query {
    /// Name of the [`tracing::Span`] for the queries.
    pub(crate) const SPAN_NAME: &'static str = "GraphQL query";
}

#[graphql_object(context = Context)]
impl Query {
    /// Returns the `User` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `USER_NOT_EXISTS` - the `User` with the specified ID does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            id = %id,
            gql.name = "user",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn user(
        id: api::user::Id,
        ctx: &Context,
    ) -> Result<api::User, Error> {
        ctx.service()
            .execute(query::user::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| UserError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the `Offering` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `OFFERING_NOT_EXISTS` - the `Offering` with the specified ID does
    ///                           not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            id = %id,
            gql.name = "offering",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn offering(
        id: api::offering::Id,
        ctx: &Context,
    ) -> Result<api::Offering, Error> {
        ctx.service()
            .execute(query::offering::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| OfferingError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the `Offering`s published by the specified trainer.
    #[tracing::instrument(
        skip_all,
        fields(
            trainer_id = %trainer_id,
            gql.name = "offerings",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn offerings(
        trainer_id: api::user::Id,
        ctx: &Context,
    ) -> Result<Vec<api::Offering>, Error> {
        ctx.service()
            .execute(query::offerings::ByTrainer::by(trainer_id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|offerings| {
                offerings.into_iter().map(Into::into).collect()
            })
    }

    /// Returns the `Application`s submitted to the specified `Offering`.
    #[tracing::instrument(
        skip_all,
        fields(
            offering_id = %offering_id,
            gql.name = "applications",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn applications(
        offering_id: api::offering::Id,
        ctx: &Context,
    ) -> Result<Vec<api::Application>, Error> {
        ctx.service()
            .execute(query::applications::ByOffering::by(offering_id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|applications| {
                applications.into_iter().map(Into::into).collect()
            })
    }

    /// Returns the `Contract` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `CONTRACT_NOT_EXISTS` - the `Contract` with the specified ID does
    ///                           not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            id = %id,
            gql.name = "contract",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn contract(
        id: api::contract::Id,
        ctx: &Context,
    ) -> Result<api::Contract, Error> {
        ctx.service()
            .execute(query::contract::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| ContractError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the `Contract`s the specified `User` is a party of.
    #[tracing::instrument(
        skip_all,
        fields(
            user_id = %user_id,
            gql.name = "contracts",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn contracts(
        user_id: api::user::Id,
        ctx: &Context,
    ) -> Result<Vec<api::Contract>, Error> {
        ctx.service()
            .execute(query::contracts::ByUser::by(user_id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|contracts| contracts.into_iter().map(Into::into).collect())
    }

    /// Returns the `Appointment`s the specified `User` is a party of.
    #[tracing::instrument(
        skip_all,
        fields(
            user_id = %user_id,
            gql.name = "appointments",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn appointments(
        user_id: api::user::Id,
        ctx: &Context,
    ) -> Result<Vec<api::Appointment>, Error> {
        ctx.service()
            .execute(query::appointments::ByUser::by(user_id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|appointments| {
                appointments.into_iter().map(Into::into).collect()
            })
    }

    /// Returns the `Session` recorded for the specified `Appointment`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `SESSION_NOT_EXISTS` - no `Session` is recorded for the
    ///                          `Appointment` with the specified ID.
    #[tracing::instrument(
        skip_all,
        fields(
            appointment_id = %appointment_id,
            gql.name = "session",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn session(
        appointment_id: api::appointment::Id,
        ctx: &Context,
    ) -> Result<api::Session, Error> {
        ctx.service()
            .execute(query::session::ByAppointment::by(appointment_id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| SessionError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }
}

define_error! {
    enum AppointmentError {
        #[code = "APPOINTMENT_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Appointment` with the specified ID does not exist"]
        NotExists,
    }
}

define_error! {
    enum ContractError {
        #[code = "CONTRACT_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Contract` with the specified ID does not exist"]
        NotExists,
    }
}

define_error! {
    enum OfferingError {
        #[code = "OFFERING_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Offering` with the specified ID does not exist"]
        NotExists,
    }
}

define_error! {
    enum SessionError {
        #[code = "SESSION_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "No `Session` is recorded for the specified `Appointment`"]
        NotExists,
    }
}

define_error! {
    enum UserError {
        #[code = "USER_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`User` with the specified ID does not exist"]
        NotExists,
    }
}
