//! GraphQL [`Mutation`]s definitions.

use common::{DateTime, Money};
use juniper::{graphql_object, GraphQLObject};
use service::{command, domain::offering, Command as _};

use crate::{api, define_error, AsError, Context, Error};

/// Root of all GraphQL mutations.
#[derive(Clone, Copy, Debug)]
pub struct Mutation;

impl Mutation {
    /// Name of the [`tracing::Span`] for the mutations.
    const SPAN_NAME: &'static str = "GraphQL mutation";
}

#[graphql_object(context = Context)]
impl Mutation {
    /// Registers a new `User` with the provided name and role.
    #[tracing::instrument(
        skip_all,
        fields(
            email = ?email,
            gql.name = "registerUser",
            name = %name,
            otel.name = Self::SPAN_NAME,
            role = ?role,
        ),
    )]
    pub async fn register_user(
        name: api::user::Name,
        role: api::user::Role,
        email: Option<api::user::Email>,
        ctx: &Context,
    ) -> Result<api::User, Error> {
        ctx.service()
            .execute(command::RegisterUser {
                name: name.into(),
                role: role.into(),
                email: email.map(Into::into),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Publishes a new `Offering` on behalf of the specified trainer.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_SESSION_COUNT` - provided `totalSessions` is not positive;
    /// - `NEGATIVE_PRICE` - provided price is negative;
    /// - `NOT_TRAINER` - the `User` with the provided ID is not a trainer;
    /// - `USER_NOT_EXISTS` - the `User` with the provided ID does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            description = ?description,
            gql.name = "createOffering",
            otel.name = Self::SPAN_NAME,
            price = price.to_string(),
            title = %title,
            total_sessions = %total_sessions,
            trainer_id = %trainer_id,
        ),
    )]
    pub async fn create_offering(
        trainer_id: api::user::Id,
        title: api::offering::Title,
        description: Option<api::offering::Description>,
        price: Money,
        total_sessions: i32,
        ctx: &Context,
    ) -> Result<api::Offering, Error> {
        let price = offering::Price::new(price)
            .ok_or_else(|| OfferingInputError::NegativePrice.into())
            .map_err(ctx.error())?;
        let total_sessions = offering::SessionCount::new(total_sessions)
            .ok_or_else(|| OfferingInputError::InvalidSessionCount.into())
            .map_err(ctx.error())?;

        ctx.service()
            .execute(command::CreateOffering {
                trainer_id: trainer_id.into(),
                title: title.into(),
                description: description.map(Into::into),
                price,
                total_sessions,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Deactivates the `Offering` with the provided ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_OWNER` - the `Offering` is not published by the specified
    ///                 trainer;
    /// - `OFFERING_ALREADY_DEACTIVATED` - the `Offering` is deactivated
    ///                                    already;
    /// - `OFFERING_NOT_EXISTS` - the `Offering` with the provided ID does not
    ///                           exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "deactivateOffering",
            id = %id,
            otel.name = Self::SPAN_NAME,
            trainer_id = %trainer_id,
        ),
    )]
    pub async fn deactivate_offering(
        id: api::offering::Id,
        trainer_id: api::user::Id,
        ctx: &Context,
    ) -> Result<api::Offering, Error> {
        ctx.service()
            .execute(command::DeactivateOffering {
                offering_id: id.into(),
                trainer_id: trainer_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Submits a new `Application` of the specified member to the `Offering`
    /// with the provided ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `ALREADY_APPLIED` - the member has a pending `Application` to the
    ///                       `Offering` already;
    /// - `NOT_MEMBER` - the `User` with the provided ID is not a member;
    /// - `OFFERING_NOT_SELLABLE` - the `Offering` is deactivated or does not
    ///                             exist;
    /// - `USER_NOT_EXISTS` - the `User` with the provided ID does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "submitApplication",
            member_id = %member_id,
            offering_id = %offering_id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn submit_application(
        offering_id: api::offering::Id,
        member_id: api::user::Id,
        ctx: &Context,
    ) -> Result<api::Application, Error> {
        ctx.service()
            .execute(command::SubmitApplication {
                member_id: member_id.into(),
                offering_id: offering_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Approves or rejects the `Application` with the provided ID.
    ///
    /// Approval opens a new `Contract` between the applying member and the
    /// trainer owning the `Offering`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `APPLICATION_ALREADY_DECIDED` - the `Application` is decided already;
    /// - `APPLICATION_NOT_EXISTS` - the `Application` with the provided ID
    ///                              does not exist;
    /// - `NOT_OWNER` - the `Offering` applied to is not published by the
    ///                 specified trainer;
    /// - `OFFERING_NOT_SELLABLE` - the `Offering` applied to is deactivated.
    #[tracing::instrument(
        skip_all,
        fields(
            approve = %approve,
            gql.name = "decideApplication",
            id = %id,
            otel.name = Self::SPAN_NAME,
            trainer_id = %trainer_id,
        ),
    )]
    pub async fn decide_application(
        id: api::application::Id,
        trainer_id: api::user::Id,
        approve: bool,
        ctx: &Context,
    ) -> Result<DecideApplicationResult, Error> {
        ctx.service()
            .execute(command::DecideApplication {
                application_id: id.into(),
                trainer_id: trainer_id.into(),
                approve,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|output| DecideApplicationResult {
                application: output.application.into(),
                contract: output.contract.map(Into::into),
            })
    }

    /// Cancels the `Contract` with the provided ID on behalf of one of its
    /// parties.
    ///
    /// Cancels all the scheduled `Appointment`s of the `Contract` along.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `CONTRACT_NOT_ACTIVE` - the `Contract` is completed or cancelled
    ///                           already;
    /// - `CONTRACT_NOT_EXISTS` - the `Contract` with the provided ID does not
    ///                           exist;
    /// - `NOT_PARTY` - the `User` with the provided ID is not a party of the
    ///                 `Contract`.
    #[tracing::instrument(
        skip_all,
        fields(
            actor_id = %actor_id,
            gql.name = "cancelContract",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn cancel_contract(
        id: api::contract::Id,
        actor_id: api::user::Id,
        ctx: &Context,
    ) -> Result<api::Contract, Error> {
        ctx.service()
            .execute(command::CancelContract {
                contract_id: id.into(),
                actor_id: actor_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Books a new `Appointment` under the `Contract` with the provided ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `CONTRACT_NOT_EXISTS` - the `Contract` with the provided ID does not
    ///                           exist or is not active;
    /// - `INVALID_INTERVAL` - provided `endsAt` is not after `startsAt`;
    /// - `NOT_PARTY` - provided trainer and member are not the parties of the
    ///                 `Contract`;
    /// - `NO_SESSIONS_REMAINING` - scheduled `Appointment`s already exhaust
    ///                             the remaining session balance;
    /// - `SLOT_CONFLICT` - the slot overlaps another scheduled `Appointment`
    ///                     of one of the parties.
    #[tracing::instrument(
        skip_all,
        fields(
            contract_id = %contract_id,
            ends_at = %ends_at.to_rfc3339(),
            gql.name = "bookAppointment",
            member_id = %member_id,
            otel.name = Self::SPAN_NAME,
            starts_at = %starts_at.to_rfc3339(),
            trainer_id = %trainer_id,
        ),
    )]
    pub async fn book_appointment(
        contract_id: api::contract::Id,
        trainer_id: api::user::Id,
        member_id: api::user::Id,
        starts_at: DateTime,
        ends_at: DateTime,
        ctx: &Context,
    ) -> Result<api::Appointment, Error> {
        ctx.service()
            .execute(command::BookAppointment {
                contract_id: contract_id.into(),
                trainer_id: trainer_id.into(),
                member_id: member_id.into(),
                starts_at,
                ends_at,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Moves the `Appointment` with the provided ID to a new time slot.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `APPOINTMENT_NOT_EXISTS` - the `Appointment` with the provided ID
    ///                              does not exist;
    /// - `APPOINTMENT_NOT_SCHEDULED` - the `Appointment` is completed,
    ///                                 cancelled or a no-show already;
    /// - `INVALID_INTERVAL` - provided `endsAt` is not after `startsAt`;
    /// - `SLOT_CONFLICT` - the new slot overlaps another scheduled
    ///                     `Appointment` of one of the parties.
    #[tracing::instrument(
        skip_all,
        fields(
            ends_at = %ends_at.to_rfc3339(),
            gql.name = "rescheduleAppointment",
            id = %id,
            otel.name = Self::SPAN_NAME,
            starts_at = %starts_at.to_rfc3339(),
        ),
    )]
    pub async fn reschedule_appointment(
        id: api::appointment::Id,
        starts_at: DateTime,
        ends_at: DateTime,
        ctx: &Context,
    ) -> Result<api::Appointment, Error> {
        ctx.service()
            .execute(command::RescheduleAppointment {
                appointment_id: id.into(),
                starts_at,
                ends_at,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Cancels the `Appointment` with the provided ID on behalf of one of its
    /// parties.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `APPOINTMENT_NOT_EXISTS` - the `Appointment` with the provided ID
    ///                              does not exist;
    /// - `APPOINTMENT_NOT_SCHEDULED` - the `Appointment` is completed,
    ///                                 cancelled or a no-show already;
    /// - `NOT_PARTY` - the `User` with the provided ID is not a party of the
    ///                 `Appointment`.
    #[tracing::instrument(
        skip_all,
        fields(
            actor_id = %actor_id,
            gql.name = "cancelAppointment",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn cancel_appointment(
        id: api::appointment::Id,
        actor_id: api::user::Id,
        ctx: &Context,
    ) -> Result<api::Appointment, Error> {
        ctx.service()
            .execute(command::CancelAppointment {
                appointment_id: id.into(),
                actor_id: actor_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Marks the `Appointment` with the provided ID as a no-show.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `APPOINTMENT_NOT_ELAPSED` - the `Appointment`'s slot has not elapsed
    ///                               yet;
    /// - `APPOINTMENT_NOT_EXISTS` - the `Appointment` with the provided ID
    ///                              does not exist;
    /// - `APPOINTMENT_NOT_SCHEDULED` - the `Appointment` is completed,
    ///                                 cancelled or a no-show already.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "markAppointmentNoShow",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn mark_appointment_no_show(
        id: api::appointment::Id,
        ctx: &Context,
    ) -> Result<api::Appointment, Error> {
        ctx.service()
            .execute(command::MarkAppointmentNoShow {
                appointment_id: id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Completes the `Appointment` with the provided ID, recording a new
    /// `Session` linked to the provided workout log.
    ///
    /// Consumes one session of the `Contract` balance, completing the
    /// `Contract` once the balance reaches zero.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `APPOINTMENT_NOT_EXISTS` - the `Appointment` with the provided ID
    ///                              does not exist;
    /// - `APPOINTMENT_NOT_SCHEDULED` - the `Appointment` is cancelled or a
    ///                                 no-show already;
    /// - `NO_SESSIONS_REMAINING` - the `Contract` balance is exhausted
    ///                             already;
    /// - `SESSION_ALREADY_RECORDED` - a `Session` is recorded for the
    ///                                `Appointment` already;
    /// - `WORKOUT_LOG_ALREADY_LINKED` - the workout log is linked to another
    ///                                  `Session` already.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "completeAppointment",
            id = %id,
            otel.name = Self::SPAN_NAME,
            workout_log_id = %workout_log_id,
        ),
    )]
    pub async fn complete_appointment(
        id: api::appointment::Id,
        workout_log_id: api::session::WorkoutLogId,
        ctx: &Context,
    ) -> Result<api::Session, Error> {
        ctx.service()
            .execute(command::CompleteAppointment {
                appointment_id: id.into(),
                workout_log_id: workout_log_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }
}

/// Result of an `Application` decision.
#[derive(Debug, GraphQLObject)]
#[graphql(context = Context)]
pub struct DecideApplicationResult {
    /// Decided `Application`.
    pub application: api::Application,

    /// `Contract` opened by the approval, if any.
    pub contract: Option<api::Contract>,
}

define_error! {
    enum OfferingInputError {
        #[code = "INVALID_SESSION_COUNT"]
        #[status = BAD_REQUEST]
        #[message = "Provided `totalSessions` must be positive"]
        InvalidSessionCount,

        #[code = "NEGATIVE_PRICE"]
        #[status = BAD_REQUEST]
        #[message = "Provided price must be non-negative"]
        NegativePrice,
    }
}

impl AsError for command::create_offering::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "NOT_TRAINER"]
                #[status = FORBIDDEN]
                #[message = "`User` with the provided ID is not a trainer"]
                NotTrainer,

                #[code = "USER_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`User` with the provided ID does not exist"]
                UserNotExists,
            }
        }

        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::NotTrainer(_) => Error::NotTrainer.into(),
            Self::TrainerNotExists(_) => Error::UserNotExists.into(),
        })
    }
}

impl AsError for command::deactivate_offering::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "NOT_OWNER"]
                #[status = FORBIDDEN]
                #[message = "`Offering` is not published by the specified \
                             trainer"]
                NotOwner,

                #[code = "OFFERING_ALREADY_DEACTIVATED"]
                #[status = CONFLICT]
                #[message = "`Offering` with the provided ID is deactivated \
                             already"]
                AlreadyDeactivated,

                #[code = "OFFERING_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Offering` with the provided ID does not exist"]
                OfferingNotExists,
            }
        }

        Some(match self {
            Self::AlreadyDeactivated(_) => Error::AlreadyDeactivated.into(),
            Self::Db(e) => return e.try_as_error(),
            Self::NotOwner(_) => Error::NotOwner.into(),
            Self::OfferingNotExists(_) => Error::OfferingNotExists.into(),
        })
    }
}

impl AsError for command::submit_application::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "ALREADY_APPLIED"]
                #[status = CONFLICT]
                #[message = "Member has a pending `Application` to the \
                             `Offering` already"]
                AlreadyApplied,

                #[code = "NOT_MEMBER"]
                #[status = FORBIDDEN]
                #[message = "`User` with the provided ID is not a member"]
                NotMember,

                #[code = "OFFERING_NOT_SELLABLE"]
                #[status = CONFLICT]
                #[message = "`Offering` is deactivated or does not exist"]
                OfferingNotSellable,

                #[code = "USER_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`User` with the provided ID does not exist"]
                UserNotExists,
            }
        }

        Some(match self {
            Self::AlreadyApplied(_) => Error::AlreadyApplied.into(),
            Self::Db(e) => return e.try_as_error(),
            Self::MemberNotExists(_) => Error::UserNotExists.into(),
            Self::NotMember(_) => Error::NotMember.into(),
            Self::OfferingNotSellable(_) => Error::OfferingNotSellable.into(),
        })
    }
}

impl AsError for command::decide_application::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "APPLICATION_ALREADY_DECIDED"]
                #[status = CONFLICT]
                #[message = "`Application` with the provided ID is decided \
                             already"]
                AlreadyDecided,

                #[code = "APPLICATION_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Application` with the provided ID does not \
                             exist"]
                ApplicationNotExists,

                #[code = "NOT_OWNER"]
                #[status = FORBIDDEN]
                #[message = "`Offering` applied to is not published by the \
                             specified trainer"]
                NotOwner,

                #[code = "OFFERING_NOT_SELLABLE"]
                #[status = CONFLICT]
                #[message = "`Offering` applied to is deactivated"]
                OfferingNotSellable,
            }
        }

        Some(match self {
            Self::AlreadyDecided(_) => Error::AlreadyDecided.into(),
            Self::ApplicationNotExists(_) => Error::ApplicationNotExists.into(),
            Self::Db(e) => return e.try_as_error(),
            Self::NotOwner(_) => Error::NotOwner.into(),
            Self::OfferingNotSellable(_) => Error::OfferingNotSellable.into(),
        })
    }
}

impl AsError for command::cancel_contract::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "CONTRACT_NOT_ACTIVE"]
                #[status = CONFLICT]
                #[message = "`Contract` with the provided ID is completed or \
                             cancelled already"]
                NotActive,

                #[code = "CONTRACT_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Contract` with the provided ID does not exist"]
                ContractNotExists,

                #[code = "NOT_PARTY"]
                #[status = FORBIDDEN]
                #[message = "`User` with the provided ID is not a party of \
                             the `Contract`"]
                NotParty,
            }
        }

        Some(match self {
            Self::ContractNotExists(_) => Error::ContractNotExists.into(),
            Self::Db(e) => return e.try_as_error(),
            Self::NotActive(_) => Error::NotActive.into(),
            Self::NotParty(_) => Error::NotParty.into(),
        })
    }
}

impl AsError for command::book_appointment::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "CONTRACT_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Contract` with the provided ID does not exist \
                             or is not active"]
                ContractNotExists,

                #[code = "INVALID_INTERVAL"]
                #[status = BAD_REQUEST]
                #[message = "Provided `endsAt` must be after `startsAt`"]
                InvalidInterval,

                #[code = "NOT_PARTY"]
                #[status = FORBIDDEN]
                #[message = "Provided trainer and member are not the parties \
                             of the `Contract`"]
                NotParty,

                #[code = "NO_SESSIONS_REMAINING"]
                #[status = CONFLICT]
                #[message = "Scheduled `Appointment`s exhaust the remaining \
                             session balance already"]
                NoSessionsRemaining,

                #[code = "SLOT_CONFLICT"]
                #[status = CONFLICT]
                #[message = "Provided slot overlaps another scheduled \
                             `Appointment` of one of the parties"]
                SlotConflict,
            }
        }

        Some(match self {
            Self::ContractNotExists(_) => Error::ContractNotExists.into(),
            Self::Db(e) => return e.try_as_error(),
            Self::InvalidInterval => Error::InvalidInterval.into(),
            Self::NoSessionsRemaining(_) => Error::NoSessionsRemaining.into(),
            Self::NotParty(_) => Error::NotParty.into(),
            Self::SlotConflict(_) => Error::SlotConflict.into(),
        })
    }
}

impl AsError for command::reschedule_appointment::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "APPOINTMENT_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Appointment` with the provided ID does not \
                             exist"]
                AppointmentNotExists,

                #[code = "APPOINTMENT_NOT_SCHEDULED"]
                #[status = CONFLICT]
                #[message = "`Appointment` with the provided ID is completed, \
                             cancelled or a no-show already"]
                NotScheduled,

                #[code = "INVALID_INTERVAL"]
                #[status = BAD_REQUEST]
                #[message = "Provided `endsAt` must be after `startsAt`"]
                InvalidInterval,

                #[code = "SLOT_CONFLICT"]
                #[status = CONFLICT]
                #[message = "Provided slot overlaps another scheduled \
                             `Appointment` of one of the parties"]
                SlotConflict,
            }
        }

        Some(match self {
            Self::AppointmentNotExists(_) => Error::AppointmentNotExists.into(),
            Self::Db(e) => return e.try_as_error(),
            Self::InvalidInterval => Error::InvalidInterval.into(),
            Self::NotScheduled(_) => Error::NotScheduled.into(),
            Self::SlotConflict(_) => Error::SlotConflict.into(),
        })
    }
}

impl AsError for command::cancel_appointment::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "APPOINTMENT_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Appointment` with the provided ID does not \
                             exist"]
                AppointmentNotExists,

                #[code = "APPOINTMENT_NOT_SCHEDULED"]
                #[status = CONFLICT]
                #[message = "`Appointment` with the provided ID is completed, \
                             cancelled or a no-show already"]
                NotScheduled,

                #[code = "NOT_PARTY"]
                #[status = FORBIDDEN]
                #[message = "`User` with the provided ID is not a party of \
                             the `Appointment`"]
                NotParty,
            }
        }

        Some(match self {
            Self::AppointmentNotExists(_) => Error::AppointmentNotExists.into(),
            Self::Db(e) => return e.try_as_error(),
            Self::NotParty(_) => Error::NotParty.into(),
            Self::NotScheduled(_) => Error::NotScheduled.into(),
        })
    }
}

impl AsError for command::mark_appointment_no_show::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "APPOINTMENT_NOT_ELAPSED"]
                #[status = CONFLICT]
                #[message = "`Appointment`'s slot has not elapsed yet"]
                NotElapsed,

                #[code = "APPOINTMENT_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Appointment` with the provided ID does not \
                             exist"]
                AppointmentNotExists,

                #[code = "APPOINTMENT_NOT_SCHEDULED"]
                #[status = CONFLICT]
                #[message = "`Appointment` with the provided ID is completed, \
                             cancelled or a no-show already"]
                NotScheduled,
            }
        }

        Some(match self {
            Self::AppointmentNotExists(_) => Error::AppointmentNotExists.into(),
            Self::Db(e) => return e.try_as_error(),
            Self::NotElapsed(_) => Error::NotElapsed.into(),
            Self::NotScheduled(_) => Error::NotScheduled.into(),
        })
    }
}

impl AsError for command::complete_appointment::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "APPOINTMENT_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Appointment` with the provided ID does not \
                             exist"]
                AppointmentNotExists,

                #[code = "APPOINTMENT_NOT_SCHEDULED"]
                #[status = CONFLICT]
                #[message = "`Appointment` with the provided ID is cancelled \
                             or a no-show already"]
                NotScheduled,

                #[code = "NO_SESSIONS_REMAINING"]
                #[status = CONFLICT]
                #[message = "`Contract` session balance is exhausted already"]
                NoSessionsRemaining,

                #[code = "SESSION_ALREADY_RECORDED"]
                #[status = CONFLICT]
                #[message = "`Session` is recorded for the `Appointment` \
                             already"]
                SessionAlreadyRecorded,

                #[code = "WORKOUT_LOG_ALREADY_LINKED"]
                #[status = CONFLICT]
                #[message = "Workout log is linked to another `Session` \
                             already"]
                WorkoutLogAlreadyLinked,
            }
        }

        Some(match self {
            Self::AppointmentNotExists(_) => Error::AppointmentNotExists.into(),
            Self::Db(e) => return e.try_as_error(),
            Self::NoSessionsRemaining(_) => Error::NoSessionsRemaining.into(),
            Self::NotScheduled(_) => Error::NotScheduled.into(),
            Self::SessionAlreadyRecorded(_) => {
                Error::SessionAlreadyRecorded.into()
            }
            Self::WorkoutLogAlreadyLinked(_) => {
                Error::WorkoutLogAlreadyLinked.into()
            }
        })
    }
}
