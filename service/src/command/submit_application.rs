//! [`Command`] for submitting a new [`Application`].

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{application, offering, user, Application, Offering, User},
    infra::{database, Database},
    read::application::Pending,
    Event, Service,
};

use super::Command;

/// [`Command`] for submitting a new [`Application`] to an [`Offering`].
#[derive(Clone, Copy, Debug)]
pub struct SubmitApplication {
    /// ID of the member [`User`] applying to the [`Offering`].
    pub member_id: user::Id,

    /// ID of the [`Offering`] being applied to.
    pub offering_id: offering::Id,
}

impl<Db> Command<SubmitApplication> for Service<Db>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Offering>, offering::Id>>,
            Ok = Option<Offering>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Pending<Application>>, (user::Id, offering::Id)>>,
            Ok = Option<Pending<Application>>,
            Err = Traced<database::Error>,
        > + Database<Insert<Application>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Application;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: SubmitApplication,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let SubmitApplication {
            member_id,
            offering_id,
        } = cmd;

        let member = self
            .database()
            .execute(Select(By::<Option<User>, _>::new(member_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::MemberNotExists(member_id))
            .map_err(tracerr::wrap!())?;
        if !member.is_member() {
            return Err(tracerr::new!(E::NotMember(member_id)));
        }

        self.database()
            .execute(Select(By::<Option<Offering>, _>::new(offering_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .filter(Offering::is_sellable)
            .ok_or(E::OfferingNotSellable(offering_id))
            .map_err(tracerr::wrap!())
            .map(drop)?;

        let application = Application {
            id: application::Id::new(),
            member_id: member.id,
            offering_id,
            applied_at: DateTime::now().coerce(),
            approved_at: None,
            rejected_at: None,
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let pending = tx
            .execute(Select(By::<Option<Pending<Application>>, _>::new((
                member_id,
                offering_id,
            ))))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if pending.is_some() {
            return Err(tracerr::new!(E::AlreadyApplied(offering_id)));
        }

        // A concurrent submission may slip past the check above, in which
        // case the partial unique index reports it here.
        tx.execute(Insert(application.clone()))
            .await
            .map_err(|e| {
                if e.as_ref()
                    .is_unique_violation(Some("applications_pending_idx"))
                {
                    tracerr::new!(E::AlreadyApplied(offering_id))
                } else {
                    tracerr::map_from_and_wrap!(=> E)(e)
                }
            })
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        self.publish(Event::ApplicationSubmitted {
            application_id: application.id,
            offering_id,
        });

        Ok(application)
    }
}

/// Error of [`SubmitApplication`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Offering`] already has a pending [`Application`] of this member.
    #[display("`Offering(id: {_0})` is already applied to by the member")]
    AlreadyApplied(#[error(not(source))] offering::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Member [`User`] with the provided ID does not exist.
    #[display("`User(id: {_0})` does not exist")]
    MemberNotExists(#[error(not(source))] user::Id),

    /// [`User`] with the provided ID is not a member.
    #[display("`User(id: {_0})` is not a member")]
    NotMember(#[error(not(source))] user::Id),

    /// [`Offering`] with the provided ID does not accept [`Application`]s.
    #[display("`Offering(id: {_0})` does not exist or is deactivated")]
    OfferingNotSellable(#[error(not(source))] offering::Id),
}
