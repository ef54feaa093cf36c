//! [`ReapUnretainedOfferings`] [`Task`].

use std::{convert::Infallible, error::Error, time};

use common::operations::{By, Delete, Perform, Start};
use tokio::time::interval;
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{offering, Offering},
    infra::{database, Database},
    Service,
};
#[cfg(doc)]
use crate::domain::Application;

use super::Task;

/// Configuration for [`ReapUnretainedOfferings`] [`Task`].
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Interval between [`Offering`] reaping rounds.
    pub interval: time::Duration,

    /// Timeout after which a deactivated [`Offering`] referenced by no
    /// [`Application`]s is reaped.
    pub timeout: time::Duration,
}

/// [`Task`] for reaping deactivated [`Offering`]s referenced by no
/// [`Application`]s.
#[derive(Clone, Copy, Debug)]
pub struct ReapUnretainedOfferings<S> {
    /// [`Config`] of this [`Task`].
    config: Config,

    /// [`Service`] instance.
    service: S,
}

impl<Db> Task<Start<By<ReapUnretainedOfferings<Self>, Config>>>
    for Service<Db>
where
    ReapUnretainedOfferings<Service<Db>>:
        Task<Perform<()>, Ok = (), Err: Error> + Send + Sync + 'static,
    Self: Clone,
{
    type Ok = ();
    type Err = Infallible;

    async fn execute(
        &self,
        Start(by): Start<By<ReapUnretainedOfferings<Self>, Config>>,
    ) -> Result<Self::Ok, Self::Err> {
        let config = by.into_inner();
        let task = ReapUnretainedOfferings {
            config,
            service: self.clone(),
        };

        let mut interval = interval(task.config.interval);
        loop {
            let _ = interval.tick().await;
            _ = task.execute(Perform(())).await.map_err(|e| {
                log::error!("`task::ReapUnretainedOfferings` failed: {e}");
            });
        }
    }
}

impl<Db> Task<Perform<()>> for ReapUnretainedOfferings<Service<Db>>
where
    Db: Database<
        Delete<By<Offering, offering::DeactivationDateTime>>,
        Ok = (),
        Err = Traced<database::Error>,
    >,
{
    type Ok = ();
    type Err = ExecutionError;

    async fn execute(&self, _: Perform<()>) -> Result<Self::Ok, Self::Err> {
        let deadline =
            offering::DeactivationDateTime::now() - self.config.timeout;
        self.service
            .database()
            .execute(Delete(By::new(deadline)))
            .await
            .map_err(tracerr::map_from_and_wrap!())
    }
}

/// Error of [`ReapUnretainedOfferings`] execution.
pub type ExecutionError = Traced<database::Error>;

#[cfg(all(test, feature = "memory"))]
mod spec {
    use std::time::Duration;

    use common::{money::Currency, operations::Perform, Money};

    use crate::{
        command::{
            CreateOffering, DeactivateOffering, RegisterUser,
            SubmitApplication,
        },
        domain::{offering, user, Offering, User},
        infra::Memory,
        query, Command as _, Config, Service,
    };

    use super::{Config as TaskConfig, ReapUnretainedOfferings};

    fn service() -> Service<Memory> {
        let config = Config {
            reap_unretained_offerings: TaskConfig {
                interval: Duration::from_secs(60 * 60),
                timeout: Duration::from_secs(24 * 60 * 60),
            },
        };
        Service::new(config, Memory::new()).0
    }

    async fn trainer(svc: &Service<Memory>) -> User {
        svc.execute(RegisterUser {
            name: user::Name::new("Greta Coach").unwrap(),
            role: user::Role::Trainer,
            email: None,
        })
        .await
        .unwrap()
    }

    async fn offering_of(
        svc: &Service<Memory>,
        trainer_id: user::Id,
        title: &str,
    ) -> Offering {
        svc.execute(CreateOffering {
            trainer_id,
            title: offering::Title::new(title).unwrap(),
            description: None,
            price: offering::Price::new(Money {
                amount: "10.00".parse().unwrap(),
                currency: Currency::Usd,
            })
            .unwrap(),
            total_sessions: offering::SessionCount::new(5).unwrap(),
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn reaps_deactivated_offerings_without_applications() {
        let svc = service();
        let trainer = trainer(&svc).await;

        let unused = offering_of(&svc, trainer.id, "Mobility drills").await;
        let applied = offering_of(&svc, trainer.id, "Strength basics").await;

        let member = svc
            .execute(RegisterUser {
                name: user::Name::new("Alex Doe").unwrap(),
                role: user::Role::Member,
                email: None,
            })
            .await
            .unwrap();
        let _application = svc
            .execute(SubmitApplication {
                member_id: member.id,
                offering_id: applied.id,
            })
            .await
            .unwrap();

        for offering_id in [unused.id, applied.id] {
            let _ = svc
                .execute(DeactivateOffering {
                    offering_id,
                    trainer_id: trainer.id,
                })
                .await
                .unwrap();
        }

        let task = ReapUnretainedOfferings {
            config: TaskConfig {
                interval: Duration::from_secs(60 * 60),
                timeout: Duration::ZERO,
            },
            service: svc.clone(),
        };
        task.execute(Perform(())).await.unwrap();

        let reaped = svc
            .execute(query::offering::ById::by(unused.id))
            .await
            .unwrap();
        assert!(reaped.is_none());

        // Referenced `Offering`s survive, even though deactivated.
        let kept = svc
            .execute(query::offering::ById::by(applied.id))
            .await
            .unwrap();
        assert!(kept.is_some());
    }

    #[tokio::test]
    async fn keeps_offerings_deactivated_recently() {
        let svc = service();
        let trainer = trainer(&svc).await;

        let offering = offering_of(&svc, trainer.id, "Intro session").await;
        let _ = svc
            .execute(DeactivateOffering {
                offering_id: offering.id,
                trainer_id: trainer.id,
            })
            .await
            .unwrap();

        let task = ReapUnretainedOfferings {
            config: TaskConfig {
                interval: Duration::from_secs(60 * 60),
                timeout: Duration::from_secs(24 * 60 * 60),
            },
            service: svc.clone(),
        };
        task.execute(Perform(())).await.unwrap();

        let kept = svc
            .execute(query::offering::ById::by(offering.id))
            .await
            .unwrap();
        assert!(kept.is_some());
    }
}
