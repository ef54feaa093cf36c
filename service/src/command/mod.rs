//! [`Command`] definition.

pub mod book_appointment;
pub mod cancel_appointment;
pub mod cancel_contract;
pub mod complete_appointment;
pub mod create_offering;
pub mod deactivate_offering;
pub mod decide_application;
pub mod mark_appointment_no_show;
pub mod register_user;
pub mod reschedule_appointment;
pub mod submit_application;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    book_appointment::BookAppointment, cancel_appointment::CancelAppointment,
    cancel_contract::CancelContract, complete_appointment::CompleteAppointment,
    create_offering::CreateOffering, deactivate_offering::DeactivateOffering,
    decide_application::DecideApplication,
    mark_appointment_no_show::MarkAppointmentNoShow,
    register_user::RegisterUser,
    reschedule_appointment::RescheduleAppointment,
    submit_application::SubmitApplication,
};

#[cfg(all(test, feature = "memory"))]
mod spec {
    use std::time::Duration;

    use common::{money::Currency, DateTime, Money};
    use tracerr::Traced;
    use uuid::Uuid;

    use crate::{
        domain::{
            contract, offering, session, user, Appointment, Contract,
            Offering, User,
        },
        infra::Memory,
        query, task, Config, Event, Service,
    };

    use super::{
        book_appointment, BookAppointment, CancelAppointment, CancelContract,
        Command as _, CompleteAppointment, CreateOffering, DeactivateOffering,
        DecideApplication, MarkAppointmentNoShow, RegisterUser,
        RescheduleAppointment, SubmitApplication,
    };

    fn service() -> Service<Memory> {
        let config = Config {
            reap_unretained_offerings:
                task::reap_unretained_offerings::Config {
                    interval: Duration::from_secs(60 * 60),
                    timeout: Duration::from_secs(24 * 60 * 60),
                },
        };
        let (service, _background) = Service::new(config, Memory::new());
        service
    }

    async fn register(svc: &Service<Memory>, role: user::Role) -> User {
        svc.execute(RegisterUser {
            name: user::Name::new("Alex Doe").unwrap(),
            role,
            email: None,
        })
        .await
        .unwrap()
    }

    async fn offering_of(
        svc: &Service<Memory>,
        trainer_id: user::Id,
        total_sessions: i32,
    ) -> Offering {
        svc.execute(CreateOffering {
            trainer_id,
            title: offering::Title::new("Strength basics").unwrap(),
            description: None,
            price: offering::Price::new(Money {
                amount: "50.00".parse().unwrap(),
                currency: Currency::Usd,
            })
            .unwrap(),
            total_sessions: offering::SessionCount::new(total_sessions)
                .unwrap(),
        })
        .await
        .unwrap()
    }

    async fn engage_with(
        svc: &Service<Memory>,
        trainer_id: user::Id,
        member_id: user::Id,
        total_sessions: i32,
    ) -> Contract {
        let offering = offering_of(svc, trainer_id, total_sessions).await;
        let application = svc
            .execute(SubmitApplication {
                member_id,
                offering_id: offering.id,
            })
            .await
            .unwrap();
        svc.execute(DecideApplication {
            application_id: application.id,
            trainer_id,
            approve: true,
        })
        .await
        .unwrap()
        .contract
        .unwrap()
    }

    async fn engage(svc: &Service<Memory>, total_sessions: i32) -> Contract {
        let trainer = register(svc, user::Role::Trainer).await;
        let member = register(svc, user::Role::Member).await;
        engage_with(svc, trainer.id, member.id, total_sessions).await
    }

    fn hours_ahead(hours: u64) -> (DateTime, DateTime) {
        let starts_at = DateTime::now() + Duration::from_secs(hours * 3600);
        (starts_at, starts_at + Duration::from_secs(3600))
    }

    fn hours_ago(hours: u64) -> (DateTime, DateTime) {
        let ends_at = DateTime::now() - Duration::from_secs(hours * 3600);
        (ends_at - Duration::from_secs(3600), ends_at)
    }

    fn workout_log() -> session::WorkoutLogId {
        Uuid::new_v4().into()
    }

    async fn try_book(
        svc: &Service<Memory>,
        contract: &Contract,
        (starts_at, ends_at): (DateTime, DateTime),
    ) -> Result<Appointment, Traced<book_appointment::ExecutionError>> {
        svc.execute(BookAppointment {
            contract_id: contract.id,
            trainer_id: contract.trainer_id,
            member_id: contract.member_id,
            starts_at,
            ends_at,
        })
        .await
    }

    async fn book(
        svc: &Service<Memory>,
        contract: &Contract,
        slot: (DateTime, DateTime),
    ) -> Appointment {
        try_book(svc, contract, slot).await.unwrap()
    }

    async fn contract_state(
        svc: &Service<Memory>,
        id: contract::Id,
    ) -> Contract {
        svc.execute(query::contract::ById::by(id))
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn approving_application_concludes_contract() {
        let svc = service();
        let mut events = svc.subscribe();

        let trainer = register(&svc, user::Role::Trainer).await;
        let member = register(&svc, user::Role::Member).await;
        let offering = offering_of(&svc, trainer.id, 10).await;

        let application = svc
            .execute(SubmitApplication {
                member_id: member.id,
                offering_id: offering.id,
            })
            .await
            .unwrap();
        assert!(application.is_pending());

        let output = svc
            .execute(DecideApplication {
                application_id: application.id,
                trainer_id: trainer.id,
                approve: true,
            })
            .await
            .unwrap();

        assert!(output.application.approved_at.is_some());
        let contract = output.contract.unwrap();
        assert_eq!(contract.member_id, member.id);
        assert_eq!(contract.trainer_id, trainer.id);
        assert_eq!(contract.offering_id, offering.id);
        assert_eq!(contract.total_sessions, offering.total_sessions);
        assert_eq!(i32::from(contract.remaining_sessions), 10);
        assert!(contract.is_active());

        assert!(matches!(
            events.try_recv(),
            Ok(Event::OfferingCreated { .. }),
        ));
        assert!(matches!(
            events.try_recv(),
            Ok(Event::ApplicationSubmitted { .. }),
        ));
        assert!(matches!(
            events.try_recv(),
            Ok(Event::ApplicationApproved { .. }),
        ));
        assert!(matches!(
            events.try_recv(),
            Ok(Event::ContractCreated { .. }),
        ));
    }

    #[tokio::test]
    async fn rejected_application_may_be_resubmitted() {
        let svc = service();

        let trainer = register(&svc, user::Role::Trainer).await;
        let member = register(&svc, user::Role::Member).await;
        let offering = offering_of(&svc, trainer.id, 5).await;

        let application = svc
            .execute(SubmitApplication {
                member_id: member.id,
                offering_id: offering.id,
            })
            .await
            .unwrap();
        let output = svc
            .execute(DecideApplication {
                application_id: application.id,
                trainer_id: trainer.id,
                approve: false,
            })
            .await
            .unwrap();

        assert!(output.contract.is_none());
        assert!(output.application.rejected_at.is_some());

        // The rejection unblocks another attempt.
        let _resubmitted = svc
            .execute(SubmitApplication {
                member_id: member.id,
                offering_id: offering.id,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn duplicate_pending_application_is_refused() {
        use super::submit_application::ExecutionError as E;

        let svc = service();

        let trainer = register(&svc, user::Role::Trainer).await;
        let member = register(&svc, user::Role::Member).await;
        let offering = offering_of(&svc, trainer.id, 5).await;

        let _pending = svc
            .execute(SubmitApplication {
                member_id: member.id,
                offering_id: offering.id,
            })
            .await
            .unwrap();
        let err = svc
            .execute(SubmitApplication {
                member_id: member.id,
                offering_id: offering.id,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            E::AlreadyApplied(id) if *id == offering.id,
        ));
    }

    #[tokio::test]
    async fn deactivated_offering_stops_selling() {
        use super::{
            decide_application::ExecutionError as DecideError,
            submit_application::ExecutionError as SubmitError,
        };

        let svc = service();

        let trainer = register(&svc, user::Role::Trainer).await;
        let member = register(&svc, user::Role::Member).await;
        let offering = offering_of(&svc, trainer.id, 5).await;

        let pending = svc
            .execute(SubmitApplication {
                member_id: member.id,
                offering_id: offering.id,
            })
            .await
            .unwrap();

        let deactivated = svc
            .execute(DeactivateOffering {
                offering_id: offering.id,
                trainer_id: trainer.id,
            })
            .await
            .unwrap();
        assert!(deactivated.deactivated_at.is_some());

        // No new applications are taken.
        let another = register(&svc, user::Role::Member).await;
        let err = svc
            .execute(SubmitApplication {
                member_id: another.id,
                offering_id: offering.id,
            })
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), SubmitError::OfferingNotSellable(..)));

        // Still pending applications cannot be approved anymore.
        let err = svc
            .execute(DecideApplication {
                application_id: pending.id,
                trainer_id: trainer.id,
                approve: true,
            })
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), DecideError::OfferingNotSellable(..)));
    }

    #[tokio::test]
    async fn booking_is_limited_by_remaining_balance() {
        use super::book_appointment::ExecutionError as E;

        let svc = service();
        let contract = engage(&svc, 2).await;

        let _first = book(&svc, &contract, hours_ahead(1)).await;
        let _second = book(&svc, &contract, hours_ahead(3)).await;

        let err = try_book(&svc, &contract, hours_ahead(5)).await.unwrap_err();
        assert!(matches!(err.as_ref(), E::NoSessionsRemaining(..)));
    }

    #[tokio::test]
    async fn cancelling_appointment_releases_admission() {
        let svc = service();
        let contract = engage(&svc, 1).await;

        let appointment = book(&svc, &contract, hours_ahead(1)).await;
        assert!(try_book(&svc, &contract, hours_ahead(3)).await.is_err());

        let cancelled = svc
            .execute(CancelAppointment {
                appointment_id: appointment.id,
                actor_id: contract.member_id,
            })
            .await
            .unwrap();
        assert!(cancelled.cancelled_at.is_some());

        // The cancelled slot no longer occupies the balance.
        let _rebooked = book(&svc, &contract, hours_ahead(3)).await;
    }

    #[tokio::test]
    async fn overlapping_slots_conflict_across_contracts() {
        use super::book_appointment::ExecutionError as E;

        let svc = service();

        let trainer = register(&svc, user::Role::Trainer).await;
        let first_member = register(&svc, user::Role::Member).await;
        let second_member = register(&svc, user::Role::Member).await;
        let first = engage_with(&svc, trainer.id, first_member.id, 5).await;
        let second = engage_with(&svc, trainer.id, second_member.id, 5).await;

        let (starts_at, ends_at) = hours_ahead(1);
        let _booked = book(&svc, &first, (starts_at, ends_at)).await;

        // The trainer is double-booked, even though the members differ.
        let half_hour = Duration::from_secs(30 * 60);
        let slot = (starts_at + half_hour, ends_at + half_hour);
        let err = try_book(&svc, &second, slot).await.unwrap_err();
        assert!(matches!(
            err.as_ref(),
            E::SlotConflict(id) if *id == trainer.id,
        ));
    }

    #[tokio::test]
    async fn back_to_back_slots_do_not_conflict() {
        let svc = service();
        let contract = engage(&svc, 5).await;

        let (starts_at, ends_at) = hours_ahead(1);
        let _first = book(&svc, &contract, (starts_at, ends_at)).await;

        // The shared boundary instant belongs to the later slot only.
        let _second = book(
            &svc,
            &contract,
            (ends_at, ends_at + Duration::from_secs(3600)),
        )
        .await;
    }

    #[tokio::test]
    async fn completion_records_session_and_consumes_balance() {
        let svc = service();
        let contract = engage(&svc, 1).await;
        let appointment = book(&svc, &contract, hours_ahead(1)).await;
        let mut events = svc.subscribe();

        let workout_log_id = workout_log();
        let session = svc
            .execute(CompleteAppointment {
                appointment_id: appointment.id,
                workout_log_id,
            })
            .await
            .unwrap();
        assert_eq!(session.appointment_id, appointment.id);
        assert_eq!(session.workout_log_id, workout_log_id);

        let contract = contract_state(&svc, contract.id).await;
        assert_eq!(i32::from(contract.remaining_sessions), 0);
        assert!(contract.completed_at.is_some());

        assert!(matches!(
            events.try_recv(),
            Ok(Event::SessionRecorded { .. }),
        ));
        assert!(matches!(
            events.try_recv(),
            Ok(Event::ContractCompleted { .. }),
        ));
    }

    #[tokio::test]
    async fn repeated_completion_reports_recorded_session() {
        use super::complete_appointment::ExecutionError as E;

        let svc = service();
        let contract = engage(&svc, 2).await;
        let appointment = book(&svc, &contract, hours_ahead(1)).await;

        let _session = svc
            .execute(CompleteAppointment {
                appointment_id: appointment.id,
                workout_log_id: workout_log(),
            })
            .await
            .unwrap();
        let err = svc
            .execute(CompleteAppointment {
                appointment_id: appointment.id,
                workout_log_id: workout_log(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), E::SessionAlreadyRecorded(..)));

        // The balance is consumed exactly once.
        let contract = contract_state(&svc, contract.id).await;
        assert_eq!(i32::from(contract.remaining_sessions), 1);
    }

    #[tokio::test]
    async fn workout_log_links_to_a_single_session() {
        use super::complete_appointment::ExecutionError as E;

        let svc = service();
        let contract = engage(&svc, 2).await;
        let first = book(&svc, &contract, hours_ahead(1)).await;
        let second = book(&svc, &contract, hours_ahead(3)).await;

        let workout_log_id = workout_log();
        let _session = svc
            .execute(CompleteAppointment {
                appointment_id: first.id,
                workout_log_id,
            })
            .await
            .unwrap();
        let err = svc
            .execute(CompleteAppointment {
                appointment_id: second.id,
                workout_log_id,
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), E::WorkoutLogAlreadyLinked(..)));
    }

    #[tokio::test]
    async fn no_show_preserves_balance() {
        use super::{
            complete_appointment::ExecutionError as CompleteError,
            mark_appointment_no_show::ExecutionError as E,
        };

        let svc = service();
        let contract = engage(&svc, 3).await;

        let future = book(&svc, &contract, hours_ahead(1)).await;
        let err = svc
            .execute(MarkAppointmentNoShow {
                appointment_id: future.id,
            })
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), E::NotElapsed(..)));

        let elapsed = book(&svc, &contract, hours_ago(2)).await;
        let marked = svc
            .execute(MarkAppointmentNoShow {
                appointment_id: elapsed.id,
            })
            .await
            .unwrap();
        assert!(marked.no_show_at.is_some());

        // The member is not charged for the no-show.
        let contract = contract_state(&svc, contract.id).await;
        assert_eq!(i32::from(contract.remaining_sessions), 3);

        // A no-show cannot be completed anymore.
        let err = svc
            .execute(CompleteAppointment {
                appointment_id: elapsed.id,
                workout_log_id: workout_log(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), CompleteError::NotScheduled(..)));
    }

    #[tokio::test]
    async fn rescheduling_does_not_conflict_with_itself() {
        let svc = service();
        let contract = engage(&svc, 2).await;

        let (starts_at, ends_at) = hours_ahead(1);
        let appointment = book(&svc, &contract, (starts_at, ends_at)).await;

        // Overlaps the old slot, which must not count as a conflict.
        let half_hour = Duration::from_secs(30 * 60);
        let moved = svc
            .execute(RescheduleAppointment {
                appointment_id: appointment.id,
                starts_at: starts_at + half_hour,
                ends_at: ends_at + half_hour,
            })
            .await
            .unwrap();
        assert_eq!(moved.slot.starts_at(), starts_at + half_hour);
        assert_eq!(moved.slot.ends_at(), ends_at + half_hour);
    }

    #[tokio::test]
    async fn rescheduling_into_occupied_slot_is_refused() {
        use super::reschedule_appointment::ExecutionError as E;

        let svc = service();
        let contract = engage(&svc, 3).await;

        let (starts_at, ends_at) = hours_ahead(1);
        let _occupied = book(&svc, &contract, (starts_at, ends_at)).await;
        let moved = book(&svc, &contract, hours_ahead(4)).await;

        let err = svc
            .execute(RescheduleAppointment {
                appointment_id: moved.id,
                starts_at,
                ends_at,
            })
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), E::SlotConflict(..)));
    }

    #[tokio::test]
    async fn racing_bookings_admit_only_the_balance() {
        let svc = service();
        let contract = engage(&svc, 1).await;

        let (first, second) = tokio::join!(
            try_book(&svc, &contract, hours_ahead(1)),
            try_book(&svc, &contract, hours_ahead(3)),
        );

        assert!(
            first.is_ok() != second.is_ok(),
            "exactly one of the racing bookings must win",
        );
    }

    #[tokio::test]
    async fn racing_overlapping_bookings_admit_one() {
        use super::book_appointment::ExecutionError as E;

        let svc = service();
        let contract = engage(&svc, 5).await;

        let slot = hours_ahead(1);
        let (first, second) = tokio::join!(
            try_book(&svc, &contract, slot),
            try_book(&svc, &contract, slot),
        );

        let (won, lost) = match (first, second) {
            (Ok(a), Err(e)) | (Err(e), Ok(a)) => (a, e),
            (Ok(_), Ok(_)) => panic!("both overlapping bookings won"),
            (Err(_), Err(_)) => panic!("no overlapping booking won"),
        };
        assert_eq!(won.slot.starts_at(), slot.0);
        assert!(matches!(lost.as_ref(), E::SlotConflict(..)));
    }

    #[tokio::test]
    async fn cancelling_contract_cancels_scheduled_appointments() {
        use super::book_appointment::ExecutionError as E;

        let svc = service();
        let contract = engage(&svc, 3).await;
        let _first = book(&svc, &contract, hours_ahead(1)).await;
        let _second = book(&svc, &contract, hours_ahead(3)).await;

        let cancelled = svc
            .execute(CancelContract {
                contract_id: contract.id,
                actor_id: contract.member_id,
            })
            .await
            .unwrap();
        assert!(cancelled.cancelled_at.is_some());

        let appointments = svc
            .execute(query::appointments::ByUser::by(contract.member_id))
            .await
            .unwrap();
        assert_eq!(appointments.len(), 2);
        assert!(appointments.iter().all(|a| a.cancelled_at.is_some()));

        // Nothing can be booked under the cancelled `Contract`.
        let err = try_book(&svc, &contract, hours_ahead(5)).await.unwrap_err();
        assert!(matches!(err.as_ref(), E::NoSessionsRemaining(..)));
    }
}
