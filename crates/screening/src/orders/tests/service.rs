use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use super::common::*;
use crate::catalog::{
    CatalogRepository, Location, LocationMapping, Requirement, Service, ServiceRequirement,
};
use crate::clock::FixedClock;
use crate::customers::{Customer, CustomerRepository};
use crate::orders::{
    DraftOrder, Order, OrderError, OrderRepository, OrderService, OrderStatus, Subject,
};
use crate::requirements::{ResolveError, ServiceLocation};
use crate::store::{MemoryStore, RepositoryError};

#[test]
fn third_order_of_the_day_gets_sequence_three() {
    let world = world_with_orders(|customer_id| {
        vec![
            existing_order(customer_id, "20240305-1ZS-0001", march_fifth() - Duration::hours(3)),
            existing_order(customer_id, "20240305-1ZS-0002", march_fifth() - Duration::hours(1)),
        ]
    });

    let order = world
        .context
        .orders()
        .create_draft(&world.actor(), world.draft())
        .expect("draft created");

    assert_eq!(order.order_number, "20240305-1ZS-0003");
    assert_eq!(order.status, OrderStatus::Draft);
    assert_eq!(order.notes.as_deref(), Some("rush"));
    assert_eq!(order.created_at, march_fifth());
}

#[test]
fn sequence_resets_on_the_next_utc_day() {
    let world = world();
    let orders = world.context.orders();

    let first = orders
        .create_draft(&world.actor(), world.draft())
        .expect("first draft");
    assert!(first.order_number.ends_with("-0001"));

    world
        .clock
        .set(Utc.with_ymd_and_hms(2024, 3, 6, 0, 0, 0).unwrap());
    let next_day = orders
        .create_draft(&world.actor(), world.draft())
        .expect("next-day draft");
    assert_eq!(next_day.order_number, "20240306-1ZS-0001");
}

#[test]
fn concurrent_drafts_receive_distinct_numbers() {
    let world = world();
    let actor = world.actor();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let context = Arc::clone(&world.context);
            let draft = world.draft();
            std::thread::spawn(move || {
                context
                    .orders()
                    .create_draft(&actor, draft)
                    .expect("draft created")
                    .order_number
            })
        })
        .collect();

    let mut numbers: Vec<String> = handles
        .into_iter()
        .map(|handle| handle.join().expect("thread completes"))
        .collect();
    numbers.sort();
    numbers.dedup();
    assert_eq!(numbers.len(), 8);
}

#[test]
fn drafts_require_items_and_subject_names() {
    let world = world();
    let orders = world.context.orders();

    let error = orders
        .create_draft(
            &world.actor(),
            DraftOrder {
                items: Vec::new(),
                ..world.draft()
            },
        )
        .expect_err("empty items rejected");
    assert!(matches!(error, OrderError::EmptyItems));

    let error = orders
        .create_draft(
            &world.actor(),
            DraftOrder {
                subject: Some(Subject::new("Grace", "   ")),
                ..world.draft()
            },
        )
        .expect_err("blank last name rejected");
    match error {
        OrderError::MissingSubjectFields(fields) => assert_eq!(fields, vec!["lastName"]),
        other => panic!("unexpected error: {other:?}"),
    }

    let error = orders
        .create_draft(
            &world.actor(),
            DraftOrder {
                subject: None,
                ..world.draft()
            },
        )
        .expect_err("missing subject rejected");
    assert!(matches!(error, OrderError::MissingSubjectFields(fields) if fields.len() == 2));
}

#[test]
fn drafts_reject_unknown_pairs() {
    let world = world();
    let error = world
        .context
        .orders()
        .create_draft(
            &world.actor(),
            DraftOrder {
                items: vec![ServiceLocation::new(world.service.id, Uuid::new_v4())],
                ..world.draft()
            },
        )
        .expect_err("unknown location rejected");
    assert!(matches!(
        error,
        OrderError::Resolve(ResolveError::NotFound { .. })
    ));
}

#[test]
fn disabled_customers_cannot_create_drafts() {
    let world = world();
    world
        .store
        .toggle_customer_disabled(&world.customer.id)
        .expect("customer toggled");

    let error = world
        .context
        .orders()
        .create_draft(&world.actor(), world.draft())
        .expect_err("disabled customer rejected");
    assert!(matches!(error, OrderError::CustomerDisabled(_)));
}

#[test]
fn submit_succeeds_once_then_reports_not_found_or_submitted() {
    let world = world();
    let orders = world.context.orders();
    let draft = orders
        .create_draft(&world.actor(), world.draft())
        .expect("draft created");

    world.clock.advance(Duration::minutes(5));
    let submitted = orders.submit(&world.actor(), &draft.id).expect("submitted");
    assert_eq!(submitted.status, OrderStatus::Submitted);
    assert_eq!(submitted.submitted_at, Some(march_fifth() + Duration::minutes(5)));
    assert_eq!(submitted.updated_by, Some(world.portal_user.id));

    let error = orders
        .submit(&world.actor(), &draft.id)
        .expect_err("second submit rejected");
    assert!(matches!(error, OrderError::NotFoundOrSubmitted));
    assert_eq!(error.to_string(), "Order not found or already submitted");

    let error = orders
        .update_draft(&world.actor(), &draft.id, world.draft())
        .expect_err("submitted orders are immutable");
    assert!(matches!(error, OrderError::NotFoundOrSubmitted));

    let empty = DraftOrder {
        items: Vec::new(),
        subject: None,
        notes: None,
    };
    let error = orders
        .update_draft(&world.actor(), &draft.id, empty)
        .expect_err("submitted order checked before payload");
    assert!(matches!(error, OrderError::NotFoundOrSubmitted));
}

#[test]
fn update_replaces_contents_but_keeps_number() {
    let world = world();
    let orders = world.context.orders();
    let draft = orders
        .create_draft(&world.actor(), world.draft())
        .expect("draft created");

    world.clock.advance(Duration::minutes(10));
    let updated = orders
        .update_draft(
            &world.actor(),
            &draft.id,
            DraftOrder {
                subject: Some(Subject::new("Grace", "Brewster")),
                notes: Some("   ".to_string()),
                ..world.draft()
            },
        )
        .expect("draft updated");

    assert_eq!(updated.order_number, draft.order_number);
    assert_eq!(updated.created_at, draft.created_at);
    assert_eq!(updated.subject.last_name, "Brewster");
    assert_eq!(updated.notes, None);
    assert_eq!(updated.updated_at, march_fifth() + Duration::minutes(10));
}

#[test]
fn other_customers_cannot_see_or_submit_orders() {
    let world = world();
    let orders = world.context.orders();
    let draft = orders
        .create_draft(&world.actor(), world.draft())
        .expect("draft created");

    let mut stranger = world.actor();
    stranger.customer_id = Uuid::new_v4();

    assert!(matches!(
        orders.get(&stranger, &draft.id),
        Err(OrderError::NotFound)
    ));
    assert!(matches!(
        orders.submit(&stranger, &draft.id),
        Err(OrderError::NotFoundOrSubmitted)
    ));
    assert!(orders.list(&stranger).expect("list").is_empty());
}

#[test]
fn stats_count_by_status_and_today() {
    let world = world_with_orders(|customer_id| {
        vec![existing_order(
            customer_id,
            "20240301-1ZS-0001",
            Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
        )]
    });
    let orders = world.context.orders();
    orders
        .create_draft(&world.actor(), world.draft())
        .expect("draft created");

    let stats = orders.stats(&world.actor()).expect("stats");
    assert_eq!(stats.total, 2);
    assert_eq!(stats.draft, 1);
    assert_eq!(stats.submitted, 1);
    assert_eq!(stats.created_today, 1);

    let listed = orders.list(&world.actor()).expect("list");
    assert_eq!(listed[0].created_at, march_fifth());
}

/// Store whose order inserts always collide, to exercise the retry budget.
struct CollidingStore {
    inner: MemoryStore,
}

impl CatalogRepository for CollidingStore {
    fn location(&self, id: &Uuid) -> Result<Option<Location>, RepositoryError> {
        self.inner.location(id)
    }
    fn locations(&self) -> Result<Vec<Location>, RepositoryError> {
        self.inner.locations()
    }
    fn location_by_code(
        &self,
        code: &str,
    ) -> Result<Option<Location>, RepositoryError> {
        self.inner.location_by_code(code)
    }
    fn insert_location(
        &self,
        location: Location,
    ) -> Result<Location, RepositoryError> {
        self.inner.insert_location(location)
    }
    fn toggle_location_disabled(
        &self,
        id: &Uuid,
    ) -> Result<Location, RepositoryError> {
        self.inner.toggle_location_disabled(id)
    }
    fn service(&self, id: &Uuid) -> Result<Option<Service>, RepositoryError> {
        self.inner.service(id)
    }
    fn services(&self) -> Result<Vec<Service>, RepositoryError> {
        self.inner.services()
    }
    fn toggle_service_disabled(
        &self,
        id: &Uuid,
    ) -> Result<Service, RepositoryError> {
        self.inner.toggle_service_disabled(id)
    }
    fn requirement(
        &self,
        id: &Uuid,
    ) -> Result<Option<Requirement>, RepositoryError> {
        self.inner.requirement(id)
    }
    fn service_requirements(
        &self,
        service_id: &Uuid,
    ) -> Result<Vec<ServiceRequirement>, RepositoryError> {
        self.inner.service_requirements(service_id)
    }
    fn all_service_requirements(
        &self,
    ) -> Result<Vec<ServiceRequirement>, RepositoryError> {
        self.inner.all_service_requirements()
    }
    fn location_mapping(
        &self,
        service_id: &Uuid,
        location_id: &Uuid,
        requirement_id: &Uuid,
    ) -> Result<Option<LocationMapping>, RepositoryError> {
        self.inner
            .location_mapping(service_id, location_id, requirement_id)
    }
}

impl CustomerRepository for CollidingStore {
    fn customer(&self, id: &Uuid) -> Result<Option<Customer>, RepositoryError> {
        self.inner.customer(id)
    }
    fn customers(&self) -> Result<Vec<Customer>, RepositoryError> {
        self.inner.customers()
    }
    fn toggle_customer_disabled(
        &self,
        id: &Uuid,
    ) -> Result<Customer, RepositoryError> {
        self.inner.toggle_customer_disabled(id)
    }
    fn clear_master_account(
        &self,
        id: &Uuid,
    ) -> Result<Customer, RepositoryError> {
        self.inner.clear_master_account(id)
    }
}

impl OrderRepository for CollidingStore {
    fn insert_order(&self, _order: Order) -> Result<Order, RepositoryError> {
        Err(RepositoryError::Conflict)
    }
    fn order(&self, id: &Uuid) -> Result<Option<Order>, RepositoryError> {
        self.inner.order(id)
    }
    fn orders_for_customer(
        &self,
        customer_id: &Uuid,
    ) -> Result<Vec<Order>, RepositoryError> {
        self.inner.orders_for_customer(customer_id)
    }
    fn next_order_sequence(
        &self,
        customer_id: &Uuid,
        day: NaiveDate,
    ) -> Result<u32, RepositoryError> {
        self.inner.next_order_sequence(customer_id, day)
    }
    fn replace_draft(&self, order: Order) -> Result<Order, RepositoryError> {
        self.inner.replace_draft(order)
    }
    fn submit_draft(
        &self,
        id: &Uuid,
        customer_id: &Uuid,
        submitted_by: &Uuid,
        at: DateTime<Utc>,
    ) -> Result<Order, RepositoryError> {
        self.inner.submit_draft(id, customer_id, submitted_by, at)
    }
}

#[test]
fn exhausted_retry_budget_is_reported() {
    let world = world();
    let store = Arc::new(CollidingStore {
        inner: (*world.store).clone(),
    });
    let service = OrderService::new(store, Arc::new(FixedClock::new(march_fifth())))
        .with_number_retries(2);

    let error = service
        .create_draft(&world.actor(), world.draft())
        .expect_err("collisions exhaust retries");
    assert!(matches!(error, OrderError::NumberExhausted(2)));
}
