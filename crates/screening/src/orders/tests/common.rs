use std::sync::Arc;

use axum::http::header::COOKIE;
use axum::http::{HeaderMap, HeaderValue};
use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::access::{Action, Actor, Grant, PermissionSet, Resource, User};
use crate::catalog::{
    CollectionTab, Location, Requirement, RequirementPayload, Service, ServiceRequirement,
};
use crate::clock::FixedClock;
use crate::config::PortalConfig;
use crate::context::ServiceContext;
use crate::customers::Customer;
use crate::orders::{DraftOrder, Order, OrderStatus, Subject};
use crate::requirements::ServiceLocation;
use crate::store::{MemoryStore, Seed, SeedSession};

pub(super) const PORTAL_TOKEN: &str = "portal-session";
pub(super) const ADMIN_TOKEN: &str = "admin-session";
pub(super) const VIEWER_TOKEN: &str = "viewer-session";
pub(super) const READ_ONLY_PORTAL_TOKEN: &str = "read-only-portal-session";

/// A small catalog with two portal users (one read-only), one admin and one
/// catalog viewer.
pub(super) struct World {
    pub(super) store: Arc<MemoryStore>,
    pub(super) clock: Arc<FixedClock>,
    pub(super) context: Arc<ServiceContext<MemoryStore>>,
    pub(super) customer: Customer,
    pub(super) portal_user: User,
    pub(super) location: Location,
    pub(super) service: Service,
}

impl World {
    pub(super) fn actor(&self) -> Actor {
        Actor {
            user_id: self.portal_user.id,
            customer_id: self.customer.id,
        }
    }

    pub(super) fn pair(&self) -> ServiceLocation {
        ServiceLocation::new(self.service.id, self.location.id)
    }

    pub(super) fn draft(&self) -> DraftOrder {
        DraftOrder {
            items: vec![self.pair()],
            subject: Some(Subject::new("Grace", "Hopper")),
            notes: Some("  rush  ".to_string()),
        }
    }
}

pub(super) fn march_fifth() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).unwrap()
}

pub(super) fn customer_id() -> Uuid {
    Uuid::parse_str("abcd1234-0000-4000-8000-000000000001").expect("valid uuid")
}

pub(super) fn existing_order(customer_id: Uuid, number: &str, at: DateTime<Utc>) -> Order {
    Order {
        id: Uuid::new_v4(),
        order_number: number.to_string(),
        customer_id,
        user_id: Uuid::new_v4(),
        status: OrderStatus::Submitted,
        subject: Subject::new("Prior", "Order"),
        items: Vec::new(),
        notes: None,
        created_at: at,
        updated_at: at,
        updated_by: None,
        submitted_at: Some(at),
    }
}

pub(super) fn world() -> World {
    world_with_orders(|_| Vec::new())
}

pub(super) fn world_with_orders(orders: impl FnOnce(Uuid) -> Vec<Order>) -> World {
    let customer = Customer {
        id: customer_id(),
        name: "Acme Staffing".to_string(),
        master_account_id: None,
        billing_account_id: None,
        disabled: false,
    };
    let location = Location {
        id: Uuid::new_v4(),
        name: "United States".to_string(),
        code2: "US".to_string(),
        code3: "USA".to_string(),
        numeric: Some("840".to_string()),
        parent_id: None,
        disabled: false,
    };
    let service = Service {
        id: Uuid::new_v4(),
        name: "County criminal".to_string(),
        category: "criminal".to_string(),
        disabled: false,
    };
    let county = Requirement {
        id: Uuid::new_v4(),
        name: "county".to_string(),
        disabled: false,
        payload: RequirementPayload::Field {
            data_type: "text".to_string(),
            label: "County".to_string(),
            collection_tab: CollectionTab::Search,
            required_by_default: true,
            instructions: None,
        },
    };
    let portal_user = User {
        id: Uuid::new_v4(),
        email: "hr@acme.example".to_string(),
        name: "Acme HR".to_string(),
        customer_id: Some(customer.id),
        permissions: PermissionSet::new().with(
            Resource::Orders,
            Grant::actions([Action::View, Action::Create, Action::Edit]),
        ),
    };
    let read_only_portal_user = User {
        id: Uuid::new_v4(),
        email: "audit@acme.example".to_string(),
        name: "Acme Audit".to_string(),
        customer_id: Some(customer.id),
        permissions: PermissionSet::new().with(Resource::Orders, Grant::actions([Action::View])),
    };
    let admin = User {
        id: Uuid::new_v4(),
        email: "admin@screening.example".to_string(),
        name: "Admin".to_string(),
        customer_id: None,
        permissions: PermissionSet::new()
            .with(Resource::Services, Grant::All)
            .with(Resource::Countries, Grant::All)
            .with(Resource::Customers, Grant::All),
    };
    let viewer = User {
        id: Uuid::new_v4(),
        email: "viewer@screening.example".to_string(),
        name: "Viewer".to_string(),
        customer_id: None,
        permissions: PermissionSet::new()
            .with(Resource::Countries, Grant::actions([Action::View])),
    };

    let seed = Seed {
        locations: vec![location.clone()],
        services: vec![service.clone()],
        requirements: vec![county.clone()],
        service_requirements: vec![ServiceRequirement {
            id: Uuid::new_v4(),
            service_id: service.id,
            requirement_id: county.id,
            display_order: 1,
            is_required: None,
        }],
        customers: vec![customer.clone()],
        users: vec![
            portal_user.clone(),
            read_only_portal_user.clone(),
            admin.clone(),
            viewer.clone(),
        ],
        sessions: vec![
            SeedSession {
                token: PORTAL_TOKEN.to_string(),
                user_id: portal_user.id,
            },
            SeedSession {
                token: ADMIN_TOKEN.to_string(),
                user_id: admin.id,
            },
            SeedSession {
                token: VIEWER_TOKEN.to_string(),
                user_id: viewer.id,
            },
            SeedSession {
                token: READ_ONLY_PORTAL_TOKEN.to_string(),
                user_id: read_only_portal_user.id,
            },
        ],
        orders: orders(customer.id),
        ..Seed::default()
    };

    let store = Arc::new(MemoryStore::from_seed(seed).expect("seed loads"));
    let clock = Arc::new(FixedClock::new(march_fifth()));
    let context = Arc::new(ServiceContext::new(
        Arc::clone(&store),
        clock.clone(),
        &PortalConfig::default(),
    ));

    World {
        store,
        clock,
        context,
        customer,
        portal_user,
        location,
        service,
    }
}

pub(super) fn session(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        COOKIE,
        HeaderValue::from_str(&format!("session_token={token}")).expect("cookie header"),
    );
    headers
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
