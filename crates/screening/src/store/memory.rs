use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use super::seed::{Seed, SeedError, SeedSession};
use super::RepositoryError;
use crate::access::{SessionRepository, User};
use crate::catalog::{
    CatalogRepository, Location, LocationMapping, Requirement, Service, ServiceRequirement,
};
use crate::customers::{Customer, CustomerRepository};
use crate::orders::numbering::within_day;
use crate::orders::{Order, OrderRepository, OrderStatus};

#[derive(Debug, Default)]
struct Tables {
    locations: Vec<Location>,
    services: Vec<Service>,
    requirements: Vec<Requirement>,
    service_requirements: Vec<ServiceRequirement>,
    location_mappings: Vec<LocationMapping>,
    customers: Vec<Customer>,
    users: Vec<User>,
    sessions: HashMap<String, Uuid>,
    session_order: Vec<String>,
    orders: Vec<Order>,
    order_sequences: HashMap<(Uuid, NaiveDate), u32>,
}

/// Process-local store backing every repository trait behind one lock.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    /// Builds a store from a dataset, enforcing location parent and code integrity.
    pub fn from_seed(seed: Seed) -> Result<Self, SeedError> {
        let Seed {
            locations,
            services,
            requirements,
            service_requirements,
            location_mappings,
            customers,
            users,
            sessions,
            orders,
        } = seed;

        let location_ids: HashSet<Uuid> = locations.iter().map(|location| location.id).collect();
        let mut codes = HashSet::new();
        for location in &locations {
            if let Some(parent_id) = location.parent_id {
                if !location_ids.contains(&parent_id) {
                    return Err(SeedError::DanglingParent {
                        location_id: location.id,
                        parent_id,
                    });
                }
            }
            for code in [&location.code2, &location.code3] {
                if !codes.insert(code.to_ascii_uppercase()) {
                    return Err(SeedError::DuplicateLocationCode(code.clone()));
                }
            }
        }

        let user_ids: HashSet<Uuid> = users.iter().map(|user| user.id).collect();
        let mut session_map = HashMap::new();
        let mut session_order = Vec::new();
        for SeedSession { token, user_id } in sessions {
            if !user_ids.contains(&user_id) {
                return Err(SeedError::UnknownSessionUser(user_id));
            }
            if session_map.insert(token.clone(), user_id).is_none() {
                session_order.push(token);
            }
        }

        let tables = Tables {
            locations,
            services,
            requirements,
            service_requirements,
            location_mappings,
            customers,
            users,
            sessions: session_map,
            session_order,
            orders,
            order_sequences: HashMap::new(),
        };

        Ok(Self {
            tables: Arc::new(Mutex::new(tables)),
        })
    }

    /// Current contents in seed form, for maintenance write-back.
    pub fn snapshot(&self) -> Result<Seed, RepositoryError> {
        let tables = self.tables()?;
        Ok(Seed {
            locations: tables.locations.clone(),
            services: tables.services.clone(),
            requirements: tables.requirements.clone(),
            service_requirements: tables.service_requirements.clone(),
            location_mappings: tables.location_mappings.clone(),
            customers: tables.customers.clone(),
            users: tables.users.clone(),
            sessions: tables
                .session_order
                .iter()
                .filter_map(|token| {
                    tables.sessions.get(token).map(|user_id| SeedSession {
                        token: token.clone(),
                        user_id: *user_id,
                    })
                })
                .collect(),
            orders: tables.orders.clone(),
        })
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, RepositoryError> {
        self.tables
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store lock poisoned".to_string()))
    }
}

impl CatalogRepository for MemoryStore {
    fn location(&self, id: &Uuid) -> Result<Option<Location>, RepositoryError> {
        let tables = self.tables()?;
        Ok(tables.locations.iter().find(|loc| loc.id == *id).cloned())
    }

    fn locations(&self) -> Result<Vec<Location>, RepositoryError> {
        Ok(self.tables()?.locations.clone())
    }

    fn location_by_code(&self, code: &str) -> Result<Option<Location>, RepositoryError> {
        let tables = self.tables()?;
        Ok(tables
            .locations
            .iter()
            .find(|location| location.has_code(code))
            .cloned())
    }

    fn insert_location(&self, location: Location) -> Result<Location, RepositoryError> {
        let mut tables = self.tables()?;
        let collides = tables.locations.iter().any(|existing| {
            existing.id == location.id
                || existing.has_code(&location.code2)
                || existing.has_code(&location.code3)
        });
        if collides {
            return Err(RepositoryError::Conflict);
        }
        if let Some(parent_id) = location.parent_id {
            if !tables.locations.iter().any(|loc| loc.id == parent_id) {
                return Err(RepositoryError::NotFound);
            }
        }
        tables.locations.push(location.clone());
        Ok(location)
    }

    fn toggle_location_disabled(&self, id: &Uuid) -> Result<Location, RepositoryError> {
        let mut tables = self.tables()?;
        let location = tables
            .locations
            .iter_mut()
            .find(|location| location.id == *id)
            .ok_or(RepositoryError::NotFound)?;
        location.disabled = !location.disabled;
        Ok(location.clone())
    }

    fn service(&self, id: &Uuid) -> Result<Option<Service>, RepositoryError> {
        let tables = self.tables()?;
        Ok(tables.services.iter().find(|svc| svc.id == *id).cloned())
    }

    fn services(&self) -> Result<Vec<Service>, RepositoryError> {
        Ok(self.tables()?.services.clone())
    }

    fn toggle_service_disabled(&self, id: &Uuid) -> Result<Service, RepositoryError> {
        let mut tables = self.tables()?;
        let service = tables
            .services
            .iter_mut()
            .find(|service| service.id == *id)
            .ok_or(RepositoryError::NotFound)?;
        service.disabled = !service.disabled;
        Ok(service.clone())
    }

    fn requirement(&self, id: &Uuid) -> Result<Option<Requirement>, RepositoryError> {
        let tables = self.tables()?;
        Ok(tables.requirements.iter().find(|req| req.id == *id).cloned())
    }

    fn service_requirements(
        &self,
        service_id: &Uuid,
    ) -> Result<Vec<ServiceRequirement>, RepositoryError> {
        let tables = self.tables()?;
        let mut links: Vec<ServiceRequirement> = tables
            .service_requirements
            .iter()
            .filter(|link| link.service_id == *service_id)
            .cloned()
            .collect();
        // stable sort keeps creation order between equal display orders
        links.sort_by_key(|link| link.display_order);
        Ok(links)
    }

    fn all_service_requirements(&self) -> Result<Vec<ServiceRequirement>, RepositoryError> {
        Ok(self.tables()?.service_requirements.clone())
    }

    fn location_mapping(
        &self,
        service_id: &Uuid,
        location_id: &Uuid,
        requirement_id: &Uuid,
    ) -> Result<Option<LocationMapping>, RepositoryError> {
        let tables = self.tables()?;
        Ok(tables
            .location_mappings
            .iter()
            .find(|mapping| {
                mapping.service_id == *service_id
                    && mapping.location_id == *location_id
                    && mapping.requirement_id == *requirement_id
            })
            .cloned())
    }
}

impl CustomerRepository for MemoryStore {
    fn customer(&self, id: &Uuid) -> Result<Option<Customer>, RepositoryError> {
        let tables = self.tables()?;
        Ok(tables.customers.iter().find(|c| c.id == *id).cloned())
    }

    fn customers(&self) -> Result<Vec<Customer>, RepositoryError> {
        Ok(self.tables()?.customers.clone())
    }

    fn toggle_customer_disabled(&self, id: &Uuid) -> Result<Customer, RepositoryError> {
        let mut tables = self.tables()?;
        let customer = tables
            .customers
            .iter_mut()
            .find(|customer| customer.id == *id)
            .ok_or(RepositoryError::NotFound)?;
        customer.disabled = !customer.disabled;
        Ok(customer.clone())
    }

    fn clear_master_account(&self, id: &Uuid) -> Result<Customer, RepositoryError> {
        let mut tables = self.tables()?;
        let customer = tables
            .customers
            .iter_mut()
            .find(|customer| customer.id == *id)
            .ok_or(RepositoryError::NotFound)?;
        customer.master_account_id = None;
        Ok(customer.clone())
    }
}

impl OrderRepository for MemoryStore {
    fn insert_order(&self, order: Order) -> Result<Order, RepositoryError> {
        let mut tables = self.tables()?;
        let taken = tables
            .orders
            .iter()
            .any(|existing| existing.id == order.id || existing.order_number == order.order_number);
        if taken {
            return Err(RepositoryError::Conflict);
        }
        tables.orders.push(order.clone());
        Ok(order)
    }

    fn order(&self, id: &Uuid) -> Result<Option<Order>, RepositoryError> {
        let tables = self.tables()?;
        Ok(tables.orders.iter().find(|order| order.id == *id).cloned())
    }

    fn orders_for_customer(&self, customer_id: &Uuid) -> Result<Vec<Order>, RepositoryError> {
        let tables = self.tables()?;
        let mut orders: Vec<Order> = tables
            .orders
            .iter()
            .filter(|order| order.customer_id == *customer_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    fn next_order_sequence(
        &self,
        customer_id: &Uuid,
        day: NaiveDate,
    ) -> Result<u32, RepositoryError> {
        let mut tables = self.tables()?;
        let existing = tables
            .orders
            .iter()
            .filter(|order| order.customer_id == *customer_id && within_day(order.created_at, day))
            .count();
        let existing = u32::try_from(existing).unwrap_or(u32::MAX);

        let counter = tables
            .order_sequences
            .entry((*customer_id, day))
            .or_insert(0);
        *counter = (*counter).max(existing).saturating_add(1);
        Ok(*counter)
    }

    fn replace_draft(&self, order: Order) -> Result<Order, RepositoryError> {
        let mut tables = self.tables()?;
        let slot = tables
            .orders
            .iter_mut()
            .find(|stored| {
                stored.id == order.id
                    && stored.customer_id == order.customer_id
                    && stored.status == OrderStatus::Draft
            })
            .ok_or(RepositoryError::NotFound)?;
        let stored = Order {
            status: OrderStatus::Draft,
            order_number: slot.order_number.clone(),
            created_at: slot.created_at,
            ..order
        };
        *slot = stored.clone();
        Ok(stored)
    }

    fn submit_draft(
        &self,
        id: &Uuid,
        customer_id: &Uuid,
        submitted_by: &Uuid,
        at: DateTime<Utc>,
    ) -> Result<Order, RepositoryError> {
        let mut tables = self.tables()?;
        let order = tables
            .orders
            .iter_mut()
            .find(|order| {
                order.id == *id
                    && order.customer_id == *customer_id
                    && order.status == OrderStatus::Draft
            })
            .ok_or(RepositoryError::NotFound)?;
        order.status = OrderStatus::Submitted;
        order.updated_at = at;
        order.updated_by = Some(*submitted_by);
        order.submitted_at = Some(at);
        Ok(order.clone())
    }
}

impl SessionRepository for MemoryStore {
    fn user_for_session(&self, token: &str) -> Result<Option<User>, RepositoryError> {
        let tables = self.tables()?;
        Ok(tables
            .sessions
            .get(token)
            .and_then(|user_id| tables.users.iter().find(|user| user.id == *user_id))
            .cloned())
    }
}
