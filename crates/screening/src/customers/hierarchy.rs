use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use super::domain::Customer;
use super::repository::CustomerRepository;
use crate::store::RepositoryError;

/// Structural problems in the one-level master/subaccount tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HierarchyViolation {
    #[serde(rename_all = "camelCase")]
    SelfReference { customer_id: Uuid },
    #[serde(rename_all = "camelCase")]
    NestedSubaccount {
        customer_id: Uuid,
        master_account_id: Uuid,
    },
}

impl fmt::Display for HierarchyViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HierarchyViolation::SelfReference { customer_id } => {
                write!(f, "customer {customer_id} is its own master account")
            }
            HierarchyViolation::NestedSubaccount {
                customer_id,
                master_account_id,
            } => write!(
                f,
                "customer {customer_id} points at subaccount {master_account_id} as its master"
            ),
        }
    }
}

/// Subaccounts whose master account no longer exists.
pub fn orphaned_subaccounts(customers: &[Customer]) -> Vec<Uuid> {
    let known: HashMap<Uuid, &Customer> = customers
        .iter()
        .map(|customer| (customer.id, customer))
        .collect();

    customers
        .iter()
        .filter(|customer| {
            customer
                .master_account_id
                .is_some_and(|master| !known.contains_key(&master))
        })
        .map(|customer| customer.id)
        .collect()
}

/// Links that break the one-level-deep rule. Orphans are not reported here.
pub fn hierarchy_violations(customers: &[Customer]) -> Vec<HierarchyViolation> {
    let known: HashMap<Uuid, &Customer> = customers
        .iter()
        .map(|customer| (customer.id, customer))
        .collect();

    let mut violations = Vec::new();
    for customer in customers {
        let Some(master_id) = customer.master_account_id else {
            continue;
        };
        if master_id == customer.id {
            violations.push(HierarchyViolation::SelfReference {
                customer_id: customer.id,
            });
            continue;
        }
        if let Some(master) = known.get(&master_id) {
            if !master.is_master() {
                violations.push(HierarchyViolation::NestedSubaccount {
                    customer_id: customer.id,
                    master_account_id: master_id,
                });
            }
        }
    }
    violations
}

/// Nulls dangling master references, converting those subaccounts back
/// into master accounts. Returns the converted customer ids.
pub fn reconcile_orphans<R>(repository: &R) -> Result<Vec<Uuid>, RepositoryError>
where
    R: CustomerRepository + ?Sized,
{
    let customers = repository.customers()?;
    let orphans = orphaned_subaccounts(&customers);

    for customer_id in &orphans {
        let converted = repository.clear_master_account(customer_id)?;
        info!(customer = %converted.id, name = %converted.name, "converted orphaned subaccount to master account");
    }

    Ok(orphans)
}
