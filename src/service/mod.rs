//! Operations exposed by the controllers.
//!
//! Each operation receives the authenticated [`Requester`](crate::access::Requester),
//! scopes or checks it with [`can_access`](crate::access::can_access) and rejects with a
//! classified [`ServiceError`](crate::error::ServiceError).

use crate::access::Resource;
use crate::clock::Clock;
use crate::model::Proposal;
use crate::store::Store;
use chrono::NaiveDate;

mod applications;
mod directory;
mod proposals;

pub use self::proposals::ProposalFilters;

pub struct Service {
    store: Store,
    clock: Clock,
}

impl Service {
    pub fn new(store: Store, clock: Clock) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }
}

fn proposal_resource(proposal: &Proposal, today: NaiveDate) -> Resource<'_> {
    Resource::Proposal {
        supervisor_id: &proposal.supervisor_id,
        programmes: &proposal.programmes,
        expired: proposal.is_expired(today),
    }
}
