use crm_domain::audit::{Audit, AuditStamp};
use crm_domain::domain_event::EventLedger;
use crm_domain::entity::EntityId;
use crm_domain::provider::{Clock, CurrentUser};
use crm_macros::{domain_event, entity, entity_id};
use std::sync::Arc;
use uuid::Uuid;

#[entity_id]
pub struct CompanyId(Uuid);

#[entity_id]
pub struct PersonId(Uuid);

#[domain_event]
pub enum CompanyEvent {
    #[event(event_type = "company.registered")]
    Registered { name: String },
    #[event(event_type = "company.renamed")]
    Renamed { from: String, to: String },
}

#[domain_event]
pub enum PersonEvent {
    #[event(event_type = "person.joined")]
    Joined { company_id: CompanyId, email: String },
}

#[entity(id = CompanyId, event = CompanyEvent)]
pub struct Company {
    pub name: String,
    pub website: Option<String>,
}

impl Company {
    pub fn register(name: String, website: Option<String>, stamp: AuditStamp) -> Self {
        Self {
            id: CompanyId::generate(),
            audit: Audit::new(stamp),
            events: EventLedger::new(),
            name,
            website,
        }
    }
}

#[entity(id = PersonId, event = PersonEvent)]
pub struct Person {
    pub company_id: CompanyId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl Person {
    pub fn join(
        company_id: CompanyId,
        first_name: String,
        last_name: String,
        email: String,
        stamp: AuditStamp,
    ) -> Self {
        Self {
            id: PersonId::generate(),
            audit: Audit::new(stamp),
            events: EventLedger::new(),
            company_id,
            first_name,
            last_name,
            email,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// 处理器共享的协作者
pub struct Services {
    pub companies: Arc<crm_domain::memory::InMemoryRepository<Company>>,
    pub people: Arc<crm_domain::memory::InMemoryRepository<Person>>,
    pub clock: Arc<dyn Clock>,
    pub user: Arc<dyn CurrentUser>,
}

impl Services {
    pub fn stamp(&self) -> AuditStamp {
        AuditStamp::capture(self.clock.as_ref(), self.user.as_ref())
    }
}
