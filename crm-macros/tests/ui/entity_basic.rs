use chrono::{TimeZone, Utc};
use crm_domain::audit::{Audit, AuditStamp, Auditable, UserId};
use crm_domain::domain_event::{EventLedger, EventSource};
use crm_domain::entity::{Entity, EntityId};
use crm_macros::{domain_event, entity, entity_id};
use uuid::Uuid;

#[entity_id]
struct AccountId(Uuid);

#[domain_event]
enum AccountEvent {
    Opened { name: String },
    Closed,
}

#[entity(id = AccountId, event = AccountEvent)]
#[derive(PartialEq)]
struct Account {
    name: String,
}

fn main() {
    let stamp = AuditStamp::new(
        UserId::new("u-1".to_string()),
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    );
    let id = AccountId::generate();
    let mut a = Account {
        id: id.clone(),
        audit: Audit::new(stamp.clone()),
        events: EventLedger::new(),
        name: "a".into(),
    };
    let b = Account {
        id: id.clone(),
        audit: Audit::new(stamp),
        events: EventLedger::new(),
        name: "b".into(),
    };

    // 相等性仅由标识决定
    assert!(a == b);
    assert_eq!(a.id(), &id);
    assert!(a.is_active());

    a.add_domain_event(AccountEvent::Opened { name: a.name.clone() })
        .unwrap();
    a.add_domain_event(AccountEvent::Closed).unwrap();
    assert_eq!(a.domain_events().len(), 2);
    assert_eq!(a.take_domain_events().len(), 2);
    assert!(a.domain_events().is_empty());
    let _ = format!("{a:?}");
}
