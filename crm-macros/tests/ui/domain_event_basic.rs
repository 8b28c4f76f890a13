use crm_domain::domain_event::DomainEvent;
use crm_macros::domain_event;

#[domain_event(version = 2)]
enum ContactEvent {
    Created { name: String },
    #[event(event_type = "contact.renamed", event_version = 3)]
    Renamed(String),
    Deleted,
}

fn main() {
    let created = ContactEvent::Created { name: "x".into() };
    assert_eq!(created.event_type(), "ContactEvent.Created");
    assert_eq!(created.event_version(), 2);

    let renamed = ContactEvent::Renamed("y".into());
    assert_eq!(renamed.event_type(), "contact.renamed");
    assert_eq!(renamed.event_version(), 3);

    assert_eq!(ContactEvent::Deleted.event_type(), "ContactEvent.Deleted");
    assert_eq!(ContactEvent::Deleted.clone(), ContactEvent::Deleted);
}
