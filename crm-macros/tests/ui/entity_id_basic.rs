use crm_domain::entity::EntityId;
use crm_macros::entity_id;
use uuid::Uuid;

#[entity_id]
struct OrderId(Uuid);

#[entity_id]
#[derive(PartialOrd, Ord)]
struct Sku(String);

fn main() {
    let id = OrderId::generate();
    let parsed: OrderId = id.to_string().parse().unwrap();
    assert_eq!(id, parsed);

    let raw: Uuid = id.clone().into();
    assert_eq!(&raw, id.value());

    let a = Sku::new("A-1".to_string());
    let b = Sku::from("B-1".to_string());
    assert!(a < b);
    assert_eq!(a.to_string(), "A-1");
}
