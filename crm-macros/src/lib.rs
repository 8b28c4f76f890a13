//! CRM 核心过程宏（crm-macros）
//!
//! - `#[entity]`：为结构体注入标识、审计字段与事件台账，并实现
//!   `Entity` / `Auditable` / `EventSource` 以及基于标识的相等性；
//! - `#[entity_id]`：为单字段 tuple struct 生成标识类型所需的派生与转换；
//! - `#[domain_event]`：为事件枚举实现 `DomainEvent`。
//!
//! 生成代码通过 `::crm_domain` 路径引用领域层类型。
//!
use proc_macro::TokenStream;

mod derive_utils;
mod domain_event;
mod entity;
mod entity_id;
mod field_utils;

/// 实体宏
///
/// ```ignore
/// #[entity(id = CompanyId, event = CompanyEvent)]
/// #[derive(Clone)]
/// pub struct Company {
///     name: String,
/// }
/// ```
///
/// - 若缺失则追加字段 `id`、`audit`、`events`，并置于字段最前；
/// - 参数：`id`（默认 `String`）、`event`（必填）、`debug`（默认 `true`，为 `false` 时不派生 Debug）；
/// - 用户手写的 `PartialEq` / `Eq` / `Hash` 派生会被移除：实体相等性只由标识决定。
#[proc_macro_attribute]
pub fn entity(attr: TokenStream, item: TokenStream) -> TokenStream {
    entity::expand(attr, item)
}

/// 实体标识宏
///
/// 仅支持单字段 tuple struct（如 `struct CompanyId(Uuid);`），内部类型需实现
/// `crm_domain::entity::EntityId`（`Uuid` / `Ulid` / `String`）。
#[proc_macro_attribute]
pub fn entity_id(attr: TokenStream, item: TokenStream) -> TokenStream {
    entity_id::expand(attr, item)
}

/// 领域事件宏
///
/// - 枚举级：`#[domain_event(version = N)]`（默认 1）；
/// - 变体级覆写：`#[event(event_type = "...", event_version = N)]`；
/// - 默认事件类型为 `Enum.Variant`。
#[proc_macro_attribute]
pub fn domain_event(attr: TokenStream, item: TokenStream) -> TokenStream {
    domain_event::expand(attr, item)
}
