use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use crm_application::{
    Mediator, Outcome,
    context::AppContext,
    error::AppError,
    handler::RequestHandler,
    request::{Request, RequestKind},
    validation::{RuleSet, ValidationFailure, ValidationResult, Validator},
};
use crm_domain::{
    audit::{Audit, AuditStamp, Auditable, UserId},
    domain_event::{EventLedger, EventSource},
    entity::{Entity, EntityId},
    memory::InMemoryRepository,
    provider::{Clock, CurrentUser, ManualClock},
    repository::{Repository, Scope},
};
use crm_macros::{domain_event, entity, entity_id};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

#[entity_id]
struct WidgetId(String);

#[domain_event]
enum WidgetEvent {
    Created { name: String },
    Renamed { from: String, to: String },
}

#[entity(id = WidgetId, event = WidgetEvent)]
struct Widget {
    name: String,
}

// ---------------------------------------------------------------------------
// 环境
// ---------------------------------------------------------------------------

struct SwitchableUser {
    current: Mutex<UserId>,
}

impl SwitchableUser {
    fn new(name: &str) -> Self {
        Self {
            current: Mutex::new(UserId::new(name.to_string())),
        }
    }

    fn switch_to(&self, name: &str) {
        *self.current.lock().unwrap() = UserId::new(name.to_string());
    }
}

impl CurrentUser for SwitchableUser {
    fn user_id(&self) -> UserId {
        self.current.lock().unwrap().clone()
    }
}

struct Env {
    repo: Arc<InMemoryRepository<Widget>>,
    clock: Arc<ManualClock>,
    user: Arc<SwitchableUser>,
    creates: Arc<AtomicUsize>,
}

impl Env {
    fn new() -> Self {
        Self {
            repo: Arc::new(InMemoryRepository::new()),
            clock: Arc::new(ManualClock::new(
                Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
            )),
            user: Arc::new(SwitchableUser::new("alice")),
            creates: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn stamp(&self) -> AuditStamp {
        AuditStamp::capture(self.clock.as_ref(), self.user.as_ref())
    }

    fn mediator(self: &Arc<Self>) -> Mediator {
        Mediator::builder()
            .handler::<CreateWidget, _>(Arc::new(CreateWidgetHandler { env: self.clone() }))
            .validator::<CreateWidget, _>(Arc::new(create_widget_rules()))
            .handler::<RenameWidget, _>(Arc::new(RenameWidgetHandler { env: self.clone() }))
            .validator::<RenameWidget, _>(Arc::new(UniqueName { env: self.clone() }))
            .handler::<DeleteWidget, _>(Arc::new(DeleteWidgetHandler { env: self.clone() }))
            .handler::<GetWidget, _>(Arc::new(GetWidgetHandler { env: self.clone() }))
            .build()
            .unwrap()
    }
}

// ---------------------------------------------------------------------------
// 请求与处理器
// ---------------------------------------------------------------------------

struct CreateWidget {
    name: String,
}

impl Request for CreateWidget {
    const NAME: &'static str = "CreateWidget";
    const KIND: RequestKind = RequestKind::Command;
    type Response = WidgetId;
}

fn create_widget_rules() -> RuleSet<CreateWidget> {
    RuleSet::<CreateWidget>::new()
        .not_blank("Name", |r| r.name.as_str())
        .max_length("Name", |r| r.name.as_str(), 50)
}

struct CreateWidgetHandler {
    env: Arc<Env>,
}

#[async_trait]
impl RequestHandler<CreateWidget> for CreateWidgetHandler {
    async fn handle(
        &self,
        _ctx: &AppContext,
        request: CreateWidget,
        cancel: &CancellationToken,
    ) -> Result<WidgetId, AppError> {
        self.env.creates.fetch_add(1, Ordering::SeqCst);
        let mut widget = Widget {
            id: WidgetId::generate(),
            audit: Audit::new(self.env.stamp()),
            events: EventLedger::new(),
            name: request.name.clone(),
        };
        widget.add_domain_event(WidgetEvent::Created { name: request.name })?;
        let saved = self.env.repo.add(widget, cancel).await?;
        Ok(saved.id().clone())
    }
}

struct RenameWidget {
    id: WidgetId,
    name: String,
}

impl Request for RenameWidget {
    const NAME: &'static str = "RenameWidget";
    const KIND: RequestKind = RequestKind::Command;
    type Response = Widget;
}

/// 通过仓储检查名称唯一
struct UniqueName {
    env: Arc<Env>,
}

#[async_trait]
impl Validator<RenameWidget> for UniqueName {
    async fn validate(
        &self,
        _ctx: &AppContext,
        request: &RenameWidget,
        cancel: &CancellationToken,
    ) -> Result<ValidationResult, AppError> {
        let taken = self
            .env
            .repo
            .get_all(Scope::Active, cancel)
            .await?
            .iter()
            .any(|w| w.name == request.name && w.id() != &request.id);
        let mut result = ValidationResult::new();
        if taken {
            result.push(ValidationFailure::new("Name", "Name is already taken."));
        }
        Ok(result)
    }
}

struct RenameWidgetHandler {
    env: Arc<Env>,
}

#[async_trait]
impl RequestHandler<RenameWidget> for RenameWidgetHandler {
    async fn handle(
        &self,
        _ctx: &AppContext,
        request: RenameWidget,
        cancel: &CancellationToken,
    ) -> Result<Widget, AppError> {
        let Some(mut widget) = self
            .env
            .repo
            .get_by_id(&request.id, Scope::Active, cancel)
            .await?
        else {
            return Err(AppError::not_found("Widget", &request.id));
        };
        let from = std::mem::replace(&mut widget.name, request.name.clone());
        widget.touch(self.env.stamp());
        widget.add_domain_event(WidgetEvent::Renamed {
            from,
            to: request.name,
        })?;
        Ok(self.env.repo.update(widget, cancel).await?)
    }
}

struct DeleteWidget {
    id: WidgetId,
}

impl Request for DeleteWidget {
    const NAME: &'static str = "DeleteWidget";
    const KIND: RequestKind = RequestKind::Command;
    type Response = bool;
}

struct DeleteWidgetHandler {
    env: Arc<Env>,
}

#[async_trait]
impl RequestHandler<DeleteWidget> for DeleteWidgetHandler {
    async fn handle(
        &self,
        _ctx: &AppContext,
        request: DeleteWidget,
        cancel: &CancellationToken,
    ) -> Result<bool, AppError> {
        Ok(self
            .env
            .repo
            .delete(&request.id, self.env.stamp(), cancel)
            .await?)
    }
}

struct GetWidget {
    id: WidgetId,
    include_inactive: bool,
}

impl Request for GetWidget {
    const NAME: &'static str = "GetWidget";
    const KIND: RequestKind = RequestKind::Query;
    type Response = Option<Widget>;
}

struct GetWidgetHandler {
    env: Arc<Env>,
}

#[async_trait]
impl RequestHandler<GetWidget> for GetWidgetHandler {
    async fn handle(
        &self,
        _ctx: &AppContext,
        request: GetWidget,
        cancel: &CancellationToken,
    ) -> Result<Option<Widget>, AppError> {
        let scope = Scope::from_include_inactive(request.include_inactive);
        Ok(self.env.repo.get_by_id(&request.id, scope, cancel).await?)
    }
}

async fn create(mediator: &Mediator, name: &str) -> WidgetId {
    mediator
        .send(
            &AppContext::default(),
            CreateWidget { name: name.into() },
            &CancellationToken::new(),
        )
        .await
        .unwrap()
        .completed()
        .unwrap()
}

async fn get(mediator: &Mediator, id: &WidgetId, include_inactive: bool) -> Option<Widget> {
    mediator
        .send(
            &AppContext::default(),
            GetWidget {
                id: id.clone(),
                include_inactive,
            },
            &CancellationToken::new(),
        )
        .await
        .unwrap()
        .completed()
        .unwrap()
}

// ---------------------------------------------------------------------------
// 场景
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_widget_with_empty_name_is_rejected() {
    let env = Arc::new(Env::new());
    let mediator = env.mediator();

    let outcome = mediator
        .send(
            &AppContext::default(),
            CreateWidget { name: "".into() },
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(
        outcome.failures().map(|f| f.failures().to_vec()),
        Some(vec![ValidationFailure::new("Name", "Name is required.")])
    );
    assert_eq!(env.creates.load(Ordering::SeqCst), 0);
    assert!(env.repo.is_empty());
    assert!(env.repo.published_events().is_empty());
}

#[tokio::test]
async fn create_widget_publishes_event_after_save() {
    let env = Arc::new(Env::new());
    let mediator = env.mediator();

    let id = create(&mediator, "Sprocket").await;

    let widget = get(&mediator, &id, false).await.unwrap();
    assert_eq!(widget.name, "Sprocket");
    assert!(widget.domain_events().is_empty());
    assert_eq!(
        env.repo.published_events(),
        vec![WidgetEvent::Created {
            name: "Sprocket".into()
        }]
    );
}

#[tokio::test]
async fn delete_widget_soft_deletes() {
    let env = Arc::new(Env::new());
    let mediator = env.mediator();
    let cancel = CancellationToken::new();

    let id = create(&mediator, "W1").await;
    let before = get(&mediator, &id, false).await.unwrap().modified_at();

    env.clock.advance(Duration::minutes(1));
    let deleted = mediator
        .send(&AppContext::default(), DeleteWidget { id: id.clone() }, &cancel)
        .await
        .unwrap();
    assert_eq!(deleted, Outcome::Completed(true));

    assert!(get(&mediator, &id, false).await.is_none());

    let inactive = get(&mediator, &id, true).await.unwrap();
    assert!(!inactive.is_active());
    assert!(inactive.modified_at() > before);

    // 已删除的再次删除返回 false 且不做修改
    env.clock.advance(Duration::minutes(1));
    let again = mediator
        .send(&AppContext::default(), DeleteWidget { id: id.clone() }, &cancel)
        .await
        .unwrap();
    assert_eq!(again, Outcome::Completed(false));
    let unchanged = get(&mediator, &id, true).await.unwrap();
    assert_eq!(unchanged.audit(), inactive.audit());
}

#[tokio::test]
async fn delete_unknown_widget_returns_false() {
    let env = Arc::new(Env::new());
    let mediator = env.mediator();

    let outcome = mediator
        .send(
            &AppContext::default(),
            DeleteWidget {
                id: WidgetId::generate(),
            },
            &CancellationToken::new(),
        )
        .await
        .unwrap();
    assert_eq!(outcome, Outcome::Completed(false));
}

#[tokio::test]
async fn created_stamp_never_changes() {
    let env = Arc::new(Env::new());
    let mediator = env.mediator();
    let ctx = AppContext::default();
    let cancel = CancellationToken::new();

    let id = create(&mediator, "Gear").await;
    let created = get(&mediator, &id, false).await.unwrap().audit().created().clone();

    env.clock.advance(Duration::minutes(5));
    env.user.switch_to("bob");
    let renamed = mediator
        .send(
            &ctx,
            RenameWidget {
                id: id.clone(),
                name: "Cog".into(),
            },
            &cancel,
        )
        .await
        .unwrap()
        .completed()
        .unwrap();
    assert_eq!(renamed.audit().created(), &created);
    assert_eq!(renamed.modified_by(), &UserId::new("bob".to_string()));
    assert_eq!(renamed.modified_at(), env.clock.now());

    env.clock.advance(Duration::minutes(5));
    env.user.switch_to("carol");
    mediator
        .send(&ctx, DeleteWidget { id: id.clone() }, &cancel)
        .await
        .unwrap();

    let deleted = get(&mediator, &id, true).await.unwrap();
    assert_eq!(deleted.audit().created(), &created);
    assert_eq!(deleted.created_by(), &UserId::new("alice".to_string()));
    assert_eq!(deleted.modified_by(), &UserId::new("carol".to_string()));
    assert_eq!(deleted.modified_at(), env.clock.now());
}

#[tokio::test]
async fn rename_missing_widget_is_not_found() {
    let env = Arc::new(Env::new());
    let mediator = env.mediator();

    let err = mediator
        .send(
            &AppContext::default(),
            RenameWidget {
                id: WidgetId::generate(),
                name: "Nope".into(),
            },
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound { entity: "Widget", .. }));
}

#[tokio::test]
async fn async_validator_consults_repository() {
    let env = Arc::new(Env::new());
    let mediator = env.mediator();

    create(&mediator, "Taken").await;
    let other = create(&mediator, "Free").await;

    let outcome = mediator
        .send(
            &AppContext::default(),
            RenameWidget {
                id: other.clone(),
                name: "Taken".into(),
            },
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(
        outcome.failures().map(|f| f.len()),
        Some(1)
    );
    assert_eq!(get(&mediator, &other, false).await.unwrap().name, "Free");
}

#[tokio::test]
async fn missing_handler_is_a_configuration_error() {
    let env = Arc::new(Env::new());

    // 缺少处理器：构建失败
    let err = Mediator::builder()
        .validator::<CreateWidget, _>(Arc::new(create_widget_rules()))
        .build()
        .err()
        .unwrap();
    assert!(matches!(
        err,
        AppError::HandlerNotRegistered {
            request: "CreateWidget"
        }
    ));

    // 重复处理器：构建失败
    let err = Mediator::builder()
        .handler::<CreateWidget, _>(Arc::new(CreateWidgetHandler { env: env.clone() }))
        .handler::<CreateWidget, _>(Arc::new(CreateWidgetHandler { env: env.clone() }))
        .build()
        .err()
        .unwrap();
    assert!(matches!(err, AppError::DuplicateHandler { .. }));

    // 未登记的类型：分发时失败，处理器不会运行
    let mediator = Mediator::builder()
        .handler::<GetWidget, _>(Arc::new(GetWidgetHandler { env: env.clone() }))
        .build()
        .unwrap();
    let err = mediator
        .send(
            &AppContext::default(),
            CreateWidget { name: "x".into() },
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::HandlerNotRegistered { .. }));
    assert_eq!(env.creates.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn cancelled_request_does_not_reach_repository() {
    let env = Arc::new(Env::new());
    let mediator = env.mediator();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = mediator
        .send(
            &AppContext::default(),
            CreateWidget {
                name: "Late".into(),
            },
            &cancel,
        )
        .await
        .unwrap_err();

    assert!(err.is_cancelled());
    assert!(env.repo.is_empty());
}
