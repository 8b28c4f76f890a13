//! 请求分发器（Mediator）
//!
//! 命令与查询的唯一入口：
//! - 启动期由 [`MediatorBuilder`] 显式登记每种请求类型的处理器、校验器与前置步骤，
//!   `build()` 时检查“每种请求类型恰好一个处理器”；
//! - 运行期按 `TypeId` 找到该类型的管道，依次执行 校验 → 前置步骤 → 处理器；
//! - 校验失败以 [`Outcome::ValidationFailed`] 返回，处理器错误原样返回。
//!
use crate::{
    context::AppContext,
    error::AppError,
    handler::RequestHandler,
    pipeline::{Outcome, Pipeline, PipelineStep},
    request::{Request, RequestKind},
    validation::{ValidationBehavior, ValidationMode, Validator},
};
use bon::Builder;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// 分发器配置
#[derive(Builder, Debug, Clone, Default)]
pub struct MediatorConfig {
    /// 校验器的执行方式
    #[builder(default)]
    pub validation_mode: ValidationMode,
    /// 超过该耗时的请求记录告警日志
    pub slow_request_threshold: Option<Duration>,
}

/// 已登记的请求类型：管道以 `Pipeline<R>` 的形式类型擦除存放
struct Route {
    name: &'static str,
    kind: RequestKind,
    pipeline: Box<dyn Any + Send + Sync>,
}

pub struct Mediator {
    routes: HashMap<TypeId, Route>,
    config: MediatorConfig,
}

impl Mediator {
    pub fn builder() -> MediatorBuilder {
        MediatorBuilder::new()
    }

    pub fn config(&self) -> &MediatorConfig {
        &self.config
    }

    /// 已登记的请求名称（排序后），用于启动诊断
    pub fn registered_requests(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.routes.values().map(|r| r.name).collect();
        names.sort_unstable();
        names
    }

    pub fn is_registered<R: Request>(&self) -> bool {
        self.routes.contains_key(&TypeId::of::<R>())
    }

    /// 分发请求
    ///
    /// - 未登记处理器：`Err(HandlerNotRegistered)`，任何校验器与处理器都不会运行；
    /// - 校验失败：`Ok(Outcome::ValidationFailed)`，处理器不会运行；
    /// - 处理器成功：`Ok(Outcome::Completed)`；
    /// - 处理器或校验器故障：对应的 `Err` 原样返回；
    /// - 取消：在各阶段边界检查，返回 `Err(Cancelled)`。
    pub async fn send<R: Request>(
        &self,
        ctx: &AppContext,
        request: R,
        cancel: &CancellationToken,
    ) -> Result<Outcome<R::Response>, AppError> {
        let span = tracing::info_span!(
            "mediator.send",
            request = R::NAME,
            kind = %R::KIND,
            correlation_id = ctx.correlation_id(),
        );
        self.dispatch(ctx, request, cancel).instrument(span).await
    }

    async fn dispatch<R: Request>(
        &self,
        ctx: &AppContext,
        request: R,
        cancel: &CancellationToken,
    ) -> Result<Outcome<R::Response>, AppError> {
        let Some(route) = self.routes.get(&TypeId::of::<R>()) else {
            tracing::error!("no handler registered");
            return Err(AppError::HandlerNotRegistered { request: R::NAME });
        };

        // 键与管道来自同一泛型 R，正常情况下不会失败
        let Some(pipeline) = route.pipeline.downcast_ref::<Pipeline<R>>() else {
            return Err(AppError::TypeMismatch {
                expected: R::NAME,
                found: route.name,
            });
        };

        let started = Instant::now();
        let result = pipeline.run(ctx, request, cancel).await;
        let elapsed = started.elapsed();

        match &result {
            Ok(Outcome::Completed(_)) => {
                tracing::debug!(elapsed_ms = elapsed.as_millis() as u64, "request completed");
            }
            Ok(Outcome::ValidationFailed(failures)) => {
                tracing::debug!(count = failures.len(), %failures, "request rejected by validation");
            }
            Err(err) if err.is_cancelled() => {
                tracing::debug!("request cancelled");
            }
            Err(err) => {
                tracing::warn!(error = %err, "request faulted");
            }
        }

        if self
            .config
            .slow_request_threshold
            .is_some_and(|threshold| elapsed > threshold)
        {
            tracing::warn!(elapsed_ms = elapsed.as_millis() as u64, "slow request");
        }

        result
    }
}

/// 单个请求类型的登记内容，构建时转换为 `Pipeline<R>`
struct Registration<R: Request> {
    handlers: Vec<Arc<dyn RequestHandler<R>>>,
    validators: Vec<Arc<dyn Validator<R>>>,
    steps: Vec<Arc<dyn PipelineStep<R>>>,
}

impl<R: Request> Default for Registration<R> {
    fn default() -> Self {
        Self {
            handlers: Vec::new(),
            validators: Vec::new(),
            steps: Vec::new(),
        }
    }
}

trait Slot: Send {
    fn name(&self) -> &'static str;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn into_route(self: Box<Self>, mode: ValidationMode) -> Result<Route, AppError>;
}

impl<R: Request> Slot for Registration<R> {
    fn name(&self) -> &'static str {
        R::NAME
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_route(self: Box<Self>, mode: ValidationMode) -> Result<Route, AppError> {
        let Registration {
            mut handlers,
            validators,
            steps,
        } = *self;

        if handlers.len() > 1 {
            return Err(AppError::DuplicateHandler { request: R::NAME });
        }
        let Some(handler) = handlers.pop() else {
            return Err(AppError::HandlerNotRegistered { request: R::NAME });
        };

        // 校验总在其它前置步骤之前
        let mut chain: Vec<Arc<dyn PipelineStep<R>>> = Vec::with_capacity(steps.len() + 1);
        if !validators.is_empty() {
            chain.push(Arc::new(ValidationBehavior::new(validators, mode)));
        }
        chain.extend(steps);

        Ok(Route {
            name: R::NAME,
            kind: R::KIND,
            pipeline: Box::new(Pipeline::new(chain, handler)),
        })
    }
}

/// 分发器构建器
///
/// ```rust
/// use async_trait::async_trait;
/// use crm_application::{
///     context::AppContext, error::AppError, handler::RequestHandler, mediator::Mediator,
///     request::{Request, RequestKind},
/// };
/// use std::sync::Arc;
/// use tokio_util::sync::CancellationToken;
///
/// struct Ping;
///
/// impl Request for Ping {
///     const NAME: &'static str = "Ping";
///     const KIND: RequestKind = RequestKind::Query;
///     type Response = ();
/// }
///
/// struct PingHandler;
///
/// #[async_trait]
/// impl RequestHandler<Ping> for PingHandler {
///     async fn handle(&self, _: &AppContext, _: Ping, _: &CancellationToken) -> Result<(), AppError> {
///         Ok(())
///     }
/// }
///
/// let mediator = Mediator::builder()
///     .handler::<Ping, _>(Arc::new(PingHandler))
///     .build()
///     .unwrap();
/// assert_eq!(mediator.registered_requests(), vec!["Ping"]);
///
/// let err = Mediator::builder()
///     .handler::<Ping, _>(Arc::new(PingHandler))
///     .handler::<Ping, _>(Arc::new(PingHandler))
///     .build()
///     .err()
///     .unwrap();
/// assert!(matches!(err, AppError::DuplicateHandler { .. }));
/// ```
#[derive(Default)]
pub struct MediatorBuilder {
    slots: HashMap<TypeId, Box<dyn Slot>>,
    config: MediatorConfig,
    errors: Vec<AppError>,
}

impl MediatorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: MediatorConfig) -> Self {
        self.config = config;
        self
    }

    /// 登记处理器；同一请求类型登记多个时 `build()` 失败
    pub fn handler<R, H>(mut self, handler: Arc<H>) -> Self
    where
        R: Request,
        H: RequestHandler<R> + 'static,
    {
        self.with_registration::<R>(|reg| reg.handlers.push(handler));
        self
    }

    /// 登记校验器，按登记顺序合并失败
    pub fn validator<R, V>(mut self, validator: Arc<V>) -> Self
    where
        R: Request,
        V: Validator<R> + 'static,
    {
        self.with_registration::<R>(|reg| reg.validators.push(validator));
        self
    }

    /// 登记额外的前置步骤，在校验之后、处理器之前按登记顺序执行
    pub fn step<R, S>(mut self, step: Arc<S>) -> Self
    where
        R: Request,
        S: PipelineStep<R> + 'static,
    {
        self.with_registration::<R>(|reg| reg.steps.push(step));
        self
    }

    /// 声明该请求类型必须有处理器，缺失时 `build()` 失败
    pub fn require<R: Request>(mut self) -> Self {
        self.with_registration::<R>(|_| {});
        self
    }

    pub fn build(self) -> Result<Mediator, AppError> {
        if let Some(err) = self.errors.into_iter().next() {
            return Err(err);
        }

        // 按名称排序，使配置错误的报告顺序稳定
        let mut slots: Vec<(TypeId, Box<dyn Slot>)> = self.slots.into_iter().collect();
        slots.sort_by_key(|(_, slot)| slot.name());

        let mut routes = HashMap::with_capacity(slots.len());
        for (type_id, slot) in slots {
            let route = slot.into_route(self.config.validation_mode)?;
            tracing::debug!(
                request = route.name,
                kind = %route.kind,
                "request registered"
            );
            routes.insert(type_id, route);
        }

        Ok(Mediator {
            routes,
            config: self.config,
        })
    }

    fn with_registration<R: Request>(&mut self, f: impl FnOnce(&mut Registration<R>)) {
        let slot = self
            .slots
            .entry(TypeId::of::<R>())
            .or_insert_with(|| Box::new(Registration::<R>::default()));
        let found = slot.name();
        match slot.as_any_mut().downcast_mut::<Registration<R>>() {
            Some(registration) => f(registration),
            None => self.errors.push(AppError::TypeMismatch {
                expected: R::NAME,
                found,
            }),
        }
    }
}
