use bon::Builder;

/// 应用层上下文（Application Context）
///
/// 承载一次请求分发所需的横切信息：
/// - 关联追踪 `correlation_id` 与因果链 `causation_id`，写入分发 span；
/// - 幂等键 `idempotency_key`，由基础设施层决定是否参与幂等。
///
/// 当前用户与时间不在上下文中，由处理器注入的 `CurrentUser` / `Clock` 提供。
///
/// ```rust
/// use crm_application::context::AppContext;
///
/// let ctx = AppContext::builder()
///     .correlation_id("cor-123")
///     .idempotency_key("idem-xyz")
///     .build();
///
/// assert_eq!(ctx.correlation_id(), Some("cor-123"));
/// assert_eq!(ctx.causation_id(), None);
/// ```
#[derive(Builder, Clone, Debug, Default)]
pub struct AppContext {
    /// 关联ID
    #[builder(into)]
    correlation_id: Option<String>,
    /// 因果ID
    #[builder(into)]
    causation_id: Option<String>,
    /// 幂等键
    #[builder(into)]
    idempotency_key: Option<String>,
}

impl AppContext {
    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    pub fn causation_id(&self) -> Option<&str> {
        self.causation_id.as_deref()
    }

    pub fn idempotency_key(&self) -> Option<&str> {
        self.idempotency_key.as_deref()
    }
}
