//! 审计模型（Audit）
//!
//! 每个持久化对象都携带：创建者/创建时间、最后修改者/修改时间，以及逻辑删除标记 `active`。
//!
//! 基础类型从不自动填充审计字段：调用方（处理器）通过注入的 [`Clock`] 与
//! [`CurrentUser`] 构造 [`AuditStamp`] 后显式传入，审计结果因此可复现、可测试。
//!
use crate::provider::{Clock, CurrentUser};
use chrono::{DateTime, Utc};
use crm_macros::entity_id;
use serde::{Deserialize, Serialize};

/// 操作者标识（由外部身份系统提供）
#[entity_id]
pub struct UserId(String);

/// 一次变更的“谁 / 何时”
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStamp {
    pub by: UserId,
    pub at: DateTime<Utc>,
}

impl AuditStamp {
    pub fn new(by: UserId, at: DateTime<Utc>) -> Self {
        Self { by, at }
    }

    /// 从注入的协作者采集当前用户与当前时间
    pub fn capture(clock: &dyn Clock, user: &dyn CurrentUser) -> Self {
        Self {
            by: user.user_id(),
            at: clock.now(),
        }
    }
}

/// 审计字段集合
///
/// - `created` 只在构造时写入，之后没有任何修改入口；
/// - `modified` 在构造时等于 `created`，每次更新与逻辑删除时刷新；
/// - `active` 默认为 `true`，逻辑删除后为 `false`，不会被核心恢复或物理删除。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Audit {
    created: AuditStamp,
    modified: AuditStamp,
    active: bool,
}

impl Audit {
    /// 新建实体时使用
    pub fn new(stamp: AuditStamp) -> Self {
        Self {
            modified: stamp.clone(),
            created: stamp,
            active: true,
        }
    }

    /// 由持久化适配器从存储中还原
    pub fn restore(created: AuditStamp, modified: AuditStamp, active: bool) -> Self {
        Self {
            created,
            modified,
            active,
        }
    }

    pub fn created_by(&self) -> &UserId {
        &self.created.by
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created.at
    }

    pub fn modified_by(&self) -> &UserId {
        &self.modified.by
    }

    pub fn modified_at(&self) -> DateTime<Utc> {
        self.modified.at
    }

    pub fn created(&self) -> &AuditStamp {
        &self.created
    }

    pub fn modified(&self) -> &AuditStamp {
        &self.modified
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// 记录一次修改
    pub fn touch(&mut self, stamp: AuditStamp) {
        self.modified = stamp;
    }

    /// 逻辑删除
    ///
    /// 已是非活动状态时返回 `false`，且不做任何修改。
    pub fn deactivate(&mut self, stamp: AuditStamp) -> bool {
        if !self.active {
            return false;
        }
        self.active = false;
        self.modified = stamp;
        true
    }
}

/// 携带审计字段的实体能力
///
/// 只读访问整个 [`Audit`]；写入仅限 `touch` 与 `deactivate`，
/// 创建戳在实体之外没有任何修改入口。
pub trait Auditable {
    fn audit(&self) -> &Audit;

    /// 记录一次修改
    fn touch(&mut self, stamp: AuditStamp);

    /// 逻辑删除，已是非活动状态时返回 `false`
    fn deactivate(&mut self, stamp: AuditStamp) -> bool;

    fn created_by(&self) -> &UserId {
        self.audit().created_by()
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.audit().created_at()
    }

    fn modified_by(&self) -> &UserId {
        self.audit().modified_by()
    }

    fn modified_at(&self) -> DateTime<Utc> {
        self.audit().modified_at()
    }

    fn is_active(&self) -> bool {
        self.audit().is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{ManualClock, StaticUser};
    use chrono::{Duration, TimeZone};

    fn stamp(user: &str, minute: u32) -> AuditStamp {
        AuditStamp::new(
            UserId::new(user.to_string()),
            Utc.with_ymd_and_hms(2024, 1, 1, 9, minute, 0).unwrap(),
        )
    }

    #[test]
    fn new_audit_sets_modified_equal_to_created() {
        let audit = Audit::new(stamp("alice", 0));
        assert_eq!(audit.created(), audit.modified());
        assert!(audit.is_active());
    }

    #[test]
    fn touch_only_changes_modified() {
        let mut audit = Audit::new(stamp("alice", 0));
        audit.touch(stamp("bob", 5));

        assert_eq!(audit.created_by().value(), "alice");
        assert_eq!(audit.created(), &stamp("alice", 0));
        assert_eq!(audit.modified_by().value(), "bob");
        assert!(audit.modified_at() > audit.created_at());
    }

    #[test]
    fn deactivate_is_one_shot() {
        let mut audit = Audit::new(stamp("alice", 0));
        assert!(audit.deactivate(stamp("bob", 1)));
        assert!(!audit.is_active());
        assert_eq!(audit.modified(), &stamp("bob", 1));

        // 再次删除：不做任何修改
        assert!(!audit.deactivate(stamp("carol", 2)));
        assert_eq!(audit.modified(), &stamp("bob", 1));
        assert_eq!(audit.created(), &stamp("alice", 0));
    }

    #[test]
    fn capture_reads_injected_collaborators() {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
        let user = StaticUser::new(UserId::new("svc".to_string()));

        let first = AuditStamp::capture(&clock, &user);
        clock.advance(Duration::seconds(30));
        let second = AuditStamp::capture(&clock, &user);

        assert_eq!(first.by, second.by);
        assert_eq!(second.at - first.at, Duration::seconds(30));
    }

    #[test]
    fn audit_serde_roundtrip() {
        let audit = Audit::new(stamp("alice", 0));
        let json = serde_json::to_value(&audit).unwrap();
        assert_eq!(json["created"]["by"], "alice");
        assert_eq!(json["active"], true);
    }
}
