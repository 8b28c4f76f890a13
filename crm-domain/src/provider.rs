//! 时间与身份协作者
//!
//! 处理器从注入的协作者获取“当前用户”和“当前时间”，从不读取全局/静态状态。
//!
use crate::audit::UserId;
use chrono::{DateTime, Duration, Utc};
use std::sync::Mutex;

/// 时钟
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// 系统时钟
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// 手动推进的时钟，用于确定性测试
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn set(&self, at: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = at;
    }

    pub fn advance(&self, by: Duration) {
        let mut guard = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *guard += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// 当前操作者
pub trait CurrentUser: Send + Sync {
    fn user_id(&self) -> UserId;
}

/// 固定操作者（后台任务、测试）
#[derive(Debug, Clone)]
pub struct StaticUser {
    user_id: UserId,
}

impl StaticUser {
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }
}

impl CurrentUser for StaticUser {
    fn user_id(&self) -> UserId {
        self.user_id.clone()
    }
}
