use serde::{Deserialize, Serialize};

/// 字段变更封装，包含旧值与新值（用于“已更新”类事件）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChanged<T> {
    pub old: T,
    pub new: T,
}

impl<T> FieldChanged<T> {
    pub fn new(old: T, new: T) -> Self {
        Self { old, new }
    }

    pub fn old_value(&self) -> &T {
        &self.old
    }

    pub fn new_value(&self) -> &T {
        &self.new
    }
}

impl<T> FieldChanged<T>
where
    T: PartialEq,
{
    /// 仅当值确实变化时返回变更记录
    pub fn detect(old: T, new: T) -> Option<Self> {
        (old != new).then(|| Self { old, new })
    }

    pub fn is_changed(&self) -> bool {
        self.old != self.new
    }
}
