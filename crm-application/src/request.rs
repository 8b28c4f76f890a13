use std::fmt;

/// 请求类别：写操作（命令）或读操作（查询）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Command,
    Query,
}

impl RequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Command => "command",
            Self::Query => "query",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 应用层请求（Request）
///
/// 表达一次意图的不可变值对象，命令与查询共用同一入口分发。
/// - `NAME`：稳定名称，用于日志、追踪与诊断，避免依赖 `type_name::<T>()`；
/// - `KIND`：命令或查询；
/// - `Response`：处理器的返回值类型。
pub trait Request: Send + Sync + 'static {
    const NAME: &'static str;

    const KIND: RequestKind;

    type Response: Send + 'static;
}
