//! # Adapter Registry Module / 适配器注册表模块
//!
//! A name-keyed directory of adapter constructors. The registry is an
//! explicit object owned and passed by the orchestrator. There is no
//! process-wide global state; registration happens when the instance is
//! built.
//!
//! 以名称为键的适配器构造器目录。注册表是由编排器拥有并传递的显式对象；
//! 没有进程级全局状态，注册在实例构建时完成。

use std::collections::HashMap;

use crate::core::adapter::{Adapter, TargetKind};

/// Boxed constructor producing a fresh adapter instance.
/// 产生全新适配器实例的装箱构造器。
pub type AdapterCtor = Box<dyn Fn() -> Box<dyn Adapter> + Send + Sync>;

struct Registration {
    kind: TargetKind,
    ctor: AdapterCtor,
}

/// Registry mapping adapter names to constructors, tagged with the
/// target-software category each adapter declares.
///
/// 将适配器名称映射到构造器的注册表，
/// 并以每个适配器声明的目标软件类别作标记。
#[derive(Default)]
pub struct AdapterRegistry {
    entries: HashMap<String, Registration>,
}

impl AdapterRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Registers a constructor under `name` with its declared category.
    /// A name collision silently overwrites the previous registration;
    /// the last writer wins. This mirrors how plugin directories behave
    /// and is a documented ambiguity, not an enforced invariant.
    ///
    /// 以 `name` 注册一个构造器及其声明的类别。
    /// 名称冲突时静默覆盖之前的注册；后写者胜。
    /// 这与插件目录的行为一致，是一个已记录的歧义，而非强制不变量。
    pub fn register<F>(&mut self, name: impl Into<String>, kind: TargetKind, ctor: F)
    where
        F: Fn() -> Box<dyn Adapter> + Send + Sync + 'static,
    {
        self.entries.insert(
            name.into(),
            Registration {
                kind,
                ctor: Box::new(ctor),
            },
        );
    }

    /// Constructs a fresh adapter by name. Returns `None` for an
    /// unregistered name; a registry miss is never an error.
    ///
    /// 按名称构造全新的适配器。未注册的名称返回 `None`；
    /// 注册表未命中从不是错误。
    pub fn create(&self, name: &str) -> Option<Box<dyn Adapter>> {
        self.entries.get(name).map(|entry| (entry.ctor)())
    }

    /// Constructs a fresh adapter and merges `options` into it before
    /// handing it out, for callers that carry construction-time
    /// settings. Still `None` on a registry miss.
    ///
    /// 构造全新的适配器并在交付前将 `options` 合并进去，
    /// 供携带构建期设置的调用方使用。注册表未命中时仍返回 `None`。
    pub fn create_configured(
        &self,
        name: &str,
        options: crate::core::adapter::ConfigMap,
    ) -> Option<Box<dyn Adapter>> {
        let mut adapter = self.create(name)?;
        adapter.configure(options);
        Some(adapter)
    }

    /// The category declared for a registered name, if any.
    /// 已注册名称声明的类别（如果有）。
    pub fn kind_of(&self, name: &str) -> Option<TargetKind> {
        self.entries.get(name).map(|entry| entry.kind)
    }

    /// All registered adapter names, sorted for stable output.
    /// 所有已注册的适配器名称，排序以保证输出稳定。
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.keys().cloned().collect();
        names.sort();
        names
    }

    /// Names of adapters whose declared category matches `kind`.
    /// 声明类别与 `kind` 匹配的适配器名称。
    pub fn list_by_kind(&self, kind: TargetKind) -> Vec<String> {
        let mut names: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.kind == kind)
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
