//! The hook used by pools that name none.

use crate::traits::{HookBase, HookFlags};

/// Subscribes to nothing; every callback keeps its identity default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DefaultHook;

impl HookBase for DefaultHook {
    fn hook_type(&self) -> &str {
        "Default"
    }

    fn flags(&self) -> HookFlags {
        HookFlags::NONE
    }
}
