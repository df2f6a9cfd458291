//! Guards the single outstanding default-dialer role request.
//!
//! 守护唯一一个进行中的默认拨号器角色请求。

use std::sync::atomic::{AtomicBool, Ordering};

/// Admits at most one role request at a time. A second request while one is
/// outstanding is refused, not queued.
///
/// 同一时间至多允许一个角色请求。已有请求进行中时，第二个请求被拒绝而不是排队。
#[derive(Debug, Default)]
pub(crate) struct RoleRequestSlot {
    outstanding: AtomicBool,
}

impl RoleRequestSlot {
    /// Claims the slot. The slot is released when the guard drops, including
    /// when the request future is cancelled.
    pub(crate) fn try_acquire(&self) -> Option<RoleRequestGuard<'_>> {
        self.outstanding
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RoleRequestGuard { slot: self })
    }

    pub(crate) fn is_outstanding(&self) -> bool {
        self.outstanding.load(Ordering::Acquire)
    }
}

pub(crate) struct RoleRequestGuard<'a> {
    slot: &'a RoleRequestSlot,
}

impl Drop for RoleRequestGuard<'_> {
    fn drop(&mut self) {
        self.slot.outstanding.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_holder() {
        let slot = RoleRequestSlot::default();
        let guard = slot.try_acquire();
        assert!(guard.is_some());
        assert!(slot.is_outstanding());
        assert!(slot.try_acquire().is_none());

        drop(guard);
        assert!(!slot.is_outstanding());
        assert!(slot.try_acquire().is_some());
    }
}
