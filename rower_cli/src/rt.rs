//! Real-time scheduling helpers (Linux SCHED_FIFO + mlockall; macOS
//! mlockall only). Best effort: a refusal is logged, never fatal, since the
//! host-side pipeline degrades gracefully where an embedded target would not.

#[cfg(target_os = "linux")]
pub fn setup_rt_once(rt: bool) {
    use libc::{MCL_CURRENT, SCHED_FIFO, mlockall, sched_param, sched_setscheduler};
    use std::sync::OnceLock;
    static RT_ONCE: OnceLock<()> = OnceLock::new();

    if !rt {
        return;
    }
    RT_ONCE.get_or_init(|| {
        let rc = unsafe { mlockall(MCL_CURRENT) };
        if rc != 0 {
            tracing::warn!(
                error = %std::io::Error::last_os_error(),
                "mlockall(current) refused, continuing unlocked"
            );
        }

        let prio = unsafe { libc::sched_get_priority_min(SCHED_FIFO) }.max(1);
        let param = sched_param {
            sched_priority: prio,
        };
        let rc = unsafe { sched_setscheduler(0, SCHED_FIFO, &raw const param) };
        if rc != 0 {
            tracing::warn!(
                error = %std::io::Error::last_os_error(),
                "SCHED_FIFO refused (needs CAP_SYS_NICE), staying on the default scheduler"
            );
        } else {
            tracing::info!(prio, "realtime scheduling enabled");
        }
    });
}

#[cfg(target_os = "macos")]
pub fn setup_rt_once(rt: bool) {
    use libc::{MCL_CURRENT, mlockall};
    use std::sync::OnceLock;
    static RT_ONCE: OnceLock<()> = OnceLock::new();

    if !rt {
        return;
    }
    RT_ONCE.get_or_init(|| {
        let rc = unsafe { mlockall(MCL_CURRENT) };
        if rc != 0 {
            tracing::warn!(
                error = %std::io::Error::last_os_error(),
                "mlockall(current) refused, continuing unlocked"
            );
        }
    });
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
pub fn setup_rt_once(rt: bool) {
    if rt {
        tracing::warn!("realtime mode is not supported on this platform");
    }
}
