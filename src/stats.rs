//! Process runtime statistics for the watch loop.
//!
//! Sampling is best-effort: keys a platform cannot provide are left out
//! of the record. On Linux everything below is available; other Unixes
//! report a subset.

use std::time::Instant;

use crate::Record;

pub(crate) struct Sampler {
    started: Instant,
}

impl Sampler {
    pub fn new() -> Sampler {
        Sampler {
            started: Instant::now(),
        }
    }

    /// Samples the current process statistics into a record.
    ///
    /// Keys: `uptime_ms`, `rss`, `vm_size` (bytes), `threads`,
    /// `cpu_user_ms`, `cpu_sys_ms`, `open_fds`.
    pub fn sample(&self) -> Record {
        let mut record = Record::new();
        record.insert("uptime_ms", self.started.elapsed().as_millis() as u64);
        if let Some(rss) = resident_bytes() {
            record.insert("rss", rss);
        }
        if let Some(vm_size) = virtual_bytes() {
            record.insert("vm_size", vm_size);
        }
        if let Some(threads) = thread_count() {
            record.insert("threads", threads);
        }
        if let Some((user_ms, sys_ms)) = cpu_times() {
            record.insert("cpu_user_ms", user_ms);
            record.insert("cpu_sys_ms", sys_ms);
        }
        if let Some(open_fds) = open_fds() {
            record.insert("open_fds", open_fds);
        }
        record
    }
}

// /proc/self/statm fields are in pages: size resident shared text lib data dt
#[cfg(target_os = "linux")]
fn statm_field(index: usize) -> Option<u64> {
    let statm = std::fs::read_to_string("/proc/self/statm").ok()?;
    let pages: u64 = statm.split_whitespace().nth(index)?.parse().ok()?;
    let page_size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) } as u64;
    Some(pages * page_size)
}

#[cfg(target_os = "linux")]
fn resident_bytes() -> Option<u64> {
    statm_field(1)
}

#[cfg(target_os = "macos")]
fn resident_bytes() -> Option<u64> {
    let mut usage = unsafe { std::mem::zeroed::<libc::rusage>() };
    if unsafe { libc::getrusage(libc::RUSAGE_SELF, &mut usage) } == 0 {
        // ru_maxrss is reported in bytes on macOS
        Some(usage.ru_maxrss as u64)
    } else {
        None
    }
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
fn resident_bytes() -> Option<u64> {
    None
}

#[cfg(target_os = "linux")]
fn virtual_bytes() -> Option<u64> {
    statm_field(0)
}

#[cfg(not(target_os = "linux"))]
fn virtual_bytes() -> Option<u64> {
    None
}

#[cfg(target_os = "linux")]
fn thread_count() -> Option<u64> {
    let tasks = std::fs::read_dir("/proc/self/task").ok()?;
    Some(tasks.count() as u64)
}

#[cfg(not(target_os = "linux"))]
fn thread_count() -> Option<u64> {
    None
}

#[cfg(unix)]
fn cpu_times() -> Option<(u64, u64)> {
    let mut usage = unsafe { std::mem::zeroed::<libc::rusage>() };
    if unsafe { libc::getrusage(libc::RUSAGE_SELF, &mut usage) } != 0 {
        return None;
    }
    let millis = |tv: libc::timeval| (tv.tv_sec as u64) * 1000 + (tv.tv_usec as u64) / 1000;
    Some((millis(usage.ru_utime), millis(usage.ru_stime)))
}

#[cfg(not(unix))]
fn cpu_times() -> Option<(u64, u64)> {
    None
}

#[cfg(target_os = "linux")]
fn open_fds() -> Option<u64> {
    let fds = std::fs::read_dir("/proc/self/fd").ok()?;
    Some(fds.count() as u64)
}

#[cfg(not(target_os = "linux"))]
fn open_fds() -> Option<u64> {
    None
}
