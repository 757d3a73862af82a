use std::error::Error;

pub type DynError = Box<dyn Error + Send + Sync>;

/// Number of online CPU cores as reported by the OS.
pub fn available_cores() -> usize {
    #[cfg(target_family = "unix")]
    {
        let online = unsafe { libc::sysconf(libc::_SC_NPROCESSORS_ONLN) };
        if online > 0 {
            return online as usize;
        }
    }
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Format an optional crossing index for the debug listing.
pub fn format_crossing(crossing: Option<usize>) -> String {
    match crossing {
        Some(s) => format!("s={s}"),
        None => "-".to_string(),
    }
}
