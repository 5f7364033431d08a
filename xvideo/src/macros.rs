#[cfg(not(test))]
#[cfg(feature = "log")]
macro_rules! xv_log {
    (trace, $($arg:expr),*) => { log::trace!($($arg),*) };
    (debug, $($arg:expr),*) => { log::debug!($($arg),*) };
    (info, $($arg:expr),*) => { log::info!($($arg),*) };
    (warn, $($arg:expr),*) => { log::warn!($($arg),*) };
}

#[cfg(any(test, not(feature = "log")))]
macro_rules! xv_log {
    ($level:ident, $($arg:expr),*) => {{ $( let _ = $arg; )* }}
}

macro_rules! xv_trace {
    ($($arg:expr),*) => (xv_log!(trace, $($arg),*));
}

macro_rules! xv_debug {
    ($($arg:expr),*) => (xv_log!(debug, $($arg),*));
}

macro_rules! xv_info {
    ($($arg:expr),*) => (xv_log!(info, $($arg),*));
}

macro_rules! xv_warn {
    ($($arg:expr),*) => (xv_log!(warn, $($arg),*));
}
