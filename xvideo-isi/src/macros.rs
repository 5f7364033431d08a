#[cfg(not(test))]
#[cfg(feature = "log")]
macro_rules! isi_log {
    (trace, $($arg:expr),*) => { log::trace!($($arg),*) };
    (debug, $($arg:expr),*) => { log::debug!($($arg),*) };
    (info, $($arg:expr),*) => { log::info!($($arg),*) };
    (warn, $($arg:expr),*) => { log::warn!($($arg),*) };
}

#[cfg(any(test, not(feature = "log")))]
macro_rules! isi_log {
    ($level:ident, $($arg:expr),*) => {{ $( let _ = $arg; )* }}
}

macro_rules! isi_trace {
    ($($arg:expr),*) => (isi_log!(trace, $($arg),*));
}

macro_rules! isi_debug {
    ($($arg:expr),*) => (isi_log!(debug, $($arg),*));
}

macro_rules! isi_info {
    ($($arg:expr),*) => (isi_log!(info, $($arg),*));
}

macro_rules! isi_warn {
    ($($arg:expr),*) => (isi_log!(warn, $($arg),*));
}
