#[macro_export]
macro_rules! expect {
    ($result:expr, $msg:expr) => {
        match $result {
            Ok(t) => t,
            Err(why) => {
                panic!("{}: {:?}", $msg, why);
            }
        }
    };
}

// Thin wrappers so call sites don't tie themselves to the log crate directly

#[macro_export]
macro_rules! ppg_trace {
    ($($args:tt)*) => {
        log::trace!($($args)*)
    };
}

#[macro_export]
macro_rules! ppg_debug {
    ($($args:tt)*) => {
        log::debug!($($args)*)
    };
}

#[macro_export]
macro_rules! ppg_info {
    ($($args:tt)*) => {
        log::info!($($args)*)
    };
}

#[macro_export]
macro_rules! ppg_warn {
    ($($args:tt)*) => {
        log::warn!($($args)*)
    };
}
