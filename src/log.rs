macro_rules! log {
    ($level:ident, $tracing_level:ident, $($arg:tt)*) => {{
        if crate::environment::logging_enabled(crate::environment::LoggingLevel::$level) {
            tracing::event!(
                target: "ortvalue",
                tracing::Level::$tracing_level,
                log_id = crate::environment::current_log_id(),
                $($arg)*
            );
        }
    }};
}
macro_rules! verbose {
    ($($arg:tt)*) => {{
        crate::log::log!(Verbose, TRACE, $($arg)*);
    }};
}
macro_rules! info {
    ($($arg:tt)*) => {{
        crate::log::log!(Info, INFO, $($arg)*);
    }};
}
macro_rules! warning {
    ($($arg:tt)*) => {{
        crate::log::log!(Warning, WARN, $($arg)*);
    }};
}
macro_rules! error {
    ($($arg:tt)*) => {{
        crate::log::log!(Error, ERROR, $($arg)*);
    }};
}
pub(crate) use error;
pub(crate) use info;
pub(crate) use log;
pub(crate) use verbose;
pub(crate) use warning;
