//! Logging macros.
//!
//! The function tag is filled in with the name of the enclosing function.
//!
//! ```ignore
//! rt_warn!(LOGGER, "Net", "retry {} of {}", attempt, max);
//! rt_dump!(LOGGER, LogLevel::Debug, "Net", &frame[..len]);
//! ```

/// Name of the enclosing function (closures report their parent).
#[macro_export]
macro_rules! function_name {
    () => {{
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            ::core::any::type_name::<T>()
        }
        let name = type_name_of(f);
        // strip the trailing "::f"
        let name = &name[..name.len() - 3];
        let name = name.trim_end_matches("::{{closure}}");
        match name.rfind("::") {
            Some(pos) => &name[pos + 2..],
            None => name,
        }
    }};
}

/// Log at an explicit level; evaluates to the [`LogResult`](crate::LogResult).
#[macro_export]
macro_rules! rt_log {
    ($logger:expr, $level:expr, $component:expr, $($arg:tt)+) => {
        $logger.log($level, $component, $crate::function_name!(), format_args!($($arg)+))
    };
}

/// Trace log (maximum verbosity).
#[macro_export]
macro_rules! rt_trace {
    ($logger:expr, $component:expr, $($arg:tt)+) => {{
        let _ = $crate::rt_log!($logger, $crate::LogLevel::Trace, $component, $($arg)+);
    }};
}

/// Debug log.
#[macro_export]
macro_rules! rt_debug {
    ($logger:expr, $component:expr, $($arg:tt)+) => {{
        let _ = $crate::rt_log!($logger, $crate::LogLevel::Debug, $component, $($arg)+);
    }};
}

/// Info log.
#[macro_export]
macro_rules! rt_info {
    ($logger:expr, $component:expr, $($arg:tt)+) => {{
        let _ = $crate::rt_log!($logger, $crate::LogLevel::Info, $component, $($arg)+);
    }};
}

/// Warning log.
#[macro_export]
macro_rules! rt_warn {
    ($logger:expr, $component:expr, $($arg:tt)+) => {{
        let _ = $crate::rt_log!($logger, $crate::LogLevel::Warn, $component, $($arg)+);
    }};
}

/// Error log.
#[macro_export]
macro_rules! rt_error {
    ($logger:expr, $component:expr, $($arg:tt)+) => {{
        let _ = $crate::rt_log!($logger, $crate::LogLevel::Error, $component, $($arg)+);
    }};
}

/// Critical log.
#[macro_export]
macro_rules! rt_crit {
    ($logger:expr, $component:expr, $($arg:tt)+) => {{
        let _ = $crate::rt_log!($logger, $crate::LogLevel::Crit, $component, $($arg)+);
    }};
}

/// Hex dump of a byte slice, 16 bytes per record.
#[macro_export]
macro_rules! rt_dump {
    ($logger:expr, $level:expr, $component:expr, $bytes:expr) => {
        $logger.dump_buffer($level, $component, $crate::function_name!(), $bytes)
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_function_name_of_enclosing_fn() {
        assert_eq!(function_name!(), "test_function_name_of_enclosing_fn");
    }

    #[test]
    fn test_function_name_inside_closure() {
        let name = (|| function_name!())();
        assert_eq!(name, "test_function_name_inside_closure");
    }
}
