// SPDX-License-Identifier: MIT OR Apache-2.0

//! Call-site macros.
//!
//! Each macro captures `file!()`, `line!()` and the name of the enclosing function, builds the message
//! with `format_args!`, and submits the result to an engine:
//!
//! ```
//! # let (path, attempt) = ("/srv/data", 3);
//! sinkwise::error!("cannot open {path} (attempt {attempt})");
//! sinkwise::debug!("{:>8.3}", 2.5_f64);
//! ```
//!
//! Without further arguments the process-wide engine is used.  A leading `engine: <expr>,` targets a
//! specific engine instead:
//!
//! ```
//! let engine = sinkwise::Engine::new();
//! sinkwise::warning!(engine: &engine, "dropped: the engine is not running");
//! ```
//!
//! # Compiling logs out
//!
//! With the `silent` feature every macro except [`fatal!`](crate::fatal) expands to a branch that is
//! never taken; with `silent-fatal`, `fatal!` too.  Arguments are still type-checked but never
//! evaluated.  Calls to [`Engine::emit`](crate::Engine::emit) are unaffected.

use crate::level::Severity;

/// Whether macros at `severity` are compiled in.
#[doc(hidden)]
pub const fn compiled_in(severity: Severity) -> bool {
    match severity {
        Severity::Fatal => !cfg!(feature = "silent-fatal"),
        _ => !cfg!(feature = "silent"),
    }
}

/// Reduces the type name of a function item nested in the caller to the caller's own name.
#[doc(hidden)]
pub fn trim_function_name(path: &'static str) -> &'static str {
    let mut path = path.strip_suffix("::__here").unwrap_or(path);
    while let Some(outer) = path.strip_suffix("::{{closure}}") {
        path = outer;
    }
    path.rsplit("::").next().unwrap_or(path)
}

/// Whether macros at the given severity are compiled in.
#[macro_export]
macro_rules! log_enabled {
    ($severity:expr) => {
        $crate::hidden::compiled_in($severity)
    };
}

/// Name of the function the macro is expanded in.
#[doc(hidden)]
#[macro_export]
macro_rules! __function_name {
    () => {{
        fn __here() {}
        fn __name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        $crate::hidden::trim_function_name(__name_of(__here))
    }};
}

/// Logs at a severity chosen at run time.
///
/// ```
/// use sinkwise::Severity;
///
/// let severity = if 2 > 1 { Severity::Warning } else { Severity::Info };
/// sinkwise::log!(severity, "computed severity {severity}");
/// ```
#[macro_export]
macro_rules! log {
    (engine: $engine:expr, $severity:expr, $($arg:tt)+) => {{
        let __severity: $crate::Severity = $severity;
        if $crate::log_enabled!(__severity) {
            ($engine).emit(
                __severity,
                ::std::file!(),
                ::std::line!(),
                $crate::__function_name!(),
                ::std::format_args!($($arg)+),
            );
        }
    }};
    ($severity:expr, $($arg:tt)+) => {{
        let __severity: $crate::Severity = $severity;
        if $crate::log_enabled!(__severity) {
            $crate::emit(
                __severity,
                ::std::file!(),
                ::std::line!(),
                $crate::__function_name!(),
                ::std::format_args!($($arg)+),
            );
        }
    }};
}

/// Logs at [`Severity::Fatal`](crate::Severity::Fatal).  The record carries a backtrace.
#[macro_export]
macro_rules! fatal {
    (engine: $engine:expr, $($arg:tt)+) => {
        $crate::log!(engine: $engine, $crate::Severity::Fatal, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::log!($crate::Severity::Fatal, $($arg)+)
    };
}

/// Logs at [`Severity::Critical`](crate::Severity::Critical).
#[macro_export]
macro_rules! critical {
    (engine: $engine:expr, $($arg:tt)+) => {
        $crate::log!(engine: $engine, $crate::Severity::Critical, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::log!($crate::Severity::Critical, $($arg)+)
    };
}

/// Logs at [`Severity::Error`](crate::Severity::Error).
#[macro_export]
macro_rules! error {
    (engine: $engine:expr, $($arg:tt)+) => {
        $crate::log!(engine: $engine, $crate::Severity::Error, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::log!($crate::Severity::Error, $($arg)+)
    };
}

/// Logs at [`Severity::Warning`](crate::Severity::Warning).
#[macro_export]
macro_rules! warning {
    (engine: $engine:expr, $($arg:tt)+) => {
        $crate::log!(engine: $engine, $crate::Severity::Warning, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::log!($crate::Severity::Warning, $($arg)+)
    };
}

/// Logs at [`Severity::Info`](crate::Severity::Info).
#[macro_export]
macro_rules! info {
    (engine: $engine:expr, $($arg:tt)+) => {
        $crate::log!(engine: $engine, $crate::Severity::Info, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::log!($crate::Severity::Info, $($arg)+)
    };
}

/// Logs at [`Severity::Debug`](crate::Severity::Debug).
#[macro_export]
macro_rules! debug {
    (engine: $engine:expr, $($arg:tt)+) => {
        $crate::log!(engine: $engine, $crate::Severity::Debug, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::log!($crate::Severity::Debug, $($arg)+)
    };
}
