//! Formatting macros.
//!
//! Unlike the `*f` functions, these record the name of the calling function,
//! so `%Func` renders it.

/// Logs a formatted message at TRACE.
#[macro_export]
macro_rules! tracef {
    ($($arg:tt)+) => {
        $crate::facade::log_at(
            $crate::types::FacadeLevel::Trace,
            &$crate::callsite!(),
            format_args!($($arg)+),
        )
    };
}

/// Logs a formatted message at DEBUG.
#[macro_export]
macro_rules! debugf {
    ($($arg:tt)+) => {
        $crate::facade::log_at(
            $crate::types::FacadeLevel::Debug,
            &$crate::callsite!(),
            format_args!($($arg)+),
        )
    };
}

/// Logs a formatted message at INFO.
#[macro_export]
macro_rules! infof {
    ($($arg:tt)+) => {
        $crate::facade::log_at(
            $crate::types::FacadeLevel::Info,
            &$crate::callsite!(),
            format_args!($($arg)+),
        )
    };
}

/// Logs a formatted message at WARN.
#[macro_export]
macro_rules! warnf {
    ($($arg:tt)+) => {
        $crate::facade::log_at(
            $crate::types::FacadeLevel::Warn,
            &$crate::callsite!(),
            format_args!($($arg)+),
        )
    };
}

/// Logs a formatted message at ERROR.
#[macro_export]
macro_rules! errorf {
    ($($arg:tt)+) => {
        $crate::facade::log_at(
            $crate::types::FacadeLevel::Error,
            &$crate::callsite!(),
            format_args!($($arg)+),
        )
    };
}

/// Logs a formatted message at CRITICAL.
#[macro_export]
macro_rules! criticalf {
    ($($arg:tt)+) => {
        $crate::facade::log_at(
            $crate::types::FacadeLevel::Critical,
            &$crate::callsite!(),
            format_args!($($arg)+),
        )
    };
}

/// Logs a formatted message at INFO, like `print!` would write it.
#[macro_export]
macro_rules! printf {
    ($($arg:tt)+) => {
        $crate::facade::log_at(
            $crate::types::FacadeLevel::Print,
            &$crate::callsite!(),
            format_args!($($arg)+),
        )
    };
}

/// Logs a formatted message at ERROR and exits the process.
#[macro_export]
macro_rules! fatalf {
    ($($arg:tt)+) => {
        $crate::facade::fatal_at(&$crate::callsite!(), format_args!($($arg)+))
    };
}

/// Logs a formatted message at CRITICAL and panics.
#[macro_export]
macro_rules! panicf {
    ($($arg:tt)+) => {
        $crate::facade::panic_at(&$crate::callsite!(), format_args!($($arg)+))
    };
}

#[cfg(test)]
mod tests {
    use crate::facade::tests::{install, serial};
    use crate::facade::PANIC_MESSAGE;
    use std::panic::catch_unwind;

    #[test]
    fn every_macro_logs_at_its_level() {
        let _guard = serial();
        let buf = install("%LEV %Func %Msg");
        crate::tracef!("{}", 1);
        crate::debugf!("{}", 2);
        crate::infof!("{}", 3);
        crate::warnf!("{}", 4);
        crate::errorf!("{}", 5);
        crate::criticalf!("{}", 6);
        crate::printf!("{}", 7);
        let f = "every_macro_logs_at_its_level";
        assert_eq!(
            buf.text(),
            format!(
                "TRC {f} 1\nDBG {f} 2\nINF {f} 3\nWRN {f} 4\nERR {f} 5\nCRT {f} 6\nINF {f} 7\n",
                f = f
            )
        );
    }

    #[test]
    fn panicf_in_a_closure_names_the_outer_function() {
        let _guard = serial();
        let buf = install("%LEVEL %Line %Func %Msg");
        let line = line!() + 1;
        let err = catch_unwind(|| crate::panicf!("code {}", 7)).unwrap_err();
        assert_eq!(err.downcast_ref::<&str>(), Some(&PANIC_MESSAGE));
        assert_eq!(
            buf.text(),
            format!(
                "CRITICAL {} panicf_in_a_closure_names_the_outer_function code 7\n",
                line
            )
        );
    }
}
