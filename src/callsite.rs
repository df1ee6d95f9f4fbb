//! Caller locations.
//!
//! A [`CallSite`] is captured once, at the public entry point the user called,
//! and then handed down by reference through every internal layer. Nothing is
//! counted or restored along the way, so nested delegation (for example
//! `fatalf` formatting its message and reusing the `fatal` path) cannot shift
//! the reported location.
use slog::RecordLocation;
use std::panic::Location;

/// The source location of a logging call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallSite {
    file: &'static str,
    line: u32,
    column: u32,
    module: &'static str,
    function: &'static str,
}
impl CallSite {
    /// Makes a new `CallSite`.
    ///
    /// `module` and `function` may be empty when they are not known.
    pub const fn new(
        file: &'static str,
        line: u32,
        column: u32,
        module: &'static str,
        function: &'static str,
    ) -> Self {
        CallSite {
            file,
            line,
            column,
            module,
            function,
        }
    }

    /// Returns the location of the caller of the enclosing `#[track_caller]` function.
    ///
    /// Only file, line and column are known on this path.
    #[track_caller]
    pub fn caller() -> Self {
        let location: &'static Location<'static> = Location::caller();
        CallSite::new(location.file(), location.line(), location.column(), "", "")
    }

    /// Source file, as recorded by the compiler.
    pub fn file(&self) -> &'static str {
        self.file
    }

    /// Line number.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Column number.
    pub fn column(&self) -> u32 {
        self.column
    }

    /// Module path (empty if unknown).
    pub fn module(&self) -> &'static str {
        self.module
    }

    /// Full path of the calling function (empty if unknown).
    pub fn function(&self) -> &'static str {
        self.function
    }

    pub(crate) fn to_record_location(self) -> RecordLocation {
        RecordLocation {
            file: self.file,
            line: self.line,
            column: self.column,
            function: self.function,
            module: self.module,
        }
    }
}

#[doc(hidden)]
pub fn type_name_of<T>(_: T) -> &'static str {
    std::any::type_name::<T>()
}

/// Turns the type name of an item declared inside a function
/// (`my_crate::worker::run::__f`) into the function path (`my_crate::worker::run`).
#[doc(hidden)]
pub fn function_path(item_type_name: &'static str) -> &'static str {
    let mut path = item_type_name;
    if let Some(i) = path.rfind("::") {
        path = &path[..i];
    }
    while let Some(stripped) = path.strip_suffix("::{{closure}}") {
        path = stripped;
    }
    path
}

/// Last segment of a function path (`run` for `my_crate::worker::run`).
pub(crate) fn short_function_name(path: &str) -> &str {
    match path.rfind("::") {
        Some(i) => &path[i + 2..],
        None => path,
    }
}

/// Captures the [`CallSite`] of the macro invocation, including the enclosing function.
#[macro_export]
macro_rules! callsite {
    () => {{
        fn __f() {}
        $crate::CallSite::new(
            file!(),
            line!(),
            column!(),
            module_path!(),
            $crate::callsite::function_path($crate::callsite::type_name_of(__f)),
        )
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[track_caller]
    fn outer() -> CallSite {
        inner()
    }

    #[track_caller]
    fn inner() -> CallSite {
        CallSite::caller()
    }

    #[test]
    fn caller_sees_through_nested_track_caller_layers() {
        let line = line!() + 1;
        let site = outer();
        assert_eq!(site.line(), line);
        assert!(site.file().ends_with("callsite.rs"));
        assert_eq!(site.function(), "");
    }

    #[test]
    fn macro_captures_enclosing_function() {
        let site = callsite!();
        assert_eq!(
            site.function(),
            "stdlog_shim::callsite::tests::macro_captures_enclosing_function"
        );
        assert_eq!(site.module(), "stdlog_shim::callsite::tests");
        assert_eq!(
            short_function_name(site.function()),
            "macro_captures_enclosing_function"
        );
    }

    #[test]
    fn closures_are_stripped_from_function_path() {
        let site = (|| callsite!())();
        assert_eq!(
            site.function(),
            "stdlog_shim::callsite::tests::closures_are_stripped_from_function_path"
        );
    }

    #[test]
    fn function_path_handles_plain_names() {
        assert_eq!(function_path("a::b::__f"), "a::b");
        assert_eq!(function_path("a::b::{{closure}}::__f"), "a::b");
        assert_eq!(function_path("__f"), "__f");
        assert_eq!(short_function_name("a::b"), "b");
        assert_eq!(short_function_name("main"), "main");
    }
}
