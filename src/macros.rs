// src/macros.rs
#[macro_export]
macro_rules! s {
    // String shorthand!
    () => {
        ::std::string::String::new()
    };
    ($expr:expr) => {
        ::std::string::String::from($expr)
    };
}

#[macro_export]
macro_rules! join {
    // Concatenate any number of &str-likes into one String
    ($first:expr $(, $rest:expr)+ $(,)?) => {{
        let mut s = ::std::string::String::from($first);
        $(
            s.push_str($rest);
        )+
        s
    }};
}

/// Build a `FormParams` from `key => value` pairs, in order.
///
/// ```ignore
/// let p = params! { AREA => "uf", SOURCE => AREA };
/// ```
#[macro_export]
macro_rules! params {
    () => {
        $crate::engine::FormParams::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut p = $crate::engine::FormParams::new();
        $(
            p.push($key, $value);
        )+
        p
    }};
}
