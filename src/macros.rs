//! Macros for building trees in code.

/// Builds a [`Node`](crate::Node) from `"key": value` pairs.
///
/// Values are `null`, nested `{ ... }` nodes, `[ ... ]` arrays, or any single token
/// tree convertible into a [`Value`](crate::Value). Wrap negative numbers and other
/// multi-token expressions in parentheses.
///
/// ```rust
/// use serde_rj::rj_node;
///
/// let node = rj_node! {
///     "name": "Alice",
///     "age": 30,
///     "offset": (-2),
///     "tags": ["rust", "serde"],
///     "server": { "port": 8080 },
///     "users": [{ "id": 1 }, { "id": 2 }],
/// };
///
/// assert_eq!(node.get_string("name"), "Alice");
/// assert_eq!(node.get_int("offset"), -2);
/// assert_eq!(node.get_int("server.port"), 8080);
/// assert_eq!(node.get_node_list("users").unwrap().len(), 2);
/// ```
#[macro_export]
macro_rules! rj_node {
    () => {
        $crate::Node::new()
    };

    ($($key:literal : $value:tt),+ $(,)?) => {{
        let mut node = $crate::Node::new();
        $(
            node.insert($key, $crate::rj_value!($value));
        )+
        node
    }};
}

/// Builds a single [`Value`](crate::Value) with the syntax of [`rj_node!`].
///
/// An array whose elements differ in kind cannot exist and becomes `null`.
#[macro_export]
macro_rules! rj_value {
    (null) => {
        $crate::Value::Null
    };

    ([]) => {
        $crate::Value::StringArray(::std::vec::Vec::new())
    };

    ([ $($elem:tt),+ $(,)? ]) => {
        <$crate::Value as ::core::convert::TryFrom<_>>::try_from(
            ::std::vec![$($crate::rj_value!($elem)),+],
        )
        .unwrap_or_default()
    };

    ({ $($body:tt)* }) => {
        $crate::Value::Node($crate::rj_node!($($body)*))
    };

    (( $($inner:tt)+ )) => {
        $crate::rj_value!($($inner)+)
    };

    ($other:expr) => {
        $crate::Value::from($other)
    };
}
