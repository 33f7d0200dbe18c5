/// Returns the name of type `$t` as a string literal. The type alias keeps
/// `$t` visible to renames.
macro_rules! name_of {
    ($t:ty) => {{
        type _T = $t;
        stringify!($t)
    }};
}
pub(crate) use name_of;
