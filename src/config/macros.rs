/// Configuration macros for zero-repetition config definitions
///
/// `config_struct!` defines a section struct, its defaults and its serde
/// behaviour in one declaration. Every generated struct carries
/// `#[serde(default)]`, so a partial TOML section only overrides the
/// fields it names.
///
/// # Example
/// ```rust,ignore
/// config_struct! {
///     pub struct ReclaimConfig {
///         dry_run: bool = false,
///         max_retries: u32 = 3,
///     }
/// }
/// ```
#[macro_export]
macro_rules! config_struct {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field_name:ident: $field_type:ty = $default_value:expr
            ),*
            $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
        #[serde(default)]
        $vis struct $name {
            $(
                $(#[$field_meta])*
                pub $field_name: $field_type,
            )*
        }

        impl Default for $name {
            fn default() -> Self {
                Self {
                    $(
                        $field_name: $default_value,
                    )*
                }
            }
        }
    };
}
