//! Shared pieces of the per-crate error enums.
//!
//! Every crate defines its own `thiserror` enum whose variants carry an optional
//! `context: Option<Cow<'static, str>>`. [`format_context`] renders it in the
//! `Display` message and [`error_context!`](crate::error_context) generates the
//! `.context(..)` extension that wraps a foreign error into a variant.

use std::borrow::Cow;

/// Renders ` (context)` or nothing.
#[must_use]
pub fn format_context(context: &Option<Cow<'static, str>>) -> Cow<'static, str> {
    context.as_ref().map_or(Cow::Borrowed(""), |c| Cow::Owned(format!(" ({c})")))
}

/// Declares an extension trait adding `.context(..)` to foreign results.
///
/// Each `Source => Variant` pair maps `Result<T, Source>` into the variant
/// `Error::Variant { source, context }`.
///
/// ```rust
/// use std::borrow::Cow;
///
/// #[derive(Debug, thiserror::Error)]
/// pub enum ParseError {
///     #[error("Bad number{}: {source}", ninja_domain::error::format_context(.context))]
///     Number { source: std::num::ParseIntError, context: Option<Cow<'static, str>> },
/// }
///
/// ninja_domain::error_context!(ParseErrorExt, ParseError {
///     std::num::ParseIntError => Number,
/// });
///
/// let err = "x".parse::<u8>().context("PORT").unwrap_err();
/// assert!(err.to_string().starts_with("Bad number (PORT)"));
/// ```
#[macro_export]
macro_rules! error_context {
    ($ext:ident, $error:ident { $($source:ty => $variant:ident),+ $(,)? }) => {
        pub trait $ext<T> {
            fn context(
                self,
                context: impl Into<::std::borrow::Cow<'static, str>>,
            ) -> ::std::result::Result<T, $error>;
        }

        $(
            impl<T> $ext<T> for ::std::result::Result<T, $source> {
                fn context(
                    self,
                    context: impl Into<::std::borrow::Cow<'static, str>>,
                ) -> ::std::result::Result<T, $error> {
                    self.map_err(|source| $error::$variant {
                        source,
                        context: Some(context.into()),
                    })
                }
            }
        )+
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_context_renders_nothing() {
        assert_eq!(format_context(&None), "");
        assert_eq!(format_context(&Some("Ping".into())), " (Ping)");
    }
}
