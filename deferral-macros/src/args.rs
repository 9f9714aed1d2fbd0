use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::{Error, Expr, ExprLit, Lit, MetaNameValue, Token};

/// Default bound on how long a test waits for its value to settle.
const DEFAULT_TIMEOUT_MS: u64 = 5_000;

/// Arguments of `#[deferral::test(...)]`.
pub(crate) struct TestArgs {
    /// How long to wait for the returned value before failing.
    pub(crate) timeout_ms: u64,
}

impl Parse for TestArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut args = TestArgs {
            timeout_ms: DEFAULT_TIMEOUT_MS,
        };

        let pairs = Punctuated::<MetaNameValue, Token![,]>::parse_terminated(input)?;

        for pair in pairs {
            if !pair.path.is_ident("timeout_ms") {
                return Err(Error::new_spanned(
                    &pair.path,
                    "unknown argument, expected `timeout_ms`",
                ));
            }

            args.timeout_ms = match &pair.value {
                Expr::Lit(ExprLit {
                    lit: Lit::Int(lit), ..
                }) => lit.base10_parse()?,
                other => {
                    return Err(Error::new_spanned(
                        other,
                        "`timeout_ms` expects an integer literal",
                    ));
                }
            };
        }

        Ok(args)
    }
}
