mod args;
use args::TestArgs;

use proc_macro::TokenStream;
use quote::quote;
use syn::{Error, ItemFn, parse_macro_input};

/// Runs a function returning a `Deferred` as a test on a fresh event loop.
///
/// The body runs on the test thread with the loop's handle in context, so
/// `Deferred::new` and `deferral::pair` work inside it. The test fails if
/// the returned value rejects or does not settle within `timeout_ms`
/// (5000 by default).
///
/// ```rust,ignore
/// #[deferral::test(timeout_ms = 1000)]
/// fn resolves() -> Deferred {
///     Deferred::new(|resolver| {
///         resolver.resolve(1);
///         Ok(())
///     })
/// }
/// ```
#[proc_macro_attribute]
pub fn test(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as TestArgs);
    let input = parse_macro_input!(item as ItemFn);

    expand_test(args, input)
        .unwrap_or_else(Error::into_compile_error)
        .into()
}

fn expand_test(args: TestArgs, input: ItemFn) -> syn::Result<proc_macro2::TokenStream> {
    let attrs = &input.attrs;
    let vis = &input.vis;
    let sig = &input.sig;
    let block = &input.block;
    let name = &sig.ident;

    if let Some(asyncness) = sig.asyncness {
        return Err(Error::new_spanned(
            asyncness,
            "#[deferral::test] functions are not async; return a Deferred instead",
        ));
    }

    if !sig.inputs.is_empty() {
        return Err(Error::new_spanned(
            &sig.inputs,
            "#[deferral::test] functions take no arguments",
        ));
    }

    let timeout_ms = args.timeout_ms;

    Ok(quote! {
        #[::core::prelude::v1::test]
        #(#attrs)*
        #vis fn #name() {
            let event_loop = ::deferral::EventLoopBuilder::new()
                .build()
                .expect("failed to start event loop");

            let deferred: ::deferral::Deferred = event_loop.handle().enter(|| #block);

            match event_loop.block_on_timeout(
                &deferred,
                ::std::time::Duration::from_millis(#timeout_ms),
            ) {
                ::std::result::Result::Ok(::deferral::Outcome::Fulfilled(_)) => {}
                ::std::result::Result::Ok(::deferral::Outcome::Rejected(reason)) => {
                    panic!("deferred test rejected with {:?}", reason)
                }
                ::std::result::Result::Err(err) => {
                    panic!("deferred test did not settle: {}", err)
                }
            }
        }
    })
}
