use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{
    parse_macro_input, spanned::Spanned, FnArg, GenericArgument, Ident, ItemFn, Pat, PathArguments,
    Signature, Type,
};

/// Transform an asynchronous test into a synchronous one, inject dependencies,
/// and ensure that any test database is dropped regardless of how the test
/// terminates.
///
/// By default the server runs on the in-memory store. `#[backend_test(mongodb)]`
/// runs it on a fresh MongoDB database instead; such tests are ignored unless
/// the `mongodb-tests` feature is enabled.
///
/// Injectable dependencies are [`rocket::local::asynchronous::Client`],
/// `Arc<crate::clock::ManualClock>` (the clock the server reads), and, for
/// MongoDB tests only, [`mongodb::Database`] and
/// [`crate::model::mongodb::Coll<T>`].
#[proc_macro_attribute]
pub fn backend_test(args: TokenStream, input: TokenStream) -> TokenStream {
    let mut item_fn = parse_macro_input!(input as ItemFn);

    let use_mongodb = match parse_macro_input!(args as Option<Ident>) {
        None => false,
        Some(arg) if arg == "mongodb" => true,
        Some(arg) => {
            return syn::Error::new(arg.span(), "Expected no argument or `mongodb`")
                .into_compile_error()
                .into();
        }
    };

    // Extract type information and reject invalid function signatures.
    let (test_args, collection_idents, collection_types) =
        match check_sig(item_fn.sig.clone(), use_mongodb) {
            Ok(args) => args,
            Err(err) => {
                return err.into_compile_error().into();
            }
        };

    // Rename the future so the test can have its original name.
    let name = item_fn.sig.ident.clone();
    let new_name = format_ident!("{}_fut", name);
    item_fn.sig.ident = new_name.clone();

    let maybe_ignore = if use_mongodb {
        quote! { #[cfg_attr(not(feature = "mongodb-tests"), ignore = "requires a MongoDB replica set")] }
    } else {
        quote! {}
    };

    // Rewrite the test function.
    quote! {
        #[test]
        #maybe_ignore
        fn #name() {
            /// The test itself.
            #item_fn

            // Create an async runtime. We need a separate one for inside and
            // outside the `catch_unwind`.
            let outer_runtime = rocket::tokio::runtime::Builder::new_multi_thread()
                .thread_name("test-setup-cleanup")
                .worker_threads(1)
                .enable_all()
                .build()
                .unwrap();
            let inner_runtime = rocket::tokio::runtime::Builder::new_multi_thread()
                .thread_name("rocket-worker-test-thread")
                .worker_threads(1)
                .enable_all()
                .build()
                .unwrap();

            // Run the setup.
            let crate::testing::TestContext { client, clock, db } =
                outer_runtime.block_on(crate::testing::setup(#use_mongodb));

            // Run the test, catching any panics.
            // Use mutexes to safely transfer `!UnwindSafe` data.
            let client_mutex = std::sync::Mutex::new(client);
            let clock_mutex = std::sync::Mutex::new(clock);
            let db_mutex = std::sync::Mutex::new(db.clone());
            let runtime_mutex = std::sync::Mutex::new(inner_runtime);
            let result = std::panic::catch_unwind(|| {
                #[allow(unused_variables)]
                let rocket_client = client_mutex.into_inner().unwrap();
                #[allow(unused_variables)]
                let clock = clock_mutex.into_inner().unwrap();
                #[allow(unused_variables)]
                let db = db_mutex.into_inner().unwrap();
                let runtime = runtime_mutex.into_inner().unwrap();

                #(
                    let #collection_idents = crate::model::mongodb::Coll::<#collection_types>::from_db(
                        db.as_ref().unwrap(),
                    );
                )*

                runtime.block_on(#new_name(#(#test_args),*));
            });

            // Run the cleanup.
            outer_runtime.block_on(crate::testing::cleanup(db));

            // If the test panicked, re-raise the panic.
            if let Err(cause) = result {
                std::panic::panic_any(cause);
            }
        }
    }
    .into()
}

/// Ensure the wrapped test is async, extract parameters to inject, and reject unknown parameters.
#[allow(clippy::type_complexity)]
fn check_sig(
    sig: Signature,
    use_mongodb: bool,
) -> Result<(Vec<TokenStream2>, Vec<Ident>, Vec<Ident>), syn::Error> {
    if sig.asyncness.is_none() {
        return Err(syn::Error::new(sig.span(), "Test must be marked `async`"));
    }

    let mut has_client = false;
    let mut has_clock = false;
    let mut has_db = false;
    let mut args = vec![];
    let mut collection_idents = vec![];
    let mut collection_types = vec![];

    let mongodb_only = |input: &FnArg, what: &str| {
        syn::Error::new(
            input.span(),
            format!("`{what}` is only available to `#[backend_test(mongodb)]`"),
        )
    };

    for input in &sig.inputs {
        if let FnArg::Typed(pat_type) = input {
            if let Pat::Ident(pat_ident) = &*pat_type.pat {
                if let Type::Path(type_path) = &*pat_type.ty {
                    // Valid as the last path segment for any type is itself
                    let last = match type_path.path.segments.last() {
                        Some(last) => last,
                        None => return Err(syn::Error::new(input.span(), "Expected a type")),
                    };
                    if last.ident == "Client" {
                        if has_client {
                            return Err(syn::Error::new(
                                input.span(),
                                "Test cannot accept more than one `rocket::local::asynchronous::Client`",
                            ));
                        }
                        has_client = true;
                        args.push(quote! { rocket_client });
                        continue;
                    } else if last.ident == "Arc" {
                        if has_clock {
                            return Err(syn::Error::new(
                                input.span(),
                                "Test cannot accept more than one `Arc<ManualClock>`",
                            ));
                        }
                        has_clock = true;
                        args.push(quote! { clock.clone() });
                        continue;
                    } else if last.ident == "Database" {
                        if !use_mongodb {
                            return Err(mongodb_only(input, "mongodb::Database"));
                        }
                        if has_db {
                            return Err(syn::Error::new(
                                input.span(),
                                "Test cannot accept more than one `mongodb::Database`",
                            ));
                        }
                        has_db = true;
                        args.push(quote! { db.clone().unwrap() });
                        continue;
                    } else if last.ident == "Coll" {
                        if !use_mongodb {
                            return Err(mongodb_only(input, "Coll<T>"));
                        }
                        if let PathArguments::AngleBracketed(generics) = &last.arguments {
                            if let Some(GenericArgument::Type(Type::Path(type_path))) =
                                generics.args.first()
                            {
                                if let Some(type_ident) = type_path.path.get_ident() {
                                    let ident = pat_ident.ident.clone();
                                    args.push(quote! { #ident });
                                    collection_idents.push(ident);
                                    collection_types.push(type_ident.clone());
                                    continue;
                                }
                            }
                        }
                    }
                }
            }
        }

        return Err(syn::Error::new(
            input.span(),
            "Expected one of `client_ident: Client`, `clock_ident: Arc<ManualClock>`, \
             `db_ident: Database` or `collection_ident: Coll<T>`",
        ));
    }

    Ok((args, collection_idents, collection_types))
}
