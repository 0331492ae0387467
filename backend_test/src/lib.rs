use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{parse_macro_input, spanned::Spanned, FnArg, ItemFn, Pat, Signature, Type};

/// Transform an asynchronous test into a synchronous one, inject dependencies,
/// and ensure that the test's scratch directory is removed regardless of how
/// the test terminates.
///
/// Injectable dependencies are [`rocket::local::asynchronous::Client`], the
/// [`std::path::PathBuf`] of the test's backing data file, and
/// `crate::model::store::FileStore`.
#[proc_macro_attribute]
pub fn backend_test(_args: TokenStream, input: TokenStream) -> TokenStream {
    let mut item_fn = parse_macro_input!(input as ItemFn);

    // Extract type information and reject invalid function signatures.
    let test_args = match check_sig(item_fn.sig.clone()) {
        Ok(args) => args,
        Err(err) => {
            return err.into_compile_error().into();
        }
    };

    // Rename the future so the test can have its original name.
    let name = item_fn.sig.ident.clone();
    let new_name = format_ident!("{}_fut", name);
    item_fn.sig.ident = new_name.clone();

    // Rewrite the test function.
    quote! {
        #[test]
        fn #name() {
            /// Test setup.
            async fn setup() -> (rocket::local::asynchronous::Client, std::path::PathBuf) {
                let data_file = crate::test_data_dir().join("questions.json");
                let rocket_client = rocket::local::asynchronous::Client::tracked(
                    crate::rocket_for_data_file(&data_file),
                )
                .await
                .unwrap();
                (rocket_client, data_file)
            }

            /// The test itself.
            #item_fn

            /// Test cleanup.
            fn cleanup(data_file: &std::path::Path) {
                if let Some(dir) = data_file.parent() {
                    let _ = std::fs::remove_dir_all(dir);
                }
            }

            // Create an async runtime to drive both the setup and the test.
            let runtime = rocket::tokio::runtime::Builder::new_multi_thread()
                .thread_name("rocket-worker-test-thread")
                .worker_threads(1)
                .enable_all()
                .build()
                .unwrap();

            // Run the setup.
            let (rocket_client, data_file) = runtime.block_on(setup());
            let scratch = data_file.clone();

            // Run the test, catching any panics.
            // Use mutexes to safely transfer `!UnwindSafe` data.
            let client_mutex = std::sync::Mutex::new(rocket_client);
            let path_mutex = std::sync::Mutex::new(data_file);
            let runtime_mutex = std::sync::Mutex::new(runtime);
            let result = std::panic::catch_unwind(|| {
                let rocket_client = client_mutex.into_inner().unwrap();
                let data_file = path_mutex.into_inner().unwrap();
                let runtime = runtime_mutex.into_inner().unwrap();
                let _ = (&rocket_client, &data_file);

                runtime.block_on(#new_name(#(#test_args),*));
            });

            // Run the cleanup.
            cleanup(&scratch);

            // If the test panicked, re-raise the panic.
            if let Err(cause) = result {
                std::panic::panic_any(cause);
            }
        }
    }
    .into()
}

/// Ensure the wrapped test is async, extract parameters to inject, and reject unknown parameters.
fn check_sig(sig: Signature) -> Result<Vec<TokenStream2>, syn::Error> {
    if sig.asyncness.is_none() {
        return Err(syn::Error::new(sig.span(), "Test must be marked `async`"));
    }

    let mut has_client = false;
    let mut has_path = false;
    let mut has_store = false;
    let mut args = vec![];

    for input in &sig.inputs {
        if let FnArg::Typed(pat_type) = input {
            if let (Pat::Ident(_), Type::Path(type_path)) = (&*pat_type.pat, &*pat_type.ty) {
                // Valid as the last path segment for any type is itself.
                let type_ident = &type_path.path.segments.last().unwrap().ident;
                if type_ident == "Client" {
                    if has_client {
                        return Err(syn::Error::new(
                            input.span(),
                            "Test cannot accept more than one `rocket::local::asynchronous::Client`",
                        ));
                    }
                    has_client = true;
                    args.push(quote! { rocket_client });
                    continue;
                } else if type_ident == "PathBuf" {
                    if has_path {
                        return Err(syn::Error::new(
                            input.span(),
                            "Test cannot accept more than one `std::path::PathBuf`",
                        ));
                    }
                    has_path = true;
                    args.push(quote! { data_file.clone() });
                    continue;
                } else if type_ident == "FileStore" {
                    if has_store {
                        return Err(syn::Error::new(
                            input.span(),
                            "Test cannot accept more than one `FileStore`",
                        ));
                    }
                    has_store = true;
                    args.push(quote! { crate::model::store::FileStore::new(&data_file) });
                    continue;
                }
            }
        }

        return Err(syn::Error::new(
            input.span(),
            "Expected one of `client_ident: Client`, `path_ident: PathBuf` or `store_ident: FileStore`",
        ));
    }

    Ok(args)
}
