use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{parse_macro_input, spanned::Spanned, FnArg, Ident, ItemFn, Pat, Signature, Type};

/// Transform an asynchronous test into a synchronous one against a fresh in-memory
/// server, optionally logged in, and inject its client.
///
/// The only injectable dependency is [`rocket::local::asynchronous::Client`].
/// `#[backend_test(admin)]` logs in as the default admin, `#[backend_test(voter)]`
/// registers and logs in as `VoterRegistration::example()`, and
/// `#[backend_test(candidate)]` has the admin register
/// `CandidateRegistration::example("Red", "Ann")` and then logs in as it.
#[proc_macro_attribute]
pub fn backend_test(args: TokenStream, input: TokenStream) -> TokenStream {
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

    let admin_login = quote! {
        rocket_client
            .post("/auth/admin")
            .header(rocket::http::ContentType::JSON)
            .body(rocket::serde::json::json!({
                "username": crate::model::db::admin::DEFAULT_ADMIN_USERNAME,
                "password": crate::TEST_ADMIN_PASSWORD,
            }).to_string())
            .dispatch()
            .await;
    };

    // Log in the client as admin/voter/candidate if needed.
    let maybe_login = match parse_macro_input!(args as Option<Ident>) {
        None => TokenStream2::new(),
        Some(arg) if arg == "admin" => admin_login,
        Some(arg) if arg == "voter" => quote! {
            rocket_client
                .post("/voters")
                .header(rocket::http::ContentType::JSON)
                .body(rocket::serde::json::json!(crate::model::api::voter::VoterRegistration::example()).to_string())
                .dispatch()
                .await;

            rocket_client
                .post("/auth/voter")
                .header(rocket::http::ContentType::JSON)
                .body(rocket::serde::json::json!(crate::model::api::voter::VoterCredentials::example()).to_string())
                .dispatch()
                .await;
        },
        Some(arg) if arg == "candidate" => quote! {
            #admin_login

            let registration = crate::model::api::candidate::CandidateRegistration::example("Red", "Ann");
            rocket_client
                .post("/candidates")
                .header(rocket::http::ContentType::JSON)
                .body(rocket::serde::json::json!(registration).to_string())
                .dispatch()
                .await;

            rocket_client.delete("/auth").dispatch().await;

            rocket_client
                .post("/auth/candidate")
                .header(rocket::http::ContentType::JSON)
                .body(rocket::serde::json::json!({
                    "party_name": registration.party_name,
                    "password": registration.password,
                }).to_string())
                .dispatch()
                .await;
        },
        Some(arg) => {
            return syn::Error::new(arg.span(), "Expected one of `admin`, `voter` or `candidate`")
                .into_compile_error()
                .into();
        }
    };

    // Rewrite the test function.
    quote! {
        #[test]
        fn #name() {
            /// Test setup.
            async fn setup() -> rocket::local::asynchronous::Client {
                let rocket_client = rocket::local::asynchronous::Client::tracked(crate::test_rocket())
                    .await
                    .unwrap();

                #maybe_login

                rocket_client
            }

            /// The test itself.
            #item_fn

            let runtime = rocket::tokio::runtime::Builder::new_multi_thread()
                .thread_name("rocket-worker-test-thread")
                .worker_threads(1)
                .enable_all()
                .build()
                .unwrap();

            runtime.block_on(async {
                let rocket_client = setup().await;
                #new_name(#(#test_args),*).await
            });
        }
    }
    .into()
}

/// Ensure the wrapped test is async, extract parameters to inject, and reject unknown parameters.
fn check_sig(sig: Signature) -> Result<Vec<TokenStream2>, syn::Error> {
    if sig.asyncness.is_none() {
        return Err(syn::Error::new(sig.span(), "Test must be marked `async`"));
    }

    let mut args = vec![];

    for input in &sig.inputs {
        if let FnArg::Typed(pat_type) = input {
            if let (Pat::Ident(_), Type::Path(type_path)) = (&*pat_type.pat, &*pat_type.ty) {
                let is_client = type_path
                    .path
                    .segments
                    .last()
                    .map_or(false, |segment| segment.ident == "Client");
                if is_client {
                    if !args.is_empty() {
                        return Err(syn::Error::new(
                            input.span(),
                            "Test cannot accept more than one `rocket::local::asynchronous::Client`",
                        ));
                    }
                    args.push(quote! { rocket_client });
                    continue;
                }
            }
        }

        return Err(syn::Error::new(
            input.span(),
            "Expected `client_ident: Client`",
        ));
    }

    Ok(args)
}
