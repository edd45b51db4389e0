use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{parse_macro_input, parse_quote, Data, DeriveInput, Field, Fields, Generics, Ident, Index, LitStr, Type};

pub fn derive_record_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let fields = match &input.data {
        Data::Struct(data) => &data.fields,
        _ => return Err(syn::Error::new_spanned(name, "Record can only be derived for structs")),
    };

    let types: Vec<&Type> = fields.iter().map(|f| &f.ty).collect();
    // Local bindings used while decoding, and the matching accessors on `self` while encoding
    let vars: Vec<Ident> = fields.iter().enumerate().map(|(i, f)| f.ident.clone().unwrap_or_else(|| format_ident!("field_{}", i))).collect();
    let accessors: Vec<TokenStream2> = fields
        .iter()
        .enumerate()
        .map(|(i, f)| match &f.ident {
            Some(ident) => quote! { #ident },
            None => {
                let index = Index::from(i);
                quote! { #index }
            }
        })
        .collect();

    let construct = match fields {
        Fields::Named(_) => quote! { Self { #(#vars),* } },
        Fields::Unnamed(_) => quote! { Self ( #(#vars),* ) },
        Fields::Unit => quote! { Self },
    };

    let arguments = match fields {
        Fields::Named(named) => {
            let params = named.named.iter().map(param_name).collect::<syn::Result<Vec<_>>>()?;
            quote! { #( stmt.bind_named(#params, &self.#accessors)?; )* }
        }
        _ => {
            reject_renames(fields)?;
            quote! { #( stmt.bind(&self.#accessors)?; )* }
        }
    };

    let decode_generics = bounded(&input.generics, &types, quote! { ::rowbind::Decode });
    let (decode_impl, decode_ty, decode_where) = decode_generics.split_for_impl();
    let encode_generics = bounded(&input.generics, &types, quote! { ::rowbind::Encode });
    let (encode_impl, encode_ty, encode_where) = encode_generics.split_for_impl();

    Ok(quote! {
        impl #decode_impl ::rowbind::Decode for #name #decode_ty #decode_where {
            const WIDTH: usize = 0 #(+ <#types as ::rowbind::Decode>::WIDTH)*;

            #[allow(unused_mut, unused_assignments, unused_variables)]
            fn decode(stmt: &::rowbind::Statement<'_>, column: usize) -> ::rowbind::Result<Self> {
                let mut column = column;
                #(
                    let #vars = <#types as ::rowbind::Decode>::decode(stmt, column)?;
                    column += <#types as ::rowbind::Decode>::WIDTH;
                )*
                Ok(#construct)
            }
        }

        impl #encode_impl ::rowbind::Encode for #name #encode_ty #encode_where {
            const PARAMS: usize = 0 #(+ <#types as ::rowbind::Encode>::PARAMS)*;

            #[allow(unused_mut, unused_assignments, unused_variables)]
            fn encode(&self, stmt: &mut ::rowbind::Statement<'_>, param: usize) -> ::rowbind::Result<()> {
                let mut param = param;
                #(
                    ::rowbind::Encode::encode(&self.#accessors, stmt, param)?;
                    param += <#types as ::rowbind::Encode>::PARAMS;
                )*
                Ok(())
            }

            #[allow(unused_variables)]
            fn encode_arguments(&self, stmt: &mut ::rowbind::Statement<'_>) -> ::rowbind::Result<()> {
                #arguments
                Ok(())
            }
        }
    })
}

/// Copy of `generics` with `field_ty: bound` added for every field type
fn bounded(generics: &Generics, types: &[&Type], bound: TokenStream2) -> Generics {
    let mut generics = generics.clone();
    let where_clause = generics.make_where_clause();
    for ty in types {
        where_clause.predicates.push(parse_quote! { #ty: #bound });
    }
    generics
}

/// Positional fields have no parameter name to rename
fn reject_renames(fields: &Fields) -> syn::Result<()> {
    match fields.iter().flat_map(|field| &field.attrs).find(|attr| attr.path().is_ident("record")) {
        Some(attr) => Err(syn::Error::new_spanned(attr, "record attributes are only supported on named fields")),
        None => Ok(()),
    }
}

/// The SQL parameter a named field binds to: `:field` unless renamed
fn param_name(field: &Field) -> syn::Result<String> {
    let mut name = field.ident.as_ref().map(|ident| ident.to_string().trim_start_matches("r#").to_owned()).unwrap_or_default();
    for attr in &field.attrs {
        if !attr.path().is_ident("record") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                let value: LitStr = meta.value()?.parse()?;
                name = value.value();
                Ok(())
            } else {
                Err(meta.error("unsupported record attribute, expected `rename`"))
            }
        })?;
    }

    if name.starts_with([':', '@', '$']) {
        Ok(name)
    } else {
        Ok(format!(":{}", name))
    }
}
