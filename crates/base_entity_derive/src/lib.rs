//! `#[base_entity]` fills in the columns every recipy table shares (uuid
//! primary key plus created/updated timestamps) and wires the matching
//! DAO traits onto the generated sea-orm types.
//!
//! Child tables pass `parent = "<fk field>"` so the DAO layer can query them
//! by their owning row without naming the column.

use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use std::collections::HashSet;
use syn::{
    Expr, ExprLit, Fields, Ident, ItemStruct, Lit, LitStr, Meta, Path, Token, parse_macro_input,
    parse_str, punctuated::Punctuated,
};

struct Options {
    traits_path: Path,
    parent: Option<Ident>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            traits_path: parse_str("crate::db::dao::base_traits")
                .expect("default traits path should parse"),
            parent: None,
        }
    }
}

#[proc_macro_attribute]
pub fn base_entity(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr with Punctuated<Meta, Token![,]>::parse_terminated);
    let options = match parse_options(args) {
        Ok(options) => options,
        Err(err) => return err.to_compile_error().into(),
    };

    let mut input = parse_macro_input!(item as ItemStruct);
    let Fields::Named(fields) = &mut input.fields else {
        return syn::Error::new_spanned(&input, "base_entity requires a struct with named fields")
            .to_compile_error()
            .into();
    };

    let declared: HashSet<String> = fields
        .named
        .iter()
        .filter_map(|field| field.ident.as_ref().map(ToString::to_string))
        .collect();

    if let Some(parent) = &options.parent {
        if !declared.contains(&parent.to_string()) {
            return syn::Error::new(
                parent.span(),
                format!("parent column `{parent}` is not a field of this model"),
            )
            .to_compile_error()
            .into();
        }
    }

    let mut shared: Punctuated<syn::Field, Token![,]> = Punctuated::new();
    if !declared.contains("id") {
        shared.push(syn::parse_quote! {
            #[sea_orm(primary_key, auto_increment = false)]
            pub id: uuid::Uuid
        });
    }
    for name in ["created_at", "updated_at"] {
        if declared.contains(name) {
            continue;
        }
        let ident = Ident::new(name, Span::call_site());
        shared.push(syn::parse_quote! {
            #[sea_orm(default_expr = "Expr::current_timestamp()")]
            pub #ident: sea_orm::entity::prelude::DateTimeWithTimeZone
        });
    }
    shared.extend(fields.named.iter().cloned());
    fields.named = shared;

    let traits = &options.traits_path;
    let parent_impl = options.parent.as_ref().map(|parent| {
        let variant = Ident::new(&pascal_case(&parent.to_string()), parent.span());
        quote! {
            impl #traits::HasParentColumn for Entity {
                fn parent_column() -> Column {
                    Column::#variant
                }
            }
        }
    });

    quote! {
        #input

        impl #traits::HasIdActiveModel for ActiveModel {
            fn set_id(&mut self, id: uuid::Uuid) {
                self.id = sea_orm::ActiveValue::Set(id);
            }
        }

        impl #traits::TimestampedActiveModel for ActiveModel {
            fn set_created_at(&mut self, ts: sea_orm::entity::prelude::DateTimeWithTimeZone) {
                self.created_at = sea_orm::ActiveValue::Set(ts);
            }

            fn set_updated_at(&mut self, ts: sea_orm::entity::prelude::DateTimeWithTimeZone) {
                self.updated_at = sea_orm::ActiveValue::Set(ts);
            }
        }

        impl #traits::HasCreatedAtColumn for Entity {
            fn created_at_column() -> Column {
                Column::CreatedAt
            }

            fn id_column() -> Column {
                Column::Id
            }
        }

        #parent_impl
    }
    .into()
}

fn parse_options(args: Punctuated<Meta, Token![,]>) -> Result<Options, syn::Error> {
    let mut options = Options::default();
    for meta in args {
        let Meta::NameValue(pair) = meta else {
            return Err(syn::Error::new_spanned(
                meta,
                "expected key = \"value\", e.g. parent = \"recipe_id\"",
            ));
        };
        let value = string_value(&pair.value)?;
        match pair.path.get_ident().map(ToString::to_string).as_deref() {
            Some("traits") => {
                options.traits_path = value.parse::<Path>().map_err(|err| {
                    syn::Error::new(value.span(), format!("invalid traits path: {err}"))
                })?;
            }
            Some("parent") => {
                options.parent = Some(Ident::new(&value.value(), value.span()));
            }
            _ => {
                return Err(syn::Error::new_spanned(
                    &pair.path,
                    "unknown base_entity option; expected `traits` or `parent`",
                ));
            }
        }
    }
    Ok(options)
}

fn string_value(expr: &Expr) -> Result<LitStr, syn::Error> {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Str(lit), ..
        }) => Ok(lit.clone()),
        other => Err(syn::Error::new_spanned(other, "expected a string literal")),
    }
}

fn pascal_case(snake: &str) -> String {
    snake
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}
