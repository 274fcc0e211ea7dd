//! Procedural macros for rowkeep.
//!
//! `#[derive(Record)]` turns a plain struct into a persisted record: it
//! generates static column metadata, row conversion in both directions and
//! identity access for the `rowkeep_core::Record` trait.

use proc_macro::TokenStream;

mod infer;
mod parse;

use parse::{IdKind, RecordDef, parse_record};

/// Derive macro for the `Record` trait.
///
/// # Attributes
///
/// - `#[rowkeep(table = "name")]` - Override table name (defaults to the pluralized snake_case struct name)
/// - `#[rowkeep(id)]` - Mark the identity field (defaults to the field named `id`)
/// - `#[rowkeep(column = "name")]` - Override column name
/// - `#[rowkeep(unique)]` - Add unique constraint
/// - `#[rowkeep(default = "expr")]` - Set default SQL expression
/// - `#[rowkeep(sql_type = "TYPE")]` - Override the inferred column type
/// - `#[rowkeep(skip)]` - Not persisted; filled with `Default::default()` on load
///
/// The identity field must be `Option<i64>` (unsaved while `None`) or
/// `i64` (unsaved while `0`).
///
/// # Example
///
/// ```ignore
/// use rowkeep::Record;
///
/// #[derive(Record)]
/// struct Person {
///     id: Option<i64>,
///     firstname: String,
///     surname: String,
/// }
/// ```
#[proc_macro_derive(Record, attributes(rowkeep))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as syn::DeriveInput);

    let record = match parse_record(&input) {
        Ok(r) => r,
        Err(e) => return e.to_compile_error().into(),
    };

    generate_record_impl(&record).into()
}

/// Generate the Record trait implementation from the parsed definition.
fn generate_record_impl(record: &RecordDef) -> proc_macro2::TokenStream {
    let name = &record.name;
    let table_name = &record.table_name;
    let id_column = &record.id_field().column_name;
    let (impl_generics, ty_generics, where_clause) = record.generics.split_for_impl();

    let field_infos = generate_field_infos(record);
    let to_row_body = generate_to_row(record);
    let from_row_body = generate_from_row(record);
    let (id_body, set_id_body) = generate_identity(record);

    quote::quote! {
        impl #impl_generics rowkeep_core::Record for #name #ty_generics #where_clause {
            const TABLE_NAME: &'static str = #table_name;
            const ID_COLUMN: &'static str = #id_column;

            fn fields() -> &'static [rowkeep_core::FieldInfo] {
                static FIELDS: &[rowkeep_core::FieldInfo] = &[
                    #field_infos
                ];
                FIELDS
            }

            fn to_row(&self) -> Vec<(&'static str, rowkeep_core::Value)> {
                #to_row_body
            }

            fn from_row(row: &rowkeep_core::Row) -> rowkeep_core::Result<Self> {
                #from_row_body
            }

            fn id(&self) -> Option<i64> {
                #id_body
            }

            fn set_id(&mut self, id: i64) {
                #set_id_body
            }
        }
    }
}

/// Generate the static FieldInfo entries.
fn generate_field_infos(record: &RecordDef) -> proc_macro2::TokenStream {
    let entries = record.persisted_fields().map(|field| {
        let field_name = field.name.to_string();
        let column_name = &field.column_name;
        let primary_key = field.id;
        let unique = field.unique;
        // The identity is assigned by the store, so it is nullable on the Rust side
        // even for plain `i64`.
        let nullable = field.nullable || field.id;

        let sql_type = match &field.sql_type {
            Some(explicit) => infer::parse_sql_type_attr(explicit),
            None => infer::infer_sql_type(&field.ty),
        };

        let default = match &field.default {
            Some(d) => quote::quote! { Some(#d) },
            None => quote::quote! { None },
        };

        quote::quote! {
            rowkeep_core::FieldInfo::new(#field_name, #column_name, #sql_type)
                .nullable(#nullable)
                .primary_key(#primary_key)
                .unique(#unique)
                .default_opt(#default)
        }
    });

    quote::quote! { #(#entries),* }
}

/// Generate the to_row method body.
fn generate_to_row(record: &RecordDef) -> proc_macro2::TokenStream {
    let conversions = record.persisted_fields().map(|field| {
        let field_name = &field.name;
        let column_name = &field.column_name;
        quote::quote! {
            (#column_name, rowkeep_core::Value::from(::core::clone::Clone::clone(&self.#field_name)))
        }
    });

    quote::quote! {
        vec![#(#conversions),*]
    }
}

/// Generate the from_row method body.
fn generate_from_row(record: &RecordDef) -> proc_macro2::TokenStream {
    let extractions = record.fields.iter().map(|field| {
        let field_name = &field.name;
        let column_name = &field.column_name;
        if field.skip {
            quote::quote! { #field_name: ::core::default::Default::default() }
        } else {
            quote::quote! { #field_name: row.get_named(#column_name)? }
        }
    });

    quote::quote! {
        Ok(Self {
            #(#extractions,)*
        })
    }
}

/// Generate the id / set_id method bodies.
fn generate_identity(
    record: &RecordDef,
) -> (proc_macro2::TokenStream, proc_macro2::TokenStream) {
    let field_name = &record.id_field().name;
    match record.id_kind {
        IdKind::Optional => (
            quote::quote! { self.#field_name },
            quote::quote! { self.#field_name = Some(id); },
        ),
        IdKind::Plain => (
            quote::quote! { if self.#field_name == 0 { None } else { Some(self.#field_name) } },
            quote::quote! { self.#field_name = id; },
        ),
    }
}
