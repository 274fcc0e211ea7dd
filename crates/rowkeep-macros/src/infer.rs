//! SQL type inference from Rust types.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{GenericArgument, PathArguments, Type};

/// Infer the SQL type from a Rust type, returning a TokenStream that
/// constructs the matching `SqlType` variant. `Option<T>` infers from `T`.
pub fn infer_sql_type(ty: &Type) -> TokenStream {
    let inner_ty = unwrap_option_type(ty);
    let type_str = type_to_string(inner_ty);

    match type_str.as_str() {
        "bool" => quote! { rowkeep_core::SqlType::Boolean },

        "i8" | "i16" | "i32" | "u8" | "u16" => quote! { rowkeep_core::SqlType::Integer },
        "i64" | "u32" => quote! { rowkeep_core::SqlType::BigInt },

        "f32" => quote! { rowkeep_core::SqlType::Real },
        "f64" => quote! { rowkeep_core::SqlType::Double },

        "String" | "&str" | "str" => quote! { rowkeep_core::SqlType::Text },

        "Vec<u8>" => quote! { rowkeep_core::SqlType::Blob },

        "serde_json::Value" => quote! { rowkeep_core::SqlType::Json },

        // Most permissive fallback
        _ => quote! { rowkeep_core::SqlType::Text },
    }
}

/// Map an explicit `sql_type = "..."` attribute onto a `SqlType`.
///
/// Known names map to their variant; anything else is kept verbatim.
pub fn parse_sql_type_attr(sql_type: &str) -> TokenStream {
    let upper = sql_type.trim().to_uppercase();
    match upper.as_str() {
        "BOOLEAN" | "BOOL" => quote! { rowkeep_core::SqlType::Boolean },
        "INTEGER" | "INT" | "SMALLINT" | "TINYINT" => quote! { rowkeep_core::SqlType::Integer },
        "BIGINT" => quote! { rowkeep_core::SqlType::BigInt },
        "REAL" | "FLOAT" => quote! { rowkeep_core::SqlType::Real },
        "DOUBLE" | "DOUBLE PRECISION" => quote! { rowkeep_core::SqlType::Double },
        "TEXT" => quote! { rowkeep_core::SqlType::Text },
        "BLOB" => quote! { rowkeep_core::SqlType::Blob },
        "JSON" => quote! { rowkeep_core::SqlType::Json },
        _ => quote! { rowkeep_core::SqlType::Custom(#sql_type) },
    }
}

fn unwrap_option_type(ty: &Type) -> &Type {
    if let Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            if segment.ident == "Option" {
                if let PathArguments::AngleBracketed(args) = &segment.arguments {
                    if let Some(GenericArgument::Type(inner)) = args.args.first() {
                        return inner;
                    }
                }
            }
        }
    }
    ty
}

/// Convert a Type to a simplified string representation for matching.
fn type_to_string(ty: &Type) -> String {
    use quote::ToTokens;
    ty.to_token_stream().to_string().replace(' ', "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn test_infer_primitives() {
        let ty: Type = parse_quote!(i32);
        assert!(infer_sql_type(&ty).to_string().contains("Integer"));

        let ty: Type = parse_quote!(i64);
        assert!(infer_sql_type(&ty).to_string().contains("BigInt"));

        let ty: Type = parse_quote!(bool);
        assert!(infer_sql_type(&ty).to_string().contains("Boolean"));
    }

    #[test]
    fn test_infer_option() {
        let ty: Type = parse_quote!(Option<f64>);
        assert!(infer_sql_type(&ty).to_string().contains("Double"));
    }

    #[test]
    fn test_infer_bytes() {
        let ty: Type = parse_quote!(Vec<u8>);
        assert!(infer_sql_type(&ty).to_string().contains("Blob"));
    }

    #[test]
    fn test_parse_sql_type_custom() {
        let result = parse_sql_type_attr("VARCHAR(100)").to_string();
        assert!(result.contains("Custom"));
        assert!(result.contains("VARCHAR(100)"));
        assert!(parse_sql_type_attr("bigint").to_string().contains("BigInt"));
    }
}
