//! Parsing logic for the Record derive macro.
//!
//! This module extracts struct-level and field-level `#[rowkeep(...)]`
//! attributes from the derive input to build `RecordDef` and `FieldDef`
//! structures used for code generation.

use proc_macro2::Span;
use quote::ToTokens;
use syn::{Attribute, Data, DeriveInput, Error, Field, Fields, Generics, Ident, Lit, Result, Type};

/// Parsed record definition from a struct with `#[derive(Record)]`.
#[derive(Debug)]
pub struct RecordDef {
    /// The struct name (e.g., `Person`).
    pub name: Ident,
    /// The SQL table name (e.g., `"people"`).
    pub table_name: String,
    /// Parsed field definitions.
    pub fields: Vec<FieldDef>,
    /// Generic parameters from the struct.
    pub generics: Generics,
    /// Index into `fields` of the identity field.
    pub id_index: usize,
    /// How the identity field stores "unsaved".
    pub id_kind: IdKind,
}

/// Shape of the identity field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    /// `Option<i64>`: `None` until saved.
    Optional,
    /// `i64`: `0` until saved.
    Plain,
}

/// Parsed field definition from a struct field.
#[derive(Debug)]
pub struct FieldDef {
    pub name: Ident,
    pub column_name: String,
    pub ty: Type,
    pub sql_type: Option<String>,
    pub nullable: bool,
    pub id: bool,
    pub unique: bool,
    pub default: Option<String>,
    pub skip: bool,
}

impl RecordDef {
    /// The identity field.
    pub fn id_field(&self) -> &FieldDef {
        &self.fields[self.id_index]
    }

    /// Fields stored in the table, identity included.
    pub fn persisted_fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| !f.skip)
    }
}

/// Parse a `DeriveInput` into a `RecordDef`.
pub fn parse_record(input: &DeriveInput) -> Result<RecordDef> {
    let name = input.ident.clone();
    let generics = input.generics.clone();

    let table_name = parse_struct_attrs(&input.attrs)?
        .unwrap_or_else(|| derive_table_name(&name.to_string()));

    let mut fields = match &input.data {
        Data::Struct(data) => parse_fields(&data.fields)?,
        Data::Enum(_) => {
            return Err(Error::new_spanned(
                input,
                "Record can only be derived for structs, not enums",
            ));
        }
        Data::Union(_) => {
            return Err(Error::new_spanned(
                input,
                "Record can only be derived for structs, not unions",
            ));
        }
    };

    let id_index = resolve_id_field(&mut fields, &name)?;
    let id_field = &fields[id_index];
    let id_kind = id_kind_of(&id_field.ty).ok_or_else(|| {
        Error::new_spanned(
            &id_field.ty,
            "the identity field must be `i64` or `Option<i64>`",
        )
    })?;
    if id_field.skip {
        return Err(Error::new_spanned(
            &id_field.name,
            "the identity field cannot be skipped",
        ));
    }

    Ok(RecordDef {
        name,
        table_name,
        fields,
        generics,
        id_index,
        id_kind,
    })
}

/// Pick the identity field: an explicit `#[rowkeep(id)]`, otherwise the field
/// named `id`.
fn resolve_id_field(fields: &mut [FieldDef], struct_name: &Ident) -> Result<usize> {
    let explicit: Vec<usize> = fields
        .iter()
        .enumerate()
        .filter(|(_, f)| f.id)
        .map(|(i, _)| i)
        .collect();

    match explicit.as_slice() {
        [single] => Ok(*single),
        [] => {
            let index = fields.iter().position(|f| f.name == "id").ok_or_else(|| {
                Error::new_spanned(
                    struct_name,
                    "Record needs an identity: add an `id` field or mark one with #[rowkeep(id)]",
                )
            })?;
            fields[index].id = true;
            Ok(index)
        }
        [_, second, ..] => Err(Error::new_spanned(
            &fields[*second].name,
            "only one field can be marked #[rowkeep(id)]",
        )),
    }
}

fn id_kind_of(ty: &Type) -> Option<IdKind> {
    let text = ty.to_token_stream().to_string().replace(' ', "");
    match text.as_str() {
        "i64" => Some(IdKind::Plain),
        "Option<i64>" | "std::option::Option<i64>" | "core::option::Option<i64>" => {
            Some(IdKind::Optional)
        }
        _ => None,
    }
}

/// Parse struct-level `#[rowkeep(...)]` attributes, returning the table
/// name override if present.
fn parse_struct_attrs(attrs: &[Attribute]) -> Result<Option<String>> {
    let mut table_name: Option<String> = None;

    for attr in attrs {
        if !attr.path().is_ident("rowkeep") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("table") {
                if table_name.is_some() {
                    return Err(Error::new_spanned(
                        meta.path,
                        "duplicate rowkeep attribute: table",
                    ));
                }
                table_name = Some(parse_str_value(&meta, "table name")?);
                Ok(())
            } else {
                let path = meta.path.to_token_stream().to_string();
                Err(Error::new_spanned(
                    meta.path,
                    format!("unknown rowkeep struct attribute `{path}`"),
                ))
            }
        })?;
    }

    Ok(table_name)
}

fn parse_str_value(meta: &syn::meta::ParseNestedMeta<'_>, what: &str) -> Result<String> {
    let value: Lit = meta.value()?.parse()?;
    if let Lit::Str(lit_str) = value {
        Ok(lit_str.value())
    } else {
        Err(Error::new_spanned(
            value,
            format!("expected string literal for {what}"),
        ))
    }
}

/// Derive the default table name from the struct name.
///
/// - `Person` -> `people`
/// - `TeamMember` -> `team_members`
fn derive_table_name(struct_name: &str) -> String {
    pluralize(&to_snake_case(struct_name))
}

/// Convert PascalCase to snake_case.
fn to_snake_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    let chars: Vec<char> = s.chars().collect();

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                let prev = chars[i - 1];
                let next = chars.get(i + 1).copied();

                // Word boundary, or the last capital of an acronym before a new word
                let should_underscore = prev.is_lowercase()
                    || (prev.is_uppercase() && next.is_some_and(|n| n.is_lowercase()));

                if should_underscore {
                    result.push('_');
                }
            }
            result.push(c.to_ascii_lowercase());
        } else {
            result.push(c);
        }
    }

    result
}

/// Simple English pluralization, applied to the last word of a snake_case name.
fn pluralize(word: &str) -> String {
    if let Some((head, last)) = word.rsplit_once('_') {
        return format!("{head}_{}", pluralize(last));
    }

    match word {
        "person" => return "people".to_string(),
        "child" => return "children".to_string(),
        "man" => return "men".to_string(),
        "woman" => return "women".to_string(),
        "mouse" => return "mice".to_string(),
        "datum" => return "data".to_string(),
        "index" => return "indices".to_string(),
        _ => {}
    }

    if word.is_empty() {
        return word.to_string();
    }

    if word.ends_with('s')
        || word.ends_with('x')
        || word.ends_with('z')
        || word.ends_with("ch")
        || word.ends_with("sh")
    {
        return format!("{word}es");
    }

    if let Some(stripped) = word.strip_suffix('y') {
        if stripped.chars().last().is_some_and(|c| !"aeiou".contains(c)) {
            return format!("{stripped}ies");
        }
    }

    format!("{word}s")
}

/// Parse all fields from a struct.
fn parse_fields(fields: &Fields) -> Result<Vec<FieldDef>> {
    match fields {
        Fields::Named(named) => named.named.iter().map(parse_field).collect(),
        Fields::Unnamed(_) => Err(Error::new(
            Span::call_site(),
            "Record requires a struct with named fields, not a tuple struct",
        )),
        Fields::Unit => Err(Error::new(
            Span::call_site(),
            "Record requires a struct with fields, not a unit struct",
        )),
    }
}

/// Parse a single field and its attributes.
fn parse_field(field: &Field) -> Result<FieldDef> {
    let name = field
        .ident
        .clone()
        .ok_or_else(|| Error::new_spanned(field, "expected named field"))?;

    let ty = field.ty.clone();
    let nullable = is_option_type(&ty);

    let mut def = FieldDef {
        column_name: name.to_string(),
        name,
        ty,
        sql_type: None,
        nullable,
        id: false,
        unique: false,
        default: None,
        skip: false,
    };

    for attr in &field.attrs {
        if !attr.path().is_ident("rowkeep") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            let path = &meta.path;

            if path.is_ident("id") || path.is_ident("primary_key") {
                def.id = true;
            } else if path.is_ident("unique") {
                def.unique = true;
            } else if path.is_ident("skip") {
                def.skip = true;
            } else if path.is_ident("column") {
                def.column_name = parse_str_value(&meta, "column name")?;
            } else if path.is_ident("sql_type") {
                def.sql_type = Some(parse_str_value(&meta, "sql_type")?);
            } else if path.is_ident("default") {
                def.default = Some(parse_str_value(&meta, "default")?);
            } else {
                let path = path.to_token_stream().to_string();
                return Err(Error::new_spanned(
                    &meta.path,
                    format!("unknown rowkeep field attribute `{path}`"),
                ));
            }
            Ok(())
        })?;
    }

    Ok(def)
}

/// Check whether a type is `Option<T>`.
pub fn is_option_type(ty: &Type) -> bool {
    if let Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            return segment.ident == "Option";
        }
    }
    false
}
