//! Stable column identity tokens.
//!
//! Composition always prefixes, so the outermost wrapping comes first:
//! a column `C` joined through `J1` and then, one stage out, through `J2`
//! reads `join__J2__join__J1__C`. Stripping the prefixes in the same order
//! gives back `C`.

pub struct Ident;

impl Ident {
    const EXPLICIT_JOIN: &'static str = "join__";
    const IMPLICIT_JOIN: &'static str = "implicit_via__";
    const IMPLICIT_SEPARATOR: &'static str = "__->__";
    const NATIVE: &'static str = "native__";

    pub fn explicitly_joined(join_ident: &str, ident: &str) -> String {
        format!("{}{join_ident}__{ident}", Self::EXPLICIT_JOIN)
    }

    pub fn implicitly_joined(fk_ident: &str, ident: &str) -> String {
        format!("{}{fk_ident}{}{ident}", Self::IMPLICIT_JOIN, Self::IMPLICIT_SEPARATOR)
    }

    /// Scope an ident to a model. Already-scoped idents are returned unchanged.
    pub fn model(entity_id: &str, ident: &str) -> String {
        let prefix = Self::model_prefix(entity_id);
        if ident.starts_with(&prefix) {
            ident.to_string()
        } else {
            format!("{prefix}{ident}")
        }
    }

    pub fn native(column_name: &str) -> String {
        format!("{}{column_name}", Self::NATIVE)
    }

    pub fn strip_explicit_join<'a>(join_ident: &str, ident: &'a str) -> Option<&'a str> {
        ident
            .strip_prefix(Self::EXPLICIT_JOIN)?
            .strip_prefix(join_ident)?
            .strip_prefix("__")
    }

    pub fn strip_implicit_join<'a>(fk_ident: &str, ident: &'a str) -> Option<&'a str> {
        ident
            .strip_prefix(Self::IMPLICIT_JOIN)?
            .strip_prefix(fk_ident)?
            .strip_prefix(Self::IMPLICIT_SEPARATOR)
    }

    pub fn strip_model<'a>(entity_id: &str, ident: &'a str) -> Option<&'a str> {
        ident.strip_prefix(&Self::model_prefix(entity_id))
    }

    fn model_prefix(entity_id: &str) -> String {
        format!("model[{entity_id}]__")
    }
}
