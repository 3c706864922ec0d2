//! Thin convenience wrappers over the core factories. These carry no
//! design of their own — they only save callers from repeating
//! `factory::object_var` at every call site.

use crate::error::AstError;
use crate::expr::{factory, Expr};

pub fn is_class(object_name: &str, class_id: i64) -> Result<Expr, AstError> {
    factory::is_class(factory::object_var(object_name), class_id)
}

pub fn is_not_class(object_name: &str, class_id: i64) -> Result<Expr, AstError> {
    factory::not(is_class(object_name, class_id)?)
}

pub fn high_confidence(object_name: &str, threshold: f64) -> Result<Expr, AstError> {
    factory::high_confidence(factory::object_var(object_name), threshold)
}

pub fn low_confidence(object_name: &str, threshold: f64) -> Result<Expr, AstError> {
    factory::low_confidence(factory::object_var(object_name), threshold)
}

pub fn bbox_of(object_name: &str) -> Result<Expr, AstError> {
    factory::bbox(factory::object_var(object_name))
}
