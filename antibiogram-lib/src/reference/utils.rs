use toml::{Table, Value};

pub trait Extractable<'a>: Sized {
    fn try_single_key(table: &'a Table, key: &'a str) -> Option<Self>;
    fn try_double_key(table: &'a Table, key_outer: &'a str, key_inner: &'a str) -> Option<Self> {
        match table.get(key_outer) {
            Some(Value::Table(inner_table)) => Self::try_single_key(inner_table, key_inner),
            _ => None,
        }
    }
}

/// Cutoffs could be either integer or float, non-finite floats are skipped.
impl<'a> Extractable<'a> for f64 {
    fn try_single_key(table: &'a Table, key: &'a str) -> Option<Self> {
        match table.get(key) {
            Some(Value::Float(ref a)) if a.is_finite() => Some(*a),
            Some(Value::Integer(ref a)) => Some(*a as f64),
            _ => None,
        }
    }
}

macro_rules! impl_extractable_ref {
    ($($ty: ty, $variant: ident), *) => {
        $(
            impl <'a> Extractable <'a> for $ty {
                fn try_single_key(table: &'a Table, key: &'a str) -> Option<Self> {
                    match table.get(key) {
                        Some(Value::$variant(ref a)) => Some(a),
                        _ => None,
                    }
                }
            }
        )*
    }
}

impl_extractable_ref!(&'a str, String);
impl_extractable_ref!(&'a [Value], Array);
