use quarry_core::stmt::Value;

use jiff::civil::DateTime;

/// Positional statement arguments.
///
/// Implemented for single values, tuples, arrays and vectors, and for `()`
/// when there are none.
pub trait IntoValues {
    fn into_values(self) -> Vec<Value>;
}

impl IntoValues for () {
    fn into_values(self) -> Vec<Value> {
        vec![]
    }
}

impl<T: Into<Value>> IntoValues for Vec<T> {
    fn into_values(self) -> Vec<Value> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<T: Into<Value>, const N: usize> IntoValues for [T; N] {
    fn into_values(self) -> Vec<Value> {
        self.into_iter().map(Into::into).collect()
    }
}

macro_rules! impl_into_values_scalar {
    ( $( $ty:ty ),* ) => {
        $(
            impl IntoValues for $ty {
                fn into_values(self) -> Vec<Value> {
                    vec![self.into()]
                }
            }
        )*
    };
}

impl_into_values_scalar!(
    Value, bool, i8, i16, i32, i64, u8, u16, u32, u64, f32, f64, String, &str, DateTime
);

macro_rules! impl_into_values_tuple {
    ( $( $name:ident ),+ ) => {
        impl<$( $name: Into<Value> ),+> IntoValues for ( $( $name, )+ ) {
            #[allow(non_snake_case)]
            fn into_values(self) -> Vec<Value> {
                let ( $( $name, )+ ) = self;
                vec![ $( $name.into() ),+ ]
            }
        }
    };
}

impl_into_values_tuple!(A);
impl_into_values_tuple!(A, B);
impl_into_values_tuple!(A, B, C);
impl_into_values_tuple!(A, B, C, D);
impl_into_values_tuple!(A, B, C, D, E);
impl_into_values_tuple!(A, B, C, D, E, F);
impl_into_values_tuple!(A, B, C, D, E, F, G);
impl_into_values_tuple!(A, B, C, D, E, F, G, H);
