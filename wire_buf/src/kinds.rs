//! Enums backed by an integer and plain old data structs.
//!
//! Both are opted in with a macro next to the type definition, which implements
//! [SerializeWire](crate::SerializeWire) and [DeserializeWire](crate::DeserializeWire) for it.

use crate::{DeserializeWire, SerializeWire};

/// Fieldless enum with an integer representation on the wire.
pub trait WireEnum: Sized + Copy {
    type Repr: SerializeWire + DeserializeWire + Copy;

    fn to_repr(self) -> Self::Repr;

    /// None if `repr` is not a discriminant of any variant.
    fn from_repr(repr: Self::Repr) -> Option<Self>;
}

/// Implement [WireEnum] and the wire traits for a fieldless `Copy` enum.
/// Every variant must be listed, reading an unlisted value fails with [Error::InvalidEnumValue](crate::Error::InvalidEnumValue).
///
/// ```
/// use wire_buf::prelude::*;
///
/// #[derive(Copy, Clone, Debug, PartialEq)]
/// #[repr(u8)]
/// enum Team {
///     Red = 1,
///     Blue = 2,
/// }
/// impl_wire_enum!(Team: u8 { Red, Blue });
///
/// let mut wr = BufWriter::new(1);
/// wr.write_value_safe(&Team::Blue).unwrap();
/// assert_eq!(wr.as_slice(), &[2]);
/// ```
#[macro_export]
macro_rules! impl_wire_enum {
    ($name:ident : $repr:ty { $($variant:ident),* $(,)? }) => {
        impl $crate::WireEnum for $name {
            type Repr = $repr;

            fn to_repr(self) -> $repr {
                self as $repr
            }

            fn from_repr(repr: $repr) -> ::core::option::Option<Self> {
                $(
                    if repr == $name::$variant as $repr {
                        return ::core::option::Option::Some($name::$variant);
                    }
                )*
                ::core::option::Option::None
            }
        }

        impl $crate::SerializeWire for $name {
            const KIND: $crate::SerializationKind = $crate::SerializationKind::Enum;

            fn wire_size(&self) -> usize {
                ::core::mem::size_of::<$repr>()
            }

            fn ser_wire(
                &self,
                wr: &mut $crate::BufWriter<'_>,
            ) -> ::core::result::Result<(), $crate::Error> {
                wr.write_value(&$crate::WireEnum::to_repr(*self))
            }
        }

        impl $crate::DeserializeWire for $name {
            const KIND: $crate::SerializationKind = $crate::SerializationKind::Enum;
            const MIN_WIRE_SIZE: usize = ::core::mem::size_of::<$repr>();

            fn des_wire(
                rd: &mut $crate::BufReader<'_>,
            ) -> ::core::result::Result<Self, $crate::Error> {
                let repr: $repr = rd.read_value()?;
                <$name as $crate::WireEnum>::from_repr(repr).ok_or($crate::Error::InvalidEnumValue)
            }
        }
    };
}

/// Implement the wire traits for `bytemuck::Pod` types, copied verbatim in native layout.
///
/// ```
/// use wire_buf::prelude::*;
/// use wire_buf::bytemuck::{Pod, Zeroable};
///
/// #[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
/// #[repr(C)]
/// struct Position {
///     x: f32,
///     y: f32,
/// }
/// impl_wire_pod!(Position);
///
/// let mut wr = BufWriter::new(8);
/// wr.write_value_safe(&Position { x: 1.0, y: 2.0 }).unwrap();
/// assert_eq!(wr.len(), 8);
/// ```
#[macro_export]
macro_rules! impl_wire_pod {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::SerializeWire for $ty {
                const KIND: $crate::SerializationKind = $crate::SerializationKind::Struct;

                fn wire_size(&self) -> usize {
                    ::core::mem::size_of::<$ty>()
                }

                fn ser_wire(
                    &self,
                    wr: &mut $crate::BufWriter<'_>,
                ) -> ::core::result::Result<(), $crate::Error> {
                    wr.write_pod(self)
                }
            }

            impl $crate::DeserializeWire for $ty {
                const KIND: $crate::SerializationKind = $crate::SerializationKind::Struct;
                const MIN_WIRE_SIZE: usize = ::core::mem::size_of::<$ty>();

                fn des_wire(
                    rd: &mut $crate::BufReader<'_>,
                ) -> ::core::result::Result<Self, $crate::Error> {
                    rd.read_pod()
                }
            }
        )+
    };
}
