//! Helper macro generating port error enums with snake-case constructors.

/// Declares a `thiserror` enum and one constructor per variant.
///
/// Each variant `Foo { message: String }` gains `fn foo(message: impl
/// Into<String>) -> Self`; unit variants gain a nullary constructor.
macro_rules! define_port_error {
    (
        $(#[$attr:meta])*
        pub enum $error:ident {
            $(
                $(#[$variant_attr:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $display:expr
            ),* $(,)?
        }
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $error {
            $(
                $(#[$variant_attr])*
                #[error($display)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $error {
            $(
                define_port_error!(@constructor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };

    (@constructor $variant:ident) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@constructor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@fields $variant [] [] $( $field : $ty, )*);
    };

    // Accumulates `impl Into<_>` parameters and `.into()` initialisers one
    // field at a time.
    (@fields $variant:ident [$($param:tt)*] [$($init:tt)*] $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @fields $variant
            [$($param)* $field: impl Into<$ty>,]
            [$($init)* $field: $field.into(),]
            $($rest)*
        );
    };

    (@fields $variant:ident [$($param:tt)*] [$($init:tt)*]) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($($param)*) -> Self {
                Self::$variant { $($init)* }
            }
        }
    };
}

pub(crate) use define_port_error;
