macro_rules! newtype {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident($ty:ty) {
            $($body:tt)*
        }
    ) => (
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
        #[repr(transparent)]
        $vis struct $name($ty);

        impl $name {
            /// Creates a newtype wrapper.
            pub const fn new(value: $ty) -> Self {
                Self(value)
            }
            /// Returns the value as a primitive type.
            pub const fn get(&self) -> $ty {
                self.0
            }
            /// Returns the value as a table index.
            pub const fn index(&self) -> usize {
                self.0 as usize
            }
        }

        impl From<$ty> for $name {
            fn from(value: $ty) -> Self {
                Self(value)
            }
        }

        impl From<$name> for $ty {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        newtype! { @body $name, $ty, $($body)* }
    );
    (@body $name:ident, $ty:ty, const FMT = $fmt:literal; $($rest:tt)*) => (
        impl core::fmt::Display for $name {
            fn fmt(&self, fmt: &mut core::fmt::Formatter) -> core::fmt::Result {
                write!(fmt, $fmt, self.get())
            }
        }
        newtype! { @body $name, $ty, $($rest)* }
    );
    (@body $name:ident, $ty:ty, ) => ();
}

/// Declares a dense enumeration with its canonical name table.
///
/// Every variant is named by its own identifier, ordinals start at zero and have no
/// holes, so `NAMES[ordinal]` is always the canonical name.
macro_rules! ordinal_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident: $repr:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident,
            )+
        }
    ) => (
        $(#[$meta])*
        #[derive(
            Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash,
            num_enum::TryFromPrimitive, num_enum::IntoPrimitive,
        )]
        #[repr($repr)]
        $vis enum $name {
            $(
                $(#[$vmeta])*
                $variant,
            )+
        }

        impl crate::ordinal::Ordinal for $name {
            const NAMES: &'static [&'static str] = &[$(stringify!($variant)),+];
            const VALUES: &'static [Self] = &[$(Self::$variant),+];

            fn to_ordinal(self) -> usize {
                self as usize
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, fmt: &mut core::fmt::Formatter) -> core::fmt::Result {
                fmt.write_str(crate::ordinal::Ordinal::name(*self))
            }
        }
    );
}
