//! Dense id <-> name tables.
//!
//! Every register, instruction and group namespace is a `#[repr(u16)]` enum
//! generated by [`id_table!`]. Ids are contiguous and zero-based, id 0 is
//! always `INVALID`, and the trailing `ENDING` variant is the one-past-the-end
//! sentinel, so `id < ENDING` is the validity test used everywhere else.

/// Common interface of the generated tables.
pub trait IdTable: Copy + Eq + Sized + 'static {
    /// One past the last valid id.
    const ENDING: u16;

    /// Numeric id of this entry.
    fn id(self) -> u16;

    /// Canonical name, empty for `INVALID`.
    fn name(self) -> &'static str;

    /// O(1) lookup; `None` for ids outside `1..ENDING` and for 0.
    fn from_id(id: u16) -> Option<Self>;

    /// O(n) lookup by canonical name or alias (case-insensitive).
    fn from_name(name: &str) -> Option<Self>;

    /// Name of a raw id, empty when out of range.
    fn name_of(id: u16) -> &'static str {
        Self::from_id(id).map(Self::name).unwrap_or("")
    }

    /// Every valid entry, in id order (excluding `INVALID`).
    fn all() -> &'static [Self];
}

/// Generate an [`IdTable`] enum.
///
/// ```ignore
/// id_table! {
///     pub enum MipsReg {
///         ZERO = "zero",
///         AT = "at",
///     }
///     aliases { "0" => ZERO }
/// }
/// ```
macro_rules! id_table {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $variant:ident = $text:literal ),* $(,)?
        }
        $( aliases { $( $alias:literal => $target:ident ),* $(,)? } )?
    ) => {
        $(#[$meta])*
        #[allow(non_camel_case_types, clippy::upper_case_acronyms)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, serde::Serialize)]
        #[repr(u16)]
        $vis enum $name {
            #[default]
            INVALID = 0,
            $( $variant, )*
            ENDING,
        }

        impl $name {
            const NAMES: &'static [&'static str] = &["", $( $text ),*];
            const VARIANTS: &'static [$name] = &[$name::INVALID, $( $name::$variant ),*];
            const ALIASES: &'static [(&'static str, $name)] = &[$( $( ($alias, $name::$target) ),* )?];
        }

        impl $crate::table::IdTable for $name {
            const ENDING: u16 = $name::ENDING as u16;

            #[inline]
            fn id(self) -> u16 {
                self as u16
            }

            #[inline]
            fn name(self) -> &'static str {
                Self::NAMES.get(self as usize).copied().unwrap_or("")
            }

            #[inline]
            fn from_id(id: u16) -> Option<Self> {
                if id == 0 {
                    return None;
                }
                Self::VARIANTS.get(id as usize).copied()
            }

            fn from_name(name: &str) -> Option<Self> {
                Self::NAMES
                    .iter()
                    .position(|n| !n.is_empty() && n.eq_ignore_ascii_case(name))
                    .and_then(|i| Self::VARIANTS.get(i).copied())
                    .or_else(|| {
                        Self::ALIASES
                            .iter()
                            .find(|(a, _)| a.eq_ignore_ascii_case(name))
                            .map(|(_, v)| *v)
                    })
            }

            fn all() -> &'static [Self] {
                &Self::VARIANTS[1..]
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str($crate::table::IdTable::name(*self))
            }
        }
    };
}

pub(crate) use id_table;

#[cfg(test)]
mod tests {
    use super::*;

    id_table! {
        enum Sample {
            R0 = "r0",
            R1 = "r1",
            SP = "sp",
        }
        aliases { "r2" => SP }
    }

    #[test]
    fn test_invalid_and_sentinel() {
        assert_eq!(Sample::INVALID.id(), 0);
        assert_eq!(<Sample as IdTable>::ENDING, 4);
        assert_eq!(Sample::from_id(0), None);
        assert_eq!(Sample::from_id(4), None);
        assert_eq!(Sample::from_id(3), Some(Sample::SP));
        assert_eq!(Sample::name_of(999), "");
    }

    #[test]
    fn test_name_lookup_and_alias() {
        assert_eq!(Sample::from_name("R1"), Some(Sample::R1));
        assert_eq!(Sample::from_name("r2"), Some(Sample::SP));
        assert_eq!(Sample::from_name(""), None);
        assert_eq!(Sample::SP.to_string(), "sp");
        assert_eq!(Sample::all().len(), 3);
    }
}
