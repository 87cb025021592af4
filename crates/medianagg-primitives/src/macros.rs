///
/// Scalar Kind Registry
///
/// Single source of truth for scalar capability metadata.
///

// NOTE: Quickselect eligibility tracks arithmetic membership.
// Ordered non-arithmetic kinds (Text, Bool, Timestamp) go straight to the
// external sort path, which only needs a generic comparison.
#[macro_export]
macro_rules! scalar_kind_registry_entries {
    ($macro:ident $(, @args $($args:tt)+ )?) => {
        $macro! {
            $(
                @args $($args)+;
            )?
            @entries
            (
                Blob,
                Blob,
                is_arithmetic = false,
                supports_ordering = false,
                supports_quickselect = false,
                is_collatable = false
            ),
            (
                Bool,
                Bool,
                is_arithmetic = false,
                supports_ordering = true,
                supports_quickselect = false,
                is_collatable = false
            ),
            (
                Float32,
                Numeric,
                is_arithmetic = true,
                supports_ordering = true,
                supports_quickselect = true,
                is_collatable = false
            ),
            (
                Float64,
                Numeric,
                is_arithmetic = true,
                supports_ordering = true,
                supports_quickselect = true,
                is_collatable = false
            ),
            (
                Int16,
                Numeric,
                is_arithmetic = true,
                supports_ordering = true,
                supports_quickselect = true,
                is_collatable = false
            ),
            (
                Int32,
                Numeric,
                is_arithmetic = true,
                supports_ordering = true,
                supports_quickselect = true,
                is_collatable = false
            ),
            (
                Int64,
                Numeric,
                is_arithmetic = true,
                supports_ordering = true,
                supports_quickselect = true,
                is_collatable = false
            ),
            (
                Text,
                Textual,
                is_arithmetic = false,
                supports_ordering = true,
                supports_quickselect = false,
                is_collatable = true
            ),
            (
                Timestamp,
                Temporal,
                is_arithmetic = false,
                supports_ordering = true,
                supports_quickselect = false,
                is_collatable = false
            ),
            (
                Uint64,
                Numeric,
                is_arithmetic = true,
                supports_ordering = true,
                supports_quickselect = true,
                is_collatable = false
            ),
        }
    };
}

#[macro_export]
macro_rules! scalar_kind_registry {
    ($macro:ident) => {
        $crate::scalar_kind_registry_entries!($macro)
    };
    ($macro:ident, $($args:tt)+) => {
        $crate::scalar_kind_registry_entries!($macro, @args $($args)+)
    };
}

macro_rules! metadata_from_registry {
    ( @args $kind:expr; @entries $( ($scalar:ident, $family:ident, is_arithmetic = $is_arithmetic:expr, supports_ordering = $supports_ordering:expr, supports_quickselect = $supports_quickselect:expr, is_collatable = $is_collatable:expr) ),* $(,)? ) => {
        match $kind {
            $(
                $crate::ScalarKind::$scalar => $crate::ScalarMetadata {
                    family: $crate::ScalarFamily::$family,
                    is_arithmetic: $is_arithmetic,
                    supports_ordering: $supports_ordering,
                    supports_quickselect: $supports_quickselect,
                    is_collatable: $is_collatable,
                },
            )*
        }
    };
}

macro_rules! label_from_registry {
    ( @args $kind:expr; @entries $( ($scalar:ident, $family:ident, is_arithmetic = $is_arithmetic:expr, supports_ordering = $supports_ordering:expr, supports_quickselect = $supports_quickselect:expr, is_collatable = $is_collatable:expr) ),* $(,)? ) => {
        match $kind {
            $( $crate::ScalarKind::$scalar => stringify!($scalar), )*
        }
    };
}

macro_rules! all_kinds_from_registry {
    ( @entries $( ($scalar:ident, $family:ident, is_arithmetic = $is_arithmetic:expr, supports_ordering = $supports_ordering:expr, supports_quickselect = $supports_quickselect:expr, is_collatable = $is_collatable:expr) ),* $(,)? ) => {
        [ $( $crate::ScalarKind::$scalar ),* ]
    };
    ( @args $($ignore:tt)*; @entries $( ($scalar:ident, $family:ident, is_arithmetic = $is_arithmetic:expr, supports_ordering = $supports_ordering:expr, supports_quickselect = $supports_quickselect:expr, is_collatable = $is_collatable:expr) ),* $(,)? ) => {
        [ $( $crate::ScalarKind::$scalar ),* ]
    };
}
