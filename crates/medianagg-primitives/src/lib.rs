#[macro_use]
mod macros;

///
/// ScalarKind
///
/// Canonical scalar kind used for shared capability metadata.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ScalarKind {
    Blob,
    Bool,
    Float32,
    Float64,
    Int16,
    Int32,
    Int64,
    Text,
    Timestamp,
    Uint64,
}

impl ScalarKind {
    /// Return the full metadata descriptor for one scalar kind.
    #[must_use]
    pub const fn metadata(self) -> ScalarMetadata {
        scalar_kind_registry!(metadata_from_registry, self)
    }

    /// Stable human-readable kind label for diagnostics and metrics keys.
    #[must_use]
    pub const fn label(self) -> &'static str {
        scalar_kind_registry!(label_from_registry, self)
    }

    /// Return the coarse family for this scalar kind.
    #[must_use]
    pub const fn family(self) -> ScalarFamily {
        self.metadata().family
    }

    /// Return whether two values of this kind can be averaged via a real cast.
    #[must_use]
    pub const fn is_arithmetic(self) -> bool {
        self.metadata().is_arithmetic
    }

    /// Return whether this scalar has a total order usable for selection.
    #[must_use]
    pub const fn supports_ordering(self) -> bool {
        self.metadata().supports_ordering
    }

    /// Return whether this scalar may use the bounded quickselect buffer.
    #[must_use]
    pub const fn supports_quickselect(self) -> bool {
        self.metadata().supports_quickselect
    }

    /// Return whether ordering for this scalar depends on a collation.
    #[must_use]
    pub const fn is_collatable(self) -> bool {
        self.metadata().is_collatable
    }
}

impl std::fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

///
/// ScalarMetadata
///
/// Capability metadata shared by the aggregation layers.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[allow(clippy::struct_excessive_bools)]
pub struct ScalarMetadata {
    pub family: ScalarFamily,
    pub is_arithmetic: bool,
    pub supports_ordering: bool,
    pub supports_quickselect: bool,
    pub is_collatable: bool,
}

///
/// ScalarFamily
///
/// Coarse scalar routing family.
/// This classification MUST NOT be used to infer arithmetic support.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ScalarFamily {
    Numeric,
    Textual,
    Temporal,
    Bool,
    Blob,
}

/// Ordered list of all scalar kinds in registry order.
pub const ALL_SCALAR_KINDS: [ScalarKind; 10] = scalar_kind_registry!(all_kinds_from_registry);
