//! Implicit generalizations from the standard library.
//!
//! Each type kind declares a small table from short keys (`"base"`,
//! `"binary"`, `"object"`, ...) to qualified names of library elements.
//! The model only decides which keys apply to a type; resolving a name to
//! an element is the job of a [`LibraryIndex`].

use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use tracing::{debug, trace};

use super::{ElementKind, Model};
use crate::base::ElementId;

/// `(key, library qualified name)` pairs declared by one kind.
pub type GeneralizationTable = &'static [(&'static str, &'static str)];

static STANDARD_TABLES: &[(ElementKind, GeneralizationTable)] = &[
    // KerML
    (ElementKind::Type, &[("base", "Base::Anything")]),
    (ElementKind::Classifier, &[("base", "Base::Anything")]),
    (ElementKind::DataType, &[("base", "Base::DataValue")]),
    (ElementKind::Class, &[("base", "Occurrences::Occurrence")]),
    (ElementKind::Structure, &[("base", "Objects::Object")]),
    (
        ElementKind::Association,
        &[("base", "Links::Link"), ("binary", "Links::BinaryLink")],
    ),
    (
        ElementKind::AssociationStructure,
        &[("base", "Objects::ObjectLink"), ("binary", "Objects::BinaryLinkObject")],
    ),
    (ElementKind::Behavior, &[("base", "Performances::Performance")]),
    (ElementKind::Function, &[("base", "Performances::Evaluation")]),
    (ElementKind::Predicate, &[("base", "Performances::BooleanEvaluation")]),
    (ElementKind::Interaction, &[("base", "Performances::Performance")]),
    (ElementKind::Metaclass, &[("base", "Metaobjects::Metaobject")]),
    (
        ElementKind::Feature,
        &[
            ("base", "Base::things"),
            ("dataValue", "Base::dataValues"),
            ("occurrence", "Occurrences::occurrences"),
            ("object", "Objects::objects"),
            ("participant", "Links::Link::participant"),
        ],
    ),
    (ElementKind::Step, &[("base", "Performances::performances")]),
    (ElementKind::Expression, &[("base", "Performances::evaluations")]),
    (
        ElementKind::BooleanExpression,
        &[("base", "Performances::booleanEvaluations")],
    ),
    (
        ElementKind::Invariant,
        &[
            ("base", "Performances::trueEvaluations"),
            ("negated", "Performances::falseEvaluations"),
        ],
    ),
    (
        ElementKind::Connector,
        &[
            ("base", "Links::links"),
            ("binary", "Links::binaryLinks"),
            ("object", "Objects::linkObjects"),
            ("binaryObject", "Objects::binaryLinkObjects"),
        ],
    ),
    (
        ElementKind::BindingConnector,
        &[("base", "Links::selfLinks"), ("binary", "Links::selfLinks")],
    ),
    (
        ElementKind::Succession,
        &[
            ("base", "Occurrences::happensBeforeLinks"),
            ("binary", "Occurrences::happensBeforeLinks"),
        ],
    ),
    (
        ElementKind::ItemFlow,
        &[("base", "Transfers::transfers"), ("binary", "Transfers::transfers")],
    ),
    (
        ElementKind::SuccessionItemFlow,
        &[
            ("base", "Transfers::transfersBefore"),
            ("binary", "Transfers::transfersBefore"),
        ],
    ),
    (ElementKind::MultiplicityRange, &[("base", "Base::naturals")]),
    (ElementKind::MetadataFeature, &[("base", "Metaobjects::metaobjects")]),
    // SysML
    (ElementKind::AttributeDefinition, &[("base", "Base::DataValue")]),
    (ElementKind::AttributeUsage, &[("base", "Base::dataValues")]),
    (ElementKind::OccurrenceDefinition, &[("base", "Occurrences::Occurrence")]),
    (ElementKind::OccurrenceUsage, &[("base", "Occurrences::occurrences")]),
    (ElementKind::ItemDefinition, &[("base", "Items::Item")]),
    (ElementKind::ItemUsage, &[("base", "Items::items")]),
    (ElementKind::PartDefinition, &[("base", "Parts::Part")]),
    (ElementKind::PartUsage, &[("base", "Parts::parts")]),
    (ElementKind::PortDefinition, &[("base", "Ports::Port")]),
    (ElementKind::PortUsage, &[("base", "Ports::ports")]),
    (
        ElementKind::ConnectionDefinition,
        &[
            ("base", "Connections::Connection"),
            ("binary", "Connections::BinaryConnection"),
        ],
    ),
    (
        ElementKind::ConnectionUsage,
        &[
            ("base", "Connections::connections"),
            ("binary", "Connections::binaryConnections"),
            ("object", "Connections::connections"),
            ("binaryObject", "Connections::binaryConnections"),
        ],
    ),
    (
        ElementKind::InterfaceDefinition,
        &[
            ("base", "Interfaces::Interface"),
            ("binary", "Interfaces::BinaryInterface"),
        ],
    ),
    (
        ElementKind::InterfaceUsage,
        &[
            ("base", "Interfaces::interfaces"),
            ("binary", "Interfaces::binaryInterfaces"),
            ("object", "Interfaces::interfaces"),
            ("binaryObject", "Interfaces::binaryInterfaces"),
        ],
    ),
    (ElementKind::ActionDefinition, &[("base", "Actions::Action")]),
    (ElementKind::ActionUsage, &[("base", "Actions::actions")]),
    (ElementKind::CalculationDefinition, &[("base", "Calculations::Calculation")]),
    (ElementKind::CalculationUsage, &[("base", "Calculations::calculations")]),
    (ElementKind::ConstraintDefinition, &[("base", "Constraints::ConstraintCheck")]),
    (ElementKind::ConstraintUsage, &[("base", "Constraints::constraintChecks")]),
    (ElementKind::RequirementDefinition, &[("base", "Requirements::RequirementCheck")]),
    (ElementKind::RequirementUsage, &[("base", "Requirements::requirementChecks")]),
    (ElementKind::MetadataDefinition, &[("base", "Metaobjects::Metaobject")]),
    (ElementKind::MetadataUsage, &[("base", "Metaobjects::metaobjects")]),
];

/// Per-kind implicit generalization tables.
///
/// Built once and passed to the model; lookups fall back through the
/// kind's supertypes in declaration order so subkinds inherit keys they do
/// not redeclare.
#[derive(Clone, Debug)]
pub struct TypeCatalogue {
    tables: Vec<GeneralizationTable>,
}

impl Default for TypeCatalogue {
    fn default() -> Self {
        Self::standard()
    }
}

impl TypeCatalogue {
    /// A catalogue without any tables.
    pub fn empty() -> Self {
        Self {
            tables: vec![&[] as GeneralizationTable; ElementKind::COUNT],
        }
    }

    /// Tables for the KerML and SysML standard libraries.
    pub fn standard() -> Self {
        STANDARD_TABLES
            .iter()
            .fold(Self::empty(), |catalogue, &(kind, table)| catalogue.with_table(kind, table))
    }

    /// Replace the table declared by `kind`.
    pub fn with_table(mut self, kind: ElementKind, table: GeneralizationTable) -> Self {
        self.tables[kind as usize] = table;
        self
    }

    /// The table `kind` itself declares.
    pub fn own_table(&self, kind: ElementKind) -> GeneralizationTable {
        self.tables[kind as usize]
    }

    /// Resolve `key` for `kind`, walking supertypes depth-first.
    pub fn lookup(&self, kind: ElementKind, key: &str) -> Option<&'static str> {
        if let Some(&(_, name)) = self.own_table(kind).iter().find(|(k, _)| *k == key) {
            return Some(name);
        }
        kind.supertypes()
            .iter()
            .find_map(|&general| self.lookup(general, key))
    }
}

/// External index from library qualified names to elements.
pub trait LibraryIndex {
    fn resolve(&self, qualified_name: &str) -> Option<ElementId>;
}

impl<F> LibraryIndex for F
where
    F: Fn(&str) -> Option<ElementId>,
{
    fn resolve(&self, qualified_name: &str) -> Option<ElementId> {
        self(qualified_name)
    }
}

/// A [`LibraryIndex`] over a map of qualified names.
#[derive(Clone, Debug, Default)]
pub struct QualifiedNameIndex {
    names: FxHashMap<SmolStr, ElementId>,
}

impl QualifiedNameIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `id` under `qualified_name`; the first registration wins.
    pub fn insert(&mut self, qualified_name: impl Into<SmolStr>, id: ElementId) {
        self.names.entry(qualified_name.into()).or_insert(id);
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl LibraryIndex for QualifiedNameIndex {
    fn resolve(&self, qualified_name: &str) -> Option<ElementId> {
        self.names.get(qualified_name).copied()
    }
}

impl Model {
    /// Heritage kind used for this type's implicit generalizations.
    pub fn specialization_kind(&self, ty: ElementId) -> ElementKind {
        match self.kind(ty) {
            Some(kind) if kind.is(ElementKind::Feature) => ElementKind::Subsetting,
            Some(kind) if kind.is(ElementKind::Classifier) => ElementKind::Subclassification,
            _ => ElementKind::Specialization,
        }
    }

    fn has_structure_type(&self, feature: ElementId) -> bool {
        self.all_typings(feature)
            .into_iter()
            .any(|t| self.is(t, ElementKind::Structure))
    }

    /// Key of the primary implicit supertype, chosen from structural
    /// flags. `None` for non-types.
    pub fn default_supertype(&self, ty: ElementId) -> Option<&'static str> {
        let kind = self.kind(ty).filter(|k| k.is_type())?;

        if kind.is(ElementKind::Connector) {
            let key = match (self.has_structure_type(ty), self.end_count(ty)) {
                (true, n) if n > 2 => "object",
                (true, 2) => "binaryObject",
                (true, _) => "object",
                (false, n) if n > 2 => "base",
                (false, 2) => "binary",
                (false, _) => "base",
            };
            return Some(key);
        }
        if kind.is(ElementKind::Association) {
            return Some(if self.end_count(ty) == 2 { "binary" } else { "base" });
        }
        if kind.is(ElementKind::Invariant) && self.feature_flags(ty).negated {
            return Some("negated");
        }
        if kind == ElementKind::Feature {
            let typings = self.all_typings(ty);
            let any = |k: ElementKind| typings.iter().any(|&t| self.is(t, k));
            let key = if any(ElementKind::Structure) {
                "object"
            } else if any(ElementKind::Class) {
                "occurrence"
            } else if any(ElementKind::DataType) {
                "dataValue"
            } else {
                "base"
            };
            return Some(key);
        }
        Some("base")
    }

    /// Every implicit generalization key that applies to `ty`.
    pub fn default_general_types(&self, ty: ElementId) -> Vec<&'static str> {
        let Some(primary) = self.default_supertype(ty) else {
            return Vec::new();
        };
        let mut keys = vec![primary];
        let end_of_link = self.is_end(ty)
            && self.owning_type(ty).is_some_and(|owner| {
                self.kind(owner)
                    .is_some_and(|k| k.is_any(&[ElementKind::Association, ElementKind::Connector]))
            });
        if end_of_link {
            keys.push("participant");
        }
        keys
    }

    /// Library qualified names for [`default_general_types`](Self::default_general_types).
    pub fn implicit_generalization_names(&self, ty: ElementId) -> Vec<&'static str> {
        let Some(kind) = self.kind(ty) else {
            return Vec::new();
        };
        let mut names = Vec::new();
        for key in self.default_general_types(ty) {
            if let Some(name) = self.catalogue().lookup(kind, key)
                && !names.contains(&name)
            {
                names.push(name);
            }
        }
        names
    }

    /// Index every qualified element of this model.
    pub fn library_snapshot(&self) -> QualifiedNameIndex {
        let mut index = QualifiedNameIndex::new();
        for element in self.elements() {
            if let Some(name) = element.qualified_name() {
                index.insert(name, element.id());
            }
        }
        index
    }

    /// Replace the implied heritage edges of `ty` with freshly resolved ones.
    /// Returns the new edges.
    ///
    /// Nothing is added to conjugated types, to types that already declare
    /// an edge of their specialization kind, or for a library element that
    /// is `ty` itself or one of its supertypes.
    pub fn attach_implicit_generalizations(
        &mut self,
        ty: ElementId,
        index: &impl LibraryIndex,
    ) -> Vec<ElementId> {
        if !self.is(ty, ElementKind::Type) {
            return Vec::new();
        }
        let stale: Vec<_> = self
            .heritage(ty)
            .iter()
            .copied()
            .filter(|&e| self.is_implied(e))
            .collect();
        for edge in stale {
            self.destroy(edge);
        }

        if self.is_conjugated(ty) {
            return Vec::new();
        }
        let edge_kind = self.specialization_kind(ty);
        if !self.specializations(ty, edge_kind).is_empty() {
            return Vec::new();
        }

        let mut added = Vec::new();
        for name in self.implicit_generalization_names(ty) {
            let Some(general) = index.resolve(name).filter(|&g| self.contains(g)) else {
                debug!(ty = %ty, name, "library element not found");
                continue;
            };
            if general == ty || self.conforms(ty, general) {
                continue;
            }
            let edge = self.create_like(ty, edge_kind);
            self.set_implied(edge, true);
            self.set_element(edge, Some(general));
            self.add_heritage(ty, edge);
            added.push(edge);
        }
        trace!(ty = %ty, edges = added.len(), "implicit generalizations attached");
        added
    }
}
