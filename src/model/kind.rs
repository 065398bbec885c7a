//! Element metaclasses.
//!
//! Every model element is tagged with an [`ElementKind`]. Kinds form a
//! multiple-inheritance hierarchy mirroring the KerML/SysML metamodel; the
//! hierarchy is flattened at compile time into a [`KindSet`] per kind so that
//! `is`/`is_any` are single bit tests.
//!
//! The enum is declared in topological order: every supertype appears before
//! all of its subtypes. `compute_ancestors` relies on this.

use std::fmt;

/// A set of element kinds as a 128-bit mask.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct KindSet(u128);

impl KindSet {
    pub const EMPTY: KindSet = KindSet(0);

    /// A set holding one kind.
    pub const fn single(kind: ElementKind) -> Self {
        Self(1u128 << (kind as u8))
    }

    /// A set holding every kind of `kinds`.
    pub const fn of(kinds: &[ElementKind]) -> Self {
        let mut bits = 0u128;
        let mut i = 0;
        while i < kinds.len() {
            bits |= 1u128 << (kinds[i] as u8);
            i += 1;
        }
        Self(bits)
    }

    pub const fn union(self, other: KindSet) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn contains(self, kind: ElementKind) -> bool {
        self.0 & (1u128 << (kind as u8)) != 0
    }

    pub const fn intersects(self, other: KindSet) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterate over the kinds in the set, in declaration order.
    pub fn iter(self) -> impl Iterator<Item = ElementKind> {
        ElementKind::ALL
            .into_iter()
            .filter(move |kind| self.contains(*kind))
    }
}

macro_rules! element_kinds {
    ($($kind:ident : [$($super:ident),*]),* $(,)?) => {
        /// The metaclass of a model element.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[repr(u8)]
        pub enum ElementKind {
            $($kind),*
        }

        impl ElementKind {
            /// Every kind, in declaration (topological) order.
            pub const ALL: [ElementKind; element_kinds!(@count $($kind)*)] = [$(ElementKind::$kind),*];

            /// Number of kinds.
            pub const COUNT: usize = Self::ALL.len();

            /// Direct supertypes in the metamodel.
            pub const fn supertypes(self) -> &'static [ElementKind] {
                match self {
                    $(ElementKind::$kind => &[$(ElementKind::$super),*]),*
                }
            }

            /// KerML/SysML metaclass name.
            pub const fn name(self) -> &'static str {
                match self {
                    $(ElementKind::$kind => stringify!($kind)),*
                }
            }

            /// Parse a metaclass name.
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $(stringify!($kind) => Some(ElementKind::$kind),)*
                    _ => None,
                }
            }
        }
    };
    (@count $($kind:ident)*) => { 0usize $(+ element_kinds!(@one $kind))* };
    (@one $kind:ident) => { 1usize };
}

element_kinds! {
    // Root
    Element: [],
    Relationship: [Element],
    Namespace: [Element],
    Package: [Namespace],
    LibraryPackage: [Package],

    // Types and classifiers
    Type: [Namespace],
    Classifier: [Type],
    DataType: [Classifier],
    Class: [Classifier],
    Structure: [Class],
    Association: [Classifier, Relationship],
    AssociationStructure: [Association, Structure],
    Behavior: [Class],
    Function: [Behavior],
    Predicate: [Function],
    Interaction: [Association, Behavior],
    Metaclass: [Structure],

    // Features
    Feature: [Type],
    Step: [Feature],
    Expression: [Step],
    BooleanExpression: [Expression],
    Invariant: [BooleanExpression],
    LiteralExpression: [Expression],
    LiteralBoolean: [LiteralExpression],
    LiteralInteger: [LiteralExpression],
    LiteralRational: [LiteralExpression],
    LiteralString: [LiteralExpression],
    LiteralInfinity: [LiteralExpression],
    NullExpression: [Expression],
    FeatureReferenceExpression: [Expression],
    InvocationExpression: [Expression],
    OperatorExpression: [InvocationExpression],
    FeatureChainExpression: [OperatorExpression],
    Connector: [Feature, Relationship],
    BindingConnector: [Connector],
    Succession: [Connector],
    ItemFlow: [Connector, Step],
    SuccessionItemFlow: [ItemFlow, Succession],
    MultiplicityRange: [Feature],

    // Annotations
    AnnotatingElement: [Element],
    Comment: [AnnotatingElement],
    Documentation: [Comment],
    TextualRepresentation: [AnnotatingElement],
    MetadataFeature: [Feature, AnnotatingElement],

    // Memberships
    Membership: [Relationship],
    OwningMembership: [Membership],
    FeatureMembership: [OwningMembership],
    EndFeatureMembership: [FeatureMembership],
    ParameterMembership: [FeatureMembership],
    ReturnParameterMembership: [ParameterMembership],
    ResultExpressionMembership: [FeatureMembership],
    FeatureValue: [OwningMembership],
    ElementFilterMembership: [OwningMembership],

    // Imports
    Import: [Relationship],
    MembershipImport: [Import],
    NamespaceImport: [Import],

    // Heritage
    Inheritance: [Relationship],
    Specialization: [Inheritance],
    Subclassification: [Specialization],
    FeatureTyping: [Specialization],
    Subsetting: [Specialization],
    ReferenceSubsetting: [Subsetting],
    CrossSubsetting: [Subsetting],
    Redefinition: [Subsetting],
    Conjugation: [Inheritance],

    // Non-heritage type relationships
    Unioning: [Relationship],
    Intersecting: [Relationship],
    Differencing: [Relationship],
    Disjoining: [Relationship],
    FeatureChaining: [Relationship],
    FeatureInverting: [Relationship],
    TypeFeaturing: [Relationship],

    // Other relationships
    Dependency: [Relationship],
    Annotation: [Relationship],

    // SysML definitions and usages
    Definition: [Classifier],
    Usage: [Feature],
    AttributeDefinition: [Definition, DataType],
    AttributeUsage: [Usage],
    EnumerationDefinition: [AttributeDefinition],
    EnumerationUsage: [AttributeUsage],
    OccurrenceDefinition: [Definition, Class],
    OccurrenceUsage: [Usage],
    ItemDefinition: [OccurrenceDefinition, Structure],
    ItemUsage: [OccurrenceUsage],
    PartDefinition: [ItemDefinition],
    PartUsage: [ItemUsage],
    PortDefinition: [OccurrenceDefinition, Structure],
    PortUsage: [OccurrenceUsage],
    ConnectionDefinition: [PartDefinition, AssociationStructure],
    ConnectionUsage: [PartUsage, Connector],
    InterfaceDefinition: [ConnectionDefinition],
    InterfaceUsage: [ConnectionUsage],
    ActionDefinition: [OccurrenceDefinition, Behavior],
    ActionUsage: [OccurrenceUsage, Step],
    CalculationDefinition: [ActionDefinition, Function],
    CalculationUsage: [ActionUsage, Expression],
    ConstraintDefinition: [OccurrenceDefinition, Predicate],
    ConstraintUsage: [OccurrenceUsage, BooleanExpression],
    RequirementDefinition: [ConstraintDefinition],
    RequirementUsage: [ConstraintUsage],
    ReferenceUsage: [Usage],
    MetadataDefinition: [ItemDefinition, Metaclass],
    MetadataUsage: [ItemUsage, MetadataFeature],
    ConjugatedPortTyping: [FeatureTyping],
    PortConjugation: [Conjugation],
}

const ANCESTORS: [KindSet; ElementKind::COUNT] = compute_ancestors();

const fn compute_ancestors() -> [KindSet; ElementKind::COUNT] {
    let mut table = [KindSet::EMPTY; ElementKind::COUNT];
    let mut i = 0;
    while i < ElementKind::COUNT {
        let kind = ElementKind::ALL[i];
        let mut set = KindSet::single(kind);
        let supers = kind.supertypes();
        let mut j = 0;
        while j < supers.len() {
            set = set.union(table[supers[j] as usize]);
            j += 1;
        }
        table[i] = set;
        i += 1;
    }
    table
}

impl ElementKind {
    /// The kind itself plus all of its transitive supertypes.
    pub const fn ancestors(self) -> KindSet {
        ANCESTORS[self as usize]
    }

    /// Returns true if this kind is `kind` or one of its subtypes.
    pub const fn is(self, kind: ElementKind) -> bool {
        self.ancestors().contains(kind)
    }

    /// Returns true if this kind is any of `kinds` (or a subtype).
    pub fn is_any(self, kinds: &[ElementKind]) -> bool {
        self.ancestors().intersects(KindSet::of(kinds))
    }

    pub const fn is_relationship(self) -> bool {
        self.is(ElementKind::Relationship)
    }

    /// A relationship that is not also a namespace (Association and
    /// Connector are both). Only these are transparent for ownership.
    pub const fn is_pure_relationship(self) -> bool {
        self.is(ElementKind::Relationship) && !self.is(ElementKind::Namespace)
    }

    pub const fn is_membership(self) -> bool {
        self.is(ElementKind::Membership)
    }

    /// Memberships whose target is structurally parented by the membership.
    pub const fn is_owning_membership(self) -> bool {
        self.is(ElementKind::OwningMembership)
    }

    pub const fn is_heritage(self) -> bool {
        self.is(ElementKind::Inheritance)
    }

    /// Relationships kept in a type's non-heritage relationship list.
    pub fn is_type_relationship(self) -> bool {
        self.is_any(&[
            ElementKind::Unioning,
            ElementKind::Intersecting,
            ElementKind::Differencing,
            ElementKind::Disjoining,
            ElementKind::FeatureChaining,
            ElementKind::FeatureInverting,
            ElementKind::TypeFeaturing,
        ])
    }

    pub const fn is_type(self) -> bool {
        self.is(ElementKind::Type)
    }

    pub const fn is_feature(self) -> bool {
        self.is(ElementKind::Feature)
    }

    pub const fn is_annotating(self) -> bool {
        self.is(ElementKind::AnnotatingElement)
    }

    /// Pick the membership kind that should wrap a child of this kind inside
    /// a type body. A multiplicity range is a feature but fills the
    /// multiplicity slot, not the feature list.
    pub const fn membership_kind_for(child: ElementKind) -> ElementKind {
        if child.is(ElementKind::Feature) && !child.is(ElementKind::MultiplicityRange) {
            ElementKind::FeatureMembership
        } else {
            ElementKind::OwningMembership
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
