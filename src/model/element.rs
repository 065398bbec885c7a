//! The universal model node and its facets.
//!
//! An [`Element`] holds the state shared by every metaclass (identity,
//! names, parent/owner, owned elements, annotations) plus one optional
//! facet per behavioral mixin. Which facets exist is decided once, from
//! the kind's ancestor set, when the element is created:
//!
//! ```text
//! Element
//! ├── namespace     (Namespace)        member lookup table
//! ├── relationship  (Relationship)     target, explicit source, visibility
//! ├── ty            (Type)             heritage, type relationships, slots
//! ├── feature       (Feature)          direction, flags, typings cache
//! ├── annotating    (AnnotatingElement) body, annotation edges
//! ├── import        (Import)           recursion/visibility options
//! ├── value         (FeatureValue)     default/initial binding flags
//! └── range         (MultiplicityRange) literal bounds
//! ```
//!
//! Fields are crate-private; mutation goes through [`Model`](super::Model)
//! so that every change runs the derived-state maintenance it implies.

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use uuid::Uuid;

use super::kind::ElementKind;
use crate::base::{DocumentId, ElementId};

// ============================================================================
// SHARED VALUE TYPES
// ============================================================================

/// Visibility of a membership or import.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Visibility {
    #[default]
    Public,
    Private,
    Protected,
}

/// Direction of a feature relative to its featuring type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    In,
    Out,
    InOut,
}

impl Direction {
    /// The direction seen from a conjugated type.
    pub fn conjugated(self) -> Self {
        match self {
            Direction::In => Direction::Out,
            Direction::Out => Direction::In,
            Direction::InOut => Direction::InOut,
        }
    }
}

/// Upper bound of a multiplicity range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Bound {
    Finite(u64),
    /// `*`
    Infinite,
}

/// Literal bounds carried by a `MultiplicityRange`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MultiplicityBounds {
    pub lower: Option<u64>,
    pub upper: Option<Bound>,
}

impl MultiplicityBounds {
    /// `[n]`
    pub fn exactly(n: u64) -> Self {
        Self {
            lower: Some(n),
            upper: Some(Bound::Finite(n)),
        }
    }

    /// `[lower..upper]`
    pub fn range(lower: u64, upper: Bound) -> Self {
        Self {
            lower: Some(lower),
            upper: Some(upper),
        }
    }

    /// Effective lower bound; a lone `[n]` means `[n..n]`.
    pub fn lower_bound(&self) -> Option<u64> {
        self.lower.or(match self.upper {
            Some(Bound::Finite(n)) => Some(n),
            _ => None,
        })
    }

    /// Returns true if more than one value may be present.
    pub fn is_many(&self) -> bool {
        match self.upper {
            Some(Bound::Infinite) => true,
            Some(Bound::Finite(n)) => n > 1,
            None => false,
        }
    }
}

/// An entry of a namespace's name → member table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MemberEntry {
    /// The name is bound to a membership.
    Membership(ElementId),
    /// A membership import whose imported membership is not linked yet.
    UnresolvedImport(ElementId),
    /// Hidden by a redefinition in this namespace.
    Shadow,
}

impl MemberEntry {
    pub fn membership(self) -> Option<ElementId> {
        match self {
            MemberEntry::Membership(id) => Some(id),
            _ => None,
        }
    }

    pub fn is_shadow(self) -> bool {
        matches!(self, MemberEntry::Shadow)
    }
}

// ============================================================================
// COMMON STATE
// ============================================================================

/// Declared and derived names of an element.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Names {
    /// Name as written.
    pub(crate) declared_name: Option<SmolStr>,
    /// Short name as written.
    pub(crate) declared_short_name: Option<SmolStr>,
    /// Effective sanitized name (declared, tracked from a target, or adopted
    /// from a redefined feature).
    pub(crate) name: Option<SmolStr>,
    /// Effective sanitized short name.
    pub(crate) short_name: Option<SmolStr>,
    /// Cached `owner::name`, `None` when any segment is anonymous.
    pub(crate) qualified_name: Option<SmolStr>,
}

/// Annotating elements attached to an element, owned or out-of-band.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Annotations {
    pub(crate) comments: Vec<ElementId>,
    pub(crate) documentation: Vec<ElementId>,
    pub(crate) metadata: Vec<ElementId>,
    pub(crate) textual_representations: Vec<ElementId>,
}

impl Annotations {
    pub fn comments(&self) -> &[ElementId] {
        &self.comments
    }

    pub fn documentation(&self) -> &[ElementId] {
        &self.documentation
    }

    pub fn metadata(&self) -> &[ElementId] {
        &self.metadata
    }

    pub fn textual_representations(&self) -> &[ElementId] {
        &self.textual_representations
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
            && self.documentation.is_empty()
            && self.metadata.is_empty()
            && self.textual_representations.is_empty()
    }

    /// The collection an annotating element of `kind` belongs to.
    pub(crate) fn collection_mut(&mut self, kind: ElementKind) -> Option<&mut Vec<ElementId>> {
        if kind.is(ElementKind::Documentation) {
            Some(&mut self.documentation)
        } else if kind.is(ElementKind::Comment) {
            Some(&mut self.comments)
        } else if kind.is(ElementKind::TextualRepresentation) {
            Some(&mut self.textual_representations)
        } else if kind.is(ElementKind::MetadataFeature) {
            Some(&mut self.metadata)
        } else {
            None
        }
    }

    pub(crate) fn contains(&self, annotating: ElementId) -> bool {
        self.comments.contains(&annotating)
            || self.documentation.contains(&annotating)
            || self.metadata.contains(&annotating)
            || self.textual_representations.contains(&annotating)
    }

    /// Remove `annotating` from every collection.
    pub(crate) fn remove_everywhere(&mut self, annotating: ElementId) -> bool {
        let found = self.contains(annotating);
        for collection in [
            &mut self.comments,
            &mut self.documentation,
            &mut self.metadata,
            &mut self.textual_representations,
        ] {
            collection.retain(|&a| a != annotating);
        }
        found
    }
}

// ============================================================================
// FACETS
// ============================================================================

/// Namespace facet: the name → member table.
#[derive(Debug, Default)]
pub struct NamespaceData {
    pub(crate) members: FxHashMap<SmolStr, MemberEntry>,
}

/// Relationship facet.
#[derive(Debug, Default)]
pub struct RelationshipData {
    /// The related target (`element()`).
    pub(crate) element: Option<ElementId>,
    /// Explicit source; defaults to the semantic owner.
    pub(crate) explicit_source: Option<ElementId>,
    pub(crate) visibility: Visibility,
    /// Synthesized from a default generalization rather than declared.
    pub(crate) is_implied: bool,
    /// Namespace and keys this membership/import currently occupies, and
    /// the entry it stored under them.
    pub(crate) registered_in: Option<ElementId>,
    pub(crate) registered_keys: Vec<SmolStr>,
    pub(crate) registered_entry: Option<MemberEntry>,
    /// Type whose heritage or type-relationship list holds this edge, or
    /// the annotating element an Annotation is registered with.
    pub(crate) attached_to: Option<ElementId>,
}

/// Type facet.
#[derive(Debug, Default)]
pub struct TypeData {
    /// Inheritance-family edges, in declaration order.
    pub(crate) heritage: Vec<ElementId>,
    /// Unioning/Intersecting/Differencing/Disjoining/Chaining/Inverting/Featuring.
    pub(crate) type_relationships: Vec<ElementId>,
    pub(crate) is_abstract: bool,
    pub(crate) is_sufficient: bool,
    /// Owning membership of the multiplicity range.
    pub(crate) multiplicity: Option<ElementId>,
    /// Result expression membership of functions and expressions.
    pub(crate) result: Option<ElementId>,
}

/// Explicit feature flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FeatureFlags {
    pub composite: bool,
    pub portion: bool,
    pub readonly: bool,
    pub derived: bool,
    pub end: bool,
    pub ordered: bool,
    pub nonunique: bool,
    /// Invariants only: `inv false`.
    pub negated: bool,
}

/// Memoized result of [`Model::all_typings`](super::Model::all_typings).
#[derive(Clone, Debug)]
pub(crate) struct TypingsCache {
    pub(crate) epoch: u64,
    pub(crate) types: Vec<ElementId>,
}

/// Feature facet.
#[derive(Debug, Default)]
pub struct FeatureData {
    /// Explicit direction; the implied one comes from the parameter membership.
    pub(crate) direction: Option<Direction>,
    pub(crate) flags: FeatureFlags,
    /// Type owning this feature through a feature membership.
    pub(crate) owning_type: Option<ElementId>,
    /// FeatureValue edge.
    pub(crate) value: Option<ElementId>,
    pub(crate) typings: Mutex<Option<TypingsCache>>,
}

/// Annotating-element facet.
#[derive(Debug, Default)]
pub struct AnnotatingData {
    /// Comment body or textual representation source.
    pub(crate) body: Option<SmolStr>,
    /// Language of a textual representation.
    pub(crate) language: Option<SmolStr>,
    /// Annotation edges whose annotating element is this one.
    pub(crate) annotations: Vec<ElementId>,
    /// Elements whose annotation collections currently list this one.
    pub(crate) registered: Vec<ElementId>,
}

/// Import facet.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImportData {
    /// `::**` - descend into nested namespaces.
    pub(crate) is_recursive: bool,
    /// `import all` - ignore visibility.
    pub(crate) is_import_all: bool,
    /// Name a membership import makes visible before it is linked.
    pub(crate) imported_name: Option<SmolStr>,
}

/// FeatureValue facet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ValueBinding {
    pub(crate) is_default: bool,
    pub(crate) is_initial: bool,
}

// ============================================================================
// ELEMENT
// ============================================================================

/// A model element.
#[derive(Debug)]
pub struct Element {
    pub(crate) id: ElementId,
    pub(crate) uuid: Uuid,
    pub(crate) kind: ElementKind,
    pub(crate) document: Option<DocumentId>,
    pub(crate) names: Names,
    pub(crate) parent: Option<ElementId>,
    /// Resolved semantic owner, refreshed on every ownership change.
    pub(crate) owner: Option<ElementId>,
    pub(crate) owned: Vec<ElementId>,
    pub(crate) annotations: Annotations,
    pub(crate) namespace: Option<Box<NamespaceData>>,
    pub(crate) relationship: Option<Box<RelationshipData>>,
    pub(crate) ty: Option<Box<TypeData>>,
    pub(crate) feature: Option<Box<FeatureData>>,
    pub(crate) annotating: Option<Box<AnnotatingData>>,
    pub(crate) import: Option<ImportData>,
    pub(crate) value: Option<ValueBinding>,
    pub(crate) range: Option<MultiplicityBounds>,
}

impl Element {
    /// Create a detached element with the facets its kind requires.
    pub(crate) fn new(id: ElementId, kind: ElementKind, document: Option<DocumentId>) -> Self {
        let mut element = Self {
            id,
            uuid: Uuid::new_v4(),
            kind,
            document,
            names: Names::default(),
            parent: None,
            owner: None,
            owned: Vec::new(),
            annotations: Annotations::default(),
            namespace: None,
            relationship: None,
            ty: None,
            feature: None,
            annotating: None,
            import: None,
            value: None,
            range: None,
        };
        element.reset_facets(kind);
        element
    }

    /// Drop all facet state and allocate fresh facets for `kind`.
    pub(crate) fn reset_facets(&mut self, kind: ElementKind) {
        self.kind = kind;
        self.namespace = kind
            .is(ElementKind::Namespace)
            .then(|| Box::new(NamespaceData::default()));
        self.relationship = kind
            .is(ElementKind::Relationship)
            .then(|| Box::new(RelationshipData::default()));
        self.ty = kind.is(ElementKind::Type).then(|| Box::new(TypeData::default()));
        self.feature = kind
            .is(ElementKind::Feature)
            .then(|| Box::new(FeatureData::default()));
        self.annotating = kind
            .is(ElementKind::AnnotatingElement)
            .then(|| Box::new(AnnotatingData::default()));
        self.import = kind.is(ElementKind::Import).then(ImportData::default);
        self.value = kind.is(ElementKind::FeatureValue).then(ValueBinding::default);
        self.range = kind
            .is(ElementKind::MultiplicityRange)
            .then(MultiplicityBounds::default);
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    /// The KerML `elementId`.
    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Shorthand for `self.kind().is(kind)`.
    pub fn is(&self, kind: ElementKind) -> bool {
        self.kind.is(kind)
    }

    /// Document the element was created in (not inherited).
    pub fn document(&self) -> Option<DocumentId> {
        self.document
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    pub fn owner(&self) -> Option<ElementId> {
        self.owner
    }

    /// Structural children, in insertion order.
    pub fn owned(&self) -> &[ElementId] {
        &self.owned
    }

    pub fn declared_name(&self) -> Option<&str> {
        self.names.declared_name.as_deref()
    }

    pub fn declared_short_name(&self) -> Option<&str> {
        self.names.declared_short_name.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.names.name.as_deref()
    }

    pub fn short_name(&self) -> Option<&str> {
        self.names.short_name.as_deref()
    }

    pub fn qualified_name(&self) -> Option<&str> {
        self.names.qualified_name.as_deref()
    }

    pub fn annotations(&self) -> &Annotations {
        &self.annotations
    }

    /// Relationship target, if this is a relationship.
    pub fn target(&self) -> Option<ElementId> {
        self.relationship.as_ref()?.element
    }

    pub fn visibility(&self) -> Visibility {
        self.relationship
            .as_ref()
            .map_or(Visibility::Public, |rel| rel.visibility)
    }

    /// Returns true for relationships synthesized as implicit generalizations.
    pub fn is_implied(&self) -> bool {
        self.relationship.as_ref().is_some_and(|rel| rel.is_implied)
    }

    pub fn body(&self) -> Option<&str> {
        self.annotating.as_ref()?.body.as_deref()
    }

    pub fn language(&self) -> Option<&str> {
        self.annotating.as_ref()?.language.as_deref()
    }

    pub fn bounds(&self) -> Option<MultiplicityBounds> {
        self.range
    }

    pub fn flags(&self) -> Option<FeatureFlags> {
        self.feature.as_ref().map(|f| f.flags)
    }

    pub fn is_abstract(&self) -> bool {
        self.ty.as_ref().is_some_and(|t| t.is_abstract)
    }

    pub fn is_sufficient(&self) -> bool {
        self.ty.as_ref().is_some_and(|t| t.is_sufficient)
    }
}
