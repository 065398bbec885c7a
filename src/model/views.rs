//! Borrowed views over [`Model`].
//!
//! Validators, scope providers and hover providers navigate the model
//! through these instead of raw ids. All navigation returns further views.
//!
//! ```ignore
//! let view = ElementView::from_id(pkg, &model).unwrap();
//! for member in view.owned_members() {
//!     println!("{}: {}", member.name().unwrap_or("?"), member.kind());
//! }
//! ```

use super::{Direction, Element, ElementKind, Model, MultiplicityBounds};
use crate::base::ElementId;

// ============================================================================
// CORE VIEW
// ============================================================================

/// A borrowed view over any element.
#[derive(Clone, Copy)]
pub struct ElementView<'m> {
    pub element: &'m Element,
    pub model: &'m Model,
}

impl<'m> ElementView<'m> {
    pub fn new(element: &'m Element, model: &'m Model) -> Self {
        Self { element, model }
    }

    /// Returns None if `id` is not in the model.
    pub fn from_id(id: ElementId, model: &'m Model) -> Option<Self> {
        model.get(id).map(|element| Self { element, model })
    }

    fn views(&self, ids: impl IntoIterator<Item = ElementId>) -> Vec<ElementView<'m>> {
        ids.into_iter()
            .filter_map(|id| Self::from_id(id, self.model))
            .collect()
    }

    // ── Identity ────────────────────────────────────────────────────

    pub fn id(&self) -> ElementId {
        self.element.id()
    }

    pub fn name(&self) -> Option<&'m str> {
        self.element.name()
    }

    pub fn short_name(&self) -> Option<&'m str> {
        self.element.short_name()
    }

    pub fn qualified_name(&self) -> Option<&'m str> {
        self.element.qualified_name()
    }

    pub fn kind(&self) -> ElementKind {
        self.element.kind()
    }

    pub fn is(&self, kind: ElementKind) -> bool {
        self.element.is(kind)
    }

    // ── Ownership navigation ────────────────────────────────────────

    pub fn owner(&self) -> Option<ElementView<'m>> {
        self.element
            .owner()
            .and_then(|id| Self::from_id(id, self.model))
    }

    pub fn parent(&self) -> Option<ElementView<'m>> {
        self.element
            .parent()
            .and_then(|id| Self::from_id(id, self.model))
    }

    /// Structural children, relationships included.
    pub fn owned_elements(&self) -> Vec<ElementView<'m>> {
        self.views(self.element.owned().iter().copied())
    }

    /// Elements owned through owning memberships.
    pub fn owned_members(&self) -> Vec<ElementView<'m>> {
        self.views(self.model.owned_members(self.id()))
    }

    /// Owned and imported memberships.
    pub fn visible_memberships(&self) -> Vec<ElementView<'m>> {
        self.views(self.model.visible_memberships(self.id()))
    }

    pub fn find_member(&self, name: &str) -> Option<ElementView<'m>> {
        self.model
            .find_member(self.id(), name)
            .and_then(|m| Self::from_id(m, self.model))
    }

    // ── Relationship ends ───────────────────────────────────────────

    /// Target of a relationship.
    pub fn target(&self) -> Option<ElementView<'m>> {
        self.model
            .element(self.id())
            .and_then(|t| Self::from_id(t, self.model))
    }

    pub fn source(&self) -> Option<ElementView<'m>> {
        self.model
            .source(self.id())
            .and_then(|s| Self::from_id(s, self.model))
    }

    /// Relationships pointing at this element.
    pub fn incoming(&self) -> Vec<ElementView<'m>> {
        self.views(self.model.incoming(self.id()).iter().copied())
    }

    // ── Annotations ─────────────────────────────────────────────────

    pub fn comments(&self) -> Vec<ElementView<'m>> {
        self.views(self.model.comments(self.id()).iter().copied())
    }

    pub fn documentation(&self) -> Vec<ElementView<'m>> {
        self.views(self.model.documentation(self.id()).iter().copied())
    }

    pub fn metadata(&self) -> Vec<ElementView<'m>> {
        self.views(self.model.metadata(self.id()).iter().copied())
    }

    /// Body of the first documentation element.
    pub fn documentation_text(&self) -> Option<&'m str> {
        self.model
            .documentation(self.id())
            .iter()
            .find_map(|&d| self.model.body(d))
    }

    // ── Downcast ────────────────────────────────────────────────────

    pub fn as_type(&self) -> Option<TypeView<'m>> {
        self.element
            .kind()
            .is_type()
            .then_some(TypeView { inner: *self })
    }

    pub fn as_feature(&self) -> Option<FeatureView<'m>> {
        self.element
            .kind()
            .is_feature()
            .then_some(FeatureView {
                inner: TypeView { inner: *self },
            })
    }
}

impl<'m> std::fmt::Debug for ElementView<'m> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementView")
            .field("id", &self.id())
            .field("name", &self.name())
            .field("kind", &self.kind())
            .finish()
    }
}

// ============================================================================
// TYPE VIEW
// ============================================================================

/// View over a Type.
#[derive(Clone, Copy, Debug)]
pub struct TypeView<'m> {
    pub inner: ElementView<'m>,
}

impl<'m> TypeView<'m> {
    pub fn id(&self) -> ElementId {
        self.inner.id()
    }

    pub fn name(&self) -> Option<&'m str> {
        self.inner.name()
    }

    pub fn is_abstract(&self) -> bool {
        self.inner.element.is_abstract()
    }

    pub fn is_conjugated(&self) -> bool {
        self.inner.model.is_conjugated(self.id())
    }

    /// Targets of the type's explicit and implied specializations.
    pub fn general_types(&self) -> Vec<TypeView<'m>> {
        self.types(self.inner.model.general_types(self.id()))
    }

    /// Every supertype, transitively.
    pub fn all_supertypes(&self) -> Vec<TypeView<'m>> {
        self.types(self.inner.model.all_supertypes(self.id()))
    }

    pub fn conforms(&self, other: TypeView<'_>) -> bool {
        self.inner.model.conforms(self.id(), other.id())
    }

    pub fn owned_features(&self) -> Vec<FeatureView<'m>> {
        self.inner
            .views(self.inner.model.owned_features(self.id()))
            .into_iter()
            .filter_map(|v| v.as_feature())
            .collect()
    }

    pub fn multiplicity(&self) -> Option<MultiplicityBounds> {
        self.inner.model.multiplicity_bounds(self.id())
    }

    fn types(&self, ids: Vec<ElementId>) -> Vec<TypeView<'m>> {
        self.inner
            .views(ids)
            .into_iter()
            .filter_map(|v| v.as_type())
            .collect()
    }
}

// ============================================================================
// FEATURE VIEW
// ============================================================================

/// View over a Feature.
#[derive(Clone, Copy, Debug)]
pub struct FeatureView<'m> {
    pub inner: TypeView<'m>,
}

impl<'m> FeatureView<'m> {
    pub fn id(&self) -> ElementId {
        self.inner.id()
    }

    pub fn name(&self) -> Option<&'m str> {
        self.inner.name()
    }

    fn model(&self) -> &'m Model {
        self.inner.inner.model
    }

    /// Most specific types, inferred through chains and subsetting.
    pub fn typings(&self) -> Vec<TypeView<'m>> {
        self.inner.types(self.model().all_typings(self.id()))
    }

    pub fn owning_type(&self) -> Option<TypeView<'m>> {
        self.model()
            .owning_type(self.id())
            .and_then(|t| ElementView::from_id(t, self.model()))
            .and_then(|v| v.as_type())
    }

    pub fn redefined_features(&self) -> Vec<FeatureView<'m>> {
        self.features(self.model().redefined_features(self.id()))
    }

    pub fn subsetted_features(&self) -> Vec<FeatureView<'m>> {
        self.features(self.model().subsetted_features(self.id()))
    }

    pub fn direction(&self) -> Option<Direction> {
        self.model().direction(self.id())
    }

    pub fn multiplicity(&self) -> Option<MultiplicityBounds> {
        self.model().effective_multiplicity(self.id())
    }

    pub fn is_ordered(&self) -> bool {
        self.model().is_ordered(self.id())
    }

    pub fn is_unique(&self) -> bool {
        self.model().is_unique(self.id())
    }

    pub fn is_end(&self) -> bool {
        self.model().is_end(self.id())
    }

    pub fn is_composite(&self) -> bool {
        self.model().is_composite(self.id())
    }

    /// Expression bound by the feature's value.
    pub fn value(&self) -> Option<ElementView<'m>> {
        self.model()
            .value_expression(self.id())
            .and_then(|e| ElementView::from_id(e, self.model()))
    }

    fn features(&self, ids: Vec<ElementId>) -> Vec<FeatureView<'m>> {
        self.inner
            .inner
            .views(ids)
            .into_iter()
            .filter_map(|v| v.as_feature())
            .collect()
    }
}
