//! The `ElementGroup` type for grouping `Element`s.

use pcgeom::bbox::{Bbox, BoundBox};
use pcgeom::transform::{Translate, TranslateOwned};
use pcgeom::{Point, Rect};

use super::Group;
use crate::layout::cell::Element;
use crate::layout::layers::{LayerBoundBox, LayerKey, LayerPurpose, UserLayer};
use crate::layout::{Draw, DrawRef};

/// A group of layout [`Element`]s.
///
/// Cannot contain instances of cells.
#[derive(Clone, PartialEq, Default, Debug)]
pub struct ElementGroup {
    /// Translates all elements in the group by an offset.
    loc: Point,

    /// The list of [`Element`]s in this group.
    elems: Vec<Element>,
}

impl ElementGroup {
    /// Creates a new, empty [`ElementGroup`] at the origin.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the origin of this group.
    #[inline]
    pub fn loc(&self) -> Point {
        self.loc
    }

    /// Sets the position of this group.
    ///
    /// The origin of this group will be placed at the given location.
    #[inline]
    pub fn set_loc(&mut self, p: impl Into<Point>) {
        self.loc = p.into();
    }

    /// Adds a single [`Element`] to this group.
    #[inline]
    pub fn add(&mut self, elt: impl Into<Element>) {
        self.elems.push(elt.into());
    }

    /// Adds a rectangle on the drawing purpose of `layer`.
    pub fn add_rect(&mut self, layer: impl Into<UserLayer>, rect: Rect) {
        self.add(Element::new(
            layer.into().to_spec(LayerPurpose::Drawing),
            rect,
        ));
    }

    /// Adds all elements in the given iterator to this element group.
    #[inline]
    pub fn extend(&mut self, elems: impl IntoIterator<Item = Element>) {
        self.elems.extend(elems);
    }

    /// Returns the number of elements in the group.
    #[inline]
    pub fn len(&self) -> usize {
        self.elems.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elems.is_empty()
    }

    /// Returns an iterator over the elements in this group **after translation**.
    pub fn elements(&self) -> impl Iterator<Item = Element> + '_ {
        let loc = self.loc;
        self.elems.iter().map(move |e| e.clone().translate_owned(loc))
    }

    /// Returns the elements on `layer`, after translation.
    pub fn elements_on(&self, layer: LayerKey) -> impl Iterator<Item = Element> + '_ {
        self.elements().filter(move |e| e.layer.layer() == layer)
    }
}

impl IntoIterator for ElementGroup {
    type Item = Element;
    type IntoIter = std::vec::IntoIter<Element>;

    fn into_iter(self) -> Self::IntoIter {
        let loc = self.loc;
        self.elems
            .into_iter()
            .map(|e| e.translate_owned(loc))
            .collect::<Vec<_>>()
            .into_iter()
    }
}

impl BoundBox for ElementGroup {
    fn bbox(&self) -> Bbox {
        let mut bbox = Bbox::empty();
        for elem in self.elements() {
            bbox = elem.inner.union(bbox);
        }
        bbox
    }
}

impl Translate for ElementGroup {
    #[inline]
    fn translate(&mut self, p: Point) {
        self.loc.translate(p);
    }
}

impl Draw for ElementGroup {
    fn draw(self) -> crate::error::Result<Group> {
        Ok(Group::with_elements(self.loc, self.elems))
    }
}

impl DrawRef for ElementGroup {
    fn draw_ref(&self) -> crate::error::Result<Group> {
        Ok(Group::with_elements(self.loc, self.elems.clone()))
    }
}

impl LayerBoundBox for ElementGroup {
    fn layer_bbox(&self, key: LayerKey) -> Bbox {
        let mut bbox = Bbox::empty();
        for elem in self.elements_on(key) {
            bbox = bbox.union(elem.bbox());
        }
        bbox
    }
}
