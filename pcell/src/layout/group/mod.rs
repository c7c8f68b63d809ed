//! Groups of layout objects.
//!
//! For cases when you want a collection of objects,
//! but you don't want to create a separate [`Component`](crate::component::Component).

use pcgeom::bbox::{Bbox, BoundBox};
use pcgeom::transform::{Translate, TranslateOwned};
use pcgeom::{Point, Rect};

use super::cell::{Element, Instance, TextElement};
use super::layers::{LayerPurpose, UserLayer};
use super::{Draw, DrawRef};

pub mod elements;

/// A group of layout [`Element`]s, [`Instance`]s, and/or [`TextElement`]s.
///
/// Cannot contain ports. If you need ports, create a
/// [`Component`](crate::component::Component).
///
/// Groups can only be translated.
#[derive(Clone, Default, Debug)]
pub struct Group {
    /// Translates all elements in the group by an offset.
    loc: Point,
    /// The list of [`Element`]s in this group.
    elems: Vec<Element>,
    /// The list of [`Instance`]s in this group.
    insts: Vec<Instance>,
    /// The list of [`TextElement`]s in this group.
    annotations: Vec<TextElement>,
}

impl Group {
    /// Creates a new, empty [`Group`] at the origin.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_elements(loc: Point, elems: Vec<Element>) -> Self {
        Self {
            loc,
            elems,
            ..Default::default()
        }
    }

    /// Gets the origin of the group.
    #[inline]
    pub fn loc(&self) -> Point {
        self.loc
    }

    /// Sets the position of the group.
    ///
    /// All elements of this group will be translated by the given location.
    #[inline]
    pub fn set_loc(&mut self, p: impl Into<Point>) {
        self.loc = p.into();
    }

    /// Adds a single [`Element`] to this group.
    #[inline]
    pub fn add_element(&mut self, elt: impl Into<Element>) {
        self.elems.push(elt.into());
    }

    /// Adds a single [`Rect`] to this group.
    pub fn add_rect(&mut self, layer: impl Into<UserLayer>, rect: impl Into<Rect>) {
        let layer = layer.into().to_spec(LayerPurpose::Drawing);
        self.elems.push(Element::new(layer, rect.into()));
    }

    /// Adds a single [`Instance`] to this group.
    #[inline]
    pub fn add_instance(&mut self, inst: impl Into<Instance>) {
        self.insts.push(inst.into());
    }

    /// Adds a single [`TextElement`] to this group.
    #[inline]
    pub fn add_annotation(&mut self, text: impl Into<TextElement>) {
        self.annotations.push(text.into());
    }

    /// Returns an iterator over the elements in this group **after translation**.
    pub fn elements(&self) -> impl Iterator<Item = Element> + '_ {
        let loc = self.loc;
        self.elems.iter().map(move |e| e.clone().translate_owned(loc))
    }

    /// Returns an iterator over the instances in this group **after translation**.
    pub fn instances(&self) -> impl Iterator<Item = Instance> + '_ {
        let loc = self.loc;
        self.insts.iter().map(move |i| i.clone().translate_owned(loc))
    }

    /// Returns an iterator over the annotations in this group **after translation**.
    pub fn annotations(&self) -> impl Iterator<Item = TextElement> + '_ {
        let loc = self.loc;
        self.annotations
            .iter()
            .map(move |a| a.clone().translate_owned(loc))
    }
}

impl From<Instance> for Group {
    fn from(inst: Instance) -> Self {
        let mut grp = Group::new();
        grp.add_instance(inst);
        grp
    }
}

impl BoundBox for Group {
    fn bbox(&self) -> Bbox {
        let mut bbox = Bbox::empty();
        for elem in &self.elems {
            bbox = elem.bbox().union(bbox);
        }
        for inst in &self.insts {
            bbox = inst.bbox().union(bbox);
        }
        bbox.translate_owned(self.loc)
    }
}

impl Translate for Group {
    #[inline]
    fn translate(&mut self, p: Point) {
        self.loc.translate(p);
    }
}

impl Draw for Group {
    fn draw(self) -> crate::error::Result<Group> {
        Ok(self)
    }
}

impl DrawRef for Group {
    fn draw_ref(&self) -> crate::error::Result<Group> {
        Ok(self.clone())
    }
}
