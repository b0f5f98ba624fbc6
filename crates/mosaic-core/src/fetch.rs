//! Fetch graphs: which parts of an entity are loaded, and how, when the
//! entity is selected.
//!
//! Walking associations eagerly would never end on self-referential or
//! bidirectional models. The walk stops at an association that leads back to
//! a node already materialized higher up, and at the configured join depth.

use crate::mapping::{
    built, AttributeId, AttributeMapping, CollectionPart, EntityId, FetchStyle, FetchTiming,
    ForeignKeyId, Metamodel, ToOneAttributeMapping,
};
use crate::{err, NavigablePath, NavigableRole, Result};

use tracing::trace;

/// Entry point for building fetch graphs.
pub struct FetchGraph;

#[derive(Debug)]
pub struct FetchGraphBuilder<'a> {
    metamodel: &'a Metamodel,
    max_depth: usize,
}

/// The result of selecting an entity directly.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainResult {
    pub entity: EntityId,
    pub path: NavigablePath,
    pub fetches: Vec<Fetch>,
}

/// One attribute reached while fetching its owner.
#[derive(Debug, Clone, PartialEq)]
pub struct Fetch {
    pub path: NavigablePath,
    pub attribute: AttributeId,
    pub kind: FetchKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchKind {
    Basic,

    Embedded {
        fetches: Vec<Fetch>,
    },

    /// The associated entity is loaded along with its owner.
    Entity {
        entity: EntityId,
        style: FetchStyle,
        foreign_key: ForeignKeyId,
        fetches: Vec<Fetch>,
    },

    /// Only the key is read; the association is loaded on access.
    Delayed,

    /// The association was already joined higher up; its data is reused.
    Circular {
        referenced: NavigablePath,
    },

    /// The association is the inverse of the one that led here, so it points
    /// back at the owner already materialized at `referenced`.
    BidirectionalCircular {
        referenced: NavigablePath,
    },

    Collection {
        fetches: Vec<Fetch>,
    },

    Discriminated,
}

struct Frame {
    path: NavigablePath,
    entity: EntityId,
    via: Option<ForeignKeyId>,
}

struct Walk<'a> {
    metamodel: &'a Metamodel,
    max_depth: usize,
    stack: Vec<Frame>,
}

impl FetchGraph {
    pub fn builder(metamodel: &Metamodel) -> FetchGraphBuilder<'_> {
        FetchGraphBuilder {
            metamodel,
            max_depth: metamodel.settings().max_fetch_depth,
        }
    }
}

impl<'a> FetchGraphBuilder<'a> {
    /// Maximum number of joins along one fetch path.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn build(&self, entity: &str) -> Result<DomainResult> {
        let mm = self.metamodel;
        let entity = mm
            .entity_by_name(entity)
            .ok_or_else(|| err!("unknown entity `{entity}`"))?;

        let path = NavigablePath::new(&entity.name);

        let mut walk = Walk {
            metamodel: mm,
            max_depth: self.max_depth,
            stack: vec![Frame {
                path: path.clone(),
                entity: entity.id,
                via: None,
            }],
        };

        let fetches = walk.entity_fetches(entity.id, &path, 0)?;

        Ok(DomainResult {
            entity: entity.id,
            path,
            fetches,
        })
    }
}

impl Walk<'_> {
    fn entity_fetches(
        &mut self,
        entity: EntityId,
        path: &NavigablePath,
        depth: usize,
    ) -> Result<Vec<Fetch>> {
        let mm = self.metamodel;

        built(mm.entity(entity).attributes())?
            .iter()
            .map(|attr| self.attribute_fetch(attr, path.append(attr.name()), depth))
            .collect()
    }

    fn attribute_fetch(
        &mut self,
        attr: &AttributeMapping,
        path: NavigablePath,
        depth: usize,
    ) -> Result<Fetch> {
        let mm = self.metamodel;
        let attribute = attribute_id(attr);

        let kind = match attr {
            AttributeMapping::Basic(_) => FetchKind::Basic,
            AttributeMapping::Discriminated(_) => FetchKind::Discriminated,
            AttributeMapping::Embedded(embedded) => FetchKind::Embedded {
                fetches: built(mm.embeddable(embedded.embeddable).attributes())?
                    .iter()
                    .map(|nested| self.attribute_fetch(nested, path.append(nested.name()), depth))
                    .collect::<Result<_>>()?,
            },
            AttributeMapping::ToOne(to_one) => self.to_one_fetch(to_one, &path, depth)?,
            AttributeMapping::Plural(plural) => {
                if plural.meta.fetch_timing == FetchTiming::Delayed || depth >= self.max_depth {
                    FetchKind::Delayed
                } else {
                    let element_path = path.append(NavigableRole::ELEMENT);

                    let fetches = match &plural.element {
                        CollectionPart::Basic { .. } => vec![],
                        CollectionPart::Embedded { embeddable, .. } => {
                            built(mm.embeddable(*embeddable).attributes())?
                                .iter()
                                .map(|nested| {
                                    let nested_path = element_path.append(nested.name());
                                    self.attribute_fetch(nested, nested_path, depth)
                                })
                                .collect::<Result<_>>()?
                        }
                        CollectionPart::OneToMany { entity, .. }
                        | CollectionPart::ManyToMany { entity, .. } => {
                            let via = built(plural.key_descriptor())?;
                            self.nested(*entity, element_path, Some(via), depth + 1)?
                        }
                    };

                    FetchKind::Collection { fetches }
                }
            }
        };

        Ok(Fetch {
            path,
            attribute,
            kind,
        })
    }

    fn to_one_fetch(
        &mut self,
        attr: &ToOneAttributeMapping,
        path: &NavigablePath,
        depth: usize,
    ) -> Result<FetchKind> {
        if attr.meta.fetch_timing == FetchTiming::Delayed {
            return Ok(FetchKind::Delayed);
        }

        let foreign_key = built(attr.foreign_key())?;

        if let Some(inverse) = built(attr.bidirectional_attribute())? {
            if let Some(referenced) = self.bidirectional_ancestor(attr, inverse) {
                trace!(path = %path, referenced = %referenced, "bidirectional circular fetch");
                return Ok(FetchKind::BidirectionalCircular { referenced });
            }
        }

        if let Some(frame) = self.stack.iter().rev().find(|frame| frame.via == Some(foreign_key)) {
            trace!(path = %path, referenced = %frame.path, "circular fetch");
            return Ok(FetchKind::Circular {
                referenced: frame.path.clone(),
            });
        }

        if depth >= self.max_depth {
            return Ok(FetchKind::Delayed);
        }

        let fetches = self.nested(attr.target, path.clone(), Some(foreign_key), depth + 1)?;

        Ok(FetchKind::Entity {
            entity: attr.target,
            style: attr.meta.fetch_style,
            foreign_key,
            fetches,
        })
    }

    fn nested(
        &mut self,
        entity: EntityId,
        path: NavigablePath,
        via: Option<ForeignKeyId>,
        depth: usize,
    ) -> Result<Vec<Fetch>> {
        self.stack.push(Frame {
            path: path.clone(),
            entity,
            via,
        });

        let fetches = self.entity_fetches(entity, &path, depth);
        self.stack.pop();
        fetches
    }

    /// Finds the ancestor `attr` points back at, given the path `inverse` of
    /// the attribute on the target that pairs with it.
    ///
    /// The entity owning `attr` was reached through some association. If that
    /// association's path ends with `inverse` and what precedes it is an
    /// ancestor of the target's type, `attr` leads back to that ancestor.
    fn bidirectional_ancestor(
        &self,
        attr: &ToOneAttributeMapping,
        inverse: &str,
    ) -> Option<NavigablePath> {
        let mm = self.metamodel;
        let owner = self.stack.last()?;

        let association = if owner.path.local_name() == NavigableRole::ELEMENT {
            owner.path.parent()?
        } else {
            owner.path.clone()
        };

        let referenced = association.trim_suffix(inverse)?;
        let ancestor = self
            .stack
            .iter()
            .rev()
            .skip(1)
            .find(|frame| frame.path == referenced)?;

        (mm.entity(ancestor.entity).root == mm.entity(attr.target).root).then_some(referenced)
    }
}

fn attribute_id(attr: &AttributeMapping) -> AttributeId {
    let meta = attr.metadata();
    meta.declaring.attribute(meta.position)
}

impl DomainResult {
    /// Finds the fetch at the full path `path`, such as
    /// `Employee.manager.manager`.
    pub fn find(&self, path: &str) -> Option<&Fetch> {
        find_in(&self.fetches, path)
    }

    /// Length of the longest chain of nested fetches.
    pub fn depth(&self) -> usize {
        self.fetches.iter().map(Fetch::depth).max().unwrap_or(0)
    }
}

impl Fetch {
    pub fn fetches(&self) -> &[Fetch] {
        match &self.kind {
            FetchKind::Embedded { fetches }
            | FetchKind::Entity { fetches, .. }
            | FetchKind::Collection { fetches } => fetches,
            _ => &[],
        }
    }

    pub fn is_circular(&self) -> bool {
        matches!(
            self.kind,
            FetchKind::Circular { .. } | FetchKind::BidirectionalCircular { .. }
        )
    }

    fn depth(&self) -> usize {
        1 + self.fetches().iter().map(Fetch::depth).max().unwrap_or(0)
    }
}

fn find_in<'a>(fetches: &'a [Fetch], path: &str) -> Option<&'a Fetch> {
    fetches.iter().find_map(|fetch| {
        if fetch.path.full_path() == path {
            Some(fetch)
        } else {
            find_in(fetch.fetches(), path)
        }
    })
}
