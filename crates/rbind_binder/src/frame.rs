//! Foreach frames and the position hierarchy they hang off.

use rbind_evaluator::ResolveError;
use std::fmt;

/// One iteration context: the `index`-th rendering of `item_alias` over the
/// array at `source_array_path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeachFrame {
    pub id: u32,
    /// Number of frames enclosing this one.
    pub depth: u32,
    /// Index into the source array.
    pub index: usize,
    /// Position among rendered items, which differs from `index` when the
    /// rendered list is filtered.
    pub render_index: usize,
    pub item_alias: String,
    pub index_alias: Option<String>,
    /// Path of the iterated array. May start with an outer frame's alias.
    pub source_array_path: String,
}

impl ForeachFrame {
    pub fn new(item_alias: impl Into<String>, source_array_path: impl Into<String>, index: usize) -> Self {
        Self {
            id: 0,
            depth: 0,
            index,
            render_index: index,
            item_alias: item_alias.into(),
            index_alias: None,
            source_array_path: source_array_path.into(),
        }
    }

    pub fn with_index_alias(mut self, alias: impl Into<String>) -> Self {
        self.index_alias = Some(alias.into());
        self
    }

    pub fn with_render_index(mut self, render_index: usize) -> Self {
        self.render_index = render_index;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PositionId(pub u32);

impl fmt::Display for PositionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct PositionNode {
    parent: Option<PositionId>,
    frame: Option<ForeachFrame>,
}

/// An arena of template positions. Each position has an optional parent
/// and, if it is an iteration boundary, a frame.
#[derive(Debug, Clone, Default)]
pub struct ScopeTree {
    nodes: Vec<PositionNode>,
    next_frame_id: u32,
}

impl ScopeTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a plain position under `parent`.
    pub fn add_position(&mut self, parent: Option<PositionId>) -> PositionId {
        self.push(parent, None)
    }

    /// Add an iteration boundary under `parent`. The frame's `id` and
    /// `depth` are assigned here.
    pub fn add_iteration(&mut self, parent: Option<PositionId>, mut frame: ForeachFrame) -> PositionId {
        frame.id = self.next_frame_id;
        self.next_frame_id += 1;
        frame.depth = match parent {
            Some(p) => self.chain_len(p),
            None => 0,
        };
        self.push(parent, Some(frame))
    }

    fn push(&mut self, parent: Option<PositionId>, frame: Option<ForeachFrame>) -> PositionId {
        let id = PositionId(self.nodes.len() as u32);
        self.nodes.push(PositionNode { parent, frame });
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn parent(&self, position: PositionId) -> Option<PositionId> {
        self.nodes.get(position.0 as usize).and_then(|n| n.parent)
    }

    pub fn frame(&self, position: PositionId) -> Option<&ForeachFrame> {
        self.nodes.get(position.0 as usize).and_then(|n| n.frame.as_ref())
    }

    /// Every frame enclosing `position` (its own included), innermost first.
    pub fn foreach_chain(&self, position: PositionId) -> Result<Vec<&ForeachFrame>, ResolveError> {
        let mut chain = Vec::new();
        let mut current = Some(position);
        while let Some(id) = current {
            let node = self
                .nodes
                .get(id.0 as usize)
                .ok_or(ResolveError::UnknownPosition(id.0))?;
            if let Some(frame) = &node.frame {
                chain.push(frame);
            }
            current = node.parent;
        }
        Ok(chain)
    }

    fn chain_len(&self, position: PositionId) -> u32 {
        self.foreach_chain(position).map_or(0, |chain| chain.len() as u32)
    }
}
