//! Tri-state position knowledge.

use kilogrid_topology::GridPos;

/// What a node knows about its own grid coordinate.
///
/// Moves only forward: `Unknown → Partial → Known`, or straight to
/// `Known`. Once `Known`, it never changes again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Fix {
    #[default]
    Unknown,
    /// At least one axis is known; never both
    Partial { x: Option<i32>, y: Option<i32> },
    Known(GridPos),
}

impl Fix {
    /// The final coordinate, if both axes are known.
    pub const fn known(&self) -> Option<GridPos> {
        match self {
            Fix::Known(p) => Some(*p),
            _ => None,
        }
    }

    pub const fn is_known(&self) -> bool {
        matches!(self, Fix::Known(_))
    }

    /// Whatever axes are known so far.
    pub const fn axes(&self) -> (Option<i32>, Option<i32>) {
        match *self {
            Fix::Unknown => (None, None),
            Fix::Partial { x, y } => (x, y),
            Fix::Known(p) => (Some(p.x), Some(p.y)),
        }
    }

    /// Build from two optional axes, normalizing to the right variant.
    pub const fn from_axes(x: Option<i32>, y: Option<i32>) -> Self {
        match (x, y) {
            (Some(x), Some(y)) => Fix::Known(GridPos::new(x, y)),
            (None, None) => Fix::Unknown,
            (x, y) => Fix::Partial { x, y },
        }
    }

    /// Fill in axes that are still unknown. Known axes are never overwritten.
    pub fn merge(self, x: Option<i32>, y: Option<i32>) -> Self {
        let (cx, cy) = self.axes();
        Self::from_axes(cx.or(x), cy.or(y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_promotes_to_known() {
        let fix = Fix::Unknown.merge(Some(3), None);
        assert_eq!(fix, Fix::Partial { x: Some(3), y: None });

        let fix = fix.merge(None, Some(5));
        assert_eq!(fix, Fix::Known(GridPos::new(3, 5)));
    }

    #[test]
    fn merge_never_overwrites() {
        let fix = Fix::Partial { x: Some(3), y: None }.merge(Some(9), Some(4));
        assert_eq!(fix.known(), Some(GridPos::new(3, 4)));

        let known = Fix::Known(GridPos::new(1, 1));
        assert_eq!(known.merge(Some(7), Some(7)), known);
    }

    #[test]
    fn empty_axes_stay_unknown() {
        assert_eq!(Fix::from_axes(None, None), Fix::Unknown);
        assert_eq!(Fix::Unknown.merge(None, None), Fix::Unknown);
    }
}
