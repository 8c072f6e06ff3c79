//! Box geometry resolution.
//!
//! A style's box has three descriptors per axis (`left`/`width`/`right`,
//! `top`/`height`/`bottom`), of which a stylesheet normally sets two. The
//! resolver picks the derived one the first time a style is updated and
//! recomputes it on every later change.
//!
//! ## Rotation
//!
//! A rotated box pivots around its top-left corner. When the left (or top)
//! edge is derived, the box is attached at the opposite corner instead, so
//! the pivot is moved accordingly.
//!
//! The shift is applied to the stored descriptors. A derived edge is
//! recomputed first and so moves once; a constant edge on the other axis
//! (`top` when only `left` is derived, `left` when only `top` is) is not,
//! and moves again on every later resolve of the style.

use crate::core::{ChangeMask, GeometryConfig};
use crate::data::Style;
use crate::script::Scriptable;

use super::side::AutomaticSide;

/// Resolves derived box descriptors.
pub struct GeometryResolver;

impl GeometryResolver {
    /// A position is set if scripted or below the unset threshold.
    #[must_use]
    pub fn is_set(x: &Scriptable<f64>, config: &GeometryConfig) -> bool {
        x.is_scripted() || *x.get() < config.unset_threshold
    }

    /// A size is set if scripted or not (nearly) zero.
    #[must_use]
    pub fn is_size_set(x: &Scriptable<f64>, config: &GeometryConfig) -> bool {
        x.is_scripted() || x.get().abs() > config.size_epsilon
    }

    /// Choose the derived descriptor on each axis.
    #[must_use]
    pub fn choose_sides(style: &Style, config: &GeometryConfig) -> AutomaticSide {
        let horizontal = if !Self::is_set(&style.right, config) {
            AutomaticSide::RIGHT
        } else if !Self::is_size_set(&style.width, config) {
            AutomaticSide::WIDTH
        } else if !Self::is_set(&style.left, config) {
            AutomaticSide::LEFT
        } else {
            AutomaticSide::LR
        };
        let vertical = if !Self::is_set(&style.bottom, config) {
            AutomaticSide::BOTTOM
        } else if !Self::is_size_set(&style.height, config) {
            AutomaticSide::HEIGHT
        } else if !Self::is_set(&style.top, config) {
            AutomaticSide::TOP
        } else {
            AutomaticSide::TB
        };
        horizontal | vertical
    }

    /// Resolve derived descriptors after an update that produced `changes`.
    /// Returns the final change mask; empty means nothing changed.
    pub fn resolve(style: &mut Style, changes: ChangeMask, config: &GeometryConfig) -> ChangeMask {
        let mut changes = changes;
        if style.automatic_side.is_empty() {
            style.automatic_side = Self::choose_sides(style, config);
            changes |= ChangeMask::SIZE;
        }
        if changes.is_empty() {
            return ChangeMask::NONE;
        }

        let side = style.automatic_side;
        let (left, width, right) = (*style.left.get(), *style.width.get(), *style.right.get());
        if side.contains(AutomaticSide::LEFT) {
            style.left.set(right - width);
        } else if side.contains(AutomaticSide::WIDTH) {
            style.width.set(right - left);
        } else if side.contains(AutomaticSide::RIGHT) {
            style.right.set(left + width);
        } else {
            let lr = (left + right).trunc();
            style.left.set((lr - width) / 2.0);
            style.right.set((lr + width) / 2.0);
        }

        let (top, height, bottom) = (*style.top.get(), *style.height.get(), *style.bottom.get());
        if side.contains(AutomaticSide::TOP) {
            style.top.set(bottom - height);
        } else if side.contains(AutomaticSide::HEIGHT) {
            style.height.set(bottom - top);
        } else if side.contains(AutomaticSide::BOTTOM) {
            style.bottom.set(top + height);
        } else {
            let tb = (top + bottom).trunc();
            style.top.set((tb - height) / 2.0);
            style.bottom.set((tb + height) / 2.0);
        }

        let angle = *style.angle.get();
        if angle != 0.0 && side.intersects(AutomaticSide::LEFT | AutomaticSide::TOP) {
            let (s, c) = angle.to_radians().sin_cos();
            let (width, height) = (*style.width.get(), *style.height.get());
            if side.contains(AutomaticSide::LEFT) {
                style.left.set(*style.left.get() + width * (1.0 - c));
                style.top.set(*style.top.get() + width * s);
            }
            if side.contains(AutomaticSide::TOP) {
                style.left.set(*style.left.get() - height * s);
                style.top.set(*style.top.get() + height * (1.0 - c));
            }
        }

        if *style.width.get() < 0.0 {
            style.width.set(-*style.width.get());
        }
        if *style.height.get() < 0.0 {
            style.height.set(-*style.height.get());
        }
        changes
    }
}
